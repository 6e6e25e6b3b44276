//! Preview document construction
//!
//! Turns a section's active content into one self-contained HTML document:
//! diagram markup goes into a fixed template that loads and initialises the
//! mermaid library, custom content is used verbatim, and no content yields a
//! fixed placeholder.

use crate::html::escape;
use crate::sandbox::SandboxToken;
use folio_document::SectionContent;
use serde::{Deserialize, Serialize};

/// Default mermaid bundle
pub const DEFAULT_MERMAID_URL: &str = "https://cdn.jsdelivr.net/npm/mermaid@10/dist/mermaid.min.js";

/// Document shown for a section with no content
pub const PLACEHOLDER_HTML: &str = "<!DOCTYPE html>
<html lang=\"en\">
<head>
<meta charset=\"utf-8\">
<style>body{margin:0;height:100vh;display:flex;align-items:center;justify-content:center;font-family:system-ui,sans-serif;color:#64748b;background:#f8fafc}</style>
</head>
<body>
<p>No preview yet. Generate a diagram or animation for this section.</p>
</body>
</html>
";

/// Built-in mermaid theme
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MermaidTheme {
    /// `default`
    #[default]
    Default,
    /// `dark`
    Dark,
    /// `forest`
    Forest,
    /// `neutral`
    Neutral,
}

impl MermaidTheme {
    /// Theme name passed to `mermaid.initialize`
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Dark => "dark",
            Self::Forest => "forest",
            Self::Neutral => "neutral",
        }
    }
}

/// Preview settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Script URL of the mermaid bundle
    pub mermaid_url: String,
    /// Diagram theme
    pub theme: MermaidTheme,
    /// Capabilities granted beyond `allow-scripts`
    pub sandbox: Vec<SandboxToken>,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            mermaid_url: DEFAULT_MERMAID_URL.to_string(),
            theme: MermaidTheme::Default,
            sandbox: Vec::new(),
        }
    }
}

impl PreviewConfig {
    /// With theme
    #[inline]
    #[must_use]
    pub fn with_theme(mut self, theme: MermaidTheme) -> Self {
        self.theme = theme;
        self
    }
}

/// Where a preview document came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentSource {
    /// Built from diagram markup
    Diagram,
    /// Custom content, verbatim
    Custom,
    /// Placeholder
    Placeholder,
}

/// Self-contained renderable document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewDocument {
    html: String,
    source: DocumentSource,
}

impl PreviewDocument {
    /// Build the document for a content variant
    #[must_use]
    pub fn build(content: &SectionContent, config: &PreviewConfig) -> Self {
        match content {
            SectionContent::Diagram(markup) => Self {
                html: diagram_document(markup, config),
                source: DocumentSource::Diagram,
            },
            SectionContent::Custom(html) => Self {
                html: html.clone(),
                source: DocumentSource::Custom,
            },
            SectionContent::None => Self::placeholder(),
        }
    }

    /// The fixed placeholder
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            html: PLACEHOLDER_HTML.to_string(),
            source: DocumentSource::Placeholder,
        }
    }

    /// Document text
    #[inline]
    #[must_use]
    pub fn html(&self) -> &str {
        &self.html
    }

    /// Origin of the document
    #[inline]
    #[must_use]
    pub fn source(&self) -> DocumentSource {
        self.source
    }

    /// Consume into the document text
    #[inline]
    #[must_use]
    pub fn into_html(self) -> String {
        self.html
    }
}

fn diagram_document(markup: &str, config: &PreviewConfig) -> String {
    format!(
        "<!DOCTYPE html>
<html lang=\"en\">
<head>
<meta charset=\"utf-8\">
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">
<style>body{{margin:0;padding:16px;font-family:system-ui,sans-serif;background:#ffffff}}.mermaid{{display:flex;justify-content:center}}</style>
<script src=\"{url}\"></script>
</head>
<body>
<pre class=\"mermaid\">
{markup}
</pre>
<script>mermaid.initialize({{ startOnLoad: true, theme: \"{theme}\", securityLevel: \"strict\" }});</script>
</body>
</html>
",
        url = escape(&config.mermaid_url),
        markup = escape(markup),
        theme = config.theme.as_str(),
    )
}
