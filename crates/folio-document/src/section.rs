//! Section model
//!
//! A section is a heading-delimited span of a markdown document plus the
//! interactive content attached to it. Content is a tagged union, so exactly
//! one variant is active for rendering at any time.

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Heading used for content that precedes the first markdown heading.
pub const INTRODUCTION_HEADING: &str = "Introduction";

/// Unique section identifier (ULID, never reused)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SectionId(pub Ulid);

impl SectionId {
    /// Mint a fresh identifier
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for SectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for SectionId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ulid::from_string(s).map(Self)
    }
}

/// Content attached to a section
///
/// `Diagram` holds mermaid markup, `Custom` holds a freeform HTML document
/// (manual edit or animation generation).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SectionContent {
    /// Nothing attached yet
    #[default]
    None,
    /// Diagram description text
    Diagram(String),
    /// Executable HTML document
    Custom(String),
}

impl SectionContent {
    /// Whether any content is attached
    #[inline]
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Field this content occupies, if any
    #[inline]
    #[must_use]
    pub fn field(&self) -> Option<ContentField> {
        match self {
            Self::None => None,
            Self::Diagram(_) => Some(ContentField::GeneratedMarkup),
            Self::Custom(_) => Some(ContentField::CustomContent),
        }
    }

    /// Build content for a field
    #[inline]
    #[must_use]
    pub fn from_field(field: ContentField, value: String) -> Self {
        match field {
            ContentField::GeneratedMarkup => Self::Diagram(value),
            ContentField::CustomContent => Self::Custom(value),
        }
    }
}

/// Patch target on a section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentField {
    /// Diagram markup
    GeneratedMarkup,
    /// Freeform executable document
    CustomContent,
}

/// Kind of content a generation produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    /// Mermaid diagram
    Diagram,
    /// Self-contained animated HTML document
    Animation,
}

impl ContentKind {
    /// Section field a result of this kind is written to
    #[inline]
    #[must_use]
    pub fn field(self) -> ContentField {
        match self {
            Self::Diagram => ContentField::GeneratedMarkup,
            Self::Animation => ContentField::CustomContent,
        }
    }

    /// Wire name
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Diagram => "diagram",
            Self::Animation => "animation",
        }
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ContentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "diagram" | "mermaid" => Ok(Self::Diagram),
            "animation" | "html" => Ok(Self::Animation),
            other => Err(format!("unknown content kind: {other}")),
        }
    }
}

/// Heading-delimited document section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Identifier minted at creation
    pub id: SectionId,
    /// Heading text, or [`INTRODUCTION_HEADING`]
    pub heading: String,
    /// Heading depth (1-6), 0 for the synthesized introduction
    pub level: u8,
    /// Trimmed text between this heading and the next
    pub body: String,
    /// Active content variant
    pub content: SectionContent,
}

impl Section {
    /// Create a section with a fresh id and no content
    #[must_use]
    pub fn new(heading: impl Into<String>, level: u8, body: impl Into<String>) -> Self {
        Self {
            id: SectionId::new(),
            heading: heading.into(),
            level,
            body: body.into(),
            content: SectionContent::None,
        }
    }

    /// Leading section for content before the first heading
    #[must_use]
    pub fn introduction(body: impl Into<String>) -> Self {
        Self::new(INTRODUCTION_HEADING, 0, body)
    }

    /// Diagram markup, when that variant is active
    #[inline]
    #[must_use]
    pub fn generated_markup(&self) -> Option<&str> {
        match &self.content {
            SectionContent::Diagram(markup) => Some(markup),
            _ => None,
        }
    }

    /// Custom document, when that variant is active
    #[inline]
    #[must_use]
    pub fn custom_content(&self) -> Option<&str> {
        match &self.content {
            SectionContent::Custom(html) => Some(html),
            _ => None,
        }
    }

    /// Whether this is the synthesized introduction
    #[inline]
    #[must_use]
    pub fn is_introduction(&self) -> bool {
        self.level == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_id_roundtrip_display() {
        let id = SectionId::new();
        let parsed: SectionId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn section_ids_are_unique() {
        let a = Section::new("A", 1, "");
        let b = Section::new("A", 1, "");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn content_accessors_follow_active_variant() {
        let mut section = Section::new("Flow", 2, "body");
        assert!(section.generated_markup().is_none());
        assert!(section.custom_content().is_none());

        section.content = SectionContent::Diagram("graph TD".into());
        assert_eq!(section.generated_markup(), Some("graph TD"));
        assert!(section.custom_content().is_none());

        section.content = SectionContent::Custom("<p>hi</p>".into());
        assert!(section.generated_markup().is_none());
        assert_eq!(section.custom_content(), Some("<p>hi</p>"));
    }

    #[test]
    fn content_kind_maps_to_field() {
        assert_eq!(ContentKind::Diagram.field(), ContentField::GeneratedMarkup);
        assert_eq!(ContentKind::Animation.field(), ContentField::CustomContent);
        assert_eq!("Mermaid".parse::<ContentKind>(), Ok(ContentKind::Diagram));
        assert!("video".parse::<ContentKind>().is_err());
    }

    #[test]
    fn content_serializes_tagged() {
        let json = serde_json::to_string(&SectionContent::Diagram("x".into())).unwrap();
        assert_eq!(json, r#"{"kind":"diagram","value":"x"}"#);
    }
}
