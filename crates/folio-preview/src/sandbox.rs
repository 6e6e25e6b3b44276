//! Isolated frame policy
//!
//! Previews run inside an `<iframe sandbox>` that always allows scripts and
//! never grants same-origin access. [`SandboxToken`] has no same-origin
//! variant, so no configuration can produce one.

use crate::document::PreviewDocument;
use crate::html::escape_attr;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Optional capability granted to a preview frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SandboxToken {
    /// `allow-forms`
    Forms,
    /// `allow-modals`
    Modals,
    /// `allow-popups`
    Popups,
    /// `allow-pointer-lock`
    PointerLock,
    /// `allow-downloads`
    Downloads,
}

impl SandboxToken {
    /// Attribute keyword
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Forms => "allow-forms",
            Self::Modals => "allow-modals",
            Self::Popups => "allow-popups",
            Self::PointerLock => "allow-pointer-lock",
            Self::Downloads => "allow-downloads",
        }
    }
}

/// Always-present capability
pub const ALLOW_SCRIPTS: &str = "allow-scripts";

/// Sandbox attribute builder
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SandboxPolicy {
    extra: BTreeSet<SandboxToken>,
}

impl SandboxPolicy {
    /// Scripts only
    #[inline]
    #[must_use]
    pub fn scripts_only() -> Self {
        Self::default()
    }

    /// Policy with additional capabilities
    #[must_use]
    pub fn with_tokens(tokens: impl IntoIterator<Item = SandboxToken>) -> Self {
        Self {
            extra: tokens.into_iter().collect(),
        }
    }

    /// Value of the `sandbox` attribute
    #[must_use]
    pub fn attribute(&self) -> String {
        std::iter::once(ALLOW_SCRIPTS)
            .chain(self.extra.iter().map(|t| t.as_str()))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// `<iframe>` markup for a document, inlined through `srcdoc`
#[must_use]
pub fn srcdoc_frame(title: &str, document: &PreviewDocument, policy: &SandboxPolicy) -> String {
    format!(
        "<iframe title=\"{}\" sandbox=\"{}\" referrerpolicy=\"no-referrer\" \
         loading=\"lazy\" srcdoc=\"{}\"></iframe>",
        escape_attr(title),
        policy.attribute(),
        escape_attr(document.html())
    )
}

/// `<iframe>` markup for a document served from `src`
#[must_use]
pub fn src_frame(title: &str, src: &str, policy: &SandboxPolicy) -> String {
    format!(
        "<iframe title=\"{}\" sandbox=\"{}\" referrerpolicy=\"no-referrer\" \
         loading=\"lazy\" src=\"{}\"></iframe>",
        escape_attr(title),
        policy.attribute(),
        escape_attr(src)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_document::SectionContent;

    #[test]
    fn scripts_always_allowed_same_origin_never() {
        let policy = SandboxPolicy::with_tokens([SandboxToken::Popups, SandboxToken::Forms]);
        let attr = policy.attribute();
        assert_eq!(attr, "allow-scripts allow-forms allow-popups");
        assert!(!attr.contains("same-origin"));
        assert_eq!(SandboxPolicy::scripts_only().attribute(), "allow-scripts");
    }

    #[test]
    fn same_origin_cannot_be_deserialized() {
        #[derive(Deserialize)]
        struct Tokens {
            tokens: Vec<SandboxToken>,
        }
        let ok: Tokens = toml::from_str(r#"tokens = ["pointer-lock"]"#).unwrap();
        assert_eq!(ok.tokens, vec![SandboxToken::PointerLock]);
        assert!(toml::from_str::<Tokens>(r#"tokens = ["same-origin"]"#).is_err());
    }

    #[test]
    fn srcdoc_is_attribute_escaped() {
        let doc = PreviewDocument::build(
            &SectionContent::Custom("<p class=\"x\">hi</p>".into()),
            &crate::PreviewConfig::default(),
        );
        let frame = srcdoc_frame("Intro", &doc, &SandboxPolicy::scripts_only());
        assert!(frame.contains("srcdoc=\"&lt;p class=&quot;x&quot;&gt;hi&lt;/p&gt;\""));
        assert!(frame.contains("sandbox=\"allow-scripts\""));
    }
}
