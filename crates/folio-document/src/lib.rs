//! Folio Document
//!
//! The section model shared by every other folio crate:
//! - [`segment`] splits raw markdown into heading-delimited sections
//! - [`SectionStore`] holds them in document order for one session
//! - [`SectionContent`] is the single active content variant of a section
//!
//! # Example
//!
//! ```rust
//! use folio_document::{segment, ContentField, SectionStore};
//!
//! let mut store = SectionStore::new();
//! store.replace_all(segment("intro\n# Setup\nInstall the tools."));
//!
//! let id = store.sections()[1].id;
//! store.patch(id, ContentField::GeneratedMarkup, "graph TD\n    A --> B");
//! assert_eq!(store.get(id).unwrap().generated_markup(), Some("graph TD\n    A --> B"));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod section;
pub mod sectionizer;
pub mod store;

pub use section::{
    ContentField, ContentKind, Section, SectionContent, SectionId, INTRODUCTION_HEADING,
};
pub use sectionizer::{parse_heading, render_markdown, segment};
pub use store::{PatchOutcome, SectionStore, SharedStore};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
