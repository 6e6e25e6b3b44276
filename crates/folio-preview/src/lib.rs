//! Folio Preview
//!
//! Builds one self-contained HTML document per section and renders it behind
//! an iframe sandbox that permits scripts but never same-origin access.
//!
//! ```text
//! SectionContent ──► PreviewDocument ──► PreviewSurface ──► <iframe sandbox="allow-scripts">
//!   Diagram(m)         mermaid template       SrcdocSurface      (srcdoc)
//!   Custom(h)          verbatim               DirectorySurface   (src + index.html)
//!   None               placeholder
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod document;
pub mod error;
pub mod html;
pub mod sandbox;
pub mod surface;

pub use document::{
    DocumentSource, MermaidTheme, PreviewConfig, PreviewDocument, DEFAULT_MERMAID_URL,
};
pub use error::PreviewError;
pub use sandbox::{SandboxPolicy, SandboxToken, ALLOW_SCRIPTS};
pub use surface::{DirectorySurface, PreviewSurface, SrcdocSurface, WrittenPreview, INDEX_FILE};

use folio_document::Section;

/// Build a section's document and render it on a surface
///
/// # Errors
/// Propagates the surface's error
pub fn render_section<S: PreviewSurface>(
    surface: &mut S,
    section: &Section,
    config: &PreviewConfig,
) -> Result<S::Output, PreviewError> {
    let document = PreviewDocument::build(&section.content, config);
    surface.render(section, &document)
}
