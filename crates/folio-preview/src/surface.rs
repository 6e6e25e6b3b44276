//! Preview surfaces
//!
//! A surface takes the document built for a section and puts it somewhere a
//! user can see it, always behind the sandbox boundary.

use crate::document::{PreviewConfig, PreviewDocument};
use crate::error::PreviewError;
use crate::html::{escape, slug};
use crate::sandbox::{src_frame, srcdoc_frame, SandboxPolicy};
use folio_document::Section;
use std::path::{Path, PathBuf};

/// Destination for rendered previews
pub trait PreviewSurface {
    /// What a render produces
    type Output;

    /// Render one section's document
    fn render(
        &mut self,
        section: &Section,
        document: &PreviewDocument,
    ) -> Result<Self::Output, PreviewError>;
}

/// Inline surface producing `srcdoc` iframe markup
#[derive(Debug, Clone, Default)]
pub struct SrcdocSurface {
    policy: SandboxPolicy,
}

impl SrcdocSurface {
    /// Create surface with policy
    #[inline]
    #[must_use]
    pub fn new(policy: SandboxPolicy) -> Self {
        Self { policy }
    }

    /// Create surface from preview config
    #[must_use]
    pub fn from_config(config: &PreviewConfig) -> Self {
        Self::new(SandboxPolicy::with_tokens(config.sandbox.iter().copied()))
    }
}

impl PreviewSurface for SrcdocSurface {
    type Output = String;

    fn render(
        &mut self,
        section: &Section,
        document: &PreviewDocument,
    ) -> Result<String, PreviewError> {
        Ok(srcdoc_frame(&section.heading, document, &self.policy))
    }
}

/// One file written by a [`DirectorySurface`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenPreview {
    /// Section heading
    pub heading: String,
    /// File name relative to the surface root
    pub file_name: String,
}

/// Surface writing one HTML file per section plus a host page
#[derive(Debug)]
pub struct DirectorySurface {
    root: PathBuf,
    policy: SandboxPolicy,
    written: Vec<WrittenPreview>,
}

/// Host page file name
pub const INDEX_FILE: &str = "index.html";

impl DirectorySurface {
    /// Create surface, creating `root` if needed
    ///
    /// # Errors
    /// Returns `PreviewError::Io` if the directory cannot be created
    pub fn create(root: impl Into<PathBuf>, policy: SandboxPolicy) -> Result<Self, PreviewError> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| PreviewError::io(&root, e))?;
        Ok(Self {
            root,
            policy,
            written: Vec::new(),
        })
    }

    /// Output directory
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Files written so far
    #[inline]
    #[must_use]
    pub fn written(&self) -> &[WrittenPreview] {
        &self.written
    }

    /// Write the host page embedding every preview in a sandboxed frame
    ///
    /// # Errors
    /// Returns `PreviewError::Io` if the page cannot be written
    pub fn finish(self) -> Result<PathBuf, PreviewError> {
        let mut page = String::from(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
             <title>Folio preview</title>\n\
             <style>body{font-family:system-ui,sans-serif;margin:0 auto;max-width:960px;\
             padding:24px}iframe{width:100%;height:420px;border:1px solid #e2e8f0;\
             border-radius:8px}</style>\n</head>\n<body>\n",
        );
        for preview in &self.written {
            page.push_str(&format!(
                "<section>\n<h2>{}</h2>\n{}\n</section>\n",
                escape(&preview.heading),
                src_frame(&preview.heading, &preview.file_name, &self.policy)
            ));
        }
        page.push_str("</body>\n</html>\n");

        let path = self.root.join(INDEX_FILE);
        std::fs::write(&path, page).map_err(|e| PreviewError::io(&path, e))?;
        tracing::info!(
            "Wrote preview index with {} sections to {}",
            self.written.len(),
            path.display()
        );
        Ok(path)
    }
}

impl PreviewSurface for DirectorySurface {
    type Output = PathBuf;

    fn render(
        &mut self,
        section: &Section,
        document: &PreviewDocument,
    ) -> Result<PathBuf, PreviewError> {
        let file_name = format!("{:02}-{}.html", self.written.len() + 1, slug(&section.heading));
        let path = self.root.join(&file_name);
        std::fs::write(&path, document.html()).map_err(|e| PreviewError::io(&path, e))?;
        tracing::debug!("Wrote preview for '{}' to {}", section.heading, path.display());

        self.written.push(WrittenPreview {
            heading: section.heading.clone(),
            file_name,
        });
        Ok(path)
    }
}
