//! In-memory section store
//!
//! The authoritative ordered collection of sections for one session. Writes
//! replace one content field of one section at a time; there are no merge
//! writes and no validation beyond the existence of the target id.

use crate::section::{ContentField, Section, SectionContent, SectionId};
use parking_lot::RwLock;
use std::sync::Arc;

/// Store shared between the session and the orchestrator
///
/// Guards are short-lived and never held across an `.await`.
pub type SharedStore = Arc<RwLock<SectionStore>>;

/// Result of a patch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    /// The field was replaced
    Applied,
    /// No section with that id; the store is unchanged
    Missing,
}

impl PatchOutcome {
    /// Whether the store changed
    #[inline]
    #[must_use]
    pub fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Ordered section collection
#[derive(Debug, Clone, Default)]
pub struct SectionStore {
    sections: Vec<Section>,
}

impl SectionStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a shared handle around an empty store
    #[must_use]
    pub fn shared() -> SharedStore {
        Arc::new(RwLock::new(Self::new()))
    }

    /// Sections in document order
    #[inline]
    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Look up one section
    #[must_use]
    pub fn get(&self, id: SectionId) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    /// Whether a section exists
    #[inline]
    #[must_use]
    pub fn contains(&self, id: SectionId) -> bool {
        self.get(id).is_some()
    }

    /// Number of sections
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Whether the store is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Replace every section, discarding all attached content
    pub fn replace_all(&mut self, sections: Vec<Section>) {
        tracing::debug!(
            "Replacing {} sections with {}",
            self.sections.len(),
            sections.len()
        );
        self.sections = sections;
    }

    /// Replace every section, carrying content over by heading and position
    ///
    /// A new section inherits the content of the old section at the same
    /// index when both headings are equal. Identifiers are still the new ones.
    /// Returns the number of sections that inherited content.
    pub fn replace_preserving(&mut self, mut sections: Vec<Section>) -> usize {
        let mut carried = 0;
        for (new, old) in sections.iter_mut().zip(self.sections.iter_mut()) {
            if new.heading == old.heading && !old.content.is_none() {
                new.content = std::mem::take(&mut old.content);
                carried += 1;
            }
        }
        tracing::debug!("Carried content over for {} sections", carried);
        self.sections = sections;
        carried
    }

    /// Replace exactly one field of one section
    ///
    /// Unknown ids are a no-op.
    pub fn patch(
        &mut self,
        id: SectionId,
        field: ContentField,
        value: impl Into<String>,
    ) -> PatchOutcome {
        match self.sections.iter_mut().find(|s| s.id == id) {
            Some(section) => {
                section.content = SectionContent::from_field(field, value.into());
                PatchOutcome::Applied
            }
            None => {
                tracing::debug!("Patch on missing section {} ignored", id);
                PatchOutcome::Missing
            }
        }
    }

    /// Detach all content from one section
    pub fn clear_content(&mut self, id: SectionId) -> PatchOutcome {
        match self.sections.iter_mut().find(|s| s.id == id) {
            Some(section) => {
                section.content = SectionContent::None;
                PatchOutcome::Applied
            }
            None => PatchOutcome::Missing,
        }
    }
}
