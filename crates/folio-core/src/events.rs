//! Generation notifications

use crate::error::GenerationError;
use folio_document::{ContentKind, SectionId};
use serde::Serialize;

/// Where completed content came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionSource {
    /// Decoded service output
    Service,
    /// Local heuristic synthesis
    Heuristic,
}

/// Broadcast for every attempt transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationEvent {
    /// Slot claimed, request issued
    Started {
        /// Target section
        section_id: SectionId,
        /// Requested kind
        kind: ContentKind,
    },
    /// Body bytes received
    Progress {
        /// Target section
        section_id: SectionId,
        /// Total bytes so far
        bytes: usize,
        /// Decoded characters so far
        chars: usize,
    },
    /// Content written
    Completed {
        /// Target section
        section_id: SectionId,
        /// Requested kind
        kind: ContentKind,
        /// Content origin
        source: CompletionSource,
    },
    /// Attempt ended without writing
    Failed {
        /// Target section
        section_id: SectionId,
        /// Cause
        error: GenerationError,
    },
    /// Attempt refused before it started
    Rejected {
        /// Target section
        section_id: SectionId,
        /// Cause
        error: GenerationError,
    },
}

impl GenerationEvent {
    /// Section the event concerns
    #[must_use]
    pub fn section_id(&self) -> SectionId {
        match self {
            Self::Started { section_id, .. }
            | Self::Progress { section_id, .. }
            | Self::Completed { section_id, .. }
            | Self::Failed { section_id, .. }
            | Self::Rejected { section_id, .. } => *section_id,
        }
    }

    /// Check if the event ends an attempt
    #[inline]
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed { .. } | Self::Failed { .. } | Self::Rejected { .. })
    }
}
