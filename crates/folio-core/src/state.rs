//! Generation attempt state machine
//!
//! ```text
//! Idle ──► Requesting ──► Streaming ──► Completed
//!              │  └──────────────────────►┘
//!              └──────────► Failed ◄──────┘
//! ```
//!
//! `Requesting → Completed` is the heuristic path, which never streams.

use crate::error::GenerationError;
use folio_document::{ContentKind, SectionId};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Attempt state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationState {
    /// Not started
    Idle,
    /// Waiting on the service
    Requesting,
    /// Reading the response body
    Streaming,
    /// Content written
    Completed,
    /// Attempt ended without writing
    Failed,
}

impl GenerationState {
    /// Check if no further transitions are possible
    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Validates a state transition
///
/// # Errors
/// Returns `GenerationError::InvalidTransition` for transitions not listed by
/// [`allowed_transitions`]
pub fn validate_transition(
    from: GenerationState,
    to: GenerationState,
) -> Result<(), GenerationError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(GenerationError::InvalidTransition { from, to })
    }
}

/// States reachable from `from` in one step
#[must_use]
pub fn allowed_transitions(from: GenerationState) -> Vec<GenerationState> {
    use GenerationState::{Completed, Failed, Idle, Requesting, Streaming};
    match from {
        Idle => vec![Requesting],
        Requesting => vec![Streaming, Completed, Failed],
        Streaming => vec![Completed, Failed],
        Completed | Failed => vec![],
    }
}

/// Request id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub Ulid);

impl RequestId {
    /// Create new request ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One generation attempt, alive from trigger to completion or failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Attempt id
    pub id: RequestId,
    /// Target section
    pub section_id: SectionId,
    /// Requested kind
    pub kind: ContentKind,
    state: GenerationState,
}

impl GenerationRequest {
    /// Create new idle request
    #[inline]
    #[must_use]
    pub fn new(id: RequestId, section_id: SectionId, kind: ContentKind) -> Self {
        Self {
            id,
            section_id,
            kind,
            state: GenerationState::Idle,
        }
    }

    /// Current state
    #[inline]
    #[must_use]
    pub fn state(&self) -> GenerationState {
        self.state
    }

    /// Move to `to`
    ///
    /// # Errors
    /// Returns `GenerationError::InvalidTransition` if the move is illegal;
    /// the state is left unchanged
    pub fn advance(&mut self, to: GenerationState) -> Result<(), GenerationError> {
        validate_transition(self.state, to)?;
        tracing::debug!(
            "Generation {} for section {}: {:?} -> {:?}",
            self.id,
            self.section_id,
            self.state,
            to
        );
        self.state = to;
        Ok(())
    }

    /// Move to `Failed` unless already terminal
    pub fn fail(&mut self) {
        if !self.state.is_terminal() {
            self.state = GenerationState::Failed;
        }
    }
}
