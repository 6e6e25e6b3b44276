//! Error types for Folio Core
//!
//! Provides error handling for:
//! - Generation attempts (transport, status, timeout, cancellation)
//! - Configuration loading and validation
//! - Identity checks
//!
//! Malformed stream lines and patches on missing sections are not errors:
//! the decoder counts them and the store reports `PatchOutcome::Missing`.

use crate::state::GenerationState;
use folio_document::SectionId;
use folio_preview::PreviewError;
use std::path::PathBuf;

/// Main Folio error type
#[derive(Debug, thiserror::Error)]
pub enum FolioError {
    /// No user is signed in
    #[error("not signed in")]
    Unauthenticated,

    /// Generation failed
    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Identity provider error
    #[error("identity error: {0}")]
    Identity(#[from] IdentityError),

    /// Preview rendering failed
    #[error("preview failed: {0}")]
    Preview(#[from] PreviewError),
}

impl FolioError {
    /// Check if error is an authentication gate rejection
    #[inline]
    #[must_use]
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::Unauthenticated)
    }
}

/// Generation attempt errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    /// Another attempt holds the slot
    #[error("a generation is already in flight")]
    Busy,

    /// Target section does not exist
    #[error("section not found: {0}")]
    SectionNotFound(SectionId),

    /// Request or stream transport failed
    #[error("transport error: {0}")]
    Transport(String),

    /// Service answered with a non-success status
    #[error("service returned status {code}")]
    Status {
        /// HTTP status code
        code: u16,
    },

    /// Service answered without a readable body
    #[error("service returned no body")]
    NoBody,

    /// Call plus stream read exceeded the configured bound
    #[error("generation timed out after {secs}s")]
    Timeout {
        /// Configured bound in seconds
        secs: u64,
    },

    /// Attempt was cancelled
    #[error("generation cancelled")]
    Cancelled,

    /// No generation service configured
    #[error("no generation service configured")]
    Unconfigured,

    /// Attempt state machine rejected a transition
    #[error("invalid generation transition {from:?} -> {to:?}")]
    InvalidTransition {
        /// Current state
        from: GenerationState,
        /// Requested state
        to: GenerationState,
    },
}

impl GenerationError {
    /// Create transport error from any displayable cause
    #[inline]
    pub fn transport(cause: impl std::fmt::Display) -> Self {
        Self::Transport(cause.to_string())
    }

    /// Check if error came from talking to the service
    #[inline]
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Status { .. } | Self::NoBody)
    }

    /// Check if heuristic synthesis may stand in for the service
    #[inline]
    #[must_use]
    pub fn is_fallback_eligible(&self) -> bool {
        matches!(self, Self::Unconfigured)
    }

    /// Check if the attempt was refused before it started
    #[inline]
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Busy | Self::SectionNotFound(_))
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("cannot read {path}: {source}")]
    Io {
        /// Config path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for the schema
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config value out of range
    #[error("invalid value: {0}")]
    Invalid(String),
}

/// Identity provider errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    /// Unknown user or wrong password
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Sign-up for a taken username
    #[error("user already registered: {0}")]
    AlreadyRegistered(String),
}
