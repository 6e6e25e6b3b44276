//! Text-generation service contract
//!
//! One call per attempt. The response body is either a byte stream in the
//! `0:`-line protocol or a single complete value; both go through the same
//! decoder.

use crate::error::GenerationError;
use async_trait::async_trait;
use bytes::Bytes;
use folio_document::{ContentKind, Section};
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

/// Response body stream
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, GenerationError>> + Send>>;

/// Request payload sent to the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationPrompt {
    /// Requested kind
    pub kind: ContentKind,
    /// Section heading
    pub heading: String,
    /// Section body
    pub body: String,
}

impl GenerationPrompt {
    /// Build the prompt for a section
    #[must_use]
    pub fn for_section(section: &Section, kind: ContentKind) -> Self {
        Self {
            kind,
            heading: section.heading.clone(),
            body: section.body.clone(),
        }
    }
}

/// Service response body
pub enum GenerationResponse {
    /// Incrementally delivered bytes
    Streamed(ByteStream),
    /// Whole body at once
    Complete(Bytes),
}

impl std::fmt::Debug for GenerationResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Streamed(_) => f.write_str("Streamed(..)"),
            Self::Complete(body) => f.debug_tuple("Complete").field(&body.len()).finish(),
        }
    }
}

/// External text-generation service
#[async_trait]
pub trait GenerationClient: Send + Sync + std::fmt::Debug {
    /// Issue one generation call
    ///
    /// # Errors
    /// - `GenerationError::Transport` if the call fails
    /// - `GenerationError::Status` for a non-success status
    /// - `GenerationError::NoBody` if there is nothing to read
    async fn generate(
        &self,
        prompt: &GenerationPrompt,
    ) -> Result<GenerationResponse, GenerationError>;

    /// Name used in logs
    fn name(&self) -> &str {
        "service"
    }
}
