//! Folio Core
//!
//! Orchestrates content generation for document sections:
//! - [`config`]: TOML configuration with environment overrides
//! - [`client`] / [`http`]: the text-generation service contract and its HTTP client
//! - [`registry`]: in-flight attempts, concurrency policy and cancellation
//! - [`state`]: the per-attempt state machine
//! - [`orchestrator`]: request, decode, fall back, patch
//! - [`identity`] / [`session`]: the signed-in user's view of one document
//!
//! # Example
//!
//! ```no_run
//! use folio_core::{FolioConfig, InMemoryIdentity, Session};
//! use folio_document::ContentKind;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), folio_core::FolioError> {
//! let identity = Arc::new(InMemoryIdentity::signed_in("local"));
//! let session = Session::new(FolioConfig::default(), identity, None);
//! session.load_document("# Deploy\nFirst build, then ship.").await?;
//! let id = session.sections().await?[0].id;
//! let outcome = session.generate(id, ContentKind::Diagram).await?;
//! println!("{}", outcome.content);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod http;
pub mod identity;
pub mod orchestrator;
pub mod registry;
pub mod session;
pub mod state;

pub use client::{ByteStream, GenerationClient, GenerationPrompt, GenerationResponse};
pub use config::{DocumentConfig, FolioConfig, GenerationConfig, ServiceConfig};
pub use error::{ConfigError, FolioError, GenerationError, IdentityError};
pub use events::{CompletionSource, GenerationEvent};
pub use http::HttpGenerationClient;
pub use identity::{Credentials, IdentityProvider, InMemoryIdentity, User, UserId};
pub use orchestrator::{GenerationOrchestrator, GenerationOutcome};
pub use registry::{Claim, ConcurrencyPolicy, RequestRegistry};
pub use session::Session;
pub use state::{
    allowed_transitions, validate_transition, GenerationRequest, GenerationState, RequestId,
};

/// Folio version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
