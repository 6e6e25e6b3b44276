//! Generation orchestrator
//!
//! Drives one attempt per `generate` call:
//! 1. Claim a slot in the request registry (or reject)
//! 2. Call the service and decode its body incrementally
//! 3. Fall back to heuristic synthesis when the service is absent or its
//!    output is unusable
//! 4. Patch the result into the section store and release the slot
//!
//! Failures never write to the store. Store locks are taken only between
//! suspension points.

use crate::client::{GenerationClient, GenerationPrompt, GenerationResponse};
use crate::config::{FolioConfig, GenerationConfig};
use crate::error::GenerationError;
use crate::events::{CompletionSource, GenerationEvent};
use crate::registry::{Claim, RequestRegistry};
use crate::state::{GenerationRequest, GenerationState};
use folio_document::{ContentKind, PatchOutcome, Section, SectionId, SharedStore};
use folio_stream::{decode_single, decode_stream_with, DecodeStats, Decoded};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

/// Result of a completed attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOutcome {
    /// Target section
    pub section_id: SectionId,
    /// Requested kind
    pub kind: ContentKind,
    /// Content origin
    pub source: CompletionSource,
    /// Content written
    pub content: String,
    /// Whether the section still existed when the result landed
    pub applied: bool,
    /// Decoder counters for service output
    pub stats: Option<DecodeStats>,
}

/// Generation orchestrator
#[derive(Debug)]
pub struct GenerationOrchestrator {
    store: SharedStore,
    client: Option<Arc<dyn GenerationClient>>,
    registry: Arc<RequestRegistry>,
    events: broadcast::Sender<GenerationEvent>,
    config: GenerationConfig,
    timeout: Duration,
}

impl GenerationOrchestrator {
    /// Create new orchestrator
    ///
    /// `client` is `None` when no service is configured.
    #[must_use]
    pub fn new(
        store: SharedStore,
        client: Option<Arc<dyn GenerationClient>>,
        config: &FolioConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(config.generation.event_capacity.max(1));
        Self {
            store,
            client,
            registry: Arc::new(RequestRegistry::new(config.generation.concurrency)),
            events,
            config: config.generation.clone(),
            timeout: config.service.timeout(),
        }
    }

    /// Subscribe to attempt notifications
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<GenerationEvent> {
        self.events.subscribe()
    }

    /// In-flight registry
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &RequestRegistry {
        &self.registry
    }

    /// Check if a service client is attached
    #[inline]
    #[must_use]
    pub fn has_client(&self) -> bool {
        self.client.is_some()
    }

    /// Check if any attempt is running
    #[inline]
    #[must_use]
    pub fn is_busy(&self) -> bool {
        !self.registry.is_empty()
    }

    /// Cancel the attempt on one section
    pub fn cancel(&self, section_id: SectionId) -> bool {
        self.registry.cancel(section_id)
    }

    /// Cancel every running attempt
    pub fn cancel_all(&self) -> usize {
        self.registry.cancel_all()
    }

    /// Generate content of `kind` for a section
    ///
    /// # Errors
    /// - `GenerationError::SectionNotFound` if the section does not exist
    /// - `GenerationError::Busy` if the registry refuses the claim
    /// - `GenerationError::Unconfigured` if there is no service and fallback
    ///   is disabled
    /// - transport, status, body, timeout and cancellation errors from the
    ///   service call
    pub async fn generate(
        &self,
        section_id: SectionId,
        kind: ContentKind,
    ) -> Result<GenerationOutcome, GenerationError> {
        let result = self.attempt(section_id, kind).await;
        if let Err(error) = &result {
            let event = if error.is_rejection() {
                GenerationEvent::Rejected {
                    section_id,
                    error: error.clone(),
                }
            } else {
                GenerationEvent::Failed {
                    section_id,
                    error: error.clone(),
                }
            };
            self.emit(event);
        }
        result
    }

    async fn attempt(
        &self,
        section_id: SectionId,
        kind: ContentKind,
    ) -> Result<GenerationOutcome, GenerationError> {
        let section = self.store.read().get(section_id).cloned();
        let Some(section) = section else {
            tracing::warn!("Generation requested for missing section {}", section_id);
            return Err(GenerationError::SectionNotFound(section_id));
        };

        let claim = match self.registry.claim(section_id, kind) {
            Ok(claim) => claim,
            Err(error) => {
                tracing::info!("Generation for '{}' rejected: {}", section.heading, error);
                return Err(error);
            }
        };

        let mut request = GenerationRequest::new(claim.request_id(), section_id, kind);
        request.advance(GenerationState::Requesting)?;
        tracing::info!("Generating {} for '{}' ({})", kind, section.heading, request.id);
        self.emit(GenerationEvent::Started { section_id, kind });

        let result = match &self.client {
            Some(client) => self.run_service(client.as_ref(), &claim, &mut request, &section).await,
            None => Err(GenerationError::Unconfigured),
        };

        match result {
            Err(error)
                if error.is_fallback_eligible() && self.config.fallback_when_unconfigured =>
            {
                tracing::info!(
                    "No generation service configured, synthesizing '{}'",
                    section.heading
                );
                let content = synthesize(kind, &section);
                self.complete(&mut request, content, CompletionSource::Heuristic, None)
            }
            Err(error) => {
                request.fail();
                tracing::warn!(
                    "Generation {} for '{}' failed: {}",
                    request.id,
                    section.heading,
                    error
                );
                Err(error)
            }
            ok => ok,
        }
    }

    async fn run_service(
        &self,
        client: &dyn GenerationClient,
        claim: &Claim,
        request: &mut GenerationRequest,
        section: &Section,
    ) -> Result<GenerationOutcome, GenerationError> {
        let prompt = GenerationPrompt::for_section(section, request.kind);
        let token = claim.token().clone();
        let secs = self.timeout.as_secs();

        let decoded = {
            let work = self.call_and_decode(client, &prompt, request);
            tokio::select! {
                biased;
                () = token.cancelled() => Err(GenerationError::Cancelled),
                result = tokio::time::timeout(self.timeout, work) => {
                    result.unwrap_or(Err(GenerationError::Timeout { secs }))
                }
            }
        }?;

        tracing::debug!(
            "Decoded {} lines ({} deltas, {} skipped) from {}",
            decoded.stats.lines,
            decoded.stats.deltas,
            decoded.stats.skipped,
            client.name()
        );

        if decoded.is_empty() && self.config.fallback_on_unusable_output {
            tracing::warn!(
                "Service output for '{}' unusable, synthesizing instead",
                section.heading
            );
            let content = synthesize(request.kind, section);
            return self.complete(
                request,
                content,
                CompletionSource::Heuristic,
                Some(decoded.stats),
            );
        }

        let stats = decoded.stats;
        self.complete(request, decoded.text, CompletionSource::Service, Some(stats))
    }

    async fn call_and_decode(
        &self,
        client: &dyn GenerationClient,
        prompt: &GenerationPrompt,
        request: &mut GenerationRequest,
    ) -> Result<Decoded, GenerationError> {
        let response = client.generate(prompt).await?;
        request.advance(GenerationState::Streaming)?;
        let section_id = request.section_id;

        match response {
            GenerationResponse::Complete(body) => {
                let decoded = decode_single(&body);
                self.emit(GenerationEvent::Progress {
                    section_id,
                    bytes: decoded.stats.bytes,
                    chars: decoded.raw.chars().count(),
                });
                Ok(decoded)
            }
            GenerationResponse::Streamed(stream) => {
                decode_stream_with(stream, |decoder| {
                    self.emit(GenerationEvent::Progress {
                        section_id,
                        bytes: decoder.stats().bytes,
                        chars: decoder.payload().chars().count(),
                    });
                })
                .await
            }
        }
    }

    fn complete(
        &self,
        request: &mut GenerationRequest,
        content: String,
        source: CompletionSource,
        stats: Option<DecodeStats>,
    ) -> Result<GenerationOutcome, GenerationError> {
        request.advance(GenerationState::Completed)?;

        let outcome = self
            .store
            .write()
            .patch(request.section_id, request.kind.field(), content.as_str());
        if outcome == PatchOutcome::Missing {
            tracing::info!(
                "Section {} was replaced before generation {} landed",
                request.section_id,
                request.id
            );
        } else {
            tracing::info!(
                "Generation {} completed from {:?} ({} chars)",
                request.id,
                source,
                content.chars().count()
            );
        }

        self.emit(GenerationEvent::Completed {
            section_id: request.section_id,
            kind: request.kind,
            source,
        });

        Ok(GenerationOutcome {
            section_id: request.section_id,
            kind: request.kind,
            source,
            content,
            applied: outcome.is_applied(),
            stats,
        })
    }

    fn emit(&self, event: GenerationEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

fn synthesize(kind: ContentKind, section: &Section) -> String {
    folio_synth::synthesize_for(kind, section)
}
