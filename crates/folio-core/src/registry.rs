//! In-flight request registry
//!
//! Tracks every running generation attempt keyed by section:
//! - Claim a slot according to the [`ConcurrencyPolicy`]
//! - Cancel one attempt or all of them through their tokens
//! - Release automatically when the [`Claim`] is dropped

use crate::error::GenerationError;
use crate::state::RequestId;
use dashmap::DashMap;
use folio_document::{ContentKind, SectionId};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// Which in-flight attempts block a new one
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConcurrencyPolicy {
    /// Any in-flight attempt blocks every other
    #[default]
    Exclusive,
    /// Only an attempt on the same section blocks
    PerSection,
}

/// Registry entry for a running attempt
#[derive(Debug)]
struct InFlight {
    request_id: RequestId,
    kind: ContentKind,
    started: Instant,
    token: CancellationToken,
}

/// Per-section map of running attempts
#[derive(Debug)]
pub struct RequestRegistry {
    policy: ConcurrencyPolicy,
    in_flight: DashMap<SectionId, InFlight>,
    /// Serializes check-then-insert so the exclusive policy cannot race
    claim_lock: Mutex<()>,
}

impl RequestRegistry {
    /// Create new registry
    #[inline]
    #[must_use]
    pub fn new(policy: ConcurrencyPolicy) -> Self {
        Self {
            policy,
            in_flight: DashMap::new(),
            claim_lock: Mutex::new(()),
        }
    }

    /// Active policy
    #[inline]
    #[must_use]
    pub fn policy(&self) -> ConcurrencyPolicy {
        self.policy
    }

    /// Claim a slot for `section_id`
    ///
    /// # Errors
    /// - `GenerationError::Busy` if the policy refuses the claim
    pub fn claim(
        self: &Arc<Self>,
        section_id: SectionId,
        kind: ContentKind,
    ) -> Result<Claim, GenerationError> {
        let _guard = self.claim_lock.lock();

        let blocked = match self.policy {
            ConcurrencyPolicy::Exclusive => !self.in_flight.is_empty(),
            ConcurrencyPolicy::PerSection => self.in_flight.contains_key(&section_id),
        };
        if blocked {
            tracing::debug!(
                "Claim for section {} refused ({} in flight)",
                section_id,
                self.in_flight.len()
            );
            return Err(GenerationError::Busy);
        }

        let request_id = RequestId::new();
        let token = CancellationToken::new();
        self.in_flight.insert(
            section_id,
            InFlight {
                request_id,
                kind,
                started: Instant::now(),
                token: token.clone(),
            },
        );

        Ok(Claim {
            registry: Arc::clone(self),
            section_id,
            request_id,
            token,
        })
    }

    /// Cancel the attempt on one section
    ///
    /// Returns whether an attempt was running.
    pub fn cancel(&self, section_id: SectionId) -> bool {
        match self.in_flight.get(&section_id) {
            Some(entry) => {
                tracing::info!(
                    "Cancelling {} generation {} for section {} after {:?}",
                    entry.kind,
                    entry.request_id,
                    section_id,
                    entry.started.elapsed()
                );
                entry.token.cancel();
                true
            }
            None => false,
        }
    }

    /// Cancel every running attempt
    ///
    /// Returns the number of attempts signalled.
    pub fn cancel_all(&self) -> usize {
        let mut cancelled = 0;
        for entry in &self.in_flight {
            entry.token.cancel();
            cancelled += 1;
        }
        if cancelled > 0 {
            tracing::info!("Cancelled {} in-flight generations", cancelled);
        }
        cancelled
    }

    /// Number of running attempts
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.in_flight.len()
    }

    /// Check if nothing is running
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.in_flight.is_empty()
    }

    fn release(&self, section_id: SectionId, request_id: RequestId) {
        if self
            .in_flight
            .remove_if(&section_id, |_, entry| entry.request_id == request_id)
            .is_some()
        {
            tracing::debug!("Released generation {} for section {}", request_id, section_id);
        }
    }
}

/// Held slot in the registry, released on drop
#[derive(Debug)]
pub struct Claim {
    registry: Arc<RequestRegistry>,
    section_id: SectionId,
    request_id: RequestId,
    token: CancellationToken,
}

impl Claim {
    /// Claimed section
    #[inline]
    #[must_use]
    pub fn section_id(&self) -> SectionId {
        self.section_id
    }

    /// Attempt id
    #[inline]
    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Cancellation token for the attempt
    #[inline]
    #[must_use]
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl Drop for Claim {
    fn drop(&mut self) {
        self.registry.release(self.section_id, self.request_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exclusive_blocks_any_second_claim() {
        let registry = Arc::new(RequestRegistry::new(ConcurrencyPolicy::Exclusive));
        let a = SectionId::new();
        let b = SectionId::new();

        let claim = registry.claim(a, ContentKind::Diagram).unwrap();
        assert_eq!(registry.claim(b, ContentKind::Diagram).unwrap_err(), GenerationError::Busy);
        assert_eq!(registry.len(), 1);

        drop(claim);
        assert!(registry.is_empty());
        assert!(registry.claim(b, ContentKind::Diagram).is_ok());
    }

    #[test]
    fn per_section_blocks_same_section_only() {
        let registry = Arc::new(RequestRegistry::new(ConcurrencyPolicy::PerSection));
        let a = SectionId::new();
        let b = SectionId::new();

        let _first = registry.claim(a, ContentKind::Diagram).unwrap();
        let _second = registry.claim(b, ContentKind::Animation).unwrap();
        assert_eq!(registry.len(), 2);
        assert!(registry.claim(a, ContentKind::Animation).is_err());
    }

    #[test]
    fn cancel_signals_token_and_drop_releases() {
        let registry = Arc::new(RequestRegistry::new(ConcurrencyPolicy::PerSection));
        let a = SectionId::new();
        let b = SectionId::new();
        let first = registry.claim(a, ContentKind::Diagram).unwrap();
        let second = registry.claim(b, ContentKind::Diagram).unwrap();

        assert!(registry.cancel(a));
        assert!(first.token().is_cancelled());
        assert!(!second.token().is_cancelled());
        assert!(!registry.cancel(SectionId::new()));

        assert_eq!(registry.cancel_all(), 2);
        assert!(second.token().is_cancelled());

        drop(first);
        drop(second);
        assert!(registry.is_empty());
    }

    #[test]
    fn stale_claim_does_not_release_newer_entry() {
        let registry = Arc::new(RequestRegistry::new(ConcurrencyPolicy::PerSection));
        let a = SectionId::new();
        let first = registry.claim(a, ContentKind::Animation).unwrap();
        let first_id = first.request_id();
        drop(first);

        let second = registry.claim(a, ContentKind::Diagram).unwrap();
        assert_ne!(second.request_id(), first_id);
        registry.release(a, first_id);
        assert_eq!(registry.len(), 1);
        assert!(registry.cancel(a));
        assert!(second.token().is_cancelled());
    }
}
