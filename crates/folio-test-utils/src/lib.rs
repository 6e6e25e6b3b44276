//! Testing utilities for the Folio workspace
//!
//! Shared fixtures and a scripted generation client.

#![allow(missing_docs)]

use async_trait::async_trait;
use bytes::Bytes;
use folio_core::{
    FolioConfig, GenerationClient, GenerationError, GenerationPrompt, GenerationResponse,
    InMemoryIdentity, Session,
};
use futures::stream;
use futures::StreamExt;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

pub const SAMPLE_DOCUMENT: &str = "\
Folio turns notes into diagrams.

# Release Process
First the branch is frozen by the release manager. Then the build is verified on staging.
Finally the artifacts are published to the registry.

## Architecture
The system has a gateway service and a worker component backed by a queue.

## Options
Compare the hosted plan versus the self-managed plan.
";

/// One `0:` text-delta line
pub fn delta_line(fragment: &str) -> String {
    format!(
        "0:{}\n",
        serde_json::json!({ "type": "text-delta", "delta": fragment })
    )
}

/// Stream body chunks, one delta line each
pub fn delta_chunks(fragments: &[&str]) -> Vec<Bytes> {
    fragments.iter().map(|f| Bytes::from(delta_line(f))).collect()
}

/// Session with a signed-in local user
pub fn signed_in_session(
    config: FolioConfig,
    client: Option<Arc<dyn GenerationClient>>,
) -> Session {
    Session::new(config, Arc::new(InMemoryIdentity::signed_in("tester")), client)
}

#[derive(Debug, Clone)]
pub enum Reply {
    /// Stream the chunks, then end
    Stream(Vec<Bytes>),
    /// Stream the chunks, then fail with the error
    StreamThenFail(Vec<Bytes>, GenerationError),
    /// Whole body at once
    Complete(Bytes),
    /// Call fails
    Fail(GenerationError),
    /// Never answer
    Hang,
}

/// Generation client replaying a fixed reply
#[derive(Debug)]
pub struct ScriptedClient {
    reply: Reply,
    call_delay: Duration,
    chunk_delay: Duration,
    gate: Option<Arc<Notify>>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<GenerationPrompt>>,
}

impl ScriptedClient {
    pub fn new(reply: Reply) -> Self {
        Self {
            reply,
            call_delay: Duration::ZERO,
            chunk_delay: Duration::ZERO,
            gate: None,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn streaming(fragments: &[&str]) -> Self {
        Self::new(Reply::Stream(delta_chunks(fragments)))
    }

    pub fn complete(body: impl Into<Bytes>) -> Self {
        Self::new(Reply::Complete(body.into()))
    }

    pub fn failing(error: GenerationError) -> Self {
        Self::new(Reply::Fail(error))
    }

    pub fn status(code: u16) -> Self {
        Self::failing(GenerationError::Status { code })
    }

    pub fn hanging() -> Self {
        Self::new(Reply::Hang)
    }

    /// Wait before answering the call
    #[must_use]
    pub fn with_call_delay(mut self, delay: Duration) -> Self {
        self.call_delay = delay;
        self
    }

    /// Wait before each streamed chunk
    #[must_use]
    pub fn with_chunk_delay(mut self, delay: Duration) -> Self {
        self.chunk_delay = delay;
        self
    }

    /// Hold the answer until the gate is notified
    #[must_use]
    pub fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<GenerationPrompt> {
        self.prompts.lock().clone()
    }

    fn chunk_stream(
        &self,
        chunks: Vec<Bytes>,
        tail: Option<GenerationError>,
    ) -> GenerationResponse {
        let delay = self.chunk_delay;
        let items = chunks
            .into_iter()
            .map(Ok)
            .chain(tail.map(Err))
            .collect::<Vec<Result<Bytes, GenerationError>>>();
        let body = stream::iter(items).then(move |item| async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            item
        });
        GenerationResponse::Streamed(Box::pin(body))
    }
}

#[async_trait]
impl GenerationClient for ScriptedClient {
    async fn generate(
        &self,
        prompt: &GenerationPrompt,
    ) -> Result<GenerationResponse, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().push(prompt.clone());

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if !self.call_delay.is_zero() {
            tokio::time::sleep(self.call_delay).await;
        }

        match self.reply.clone() {
            Reply::Stream(chunks) => Ok(self.chunk_stream(chunks, None)),
            Reply::StreamThenFail(chunks, error) => Ok(self.chunk_stream(chunks, Some(error))),
            Reply::Complete(body) => Ok(GenerationResponse::Complete(body)),
            Reply::Fail(error) => Err(error),
            Reply::Hang => futures::future::pending().await,
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
