//! Session facade
//!
//! One signed-in user working on one in-memory document. Every operation is
//! gated on the identity provider reporting a current user.

use crate::client::GenerationClient;
use crate::config::FolioConfig;
use crate::error::FolioError;
use crate::events::GenerationEvent;
use crate::http::HttpGenerationClient;
use crate::identity::{IdentityProvider, User};
use crate::orchestrator::{GenerationOrchestrator, GenerationOutcome};
use folio_document::{
    segment, ContentField, ContentKind, PatchOutcome, Section, SectionId, SectionStore, SharedStore,
};
use folio_preview::{PreviewDocument, PreviewSurface};
use std::sync::Arc;
use tokio::sync::broadcast;

/// User session over one document
#[derive(Debug)]
pub struct Session {
    config: FolioConfig,
    identity: Arc<dyn IdentityProvider>,
    store: SharedStore,
    orchestrator: GenerationOrchestrator,
}

impl Session {
    /// Create session with an explicit client
    #[must_use]
    pub fn new(
        config: FolioConfig,
        identity: Arc<dyn IdentityProvider>,
        client: Option<Arc<dyn GenerationClient>>,
    ) -> Self {
        let store = SectionStore::shared();
        let orchestrator = GenerationOrchestrator::new(store.clone(), client, &config);
        Self {
            config,
            identity,
            store,
            orchestrator,
        }
    }

    /// Create session, attaching an HTTP client when an endpoint is configured
    ///
    /// # Errors
    /// Returns `FolioError::Generation` if the HTTP client cannot be built
    pub fn from_config(
        config: FolioConfig,
        identity: Arc<dyn IdentityProvider>,
    ) -> Result<Self, FolioError> {
        let client: Option<Arc<dyn GenerationClient>> = if config.service.is_configured() {
            Some(Arc::new(HttpGenerationClient::new(&config.service)?))
        } else {
            None
        };
        Ok(Self::new(config, identity, client))
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &FolioConfig {
        &self.config
    }

    /// Shared section store
    #[inline]
    #[must_use]
    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// Generation orchestrator
    #[inline]
    #[must_use]
    pub fn orchestrator(&self) -> &GenerationOrchestrator {
        &self.orchestrator
    }

    /// Subscribe to generation notifications
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<GenerationEvent> {
        self.orchestrator.subscribe()
    }

    /// Signed-in user, or `Unauthenticated`
    ///
    /// # Errors
    /// Returns `FolioError::Unauthenticated` if nobody is signed in
    pub async fn require_user(&self) -> Result<User, FolioError> {
        self.identity.current_user().await.ok_or(FolioError::Unauthenticated)
    }

    /// Segment `markdown` and replace the document
    ///
    /// In-flight generations are cancelled first. Returns the number of
    /// sections.
    ///
    /// # Errors
    /// Returns `FolioError::Unauthenticated` if nobody is signed in
    pub async fn load_document(&self, markdown: &str) -> Result<usize, FolioError> {
        self.require_user().await?;
        self.orchestrator.cancel_all();

        let sections = segment(markdown);
        let count = sections.len();
        let mut store = self.store.write();
        if self.config.document.preserve_content {
            let carried = store.replace_preserving(sections);
            tracing::info!("Loaded {} sections ({} kept content)", count, carried);
        } else {
            store.replace_all(sections);
            tracing::info!("Loaded {} sections", count);
        }
        Ok(count)
    }

    /// Snapshot of the sections in document order
    ///
    /// # Errors
    /// Returns `FolioError::Unauthenticated` if nobody is signed in
    pub async fn sections(&self) -> Result<Vec<Section>, FolioError> {
        self.require_user().await?;
        Ok(self.store.read().sections().to_vec())
    }

    /// Section at a document position
    ///
    /// # Errors
    /// Returns `FolioError::Unauthenticated` if nobody is signed in
    pub async fn section_at(&self, index: usize) -> Result<Option<Section>, FolioError> {
        self.require_user().await?;
        Ok(self.store.read().sections().get(index).cloned())
    }

    /// Generate content for a section
    ///
    /// # Errors
    /// - `FolioError::Unauthenticated` if nobody is signed in
    /// - `FolioError::Generation` as [`GenerationOrchestrator::generate`]
    pub async fn generate(
        &self,
        section_id: SectionId,
        kind: ContentKind,
    ) -> Result<GenerationOutcome, FolioError> {
        self.require_user().await?;
        Ok(self.orchestrator.generate(section_id, kind).await?)
    }

    /// Manual edit of one field
    ///
    /// # Errors
    /// Returns `FolioError::Unauthenticated` if nobody is signed in
    pub async fn edit(
        &self,
        section_id: SectionId,
        field: ContentField,
        content: impl Into<String> + Send,
    ) -> Result<PatchOutcome, FolioError> {
        self.require_user().await?;
        Ok(self.store.write().patch(section_id, field, content))
    }

    /// Detach content from a section
    ///
    /// # Errors
    /// Returns `FolioError::Unauthenticated` if nobody is signed in
    pub async fn clear(&self, section_id: SectionId) -> Result<PatchOutcome, FolioError> {
        self.require_user().await?;
        Ok(self.store.write().clear_content(section_id))
    }

    /// Preview document for one section
    ///
    /// # Errors
    /// Returns `FolioError::Unauthenticated` if nobody is signed in
    pub async fn preview(
        &self,
        section_id: SectionId,
    ) -> Result<Option<PreviewDocument>, FolioError> {
        self.require_user().await?;
        let store = self.store.read();
        Ok(store
            .get(section_id)
            .map(|section| PreviewDocument::build(&section.content, &self.config.preview)))
    }

    /// Render every section on a surface
    ///
    /// # Errors
    /// - `FolioError::Unauthenticated` if nobody is signed in
    /// - `FolioError::Preview` if the surface fails
    pub async fn render_all<S: PreviewSurface + Send>(
        &self,
        surface: &mut S,
    ) -> Result<Vec<S::Output>, FolioError> {
        self.require_user().await?;
        let sections = self.store.read().sections().to_vec();
        let mut outputs = Vec::with_capacity(sections.len());
        for section in &sections {
            outputs.push(folio_preview::render_section(surface, section, &self.config.preview)?);
        }
        Ok(outputs)
    }

    /// Sign out, cancel generations and discard the document
    pub async fn sign_out(&self) {
        self.orchestrator.cancel_all();
        self.store.write().replace_all(Vec::new());
        self.identity.sign_out().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::InMemoryIdentity;

    fn session(config: FolioConfig) -> Session {
        Session::new(config, Arc::new(InMemoryIdentity::signed_in("local")), None)
    }

    #[tokio::test]
    async fn operations_require_user() {
        let session = Session::new(FolioConfig::default(), Arc::new(InMemoryIdentity::new()), None);
        assert!(session.load_document("# A").await.unwrap_err().is_unauthenticated());
        assert!(session.sections().await.unwrap_err().is_unauthenticated());
        assert!(session
            .edit(SectionId::new(), ContentField::CustomContent, "x")
            .await
            .unwrap_err()
            .is_unauthenticated());
    }

    #[tokio::test]
    async fn load_and_edit() {
        let session = session(FolioConfig::default());
        assert_eq!(session.load_document("intro\n# A\nbody a\n# B\nbody b").await.unwrap(), 3);

        let sections = session.sections().await.unwrap();
        assert_eq!(sections[0].heading, "Introduction");
        let id = sections[1].id;

        assert!(session
            .edit(id, ContentField::CustomContent, "<p>x</p>")
            .await
            .unwrap()
            .is_applied());
        assert_eq!(
            session.section_at(1).await.unwrap().unwrap().custom_content(),
            Some("<p>x</p>")
        );
        assert_eq!(
            session.edit(SectionId::new(), ContentField::CustomContent, "y").await.unwrap(),
            PatchOutcome::Missing
        );

        let preview = session.preview(id).await.unwrap().unwrap();
        assert_eq!(preview.html(), "<p>x</p>");

        assert!(session.clear(id).await.unwrap().is_applied());
        assert!(session.section_at(1).await.unwrap().unwrap().content.is_none());
    }

    #[tokio::test]
    async fn reload_resets_content_by_default() {
        let session = session(FolioConfig::default());
        session.load_document("# A\nbody").await.unwrap();
        let id = session.sections().await.unwrap()[0].id;
        session.edit(id, ContentField::GeneratedMarkup, "graph TD").await.unwrap();

        session.load_document("# A\nbody").await.unwrap();
        let reloaded = session.sections().await.unwrap();
        assert_ne!(reloaded[0].id, id);
        assert!(reloaded[0].content.is_none());
    }

    #[tokio::test]
    async fn reload_preserves_content_when_configured() {
        let session = session(FolioConfig::default().with_preserve_content(true));
        session.load_document("# A\nbody\n# B").await.unwrap();
        let id = session.sections().await.unwrap()[0].id;
        session.edit(id, ContentField::GeneratedMarkup, "graph TD").await.unwrap();

        session.load_document("# A\nedited body\n# C").await.unwrap();
        let reloaded = session.sections().await.unwrap();
        assert_eq!(reloaded[0].generated_markup(), Some("graph TD"));
        assert!(reloaded[1].content.is_none());
    }

    #[tokio::test]
    async fn sign_out_discards_document() {
        let session = session(FolioConfig::default());
        session.load_document("# A").await.unwrap();
        session.sign_out().await;
        assert!(session.store().read().is_empty());
        assert!(session.sections().await.is_err());
    }
}
