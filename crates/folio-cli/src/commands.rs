//! Subcommand implementations

use anyhow::{bail, Context};
use folio_core::{FolioConfig, GenerationEvent, InMemoryIdentity, Session};
use folio_document::{render_markdown, ContentKind, Section};
use folio_preview::{DirectorySurface, PreviewSurface, SandboxPolicy};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Local user the CLI signs in as
const LOCAL_USER: &str = "local";

/// Output format for `folio sections`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ListFormat {
    Table,
    Json,
    Markdown,
}

/// Arguments of `folio generate`
#[derive(Debug, Clone)]
pub(crate) struct GenerateArgs {
    pub(crate) file: PathBuf,
    pub(crate) section: usize,
    pub(crate) kind: ContentKind,
    pub(crate) config: Option<PathBuf>,
    pub(crate) out: Option<PathBuf>,
}

/// Arguments of `folio preview`
#[derive(Debug, Clone)]
pub(crate) struct PreviewArgs {
    pub(crate) file: PathBuf,
    pub(crate) out: PathBuf,
    pub(crate) kind: ContentKind,
    pub(crate) config: Option<PathBuf>,
}

fn load_config(path: Option<&Path>) -> anyhow::Result<FolioConfig> {
    let config = match path {
        Some(path) => FolioConfig::load(path)?,
        None => FolioConfig::new().with_env()?,
    };
    Ok(config)
}

async fn open(file: &Path, config: FolioConfig, with_service: bool) -> anyhow::Result<Session> {
    let markdown =
        std::fs::read_to_string(file).with_context(|| format!("cannot read {}", file.display()))?;
    let identity = Arc::new(InMemoryIdentity::signed_in(LOCAL_USER));
    let session = if with_service {
        Session::from_config(config, identity)?
    } else {
        Session::new(config, identity, None)
    };
    session.load_document(&markdown).await?;
    Ok(session)
}

fn table(sections: &[Section]) -> String {
    let mut out = String::new();
    for (index, section) in sections.iter().enumerate() {
        let marker = if section.is_introduction() {
            "-".to_string()
        } else {
            "#".repeat(usize::from(section.level))
        };
        let _ = writeln!(
            out,
            "{index:>3}  {marker:<6} {}  ({} chars)",
            section.heading,
            section.body.chars().count()
        );
    }
    out
}

/// `folio sections`
pub(crate) async fn sections(file: &Path, format: ListFormat) -> anyhow::Result<String> {
    let session = open(file, FolioConfig::new(), false).await?;
    let sections = session.sections().await?;
    Ok(match format {
        ListFormat::Table => table(&sections),
        ListFormat::Json => serde_json::to_string_pretty(&sections)? + "\n",
        ListFormat::Markdown => render_markdown(&sections),
    })
}

/// `folio generate`
///
/// Returns the generated content, or the preview path when `--out` is given.
pub(crate) async fn generate(args: &GenerateArgs) -> anyhow::Result<String> {
    let config = load_config(args.config.as_deref())?;
    let session = open(&args.file, config, true).await?;

    let Some(section) = session.section_at(args.section).await? else {
        let count = session.sections().await?.len();
        bail!("section {} out of range ({} sections)", args.section, count);
    };

    let mut events = session.subscribe();
    let watcher = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            if let GenerationEvent::Progress { bytes, chars, .. } = event {
                tracing::debug!("Received {} bytes, {} chars decoded", bytes, chars);
            }
            if event.is_terminal() {
                break;
            }
        }
    });

    let outcome = session.generate(section.id, args.kind).await?;
    watcher.abort();
    tracing::info!("'{}' completed from {:?}", section.heading, outcome.source);

    match &args.out {
        Some(dir) => {
            let Some(document) = session.preview(section.id).await? else {
                bail!("section {} disappeared", args.section);
            };
            let policy =
                SandboxPolicy::with_tokens(session.config().preview.sandbox.iter().copied());
            let mut surface = DirectorySurface::create(dir, policy)?;
            let current = session.section_at(args.section).await?.unwrap_or(section);
            surface.render(&current, &document)?;
            let index = surface.finish()?;
            Ok(index.display().to_string())
        }
        None => Ok(outcome.content),
    }
}

/// `folio preview`
///
/// Always synthesizes locally. Returns the host page path.
pub(crate) async fn preview(args: &PreviewArgs) -> anyhow::Result<PathBuf> {
    let config = load_config(args.config.as_deref())?;
    let session = open(&args.file, config, false).await?;

    for section in session.sections().await? {
        session.generate(section.id, args.kind).await?;
    }

    let policy = SandboxPolicy::with_tokens(session.config().preview.sandbox.iter().copied());
    let mut surface = DirectorySurface::create(&args.out, policy)?;
    let written = session.render_all(&mut surface).await?;
    tracing::info!("Wrote {} previews", written.len());
    Ok(surface.finish()?)
}
