//! Command handlers for the `shelfport` binary.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;

use shelfport::{
    AcquisitionLink, AcquisitionPipeline, Collaborators, FluentTranslator, HttpClient,
    HttpDownloader, HttpProbe, JsonRepository, LocalImporter, PublicationRepository,
    RemotePublicationView, SnapshotPackager, Toast, ToastBus,
};

use crate::config::ShelfConfig;

/// Arguments of `shelfport import`.
#[derive(Debug, Clone, Default)]
pub struct ImportArgs {
    pub url: String,
    pub content_type: Option<String>,
    pub title: Option<String>,
    pub passphrase: Option<String>,
    pub publication: Option<PathBuf>,
}

impl ImportArgs {
    pub fn link(&self) -> AcquisitionLink {
        let mut link = AcquisitionLink::new(self.url.clone());
        if let Some(content_type) = &self.content_type {
            link = link.with_type(content_type.clone());
        }
        if let Some(title) = &self.title {
            link = link.with_title(title.clone());
        }
        if let Some(passphrase) = &self.passphrase {
            link = link.with_lcp_passphrase(passphrase.clone());
        }
        link
    }
}

/// Wire the reference collaborators for `config`.
pub fn open_pipeline(config: &ShelfConfig, toasts: &ToastBus) -> AcquisitionPipeline {
    tracing::debug!(library = %config.library_dir.display(), "opening library");
    let http = HttpClient::new(config.timeout_ms);
    AcquisitionPipeline::new(Collaborators {
        probe: Arc::new(HttpProbe::new(http.clone())),
        downloader: Arc::new(HttpDownloader::new(http.clone(), &config.download_dir)),
        packager: Arc::new(SnapshotPackager::new(http, &config.package_dir)),
        importer: Arc::new(LocalImporter::new(&config.library_dir)),
        repository: Arc::new(JsonRepository::open(&config.library_dir)),
        notifier: Arc::new(toasts.clone()),
        translator: Arc::new(FluentTranslator::new(Some(&config.locale))),
    })
}

/// Read a catalog view from a JSON file.
pub fn read_view(path: &Path) -> anyhow::Result<RemotePublicationView> {
    let raw = std::fs::read(path)
        .with_context(|| format!("Failed to read publication file {}", path.display()))?;
    serde_json::from_slice(&raw)
        .with_context(|| format!("Invalid publication file {}", path.display()))
}

/// Import one link. Returns whether a publication was stored.
pub async fn run_import(config: &ShelfConfig, args: &ImportArgs) -> anyhow::Result<bool> {
    let view = args.publication.as_deref().map(read_view).transpose()?;

    let toasts = ToastBus::new();
    let mut received = toasts.subscribe();
    let pipeline = open_pipeline(config, &toasts);

    let stored = pipeline.import_from_link(&args.link(), view.as_ref()).await;

    while let Ok(toast) = received.try_recv() {
        print_toast(&toast);
    }

    match stored {
        Some(stored) => {
            println!("{}", serde_json::to_string_pretty(&stored)?);
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Show how a link would be acquired.
pub async fn run_probe(
    config: &ShelfConfig,
    url: &str,
    content_type: Option<&str>,
) -> anyhow::Result<()> {
    let pipeline = open_pipeline(config, &ToastBus::new());
    let mut link = AcquisitionLink::new(url);
    if let Some(content_type) = content_type {
        link = link.with_type(content_type);
    }

    let (resolved, strategy) = pipeline.plan(&link).await?;
    let categories: Vec<String> = resolved
        .types
        .categories()
        .iter()
        .map(ToString::to_string)
        .collect();
    let report = serde_json::json!({
        "url": resolved.url.as_str(),
        "content_type": resolved.content_type,
        "probed": resolved.was_probed(),
        "categories": categories,
        "strategy": strategy.to_string(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// List stored publications.
pub async fn run_list(config: &ShelfConfig, json: bool) -> anyhow::Result<()> {
    let repository = JsonRepository::open(&config.library_dir);
    let records = repository.list().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }
    if records.is_empty() {
        println!("No publications in {}", config.library_dir.display());
        return Ok(());
    }
    for record in &records {
        let tags = record.publication.tags.join(", ");
        println!(
            "{}  {}  [{}]  {}",
            record.id,
            record.publication.title,
            tags,
            record.created_at.to_rfc3339()
        );
    }
    Ok(())
}

fn print_toast(toast: &Toast) {
    eprintln!("[{:?}] {}", toast.kind, toast.message);
}
