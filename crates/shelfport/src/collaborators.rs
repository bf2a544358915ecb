//! Boundaries the pipeline depends on.
//!
//! Each trait is implemented by a reference collaborator in this crate
//! (`http`, `library`, `i18n`, `notify`) and by recording fakes in tests.
//! Returning `Ok(None)` or an empty list is a soft failure: the pipeline
//! stops quietly. Returning `Err` is a hard failure and ends in a toast.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use url::Url;

use crate::notify::Toast;
use crate::types::{DownloadRequest, ImportedPublication, PersistedPublication, ShelfResult};

/// Looks up the media type a server reports for a URL.
#[async_trait]
pub trait ContentTypeProbe: Send + Sync {
    /// Return the `Content-Type` header, or `None` when absent.
    async fn probe(&self, url: &Url) -> ShelfResult<Option<String>>;
}

/// Fetches remote resources into local storage.
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Download every request; one path per request, in order.
    async fn download(&self, requests: Vec<DownloadRequest>, title: &str)
        -> ShelfResult<Vec<PathBuf>>;
}

/// Turns an HTML page or JSON manifest into a single local file.
#[async_trait]
pub trait Packager: Send + Sync {
    async fn package(&self, url: &str, is_html: bool) -> ShelfResult<Option<PathBuf>>;
}

/// Parses a local file into a publication.
#[async_trait]
pub trait FsImporter: Send + Sync {
    async fn import(
        &self,
        path: &Path,
        lcp_hashed_passphrase: Option<&str>,
    ) -> ShelfResult<Option<ImportedPublication>>;

    /// Release whatever `import` kept for a publication that was never
    /// stored. Best effort.
    async fn discard(&self, _publication: &ImportedPublication) {}
}

/// Durable publication store.
#[async_trait]
pub trait PublicationRepository: Send + Sync {
    /// Store a record and return it with its assigned identity.
    async fn save(&self, publication: ImportedPublication) -> ShelfResult<PersistedPublication>;

    /// All stored records, oldest first.
    async fn list(&self) -> ShelfResult<Vec<PersistedPublication>>;
}

/// User notification channel. Fire-and-forget.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, toast: Toast);
}

/// Substitution parameters for a localized message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageArgs {
    pub path: Option<String>,
    pub err: Option<String>,
}

/// Resolves a message key to user-facing text.
pub trait Translator: Send + Sync {
    fn translate(&self, key: &str, args: &MessageArgs) -> String;
}
