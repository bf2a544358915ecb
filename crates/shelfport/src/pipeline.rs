//! The acquisition pipeline.
//!
//! Resolve → classify → package or download → import → merge → persist,
//! awaited one step at a time. A packaged file enters the import tail
//! exactly like a downloaded one; the tail has no way back to the
//! classifier, so packaged output is never packaged again.

use std::path::Path;
use std::sync::Arc;

use crate::acquire;
use crate::collaborators::{
    ContentTypeProbe, Downloader, FsImporter, Notifier, Packager, PublicationRepository,
    Translator,
};
use crate::merge::merge_publication;
use crate::notify::Toast;
use crate::resolver::{self, ResolvedLink};
use crate::strategy::{self, Strategy};
use crate::types::{
    AcquisitionLink, PersistedPublication, RemotePublicationView, ShelfError, ShelfResult,
};

/// Everything the pipeline talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub probe: Arc<dyn ContentTypeProbe>,
    pub downloader: Arc<dyn Downloader>,
    pub packager: Arc<dyn Packager>,
    pub importer: Arc<dyn FsImporter>,
    pub repository: Arc<dyn PublicationRepository>,
    pub notifier: Arc<dyn Notifier>,
    pub translator: Arc<dyn Translator>,
}

/// Imports remote publications into the repository.
#[derive(Clone)]
pub struct AcquisitionPipeline {
    inner: Collaborators,
}

impl AcquisitionPipeline {
    pub fn new(collaborators: Collaborators) -> Self {
        Self {
            inner: collaborators,
        }
    }

    /// Import a link, containing every failure.
    ///
    /// Returns the stored publication, or `None`. A hard failure raises
    /// exactly one error toast before `None` is returned; a soft failure
    /// (nothing downloaded, packaged or imported) is only logged.
    pub async fn import_from_link(
        &self,
        link: &AcquisitionLink,
        view: Option<&RemotePublicationView>,
    ) -> Option<PersistedPublication> {
        match self.acquire(link, view).await {
            Ok(Some(stored)) => Some(stored),
            Ok(None) => {
                tracing::warn!(url = %link.url, "nothing imported");
                None
            }
            Err(e) => {
                self.report_failure(link, &e).await;
                None
            }
        }
    }

    /// Uncontained pipeline: hard failures come back as `Err`.
    pub async fn acquire(
        &self,
        link: &AcquisitionLink,
        view: Option<&RemotePublicationView>,
    ) -> ShelfResult<Option<PersistedPublication>> {
        let (resolved, strategy) = self.plan(link).await?;

        let acquired = acquire::execute(
            &resolved,
            strategy,
            self.inner.downloader.as_ref(),
            self.inner.packager.as_ref(),
        )
        .await?;

        match acquired {
            Some(acquired) => {
                tracing::debug!(%acquired, "importing");
                self.import_link_from_path(acquired.path(), acquired.link(), view)
                    .await
            }
            None => Ok(None),
        }
    }

    /// Resolve the link and pick its strategy without fetching anything
    /// beyond the optional type probe.
    pub async fn plan(&self, link: &AcquisitionLink) -> ShelfResult<(ResolvedLink, Strategy)> {
        let resolved = resolver::resolve(link, self.inner.probe.as_ref()).await?;
        let strategy = strategy::classify(&resolved.types);
        tracing::debug!(
            url = %resolved.url,
            types = %resolved.types,
            %strategy,
            "classified link"
        );
        Ok((resolved, strategy))
    }

    /// Import tail shared by both strategies: import, merge, persist.
    pub async fn import_link_from_path(
        &self,
        path: &Path,
        link: &AcquisitionLink,
        view: Option<&RemotePublicationView>,
    ) -> ShelfResult<Option<PersistedPublication>> {
        let imported = self
            .inner
            .importer
            .import(path, link.lcp_hashed_passphrase())
            .await?;

        let Some(imported) = imported else {
            tracing::warn!(path = %path.display(), "importer produced no publication");
            return Ok(None);
        };

        let merged = merge_publication(imported, view);
        let stored = match self.inner.repository.save(merged.clone()).await {
            Ok(stored) => stored,
            Err(e) => {
                self.inner.importer.discard(&merged).await;
                return Err(e);
            }
        };
        tracing::info!(
            id = %stored.id,
            title = %stored.publication.title,
            url = %link.url,
            "publication stored"
        );
        Ok(Some(stored))
    }

    /// Raise the failure toast for `link`.
    pub async fn report_failure(&self, link: &AcquisitionLink, err: &ShelfError) {
        tracing::error!(url = %link.url, "import from link failed: {err}");
        let toast = Toast::import_failed(
            self.inner.translator.as_ref(),
            &link.url,
            &err.to_string(),
        );
        self.inner.notifier.notify(toast).await;
    }
}
