//! On-disk library: a JSON publication store and a file importer.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use base64::Engine;
use tokio::sync::Mutex;

use crate::collaborators::{FsImporter, PublicationRepository};
use crate::types::{
    ImportedPublication, PersistedPublication, PublicationResources, ShelfError, ShelfResult,
};

/// File holding the stored records, inside the library directory.
pub const STORE_FILE_NAME: &str = "publications.json";

/// Directory holding imported files, inside the library directory.
pub const FILES_DIR_NAME: &str = "files";

/// Publication store backed by a single JSON file.
///
/// Writes go through a temp file and a rename, one at a time.
pub struct JsonRepository {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonRepository {
    /// Store rooted at `library_dir`. Nothing is read until first use.
    pub fn open(library_dir: &Path) -> Self {
        Self {
            path: library_dir.join(STORE_FILE_NAME),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> ShelfResult<Vec<PersistedPublication>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, records: &[PersistedPublication]) -> ShelfResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let payload = serde_json::to_vec_pretty(records)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, payload).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl PublicationRepository for JsonRepository {
    async fn save(&self, publication: ImportedPublication) -> ShelfResult<PersistedPublication> {
        let _guard = self.write_lock.lock().await;

        let mut records = self
            .load()
            .await
            .map_err(|e| ShelfError::Repository(format!("Failed to read store: {e}")))?;

        let stored = PersistedPublication {
            id: uuid::Uuid::new_v4(),
            created_at: chrono::Utc::now(),
            publication,
        };
        records.push(stored.clone());

        self.write(&records)
            .await
            .map_err(|e| ShelfError::Repository(format!("Failed to write store: {e}")))?;

        tracing::debug!(id = %stored.id, path = %self.path.display(), "saved publication");
        Ok(stored)
    }

    async fn list(&self) -> ShelfResult<Vec<PersistedPublication>> {
        let _guard = self.write_lock.lock().await;
        self.load().await
    }
}

/// Moves artifacts into the library and describes them.
///
/// This is not a publication parser. JSON manifests are base64-encoded
/// into the publication slot and titled from `metadata.title`; LCP
/// licenses go into the LCP slot; anything else is titled by file stem.
pub struct LocalImporter {
    files_dir: PathBuf,
}

impl LocalImporter {
    pub fn new(library_dir: &Path) -> Self {
        Self {
            files_dir: library_dir.join(FILES_DIR_NAME),
        }
    }

    /// Copy `path` under a fresh identifier and drop the source.
    async fn take(&self, path: &Path, identifier: &str) -> ShelfResult<PathBuf> {
        let file_name = path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "publication".into());
        let dest_dir = self.files_dir.join(identifier);
        tokio::fs::create_dir_all(&dest_dir).await?;

        let dest = dest_dir.join(file_name);
        tokio::fs::copy(path, &dest).await?;
        if let Err(e) = tokio::fs::remove_file(path).await {
            tracing::debug!(path = %path.display(), "could not remove source: {e}");
        }
        Ok(dest)
    }
}

#[async_trait]
impl FsImporter for LocalImporter {
    async fn import(
        &self,
        path: &Path,
        lcp_hashed_passphrase: Option<&str>,
    ) -> ShelfResult<Option<ImportedPublication>> {
        match tokio::fs::metadata(path).await {
            Ok(meta) if meta.is_file() => {}
            _ => {
                tracing::warn!(path = %path.display(), "nothing to import");
                return Ok(None);
            }
        }

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("publication")
            .to_string();

        let mut resources = PublicationResources::default();
        let mut title = stem;
        match extension.as_str() {
            "json" => {
                let bytes = tokio::fs::read(path).await?;
                let manifest: serde_json::Value =
                    serde_json::from_slice(&bytes).map_err(|e| ShelfError::Import {
                        path: path.to_path_buf(),
                        reason: format!("Invalid manifest: {e}"),
                    })?;
                if let Some(manifest_title) = manifest_title(&manifest) {
                    title = manifest_title;
                }
                resources.publication_base64 = Some(encode(&bytes));
            }
            "lcpl" => {
                let bytes = tokio::fs::read(path).await?;
                resources.lcp_base64 = Some(encode(&bytes));
            }
            _ => {}
        }

        let identifier = uuid::Uuid::new_v4().to_string();
        let file_path = self.take(path, &identifier).await?;

        Ok(Some(ImportedPublication {
            identifier,
            title,
            resources,
            tags: Vec::new(),
            file_path: Some(file_path),
            lcp_hashed_passphrase: lcp_hashed_passphrase.map(str::to_string),
        }))
    }

    async fn discard(&self, publication: &ImportedPublication) {
        let Some(file_path) = &publication.file_path else {
            return;
        };
        let dir = self.files_dir.join(&publication.identifier);
        if !file_path.starts_with(&dir) {
            return;
        }
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => tracing::debug!(path = %dir.display(), "discarded unsaved import"),
            Err(e) => tracing::warn!(path = %dir.display(), "could not discard import: {e}"),
        }
    }
}

fn encode(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// `metadata.title`, either a plain string or the first entry of a
/// language map.
fn manifest_title(manifest: &serde_json::Value) -> Option<String> {
    match manifest.get("metadata")?.get("title")? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Object(map) => map
            .values()
            .find_map(|v| v.as_str().map(str::to_string)),
        _ => None,
    }
}
