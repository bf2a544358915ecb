//! reqwest-backed collaborators: type probe, downloader, snapshot packager.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::collaborators::{ContentTypeProbe, Downloader, Packager};
use crate::content_type::ContentTypeSet;
use crate::types::{DownloadRequest, ShelfError, ShelfResult};

const USER_AGENT: &str = concat!("shelfport/", env!("CARGO_PKG_VERSION"));

/// Default request timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// File name used when a URL has no usable last segment.
const FALLBACK_FILE_NAME: &str = "download";

/// Shared HTTP client.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new(timeout_ms: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .redirect(reqwest::redirect::Policy::limited(10))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();
        Self { client }
    }

    async fn get(&self, url: &str) -> ShelfResult<reqwest::Response> {
        Ok(self.client.get(url).send().await?)
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT_MS)
    }
}

/// Reads the `Content-Type` a server answers with. The body is never read.
#[derive(Clone, Default)]
pub struct HttpProbe {
    client: HttpClient,
}

impl HttpProbe {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ContentTypeProbe for HttpProbe {
    async fn probe(&self, url: &Url) -> ShelfResult<Option<String>> {
        let response = self.client.get(url.as_str()).await?;
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string);
        Ok(content_type)
    }
}

/// Streams each requested resource into a download directory.
#[derive(Clone)]
pub struct HttpDownloader {
    client: HttpClient,
    dir: PathBuf,
}

impl HttpDownloader {
    pub fn new(client: HttpClient, dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            dir: dir.into(),
        }
    }

    async fn download_one(&self, request: &DownloadRequest) -> ShelfResult<PathBuf> {
        let mut response = self.client.get(&request.href).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ShelfError::Download {
                url: request.href.clone(),
                reason: format!("HTTP {status}"),
            });
        }

        tokio::fs::create_dir_all(&self.dir).await?;
        let name = file_name_for(&request.href, &request.content_type);
        let dest = unique_path(&self.dir, &name);

        let partial = partial_path(&dest);
        let written = match stream_to(&mut response, &partial).await {
            Ok(written) => written,
            Err(e) => {
                if let Err(cleanup) = tokio::fs::remove_file(&partial).await {
                    tracing::debug!(
                        path = %partial.display(),
                        "could not remove partial file: {cleanup}"
                    );
                }
                return Err(e);
            }
        };
        tokio::fs::rename(&partial, &dest).await?;

        tracing::debug!(href = %request.href, path = %dest.display(), bytes = written, "downloaded");
        Ok(dest)
    }
}

#[async_trait]
impl Downloader for HttpDownloader {
    async fn download(
        &self,
        requests: Vec<DownloadRequest>,
        title: &str,
    ) -> ShelfResult<Vec<PathBuf>> {
        tracing::info!(title, count = requests.len(), "downloading");
        let mut paths = Vec::with_capacity(requests.len());
        for request in &requests {
            paths.push(self.download_one(request).await?);
        }
        Ok(paths)
    }
}

/// Stores the fetched HTML page or JSON manifest as a single local file.
///
/// Any failure is soft: it is logged and no file is produced.
#[derive(Clone)]
pub struct SnapshotPackager {
    client: HttpClient,
    dir: PathBuf,
}

impl SnapshotPackager {
    pub fn new(client: HttpClient, dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            dir: dir.into(),
        }
    }

    async fn snapshot(&self, url: &str, is_html: bool) -> ShelfResult<PathBuf> {
        let response = self.client.get(url).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ShelfError::Package {
                url: url.to_string(),
                reason: format!("HTTP {status}"),
            });
        }
        let body = response.bytes().await?;

        tokio::fs::create_dir_all(&self.dir).await?;
        let extension = if is_html { "html" } else { "json" };
        let dest = self
            .dir
            .join(format!("{}.{extension}", uuid::Uuid::new_v4()));
        tokio::fs::write(&dest, &body).await?;
        Ok(dest)
    }
}

#[async_trait]
impl Packager for SnapshotPackager {
    async fn package(&self, url: &str, is_html: bool) -> ShelfResult<Option<PathBuf>> {
        match self.snapshot(url, is_html).await {
            Ok(path) => {
                tracing::debug!(url, path = %path.display(), "packaged");
                Ok(Some(path))
            }
            Err(e) => {
                tracing::warn!(url, "packaging failed: {e}");
                Ok(None)
            }
        }
    }
}

/// Local file name for a download: the last URL segment, with an extension
/// derived from the media type when the segment has none.
pub fn file_name_for(href: &str, content_type: &str) -> String {
    let segment = Url::parse(href)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|mut s| s.next_back().map(str::to_string))
        })
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| FALLBACK_FILE_NAME.to_string());

    if Path::new(&segment).extension().is_some() {
        return segment;
    }
    match ContentTypeSet::parse(content_type).file_extension() {
        Some(ext) => format!("{segment}.{ext}"),
        None => segment,
    }
}

/// Write the response body to `path`. Returns the byte count.
async fn stream_to(response: &mut reqwest::Response, path: &Path) -> ShelfResult<u64> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut written = 0u64;
    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;
    Ok(written)
}

/// In-progress name for a download; renamed to `dest` once complete.
fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".part");
    dest.with_file_name(name)
}

/// `dir/name`, or `dir/stem-N.ext` with the first free N.
fn unique_path(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }

    let path = Path::new(name);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(FALLBACK_FILE_NAME);
    let extension = path.extension().and_then(|e| e.to_str());

    (1u32..)
        .map(|n| match extension {
            Some(ext) => dir.join(format!("{stem}-{n}.{ext}")),
            None => dir.join(format!("{stem}-{n}")),
        })
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}
