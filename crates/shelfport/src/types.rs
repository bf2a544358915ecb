//! Core data types for acquisition links, imported publications, and errors.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A remote resource offer taken from a catalog entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcquisitionLink {
    pub url: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub declared_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<LinkProperties>,
}

impl AcquisitionLink {
    /// Create a link with only a URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Set the declared media type.
    pub fn with_type(mut self, declared_type: impl Into<String>) -> Self {
        self.declared_type = Some(declared_type.into());
        self
    }

    /// Set the display title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Attach an LCP hashed passphrase.
    pub fn with_lcp_passphrase(mut self, passphrase: impl Into<String>) -> Self {
        self.properties = Some(LinkProperties {
            lcp_hashed_passphrase: Some(passphrase.into()),
        });
        self
    }

    /// The LCP hashed passphrase, if the catalog supplied one.
    pub fn lcp_hashed_passphrase(&self) -> Option<&str> {
        self.properties
            .as_ref()
            .and_then(|p| p.lcp_hashed_passphrase.as_deref())
    }

    /// Title used for download progress: the link title, else its URL.
    pub fn display_title(&self) -> &str {
        match self.title.as_deref() {
            Some(title) if !title.is_empty() => title,
            _ => &self.url,
        }
    }
}

/// Extra link properties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lcp_hashed_passphrase: Option<String>,
}

/// Catalog-side metadata about the publication behind a link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemotePublicationView {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<Tag>>,
    #[serde(default, alias = "r2OpdsPublicationBase64")]
    pub original_feed_resource_blob: Option<String>,
}

impl RemotePublicationView {
    /// Tag names in catalog order. Missing tags yield an empty list.
    pub fn tag_names(&self) -> Vec<String> {
        self.tags
            .iter()
            .flatten()
            .map(|t| t.name.clone())
            .collect()
    }
}

/// A catalog tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Base64 payload slots carried by an imported publication.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicationResources {
    #[serde(default)]
    pub publication_base64: Option<String>,
    #[serde(default)]
    pub lcp_base64: Option<String>,
    #[serde(default)]
    pub lsd_base64: Option<String>,
    #[serde(default)]
    pub opds_publication_base64: Option<String>,
}

/// A publication produced by the filesystem importer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedPublication {
    pub identifier: String,
    pub title: String,
    pub resources: PublicationResources,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub file_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lcp_hashed_passphrase: Option<String>,
}

/// A publication after the repository has stored it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedPublication {
    pub id: uuid::Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(flatten)]
    pub publication: ImportedPublication,
}

/// One entry handed to the downloader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRequest {
    pub href: String,
    #[serde(rename = "type")]
    pub content_type: String,
}

/// Errors that can occur while acquiring a publication.
#[derive(thiserror::Error, Debug)]
pub enum ShelfError {
    #[error("Unable to get acquisition url from opds publication: {0}")]
    InvalidUrl(String),

    #[error("Download failed for {url}: {reason}")]
    Download { url: String, reason: String },

    #[error("Packaging failed for {url}: {reason}")]
    Package { url: String, reason: String },

    #[error("Import failed for {path}: {reason}")]
    Import { path: PathBuf, reason: String },

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

/// Convenience result type.
pub type ShelfResult<T> = Result<T, ShelfError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_title_falls_back_to_url() {
        let link = AcquisitionLink::new("http://x/book.epub");
        assert_eq!(link.display_title(), "http://x/book.epub");

        let link = link.with_title("A Book");
        assert_eq!(link.display_title(), "A Book");

        let empty = AcquisitionLink::new("http://x/a.epub").with_title("");
        assert_eq!(empty.display_title(), "http://x/a.epub");
    }

    #[test]
    fn test_link_deserializes_catalog_shape() {
        let link: AcquisitionLink = serde_json::from_value(serde_json::json!({
            "url": "https://cat.example/b.lcpl",
            "type": "application/vnd.readium.lcp.license.v1.0+json",
            "properties": { "lcpHashedPassphrase": "abc123" }
        }))
        .unwrap();

        assert_eq!(
            link.declared_type.as_deref(),
            Some("application/vnd.readium.lcp.license.v1.0+json")
        );
        assert_eq!(link.lcp_hashed_passphrase(), Some("abc123"));
        assert!(link.title.is_none());
    }

    #[test]
    fn test_view_tag_names() {
        let view = RemotePublicationView {
            tags: Some(vec![Tag::new("sf"), Tag::new("classic")]),
            ..Default::default()
        };
        assert_eq!(view.tag_names(), vec!["sf", "classic"]);
        assert!(RemotePublicationView::default().tag_names().is_empty());
    }

    #[test]
    fn test_view_accepts_legacy_blob_field() {
        let view: RemotePublicationView = serde_json::from_value(serde_json::json!({
            "r2OpdsPublicationBase64": "e30="
        }))
        .unwrap();
        assert_eq!(view.original_feed_resource_blob.as_deref(), Some("e30="));
    }
}
