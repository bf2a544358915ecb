//! Strategy execution: package or download a resolved link.

use std::fmt;
use std::path::PathBuf;

use crate::collaborators::{Downloader, Packager};
use crate::resolver::ResolvedLink;
use crate::strategy::Strategy;
use crate::types::{AcquisitionLink, DownloadRequest, ShelfResult};

/// A local file produced by one of the two strategies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acquired {
    /// A packaged container built from an HTML page or JSON manifest.
    ///
    /// Imported under `link`, which carries only the normalized URL.
    Packaged { path: PathBuf, link: AcquisitionLink },
    /// A publication downloaded as-is, imported under the original link.
    Downloaded { path: PathBuf, link: AcquisitionLink },
}

impl Acquired {
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::Packaged { path, .. } | Self::Downloaded { path, .. } => path,
        }
    }

    /// The link the import tail should use.
    pub fn link(&self) -> &AcquisitionLink {
        match self {
            Self::Packaged { link, .. } | Self::Downloaded { link, .. } => link,
        }
    }
}

impl fmt::Display for Acquired {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Packaged { path, .. } => write!(f, "packaged {}", path.display()),
            Self::Downloaded { path, .. } => write!(f, "downloaded {}", path.display()),
        }
    }
}

/// Run `strategy` for `resolved`. `Ok(None)` means the collaborator produced
/// nothing.
pub async fn execute(
    resolved: &ResolvedLink,
    strategy: Strategy,
    downloader: &dyn Downloader,
    packager: &dyn Packager,
) -> ShelfResult<Option<Acquired>> {
    match strategy {
        Strategy::Package { is_html } => {
            tracing::debug!(url = %resolved.url, is_html, "the link needs to be packaged");
            let url = resolved.url.to_string();
            let packaged = packager.package(&url, is_html).await?;
            if packaged.is_none() {
                tracing::warn!(%url, "packager produced no file");
            }
            Ok(packaged.map(|path| Acquired::Packaged {
                path,
                link: AcquisitionLink::new(url),
            }))
        }
        Strategy::Direct { recognized } => {
            if !recognized {
                tracing::warn!(
                    url = %resolved.link.url,
                    content_type = %resolved.content_type,
                    "download link is not EPUB, audiobook or divina; trying anyway"
                );
            }
            tracing::debug!(url = %resolved.link.url, "start the download");

            let request = DownloadRequest {
                href: resolved.link.url.clone(),
                content_type: resolved.content_type.clone(),
            };
            let paths = downloader
                .download(vec![request], resolved.link.display_title())
                .await?;

            match paths.into_iter().next() {
                Some(path) => Ok(Some(Acquired::Downloaded {
                    path,
                    link: resolved.link.clone(),
                })),
                None => {
                    tracing::warn!(url = %resolved.link.url, "downloader produced no file");
                    Ok(None)
                }
            }
        }
    }
}
