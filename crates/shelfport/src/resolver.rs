//! Link resolution: URL parsing and content-type discovery.

use url::Url;

use crate::collaborators::ContentTypeProbe;
use crate::content_type::ContentTypeSet;
use crate::types::{AcquisitionLink, ShelfError, ShelfResult};

/// A link whose URL is parsed and whose media type is known.
///
/// Built once per acquisition; the caller's [`AcquisitionLink`] is left
/// untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLink {
    pub link: AcquisitionLink,
    pub url: Url,
    /// The declared type, the probed header, or `""`.
    pub content_type: String,
    pub types: ContentTypeSet,
}

impl ResolvedLink {
    /// Whether the type came from the server rather than the catalog.
    pub fn was_probed(&self) -> bool {
        declared_type(&self.link).is_none()
    }
}

/// The catalog-declared type, if it says anything. Blank counts as absent.
fn declared_type(link: &AcquisitionLink) -> Option<&str> {
    link.declared_type
        .as_deref()
        .filter(|t| !t.trim().is_empty())
}

/// Parse the link URL. Malformed URLs are hard failures.
pub fn parse_url(link: &AcquisitionLink) -> ShelfResult<Url> {
    Url::parse(&link.url).map_err(|e| {
        tracing::debug!(url = %link.url, "bad url: {e}");
        ShelfError::InvalidUrl(link.url.clone())
    })
}

/// Resolve a link, probing the network only when no usable type was
/// declared.
///
/// A failed or empty probe yields the empty type; it never fails the
/// resolution.
pub async fn resolve(
    link: &AcquisitionLink,
    probe: &dyn ContentTypeProbe,
) -> ShelfResult<ResolvedLink> {
    let url = parse_url(link)?;

    let content_type = match declared_type(link) {
        Some(declared) => declared.to_string(),
        None => match probe.probe(&url).await {
            Ok(Some(header)) => header,
            Ok(None) => {
                tracing::debug!(%url, "no content type header");
                String::new()
            }
            Err(e) => {
                tracing::debug!(%url, "can't fetch url to determine the type: {e}");
                String::new()
            }
        },
    };

    let types = ContentTypeSet::parse(&content_type);
    Ok(ResolvedLink {
        link: link.clone(),
        url,
        content_type,
        types,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::content_type::EPUB;

    struct CountingProbe {
        calls: AtomicUsize,
        answer: Option<&'static str>,
        fail: bool,
    }

    impl CountingProbe {
        fn new(answer: Option<&'static str>, fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                answer,
                fail,
            }
        }
    }

    #[async_trait]
    impl ContentTypeProbe for CountingProbe {
        async fn probe(&self, url: &Url) -> ShelfResult<Option<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ShelfError::Download {
                    url: url.to_string(),
                    reason: "connection refused".to_string(),
                });
            }
            Ok(self.answer.map(str::to_string))
        }
    }

    #[tokio::test]
    async fn test_declared_type_skips_probe() {
        let probe = CountingProbe::new(Some("text/html"), false);
        let link = AcquisitionLink::new("http://x/book.epub").with_type(EPUB);

        let resolved = resolve(&link, &probe).await.unwrap();
        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
        assert_eq!(resolved.content_type, EPUB);
        assert!(resolved.types.contains(EPUB));
        assert!(!resolved.was_probed());
    }

    #[tokio::test]
    async fn test_missing_type_probes_once() {
        let probe = CountingProbe::new(Some("application/epub+zip; charset=binary"), false);
        let link = AcquisitionLink::new("http://x/book");

        let resolved = resolve(&link, &probe).await.unwrap();
        assert_eq!(probe.calls.load(Ordering::SeqCst), 1);
        assert!(resolved.types.contains(EPUB));
        assert!(link.declared_type.is_none(), "caller link must not change");
    }

    #[tokio::test]
    async fn test_blank_declared_type_probes_once() {
        for blank in ["", "   "] {
            let probe = CountingProbe::new(Some(EPUB), false);
            let link = AcquisitionLink::new("http://x/b").with_type(blank);

            let resolved = resolve(&link, &probe).await.unwrap();
            assert_eq!(probe.calls.load(Ordering::SeqCst), 1, "type {blank:?}");
            assert_eq!(resolved.content_type, EPUB);
            assert!(resolved.was_probed());
            assert_eq!(link.declared_type.as_deref(), Some(blank));
        }
    }

    #[tokio::test]
    async fn test_probe_failure_is_soft() {
        let probe = CountingProbe::new(None, true);
        let link = AcquisitionLink::new("http://x/book");

        let resolved = resolve(&link, &probe).await.unwrap();
        assert_eq!(probe.calls.load(Ordering::SeqCst), 1);
        assert_eq!(resolved.content_type, "");
        assert!(resolved.types.is_empty());
    }

    #[tokio::test]
    async fn test_missing_header_is_empty() {
        let probe = CountingProbe::new(None, false);
        let resolved = resolve(&AcquisitionLink::new("http://x/b"), &probe)
            .await
            .unwrap();
        assert_eq!(resolved.content_type, "");
    }

    #[tokio::test]
    async fn test_bad_url_fails_before_probe() {
        let probe = CountingProbe::new(Some(EPUB), false);
        let err = resolve(&AcquisitionLink::new("not a url"), &probe)
            .await
            .unwrap_err();
        assert!(matches!(err, ShelfError::InvalidUrl(ref u) if u == "not a url"));
        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
    }
}
