//! Catalog metadata merge.
//!
//! Binary content comes from the import, metadata from the catalog: the
//! imported publication keeps its publication, LCP and LSD blobs, while the
//! original feed blob and the tags are taken from the remote view.

use crate::types::{ImportedPublication, PublicationResources, RemotePublicationView};

/// Merge a freshly imported publication with its catalog view.
pub fn merge_publication(
    imported: ImportedPublication,
    view: Option<&RemotePublicationView>,
) -> ImportedPublication {
    let resources = PublicationResources {
        publication_base64: imported.resources.publication_base64,
        lcp_base64: imported.resources.lcp_base64,
        lsd_base64: imported.resources.lsd_base64,
        opds_publication_base64: Some(
            view.and_then(|v| v.original_feed_resource_blob.clone())
                .unwrap_or_default(),
        ),
    };

    let tags = match view {
        Some(view) => view.tag_names(),
        None => imported.tags,
    };

    ImportedPublication {
        resources,
        tags,
        ..imported
    }
}
