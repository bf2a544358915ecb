//! Command handlers against a temporary library.

use shelfport::{AcquisitionLink, PublicationRepository};
use shelfport_cli::commands::{open_pipeline, run_import, run_list, run_probe, ImportArgs};
use shelfport_cli::ShelfConfig;

// ─────────────────────── helpers ───────────────────────

fn temp_config(dir: &tempfile::TempDir) -> ShelfConfig {
    ShelfConfig::with_library_dir(dir.path().to_path_buf(), "en-US".to_string(), 1_000)
}

// ─────────────────────── probe ───────────────────────

#[tokio::test]
async fn test_probe_with_declared_type_needs_no_network() {
    let dir = tempfile::tempdir().unwrap();
    let config = temp_config(&dir);
    run_probe(&config, "http://127.0.0.1:1/page", Some("text/html"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_probe_rejects_malformed_url() {
    let dir = tempfile::tempdir().unwrap();
    let config = temp_config(&dir);
    assert!(run_probe(&config, "::not a url::", Some("text/html"))
        .await
        .is_err());
}

#[tokio::test]
async fn test_plan_uses_configured_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = open_pipeline(&temp_config(&dir), &shelfport::ToastBus::new());
    let link = AcquisitionLink::new("http://x/feed").with_type("application/webpub+json");

    let (resolved, strategy) = pipeline.plan(&link).await.unwrap();
    assert!(!resolved.was_probed());
    assert!(strategy.is_package());
}

// ─────────────────────── import ───────────────────────

#[tokio::test]
async fn test_unreachable_download_stores_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = temp_config(&dir);
    let args = ImportArgs {
        url: "http://127.0.0.1:1/book.epub".to_string(),
        content_type: Some("application/epub+zip".to_string()),
        ..Default::default()
    };

    assert!(!run_import(&config, &args).await.unwrap());
    let listed = shelfport::JsonRepository::open(dir.path())
        .list()
        .await
        .unwrap();
    assert!(listed.is_empty());
}

#[tokio::test]
async fn test_missing_publication_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = temp_config(&dir);
    let args = ImportArgs {
        url: "http://x/book.epub".to_string(),
        publication: Some(dir.path().join("absent.json")),
        ..Default::default()
    };

    assert!(run_import(&config, &args).await.is_err());
}

// ─────────────────────── list ───────────────────────

#[tokio::test]
async fn test_list_empty_library() {
    let dir = tempfile::tempdir().unwrap();
    let config = temp_config(&dir);
    run_list(&config, false).await.unwrap();
    run_list(&config, true).await.unwrap();
}
