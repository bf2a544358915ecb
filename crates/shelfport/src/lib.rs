//! Shelfport: turns remote publication links into stored library records.

pub mod acquire;
pub mod collaborators;
pub mod content_type;
pub mod http;
pub mod i18n;
pub mod library;
pub mod merge;
pub mod notify;
pub mod pipeline;
pub mod resolver;
pub mod strategy;
pub mod types;

pub use acquire::Acquired;
pub use collaborators::{
    ContentTypeProbe, Downloader, FsImporter, MessageArgs, Notifier, Packager,
    PublicationRepository, Translator,
};
pub use content_type::{ContentCategory, ContentTypeSet};
pub use http::{HttpClient, HttpDownloader, HttpProbe, SnapshotPackager};
pub use i18n::FluentTranslator;
pub use library::{JsonRepository, LocalImporter};
pub use merge::merge_publication;
pub use notify::{LogNotifier, Toast, ToastBus, ToastKind};
pub use pipeline::{AcquisitionPipeline, Collaborators};
pub use resolver::ResolvedLink;
pub use strategy::{classify, Strategy};
pub use types::*;
