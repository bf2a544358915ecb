//! Command line front end for the shelfport acquisition pipeline.

pub mod commands;
pub mod config;

pub use commands::{open_pipeline, ImportArgs};
pub use config::{resolve_library_dir, ShelfConfig};
