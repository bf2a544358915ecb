//! Configuration loading and resolution.

use std::path::PathBuf;

use shelfport::http::DEFAULT_TIMEOUT_MS;
use shelfport::i18n::FALLBACK_LOCALE;

/// Environment variable overriding the library directory.
pub const LIBRARY_ENV: &str = "SHELFPORT_LIBRARY";

/// Environment variable overriding the message locale.
pub const LOCALE_ENV: &str = "SHELFPORT_LOCALE";

const LOCAL_LIBRARY_DIR: &str = ".shelfport";

/// Resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShelfConfig {
    pub library_dir: PathBuf,
    pub download_dir: PathBuf,
    pub package_dir: PathBuf,
    pub timeout_ms: u64,
    pub locale: String,
}

impl ShelfConfig {
    /// Build the configuration from explicit flags, falling back to the
    /// environment and defaults.
    pub fn resolve(library: Option<&str>, locale: Option<&str>, timeout_ms: Option<u64>) -> Self {
        Self::with_library_dir(
            resolve_library_dir(library),
            resolve_locale(locale),
            timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS),
        )
    }

    /// Derive working directories from a library directory.
    pub fn with_library_dir(library_dir: PathBuf, locale: String, timeout_ms: u64) -> Self {
        Self {
            download_dir: library_dir.join("downloads"),
            package_dir: library_dir.join("packages"),
            library_dir,
            timeout_ms,
            locale,
        }
    }
}

/// Resolve the library directory.
pub fn resolve_library_dir(explicit: Option<&str>) -> PathBuf {
    if let Some(path) = explicit {
        return PathBuf::from(path);
    }

    if let Ok(env_path) = std::env::var(LIBRARY_ENV) {
        return PathBuf::from(env_path);
    }

    let cwd_library = PathBuf::from(LOCAL_LIBRARY_DIR);
    if cwd_library.is_dir() {
        return cwd_library;
    }

    resolve_default_library_dir()
}

fn resolve_default_library_dir() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());

    PathBuf::from(home).join(LOCAL_LIBRARY_DIR)
}

/// Resolve the message locale: flag, then environment, then the fallback.
pub fn resolve_locale(explicit: Option<&str>) -> String {
    explicit
        .map(str::to_string)
        .or_else(|| std::env::var(LOCALE_ENV).ok())
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| FALLBACK_LOCALE.to_string())
}
