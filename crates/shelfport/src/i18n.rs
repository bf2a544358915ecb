//! Fluent-backed message translation.
//!
//! Resources under `locales/` are embedded at build time. Message keys use
//! dotted names (`message.import.fail`); Fluent ids cannot contain dots, so
//! each dot maps to a dash (`message-import-fail`).

use std::borrow::Cow;
use std::collections::HashMap;
use std::str::FromStr;

use fluent_templates::fluent_bundle::FluentValue;
use fluent_templates::loader::{LanguageIdentifier, Loader};
use fluent_templates::static_loader;
use unic_langid::langid;

use crate::collaborators::{MessageArgs, Translator};

static_loader! {
    static LOCALES = {
        locales: "./locales",
        fallback_language: "en-US",
        customise: |bundle| bundle.set_use_isolating(false),
    };
}

/// Locale used when the requested one is not bundled.
pub const FALLBACK_LOCALE: &str = "en-US";

const FALLBACK_LANGUAGE: LanguageIdentifier = langid!("en-US");

/// Translator over the bundled Fluent resources.
#[derive(Debug, Clone)]
pub struct FluentTranslator {
    language: LanguageIdentifier,
    fallback_used: bool,
}

impl FluentTranslator {
    /// Pick the bundled locale closest to `locale`, else [`FALLBACK_LOCALE`].
    ///
    /// An exact match wins; otherwise a bundle with the same primary
    /// language (`fr-CA` → `fr`) is used.
    pub fn new(locale: Option<&str>) -> Self {
        let requested = locale.and_then(|l| LanguageIdentifier::from_str(l).ok());
        let Some(requested) = requested else {
            return Self::fallback();
        };

        let mut bundled = LOCALES.locales();
        if let Some(exact) = bundled.find(|l| **l == requested) {
            return Self::with_language(exact.clone());
        }
        if let Some(same_language) = LOCALES
            .locales()
            .find(|l| l.language == requested.language)
        {
            return Self::with_language(same_language.clone());
        }
        Self::fallback()
    }

    pub fn locale(&self) -> String {
        self.language.to_string()
    }

    pub fn used_fallback(&self) -> bool {
        self.fallback_used
    }

    fn with_language(language: LanguageIdentifier) -> Self {
        Self {
            language,
            fallback_used: false,
        }
    }

    fn fallback() -> Self {
        Self {
            language: FALLBACK_LANGUAGE.clone(),
            fallback_used: true,
        }
    }
}

impl Default for FluentTranslator {
    fn default() -> Self {
        Self::fallback()
    }
}

impl Translator for FluentTranslator {
    fn translate(&self, key: &str, args: &MessageArgs) -> String {
        let mut fluent_args: HashMap<Cow<'static, str>, FluentValue<'static>> = HashMap::new();
        if let Some(path) = &args.path {
            fluent_args.insert(Cow::Borrowed("path"), FluentValue::from(path.clone()));
        }
        if let Some(err) = &args.err {
            fluent_args.insert(Cow::Borrowed("err"), FluentValue::from(err.clone()));
        }

        let id = fluent_id(key);
        LOCALES
            .try_lookup_with_args(&self.language, &id, &fluent_args)
            .unwrap_or_else(|| {
                tracing::warn!(key, locale = %self.language, "missing translation");
                key.to_string()
            })
    }
}

fn fluent_id(key: &str) -> String {
    key.replace('.', "-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::IMPORT_FAIL_KEY;

    fn fail_args() -> MessageArgs {
        MessageArgs {
            path: Some("http://x/book.epub".to_string()),
            err: Some("boom".to_string()),
        }
    }

    #[test]
    fn test_english_import_failure() {
        let translator = FluentTranslator::new(Some("en-US"));
        assert!(!translator.used_fallback());
        let text = translator.translate(IMPORT_FAIL_KEY, &fail_args());
        assert_eq!(text, "Import failed for http://x/book.epub: boom");
    }

    #[test]
    fn test_french_by_primary_language() {
        let translator = FluentTranslator::new(Some("fr-CA"));
        assert_eq!(translator.locale(), "fr");
        let text = translator.translate(IMPORT_FAIL_KEY, &fail_args());
        assert!(text.contains("http://x/book.epub"));
        assert!(text.contains("boom"));
        assert!(text.starts_with("Échec"));
    }

    #[test]
    fn test_unknown_locale_falls_back() {
        let translator = FluentTranslator::new(Some("zz"));
        assert!(translator.used_fallback());
        assert_eq!(translator.locale(), FALLBACK_LOCALE);

        let translator = FluentTranslator::new(None);
        assert!(translator.used_fallback());
    }

    #[test]
    fn test_missing_key_returns_key() {
        let translator = FluentTranslator::default();
        assert_eq!(
            translator.translate("message.nope", &MessageArgs::default()),
            "message.nope"
        );
    }

    #[test]
    fn test_fluent_id() {
        assert_eq!(fluent_id("message.import.fail"), "message-import-fail");
    }
}
