//! Media type tokens and their acquisition categories.

use std::collections::BTreeSet;
use std::fmt;

pub const EPUB: &str = "application/epub+zip";
pub const LCP_LICENSE: &str = "application/vnd.readium.lcp.license.v1.0+json";
pub const AUDIOBOOK_PACKED: &str = "application/audiobook+zip";
pub const AUDIOBOOK_PACKED_LCP: &str = "application/audiobook+lcp";
pub const DIVINA_PACKED: &str = "application/divina+zip";
pub const HTML: &str = "text/html";
pub const JSON: &str = "application/json";
pub const AUDIOBOOK_MANIFEST: &str = "application/audiobook+json";
pub const JSON_LD: &str = "application/ld+json";
pub const DIVINA_MANIFEST: &str = "application/divina+json";
pub const WEBPUB_MANIFEST: &str = "application/webpub+json";

/// What a single media type token means for acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContentCategory {
    Epub,
    LcpEpub,
    AudiobookPacked,
    AudiobookPackedLcp,
    DivinaPacked,
    Html,
    JsonFamily,
}

impl ContentCategory {
    /// Map a normalized token to its category.
    pub fn from_token(token: &str) -> Option<Self> {
        let category = match token {
            EPUB => Self::Epub,
            LCP_LICENSE => Self::LcpEpub,
            AUDIOBOOK_PACKED => Self::AudiobookPacked,
            AUDIOBOOK_PACKED_LCP => Self::AudiobookPackedLcp,
            DIVINA_PACKED => Self::DivinaPacked,
            HTML => Self::Html,
            JSON | AUDIOBOOK_MANIFEST | JSON_LD | DIVINA_MANIFEST | WEBPUB_MANIFEST => {
                Self::JsonFamily
            }
            _ => return None,
        };
        Some(category)
    }

    /// Whether the payload must be packaged before it can be imported.
    pub fn needs_packaging(self) -> bool {
        matches!(self, Self::Html | Self::JsonFamily)
    }

    /// Whether the payload is an importable binary publication.
    pub fn is_direct(self) -> bool {
        !self.needs_packaging()
    }

    /// Conventional file extension for a local copy.
    pub fn file_extension(self) -> &'static str {
        match self {
            Self::Epub => "epub",
            Self::LcpEpub => "lcpl",
            Self::AudiobookPacked => "audiobook",
            Self::AudiobookPackedLcp => "lcpa",
            Self::DivinaPacked => "divina",
            Self::Html => "html",
            Self::JsonFamily => "json",
        }
    }
}

impl fmt::Display for ContentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Epub => "epub",
            Self::LcpEpub => "lcp-epub",
            Self::AudiobookPacked => "audiobook-packed",
            Self::AudiobookPackedLcp => "audiobook-packed-lcp",
            Self::DivinaPacked => "divina-packed",
            Self::Html => "html",
            Self::JsonFamily => "json",
        };
        f.write_str(name)
    }
}

/// Normalized tokens of a possibly compound `;`-separated type string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentTypeSet {
    tokens: BTreeSet<String>,
}

impl ContentTypeSet {
    /// Strip all whitespace and split on `;`. Empty tokens are dropped.
    pub fn parse(raw: &str) -> Self {
        let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
        let tokens = compact
            .split(';')
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        Self { tokens }
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }

    /// Distinct categories present in the set.
    pub fn categories(&self) -> BTreeSet<ContentCategory> {
        self.tokens()
            .filter_map(ContentCategory::from_token)
            .collect()
    }

    pub fn has(&self, category: ContentCategory) -> bool {
        self.tokens()
            .any(|t| ContentCategory::from_token(t) == Some(category))
    }

    /// Extension of the first recognized category, if any.
    pub fn file_extension(&self) -> Option<&'static str> {
        self.categories()
            .into_iter()
            .next()
            .map(ContentCategory::file_extension)
    }
}

impl fmt::Display for ContentTypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<&str> = self.tokens().collect();
        f.write_str(&joined.join(";"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strips_whitespace_and_splits() {
        let set = ContentTypeSet::parse(" application/epub+zip ; charset = utf-8 ");
        assert!(set.contains(EPUB));
        assert!(set.contains("charset=utf-8"));
        assert_eq!(set.tokens().count(), 2);
    }

    #[test]
    fn test_parse_empty() {
        assert!(ContentTypeSet::parse("").is_empty());
        assert!(ContentTypeSet::parse(" ; ").is_empty());
    }

    #[test]
    fn test_json_family() {
        for token in [JSON, AUDIOBOOK_MANIFEST, JSON_LD, DIVINA_MANIFEST, WEBPUB_MANIFEST] {
            assert_eq!(
                ContentCategory::from_token(token),
                Some(ContentCategory::JsonFamily),
                "{token}"
            );
        }
    }

    #[test]
    fn test_direct_categories() {
        let set = ContentTypeSet::parse(&format!(
            "{EPUB};{LCP_LICENSE};{AUDIOBOOK_PACKED};{AUDIOBOOK_PACKED_LCP};{DIVINA_PACKED}"
        ));
        let categories = set.categories();
        assert_eq!(categories.len(), 5);
        assert!(categories.iter().all(|c| c.is_direct()));
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(ContentTypeSet::parse(EPUB).file_extension(), Some("epub"));
        assert_eq!(
            ContentTypeSet::parse(&format!("{LCP_LICENSE}; charset=utf-8")).file_extension(),
            Some("lcpl")
        );
        assert_eq!(ContentTypeSet::parse("image/png").file_extension(), None);
    }

    #[test]
    fn test_unknown_token_has_no_category() {
        assert_eq!(ContentCategory::from_token("application/pdf"), None);
        assert!(ContentTypeSet::parse("application/pdf").categories().is_empty());
    }
}
