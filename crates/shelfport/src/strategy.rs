//! Acquisition strategy selection.
//!
//! Packaging wins over direct download whenever both kinds of token are
//! present: an unpacked manifest has to be bundled before it can be
//! imported, whatever else the server claims.

use std::fmt;

use crate::content_type::{ContentCategory, ContentTypeSet};

/// How a link will be turned into a local file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Fetch the HTML page or JSON manifest and bundle it locally.
    Package { is_html: bool },
    /// Download the resource as-is.
    Direct { recognized: bool },
}

impl Strategy {
    pub fn is_package(self) -> bool {
        matches!(self, Self::Package { .. })
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Package { is_html: true } => f.write_str("package (html)"),
            Self::Package { is_html: false } => f.write_str("package (json)"),
            Self::Direct { recognized: true } => f.write_str("direct"),
            Self::Direct { recognized: false } => f.write_str("direct (unrecognized)"),
        }
    }
}

/// Classify a token set. Pure: depends on nothing but the set.
pub fn classify(types: &ContentTypeSet) -> Strategy {
    let is_html = types.has(ContentCategory::Html);
    if is_html || types.has(ContentCategory::JsonFamily) {
        return Strategy::Package { is_html };
    }

    let recognized = types.categories().iter().any(|c| c.is_direct());
    Strategy::Direct { recognized }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content_type::{AUDIOBOOK_PACKED_LCP, DIVINA_MANIFEST, EPUB, HTML, JSON};

    fn classify_str(raw: &str) -> Strategy {
        classify(&ContentTypeSet::parse(raw))
    }

    #[test]
    fn test_html_is_packaged() {
        assert_eq!(classify_str(HTML), Strategy::Package { is_html: true });
        assert_eq!(
            classify_str("text/html; charset=utf-8"),
            Strategy::Package { is_html: true }
        );
    }

    #[test]
    fn test_json_is_packaged() {
        assert_eq!(classify_str(JSON), Strategy::Package { is_html: false });
        assert_eq!(
            classify_str(DIVINA_MANIFEST),
            Strategy::Package { is_html: false }
        );
    }

    #[test]
    fn test_epub_is_direct() {
        assert_eq!(classify_str(EPUB), Strategy::Direct { recognized: true });
        assert_eq!(
            classify_str(AUDIOBOOK_PACKED_LCP),
            Strategy::Direct { recognized: true }
        );
    }

    #[test]
    fn test_package_takes_precedence() {
        let strategy = classify_str(&format!("{EPUB};{JSON}"));
        assert_eq!(strategy, Strategy::Package { is_html: false });
    }

    #[test]
    fn test_html_and_json_reports_html() {
        assert_eq!(
            classify_str(&format!("{JSON};{HTML}")),
            Strategy::Package { is_html: true }
        );
    }

    #[test]
    fn test_unrecognized_still_direct() {
        assert_eq!(classify_str(""), Strategy::Direct { recognized: false });
        assert_eq!(
            classify_str("application/pdf"),
            Strategy::Direct { recognized: false }
        );
    }
}
