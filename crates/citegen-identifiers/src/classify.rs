//! Identifier classification
//!
//! Maps a raw input string to an identifier type plus a normalized value.
//! An explicit `type:` prefix forces the type without any pattern check;
//! otherwise the patterns below are tried in a fixed order.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Types of bibliographic identifiers this pipeline can resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierType {
    /// Web page URL
    Url,
    /// Digital Object Identifier
    Doi,
    /// International Standard Book Number
    Isbn,
    /// PubMed identifier
    Pmid,
    /// PubMed Central identifier
    Pmcid,
    /// Matched no known pattern; never dispatched to a source
    Unknown,
}

impl IdentifierType {
    /// The explicit input prefix for this type (`doi:` etc.), without the colon
    pub fn prefix(&self) -> Option<&'static str> {
        match self {
            IdentifierType::Url => Some("url"),
            IdentifierType::Doi => Some("doi"),
            IdentifierType::Isbn => Some("isbn"),
            IdentifierType::Pmid => Some("pmid"),
            IdentifierType::Pmcid => Some("pmcid"),
            IdentifierType::Unknown => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            IdentifierType::Url => "URL",
            IdentifierType::Doi => "DOI",
            IdentifierType::Isbn => "ISBN",
            IdentifierType::Pmid => "PMID",
            IdentifierType::Pmcid => "PMCID",
            IdentifierType::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for IdentifierType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A raw identifier after classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedIdentifier {
    pub kind: IdentifierType,
    /// Prefix-stripped, whitespace-trimmed value. Hyphens are kept; they are
    /// removed only on the internal copy used for pattern matching.
    pub value: String,
}

// Pattern order matters: a DOI resolver URL (https://doi.org/10.x/y) matches
// the URL pattern too, so DOI must be tried first.
lazy_static! {
    static ref DOI_PATTERN: Regex =
        Regex::new(r"^(?:https?://(?:dx\.)?doi\.org/)?10\.\d{4,9}/[-._;()/:a-zA-Z0-9%?#\[\]@!$&'*+,=~]+$")
            .unwrap();
    static ref URL_PATTERN: Regex =
        Regex::new(r"^https?://[-._~:/?#\[\]@!$&'()*+,;=%a-zA-Z0-9]+$").unwrap();
    static ref PMCID_PATTERN: Regex = Regex::new(r"^PMC\d+$").unwrap();
    static ref PMID_PATTERN: Regex = Regex::new(r"^\d{7,10}$").unwrap();
    static ref ISBN_PATTERN: Regex = Regex::new(r"^97[89]\d{9}[\dX]$").unwrap();
}

/// List of (type, pattern) in priority order
fn patterns() -> [(&'static Regex, IdentifierType); 5] {
    [
        (&*DOI_PATTERN, IdentifierType::Doi),
        (&*URL_PATTERN, IdentifierType::Url),
        (&*PMCID_PATTERN, IdentifierType::Pmcid),
        (&*PMID_PATTERN, IdentifierType::Pmid),
        (&*ISBN_PATTERN, IdentifierType::Isbn),
    ]
}

/// Classify a raw identifier string.
///
/// Pure function; no validation is applied to values forced by an explicit
/// prefix. Unmatched inputs come back as `Unknown` with the trimmed input
/// retained so they can be reported to the user verbatim.
pub fn classify(raw: &str) -> ClassifiedIdentifier {
    let trimmed = raw.trim();

    for (prefix, kind) in [
        ("url", IdentifierType::Url),
        ("doi", IdentifierType::Doi),
        ("isbn", IdentifierType::Isbn),
        ("pmid", IdentifierType::Pmid),
        ("pmcid", IdentifierType::Pmcid),
    ] {
        if let Some(rest) = trimmed.strip_prefix(prefix) {
            if let Some(value) = rest.strip_prefix(':') {
                return ClassifiedIdentifier {
                    kind,
                    value: value.trim().to_string(),
                };
            }
        }
    }

    // Hyphens only interfere with matching (ISBNs, spaced DOIs); the value
    // handed downstream keeps them.
    let dehyphenated: String = trimmed.chars().filter(|c| *c != '-').collect();

    for (pattern, kind) in patterns() {
        if pattern.is_match(&dehyphenated) {
            return ClassifiedIdentifier {
                kind,
                value: trimmed.to_string(),
            };
        }
    }

    ClassifiedIdentifier {
        kind: IdentifierType::Unknown,
        value: trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_classify_doi() {
        let c = classify("10.1038/nature12373");
        assert_eq!(c.kind, IdentifierType::Doi);
        assert_eq!(c.value, "10.1038/nature12373");
    }

    #[test]
    fn test_classify_doi_resolver_url_wins_over_url() {
        // Matches the URL pattern too; DOI has priority
        let c = classify("https://doi.org/10.1000/xyz123");
        assert_eq!(c.kind, IdentifierType::Doi);

        let c = classify("http://dx.doi.org/10.1000/xyz123");
        assert_eq!(c.kind, IdentifierType::Doi);
    }

    #[test]
    fn test_classify_url() {
        let c = classify("https://example.com/article?id=42");
        assert_eq!(c.kind, IdentifierType::Url);
        assert_eq!(c.value, "https://example.com/article?id=42");
    }

    #[test]
    fn test_classify_pmcid() {
        let c = classify("PMC3531190");
        assert_eq!(c.kind, IdentifierType::Pmcid);
    }

    #[test]
    fn test_classify_pmid() {
        let c = classify("12345678");
        assert_eq!(c.kind, IdentifierType::Pmid);
    }

    #[test]
    fn test_classify_isbn_keeps_hyphens() {
        let c = classify("978-3-16-148410-0");
        assert_eq!(c.kind, IdentifierType::Isbn);
        assert_eq!(c.value, "978-3-16-148410-0");
    }

    #[test]
    fn test_classify_isbn_check_digit_x() {
        let c = classify("979-8-60-902821X");
        assert_eq!(c.kind, IdentifierType::Isbn);
    }

    #[test]
    fn test_explicit_prefix_forces_type() {
        // No pattern validation in the prefix branch
        let c = classify("doi:not-actually-a-doi");
        assert_eq!(c.kind, IdentifierType::Doi);
        assert_eq!(c.value, "not-actually-a-doi");

        let c = classify("url: https://pubmed.ncbi.nlm.nih.gov/12345678");
        assert_eq!(c.kind, IdentifierType::Url);
        assert_eq!(c.value, "https://pubmed.ncbi.nlm.nih.gov/12345678");
    }

    #[test]
    fn test_prefix_is_case_sensitive() {
        let c = classify("DOI:10.1000/xyz");
        assert_ne!(c.kind, IdentifierType::Doi);
        assert_eq!(c.kind, IdentifierType::Unknown);
    }

    #[test]
    fn test_unknown_retains_original_value() {
        let c = classify("  not-an-identifier  ");
        assert_eq!(c.kind, IdentifierType::Unknown);
        assert_eq!(c.value, "not-an-identifier");
    }

    #[test]
    fn test_short_digit_string_is_not_pmid() {
        // PMIDs are 7-10 digits
        assert_eq!(classify("123456").kind, IdentifierType::Unknown);
        assert_eq!(classify("12345678901").kind, IdentifierType::Unknown);
    }

    proptest! {
        #[test]
        fn prop_explicit_prefix_always_forces_type(value in "\\PC{0,40}") {
            for kind in [
                IdentifierType::Url,
                IdentifierType::Doi,
                IdentifierType::Isbn,
                IdentifierType::Pmid,
                IdentifierType::Pmcid,
            ] {
                let prefix = kind.prefix().unwrap();
                let c = classify(&format!("{}:{}", prefix, value));
                prop_assert_eq!(c.kind, kind);
            }
        }
    }
}
