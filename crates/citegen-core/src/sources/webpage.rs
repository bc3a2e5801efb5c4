//! Generic web page adapter: embedded-metadata scraping with
//! cross-identifier redirection
//!
//! Fetches the target page and scans `<meta>` tags. When the page exposes a
//! higher-priority identifier (HighWire `citation_doi`, `citation_pmid`,
//! `citation_pmcid`) the adapter reports a redirect instead of building a
//! record; the generic "webpage" record is the fallback of last resort.

use chrono::{DateTime, NaiveDate};
use citegen_identifiers::{classify, IdentifierType};
use lazy_static::lazy_static;
use regex::Regex;

use super::traits::SourceError;
use crate::domain::{DateParts, Name, Record};
use crate::http::HttpClient;

lazy_static! {
    static ref META_TAG_RE: Regex = Regex::new(r#"(?is)<meta\b[^>]*>"#).unwrap();
    static ref LINK_TAG_RE: Regex = Regex::new(r#"(?is)<link\b[^>]*>"#).unwrap();
    static ref TITLE_RE: Regex = Regex::new(r#"(?is)<title[^>]*>(.*?)</title>"#).unwrap();
    // Attribute values may be double-quoted, single-quoted, or bare tokens
    static ref ATTR_RE: Regex =
        Regex::new(r#"([a-zA-Z0-9:_-]+)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#).unwrap();
}

/// One parsed `<meta>` tag
#[derive(Debug, Clone, Default)]
struct MetaTag {
    name: Option<String>,
    property: Option<String>,
    content: String,
}

/// What a fetched page resolved to: either a finished record or a
/// higher-priority identifier discovered in the page metadata.
#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome {
    Record(Box<Record>),
    RedirectDoi(String),
    RedirectPmid(String),
    RedirectPmcid(String),
}

pub struct WebpageSource {
    client: HttpClient,
}

impl WebpageSource {
    pub fn new() -> Self {
        Self {
            client: HttpClient::default(),
        }
    }

    /// Fetch a page and resolve it to a record or a redirect
    pub async fn resolve(&self, url: &str) -> Result<PageOutcome, SourceError> {
        let target = ensure_scheme(url);
        let response = self.client.get(&target).await?;

        if response.status == 403 {
            return Err(SourceError::Forbidden);
        }
        if response.status >= 400 {
            return Err(SourceError::Parse(format!(
                "unexpected status {}",
                response.status
            )));
        }

        Ok(Self::parse_page(&response.body, &target))
    }

    /// Parse page HTML into an outcome (pure, testable offline).
    ///
    /// Redirection is checked before any record construction, in priority
    /// order DOI > PMID > PMCID.
    pub fn parse_page(html: &str, url: &str) -> PageOutcome {
        let meta = collect_meta(html);

        if let Some(doi) = embedded_doi(&meta) {
            return PageOutcome::RedirectDoi(doi);
        }
        if let Some(pmid) = meta_any(&meta, &["citation_pmid"]) {
            return PageOutcome::RedirectPmid(pmid);
        }
        if let Some(pmcid) = meta_any(&meta, &["citation_pmcid", "citation_pmc"]) {
            return PageOutcome::RedirectPmcid(pmcid);
        }

        PageOutcome::Record(Box::new(Self::build_record(html, &meta, url)))
    }

    fn build_record(html: &str, meta: &[MetaTag], url: &str) -> Record {
        let mut record = Record::stamped();
        record.kind = Some("webpage".to_string());

        record.title = meta_property(meta, "og:title")
            .or_else(|| meta_any(meta, &["citation_title", "title"]))
            .or_else(|| collect_title(html));

        record.authors = collect_authors(meta);

        let site_name = meta_property(meta, "og:site_name");
        record.container_title = site_name.clone();
        record.source = site_name;
        record.publisher = meta_any(meta, &["publisher", "dc.publisher"]);

        record.url = collect_canonical(html)
            .or_else(|| meta_property(meta, "og:url"))
            .or_else(|| Some(url.to_string()));

        record.issued = meta_property(meta, "article:published_time")
            .or_else(|| meta_any(meta, &["citation_publication_date", "citation_date", "date"]))
            .and_then(|raw| parse_publish_date(&raw));

        record
    }
}

impl Default for WebpageSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Prepend `https://` to schemeless input
fn ensure_scheme(url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

fn collect_meta(html: &str) -> Vec<MetaTag> {
    META_TAG_RE
        .find_iter(html)
        .filter_map(|m| parse_meta_tag(m.as_str()))
        .collect()
}

fn parse_meta_tag(tag: &str) -> Option<MetaTag> {
    let mut parsed = MetaTag::default();
    for cap in ATTR_RE.captures_iter(tag) {
        let key = cap.get(1)?.as_str().to_ascii_lowercase();
        let value = cap
            .get(2)
            .or_else(|| cap.get(3))
            .or_else(|| cap.get(4))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
        match key.as_str() {
            "name" => parsed.name = Some(value.to_ascii_lowercase()),
            "property" => parsed.property = Some(value.to_ascii_lowercase()),
            "content" => parsed.content = value,
            _ => {}
        }
    }
    if parsed.name.is_none() && parsed.property.is_none() {
        None
    } else {
        Some(parsed)
    }
}

fn collect_title(html: &str) -> Option<String> {
    TITLE_RE
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|t| !t.is_empty())
}

fn collect_canonical(html: &str) -> Option<String> {
    for tag in LINK_TAG_RE.find_iter(html) {
        let mut rel = None;
        let mut href = None;
        for cap in ATTR_RE.captures_iter(tag.as_str()) {
            let key = cap.get(1).map(|m| m.as_str().to_ascii_lowercase());
            let value = cap
                .get(2)
                .or_else(|| cap.get(3))
                .or_else(|| cap.get(4))
                .map(|m| m.as_str().to_string());
            match key.as_deref() {
                Some("rel") => rel = value,
                Some("href") => href = value,
                _ => {}
            }
        }
        if rel.as_deref().is_some_and(|r| r.eq_ignore_ascii_case("canonical")) {
            if let Some(href) = href.filter(|h| !h.is_empty()) {
                return Some(href);
            }
        }
    }
    None
}

fn meta_value(meta: &[MetaTag], key: &str) -> Option<String> {
    meta.iter()
        .find(|m| m.name.as_deref() == Some(key) && !m.content.trim().is_empty())
        .map(|m| m.content.trim().to_string())
}

fn meta_property(meta: &[MetaTag], key: &str) -> Option<String> {
    meta.iter()
        .find(|m| m.property.as_deref() == Some(key) && !m.content.trim().is_empty())
        .map(|m| m.content.trim().to_string())
}

fn meta_any(meta: &[MetaTag], keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| meta_value(meta, k))
}

/// A DOI embedded in the page: `citation_doi`, or a `dc.identifier` value
/// that classifies as a DOI.
fn embedded_doi(meta: &[MetaTag]) -> Option<String> {
    if let Some(doi) = meta_value(meta, "citation_doi") {
        return Some(citegen_identifiers::normalize_doi(&doi));
    }
    meta_value(meta, "dc.identifier")
        .filter(|v| classify(v).kind == IdentifierType::Doi)
        .map(|v| citegen_identifiers::normalize_doi(&v))
}

/// Authors from `author` / `article:author` metas, each value split on
/// whitespace into given/family. URL-valued article:author entries are
/// profile links, not names.
fn collect_authors(meta: &[MetaTag]) -> Vec<Name> {
    let mut authors: Vec<Name> = meta
        .iter()
        .filter(|m| {
            m.name.as_deref() == Some("author") || m.property.as_deref() == Some("article:author")
        })
        .map(|m| m.content.trim())
        .filter(|v| !v.is_empty() && url::Url::parse(v).is_err())
        .map(Name::from_display)
        .collect();
    authors.dedup();
    authors
}

fn parse_publish_date(raw: &str) -> Option<DateParts> {
    let value = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        let date = dt.date_naive();
        return Some(DateParts::ymd(
            chrono::Datelike::year(&date),
            chrono::Datelike::month(&date) as i32,
            chrono::Datelike::day(&date) as i32,
        ));
    }

    for format in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(DateParts::ymd(
                chrono::Datelike::year(&date),
                chrono::Datelike::month(&date) as i32,
                chrono::Datelike::day(&date) as i32,
            ));
        }
    }

    // Year-only fallback
    lazy_static! {
        static ref YEAR_RE: Regex = Regex::new(r"\b(\d{4})\b").unwrap();
    }
    YEAR_RE
        .captures(value)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .map(DateParts::year)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_ARTICLE: &str = r#"<html><head>
        <title>Fallback Title - Example Site</title>
        <meta property="og:title" content="How Rust Took Over" />
        <meta property="og:site_name" content="Example Magazine" />
        <meta name="author" content="Grace Hopper">
        <meta property="article:author" content="Alan M. Turing" />
        <meta property="article:author" content="https://example.com/profile/alan" />
        <meta property="article:published_time" content="2021-06-03T10:00:00+02:00" />
        <link rel="canonical" href="https://example.com/rust" />
        </head><body></body></html>"#;

    const SAMPLE_PUBMED_PAGE: &str = r#"<html><head>
        <meta name="citation_title" content="A Clinical Study" />
        <meta name="citation_pmid" content="12345678" />
        </head></html>"#;

    #[test]
    fn test_parse_page_builds_webpage_record() {
        let outcome = WebpageSource::parse_page(SAMPLE_ARTICLE, "https://example.com/rust?a=1");
        let record = match outcome {
            PageOutcome::Record(r) => r,
            other => panic!("expected record, got {:?}", other),
        };
        assert_eq!(record.kind.as_deref(), Some("webpage"));
        assert_eq!(record.title.as_deref(), Some("How Rust Took Over"));
        assert_eq!(record.container_title.as_deref(), Some("Example Magazine"));
        assert_eq!(record.url.as_deref(), Some("https://example.com/rust"));
        assert_eq!(
            record.issued.as_ref().unwrap().date_parts,
            vec![vec![2021, 6, 3]]
        );
        // profile URL filtered out, name split given/family
        assert_eq!(record.authors.len(), 2);
        assert_eq!(record.authors[0].given.as_deref(), Some("Grace"));
        assert_eq!(record.authors[0].family.as_deref(), Some("Hopper"));
        assert_eq!(record.authors[1].family.as_deref(), Some("M. Turing"));
    }

    #[test]
    fn test_parse_page_redirects_on_pmid() {
        let outcome = WebpageSource::parse_page(
            SAMPLE_PUBMED_PAGE,
            "https://pubmed.ncbi.nlm.nih.gov/12345678",
        );
        assert_eq!(outcome, PageOutcome::RedirectPmid("12345678".to_string()));
    }

    #[test]
    fn test_parse_page_doi_beats_pmid() {
        let html = r#"<meta name="citation_pmid" content="12345678">
                      <meta name="citation_doi" content="10.1000/xyz123">"#;
        let outcome = WebpageSource::parse_page(html, "https://example.org");
        assert_eq!(outcome, PageOutcome::RedirectDoi("10.1000/xyz123".to_string()));
    }

    #[test]
    fn test_dc_identifier_doi_redirects() {
        let html = r#"<meta name="DC.identifier" content="https://doi.org/10.1000/abc">"#;
        let outcome = WebpageSource::parse_page(html, "https://example.org");
        assert_eq!(outcome, PageOutcome::RedirectDoi("10.1000/abc".to_string()));
    }

    #[test]
    fn test_bare_page_tolerates_missing_tags() {
        let outcome = WebpageSource::parse_page("<html><body>hi</body></html>", "example.com/x");
        let record = match outcome {
            PageOutcome::Record(r) => r,
            other => panic!("expected record, got {:?}", other),
        };
        assert_eq!(record.title, None);
        assert!(record.authors.is_empty());
        assert_eq!(record.issued, None);
        assert_eq!(record.url.as_deref(), Some("example.com/x"));
    }

    #[test]
    fn test_unquoted_attribute_values() {
        let html = r#"<html><head>
            <meta name=author content=Hopper>
            <meta name=citation_title content="Unquoted Attrs in the Wild">
            </head></html>"#;
        let outcome = WebpageSource::parse_page(html, "https://example.com/u");
        let record = match outcome {
            PageOutcome::Record(r) => r,
            other => panic!("expected record, got {:?}", other),
        };
        assert_eq!(record.title.as_deref(), Some("Unquoted Attrs in the Wild"));
        assert_eq!(record.authors[0].given.as_deref(), Some("Hopper"));
    }

    #[test]
    fn test_title_tag_fallback() {
        let html = "<html><head><title> Just a Title </title>\n<meta name=\"x\" content=\"y\"></head></html>";
        match WebpageSource::parse_page(html, "https://e.com") {
            PageOutcome::Record(r) => assert_eq!(r.title.as_deref(), Some("Just a Title")),
            other => panic!("expected record, got {:?}", other),
        }
    }

    #[test]
    fn test_ensure_scheme() {
        assert_eq!(ensure_scheme("example.com"), "https://example.com");
        assert_eq!(ensure_scheme("http://example.com"), "http://example.com");
        assert_eq!(ensure_scheme("https://example.com"), "https://example.com");
    }

    #[test]
    fn test_parse_publish_date_shapes() {
        assert_eq!(
            parse_publish_date("2021-06-03").unwrap().date_parts,
            vec![vec![2021, 6, 3]]
        );
        assert_eq!(
            parse_publish_date("June 2021").unwrap().date_parts,
            vec![vec![2021]]
        );
        assert_eq!(parse_publish_date("no date here"), None);
    }
}
