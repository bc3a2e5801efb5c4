//! OpenLibrary source adapter for ISBN metadata
//!
//! API docs: https://openlibrary.org/dev/docs/api/search
//! `numFound == 0` means the ISBN is not in the catalog.

use chrono::NaiveDate;
use citegen_identifiers::is_valid_isbn;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

use super::traits::SourceError;
use crate::domain::{DateParts, Name, Record};
use crate::http::HttpClient;

const SEARCH_FIELDS: &str = "title,author_name,number_of_pages_median,editions,editions.publisher,editions.publish_place,editions.isbn,editions.publish_date";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(rename = "numFound")]
    num_found: u64,
    #[serde(default)]
    docs: Vec<SearchDoc>,
}

#[derive(Debug, Deserialize)]
struct SearchDoc {
    title: Option<String>,
    author_name: Option<Vec<String>>,
    number_of_pages_median: Option<i64>,
    editions: Option<EditionList>,
}

#[derive(Debug, Deserialize)]
struct EditionList {
    #[serde(default)]
    docs: Vec<EditionDoc>,
}

#[derive(Debug, Deserialize)]
struct EditionDoc {
    publisher: Option<Vec<String>>,
    publish_place: Option<Vec<String>>,
    isbn: Option<Vec<String>>,
    publish_date: Option<Vec<String>>,
}

pub struct OpenLibrarySource {
    client: HttpClient,
    base_url: String,
}

impl OpenLibrarySource {
    pub fn new() -> Self {
        Self {
            client: HttpClient::default(),
            base_url: "https://openlibrary.org/search.json".to_string(),
        }
    }

    /// Resolve an ISBN into a canonical record
    pub async fn resolve(&self, isbn: &str) -> Result<Record, SourceError> {
        let url = format!(
            "{}?q=isbn:{}&fields={}",
            self.base_url,
            urlencoding::encode(isbn),
            SEARCH_FIELDS
        );
        let response = self.client.get(&url).await?;

        if response.status != 200 {
            return Err(SourceError::Parse(format!(
                "unexpected status {}",
                response.status
            )));
        }

        Self::parse_search_response(&response.body, isbn)
    }

    /// Parse a search-by-ISBN response body (pure, testable offline).
    /// `input_isbn` is the fallback when the edition carries no ISBN of its own.
    pub fn parse_search_response(json: &str, input_isbn: &str) -> Result<Record, SourceError> {
        let response: SearchResponse = serde_json::from_str(json)
            .map_err(|e| SourceError::Parse(format!("invalid OpenLibrary JSON: {}", e)))?;

        if response.num_found == 0 {
            return Err(SourceError::NotFound);
        }
        let doc = response
            .docs
            .into_iter()
            .next()
            .ok_or(SourceError::NotFound)?;

        let mut record = Record::stamped();
        record.kind = Some("book".to_string());
        record.source = Some("OpenLibrary".to_string());
        record.title = doc.title;
        record.number_of_pages = doc.number_of_pages_median;
        record.authors = doc
            .author_name
            .unwrap_or_default()
            .iter()
            .map(|n| Name::from_display(n))
            .collect();

        // Prefer the first edition's own data over the search-level doc
        let edition = doc.editions.and_then(|e| e.docs.into_iter().next());
        let mut edition_isbn = None;
        if let Some(edition) = edition {
            record.publisher = edition.publisher.and_then(|p| p.into_iter().next());
            record.publisher_place = edition.publish_place.and_then(|p| p.into_iter().next());
            // Edition ISBN lists mix ISBN-10, ISBN-13, and the occasional
            // typo; take the first entry with a valid checksum
            edition_isbn = edition
                .isbn
                .and_then(|i| i.into_iter().find(|isbn| is_valid_isbn(isbn)));
            // issued only when a parseable publish date exists
            record.issued = edition
                .publish_date
                .and_then(|d| d.into_iter().next())
                .and_then(|d| parse_publish_date(&d));
        }
        record.isbn = Some(edition_isbn.unwrap_or_else(|| input_isbn.to_string()));

        Ok(record)
    }
}

impl Default for OpenLibrarySource {
    fn default() -> Self {
        Self::new()
    }
}

/// OpenLibrary publish dates are free text ("Mar 15, 2004", "2004").
/// Fall back to a bare year rather than inventing a month or day.
fn parse_publish_date(raw: &str) -> Option<DateParts> {
    let value = raw.trim();

    for format in ["%b %d, %Y", "%B %d, %Y", "%Y-%m-%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(DateParts::ymd(
                chrono::Datelike::year(&date),
                chrono::Datelike::month(&date) as i32,
                chrono::Datelike::day(&date) as i32,
            ));
        }
    }

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

    const SAMPLE_SEARCH: &str = r#"{
        "numFound": 1,
        "docs": [{
            "title": "The Pragmatic Programmer",
            "author_name": ["David Thomas", "Andrew Hunt"],
            "number_of_pages_median": 352,
            "editions": {
                "docs": [{
                    "publisher": ["Addison-Wesley"],
                    "publish_place": ["Boston"],
                    "isbn": ["9780135957059"],
                    "publish_date": ["Sep 13, 2019"]
                }]
            }
        }]
    }"#;

    const SAMPLE_EMPTY: &str = r#"{"numFound": 0, "docs": []}"#;

    #[test]
    fn test_parse_search_response() {
        let record =
            OpenLibrarySource::parse_search_response(SAMPLE_SEARCH, "978-0-13-595705-9").unwrap();
        assert_eq!(record.kind.as_deref(), Some("book"));
        assert_eq!(record.title.as_deref(), Some("The Pragmatic Programmer"));
        assert_eq!(record.number_of_pages, Some(352));
        assert_eq!(record.publisher.as_deref(), Some("Addison-Wesley"));
        assert_eq!(record.publisher_place.as_deref(), Some("Boston"));
        // edition ISBN preferred over input
        assert_eq!(record.isbn.as_deref(), Some("9780135957059"));
        assert_eq!(
            record.issued.as_ref().unwrap().date_parts,
            vec![vec![2019, 9, 13]]
        );
        assert_eq!(record.authors[0].given.as_deref(), Some("David"));
        assert_eq!(record.authors[0].family.as_deref(), Some("Thomas"));
    }

    #[test]
    fn test_zero_results_is_not_found() {
        let err =
            OpenLibrarySource::parse_search_response(SAMPLE_EMPTY, "978-3-16-148410-0").unwrap_err();
        assert!(matches!(err, SourceError::NotFound));
    }

    #[test]
    fn test_missing_edition_falls_back_to_input_isbn() {
        let json = r#"{"numFound": 1, "docs": [{"title": "Bare Book"}]}"#;
        let record = OpenLibrarySource::parse_search_response(json, "978-3-16-148410-0").unwrap();
        assert_eq!(record.isbn.as_deref(), Some("978-3-16-148410-0"));
        assert_eq!(record.publisher, None);
        // no parseable publish date, so issued stays unset
        assert_eq!(record.issued, None);
    }

    #[test]
    fn test_edition_isbn_with_bad_checksum_is_skipped() {
        let json = r#"{
            "numFound": 1,
            "docs": [{
                "title": "Dirty Edition List",
                "editions": {"docs": [{"isbn": ["9780135957051", "0135957053", "9780135957059"]}]}
            }]
        }"#;
        let record = OpenLibrarySource::parse_search_response(json, "978-3-16-148410-0").unwrap();
        assert_eq!(record.isbn.as_deref(), Some("9780135957059"));
    }

    #[test]
    fn test_no_valid_edition_isbn_falls_back_to_input() {
        let json = r#"{
            "numFound": 1,
            "docs": [{
                "title": "Garbage ISBNs",
                "editions": {"docs": [{"isbn": ["not-an-isbn", "12345"]}]}
            }]
        }"#;
        let record = OpenLibrarySource::parse_search_response(json, "978-3-16-148410-0").unwrap();
        assert_eq!(record.isbn.as_deref(), Some("978-3-16-148410-0"));
    }

    #[test]
    fn test_unparseable_publish_date_omits_issued() {
        let json = r#"{
            "numFound": 1,
            "docs": [{
                "title": "Odd Date",
                "editions": {"docs": [{"publish_date": ["n.d."]}]}
            }]
        }"#;
        let record = OpenLibrarySource::parse_search_response(json, "9780135957059").unwrap();
        assert_eq!(record.issued, None);
    }

    #[test]
    fn test_year_only_publish_date() {
        assert_eq!(
            parse_publish_date("2004").unwrap().date_parts,
            vec![vec![2004]]
        );
        assert_eq!(
            parse_publish_date("March 2004").unwrap().date_parts,
            vec![vec![2004]]
        );
    }
}
