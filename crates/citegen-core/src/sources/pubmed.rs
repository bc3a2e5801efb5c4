//! NCBI Literature Citation Exporter adapter for PMID and PMCID
//!
//! API docs: https://api.ncbi.nlm.nih.gov/lit/ctxp
//! Returns CSL-shaped JSON; a `status: "error"` body means the id is
//! unknown. A record that carries a DOI is redirected to the DOI adapter,
//! deduplicating through the DOI as the canonical cross-reference.

use serde::Deserialize;

use super::traits::SourceError;
use crate::domain::{DateParts, Name, Record};
use crate::http::HttpClient;

/// ctxp serializes some fields as numbers or strings depending on the record
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StrOrNum {
    Str(String),
    Num(i64),
}

impl StrOrNum {
    fn into_string(self) -> String {
        match self {
            StrOrNum::Str(s) => s,
            StrOrNum::Num(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CtxpResponse {
    status: Option<String>,
    title: Option<String>,
    #[serde(rename = "container-title")]
    container_title: Option<String>,
    issue: Option<StrOrNum>,
    issued: Option<CtxpDate>,
    page: Option<StrOrNum>,
    volume: Option<StrOrNum>,
    #[serde(rename = "ISSN")]
    issn: Option<String>,
    #[serde(rename = "DOI")]
    doi: Option<String>,
    #[serde(rename = "PMID")]
    pmid: Option<StrOrNum>,
    #[serde(rename = "PMCID")]
    pmcid: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    author: Option<Vec<CtxpAuthor>>,
}

#[derive(Debug, Deserialize)]
struct CtxpAuthor {
    given: Option<String>,
    family: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CtxpDate {
    #[serde(rename = "date-parts")]
    date_parts: Option<Vec<Vec<i32>>>,
}

/// What a ctxp lookup resolved to: a finished record, or the DOI the
/// response itself exposed.
#[derive(Debug)]
pub enum CtxpOutcome {
    Record(Box<Record>),
    RedirectDoi(String),
}

pub struct PubMedSource {
    client: HttpClient,
    base_url: String,
}

impl PubMedSource {
    pub fn new() -> Self {
        Self {
            client: HttpClient::default(),
            base_url: "https://api.ncbi.nlm.nih.gov/lit/ctxp/v1".to_string(),
        }
    }

    /// Resolve a PMID
    pub async fn resolve_pmid(&self, pmid: &str) -> Result<CtxpOutcome, SourceError> {
        self.fetch("pubmed", pmid).await
    }

    /// Resolve a PMCID. Any `PMC` prefix is stripped before querying.
    pub async fn resolve_pmcid(&self, pmcid: &str) -> Result<CtxpOutcome, SourceError> {
        let bare = pmcid.trim().trim_start_matches("PMC");
        self.fetch("pmc", bare).await
    }

    async fn fetch(&self, database: &str, id: &str) -> Result<CtxpOutcome, SourceError> {
        let url = format!(
            "{}/{}/?format=csl&id={}",
            self.base_url,
            database,
            urlencoding::encode(id)
        );
        let response = self.client.get(&url).await?;

        if response.status == 404 {
            return Err(SourceError::NotFound);
        }
        if response.status != 200 {
            return Err(SourceError::Parse(format!(
                "unexpected status {}",
                response.status
            )));
        }

        Self::parse_csl_response(&response.body)
    }

    /// Parse a ctxp CSL body into an outcome (pure, testable offline)
    pub fn parse_csl_response(json: &str) -> Result<CtxpOutcome, SourceError> {
        let response: CtxpResponse = serde_json::from_str(json)
            .map_err(|e| SourceError::Parse(format!("invalid ctxp JSON: {}", e)))?;

        if response.status.as_deref() == Some("error") {
            return Err(SourceError::NotFound);
        }

        // DOI-backed records carry richer metadata; defer to the DOI adapter
        if let Some(doi) = response.doi.filter(|d| !d.is_empty()) {
            return Ok(CtxpOutcome::RedirectDoi(doi));
        }

        let mut record = Record::stamped();
        record.title = response.title;
        record.container_title = response.container_title;
        record.issue = response.issue.map(StrOrNum::into_string);
        record.page = response.page.map(StrOrNum::into_string);
        record.volume = response.volume.map(StrOrNum::into_string);
        record.issn = response.issn.into_iter().collect();
        record.pmid = response.pmid.map(StrOrNum::into_string);
        record.pmcid = response.pmcid;
        record.kind = response.kind;
        record.source = Some("PubMed".to_string());
        record.issued = response
            .issued
            .and_then(|d| d.date_parts)
            .filter(|dp| !dp.is_empty())
            .map(|dp| DateParts { date_parts: dp });
        record.authors = response
            .author
            .unwrap_or_default()
            .into_iter()
            .map(|a| Name {
                given: a.given,
                family: a.family,
            })
            .collect();

        Ok(CtxpOutcome::Record(Box::new(record)))
    }
}

impl Default for PubMedSource {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CSL: &str = r#"{
        "title": "A Study Without DOI",
        "container-title": "Journal of Tests",
        "issue": 4,
        "issued": {"date-parts": [[2020, 7]]},
        "page": "12-19",
        "volume": "33",
        "ISSN": "1234-5678",
        "PMID": 12345678,
        "type": "article-journal",
        "author": [{"given": "Rosalind", "family": "Franklin"}]
    }"#;

    const SAMPLE_WITH_DOI: &str = r#"{
        "title": "A DOI-Backed Study",
        "DOI": "10.1000/xyz123",
        "PMID": 87654321
    }"#;

    const SAMPLE_ERROR: &str = r#"{"status": "error", "message": "invalid article id"}"#;

    #[test]
    fn test_parse_csl_response() {
        let outcome = PubMedSource::parse_csl_response(SAMPLE_CSL).unwrap();
        let record = match outcome {
            CtxpOutcome::Record(r) => r,
            other => panic!("expected record, got {:?}", other),
        };
        assert_eq!(record.title.as_deref(), Some("A Study Without DOI"));
        assert_eq!(record.container_title.as_deref(), Some("Journal of Tests"));
        // numeric issue and PMID stringified
        assert_eq!(record.issue.as_deref(), Some("4"));
        assert_eq!(record.pmid.as_deref(), Some("12345678"));
        assert_eq!(record.volume.as_deref(), Some("33"));
        assert_eq!(
            record.issued.as_ref().unwrap().date_parts,
            vec![vec![2020, 7]]
        );
        assert_eq!(record.authors[0].family.as_deref(), Some("Franklin"));
    }

    #[test]
    fn test_doi_in_response_redirects() {
        let outcome = PubMedSource::parse_csl_response(SAMPLE_WITH_DOI).unwrap();
        match outcome {
            CtxpOutcome::RedirectDoi(doi) => assert_eq!(doi, "10.1000/xyz123"),
            other => panic!("expected redirect, got {:?}", other),
        }
    }

    #[test]
    fn test_error_status_is_not_found() {
        let err = PubMedSource::parse_csl_response(SAMPLE_ERROR).unwrap_err();
        assert!(matches!(err, SourceError::NotFound));
    }

    #[test]
    fn test_malformed_body_is_parse_error() {
        let err = PubMedSource::parse_csl_response("<html>rate limited</html>").unwrap_err();
        assert!(matches!(err, SourceError::Parse(_)));
    }
}
