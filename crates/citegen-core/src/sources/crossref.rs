//! Crossref source adapter for DOI metadata
//!
//! API docs: https://api.crossref.org/swagger-ui/index.html
//! A 404 from the works endpoint means the DOI is not registered.

use serde::Deserialize;

use super::traits::SourceError;
use crate::domain::{DateParts, Name, Record};
use crate::http::HttpClient;

#[derive(Debug, Deserialize)]
struct CrossrefResponse {
    message: CrossrefWork,
}

#[derive(Debug, Deserialize)]
struct CrossrefWork {
    #[serde(rename = "DOI")]
    doi: String,
    // Crossref wraps title and container-title in length-1 arrays
    title: Option<Vec<String>>,
    #[serde(rename = "container-title")]
    container_title: Option<Vec<String>>,
    author: Option<Vec<CrossrefAuthor>>,
    issued: Option<CrossrefDate>,
    volume: Option<String>,
    issue: Option<String>,
    page: Option<String>,
    publisher: Option<String>,
    #[serde(rename = "publisher-location")]
    publisher_location: Option<String>,
    #[serde(rename = "ISSN")]
    issn: Option<Vec<String>>,
    #[serde(rename = "URL")]
    url: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CrossrefAuthor {
    given: Option<String>,
    family: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CrossrefDate {
    #[serde(rename = "date-parts")]
    date_parts: Option<Vec<Vec<i32>>>,
}

pub struct CrossrefSource {
    client: HttpClient,
    base_url: String,
}

impl CrossrefSource {
    pub fn new() -> Self {
        Self {
            client: HttpClient::default(),
            base_url: "https://api.crossref.org/works".to_string(),
        }
    }

    /// Resolve a DOI into a canonical record
    pub async fn resolve(&self, doi: &str) -> Result<Record, SourceError> {
        let url = format!("{}/{}", self.base_url, urlencoding::encode(doi));
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

        Self::parse_work_response(&response.body)
    }

    /// Parse a works-by-DOI response body (pure, testable offline)
    pub fn parse_work_response(json: &str) -> Result<Record, SourceError> {
        let response: CrossrefResponse = serde_json::from_str(json)
            .map_err(|e| SourceError::Parse(format!("invalid Crossref JSON: {}", e)))?;

        let work = response.message;
        let mut record = Record::stamped();

        record.doi = Some(work.doi);
        record.title = work.title.and_then(|t| t.into_iter().next());
        record.container_title = work.container_title.and_then(|t| t.into_iter().next());
        record.volume = work.volume;
        record.issue = work.issue;
        record.page = work.page;
        record.publisher = work.publisher;
        record.publisher_place = work.publisher_location;
        record.issn = work.issn.unwrap_or_default();
        record.url = work.url;
        record.kind = work.kind;
        record.source = Some("Crossref".to_string());

        // `issued` is passed through as provided upstream
        record.issued = work
            .issued
            .and_then(|d| d.date_parts)
            .filter(|dp| !dp.is_empty())
            .map(|dp| DateParts { date_parts: dp });

        record.authors = work
            .author
            .unwrap_or_default()
            .into_iter()
            .map(|a| Name {
                given: a.given,
                family: a.family,
            })
            .collect();

        Ok(record)
    }
}

impl Default for CrossrefSource {
    fn default() -> Self {
        Self::new()
    }
}
