//! Canonical citation records and the append-only record store
//!
//! Every source adapter normalizes its upstream schema into [`Record`] so
//! the renderer can treat records uniformly. Absent fields stay `None` or
//! empty; a placeholder string is never written.

use chrono::{Datelike, Utc};
use citegen_identifiers::IdentifierType;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Alphabet for generated record ids
const ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_";
const ID_LENGTH: usize = 16;

/// Generate a 16-character record id. Collision probability is negligible
/// at expected batch sizes (63^16 keyspace).
pub fn generate_record_id() -> String {
    let mut rng = rand::rng();
    (0..ID_LENGTH)
        .map(|_| ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())] as char)
        .collect()
}

/// One contributor name, already split into given/family parts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Name {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub given: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
}

impl Name {
    /// Split a display name on whitespace: first token is the given name,
    /// the remaining tokens joined form the family name.
    pub fn from_display(display: &str) -> Name {
        let mut tokens = display.split_whitespace();
        let given = tokens.next().map(|t| t.to_string());
        let rest: Vec<&str> = tokens.collect();
        Name {
            given,
            family: if rest.is_empty() {
                None
            } else {
                Some(rest.join(" "))
            },
        }
    }
}

/// A partial calendar date in CSL `date-parts` form:
/// `[[year]]`, `[[year, month]]` or `[[year, month, day]]`.
/// Unknown month/day are omitted, never defaulted to 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DateParts {
    #[serde(rename = "date-parts")]
    pub date_parts: Vec<Vec<i32>>,
}

impl DateParts {
    pub fn year(year: i32) -> DateParts {
        DateParts {
            date_parts: vec![vec![year]],
        }
    }

    pub fn year_month(year: i32, month: i32) -> DateParts {
        DateParts {
            date_parts: vec![vec![year, month]],
        }
    }

    pub fn ymd(year: i32, month: i32, day: i32) -> DateParts {
        DateParts {
            date_parts: vec![vec![year, month, day]],
        }
    }

    /// Current UTC date, used for `accessed` stamps
    pub fn today() -> DateParts {
        let now = Utc::now().date_naive();
        DateParts::ymd(now.year(), now.month() as i32, now.day() as i32)
    }

    /// First year component, if any
    pub fn first_year(&self) -> Option<i32> {
        self.date_parts.first().and_then(|p| p.first().copied())
    }
}

/// The canonical citation record shared across all source adapters.
///
/// Field names serialize to their CSL-JSON counterparts. Each adapter
/// populates only the fields its source provides; `id` and `accessed`
/// are always set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Record {
    pub id: String,
    /// Free-form bibliographic type ("book", "webpage", "article-journal", ...)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(rename = "DOI", skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(rename = "URL", skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(rename = "ISSN", skip_serializing_if = "Vec::is_empty", default)]
    pub issn: Vec<String>,
    #[serde(rename = "ISBN", skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(rename = "PMID", skip_serializing_if = "Option::is_none")]
    pub pmid: Option<String>,
    #[serde(rename = "PMCID", skip_serializing_if = "Option::is_none")]
    pub pmcid: Option<String>,
    #[serde(rename = "container-title", skip_serializing_if = "Option::is_none")]
    pub container_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issued: Option<DateParts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
    #[serde(rename = "number-of-pages", skip_serializing_if = "Option::is_none")]
    pub number_of_pages: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(rename = "publisher-place", skip_serializing_if = "Option::is_none")]
    pub publisher_place: Option<String>,
    /// Name of the source the record came from ("Crossref", site name, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<String>,
    pub accessed: DateParts,
    #[serde(rename = "author", skip_serializing_if = "Vec::is_empty", default)]
    pub authors: Vec<Name>,
}

impl Record {
    /// A fresh record with a generated id and `accessed` stamped now
    pub fn stamped() -> Record {
        Record {
            id: generate_record_id(),
            accessed: DateParts::today(),
            ..Record::default()
        }
    }
}

/// Per-identifier resolution failure status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureStatus {
    Failed,
}

/// Non-fatal marker for one identifier that could not be resolved.
/// Never mixed into the record set handed to the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureMarker {
    pub id: String,
    /// The value as originally attempted
    pub identifier: String,
    pub kind: IdentifierType,
    pub status: FailureStatus,
}

impl FailureMarker {
    pub fn new(kind: IdentifierType, identifier: &str) -> FailureMarker {
        FailureMarker {
            id: generate_record_id(),
            identifier: identifier.to_string(),
            kind,
            status: FailureStatus::Failed,
        }
    }
}

/// Ordered, append-only collection of records for one pipeline invocation.
/// Insertion order is the bibliography order.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<Record>,
}

impl RecordStore {
    pub fn new() -> RecordStore {
        RecordStore::default()
    }

    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
