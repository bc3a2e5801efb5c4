//! citegen-core: identifier resolution and bibliography rendering
//!
//! This library provides the pipeline that turns heterogeneous bibliographic
//! identifiers (URL, DOI, ISBN, PMID, PMCID) into normalized citation
//! records and renders them as formatted bibliographies:
//! - Source adapters for Crossref, OpenLibrary, the NCBI citation exporter,
//!   and generic web pages
//! - Cross-identifier redirection (page metadata embedding a DOI/PMID/PMCID)
//! - Parallel batch resolution with per-identifier failure markers
//! - Style/locale retrieval and pluggable citation formatting

pub mod domain;
pub mod http;
pub mod pipeline;
pub mod render;
pub mod sources;

pub use domain::{DateParts, FailureMarker, Name, Record, RecordStore};
pub use pipeline::{classify_batch, resolve_all, BatchOutcome, Sources};
pub use render::{OutputFormat, RenderError, RenderOptions, Rendered, Renderer};
pub use sources::SourceError;

// Re-export the classifier types callers need alongside the pipeline
pub use citegen_identifiers::{classify, ClassifiedIdentifier, IdentifierType};
