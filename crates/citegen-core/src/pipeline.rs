//! Batch resolution pipeline
//!
//! Classifies a batch of raw identifiers, fans resolutions out fully in
//! parallel, and partitions the settled results into a record store and a
//! list of failure markers. Cross-identifier redirects discovered by the
//! URL and PubMed adapters are followed here, behind a hard depth limit.

use futures::future::join_all;

use citegen_identifiers::{classify, ClassifiedIdentifier, IdentifierType};

use crate::domain::{FailureMarker, Record, RecordStore};
use crate::sources::crossref::CrossrefSource;
use crate::sources::openlibrary::OpenLibrarySource;
use crate::sources::pubmed::{CtxpOutcome, PubMedSource};
use crate::sources::webpage::{PageOutcome, WebpageSource};
use crate::sources::SourceError;

/// Longest observed chain is URL -> PMID -> DOI; anything past that is a
/// cycle between sources and gets cut off.
const MAX_REDIRECTS: usize = 2;

/// All source adapters for one pipeline invocation
#[derive(Default)]
pub struct Sources {
    pub crossref: CrossrefSource,
    pub openlibrary: OpenLibrarySource,
    pub pubmed: PubMedSource,
    pub webpage: WebpageSource,
}

impl Sources {
    pub fn new() -> Sources {
        Sources::default()
    }
}

/// The settled result of one batch: successful records in input order,
/// failure markers, never mixed.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub store: RecordStore,
    pub failures: Vec<FailureMarker>,
}

/// Classify a batch of raw strings, splitting off inputs that matched no
/// pattern. Unknown identifiers are reported to the caller and never
/// dispatched to any adapter.
pub fn classify_batch(raw: &[String]) -> (Vec<ClassifiedIdentifier>, Vec<String>) {
    let mut classified = Vec::new();
    let mut unknown = Vec::new();
    for input in raw {
        let id = classify(input);
        if id.kind == IdentifierType::Unknown {
            unknown.push(id.value);
        } else {
            classified.push(id);
        }
    }
    (classified, unknown)
}

/// Resolve all classified identifiers concurrently.
///
/// Every resolution runs to completion or failure; a slow or failing lookup
/// never blocks or aborts the others. Results are re-sorted by original
/// input index before storing so the bibliography order is input order,
/// not completion order.
pub async fn resolve_all(sources: &Sources, identifiers: &[ClassifiedIdentifier]) -> BatchOutcome {
    let tasks = identifiers.iter().enumerate().map(|(index, id)| async move {
        (index, id.clone(), resolve_one(sources, id).await)
    });

    let mut settled: Vec<(usize, ClassifiedIdentifier, Result<Record, SourceError>)> =
        join_all(tasks).await;
    settled.sort_by_key(|(index, _, _)| *index);

    let mut outcome = BatchOutcome::default();
    for (_, id, result) in settled {
        match result {
            Ok(record) => outcome.store.push(record),
            Err(error) => {
                tracing::error!(identifier = %id.value, kind = %id.kind, %error, "resolution failed");
                outcome.failures.push(FailureMarker::new(id.kind, &id.value));
            }
        }
    }
    outcome
}

/// One step of resolution: either a finished record or a higher-priority
/// identifier to chase next.
#[derive(Debug)]
pub enum Resolution {
    Record(Box<Record>),
    Redirect(IdentifierType, String),
}

/// Drive `step` from a starting identifier until it produces a record,
/// following at most [`MAX_REDIRECTS`] cross-identifier redirects.
pub async fn follow_redirects<F, Fut>(
    kind: IdentifierType,
    value: String,
    mut step: F,
) -> Result<Record, SourceError>
where
    F: FnMut(IdentifierType, String) -> Fut,
    Fut: std::future::Future<Output = Result<Resolution, SourceError>>,
{
    let mut target = (kind, value);

    for _ in 0..=MAX_REDIRECTS {
        match step(target.0, target.1).await? {
            Resolution::Record(record) => return Ok(*record),
            Resolution::Redirect(next_kind, next_value) => {
                target = (next_kind, next_value);
            }
        }
    }

    Err(SourceError::TooManyRedirects)
}

/// Resolve a single identifier, following redirects up to [`MAX_REDIRECTS`]
async fn resolve_one(
    sources: &Sources,
    id: &ClassifiedIdentifier,
) -> Result<Record, SourceError> {
    follow_redirects(id.kind, id.value.clone(), move |kind, value| async move {
        match kind {
            IdentifierType::Doi => sources
                .crossref
                .resolve(&value)
                .await
                .map(|record| Resolution::Record(Box::new(record))),
            IdentifierType::Isbn => sources
                .openlibrary
                .resolve(&value)
                .await
                .map(|record| Resolution::Record(Box::new(record))),
            IdentifierType::Url => Ok(match sources.webpage.resolve(&value).await? {
                PageOutcome::Record(record) => Resolution::Record(record),
                PageOutcome::RedirectDoi(doi) => Resolution::Redirect(IdentifierType::Doi, doi),
                PageOutcome::RedirectPmid(pmid) => {
                    Resolution::Redirect(IdentifierType::Pmid, pmid)
                }
                PageOutcome::RedirectPmcid(pmcid) => {
                    Resolution::Redirect(IdentifierType::Pmcid, pmcid)
                }
            }),
            IdentifierType::Pmid => Ok(match sources.pubmed.resolve_pmid(&value).await? {
                CtxpOutcome::Record(record) => Resolution::Record(record),
                CtxpOutcome::RedirectDoi(doi) => Resolution::Redirect(IdentifierType::Doi, doi),
            }),
            IdentifierType::Pmcid => Ok(match sources.pubmed.resolve_pmcid(&value).await? {
                CtxpOutcome::Record(record) => Resolution::Record(record),
                CtxpOutcome::RedirectDoi(doi) => Resolution::Redirect(IdentifierType::Doi, doi),
            }),
            IdentifierType::Unknown => {
                // classify_batch filters these out before dispatch
                Err(SourceError::Parse("unknown identifier type".to_string()))
            }
        }
    })
    .await
}
