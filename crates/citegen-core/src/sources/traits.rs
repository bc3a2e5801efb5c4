//! Common types for source adapters

use thiserror::Error;

use crate::http::HttpError;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error(transparent)]
    Http(#[from] HttpError),
    #[error("could not parse response: {0}")]
    Parse(String),
    /// Upstream reports no such identifier (404, empty result, error body)
    #[error("identifier not found at source")]
    NotFound,
    /// Target page refused the request (403)
    #[error("access to page forbidden")]
    Forbidden,
    /// Redirect chain exceeded the hard depth limit
    #[error("too many cross-identifier redirects")]
    TooManyRedirects,
}
