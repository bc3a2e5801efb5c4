//! Source adapters for external bibliographic data
//!
//! One module per identifier type. Each adapter separates pure response
//! parsing (testable offline) from the async fetch path, and reports
//! failures through [`SourceError`].

pub mod crossref;
pub mod openlibrary;
pub mod pubmed;
pub mod traits;
pub mod webpage;

pub use traits::SourceError;
