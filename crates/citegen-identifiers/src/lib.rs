//! citegen-identifiers: classification and validation of bibliographic identifiers
//!
//! Turns raw user-supplied strings into typed identifiers:
//! - Explicit type prefixes (`doi:`, `url:`, `isbn:`, `pmid:`, `pmcid:`)
//! - Pattern matching with a fixed priority order (DOI before URL)
//! - ISBN checksum validation and DOI normalization helpers

pub mod classify;
pub mod validate;

pub use classify::{classify, ClassifiedIdentifier, IdentifierType};
pub use validate::{is_valid_isbn, normalize_doi};
