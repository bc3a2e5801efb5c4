//! Bibliography rendering
//!
//! Retrieves the style and locale definitions, then hands the record
//! collection to a [`CitationFormatter`] engine. Style or locale retrieval
//! failure, like a formatting failure, fails the whole render; no partial
//! bibliography is ever returned.

pub mod engine;
pub mod styles;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Record;
use crate::http::{HttpClient, HttpError};

pub use engine::{AuthorDateFormatter, CitationFormatter, StyleBundle};

#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    Http(#[from] HttpError),
    #[error("citation style not found: {0}")]
    StyleNotFound(String),
    #[error("locale not found: {0}")]
    LocaleNotFound(String),
    #[error("formatting failed: {0}")]
    Format(String),
}

/// Output format for the rendered bibliography
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Html,
    Rtf,
    Asciidoc,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Html => "html",
            OutputFormat::Rtf => "rtf",
            OutputFormat::Asciidoc => "asciidoc",
        }
    }

    pub fn all() -> &'static [&'static str] {
        &["text", "html", "rtf", "asciidoc"]
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(OutputFormat::Text),
            "html" => Ok(OutputFormat::Html),
            "rtf" => Ok(OutputFormat::Rtf),
            "asciidoc" => Ok(OutputFormat::Asciidoc),
            other => Err(format!(
                "invalid format '{}', expected one of: {}",
                other,
                OutputFormat::all().join(", ")
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub style: String,
    pub locale: String,
    pub format: OutputFormat,
    pub intext: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            style: "apa".to_string(),
            locale: "en-US".to_string(),
            format: OutputFormat::Text,
            intext: false,
        }
    }
}

/// Rendered output: the reference list, and the in-text citation list
/// when requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub references: String,
    pub intext: Option<String>,
}

/// Adapter between the record store and the citation formatting engine
pub struct Renderer {
    client: HttpClient,
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            client: HttpClient::default(),
        }
    }

    /// Render records with the given style, locale and output format.
    ///
    /// The two definition fetches are sequential; either one missing fails
    /// the render as a whole.
    pub async fn render(
        &self,
        records: &[Record],
        options: &RenderOptions,
    ) -> Result<Rendered, RenderError> {
        let style_source = styles::fetch_style(&self.client, &options.style).await?;
        let locale_source = styles::fetch_locale(&self.client, &options.locale).await?;

        let bundle = StyleBundle {
            style_name: options.style.clone(),
            style_source,
            locale_name: options.locale.clone(),
            locale_source,
        };

        AuthorDateFormatter.format(records, &bundle, options.format, options.intext)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_output_format_round_trip() {
        for name in OutputFormat::all() {
            let format = OutputFormat::from_str(name).unwrap();
            assert_eq!(format.as_str(), *name);
        }
    }

    #[test]
    fn test_invalid_format_is_rejected() {
        assert!(OutputFormat::from_str("pdf").is_err());
        assert!(OutputFormat::from_str("TEXT").is_err());
    }
}
