//! Citation formatting engine seam
//!
//! The processing engine is an external collaborator behind
//! [`CitationFormatter`]: it takes the record collection plus the fetched
//! style and locale sources and returns formatted strings. The built-in
//! [`AuthorDateFormatter`] is a small author–date engine; full CSL grammar
//! evaluation stays outside this crate.

use super::{OutputFormat, RenderError, Rendered};
use crate::domain::{Name, Record};

/// The style/locale pair handed to the engine, as fetched
#[derive(Debug, Clone)]
pub struct StyleBundle {
    pub style_name: String,
    pub style_source: String,
    pub locale_name: String,
    pub locale_source: String,
}

pub trait CitationFormatter {
    /// Produce the reference list and, when requested, the in-text list.
    /// Entries are joined with newlines, never concatenated.
    fn format(
        &self,
        records: &[Record],
        bundle: &StyleBundle,
        format: OutputFormat,
        intext: bool,
    ) -> Result<Rendered, RenderError>;
}

/// Built-in author–date engine
pub struct AuthorDateFormatter;

impl CitationFormatter for AuthorDateFormatter {
    fn format(
        &self,
        records: &[Record],
        _bundle: &StyleBundle,
        format: OutputFormat,
        intext: bool,
    ) -> Result<Rendered, RenderError> {
        let entries: Vec<String> = records.iter().map(reference_entry).collect();
        let references = assemble(&entries, format);

        let intext = if intext {
            let short: Vec<String> = records.iter().map(intext_entry).collect();
            Some(assemble(&short, format))
        } else {
            None
        };

        Ok(Rendered { references, intext })
    }
}

fn assemble(entries: &[String], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => entries.join("\n"),
        OutputFormat::Html => {
            let wrapped: Vec<String> = entries
                .iter()
                .map(|e| format!("  <div class=\"csl-entry\">{}</div>", escape_html(e)))
                .collect();
            format!(
                "<div class=\"csl-bib-body\">\n{}\n</div>",
                wrapped.join("\n")
            )
        }
        OutputFormat::Rtf => {
            let wrapped: Vec<String> = entries.iter().map(|e| format!("{}\\par", e)).collect();
            format!("{{\\rtf1\\ansi\n{}\n}}", wrapped.join("\n"))
        }
        OutputFormat::Asciidoc => {
            let wrapped: Vec<String> = entries.iter().map(|e| format!("* {}", e)).collect();
            wrapped.join("\n")
        }
    }
}

/// One full reference-list entry in author–date order:
/// authors (year). title. container, volume(issue), pages. publisher. link.
fn reference_entry(record: &Record) -> String {
    let mut parts: Vec<String> = Vec::new();

    let authors = format_authors(&record.authors);
    let year = record
        .issued
        .as_ref()
        .and_then(|d| d.first_year())
        .map(|y| y.to_string())
        .unwrap_or_else(|| "n.d.".to_string());

    if authors.is_empty() {
        parts.push(format!("({}).", year));
    } else {
        parts.push(format!("{} ({}).", authors, year));
    }

    if let Some(title) = &record.title {
        parts.push(format!("{}.", title));
    }

    if let Some(container) = &record.container_title {
        let mut segment = container.clone();
        if let Some(volume) = &record.volume {
            segment.push_str(&format!(", {}", volume));
            if let Some(issue) = &record.issue {
                segment.push_str(&format!("({})", issue));
            }
        }
        if let Some(page) = &record.page {
            segment.push_str(&format!(", {}", page));
        }
        parts.push(format!("{}.", segment));
    }

    match (&record.publisher, &record.publisher_place) {
        (Some(publisher), Some(place)) => parts.push(format!("{}: {}.", place, publisher)),
        (Some(publisher), None) => parts.push(format!("{}.", publisher)),
        _ => {}
    }

    if let Some(doi) = &record.doi {
        parts.push(format!("https://doi.org/{}", doi));
    } else if let Some(url) = &record.url {
        parts.push(url.clone());
    }

    parts.join(" ")
}

/// The short parenthetical form: (Family, Year), (Family & Family, Year),
/// (Family et al., Year), falling back to the title when no authors exist.
fn intext_entry(record: &Record) -> String {
    let year = record
        .issued
        .as_ref()
        .and_then(|d| d.first_year())
        .map(|y| y.to_string())
        .unwrap_or_else(|| "n.d.".to_string());

    let families: Vec<&str> = record
        .authors
        .iter()
        .filter_map(|n| n.family.as_deref().or(n.given.as_deref()))
        .collect();

    let subject = match families.len() {
        0 => record
            .title
            .clone()
            .unwrap_or_else(|| record.id.clone()),
        1 => families[0].to_string(),
        2 => format!("{} & {}", families[0], families[1]),
        _ => format!("{} et al.", families[0]),
    };

    format!("({}, {})", subject, year)
}

fn format_authors(authors: &[Name]) -> String {
    let formatted: Vec<String> = authors
        .iter()
        .filter_map(|name| match (&name.family, &name.given) {
            (Some(family), Some(given)) => {
                let initials: String = given
                    .split_whitespace()
                    .filter_map(|t| t.chars().next())
                    .map(|c| format!("{}.", c))
                    .collect::<Vec<_>>()
                    .join(" ");
                Some(format!("{}, {}", family, initials))
            }
            (Some(family), None) => Some(family.clone()),
            (None, Some(given)) => Some(given.clone()),
            (None, None) => None,
        })
        .collect();

    match formatted.len() {
        0 => String::new(),
        1 => formatted[0].clone(),
        _ => {
            let mut rest = formatted;
            let last = rest.pop().unwrap_or_default();
            format!("{}, & {}", rest.join(", "), last)
        }
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
