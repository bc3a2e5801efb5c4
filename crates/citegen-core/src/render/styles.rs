//! Style and locale definition retrieval
//!
//! Raw files from the CSL style and locale repositories. The raw host
//! answers missing paths with a body beginning `404:`, which is the
//! not-found signal alongside the status code.

use super::RenderError;
use crate::http::{HttpClient, HttpResponse};

const STYLES_BASE: &str =
    "https://raw.githubusercontent.com/citation-style-language/styles/master";
const LOCALES_BASE: &str =
    "https://raw.githubusercontent.com/citation-style-language/locales/master";

pub fn style_url(style: &str) -> String {
    format!("{}/{}.csl", STYLES_BASE, style)
}

pub fn locale_url(locale: &str) -> String {
    format!("{}/locales-{}.xml", LOCALES_BASE, locale)
}

fn is_not_found(response: &HttpResponse) -> bool {
    response.status == 404 || response.body.starts_with("404:")
}

pub async fn fetch_style(client: &HttpClient, style: &str) -> Result<String, RenderError> {
    let response = client.get(&style_url(style)).await?;
    if is_not_found(&response) {
        return Err(RenderError::StyleNotFound(style.to_string()));
    }
    Ok(response.body)
}

pub async fn fetch_locale(client: &HttpClient, locale: &str) -> Result<String, RenderError> {
    let response = client.get(&locale_url(locale)).await?;
    if is_not_found(&response) {
        return Err(RenderError::LocaleNotFound(locale.to_string()));
    }
    Ok(response.body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_url() {
        assert_eq!(
            style_url("apa"),
            "https://raw.githubusercontent.com/citation-style-language/styles/master/apa.csl"
        );
    }

    #[test]
    fn test_locale_url() {
        assert_eq!(
            locale_url("en-US"),
            "https://raw.githubusercontent.com/citation-style-language/locales/master/locales-en-US.xml"
        );
    }

    #[test]
    fn test_not_found_detection() {
        let missing = HttpResponse {
            status: 200,
            body: "404: Not Found".to_string(),
        };
        assert!(is_not_found(&missing));

        let ok = HttpResponse {
            status: 200,
            body: "<style/>".to_string(),
        };
        assert!(!is_not_found(&ok));
    }
}
