//! Identifier validation and normalization helpers

/// Validate an ISBN-10 or ISBN-13 checksum. Hyphens and spaces are ignored.
pub fn is_valid_isbn(isbn: &str) -> bool {
    let normalized: String = isbn
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == 'X' || *c == 'x')
        .collect::<String>()
        .to_uppercase();

    match normalized.len() {
        10 => validate_isbn10(&normalized),
        13 => validate_isbn13(&normalized),
        _ => false,
    }
}

/// Strip resolver-URL and `doi:` prefixes plus trailing punctuation from a DOI
pub fn normalize_doi(doi: &str) -> String {
    let mut result = doi.trim().to_string();

    let prefixes = [
        "https://doi.org/",
        "http://doi.org/",
        "https://dx.doi.org/",
        "http://dx.doi.org/",
        "doi:",
        "DOI:",
    ];

    for prefix in prefixes {
        if let Some(stripped) = result.strip_prefix(prefix) {
            result = stripped.to_string();
            break;
        }
    }

    while let Some(c) = result.chars().last() {
        if c == '.' || c == ',' || c == ';' {
            result.pop();
        } else {
            break;
        }
    }

    result
}

fn validate_isbn10(isbn: &str) -> bool {
    let chars: Vec<char> = isbn.chars().collect();
    if chars.len() != 10 {
        return false;
    }

    for (i, &c) in chars.iter().enumerate() {
        if i < 9 {
            if !c.is_ascii_digit() {
                return false;
            }
        } else if !c.is_ascii_digit() && c != 'X' {
            return false;
        }
    }

    let sum: u32 = chars
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            let value = if c == 'X' {
                10
            } else {
                c.to_digit(10).unwrap_or(0)
            };
            value * (10 - i as u32)
        })
        .sum();

    sum % 11 == 0
}

fn validate_isbn13(isbn: &str) -> bool {
    if isbn.len() != 13 || !isbn.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }

    let sum: u32 = isbn
        .chars()
        .enumerate()
        .map(|(i, c)| {
            let value = c.to_digit(10).unwrap_or(0);
            if i % 2 == 0 {
                value
            } else {
                value * 3
            }
        })
        .sum();

    sum % 10 == 0
}
