//! Free-text line handling and link checks for rendered HTML.
use askama::Template;
use url::Url;

/// Splits free text into trimmed, non-empty lines.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

#[derive(Template)]
#[template(path = "multiline.html")]
struct Multiline<'a> {
    lines: Vec<&'a str>,
}

/// Escaped free text with its line breaks kept as `<br>`.
pub fn multiline(text: &str) -> String {
    Multiline {
        lines: split_lines(text),
    }
    .to_string()
}

/// A link target that is safe to put in an `href`. Anything that is not an
/// absolute http(s) or mailto URL becomes `#`. Escaping is left to the
/// template that emits it.
pub fn safe_href(raw: &str) -> String {
    match Url::parse(raw.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https" | "mailto") => url.into(),
        _ => "#".to_string(),
    }
}

/// Truncates to at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Restricts a value to characters that are safe inside a CSS class name.
pub(crate) fn css_token(raw: &str) -> String {
    raw.chars()
        .map(|c| c.to_ascii_lowercase())
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect()
}
