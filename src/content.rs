//! HTML → clean text extraction for fetched pages.
//!
//! Strips non-content elements, prefers the main content area, collapses
//! whitespace, and truncates. The output is what enrichment hands to the
//! completion model.

use scraper::{Html, Selector};

/// Maximum characters of extracted text handed to the model.
pub const DEFAULT_MAX_CHARS: usize = 100_000;

/// Extract readable text from raw HTML.
///
/// Returns an empty string when the page has no extractable content
/// (scripts-and-styles-only pages, empty bodies).
pub fn extract_text(html: &str) -> String {
    extract_text_with_limit(html, DEFAULT_MAX_CHARS)
}

/// Same as [`extract_text`] with a custom character limit.
pub fn extract_text_with_limit(html: &str, max_chars: usize) -> String {
    let cleaned_html = strip_boilerplate_tags(html);
    let document = Html::parse_document(&cleaned_html);

    let raw_text = extract_main_text(&document);
    let text = normalise_whitespace(&raw_text);
    truncate_to_limit(&text, max_chars)
}

/// Extract text from the main content area of the document.
///
/// Tries content-specific selectors in priority order, falling back to `<body>`.
fn extract_main_text(document: &Html) -> String {
    let content_selectors = ["article", "main", "[role=\"main\"]", "body"];

    for selector_str in &content_selectors {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };
        if let Some(element) = document.select(&selector).next() {
            let text: String = element.text().collect::<Vec<_>>().join(" ");
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                return trimmed.to_owned();
            }
        }
    }

    String::new()
}

/// Remove boilerplate HTML tags and their content before parsing.
fn strip_boilerplate_tags(html: &str) -> String {
    let tags = [
        "script", "style", "nav", "footer", "header", "aside", "noscript", "svg", "iframe",
    ];

    let mut result = html.to_owned();
    for tag in &tags {
        result = strip_tag(&result, tag);
    }
    result
}

/// Remove all instances of a specific HTML tag and its content.
fn strip_tag(html: &str, tag: &str) -> String {
    let mut result = String::with_capacity(html.len());
    // ASCII-only lowercasing keeps byte offsets aligned with `html`;
    // Unicode lowercasing can change string length (e.g. U+0130).
    let lower = html.to_ascii_lowercase();
    let open_tag = format!("<{tag}");
    let close_tag = format!("</{tag}>");

    let mut pos = 0;
    loop {
        let start = match lower[pos..].find(&open_tag) {
            Some(offset) => pos + offset,
            None => {
                result.push_str(&html[pos..]);
                break;
            }
        };

        // Verify this is actually the target tag (not e.g. <navigate> for <nav>).
        let after_tag = start + open_tag.len();
        if after_tag < lower.len() {
            let next_byte = lower.as_bytes()[after_tag];
            if next_byte != b' '
                && next_byte != b'>'
                && next_byte != b'/'
                && next_byte != b'\n'
                && next_byte != b'\r'
                && next_byte != b'\t'
            {
                result.push_str(&html[pos..after_tag]);
                pos = after_tag;
                continue;
            }
        }

        result.push_str(&html[pos..start]);

        let end = match lower[start..].find(&close_tag) {
            Some(offset) => start + offset + close_tag.len(),
            None => {
                // No closing tag — skip to end of the opening tag.
                match lower[start..].find('>') {
                    Some(offset) => start + offset + 1,
                    None => html.len(),
                }
            }
        };

        pos = end;
    }

    result
}

/// Collapse excess whitespace: multiple spaces become one, 3+ newlines become 2.
fn normalise_whitespace(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut prev_was_space = false;
    let mut newline_count: u32 = 0;

    for ch in text.chars() {
        if ch == '\n' || ch == '\r' {
            newline_count += 1;
            prev_was_space = false;
            if newline_count <= 2 {
                result.push('\n');
            }
        } else if ch.is_whitespace() {
            newline_count = 0;
            if !prev_was_space {
                result.push(' ');
                prev_was_space = true;
            }
        } else {
            newline_count = 0;
            prev_was_space = false;
            result.push(ch);
        }
    }

    result
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_owned()
}

/// Truncate text to the given character limit.
fn truncate_to_limit(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_end, _)) => {
            let mut truncated = text[..byte_end].to_owned();
            truncated.push_str("\n\n[Content truncated]");
            truncated
        }
        None => text.to_owned(),
    }
}
