//! Keyword highlighting
//!
//! Wraps every case-insensitive occurrence of a keyword in bold red markup.
//! The keyword is matched literally; the surrounding text is passed through
//! untouched (it is rendered as trusted HTML).

use regex::{Regex, RegexBuilder};

/// Opening tag wrapped around each match
pub const HIGHLIGHT_OPEN: &str = r#"<span style="color:red; font-weight:bold;">"#;

/// Closing tag wrapped around each match
pub const HIGHLIGHT_CLOSE: &str = "</span>";

/// Escaped keywords only fail to compile when they exceed the regex size limit
fn keyword_pattern(keyword: &str) -> Option<Regex> {
    match RegexBuilder::new(&regex::escape(keyword))
        .case_insensitive(true)
        .build()
    {
        Ok(pattern) => Some(pattern),
        Err(e) => {
            tracing::warn!(keyword_len = keyword.len(), "Keyword not searchable: {}", e);
            None
        }
    }
}

/// Highlight all non-overlapping, case-insensitive occurrences of `keyword`.
///
/// Returns `text` unchanged when either input is empty. Matches keep their
/// original casing.
pub fn highlight(text: &str, keyword: &str) -> String {
    if text.is_empty() || keyword.is_empty() {
        return text.to_string();
    }

    let Some(pattern) = keyword_pattern(keyword) else {
        return text.to_string();
    };

    pattern
        .replace_all(text, |caps: &regex::Captures| {
            format!("{}{}{}", HIGHLIGHT_OPEN, &caps[0], HIGHLIGHT_CLOSE)
        })
        .into_owned()
}

/// Number of non-overlapping, case-insensitive occurrences of `keyword`
pub fn count_matches(text: &str, keyword: &str) -> usize {
    if text.is_empty() || keyword.is_empty() {
        return 0;
    }
    keyword_pattern(keyword)
        .map(|pattern| pattern.find_iter(text).count())
        .unwrap_or(0)
}
