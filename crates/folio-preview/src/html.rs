//! HTML escaping
//!
//! `Cow` avoids an allocation when nothing needs escaping.

use std::borrow::Cow;

const ESCAPE_CHARS: [char; 5] = ['<', '>', '&', '"', '\''];

#[inline]
fn entity(c: char) -> Option<&'static str> {
    match c {
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '&' => Some("&amp;"),
        '"' => Some("&quot;"),
        '\'' => Some("&#39;"),
        _ => None,
    }
}

/// Escape text content
#[must_use]
pub fn escape(s: &str) -> Cow<'_, str> {
    if !s.contains(ESCAPE_CHARS) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len() + s.len() / 4);
    for c in s.chars() {
        match entity(c) {
            Some(e) => out.push_str(e),
            None => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Escape an attribute value (always double-quoted by callers)
#[inline]
#[must_use]
pub fn escape_attr(s: &str) -> Cow<'_, str> {
    escape(s)
}

/// Lower-case, dash-separated file name fragment
#[must_use]
pub fn slug(s: &str) -> String {
    let slug = s
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    if slug.is_empty() {
        "section".to_string()
    } else {
        slug
    }
}
