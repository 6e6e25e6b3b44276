//! Fence stripping
//!
//! Generated output often arrives wrapped in a markdown code fence. Only
//! untagged, `mermaid` and `html` fences are removed; a fence with any other
//! tag is left as it is.

const FENCE: &str = "```";
const KNOWN_TAGS: [&str; 2] = ["mermaid", "html"];

fn is_known_tag(tag: &str) -> bool {
    tag.is_empty() || KNOWN_TAGS.iter().any(|k| tag.eq_ignore_ascii_case(k))
}

/// Strip wrapping fences and surrounding whitespace
#[must_use]
pub fn strip_fences(text: &str) -> &str {
    let mut body = text.trim();

    if let Some(rest) = body.strip_prefix(FENCE) {
        let (tag_line, remainder) = rest.split_once('\n').unwrap_or((rest, ""));
        if !is_known_tag(tag_line.trim()) {
            return body;
        }
        body = remainder;
    }

    let body = body.trim_end();
    body.strip_suffix(FENCE).unwrap_or(body).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_mermaid_fence() {
        assert_eq!(
            strip_fences("```mermaid\ngraph TD\n    A --> B\n```\n"),
            "graph TD\n    A --> B"
        );
    }

    #[test]
    fn strips_html_fence_case_insensitive() {
        assert_eq!(strip_fences("  ```HTML\n<p>hi</p>\n```"), "<p>hi</p>");
    }

    #[test]
    fn strips_untagged_fence() {
        assert_eq!(strip_fences("```\nflowchart LR\n```"), "flowchart LR");
    }

    #[test]
    fn strips_lone_trailing_fence() {
        assert_eq!(strip_fences("graph TD\n```"), "graph TD");
    }

    #[test]
    fn leaves_unknown_fence() {
        let text = "```json\n{}\n```";
        assert_eq!(strip_fences(text), text);
    }

    #[test]
    fn plain_text_is_trimmed() {
        assert_eq!(strip_fences("\n  graph TD  \n"), "graph TD");
        assert_eq!(strip_fences("```mermaid"), "");
    }
}
