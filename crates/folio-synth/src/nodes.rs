//! Sentence-to-node derivation

use crate::classify::mentions;
use pulldown_cmark::{Event, Parser, TagEnd};

/// Sentences this short (in characters) or shorter are fragments
pub const MIN_SENTENCE_LEN: usize = 20;

/// Character budget of an unmatched sentence label
pub const LABEL_BUDGET: usize = 30;

/// Character budget of the root (heading) label
pub const HEADING_BUDGET: usize = 40;

const ELLIPSIS: &str = "...";

/// Keyword-to-label substitution
struct LabelRule {
    keywords: &'static [&'static str],
    label: &'static str,
}

const LABEL_RULES: &[LabelRule] = &[
    LabelRule {
        keywords: &["first", "initially"],
        label: "Initial Setup",
    },
    LabelRule {
        keywords: &["configure", "install", "setup"],
        label: "Configuration",
    },
    LabelRule {
        keywords: &["then", "next", "after"],
        label: "Next Phase",
    },
    LabelRule {
        keywords: &["validate", "verify", "test"],
        label: "Validation",
    },
    LabelRule {
        keywords: &["finally", "lastly"],
        label: "Final Step",
    },
];

/// Reduce markdown to plain text, one block per line
#[must_use]
pub fn plain_text(markdown: &str) -> String {
    let mut out = String::with_capacity(markdown.len());
    for event in Parser::new(markdown) {
        match event {
            Event::Text(text) | Event::Code(text) => out.push_str(&text),
            Event::SoftBreak | Event::HardBreak => out.push(' '),
            Event::End(
                TagEnd::Paragraph | TagEnd::Item | TagEnd::Heading(_) | TagEnd::CodeBlock,
            ) => {
                out.push('\n');
            }
            _ => {}
        }
    }
    out
}

/// Qualifying sentences of a markdown body, in order
#[must_use]
pub fn sentences(body: &str) -> Vec<String> {
    plain_text(body)
        .split(['.', '!', '?', '\n'])
        .map(|s| s.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|s| s.chars().count() > MIN_SENTENCE_LEN)
        .collect()
}

/// Truncate to `budget` characters, appending an ellipsis when cut
#[must_use]
pub fn truncate(text: &str, budget: usize) -> String {
    if text.chars().count() <= budget {
        return text.to_string();
    }
    let cut: String = text.chars().take(budget).collect();
    format!("{}{ELLIPSIS}", cut.trim_end())
}

/// Make text safe inside a quoted mermaid label
#[must_use]
pub fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '"' | '`' => '\'',
            '<' | '>' | '#' | ';' => ' ',
            c if c.is_control() => ' ',
            c => c,
        })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Label for one sentence
#[must_use]
pub fn label_for(sentence: &str) -> String {
    let lower = sentence.to_lowercase();
    LABEL_RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|k| mentions(&lower, k)))
        .map_or_else(|| truncate(&sanitize(sentence), LABEL_BUDGET), |rule| rule.label.to_string())
}

/// Up to `limit` node labels derived from a body
#[must_use]
pub fn derive_labels(body: &str, limit: usize) -> Vec<String> {
    sentences(body)
        .iter()
        .take(limit)
        .map(|s| label_for(s))
        .collect()
}

/// Root label derived from a heading
#[must_use]
pub fn heading_label(heading: &str) -> String {
    let label = truncate(&sanitize(heading), HEADING_BUDGET);
    if label.is_empty() {
        "Section".to_string()
    } else {
        label
    }
}
