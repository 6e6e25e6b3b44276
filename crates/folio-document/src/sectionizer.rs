//! Markdown sectionizer
//!
//! Splits raw markdown into heading-delimited sections, line by line. Only
//! ATX headings (`#` through `######` followed by whitespace) open sections;
//! everything else is body text. Fenced code is not special-cased, so a `#`
//! line inside a fence still opens a section.

use crate::section::Section;
use once_cell::sync::Lazy;
use regex::Regex;

static HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(#{1,6})[ \t]+(\S.*)$").expect("heading pattern is valid")
});

/// Section being accumulated
struct Pending {
    heading: Option<(String, u8)>,
    lines: Vec<String>,
}

impl Pending {
    fn introduction() -> Self {
        Self {
            heading: None,
            lines: Vec::new(),
        }
    }

    fn heading(text: &str, level: u8) -> Self {
        Self {
            heading: Some((text.trim().to_string(), level)),
            lines: Vec::new(),
        }
    }

    fn flush(self, out: &mut Vec<Section>) {
        let body = self.lines.join("\n").trim().to_string();
        match self.heading {
            Some((heading, level)) => out.push(Section::new(heading, level, body)),
            // Whitespace-only leading content does not produce a section
            None if body.is_empty() => {}
            None => out.push(Section::introduction(body)),
        }
    }
}

/// Parse a heading line into `(text, level)`
#[must_use]
pub fn parse_heading(line: &str) -> Option<(&str, u8)> {
    let caps = HEADING.captures(line)?;
    let level = caps.get(1)?.as_str().len();
    let text = caps.get(2)?.as_str().trim_end();
    Some((text, u8::try_from(level).ok()?))
}

/// Split markdown into ordered sections
///
/// Text before the first heading becomes an "Introduction" section, so a
/// document without headings yields exactly one section. Whitespace-only
/// input yields none, the same as empty input. Deterministic on content;
/// every call mints fresh identifiers.
#[must_use]
pub fn segment(markdown: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut current = Pending::introduction();

    for line in markdown.lines() {
        if let Some((text, level)) = parse_heading(line) {
            std::mem::replace(&mut current, Pending::heading(text, level)).flush(&mut sections);
        } else {
            current.lines.push(line.to_string());
        }
    }
    current.flush(&mut sections);

    tracing::debug!("Segmented document into {} sections", sections.len());
    sections
}

/// Re-assemble sections into markdown
///
/// Segmenting the output yields sections with the same headings and bodies.
#[must_use]
pub fn render_markdown(sections: &[Section]) -> String {
    let mut out = String::new();
    for section in sections {
        if !section.is_introduction() {
            let level = usize::from(section.level.clamp(1, 6));
            out.push_str(&"#".repeat(level));
            out.push(' ');
            out.push_str(&section.heading);
            out.push('\n');
        }
        if !section.body.is_empty() {
            out.push_str(&section.body);
            out.push('\n');
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::section::INTRODUCTION_HEADING;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn pairs(sections: &[Section]) -> Vec<(String, String)> {
        sections
            .iter()
            .map(|s| (s.heading.clone(), s.body.clone()))
            .collect()
    }

    #[test]
    fn empty_input_has_no_sections() {
        assert!(segment("").is_empty());
        assert!(segment(" \n\t\n").is_empty());
    }

    #[test]
    fn intro_then_heading() {
        let sections = segment("intro text\n# H1\nbody");
        assert_eq!(
            pairs(&sections),
            vec![
                (INTRODUCTION_HEADING.to_string(), "intro text".to_string()),
                ("H1".to_string(), "body".to_string()),
            ]
        );
        assert_eq!(sections[0].level, 0);
        assert_eq!(sections[1].level, 1);
    }

    #[test]
    fn consecutive_headings_have_empty_bodies() {
        let sections = segment("# A\n# B");
        assert_eq!(
            pairs(&sections),
            vec![
                ("A".to_string(), String::new()),
                ("B".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn no_headings_is_one_introduction() {
        let doc = "first line\n\nsecond paragraph";
        let sections = segment(doc);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].heading, INTRODUCTION_HEADING);
        assert_eq!(sections[0].body, doc);
    }

    #[test]
    fn body_keeps_inner_line_breaks_and_is_trimmed() {
        let sections = segment("## Steps\n\n  one\ntwo  \n\n");
        assert_eq!(sections[0].heading, "Steps");
        assert_eq!(sections[0].level, 2);
        assert_eq!(sections[0].body, "one\ntwo");
    }

    #[test]
    fn heading_rules() {
        assert_eq!(parse_heading("###### Six"), Some(("Six", 6)));
        assert_eq!(parse_heading("#   Spaced   "), Some(("Spaced", 1)));
        assert_eq!(parse_heading("####### Seven"), None);
        assert_eq!(parse_heading("#NoSpace"), None);
        assert_eq!(parse_heading(" # Indented"), None);
        assert_eq!(parse_heading("#   "), None);
    }

    #[test]
    fn blank_lead_in_is_dropped() {
        let sections = segment("\n\n   \n# Only");
        assert_eq!(pairs(&sections), vec![("Only".to_string(), String::new())]);
    }

    #[test]
    fn crlf_line_endings() {
        let sections = segment("# A\r\nline\r\n# B\r\n");
        assert_eq!(
            pairs(&sections),
            vec![
                ("A".to_string(), "line".to_string()),
                ("B".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn resegmenting_mints_new_ids() {
        let doc = "# A\nbody";
        let first = segment(doc);
        let second = segment(doc);
        assert_eq!(pairs(&first), pairs(&second));
        assert_ne!(first[0].id, second[0].id);
    }

    fn body_line() -> impl Strategy<Value = String> {
        "[a-z ,.]{0,24}"
    }

    fn heading_text() -> impl Strategy<Value = String> {
        "[A-Za-z][A-Za-z ]{0,12}[A-Za-z]"
    }

    prop_compose! {
        fn document()(
            intro in prop::collection::vec(body_line(), 0..3),
            blocks in prop::collection::vec(
                (1u8..=6, heading_text(), prop::collection::vec(body_line(), 0..4)),
                0..6,
            ),
        ) -> String {
            let mut doc = intro.join("\n");
            for (level, heading, lines) in blocks {
                doc.push('\n');
                doc.push_str(&"#".repeat(usize::from(level)));
                doc.push(' ');
                doc.push_str(&heading);
                for line in lines {
                    doc.push('\n');
                    doc.push_str(&line);
                }
            }
            doc
        }
    }

    proptest! {
        #[test]
        fn prop_segment_is_idempotent_on_content(doc in document()) {
            let first = segment(&doc);
            let second = segment(&render_markdown(&first));
            prop_assert_eq!(pairs(&first), pairs(&second));
        }
    }
}
