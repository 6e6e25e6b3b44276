//! Section classification
//!
//! An ordered rule table: the first rule with a keyword present in the
//! section wins, and [`ContentClass::Concept`] is the fallthrough.

use folio_document::Section;

/// Shape family chosen for a section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentClass {
    /// Steps converging on a terminal node
    Workflow,
    /// Parts associated with a root
    Architecture,
    /// Left-to-right comparison points
    Comparison,
    /// Generic concept breakdown
    Concept,
}

/// One classification rule
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    /// Class assigned when the rule matches
    pub class: ContentClass,
    /// Any of these words marks a match
    pub keywords: &'static [&'static str],
}

impl Rule {
    /// Whether the lower-cased text contains any keyword
    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        self.keywords.iter().any(|k| text.contains(k))
    }
}

/// Rules in priority order
pub const RULES: [Rule; 3] = [
    Rule {
        class: ContentClass::Workflow,
        keywords: &["workflow", "process", "step"],
    },
    Rule {
        class: ContentClass::Architecture,
        keywords: &["component", "system", "architecture"],
    },
    Rule {
        class: ContentClass::Comparison,
        keywords: &["compare", "versus", "difference"],
    },
];

/// Whether any word of `text` starts with `keyword`
///
/// Both are expected lower-case. Used for node labels, where "ecosystem"
/// must not read as "system".
#[must_use]
pub fn mentions(text: &str, keyword: &str) -> bool {
    text.split(|c: char| !c.is_alphanumeric())
        .any(|word| word.starts_with(keyword))
}

/// Classify raw heading and body text
#[must_use]
pub fn classify_text(heading: &str, body: &str) -> ContentClass {
    let text = format!("{heading}\n{body}").to_lowercase();
    RULES
        .iter()
        .find(|rule| rule.matches(&text))
        .map_or(ContentClass::Concept, |rule| rule.class)
}

/// Classify a section
#[inline]
#[must_use]
pub fn classify(section: &Section) -> ContentClass {
    classify_text(&section.heading, &section.body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_rule_matches_its_keywords() {
        assert_eq!(
            classify_text("Deploy", "Our release workflow is simple"),
            ContentClass::Workflow
        );
        assert_eq!(classify_text("Steps", ""), ContentClass::Workflow);
        assert_eq!(
            classify_text("Overview", "The ARCHITECTURE has layers"),
            ContentClass::Architecture
        );
        assert_eq!(classify_text("Rust versus Go", ""), ContentClass::Comparison);
        assert_eq!(classify_text("Notes", "Nothing special here"), ContentClass::Concept);
    }

    #[test]
    fn earlier_rules_win() {
        assert_eq!(
            classify_text("Compare", "Each step of the process differs"),
            ContentClass::Workflow
        );
        assert_eq!(
            classify_text("Systems", "We compare two of them"),
            ContentClass::Architecture
        );
    }

    #[test]
    fn keywords_match_inside_words() {
        assert_eq!(
            classify_text("Design", "Each subsystem talks to the broker over a queue"),
            ContentClass::Architecture
        );
        assert_eq!(
            classify_text("Runner", "A subprocess is spawned for every job"),
            ContentClass::Workflow
        );
        assert_eq!(classify_text("Footsteps", ""), ContentClass::Workflow);
    }

    #[test]
    fn label_mentions_are_per_word() {
        assert!(mentions("processing pipeline", "process"));
        assert!(!mentions("the ecosystem", "system"));
        assert!(!mentions("footstep", "step"));
    }
}
