//! Folio Synth
//!
//! Offline, deterministic content synthesis for sections. Used when no
//! generation service is configured or the service returns nothing usable.
//!
//! - [`classify`] picks a [`ContentClass`] from an ordered keyword rule table
//! - [`synthesize`] renders mermaid markup for that class
//! - [`synthesize_animation`] renders an animated HTML document instead
//!
//! Neither function can fail; a section with no usable sentences still gets
//! a minimal diagram.

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod animation;
pub mod classify;
pub mod diagram;
pub mod nodes;

pub use classify::{classify, classify_text, ContentClass, Rule, RULES};
pub use diagram::{NodeRole, Template};

use folio_document::{ContentKind, Section};

/// Mermaid markup for a section
#[must_use]
pub fn synthesize(section: &Section) -> String {
    let class = classify(section);
    tracing::debug!("Synthesizing {:?} diagram for '{}'", class, section.heading);
    diagram::render(class, &section.heading, &section.body)
}

/// Animated HTML document for a section
#[must_use]
pub fn synthesize_animation(section: &Section) -> String {
    let class = classify(section);
    tracing::debug!("Synthesizing {:?} animation for '{}'", class, section.heading);
    animation::render(class, &section.heading, &section.body)
}

/// Synthesize content of the requested kind
#[must_use]
pub fn synthesize_for(kind: ContentKind, section: &Section) -> String {
    match kind {
        ContentKind::Diagram => synthesize(section),
        ContentKind::Animation => synthesize_animation(section),
    }
}
