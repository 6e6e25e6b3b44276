//! Animated HTML fallback
//!
//! Produces a self-contained document that reveals the derived labels as
//! staggered cards. No external scripts or styles are loaded.

use crate::classify::ContentClass;
use crate::nodes::{derive_labels, heading_label};
use folio_preview::html::escape;
use std::fmt::Write;

/// Seconds between consecutive card reveals
const STAGGER_SECS: f32 = 0.35;

const STYLE: &str = "\
body{font-family:system-ui,sans-serif;margin:0;padding:24px;background:#0f172a;color:#e2e8f0}
h1{font-size:1.25rem;margin:0 0 16px}
.card{opacity:0;transform:translateY(12px);animation:reveal .6s ease-out forwards;\
background:#1e293b;border-left:4px solid #6366f1;border-radius:6px;padding:12px 16px;margin:0 0 10px}
.card.done{border-left-color:#10b981}
@keyframes reveal{to{opacity:1;transform:none}}";

/// Render the animated document
#[must_use]
pub fn render(class: ContentClass, heading: &str, body: &str) -> String {
    let template = class.template();
    let mut cards = derive_labels(body, template.max_nodes);
    if cards.is_empty() {
        cards.extend(template.placeholder.map(str::to_string));
    }

    let title = escape(&heading_label(heading)).into_owned();
    let mut out = String::new();
    let _ = write!(
        out,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n<style>\n{STYLE}\n</style>\n</head>\n<body>\n<h1>{title}</h1>\n"
    );

    for (i, card) in cards.iter().enumerate() {
        let _ = writeln!(
            out,
            "<div class=\"card\" style=\"animation-delay:{:.2}s\">{}</div>",
            delay(i),
            escape(card)
        );
    }
    if template.terminal {
        let _ = writeln!(
            out,
            "<div class=\"card done\" style=\"animation-delay:{:.2}s\">{}</div>",
            delay(cards.len()),
            crate::diagram::TERMINAL_LABEL
        );
    }

    out.push_str("</body>\n</html>\n");
    out
}

#[allow(clippy::cast_precision_loss)]
fn delay(index: usize) -> f32 {
    index as f32 * STAGGER_SECS
}
