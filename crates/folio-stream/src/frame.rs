//! Single-line frame parsing
//!
//! A payload line is `0:` followed by a JSON value: either an object tagged
//! `"type": "text-delta"` carrying the fragment, or a bare JSON string.

use serde::Deserialize;

/// Prefix marking a payload line
pub const PAYLOAD_MARKER: &str = "0:";

/// `type` discriminator of a text fragment
pub const TEXT_DELTA: &str = "text-delta";

/// Why a line was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// Blank line
    Empty,
    /// Line does not start with [`PAYLOAD_MARKER`]
    ForeignMarker,
    /// Line bytes are not UTF-8
    InvalidUtf8,
    /// Remainder is not a recognised JSON frame
    Malformed,
    /// Valid frame, but not a text delta
    NotTextDelta,
}

/// Result of decoding one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// Extracted text fragment
    Delta(String),
    /// Dropped line
    Skip(SkipReason),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Frame {
    Bare(String),
    Part(Part),
}

#[derive(Deserialize)]
struct Part {
    #[serde(rename = "type")]
    kind: String,
    delta: Option<String>,
    #[serde(rename = "textDelta")]
    text_delta: Option<String>,
    text: Option<String>,
}

impl Part {
    fn into_fragment(self) -> Option<String> {
        self.delta.or(self.text_delta).or(self.text)
    }
}

/// Decode one complete line (without its terminator)
#[must_use]
pub fn decode_line(line: &str) -> LineOutcome {
    let line = line.strip_suffix('\r').unwrap_or(line);
    if line.trim().is_empty() {
        return LineOutcome::Skip(SkipReason::Empty);
    }

    let Some(json) = line.strip_prefix(PAYLOAD_MARKER) else {
        return LineOutcome::Skip(SkipReason::ForeignMarker);
    };

    match serde_json::from_str::<Frame>(json) {
        Ok(Frame::Bare(text)) => LineOutcome::Delta(text),
        Ok(Frame::Part(part)) if part.kind == TEXT_DELTA => match part.into_fragment() {
            Some(text) => LineOutcome::Delta(text),
            None => LineOutcome::Skip(SkipReason::Malformed),
        },
        Ok(Frame::Part(_)) => LineOutcome::Skip(SkipReason::NotTextDelta),
        Err(_) => LineOutcome::Skip(SkipReason::Malformed),
    }
}
