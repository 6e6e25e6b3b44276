//! Incremental stream decoder
//!
//! Explicit state machine: bytes are buffered, split at resolved `\n`
//! boundaries, each complete line is parsed or skipped, and fragments are
//! appended to the payload. A malformed line never fails the decode.
//!
//! ```text
//! chunk ──► buffer ──► line ──► decode_line ──► Delta ──► payload
//!                                    └────────► Skip  ──► stats
//! ```

use crate::fence::strip_fences;
use crate::frame::{decode_line, LineOutcome, SkipReason};
use serde::Deserialize;

/// Decoder counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeStats {
    /// Bytes received
    pub bytes: usize,
    /// Complete lines processed
    pub lines: usize,
    /// Lines that produced a fragment
    pub deltas: usize,
    /// Non-blank lines dropped
    pub skipped: usize,
}

/// Final decode result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    /// Fence-stripped payload
    pub text: String,
    /// Concatenated fragments before stripping
    pub raw: String,
    /// Counters
    pub stats: DecodeStats,
}

impl Decoded {
    fn from_raw(raw: String, stats: DecodeStats) -> Self {
        Self {
            text: strip_fences(&raw).to_string(),
            raw,
            stats,
        }
    }

    /// Whether the stripped payload is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Line-buffering decoder
#[derive(Debug, Default)]
pub struct StreamDecoder {
    /// Bytes of the current, unterminated line
    buffer: Vec<u8>,
    /// Fragments so far, in arrival order
    payload: String,
    stats: DecodeStats,
}

impl StreamDecoder {
    /// Create decoder
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one transport chunk
    ///
    /// Returns the number of fragments this chunk completed.
    pub fn push(&mut self, chunk: &[u8]) -> usize {
        self.stats.bytes += chunk.len();
        let before = self.stats.deltas;

        let mut rest = chunk;
        while let Some(pos) = rest.iter().position(|&b| b == b'\n') {
            self.buffer.extend_from_slice(&rest[..pos]);
            let line = std::mem::take(&mut self.buffer);
            self.process(&line);
            rest = &rest[pos + 1..];
        }
        self.buffer.extend_from_slice(rest);

        self.stats.deltas - before
    }

    /// Fragments decoded so far
    #[inline]
    #[must_use]
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Current counters
    #[inline]
    #[must_use]
    pub fn stats(&self) -> DecodeStats {
        self.stats
    }

    /// End of transport: flush the trailing line and strip fences
    #[must_use]
    pub fn finish(mut self) -> Decoded {
        if !self.buffer.is_empty() {
            let line = std::mem::take(&mut self.buffer);
            self.process(&line);
        }
        tracing::debug!(
            "Stream decoded: {} lines, {} deltas, {} skipped",
            self.stats.lines,
            self.stats.deltas,
            self.stats.skipped
        );
        Decoded::from_raw(self.payload, self.stats)
    }

    fn process(&mut self, line: &[u8]) {
        self.stats.lines += 1;
        let outcome = match std::str::from_utf8(line) {
            Ok(text) => decode_line(text),
            Err(_) => LineOutcome::Skip(SkipReason::InvalidUtf8),
        };
        match outcome {
            LineOutcome::Delta(fragment) => {
                self.stats.deltas += 1;
                self.payload.push_str(&fragment);
            }
            LineOutcome::Skip(SkipReason::Empty) => {}
            LineOutcome::Skip(reason) => {
                self.stats.skipped += 1;
                tracing::trace!("Dropped stream line: {:?}", reason);
            }
        }
    }
}

/// Keys searched, in order, in a single-value response object
const RESULT_KEYS: [&str; 5] = ["text", "content", "result", "markup", "html"];

#[derive(Deserialize)]
#[serde(untagged)]
enum SingleValue {
    Text(String),
    Object(serde_json::Map<String, serde_json::Value>),
}

/// Decode a non-streamed response body
///
/// Accepts a JSON string or an object carrying one of the result keys. Any
/// other body is decoded as a single-chunk line stream.
#[must_use]
pub fn decode_single(body: &[u8]) -> Decoded {
    let stats = DecodeStats {
        bytes: body.len(),
        ..DecodeStats::default()
    };

    let extracted = match serde_json::from_slice::<SingleValue>(body) {
        Ok(SingleValue::Text(text)) => Some(text),
        Ok(SingleValue::Object(map)) => RESULT_KEYS
            .iter()
            .find_map(|key| map.get(*key).and_then(|v| v.as_str()).map(str::to_string)),
        Err(_) => None,
    };

    match extracted {
        Some(text) => Decoded::from_raw(
            text,
            DecodeStats {
                deltas: 1,
                ..stats
            },
        ),
        None => {
            let mut decoder = StreamDecoder::new();
            decoder.push(body);
            decoder.finish()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const HI_THERE: &str = "0:{\"type\":\"text-delta\",\"delta\":\"Hi\"}\n\
                            0:{\"type\":\"text-delta\",\"delta\":\" there\"}\n";

    #[test]
    fn chunk_split_mid_line() {
        let mut decoder = StreamDecoder::new();
        let second = HI_THERE.find("0:{\"type\":\"text-delta\",\"delta\":\" t").unwrap();
        let (a, b) = HI_THERE.split_at(second + 5);
        assert_eq!(decoder.push(a.as_bytes()), 1);
        assert_eq!(decoder.payload(), "Hi");
        assert_eq!(decoder.push(b.as_bytes()), 1);
        let decoded = decoder.finish();
        assert_eq!(decoded.text, "Hi there");
        assert_eq!(decoded.stats.deltas, 2);
    }

    #[test]
    fn split_inside_multibyte_character() {
        let stream = "0:\"caf\u{e9}\"\n";
        let bytes = stream.as_bytes();
        let cut = stream.find('\u{e9}').unwrap() + 1;

        let mut decoder = StreamDecoder::new();
        decoder.push(&bytes[..cut]);
        decoder.push(&bytes[cut..]);
        assert_eq!(decoder.finish().text, "caf\u{e9}");
    }

    #[test]
    fn foreign_and_malformed_lines_are_dropped() {
        let mut decoder = StreamDecoder::new();
        decoder.push(b"f:{\"messageId\":\"m1\"}\n");
        decoder.push(b"0:{broken\n");
        decoder.push(b"\xff\xfe\n");
        decoder.push(b"0:\"graph TD\"\n");
        decoder.push(b"\n");
        decoder.push(b"e:{\"finishReason\":\"stop\"}\n");

        let decoded = decoder.finish();
        assert_eq!(decoded.text, "graph TD");
        assert_eq!(decoded.stats.lines, 6);
        assert_eq!(decoded.stats.deltas, 1);
        assert_eq!(decoded.stats.skipped, 4);
    }

    #[test]
    fn unterminated_last_line_is_flushed() {
        let mut decoder = StreamDecoder::new();
        decoder.push(b"0:\"a\"\n0:\"b\"");
        assert_eq!(decoder.payload(), "a");
        assert_eq!(decoder.finish().text, "ab");
    }

    #[test]
    fn fences_are_stripped_after_concatenation() {
        let mut decoder = StreamDecoder::new();
        decoder.push(b"0:\"```mer\"\n0:\"maid\\ngraph LR\\n\"\n0:\"```\"\n");
        let decoded = decoder.finish();
        assert_eq!(decoded.raw, "```mermaid\ngraph LR\n```");
        assert_eq!(decoded.text, "graph LR");
    }

    #[test]
    fn empty_stream() {
        let decoded = StreamDecoder::new().finish();
        assert!(decoded.is_empty());
        assert_eq!(decoded.stats, DecodeStats::default());
    }

    #[test]
    fn single_value_shapes() {
        assert_eq!(decode_single(br#""graph TD""#).text, "graph TD");
        assert_eq!(
            decode_single(br#"{"content":"```html\n<p>x</p>\n```"}"#).text,
            "<p>x</p>"
        );
        assert_eq!(decode_single(br#"{"id":1,"result":"r"}"#).text, "r");
        assert_eq!(decode_single(HI_THERE.as_bytes()).text, "Hi there");
        assert!(decode_single(br#"{"other":"x"}"#).is_empty());
    }

    proptest! {
        #[test]
        fn prop_chunking_does_not_change_result(
            cuts in prop::collection::vec(0usize..HI_THERE.len(), 0..8)
        ) {
            let bytes = HI_THERE.as_bytes();
            let mut cuts = cuts;
            cuts.sort_unstable();
            cuts.dedup();

            let mut decoder = StreamDecoder::new();
            let mut start = 0;
            for cut in cuts {
                decoder.push(&bytes[start..cut]);
                start = cut;
            }
            decoder.push(&bytes[start..]);
            prop_assert_eq!(decoder.finish().text, "Hi there");
        }
    }
}
