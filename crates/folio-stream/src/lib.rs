//! Folio Stream
//!
//! Decoder for the line-oriented, prefix-tagged text-delta protocol used by
//! generation services:
//!
//! ```text
//! 0:{"type":"text-delta","id":"t1","delta":"graph TD"}
//! 0:{"type":"text-delta","id":"t1","delta":"\n    A --> B"}
//! e:{"finishReason":"stop"}
//! ```
//!
//! Only `0:` lines carry payload. Anything else is dropped without failing
//! the decode. The final payload has wrapping code fences removed.
//!
//! # Example
//!
//! ```rust
//! use folio_stream::StreamDecoder;
//!
//! let mut decoder = StreamDecoder::new();
//! decoder.push(b"0:{\"type\":\"text-delta\",\"delta\":\"Hi\"}\n0:{");
//! decoder.push(b"\"type\":\"text-delta\",\"delta\":\" there\"}\n");
//! assert_eq!(decoder.finish().text, "Hi there");
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod adapter;
pub mod decoder;
pub mod fence;
pub mod frame;

pub use adapter::{decode_stream, decode_stream_with};
pub use decoder::{decode_single, DecodeStats, Decoded, StreamDecoder};
pub use fence::strip_fences;
pub use frame::{decode_line, LineOutcome, SkipReason, PAYLOAD_MARKER, TEXT_DELTA};
