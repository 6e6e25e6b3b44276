//! Async adapter over transport byte streams

use crate::decoder::{Decoded, StreamDecoder};
use futures::{pin_mut, Stream, StreamExt};

/// Drive a byte stream to completion
///
/// Returns the first transport error, or the decoded payload once the
/// stream ends.
pub async fn decode_stream<S, B, E>(stream: S) -> Result<Decoded, E>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
{
    decode_stream_with(stream, |_| {}).await
}

/// Drive a byte stream, observing the decoder after every chunk
pub async fn decode_stream_with<S, B, E, F>(stream: S, mut on_chunk: F) -> Result<Decoded, E>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    F: FnMut(&StreamDecoder),
{
    pin_mut!(stream);
    let mut decoder = StreamDecoder::new();

    while let Some(chunk) = stream.next().await {
        decoder.push(chunk?.as_ref());
        on_chunk(&decoder);
    }

    Ok(decoder.finish())
}
