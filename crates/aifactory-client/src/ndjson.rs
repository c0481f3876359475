//! Newline-delimited framing for the generation stream.
//!
//! [`FrameDecoder`] turns arbitrarily split byte chunks into complete lines.
//! Splitting happens on raw bytes, so a multi-byte character cut in half by a
//! chunk boundary is reassembled before decoding. A trailing fragment without
//! its newline is never yielded; whatever is left at end of stream is dropped.

use futures::{Stream, StreamExt};

/// Incremental line splitter with a carry-over buffer.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    carry: Vec<u8>,
}

impl FrameDecoder {
    /// Create an empty decoder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk and return every line it completed, in order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.carry.extend_from_slice(chunk);

        let mut lines = Vec::new();
        let mut start = 0;
        while let Some(offset) = self.carry[start..].iter().position(|&b| b == b'\n') {
            let end = start + offset;
            lines.push(decode_line(&self.carry[start..end]));
            start = end + 1;
        }
        self.carry.drain(..start);

        lines
    }

    /// Bytes held back waiting for a newline.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.carry.len()
    }

    /// End the stream, returning how many unterminated bytes were discarded.
    #[must_use]
    pub fn finish(self) -> usize {
        self.carry.len()
    }
}

fn decode_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

/// Adapt a stream of byte chunks into a stream of complete lines.
///
/// Errors from the underlying stream are forwarded and end the line stream.
pub fn lines<S, B, E>(chunks: S) -> impl Stream<Item = Result<String, E>>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
{
    async_stream::try_stream! {
        let mut decoder = FrameDecoder::new();
        futures::pin_mut!(chunks);

        while let Some(chunk) = chunks.next().await {
            let chunk = chunk?;
            for line in decoder.push(chunk.as_ref()) {
                yield line;
            }
        }

        let dropped = decoder.finish();
        if dropped > 0 {
            tracing::debug!(bytes = dropped, "Discarding unterminated trailing fragment");
        }
    }
}
