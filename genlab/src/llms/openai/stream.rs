//! OpenAI SSE stream parsing.

use crate::error::Result;
use crate::stream::{StopReason, StreamChunk};

use super::types::OpenAIStreamChunk;

/// Incremental decoder for `text/event-stream` bodies.
///
/// Network chunks do not respect line boundaries, so incomplete lines are
/// buffered until the next call to [`SseDecoder::feed`].
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    finished: bool,
}

impl SseDecoder {
    /// Feed raw bytes and return every chunk completed by them.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<Result<StreamChunk>> {
        self.buffer.extend_from_slice(bytes);

        let mut results = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            self.parse_line(&line, &mut results);
        }
        results
    }

    /// Parse whatever is left in the buffer once the body has ended.
    ///
    /// The final event of a body is not always newline-terminated.
    pub fn finish(&mut self) -> Vec<Result<StreamChunk>> {
        let mut results = Vec::new();
        if self.buffer.is_empty() {
            return results;
        }
        let tail = std::mem::take(&mut self.buffer);
        let line = String::from_utf8_lossy(&tail);
        self.parse_line(&line, &mut results);
        results
    }

    /// Returns `true` once `[DONE]` has been seen.
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    fn parse_line(&mut self, line: &str, results: &mut Vec<Result<StreamChunk>>) {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with(':') || self.finished {
            return;
        }

        let Some(data) = line.strip_prefix("data:") else {
            return;
        };
        let data = data.trim();

        if data == "[DONE]" {
            self.finished = true;
            results.push(Ok(StreamChunk::done(None)));
            return;
        }

        match serde_json::from_str::<OpenAIStreamChunk>(data) {
            Ok(chunk) => results.extend(convert_chunk(chunk)),
            Err(e) => {
                tracing::warn!("Failed to parse SSE chunk: {e}, data: {data}");
            }
        }
    }
}

/// Parse SSE events from a complete text buffer.
#[cfg(test)]
fn parse_sse_events(text: &str) -> Vec<Result<StreamChunk>> {
    let mut decoder = SseDecoder::default();
    let mut results = decoder.feed(text.as_bytes());
    results.extend(decoder.finish());
    results
}

/// Convert an OpenAI stream chunk to our format.
fn convert_chunk(chunk: OpenAIStreamChunk) -> Vec<Result<StreamChunk>> {
    let mut results = Vec::new();

    // Only the first choice is surfaced, matching the non-streaming response.
    if let Some(choice) = chunk.choices.into_iter().next() {
        if let Some(content) = choice.delta.content
            && !content.is_empty()
        {
            results.push(Ok(StreamChunk::text(content)));
        }

        if let Some(reason) = choice.finish_reason {
            results.push(Ok(StreamChunk::done(Some(StopReason::parse(&reason)))));
        }
    }

    if let Some(usage) = chunk.usage {
        results.push(Ok(StreamChunk::Usage(usage)));
    }

    results
}
