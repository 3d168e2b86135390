//! Streaming response types.
//!
//! Chat responses can be streamed as server-sent events; each event is turned
//! into a [`StreamChunk`] and a [`StreamAggregator`] folds them back into a
//! complete [`ChatResponse`](crate::chat::ChatResponse).

use serde::{Deserialize, Serialize};

use crate::usage::Usage;

/// A chunk of a streaming response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum StreamChunk {
    /// Text content chunk.
    Text {
        /// The text delta.
        content: String,
    },

    /// Token usage information.
    Usage(Usage),

    /// Stream is complete.
    Done {
        /// Stop reason from the model.
        stop_reason: Option<StopReason>,
    },
}

impl StreamChunk {
    /// Creates a text chunk.
    #[inline]
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text {
            content: content.into(),
        }
    }

    /// Creates a done chunk.
    #[inline]
    #[must_use]
    pub const fn done(stop_reason: Option<StopReason>) -> Self {
        Self::Done { stop_reason }
    }

    /// Returns the text content if this is a text chunk.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { content } => Some(content),
            _ => None,
        }
    }

    /// Returns `true` if this chunk terminates the stream.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        matches!(self, Self::Done { .. })
    }
}

/// Reason why the model stopped generating.
///
/// Maps to `finish_reason` in completion and chat responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum StopReason {
    /// Natural stop (end of response or stop sequence).
    #[default]
    Stop,
    /// Maximum token limit reached.
    Length,
    /// Content was filtered by safety systems.
    ContentFilter,
}

impl StopReason {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Stop => "stop",
            Self::Length => "length",
            Self::ContentFilter => "content_filter",
        }
    }

    /// Parse from a `finish_reason` string (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "length" | "max_tokens" => Self::Length,
            "content_filter" => Self::ContentFilter,
            // "stop" and anything unrecognised
            _ => Self::Stop,
        }
    }

    /// Parse an optional `finish_reason`, treating absence as a normal stop.
    #[must_use]
    pub fn from_finish_reason(reason: Option<&str>) -> Self {
        reason.map(Self::parse).unwrap_or_default()
    }

    /// Returns `true` if the model was cut off due to length.
    #[must_use]
    pub const fn is_truncated(&self) -> bool {
        matches!(self, Self::Length)
    }

    /// Returns `true` if content was filtered.
    #[must_use]
    pub const fn is_filtered(&self) -> bool {
        matches!(self, Self::ContentFilter)
    }
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregator for building a complete response from stream chunks.
#[derive(Debug, Clone, Default)]
pub struct StreamAggregator {
    text: String,
    usage: Option<Usage>,
    stop_reason: Option<StopReason>,
}

impl StreamAggregator {
    /// Creates a new aggregator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a stream chunk to the aggregator.
    pub fn apply(&mut self, chunk: &StreamChunk) {
        match chunk {
            StreamChunk::Text { content } => self.text.push_str(content),
            StreamChunk::Usage(usage) => self.usage = Some(*usage),
            StreamChunk::Done { stop_reason } => {
                // [DONE] carries no reason; keep the one from finish_reason.
                if stop_reason.is_some() || self.stop_reason.is_none() {
                    self.stop_reason = *stop_reason;
                }
            }
        }
    }

    /// Returns the current accumulated text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the accumulated usage.
    #[must_use]
    pub const fn usage(&self) -> Option<Usage> {
        self.usage
    }

    /// Returns the stop reason.
    #[must_use]
    pub const fn stop_reason(&self) -> Option<StopReason> {
        self.stop_reason
    }

    /// Converts the accumulated stream data into a [`ChatResponse`](crate::chat::ChatResponse).
    #[must_use]
    pub fn into_chat_response(self) -> crate::chat::ChatResponse {
        use crate::chat::ChatResponse;
        use crate::message::Message;

        let mut response = ChatResponse::new(Message::assistant(self.text))
            .with_stop_reason(self.stop_reason.unwrap_or_default());
        if let Some(usage) = self.usage {
            response = response.with_usage(usage);
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod stop_reason {
        use super::*;

        #[test]
        fn parses_known_reasons() {
            assert_eq!(StopReason::parse("stop"), StopReason::Stop);
            assert_eq!(StopReason::parse("length"), StopReason::Length);
            assert_eq!(StopReason::parse("LENGTH"), StopReason::Length);
            assert_eq!(
                StopReason::parse("content_filter"),
                StopReason::ContentFilter
            );
        }

        #[test]
        fn unknown_and_missing_default_to_stop() {
            assert_eq!(StopReason::parse("something_new"), StopReason::Stop);
            assert_eq!(StopReason::from_finish_reason(None), StopReason::Stop);
        }

        #[test]
        fn predicates() {
            assert!(StopReason::Length.is_truncated());
            assert!(StopReason::ContentFilter.is_filtered());
            assert!(!StopReason::Stop.is_truncated());
        }
    }

    mod aggregator {
        use super::*;

        #[test]
        fn concatenates_text_and_keeps_finish_reason() {
            let mut agg = StreamAggregator::new();
            agg.apply(&StreamChunk::text("Hello"));
            agg.apply(&StreamChunk::text(", world"));
            agg.apply(&StreamChunk::done(Some(StopReason::Length)));
            agg.apply(&StreamChunk::Usage(Usage::new(4, 2)));
            agg.apply(&StreamChunk::done(None));

            assert_eq!(agg.text(), "Hello, world");
            assert_eq!(agg.stop_reason(), Some(StopReason::Length));
            assert_eq!(agg.usage(), Some(Usage::new(4, 2)));

            let response = agg.into_chat_response();
            assert_eq!(response.text().as_deref(), Some("Hello, world"));
            assert!(response.is_truncated());
        }

        #[test]
        fn empty_stream_gives_empty_assistant_message() {
            let response = StreamAggregator::new().into_chat_response();
            assert_eq!(response.text().as_deref(), Some(""));
            assert!(response.usage.is_none());
        }
    }
}
