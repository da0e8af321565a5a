//! Streaming response support for chat providers

use super::decoder::EventKind;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

/// A piece of a streaming chat response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Visible answer text (newlines escaped as the literal sequence `\n`)
    Content(String),
    /// Model reasoning text (same newline escaping)
    Thinking(String),
    /// Stream finished, via `[DONE]` or transport close
    Done,
    /// Transport failure while streaming
    Error(String),
}

impl StreamEvent {
    /// Wrap a decoded delta for the channel. `Unknown` deltas carry no text
    /// and produce no event.
    pub fn from_decoded(text: String, kind: EventKind) -> Option<Self> {
        match kind {
            EventKind::Content => Some(StreamEvent::Content(text)),
            EventKind::Thinking => Some(StreamEvent::Thinking(text)),
            EventKind::Unknown => None,
        }
    }

    /// Restore the newlines that were escaped for transport.
    pub fn unescaped_text(&self) -> Option<String> {
        match self {
            StreamEvent::Content(text) | StreamEvent::Thinking(text) => {
                Some(text.replace("\\n", "\n"))
            }
            _ => None,
        }
    }
}

/// Adapt a receiver of stream events into a `Stream` for consumers that
/// prefer pull-style iteration over an explicit recv loop.
pub fn into_stream(rx: mpsc::Receiver<StreamEvent>) -> ReceiverStream<StreamEvent> {
    ReceiverStream::new(rx)
}
