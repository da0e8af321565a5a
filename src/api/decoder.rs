//! Classification of streamed chat-completion deltas
//!
//! OpenAI-compatible providers stream `chat.completion.chunk` objects whose
//! `choices[0].delta` carries either visible answer text (`content`) or a
//! reasoning trace (`reasoning`). One payload decodes to one event.

use serde_json::Value;

/// What a decoded delta contains
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Visible answer text
    Content,
    /// Model reasoning ("thinking") text
    Thinking,
    /// Nothing usable (keep-alives, role announcements, malformed payloads)
    Unknown,
}

/// A single decoded delta. `text` is empty when `kind` is [`EventKind::Unknown`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedEvent {
    pub kind: EventKind,
    pub text: String,
}

impl DecodedEvent {
    fn unknown() -> Self {
        Self {
            kind: EventKind::Unknown,
            text: String::new(),
        }
    }
}

/// Decode one SSE `data:` payload into a [`DecodedEvent`].
///
/// Never fails: payloads that are not JSON, or are JSON of an unexpected
/// shape, classify as `Unknown`. When a delta carries both `content` and
/// `reasoning`, content wins.
pub fn decode_delta(payload: &str) -> DecodedEvent {
    if payload.is_empty() || payload == "[DONE]" {
        return DecodedEvent::unknown();
    }

    let json: Value = match serde_json::from_str(payload) {
        Ok(v) => v,
        Err(_) => return DecodedEvent::unknown(),
    };

    let delta = &json["choices"][0]["delta"];
    if !delta.is_object() {
        return DecodedEvent::unknown();
    }

    if let Some(content) = delta["content"].as_str() {
        if !content.is_empty() {
            return DecodedEvent {
                kind: EventKind::Content,
                text: content.to_string(),
            };
        }
    }

    if let Some(reasoning) = delta["reasoning"].as_str() {
        if !reasoning.is_empty() {
            return DecodedEvent {
                kind: EventKind::Thinking,
                text: reasoning.to_string(),
            };
        }
    }

    DecodedEvent::unknown()
}
