//! Stateful reassembly of SSE streaming responses
//!
//! Network chunks arrive with no alignment to SSE framing: a single chunk can
//! hold several events, half an event, or nothing. The reassembler buffers
//! whatever has arrived so far, extracts every fully received event, decodes
//! the `data:` payloads, and hands `(text, kind)` pairs to a sink in arrival
//! order. Partial trailing bytes stay buffered for the next call.

use super::decoder::{decode_delta, EventKind};

/// Buffering SSE decoder for one logical stream.
///
/// One instance per connection; `feed` must be driven from a single task.
pub struct SseReassembler {
    buffer: String,
}

impl SseReassembler {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
        }
    }

    /// Feed one raw transport chunk, invoking `sink` once per decoded event.
    ///
    /// Only events completed by this chunk are flushed; an event split across
    /// chunks is delivered exactly once, after its final separator arrives.
    /// A `[DONE]` sentinel (or an empty `data:` payload) clears the buffer and
    /// drops any events still queued behind it in the same flush.
    pub fn feed<F>(&mut self, chunk: &str, mut sink: F)
    where
        F: FnMut(&str, EventKind),
    {
        self.buffer.push_str(chunk);

        // Cut at the last complete event boundary, preferring whichever
        // framing style ends later in the buffer.
        let crlf_end = self.buffer.rfind("\r\n\r\n").map(|pos| pos + 4);
        let lf_end = self.buffer.rfind("\n\n").map(|pos| pos + 2);
        let cut = match crlf_end.into_iter().chain(lf_end).max() {
            Some(pos) => pos,
            None => return, // no complete event yet, wait for more data
        };

        let complete = self.buffer[..cut].to_string();
        self.buffer = self.buffer[cut..].to_string();

        for event in split_events(&complete) {
            let event = event.trim();
            if event.is_empty() {
                continue;
            }

            let payload = match event.strip_prefix("data:") {
                Some(rest) => rest.trim(),
                None => continue, // comments, event names, other SSE fields
            };

            if payload.is_empty() || payload == "[DONE]" {
                self.buffer.clear();
                return;
            }

            let decoded = decode_delta(payload);
            if !decoded.text.is_empty() {
                sink(&escape_newlines(&decoded.text), decoded.kind);
            }
        }
    }
}

impl Default for SseReassembler {
    fn default() -> Self {
        Self::new()
    }
}

/// Split a run of complete events on blank-line separators, accepting either
/// line-ending style on each side of the blank line. Empty pieces are dropped.
fn split_events(data: &str) -> Vec<&str> {
    let bytes = data.as_bytes();
    let mut events = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if let Some(len) = separator_len(bytes, i) {
            if i > start {
                events.push(&data[start..i]);
            }
            i += len;
            start = i;
        } else {
            i += 1;
        }
    }

    if start < bytes.len() {
        events.push(&data[start..]);
    }

    events
}

/// Length of the blank-line separator starting at `pos`, if any.
fn separator_len(bytes: &[u8], pos: usize) -> Option<usize> {
    const SEPARATORS: [&[u8]; 4] = [b"\r\n\r\n", b"\r\n\n", b"\n\r\n", b"\n\n"];
    SEPARATORS
        .iter()
        .find(|sep| bytes[pos..].starts_with(sep))
        .map(|sep| sep.len())
}

/// Replace every newline with the literal two-character sequence `\n` so a
/// delta survives line-oriented transports unmangled.
fn escape_newlines(text: &str) -> String {
    text.replace("\r\n", "\\n")
        .replace('\n', "\\n")
        .replace('\r', "\\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(reassembler: &mut SseReassembler, chunk: &str) -> Vec<(String, EventKind)> {
        let mut out = Vec::new();
        reassembler.feed(chunk, |text, kind| out.push((text.to_string(), kind)));
        out
    }

    fn content_event(text: &str) -> String {
        format!(
            "data: {{\"choices\":[{{\"delta\":{{\"content\":\"{}\"}}}}]}}\n\n",
            text
        )
    }

    #[test]
    fn test_single_event_single_chunk() {
        let mut reassembler = SseReassembler::new();
        let events = collect(&mut reassembler, &content_event("hi"));
        assert_eq!(events, vec![("hi".to_string(), EventKind::Content)]);
        assert!(reassembler.buffer.is_empty());
    }

    #[test]
    fn test_byte_at_a_time_delivery() {
        let raw = "data: {\"choices\":[{\"delta\":{\"content\":\"hi\"}}]}\n\n";
        let mut reassembler = SseReassembler::new();
        let mut events = Vec::new();

        for (i, _) in raw.char_indices() {
            reassembler.feed(&raw[i..i + 1], |text, kind| {
                events.push((text.to_string(), kind));
            });
        }

        assert_eq!(events, vec![("hi".to_string(), EventKind::Content)]);
    }

    #[test]
    fn test_arbitrary_split_points() {
        let raw = format!("{}{}", content_event("one"), content_event("two"));
        for split in 1..raw.len() - 1 {
            let mut reassembler = SseReassembler::new();
            let mut events = collect(&mut reassembler, &raw[..split]);
            events.extend(collect(&mut reassembler, &raw[split..]));
            assert_eq!(
                events,
                vec![
                    ("one".to_string(), EventKind::Content),
                    ("two".to_string(), EventKind::Content),
                ],
                "split at byte {}",
                split
            );
        }
    }

    #[test]
    fn test_two_events_one_chunk_in_order() {
        let chunk = format!("{}{}", content_event("A"), content_event("B"));
        let mut reassembler = SseReassembler::new();
        let events = collect(&mut reassembler, &chunk);
        assert_eq!(
            events,
            vec![
                ("A".to_string(), EventKind::Content),
                ("B".to_string(), EventKind::Content),
            ]
        );
    }

    #[test]
    fn test_crlf_framing() {
        let chunk = "data: {\"choices\":[{\"delta\":{\"content\":\"crlf\"}}]}\r\n\r\n";
        let mut reassembler = SseReassembler::new();
        let events = collect(&mut reassembler, chunk);
        assert_eq!(events, vec![("crlf".to_string(), EventKind::Content)]);
    }

    #[test]
    fn test_mixed_framing_styles() {
        let chunk = format!(
            "data: {{\"choices\":[{{\"delta\":{{\"content\":\"A\"}}}}]}}\r\n\r\n{}",
            content_event("B")
        );
        let mut reassembler = SseReassembler::new();
        let events = collect(&mut reassembler, &chunk);
        assert_eq!(
            events,
            vec![
                ("A".to_string(), EventKind::Content),
                ("B".to_string(), EventKind::Content),
            ]
        );
    }

    #[test]
    fn test_incomplete_event_stays_buffered() {
        let mut reassembler = SseReassembler::new();
        let events = collect(&mut reassembler, "data: {\"choices\":[{\"delta\"");
        assert!(events.is_empty());
        assert!(!reassembler.buffer.is_empty());
    }

    #[test]
    fn test_done_clears_buffer() {
        let mut reassembler = SseReassembler::new();
        let chunk = format!("{}data: [DONE]\n\ntrailing partial", content_event("hi"));
        let events = collect(&mut reassembler, &chunk);
        assert_eq!(events, vec![("hi".to_string(), EventKind::Content)]);
        assert!(reassembler.buffer.is_empty());
    }

    #[test]
    fn test_done_suppresses_queued_events_in_same_flush() {
        let chunk = format!("data: [DONE]\n\n{}", content_event("late"));
        let mut reassembler = SseReassembler::new();
        let events = collect(&mut reassembler, &chunk);
        assert!(events.is_empty());
        assert!(reassembler.buffer.is_empty());
    }

    #[test]
    fn test_newlines_escaped_for_sink() {
        let chunk =
            "data: {\"choices\":[{\"delta\":{\"content\":\"line1\\nline2\\r\\nline3\"}}]}\n\n";
        let mut reassembler = SseReassembler::new();
        let events = collect(&mut reassembler, chunk);
        assert_eq!(
            events,
            vec![("line1\\nline2\\nline3".to_string(), EventKind::Content)]
        );
    }

    #[test]
    fn test_thinking_events_forwarded() {
        let chunk = "data: {\"choices\":[{\"delta\":{\"reasoning\":\"hmm\"}}]}\n\n";
        let mut reassembler = SseReassembler::new();
        let events = collect(&mut reassembler, chunk);
        assert_eq!(events, vec![("hmm".to_string(), EventKind::Thinking)]);
    }

    #[test]
    fn test_comments_and_other_fields_skipped() {
        let chunk = format!(
            ": keep-alive\n\nevent: message\n\n{}",
            content_event("payload")
        );
        let mut reassembler = SseReassembler::new();
        let events = collect(&mut reassembler, &chunk);
        assert_eq!(events, vec![("payload".to_string(), EventKind::Content)]);
    }

    #[test]
    fn test_malformed_payload_decodes_to_nothing() {
        let mut reassembler = SseReassembler::new();
        let events = collect(&mut reassembler, "data: {broken json\n\n");
        assert!(events.is_empty());
        // the malformed event was still consumed from the buffer
        assert!(reassembler.buffer.is_empty());
    }

    #[test]
    fn test_empty_chunk_is_noop() {
        let mut reassembler = SseReassembler::new();
        collect(&mut reassembler, "data: {\"choices\"");
        let buffered = reassembler.buffer.clone();

        let events = collect(&mut reassembler, "");
        assert!(events.is_empty());
        assert_eq!(reassembler.buffer, buffered);
    }

    #[test]
    fn test_split_events_handles_mixed_separators() {
        let pieces = split_events("a\n\nb\r\n\r\nc\n\r\nd");
        assert_eq!(pieces, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_split_events_drops_empty_pieces() {
        let pieces = split_events("\n\na\n\n\n\n");
        assert_eq!(pieces, vec!["a"]);
    }
}
