use tracing::{debug, warn};

use crate::errors::{ZettelError, ZettelResult};
use crate::types::{AssistantMessage, StreamChunk};

/// Event-stream line prefix, fixed by the chat-completions wire format
const DATA_PREFIX: &str = "data: ";

/// Non-JSON sentinel that terminates the stream
const DONE_SENTINEL: &str = "[DONE]";

/// Incremental decoder for a chat-completions event stream.
///
/// Fed raw network chunks in arrival order, it reassembles `data: {json}`
/// frames and grows an [`AssistantMessage`] from the content deltas,
/// returning each delta so the caller can mirror it (e.g. append it to a
/// note) as it arrives.
///
/// The decoder is stateful across calls: a multi-byte UTF-8 character or
/// a frame line split across two chunks is carried over and completed by
/// the next chunk, since the transport makes no alignment guarantees.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    /// Incomplete trailing UTF-8 sequence from the previous chunk
    pending_bytes: Vec<u8>,
    /// Incomplete trailing line from the previous chunk
    pending_line: String,
    message: AssistantMessage,
    role_seen: bool,
    done: bool,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The reply accumulated so far
    pub fn message(&self) -> &AssistantMessage {
        &self.message
    }

    /// True once the termination sentinel has been seen
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Consume one network chunk and return the content fragments it
    /// completed, in order. Frames that fail to parse are logged and
    /// skipped; only genuinely invalid UTF-8 is an error.
    pub fn feed(&mut self, chunk: &[u8]) -> ZettelResult<Vec<String>> {
        if self.done {
            return Ok(Vec::new());
        }

        let text = self.decode_utf8(chunk)?;
        self.pending_line.push_str(&text);

        let mut fragments = Vec::new();
        while let Some(pos) = self.pending_line.find('\n') {
            let line: String = self.pending_line.drain(..=pos).collect();
            self.handle_line(line.trim_end_matches(['\n', '\r']), &mut fragments);
            if self.done {
                break;
            }
        }
        Ok(fragments)
    }

    /// Mark the end of the stream and return the accumulated message.
    /// A final frame the transport delivered without a trailing newline
    /// is still folded in.
    pub fn finish(mut self) -> AssistantMessage {
        if !self.done && !self.pending_line.is_empty() {
            let line = std::mem::take(&mut self.pending_line);
            let mut fragments = Vec::new();
            self.handle_line(line.trim_end_matches(['\n', '\r']), &mut fragments);
        }
        self.message
    }

    /// Decode as much of the buffered bytes as is valid UTF-8, carrying
    /// an incomplete trailing sequence into the next call.
    fn decode_utf8(&mut self, chunk: &[u8]) -> ZettelResult<String> {
        self.pending_bytes.extend_from_slice(chunk);

        let valid_up_to = match std::str::from_utf8(&self.pending_bytes) {
            Ok(_) => self.pending_bytes.len(),
            Err(e) => {
                if e.error_len().is_some() {
                    return Err(ZettelError::ParsingError(
                        "Invalid UTF-8 in response stream".to_string(),
                    ));
                }
                e.valid_up_to()
            }
        };

        let tail = self.pending_bytes.split_off(valid_up_to);
        let decoded = String::from_utf8(std::mem::take(&mut self.pending_bytes))
            .map_err(|e| ZettelError::ParsingError(format!("UTF-8 decode failed: {}", e)))?;
        self.pending_bytes = tail;
        Ok(decoded)
    }

    fn handle_line(&mut self, line: &str, fragments: &mut Vec<String>) {
        if line.trim().is_empty() {
            return;
        }

        let Some(body) = line.strip_prefix(DATA_PREFIX) else {
            debug!("Skipping line without event prefix: {}", line);
            return;
        };

        if body.trim() == DONE_SENTINEL {
            debug!("Stream termination sentinel received");
            self.done = true;
            return;
        }

        let chunk: StreamChunk = match serde_json::from_str(body) {
            Ok(chunk) => chunk,
            Err(e) => {
                // A bad frame must not abort the rest of the stream
                warn!("Skipping unparseable stream frame: {}", e);
                return;
            }
        };

        let Some(choice) = chunk.choices.into_iter().next() else {
            debug!("Stream frame carried no choices");
            return;
        };

        if let Some(role) = choice.delta.role {
            // First role announcement wins; repeats are ignored
            if self.role_seen {
                debug!("Ignoring repeated role announcement: {}", role);
            } else {
                self.message.role = role;
                self.role_seen = true;
            }
        }

        if let Some(content) = choice.delta.content {
            self.message.content.push_str(&content);
            fragments.push(content);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::roles;

    fn content_frame(text: &str) -> String {
        format!(
            "data: {{\"choices\":[{{\"delta\":{{\"content\":{}}}}}]}}\n",
            serde_json::to_string(text).unwrap()
        )
    }

    #[test]
    fn role_frame_sets_role_without_fragment() {
        let mut decoder = StreamDecoder::new();
        let fragments = decoder
            .feed(b"data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n")
            .unwrap();

        assert!(fragments.is_empty());
        assert_eq!(decoder.message().role, roles::ASSISTANT);
        assert_eq!(decoder.message().content, "");
    }

    #[test]
    fn content_frames_accumulate_in_order() {
        let mut decoder = StreamDecoder::new();
        let first = decoder.feed(content_frame("hi").as_bytes()).unwrap();
        let second = decoder.feed(content_frame(" there").as_bytes()).unwrap();

        assert_eq!(first, vec!["hi"]);
        assert_eq!(second, vec![" there"]);
        assert_eq!(decoder.message().content, "hi there");
    }

    #[test]
    fn two_frames_in_one_chunk_both_decode() {
        let mut decoder = StreamDecoder::new();
        let chunk = format!("{}{}", content_frame("a"), content_frame("b"));
        let fragments = decoder.feed(chunk.as_bytes()).unwrap();

        assert_eq!(fragments, vec!["a", "b"]);
        assert_eq!(decoder.message().content, "ab");
    }

    #[test]
    fn line_split_across_chunks_is_reassembled() {
        let mut decoder = StreamDecoder::new();
        let frame = content_frame("hello");
        let (head, tail) = frame.split_at(20);

        assert!(decoder.feed(head.as_bytes()).unwrap().is_empty());
        assert_eq!(decoder.feed(tail.as_bytes()).unwrap(), vec!["hello"]);
    }

    #[test]
    fn multibyte_char_split_across_chunks_decodes() {
        let mut decoder = StreamDecoder::new();
        let frame = content_frame("안녕");
        let bytes = frame.as_bytes();
        // Split inside the first 3-byte Hangul character
        let split = frame.find('안').unwrap() + 1;

        assert!(decoder.feed(&bytes[..split]).unwrap().is_empty());
        let fragments = decoder.feed(&bytes[split..]).unwrap();

        assert_eq!(fragments, vec!["안녕"]);
        assert_eq!(decoder.message().content, "안녕");
    }

    #[test]
    fn done_sentinel_terminates_without_error() {
        let mut decoder = StreamDecoder::new();
        decoder.feed(content_frame("4").as_bytes()).unwrap();
        let fragments = decoder.feed(b"data: [DONE]\n").unwrap();

        assert!(fragments.is_empty());
        assert!(decoder.is_done());
        assert_eq!(decoder.message().content, "4");

        // Anything after the sentinel is ignored
        let late = decoder.feed(content_frame("ignored").as_bytes()).unwrap();
        assert!(late.is_empty());
        assert_eq!(decoder.finish().content, "4");
    }

    #[test]
    fn malformed_frame_is_skipped_not_fatal() {
        let mut decoder = StreamDecoder::new();
        let chunk = format!("data: {{not json}}\n{}", content_frame("ok"));
        let fragments = decoder.feed(chunk.as_bytes()).unwrap();

        assert_eq!(fragments, vec!["ok"]);
    }

    #[test]
    fn blank_lines_are_discarded() {
        let mut decoder = StreamDecoder::new();
        let chunk = format!("\n\n{}\n", content_frame("x"));
        let fragments = decoder.feed(chunk.as_bytes()).unwrap();

        assert_eq!(fragments, vec!["x"]);
    }

    #[test]
    fn repeated_role_announcements_keep_first() {
        let mut decoder = StreamDecoder::new();
        decoder
            .feed(b"data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n")
            .unwrap();
        decoder
            .feed(b"data: {\"choices\":[{\"delta\":{\"role\":\"tool\"}}]}\n")
            .unwrap();

        assert_eq!(decoder.message().role, roles::ASSISTANT);
    }

    #[test]
    fn default_role_is_assistant() {
        let mut decoder = StreamDecoder::new();
        decoder.feed(content_frame("no role frame").as_bytes()).unwrap();
        assert_eq!(decoder.finish().role, roles::ASSISTANT);
    }

    #[test]
    fn invalid_utf8_is_an_error() {
        let mut decoder = StreamDecoder::new();
        match decoder.feed(&[0xff, 0xfe, b'x']) {
            Err(ZettelError::ParsingError(_)) => {}
            other => panic!("expected ParsingError, got {:?}", other),
        }
    }

    #[test]
    fn finish_folds_in_unterminated_final_frame() {
        let mut decoder = StreamDecoder::new();
        let frame = content_frame("tail");
        // Feed the frame without its trailing newline
        decoder.feed(frame.trim_end().as_bytes()).unwrap();

        assert_eq!(decoder.finish().content, "tail");
    }
}
