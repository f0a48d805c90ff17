use encoding_rs::{CoderResult, Decoder, UTF_8};
use engine_logging::engine_debug;
use serde_json::Value;

use crate::StreamEvent;

const FRAME_SEPARATOR: &str = "\n\n";
const DATA_PREFIX: &str = "data: ";

/// Outcome of decoding one `data:` line.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedFrame {
    Event(StreamEvent),
    /// Keepalives, non-JSON text and frames with nothing to act on.
    Ignorable,
    /// The stream broke framing in a way the client cannot recover from.
    Fatal(String),
}

/// Incremental decoder for the event stream.
///
/// Bytes are decoded to UTF-8 with a streaming decoder, so a multi-byte
/// character split across two network reads survives intact. Frames are
/// separated by a blank line; text after the last separator is kept until
/// more bytes arrive.
pub struct FrameDecoder {
    decoder: Decoder,
    buffer: String,
    max_frame_bytes: usize,
}

impl FrameDecoder {
    pub fn new(max_frame_bytes: usize) -> Self {
        Self {
            decoder: UTF_8.new_decoder(),
            buffer: String::new(),
            max_frame_bytes,
        }
    }

    /// Feeds one network read and returns every frame it completed.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<DecodedFrame> {
        self.decode_into_buffer(bytes, false);
        let mut frames = self.drain_complete();
        if self.buffer.len() > self.max_frame_bytes {
            frames.push(DecodedFrame::Fatal(format!(
                "unterminated frame exceeds {} bytes",
                self.max_frame_bytes
            )));
            self.buffer.clear();
        }
        frames
    }

    /// Flushes the decoder at end of stream. A trailing frame without its
    /// separator is still interpreted.
    pub fn finish(&mut self) -> Vec<DecodedFrame> {
        self.decode_into_buffer(&[], true);
        let mut frames = self.drain_complete();
        let rest = std::mem::take(&mut self.buffer);
        if !rest.trim().is_empty() {
            frames.extend(decode_block(&rest));
        }
        frames
    }

    fn decode_into_buffer(&mut self, bytes: &[u8], last: bool) {
        let mut src = bytes;
        loop {
            let needed = self
                .decoder
                .max_utf8_buffer_length(src.len())
                .unwrap_or(src.len() * 3 + 4);
            self.buffer.reserve(needed);
            let (result, read, _replaced) = self.decoder.decode_to_string(src, &mut self.buffer, last);
            src = &src[read..];
            match result {
                CoderResult::InputEmpty => break,
                CoderResult::OutputFull => continue,
            }
        }
    }

    fn drain_complete(&mut self) -> Vec<DecodedFrame> {
        let mut frames = Vec::new();
        while let Some(end) = self.buffer.find(FRAME_SEPARATOR) {
            let block: String = self.buffer.drain(..end + FRAME_SEPARATOR.len()).collect();
            frames.extend(decode_block(&block[..end]));
        }
        frames
    }
}

/// Decodes one frame block. Every `data: ` line is its own event; other
/// lines (comments, `event:` fields) are skipped.
pub fn decode_block(block: &str) -> Vec<DecodedFrame> {
    block
        .lines()
        .filter_map(|line| line.strip_prefix(DATA_PREFIX))
        .map(decode_data)
        .collect()
}

/// Interprets the payload of a single `data: ` line.
pub fn decode_data(data: &str) -> DecodedFrame {
    let value: Value = match serde_json::from_str(data.trim_end_matches('\r')) {
        Ok(value) => value,
        Err(err) => {
            engine_debug!("ignoring non-JSON stream frame: {err}");
            return DecodedFrame::Ignorable;
        }
    };
    match StreamEvent::from_value(&value) {
        Some(event) => DecodedFrame::Event(event),
        None => DecodedFrame::Ignorable,
    }
}
