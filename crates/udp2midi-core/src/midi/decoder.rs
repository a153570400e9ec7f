use super::error::MidiError;
use super::layout;
use super::message::MidiMessage;

/// One outcome of the scan over a datagram payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeEvent<'a> {
    /// A structurally valid MIDI message.
    Message(MidiMessage),
    /// A null byte was skipped at `index`.
    Skip { index: usize },
    /// The bytes at `index` cannot form a complete recognized message
    /// (SysEx start or truncated trailing message). The scan of this
    /// buffer stops here; the remaining bytes are abandoned.
    Incomplete { index: usize, remaining: usize },
    /// A correctly sized slice failed structural validation. The slice
    /// is consumed regardless, so the scan continues after it.
    ParseFailure {
        index: usize,
        bytes: &'a [u8],
        cause: MidiError,
    },
}

/// Decode `buffer` as concatenated MIDI messages.
///
/// The returned iterator borrows the buffer read-only and carries no
/// state across calls: decoding the same buffer twice yields the same
/// event sequence. Messages split across datagrams cannot be recovered;
/// each buffer is scanned independently.
pub fn decode(buffer: &[u8]) -> Decoder<'_> {
    Decoder {
        buffer,
        cursor: 0,
        halted: false,
    }
}

/// Lazy scan over one datagram payload.
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    buffer: &'a [u8],
    cursor: usize,
    halted: bool,
}

impl Decoder<'_> {
    /// Current scan position, for diagnostics.
    pub fn position(&self) -> usize {
        self.cursor
    }
}

impl<'a> Iterator for Decoder<'a> {
    type Item = DecodeEvent<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.halted || self.cursor >= self.buffer.len() {
            return None;
        }
        let index = self.cursor;
        let status = self.buffer[index];

        if status == layout::STATUS_NULL {
            self.cursor += 1;
            return Some(DecodeEvent::Skip { index });
        }

        let len = match layout::message_len(status) {
            Some(len) if index + len <= self.buffer.len() => len,
            // SysEx or not enough trailing bytes: abandon the rest of
            // this buffer rather than resuming after the gap.
            _ => {
                self.halted = true;
                return Some(DecodeEvent::Incomplete {
                    index,
                    remaining: self.buffer.len() - index,
                });
            }
        };

        let bytes = &self.buffer[index..index + len];
        self.cursor += len;
        match MidiMessage::from_bytes(bytes) {
            Ok(message) => Some(DecodeEvent::Message(message)),
            Err(cause) => Some(DecodeEvent::ParseFailure {
                index,
                bytes,
                cause,
            }),
        }
    }
}
