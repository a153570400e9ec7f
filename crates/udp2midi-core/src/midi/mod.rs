//! MIDI channel message decoding.
//!
//! The decoder walks a raw datagram payload and slices out individual
//! channel messages. Message lengths are derived from the status byte's
//! high nibble; wire-format details are defined in `layout`, structural
//! validation lives in `message`.
//!
//! Events report skipped null bytes, truncated or unsupported trailing
//! bytes, and slices that failed structural validation.

pub mod decoder;
pub mod error;
pub mod layout;
pub mod message;

pub use decoder::{DecodeEvent, Decoder, decode};
pub use error::MidiError;
pub use message::{MessageKind, MidiMessage};
