//! udp2midi core library: a UDP-to-MIDI bridge.
//!
//! Datagrams received over UDP are parsed as concatenated MIDI channel
//! messages and forwarded to a MIDI output port. The decoder in `midi`
//! is byte-oriented and side-effect free; all I/O is isolated in the
//! `source` (UDP socket) and `sink` (MIDI port) modules, and the
//! `bridge` module ties them together into a blocking dispatch loop.
//!
//! Invariants:
//! - Each datagram is decoded independently; no state is carried across
//!   buffers, so a message split across two datagrams is lost.
//! - Message lengths are derived solely from the status byte's high
//!   nibble; SysEx is not parsed and halts the scan of its buffer.
//! - A truncated or unsupported trailing message abandons the rest of
//!   that buffer (no resumable skip).
//!
//! # Examples
//! ```
//! use udp2midi_core::midi::{DecodeEvent, decode};
//!
//! let events: Vec<_> = decode(&[0x90, 0x3C, 0x7F]).collect();
//! assert_eq!(events.len(), 1);
//! assert!(matches!(events[0], DecodeEvent::Message(_)));
//! ```

use serde::{Deserialize, Serialize};

pub mod bridge;
pub mod midi;
pub mod sink;
pub mod source;

pub use bridge::{BridgeError, BridgeStats, run_bridge};
pub use midi::{DecodeEvent, MessageKind, MidiError, MidiMessage, decode};
pub use sink::{MidiSink, MidirSink, SinkError, list_output_ports};
pub use source::{Datagram, DatagramSource, SourceError, UdpDatagramSource};

/// Default UDP port to listen on.
pub const DEFAULT_UDP_PORT: u16 = 8321;
/// Default receive buffer size in bytes; longer payloads are truncated.
pub const DEFAULT_BUFFER_SIZE: usize = 1024;
/// Default MIDI output port name to match against.
pub const DEFAULT_MIDI_PORT_NAME: &str = "f_midi";

/// Runtime configuration for the bridge.
///
/// # Examples
/// ```
/// use udp2midi_core::Config;
///
/// let config = Config::default();
/// assert_eq!(config.udp_port, 8321);
/// assert_eq!(config.midi_port_name, "f_midi");
/// assert!(config.verbose);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// UDP port bound on all interfaces.
    pub udp_port: u16,
    /// Maximum datagram payload retained per receive.
    pub buffer_size: usize,
    /// Substring matched against MIDI output port names.
    pub midi_port_name: String,
    /// Emit per-byte skip/incomplete diagnostics.
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            udp_port: DEFAULT_UDP_PORT,
            buffer_size: DEFAULT_BUFFER_SIZE,
            midi_port_name: DEFAULT_MIDI_PORT_NAME.to_string(),
            verbose: true,
        }
    }
}

/// Serializable rendering of one decode event, with byte slices hex
/// encoded. Produced by [`decode_records`] for offline inspection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DecodeRecord {
    Message {
        index: usize,
        kind: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        channel: Option<u8>,
        bytes: String,
    },
    Skip {
        index: usize,
    },
    Incomplete {
        index: usize,
        remaining: usize,
    },
    ParseFailure {
        index: usize,
        bytes: String,
        cause: String,
    },
}

/// Decode `buffer` into a deterministic list of serializable records.
///
/// # Examples
/// ```
/// use udp2midi_core::{DecodeRecord, decode_records};
///
/// let records = decode_records(&[0xC1, 0x05]);
/// assert!(matches!(&records[0], DecodeRecord::Message { bytes, .. } if bytes == "C105"));
/// ```
pub fn decode_records(buffer: &[u8]) -> Vec<DecodeRecord> {
    let mut records = Vec::new();
    let mut decoder = decode(buffer);
    loop {
        let index = decoder.position();
        let event = match decoder.next() {
            Some(event) => event,
            None => break,
        };
        records.push(match event {
            DecodeEvent::Message(message) => DecodeRecord::Message {
                index,
                kind: message.kind().to_string(),
                channel: message.channel(),
                bytes: hex_upper(message.as_bytes()),
            },
            DecodeEvent::Skip { index } => DecodeRecord::Skip { index },
            DecodeEvent::Incomplete { index, remaining } => {
                DecodeRecord::Incomplete { index, remaining }
            }
            DecodeEvent::ParseFailure {
                index,
                bytes,
                cause,
            } => DecodeRecord::ParseFailure {
                index,
                bytes: hex_upper(bytes),
                cause: cause.to_string(),
            },
        });
    }
    records
}

fn hex_upper(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{byte:02X}")).collect()
}
