use thiserror::Error;
use tracing::{debug, error, info};

use crate::midi::{DecodeEvent, decode};
use crate::sink::MidiSink;
use crate::source::{DatagramSource, SourceError};

/// Counters accumulated over the lifetime of one bridge run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BridgeStats {
    pub datagrams: u64,
    pub forwarded: u64,
    pub skipped_nulls: u64,
    pub incomplete: u64,
    pub parse_failures: u64,
    pub send_failures: u64,
}

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("transport error: {0}")]
    Source(#[from] SourceError),
}

/// Forward decoded MIDI messages from `source` to `sink` until the
/// source is exhausted.
///
/// Decode and sink failures are logged and counted but never end the
/// loop; only a transport receive error is fatal. `verbose` gates the
/// per-byte skip/incomplete diagnostics.
pub fn run_bridge<S, K>(
    source: &mut S,
    sink: &mut K,
    verbose: bool,
) -> Result<BridgeStats, BridgeError>
where
    S: DatagramSource,
    K: MidiSink,
{
    let mut stats = BridgeStats::default();

    while let Some(datagram) = source.next_datagram()? {
        stats.datagrams += 1;
        for event in decode(&datagram.data) {
            match event {
                DecodeEvent::Message(message) => match sink.send(&message) {
                    Ok(()) => {
                        stats.forwarded += 1;
                        info!(
                            "forwarded {} {:02X?} from {}",
                            message.kind(),
                            message.as_bytes(),
                            datagram.src
                        );
                    }
                    Err(err) => {
                        stats.send_failures += 1;
                        error!("MIDI send failed: {err} -> {:02X?}", message.as_bytes());
                    }
                },
                DecodeEvent::Skip { index } => {
                    stats.skipped_nulls += 1;
                    if verbose {
                        debug!("skipping null byte at index {index}");
                    }
                }
                DecodeEvent::Incomplete { index, remaining } => {
                    stats.incomplete += 1;
                    if verbose {
                        debug!(
                            "incomplete or unsupported message at index {index}, \
                             abandoning {remaining} bytes"
                        );
                    }
                }
                DecodeEvent::ParseFailure {
                    index,
                    bytes,
                    cause,
                } => {
                    stats.parse_failures += 1;
                    error!("MIDI parse error at index {index}: {cause} -> {bytes:02X?}");
                }
            }
        }
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::{BridgeStats, run_bridge};
    use crate::midi::MidiMessage;
    use crate::sink::{MidiSink, SinkError};
    use crate::source::{Datagram, DatagramSource, SourceError};
    use std::net::SocketAddr;

    struct ScriptedSource {
        datagrams: Vec<Vec<u8>>,
        fail_at_end: bool,
    }

    impl ScriptedSource {
        fn new(datagrams: Vec<Vec<u8>>) -> Self {
            Self {
                datagrams,
                fail_at_end: false,
            }
        }

        fn src() -> SocketAddr {
            "127.0.0.1:9000".parse().unwrap()
        }
    }

    impl DatagramSource for ScriptedSource {
        fn next_datagram(&mut self) -> Result<Option<Datagram>, SourceError> {
            if self.datagrams.is_empty() {
                if self.fail_at_end {
                    return Err(SourceError::Io(std::io::Error::other("socket closed")));
                }
                return Ok(None);
            }
            Ok(Some(Datagram {
                src: Self::src(),
                data: self.datagrams.remove(0),
            }))
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        sent: Vec<Vec<u8>>,
        fail_sends: bool,
    }

    impl MidiSink for RecordingSink {
        fn send(&mut self, message: &MidiMessage) -> Result<(), SinkError> {
            if self.fail_sends {
                return Err(SinkError::Send("port gone".to_string()));
            }
            self.sent.push(message.as_bytes().to_vec());
            Ok(())
        }
    }

    #[test]
    fn forwards_decoded_messages() {
        let mut source = ScriptedSource::new(vec![
            vec![0x90, 0x3C, 0x7F, 0x00, 0x00, 0xC1, 0x05],
            vec![0x80, 0x3C, 0x00],
        ]);
        let mut sink = RecordingSink::default();

        let stats = run_bridge(&mut source, &mut sink, true).expect("bridge run");
        assert_eq!(
            sink.sent,
            vec![
                vec![0x90, 0x3C, 0x7F],
                vec![0xC1, 0x05],
                vec![0x80, 0x3C, 0x00],
            ]
        );
        assert_eq!(
            stats,
            BridgeStats {
                datagrams: 2,
                forwarded: 3,
                skipped_nulls: 2,
                ..BridgeStats::default()
            }
        );
    }

    #[test]
    fn truncated_datagram_forwards_nothing() {
        let mut source = ScriptedSource::new(vec![vec![0x80, 0x40]]);
        let mut sink = RecordingSink::default();

        let stats = run_bridge(&mut source, &mut sink, false).expect("bridge run");
        assert!(sink.sent.is_empty());
        assert_eq!(stats.incomplete, 1);
    }

    #[test]
    fn parse_failure_does_not_stop_the_loop() {
        let mut source = ScriptedSource::new(vec![
            vec![0x90, 0x3C, 0x80],
            vec![0xC1, 0x05],
        ]);
        let mut sink = RecordingSink::default();

        let stats = run_bridge(&mut source, &mut sink, false).expect("bridge run");
        assert_eq!(sink.sent, vec![vec![0xC1, 0x05]]);
        assert_eq!(stats.parse_failures, 1);
        assert_eq!(stats.forwarded, 1);
    }

    #[test]
    fn send_failures_are_counted_not_fatal() {
        let mut source = ScriptedSource::new(vec![vec![0x90, 0x3C, 0x7F], vec![0xC1, 0x05]]);
        let mut sink = RecordingSink {
            fail_sends: true,
            ..RecordingSink::default()
        };

        let stats = run_bridge(&mut source, &mut sink, false).expect("bridge run");
        assert_eq!(stats.send_failures, 2);
        assert_eq!(stats.forwarded, 0);
        assert_eq!(stats.datagrams, 2);
    }

    #[test]
    fn transport_error_is_fatal() {
        let mut source = ScriptedSource {
            datagrams: vec![vec![0x90, 0x3C, 0x7F]],
            fail_at_end: true,
        };
        let mut sink = RecordingSink::default();

        let err = run_bridge(&mut source, &mut sink, false).unwrap_err();
        assert!(err.to_string().contains("transport error"));
        assert_eq!(sink.sent, vec![vec![0x90, 0x3C, 0x7F]]);
    }
}
