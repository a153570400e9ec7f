use super::error::MidiError;
use super::layout;

/// A single structurally valid MIDI message (1 to 3 bytes).
///
/// Constructed via [`MidiMessage::from_bytes`], which enforces that the
/// slice length matches the status byte's declared length and that every
/// data byte has the high bit clear. Instances are handed to the sink as
/// soon as they are decoded and are not retained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MidiMessage {
    bytes: [u8; layout::MAX_MESSAGE_LEN],
    len: u8,
}

/// Message classification derived from the status byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    NoteOff,
    NoteOn,
    PolyPressure,
    ControlChange,
    ProgramChange,
    ChannelPressure,
    PitchBend,
    System,
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MessageKind::NoteOff => "note_off",
            MessageKind::NoteOn => "note_on",
            MessageKind::PolyPressure => "poly_pressure",
            MessageKind::ControlChange => "control_change",
            MessageKind::ProgramChange => "program_change",
            MessageKind::ChannelPressure => "channel_pressure",
            MessageKind::PitchBend => "pitch_bend",
            MessageKind::System => "system",
        };
        write!(f, "{name}")
    }
}

impl MidiMessage {
    /// Validate `bytes` as one complete MIDI message.
    ///
    /// One-byte statuses are accepted only for the defined single-byte
    /// system messages (Tune Request and the Real-Time set); the other
    /// values in 0xF1..=0xFF are either undefined or the truncated head
    /// of a multi-byte System Common message.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MidiError> {
        let status = *bytes.first().ok_or(MidiError::Empty)?;
        if status < layout::STATUS_MIN {
            return Err(MidiError::StatusExpected { byte: status });
        }
        let expected =
            layout::message_len(status).ok_or(MidiError::UnsupportedStatus { status })?;
        if bytes.len() != expected {
            return Err(MidiError::LengthMismatch {
                status,
                expected,
                actual: bytes.len(),
            });
        }
        if expected == 1
            && !matches!(status, 0xF6 | 0xF8 | 0xFA | 0xFB | 0xFC | 0xFE | 0xFF)
        {
            return Err(MidiError::UnsupportedStatus { status });
        }
        for (index, &byte) in bytes.iter().enumerate().skip(1) {
            if byte > layout::DATA_BYTE_MAX {
                return Err(MidiError::DataByteOutOfRange { index, byte });
            }
        }

        let mut buf = [0u8; layout::MAX_MESSAGE_LEN];
        buf[..bytes.len()].copy_from_slice(bytes);
        Ok(Self {
            bytes: buf,
            len: bytes.len() as u8,
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    /// Message length in bytes, always 1 to 3.
    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn status(&self) -> u8 {
        self.bytes[0]
    }

    pub fn kind(&self) -> MessageKind {
        match self.status() & layout::HIGH_NIBBLE_MASK {
            layout::NIBBLE_NOTE_OFF => MessageKind::NoteOff,
            layout::NIBBLE_NOTE_ON => MessageKind::NoteOn,
            layout::NIBBLE_POLY_PRESSURE => MessageKind::PolyPressure,
            layout::NIBBLE_CONTROL_CHANGE => MessageKind::ControlChange,
            layout::NIBBLE_PROGRAM_CHANGE => MessageKind::ProgramChange,
            layout::NIBBLE_CHANNEL_PRESSURE => MessageKind::ChannelPressure,
            layout::NIBBLE_PITCH_BEND => MessageKind::PitchBend,
            _ => MessageKind::System,
        }
    }

    /// Channel number (0-15) for channel voice messages, `None` for
    /// system messages.
    pub fn channel(&self) -> Option<u8> {
        if self.status() <= layout::CHANNEL_STATUS_MAX {
            Some(self.status() & layout::CHANNEL_MASK)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{MessageKind, MidiMessage};
    use crate::midi::error::MidiError;

    #[test]
    fn note_on_roundtrip() {
        let msg = MidiMessage::from_bytes(&[0x93, 0x3C, 0x7F]).unwrap();
        assert_eq!(msg.as_bytes(), &[0x93, 0x3C, 0x7F]);
        assert_eq!(msg.kind(), MessageKind::NoteOn);
        assert_eq!(msg.channel(), Some(3));
        assert_eq!(msg.len(), 3);
    }

    #[test]
    fn program_change_is_two_bytes() {
        let msg = MidiMessage::from_bytes(&[0xC1, 0x05]).unwrap();
        assert_eq!(msg.kind(), MessageKind::ProgramChange);
        assert_eq!(msg.channel(), Some(1));
        assert_eq!(msg.as_bytes(), &[0xC1, 0x05]);
    }

    #[test]
    fn realtime_single_byte() {
        let msg = MidiMessage::from_bytes(&[0xF8]).unwrap();
        assert_eq!(msg.kind(), MessageKind::System);
        assert_eq!(msg.channel(), None);
        assert_eq!(msg.len(), 1);
    }

    #[test]
    fn data_byte_rejected_as_status() {
        let err = MidiMessage::from_bytes(&[0x45]).unwrap_err();
        assert_eq!(err, MidiError::StatusExpected { byte: 0x45 });
    }

    #[test]
    fn high_data_byte_rejected() {
        let err = MidiMessage::from_bytes(&[0x90, 0x3C, 0x80]).unwrap_err();
        assert_eq!(
            err,
            MidiError::DataByteOutOfRange {
                index: 2,
                byte: 0x80
            }
        );
    }

    #[test]
    fn wrong_length_rejected() {
        let err = MidiMessage::from_bytes(&[0x90, 0x3C]).unwrap_err();
        assert_eq!(
            err,
            MidiError::LengthMismatch {
                status: 0x90,
                expected: 3,
                actual: 2
            }
        );
    }

    #[test]
    fn undefined_system_status_rejected() {
        let err = MidiMessage::from_bytes(&[0xF9]).unwrap_err();
        assert_eq!(err, MidiError::UnsupportedStatus { status: 0xF9 });
        let err = MidiMessage::from_bytes(&[0xF1]).unwrap_err();
        assert_eq!(err, MidiError::UnsupportedStatus { status: 0xF1 });
    }

    #[test]
    fn sysex_rejected() {
        let err = MidiMessage::from_bytes(&[0xF0]).unwrap_err();
        assert_eq!(err, MidiError::UnsupportedStatus { status: 0xF0 });
    }

    #[test]
    fn empty_slice_rejected() {
        assert_eq!(MidiMessage::from_bytes(&[]).unwrap_err(), MidiError::Empty);
    }
}
