pub const STATUS_NULL: u8 = 0x00;
pub const STATUS_MIN: u8 = 0x80;
pub const CHANNEL_STATUS_MAX: u8 = 0xEF;
pub const STATUS_SYSEX_START: u8 = 0xF0;

pub const HIGH_NIBBLE_MASK: u8 = 0xF0;
pub const CHANNEL_MASK: u8 = 0x0F;
pub const DATA_BYTE_MAX: u8 = 0x7F;

pub const NIBBLE_NOTE_OFF: u8 = 0x80;
pub const NIBBLE_NOTE_ON: u8 = 0x90;
pub const NIBBLE_POLY_PRESSURE: u8 = 0xA0;
pub const NIBBLE_CONTROL_CHANGE: u8 = 0xB0;
pub const NIBBLE_PROGRAM_CHANGE: u8 = 0xC0;
pub const NIBBLE_CHANNEL_PRESSURE: u8 = 0xD0;
pub const NIBBLE_PITCH_BEND: u8 = 0xE0;

pub const MAX_MESSAGE_LEN: usize = 3;

/// Number of bytes a message starting with `status` occupies, or `None`
/// for SysEx (0xF0), which is not decoded here.
///
/// Statuses outside the channel range fall back to a length of 1. Some
/// of those are genuine one-byte System Real-Time messages; multi-byte
/// System Common messages are deliberately not given their true length
/// (structural validation rejects the slice instead).
pub fn message_len(status: u8) -> Option<usize> {
    match status {
        STATUS_SYSEX_START => None,
        STATUS_MIN..=CHANNEL_STATUS_MAX => match status & HIGH_NIBBLE_MASK {
            NIBBLE_PROGRAM_CHANGE | NIBBLE_CHANNEL_PRESSURE => Some(2),
            _ => Some(3),
        },
        _ => Some(1),
    }
}
