use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MidiError {
    #[error("empty byte slice")]
    Empty,
    #[error("expected a status byte, got data byte 0x{byte:02X}")]
    StatusExpected { byte: u8 },
    #[error("unsupported status byte 0x{status:02X}")]
    UnsupportedStatus { status: u8 },
    #[error("status 0x{status:02X} needs {expected} bytes, got {actual}")]
    LengthMismatch {
        status: u8,
        expected: usize,
        actual: usize,
    },
    #[error("data byte {index} out of range: 0x{byte:02X}")]
    DataByteOutOfRange { index: usize, byte: u8 },
}
