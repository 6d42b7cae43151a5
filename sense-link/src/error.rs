//! Codec errors

use core::fmt;

/// Errors that can occur while decoding a frame
///
/// Decoding fails closed: no partial message is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// Input ends before the frame implied by its header
    BufferTooShort,
    /// Trailer does not match the CRC-8 of header and payload
    ChecksumMismatch,
    /// First header byte is not a known message type
    InvalidMessageType,
    /// Second header byte is not a known sensor type
    InvalidSensorType,
    /// Second header byte is not a known actuator type
    InvalidActuatorType,
    /// Error message carries an unknown error code
    InvalidErrorCode,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            DecodeError::BufferTooShort => "buffer too short for frame",
            DecodeError::ChecksumMismatch => "checksum mismatch",
            DecodeError::InvalidMessageType => "invalid message type",
            DecodeError::InvalidSensorType => "invalid sensor type",
            DecodeError::InvalidActuatorType => "invalid actuator type",
            DecodeError::InvalidErrorCode => "invalid error code",
        };
        f.write_str(msg)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DecodeError {}

/// Errors that can occur while encoding into a caller-sized slice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncodeError {
    /// Buffer cannot hold the complete frame
    BufferTooSmall,
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodeError::BufferTooSmall => f.write_str("buffer too small for frame"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for EncodeError {}
