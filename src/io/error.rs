// src/io/error.rs
//
// Typed errors for the bridge transports and the serial frame protocol.
// `device` strings follow the "kind(name)" form, e.g. "socketcan(can0)"
// or "serial(/dev/ttyS1)".

use thiserror::Error;

/// Errors raised by transports, framing and configuration.
#[derive(Debug, Error)]
pub enum IoError {
    /// Device could not be opened or bound. Fatal at startup.
    #[error("{device}: connection failed: {message}")]
    Connection { device: String, message: String },

    /// A read call failed.
    #[error("{device}: read error: {message}")]
    Read { device: String, message: String },

    /// A write call failed.
    #[error("{device}: write error: {message}")]
    Write { device: String, message: String },

    /// A write transferred fewer bytes than the frame holds.
    #[error("{device}: short write: {written} of {expected} bytes")]
    ShortWrite {
        device: String,
        written: usize,
        expected: usize,
    },

    /// Received serial frame failed checksum validation.
    #[error("checksum mismatch: calculated 0x{calculated:02X}, received 0x{received:02X}")]
    ChecksumMismatch { calculated: u8, received: u8 },

    /// Stream could not be split into a well-formed frame.
    #[error("{device}: framing error: {message}")]
    Framing { device: String, message: String },

    /// Transport-level protocol problem (unsupported frame, bad identifier).
    #[error("{device}: protocol error: {message}")]
    Protocol { device: String, message: String },

    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl IoError {
    pub fn connection(device: &str, message: impl Into<String>) -> Self {
        IoError::Connection {
            device: device.to_string(),
            message: message.into(),
        }
    }

    pub fn read(device: &str, message: impl Into<String>) -> Self {
        IoError::Read {
            device: device.to_string(),
            message: message.into(),
        }
    }

    pub fn write(device: &str, message: impl Into<String>) -> Self {
        IoError::Write {
            device: device.to_string(),
            message: message.into(),
        }
    }

    pub fn short_write(device: &str, written: usize, expected: usize) -> Self {
        IoError::ShortWrite {
            device: device.to_string(),
            written,
            expected,
        }
    }

    pub fn framing(device: &str, message: impl Into<String>) -> Self {
        IoError::Framing {
            device: device.to_string(),
            message: message.into(),
        }
    }

    pub fn protocol(device: &str, message: impl Into<String>) -> Self {
        IoError::Protocol {
            device: device.to_string(),
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        IoError::Config(message.into())
    }
}

impl From<IoError> for String {
    fn from(e: IoError) -> Self {
        e.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_includes_device() {
        let e = IoError::connection("socketcan(can0)", "No such device");
        assert_eq!(e.to_string(), "socketcan(can0): connection failed: No such device");
    }

    #[test]
    fn test_checksum_mismatch_display_hex() {
        let e = IoError::ChecksumMismatch {
            calculated: 0x24,
            received: 0x25,
        };
        assert_eq!(
            e.to_string(),
            "checksum mismatch: calculated 0x24, received 0x25"
        );
    }

    #[test]
    fn test_into_string() {
        let s: String = IoError::short_write("serial(x)", 4, 11).into();
        assert_eq!(s, "serial(x): short write: 4 of 11 bytes");
    }
}
