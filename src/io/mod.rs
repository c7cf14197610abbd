// src/io/mod.rs
//
// Transport layer for the bridge: the CAN link, the serial link, the shared
// frame types and the 11-byte serial frame codec.

// Core modules
pub mod codec; // Serial frame encode/validate
mod error;
mod types;

// Drivers
pub mod serial;
pub mod socketcan;

pub use error::IoError;
pub use types::{
    CanFrame, CHECKSUM_OFFSET, FRAME_LEN, LENGTH_BYTE, MAX_EXTENDED_ID, MAX_STANDARD_ID,
    PAYLOAD_LEN, PAYLOAD_OFFSET, START_MARKER,
};

// ============================================================================
// CAN Link Trait
// ============================================================================

/// Frame-oriented CAN transport. Each read or write moves one whole frame.
pub trait CanLink: Send {
    /// Read one data frame.
    ///
    /// Returns `Ok(None)` when the read timed out or the bus delivered a frame
    /// with nothing to bridge (remote or error frame).
    fn read_frame(&mut self) -> Result<Option<CanFrame>, IoError>;

    /// Write one frame atomically.
    fn write_frame(&mut self, frame: &CanFrame) -> Result<(), IoError>;
}
