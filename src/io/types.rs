// src/io/types.rs
//
// Shared frame types for both sides of the bridge.

use super::error::IoError;

// ============================================================================
// Protocol Constants
// ============================================================================

/// Payload width carried on both sides of the bridge
pub const PAYLOAD_LEN: usize = 8;

/// Serial frame: marker(1) + length(1) + payload(8) + checksum(1)
pub const FRAME_LEN: usize = 11;

/// First byte of every serial frame ('$')
pub const START_MARKER: u8 = 0x24;

/// Second byte of every serial frame; payload length, fixed
pub const LENGTH_BYTE: u8 = PAYLOAD_LEN as u8;

/// Offset of the payload inside a serial frame
pub const PAYLOAD_OFFSET: usize = 2;

/// Offset of the checksum inside a serial frame
pub const CHECKSUM_OFFSET: usize = FRAME_LEN - 1;

/// Highest 11-bit CAN identifier
pub const MAX_STANDARD_ID: u32 = 0x7FF;

/// Highest 29-bit CAN identifier
pub const MAX_EXTENDED_ID: u32 = 0x1FFF_FFFF;

// ============================================================================
// CAN Frame
// ============================================================================

/// A classic CAN data frame as seen by the bridge.
///
/// `data` always holds 8 bytes; only the first `dlc` are meaningful on the bus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CanFrame {
    /// Raw identifier, without flag bits
    pub id: u32,
    /// Data length code (0-8)
    pub dlc: u8,
    /// Payload; bytes past `dlc` are zero
    pub data: [u8; PAYLOAD_LEN],
    /// 29-bit identifier
    pub is_extended: bool,
}

impl CanFrame {
    /// Build a frame from a data slice of at most 8 bytes.
    pub fn new(id: u32, is_extended: bool, data: &[u8]) -> Result<Self, IoError> {
        let max_id = if is_extended {
            MAX_EXTENDED_ID
        } else {
            MAX_STANDARD_ID
        };
        if id > max_id {
            return Err(IoError::protocol(
                "can",
                format!("identifier 0x{:X} exceeds 0x{:X}", id, max_id),
            ));
        }
        if data.len() > PAYLOAD_LEN {
            return Err(IoError::protocol(
                "can",
                format!("classic data too long: {} bytes (max 8)", data.len()),
            ));
        }

        let mut payload = [0u8; PAYLOAD_LEN];
        payload[..data.len()].copy_from_slice(data);

        Ok(CanFrame {
            id,
            dlc: data.len() as u8,
            data: payload,
            is_extended,
        })
    }

    /// Standard-id frame carrying a full 8-byte payload (DLC 8).
    pub fn with_payload(id: u16, payload: [u8; PAYLOAD_LEN]) -> Self {
        CanFrame {
            id: id as u32,
            dlc: PAYLOAD_LEN as u8,
            data: payload,
            is_extended: false,
        }
    }

    /// Bytes actually carried on the bus.
    pub fn data(&self) -> &[u8] {
        &self.data[..(self.dlc as usize).min(PAYLOAD_LEN)]
    }

    /// All 8 payload bytes, regardless of DLC.
    pub fn payload(&self) -> &[u8; PAYLOAD_LEN] {
        &self.data
    }
}

impl std::fmt::Display for CanFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_extended {
            write!(f, "ID: 0x{:08X}", self.id)?;
        } else {
            write!(f, "ID: 0x{:03X}", self.id)?;
        }
        write!(f, ", DLC: {}, Data:", self.dlc)?;
        for byte in self.data() {
            write!(f, " 0x{:02X}", byte)?;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
