// src/io/socketcan/codec.rs
//
// Conversion between the bridge's CanFrame and socketcan frame types.
// Only classic data frames carry a payload worth bridging; remote and
// error frames map to `None`.

use socketcan::{
    CanDataFrame, CanFrame as SocketCanFrame, EmbeddedFrame, ExtendedId, Frame, Id, StandardId,
};

use crate::io::error::IoError;
use crate::io::types::{CanFrame, MAX_EXTENDED_ID};

/// Convert a frame read from the socket. Non-data frames are skipped.
pub fn from_socketcan(frame: SocketCanFrame) -> Option<CanFrame> {
    match frame {
        SocketCanFrame::Data(f) => {
            CanFrame::new(f.raw_id() & MAX_EXTENDED_ID, f.is_extended(), f.data()).ok()
        }
        SocketCanFrame::Remote(_) => None,
        SocketCanFrame::Error(_) => None,
    }
}

/// Build a socketcan data frame for transmission.
pub fn to_socketcan(frame: &CanFrame, device: &str) -> Result<CanDataFrame, IoError> {
    let id = if frame.is_extended {
        let id = ExtendedId::new(frame.id).ok_or_else(|| {
            IoError::protocol(device, format!("invalid extended ID: 0x{:08X}", frame.id))
        })?;
        Id::Extended(id)
    } else {
        let id = u16::try_from(frame.id)
            .ok()
            .and_then(StandardId::new)
            .ok_or_else(|| {
                IoError::protocol(device, format!("invalid standard ID: 0x{:03X}", frame.id))
            })?;
        Id::Standard(id)
    };

    CanDataFrame::new(id, frame.data())
        .ok_or_else(|| IoError::protocol(device, "failed to create data frame"))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_socketcan_standard() {
        let frame = CanFrame::with_payload(0x100, [0xFF, 0, 0, 0, 0, 0, 0, 0]);
        let sc = to_socketcan(&frame, "socketcan(vcan0)").unwrap();
        assert_eq!(sc.raw_id(), 0x100);
        assert!(!sc.is_extended());
        assert_eq!(sc.data().len(), 8);
        assert_eq!(sc.data(), &[0xFF, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_to_socketcan_rejects_wide_standard_id() {
        let frame = CanFrame {
            id: 0x800,
            dlc: 0,
            data: [0; 8],
            is_extended: false,
        };
        assert!(to_socketcan(&frame, "socketcan(vcan0)").is_err());
    }

    #[test]
    fn test_from_socketcan_short_frame_is_zero_padded() {
        let sc = CanDataFrame::new(StandardId::new(0x123).unwrap(), &[0xAA, 0xBB, 0xCC]).unwrap();
        let frame = from_socketcan(SocketCanFrame::Data(sc)).unwrap();
        assert_eq!(frame.id, 0x123);
        assert_eq!(frame.dlc, 3);
        assert_eq!(frame.payload(), &[0xAA, 0xBB, 0xCC, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_from_socketcan_extended() {
        let sc = CanDataFrame::new(ExtendedId::new(0x18FF_1234).unwrap(), &[1, 2]).unwrap();
        let frame = from_socketcan(SocketCanFrame::Data(sc)).unwrap();
        assert_eq!(frame.id, 0x18FF_1234);
        assert!(frame.is_extended);
    }
}
