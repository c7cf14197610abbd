// src/io/codec.rs
//
// Serial frame codec for the bridge's fixed 11-byte wire format.
//
//   byte 0:     0x24   start marker
//   byte 1:     0x08   payload length
//   bytes 2-9:  payload (mirrors the CAN payload)
//   byte 10:    sum of bytes 2-9 mod 256
//
// The layout is identical in both directions. Encode and decode operate on
// caller-owned buffers so each pipeline keeps its own frame memory.

use crate::checksums::payload_checksum;
use crate::io::error::IoError;
use crate::io::types::{
    CHECKSUM_OFFSET, FRAME_LEN, LENGTH_BYTE, PAYLOAD_LEN, PAYLOAD_OFFSET, START_MARKER,
};

/// Fill `buf` with a complete serial frame carrying `payload`.
pub fn encode_frame(buf: &mut [u8; FRAME_LEN], payload: &[u8; PAYLOAD_LEN]) {
    buf[0] = START_MARKER;
    buf[1] = LENGTH_BYTE;
    buf[PAYLOAD_OFFSET..CHECKSUM_OFFSET].copy_from_slice(payload);
    buf[CHECKSUM_OFFSET] = payload_checksum(payload);
}

/// Payload bytes 2-9 of a serial frame.
pub fn frame_payload(buf: &[u8; FRAME_LEN]) -> [u8; PAYLOAD_LEN] {
    let mut payload = [0u8; PAYLOAD_LEN];
    payload.copy_from_slice(&buf[PAYLOAD_OFFSET..CHECKSUM_OFFSET]);
    payload
}

/// Validate a received serial frame.
///
/// The checksum is always checked. Marker and length bytes are only checked
/// when `check_header` is set; otherwise the frame is trusted to be aligned.
pub fn validate_frame(
    buf: &[u8; FRAME_LEN],
    check_header: bool,
    device: &str,
) -> Result<(), IoError> {
    if check_header {
        if buf[0] != START_MARKER {
            return Err(IoError::framing(
                device,
                format!("expected start marker 0x{:02X}, got 0x{:02X}", START_MARKER, buf[0]),
            ));
        }
        if buf[1] != LENGTH_BYTE {
            return Err(IoError::framing(
                device,
                format!("expected length 0x{:02X}, got 0x{:02X}", LENGTH_BYTE, buf[1]),
            ));
        }
    }

    let calculated = payload_checksum(&frame_payload(buf));
    let received = buf[CHECKSUM_OFFSET];
    if calculated != received {
        return Err(IoError::ChecksumMismatch {
            calculated,
            received,
        });
    }

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
