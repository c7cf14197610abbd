// src/checksums.rs
//
// Checksum used by the serial link. The bridge protocol carries a single
// 8-bit additive checksum over the payload; there is no CRC and no
// sequence number.

use crate::io::PAYLOAD_LEN;

// ============================================================================
// Named Checksum Functions
// ============================================================================

/// Simple modulo-256 sum of bytes (8-bit sum).
pub fn sum8_checksum(data: &[u8]) -> u8 {
    let mut sum: u8 = 0;
    for &byte in data {
        sum = sum.wrapping_add(byte);
    }
    sum
}

/// Checksum of one bridge payload. Same function on the encode and decode paths.
pub fn payload_checksum(payload: &[u8; PAYLOAD_LEN]) -> u8 {
    sum8_checksum(payload)
}

// ============================================================================
// Tests
// ============================================================================
