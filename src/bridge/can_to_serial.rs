// src/bridge/can_to_serial.rs
//
// CAN receive -> serial transmit. Every data frame on the bus becomes one
// 11-byte serial frame carrying the frame's eight data bytes.

use std::sync::atomic::{AtomicBool, Ordering};

use super::stats::PipelineStats;
use super::READ_ERROR_BACKOFF;
use crate::io::codec::encode_frame;
use crate::io::serial::SerialLink;
use crate::io::{CanLink, IoError, FRAME_LEN};

pub struct CanToSerial<C, S> {
    can: C,
    serial: S,
    device: String,
    output: [u8; FRAME_LEN],
    stats: PipelineStats,
}

impl<C: CanLink, S: SerialLink> CanToSerial<C, S> {
    pub fn new(can: C, serial: S, device: impl Into<String>, stats: PipelineStats) -> Self {
        CanToSerial {
            can,
            serial,
            device: device.into(),
            output: [0u8; FRAME_LEN],
            stats,
        }
    }

    pub fn stats(&self) -> &PipelineStats {
        &self.stats
    }

    /// Wait for one CAN frame and forward it to the serial port.
    ///
    /// Returns `Ok(false)` when the read timed out or the frame had no payload.
    /// All eight data bytes are copied regardless of DLC.
    pub fn receive_can(&mut self) -> Result<bool, IoError> {
        let Some(frame) = self.can.read_frame()? else {
            return Ok(false);
        };
        ttrace!("[can->serial] RX {}", frame);

        encode_frame(&mut self.output, frame.payload());
        self.transmit_serial()?;
        Ok(true)
    }

    /// Write the populated output buffer in one call. The buffer is zeroed
    /// afterwards whether or not the write succeeded.
    pub fn transmit_serial(&mut self) -> Result<(), IoError> {
        let result = self.write_output();
        self.output = [0u8; FRAME_LEN];
        result
    }

    fn write_output(&mut self) -> Result<(), IoError> {
        let written = self
            .serial
            .write(&self.output)
            .map_err(|e| IoError::write(&self.device, e.to_string()))?;
        if written != FRAME_LEN {
            return Err(IoError::short_write(&self.device, written, FRAME_LEN));
        }
        self.serial
            .flush()
            .map_err(|e| IoError::write(&self.device, format!("flush: {}", e)))?;

        ttrace!("[can->serial] TX {}", hex::encode_upper(self.output));
        self.stats.forwarded += 1;
        Ok(())
    }

    /// Run until `stop` is raised. Errors are logged and the frame dropped.
    pub fn run(mut self, stop: &AtomicBool) -> PipelineStats {
        tlog!("[can->serial] Pipeline started ({})", self.device);

        while !stop.load(Ordering::Relaxed) {
            if let Err(e) = self.receive_can() {
                tlog!("[can->serial] {}", e);
                self.stats.record_error(&e);
                if matches!(e, IoError::Read { .. }) {
                    std::thread::sleep(READ_ERROR_BACKOFF);
                }
            }
            self.stats.maybe_report();
        }

        tlog!("[can->serial] Pipeline stopped");
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::codec::{frame_payload, validate_frame};
    use crate::io::CanFrame;
    use crate::testing::{MockCanLink, MockSerialLink};
    use std::time::Duration;

    fn pipeline(can: &MockCanLink, serial: &MockSerialLink) -> CanToSerial<MockCanLink, MockSerialLink> {
        CanToSerial::new(
            can.clone(),
            serial.clone(),
            "serial(mock)",
            PipelineStats::new("can->serial", None),
        )
    }

    #[test]
    fn test_short_can_frame_becomes_full_serial_frame() {
        let can = MockCanLink::new();
        let serial = MockSerialLink::new();
        can.push_frame(CanFrame::new(0x123, false, &[0xFF, 0x00]).unwrap());

        let mut bridge = pipeline(&can, &serial);
        assert!(bridge.receive_can().unwrap());

        assert_eq!(
            serial.written(),
            vec![0x24, 0x08, 0xFF, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFF]
        );
        assert_eq!(bridge.stats().forwarded, 1);
    }

    #[test]
    fn test_payload_survives_the_serial_frame() {
        let can = MockCanLink::new();
        let serial = MockSerialLink::new();
        let payload = [0xDE, 0xAD, 0xBE, 0xEF, 0x01, 0x02, 0x03, 0x04];
        can.push_frame(CanFrame::with_payload(0x321, payload));

        let mut bridge = pipeline(&can, &serial);
        bridge.receive_can().unwrap();

        let written: [u8; FRAME_LEN] = serial.written().try_into().unwrap();
        assert!(validate_frame(&written, true, "serial(mock)").is_ok());
        assert_eq!(frame_payload(&written), payload);
    }

    #[test]
    fn test_timeout_is_not_an_error() {
        let can = MockCanLink::new();
        let serial = MockSerialLink::new();

        let mut bridge = pipeline(&can, &serial);
        assert!(!bridge.receive_can().unwrap());
        assert!(serial.written().is_empty());
    }

    #[test]
    fn test_read_error_writes_nothing() {
        let can = MockCanLink::new();
        let serial = MockSerialLink::new();
        can.push_error(IoError::read("socketcan(mock)", "network down"));

        let mut bridge = pipeline(&can, &serial);
        let err = bridge.receive_can().unwrap_err();
        assert!(matches!(err, IoError::Read { .. }));
        assert!(serial.written().is_empty());
    }

    #[test]
    fn test_short_write_is_reported_and_buffer_cleared() {
        let can = MockCanLink::new();
        let serial = MockSerialLink::new();
        serial.set_write_limit(Some(4));
        can.push_frame(CanFrame::with_payload(0x100, [1; 8]));

        let mut bridge = pipeline(&can, &serial);
        let err = bridge.receive_can().unwrap_err();

        assert!(matches!(
            err,
            IoError::ShortWrite {
                written: 4,
                expected: FRAME_LEN,
                ..
            }
        ));
        assert_eq!(bridge.output, [0u8; FRAME_LEN]);
        assert_eq!(bridge.stats().forwarded, 0);
    }

    #[test]
    fn test_write_failure_clears_buffer() {
        let can = MockCanLink::new();
        let serial = MockSerialLink::new();
        serial.fail_writes(true);
        can.push_frame(CanFrame::with_payload(0x100, [7; 8]));

        let mut bridge = pipeline(&can, &serial);
        let err = bridge.receive_can().unwrap_err();

        assert!(matches!(err, IoError::Write { .. }));
        assert_eq!(bridge.output, [0u8; FRAME_LEN]);
    }

    #[test]
    fn test_run_forwards_until_stopped() {
        let can = MockCanLink::new();
        let serial = MockSerialLink::new();
        can.push_error(IoError::read("socketcan(mock)", "transient"));
        can.push_frame(CanFrame::with_payload(0x100, [1; 8]));
        can.push_frame(CanFrame::with_payload(0x100, [2; 8]));

        let stop = std::sync::Arc::new(AtomicBool::new(false));
        let handle = {
            let bridge = pipeline(&can, &serial);
            let stop = stop.clone();
            std::thread::spawn(move || bridge.run(&stop))
        };

        for _ in 0..1000 {
            if serial.written().len() == 2 * FRAME_LEN {
                break;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
        stop.store(true, Ordering::Relaxed);
        let stats = handle.join().unwrap();

        assert_eq!(stats.forwarded, 2);
        assert_eq!(stats.read_errors, 1);
        assert_eq!(serial.written().len(), 2 * FRAME_LEN);
    }
}
