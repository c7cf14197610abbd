// src/bridge/serial_to_can.rs
//
// Serial receive -> CAN transmit. Each valid 11-byte serial frame becomes
// one DLC-8 CAN frame sent under the station identifier.

use std::sync::atomic::{AtomicBool, Ordering};

use super::stats::PipelineStats;
use super::READ_ERROR_BACKOFF;
use crate::io::codec::{frame_payload, validate_frame};
use crate::io::serial::{FrameSync, SerialLink};
use crate::io::{CanFrame, CanLink, IoError, FRAME_LEN};

pub struct SerialToCan<S, C> {
    serial: S,
    can: C,
    sync: FrameSync,
    device: String,
    station_id: u16,
    input: [u8; FRAME_LEN],
    stats: PipelineStats,
}

impl<S: SerialLink, C: CanLink> SerialToCan<S, C> {
    pub fn new(
        serial: S,
        can: C,
        sync: FrameSync,
        device: impl Into<String>,
        station_id: u16,
        stats: PipelineStats,
    ) -> Self {
        SerialToCan {
            serial,
            can,
            sync,
            device: device.into(),
            station_id,
            input: [0u8; FRAME_LEN],
            stats,
        }
    }

    pub fn stats(&self) -> &PipelineStats {
        &self.stats
    }

    /// Take one frame off the serial stream, validate it and forward it,
    /// then drop any surplus that arrived behind it.
    ///
    /// Returns `Ok(false)` if `stop` was raised before a frame arrived.
    /// Invalid frames are reported as errors and never reach the bus.
    /// A failed drain is logged and counted but does not change the result.
    pub fn receive_serial(&mut self, stop: &AtomicBool) -> Result<bool, IoError> {
        let Some(read) = self.sync.read_frame(&mut self.serial, &mut self.input, stop)? else {
            return Ok(false);
        };

        if read.skipped > 0 {
            tlog!(
                "[serial->can] Skipped {} bytes before start marker",
                read.skipped
            );
            self.stats.bytes_discarded += read.skipped as u64;
        }
        ttrace!("[serial->can] RX {}", hex::encode_upper(self.input));

        let result = validate_frame(&self.input, self.sync.checks_header(), &self.device)
            .and_then(|_| self.transmit_can());
        self.input = [0u8; FRAME_LEN];
        self.drain_surplus();
        result.map(|_| true)
    }

    fn drain_surplus(&mut self) {
        match self.sync.drain_surplus(&mut self.serial) {
            Ok(0) => {}
            Ok(n) => {
                tlog!(
                    "[serial->can] Framing ambiguity: discarded {} surplus bytes",
                    n
                );
                self.stats.bytes_discarded += n as u64;
            }
            Err(e) => {
                tlog!("[serial->can] {}", e);
                self.stats.read_errors += 1;
            }
        }
    }

    /// Send input bytes 2-9 as a DLC-8 frame under the station identifier.
    pub fn transmit_can(&mut self) -> Result<(), IoError> {
        let frame = CanFrame::with_payload(self.station_id, frame_payload(&self.input));
        self.can.write_frame(&frame)?;

        ttrace!("[serial->can] TX {}", frame);
        self.stats.forwarded += 1;
        Ok(())
    }

    /// Run until `stop` is raised. Errors are logged and the frame dropped.
    pub fn run(mut self, stop: &AtomicBool) -> PipelineStats {
        tlog!(
            "[serial->can] Pipeline started ({}, station id 0x{:03X})",
            self.device,
            self.station_id
        );

        while !stop.load(Ordering::Relaxed) {
            if let Err(e) = self.receive_serial(stop) {
                tlog!("[serial->can] {}", e);
                self.stats.record_error(&e);
                if matches!(e, IoError::Read { .. }) {
                    std::thread::sleep(READ_ERROR_BACKOFF);
                }
            }
            self.stats.maybe_report();
        }

        tlog!("[serial->can] Pipeline stopped");
        self.stats
    }
}
