// src/bridge/stats.rs
//
// Per-pipeline counters, logged periodically and once at shutdown.

use std::time::{Duration, Instant};

use crate::io::IoError;

#[derive(Debug, Clone)]
pub struct PipelineStats {
    name: &'static str,
    /// Frames written to the far side
    pub forwarded: u64,
    pub checksum_failures: u64,
    /// Bad marker or length byte
    pub framing_errors: u64,
    pub read_errors: u64,
    pub write_errors: u64,
    /// Bytes dropped by marker hunting or surplus draining
    pub bytes_discarded: u64,
    interval: Option<Duration>,
    last_report: Instant,
}

impl PipelineStats {
    /// `interval` of `None` disables periodic reporting.
    pub fn new(name: &'static str, interval: Option<Duration>) -> Self {
        PipelineStats {
            name,
            forwarded: 0,
            checksum_failures: 0,
            framing_errors: 0,
            read_errors: 0,
            write_errors: 0,
            bytes_discarded: 0,
            interval,
            last_report: Instant::now(),
        }
    }

    pub fn record_error(&mut self, error: &IoError) {
        match error {
            IoError::ChecksumMismatch { .. } => self.checksum_failures += 1,
            IoError::Framing { .. } => self.framing_errors += 1,
            IoError::Read { .. } => self.read_errors += 1,
            IoError::Write { .. } | IoError::ShortWrite { .. } | IoError::Protocol { .. } => {
                self.write_errors += 1
            }
            IoError::Connection { .. } | IoError::Config(_) => {}
        }
    }

    pub fn total_errors(&self) -> u64 {
        self.checksum_failures + self.framing_errors + self.read_errors + self.write_errors
    }

    /// Log the counters if the reporting interval has elapsed.
    pub fn maybe_report(&mut self) {
        let Some(interval) = self.interval else {
            return;
        };
        if self.last_report.elapsed() >= interval {
            self.report();
            self.last_report = Instant::now();
        }
    }

    pub fn report(&self) {
        tlog!("[{}] {}", self.name, self.summary());
    }

    pub fn summary(&self) -> String {
        format!(
            "forwarded: {}, checksum failures: {}, framing errors: {}, read errors: {}, write errors: {}, bytes discarded: {}",
            self.forwarded,
            self.checksum_failures,
            self.framing_errors,
            self.read_errors,
            self.write_errors,
            self.bytes_discarded
        )
    }
}
