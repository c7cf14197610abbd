// src/io/serial/framer.rs
//
// Frame synchronisation for the bridge's fixed 11-byte serial frames.
//
// The serial port delivers an undelimited byte stream. `FrameSync` takes
// exactly one frame's worth of bytes off that stream per call, optionally
// realigning on the marker/length pair first. Once the caller has handled
// the frame it drops any surplus that has arrived behind it with
// `drain_surplus`. Surplus is never queued for the next cycle.

use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use super::link::SerialLink;
use crate::io::error::IoError;
use crate::io::types::{FRAME_LEN, LENGTH_BYTE, START_MARKER};

// =============================================================================
// Types
// =============================================================================

/// How the receiver waits for a full frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitStrategy {
    /// Blocking read bounded by the port timeout. Timeouts re-arm the read.
    #[default]
    Blocking,
    /// Poll the driver's byte count and sleep between polls
    Poll,
}

/// Receiver synchronisation settings
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub wait: WaitStrategy,
    /// Sleep between byte-count polls (Poll only)
    pub poll_interval: Duration,
    /// Discard bytes until a marker/length pair before taking a frame
    pub resync: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            wait: WaitStrategy::Blocking,
            poll_interval: Duration::from_millis(1),
            resync: true,
        }
    }
}

/// What happened to the stream while one frame was taken
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameRead {
    /// Bytes dropped while hunting for the marker/length pair
    pub skipped: usize,
}

// =============================================================================
// Frame Synchroniser
// =============================================================================

/// Takes one serial frame at a time off a `SerialLink`.
pub struct FrameSync {
    config: SyncConfig,
    device: String,
}

impl FrameSync {
    pub fn new(config: SyncConfig, device: impl Into<String>) -> Self {
        FrameSync {
            config,
            device: device.into(),
        }
    }

    /// Whether marker and length bytes should be validated.
    /// Only meaningful once the receiver actually aligns on them.
    pub fn checks_header(&self) -> bool {
        self.config.resync
    }

    /// Fill `buf` with the next frame from `link`.
    ///
    /// Returns `Ok(None)` if `stop` was raised before a full frame arrived.
    pub fn read_frame<L: SerialLink + ?Sized>(
        &self,
        link: &mut L,
        buf: &mut [u8; FRAME_LEN],
        stop: &AtomicBool,
    ) -> Result<Option<FrameRead>, IoError> {
        let mut read = FrameRead::default();

        if !self.take(link, &mut buf[..], stop)? {
            return Ok(None);
        }

        if self.config.resync {
            while !is_aligned(buf) {
                let shift = next_candidate(buf);
                buf.copy_within(shift.., 0);
                read.skipped += shift;

                if !self.take(link, &mut buf[FRAME_LEN - shift..], stop)? {
                    return Ok(None);
                }
            }
        }

        Ok(Some(read))
    }

    /// Read exactly `out.len()` bytes using the configured wait strategy.
    fn take<L: SerialLink + ?Sized>(
        &self,
        link: &mut L,
        out: &mut [u8],
        stop: &AtomicBool,
    ) -> Result<bool, IoError> {
        if self.config.wait == WaitStrategy::Poll && !self.wait_available(link, out.len(), stop)? {
            return Ok(false);
        }
        self.read_full(link, out, stop)
    }

    fn wait_available<L: SerialLink + ?Sized>(
        &self,
        link: &mut L,
        needed: usize,
        stop: &AtomicBool,
    ) -> Result<bool, IoError> {
        loop {
            if stop.load(Ordering::Relaxed) {
                return Ok(false);
            }
            let available = link.bytes_available().map_err(|e| {
                IoError::read(&self.device, format!("check bytes available: {}", e))
            })?;
            if available >= needed {
                return Ok(true);
            }
            std::thread::sleep(self.config.poll_interval);
        }
    }

    fn read_full<L: SerialLink + ?Sized>(
        &self,
        link: &mut L,
        out: &mut [u8],
        stop: &AtomicBool,
    ) -> Result<bool, IoError> {
        let mut filled = 0;
        while filled < out.len() {
            match link.read(&mut out[filled..]) {
                Ok(0) => return Err(IoError::read(&self.device, "port closed")),
                Ok(n) => filled += n,
                Err(ref e)
                    if matches!(
                        e.kind(),
                        ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
                    ) =>
                {
                    if stop.load(Ordering::Relaxed) {
                        return Ok(false);
                    }
                }
                Err(e) => return Err(IoError::read(&self.device, e.to_string())),
            }
        }
        Ok(true)
    }

    /// Drop whatever the driver holds behind the last frame and return the count.
    ///
    /// The count is sampled once, after the frame was handled. A following
    /// frame that is still arriving is cut where the sample fell: its head is
    /// dropped and its tail starts the next window. With resync enabled the
    /// tail is hunted past; without it the stream stays misaligned until a
    /// quiet gap empties the driver buffer.
    pub fn drain_surplus<L: SerialLink + ?Sized>(&self, link: &mut L) -> Result<usize, IoError> {
        let surplus = link.bytes_available().map_err(|e| {
            IoError::read(&self.device, format!("check bytes available: {}", e))
        })?;
        if surplus == 0 {
            return Ok(0);
        }
        link.discard(surplus)
            .map_err(|e| IoError::read(&self.device, format!("drain surplus: {}", e)))
    }
}

fn is_aligned(buf: &[u8; FRAME_LEN]) -> bool {
    buf[0] == START_MARKER && buf[1] == LENGTH_BYTE
}

/// Offset of the next plausible frame start in the window, or `FRAME_LEN`.
/// A marker in the last slot is kept since its length byte is not read yet.
fn next_candidate(buf: &[u8; FRAME_LEN]) -> usize {
    (1..FRAME_LEN)
        .find(|&i| buf[i] == START_MARKER && (i + 1 == FRAME_LEN || buf[i + 1] == LENGTH_BYTE))
        .unwrap_or(FRAME_LEN)
}

// =============================================================================
// Tests
// =============================================================================
