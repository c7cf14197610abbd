// src/testing.rs
//
// In-memory transports for exercising the framer and pipelines without
// hardware. Handles are cheap clones sharing one state, so a test can keep
// one end while a pipeline owns the other.

use std::collections::VecDeque;
use std::io::ErrorKind;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::io::serial::SerialLink;
use crate::io::{CanFrame, CanLink, IoError};

const IDLE_READ: Duration = Duration::from_millis(1);

// ============================================================================
// Serial
// ============================================================================

#[derive(Default)]
struct SerialState {
    rx: VecDeque<u8>,
    tx: Vec<u8>,
    read_chunk: Option<usize>,
    write_limit: Option<usize>,
    fail_reads: bool,
    fail_writes: bool,
    fail_bytes_available: bool,
}

#[derive(Clone, Default)]
pub struct MockSerialLink {
    state: Arc<Mutex<SerialState>>,
}

impl MockSerialLink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input(bytes: &[u8]) -> Self {
        let link = Self::new();
        link.push_input(bytes);
        link
    }

    pub fn push_input(&self, bytes: &[u8]) {
        self.state.lock().unwrap().rx.extend(bytes.iter().copied());
    }

    /// Bytes not yet consumed by the reader
    pub fn pending(&self) -> usize {
        self.state.lock().unwrap().rx.len()
    }

    pub fn written(&self) -> Vec<u8> {
        self.state.lock().unwrap().tx.clone()
    }

    /// Cap how many bytes a single read returns
    pub fn set_read_chunk(&self, chunk: Option<usize>) {
        self.state.lock().unwrap().read_chunk = chunk;
    }

    /// Cap how many bytes a single write accepts
    pub fn set_write_limit(&self, limit: Option<usize>) {
        self.state.lock().unwrap().write_limit = limit;
    }

    pub fn fail_reads(&self, fail: bool) {
        self.state.lock().unwrap().fail_reads = fail;
    }

    pub fn fail_writes(&self, fail: bool) {
        self.state.lock().unwrap().fail_writes = fail;
    }

    /// Make the driver byte count query fail; reads still work
    pub fn fail_bytes_available(&self, fail: bool) {
        self.state.lock().unwrap().fail_bytes_available = fail;
    }
}

impl SerialLink for MockSerialLink {
    fn bytes_available(&mut self) -> std::io::Result<usize> {
        let state = self.state.lock().unwrap();
        if state.fail_bytes_available {
            return Err(std::io::Error::new(ErrorKind::Other, "mock query failure"));
        }
        Ok(state.rx.len())
    }

    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let mut state = self.state.lock().unwrap();
        if state.fail_reads {
            return Err(std::io::Error::new(ErrorKind::BrokenPipe, "mock read failure"));
        }
        if state.rx.is_empty() {
            drop(state);
            std::thread::sleep(IDLE_READ);
            return Err(std::io::Error::new(ErrorKind::TimedOut, "mock read timeout"));
        }
        let limit = state.read_chunk.unwrap_or(buf.len()).min(buf.len());
        let n = limit.min(state.rx.len());
        for slot in buf.iter_mut().take(n) {
            *slot = state.rx.pop_front().unwrap();
        }
        Ok(n)
    }

    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut state = self.state.lock().unwrap();
        if state.fail_writes {
            return Err(std::io::Error::new(ErrorKind::BrokenPipe, "mock write failure"));
        }
        let n = state.write_limit.unwrap_or(buf.len()).min(buf.len());
        state.tx.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

// ============================================================================
// CAN
// ============================================================================

#[derive(Default)]
struct CanState {
    rx: VecDeque<Result<CanFrame, IoError>>,
    sent: Vec<CanFrame>,
    fail_writes: bool,
}

#[derive(Clone, Default)]
pub struct MockCanLink {
    state: Arc<Mutex<CanState>>,
}

impl MockCanLink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_frame(&self, frame: CanFrame) {
        self.state.lock().unwrap().rx.push_back(Ok(frame));
    }

    pub fn push_error(&self, error: IoError) {
        self.state.lock().unwrap().rx.push_back(Err(error));
    }

    pub fn pending(&self) -> usize {
        self.state.lock().unwrap().rx.len()
    }

    pub fn sent(&self) -> Vec<CanFrame> {
        self.state.lock().unwrap().sent.clone()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.state.lock().unwrap().fail_writes = fail;
    }
}

impl CanLink for MockCanLink {
    fn read_frame(&mut self) -> Result<Option<CanFrame>, IoError> {
        let next = self.state.lock().unwrap().rx.pop_front();
        match next {
            Some(Ok(frame)) => Ok(Some(frame)),
            Some(Err(e)) => Err(e),
            None => {
                std::thread::sleep(IDLE_READ);
                Ok(None)
            }
        }
    }

    fn write_frame(&mut self, frame: &CanFrame) -> Result<(), IoError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_writes {
            return Err(IoError::write("socketcan(mock)", "mock write failure"));
        }
        state.sent.push(*frame);
        Ok(())
    }
}
