// src/io/serial/link.rs
//
// Byte-stream transport for the serial side of the bridge.
// `SerialLink` is the seam between the frame protocol and the port itself;
// the real implementation wraps a `serialport::SerialPort`.

use serialport::SerialPort;
use std::io::{Read, Write};

use super::utils::{describe_line, port_builder};
use crate::io::error::IoError;
use crate::settings::SerialSettings;

/// Size of the scratch buffer used when discarding bytes
const DISCARD_CHUNK: usize = 256;

// ============================================================================
// Serial Link Trait
// ============================================================================

/// Unstructured byte-stream transport.
pub trait SerialLink: Send {
    /// Bytes currently buffered by the driver and readable without blocking.
    fn bytes_available(&mut self) -> std::io::Result<usize>;

    /// Read up to `buf.len()` bytes. May return `TimedOut`/`WouldBlock`.
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize>;

    /// Write `buf` in one call and return the number of bytes accepted.
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize>;

    fn flush(&mut self) -> std::io::Result<()>;

    /// Read and drop up to `count` bytes. Returns how many were dropped.
    fn discard(&mut self, count: usize) -> std::io::Result<usize> {
        let mut scratch = [0u8; DISCARD_CHUNK];
        let mut remaining = count;
        let mut dropped = 0;
        while remaining > 0 {
            let chunk = remaining.min(DISCARD_CHUNK);
            let n = self.read(&mut scratch[..chunk])?;
            if n == 0 {
                break;
            }
            dropped += n;
            remaining -= n;
        }
        Ok(dropped)
    }
}

impl SerialLink for Box<dyn SerialPort> {
    fn bytes_available(&mut self) -> std::io::Result<usize> {
        SerialPort::bytes_to_read(&**self)
            .map(|n| n as usize)
            .map_err(std::io::Error::from)
    }

    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        Read::read(self, buf)
    }

    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        Write::write(self, buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Write::flush(self)
    }
}

// ============================================================================
// Port Management
// ============================================================================

/// Device label used in log lines and errors
pub fn serial_device(port: &str) -> String {
    format!("serial({})", port)
}

/// Open the bridge serial port with the configured line settings.
pub fn open_port(settings: &SerialSettings) -> Result<Box<dyn SerialPort>, IoError> {
    let device = serial_device(&settings.port);

    let port = port_builder(settings)
        .open()
        .map_err(|e| IoError::connection(&device, e.to_string()))?;

    tlog!("[serial] Opened {} at {}", settings.port, describe_line(settings));

    Ok(port)
}

/// Second handle on the same port, so each pipeline owns its own.
pub fn clone_port(port: &dyn SerialPort, name: &str) -> Result<Box<dyn SerialPort>, IoError> {
    port.try_clone()
        .map_err(|e| IoError::connection(&serial_device(name), format!("clone handle: {}", e)))
}

/// Information about an available serial port
#[derive(Clone, Debug)]
pub struct SerialPortInfo {
    pub port_name: String,
    pub port_type: String,
    pub manufacturer: Option<String>,
    pub product: Option<String>,
}

/// List available serial ports
pub fn list_ports() -> Result<Vec<SerialPortInfo>, IoError> {
    let ports = serialport::available_ports()
        .map_err(|e| IoError::connection("serial", format!("enumerate ports: {}", e)))?;

    Ok(ports
        .into_iter()
        .map(|p| {
            let (port_type, manufacturer, product) = match p.port_type {
                serialport::SerialPortType::UsbPort(info) => {
                    ("USB".to_string(), info.manufacturer, info.product)
                }
                serialport::SerialPortType::BluetoothPort => ("Bluetooth".to_string(), None, None),
                serialport::SerialPortType::PciPort => ("PCI".to_string(), None, None),
                serialport::SerialPortType::Unknown => ("Unknown".to_string(), None, None),
            };
            SerialPortInfo {
                port_name: p.port_name,
                port_type,
                manufacturer,
                product,
            }
        })
        .collect())
}
