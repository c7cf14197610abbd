use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::io::serial::{Parity, SyncConfig, WaitStrategy};
use crate::io::{IoError, MAX_STANDARD_ID};

// ============================================================================
// Sections
// ============================================================================

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CanSettings {
    #[serde(default = "default_can_interface")]
    pub interface: String,
    /// Identifier used for every frame the bridge puts on the bus
    #[serde(default = "default_station_id")]
    pub station_id: u16,
    #[serde(default = "default_can_read_timeout_ms")]
    pub read_timeout_ms: u64,
    /// Deliver bridged frames to other sockets on this host
    #[serde(default)]
    pub loopback: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SerialSettings {
    #[serde(default = "default_serial_port")]
    pub port: String,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    #[serde(default = "default_data_bits")]
    pub data_bits: u8,
    #[serde(default = "default_stop_bits")]
    pub stop_bits: u8,
    #[serde(default)]
    pub parity: Parity,
    /// Port read timeout; bounds each blocking read
    #[serde(default = "default_serial_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ReceiveSettings {
    #[serde(default)]
    pub wait: WaitStrategy,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Hunt for the start marker instead of trusting alignment
    #[serde(default = "default_resync")]
    pub resync: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LoggingSettings {
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
    #[serde(default)]
    pub trace_frames: bool,
    /// Seconds between pipeline statistics lines (0 = disabled)
    #[serde(default = "default_stats_interval_secs")]
    pub stats_interval_secs: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct BridgeConfig {
    #[serde(default)]
    pub can: CanSettings,
    #[serde(default)]
    pub serial: SerialSettings,
    #[serde(default)]
    pub receive: ReceiveSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

fn default_can_interface() -> String {
    "can0".to_string()
}
fn default_station_id() -> u16 {
    0x100 // command station
}
fn default_can_read_timeout_ms() -> u64 {
    100
}
fn default_serial_port() -> String {
    "/dev/ttyS1".to_string()
}
fn default_baud_rate() -> u32 {
    19200
}
fn default_data_bits() -> u8 {
    8
}
fn default_stop_bits() -> u8 {
    1
}
fn default_serial_timeout_ms() -> u64 {
    100
}
fn default_poll_interval_ms() -> u64 {
    1
}
fn default_resync() -> bool {
    true
}
fn default_stats_interval_secs() -> u64 {
    60
}

impl Default for CanSettings {
    fn default() -> Self {
        Self {
            interface: default_can_interface(),
            station_id: default_station_id(),
            read_timeout_ms: default_can_read_timeout_ms(),
            loopback: false,
        }
    }
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            port: default_serial_port(),
            baud_rate: default_baud_rate(),
            data_bits: default_data_bits(),
            stop_bits: default_stop_bits(),
            parity: Parity::None,
            timeout_ms: default_serial_timeout_ms(),
        }
    }
}

impl Default for ReceiveSettings {
    fn default() -> Self {
        Self {
            wait: WaitStrategy::default(),
            poll_interval_ms: default_poll_interval_ms(),
            resync: default_resync(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            log_dir: None,
            trace_frames: false,
            stats_interval_secs: default_stats_interval_secs(),
        }
    }
}

impl ReceiveSettings {
    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            wait: self.wait,
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            resync: self.resync,
        }
    }
}

// ============================================================================
// Loading
// ============================================================================

impl BridgeConfig {
    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, IoError> {
        toml::from_str(content).map_err(|e| IoError::config(format!("parse error: {}", e)))
    }

    /// Load and validate a TOML config file.
    pub fn load(path: &Path) -> Result<Self, IoError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| IoError::config(format!("read {}: {}", path.display(), e)))?;
        let config = Self::from_toml_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), IoError> {
        if self.can.station_id as u32 > MAX_STANDARD_ID {
            return Err(IoError::config(format!(
                "can.station_id 0x{:X} exceeds 11-bit range (max 0x{:X})",
                self.can.station_id, MAX_STANDARD_ID
            )));
        }
        if self.can.interface.is_empty() {
            return Err(IoError::config("can.interface is empty"));
        }
        if self.serial.port.is_empty() {
            return Err(IoError::config("serial.port is empty"));
        }
        if self.serial.baud_rate == 0 {
            return Err(IoError::config("serial.baud_rate must be non-zero"));
        }
        if !(5..=8).contains(&self.serial.data_bits) {
            return Err(IoError::config(format!(
                "serial.data_bits must be 5-8, got {}",
                self.serial.data_bits
            )));
        }
        if !(1..=2).contains(&self.serial.stop_bits) {
            return Err(IoError::config(format!(
                "serial.stop_bits must be 1 or 2, got {}",
                self.serial.stop_bits
            )));
        }
        if self.receive.wait == WaitStrategy::Poll && self.receive.poll_interval_ms == 0 {
            return Err(IoError::config("receive.poll_interval_ms must be non-zero"));
        }
        Ok(())
    }
}

/// Parse a CAN identifier given as hex ("0x100") or decimal ("256").
pub fn parse_can_id(s: &str) -> Result<u16, IoError> {
    let trimmed = s.trim();
    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => trimmed.parse::<u16>(),
    };
    let id = parsed.map_err(|e| IoError::config(format!("invalid CAN id '{}': {}", s, e)))?;
    if id as u32 > MAX_STANDARD_ID {
        return Err(IoError::config(format!(
            "CAN id 0x{:X} exceeds 11-bit range",
            id
        )));
    }
    Ok(id)
}

// ============================================================================
// Tests
// ============================================================================
