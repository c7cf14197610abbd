// src/io/serial/mod.rs
//
// Serial side of the bridge: port handling, line settings and frame
// synchronisation for the fixed 11-byte frames.

pub mod framer;
pub mod link;
pub(crate) mod utils;

pub use framer::{FrameRead, FrameSync, SyncConfig, WaitStrategy};
pub use link::{clone_port, list_ports, open_port, serial_device, SerialLink, SerialPortInfo};
pub use utils::Parity;
