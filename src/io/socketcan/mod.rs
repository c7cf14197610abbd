// src/io/socketcan/mod.rs
//
// SocketCAN driver for the CAN side of the bridge.
// Only fully functional on Linux; other platforms get a stub that fails to open.

#[cfg(target_os = "linux")]
pub mod codec;
mod reader;

pub use reader::SocketCanLink;
