// src/io/socketcan/reader.rs
//
// SocketCAN link for Linux native CAN interfaces.
//
// Requires the interface to be configured first:
//   sudo ip link set can0 up type can bitrate 125000
//
// This module is only compiled on Linux.

#[cfg(target_os = "linux")]
mod linux_impl {
    use socketcan::{CanSocket, Socket, SocketOptions};
    use std::time::Duration;

    use super::super::codec::{from_socketcan, to_socketcan};
    use crate::io::error::IoError;
    use crate::io::types::CanFrame;
    use crate::io::CanLink;
    use crate::settings::CanSettings;

    /// Raw CAN socket bound to one interface.
    pub struct SocketCanLink {
        socket: CanSocket,
        device: String,
    }

    impl SocketCanLink {
        /// Open a raw socket on the configured interface.
        ///
        /// `loopback` controls whether frames written on this socket are also
        /// delivered to other sockets on this host.
        pub fn open(settings: &CanSettings, loopback: bool) -> Result<Self, IoError> {
            let device = format!("socketcan({})", settings.interface);

            let socket = CanSocket::open(&settings.interface)
                .map_err(|e| IoError::connection(&device, e.to_string()))?;

            // Bounded reads keep the receive loop responsive to the stop flag
            socket
                .set_read_timeout(Duration::from_millis(settings.read_timeout_ms))
                .map_err(|e| IoError::connection(&device, format!("set read timeout: {}", e)))?;

            socket
                .set_loopback(loopback)
                .map_err(|e| IoError::connection(&device, format!("set loopback: {}", e)))?;

            tlog!(
                "[socketcan] Opened {} (loopback: {})",
                settings.interface,
                if loopback { "on" } else { "off" }
            );

            Ok(Self { socket, device })
        }
    }

    impl CanLink for SocketCanLink {
        fn read_frame(&mut self) -> Result<Option<CanFrame>, IoError> {
            match self.socket.read_frame() {
                Ok(frame) => {
                    let converted = from_socketcan(frame);
                    if converted.is_none() {
                        ttrace!("[socketcan] Skipped non-data frame on {}", self.device);
                    }
                    Ok(converted)
                }
                Err(ref e)
                    if e.kind() == std::io::ErrorKind::WouldBlock
                        || e.kind() == std::io::ErrorKind::TimedOut =>
                {
                    Ok(None)
                }
                Err(e) => Err(IoError::read(&self.device, e.to_string())),
            }
        }

        fn write_frame(&mut self, frame: &CanFrame) -> Result<(), IoError> {
            let data_frame = to_socketcan(frame, &self.device)?;
            self.socket
                .write_frame(&data_frame)
                .map_err(|e| IoError::write(&self.device, e.to_string()))
        }
    }
}

#[cfg(target_os = "linux")]
pub use linux_impl::SocketCanLink;

// ============================================================================
// Non-Linux Stub
// ============================================================================

#[cfg(not(target_os = "linux"))]
mod stub {
    use crate::io::error::IoError;
    use crate::io::types::CanFrame;
    use crate::io::CanLink;
    use crate::settings::CanSettings;

    /// SocketCAN link (stub for non-Linux)
    pub struct SocketCanLink;

    impl SocketCanLink {
        pub fn open(settings: &CanSettings, _loopback: bool) -> Result<Self, IoError> {
            Err(IoError::connection(
                &format!("socketcan({})", settings.interface),
                "SocketCAN is only available on Linux",
            ))
        }
    }

    impl CanLink for SocketCanLink {
        fn read_frame(&mut self) -> Result<Option<CanFrame>, IoError> {
            Ok(None)
        }

        fn write_frame(&mut self, _frame: &CanFrame) -> Result<(), IoError> {
            Err(IoError::write("socketcan", "SocketCAN is only available on Linux"))
        }
    }
}

#[cfg(not(target_os = "linux"))]
pub use stub::SocketCanLink;
