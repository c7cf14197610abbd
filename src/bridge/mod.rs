// src/bridge/mod.rs
//
// The two bridge pipelines and the wiring that connects them to real
// transports. Each pipeline runs on its own blocking thread, owns its
// transport handles and frame buffer, and watches a shared stop flag.

mod can_to_serial;
mod serial_to_can;
mod stats;

pub use can_to_serial::CanToSerial;
pub use serial_to_can::SerialToCan;
pub use stats::PipelineStats;

use serialport::SerialPort;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use crate::io::serial::{clone_port, open_port, serial_device, FrameSync, SerialLink};
use crate::io::socketcan::SocketCanLink;
use crate::io::{CanLink, IoError};
use crate::settings::BridgeConfig;

/// Pause after a failed read so a dead transport does not spin the loop
const READ_ERROR_BACKOFF: Duration = Duration::from_millis(10);

pub type CanToSerialBridge = CanToSerial<SocketCanLink, Box<dyn SerialPort>>;
pub type SerialToCanBridge = SerialToCan<Box<dyn SerialPort>, SocketCanLink>;

/// Open both transports and build the two pipelines.
///
/// Any open failure is returned as `IoError::Connection` and is fatal.
pub fn open_bridge(config: &BridgeConfig) -> Result<(CanToSerialBridge, SerialToCanBridge), IoError> {
    let stats_interval = match config.logging.stats_interval_secs {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    };

    let serial_tx = open_port(&config.serial)?;
    let serial_rx = clone_port(&*serial_tx, &config.serial.port)?;
    let device = serial_device(&config.serial.port);

    // The receive socket never writes, so its loopback setting is moot
    let can_rx = SocketCanLink::open(&config.can, false)?;
    let can_tx = SocketCanLink::open(&config.can, config.can.loopback)?;

    let can_to_serial = CanToSerial::new(
        can_rx,
        serial_tx,
        device.clone(),
        PipelineStats::new("can->serial", stats_interval),
    );
    let serial_to_can = SerialToCan::new(
        serial_rx,
        can_tx,
        FrameSync::new(config.receive.sync_config(), device.clone()),
        device,
        config.can.station_id,
        PipelineStats::new("serial->can", stats_interval),
    );

    Ok((can_to_serial, serial_to_can))
}

/// Run both pipelines until `stop` is raised and collect their counters.
///
/// A pipeline that panics is logged and contributes no counters; the other
/// keeps running until stopped.
pub async fn run_pipelines<C1, S1, S2, C2>(
    can_to_serial: CanToSerial<C1, S1>,
    serial_to_can: SerialToCan<S2, C2>,
    stop: Arc<AtomicBool>,
) -> Vec<PipelineStats>
where
    C1: CanLink + 'static,
    S1: SerialLink + 'static,
    S2: SerialLink + 'static,
    C2: CanLink + 'static,
{
    let stop_can = stop.clone();
    let can_handle = tokio::task::spawn_blocking(move || can_to_serial.run(&stop_can));

    let stop_serial = stop.clone();
    let serial_handle = tokio::task::spawn_blocking(move || serial_to_can.run(&stop_serial));

    let mut collected = Vec::with_capacity(2);
    for (name, handle) in [("can->serial", can_handle), ("serial->can", serial_handle)] {
        match handle.await {
            Ok(stats) => collected.push(stats),
            Err(e) => tlog!("[bridge] {} pipeline panicked: {:?}", name, e),
        }
    }
    collected
}
