// src/lib.rs
//
// Library root: module tree and the `run` entry point used by the binary.

#[macro_use]
pub mod logging;

pub mod bridge;
pub mod checksums;
pub mod io;
pub mod settings;

#[cfg(test)]
mod testing;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use io::IoError;
use settings::BridgeConfig;

// ============================================================================
// Entry Point
// ============================================================================

/// Open both transports and bridge them until Ctrl-C.
///
/// Returns an error only for startup failures (bad configuration or a
/// transport that could not be opened). Per-frame errors are logged and
/// counted by the pipelines.
pub async fn run(config: BridgeConfig) -> Result<(), IoError> {
    config.validate()?;

    logging::set_trace_frames(config.logging.trace_frames);
    if let Some(dir) = &config.logging.log_dir {
        if let Err(e) = logging::init_file_logging(dir) {
            tlog!("[bridge] {}; continuing with stderr only", e);
        }
    }

    tlog!(
        "[bridge] CAN <-> UART bridge v{} starting",
        env!("CARGO_PKG_VERSION")
    );
    tlog!(
        "[bridge] {} <-> {}, station id 0x{:03X}, wait: {:?}, resync: {}",
        config.can.interface,
        config.serial.port,
        config.can.station_id,
        config.receive.wait,
        if config.receive.resync { "on" } else { "off" }
    );

    let (can_to_serial, serial_to_can) = match bridge::open_bridge(&config) {
        Ok(pipelines) => pipelines,
        Err(e) => {
            logging::stop_file_logging();
            return Err(e);
        }
    };

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = stop.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => tlog!("[bridge] Stop requested"),
                Err(e) => tlog!("[bridge] Failed to listen for Ctrl-C: {}", e),
            }
            stop.store(true, Ordering::Relaxed);
        });
    }

    let stats = bridge::run_pipelines(can_to_serial, serial_to_can, stop).await;
    for pipeline in &stats {
        pipeline.report();
    }

    tlog!("[bridge] Stopped");
    logging::stop_file_logging();
    Ok(())
}
