// src/main.rs

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use can_uart_bridge_lib::io::serial::list_ports;
use can_uart_bridge_lib::settings::{parse_can_id, BridgeConfig};
use can_uart_bridge_lib::tlog;

#[derive(Parser, Debug)]
#[command(name = "can-uart-bridge")]
#[command(about = "Bridge CAN frames to and from a fixed 11-byte serial frame")]
struct Cli {
    #[arg(long, help = "TOML configuration file")]
    config: Option<PathBuf>,

    #[arg(long, help = "CAN interface, e.g. can0")]
    can_interface: Option<String>,

    #[arg(long, help = "serial device, e.g. /dev/ttyS1")]
    serial_port: Option<String>,

    #[arg(long)]
    baud_rate: Option<u32>,

    #[arg(long, value_parser = station_id, help = "identifier for outbound CAN frames (hex or decimal)")]
    station_id: Option<u16>,

    #[arg(long, help = "log every frame received and sent")]
    trace_frames: bool,

    #[arg(long, help = "also write logs to a timestamped file in this directory")]
    log_dir: Option<PathBuf>,

    #[arg(long, help = "list available serial ports and exit")]
    list_ports: bool,
}

fn station_id(s: &str) -> Result<u16, String> {
    parse_can_id(s).map_err(String::from)
}

impl Cli {
    fn into_config(self) -> Result<BridgeConfig, String> {
        let mut config = match &self.config {
            Some(path) => BridgeConfig::load(path)?,
            None => BridgeConfig::default(),
        };

        if let Some(interface) = self.can_interface {
            config.can.interface = interface;
        }
        if let Some(port) = self.serial_port {
            config.serial.port = port;
        }
        if let Some(baud_rate) = self.baud_rate {
            config.serial.baud_rate = baud_rate;
        }
        if let Some(id) = self.station_id {
            config.can.station_id = id;
        }
        if self.trace_frames {
            config.logging.trace_frames = true;
        }
        if self.log_dir.is_some() {
            config.logging.log_dir = self.log_dir;
        }

        config.validate()?;
        Ok(config)
    }
}

fn print_ports() -> ExitCode {
    match list_ports() {
        Ok(ports) if ports.is_empty() => {
            println!("No serial ports found");
            ExitCode::SUCCESS
        }
        Ok(ports) => {
            for port in ports {
                let detail = [port.manufacturer, port.product]
                    .into_iter()
                    .flatten()
                    .collect::<Vec<_>>()
                    .join(" ");
                if detail.is_empty() {
                    println!("{} ({})", port.port_name, port.port_type);
                } else {
                    println!("{} ({}: {})", port.port_name, port.port_type, detail);
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tlog!("[main] {}", e);
            ExitCode::FAILURE
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.list_ports {
        return print_ports();
    }

    let config = match cli.into_config() {
        Ok(config) => config,
        Err(e) => {
            tlog!("[main] {}", e);
            return ExitCode::FAILURE;
        }
    };

    match can_uart_bridge_lib::run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tlog!("[main] Fatal: {}", e);
            ExitCode::FAILURE
        }
    }
}
