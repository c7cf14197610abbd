// src/io/serial/utils.rs
//
// Line settings for the bridge port: parity, the serialport builder and the
// short "19200 8N1" form used in log lines.

use serde::{Deserialize, Serialize};
use serialport::{DataBits, FlowControl, SerialPortBuilder, StopBits};
use std::time::Duration;

use crate::settings::SerialSettings;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    #[default]
    None,
    Odd,
    Even,
}

impl From<Parity> for serialport::Parity {
    fn from(parity: Parity) -> Self {
        match parity {
            Parity::None => serialport::Parity::None,
            Parity::Odd => serialport::Parity::Odd,
            Parity::Even => serialport::Parity::Even,
        }
    }
}

// Widths outside the validated range fall back to 8N1 framing.
fn data_bits(bits: u8) -> DataBits {
    match bits {
        5 => DataBits::Five,
        6 => DataBits::Six,
        7 => DataBits::Seven,
        _ => DataBits::Eight,
    }
}

fn stop_bits(bits: u8) -> StopBits {
    if bits == 2 {
        StopBits::Two
    } else {
        StopBits::One
    }
}

/// Builder for the bridge port. Flow control is always off.
pub fn port_builder(settings: &SerialSettings) -> SerialPortBuilder {
    serialport::new(&settings.port, settings.baud_rate)
        .data_bits(data_bits(settings.data_bits))
        .stop_bits(stop_bits(settings.stop_bits))
        .parity(settings.parity.into())
        .flow_control(FlowControl::None)
        .timeout(Duration::from_millis(settings.timeout_ms))
}

pub fn describe_line(settings: &SerialSettings) -> String {
    let parity = match settings.parity {
        Parity::None => 'N',
        Parity::Odd => 'O',
        Parity::Even => 'E',
    };
    format!(
        "{} {}{}{}",
        settings.baud_rate, settings.data_bits, parity, settings.stop_bits
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parity_maps_onto_port_parity() {
        assert_eq!(
            serialport::Parity::from(Parity::None),
            serialport::Parity::None
        );
        assert_eq!(serialport::Parity::from(Parity::Odd), serialport::Parity::Odd);
        assert_eq!(
            serialport::Parity::from(Parity::Even),
            serialport::Parity::Even
        );
    }

    #[test]
    fn test_line_widths() {
        assert_eq!(data_bits(5), DataBits::Five);
        assert_eq!(data_bits(7), DataBits::Seven);
        assert_eq!(data_bits(8), DataBits::Eight);
        assert_eq!(stop_bits(1), StopBits::One);
        assert_eq!(stop_bits(2), StopBits::Two);
    }

    #[test]
    fn test_describe_default_line() {
        assert_eq!(describe_line(&SerialSettings::default()), "19200 8N1");
    }

    #[test]
    fn test_describe_custom_line() {
        let settings = SerialSettings {
            baud_rate: 9600,
            data_bits: 7,
            parity: Parity::Even,
            stop_bits: 2,
            ..SerialSettings::default()
        };
        assert_eq!(describe_line(&settings), "9600 7E2");
    }
}
