//! Clock and diagnostics example (OLD dialect over a serial line)

use anyhow::Context;
use datecs::{Dialect, FiscalDevice, SerialTransport};
use datecs_core::constants::DEFAULT_BAUD_RATE;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .init();

    let path = std::env::var("DEVICE_SERIAL").unwrap_or_else(|_| "/dev/ttyUSB0".to_string());
    let baud = match std::env::var("DEVICE_BAUD") {
        Ok(baud) => baud.parse().context("DEVICE_BAUD must be a number")?,
        Err(_) => DEFAULT_BAUD_RATE,
    };

    println!("Available ports: {:?}", SerialTransport::available_ports());

    let mut device = FiscalDevice::serial(path, baud, Dialect::Old);
    device.connect().await?;

    println!("Device clock: {}", device.get_date_time().await?);
    println!("Diagnostics: {}", device.get_diagnostic_info().await?);

    device.disconnect().await?;

    Ok(())
}
