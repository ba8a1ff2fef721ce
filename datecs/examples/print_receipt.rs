//! Receipt printing example (X dialect over TCP)

use anyhow::Context;
use chrono::Local;
use datecs::{Article, Dialect, FiscalBon, FiscalDevice, PayMode};
use datecs_core::constants::DEFAULT_TCP_PORT;
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let ip = std::env::var("DEVICE_IP").unwrap_or_else(|_| "192.168.8.100".to_string());
    let port = match std::env::var("DEVICE_PORT") {
        Ok(port) => port.parse().context("DEVICE_PORT must be a port number")?,
        Err(_) => DEFAULT_TCP_PORT,
    };

    let mut device = FiscalDevice::tcp(ip, port, Dialect::X);
    device.connect().await?;

    println!("Device connected!");

    device.set_date_time(Local::now().naive_local()).await?;
    println!("Device clock: {}", device.get_date_time().await?);

    device.cash_in_out(Decimal::new(10000, 2)).await?;
    println!("{}", device.get_cash_availability().await?);

    let mut bon = FiscalBon::new(1, "1", "0001");
    bon.add(Article::new("Bread", Decimal::new(2, 0), Decimal::new(150, 2), "pcs"));
    bon.add(Article::new("Milk", Decimal::ONE, Decimal::new(200, 2), "l").with_tax_code('B'));
    bon.close(Decimal::new(500, 2), PayMode::Card)?;

    device.print(bon).await?;
    println!("Printed slip {:?}", device.last_slip());

    device.disconnect().await?;

    Ok(())
}
