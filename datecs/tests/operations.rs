mod common;

use std::collections::HashMap;

use chrono::NaiveDate;
use common::{connected, old_reply, old_reply_with_status, x_reply, ScriptedTransport};
use datecs::{CashAvailability, Command, Dialect, Error, FiscalDevice};
use rust_decimal::Decimal;
use pretty_assertions::assert_eq;

fn timestamp() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 16)
        .unwrap()
        .and_hms_opt(9, 5, 7)
        .unwrap()
}

#[tokio::test]
async fn x_date_time_reads_field_one() {
    let (mut device, transport) = connected(Dialect::X).await;
    transport.push(x_reply("0\t16-10-26 09:05:07 DST\t"));

    assert_eq!(device.get_date_time().await.unwrap(), timestamp());
    assert_eq!(transport.sent_commands(Dialect::X), [Command::GetDateTime]);
}

#[tokio::test]
async fn old_date_time_without_error_field() {
    let (mut device, transport) = connected(Dialect::Old).await;
    transport.push(old_reply("16-10-26 09:05:07"));

    assert_eq!(device.get_date_time().await.unwrap(), timestamp());
}

#[tokio::test]
async fn old_date_time_with_error_field() {
    let (mut device, transport) = connected(Dialect::Old).await;
    transport.push(old_reply("P,16-10-26 09:05:07"));

    assert_eq!(device.get_date_time().await.unwrap(), timestamp());
}

#[tokio::test]
async fn old_date_time_reports_failure() {
    let (mut device, transport) = connected(Dialect::Old).await;
    transport.push(old_reply("F,"));

    let err = device.get_date_time().await.unwrap_err();
    assert!(matches!(
        err,
        Error::Device {
            function: "get_date_time",
            code: -20,
            ..
        }
    ));
}

#[tokio::test]
async fn old_date_time_bare_failure_code() {
    let (mut device, transport) = connected(Dialect::Old).await;
    transport.push(old_reply("F"));

    let err = device.get_date_time().await.unwrap_err();
    assert!(matches!(
        err,
        Error::Device {
            function: "get_date_time",
            code: -20,
            ..
        }
    ));
}

#[tokio::test]
async fn old_date_time_bare_numeric_code() {
    let (mut device, transport) = connected(Dialect::Old).await;
    transport.push(old_reply("-100001"));

    let err = device.get_date_time().await.unwrap_err();
    assert!(matches!(
        err,
        Error::Device {
            function: "get_date_time",
            code: -100001,
            ..
        }
    ));
}

#[tokio::test]
async fn set_date_time_payloads() {
    let (mut device, transport) = connected(Dialect::X).await;
    transport.push(x_reply("0\t"));
    device.set_date_time(timestamp()).await.unwrap();
    assert_eq!(transport.last_payload(Dialect::X), "16-10-26 09:05:07 DST\t");

    let (mut device, transport) = connected(Dialect::Old).await;
    transport.push(old_reply(""));
    device.set_date_time(timestamp()).await.unwrap();
    assert_eq!(transport.last_payload(Dialect::Old), "16-10-26 09:05:07");
}

#[tokio::test]
async fn old_status_error_fails_without_error_field() {
    let (mut device, transport) = connected(Dialect::Old).await;
    // general error + cover open
    transport.push(old_reply_with_status("", 0b1110_0000));

    let err = device.set_date_time(timestamp()).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Device {
            function: "set_date_time",
            code: 0,
            ..
        }
    ));
}

#[tokio::test]
async fn x_cash_in_and_out_payloads() {
    let (mut device, transport) = connected(Dialect::X).await;
    transport.push(x_reply("0\t"));
    transport.push(x_reply("0\t"));

    device.cash_in_out(Decimal::new(100, 0)).await.unwrap();
    assert_eq!(transport.last_payload(Dialect::X), "0\t100.00\t");

    device.cash_in_out(Decimal::new(-255, 1)).await.unwrap();
    assert_eq!(transport.last_payload(Dialect::X), "-1\t25.50\t");
}

#[tokio::test]
async fn old_cash_in_out_payload() {
    let (mut device, transport) = connected(Dialect::Old).await;
    transport.push(old_reply("P,1250,100,0"));

    device.cash_in_out(Decimal::new(-12345, 3)).await.unwrap();
    assert_eq!(transport.last_payload(Dialect::Old), "-12.35");
    assert_eq!(transport.sent_commands(Dialect::Old), [Command::CashInOut]);
}

#[tokio::test]
async fn x_cash_availability() {
    let (mut device, transport) = connected(Dialect::X).await;
    transport.push(x_reply("0\t1250.00\t100.00\t0.00\t"));

    let cash = device.get_cash_availability().await.unwrap();

    assert_eq!(transport.last_payload(Dialect::X), "0\t0.00\t");
    assert_eq!(
        cash,
        CashAvailability {
            cash_sum: Decimal::new(125000, 2),
            service_in: Decimal::new(10000, 2),
            service_out: Decimal::ZERO,
        }
    );
}

#[tokio::test]
async fn old_cash_availability_is_in_minor_units() {
    let (mut device, transport) = connected(Dialect::Old).await;
    transport.push(old_reply("P,125000,10000,550"));

    let cash = device.get_cash_availability().await.unwrap();

    assert_eq!(transport.last_payload(Dialect::Old), "0");
    assert_eq!(cash.cash_sum, Decimal::new(1250, 0));
    assert_eq!(cash.service_in, Decimal::new(100, 0));
    assert_eq!(cash.service_out, Decimal::new(550, 2));
}

#[tokio::test]
async fn device_errors_use_the_error_table() {
    let transport = ScriptedTransport::new();
    let table = HashMap::from([(-111008, "Receipt is open".to_string())]);
    let mut device =
        FiscalDevice::new(Box::new(transport.clone()), Dialect::X).with_error_table(table);
    device.connect().await.unwrap();
    transport.push(x_reply("-111008\t"));

    match device.cash_in_out(Decimal::ONE).await {
        Err(Error::Device {
            function,
            code,
            message,
        }) => {
            assert_eq!(function, "cash_in_out");
            assert_eq!(code, -111008);
            assert_eq!(message, "Receipt is open");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn unknown_codes_fall_back_to_generic_text() {
    let (mut device, transport) = connected(Dialect::X).await;
    transport.push(x_reply("-999\t"));

    let err = device.get_diagnostic_info().await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "get_diagnostic_info failed with device error -999: Unknown error (-999)"
    );
    assert!(err.is_device_error());
    assert!(!err.requires_reconnect());
}

#[tokio::test]
async fn read_parameter_returns_the_value() {
    let (mut device, transport) = connected(Dialect::X).await;
    transport.push(x_reply("0\tThank you\t"));

    let value = device.read_parameter("FooterText", Some(1)).await.unwrap();

    assert_eq!(value, "Thank you");
    assert_eq!(transport.last_payload(Dialect::X), "FooterText\t1\t\t");
    assert_eq!(transport.sent_commands(Dialect::X), [Command::Programming]);
}

#[tokio::test]
async fn read_parameter_without_index() {
    let (mut device, transport) = connected(Dialect::X).await;
    transport.push(x_reply("0\t4999\t"));

    assert_eq!(device.read_parameter("LanPort", None).await.unwrap(), "4999");
    assert_eq!(transport.last_payload(Dialect::X), "LanPort\t\t\t");
}

#[tokio::test]
async fn read_parameter_is_x_only() {
    let (mut device, transport) = connected(Dialect::Old).await;

    let err = device.read_parameter("FooterText", None).await.unwrap_err();
    assert!(matches!(err, Error::NotSupported(_)));
    assert!(transport.sent().is_empty());
}
