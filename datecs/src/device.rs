//! High-level fiscal device interface

use bytes::{BufMut, Bytes, BytesMut};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use tracing::{debug, info, trace, warn};

use datecs_core::{
    constants::{MAX_RESENDS, NAK, SYN, TERMINATOR},
    Command, DefaultErrorTable, Dialect, ErrorTable, Packet, Response, Session, SessionState,
};
use datecs_transport::{TcpTransport, Transport};
use datecs_types::{
    receipt::{round_amount, round_quantity},
    CashAvailability, FiscalBon, PayMode,
};

use crate::error::{Error, Result};

const DATE_TIME_FORMAT_OLD: &str = "%d-%m-%y %H:%M:%S";
const DATE_TIME_FORMAT_X: &str = "%d-%m-%y %H:%M:%S DST";

/// Result of waiting for a reply
#[derive(Debug, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Complete reply up to and including the terminator
    Complete(Bytes),

    /// Device asked for the last frame again
    Nak,
}

/// Feed one received chunk into the reply buffer
///
/// SYN bytes are dropped, NAK aborts the reply and the terminator completes
/// it. Bytes after the terminator are ignored.
pub fn accumulate(response: &mut BytesMut, chunk: &[u8]) -> Option<ReadOutcome> {
    for &b in chunk {
        match b {
            SYN => continue,
            NAK => return Some(ReadOutcome::Nak),
            TERMINATOR => {
                response.put_u8(b);
                return Some(ReadOutcome::Complete(response.split().freeze()));
            }
            _ => response.put_u8(b),
        }
    }
    None
}

/// `P`, `F` or a signed integer
fn is_error_code(field: &str) -> bool {
    let field = field.trim();
    field == "P" || field == "F" || field.parse::<i32>().is_ok()
}

fn format_amount(value: Decimal) -> String {
    format!("{:.2}", round_amount(value))
}

fn format_quantity(value: Decimal) -> String {
    format!("{:.3}", round_quantity(value))
}

/// Datecs fiscal device
///
/// Owns one connection, its session state and the dialect it speaks. All
/// operations take `&mut self`: the protocol allows a single outstanding
/// request.
///
/// # Examples
///
/// ```no_run
/// use datecs::{Dialect, FiscalDevice};
///
/// #[tokio::main]
/// async fn main() -> datecs::Result<()> {
///     let mut device = FiscalDevice::tcp("192.168.8.100", 4999, Dialect::X);
///
///     device.connect().await?;
///     println!("ECR clock: {}", device.get_date_time().await?);
///
///     device.disconnect().await?;
///     Ok(())
/// }
/// ```
pub struct FiscalDevice {
    transport: Box<dyn Transport>,
    dialect: Dialect,
    session: Session,
    error_table: Box<dyn ErrorTable>,
}

impl FiscalDevice {
    /// Create a device over any transport
    pub fn new(transport: Box<dyn Transport>, dialect: Dialect) -> Self {
        Self {
            transport,
            dialect,
            session: Session::new(),
            error_table: Box::new(DefaultErrorTable),
        }
    }

    /// Create a device reached over TCP
    pub fn tcp(host: impl Into<String>, port: u16, dialect: Dialect) -> Self {
        Self::new(Box::new(TcpTransport::new(host, port)), dialect)
    }

    /// Create a device on a serial line
    #[cfg(feature = "serial")]
    pub fn serial(path: impl Into<String>, baud_rate: u32, dialect: Dialect) -> Self {
        Self::new(
            Box::new(datecs_transport::SerialTransport::new(path, baud_rate)),
            dialect,
        )
    }

    /// Set the table used to describe device error codes
    pub fn with_error_table(mut self, table: impl ErrorTable + 'static) -> Self {
        self.error_table = Box::new(table);
        self
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    /// Current sequence number
    pub fn sequence(&self) -> u8 {
        self.session.sequence()
    }

    /// Slip number of the last closed receipt
    pub fn last_slip(&self) -> Option<u32> {
        self.session.last_slip()
    }

    /// Check if connected
    pub fn is_connected(&self) -> bool {
        self.session.is_connected() && self.transport.is_connected()
    }

    /// Connect to device
    pub async fn connect(&mut self) -> Result<()> {
        info!(
            "Connecting to {} ({} dialect)...",
            self.transport.remote_addr(),
            self.dialect
        );

        self.transport.connect().await?;
        self.session.connect()?;

        info!("Connected");
        Ok(())
    }

    /// Disconnect from device
    pub async fn disconnect(&mut self) -> Result<()> {
        if !self.session.is_connected() {
            return Ok(());
        }

        if self.session.is_receipt_open() {
            warn!("Disconnecting with a fiscal receipt still open");
        }

        info!("Disconnecting from {}...", self.transport.remote_addr());

        self.session.close();
        self.transport.disconnect().await?;

        info!("Disconnected");
        Ok(())
    }

    /// Run one command round trip
    ///
    /// The sequence number advances once per call. A NAK from the device
    /// resends the identical frame once; a second NAK fails the command.
    pub async fn execute(&mut self, command: Command, data: &str) -> Result<Response> {
        self.ensure_connected()?;

        if !command.is_supported_by(self.dialect) {
            return Err(Error::NotSupported(format!(
                "{} in the {} dialect",
                command, self.dialect
            )));
        }

        let sequence = self.session.next_sequence();
        let packet = Packet::with_data(sequence, command, data.to_owned());
        self.session
            .set_last_packet(packet.encode(self.dialect)?.freeze());

        debug!("Executing {}", packet);

        for attempt in 0..=MAX_RESENDS {
            if attempt > 0 {
                warn!("NAK received for {}, resending (seq=0x{:02X})", command, sequence);
            }

            let frame = self.session.last_packet().cloned().ok_or_else(|| {
                datecs_core::Error::InvalidSessionState("no frame to send".into())
            })?;
            trace!("Sending frame: {}", hex::encode(&frame));
            self.transport.send(&frame).await?;

            match self.await_response().await? {
                ReadOutcome::Complete(raw) => {
                    trace!("Received frame: {}", hex::encode(&raw));
                    return Ok(Response::new(self.dialect, &raw)?);
                }
                ReadOutcome::Nak => continue,
            }
        }

        Err(Error::RepeatedNak { command })
    }

    /// Read until the device terminates its reply or answers NAK
    async fn await_response(&mut self) -> Result<ReadOutcome> {
        let mut response = BytesMut::new();

        loop {
            let chunk = self.transport.receive().await?;
            if let Some(outcome) = accumulate(&mut response, &chunk) {
                return Ok(outcome);
            }
        }
    }

    /// Execute a command and turn a failed reply into [`Error::Device`]
    async fn execute_checked(
        &mut self,
        function: &'static str,
        command: Command,
        data: &str,
        error_field: Option<usize>,
    ) -> Result<Response> {
        let mut response = self.execute(command, data).await?;
        self.check(function, &mut response, error_field)?;
        Ok(response)
    }

    fn check(
        &self,
        function: &'static str,
        response: &mut Response,
        error_field: Option<usize>,
    ) -> Result<()> {
        if response.resolve_errors(error_field, self.error_table.as_ref())? {
            return Ok(());
        }

        let message = if response.error_code != 0 {
            response.error_message.clone()
        } else {
            format!("status {:?}", response.status.general())
        };

        debug!(function, code = response.error_code, %message, "Device reported an error");

        Err(Error::Device {
            function,
            code: response.error_code,
            message,
        })
    }

    /// Error field of ordinary replies
    fn error_field(&self) -> Option<usize> {
        match self.dialect {
            Dialect::X => Some(0),
            Dialect::Old => None,
        }
    }

    /// Read the device clock
    pub async fn get_date_time(&mut self) -> Result<NaiveDateTime> {
        let mut response = self.execute(Command::GetDateTime, "").await?;

        // OLD firmware answers either with the bare date or with a leading error code
        let bare_date = response.fields.len() == 1 && !is_error_code(&response.fields[0]);
        let (field, error_field, format) = match self.dialect {
            Dialect::X => (1, Some(0), DATE_TIME_FORMAT_X),
            Dialect::Old if bare_date => (0, None, DATE_TIME_FORMAT_OLD),
            Dialect::Old => (1, Some(0), DATE_TIME_FORMAT_OLD),
        };
        self.check("get_date_time", &mut response, error_field)?;

        let text = response.field(field)?.trim();
        NaiveDateTime::parse_from_str(text, format)
            .map_err(|e| Error::InvalidResponse(format!("date/time {:?}: {}", text, e)))
    }

    /// Set the device clock
    pub async fn set_date_time(&mut self, timestamp: NaiveDateTime) -> Result<()> {
        let data = match self.dialect {
            Dialect::X => self
                .dialect
                .join_fields([timestamp.format(DATE_TIME_FORMAT_X).to_string()]),
            Dialect::Old => timestamp.format(DATE_TIME_FORMAT_OLD).to_string(),
        };

        let error_field = self.error_field();
        self.execute_checked("set_date_time", Command::SetDateTime, &data, error_field)
            .await?;

        info!("Device clock set to {}", timestamp);
        Ok(())
    }

    /// Deposit (positive amount) or withdraw (negative amount) cash
    pub async fn cash_in_out(&mut self, amount: Decimal) -> Result<()> {
        let data = match self.dialect {
            Dialect::X => {
                let kind = if amount.is_sign_negative() { "-1" } else { "0" };
                let value = format_amount(amount.abs());
                self.dialect.join_fields([kind, value.as_str()])
            }
            Dialect::Old => format_amount(amount),
        };

        self.execute_checked("cash_in_out", Command::CashInOut, &data, Some(0))
            .await?;

        info!("Cash {} {}", if amount.is_sign_negative() { "out" } else { "in" }, amount.abs());
        Ok(())
    }

    /// Read the cash drawer totals
    pub async fn get_cash_availability(&mut self) -> Result<CashAvailability> {
        let data = match self.dialect {
            Dialect::X => self.dialect.join_fields(["0", "0.00"]),
            Dialect::Old => "0".to_string(),
        };

        let response = self
            .execute_checked("get_cash_availability", Command::CashInOut, &data, Some(0))
            .await?;

        let dialect = self.dialect;
        let value = |index: usize| -> Result<Decimal> {
            let text = response.field(index)?.trim();
            let value: Decimal = text
                .parse()
                .map_err(|_| Error::InvalidResponse(format!("cash amount {:?}", text)))?;

            // OLD reports minor units
            Ok(match dialect {
                Dialect::X => value,
                Dialect::Old => value / Decimal::ONE_HUNDRED,
            })
        };

        Ok(CashAvailability {
            cash_sum: value(1)?,
            service_in: value(2)?,
            service_out: value(3)?,
        })
    }

    /// Read diagnostic information
    pub async fn get_diagnostic_info(&mut self) -> Result<String> {
        let error_field = self.error_field();
        let response = self
            .execute_checked(
                "get_diagnostic_info",
                Command::DiagnosticInfo,
                "",
                error_field,
            )
            .await?;

        Ok(response.data)
    }

    /// Read a device parameter (X dialect only)
    pub async fn read_parameter(&mut self, name: &str, index: Option<u32>) -> Result<String> {
        if self.dialect != Dialect::X {
            return Err(Error::NotSupported(format!(
                "reading parameters in the {} dialect",
                self.dialect
            )));
        }

        let index = index.map(|i| i.to_string()).unwrap_or_default();
        let data = self.dialect.join_fields([name, index.as_str(), ""]);

        let response = self
            .execute_checked("read_parameter", Command::Programming, &data, Some(0))
            .await?;

        Ok(response.field(1)?.to_string())
    }

    /// Open a fiscal receipt
    pub async fn open_fiscal_receipt(
        &mut self,
        operator: u32,
        password: &str,
        work_place: &str,
        sale_ref: Option<&str>,
    ) -> Result<()> {
        self.ensure_connected()?;
        if self.session.is_receipt_open() {
            return Err(datecs_core::Error::InvalidSessionState(
                "a fiscal receipt is already open".into(),
            )
            .into());
        }

        let operator = operator.to_string();
        let mut fields = vec![operator.as_str(), password];
        fields.extend(sale_ref);
        fields.extend([work_place, ""]);
        let data = self.dialect.join_fields(fields);

        let error_field = self.error_field();
        self.execute_checked(
            "open_fiscal_receipt",
            Command::OpenFiscalReceipt,
            &data,
            error_field,
        )
        .await?;

        self.session.open_receipt()?;
        info!("Fiscal receipt opened (operator={})", operator);
        Ok(())
    }

    /// Open a storno (cancellation) document
    ///
    /// The device syntax is
    /// `OpCode, OpPwd, TillNmb, Storno, DocNum, DateTime, FMNumber, Invoice,
    /// ToInvoice, Reason, NSale` but how receipt metadata maps onto the
    /// storno type and reason fields is not settled, so nothing is sent.
    pub async fn open_storno_document(&mut self, receipt: &FiscalBon) -> Result<()> {
        self.ensure_connected()?;

        warn!(
            operator = receipt.operator,
            "Storno documents are not supported yet"
        );

        Err(Error::NotSupported("open_storno_document".into()))
    }

    /// Register a sale line
    pub async fn fiscal_sale(
        &mut self,
        name: &str,
        tax_code: char,
        price: Decimal,
        quantity: Option<Decimal>,
        unit: &str,
    ) -> Result<()> {
        self.ensure_connected()?;
        self.session.ensure_receipt_open()?;

        let tax_code = tax_code.to_string();
        let price = format_amount(price);
        let quantity = quantity.map(format_quantity).unwrap_or_default();
        let data = self
            .dialect
            .join_fields([
                name,
                tax_code.as_str(),
                price.as_str(),
                quantity.as_str(),
                "",
                "",
                "0",
                unit,
            ]);

        let error_field = self.error_field();
        self.execute_checked("fiscal_sale", Command::RegisterSale, &data, error_field)
            .await?;

        debug!("Registered sale: {} {} x {}", name, quantity, price);
        Ok(())
    }

    /// Total the receipt with a payment
    pub async fn total(&mut self, pay_mode: PayMode, amount: Decimal) -> Result<()> {
        self.ensure_connected()?;
        self.session.ensure_receipt_open()?;

        let mode = pay_mode.to_string();
        let amount = format_amount(amount);
        let data = self.dialect.join_fields([mode.as_str(), amount.as_str(), ""]);

        let error_field = self.error_field();
        self.execute_checked("total", Command::Total, &data, error_field)
            .await?;

        Ok(())
    }

    /// Close the fiscal receipt and record its slip number
    pub async fn close_bon(&mut self) -> Result<()> {
        self.ensure_connected()?;
        self.session.ensure_receipt_open()?;

        let error_field = self.error_field();
        let response = self
            .execute_checked("close_bon", Command::CloseFiscalReceipt, "", error_field)
            .await?;

        let slip = response
            .fields
            .get(1)
            .and_then(|field| field.trim().parse().ok());
        if slip.is_none() {
            warn!("Close reply carries no slip number: {:?}", response.fields);
        }

        self.session.close_receipt(slip);
        info!("Fiscal receipt closed (slip={:?})", slip);
        Ok(())
    }

    /// Cancel the open fiscal receipt
    ///
    /// The session leaves the receipt state whatever the device answers.
    pub async fn cancel_bon(&mut self) -> Result<()> {
        let result = self.execute(Command::CancelFiscalReceipt, "").await;
        self.session.end_receipt();

        let mut response = result?;
        let error_field = self.error_field();
        self.check("cancel_bon", &mut response, error_field)?;

        info!("Fiscal receipt cancelled");
        Ok(())
    }

    /// Print a closed receipt
    ///
    /// Opens the receipt, registers every line, totals and closes it. A
    /// failure after the receipt was opened cancels it on the device and
    /// returns the original error.
    pub async fn print(&mut self, receipt: FiscalBon) -> Result<()> {
        let payed = receipt.payed().ok_or(Error::ReceiptNotClosed)?;

        if receipt.is_storno() {
            self.open_storno_document(&receipt).await?;
        } else {
            self.open_fiscal_receipt(
                receipt.operator,
                &receipt.password,
                &receipt.work_place,
                receipt.sale_ref.as_deref(),
            )
            .await?;
        }

        if let Err(e) = self.print_open_receipt(&receipt, payed).await {
            warn!("Printing failed, cancelling receipt: {}", e);
            if let Err(cancel_err) = self.cancel_bon().await {
                warn!("Cancelling receipt failed: {}", cancel_err);
            }
            return Err(e);
        }

        Ok(())
    }

    async fn print_open_receipt(&mut self, receipt: &FiscalBon, payed: Decimal) -> Result<()> {
        for article in receipt.articles() {
            self.fiscal_sale(
                &article.name,
                article.tax_code,
                article.price,
                Some(article.quantity),
                &article.unit,
            )
            .await?;
        }

        self.total(receipt.pay_mode(), payed).await?;
        self.close_bon().await
    }

    // Helper methods

    fn ensure_connected(&self) -> Result<()> {
        if !self.is_connected() {
            return Err(Error::NotConnected);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_device_create() {
        let device = FiscalDevice::tcp("192.168.8.100", 4999, Dialect::X);
        assert!(!device.is_connected());
        assert_eq!(device.state(), SessionState::Disconnected);
        assert_eq!(device.sequence(), 0x20);
    }

    #[test]
    fn test_accumulate_skips_syn() {
        let mut buf = BytesMut::new();

        assert_eq!(accumulate(&mut buf, &[0x16, 0x01, 0x16, 0x2C]), None);
        assert_eq!(
            accumulate(&mut buf, &[0x04, 0x03, 0xAA]),
            Some(ReadOutcome::Complete(Bytes::from_static(&[0x01, 0x2C, 0x04, 0x03])))
        );
    }

    #[test]
    fn test_accumulate_nak() {
        let mut buf = BytesMut::new();
        assert_eq!(accumulate(&mut buf, &[0x01, 0x15, 0x03]), Some(ReadOutcome::Nak));
    }

    #[test]
    fn test_error_code_fields() {
        assert!(is_error_code("P"));
        assert!(is_error_code("F"));
        assert!(is_error_code("-111008"));
        assert!(!is_error_code("02-10-19 21:29:42"));
        assert!(!is_error_code(""));
    }

    #[test]
    fn test_amount_formatting() {
        assert_eq!(format_amount(Decimal::new(20123, 3)), "20.12");
        assert_eq!(format_amount(Decimal::new(5, 0)), "5.00");
        assert_eq!(format_quantity(Decimal::new(235, 2)), "2.350");
    }

    #[tokio::test]
    async fn test_execute_requires_connection() {
        let mut device = FiscalDevice::tcp("192.168.8.100", 4999, Dialect::X);

        let result = device.execute(Command::GetDateTime, "").await;
        assert!(matches!(result, Err(Error::NotConnected)));
        assert_eq!(device.sequence(), 0x20);
    }

    // Requires a real device
    #[tokio::test]
    #[ignore]
    async fn test_device_get_date_time() {
        let mut device = FiscalDevice::tcp("192.168.8.100", 4999, Dialect::X);
        device.connect().await.unwrap();

        let now = device.get_date_time().await.unwrap();
        println!("{}", now);

        device.disconnect().await.unwrap();
    }
}
