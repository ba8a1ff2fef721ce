//! Decoded device replies

use std::fmt;

use tracing::trace;

use crate::{
    constants::ERROR_COMMAND_FAILED,
    dialect::Dialect,
    error::{Error, Result},
    error_table::ErrorTable,
    packet::decode_payload,
    status::Status,
};

/// Device reply
///
/// Holds the payload split into fields and the decoded status window. `ok`
/// starts out from the status flags alone; [`Response::resolve_errors`] folds
/// in the command's explicit error field when it has one.
#[derive(Clone)]
pub struct Response {
    /// Raw payload text
    pub data: String,

    /// Payload split by the dialect separator
    pub fields: Vec<String>,

    /// Status window
    pub status: Status,

    /// Device error code (0 on success)
    pub error_code: i32,

    /// Text for `error_code`
    pub error_message: String,

    /// Overall success
    pub ok: bool,

    dialect: Dialect,
}

impl Response {
    /// Decode a raw reply
    ///
    /// # Errors
    ///
    /// Fails when the reply has no separator or a truncated status window.
    ///
    /// # Examples
    ///
    /// ```
    /// use datecs_core::{Dialect, Response};
    ///
    /// let raw = b"\x01\x2A\x21\x46P,1250,100,0\x04\x80\x80\x80\x80\x80\x80\x05\x30\x30\x30\x30\x03";
    /// let response = Response::new(Dialect::Old, raw).unwrap();
    ///
    /// assert!(response.ok);
    /// assert_eq!(response.fields, ["P", "1250", "100", "0"]);
    /// ```
    pub fn new(dialect: Dialect, raw: &[u8]) -> Result<Self> {
        let (data, status) = decode_payload(dialect, raw)?;
        let fields = dialect.split_fields(&data);
        let status = Status::new(status);

        trace!(dialect = %dialect, data = %data, status = ?status, "Decoded response");

        Ok(Self {
            ok: status.is_ok(),
            data,
            fields,
            status,
            error_code: 0,
            error_message: String::new(),
            dialect,
        })
    }

    /// Dialect the reply was decoded with
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Field by index
    pub fn field(&self, index: usize) -> Result<&str> {
        self.fields
            .get(index)
            .map(String::as_str)
            .ok_or(Error::MissingField {
                index,
                count: self.fields.len(),
            })
    }

    /// Fold the command's error field into `ok`
    ///
    /// `None` means the command has no error field and `ok` keeps the value
    /// derived from the status bytes. Otherwise the field reads `P` (success),
    /// `F` (generic failure, -20) or a signed integer code.
    ///
    /// # Errors
    ///
    /// Fails when the field is missing or not a valid code.
    pub fn resolve_errors(
        &mut self,
        field: Option<usize>,
        table: &dyn ErrorTable,
    ) -> Result<bool> {
        let Some(index) = field else {
            return Ok(self.ok);
        };

        let value = self.field(index)?.trim();
        self.error_code = match value {
            "P" => 0,
            "F" => ERROR_COMMAND_FAILED,
            other => other
                .parse()
                .map_err(|_| Error::InvalidErrorCode(other.to_string()))?,
        };
        self.error_message = table.lookup(self.error_code);
        self.ok = self.ok && self.error_code == 0;

        Ok(self.ok)
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("dialect", &self.dialect)
            .field("fields", &self.fields)
            .field("status", &self.status)
            .field("error_code", &self.error_code)
            .field("ok", &self.ok)
            .finish()
    }
}
