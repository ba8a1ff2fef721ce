//! Device error code lookup

use std::collections::HashMap;

use crate::constants::ERROR_COMMAND_FAILED;

/// Maps device error codes to readable text
#[cfg_attr(test, mockall::automock)]
pub trait ErrorTable: Send + Sync {
    /// Text for `code`; unmapped codes yield a placeholder
    fn lookup(&self, code: i32) -> String;
}

/// Placeholder text for codes missing from a table
pub fn unknown_error(code: i32) -> String {
    format!("Unknown error ({})", code)
}

impl ErrorTable for HashMap<i32, String> {
    fn lookup(&self, code: i32) -> String {
        self.get(&code).cloned().unwrap_or_else(|| unknown_error(code))
    }
}

/// Table used when the caller does not provide one
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultErrorTable;

impl ErrorTable for DefaultErrorTable {
    fn lookup(&self, code: i32) -> String {
        match code {
            0 => "OK".to_string(),
            ERROR_COMMAND_FAILED => "Command failed".to_string(),
            _ => unknown_error(code),
        }
    }
}
