//! Serial transport
//!
//! Uses the blocking `serialport` crate; every port operation runs on tokio's
//! blocking pool so the async caller is never stalled on the line.

use std::io::{self, Read, Write};
use std::time::Duration;

use async_trait::async_trait;
use bytes::BytesMut;
use serialport::SerialPort;
use tracing::{debug, trace, warn};

use crate::{error::*, Transport};

/// Default read timeout
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(300);

const READ_CHUNK: usize = 256;

/// Serial (RS-232 / USB-serial) transport
pub struct SerialTransport {
    path: String,
    baud_rate: u32,
    port: Option<Box<dyn SerialPort>>,
    read_timeout: Duration,
}

impl SerialTransport {
    /// Create new serial transport
    pub fn new(path: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            path: path.into(),
            baud_rate,
            port: None,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    /// Set read timeout
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// List available serial port names
    pub fn available_ports() -> Vec<String> {
        serialport::available_ports()
            .unwrap_or_default()
            .into_iter()
            .map(|p| p.port_name)
            .collect()
    }

    /// Run a blocking operation on the open port
    ///
    /// The port is moved onto the blocking pool and put back afterwards.
    async fn with_port<T, F>(&mut self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Box<dyn SerialPort>) -> Result<T> + Send + 'static,
    {
        let mut port = self.port.take().ok_or(Error::NotConnected)?;

        let (port, result) = tokio::task::spawn_blocking(move || {
            let result = op(&mut port);
            (port, result)
        })
        .await
        .map_err(|e| Error::Io(io::Error::other(e)))?;

        self.port = Some(port);
        result
    }
}

#[async_trait]
impl Transport for SerialTransport {
    async fn connect(&mut self) -> Result<()> {
        if self.is_connected() {
            return Err(Error::AlreadyConnected);
        }

        debug!("Opening {} at {} baud...", self.path, self.baud_rate);

        let path = self.path.clone();
        let baud_rate = self.baud_rate;
        let read_timeout = self.read_timeout;

        let port = tokio::task::spawn_blocking(move || {
            serialport::new(path, baud_rate).timeout(read_timeout).open()
        })
        .await
        .map_err(|e| Error::Io(io::Error::other(e)))?
        .map_err(|e| Error::Serial(format!("{}: {}", self.path, e)))?;

        debug!("Opened {}", self.path);

        self.port = Some(port);
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        if self.port.take().is_some() {
            debug!("Closed {}", self.path);
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.port.is_some()
    }

    async fn send(&mut self, data: &[u8]) -> Result<()> {
        trace!("Sending {} bytes: {}", data.len(), hex::encode(data));

        let data = data.to_vec();
        self.with_port(move |port| {
            port.write_all(&data)?;
            port.flush()?;
            Ok(())
        })
        .await
    }

    async fn receive(&mut self) -> Result<BytesMut> {
        let read_timeout = self.read_timeout;

        let buf = self
            .with_port(move |port| {
                let mut chunk = [0u8; READ_CHUNK];
                match port.read(&mut chunk) {
                    Ok(0) => Err(Error::ConnectionClosed),
                    Ok(n) => Ok(BytesMut::from(&chunk[..n])),
                    Err(e) if e.kind() == io::ErrorKind::TimedOut => {
                        warn!("Read timeout after {:?}", read_timeout);
                        Err(Error::ReadTimeout)
                    }
                    Err(e) => Err(Error::Io(e)),
                }
            })
            .await?;

        trace!("Received {} bytes: {}", buf.len(), hex::encode(&buf));

        Ok(buf)
    }

    fn remote_addr(&self) -> String {
        format!("{}@{}", self.path, self.baud_rate)
    }
}

impl Drop for SerialTransport {
    fn drop(&mut self) {
        if self.is_connected() {
            warn!("Serial transport dropped while still connected");
        }
    }
}
