//! TCP transport for LAN-enabled devices
//!
//! Datecs ECRs with an Ethernet module expose the same framed protocol as the
//! serial port on a plain TCP socket (port 4999 by default).

use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{lookup_host, TcpStream};
use tokio::time::timeout;
use tracing::{debug, trace, warn};

use crate::{error::*, Transport};

/// Default connect timeout
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Default read timeout
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(500);

/// Replies rarely exceed a few hundred bytes
const READ_CHUNK: usize = 512;

/// TCP connection to a fiscal device
pub struct TcpTransport {
    host: String,
    port: u16,
    peer: Option<SocketAddr>,
    stream: Option<TcpStream>,
    connect_timeout: Duration,
    read_timeout: Duration,
}

impl TcpTransport {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            peer: None,
            stream: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    /// Override the connect timeout
    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    /// Override how long `receive` waits for the first byte
    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    async fn lookup(&self) -> Result<SocketAddr> {
        let target = format!("{}:{}", self.host, self.port);

        lookup_host(target.as_str())
            .await
            .map_err(|e| Error::InvalidAddress(format!("{}: {}", target, e)))?
            .next()
            .ok_or_else(|| Error::InvalidAddress(format!("{}: no addresses", target)))
    }

    fn stream(&mut self) -> Result<&mut TcpStream> {
        self.stream.as_mut().ok_or(Error::NotConnected)
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn connect(&mut self) -> Result<()> {
        if self.stream.is_some() {
            return Err(Error::AlreadyConnected);
        }

        let peer = self.lookup().await?;
        debug!(%peer, timeout = ?self.connect_timeout, "Opening TCP connection");

        let stream = match timeout(self.connect_timeout, TcpStream::connect(peer)).await {
            Ok(stream) => stream?,
            Err(_) => return Err(Error::ConnectionTimeout),
        };
        stream.set_nodelay(true)?;

        self.peer = Some(peer);
        self.stream = Some(stream);
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        let Some(mut stream) = self.stream.take() else {
            return Ok(());
        };

        debug!(peer = %self.remote_addr(), "Closing TCP connection");
        if let Err(e) = stream.shutdown().await {
            debug!("Shutdown failed: {}", e);
        }

        self.peer = None;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    async fn send(&mut self, data: &[u8]) -> Result<()> {
        let stream = self.stream()?;
        stream.write_all(data).await?;
        stream.flush().await?;

        trace!("TX {}", hex::encode(data));
        Ok(())
    }

    async fn receive(&mut self) -> Result<BytesMut> {
        let wait = self.read_timeout;
        let stream = self.stream()?;

        let mut chunk = BytesMut::with_capacity(READ_CHUNK);
        let read = match timeout(wait, stream.read_buf(&mut chunk)).await {
            Ok(read) => read?,
            Err(_) => {
                warn!("No data from device within {:?}", wait);
                return Err(Error::ReadTimeout);
            }
        };

        if read == 0 {
            return Err(Error::ConnectionClosed);
        }

        trace!("RX {}", hex::encode(&chunk));
        Ok(chunk)
    }

    fn remote_addr(&self) -> String {
        match self.peer {
            Some(peer) => peer.to_string(),
            None => format!("{}:{}", self.host, self.port),
        }
    }
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        if self.stream.is_some() {
            warn!(peer = %self.remote_addr(), "TCP transport dropped without disconnect");
        }
    }
}
