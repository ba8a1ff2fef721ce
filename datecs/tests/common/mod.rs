//! Scripted transport shared by the integration tests

#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use bytes::BytesMut;
use datecs::{Command, Dialect, FiscalDevice, Transport};
use datecs_core::{constants::NAK, Packet};

#[derive(Default)]
struct Script {
    connected: bool,
    sent: Vec<Vec<u8>>,
    replies: VecDeque<Vec<u8>>,
}

/// In-memory transport that answers with queued chunks
///
/// Clones share the same script so a test can keep a handle after moving
/// one into the device.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    script: Arc<Mutex<Script>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one chunk returned by a single `receive`
    pub fn push(&self, chunk: impl Into<Vec<u8>>) {
        self.script.lock().unwrap().replies.push_back(chunk.into());
    }

    pub fn push_nak(&self) {
        self.push(vec![NAK]);
    }

    /// Every frame written so far
    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.script.lock().unwrap().sent.clone()
    }

    /// Decode every frame written so far
    pub fn sent_packets(&self, dialect: Dialect) -> Vec<Packet> {
        self.sent()
            .iter()
            .map(|frame| Packet::decode(dialect, frame).unwrap())
            .collect()
    }

    pub fn sent_commands(&self, dialect: Dialect) -> Vec<Command> {
        self.sent_packets(dialect)
            .into_iter()
            .map(|p| p.command)
            .collect()
    }

    /// Payload of the last frame written, as text
    pub fn last_payload(&self, dialect: Dialect) -> String {
        let packet = self.sent_packets(dialect).pop().unwrap();
        String::from_utf8(packet.data.to_vec()).unwrap()
    }

    pub fn pending(&self) -> usize {
        self.script.lock().unwrap().replies.len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn connect(&mut self) -> datecs_transport::Result<()> {
        let mut script = self.script.lock().unwrap();
        if script.connected {
            return Err(datecs_transport::Error::AlreadyConnected);
        }
        script.connected = true;
        Ok(())
    }

    async fn disconnect(&mut self) -> datecs_transport::Result<()> {
        self.script.lock().unwrap().connected = false;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.script.lock().unwrap().connected
    }

    async fn send(&mut self, data: &[u8]) -> datecs_transport::Result<()> {
        let mut script = self.script.lock().unwrap();
        if !script.connected {
            return Err(datecs_transport::Error::NotConnected);
        }
        script.sent.push(data.to_vec());
        Ok(())
    }

    async fn receive(&mut self) -> datecs_transport::Result<BytesMut> {
        let mut script = self.script.lock().unwrap();
        script
            .replies
            .pop_front()
            .map(|chunk| BytesMut::from(&chunk[..]))
            .ok_or(datecs_transport::Error::ReadTimeout)
    }

    fn remote_addr(&self) -> String {
        "scripted".to_string()
    }
}

/// OLD reply frame with the given data and first status byte
pub fn old_reply_with_status(data: &str, status0: u8) -> Vec<u8> {
    let mut raw = vec![0x01, 0x24 + data.len() as u8, 0x21, 0x46];
    raw.extend_from_slice(data.as_bytes());
    raw.push(0x04);
    raw.extend_from_slice(&[status0, 0x80, 0x80, 0x80, 0x80, 0x80, 0x05]);
    raw.extend_from_slice(b"0000\x03");
    raw
}

pub fn old_reply(data: &str) -> Vec<u8> {
    old_reply_with_status(data, 0x80)
}

/// X reply frame
///
/// `data` must end with the separator, which the device always appends.
pub fn x_reply(data: &str) -> Vec<u8> {
    let mut raw = b"\x010040\x21003>00".to_vec();
    raw.extend_from_slice(data.as_bytes());
    raw.push(0x04);
    raw.extend_from_slice(&[0x80; 8]);
    raw.extend_from_slice(b"\x050000\x03");
    raw
}

/// Connected device over a fresh scripted transport
pub async fn connected(dialect: Dialect) -> (FiscalDevice, ScriptedTransport) {
    let transport = ScriptedTransport::new();
    let mut device = FiscalDevice::new(Box::new(transport.clone()), dialect);
    device.connect().await.unwrap();
    (device, transport)
}
