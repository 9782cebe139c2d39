//! Scripted in-memory transport for exchange tests

use std::collections::VecDeque;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::BytesMut;
use escvp_core::constants::HANDSHAKE;
use escvp_transport::{Error, Result, Transport};
use parking_lot::Mutex;

/// What the device does after one command
#[derive(Debug, Clone)]
pub(crate) enum Reply {
    /// Whole reply in one read
    Line(&'static [u8]),

    /// Reply split over several reads
    Chunks(Vec<&'static [u8]>),

    /// Nothing, ever
    Silent,

    /// Reply arriving only after the read deadline
    Late(&'static [u8]),

    /// Connection reset while reading
    Reset,
}

#[derive(Debug)]
enum Inbound {
    Data(Vec<u8>),
    Late(Vec<u8>),
    Reset,
}

#[derive(Debug, Default)]
struct WireState {
    frames: Vec<Vec<u8>>,
    bytes: Vec<u8>,
    script: VecDeque<Reply>,
    inbox: VecDeque<Inbound>,
    handshake_reply: Option<&'static [u8]>,
    refuse_connect: bool,
    connects: usize,
    disconnects: usize,
    cleared: usize,
}

/// Shared view of what crossed the scripted transport
#[derive(Debug, Clone, Default)]
pub(crate) struct Wire {
    state: Arc<Mutex<WireState>>,
}

impl Wire {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queue the device's reaction to the next command
    pub(crate) fn reply(&self, reply: Reply) -> &Self {
        self.state.lock().script.push_back(reply);
        self
    }

    pub(crate) fn handshake_reply(&self, bytes: &'static [u8]) -> &Self {
        self.state.lock().handshake_reply = Some(bytes);
        self
    }

    pub(crate) fn refuse_connect(&self) -> &Self {
        self.state.lock().refuse_connect = true;
        self
    }

    /// Every `send` call, in order
    pub(crate) fn frames(&self) -> Vec<Vec<u8>> {
        self.state.lock().frames.clone()
    }

    /// All bytes written, in the order they hit the wire
    pub(crate) fn bytes(&self) -> Vec<u8> {
        self.state.lock().bytes.clone()
    }

    pub(crate) fn connects(&self) -> usize {
        self.state.lock().connects
    }

    pub(crate) fn disconnects(&self) -> usize {
        self.state.lock().disconnects
    }

    pub(crate) fn cleared(&self) -> usize {
        self.state.lock().cleared
    }

    pub(crate) fn transport(&self) -> Box<dyn Transport> {
        Box::new(ScriptedTransport {
            wire: self.clone(),
            connected: false,
        })
    }
}

pub(crate) struct ScriptedTransport {
    wire: Wire,
    connected: bool,
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn connect(&mut self) -> Result<()> {
        let mut state = self.wire.state.lock();
        if state.refuse_connect {
            return Err(Error::Io(io::Error::from(io::ErrorKind::ConnectionRefused)));
        }
        state.connects += 1;
        state.inbox.clear();
        self.connected = true;
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        if self.connected {
            self.wire.state.lock().disconnects += 1;
            self.connected = false;
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn send(&mut self, data: &[u8]) -> Result<()> {
        if !self.connected {
            return Err(Error::NotConnected);
        }

        // One byte at a time so that unserialized writers would interleave
        for &byte in data {
            self.wire.state.lock().bytes.push(byte);
            tokio::task::yield_now().await;
        }

        let mut state = self.wire.state.lock();
        state.frames.push(data.to_vec());

        if data == HANDSHAKE {
            if let Some(reply) = state.handshake_reply {
                state.inbox.push_back(Inbound::Data(reply.to_vec()));
            }
            return Ok(());
        }

        match state.script.pop_front().unwrap_or(Reply::Silent) {
            Reply::Line(bytes) => state.inbox.push_back(Inbound::Data(bytes.to_vec())),
            Reply::Chunks(chunks) => {
                for chunk in chunks {
                    state.inbox.push_back(Inbound::Data(chunk.to_vec()));
                }
            }
            Reply::Silent => {}
            Reply::Late(bytes) => state.inbox.push_back(Inbound::Late(bytes.to_vec())),
            Reply::Reset => state.inbox.push_back(Inbound::Reset),
        }

        Ok(())
    }

    async fn receive(&mut self, max_bytes: usize, deadline: Duration) -> Result<BytesMut> {
        if !self.connected {
            return Err(Error::NotConnected);
        }

        let next = self.wire.state.lock().inbox.pop_front();

        match next {
            Some(Inbound::Data(mut bytes)) => {
                if bytes.len() > max_bytes {
                    let rest = bytes.split_off(max_bytes);
                    self.wire.state.lock().inbox.push_front(Inbound::Data(rest));
                }
                Ok(BytesMut::from(&bytes[..]))
            }
            Some(Inbound::Late(bytes)) => {
                tokio::time::sleep(deadline).await;
                self.wire.state.lock().inbox.push_front(Inbound::Data(bytes));
                Err(Error::ReadTimeout)
            }
            Some(Inbound::Reset) => Err(Error::Io(io::Error::from(io::ErrorKind::ConnectionReset))),
            None => {
                tokio::time::sleep(deadline).await;
                Err(Error::ReadTimeout)
            }
        }
    }

    async fn clear_input(&mut self) -> Result<usize> {
        let mut state = self.wire.state.lock();
        let dropped: usize = state
            .inbox
            .drain(..)
            .map(|inbound| match inbound {
                Inbound::Data(bytes) | Inbound::Late(bytes) => bytes.len(),
                Inbound::Reset => 0,
            })
            .sum();
        state.cleared += dropped;
        Ok(dropped)
    }

    fn remote_addr(&self) -> String {
        "scripted:3629".to_string()
    }
}
