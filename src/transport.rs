//! Blocking transport to the gateway daemon.
//!
//! One JSON object per line in each direction. Every call blocks the calling
//! thread until the daemon replies; no timeout is layered on top of the
//! socket defaults.

use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;

use log::{debug, info};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::protocol::{Reply, Request};

/// A single blocking request/reply round trip to the daemon.
pub trait Transport: std::fmt::Debug {
    fn call(&mut self, method: &str, params: Value) -> Result<Reply>;
}

/// Dials transports for the session provider. Tests swap in a mock connector
/// to run without a live daemon.
pub trait Connector {
    fn dial(&self, host: &str, port: u16) -> Result<Box<dyn Transport>>;
}

/// TCP transport speaking the JSON-lines envelope.
pub struct TcpTransport {
    writer: TcpStream,
    reader: BufReader<TcpStream>,
    next_id: u64,
}

impl TcpTransport {
    /// Connect to the gateway daemon.
    pub fn dial(host: &str, port: u16) -> Result<Self> {
        let address = format!("{host}:{port}");
        info!("Connecting to gateway at {address}...");

        let stream = TcpStream::connect(&address)
            .map_err(|e| Error::Connection(format!("failed to connect to {address}: {e}")))?;
        let _ = stream.set_nodelay(true);

        let reader = BufReader::new(
            stream
                .try_clone()
                .map_err(|e| Error::Connection(format!("failed to clone stream: {e}")))?,
        );

        Ok(Self {
            writer: stream,
            reader,
            next_id: 1,
        })
    }
}

impl std::fmt::Debug for TcpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TcpTransport").finish_non_exhaustive()
    }
}

impl Transport for TcpTransport {
    fn call(&mut self, method: &str, params: Value) -> Result<Reply> {
        let id = self.next_id;
        self.next_id += 1;

        let request = Request {
            id,
            method,
            params: &params,
        };
        let mut line = serde_json::to_string(&request)
            .map_err(|e| Error::Connection(format!("failed to encode {method} request: {e}")))?;
        line.push('\n');

        debug!("-> {method} (id={id})");
        self.writer
            .write_all(line.as_bytes())
            .map_err(|e| Error::Connection(format!("failed to send {method} request: {e}")))?;

        let mut buf = String::new();
        let read = self
            .reader
            .read_line(&mut buf)
            .map_err(|e| Error::Connection(format!("failed to read {method} reply: {e}")))?;
        if read == 0 {
            return Err(Error::Connection(format!(
                "gateway closed the connection during {method}"
            )));
        }

        let reply: Reply = serde_json::from_str(buf.trim_end())
            .map_err(|e| Error::Connection(format!("failed to parse {method} reply: {e}")))?;
        // id 0 means the daemon did not echo one back
        if reply.id != 0 && reply.id != id {
            return Err(Error::Connection(format!(
                "mismatched reply id for {method}: sent {id}, got {}",
                reply.id
            )));
        }

        debug!("<- {method} code={}", reply.code);
        Ok(reply)
    }
}

/// Default connector: dials a `TcpTransport`.
pub struct TcpConnector;

impl Connector for TcpConnector {
    fn dial(&self, host: &str, port: u16) -> Result<Box<dyn Transport>> {
        TcpTransport::dial(host, port).map(|t| Box::new(t) as Box<dyn Transport>)
    }
}
