//! Mock daemon for testing: a scripted `Transport`/`Connector` pair with a
//! call log, so facade and session tests run without a live gateway.
//!
//! ```ignore
//! use opend_client::mock::MockDaemon;
//! use opend_client::protocol::Reply;
//! use serde_json::json;
//!
//! let daemon = MockDaemon::new()
//!     .stub("get_quote", Reply::success(json!([{ "code": "HK.00700" }])));
//! let provider = SessionProvider::new("127.0.0.1", 11111, TradeEnv::Simulate)
//!     .with_connector(daemon.connector());
//! ```

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use serde_json::Value;

use crate::error::{Error, Result};
use crate::protocol::Reply;
use crate::transport::{Connector, Transport};

/// A recorded request for assertion in tests.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: String,
    pub params: Value,
}

#[derive(Default)]
struct MockState {
    stubs: HashMap<String, Reply>,
    queued: HashMap<String, VecDeque<Reply>>,
    calls: Vec<RecordedCall>,
    dials: usize,
    dial_error: Option<String>,
}

/// Scripted stand-in for the gateway daemon.
///
/// Unscripted methods answer code 0 with an empty table. One-shot `push`
/// replies are consumed in order before any persistent `stub` reply.
#[derive(Default)]
pub struct MockDaemon {
    state: Rc<RefCell<MockState>>,
}

impl MockDaemon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Persistent canned reply for a method.
    pub fn stub(self, method: &str, reply: Reply) -> Self {
        self.state
            .borrow_mut()
            .stubs
            .insert(method.to_string(), reply);
        self
    }

    /// One-shot reply for a method, consumed in push order.
    pub fn push(self, method: &str, reply: Reply) -> Self {
        self.state
            .borrow_mut()
            .queued
            .entry(method.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    /// Make every dial fail with a connection error.
    pub fn fail_dials(self, message: &str) -> Self {
        self.state.borrow_mut().dial_error = Some(message.to_string());
        self
    }

    /// A connector handing out transports that share this daemon's script.
    pub fn connector(&self) -> Box<dyn Connector> {
        Box::new(MockConnector {
            state: Rc::clone(&self.state),
        })
    }

    /// A transport sharing this daemon's script.
    pub fn transport(&self) -> Box<dyn Transport> {
        Box::new(MockTransport {
            state: Rc::clone(&self.state),
        })
    }

    /// Every request received, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.borrow().calls.clone()
    }

    /// Params of every request for one method, in order.
    pub fn calls_for(&self, method: &str) -> Vec<Value> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|call| call.method == method)
            .map(|call| call.params.clone())
            .collect()
    }

    /// How many transports have been dialed.
    pub fn dial_count(&self) -> usize {
        self.state.borrow().dials
    }
}

struct MockTransport {
    state: Rc<RefCell<MockState>>,
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport").finish_non_exhaustive()
    }
}

impl Transport for MockTransport {
    fn call(&mut self, method: &str, params: Value) -> Result<Reply> {
        let mut state = self.state.borrow_mut();
        state.calls.push(RecordedCall {
            method: method.to_string(),
            params,
        });

        if let Some(queue) = state.queued.get_mut(method) {
            if let Some(reply) = queue.pop_front() {
                return Ok(reply);
            }
        }
        Ok(state
            .stubs
            .get(method)
            .cloned()
            .unwrap_or_else(|| Reply::success(Value::Array(Vec::new()))))
    }
}

struct MockConnector {
    state: Rc<RefCell<MockState>>,
}

impl Connector for MockConnector {
    fn dial(&self, _host: &str, _port: u16) -> Result<Box<dyn Transport>> {
        let mut state = self.state.borrow_mut();
        if let Some(message) = &state.dial_error {
            return Err(Error::Connection(message.clone()));
        }
        state.dials += 1;
        Ok(Box::new(MockTransport {
            state: Rc::clone(&self.state),
        }))
    }
}
