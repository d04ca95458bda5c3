//! Session ownership: lazily-created quote and trade handles to the daemon.
//!
//! The provider owns at most one handle of each kind, created on first use
//! and shared immutably (`Rc`) with the facades that borrow them. `close()`
//! releases both and is idempotent; `Drop` runs it on every exit path.

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, info, warn};
use serde_json::{Value, json};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::protocol::Reply;
use crate::transport::{Connector, TcpConnector, Transport};
use crate::types::{Market, TradeEnv};

/// Connection used for market-data operations only.
pub struct QuoteSession {
    transport: RefCell<Box<dyn Transport>>,
}

impl QuoteSession {
    fn new(transport: Box<dyn Transport>) -> Self {
        Self {
            transport: RefCell::new(transport),
        }
    }

    /// One blocking round trip on the quote channel.
    pub fn request(&self, method: &str, params: Value) -> Result<Reply> {
        self.transport.borrow_mut().call(method, params)
    }
}

impl std::fmt::Debug for QuoteSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuoteSession").finish_non_exhaustive()
    }
}

/// Connection scoped to one market and one trading environment, used for
/// order, position, and account operations.
pub struct TradeSession {
    transport: RefCell<Box<dyn Transport>>,
    market: Market,
    env: TradeEnv,
}

impl TradeSession {
    fn new(transport: Box<dyn Transport>, market: Market, env: TradeEnv) -> Self {
        Self {
            transport: RefCell::new(transport),
            market,
            env,
        }
    }

    pub fn market(&self) -> Market {
        self.market
    }

    pub fn env(&self) -> TradeEnv {
        self.env
    }

    /// One blocking round trip on the trade channel.
    pub fn request(&self, method: &str, params: Value) -> Result<Reply> {
        self.transport.borrow_mut().call(method, params)
    }
}

impl std::fmt::Debug for TradeSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TradeSession")
            .field("market", &self.market)
            .field("env", &self.env)
            .finish_non_exhaustive()
    }
}

/// Owns the daemon connections. Facades borrow sessions from here; nothing
/// else creates or stores them.
///
/// Single-threaded by design: the handles are `Rc`-shared and internally use
/// `RefCell`, so a provider cannot cross threads. Callers wanting parallelism
/// use one provider per thread.
pub struct SessionProvider {
    host: String,
    port: u16,
    env: TradeEnv,
    unlock_code: Option<String>,
    connector: Box<dyn Connector>,
    quote: RefCell<Option<Rc<QuoteSession>>>,
    trade: RefCell<Option<Rc<TradeSession>>>,
}

impl SessionProvider {
    pub fn new(host: &str, port: u16, env: TradeEnv) -> Self {
        Self {
            host: host.to_string(),
            port,
            env,
            unlock_code: None,
            connector: Box::new(TcpConnector),
            quote: RefCell::new(None),
            trade: RefCell::new(None),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let mut provider = Self::new(
            &config.connection.host,
            config.connection.port,
            config.trading.environment,
        );
        provider.unlock_code = config.trading.unlock_code.clone();
        provider
    }

    /// Set the unlock code used when opening a REAL-environment trade session.
    pub fn with_unlock_code(mut self, code: &str) -> Self {
        self.unlock_code = Some(code.to_string());
        self
    }

    /// Replace the dialer. Tests use this to run against a mock daemon.
    pub fn with_connector(mut self, connector: Box<dyn Connector>) -> Self {
        self.connector = connector;
        self
    }

    pub fn environment(&self) -> TradeEnv {
        self.env
    }

    /// The existing quote handle, or dial a new one.
    pub fn quote_session(&self) -> Result<Rc<QuoteSession>> {
        let mut slot = self.quote.borrow_mut();
        if let Some(session) = &*slot {
            return Ok(Rc::clone(session));
        }

        let transport = self.connector.dial(&self.host, self.port)?;
        let session = Rc::new(QuoteSession::new(transport));
        *slot = Some(Rc::clone(&session));
        debug!("quote session opened");
        Ok(session)
    }

    /// The existing trade handle, or dial one scoped to `market` and the
    /// configured environment.
    ///
    /// The first successful call fixes the market; later calls return the
    /// same handle regardless of the market they ask for. In the REAL
    /// environment with an unlock code configured, the unlock call must
    /// succeed before the handle is stored; a rejected unlock leaves the
    /// provider without a trade session.
    pub fn trade_session(&self, market: Market) -> Result<Rc<TradeSession>> {
        let mut slot = self.trade.borrow_mut();
        if let Some(session) = &*slot {
            if session.market() != market {
                warn!(
                    "trade session already open for {}; ignoring request for {}",
                    session.market(),
                    market
                );
            }
            return Ok(Rc::clone(session));
        }

        let transport = self.connector.dial(&self.host, self.port)?;
        let session = TradeSession::new(transport, market, self.env);

        if self.env == TradeEnv::Real {
            if let Some(code) = &self.unlock_code {
                let reply = session.request("unlock_trade", json!({ "unlock_code": code }))?;
                if !reply.is_success() {
                    return Err(Error::Authorization(reply.message()));
                }
                info!("trade session unlocked for live trading");
            }
        }

        let session = Rc::new(session);
        *slot = Some(Rc::clone(&session));
        debug!("trade session opened ({} {})", session.market(), self.env);
        Ok(session)
    }

    /// Release both handles. Calling twice is a no-op.
    pub fn close(&self) {
        if self.quote.borrow_mut().take().is_some() {
            debug!("quote session closed");
        }
        if self.trade.borrow_mut().take().is_some() {
            debug!("trade session closed");
        }
    }

    pub fn has_quote_session(&self) -> bool {
        self.quote.borrow().is_some()
    }

    pub fn has_trade_session(&self) -> bool {
        self.trade.borrow().is_some()
    }
}

impl Drop for SessionProvider {
    fn drop(&mut self) {
        self.close();
    }
}

/// Convenience check used by the CLI `status` command: dials the quote
/// channel and reports whether the daemon answered.
pub fn check_connection(provider: &SessionProvider) -> Result<()> {
    let session = provider.quote_session()?;
    let reply = session.request("query_subscription", json!({}))?;
    reply.into_rows().map(|_| ()).map_err(Error::Connection)
}
