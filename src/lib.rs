//! Blocking client library for an OpenD-style trading gateway daemon.
//!
//! The gateway (default `127.0.0.1:11111`) is an externally-run process that
//! talks to the exchange; this crate is a client to it, not a server. Every
//! operation is one synchronous round trip: build a parameter object, forward
//! it on the right session, check the status code, reshape the tabular
//! payload into rows.
//!
//! Three pieces:
//!
//! - [`SessionProvider`]: owns at most one quote handle and one trade
//!   handle, created lazily and torn down together.
//! - [`MarketData`]: quotes, candles, snapshots, subscriptions.
//! - [`Trading`]: orders, positions, accounts, scoped to one market and one
//!   trading environment (SIMULATE or REAL).
//!
//! ```no_run
//! use opend_client::{MarketData, SessionProvider, TradeEnv};
//!
//! let provider = SessionProvider::new("127.0.0.1", 11111, TradeEnv::Simulate);
//! let market_data = MarketData::new(&provider);
//! let quotes = market_data.get_quote("HK.00700")?;
//! println!("{} quote rows", quotes.len());
//! # Ok::<(), opend_client::Error>(())
//! ```
//!
//! Sessions are single-threaded by design (see [`SessionProvider`]); use one
//! provider per thread.

pub mod config;
pub mod error;
pub mod market;
pub mod mock;
pub mod protocol;
pub mod session;
pub mod trade;
pub mod transport;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use market::MarketData;
pub use protocol::{Record, Reply};
pub use session::{QuoteSession, SessionProvider, TradeSession};
pub use trade::{CancelOutcome, CancelResult, OrderResult, Trading};
pub use types::{
    CandlePeriod, InstrumentType, Market, OrderKind, OrderStatus, Side, SubKind, SymbolList,
    TradeEnv,
};
