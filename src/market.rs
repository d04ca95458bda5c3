//! Market-data facade: quotes, candles, snapshots, and subscriptions over
//! the quote session.

use chrono::NaiveDate;
use log::debug;
use serde_json::{Value, json};

use crate::error::{Error, Result};
use crate::protocol::Record;
use crate::session::SessionProvider;
use crate::types::{CandlePeriod, InstrumentType, Market, SubKind, SymbolList};

/// Thin wrappers over quote-channel operations. Borrows the session provider;
/// the quote session is dialed on the first call.
pub struct MarketData<'a> {
    provider: &'a SessionProvider,
}

impl<'a> MarketData<'a> {
    pub fn new(provider: &'a SessionProvider) -> Self {
        Self { provider }
    }

    /// Forward one request on the quote channel and normalize the payload.
    fn call(&self, method: &str, params: Value) -> Result<Vec<Record>> {
        let session = self.provider.quote_session()?;
        let reply = session.request(method, params)?;
        let rows = reply.into_rows().map_err(Error::MarketData)?;
        debug!("{method}: {} rows", rows.len());
        Ok(rows)
    }

    fn kind_names(kinds: &[SubKind]) -> Vec<&'static str> {
        if kinds.is_empty() {
            vec![SubKind::Quote.as_str()]
        } else {
            kinds.iter().map(|k| k.as_str()).collect()
        }
    }

    /// Subscribe to push channels for the given symbols. An empty `kinds`
    /// slice selects `[SubKind::Quote]`.
    pub fn subscribe(&self, symbols: impl Into<SymbolList>, kinds: &[SubKind]) -> Result<()> {
        let symbols = symbols.into();
        self.call(
            "subscribe",
            json!({
                "code_list": symbols.as_slice(),
                "subtype_list": Self::kind_names(kinds),
            }),
        )?;
        Ok(())
    }

    /// Drop subscriptions for the given symbols. An empty `kinds` slice
    /// selects `[SubKind::Quote]`.
    pub fn unsubscribe(&self, symbols: impl Into<SymbolList>, kinds: &[SubKind]) -> Result<()> {
        let symbols = symbols.into();
        self.call(
            "unsubscribe",
            json!({
                "code_list": symbols.as_slice(),
                "subtype_list": Self::kind_names(kinds),
            }),
        )?;
        Ok(())
    }

    /// Real-time quotes for one or more symbols.
    pub fn get_quote(&self, symbols: impl Into<SymbolList>) -> Result<Vec<Record>> {
        let symbols = symbols.into();
        self.call("get_quote", json!({ "code_list": symbols.as_slice() }))
    }

    /// Historical candles for one symbol, newest last. `start`/`end` bound
    /// the range when given; the daemon returns at most `count` rows.
    pub fn get_candles(
        &self,
        symbol: &str,
        period: CandlePeriod,
        count: u32,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Record>> {
        let mut params = json!({
            "code": symbol,
            "period": period.as_str(),
            "max_count": count,
        });
        if let Some(start) = start {
            params["start"] = json!(start.format("%Y-%m-%d").to_string());
        }
        if let Some(end) = end {
            params["end"] = json!(end.format("%Y-%m-%d").to_string());
        }
        self.call("get_history_candles", params)
    }

    /// Most recent candles for subscribed symbols.
    pub fn get_live_candles(
        &self,
        symbols: impl Into<SymbolList>,
        period: CandlePeriod,
        count: u32,
    ) -> Result<Vec<Record>> {
        let symbols = symbols.into();
        self.call(
            "get_cur_candles",
            json!({
                "code_list": symbols.as_slice(),
                "period": period.as_str(),
                "num": count,
            }),
        )
    }

    /// Current subscription table.
    pub fn list_subscriptions(&self) -> Result<Vec<Record>> {
        self.call("query_subscription", json!({}))
    }

    /// Detailed market snapshot for one or more symbols.
    pub fn get_snapshot(&self, symbols: impl Into<SymbolList>) -> Result<Vec<Record>> {
        let symbols = symbols.into();
        self.call("get_market_snapshot", json!({ "code_list": symbols.as_slice() }))
    }

    /// Basic instrument metadata for a whole market.
    pub fn get_symbol_info(
        &self,
        market: Market,
        instrument_type: InstrumentType,
    ) -> Result<Vec<Record>> {
        self.call(
            "get_symbol_info",
            json!({
                "market": market.as_str(),
                "instrument_type": instrument_type.as_str(),
            }),
        )
    }
}
