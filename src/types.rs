//! Domain vocabulary shared by the market-data and trading facades.
//!
//! Wire strings (`as_str`) are what the gateway daemon expects in request
//! parameters; symbols themselves (`"HK.00700"`, `"US.AAPL"`) are passed
//! through verbatim and never parsed locally.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Exchange market a trade session is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Market {
    Hk,
    Us,
    Sh,
    Sz,
}

impl Market {
    pub fn as_str(self) -> &'static str {
        match self {
            Market::Hk => "HK",
            Market::Us => "US",
            Market::Sh => "SH",
            Market::Sz => "SZ",
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Market {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "HK" => Ok(Market::Hk),
            "US" => Ok(Market::Us),
            "SH" => Ok(Market::Sh),
            "SZ" => Ok(Market::Sz),
            other => Err(format!("unknown market: {other}")),
        }
    }
}

/// Paper-trading vs. live-money environment, fixed per trade session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeEnv {
    Simulate,
    Real,
}

impl TradeEnv {
    pub fn as_str(self) -> &'static str {
        match self {
            TradeEnv::Simulate => "SIMULATE",
            TradeEnv::Real => "REAL",
        }
    }
}

impl fmt::Display for TradeEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TradeEnv {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SIMULATE" => Ok(TradeEnv::Simulate),
            "REAL" => Ok(TradeEnv::Real),
            other => Err(format!("unknown trading environment: {other}")),
        }
    }
}

/// Buy or sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

impl FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BUY" => Ok(Side::Buy),
            "SELL" => Ok(Side::Sell),
            other => Err(format!("unknown side: {other}")),
        }
    }
}

/// Limit or market order. A market order carries price 0 by gateway
/// convention; the client never substitutes a price of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderKind {
    #[default]
    Limit,
    Market,
}

impl OrderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderKind::Limit => "LIMIT",
            OrderKind::Market => "MARKET",
        }
    }
}

impl FromStr for OrderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "LIMIT" => Ok(OrderKind::Limit),
            "MARKET" => Ok(OrderKind::Market),
            other => Err(format!("unknown order kind: {other}")),
        }
    }
}

/// Candle aggregation period.
///
/// The string conversion is deliberately lenient: unrecognized input resolves
/// to `Day` rather than failing, so a sloppy period in a config file or CLI
/// flag degrades to daily candles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CandlePeriod {
    Min1,
    Min5,
    Min15,
    Min30,
    Min60,
    #[default]
    Day,
    Week,
    Month,
    Year,
}

impl CandlePeriod {
    pub fn as_str(self) -> &'static str {
        match self {
            CandlePeriod::Min1 => "1m",
            CandlePeriod::Min5 => "5m",
            CandlePeriod::Min15 => "15m",
            CandlePeriod::Min30 => "30m",
            CandlePeriod::Min60 => "60m",
            CandlePeriod::Day => "day",
            CandlePeriod::Week => "week",
            CandlePeriod::Month => "month",
            CandlePeriod::Year => "year",
        }
    }
}

impl From<&str> for CandlePeriod {
    fn from(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "1m" | "min_1" => CandlePeriod::Min1,
            "5m" | "min_5" => CandlePeriod::Min5,
            "15m" | "min_15" => CandlePeriod::Min15,
            "30m" | "min_30" => CandlePeriod::Min30,
            "60m" | "min_60" => CandlePeriod::Min60,
            "week" => CandlePeriod::Week,
            "month" => CandlePeriod::Month,
            "year" => CandlePeriod::Year,
            _ => CandlePeriod::Day,
        }
    }
}

impl fmt::Display for CandlePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Market-data subscription channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubKind {
    Quote,
    OrderBook,
    Ticker,
}

impl SubKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SubKind::Quote => "QUOTE",
            SubKind::OrderBook => "ORDER_BOOK",
            SubKind::Ticker => "TICKER",
        }
    }
}

/// Instrument class for symbol metadata queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InstrumentType {
    #[default]
    Stock,
    Index,
    Etf,
    Warrant,
    Bond,
}

impl InstrumentType {
    pub fn as_str(self) -> &'static str {
        match self {
            InstrumentType::Stock => "STOCK",
            InstrumentType::Index => "IDX",
            InstrumentType::Etf => "ETF",
            InstrumentType::Warrant => "WARRANT",
            InstrumentType::Bond => "BOND",
        }
    }
}

impl FromStr for InstrumentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "STOCK" => Ok(InstrumentType::Stock),
            "IDX" | "INDEX" => Ok(InstrumentType::Index),
            "ETF" => Ok(InstrumentType::Etf),
            "WARRANT" => Ok(InstrumentType::Warrant),
            "BOND" => Ok(InstrumentType::Bond),
            other => Err(format!("unknown instrument type: {other}")),
        }
    }
}

/// Order lifecycle state as reported by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    WaitingSubmit,
    Submitted,
    FilledPart,
    FilledAll,
    Cancelled,
    Failed,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::WaitingSubmit => "WAITING_SUBMIT",
            OrderStatus::Submitted => "SUBMITTED",
            OrderStatus::FilledPart => "FILLED_PART",
            OrderStatus::FilledAll => "FILLED_ALL",
            OrderStatus::Cancelled => "CANCELLED",
            OrderStatus::Failed => "FAILED",
        }
    }
}

/// One or more gateway symbols.
///
/// Facade methods take `impl Into<SymbolList>`, so a bare symbol and a
/// one-element list are interchangeable at every call site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SymbolList(Vec<String>);

impl SymbolList {
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for SymbolList {
    fn from(symbol: &str) -> Self {
        SymbolList(vec![symbol.to_string()])
    }
}

impl From<String> for SymbolList {
    fn from(symbol: String) -> Self {
        SymbolList(vec![symbol])
    }
}

impl From<Vec<String>> for SymbolList {
    fn from(symbols: Vec<String>) -> Self {
        SymbolList(symbols)
    }
}

impl From<&[String]> for SymbolList {
    fn from(symbols: &[String]) -> Self {
        SymbolList(symbols.to_vec())
    }
}

impl From<Vec<&str>> for SymbolList {
    fn from(symbols: Vec<&str>) -> Self {
        SymbolList(symbols.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for SymbolList {
    fn from(symbols: &[&str]) -> Self {
        SymbolList(symbols.iter().map(|s| s.to_string()).collect())
    }
}
