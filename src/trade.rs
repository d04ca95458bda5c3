//! Trading facade: orders, positions, and account queries over the trade
//! session.
//!
//! Scoped at construction to one market; the trading environment comes from
//! the session provider. When an account id is set it rides along on every
//! request.

use std::rc::Rc;

use log::{info, warn};
use serde_json::{Value, json};

use crate::error::{Error, Result};
use crate::protocol::Record;
use crate::session::{SessionProvider, TradeSession};
use crate::types::{Market, OrderKind, OrderStatus, Side, TradeEnv};

/// Outcome of a successful order placement.
#[derive(Debug)]
pub struct OrderResult {
    /// The gateway-assigned id from the first result row, absent when the
    /// daemon returned no rows.
    pub order_id: Option<String>,
    pub status: String,
    pub records: Vec<Record>,
}

/// Outcome of a successful cancellation.
#[derive(Debug)]
pub struct CancelResult {
    pub order_id: String,
    pub status: String,
    pub records: Vec<Record>,
}

/// Per-order outcome of `cancel_all_pending`. A failed cancellation is
/// recorded here instead of aborting the batch.
#[derive(Debug)]
pub enum CancelOutcome {
    Cancelled(CancelResult),
    Failed {
        order_id: Option<String>,
        error: Error,
    },
}

impl CancelOutcome {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CancelOutcome::Cancelled(_))
    }

    pub fn order_id(&self) -> Option<&str> {
        match self {
            CancelOutcome::Cancelled(result) => Some(&result.order_id),
            CancelOutcome::Failed { order_id, .. } => order_id.as_deref(),
        }
    }
}

/// Thin wrappers over trade-channel operations. Borrows the session provider;
/// the trade session is dialed (and unlocked, for REAL) on the first call.
pub struct Trading<'a> {
    provider: &'a SessionProvider,
    market: Market,
    account_id: Option<String>,
}

impl<'a> Trading<'a> {
    pub fn new(provider: &'a SessionProvider, market: Market) -> Self {
        Self {
            provider,
            market,
            account_id: None,
        }
    }

    /// Pin all operations to a specific account id.
    pub fn with_account(mut self, account_id: &str) -> Self {
        self.account_id = Some(account_id.to_string());
        self
    }

    pub fn market(&self) -> Market {
        self.market
    }

    fn session(&self) -> Result<Rc<TradeSession>> {
        self.provider.trade_session(self.market)
    }

    fn attach_account(&self, params: &mut Value) {
        if let Some(id) = &self.account_id {
            params["acc_id"] = json!(id);
        }
    }

    /// Place a buy or sell order. A market order carries price 0 by gateway
    /// convention; the price is forwarded verbatim either way, and only the
    /// daemon decides whether the order is acceptable.
    pub fn place_order(
        &self,
        symbol: &str,
        price: f64,
        quantity: u64,
        side: Side,
        kind: OrderKind,
    ) -> Result<OrderResult> {
        let session = self.session()?;
        let mut params = json!({
            "code": symbol,
            "price": price,
            "qty": quantity,
            "side": side.as_str(),
            "kind": kind.as_str(),
            "trd_env": session.env().as_str(),
        });
        self.attach_account(&mut params);

        info!(
            "placing {} {} {} @ {} ({})",
            side.as_str(),
            quantity,
            symbol,
            price,
            session.env()
        );
        let reply = session.request("place_order", params)?;
        let records = reply.into_rows().map_err(Error::Order)?;
        let order_id = records.first().and_then(|row| field_str(row, "order_id"));

        Ok(OrderResult {
            order_id,
            status: "placed".into(),
            records,
        })
    }

    /// Current positions, optionally filtered to one symbol.
    pub fn list_positions(&self, symbol: Option<&str>) -> Result<Vec<Record>> {
        let session = self.session()?;
        let mut params = json!({ "trd_env": session.env().as_str() });
        if let Some(code) = symbol {
            params["code"] = json!(code);
        }
        self.attach_account(&mut params);

        let reply = session.request("query_positions", params)?;
        reply.into_rows().map_err(Error::Order)
    }

    /// The position for one symbol: the first matching entry of
    /// `list_positions`, or `None` when the symbol is not held.
    pub fn get_position(&self, symbol: &str) -> Result<Option<Record>> {
        Ok(self.list_positions(Some(symbol))?.into_iter().next())
    }

    /// Today's orders. An empty `status_filter` slice means no filter.
    pub fn list_orders(&self, status_filter: &[OrderStatus]) -> Result<Vec<Record>> {
        let session = self.session()?;
        let mut params = json!({ "trd_env": session.env().as_str() });
        if !status_filter.is_empty() {
            let names: Vec<&str> = status_filter.iter().map(|s| s.as_str()).collect();
            params["status_filter"] = json!(names);
        }
        self.attach_account(&mut params);

        let reply = session.request("query_orders", params)?;
        reply.into_rows().map_err(Error::Order)
    }

    /// Fully and partially filled orders.
    pub fn get_filled_orders(&self) -> Result<Vec<Record>> {
        self.list_orders(&[OrderStatus::FilledAll, OrderStatus::FilledPart])
    }

    /// Orders still waiting on the exchange.
    pub fn get_pending_orders(&self) -> Result<Vec<Record>> {
        self.list_orders(&[OrderStatus::Submitted, OrderStatus::WaitingSubmit])
    }

    /// Cancel one pending order via the modify-order endpoint.
    pub fn cancel_order(&self, order_id: &str) -> Result<CancelResult> {
        let session = self.session()?;
        let mut params = json!({
            "op": "CANCEL",
            "order_id": order_id,
            "trd_env": session.env().as_str(),
        });
        self.attach_account(&mut params);

        info!("cancelling order {order_id}");
        let reply = session.request("modify_order", params)?;
        let records = reply.into_rows().map_err(Error::Order)?;

        Ok(CancelResult {
            order_id: order_id.to_string(),
            status: "cancelled".into(),
            records,
        })
    }

    /// Cancel every pending order, one outcome per order in pending-list
    /// order. A failing cancellation is recorded as `CancelOutcome::Failed`
    /// and never blocks the rest of the batch.
    pub fn cancel_all_pending(&self) -> Result<Vec<CancelOutcome>> {
        let pending = self.get_pending_orders()?;
        let mut outcomes = Vec::with_capacity(pending.len());

        for row in &pending {
            match field_str(row, "order_id") {
                Some(id) => match self.cancel_order(&id) {
                    Ok(result) => outcomes.push(CancelOutcome::Cancelled(result)),
                    Err(error) => {
                        warn!("failed to cancel order {id}: {error}");
                        outcomes.push(CancelOutcome::Failed {
                            order_id: Some(id),
                            error,
                        });
                    }
                },
                None => outcomes.push(CancelOutcome::Failed {
                    order_id: None,
                    error: Error::Order("pending order row has no order_id".into()),
                }),
            }
        }

        Ok(outcomes)
    }

    /// Account record for the given environment: lists accounts from the
    /// daemon, filters by the `trd_env` tag, returns the first match.
    pub fn get_account_info(&self, account_type: TradeEnv) -> Result<Option<Record>> {
        let session = self.session()?;
        let reply = session.request("query_accounts", json!({}))?;
        let rows = reply.into_rows().map_err(Error::Account)?;

        Ok(rows
            .into_iter()
            .find(|row| field_str(row, "trd_env").as_deref() == Some(account_type.as_str())))
    }

    /// Maximum tradable quantities for a symbol at a price. An empty payload
    /// yields an empty record, not an error.
    pub fn get_max_tradable_quantity(&self, symbol: &str, price: f64) -> Result<Record> {
        let session = self.session()?;
        let mut params = json!({
            "code": symbol,
            "price": price,
            "trd_env": session.env().as_str(),
        });
        self.attach_account(&mut params);

        let reply = session.request("query_max_quantity", params)?;
        let rows = reply.into_rows().map_err(Error::Order)?;
        Ok(rows.into_iter().next().unwrap_or_default())
    }
}

/// Read a row field as a string, accepting the numeric ids some gateway
/// builds return.
fn field_str(row: &Record, key: &str) -> Option<String> {
    match row.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
