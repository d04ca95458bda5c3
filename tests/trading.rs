//! Trading facade tests against the mock daemon.

use opend_client::mock::MockDaemon;
use opend_client::protocol::Reply;
use opend_client::{
    CancelOutcome, Error, Market, OrderKind, SessionProvider, Side, TradeEnv, Trading,
};
use serde_json::json;

fn provider_with(daemon: &MockDaemon, env: TradeEnv) -> SessionProvider {
    SessionProvider::new("127.0.0.1", 11111, env).with_connector(daemon.connector())
}

// ============================================================================
// place_order
// ============================================================================

#[test]
fn place_order_forwards_the_full_request_record() {
    let daemon = MockDaemon::new().stub(
        "place_order",
        Reply::success(json!([{ "order_id": "8861", "code": "HK.00700", "qty": 100 }])),
    );
    let provider = provider_with(&daemon, TradeEnv::Simulate);
    let trading = Trading::new(&provider, Market::Hk);

    let result = trading
        .place_order("HK.00700", 610.0, 100, Side::Buy, OrderKind::Limit)
        .unwrap();

    assert_eq!(result.order_id.as_deref(), Some("8861"));
    assert_eq!(result.status, "placed");
    assert_eq!(result.records.len(), 1);

    let calls = daemon.calls_for("place_order");
    assert_eq!(
        calls[0],
        json!({
            "code": "HK.00700",
            "price": 610.0,
            "qty": 100,
            "side": "BUY",
            "kind": "LIMIT",
            "trd_env": "SIMULATE",
        })
    );
}

#[test]
fn market_order_with_price_zero_passes_zero_verbatim() {
    let daemon = MockDaemon::new().stub(
        "place_order",
        Reply::success(json!([{ "order_id": "8862" }])),
    );
    let provider = provider_with(&daemon, TradeEnv::Simulate);
    let trading = Trading::new(&provider, Market::Us);

    let result = trading
        .place_order("US.AAPL", 0.0, 10, Side::Sell, OrderKind::Market)
        .unwrap();
    assert_eq!(result.order_id.as_deref(), Some("8862"));

    let calls = daemon.calls_for("place_order");
    assert_eq!(calls[0]["price"], 0.0);
    assert_eq!(calls[0]["kind"], "MARKET");
}

#[test]
fn place_order_refusal_is_an_order_error() {
    let daemon =
        MockDaemon::new().stub("place_order", Reply::failure(1021, "insufficient buying power"));
    let provider = provider_with(&daemon, TradeEnv::Simulate);
    let trading = Trading::new(&provider, Market::Hk);

    match trading
        .place_order("HK.00700", 610.0, 1_000_000, Side::Buy, OrderKind::Limit)
        .unwrap_err()
    {
        Error::Order(msg) => assert_eq!(msg, "insufficient buying power"),
        other => panic!("expected Order, got {other:?}"),
    }
}

#[test]
fn order_id_is_absent_when_the_daemon_returns_no_rows() {
    let daemon = MockDaemon::new();
    let provider = provider_with(&daemon, TradeEnv::Simulate);
    let trading = Trading::new(&provider, Market::Hk);

    let result = trading
        .place_order("HK.00700", 610.0, 100, Side::Buy, OrderKind::Limit)
        .unwrap();
    assert!(result.order_id.is_none());
    assert!(result.records.is_empty());
}

#[test]
fn numeric_order_id_is_coerced_to_string() {
    let daemon = MockDaemon::new().stub(
        "place_order",
        Reply::success(json!([{ "order_id": 990011 }])),
    );
    let provider = provider_with(&daemon, TradeEnv::Simulate);
    let trading = Trading::new(&provider, Market::Hk);

    let result = trading
        .place_order("HK.00700", 610.0, 100, Side::Buy, OrderKind::Limit)
        .unwrap();
    assert_eq!(result.order_id.as_deref(), Some("990011"));
}

#[test]
fn account_id_rides_along_when_configured() {
    let daemon = MockDaemon::new();
    let provider = provider_with(&daemon, TradeEnv::Simulate);
    let trading = Trading::new(&provider, Market::Hk).with_account("1001219209771234");

    trading
        .place_order("HK.00700", 610.0, 100, Side::Buy, OrderKind::Limit)
        .unwrap();
    trading.list_positions(None).unwrap();

    assert_eq!(
        daemon.calls_for("place_order")[0]["acc_id"],
        "1001219209771234"
    );
    assert_eq!(
        daemon.calls_for("query_positions")[0]["acc_id"],
        "1001219209771234"
    );
}

#[test]
fn no_account_id_means_no_acc_id_param() {
    let daemon = MockDaemon::new();
    let provider = provider_with(&daemon, TradeEnv::Simulate);
    let trading = Trading::new(&provider, Market::Hk);

    trading
        .place_order("HK.00700", 610.0, 100, Side::Buy, OrderKind::Limit)
        .unwrap();

    assert!(daemon.calls_for("place_order")[0].get("acc_id").is_none());
}

// ============================================================================
// Positions
// ============================================================================

#[test]
fn get_position_is_first_match_of_list_positions() {
    let daemon = MockDaemon::new().stub(
        "query_positions",
        Reply::success(json!([
            { "code": "HK.00700", "qty": 300, "cost_price": 598.2 },
            { "code": "HK.00700", "qty": 100, "cost_price": 601.0 },
        ])),
    );
    let provider = provider_with(&daemon, TradeEnv::Simulate);
    let trading = Trading::new(&provider, Market::Hk);

    let all = trading.list_positions(Some("HK.00700")).unwrap();
    let first = trading.get_position("HK.00700").unwrap().unwrap();

    assert_eq!(first, all[0]);
    assert_eq!(first["qty"], 300);
}

#[test]
fn get_position_is_none_when_nothing_matches() {
    let daemon = MockDaemon::new();
    let provider = provider_with(&daemon, TradeEnv::Simulate);
    let trading = Trading::new(&provider, Market::Hk);

    assert!(trading.get_position("HK.00700").unwrap().is_none());
}

#[test]
fn position_symbol_filter_is_optional() {
    let daemon = MockDaemon::new();
    let provider = provider_with(&daemon, TradeEnv::Simulate);
    let trading = Trading::new(&provider, Market::Hk);

    trading.list_positions(None).unwrap();
    trading.list_positions(Some("HK.00700")).unwrap();

    let calls = daemon.calls_for("query_positions");
    assert!(calls[0].get("code").is_none());
    assert_eq!(calls[1]["code"], "HK.00700");
}

// ============================================================================
// Order queries
// ============================================================================

#[test]
fn pending_and_filled_filters() {
    let daemon = MockDaemon::new();
    let provider = provider_with(&daemon, TradeEnv::Simulate);
    let trading = Trading::new(&provider, Market::Hk);

    trading.get_pending_orders().unwrap();
    trading.get_filled_orders().unwrap();
    trading.list_orders(&[]).unwrap();

    let calls = daemon.calls_for("query_orders");
    assert_eq!(calls[0]["status_filter"], json!(["SUBMITTED", "WAITING_SUBMIT"]));
    assert_eq!(calls[1]["status_filter"], json!(["FILLED_ALL", "FILLED_PART"]));
    assert!(calls[2].get("status_filter").is_none());
}

// ============================================================================
// Cancellation
// ============================================================================

#[test]
fn cancel_order_issues_a_cancel_op_modify() {
    let daemon = MockDaemon::new();
    let provider = provider_with(&daemon, TradeEnv::Simulate);
    let trading = Trading::new(&provider, Market::Hk);

    let result = trading.cancel_order("8861").unwrap();
    assert_eq!(result.order_id, "8861");
    assert_eq!(result.status, "cancelled");

    let calls = daemon.calls_for("modify_order");
    assert_eq!(
        calls[0],
        json!({ "op": "CANCEL", "order_id": "8861", "trd_env": "SIMULATE" })
    );
}

#[test]
fn cancel_order_refusal_is_an_order_error() {
    let daemon = MockDaemon::new().stub("modify_order", Reply::failure(1030, "order already filled"));
    let provider = provider_with(&daemon, TradeEnv::Simulate);
    let trading = Trading::new(&provider, Market::Hk);

    match trading.cancel_order("8861").unwrap_err() {
        Error::Order(msg) => assert_eq!(msg, "order already filled"),
        other => panic!("expected Order, got {other:?}"),
    }
}

#[test]
fn cancel_all_yields_one_outcome_per_pending_order_in_order() {
    let daemon = MockDaemon::new().stub(
        "query_orders",
        Reply::success(json!([
            { "order_id": "1", "status": "SUBMITTED" },
            { "order_id": "2", "status": "WAITING_SUBMIT" },
            { "order_id": "3", "status": "SUBMITTED" },
        ])),
    );
    let provider = provider_with(&daemon, TradeEnv::Simulate);
    let trading = Trading::new(&provider, Market::Hk);

    let outcomes = trading.cancel_all_pending().unwrap();

    assert_eq!(outcomes.len(), 3);
    assert_eq!(
        outcomes.iter().map(|o| o.order_id().unwrap()).collect::<Vec<_>>(),
        ["1", "2", "3"]
    );
    assert!(outcomes.iter().all(CancelOutcome::is_cancelled));
    assert_eq!(daemon.calls_for("modify_order").len(), 3);
}

#[test]
fn one_failing_cancellation_never_blocks_the_rest() {
    let daemon = MockDaemon::new()
        .stub(
            "query_orders",
            Reply::success(json!([
                { "order_id": "1", "status": "SUBMITTED" },
                { "order_id": "2", "status": "SUBMITTED" },
                { "order_id": "3", "status": "SUBMITTED" },
            ])),
        )
        .push("modify_order", Reply::success(json!([])))
        .push("modify_order", Reply::failure(1030, "order already filled"))
        .push("modify_order", Reply::success(json!([])));
    let provider = provider_with(&daemon, TradeEnv::Simulate);
    let trading = Trading::new(&provider, Market::Hk);

    let outcomes = trading.cancel_all_pending().unwrap();

    assert_eq!(outcomes.len(), 3);
    assert!(outcomes[0].is_cancelled());
    assert!(!outcomes[1].is_cancelled());
    assert!(outcomes[2].is_cancelled());

    match &outcomes[1] {
        CancelOutcome::Failed { order_id, error } => {
            assert_eq!(order_id.as_deref(), Some("2"));
            assert!(matches!(error, Error::Order(_)));
        }
        other => panic!("expected Failed, got {other:?}"),
    }
    assert_eq!(daemon.calls_for("modify_order").len(), 3);
}

#[test]
fn cancel_all_with_nothing_pending_is_empty() {
    let daemon = MockDaemon::new();
    let provider = provider_with(&daemon, TradeEnv::Simulate);
    let trading = Trading::new(&provider, Market::Hk);

    assert!(trading.cancel_all_pending().unwrap().is_empty());
    assert!(daemon.calls_for("modify_order").is_empty());
}

#[test]
fn pending_row_without_order_id_becomes_a_failed_outcome() {
    let daemon = MockDaemon::new().stub(
        "query_orders",
        Reply::success(json!([
            { "status": "SUBMITTED" },
            { "order_id": "2", "status": "SUBMITTED" },
        ])),
    );
    let provider = provider_with(&daemon, TradeEnv::Simulate);
    let trading = Trading::new(&provider, Market::Hk);

    let outcomes = trading.cancel_all_pending().unwrap();
    assert_eq!(outcomes.len(), 2);
    assert!(!outcomes[0].is_cancelled());
    assert!(outcomes[0].order_id().is_none());
    assert!(outcomes[1].is_cancelled());
}

// ============================================================================
// Account info
// ============================================================================

#[test]
fn account_info_filters_by_environment_tag() {
    let daemon = MockDaemon::new().stub(
        "query_accounts",
        Reply::success(json!([
            { "acc_id": "111", "trd_env": "REAL" },
            { "acc_id": "222", "trd_env": "SIMULATE" },
            { "acc_id": "333", "trd_env": "SIMULATE" },
        ])),
    );
    let provider = provider_with(&daemon, TradeEnv::Simulate);
    let trading = Trading::new(&provider, Market::Hk);

    let simulate = trading.get_account_info(TradeEnv::Simulate).unwrap().unwrap();
    assert_eq!(simulate["acc_id"], "222");

    let real = trading.get_account_info(TradeEnv::Real).unwrap().unwrap();
    assert_eq!(real["acc_id"], "111");
}

#[test]
fn account_info_is_none_when_no_environment_matches() {
    let daemon = MockDaemon::new().stub(
        "query_accounts",
        Reply::success(json!([{ "acc_id": "111", "trd_env": "REAL" }])),
    );
    let provider = provider_with(&daemon, TradeEnv::Simulate);
    let trading = Trading::new(&provider, Market::Hk);

    assert!(trading.get_account_info(TradeEnv::Simulate).unwrap().is_none());
}

#[test]
fn failed_account_listing_is_an_account_error() {
    let daemon = MockDaemon::new().stub("query_accounts", Reply::failure(1040, "not logged in"));
    let provider = provider_with(&daemon, TradeEnv::Simulate);
    let trading = Trading::new(&provider, Market::Hk);

    match trading.get_account_info(TradeEnv::Simulate).unwrap_err() {
        Error::Account(msg) => assert_eq!(msg, "not logged in"),
        other => panic!("expected Account, got {other:?}"),
    }
}

// ============================================================================
// Max tradable quantity
// ============================================================================

#[test]
fn max_quantity_returns_the_first_row() {
    let daemon = MockDaemon::new().stub(
        "query_max_quantity",
        Reply::success(json!([{ "max_cash_buy": 400, "max_sell_short": 0 }])),
    );
    let provider = provider_with(&daemon, TradeEnv::Simulate);
    let trading = Trading::new(&provider, Market::Hk);

    let record = trading.get_max_tradable_quantity("HK.00700", 610.0).unwrap();
    assert_eq!(record["max_cash_buy"], 400);

    let calls = daemon.calls_for("query_max_quantity");
    assert_eq!(calls[0]["code"], "HK.00700");
    assert_eq!(calls[0]["price"], 610.0);
}

#[test]
fn empty_max_quantity_payload_yields_an_empty_record() {
    let daemon = MockDaemon::new();
    let provider = provider_with(&daemon, TradeEnv::Simulate);
    let trading = Trading::new(&provider, Market::Hk);

    let record = trading.get_max_tradable_quantity("HK.00700", 610.0).unwrap();
    assert!(record.is_empty());
}

// ============================================================================
// Environment scoping
// ============================================================================

#[test]
fn every_trade_request_carries_the_configured_environment() {
    let daemon = MockDaemon::new();
    let provider = provider_with(&daemon, TradeEnv::Real);
    let trading = Trading::new(&provider, Market::Hk);

    trading.list_positions(None).unwrap();
    trading.list_orders(&[]).unwrap();
    trading.get_max_tradable_quantity("HK.00700", 610.0).unwrap();

    assert_eq!(daemon.calls_for("query_positions")[0]["trd_env"], "REAL");
    assert_eq!(daemon.calls_for("query_orders")[0]["trd_env"], "REAL");
    assert_eq!(daemon.calls_for("query_max_quantity")[0]["trd_env"], "REAL");
}
