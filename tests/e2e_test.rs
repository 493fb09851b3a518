use chrono::Duration;
use robosim::execution::TradingEngine;
use robosim::models::{
    ConnectionRequest, ConnectionStatus, OrderRequest, OrderSide, OrderStatus, Signal,
};
use robosim::{Error, Settings};

fn engine_with_seed(seed: u64) -> TradingEngine {
    let mut settings = Settings::default();
    settings.market.seed = seed;
    TradingEngine::from_settings(&settings).unwrap()
}

fn credentials(account: &str, secret: &str) -> ConnectionRequest {
    ConnectionRequest {
        account: account.to_string(),
        secret: secret.to_string(),
    }
}

fn order(symbol: &str, side: OrderSide, expiration_seconds: u64) -> OrderRequest {
    OrderRequest {
        symbol: symbol.to_string(),
        side,
        amount: 25.0,
        expiration_seconds: Some(expiration_seconds),
    }
}

/// Find a seed whose first snapshot for `symbol` has the wanted signal
fn seed_for(symbol: &str, wanted: Signal) -> u64 {
    (0..1000)
        .find(|&seed| engine_with_seed(seed).analyze_market(symbol).unwrap().signal == wanted)
        .expect("no seed produced the requested signal")
}

#[test]
fn test_buy_order_executes_on_buy_signal() {
    let _ = tracing_subscriber::fmt::try_init();

    let seed = seed_for("EURUSD", Signal::Buy);
    let mut engine = engine_with_seed(seed);

    let session = engine
        .connect(&credentials("operator@gmail.com", "strongsecret123"))
        .unwrap();
    assert_eq!(session.status, ConnectionStatus::Connected);
    assert!(session.connected_at.is_some());

    let placed = engine.place_order(&order("EURUSD", OrderSide::Buy, 60)).unwrap();
    assert_eq!(placed.status, OrderStatus::Executed);
    assert!(placed.reason.unwrap().contains("alignment"));
}

#[test]
fn test_pending_order_expires_on_refresh() {
    let seed = seed_for("EURUSD", Signal::Wait);
    let mut engine = engine_with_seed(seed);
    engine
        .connect(&credentials("operator@gmail.com", "strongsecret123"))
        .unwrap();

    let placed = engine.place_order(&order("EURUSD", OrderSide::Buy, 30)).unwrap();
    assert_eq!(placed.status, OrderStatus::Pending);

    let later = placed.created_at + Duration::seconds(31);
    let refreshed = engine
        .refresh_order_at(&placed.id, "EURUSD", 30, later)
        .unwrap();

    assert_eq!(refreshed.status, OrderStatus::Canceled);
    assert!(refreshed.reason.unwrap().contains("expired"));

    // Once canceled, further refreshes change nothing
    let again = engine
        .refresh_order_at(&placed.id, "EURUSD", 30, later + Duration::seconds(10))
        .unwrap();
    assert_eq!(again.status, OrderStatus::Canceled);
    assert_eq!(again.updated_at, later);
}

#[test]
fn test_order_without_connection_fails() {
    let mut engine = engine_with_seed(42);

    let result = engine.place_order(&order("EURUSD", OrderSide::Sell, 60));
    assert!(matches!(result, Err(Error::NotConnected)));

    engine
        .connect(&credentials("operator@gmail.com", "strongsecret123"))
        .unwrap();
    engine.disconnect();
    let result = engine.place_order(&order("EURUSD", OrderSide::Sell, 60));
    assert!(matches!(result, Err(Error::NotConnected)));
}

#[test]
fn test_invalid_credentials_rejected() {
    let mut engine = engine_with_seed(42);

    let short_secret = engine.connect(&credentials("operator@gmail.com", "123"));
    assert!(matches!(short_secret, Err(Error::Validation(_))));

    let other_domain = engine.connect(&credentials("operator@outlook.com", "12345678"));
    assert!(matches!(other_domain, Err(Error::Validation(_))));

    assert!(!engine.session().is_connected());
}

#[test]
fn test_unknown_order_not_found() {
    let engine = engine_with_seed(42);
    assert!(matches!(
        engine.get_order("ord_000000000000"),
        Err(Error::NotFound(_))
    ));
}

#[test]
fn test_create_and_cancel_flow() {
    let mut engine = engine_with_seed(42);
    engine
        .connect(&credentials("operator@gmail.com", "strongsecret123"))
        .unwrap();

    let placed = engine.place_order(&order("EURUSD", OrderSide::Buy, 60)).unwrap();
    assert_eq!(placed.symbol, "EURUSD");
    assert_eq!(engine.get_order(&placed.id).unwrap(), placed);

    let canceled = engine.cancel_order(&placed.id).unwrap();
    assert!(matches!(
        canceled.status,
        OrderStatus::Canceled | OrderStatus::Executed
    ));

    // Cancel is idempotent
    assert_eq!(engine.cancel_order(&placed.id).unwrap(), canceled);
}

#[test]
fn test_list_orders_newest_first() {
    let mut engine = engine_with_seed(42);
    engine
        .connect(&credentials("operator@gmail.com", "strongsecret123"))
        .unwrap();

    let first = engine.place_order(&order("EURUSD", OrderSide::Buy, 60)).unwrap();
    let second = engine.place_order(&order("GBPUSD", OrderSide::Sell, 60)).unwrap();
    let third = engine.place_order(&order("USDJPY", OrderSide::Buy, 60)).unwrap();

    let ids: Vec<String> = engine.list_orders().into_iter().map(|o| o.id).collect();
    assert_eq!(ids, vec![third.id, second.id, first.id]);
}

#[test]
fn test_monitor_uses_a_fresh_signal() {
    // A pending sell placed on a wait signal gets re-evaluated on each monitor
    let seed = seed_for("EURUSD", Signal::Wait);
    let mut engine = engine_with_seed(seed);
    engine
        .connect(&credentials("operator@gmail.com", "strongsecret123"))
        .unwrap();

    let placed = engine.place_order(&order("EURUSD", OrderSide::Sell, 60)).unwrap();
    assert_eq!(placed.status, OrderStatus::Pending);

    let mut last = placed.clone();
    for _ in 0..50 {
        last = engine.monitor_order(&placed.id).unwrap();
        if last.status != OrderStatus::Pending {
            break;
        }
    }

    // Within a minute of placement the only possible exit is execution
    assert!(matches!(
        last.status,
        OrderStatus::Pending | OrderStatus::Executed
    ));
    assert!(last.updated_at >= placed.updated_at);
}
