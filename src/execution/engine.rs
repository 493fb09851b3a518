use chrono::{DateTime, Utc};

use crate::execution::{OrderBook, SessionGuard};
use crate::market::{CandleGenerator, MarketAnalyzer};
use crate::models::{
    normalize_symbol, ConnectionRequest, ConnectionResponse, MarketSnapshot, Order,
    OrderRequest, Signal,
};
use crate::settings::{OrderSettings, Settings};
use crate::Result;

pub const REASON_SIDEWAYS: &str = "sideways market; order pending confirmation";

/// Ties the market feed, analyzer, session and order book together
///
/// Built once per process and handed to whoever serves requests. It holds no
/// locks itself; callers sharing it across tasks wrap it in a mutex so each
/// operation's read-modify-write runs as a unit.
pub struct TradingEngine {
    feed: CandleGenerator,
    analyzer: MarketAnalyzer,
    session: SessionGuard,
    book: OrderBook,
    candle_limit: usize,
    orders: OrderSettings,
}

impl TradingEngine {
    pub fn new(
        feed: CandleGenerator,
        analyzer: MarketAnalyzer,
        session: SessionGuard,
        candle_limit: usize,
        orders: OrderSettings,
    ) -> Self {
        Self {
            feed,
            analyzer,
            session,
            book: OrderBook::new(),
            candle_limit,
            orders,
        }
    }

    /// Build an engine from settings; fails if the analyzer periods are invalid
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        settings.validate()?;
        let analyzer =
            MarketAnalyzer::new(settings.market.fast_period, settings.market.slow_period)?;

        tracing::info!(
            "Trading engine ready (seed {}, MA {}/{}, {} candles)",
            settings.market.seed,
            analyzer.fast_period(),
            analyzer.slow_period(),
            settings.market.candle_limit
        );

        Ok(Self::new(
            CandleGenerator::new(settings.market.seed),
            analyzer,
            SessionGuard::new(settings.session.clone()),
            settings.market.candle_limit,
            settings.orders.clone(),
        ))
    }

    pub fn session(&self) -> &SessionGuard {
        &self.session
    }

    pub fn connect(&mut self, request: &ConnectionRequest) -> Result<ConnectionResponse> {
        let session = self.session.connect(&request.account, &request.secret)?;
        Ok(ConnectionResponse::from(session))
    }

    pub fn disconnect(&mut self) -> ConnectionResponse {
        ConnectionResponse::from(self.session.disconnect())
    }

    /// Generate fresh candles for the symbol and analyze them
    pub fn analyze_market(&mut self, symbol: &str) -> Result<MarketSnapshot> {
        let symbol = normalize_symbol(symbol)?;
        let candles = self.feed.generate(&symbol, self.candle_limit);
        self.analyzer.snapshot(&symbol, candles)
    }

    /// Place an order and resolve it right away against the current signal
    ///
    /// A `wait` signal leaves the order pending with an explanatory reason;
    /// otherwise the order book's refresh rule decides its status.
    pub fn place_order(&mut self, request: &OrderRequest) -> Result<Order> {
        let order = request.validate(
            self.orders.default_expiration_seconds,
            self.orders.expiration_bounds(),
        )?;

        // Check the session before touching the generator stream
        self.session.ensure_connected()?;
        let snapshot = self.analyze_market(&order.symbol)?;

        let placed = self
            .book
            .place(&self.session, &order.symbol, order.side, order.amount)?;

        match snapshot.signal {
            Signal::Wait => self.book.annotate(&placed.id, REASON_SIDEWAYS),
            signal => self
                .book
                .refresh(&placed.id, signal, order.expiration_seconds),
        }
    }

    pub fn refresh_order(
        &mut self,
        order_id: &str,
        symbol: &str,
        expiration_seconds: u64,
    ) -> Result<Order> {
        self.refresh_order_at(order_id, symbol, expiration_seconds, Utc::now())
    }

    /// Re-check a pending order against a newly generated snapshot
    pub fn refresh_order_at(
        &mut self,
        order_id: &str,
        symbol: &str,
        expiration_seconds: u64,
        now: DateTime<Utc>,
    ) -> Result<Order> {
        // Unknown ids fail before any candles are generated
        self.book.get(order_id)?;
        let snapshot = self.analyze_market(symbol)?;
        self.book
            .refresh_at(order_id, snapshot.signal, expiration_seconds, now)
    }

    /// Refresh an order on its own symbol with the configured monitor expiration
    pub fn monitor_order(&mut self, order_id: &str) -> Result<Order> {
        let order = self.book.get(order_id)?;
        self.refresh_order(
            order_id,
            &order.symbol,
            self.orders.monitor_expiration_seconds,
        )
    }

    pub fn cancel_order(&mut self, order_id: &str) -> Result<Order> {
        self.book.cancel(&self.session, order_id)
    }

    pub fn get_order(&self, order_id: &str) -> Result<Order> {
        self.book.get(order_id)
    }

    pub fn list_orders(&self) -> Vec<Order> {
        self.book.list()
    }
}
