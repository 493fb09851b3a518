use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::error::Error;
use crate::execution::SessionGuard;
use crate::models::{new_order_id, Order, OrderSide, OrderStatus, Signal};
use crate::Result;

pub const REASON_EXPIRED: &str = "order expired";
pub const REASON_SIGNAL_ALIGNED: &str = "executed on market-signal alignment";

/// In-memory store of every order ever placed
///
/// Orders are keyed by id and never removed; terminal ones stay for lookup.
/// All status changes go through `cancel` and `refresh`.
#[derive(Default)]
pub struct OrderBook {
    /// Order id -> (placement sequence, order)
    orders: HashMap<String, (u64, Order)>,
    next_seq: u64,
}

impl OrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Place a new pending order (requires an active session)
    pub fn place(
        &mut self,
        session: &SessionGuard,
        symbol: &str,
        side: OrderSide,
        amount: f64,
    ) -> Result<Order> {
        self.place_at(session, symbol, side, amount, Utc::now())
    }

    /// Place a new pending order with an explicit creation time
    pub fn place_at(
        &mut self,
        session: &SessionGuard,
        symbol: &str,
        side: OrderSide,
        amount: f64,
        now: DateTime<Utc>,
    ) -> Result<Order> {
        session.ensure_connected()?;

        if !amount.is_finite() || amount <= 0.0 {
            return Err(Error::validation(format!(
                "amount must be greater than zero, got {}",
                amount
            )));
        }

        let order = Order {
            id: new_order_id(),
            symbol: symbol.to_string(),
            side,
            amount,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
            reason: None,
        };

        tracing::info!(
            "Placed {:?} order {} for {} {}",
            side,
            order.id,
            amount,
            symbol
        );

        let seq = self.next_seq;
        self.next_seq += 1;
        self.orders.insert(order.id.clone(), (seq, order.clone()));
        Ok(order)
    }

    pub fn get(&self, order_id: &str) -> Result<Order> {
        self.find(order_id).cloned()
    }

    /// All orders, most recently created first
    pub fn list(&self) -> Vec<Order> {
        let mut entries: Vec<&(u64, Order)> = self.orders.values().collect();
        // Orders sharing a timestamp fall back to placement order, newest first
        entries.sort_by(|(seq_a, a), (seq_b, b)| {
            b.created_at.cmp(&a.created_at).then(seq_b.cmp(seq_a))
        });
        entries.into_iter().map(|(_, order)| order.clone()).collect()
    }

    pub fn cancel(&mut self, session: &SessionGuard, order_id: &str) -> Result<Order> {
        self.cancel_at(session, order_id, Utc::now())
    }

    /// Cancel a pending order; terminal orders come back unchanged
    pub fn cancel_at(
        &mut self,
        session: &SessionGuard,
        order_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Order> {
        session.ensure_connected()?;
        let order = self.find_mut(order_id)?;

        if order.status.is_terminal() {
            tracing::debug!("Cancel ignored, order {} is {:?}", order.id, order.status);
            return Ok(order.clone());
        }

        order.status = OrderStatus::Canceled;
        order.updated_at = now;
        order.reason = None;

        tracing::info!("Order {} canceled", order.id);
        Ok(order.clone())
    }

    pub fn refresh(
        &mut self,
        order_id: &str,
        signal: Signal,
        expiration_seconds: u64,
    ) -> Result<Order> {
        self.refresh_at(order_id, signal, expiration_seconds, Utc::now())
    }

    /// Re-evaluate a pending order against the latest signal
    ///
    /// Expiry is checked before signal alignment, so an expired order is
    /// canceled even when the signal would have executed it.
    pub fn refresh_at(
        &mut self,
        order_id: &str,
        signal: Signal,
        expiration_seconds: u64,
        now: DateTime<Utc>,
    ) -> Result<Order> {
        let order = self.find_mut(order_id)?;

        if order.status != OrderStatus::Pending {
            tracing::debug!("Refresh ignored, order {} is {:?}", order.id, order.status);
            return Ok(order.clone());
        }

        let elapsed = now - order.created_at;
        let expired = i64::try_from(expiration_seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .is_some_and(|expiration| elapsed > expiration);

        if expired {
            order.status = OrderStatus::Canceled;
            order.reason = Some(REASON_EXPIRED.to_string());
            tracing::info!(
                "Order {} expired after {}s",
                order.id,
                elapsed.num_seconds()
            );
        } else if order.side.aligns_with(signal) {
            order.status = OrderStatus::Executed;
            order.reason = Some(REASON_SIGNAL_ALIGNED.to_string());
            tracing::info!("Order {} executed on {:?} signal", order.id, signal);
        }

        order.updated_at = now;
        Ok(order.clone())
    }

    /// Attach a note to an order without touching its status
    pub fn annotate(&mut self, order_id: &str, reason: &str) -> Result<Order> {
        let order = self.find_mut(order_id)?;
        order.reason = Some(reason.to_string());
        Ok(order.clone())
    }

    fn find(&self, order_id: &str) -> Result<&Order> {
        self.orders
            .get(order_id)
            .map(|(_, order)| order)
            .ok_or_else(|| Error::NotFound(order_id.to_string()))
    }

    fn find_mut(&mut self, order_id: &str) -> Result<&mut Order> {
        self.orders
            .get_mut(order_id)
            .map(|(_, order)| order)
            .ok_or_else(|| Error::NotFound(order_id.to_string()))
    }
}
