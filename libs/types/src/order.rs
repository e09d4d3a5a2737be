//! Order lifecycle types
//!
//! A resting maker order is identified by its queue index within a
//! (price, side) queue, and carries the cumulative deposited liquidity that
//! sat ahead of it when it was placed. That position, corrected by earlier
//! cancellations, is everything the claim arithmetic needs.

use crate::ids::{AccountId, OrderId};
use crate::numeric::{Amount, Price};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order side (buyer or seller)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Buy order (bid)
    Buy,
    /// Sell order (ask)
    Sell,
}

impl Side {
    /// Get the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "buy"),
            Side::Sell => write!(f, "sell"),
        }
    }
}

/// Resting-order status
///
/// Orders are created `Open` (a limit order left a residual on the book) and
/// end in exactly one terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    /// Resting on the book, claimable or cancelable
    Open,
    /// Fully filled and paid out (terminal)
    Claimed,
    /// Withdrawn by its owner (terminal)
    Canceled,
}

impl OrderStatus {
    /// Check if status is terminal (no further transitions possible)
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Claimed | OrderStatus::Canceled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Open => write!(f, "open"),
            OrderStatus::Claimed => write!(f, "claimed"),
            OrderStatus::Canceled => write!(f, "canceled"),
        }
    }
}

/// A resting maker order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub owner: AccountId,
    pub side: Side,
    pub price: Price,
    /// Order size in base units
    pub amount: Amount,
    /// Zero-based index within the (price, side) queue
    pub queue_index: u64,
    /// Cumulative deposited liquidity ahead of this order at placement time
    pub pre_liquidity_position: Amount,
    pub status: OrderStatus,
}

impl Order {
    /// Create a new open resting order
    pub fn new(
        order_id: OrderId,
        owner: AccountId,
        side: Side,
        price: Price,
        amount: Amount,
        queue_index: u64,
        pre_liquidity_position: Amount,
    ) -> Self {
        Self {
            order_id,
            owner,
            side,
            price,
            amount,
            queue_index,
            pre_liquidity_position,
            status: OrderStatus::Open,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == OrderStatus::Open
    }

    /// Mark the order fully claimed
    ///
    /// # Panics
    /// Panics if the order is already in a terminal state
    pub fn mark_claimed(&mut self) {
        assert!(!self.status.is_terminal(), "Cannot claim terminal order");
        self.status = OrderStatus::Claimed;
    }

    /// Mark the order canceled
    ///
    /// # Panics
    /// Panics if the order is already in a terminal state
    pub fn mark_canceled(&mut self) {
        assert!(!self.status.is_terminal(), "Cannot cancel terminal order");
        self.status = OrderStatus::Canceled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_order() -> Order {
        Order::new(
            OrderId::from_u64(0),
            AccountId::new(),
            Side::Buy,
            Price::from_u64(2000),
            Amount::from_u64(10),
            0,
            Amount::zero(),
        )
    }

    #[test]
    fn test_side_opposite() {
        assert_eq!(Side::Buy.opposite(), Side::Sell);
        assert_eq!(Side::Sell.opposite(), Side::Buy);
    }

    #[test]
    fn test_order_starts_open() {
        let order = sample_order();
        assert!(order.is_open());
        assert!(!order.status.is_terminal());
    }

    #[test]
    fn test_order_claim_transition() {
        let mut order = sample_order();
        order.mark_claimed();
        assert_eq!(order.status, OrderStatus::Claimed);
        assert!(order.status.is_terminal());
    }

    #[test]
    fn test_order_cancel_transition() {
        let mut order = sample_order();
        order.mark_canceled();
        assert_eq!(order.status, OrderStatus::Canceled);
        assert!(order.status.is_terminal());
    }

    #[test]
    #[should_panic(expected = "Cannot claim terminal order")]
    fn test_claim_after_cancel_panics() {
        let mut order = sample_order();
        order.mark_canceled();
        order.mark_claimed();
    }

    #[test]
    fn test_order_serialization() {
        let order = sample_order();
        let json = serde_json::to_string(&order).unwrap();
        let deserialized: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(order, deserialized);
    }
}
