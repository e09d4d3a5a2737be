//! Observation records emitted by the pair controller
//!
//! Observations are immutable records appended in the order state changes
//! commit; transports are out of scope, so the controller keeps an
//! append-only log that embedders drain.

use serde::{Deserialize, Serialize};
use types::ids::{AccountId, OrderId};
use types::numeric::{Amount, Price};
use types::order::Side;

use crate::matching::Fill;

/// A limit order entered the book (possibly after matching)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitOrderInserted {
    pub order_id: OrderId,
    pub owner: AccountId,
    pub price: Price,
    pub matched: Vec<Fill>,
    pub residual: Amount,
    pub side: Side,
}

/// A market order swept the book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketOrderInserted {
    pub order_id: OrderId,
    pub owner: AccountId,
    pub amount: Amount,
    pub matched: Vec<Fill>,
    pub worst_price: Price,
    pub side: Side,
}

/// A fully filled maker order was claimed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitMakerOrderClaimed {
    pub order_id: OrderId,
    pub owner: AccountId,
    pub price: Price,
    pub claimed: Amount,
    pub fee: Amount,
    pub side: Side,
}

/// A maker order was canceled, with any filled portion settled first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitMakerOrderCanceled {
    pub order_id: OrderId,
    pub owner: AccountId,
    pub price: Price,
    pub refund: Amount,
    pub claimed: Amount,
    pub fee: Amount,
    pub side: Side,
}

/// Governance updated the market policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeePolicyUpdated {
    pub maker_rate: u32,
    pub taker_rate: u32,
    pub price_precision: Price,
}

/// Accumulated fees were swept to the treasury
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeesCollected {
    pub treasury: AccountId,
    pub quote_amount: Amount,
    pub base_amount: Amount,
}

/// Enum wrapper for all observations, enabling uniform handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Observation {
    LimitOrderInserted(LimitOrderInserted),
    MarketOrderInserted(MarketOrderInserted),
    LimitMakerOrderClaimed(LimitMakerOrderClaimed),
    LimitMakerOrderCanceled(LimitMakerOrderCanceled),
    FeePolicyUpdated(FeePolicyUpdated),
    FeesCollected(FeesCollected),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_order_observation_serialization() {
        let observation = Observation::LimitOrderInserted(LimitOrderInserted {
            order_id: OrderId::from_u64(0),
            owner: AccountId::new(),
            price: Price::from_u64(2000),
            matched: vec![Fill { price: Price::from_u64(2000), amount: Amount::from_u64(1) }],
            residual: Amount::from_u64(2),
            side: Side::Buy,
        });

        let json = serde_json::to_string(&observation).unwrap();
        let deserialized: Observation = serde_json::from_str(&json).unwrap();
        assert_eq!(observation, deserialized);
    }

    #[test]
    fn test_cancel_observation_serialization() {
        let observation = Observation::LimitMakerOrderCanceled(LimitMakerOrderCanceled {
            order_id: OrderId::from_u64(3),
            owner: AccountId::new(),
            price: Price::from_u64(2000),
            refund: Amount::from_u64(2),
            claimed: Amount::from_u64(1),
            fee: Amount::zero(),
            side: Side::Sell,
        });

        let json = serde_json::to_string(&observation).unwrap();
        let deserialized: Observation = serde_json::from_str(&json).unwrap();
        assert_eq!(observation, deserialized);
    }
}
