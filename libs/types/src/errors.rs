//! Error taxonomy for the order book
//!
//! Every failure aborts its operation atomically; nothing is retried
//! internally. Errors carry enough context to be surfaced to callers as-is.

use crate::ids::{AccountId, OrderId};
use crate::numeric::Price;
use crate::order::OrderStatus;
use thiserror::Error;

/// Top-level error for public market operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketError {
    #[error("matched price {offered} is beyond the worst acceptable price {worst}")]
    ExceedWorstPrice { worst: Price, offered: Price },

    #[error("not enough liquidity within the matching window")]
    NotEnoughLiquidity,

    #[error("order {order_id} is not open (status: {status})")]
    InvalidOrderStatus { order_id: OrderId, status: OrderStatus },

    #[error("order {order_id} is only partially filled; cancel to settle the filled portion")]
    IsNotFullyClaimable { order_id: OrderId },

    #[error("unknown order: {order_id}")]
    UnknownOrder { order_id: OrderId },

    #[error("caller {caller} is not authorized")]
    InvalidCaller { caller: AccountId },

    #[error("amount must be positive")]
    InvalidAmount,

    #[error("price {price} is not a positive multiple of the price precision")]
    InvalidPrice { price: Price },

    #[error("fee rate {rate} exceeds the fee precision")]
    InvalidFeeRate { rate: u32 },

    #[error("arithmetic overflow")]
    Overflow,

    #[error("arithmetic underflow")]
    Underflow,

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

/// Errors surfaced by the external asset ledger
///
/// Credits never fail; debits fail when the account cannot cover the amount.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("insufficient balance for asset {asset}: required {required}, available {available}")]
    InsufficientBalance {
        asset: String,
        required: String,
        available: String,
    },
}

/// Errors from the segment tree layer
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeError {
    #[error("segment tree sum would overflow 64 bits")]
    Overflow,

    #[error("segment tree index {index} is out of range")]
    OutOfRange { index: u64 },
}

impl From<TreeError> for MarketError {
    fn from(_: TreeError) -> Self {
        MarketError::Overflow
    }
}
