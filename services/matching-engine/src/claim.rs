//! Claim oracle
//!
//! Decides how much of a resting order the fill watermark has covered. The
//! order's anchor (`pre_liquidity_position`) is fixed at placement; earlier
//! cancellations shrink its effective start through the cancellation index,
//! so the decision is two tree queries and a comparison:
//!
//! ```text
//! real_start = pre_liquidity_position - cancelled_before
//! real_end   = real_start + amount
//! real_end  <= used  -> fully claimable
//! real_start >= used -> not claimable
//! otherwise          -> partially claimable by (used - real_start)
//! ```
//!
//! Scaling loss only ever rounds `cancelled_before` down, which pushes
//! `real_start` up: a claim can be delayed by dust, never overpaid.

use ledger::ScalingPolicy;
use types::errors::MarketError;
use types::numeric::{Amount, Price};
use types::order::Order;

use crate::book::PriceBook;
use crate::tree::cancellation::CancellationIndex;

/// Claim decision for an open resting order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimStatus {
    /// The watermark has crossed the whole order
    FullyClaimable,
    /// The watermark sits inside the order; the amount is what's covered
    PartiallyClaimable(Amount),
    /// The watermark has not reached the order
    NotClaimable,
}

impl ClaimStatus {
    /// Amount currently covered by the watermark.
    pub fn claimable(&self, order: &Order) -> Amount {
        match self {
            ClaimStatus::FullyClaimable => order.amount,
            ClaimStatus::PartiallyClaimable(amount) => *amount,
            ClaimStatus::NotClaimable => Amount::zero(),
        }
    }
}

/// Evaluate the claim status of `order` against current book state.
pub fn evaluate<S: ScalingPolicy>(
    order: &Order,
    book: &PriceBook,
    cancellations: &CancellationIndex,
    scaling: &S,
    price_precision: Price,
) -> Result<ClaimStatus, MarketError> {
    let raw_before = cancellations.cumulative_before(order.price, order.side, order.queue_index);
    let cancelled_before = scaling.scale_up(raw_before, order.price, price_precision)?;

    let real_start = order
        .pre_liquidity_position
        .checked_sub(cancelled_before)
        .ok_or(MarketError::Underflow)?;
    let real_end = real_start
        .checked_add(order.amount)
        .ok_or(MarketError::Overflow)?;
    let used = book.used(order.price, order.side);

    if real_end <= used {
        Ok(ClaimStatus::FullyClaimable)
    } else if real_start >= used {
        Ok(ClaimStatus::NotClaimable)
    } else {
        // Strictly inside the order, so strictly below its amount.
        let covered = (used - real_start).min(order.amount);
        Ok(ClaimStatus::PartiallyClaimable(covered))
    }
}
