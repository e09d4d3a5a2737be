//! Per-price liquidity state
//!
//! Each side of a price point carries four counters:
//! - `total`: resting liquidity currently offered
//! - `used`: the fill watermark — cumulative liquidity matched by takers,
//!   measured in the queue's live coordinate; it only advances
//! - `deposited`: cumulative all-time maker deposits; anchors the queue
//!   position of every resting order placed here
//! - `order_count`: resting orders ever placed (never decremented)
//!
//! Conservation: `deposited == total + used + cancelled` at all times, where
//! `cancelled` is the physically refunded residual sum for this side.

use serde::{Deserialize, Serialize};
use types::errors::MarketError;
use types::numeric::Amount;
use types::order::Side;

/// Liquidity counters for one side of a price point
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideLiquidity {
    pub total: Amount,
    pub used: Amount,
    pub deposited: Amount,
    pub order_count: u64,
}

/// Queue position handed to a freshly placed resting order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedPosition {
    pub queue_index: u64,
    pub pre_liquidity_position: Amount,
}

/// Both sides' liquidity state at one price
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    buy: SideLiquidity,
    sell: SideLiquidity,
}

impl PricePoint {
    pub fn side(&self, side: Side) -> &SideLiquidity {
        match side {
            Side::Buy => &self.buy,
            Side::Sell => &self.sell,
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut SideLiquidity {
        match side {
            Side::Buy => &mut self.buy,
            Side::Sell => &mut self.sell,
        }
    }

    /// Maker deposit: grow `side`'s resting liquidity and hand back the
    /// queue position the deposit occupies.
    pub fn place(&mut self, side: Side, amount: Amount) -> Result<PlacedPosition, MarketError> {
        let state = self.side_mut(side);
        let position = PlacedPosition {
            queue_index: state.order_count,
            pre_liquidity_position: state.deposited,
        };
        state.total = state.total.checked_add(amount).ok_or(MarketError::Overflow)?;
        state.deposited = state
            .deposited
            .checked_add(amount)
            .ok_or(MarketError::Overflow)?;
        state.order_count += 1;
        Ok(position)
    }

    /// Taker match: consume liquidity from the side opposite the taker and
    /// advance that side's fill watermark.
    pub fn take(&mut self, taker_side: Side, amount: Amount) -> Result<(), MarketError> {
        let state = self.side_mut(taker_side.opposite());
        state.total = state
            .total
            .checked_sub(amount)
            .ok_or(MarketError::Underflow)?;
        state.used = state.used.checked_add(amount).ok_or(MarketError::Overflow)?;
        Ok(())
    }

    /// Maker cancel: retire an unfilled residual from `side`'s resting
    /// liquidity. The residual sits strictly at-or-above the watermark, so
    /// `used` stays where it is; later orders re-anchor through the
    /// cancellation index.
    pub fn pull(&mut self, side: Side, amount: Amount) -> Result<(), MarketError> {
        let state = self.side_mut(side);
        state.total = state
            .total
            .checked_sub(amount)
            .ok_or(MarketError::Underflow)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_assigns_sequential_positions() {
        let mut point = PricePoint::default();

        let first = point.place(Side::Sell, Amount::from_u64(2)).unwrap();
        let second = point.place(Side::Sell, Amount::from_u64(3)).unwrap();

        assert_eq!(first.queue_index, 0);
        assert_eq!(first.pre_liquidity_position, Amount::zero());
        assert_eq!(second.queue_index, 1);
        assert_eq!(second.pre_liquidity_position, Amount::from_u64(2));

        let sell = point.side(Side::Sell);
        assert_eq!(sell.total, Amount::from_u64(5));
        assert_eq!(sell.deposited, Amount::from_u64(5));
        assert_eq!(sell.order_count, 2);
    }

    #[test]
    fn test_sides_are_independent() {
        let mut point = PricePoint::default();
        point.place(Side::Buy, Amount::from_u64(7)).unwrap();

        assert_eq!(point.side(Side::Buy).total, Amount::from_u64(7));
        assert_eq!(point.side(Side::Sell).total, Amount::zero());
        assert_eq!(point.side(Side::Sell).order_count, 0);
    }

    #[test]
    fn test_take_consumes_opposite_side() {
        let mut point = PricePoint::default();
        point.place(Side::Sell, Amount::from_u64(5)).unwrap();

        // A buy taker eats the sell queue
        point.take(Side::Buy, Amount::from_u64(3)).unwrap();

        let sell = point.side(Side::Sell);
        assert_eq!(sell.total, Amount::from_u64(2));
        assert_eq!(sell.used, Amount::from_u64(3));
        assert_eq!(sell.deposited, Amount::from_u64(5));
    }

    #[test]
    fn test_take_beyond_total_underflows() {
        let mut point = PricePoint::default();
        point.place(Side::Sell, Amount::from_u64(1)).unwrap();

        assert_eq!(
            point.take(Side::Buy, Amount::from_u64(2)),
            Err(MarketError::Underflow)
        );
    }

    #[test]
    fn test_pull_leaves_watermark_alone() {
        let mut point = PricePoint::default();
        point.place(Side::Sell, Amount::from_u64(6)).unwrap();
        point.take(Side::Buy, Amount::from_u64(2)).unwrap();

        point.pull(Side::Sell, Amount::from_u64(4)).unwrap();

        let sell = point.side(Side::Sell);
        assert_eq!(sell.total, Amount::zero());
        assert_eq!(sell.used, Amount::from_u64(2));
        assert_eq!(sell.order_count, 1, "counts never decrement");
    }

    #[test]
    fn test_conservation_identity() {
        let mut point = PricePoint::default();
        point.place(Side::Sell, Amount::from_u64(2)).unwrap();
        point.place(Side::Sell, Amount::from_u64(3)).unwrap();
        point.place(Side::Sell, Amount::from_u64(1)).unwrap();
        point.take(Side::Buy, Amount::from_u64(2)).unwrap();
        point.pull(Side::Sell, Amount::from_u64(3)).unwrap();

        let sell = point.side(Side::Sell);
        let cancelled = Amount::from_u64(3);
        assert_eq!(
            sell.deposited,
            sell.total
                .checked_add(sell.used)
                .and_then(|sum| sum.checked_add(cancelled))
                .unwrap()
        );
    }
}
