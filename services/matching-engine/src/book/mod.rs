//! Price book: per-price liquidity state for a single pair
//!
//! Prices map to their `PricePoint` in a `BTreeMap`; points are created on
//! first touch and never removed (their monotone counters anchor resting
//! orders long after the level empties). The two leading-price hints are
//! advanced on deposits only and never retreat — they gate matching scans
//! but the per-price counters stay authoritative.

pub mod price_point;

pub use price_point::{PlacedPosition, PricePoint, SideLiquidity};

use std::collections::BTreeMap;
use types::errors::MarketError;
use types::numeric::{Amount, Price};
use types::order::Side;

#[derive(Debug, Clone, Default)]
pub struct PriceBook {
    points: BTreeMap<Price, PricePoint>,
    /// Highest price that ever received a buy deposit
    buy_leading: Option<Price>,
    /// Lowest price that ever received a sell deposit
    sell_leading: Option<Price>,
}

impl PriceBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn point(&self, price: Price) -> Option<&PricePoint> {
        self.points.get(&price)
    }

    /// Resting liquidity currently offered by `side` at `price`.
    pub fn total(&self, price: Price, side: Side) -> Amount {
        self.points
            .get(&price)
            .map_or_else(Amount::zero, |p| p.side(side).total)
    }

    /// Fill watermark of `side`'s queue at `price`.
    pub fn used(&self, price: Price, side: Side) -> Amount {
        self.points
            .get(&price)
            .map_or_else(Amount::zero, |p| p.side(side).used)
    }

    pub fn buy_leading(&self) -> Option<Price> {
        self.buy_leading
    }

    pub fn sell_leading(&self) -> Option<Price> {
        self.sell_leading
    }

    /// Maker deposit at `price`, promoting the side's leading hint when the
    /// deposit improves on it.
    pub fn place(
        &mut self,
        side: Side,
        price: Price,
        amount: Amount,
    ) -> Result<PlacedPosition, MarketError> {
        let position = self.points.entry(price).or_default().place(side, amount)?;
        match side {
            Side::Buy => {
                if self.buy_leading.map_or(true, |leading| price > leading) {
                    self.buy_leading = Some(price);
                }
            }
            Side::Sell => {
                if self.sell_leading.map_or(true, |leading| price < leading) {
                    self.sell_leading = Some(price);
                }
            }
        }
        Ok(position)
    }

    /// Taker match at `price`.
    pub fn take(
        &mut self,
        taker_side: Side,
        price: Price,
        amount: Amount,
    ) -> Result<(), MarketError> {
        self.points
            .get_mut(&price)
            .ok_or(MarketError::Underflow)?
            .take(taker_side, amount)
    }

    /// Maker cancel of an unfilled residual at `price`.
    pub fn pull(&mut self, side: Side, price: Price, amount: Amount) -> Result<(), MarketError> {
        self.points
            .get_mut(&price)
            .ok_or(MarketError::Underflow)?
            .pull(side, amount)
    }

    /// Snapshot the points at `prices` (deduplicated) and the leading
    /// hints, taken before an order-entry flow stages its mutations.
    pub fn scratch(&self, prices: impl IntoIterator<Item = Price>) -> BookScratch {
        let mut points: Vec<(Price, Option<PricePoint>)> = Vec::new();
        for price in prices {
            if points.iter().any(|(seen, _)| *seen == price) {
                continue;
            }
            points.push((price, self.points.get(&price).copied()));
        }
        BookScratch {
            points,
            buy_leading: self.buy_leading,
            sell_leading: self.sell_leading,
        }
    }

    /// Roll back to a scratch taken by [`PriceBook::scratch`]: snapshotted
    /// points are put back exactly; a point the failed flow created is
    /// removed again.
    pub fn restore(&mut self, scratch: BookScratch) {
        for (price, point) in scratch.points {
            match point {
                Some(point) => {
                    self.points.insert(price, point);
                }
                None => {
                    self.points.remove(&price);
                }
            }
        }
        self.buy_leading = scratch.buy_leading;
        self.sell_leading = scratch.sell_leading;
    }
}

/// Clone-on-write scratch of the price points an order-entry flow touches,
/// so a ledger debit staged after the book mutations can fail without
/// leaving partial effects.
#[derive(Debug, Clone)]
pub struct BookScratch {
    points: Vec<(Price, Option<PricePoint>)>,
    buy_leading: Option<Price>,
    sell_leading: Option<Price>,
}
