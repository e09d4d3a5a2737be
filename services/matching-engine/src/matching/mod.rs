//! Match planner
//!
//! Planning is a read-only pass over the book: it walks at most
//! `MAX_MATCHED_PRICE_POINTS` grid steps from the entry price in the taker's
//! scan direction and records how much each level can contribute, in
//! encounter order. The controller validates the plan (worst price, residual
//! rules, funding) before any of it is applied, so a rejected order costs no
//! state change.

use serde::{Deserialize, Serialize};
use types::numeric::{Amount, Price};
use types::order::Side;

use crate::book::PriceBook;

/// Price points visited per matching invocation, bounding per-call work
pub const MAX_MATCHED_PRICE_POINTS: usize = 5;

/// One matched price level, in encounter order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fill {
    pub price: Price,
    pub amount: Amount,
}

/// Outcome of a planning pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchPlan {
    /// Matched levels in encounter order, at most `MAX_MATCHED_PRICE_POINTS`
    pub fills: Vec<Fill>,
    /// Taker amount left unmatched after the scan
    pub remaining: Amount,
}

impl MatchPlan {
    fn unmatched(amount: Amount) -> Self {
        Self { fills: Vec::new(), remaining: amount }
    }

    pub fn is_empty(&self) -> bool {
        self.fills.is_empty()
    }

    /// Total base amount consumed across all fills
    pub fn matched_base(&self) -> Amount {
        self.fills
            .iter()
            .fold(Amount::zero(), |sum, fill| sum + fill.amount)
    }

    /// Price of the last matched level
    pub fn last_price(&self) -> Option<Price> {
        self.fills.last().map(|fill| fill.price)
    }
}

/// Plan a taker sweep of up to `MAX_MATCHED_PRICE_POINTS` levels.
///
/// A buy scans non-increasing prices from `entry` (asks worth taking sit at
/// or below the buyer's bound); a sell scans non-decreasing prices. The
/// leading-price gate short-circuits scans that provably cannot match:
/// a hint is a monotone bound on every price that ever held a deposit, so an
/// entry strictly outside it sees no matchable liquidity. While a side has
/// never received a deposit its hint is unset and the gate falls back to the
/// entry level's own counter.
pub fn plan(
    book: &PriceBook,
    taker_side: Side,
    entry: Price,
    amount: Amount,
    price_step: Price,
) -> MatchPlan {
    if !gate(book, taker_side, entry) {
        return MatchPlan::unmatched(amount);
    }

    let mut fills = Vec::new();
    let mut remaining = amount;
    let mut price = Some(entry);

    for _ in 0..MAX_MATCHED_PRICE_POINTS {
        let Some(level) = price else { break };
        let available = book.total(level, taker_side.opposite());
        let consumed = remaining.min(available);
        if !consumed.is_zero() {
            fills.push(Fill { price: level, amount: consumed });
            remaining = remaining - consumed;
        }
        if remaining.is_zero() {
            break;
        }
        price = match taker_side {
            Side::Buy => level.step_down(price_step),
            Side::Sell => level.step_up(price_step),
        };
    }

    MatchPlan { fills, remaining }
}

fn gate(book: &PriceBook, taker_side: Side, entry: Price) -> bool {
    match taker_side {
        Side::Buy => {
            book.sell_leading().map_or(false, |leading| entry >= leading)
                || !book.total(entry, Side::Sell).is_zero()
        }
        Side::Sell => {
            book.buy_leading().map_or(false, |leading| entry <= leading)
                || !book.total(entry, Side::Buy).is_zero()
        }
    }
}
