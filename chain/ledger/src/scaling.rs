//! Amount-scaling capability
//!
//! The cancellation trees store 64-bit leaves, so canonical 256-bit amounts
//! are quantized before they are recorded and restored on the way out. The
//! quantum is uniform per (token, price) and exposed so callers can build
//! boundary cases; `scale_up(scale_down(x)) <= x` with a loss strictly below
//! one quantum.

use primitive_types::U256;
use types::errors::MarketError;
use types::numeric::{mul_div, Amount, Price};

/// Capability for compressing base amounts into 64-bit tree leaves.
pub trait ScalingPolicy {
    /// Smallest representable base-amount increment at `price`.
    fn quantum(&self, price: Price, price_precision: Price) -> Result<Amount, MarketError>;

    /// Quantize `amount` down to a 64-bit leaf value (floored).
    fn scale_down(
        &self,
        amount: Amount,
        price: Price,
        price_precision: Price,
    ) -> Result<u64, MarketError>;

    /// Restore a leaf value to a canonical base amount.
    fn scale_up(
        &self,
        raw: u64,
        price: Price,
        price_precision: Price,
    ) -> Result<Amount, MarketError>;
}

/// Default policy: one quantum of base is worth one `quote_unit` of quote.
///
/// `quantum(price) = max(1, quote_unit * price_precision / price)`, i.e. the
/// base increment whose quote image is a single quote unit. Amounts are
/// already canonicalized to 18 decimals upstream, so no per-asset decimal
/// complement remains here; a foreign-decimals policy would fold its
/// complement into these three methods without touching the engine.
#[derive(Debug, Clone, Copy)]
pub struct QuoteUnitScaling {
    quote_unit: Amount,
}

impl QuoteUnitScaling {
    pub fn new(quote_unit: Amount) -> Self {
        Self { quote_unit }
    }

    pub fn quote_unit(&self) -> Amount {
        self.quote_unit
    }
}

impl ScalingPolicy for QuoteUnitScaling {
    fn quantum(&self, price: Price, price_precision: Price) -> Result<Amount, MarketError> {
        if price.is_zero() {
            return Err(MarketError::InvalidPrice { price });
        }
        let q = mul_div(
            self.quote_unit.as_u256(),
            price_precision.as_u256(),
            price.as_u256(),
        )
        .ok_or(MarketError::Overflow)?;
        Ok(Amount::new(q.max(U256::one())))
    }

    fn scale_down(
        &self,
        amount: Amount,
        price: Price,
        price_precision: Price,
    ) -> Result<u64, MarketError> {
        let quantum = self.quantum(price, price_precision)?;
        let raw = amount.as_u256() / quantum.as_u256();
        if raw > U256::from(u64::MAX) {
            return Err(MarketError::Overflow);
        }
        Ok(raw.low_u64())
    }

    fn scale_up(
        &self,
        raw: u64,
        price: Price,
        price_precision: Price,
    ) -> Result<Amount, MarketError> {
        let quantum = self.quantum(price, price_precision)?;
        let restored = quantum
            .as_u256()
            .checked_mul(U256::from(raw))
            .ok_or(MarketError::Overflow)?;
        Ok(Amount::new(restored))
    }
}
