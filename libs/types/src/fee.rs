//! Fee policy and fee arithmetic
//!
//! Rates are expressed in millionths (unit 0.0001%). Fees are floored, so
//! the credited remainder never undershoots by more than one wei-equivalent.

use crate::errors::MarketError;
use crate::numeric::Amount;
use primitive_types::{U256, U512};
use serde::{Deserialize, Serialize};

/// Denominator for fee rates: a rate of 1 is 0.0001%
pub const FEE_PRECISION: u32 = 1_000_000;

/// Maker/taker fee rates for a market
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeePolicy {
    pub maker_rate: u32,
    pub taker_rate: u32,
}

impl FeePolicy {
    /// Create a policy, rejecting rates above the precision denominator
    pub fn new(maker_rate: u32, taker_rate: u32) -> Result<Self, MarketError> {
        if maker_rate > FEE_PRECISION {
            return Err(MarketError::InvalidFeeRate { rate: maker_rate });
        }
        if taker_rate > FEE_PRECISION {
            return Err(MarketError::InvalidFeeRate { rate: taker_rate });
        }
        Ok(Self { maker_rate, taker_rate })
    }

    /// Maker fee on `amount`
    pub fn maker_fee_on(&self, amount: Amount) -> Amount {
        fee_on(amount, self.maker_rate)
    }

    /// Taker fee on `amount`
    pub fn taker_fee_on(&self, amount: Amount) -> Amount {
        fee_on(amount, self.taker_rate)
    }
}

/// `amount * rate / FEE_PRECISION`, floored.
///
/// The quotient is bounded by `amount` because rates are capped at the
/// denominator, so narrowing back to 256 bits cannot fail.
pub fn fee_on(amount: Amount, rate: u32) -> Amount {
    debug_assert!(rate <= FEE_PRECISION);
    let wide = amount.as_u256().full_mul(U256::from(rate)) / U512::from(FEE_PRECISION);
    let mut limbs = [0u64; 4];
    limbs.copy_from_slice(&wide.0[..4]);
    Amount::new(U256(limbs))
}
