//! Matching engine for a single trading pair
//!
//! A discrete-price limit order book with continuous matching. Resting
//! liquidity is tracked per price point as aggregate counters, and time
//! priority is encoded by each order's position in the cumulative-deposit
//! coordinate of its queue. Cancellations are indexed by a two-level segment
//! tree per (price, side), which is what makes claiming a resting order an
//! O(log N) decision instead of a scan over everything queued before it.
//!
//! **Key invariants:**
//! - Per (price, side): `deposited == total + used + cancelled`
//! - The fill watermark `used` only advances
//! - Claim payouts never exceed the order amount

pub mod book;
pub mod claim;
pub mod events;
pub mod matching;
pub mod pair;
pub mod store;
pub mod tree;

pub use pair::{MarketConfig, Pair};
