//! Custody and scaling capabilities
//!
//! The order book never holds tokens itself; it drives an external
//! `AssetLedger` for every debit and credit, and an external `ScalingPolicy`
//! to compress canonical 256-bit amounts into the 64-bit representation the
//! cancellation trees store.

pub mod ledger;
pub mod scaling;

pub use ledger::{AssetLedger, InMemoryLedger};
pub use scaling::{QuoteUnitScaling, ScalingPolicy};
