//! Asset ledger capability
//!
//! Balances are tracked by (account, asset). Debits fail when the account
//! cannot cover the requested amount; credits never fail. The market holds
//! its per-pair lock for the whole of every public call, so the ledger sees
//! its transfers fully serialized.

use std::collections::HashMap;
use types::errors::LedgerError;
use types::ids::{AccountId, AssetId};
use types::numeric::Amount;

/// Capability for moving assets in and out of user accounts.
pub trait AssetLedger {
    /// Remove `amount` of `asset` from `account`.
    fn debit(
        &mut self,
        account: AccountId,
        asset: &AssetId,
        amount: Amount,
    ) -> Result<(), LedgerError>;

    /// Add `amount` of `asset` to `account`. Infallible: balances saturate
    /// at the 256-bit ceiling rather than rejecting a payout.
    fn credit(&mut self, account: AccountId, asset: &AssetId, amount: Amount);
}

/// Reference in-memory ledger.
///
/// Balances are stored as `HashMap<(AccountId, AssetId), Amount>`.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    balances: HashMap<(AccountId, AssetId), Amount>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an account with funds (test and genesis convenience).
    pub fn mint(&mut self, account: AccountId, asset: &AssetId, amount: Amount) {
        self.credit(account, asset, amount);
    }

    /// Get balance for a specific account and asset.
    pub fn balance_of(&self, account: &AccountId, asset: &AssetId) -> Amount {
        self.balances
            .get(&(*account, asset.clone()))
            .copied()
            .unwrap_or_else(Amount::zero)
    }
}

impl AssetLedger for InMemoryLedger {
    fn debit(
        &mut self,
        account: AccountId,
        asset: &AssetId,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        let current = self.balance_of(&account, asset);
        let remaining = current
            .checked_sub(amount)
            .ok_or_else(|| LedgerError::InsufficientBalance {
                asset: asset.to_string(),
                required: amount.to_string(),
                available: current.to_string(),
            })?;
        self.balances.insert((account, asset.clone()), remaining);
        Ok(())
    }

    fn credit(&mut self, account: AccountId, asset: &AssetId, amount: Amount) {
        let entry = self
            .balances
            .entry((account, asset.clone()))
            .or_insert_with(Amount::zero);
        *entry = entry.saturating_add(amount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use primitive_types::U256;

    fn setup() -> (InMemoryLedger, AccountId, AssetId) {
        let mut ledger = InMemoryLedger::new();
        let account = AccountId::new();
        let asset = AssetId::new("QUOTE");
        ledger.mint(account, &asset, Amount::from_u64(100));
        (ledger, account, asset)
    }

    #[test]
    fn test_credit_accumulates() {
        let (mut ledger, account, asset) = setup();
        ledger.credit(account, &asset, Amount::from_u64(50));
        assert_eq!(ledger.balance_of(&account, &asset), Amount::from_u64(150));
    }

    #[test]
    fn test_debit_success() {
        let (mut ledger, account, asset) = setup();
        ledger.debit(account, &asset, Amount::from_u64(30)).unwrap();
        assert_eq!(ledger.balance_of(&account, &asset), Amount::from_u64(70));
    }

    #[test]
    fn test_debit_insufficient() {
        let (mut ledger, account, asset) = setup();
        let result = ledger.debit(account, &asset, Amount::from_u64(101));
        assert_eq!(
            result,
            Err(LedgerError::InsufficientBalance {
                asset: "QUOTE".to_string(),
                required: "101".to_string(),
                available: "100".to_string(),
            })
        );
        // Failed debit leaves the balance untouched
        assert_eq!(ledger.balance_of(&account, &asset), Amount::from_u64(100));
    }

    #[test]
    fn test_balance_of_unknown_account() {
        let ledger = InMemoryLedger::new();
        assert_eq!(
            ledger.balance_of(&AccountId::new(), &AssetId::new("BASE")),
            Amount::zero()
        );
    }

    #[test]
    fn test_credit_saturates_instead_of_failing() {
        let (mut ledger, account, asset) = setup();
        ledger.credit(account, &asset, Amount::new(U256::MAX));
        assert_eq!(ledger.balance_of(&account, &asset), Amount::new(U256::MAX));
    }

    #[test]
    fn test_accounts_are_isolated() {
        let (mut ledger, account, asset) = setup();
        let other = AccountId::new();
        ledger.mint(other, &asset, Amount::from_u64(5));

        ledger.debit(account, &asset, Amount::from_u64(100)).unwrap();
        assert_eq!(ledger.balance_of(&other, &asset), Amount::from_u64(5));
    }

    #[test]
    fn test_assets_are_isolated() {
        let (mut ledger, account, asset) = setup();
        let base = AssetId::new("BASE");
        ledger.mint(account, &base, Amount::from_u64(1));

        assert_eq!(ledger.balance_of(&account, &asset), Amount::from_u64(100));
        assert_eq!(ledger.balance_of(&account, &base), Amount::from_u64(1));
    }
}
