//! Pair controller
//!
//! Public API for one trading pair. Every operation is a serialized, atomic
//! transaction: inputs are validated and all fallible arithmetic is done
//! against a read-only match plan first, internal book and fee mutations are
//! staged next, and the ledger debit runs last against a clone-on-write
//! scratch of the touched price points — if the debit fails, the staging is
//! rolled back, so a failing call leaves neither internal nor external
//! effects. Credits never fail and follow the commit.

use ledger::{AssetLedger, QuoteUnitScaling, ScalingPolicy};
use tracing::{debug, info};
use types::errors::MarketError;
use types::fee::FeePolicy;
use types::ids::{AccountId, AssetId, OrderId};
use types::numeric::{Amount, Price};
use types::order::{Order, Side};

use crate::book::{BookScratch, PlacedPosition, PriceBook};
use crate::claim::{self, ClaimStatus};
use crate::events::{
    FeePolicyUpdated, FeesCollected, LimitMakerOrderCanceled, LimitMakerOrderClaimed,
    LimitOrderInserted, MarketOrderInserted, Observation,
};
use crate::matching::{self, MatchPlan};
use crate::store::OrderStore;
use crate::tree::cancellation::CancellationIndex;

/// Construction parameters for a pair
#[derive(Debug, Clone)]
pub struct MarketConfig {
    pub base: AssetId,
    pub quote: AssetId,
    /// Quote-unit granularity handed to the default scaling policy
    pub quote_unit: Amount,
    pub maker_rate: u32,
    pub taker_rate: u32,
    pub price_precision: Price,
    pub governance: AccountId,
}

/// A single trading pair: book, resting orders, cancellation index, fee
/// accumulators and the external custody/scaling capabilities.
pub struct Pair<L: AssetLedger, S: ScalingPolicy = QuoteUnitScaling> {
    base: AssetId,
    quote: AssetId,
    governance: AccountId,
    fees: FeePolicy,
    price_precision: Price,
    ledger: L,
    scaling: S,
    book: PriceBook,
    store: OrderStore,
    cancellations: CancellationIndex,
    latest_trade_price: Option<Price>,
    quote_fee_balance: Amount,
    base_fee_balance: Amount,
    observations: Vec<Observation>,
}

impl<L: AssetLedger> Pair<L> {
    /// Create a pair with the default quote-unit scaling policy.
    pub fn new(config: MarketConfig, ledger: L) -> Result<Self, MarketError> {
        let scaling = QuoteUnitScaling::new(config.quote_unit);
        Self::with_scaling(config, ledger, scaling)
    }
}

impl<L: AssetLedger, S: ScalingPolicy> Pair<L, S> {
    /// Create a pair with an explicit scaling policy.
    pub fn with_scaling(
        config: MarketConfig,
        ledger: L,
        scaling: S,
    ) -> Result<Self, MarketError> {
        let fees = FeePolicy::new(config.maker_rate, config.taker_rate)?;
        if config.price_precision.is_zero() {
            return Err(MarketError::InvalidPrice { price: config.price_precision });
        }
        Ok(Self {
            base: config.base,
            quote: config.quote,
            governance: config.governance,
            fees,
            price_precision: config.price_precision,
            ledger,
            scaling,
            book: PriceBook::new(),
            store: OrderStore::new(),
            cancellations: CancellationIndex::new(),
            latest_trade_price: None,
            quote_fee_balance: Amount::zero(),
            base_fee_balance: Amount::zero(),
            observations: Vec::new(),
        })
    }

    // ───────────────────────── Order Entry ─────────────────────────

    /// Insert a limit order: sweep up to five levels from the limit price,
    /// then rest any residual at the limit price.
    pub fn insert_limit_order(
        &mut self,
        caller: AccountId,
        side: Side,
        price: Price,
        amount: Amount,
    ) -> Result<OrderId, MarketError> {
        if amount.is_zero() {
            return Err(MarketError::InvalidAmount);
        }
        if price.is_zero() || !price.is_aligned_to(self.price_precision) {
            return Err(MarketError::InvalidPrice { price });
        }

        let plan = matching::plan(&self.book, side, price, amount, self.price_precision);
        let matched_quote = self.plan_quote_cost(&plan)?;

        // Entry pull: a buy escrows the limit-price notional of the full
        // amount (fills at better levels leave the difference in escrow),
        // a sell escrows the full base amount.
        let (entry_asset, entry_amount) = match side {
            Side::Buy => (self.quote.clone(), self.quote_value(price, amount)?),
            Side::Sell => (self.base.clone(), amount),
        };
        let taker_gross = match side {
            Side::Buy => plan.matched_base(),
            Side::Sell => matched_quote,
        };
        let taker_fee = self.fees.taker_fee_on(taker_gross);
        let taker_net = taker_gross
            .checked_sub(taker_fee)
            .ok_or(MarketError::Underflow)?;

        let checkpoint =
            self.checkpoint(plan.fills.iter().map(|fill| fill.price).chain([price]));
        let position = match self.stage_entry(
            caller,
            side,
            &plan,
            Some(price),
            taker_fee,
            &entry_asset,
            entry_amount,
        ) {
            Ok(position) => position,
            Err(error) => {
                self.rollback(checkpoint);
                return Err(error);
            }
        };

        let order_id = self.store.next_order_id();
        if let Some(position) = position {
            self.store.insert(Order::new(
                order_id,
                caller,
                side,
                price,
                plan.remaining,
                position.queue_index,
                position.pre_liquidity_position,
            ));
        }
        if !plan.is_empty() {
            let proceeds_asset = self.credited_asset(side).clone();
            self.ledger.credit(caller, &proceeds_asset, taker_net);
        }

        debug!(
            %order_id, %caller, %side, %price,
            matched = plan.fills.len(), residual = %plan.remaining,
            "limit order inserted"
        );
        self.observations
            .push(Observation::LimitOrderInserted(LimitOrderInserted {
                order_id,
                owner: caller,
                price,
                matched: plan.fills,
                residual: plan.remaining,
                side,
            }));
        Ok(order_id)
    }

    /// Insert a market order: sweep from the last trade price, all-or-fail
    /// within the five-level window and the caller's worst-price bound.
    pub fn insert_market_order(
        &mut self,
        caller: AccountId,
        side: Side,
        amount: Amount,
        worst_price: Price,
    ) -> Result<OrderId, MarketError> {
        if amount.is_zero() {
            return Err(MarketError::InvalidAmount);
        }
        // No trade has ever anchored the scan entry.
        let entry = self.latest_trade_price.ok_or(MarketError::NotEnoughLiquidity)?;

        let plan = matching::plan(&self.book, side, entry, amount, self.price_precision);
        if plan.is_empty() {
            return Err(MarketError::NotEnoughLiquidity);
        }
        for fill in &plan.fills {
            let beyond = match side {
                Side::Buy => fill.price > worst_price,
                Side::Sell => fill.price < worst_price,
            };
            if beyond {
                return Err(MarketError::ExceedWorstPrice {
                    worst: worst_price,
                    offered: fill.price,
                });
            }
        }
        if !plan.remaining.is_zero() {
            return Err(MarketError::NotEnoughLiquidity);
        }

        let matched_quote = self.plan_quote_cost(&plan)?;
        // Market orders pull exactly the sum their fills consume.
        let (entry_asset, entry_amount) = match side {
            Side::Buy => (self.quote.clone(), matched_quote),
            Side::Sell => (self.base.clone(), amount),
        };
        let taker_gross = match side {
            Side::Buy => plan.matched_base(),
            Side::Sell => matched_quote,
        };
        let taker_fee = self.fees.taker_fee_on(taker_gross);
        let taker_net = taker_gross
            .checked_sub(taker_fee)
            .ok_or(MarketError::Underflow)?;

        let checkpoint = self.checkpoint(plan.fills.iter().map(|fill| fill.price));
        if let Err(error) =
            self.stage_entry(caller, side, &plan, None, taker_fee, &entry_asset, entry_amount)
        {
            self.rollback(checkpoint);
            return Err(error);
        }

        let order_id = self.store.next_order_id();
        let proceeds_asset = self.credited_asset(side).clone();
        self.ledger.credit(caller, &proceeds_asset, taker_net);

        debug!(
            %order_id, %caller, %side, %amount, %worst_price,
            matched = plan.fills.len(),
            "market order filled"
        );
        self.observations
            .push(Observation::MarketOrderInserted(MarketOrderInserted {
                order_id,
                owner: caller,
                amount,
                matched: plan.fills,
                worst_price,
                side,
            }));
        Ok(order_id)
    }

    // ───────────────────────── Claim / Cancel ─────────────────────────

    /// Claim a fully filled resting order, paying out its proceeds net of
    /// the maker fee.
    pub fn claim_order(&mut self, caller: AccountId, order_id: OrderId) -> Result<(), MarketError> {
        let order = self.store.get_open(order_id)?.clone();
        if order.owner != caller {
            return Err(MarketError::InvalidCaller { caller });
        }
        let status = claim::evaluate(
            &order,
            &self.book,
            &self.cancellations,
            &self.scaling,
            self.price_precision,
        )?;
        if status != ClaimStatus::FullyClaimable {
            return Err(MarketError::IsNotFullyClaimable { order_id });
        }
        self.settle_full_claim(&order)
    }

    /// Cancel a resting order: settle any filled portion as a claim, refund
    /// the unfilled residual and record it in the cancellation index.
    pub fn cancel_order(&mut self, caller: AccountId, order_id: OrderId) -> Result<(), MarketError> {
        let order = self.store.get_open(order_id)?.clone();
        if order.owner != caller {
            return Err(MarketError::InvalidCaller { caller });
        }
        let status = claim::evaluate(
            &order,
            &self.book,
            &self.cancellations,
            &self.scaling,
            self.price_precision,
        )?;
        if status == ClaimStatus::FullyClaimable {
            // Nothing left to pull from the book.
            return self.settle_full_claim(&order);
        }

        let covered = status.claimable(&order);
        let residual = order
            .amount
            .checked_sub(covered)
            .ok_or(MarketError::Underflow)?;
        let raw = self
            .scaling
            .scale_down(residual, order.price, self.price_precision)?;
        let refund = match order.side {
            Side::Buy => self.quote_value(order.price, residual)?,
            Side::Sell => residual,
        };
        let claimed_gross = self.maker_proceeds(&order, covered)?;
        let claimed_fee = self.fees.maker_fee_on(claimed_gross);
        let claimed_net = claimed_gross
            .checked_sub(claimed_fee)
            .ok_or(MarketError::Underflow)?;

        self.cancellations
            .record(order.price, order.side, order.queue_index, raw)?;
        self.book.pull(order.side, order.price, residual)?;
        self.store.mark_canceled(order_id)?;

        // Claim-then-cancel: filled portion first, then the refund.
        if !covered.is_zero() {
            self.accrue_fee(order.side, claimed_fee)?;
            let proceeds_asset = self.credited_asset(order.side).clone();
            self.ledger.credit(order.owner, &proceeds_asset, claimed_net);
        }
        let refund_asset = self.entry_asset(order.side).clone();
        self.ledger.credit(order.owner, &refund_asset, refund);

        debug!(
            %order_id, owner = %order.owner, %refund, claimed = %claimed_gross,
            "maker order canceled"
        );
        self.observations
            .push(Observation::LimitMakerOrderCanceled(LimitMakerOrderCanceled {
                order_id,
                owner: order.owner,
                price: order.price,
                refund,
                claimed: claimed_gross,
                fee: claimed_fee,
                side: order.side,
            }));
        Ok(())
    }

    // ───────────────────────── Governance ─────────────────────────

    /// Sweep accumulated fees to the governance treasury.
    pub fn collect_fees(&mut self, caller: AccountId) -> Result<(), MarketError> {
        if caller != self.governance {
            return Err(MarketError::InvalidCaller { caller });
        }
        let quote_amount = self.quote_fee_balance;
        let base_amount = self.base_fee_balance;
        self.quote_fee_balance = Amount::zero();
        self.base_fee_balance = Amount::zero();

        let quote_asset = self.quote.clone();
        let base_asset = self.base.clone();
        self.ledger.credit(caller, &quote_asset, quote_amount);
        self.ledger.credit(caller, &base_asset, base_amount);

        info!(%quote_amount, %base_amount, "fees collected");
        self.observations.push(Observation::FeesCollected(FeesCollected {
            treasury: caller,
            quote_amount,
            base_amount,
        }));
        Ok(())
    }

    /// Update fee rates and the price precision. Governance only.
    pub fn update_market_policy(
        &mut self,
        caller: AccountId,
        maker_rate: u32,
        taker_rate: u32,
        price_precision: Price,
    ) -> Result<(), MarketError> {
        if caller != self.governance {
            return Err(MarketError::InvalidCaller { caller });
        }
        if price_precision.is_zero() {
            return Err(MarketError::InvalidPrice { price: price_precision });
        }
        self.fees = FeePolicy::new(maker_rate, taker_rate)?;
        self.price_precision = price_precision;

        info!(maker_rate, taker_rate, %price_precision, "market policy updated");
        self.observations.push(Observation::FeePolicyUpdated(FeePolicyUpdated {
            maker_rate,
            taker_rate,
            price_precision,
        }));
        Ok(())
    }

    // ───────────────────────── Views ─────────────────────────

    pub fn book(&self) -> &PriceBook {
        &self.book
    }

    pub fn order(&self, order_id: OrderId) -> Option<&Order> {
        self.store.get(order_id)
    }

    pub fn cancellations(&self) -> &CancellationIndex {
        &self.cancellations
    }

    pub fn latest_trade_price(&self) -> Option<Price> {
        self.latest_trade_price
    }

    pub fn fee_policy(&self) -> FeePolicy {
        self.fees
    }

    pub fn price_precision(&self) -> Price {
        self.price_precision
    }

    /// Accumulated (quote, base) fee balances since the last collection.
    pub fn fee_balances(&self) -> (Amount, Amount) {
        (self.quote_fee_balance, self.base_fee_balance)
    }

    pub fn scaling(&self) -> &S {
        &self.scaling
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    /// All observations since construction.
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Drain all observations (consume and clear).
    pub fn drain_observations(&mut self) -> Vec<Observation> {
        std::mem::take(&mut self.observations)
    }

    // ───────────────────────── Internal ─────────────────────────

    fn quote_value(&self, price: Price, amount: Amount) -> Result<Amount, MarketError> {
        price
            .quote_value(amount, self.price_precision)
            .ok_or(MarketError::Overflow)
    }

    /// Quote consumed by a plan, summed per level.
    fn plan_quote_cost(&self, plan: &MatchPlan) -> Result<Amount, MarketError> {
        plan.fills.iter().try_fold(Amount::zero(), |sum, fill| {
            let quote = self.quote_value(fill.price, fill.amount)?;
            sum.checked_add(quote).ok_or(MarketError::Overflow)
        })
    }

    fn apply_fills(&mut self, taker_side: Side, plan: &MatchPlan) -> Result<(), MarketError> {
        for fill in &plan.fills {
            self.book.take(taker_side, fill.price, fill.amount)?;
        }
        if let Some(last) = plan.last_price() {
            self.latest_trade_price = Some(last);
        }
        Ok(())
    }

    /// Stage an order entry: book withdrawals, the residual deposit (for
    /// limit orders), the taker-fee accrual, and the ledger debit last.
    /// On any failure the caller restores its checkpoint, so external funds
    /// only move once the internal state is fully written.
    #[allow(clippy::too_many_arguments)]
    fn stage_entry(
        &mut self,
        caller: AccountId,
        side: Side,
        plan: &MatchPlan,
        rest_at: Option<Price>,
        taker_fee: Amount,
        entry_asset: &AssetId,
        entry_amount: Amount,
    ) -> Result<Option<PlacedPosition>, MarketError> {
        self.apply_fills(side, plan)?;
        let position = match rest_at {
            Some(price) if !plan.remaining.is_zero() => {
                Some(self.book.place(side, price, plan.remaining)?)
            }
            _ => None,
        };
        if !plan.is_empty() {
            self.accrue_fee(side, taker_fee)?;
        }
        self.ledger.debit(caller, entry_asset, entry_amount)?;
        Ok(position)
    }

    /// Snapshot everything an entry flow mutates before the ledger debit.
    fn checkpoint(&self, touched: impl IntoIterator<Item = Price>) -> EntryCheckpoint {
        EntryCheckpoint {
            book: self.book.scratch(touched),
            latest_trade_price: self.latest_trade_price,
            quote_fee_balance: self.quote_fee_balance,
            base_fee_balance: self.base_fee_balance,
        }
    }

    fn rollback(&mut self, checkpoint: EntryCheckpoint) {
        self.book.restore(checkpoint.book);
        self.latest_trade_price = checkpoint.latest_trade_price;
        self.quote_fee_balance = checkpoint.quote_fee_balance;
        self.base_fee_balance = checkpoint.base_fee_balance;
    }

    /// Asset a party on `side` is credited with: buys earn base, sells earn
    /// quote.
    fn credited_asset(&self, side: Side) -> &AssetId {
        match side {
            Side::Buy => &self.base,
            Side::Sell => &self.quote,
        }
    }

    /// Asset a party on `side` escrows on entry.
    fn entry_asset(&self, side: Side) -> &AssetId {
        match side {
            Side::Buy => &self.quote,
            Side::Sell => &self.base,
        }
    }

    /// Gross maker proceeds for `base_amount` of a resting order.
    fn maker_proceeds(&self, order: &Order, base_amount: Amount) -> Result<Amount, MarketError> {
        match order.side {
            Side::Buy => Ok(base_amount),
            Side::Sell => self.quote_value(order.price, base_amount),
        }
    }

    /// Fees accrue on the asset the party was credited with.
    fn accrue_fee(&mut self, side: Side, fee: Amount) -> Result<(), MarketError> {
        match side {
            Side::Buy => {
                self.base_fee_balance = self
                    .base_fee_balance
                    .checked_add(fee)
                    .ok_or(MarketError::Overflow)?;
            }
            Side::Sell => {
                self.quote_fee_balance = self
                    .quote_fee_balance
                    .checked_add(fee)
                    .ok_or(MarketError::Overflow)?;
            }
        }
        Ok(())
    }

    fn settle_full_claim(&mut self, order: &Order) -> Result<(), MarketError> {
        let gross = self.maker_proceeds(order, order.amount)?;
        let fee = self.fees.maker_fee_on(gross);
        let net = gross.checked_sub(fee).ok_or(MarketError::Underflow)?;

        self.accrue_fee(order.side, fee)?;
        self.store.mark_claimed(order.order_id)?;
        let proceeds_asset = self.credited_asset(order.side).clone();
        self.ledger.credit(order.owner, &proceeds_asset, net);

        debug!(order_id = %order.order_id, owner = %order.owner, claimed = %gross, "maker order claimed");
        self.observations
            .push(Observation::LimitMakerOrderClaimed(LimitMakerOrderClaimed {
                order_id: order.order_id,
                owner: order.owner,
                price: order.price,
                claimed: gross,
                fee,
                side: order.side,
            }));
        Ok(())
    }
}

/// Pre-debit snapshot of the pair state an order-entry flow stages.
struct EntryCheckpoint {
    book: BookScratch,
    latest_trade_price: Option<Price>,
    quote_fee_balance: Amount,
    base_fee_balance: Amount,
}
