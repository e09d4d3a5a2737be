//! Order store
//!
//! Assigns the monotonic order id for every accepted insert operation and
//! keeps the records of resting maker orders. Fully matched limit orders and
//! market orders consume an id without leaving a record; claim or cancel on
//! such an id reports `UnknownOrder`.

use std::collections::HashMap;
use types::errors::MarketError;
use types::ids::OrderId;
use types::order::Order;

#[derive(Debug, Default)]
pub struct OrderStore {
    orders: HashMap<OrderId, Order>,
    next_id: u64,
}

impl OrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next order id.
    pub fn next_order_id(&mut self) -> OrderId {
        let id = OrderId::from_u64(self.next_id);
        self.next_id += 1;
        id
    }

    /// Store a freshly created resting order.
    pub fn insert(&mut self, order: Order) {
        self.orders.insert(order.order_id, order);
    }

    pub fn get(&self, order_id: OrderId) -> Option<&Order> {
        self.orders.get(&order_id)
    }

    /// Fetch an order that must be open, with the full error taxonomy.
    pub fn get_open(&self, order_id: OrderId) -> Result<&Order, MarketError> {
        let order = self
            .orders
            .get(&order_id)
            .ok_or(MarketError::UnknownOrder { order_id })?;
        if !order.is_open() {
            return Err(MarketError::InvalidOrderStatus {
                order_id,
                status: order.status,
            });
        }
        Ok(order)
    }

    /// Transition an open order to `Claimed`.
    pub fn mark_claimed(&mut self, order_id: OrderId) -> Result<(), MarketError> {
        self.get_open(order_id)?;
        self.orders
            .get_mut(&order_id)
            .expect("checked above")
            .mark_claimed();
        Ok(())
    }

    /// Transition an open order to `Canceled`.
    pub fn mark_canceled(&mut self, order_id: OrderId) -> Result<(), MarketError> {
        self.get_open(order_id)?;
        self.orders
            .get_mut(&order_id)
            .expect("checked above")
            .mark_canceled();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::ids::AccountId;
    use types::numeric::{Amount, Price};
    use types::order::{OrderStatus, Side};

    fn resting_order(store: &mut OrderStore) -> OrderId {
        let order_id = store.next_order_id();
        store.insert(Order::new(
            order_id,
            AccountId::new(),
            Side::Sell,
            Price::from_u64(2000),
            Amount::from_u64(3),
            0,
            Amount::zero(),
        ));
        order_id
    }

    #[test]
    fn test_ids_are_monotonic() {
        let mut store = OrderStore::new();
        assert_eq!(store.next_order_id(), OrderId::from_u64(0));
        assert_eq!(store.next_order_id(), OrderId::from_u64(1));
        assert_eq!(store.next_order_id(), OrderId::from_u64(2));
    }

    #[test]
    fn test_id_consumed_without_record() {
        let mut store = OrderStore::new();
        let id = store.next_order_id();

        assert!(store.get(id).is_none());
        assert_eq!(
            store.get_open(id),
            Err(MarketError::UnknownOrder { order_id: id })
        );
    }

    #[test]
    fn test_get_open_returns_record() {
        let mut store = OrderStore::new();
        let id = resting_order(&mut store);

        let order = store.get_open(id).unwrap();
        assert_eq!(order.amount, Amount::from_u64(3));
    }

    #[test]
    fn test_claim_transition() {
        let mut store = OrderStore::new();
        let id = resting_order(&mut store);

        store.mark_claimed(id).unwrap();
        assert_eq!(store.get(id).unwrap().status, OrderStatus::Claimed);
    }

    #[test]
    fn test_terminal_order_rejects_further_transitions() {
        let mut store = OrderStore::new();
        let id = resting_order(&mut store);
        store.mark_canceled(id).unwrap();

        assert_eq!(
            store.mark_claimed(id),
            Err(MarketError::InvalidOrderStatus {
                order_id: id,
                status: OrderStatus::Canceled,
            })
        );
    }
}
