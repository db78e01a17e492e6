//! Order ledger: the persistence boundary for orders.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use common::{OrderId, ShowingId, UserId};

use crate::error::{BookingError, Result};
use crate::order::{Order, OrderStatus};

/// Trait for order ledger implementations.
///
/// Append-only creation plus status-field updates; the only business rule
/// enforced here is the order status machine. All implementations must be
/// thread-safe (Send + Sync).
#[async_trait]
pub trait OrderLedger: Send + Sync {
    /// Records a newly created order.
    ///
    /// Fails with `DuplicateOrder` if the id is already recorded and with
    /// `InvalidRequest` if the seat set is empty.
    async fn append(&self, order: Order) -> Result<()>;

    /// Returns an order by id, or None if absent.
    async fn find(&self, id: OrderId) -> Result<Option<Order>>;

    /// Returns all orders placed by a user, oldest first.
    async fn orders_for_user(&self, user: UserId) -> Result<Vec<Order>>;

    /// Returns all orders for a showing, oldest first.
    async fn orders_for_showing(&self, showing: ShowingId) -> Result<Vec<Order>>;

    /// Returns every `Pending` order whose hold deadline is at or before
    /// `at`, oldest first. This is the reaper's work queue.
    async fn expired_pending(&self, at: DateTime<Utc>) -> Result<Vec<Order>>;

    /// Moves an order to a new status, enforcing the status machine.
    ///
    /// Returns the updated order; fails with `OrderNotFound` or
    /// `InvalidState`.
    async fn update_status(&self, id: OrderId, status: OrderStatus) -> Result<Order>;
}

/// In-memory order ledger implementation.
#[derive(Clone, Default)]
pub struct InMemoryOrderLedger {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
}

impl InMemoryOrderLedger {
    /// Creates a new empty in-memory ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of recorded orders.
    pub async fn order_count(&self) -> usize {
        self.orders.read().await.len()
    }
}

#[async_trait]
impl OrderLedger for InMemoryOrderLedger {
    async fn append(&self, order: Order) -> Result<()> {
        if order.seats().is_empty() {
            return Err(BookingError::InvalidRequest {
                reason: "order has no seats".to_string(),
            });
        }

        let mut orders = self.orders.write().await;
        if orders.contains_key(&order.id()) {
            return Err(BookingError::DuplicateOrder(order.id()));
        }
        orders.insert(order.id(), order);
        Ok(())
    }

    async fn find(&self, id: OrderId) -> Result<Option<Order>> {
        Ok(self.orders.read().await.get(&id).cloned())
    }

    async fn orders_for_user(&self, user: UserId) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        let mut matching: Vec<Order> = orders
            .values()
            .filter(|o| o.user() == user)
            .cloned()
            .collect();
        matching.sort_by_key(|o| o.created_at());
        Ok(matching)
    }

    async fn orders_for_showing(&self, showing: ShowingId) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        let mut matching: Vec<Order> = orders
            .values()
            .filter(|o| o.showing() == showing)
            .cloned()
            .collect();
        matching.sort_by_key(|o| o.created_at());
        Ok(matching)
    }

    async fn expired_pending(&self, at: DateTime<Utc>) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        let mut matching: Vec<Order> = orders
            .values()
            .filter(|o| o.is_expired_at(at))
            .cloned()
            .collect();
        matching.sort_by_key(|o| o.created_at());
        Ok(matching)
    }

    async fn update_status(&self, id: OrderId, status: OrderStatus) -> Result<Order> {
        let mut orders = self.orders.write().await;
        let order = orders
            .get_mut(&id)
            .ok_or(BookingError::OrderNotFound(id))?;
        order.transition(status)?;
        Ok(order.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use common::SeatLabel;

    fn order_with_ttl(ttl: Duration) -> Order {
        let now = Utc::now();
        Order::pending(
            OrderId::new(),
            UserId::new(),
            ShowingId::new(),
            vec![SeatLabel::new("1A")],
            now,
            now + ttl,
        )
    }

    #[tokio::test]
    async fn append_and_find() {
        let ledger = InMemoryOrderLedger::new();
        let order = order_with_ttl(Duration::minutes(15));
        let id = order.id();

        ledger.append(order.clone()).await.unwrap();
        assert_eq!(ledger.find(id).await.unwrap(), Some(order));
        assert_eq!(ledger.order_count().await, 1);
    }

    #[tokio::test]
    async fn find_missing_returns_none() {
        let ledger = InMemoryOrderLedger::new();
        assert!(ledger.find(OrderId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_append_is_rejected() {
        let ledger = InMemoryOrderLedger::new();
        let order = order_with_ttl(Duration::minutes(15));

        ledger.append(order.clone()).await.unwrap();
        let result = ledger.append(order).await;
        assert!(matches!(result, Err(BookingError::DuplicateOrder(_))));
    }

    #[tokio::test]
    async fn empty_seat_set_is_rejected() {
        let ledger = InMemoryOrderLedger::new();
        let now = Utc::now();
        let order = Order::pending(
            OrderId::new(),
            UserId::new(),
            ShowingId::new(),
            vec![],
            now,
            now,
        );
        let result = ledger.append(order).await;
        assert!(matches!(result, Err(BookingError::InvalidRequest { .. })));
    }

    #[tokio::test]
    async fn update_status_enforces_the_machine() {
        let ledger = InMemoryOrderLedger::new();
        let order = order_with_ttl(Duration::minutes(15));
        let id = order.id();
        ledger.append(order).await.unwrap();

        let confirmed = ledger
            .update_status(id, OrderStatus::Confirmed)
            .await
            .unwrap();
        assert_eq!(confirmed.status(), OrderStatus::Confirmed);

        // Confirmed orders cannot expire.
        let result = ledger.update_status(id, OrderStatus::Expired).await;
        assert!(matches!(result, Err(BookingError::InvalidState { .. })));
    }

    #[tokio::test]
    async fn update_status_on_missing_order_fails() {
        let ledger = InMemoryOrderLedger::new();
        let result = ledger
            .update_status(OrderId::new(), OrderStatus::Cancelled)
            .await;
        assert!(matches!(result, Err(BookingError::OrderNotFound(_))));
    }

    #[tokio::test]
    async fn expired_pending_scans_by_deadline_not_status() {
        let ledger = InMemoryOrderLedger::new();

        let lapsed = order_with_ttl(Duration::seconds(-5));
        let live = order_with_ttl(Duration::minutes(15));
        let lapsed_id = lapsed.id();
        ledger.append(lapsed).await.unwrap();
        ledger.append(live).await.unwrap();

        let expired = ledger.expired_pending(Utc::now()).await.unwrap();
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].id(), lapsed_id);

        // Once recorded as Expired it leaves the work queue.
        ledger
            .update_status(lapsed_id, OrderStatus::Expired)
            .await
            .unwrap();
        assert!(ledger.expired_pending(Utc::now()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn queries_by_user_and_showing() {
        let ledger = InMemoryOrderLedger::new();
        let user = UserId::new();
        let showing = ShowingId::new();
        let now = Utc::now();

        let order = Order::pending(
            OrderId::new(),
            user,
            showing,
            vec![SeatLabel::new("2A")],
            now,
            now + Duration::minutes(15),
        );
        ledger.append(order).await.unwrap();
        ledger.append(order_with_ttl(Duration::minutes(15))).await.unwrap();

        assert_eq!(ledger.orders_for_user(user).await.unwrap().len(), 1);
        assert_eq!(ledger.orders_for_showing(showing).await.unwrap().len(), 1);
        assert!(ledger.orders_for_user(UserId::new()).await.unwrap().is_empty());
    }
}
