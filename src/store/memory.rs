use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ListFilter, OrderStore};
use crate::domain::actor::ListScope;
use crate::domain::order::{Order, OrderError, OrderLine, OrderStatistics, OrderStatus};

// ============================================================================
// In-Memory Order Store
// ============================================================================
//
// Deterministic stand-in for the Postgres store, used by unit tests and the
// demo binary. The conditional-write and ordering semantics match the real
// store so business logic can be tested without a database.
//
// ============================================================================

#[derive(Default)]
struct Inner {
    orders: HashMap<Uuid, Order>,
    // order id -> its lines, in insertion order
    lines: HashMap<Uuid, Vec<OrderLine>>,
}

#[derive(Default)]
pub struct InMemoryOrderStore {
    inner: RwLock<Inner>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn create(&self, order: Order, lines: Vec<OrderLine>) -> Result<(), OrderError> {
        let mut inner = self.inner.write().await;
        inner.lines.insert(order.id, lines);
        inner.orders.insert(order.id, order);
        Ok(())
    }

    async fn get(&self, order_id: Uuid) -> Result<Option<Order>, OrderError> {
        Ok(self.inner.read().await.orders.get(&order_id).cloned())
    }

    async fn lines_for(&self, order_id: Uuid) -> Result<Vec<OrderLine>, OrderError> {
        Ok(self
            .inner
            .read()
            .await
            .lines
            .get(&order_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn list(&self, scope: ListScope, filter: ListFilter) -> Result<Vec<Order>, OrderError> {
        let inner = self.inner.read().await;

        let mut orders: Vec<Order> = inner
            .orders
            .values()
            .filter(|order| match scope {
                ListScope::All => true,
                ListScope::Customer(customer_id) => order.customer_id == customer_id,
            })
            .filter(|order| filter.status.map_or(true, |status| order.status == status))
            .cloned()
            .collect();

        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let offset = filter.offset.max(0) as usize;
        let orders = orders.into_iter().skip(offset);
        Ok(match filter.limit {
            Some(limit) => orders.take(limit.max(0) as usize).collect(),
            None => orders.collect(),
        })
    }

    async fn update_status_where(
        &self,
        order_id: Uuid,
        expected: OrderStatus,
        new: OrderStatus,
    ) -> Result<bool, OrderError> {
        let mut inner = self.inner.write().await;
        match inner.orders.get_mut(&order_id) {
            Some(order) if order.status == expected => {
                order.status = new;
                order.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn set_status(&self, order_id: Uuid, new: OrderStatus) -> Result<bool, OrderError> {
        let mut inner = self.inner.write().await;
        match inner.orders.get_mut(&order_id) {
            Some(order) => {
                order.status = new;
                order.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn purge(&self, order_id: Uuid) -> Result<bool, OrderError> {
        let mut inner = self.inner.write().await;
        inner.lines.remove(&order_id);
        Ok(inner.orders.remove(&order_id).is_some())
    }

    async fn statistics(&self) -> Result<OrderStatistics, OrderError> {
        let inner = self.inner.read().await;

        let mut by_status: HashMap<OrderStatus, i64> = HashMap::new();
        let mut total_revenue = Decimal::ZERO;
        for order in inner.orders.values() {
            *by_status.entry(order.status).or_insert(0) += 1;
            if order.status == OrderStatus::Completed {
                total_revenue += order.total;
            }
        }

        Ok(OrderStatistics {
            total_orders: inner.orders.len() as i64,
            by_status,
            total_revenue,
        })
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
