use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::actor::ListScope;
use crate::domain::order::{Order, OrderError, OrderLine, OrderStatistics, OrderStatus};

// ============================================================================
// Order Store - Persistence Seam
// ============================================================================
//
// Durable record of orders and their lines. Implementations perform
// persistence only; every business rule lives above this trait, which keeps
// the store substitutable (the in-memory fake in `memory` honors the same
// semantics as the Postgres store).
//
// ============================================================================

pub mod memory;
pub mod postgres;

#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub status: Option<OrderStatus>,
    pub limit: Option<i64>,
    pub offset: i64,
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist an order together with all of its lines as one atomic unit.
    /// A failure partway through must leave no partial order visible.
    async fn create(&self, order: Order, lines: Vec<OrderLine>) -> Result<(), OrderError>;

    async fn get(&self, order_id: Uuid) -> Result<Option<Order>, OrderError>;

    async fn lines_for(&self, order_id: Uuid) -> Result<Vec<OrderLine>, OrderError>;

    /// Orders in scope, newest first.
    async fn list(&self, scope: ListScope, filter: ListFilter) -> Result<Vec<Order>, OrderError>;

    /// Conditional status write: applied only while the stored status still
    /// equals `expected`, refreshing `updated_at`. Returns whether the
    /// precondition held, which is the lost-update guard for concurrent
    /// transitions on the same order.
    async fn update_status_where(
        &self,
        order_id: Uuid,
        expected: OrderStatus,
        new: OrderStatus,
    ) -> Result<bool, OrderError>;

    /// Unconditional status write (soft-removal path). Returns `false` when
    /// the order does not exist.
    async fn set_status(&self, order_id: Uuid, new: OrderStatus) -> Result<bool, OrderError>;

    /// Irreversibly remove the order and all of its lines. Returns `false`
    /// when the order does not exist.
    async fn purge(&self, order_id: Uuid) -> Result<bool, OrderError>;

    /// Count of orders per status plus revenue over completed orders.
    async fn statistics(&self) -> Result<OrderStatistics, OrderError>;
}
