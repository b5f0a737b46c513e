use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Postgres, QueryBuilder, Row};
use uuid::Uuid;

use super::{ListFilter, OrderStore};
use crate::domain::actor::ListScope;
use crate::domain::order::{Order, OrderError, OrderLine, OrderStatistics, OrderStatus};

// ============================================================================
// Postgres Order Store
// ============================================================================
//
// Two tables: orders and order_lines, lines owned by their order with a
// cascading foreign key. Order creation wraps the order row and every line
// row in one transaction; status transitions use a conditional UPDATE guarded
// by the expected current status so concurrent transitions on the same order
// cannot both succeed on stale reads.
//
// ============================================================================

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS orders (
    id          UUID PRIMARY KEY,
    customer_id UUID NOT NULL,
    status      TEXT NOT NULL,
    total       NUMERIC(12, 2) NOT NULL,
    notes       TEXT,
    created_at  TIMESTAMPTZ NOT NULL,
    updated_at  TIMESTAMPTZ NOT NULL
);
CREATE TABLE IF NOT EXISTS order_lines (
    id         UUID PRIMARY KEY,
    order_id   UUID NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
    product_id UUID NOT NULL,
    quantity   INT NOT NULL CHECK (quantity >= 1),
    unit_price NUMERIC(12, 2) NOT NULL CHECK (unit_price >= 0),
    created_at TIMESTAMPTZ NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_order_lines_order_id ON order_lines (order_id);
CREATE INDEX IF NOT EXISTS idx_orders_customer_id ON orders (customer_id);
"#;

const ORDER_COLUMNS: &str = "id, customer_id, status, total, notes, created_at, updated_at";

pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, OrderError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Bootstrap the two order tables. Idempotent.
    pub async fn ensure_schema(&self) -> Result<(), OrderError> {
        for statement in SCHEMA.split(';').filter(|s| !s.trim().is_empty()) {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        tracing::debug!("order schema ensured");
        Ok(())
    }

    fn order_from_row(row: &PgRow) -> Result<Order, OrderError> {
        let status: String = row.try_get("status")?;
        Ok(Order {
            id: row.try_get("id")?,
            customer_id: row.try_get("customer_id")?,
            status: status
                .parse()
                .map_err(|_| OrderError::Persistence(format!("corrupt status column: '{status}'")))?,
            total: row.try_get("total")?,
            notes: row.try_get("notes")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn line_from_row(row: &PgRow) -> Result<OrderLine, OrderError> {
        Ok(OrderLine {
            id: row.try_get("id")?,
            order_id: row.try_get("order_id")?,
            product_id: row.try_get("product_id")?,
            quantity: row.try_get("quantity")?,
            unit_price: row.try_get("unit_price")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn create(&self, order: Order, lines: Vec<OrderLine>) -> Result<(), OrderError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO orders (id, customer_id, status, total, notes, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(order.id)
        .bind(order.customer_id)
        .bind(order.status.as_str())
        .bind(order.total)
        .bind(&order.notes)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;

        for line in &lines {
            sqlx::query(
                "INSERT INTO order_lines (id, order_id, product_id, quantity, unit_price, created_at)
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(line.id)
            .bind(line.order_id)
            .bind(line.product_id)
            .bind(line.quantity)
            .bind(line.unit_price)
            .bind(line.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::debug!(
            order_id = %order.id,
            line_count = lines.len(),
            "order persisted"
        );
        Ok(())
    }

    async fn get(&self, order_id: Uuid) -> Result<Option<Order>, OrderError> {
        let row = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::order_from_row).transpose()
    }

    async fn lines_for(&self, order_id: Uuid) -> Result<Vec<OrderLine>, OrderError> {
        let rows = sqlx::query(
            "SELECT id, order_id, product_id, quantity, unit_price, created_at
             FROM order_lines
             WHERE order_id = $1
             ORDER BY created_at",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::line_from_row).collect()
    }

    async fn list(&self, scope: ListScope, filter: ListFilter) -> Result<Vec<Order>, OrderError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {ORDER_COLUMNS} FROM orders"));
        let mut has_where = false;

        if let ListScope::Customer(customer_id) = scope {
            builder.push(" WHERE customer_id = ").push_bind(customer_id);
            has_where = true;
        }
        if let Some(status) = filter.status {
            builder
                .push(if has_where { " AND " } else { " WHERE " })
                .push("status = ")
                .push_bind(status.as_str());
        }

        builder.push(" ORDER BY created_at DESC");
        if let Some(limit) = filter.limit {
            builder
                .push(" LIMIT ")
                .push_bind(limit)
                .push(" OFFSET ")
                .push_bind(filter.offset);
        }

        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.iter().map(Self::order_from_row).collect()
    }

    async fn update_status_where(
        &self,
        order_id: Uuid,
        expected: OrderStatus,
        new: OrderStatus,
    ) -> Result<bool, OrderError> {
        let result = sqlx::query(
            "UPDATE orders SET status = $1, updated_at = $2 WHERE id = $3 AND status = $4",
        )
        .bind(new.as_str())
        .bind(Utc::now())
        .bind(order_id)
        .bind(expected.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn set_status(&self, order_id: Uuid, new: OrderStatus) -> Result<bool, OrderError> {
        let result = sqlx::query("UPDATE orders SET status = $1, updated_at = $2 WHERE id = $3")
            .bind(new.as_str())
            .bind(Utc::now())
            .bind(order_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn purge(&self, order_id: Uuid) -> Result<bool, OrderError> {
        let mut tx = self.pool.begin().await?;

        // The foreign key cascades, but the explicit delete keeps the purge
        // readable and independent of schema defaults.
        sqlx::query("DELETE FROM order_lines WHERE order_id = $1")
            .bind(order_id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() == 1)
    }

    async fn statistics(&self) -> Result<OrderStatistics, OrderError> {
        let rows = sqlx::query("SELECT status, COUNT(*) AS n FROM orders GROUP BY status")
            .fetch_all(&self.pool)
            .await?;

        let mut by_status: HashMap<OrderStatus, i64> = HashMap::new();
        let mut total_orders = 0i64;
        for row in &rows {
            let status: String = row.try_get("status")?;
            let status = status.parse().map_err(|_| {
                OrderError::Persistence(format!("corrupt status column: '{status}'"))
            })?;
            let count: i64 = row.try_get("n")?;
            by_status.insert(status, count);
            total_orders += count;
        }

        let total_revenue: Decimal = sqlx::query(
            "SELECT COALESCE(SUM(total), 0) AS revenue FROM orders WHERE status = $1",
        )
        .bind(OrderStatus::Completed.as_str())
        .fetch_one(&self.pool)
        .await?
        .try_get("revenue")?;

        Ok(OrderStatistics {
            total_orders,
            by_status,
            total_revenue,
        })
    }
}
