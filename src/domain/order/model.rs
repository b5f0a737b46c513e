use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::status::OrderStatus;
use crate::domain::catalog::Product;

// ============================================================================
// Order Model
// ============================================================================
//
// Invariants:
// - An order has at least one line.
// - `total` equals the sum of its lines' subtotals, fixed at creation time
//   and never recomputed afterward.
// - `unit_price` is a snapshot of the catalog price at creation; later
//   catalog changes must not alter historical orders.
//
// ============================================================================

/// Free-text notes are bounded to keep order records small.
pub const MAX_NOTES_LEN: usize = 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub status: OrderStatus,
    pub total: Decimal,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// New order at the initial status. The id is assigned here and is
    /// immutable once persisted.
    pub fn new(customer_id: Uuid, total: Decimal, notes: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            customer_id,
            status: OrderStatus::InProgress,
            total,
            notes,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    /// Catalog price at order-creation time, never re-read afterward.
    pub unit_price: Decimal,
    pub created_at: DateTime<Utc>,
}

impl OrderLine {
    pub fn new(order_id: Uuid, product_id: Uuid, quantity: i32, unit_price: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id,
            product_id,
            quantity,
            unit_price,
            created_at: Utc::now(),
        }
    }

    pub fn subtotal(&self) -> Decimal {
        Decimal::from(self.quantity) * self.unit_price
    }
}

/// Raw cart entry as submitted by the caller, before validation and pricing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: Uuid,
    pub quantity: i32,
}

/// A validated cart line with the price snapshot applied.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedLine {
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
}

impl PricedLine {
    pub fn subtotal(&self) -> Decimal {
        Decimal::from(self.quantity) * self.unit_price
    }
}

/// Output of the cart validator: everything needed to persist an order.
#[derive(Debug, Clone)]
pub struct PricedOrder {
    pub customer_id: Uuid,
    pub lines: Vec<PricedLine>,
    pub total: Decimal,
    pub notes: Option<String>,
}

// ============================================================================
// View Types
// ============================================================================

/// Product display fields attached to a line when an order is viewed. Read
/// live from the catalog at query time, unlike the frozen unit price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: Uuid,
    pub name: String,
    pub image: Option<String>,
    pub category: Option<String>,
}

impl From<Product> for ProductSummary {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            image: product.image,
            category: product.category,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LineView {
    #[serde(flatten)]
    pub line: OrderLine,
    pub subtotal: Decimal,
    /// `None` when the product has since been removed from the catalog.
    pub product: Option<ProductSummary>,
}

impl LineView {
    pub fn new(line: OrderLine, product: Option<ProductSummary>) -> Self {
        let subtotal = line.subtotal();
        Self {
            line,
            subtotal,
            product,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderWithLines {
    #[serde(flatten)]
    pub order: Order,
    pub lines: Vec<LineView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderPage {
    pub orders: Vec<OrderWithLines>,
    pub total: usize,
}

/// Outcome of `delete_order`; the soft path returns the cancelled order.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteReceipt {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<Order>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderStatistics {
    pub total_orders: i64,
    pub by_status: HashMap<OrderStatus, i64>,
    /// Sum of `total` across completed orders.
    pub total_revenue: Decimal,
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_subtotal_is_quantity_times_unit_price() {
        let line = OrderLine::new(Uuid::new_v4(), Uuid::new_v4(), 3, Decimal::new(475, 2));
        assert_eq!(line.subtotal(), Decimal::new(1425, 2));
    }

    #[test]
    fn test_new_order_starts_in_progress() {
        let order = Order::new(Uuid::new_v4(), Decimal::new(1900, 2), None);
        assert_eq!(order.status, OrderStatus::InProgress);
        assert_eq!(order.created_at, order.updated_at);
    }

    #[test]
    fn test_order_serializes_status_as_snake_case() {
        let order = Order::new(Uuid::new_v4(), Decimal::ZERO, Some("no onions".to_string()));
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["status"], "in_progress");
        assert_eq!(json["notes"], "no onions");
    }
}
