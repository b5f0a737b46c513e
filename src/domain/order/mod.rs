// ============================================================================
// Order Domain - Lifecycle Rules for Orders
// ============================================================================
//
// This module contains ALL order-specific code:
// - Model (Order, OrderLine, cart and view types)
// - Status state machine (OrderStatus, transition rules)
// - Pricing (cart validation with price snapshots)
// - Errors (OrderError taxonomy)
//
// Persistence is behind the `store::OrderStore` trait; nothing here touches
// a database.
//
// ============================================================================

pub mod errors;
pub mod model;
pub mod pricing;
pub mod status;

// Re-export for convenience
pub use errors::*;
pub use model::*;
pub use pricing::*;
pub use status::*;
