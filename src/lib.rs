// ============================================================================
// Snackbar Orders - Order Lifecycle Engine
// ============================================================================
//
// Core of an order-taking platform for a food-service counter:
// - Cart validation and pricing at order-creation time
// - Order status state machine with role-gated transitions
// - Durable order store (Postgres) with an in-memory fake for tests
// - Lifecycle manager orchestrating the pieces behind an access policy
//
// Catalog and customer records are external collaborators, consumed only
// through the lookup traits in `domain`.
//
// ============================================================================

pub mod domain;
pub mod service;
pub mod store;
pub mod utils;

pub use domain::actor::{Actor, Role};
pub use domain::catalog::{CatalogLookup, InMemoryCatalog, Product};
pub use domain::customer::{CustomerDirectory, InMemoryDirectory};
pub use domain::order::{CartLine, Order, OrderError, OrderLine, OrderStatus, OrderWithLines};
pub use service::orders::OrderService;
pub use store::memory::InMemoryOrderStore;
pub use store::postgres::PgOrderStore;
pub use store::OrderStore;
