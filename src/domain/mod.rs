// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Business types and rules, independent of any datastore:
// - `actor`: caller identity, roles, and the capability table
// - `catalog` / `customer`: collaborator lookup traits (external systems)
// - `order`: the order model, its status machine, pricing, and errors
//
// ============================================================================

pub mod actor;
pub mod catalog;
pub mod customer;
pub mod order;
