use uuid::Uuid;

use super::status::OrderStatus;
use crate::utils::retry::IsTransient;

// ============================================================================
// Order Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("invalid order data: {0}")]
    Validation(String),

    #[error("customer not found: {0}")]
    CustomerNotFound(Uuid),

    #[error("product not found: {0}")]
    ProductNotFound(Uuid),

    #[error("product '{0}' is not available")]
    ProductUnavailable(String),

    #[error("order not found: {0}")]
    OrderNotFound(Uuid),

    #[error("transition from '{from}' to '{to}' is not permitted")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("datastore failure: {0}")]
    Persistence(String),
}

impl From<sqlx::Error> for OrderError {
    fn from(err: sqlx::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}

impl IsTransient for OrderError {
    /// Only datastore failures are worth retrying; every business-rule error
    /// is deterministic.
    fn is_transient(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }
}
