use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use super::order::OrderError;

// ============================================================================
// Customer Directory - External Collaborator
// ============================================================================
//
// Customer records live in the user-management subsystem. The order engine
// needs exactly two answers from it: does this customer exist, and does the
// customer carry the administrative override flag (used by the cancellation
// path).
//
// ============================================================================

#[async_trait]
pub trait CustomerDirectory: Send + Sync {
    async fn exists(&self, customer_id: Uuid) -> Result<bool, OrderError>;

    /// Whether the customer carries the admin override flag. Unknown
    /// customers are simply not admins.
    async fn is_admin(&self, customer_id: Uuid) -> Result<bool, OrderError>;
}

// ============================================================================
// In-Memory Directory
// ============================================================================

/// Map-backed directory used by unit tests and the demo binary.
#[derive(Default)]
pub struct InMemoryDirectory {
    // customer id -> admin flag
    customers: RwLock<HashMap<Uuid, bool>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, customer_id: Uuid) {
        self.customers
            .write()
            .expect("directory lock poisoned")
            .insert(customer_id, false);
    }

    pub fn register_admin(&self, customer_id: Uuid) {
        self.customers
            .write()
            .expect("directory lock poisoned")
            .insert(customer_id, true);
    }
}

#[async_trait]
impl CustomerDirectory for InMemoryDirectory {
    async fn exists(&self, customer_id: Uuid) -> Result<bool, OrderError> {
        Ok(self
            .customers
            .read()
            .expect("directory lock poisoned")
            .contains_key(&customer_id))
    }

    async fn is_admin(&self, customer_id: Uuid) -> Result<bool, OrderError> {
        Ok(self
            .customers
            .read()
            .expect("directory lock poisoned")
            .get(&customer_id)
            .copied()
            .unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_registered_customer_exists() {
        let directory = InMemoryDirectory::new();
        let id = Uuid::new_v4();
        directory.register(id);

        assert!(directory.exists(id).await.unwrap());
        assert!(!directory.is_admin(id).await.unwrap());
        assert!(!directory.exists(Uuid::new_v4()).await.unwrap());
    }

    #[tokio::test]
    async fn test_admin_flag_is_tracked() {
        let directory = InMemoryDirectory::new();
        let id = Uuid::new_v4();
        directory.register_admin(id);

        assert!(directory.exists(id).await.unwrap());
        assert!(directory.is_admin(id).await.unwrap());
    }
}
