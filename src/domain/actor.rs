use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Actor & Access Policy
// ============================================================================
//
// The caller's identity and role context, supplied by the (external) auth
// layer. The capability table below is the single source of truth for who
// may perform which order operation; both the lifecycle manager and the
// status state machine consume it, so authorization rules are not duplicated
// across call sites.
//
// ============================================================================

/// Role of the caller. The admin override is an orthogonal flag on `Actor`,
/// not a fourth role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    Attendant,
    Manager,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: Role,
    pub is_admin: bool,
}

impl Actor {
    pub fn new(user_id: Uuid, role: Role, is_admin: bool) -> Self {
        Self {
            user_id,
            role,
            is_admin,
        }
    }

    pub fn customer(user_id: Uuid) -> Self {
        Self::new(user_id, Role::Customer, false)
    }

    pub fn attendant(user_id: Uuid) -> Self {
        Self::new(user_id, Role::Attendant, false)
    }

    pub fn manager(user_id: Uuid) -> Self {
        Self::new(user_id, Role::Manager, false)
    }

    pub fn is_staff(&self) -> bool {
        matches!(self.role, Role::Attendant | Role::Manager)
    }
}

/// Order operations gated by the access policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderAction {
    /// See every order rather than only one's own.
    ListAll,
    /// Invoke the state machine with an arbitrary target status.
    ChangeStatus,
    /// Read aggregate order statistics.
    ViewStatistics,
    /// Remove an order, soft or permanent.
    Delete,
}

/// Capability table: may `actor` perform `action`?
pub fn permits(actor: &Actor, action: OrderAction) -> bool {
    match action {
        OrderAction::ListAll | OrderAction::ChangeStatus | OrderAction::ViewStatistics => {
            actor.is_staff() || actor.is_admin
        }
        OrderAction::Delete => actor.is_admin,
    }
}

/// Which orders an actor may see when listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListScope {
    All,
    Customer(Uuid),
}

pub fn list_scope(actor: &Actor) -> ListScope {
    if permits(actor, OrderAction::ListAll) {
        ListScope::All
    } else {
        ListScope::Customer(actor.user_id)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staff_may_change_status_and_view_statistics() {
        let attendant = Actor::attendant(Uuid::new_v4());
        let manager = Actor::manager(Uuid::new_v4());

        for actor in [&attendant, &manager] {
            assert!(permits(actor, OrderAction::ChangeStatus));
            assert!(permits(actor, OrderAction::ViewStatistics));
            assert!(permits(actor, OrderAction::ListAll));
        }
    }

    #[test]
    fn test_plain_customer_has_no_staff_capabilities() {
        let customer = Actor::customer(Uuid::new_v4());

        assert!(!permits(&customer, OrderAction::ChangeStatus));
        assert!(!permits(&customer, OrderAction::ViewStatistics));
        assert!(!permits(&customer, OrderAction::ListAll));
        assert!(!permits(&customer, OrderAction::Delete));
    }

    #[test]
    fn test_admin_flag_grants_staff_capabilities_and_delete() {
        let admin = Actor::new(Uuid::new_v4(), Role::Customer, true);

        assert!(permits(&admin, OrderAction::ChangeStatus));
        assert!(permits(&admin, OrderAction::ViewStatistics));
        assert!(permits(&admin, OrderAction::ListAll));
        assert!(permits(&admin, OrderAction::Delete));
    }

    #[test]
    fn test_staff_without_admin_flag_may_not_delete() {
        assert!(!permits(&Actor::attendant(Uuid::new_v4()), OrderAction::Delete));
        assert!(!permits(&Actor::manager(Uuid::new_v4()), OrderAction::Delete));
    }

    #[test]
    fn test_list_scope_limits_customers_to_their_own_orders() {
        let user_id = Uuid::new_v4();
        let customer = Actor::customer(user_id);

        assert_eq!(list_scope(&customer), ListScope::Customer(user_id));
        assert_eq!(list_scope(&Actor::attendant(Uuid::new_v4())), ListScope::All);
        assert_eq!(
            list_scope(&Actor::new(user_id, Role::Customer, true)),
            ListScope::All
        );
    }
}
