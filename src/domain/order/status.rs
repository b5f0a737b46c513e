use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::OrderError;
use crate::domain::actor::{Actor, Role};

// ============================================================================
// Order Status State Machine
// ============================================================================
//
// Pure decision function: given the current status, the requested status and
// the acting user, yield the transition to apply or reject the request. The
// caller persists the result with a conditional write so two concurrent
// transitions cannot both succeed on a stale read.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    InProgress,
    Preparing,
    Ready,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::InProgress,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    /// Wire and column representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Terminal statuses admit no further transition.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Statuses reachable by ordinary fulfillment staff from `self`.
    fn staff_targets(&self) -> &'static [OrderStatus] {
        match self {
            OrderStatus::InProgress => &[OrderStatus::Preparing, OrderStatus::Cancelled],
            OrderStatus::Preparing => &[OrderStatus::Ready, OrderStatus::Cancelled],
            OrderStatus::Ready => &[OrderStatus::Completed],
            OrderStatus::Completed | OrderStatus::Cancelled => &[],
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| OrderError::Validation(format!("unknown order status: '{s}'")))
    }
}

/// Outcome of a legal transition request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Requested status equals the current one; accepted without a write.
    Noop,
    /// Move to the new status.
    Apply(OrderStatus),
}

/// Decide whether `actor` may move an order from `current` to `requested`.
///
/// Managers may jump to `Completed` or `Cancelled` from any non-terminal
/// status; everyone else follows the adjacency table. Whether the actor may
/// request a transition at all is the access policy's concern, checked before
/// this function is reached.
pub fn transition(
    current: OrderStatus,
    requested: OrderStatus,
    actor: &Actor,
) -> Result<Transition, OrderError> {
    if requested == current {
        return Ok(Transition::Noop);
    }

    if actor.role == Role::Manager {
        let target_allowed = matches!(requested, OrderStatus::Completed | OrderStatus::Cancelled);
        if current.is_terminal() || !target_allowed {
            return Err(OrderError::InvalidTransition {
                from: current,
                to: requested,
            });
        }
        return Ok(Transition::Apply(requested));
    }

    if current.staff_targets().contains(&requested) {
        Ok(Transition::Apply(requested))
    } else {
        Err(OrderError::InvalidTransition {
            from: current,
            to: requested,
        })
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn attendant() -> Actor {
        Actor::attendant(Uuid::new_v4())
    }

    fn manager() -> Actor {
        Actor::manager(Uuid::new_v4())
    }

    #[test]
    fn test_staff_follows_adjacency_table() {
        let actor = attendant();

        assert_eq!(
            transition(OrderStatus::InProgress, OrderStatus::Preparing, &actor).unwrap(),
            Transition::Apply(OrderStatus::Preparing)
        );
        assert_eq!(
            transition(OrderStatus::InProgress, OrderStatus::Cancelled, &actor).unwrap(),
            Transition::Apply(OrderStatus::Cancelled)
        );
        assert_eq!(
            transition(OrderStatus::Preparing, OrderStatus::Ready, &actor).unwrap(),
            Transition::Apply(OrderStatus::Ready)
        );
        assert_eq!(
            transition(OrderStatus::Ready, OrderStatus::Completed, &actor).unwrap(),
            Transition::Apply(OrderStatus::Completed)
        );
    }

    #[test]
    fn test_staff_cannot_skip_intermediate_statuses() {
        let actor = attendant();

        for target in [OrderStatus::Ready, OrderStatus::Completed] {
            let err = transition(OrderStatus::InProgress, target, &actor).unwrap_err();
            assert!(matches!(err, OrderError::InvalidTransition { .. }));
        }
    }

    #[test]
    fn test_terminal_statuses_are_immutable() {
        for current in [OrderStatus::Completed, OrderStatus::Cancelled] {
            for requested in OrderStatus::ALL {
                if requested == current {
                    continue;
                }
                for actor in [attendant(), manager()] {
                    let err = transition(current, requested, &actor).unwrap_err();
                    assert!(matches!(err, OrderError::InvalidTransition { .. }));
                }
            }
        }
    }

    #[test]
    fn test_manager_may_complete_or_cancel_from_any_active_status() {
        let actor = manager();

        for current in [
            OrderStatus::InProgress,
            OrderStatus::Preparing,
            OrderStatus::Ready,
        ] {
            assert_eq!(
                transition(current, OrderStatus::Completed, &actor).unwrap(),
                Transition::Apply(OrderStatus::Completed)
            );
            assert_eq!(
                transition(current, OrderStatus::Cancelled, &actor).unwrap(),
                Transition::Apply(OrderStatus::Cancelled)
            );
        }
    }

    #[test]
    fn test_manager_may_not_target_intermediate_statuses() {
        let actor = manager();

        for target in [OrderStatus::Preparing, OrderStatus::Ready] {
            let err = transition(OrderStatus::InProgress, target, &actor).unwrap_err();
            assert!(matches!(err, OrderError::InvalidTransition { .. }));
        }
    }

    #[test]
    fn test_same_status_request_is_a_noop_for_everyone() {
        let customer = Actor::customer(Uuid::new_v4());

        for status in OrderStatus::ALL {
            for actor in [attendant(), manager(), customer.clone()] {
                assert_eq!(transition(status, status, &actor).unwrap(), Transition::Noop);
            }
        }
    }

    #[test]
    fn test_customer_cancellation_resolves_to_staff_rule() {
        let actor = Actor::customer(Uuid::new_v4());

        assert_eq!(
            transition(OrderStatus::InProgress, OrderStatus::Cancelled, &actor).unwrap(),
            Transition::Apply(OrderStatus::Cancelled)
        );
        assert_eq!(
            transition(OrderStatus::Preparing, OrderStatus::Cancelled, &actor).unwrap(),
            Transition::Apply(OrderStatus::Cancelled)
        );
        let err = transition(OrderStatus::Ready, OrderStatus::Cancelled, &actor).unwrap_err();
        assert!(matches!(err, OrderError::InvalidTransition { .. }));
    }

    #[test]
    fn test_status_string_round_trip() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
        assert!("shipped".parse::<OrderStatus>().is_err());
    }
}
