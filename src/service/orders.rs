use std::sync::Arc;

use uuid::Uuid;

use crate::domain::actor::{list_scope, permits, Actor, OrderAction, Role};
use crate::domain::catalog::CatalogLookup;
use crate::domain::customer::CustomerDirectory;
use crate::domain::order::{
    transition, validate_and_price, CartLine, DeleteReceipt, LineView, Order, OrderError,
    OrderLine, OrderPage, OrderStatistics, OrderStatus, OrderWithLines, ProductSummary,
    Transition,
};
use crate::store::{ListFilter, OrderStore};
use crate::utils::retry::{retry_read, RetryConfig};

// ============================================================================
// Order Lifecycle Manager
// ============================================================================
//
// Orchestrates: access policy → cart validation/pricing → state machine →
// order store. Collaborators are injected so every path is testable against
// the in-memory implementations.
//
// ============================================================================

pub struct OrderService {
    store: Arc<dyn OrderStore>,
    catalog: Arc<dyn CatalogLookup>,
    directory: Arc<dyn CustomerDirectory>,
    read_retry: RetryConfig,
}

impl OrderService {
    pub fn new(
        store: Arc<dyn OrderStore>,
        catalog: Arc<dyn CatalogLookup>,
        directory: Arc<dyn CustomerDirectory>,
    ) -> Self {
        Self {
            store,
            catalog,
            directory,
            read_retry: RetryConfig::default(),
        }
    }

    /// Validate and price the cart, then persist the order and all of its
    /// lines atomically at the initial status.
    pub async fn create_order(
        &self,
        customer_id: Uuid,
        cart: Vec<CartLine>,
        notes: Option<String>,
    ) -> Result<OrderWithLines, OrderError> {
        let priced = validate_and_price(
            self.directory.as_ref(),
            self.catalog.as_ref(),
            customer_id,
            &cart,
            notes,
        )
        .await?;

        let order = Order::new(customer_id, priced.total, priced.notes.clone());
        let lines: Vec<OrderLine> = priced
            .lines
            .iter()
            .map(|line| OrderLine::new(order.id, line.product_id, line.quantity, line.unit_price))
            .collect();

        self.store.create(order.clone(), lines.clone()).await?;

        tracing::info!(
            order_id = %order.id,
            customer_id = %customer_id,
            total = %order.total,
            line_count = lines.len(),
            "order created"
        );

        self.enrich(order, lines).await
    }

    /// Order with its lines, each line carrying the product's current display
    /// fields from the catalog.
    pub async fn get_order(&self, order_id: Uuid) -> Result<OrderWithLines, OrderError> {
        let order = self.fetch_order(order_id).await?;
        let lines = self.store.lines_for(order_id).await?;
        self.enrich(order, lines).await
    }

    /// Orders visible to the actor, newest first, optionally filtered by
    /// status and paginated.
    pub async fn list_orders(
        &self,
        actor: &Actor,
        status: Option<OrderStatus>,
        limit: Option<i64>,
        offset: i64,
    ) -> Result<OrderPage, OrderError> {
        let scope = list_scope(actor);
        let orders = self
            .store
            .list(
                scope,
                ListFilter {
                    status,
                    limit,
                    offset,
                },
            )
            .await?;

        let mut out = Vec::with_capacity(orders.len());
        for order in orders {
            let lines = self.store.lines_for(order.id).await?;
            out.push(self.enrich(order, lines).await?);
        }

        Ok(OrderPage {
            total: out.len(),
            orders: out,
        })
    }

    /// Apply a status change on behalf of a staff or admin actor.
    pub async fn update_status(
        &self,
        order_id: Uuid,
        requested: OrderStatus,
        actor: &Actor,
    ) -> Result<OrderWithLines, OrderError> {
        if !permits(actor, OrderAction::ChangeStatus) {
            return Err(OrderError::Forbidden(
                "only staff may change order status".to_string(),
            ));
        }
        self.apply_transition(order_id, requested, actor).await
    }

    /// Customer-initiated cancellation: the order's own customer (or an
    /// admin-flagged one) may cancel while the order is still in progress or
    /// preparing.
    pub async fn cancel_order(
        &self,
        order_id: Uuid,
        customer_id: Uuid,
    ) -> Result<OrderWithLines, OrderError> {
        let order = self.fetch_order(order_id).await?;

        if !self.directory.exists(customer_id).await? {
            return Err(OrderError::CustomerNotFound(customer_id));
        }
        let is_admin = self.directory.is_admin(customer_id).await?;
        if order.customer_id != customer_id && !is_admin {
            return Err(OrderError::Forbidden(
                "only the order's customer may cancel it".to_string(),
            ));
        }
        if !matches!(
            order.status,
            OrderStatus::InProgress | OrderStatus::Preparing
        ) {
            return Err(OrderError::InvalidTransition {
                from: order.status,
                to: OrderStatus::Cancelled,
            });
        }

        let actor = Actor::new(customer_id, Role::Customer, is_admin);
        self.apply_transition(order_id, OrderStatus::Cancelled, &actor)
            .await
    }

    /// Remove an order. `permanent` purges the order and all of its lines
    /// irreversibly; otherwise the order is soft-removed by setting its
    /// status to cancelled.
    pub async fn delete_order(
        &self,
        order_id: Uuid,
        permanent: bool,
        actor: &Actor,
    ) -> Result<DeleteReceipt, OrderError> {
        if !permits(actor, OrderAction::Delete) {
            return Err(OrderError::Forbidden(
                "only administrators may remove orders".to_string(),
            ));
        }

        if permanent {
            if !self.store.purge(order_id).await? {
                return Err(OrderError::OrderNotFound(order_id));
            }
            tracing::info!(order_id = %order_id, actor = %actor.user_id, "order purged");
            return Ok(DeleteReceipt {
                message: "order permanently removed".to_string(),
                order: None,
            });
        }

        // Soft removal is an administrative override and bypasses the
        // transition table.
        if !self.store.set_status(order_id, OrderStatus::Cancelled).await? {
            return Err(OrderError::OrderNotFound(order_id));
        }
        let order = self.fetch_order(order_id).await?;
        tracing::info!(order_id = %order_id, actor = %actor.user_id, "order soft-removed");
        Ok(DeleteReceipt {
            message: "order cancelled".to_string(),
            order: Some(order),
        })
    }

    /// Order counts per status and revenue over completed orders. Staff and
    /// admins only.
    pub async fn statistics(&self, actor: &Actor) -> Result<OrderStatistics, OrderError> {
        if !permits(actor, OrderAction::ViewStatistics) {
            return Err(OrderError::Forbidden(
                "only staff may view order statistics".to_string(),
            ));
        }
        self.store.statistics().await
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Read an order, retrying a transient datastore failure once.
    async fn fetch_order(&self, order_id: Uuid) -> Result<Order, OrderError> {
        retry_read(&self.read_retry, || self.store.get(order_id))
            .await?
            .ok_or(OrderError::OrderNotFound(order_id))
    }

    /// Run the state machine and persist the outcome with a conditional
    /// write. A lost precondition means another caller transitioned (or
    /// purged) the order between our read and write.
    async fn apply_transition(
        &self,
        order_id: Uuid,
        requested: OrderStatus,
        actor: &Actor,
    ) -> Result<OrderWithLines, OrderError> {
        let order = self.fetch_order(order_id).await?;

        match transition(order.status, requested, actor)? {
            Transition::Noop => {
                let lines = self.store.lines_for(order_id).await?;
                self.enrich(order, lines).await
            }
            Transition::Apply(new_status) => {
                let applied = self
                    .store
                    .update_status_where(order_id, order.status, new_status)
                    .await?;

                if !applied {
                    return match self.store.get(order_id).await? {
                        Some(current) => Err(OrderError::InvalidTransition {
                            from: current.status,
                            to: new_status,
                        }),
                        None => Err(OrderError::OrderNotFound(order_id)),
                    };
                }

                tracing::info!(
                    order_id = %order_id,
                    from = %order.status,
                    to = %new_status,
                    actor = %actor.user_id,
                    "order status updated"
                );

                let updated = self.fetch_order(order_id).await?;
                let lines = self.store.lines_for(order_id).await?;
                self.enrich(updated, lines).await
            }
        }
    }

    async fn enrich(
        &self,
        order: Order,
        lines: Vec<OrderLine>,
    ) -> Result<OrderWithLines, OrderError> {
        let mut views = Vec::with_capacity(lines.len());
        for line in lines {
            let product = self
                .catalog
                .find_product(line.product_id)
                .await?
                .map(ProductSummary::from);
            views.push(LineView::new(line, product));
        }
        Ok(OrderWithLines { order, lines: views })
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
