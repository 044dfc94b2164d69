use std::sync::Arc;

use uuid::Uuid;

use souk_core::{Actor, DomainError};

use crate::models::{Order, OrderStatus};
use crate::repository::OrderStore;

/// Order lifecycle engine. Two authorization planes: the owning seller may
/// transition their own orders, a platform operator may transition any.
/// The status graph itself is unrestricted; any value is reachable from
/// any other. Payment status is out of scope here.
#[derive(Clone)]
pub struct LifecycleEngine {
    orders: Arc<dyn OrderStore>,
}

impl LifecycleEngine {
    pub fn new(orders: Arc<dyn OrderStore>) -> Self {
        Self { orders }
    }

    pub async fn update_status(
        &self,
        actor: Actor,
        order_id: Uuid,
        status: OrderStatus,
    ) -> Result<Order, DomainError> {
        let order = self.require_order(order_id).await?;

        if !actor.is_operator() && order.seller_id != actor.id {
            return Err(DomainError::forbidden(
                "not authorized to update this order",
            ));
        }

        let updated = self.orders.update_order_status(order_id, status).await?;
        tracing::info!(
            %order_id,
            from = order.status.as_str(),
            to = status.as_str(),
            "order status updated"
        );
        Ok(updated)
    }

    /// Detailed view, readable by the order's buyer, its seller, or an
    /// operator.
    pub async fn order_details(&self, actor: Actor, order_id: Uuid) -> Result<Order, DomainError> {
        let order = self.require_order(order_id).await?;
        let involved = order.buyer_id == actor.id || order.seller_id == actor.id;
        if !involved && !actor.is_operator() {
            return Err(DomainError::forbidden("not authorized to view this order"));
        }
        Ok(order)
    }

    pub async fn buyer_orders(&self, buyer_id: Uuid) -> Result<Vec<Order>, DomainError> {
        self.orders.list_orders_for_buyer(buyer_id).await
    }

    pub async fn seller_orders(&self, seller_id: Uuid) -> Result<Vec<Order>, DomainError> {
        self.orders.list_orders_for_seller(seller_id).await
    }

    async fn require_order(&self, order_id: Uuid) -> Result<Order, DomainError> {
        self.orders
            .get_order(order_id)
            .await?
            .ok_or_else(|| DomainError::not_found("order not found"))
    }
}
