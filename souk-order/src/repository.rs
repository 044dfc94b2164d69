use async_trait::async_trait;
use uuid::Uuid;

use souk_core::DomainError;

use crate::models::{Order, OrderStatus};

/// One order to be persisted, already partitioned to a single seller and
/// priced from the validation-time snapshot.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub buyer_id: Uuid,
    pub seller_id: Uuid,
    pub total_cents: i64,
    pub lines: Vec<NewOrderLine>,
}

#[derive(Debug, Clone, Copy)]
pub struct NewOrderLine {
    pub product_id: Uuid,
    pub quantity: i64,
    pub price_cents: i64,
}

/// Storage contract for orders.
///
/// `place_orders` is the reservation step: every line's stock decrement and
/// every order/item insert commit together or not at all. A decrement whose
/// floor guard fails aborts the whole batch with `InsufficientStock`; no
/// partial state is ever durable. Stock decrements here apply no status
/// derivation; that rule belongs to the inventory adjustment engine.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn place_orders(&self, orders: &[NewOrder]) -> Result<Vec<Order>, DomainError>;

    async fn get_order(&self, id: Uuid) -> Result<Option<Order>, DomainError>;

    async fn update_order_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<Order, DomainError>;

    /// Buyer's purchase history, newest first.
    async fn list_orders_for_buyer(&self, buyer_id: Uuid) -> Result<Vec<Order>, DomainError>;

    /// Seller's incoming orders, newest first.
    async fn list_orders_for_seller(&self, seller_id: Uuid) -> Result<Vec<Order>, DomainError>;
}
