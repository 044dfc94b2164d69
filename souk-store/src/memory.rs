use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use souk_catalog::repository::{CatalogStore, ProductFilter};
use souk_catalog::stock::{self, StockChange};
use souk_catalog::Product;
use souk_core::DomainError;
use souk_order::repository::{NewOrder, OrderStore};
use souk_order::{Order, OrderItem, OrderStatus, PaymentStatus};

/// In-memory store used by tests and local runs. One mutex section per
/// operation gives it the same atomicity contract as the Postgres
/// transactions: `place_orders` either applies every decrement and insert
/// or leaves the maps untouched.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    products: HashMap<Uuid, Product>,
    orders: Vec<Order>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("memory store mutex poisoned")
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn insert_product(&self, product: &Product) -> Result<(), DomainError> {
        self.lock().products.insert(product.id, product.clone());
        Ok(())
    }

    async fn get_product(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        Ok(self.lock().products.get(&id).cloned())
    }

    async fn find_products(&self, ids: &[Uuid]) -> Result<Vec<Product>, DomainError> {
        let inner = self.lock();
        Ok(ids
            .iter()
            .filter_map(|id| inner.products.get(id))
            .filter(|p| !p.is_deleted())
            .cloned()
            .collect())
    }

    async fn update_product(&self, product: &Product) -> Result<(), DomainError> {
        self.lock().products.insert(product.id, product.clone());
        Ok(())
    }

    async fn apply_stock_change(
        &self,
        id: Uuid,
        change: StockChange,
    ) -> Result<Product, DomainError> {
        let mut inner = self.lock();
        let product = inner
            .products
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("product not found"))?;

        let new_quantity = stock::target_quantity(product.quantity, change);
        if new_quantity < 0 {
            return Err(DomainError::InsufficientStock {
                product_id: id,
                requested: product.quantity - new_quantity,
                available: product.quantity,
            });
        }

        product.status = stock::derive_status(product.status, new_quantity);
        product.quantity = new_quantity;
        product.updated_at = Utc::now();
        Ok(product.clone())
    }

    async fn set_low_stock_threshold(
        &self,
        id: Uuid,
        threshold: i64,
    ) -> Result<Product, DomainError> {
        let mut inner = self.lock();
        let product = inner
            .products
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("product not found"))?;
        product.low_stock_threshold = threshold;
        product.updated_at = Utc::now();
        Ok(product.clone())
    }

    async fn list_low_stock(&self, seller_id: Option<Uuid>) -> Result<Vec<Product>, DomainError> {
        let inner = self.lock();
        let mut products: Vec<Product> = inner
            .products
            .values()
            .filter(|p| !p.is_deleted())
            .filter(|p| p.quantity <= p.low_stock_threshold)
            .filter(|p| seller_id.is_none_or(|seller| p.seller_id == seller))
            .cloned()
            .collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(products)
    }

    async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, DomainError> {
        let inner = self.lock();
        let mut products: Vec<Product> = inner
            .products
            .values()
            .filter(|p| !p.is_deleted())
            .filter(|p| filter.seller_id.is_none_or(|seller| p.seller_id == seller))
            .filter(|p| filter.status.is_none_or(|status| p.status == status))
            .cloned()
            .collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(products)
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn place_orders(&self, orders: &[NewOrder]) -> Result<Vec<Order>, DomainError> {
        let mut inner = self.lock();
        let now = Utc::now();

        // Stage every decrement against a copy; swap it in only when the
        // whole cart fits. A failure on any line leaves the live map as it
        // was.
        let mut staged = inner.products.clone();
        for new_order in orders {
            for line in &new_order.lines {
                let product = staged
                    .get_mut(&line.product_id)
                    .filter(|p| !p.is_deleted())
                    .ok_or_else(|| DomainError::not_found("one or more products not found"))?;
                if product.quantity < line.quantity {
                    return Err(DomainError::InsufficientStock {
                        product_id: line.product_id,
                        requested: line.quantity,
                        available: product.quantity,
                    });
                }
                product.quantity -= line.quantity;
                product.updated_at = now;
            }
        }
        inner.products = staged;

        let mut placed = Vec::with_capacity(orders.len());
        for new_order in orders {
            let order_id = Uuid::new_v4();
            let items = new_order
                .lines
                .iter()
                .map(|line| OrderItem {
                    id: Uuid::new_v4(),
                    order_id,
                    product_id: line.product_id,
                    quantity: line.quantity,
                    price_cents: line.price_cents,
                })
                .collect();
            let order = Order {
                id: order_id,
                buyer_id: new_order.buyer_id,
                seller_id: new_order.seller_id,
                total_cents: new_order.total_cents,
                status: OrderStatus::New,
                payment_status: PaymentStatus::Pending,
                items,
                created_at: now,
                updated_at: now,
            };
            inner.orders.push(order.clone());
            placed.push(order);
        }
        Ok(placed)
    }

    async fn get_order(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        Ok(self.lock().orders.iter().find(|o| o.id == id).cloned())
    }

    async fn update_order_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<Order, DomainError> {
        let mut inner = self.lock();
        let order = inner
            .orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(|| DomainError::not_found("order not found"))?;
        order.status = status;
        order.updated_at = Utc::now();
        Ok(order.clone())
    }

    async fn list_orders_for_buyer(&self, buyer_id: Uuid) -> Result<Vec<Order>, DomainError> {
        let inner = self.lock();
        Ok(inner
            .orders
            .iter()
            .rev()
            .filter(|o| o.buyer_id == buyer_id)
            .cloned()
            .collect())
    }

    async fn list_orders_for_seller(&self, seller_id: Uuid) -> Result<Vec<Order>, DomainError> {
        let inner = self.lock();
        Ok(inner
            .orders
            .iter()
            .rev()
            .filter(|o| o.seller_id == seller_id)
            .cloned()
            .collect())
    }
}
