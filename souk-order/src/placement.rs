use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use souk_catalog::{CatalogStore, Product};
use souk_core::DomainError;

use crate::models::{CartLine, Order};
use crate::repository::{NewOrder, NewOrderLine, OrderStore};

/// Order placement engine: validates a cart, partitions it by seller and
/// reserves stock. The storage layer commits every partition's decrement
/// and insert in one transaction, so a cart yields its full set of
/// per-seller orders or nothing.
#[derive(Clone)]
pub struct PlacementEngine {
    catalog: Arc<dyn CatalogStore>,
    orders: Arc<dyn OrderStore>,
}

impl PlacementEngine {
    pub fn new(catalog: Arc<dyn CatalogStore>, orders: Arc<dyn OrderStore>) -> Self {
        Self { catalog, orders }
    }

    pub async fn place_order(
        &self,
        buyer_id: Uuid,
        lines: &[CartLine],
    ) -> Result<Vec<Order>, DomainError> {
        if lines.is_empty() {
            return Err(DomainError::validation(
                "order must contain at least one item",
            ));
        }
        if lines.iter().any(|line| line.quantity <= 0) {
            return Err(DomainError::validation("quantity must be positive"));
        }

        // Duplicate references to one product are a single reservation.
        let merged = merge_lines(lines);
        let ids: Vec<Uuid> = merged.iter().map(|line| line.product_id).collect();

        // One batch read resolves prices and seller ownership. Soft-deleted
        // products are absent from it, so the cardinality check catches
        // both unknown and deleted references.
        let products = self.catalog.find_products(&ids).await?;
        if products.len() != ids.len() {
            return Err(DomainError::not_found("one or more products not found"));
        }
        let by_id: HashMap<Uuid, &Product> = products.iter().map(|p| (p.id, p)).collect();

        // Fast pre-check against the snapshot. The floor-guarded decrement
        // inside the reservation transaction is the authoritative check;
        // this one just rejects hopeless carts without opening it.
        for line in &merged {
            let product = by_id[&line.product_id];
            if product.quantity < line.quantity {
                return Err(DomainError::InsufficientStock {
                    product_id: product.id,
                    requested: line.quantity,
                    available: product.quantity,
                });
            }
        }

        let new_orders = partition_by_seller(buyer_id, &merged, &by_id);
        let placed = self.orders.place_orders(&new_orders).await?;
        tracing::info!(
            %buyer_id,
            orders = placed.len(),
            lines = merged.len(),
            "cart placed"
        );
        Ok(placed)
    }
}

/// Sum quantities of repeated product references, preserving first-seen
/// order.
fn merge_lines(lines: &[CartLine]) -> Vec<CartLine> {
    let mut merged: Vec<CartLine> = Vec::with_capacity(lines.len());
    for line in lines {
        match merged.iter_mut().find(|l| l.product_id == line.product_id) {
            Some(existing) => existing.quantity += line.quantity,
            None => merged.push(*line),
        }
    }
    merged
}

/// Group validated lines by owning seller, snapshotting the unit price and
/// totalling each partition. Partitions keep the cart's first-seen seller
/// order.
fn partition_by_seller(
    buyer_id: Uuid,
    lines: &[CartLine],
    products: &HashMap<Uuid, &Product>,
) -> Vec<NewOrder> {
    let mut partitions: Vec<NewOrder> = Vec::new();
    for line in lines {
        let product = products[&line.product_id];
        let order_line = NewOrderLine {
            product_id: product.id,
            quantity: line.quantity,
            price_cents: product.price_cents,
        };
        match partitions
            .iter_mut()
            .find(|p| p.seller_id == product.seller_id)
        {
            Some(partition) => {
                partition.total_cents += order_line.price_cents * order_line.quantity;
                partition.lines.push(order_line);
            }
            None => partitions.push(NewOrder {
                buyer_id,
                seller_id: product.seller_id,
                total_cents: order_line.price_cents * order_line.quantity,
                lines: vec![order_line],
            }),
        }
    }
    partitions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_sums_duplicate_product_references() {
        let id_a = Uuid::new_v4();
        let id_b = Uuid::new_v4();
        let lines = [
            CartLine { product_id: id_a, quantity: 2 },
            CartLine { product_id: id_b, quantity: 1 },
            CartLine { product_id: id_a, quantity: 3 },
        ];

        let merged = merge_lines(&lines);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].product_id, id_a);
        assert_eq!(merged[0].quantity, 5);
        assert_eq!(merged[1].product_id, id_b);
        assert_eq!(merged[1].quantity, 1);
    }
}
