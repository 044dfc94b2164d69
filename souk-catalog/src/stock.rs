use std::sync::Arc;

use uuid::Uuid;

use souk_core::{Actor, DomainError};

use crate::product::{Product, ProductStatus};
use crate::repository::CatalogStore;

/// A quantity mutation requested against one product.
#[derive(Debug, Clone, Copy)]
pub enum StockChange {
    /// Relative adjustment by a nonzero signed amount.
    Adjust { delta: i64 },
    /// Absolute overwrite with a non-negative quantity.
    Set { quantity: i64 },
}

/// Compute the quantity a change would produce, without the floor guard.
pub fn target_quantity(current: i64, change: StockChange) -> i64 {
    match change {
        StockChange::Adjust { delta } => current + delta,
        StockChange::Set { quantity } => quantity,
    }
}

/// The status-derivation rule applied after every quantity change.
///
/// Draining an `Approved` listing marks it `OutOfStock`; restocking an
/// `OutOfStock` listing reverts it to `Approved`. Review states never move:
/// a rejected or unreviewed listing is not resurrected by stock activity.
pub fn derive_status(current: ProductStatus, new_quantity: i64) -> ProductStatus {
    if new_quantity == 0 && current == ProductStatus::Approved {
        ProductStatus::OutOfStock
    } else if new_quantity > 0 && current == ProductStatus::OutOfStock {
        ProductStatus::Approved
    } else {
        current
    }
}

/// Inventory adjustment engine: mutates one product's quantity at a time
/// under strict seller ownership. Platform operators get no bypass here.
#[derive(Clone)]
pub struct StockService {
    store: Arc<dyn CatalogStore>,
}

impl StockService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Relative stock adjustment. Fails `InsufficientStock` when the delta
    /// would take the quantity negative.
    pub async fn adjust(
        &self,
        actor: Actor,
        product_id: Uuid,
        delta: i64,
    ) -> Result<Product, DomainError> {
        if delta == 0 {
            return Err(DomainError::validation("adjustment must be non-zero"));
        }

        self.product_for_update(actor, product_id).await?;

        let updated = self
            .store
            .apply_stock_change(product_id, StockChange::Adjust { delta })
            .await?;
        tracing::debug!(%product_id, delta, quantity = updated.quantity, "stock adjusted");
        Ok(updated)
    }

    /// Absolute stock overwrite.
    pub async fn set(
        &self,
        actor: Actor,
        product_id: Uuid,
        quantity: i64,
    ) -> Result<Product, DomainError> {
        if quantity < 0 {
            return Err(DomainError::validation("quantity must be non-negative"));
        }

        self.product_for_update(actor, product_id).await?;

        let updated = self
            .store
            .apply_stock_change(product_id, StockChange::Set { quantity })
            .await?;
        tracing::debug!(%product_id, quantity = updated.quantity, "stock set");
        Ok(updated)
    }

    /// Threshold is pure metadata; no status change follows.
    pub async fn update_low_stock_threshold(
        &self,
        actor: Actor,
        product_id: Uuid,
        threshold: i64,
    ) -> Result<Product, DomainError> {
        if threshold < 0 {
            return Err(DomainError::validation("threshold must be non-negative"));
        }

        self.product_for_update(actor, product_id).await?;

        self.store
            .set_low_stock_threshold(product_id, threshold)
            .await
    }

    /// Products at or below their threshold. Sellers see their own catalog;
    /// operators see every seller's. The predicate is evaluated by the
    /// store on the current row, so threshold edits take effect without any
    /// stock mutation.
    pub async fn list_low_stock(&self, actor: Actor) -> Result<Vec<Product>, DomainError> {
        let scope = if actor.is_operator() {
            None
        } else {
            Some(actor.id)
        };
        self.store.list_low_stock(scope).await
    }

    /// Shared precondition for every stock mutation: the product exists, is
    /// not soft-deleted, and the actor owns it.
    async fn product_for_update(
        &self,
        actor: Actor,
        product_id: Uuid,
    ) -> Result<Product, DomainError> {
        let product = self
            .store
            .get_product(product_id)
            .await?
            .ok_or_else(|| DomainError::not_found("product not found"))?;

        if product.seller_id != actor.id {
            return Err(DomainError::forbidden(
                "not authorized to update inventory for this product",
            ));
        }

        if product.is_deleted() {
            return Err(DomainError::validation("product is deleted"));
        }

        Ok(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draining_an_approved_listing_marks_it_out_of_stock() {
        assert_eq!(
            derive_status(ProductStatus::Approved, 0),
            ProductStatus::OutOfStock
        );
    }

    #[test]
    fn restocking_reverts_out_of_stock_to_approved() {
        assert_eq!(
            derive_status(ProductStatus::OutOfStock, 5),
            ProductStatus::Approved
        );
    }

    #[test]
    fn review_states_are_never_moved_by_stock_changes() {
        for status in [
            ProductStatus::Draft,
            ProductStatus::PendingReview,
            ProductStatus::Rejected,
        ] {
            assert_eq!(derive_status(status, 0), status);
            assert_eq!(derive_status(status, 7), status);
        }
    }

    #[test]
    fn approved_listing_with_stock_stays_approved() {
        assert_eq!(
            derive_status(ProductStatus::Approved, 3),
            ProductStatus::Approved
        );
    }

    #[test]
    fn out_of_stock_at_zero_stays_out_of_stock() {
        assert_eq!(
            derive_status(ProductStatus::OutOfStock, 0),
            ProductStatus::OutOfStock
        );
    }

    #[test]
    fn target_quantity_covers_both_change_kinds() {
        assert_eq!(target_quantity(10, StockChange::Adjust { delta: -10 }), 0);
        assert_eq!(target_quantity(10, StockChange::Adjust { delta: 5 }), 15);
        assert_eq!(target_quantity(10, StockChange::Set { quantity: 3 }), 3);
    }
}
