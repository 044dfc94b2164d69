use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use souk_core::{Actor, DomainError};

use crate::product::{
    NewProduct, Product, ProductPatch, ProductStatus, ReviewVerdict, DEFAULT_LOW_STOCK_THRESHOLD,
};
use crate::repository::{CatalogStore, ProductFilter};

/// Seller-facing listing CRUD plus the operator review step. Stock lives in
/// [`crate::stock::StockService`]; this service never mutates quantity
/// outside creation.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, seller: Actor, input: NewProduct) -> Result<Product, DomainError> {
        if input.name.trim().len() < 3 {
            return Err(DomainError::validation("name must be at least 3 characters"));
        }
        if input.price_cents < 0 {
            return Err(DomainError::validation("price must be non-negative"));
        }
        if input.quantity < 0 {
            return Err(DomainError::validation("quantity must be non-negative"));
        }
        if let Some(threshold) = input.low_stock_threshold {
            if threshold < 0 {
                return Err(DomainError::validation("threshold must be non-negative"));
            }
        }
        let status = match input.status {
            None => ProductStatus::Draft,
            Some(s @ (ProductStatus::Draft | ProductStatus::PendingReview)) => s,
            Some(_) => {
                return Err(DomainError::validation(
                    "a new listing may only be DRAFT or PENDING_REVIEW",
                ))
            }
        };

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            seller_id: seller.id,
            name: input.name,
            description: input.description,
            price_cents: input.price_cents,
            quantity: input.quantity,
            low_stock_threshold: input
                .low_stock_threshold
                .unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD),
            status,
            rejection_reason: None,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        };
        self.store.insert_product(&product).await?;
        tracing::info!(product_id = %product.id, seller_id = %seller.id, "listing created");
        Ok(product)
    }

    /// Owner-only edit. An `Approved` or `Rejected` listing goes back to
    /// review on edit unless the patch explicitly parks it as `Draft` or
    /// `PendingReview`; the rejection reason is cleared either way.
    pub async fn update(
        &self,
        seller: Actor,
        product_id: Uuid,
        patch: ProductPatch,
    ) -> Result<Product, DomainError> {
        if let Some(price) = patch.price_cents {
            if price < 0 {
                return Err(DomainError::validation("price must be non-negative"));
            }
        }
        if let Some(quantity) = patch.quantity {
            if quantity < 0 {
                return Err(DomainError::validation("quantity must be non-negative"));
            }
        }
        if let Some(name) = &patch.name {
            if name.trim().len() < 3 {
                return Err(DomainError::validation("name must be at least 3 characters"));
            }
        }
        if let Some(status) = patch.status {
            if !matches!(status, ProductStatus::Draft | ProductStatus::PendingReview) {
                return Err(DomainError::validation(
                    "a seller may only move a listing to DRAFT or PENDING_REVIEW",
                ));
            }
        }

        let mut product = self.owned_product(seller, product_id).await?;

        let next_status = match patch.status {
            Some(status) => status,
            None => match product.status {
                ProductStatus::Approved | ProductStatus::Rejected => ProductStatus::PendingReview,
                current => current,
            },
        };

        if let Some(name) = patch.name {
            product.name = name;
        }
        if let Some(description) = patch.description {
            product.description = Some(description);
        }
        if let Some(price) = patch.price_cents {
            product.price_cents = price;
        }
        if let Some(quantity) = patch.quantity {
            product.quantity = quantity;
        }
        product.status = next_status;
        product.rejection_reason = None;
        product.updated_at = Utc::now();

        self.store.update_product(&product).await?;
        Ok(product)
    }

    /// Owner-only soft delete.
    pub async fn delete(&self, seller: Actor, product_id: Uuid) -> Result<Product, DomainError> {
        let mut product = self.owned_product(seller, product_id).await?;
        product.deleted_at = Some(Utc::now());
        product.updated_at = Utc::now();
        self.store.update_product(&product).await?;
        tracing::info!(%product_id, "listing soft-deleted");
        Ok(product)
    }

    /// Operator review: approve, or reject with a reason.
    pub async fn review(
        &self,
        operator: Actor,
        product_id: Uuid,
        verdict: ReviewVerdict,
    ) -> Result<Product, DomainError> {
        if !operator.is_operator() {
            return Err(DomainError::forbidden("only operators may review listings"));
        }
        match verdict.status {
            ProductStatus::Approved => {}
            ProductStatus::Rejected => {
                if verdict.rejection_reason.is_none() {
                    return Err(DomainError::validation(
                        "rejection reason is required when rejecting a listing",
                    ));
                }
            }
            _ => {
                return Err(DomainError::validation(
                    "review verdict must be APPROVED or REJECTED",
                ))
            }
        }

        let mut product = self
            .store
            .get_product(product_id)
            .await?
            .filter(|p| !p.is_deleted())
            .ok_or_else(|| DomainError::not_found("product not found"))?;

        product.status = verdict.status;
        product.rejection_reason = verdict.rejection_reason;
        product.updated_at = Utc::now();
        self.store.update_product(&product).await?;
        Ok(product)
    }

    /// Visibility: operators see everything, owners see their own listings,
    /// everyone else sees `Approved` only. Soft-deleted rows are invisible
    /// to all readers.
    pub async fn get(
        &self,
        actor: Option<Actor>,
        product_id: Uuid,
    ) -> Result<Product, DomainError> {
        let product = self
            .store
            .get_product(product_id)
            .await?
            .filter(|p| !p.is_deleted())
            .ok_or_else(|| DomainError::not_found("product not found"))?;

        let is_owner = actor.is_some_and(|a| a.id == product.seller_id);
        let is_operator = actor.is_some_and(|a| a.is_operator());
        if !is_owner && !is_operator && product.status != ProductStatus::Approved {
            return Err(DomainError::not_found("product not found"));
        }
        Ok(product)
    }

    pub async fn list(
        &self,
        actor: Option<Actor>,
        mut filter: ProductFilter,
    ) -> Result<Vec<Product>, DomainError> {
        let is_operator = actor.is_some_and(|a| a.is_operator());
        let is_own_catalog =
            actor.is_some() && filter.seller_id.is_some() && filter.seller_id == actor.map(|a| a.id);

        // The public marketplace view only ever lists approved products; a
        // status filter is honored for operators and owners.
        if !is_operator && !is_own_catalog {
            filter.status = Some(ProductStatus::Approved);
        }
        self.store.list_products(&filter).await
    }

    async fn owned_product(&self, seller: Actor, product_id: Uuid) -> Result<Product, DomainError> {
        let product = self
            .store
            .get_product(product_id)
            .await?
            .ok_or_else(|| DomainError::not_found("product not found"))?;
        if product.seller_id != seller.id {
            return Err(DomainError::forbidden(
                "not authorized to modify this product",
            ));
        }
        if product.is_deleted() {
            return Err(DomainError::validation("product is deleted"));
        }
        Ok(product)
    }
}
