use async_trait::async_trait;
use uuid::Uuid;

use souk_core::DomainError;

use crate::product::{Product, ProductStatus};
use crate::stock::StockChange;

/// Listing filter for catalog reads. Visibility rules are applied by the
/// service on top of this.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub seller_id: Option<Uuid>,
    pub status: Option<ProductStatus>,
}

/// Storage contract for the product catalog.
///
/// Implementations own the transaction boundary: `apply_stock_change` is a
/// single atomic read-modify-write, and `list_low_stock` evaluates the
/// `quantity <= low_stock_threshold` predicate inside the store, never on a
/// fetched copy.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn insert_product(&self, product: &Product) -> Result<(), DomainError>;

    /// Fetch by id, soft-deleted rows included. Callers decide how a
    /// deleted row surfaces.
    async fn get_product(&self, id: Uuid) -> Result<Option<Product>, DomainError>;

    /// Batch fetch of live (non-deleted) rows. Ids without a live row are
    /// simply absent from the result.
    async fn find_products(&self, ids: &[Uuid]) -> Result<Vec<Product>, DomainError>;

    /// Full-row update keyed by `product.id`.
    async fn update_product(&self, product: &Product) -> Result<(), DomainError>;

    /// Atomically apply a quantity change and the status-derivation rule.
    /// Returns the updated row, or `InsufficientStock` when an adjustment
    /// would take the quantity negative.
    async fn apply_stock_change(
        &self,
        id: Uuid,
        change: StockChange,
    ) -> Result<Product, DomainError>;

    /// Metadata write; triggers no status change.
    async fn set_low_stock_threshold(
        &self,
        id: Uuid,
        threshold: i64,
    ) -> Result<Product, DomainError>;

    /// Live rows with `quantity <= low_stock_threshold`, optionally scoped
    /// to one seller.
    async fn list_low_stock(&self, seller_id: Option<Uuid>) -> Result<Vec<Product>, DomainError>;

    /// Live rows matching the filter, newest first.
    async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, DomainError>;
}
