use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::str::FromStr;
use uuid::Uuid;

use souk_catalog::repository::{CatalogStore, ProductFilter};
use souk_catalog::stock::{self, StockChange};
use souk_catalog::{Product, ProductStatus};
use souk_core::DomainError;

const PRODUCT_COLUMNS: &str = "id, seller_id, name, description, price_cents, quantity, \
     low_stock_threshold, status, rejection_reason, deleted_at, created_at, updated_at";

pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal struct for type-safe querying
#[derive(sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    seller_id: Uuid,
    name: String,
    description: Option<String>,
    price_cents: i64,
    quantity: i64,
    low_stock_threshold: i64,
    status: String,
    rejection_reason: Option<String>,
    deleted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProductRow {
    fn into_product(self) -> Result<Product, DomainError> {
        let status = ProductStatus::from_str(&self.status).map_err(DomainError::storage)?;
        Ok(Product {
            id: self.id,
            seller_id: self.seller_id,
            name: self.name,
            description: self.description,
            price_cents: self.price_cents,
            quantity: self.quantity,
            low_stock_threshold: self.low_stock_threshold,
            status,
            rejection_reason: self.rejection_reason,
            deleted_at: self.deleted_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn rows_to_products(rows: Vec<ProductRow>) -> Result<Vec<Product>, DomainError> {
    rows.into_iter().map(ProductRow::into_product).collect()
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn insert_product(&self, product: &Product) -> Result<(), DomainError> {
        sqlx::query(
            "INSERT INTO products (id, seller_id, name, description, price_cents, quantity, \
             low_stock_threshold, status, rejection_reason, deleted_at, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(product.id)
        .bind(product.seller_id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(product.quantity)
        .bind(product.low_stock_threshold)
        .bind(product.status.as_str())
        .bind(&product.rejection_reason)
        .bind(product.deleted_at)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(DomainError::storage)?;
        Ok(())
    }

    async fn get_product(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DomainError::storage)?;

        row.map(ProductRow::into_product).transpose()
    }

    async fn find_products(&self, ids: &[Uuid]) -> Result<Vec<Product>, DomainError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ANY($1) AND deleted_at IS NULL"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(DomainError::storage)?;

        rows_to_products(rows)
    }

    async fn update_product(&self, product: &Product) -> Result<(), DomainError> {
        sqlx::query(
            "UPDATE products SET name = $2, description = $3, price_cents = $4, quantity = $5, \
             low_stock_threshold = $6, status = $7, rejection_reason = $8, deleted_at = $9, \
             updated_at = $10 WHERE id = $1",
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(product.quantity)
        .bind(product.low_stock_threshold)
        .bind(product.status.as_str())
        .bind(&product.rejection_reason)
        .bind(product.deleted_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(DomainError::storage)?;
        Ok(())
    }

    /// Short transaction: lock the row, recompute quantity and status with
    /// the shared derivation rule, write back. The row lock closes the
    /// lost-update window between two racing adjustments.
    async fn apply_stock_change(
        &self,
        id: Uuid,
        change: StockChange,
    ) -> Result<Product, DomainError> {
        let mut tx = self.pool.begin().await.map_err(DomainError::storage)?;

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(DomainError::storage)?
        .ok_or_else(|| DomainError::not_found("product not found"))?;

        let mut product = row.into_product()?;
        let new_quantity = stock::target_quantity(product.quantity, change);
        if new_quantity < 0 {
            // Dropping the transaction rolls it back.
            return Err(DomainError::InsufficientStock {
                product_id: id,
                requested: product.quantity - new_quantity,
                available: product.quantity,
            });
        }
        let new_status = stock::derive_status(product.status, new_quantity);
        let now = Utc::now();

        sqlx::query("UPDATE products SET quantity = $2, status = $3, updated_at = $4 WHERE id = $1")
            .bind(id)
            .bind(new_quantity)
            .bind(new_status.as_str())
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(DomainError::storage)?;

        tx.commit().await.map_err(DomainError::storage)?;

        product.quantity = new_quantity;
        product.status = new_status;
        product.updated_at = now;
        Ok(product)
    }

    async fn set_low_stock_threshold(
        &self,
        id: Uuid,
        threshold: i64,
    ) -> Result<Product, DomainError> {
        let now = Utc::now();
        let result = sqlx::query(
            "UPDATE products SET low_stock_threshold = $2, updated_at = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(threshold)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(DomainError::storage)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("product not found"));
        }

        self.get_product(id)
            .await?
            .ok_or_else(|| DomainError::not_found("product not found"))
    }

    async fn list_low_stock(&self, seller_id: Option<Uuid>) -> Result<Vec<Product>, DomainError> {
        // The predicate compares the two live columns inside the query; no
        // fetched copy is ever filtered in memory.
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE deleted_at IS NULL AND quantity <= low_stock_threshold \
             AND ($1::uuid IS NULL OR seller_id = $1) \
             ORDER BY created_at DESC"
        ))
        .bind(seller_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DomainError::storage)?;

        rows_to_products(rows)
    }

    async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, DomainError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE deleted_at IS NULL \
             AND ($1::uuid IS NULL OR seller_id = $1) \
             AND ($2::text IS NULL OR status = $2) \
             ORDER BY created_at DESC"
        ))
        .bind(filter.seller_id)
        .bind(filter.status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(DomainError::storage)?;

        rows_to_products(rows)
    }
}
