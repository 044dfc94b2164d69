use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Threshold applied when a listing does not configure its own.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 5;

/// Availability status of a listing.
///
/// `OutOfStock` is transient: it only replaces `Approved` when a stock
/// mutation drains the quantity to zero, and restocking reverts it. The
/// review states are never touched by stock changes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductStatus {
    Draft,
    PendingReview,
    Approved,
    Rejected,
    OutOfStock,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Draft => "DRAFT",
            ProductStatus::PendingReview => "PENDING_REVIEW",
            ProductStatus::Approved => "APPROVED",
            ProductStatus::Rejected => "REJECTED",
            ProductStatus::OutOfStock => "OUT_OF_STOCK",
        }
    }
}

impl std::str::FromStr for ProductStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DRAFT" => Ok(ProductStatus::Draft),
            "PENDING_REVIEW" => Ok(ProductStatus::PendingReview),
            "APPROVED" => Ok(ProductStatus::Approved),
            "REJECTED" => Ok(ProductStatus::Rejected),
            "OUT_OF_STOCK" => Ok(ProductStatus::OutOfStock),
            other => Err(format!("unknown product status: {other}")),
        }
    }
}

/// A seller's listing. Prices are integer minor units; quantity is never
/// negative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub quantity: i64,
    pub low_stock_threshold: i64,
    pub status: ProductStatus,
    pub rejection_reason: Option<String>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Derived condition, never stored: at or below the configured
    /// threshold.
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.low_stock_threshold
    }
}

/// Input for creating a listing. Status may only start as `Draft` or
/// `PendingReview`; approval is the operator's call.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub quantity: i64,
    pub low_stock_threshold: Option<i64>,
    pub status: Option<ProductStatus>,
}

/// Partial update of a listing. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub quantity: Option<i64>,
    pub status: Option<ProductStatus>,
}

/// Operator verdict on a pending listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewVerdict {
    pub status: ProductStatus,
    pub rejection_reason: Option<String>,
}

/// Fixture shared by the crate's unit tests.
#[cfg(test)]
pub(crate) fn test_product() -> Product {
    let now = Utc::now();
    Product {
        id: Uuid::new_v4(),
        seller_id: Uuid::new_v4(),
        name: "Test Product".to_string(),
        description: Some("A product used in tests".to_string()),
        price_cents: 10_000,
        quantity: 10,
        low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
        status: ProductStatus::Approved,
        rejection_reason: None,
        deleted_at: None,
        created_at: now,
        updated_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn status_round_trips_through_str() {
        for status in [
            ProductStatus::Draft,
            ProductStatus::PendingReview,
            ProductStatus::Approved,
            ProductStatus::Rejected,
            ProductStatus::OutOfStock,
        ] {
            assert_eq!(ProductStatus::from_str(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn low_stock_is_at_or_below_threshold() {
        let mut product = test_product();
        product.quantity = 5;
        product.low_stock_threshold = 5;
        assert!(product.is_low_stock());

        product.low_stock_threshold = 4;
        assert!(!product.is_low_stock());
    }
}
