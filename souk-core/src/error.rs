use uuid::Uuid;

/// Caller-recoverable outcomes surfaced by every engine, plus the single
/// unrecoverable storage variant. Each carries a stable machine-readable
/// code via [`DomainError::code`].
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    /// Malformed or out-of-range input, rejected before any storage access.
    #[error("{0}")]
    Validation(String),

    /// Referenced entity absent or soft-deleted.
    #[error("{0}")]
    NotFound(String),

    /// Authenticated identity lacks ownership or role.
    #[error("{0}")]
    Forbidden(String),

    /// Business-rule violation, not a system fault. Callers may retry
    /// after a fresh read.
    #[error("insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: Uuid,
        requested: i64,
        available: i64,
    },

    /// Unexpected storage failure. Surfaced generically to callers.
    #[error("storage failure: {0}")]
    Storage(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn storage(err: impl std::fmt::Display) -> Self {
        Self::Storage(err.to_string())
    }

    /// Stable code for the wire envelope.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            Self::Storage(_) => "INTERNAL",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(DomainError::validation("x").code(), "VALIDATION_ERROR");
        assert_eq!(DomainError::not_found("x").code(), "NOT_FOUND");
        assert_eq!(DomainError::forbidden("x").code(), "FORBIDDEN");
        let err = DomainError::InsufficientStock {
            product_id: Uuid::new_v4(),
            requested: 5,
            available: 2,
        };
        assert_eq!(err.code(), "INSUFFICIENT_STOCK");
        assert_eq!(DomainError::storage("boom").code(), "INTERNAL");
    }

    #[test]
    fn insufficient_stock_message_carries_quantities() {
        let id = Uuid::new_v4();
        let err = DomainError::InsufficientStock {
            product_id: id,
            requested: 5,
            available: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains(&id.to_string()));
        assert!(msg.contains("requested 5"));
        assert!(msg.contains("available 2"));
    }
}
