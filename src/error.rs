//! Error handling and result types for index operations.
//!
//! The taxonomy is deliberately small: an absent key is signalled, a bad
//! order is rejected at construction, and everything else is an internal
//! defect surfaced by validation rather than silently repaired.

/// Error type for ordered index operations.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexError {
    /// Key not found in the index.
    KeyNotFound,
    /// Invalid order specified at construction.
    InvalidOrder(String),
    /// Internal structure violation detected by validation.
    CorruptedTree(String),
    /// An arena handle did not resolve to a live node.
    ArenaError(String),
}

impl IndexError {
    /// Create an InvalidOrder error with context.
    pub fn invalid_order(order: usize, min_required: usize) -> Self {
        Self::InvalidOrder(format!(
            "Order {} is invalid (minimum required: {})",
            order, min_required
        ))
    }

    /// Create a CorruptedTree error with context.
    pub fn corrupted_tree(component: &str, details: &str) -> Self {
        Self::CorruptedTree(format!("{} corruption: {}", component, details))
    }

    /// Create an ArenaError with context.
    pub fn arena_error(operation: &str, details: &str) -> Self {
        Self::ArenaError(format!("{} failed: {}", operation, details))
    }

    /// Check if this error is an order error.
    pub fn is_order_error(&self) -> bool {
        matches!(self, Self::InvalidOrder(_))
    }
}

impl std::fmt::Display for IndexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexError::KeyNotFound => write!(f, "Key not found in index"),
            IndexError::InvalidOrder(msg) => write!(f, "Invalid order: {}", msg),
            IndexError::CorruptedTree(msg) => write!(f, "Corrupted tree: {}", msg),
            IndexError::ArenaError(msg) => write!(f, "Arena error: {}", msg),
        }
    }
}

impl std::error::Error for IndexError {}

/// Internal result type for tree operations.
pub(crate) type TreeResult<T> = Result<T, IndexError>;

/// Public result type for index operations that may fail.
pub type IndexResult<T> = Result<T, IndexError>;

/// Result type for key lookup operations.
pub type KeyResult<T> = Result<T, IndexError>;

/// Result type for index construction.
pub type InitResult<T> = Result<T, IndexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            format!("{}", IndexError::KeyNotFound),
            "Key not found in index"
        );

        let err = IndexError::invalid_order(2, 3);
        assert_eq!(
            format!("{}", err),
            "Invalid order: Order 2 is invalid (minimum required: 3)"
        );
    }

    #[test]
    fn test_error_predicates() {
        assert!(IndexError::invalid_order(1, 3).is_order_error());
        assert!(!IndexError::KeyNotFound.is_order_error());
    }
}
