use thiserror::Error;
use uuid::Uuid;

/// Business failures of order placement, cancellation and status changes.
///
/// Raised inside a transaction, any of these aborts it: the caller sees the
/// error and nothing the transaction did is committed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("User not found. Please login again.")]
    UserNotFound,

    #[error("No items in order")]
    EmptyOrder,

    #[error("Missing shipping details: {}", .0.join(", "))]
    IncompleteShipping(Vec<&'static str>),

    #[error("Invalid phone number: {0}")]
    InvalidPhone(String),

    #[error("Invalid quantity {quantity} for variant {variant_id}")]
    InvalidQuantity { variant_id: Uuid, quantity: String },

    #[error("Variant not found: {0}")]
    VariantNotFound(Uuid),

    #[error(
        "Insufficient stock for {product_name} ({size}): requested {requested}, only {available} left"
    )]
    InsufficientStock {
        variant_id: Uuid,
        product_name: String,
        size: String,
        requested: i32,
        available: i32,
    },

    #[error("Order not found: {0}")]
    OrderNotFound(Uuid),

    #[error("Order already cancelled")]
    AlreadyCancelled,

    #[error("Delivered orders cannot be cancelled")]
    CannotCancelDelivered,

    #[error("Not authorized to access this order")]
    NotAuthorized,

    #[error("Cannot change order status from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },
}

impl OrderError {
    pub fn kind(&self) -> &'static str {
        match self {
            OrderError::UserNotFound => "USER_NOT_FOUND",
            OrderError::EmptyOrder => "EMPTY_ORDER",
            OrderError::IncompleteShipping(_) => "INCOMPLETE_SHIPPING",
            OrderError::InvalidPhone(_) => "INVALID_PHONE",
            OrderError::InvalidQuantity { .. } => "INVALID_QUANTITY",
            OrderError::VariantNotFound(_) => "VARIANT_NOT_FOUND",
            OrderError::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            OrderError::OrderNotFound(_) => "ORDER_NOT_FOUND",
            OrderError::AlreadyCancelled => "ALREADY_CANCELLED",
            OrderError::CannotCancelDelivered => "CANNOT_CANCEL_DELIVERED",
            OrderError::NotAuthorized => "NOT_AUTHORIZED",
            OrderError::InvalidStatusTransition { .. } => "INVALID_STATUS_TRANSITION",
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            OrderError::EmptyOrder
                | OrderError::IncompleteShipping(_)
                | OrderError::InvalidPhone(_)
                | OrderError::InvalidQuantity { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_stock_message_names_variant_and_remaining_stock() {
        let err = OrderError::InsufficientStock {
            variant_id: Uuid::nil(),
            product_name: "Cold Pressed Groundnut Oil".into(),
            size: "1L".into(),
            requested: 5,
            available: 3,
        };

        assert_eq!(
            err.to_string(),
            "Insufficient stock for Cold Pressed Groundnut Oil (1L): requested 5, only 3 left"
        );
        assert_eq!(err.kind(), "INSUFFICIENT_STOCK");
        assert!(!err.is_validation());
    }

    #[test]
    fn incomplete_shipping_lists_missing_fields() {
        let err = OrderError::IncompleteShipping(vec!["phone", "city"]);
        assert_eq!(err.to_string(), "Missing shipping details: phone, city");
        assert!(err.is_validation());
    }
}
