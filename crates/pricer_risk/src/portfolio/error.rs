//! Portfolio error types.

use thiserror::Error;

/// Errors raised when editing a portfolio.
///
/// Pricing failures are not errors at this level: a position that fails to
/// price is reported in the valuation instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PortfolioError {
    /// No position with the ID.
    #[error("Position not found: {0}")]
    PositionNotFound(String),

    /// A position with the ID already exists.
    #[error("Duplicate position ID: {0}")]
    DuplicatePosition(String),

    /// Quantity is NaN or infinite.
    #[error("Invalid quantity for position {id}: {quantity}")]
    InvalidQuantity {
        /// Position ID.
        id: String,
        /// Rejected quantity.
        quantity: f64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PortfolioError::PositionNotFound("P001".to_string());
        assert_eq!(format!("{}", err), "Position not found: P001");
        let err = PortfolioError::InvalidQuantity {
            id: "P002".to_string(),
            quantity: f64::NAN,
        };
        assert_eq!(format!("{}", err), "Invalid quantity for position P002: NaN");
    }

    #[test]
    fn test_error_is_error_trait() {
        let err: Box<dyn std::error::Error> = Box::new(PortfolioError::DuplicatePosition("P1".into()));
        assert!(err.to_string().contains("Duplicate"));
    }
}
