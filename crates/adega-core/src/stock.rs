//! # Stock Math
//!
//! How each movement type changes a product's stock.
//!
//! ```text
//! ┌──────────────┬─────────────────────────┬──────────────────────────┐
//! │ type         │ new stock               │ quantity accepted        │
//! ├──────────────┼─────────────────────────┼──────────────────────────┤
//! │ in           │ old + q                 │ q > 0                    │
//! │ out          │ max(0, old - q)         │ q > 0                    │
//! │ loss         │ max(0, old - q)         │ q > 0                    │
//! │ adjustment   │ q  (absolute count)     │ q >= 0                   │
//! └──────────────┴─────────────────────────┴──────────────────────────┘
//! ```
//!
//! Manual removals clamp at zero instead of failing; a physical count is
//! the source of truth. Sales never go through the clamp: they use a
//! conditional decrement and fail with `InsufficientStock` instead.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::types::StockMovementType;
use crate::validation::ValidationResult;

/// Previous and resulting stock of one movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockChange {
    pub previous: i64,
    pub new: i64,
}

impl StockChange {
    /// Signed difference applied to the product.
    pub fn delta(&self) -> i64 {
        self.new - self.previous
    }
}

/// Checks the quantity of a manual movement.
pub fn validate_movement_quantity(kind: StockMovementType, quantity: i64) -> ValidationResult<()> {
    match kind {
        StockMovementType::In | StockMovementType::Out | StockMovementType::Loss => {
            if quantity <= 0 {
                return Err(ValidationError::MustBePositive {
                    field: "quantity".to_string(),
                });
            }
        }
        StockMovementType::Adjustment => {
            if quantity < 0 {
                return Err(ValidationError::OutOfRange {
                    field: "quantity".to_string(),
                    min: 0,
                    max: i64::MAX,
                });
            }
        }
    }
    Ok(())
}

/// Computes the new stock for a movement.
pub fn apply_movement(kind: StockMovementType, current: i64, quantity: i64) -> i64 {
    match kind {
        StockMovementType::In => current.saturating_add(quantity),
        StockMovementType::Out | StockMovementType::Loss => current.saturating_sub(quantity).max(0),
        StockMovementType::Adjustment => quantity.max(0),
    }
}

/// Validates then applies a movement.
pub fn plan_movement(
    kind: StockMovementType,
    current: i64,
    quantity: i64,
) -> ValidationResult<StockChange> {
    validate_movement_quantity(kind, quantity)?;
    Ok(StockChange {
        previous: current,
        new: apply_movement(kind, current, quantity),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use StockMovementType::*;

    #[test]
    fn test_apply_movement() {
        assert_eq!(apply_movement(In, 10, 5), 15);
        assert_eq!(apply_movement(Out, 10, 4), 6);
        assert_eq!(apply_movement(Loss, 10, 10), 0);
        assert_eq!(apply_movement(Adjustment, 10, 3), 3);
    }

    #[test]
    fn test_removals_clamp_at_zero() {
        assert_eq!(apply_movement(Out, 3, 10), 0);
        assert_eq!(apply_movement(Loss, 0, 1), 0);
    }

    #[test]
    fn test_quantity_rules() {
        assert!(validate_movement_quantity(In, 0).is_err());
        assert!(validate_movement_quantity(Out, -1).is_err());
        assert!(validate_movement_quantity(Loss, 0).is_err());
        assert!(validate_movement_quantity(Adjustment, 0).is_ok());
        assert!(validate_movement_quantity(Adjustment, -1).is_err());
    }

    #[test]
    fn test_stock_never_negative_over_any_sequence() {
        let moves = [
            (In, 5),
            (Out, 9),
            (Loss, 2),
            (Adjustment, 4),
            (Out, 1),
            (Loss, 100),
            (In, 1),
        ];
        let mut stock = 0;
        for (kind, q) in moves {
            let change = plan_movement(kind, stock, q).unwrap();
            assert!(change.new >= 0);
            stock = change.new;
        }
        assert_eq!(stock, 1);
    }

    #[test]
    fn test_delta() {
        let change = plan_movement(Adjustment, 12, 7).unwrap();
        assert_eq!(change.delta(), -5);
    }
}
