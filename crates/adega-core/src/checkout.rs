//! # Checkout Rules
//!
//! Pure part of sale creation: cart validation, pricing and totals.
//! The database layer re-reads products inside its transaction and hands
//! them to these functions, so every rejection happens before any write.
//!
//! ## Validation Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  validate_cart(&NewSale)            no I/O                             │
//! │  ├── cart empty?                  → EmptyCart                          │
//! │  ├── > MAX_CART_ITEMS lines?      → CartTooLarge                       │
//! │  ├── quantity outside 1..=999?    → Validation / QuantityTooLarge      │
//! │  ├── unit price outside 0..=MAX?  → Validation                         │
//! │  └── discount < 0?                → InvalidDiscount                    │
//! │           │                                                             │
//! │           ▼   (products re-read inside the transaction)                 │
//! │  price_lines(&lines, &products)                                        │
//! │  ├── product missing / inactive?  → ProductNotFound                    │
//! │  └── stock < summed request?      → InsufficientStock                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  SaleTotals::compute(&priced, discount)                                │
//! │  ├── amount overflows i64?        → Validation                         │
//! │  └── subtotal - discount <= 0?    → InvalidTotal                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{CartLine, NewSale, Product};
use crate::validation::validate_price_cents;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

// =============================================================================
// Cart Validation
// =============================================================================

/// Form-level checks on a checkout request.
pub fn validate_cart(sale: &NewSale) -> CoreResult<()> {
    if sale.items.is_empty() {
        return Err(CoreError::EmptyCart);
    }

    if sale.items.len() > MAX_CART_ITEMS {
        return Err(CoreError::CartTooLarge {
            max: MAX_CART_ITEMS,
        });
    }

    for line in &sale.items {
        if line.product_id.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "product_id".to_string(),
            }
            .into());
        }

        if line.quantity <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            }
            .into());
        }

        if line.quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: line.quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }

        if let Some(price) = line.unit_price_cents {
            validate_price_cents("unit_price", price)?;
        }
    }

    if sale.discount_cents < 0 {
        return Err(CoreError::InvalidDiscount {
            reason: "discount cannot be negative".to_string(),
        });
    }

    Ok(())
}

/// Sums requested quantities per product, keeping first-seen order.
///
/// Two lines of the same bottle must be checked against stock together.
pub fn requested_quantities(lines: &[CartLine]) -> Vec<(String, i64)> {
    let mut order: Vec<(String, i64)> = Vec::new();
    for line in lines {
        match order.iter_mut().find(|(id, _)| *id == line.product_id) {
            Some((_, qty)) => *qty += line.quantity,
            None => order.push((line.product_id.clone(), line.quantity)),
        }
    }
    order
}

// =============================================================================
// Pricing
// =============================================================================

/// A cart line resolved against the current product row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedLine {
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub line_total: Money,
}

/// Resolves every cart line against freshly read products.
///
/// `products` is keyed by product id and only needs the products that were
/// found in the caller's store.
pub fn price_lines(
    lines: &[CartLine],
    products: &HashMap<String, Product>,
) -> CoreResult<Vec<PricedLine>> {
    for (product_id, requested) in requested_quantities(lines) {
        let product = products
            .get(&product_id)
            .filter(|p| p.is_active)
            .ok_or_else(|| CoreError::ProductNotFound(product_id.clone()))?;

        if !product.can_sell(requested) {
            return Err(CoreError::InsufficientStock {
                product: product.name.clone(),
                available: product.stock_quantity,
                requested,
            });
        }
    }

    lines
        .iter()
        .map(|line| {
            let product = products
                .get(&line.product_id)
                .ok_or_else(|| CoreError::ProductNotFound(line.product_id.clone()))?;

            let unit_price = line
                .unit_price_cents
                .map(Money::from_cents)
                .unwrap_or_else(|| product.effective_price());

            let line_total = unit_price
                .checked_multiply_quantity(line.quantity)
                .ok_or_else(|| amount_overflow("line_total"))?;

            Ok(PricedLine {
                product_id: product.id.clone(),
                product_name: product.name.clone(),
                quantity: line.quantity,
                unit_price,
                line_total,
            })
        })
        .collect()
}

// =============================================================================
// Totals
// =============================================================================

/// Header amounts of a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleTotals {
    pub subtotal: Money,
    pub discount: Money,
    pub total: Money,
}

impl SaleTotals {
    /// subtotal = Σ line totals, total = subtotal - discount.
    ///
    /// ## Errors
    /// `InvalidTotal` when the total is not strictly positive, which also
    /// covers a discount larger than the subtotal.
    pub fn compute(lines: &[PricedLine], discount_cents: i64) -> CoreResult<Self> {
        if discount_cents < 0 {
            return Err(CoreError::InvalidDiscount {
                reason: "discount cannot be negative".to_string(),
            });
        }

        let subtotal = Money::checked_sum(lines.iter().map(|l| l.line_total))
            .ok_or_else(|| amount_overflow("subtotal"))?;
        let discount = Money::from_cents(discount_cents);
        let total = subtotal
            .checked_sub(discount)
            .ok_or_else(|| amount_overflow("total"))?;

        if !total.is_positive() {
            return Err(CoreError::InvalidTotal {
                total_cents: total.cents(),
            });
        }

        Ok(Self {
            subtotal,
            discount,
            total,
        })
    }
}

fn amount_overflow(field: &str) -> CoreError {
    ValidationError::OutOfRange {
        field: field.to_string(),
        min: 0,
        max: i64::MAX,
    }
    .into()
}

/// Loyalty points earned by a sale: one per whole currency unit.
#[inline]
pub fn loyalty_points_for(total: Money) -> i64 {
    total.whole_units().max(0)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PaymentMethod, ProductCategory};
    use crate::MAX_PRICE_CENTS;
    use chrono::Utc;

    fn product(id: &str, stock: i64, price: i64) -> Product {
        Product {
            id: id.to_string(),
            store_id: "store".to_string(),
            name: format!("Product {id}"),
            description: None,
            category: ProductCategory::RedWine,
            cost_price_cents: 0,
            sale_price_cents: price,
            promo_price_cents: None,
            stock_quantity: stock,
            min_stock: 0,
            image_url: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn line(id: &str, quantity: i64, price: Option<i64>) -> CartLine {
        CartLine {
            product_id: id.to_string(),
            quantity,
            unit_price_cents: price,
        }
    }

    fn sale(items: Vec<CartLine>, discount: i64) -> NewSale {
        NewSale {
            items,
            payment_method: PaymentMethod::Cash,
            customer_id: None,
            discount_cents: discount,
            notes: None,
        }
    }

    fn catalog(products: Vec<Product>) -> HashMap<String, Product> {
        products.into_iter().map(|p| (p.id.clone(), p)).collect()
    }

    #[test]
    fn test_empty_cart_rejected() {
        assert!(matches!(
            validate_cart(&sale(vec![], 0)),
            Err(CoreError::EmptyCart)
        ));
    }

    #[test]
    fn test_line_checks() {
        assert!(validate_cart(&sale(vec![line("a", 0, None)], 0)).is_err());
        assert!(matches!(
            validate_cart(&sale(vec![line("a", 1000, None)], 0)),
            Err(CoreError::QuantityTooLarge { .. })
        ));
        assert!(validate_cart(&sale(vec![line("a", 1, Some(-1))], 0)).is_err());
        assert!(matches!(
            validate_cart(&sale(vec![line("a", 1, None)], -5)),
            Err(CoreError::InvalidDiscount { .. })
        ));
        assert!(validate_cart(&sale(vec![line("a", 999, Some(0))], 0)).is_ok());
    }

    #[test]
    fn test_cart_size_limit() {
        let items = (0..=MAX_CART_ITEMS).map(|i| line(&i.to_string(), 1, None)).collect();
        assert!(matches!(
            validate_cart(&sale(items, 0)),
            Err(CoreError::CartTooLarge { .. })
        ));
    }

    #[test]
    fn test_requested_quantities_sums_duplicates() {
        let lines = vec![line("a", 2, None), line("b", 1, None), line("a", 3, None)];
        assert_eq!(
            requested_quantities(&lines),
            vec![("a".to_string(), 5), ("b".to_string(), 1)]
        );
    }

    #[test]
    fn test_duplicate_lines_checked_together() {
        let products = catalog(vec![product("a", 4, 1000)]);
        let lines = vec![line("a", 2, None), line("a", 3, None)];

        match price_lines(&lines, &products) {
            Err(CoreError::InsufficientStock {
                available,
                requested,
                ..
            }) => {
                assert_eq!(available, 4);
                assert_eq!(requested, 5);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_or_inactive_product() {
        let mut inactive = product("b", 10, 100);
        inactive.is_active = false;
        let products = catalog(vec![inactive]);

        assert!(matches!(
            price_lines(&[line("a", 1, None)], &products),
            Err(CoreError::ProductNotFound(id)) if id == "a"
        ));
        assert!(matches!(
            price_lines(&[line("b", 1, None)], &products),
            Err(CoreError::ProductNotFound(_))
        ));
    }

    #[test]
    fn test_pricing_uses_cart_price_then_product_price() {
        let products = catalog(vec![product("a", 10, 1000), product("b", 10, 250)]);
        let priced = price_lines(&[line("a", 2, Some(900)), line("b", 3, None)], &products).unwrap();

        assert_eq!(priced[0].line_total.cents(), 1800);
        assert_eq!(priced[1].unit_price.cents(), 250);
        assert_eq!(priced[1].line_total.cents(), 750);
        assert_eq!(priced[1].product_name, "Product b");
    }

    #[test]
    fn test_totals() {
        let products = catalog(vec![product("a", 10, 1000)]);
        let priced = price_lines(&[line("a", 3, None)], &products).unwrap();

        let totals = SaleTotals::compute(&priced, 500).unwrap();
        assert_eq!(totals.subtotal.cents(), 3000);
        assert_eq!(totals.total.cents(), 2500);
    }

    #[test]
    fn test_non_positive_total_rejected() {
        let products = catalog(vec![product("a", 10, 1000)]);
        let priced = price_lines(&[line("a", 1, None)], &products).unwrap();

        assert!(matches!(
            SaleTotals::compute(&priced, 1000),
            Err(CoreError::InvalidTotal { total_cents: 0 })
        ));
        assert!(matches!(
            SaleTotals::compute(&priced, 1500),
            Err(CoreError::InvalidTotal { total_cents: -500 })
        ));

        let free = price_lines(&[line("a", 1, Some(0))], &products).unwrap();
        assert!(SaleTotals::compute(&free, 0).is_err());
    }

    #[test]
    fn test_huge_cart_price_rejected() {
        let huge = i64::MAX / 2 + 1;
        assert!(matches!(
            validate_cart(&sale(vec![line("a", 2, Some(huge))], 0)),
            Err(CoreError::Validation(ValidationError::OutOfRange { max: MAX_PRICE_CENTS, .. }))
        ));
        assert!(validate_cart(&sale(vec![line("a", MAX_ITEM_QUANTITY, Some(MAX_PRICE_CENTS))], 0)).is_ok());

        // Product rows are priced with checked math as well.
        let products = catalog(vec![product("a", 10, huge)]);
        assert!(matches!(
            price_lines(&[line("a", 2, None)], &products),
            Err(CoreError::Validation(ValidationError::OutOfRange { ref field, .. })) if field == "line_total"
        ));
        assert!(matches!(
            price_lines(&[line("a", 2, Some(huge))], &products),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn test_subtotal_overflow_rejected() {
        let half = i64::MAX / 2 + 1;
        let products = catalog(vec![product("a", 10, half), product("b", 10, half)]);
        let priced = price_lines(&[line("a", 1, None), line("b", 1, None)], &products).unwrap();

        assert!(matches!(
            SaleTotals::compute(&priced, 0),
            Err(CoreError::Validation(ValidationError::OutOfRange { ref field, .. })) if field == "subtotal"
        ));
    }

    #[test]
    fn test_largest_valid_cart_fits() {
        let products: HashMap<_, _> = catalog(
            (0..MAX_CART_ITEMS)
                .map(|i| product(&i.to_string(), MAX_ITEM_QUANTITY, MAX_PRICE_CENTS))
                .collect(),
        );
        let lines: Vec<_> = (0..MAX_CART_ITEMS)
            .map(|i| line(&i.to_string(), MAX_ITEM_QUANTITY, None))
            .collect();

        let priced = price_lines(&lines, &products).unwrap();
        let totals = SaleTotals::compute(&priced, 0).unwrap();
        assert_eq!(
            totals.total.cents(),
            MAX_PRICE_CENTS * MAX_ITEM_QUANTITY * MAX_CART_ITEMS as i64
        );
    }

    #[test]
    fn test_loyalty_points() {
        assert_eq!(loyalty_points_for(Money::from_cents(12_599)), 125);
        assert_eq!(loyalty_points_for(Money::from_cents(99)), 0);
    }
}
