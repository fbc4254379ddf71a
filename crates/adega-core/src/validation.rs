//! # Validation Module
//!
//! Input validation for Adega.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: SPA form (TypeScript, generated types)                       │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: HTTP handler (Rust)                                          │
//! │  ├── Type validation (serde, closed enums)                             │
//! │  └── THIS MODULE: field rules                                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK (stock_quantity >= 0) constraints                │
//! │  ├── UNIQUE constraints (one delivery per sale, profile email)         │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use adega_core::validation::{validate_product_name, validate_quantity};
//!
//! assert!(validate_product_name("Malbec Reserva 750ml").is_ok());
//! assert!(validate_quantity(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::types::{
    CustomerInput, NewDelivery, NewFinancialTransaction, NewProduct, NewStore, ProductUpdate,
};
use crate::{MAX_ITEM_QUANTITY, MAX_PRICE_CENTS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

pub const MAX_NAME_LEN: usize = 200;
pub const MIN_PASSWORD_LEN: usize = 8;

// =============================================================================
// String Validators
// =============================================================================

/// Trims `value` and requires 1..=`max` characters.
pub fn validate_required_text(field: &str, value: &str, max: usize) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(value.to_string())
}

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty
/// - At most 200 characters
///
/// ```rust
/// use adega_core::validation::validate_product_name;
///
/// assert!(validate_product_name("Espumante Brut").is_ok());
/// assert!(validate_product_name("").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    validate_required_text("name", name, MAX_NAME_LEN).map(|_| ())
}

/// Validates a search query. Empty is fine (lists everything).
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

/// Very small e-mail sanity check: `local@domain.tld`.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    };

    if !valid {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must look like name@domain.com".to_string(),
        });
    }

    Ok(())
}

pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::InvalidFormat {
            field: "password".to_string(),
            reason: format!("must have at least {MIN_PASSWORD_LEN} characters"),
        });
    }
    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a cart quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates an amount in cents (prices, fees): `0..=MAX_PRICE_CENTS`.
///
/// ```rust
/// use adega_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents("sale_price", 4590).is_ok());
/// assert!(validate_price_cents("sale_price", 0).is_ok());
/// assert!(validate_price_cents("sale_price", -100).is_err());
/// assert!(validate_price_cents("sale_price", i64::MAX).is_err());
/// ```
pub fn validate_price_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if !(0..=MAX_PRICE_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_PRICE_CENTS,
        });
    }

    Ok(())
}

fn validate_non_negative(field: &str, value: i64) -> ValidationResult<()> {
    if value < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// Entity Validators
// =============================================================================

fn validate_prices(sale: i64, cost: i64, promo: Option<i64>) -> ValidationResult<()> {
    validate_price_cents("sale_price", sale)?;
    validate_price_cents("cost_price", cost)?;
    if let Some(promo) = promo {
        validate_price_cents("promo_price", promo)?;
        if promo > sale {
            return Err(ValidationError::OutOfRange {
                field: "promo_price".to_string(),
                min: 0,
                max: sale,
            });
        }
    }
    Ok(())
}

pub fn validate_new_product(input: &NewProduct) -> ValidationResult<()> {
    validate_product_name(&input.name)?;
    validate_prices(
        input.sale_price_cents,
        input.cost_price_cents,
        input.promo_price_cents,
    )?;
    validate_non_negative("stock_quantity", input.stock_quantity)?;
    validate_non_negative("min_stock", input.min_stock)
}

pub fn validate_product_update(input: &ProductUpdate) -> ValidationResult<()> {
    validate_product_name(&input.name)?;
    validate_prices(
        input.sale_price_cents,
        input.cost_price_cents,
        input.promo_price_cents,
    )?;
    validate_non_negative("min_stock", input.min_stock)
}

pub fn validate_customer(input: &CustomerInput) -> ValidationResult<()> {
    validate_required_text("name", &input.name, MAX_NAME_LEN)?;
    if let Some(email) = input.email.as_deref().filter(|e| !e.trim().is_empty()) {
        validate_email(email)?;
    }
    Ok(())
}

pub fn validate_store(input: &NewStore) -> ValidationResult<()> {
    validate_required_text("name", &input.name, MAX_NAME_LEN).map(|_| ())
}

pub fn validate_new_delivery(input: &NewDelivery) -> ValidationResult<()> {
    validate_uuid(&input.sale_id)?;
    validate_required_text("recipient_name", &input.recipient_name, MAX_NAME_LEN)?;
    validate_required_text("street", &input.street, MAX_NAME_LEN)?;
    validate_required_text("number", &input.number, 20)?;
    validate_required_text("city", &input.city, MAX_NAME_LEN)?;
    validate_price_cents("fee", input.fee_cents)
}

pub fn validate_financial_entry(input: &NewFinancialTransaction) -> ValidationResult<()> {
    validate_required_text("category", &input.category, 100)?;
    if input.amount_cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ```rust
/// use adega_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
