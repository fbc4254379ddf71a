//! # Domain Types
//!
//! Core domain types used throughout Adega.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │        Store (tenant boundary, every row below carries store_id)       │
//! │          │                                                              │
//! │  ┌───────┴─────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │   Customer      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  category       │◄──│  SaleItem[]     │──►│  loyalty_points │       │
//! │  │  stock_quantity │   │  status         │   │  birth_date     │       │
//! │  │  sale_price     │   │  total_cents    │   └─────────────────┘       │
//! │  └───────┬─────────┘   └───────┬─────────┘                             │
//! │          │                     │                                        │
//! │  ┌───────▼─────────┐   ┌───────▼──────────────┐   ┌────────────────┐   │
//! │  │ StockMovement   │   │ FinancialTransaction │   │   Delivery     │   │
//! │  │ (append-only)   │   │ (append-only)        │   │ (1 per sale)   │   │
//! │  └─────────────────┘   └──────────────────────┘   └────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Closed Enumerations
//! Category, payment method and every status are Rust enums stored as
//! snake_case TEXT. Matching on them is exhaustive, so a new variant
//! forces every rule that depends on it to be revisited.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::VIP_POINTS_THRESHOLD;

// =============================================================================
// Enum helper
// =============================================================================

/// Implements `as_str` and `Display` with the same snake_case names that
/// serde and sqlx use.
macro_rules! snake_case_names {
    ($ty:ident { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            /// All variants, in declaration order.
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            /// Stable snake_case name (matches the database value).
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $name),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

// =============================================================================
// Product Category
// =============================================================================

/// What a product is. Drives the category breakdown report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    RedWine,
    WhiteWine,
    RoseWine,
    Sparkling,
    Beer,
    Whisky,
    Vodka,
    Gin,
    Rum,
    Cachaca,
    Liqueur,
    SoftDrink,
    Water,
    Juice,
    EnergyDrink,
    Snack,
    Accessory,
    Other,
}

snake_case_names!(ProductCategory {
    RedWine => "red_wine",
    WhiteWine => "white_wine",
    RoseWine => "rose_wine",
    Sparkling => "sparkling",
    Beer => "beer",
    Whisky => "whisky",
    Vodka => "vodka",
    Gin => "gin",
    Rum => "rum",
    Cachaca => "cachaca",
    Liqueur => "liqueur",
    SoftDrink => "soft_drink",
    Water => "water",
    Juice => "juice",
    EnergyDrink => "energy_drink",
    Snack => "snack",
    Accessory => "accessory",
    Other => "other",
});

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Store this product belongs to.
    pub store_id: String,

    /// Display name shown at checkout and on the sale export.
    pub name: String,

    pub description: Option<String>,

    pub category: ProductCategory,

    /// Purchase cost in cents (for margin reports).
    pub cost_price_cents: i64,

    /// Regular shelf price in cents.
    pub sale_price_cents: i64,

    /// Promotional price in cents, when a promotion is running.
    pub promo_price_cents: Option<i64>,

    /// Current stock. Never negative (database CHECK).
    pub stock_quantity: i64,

    /// Reorder threshold.
    pub min_stock: i64,

    /// Public URL of the product photo.
    pub image_url: Option<String>,

    /// Whether product is active (soft delete).
    pub is_active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Price charged at checkout when the cart does not carry one.
    ///
    /// The promotional price wins only when it is actually lower.
    pub fn effective_price(&self) -> Money {
        match self.promo_price_cents {
            Some(promo) if promo < self.sale_price_cents => Money::from_cents(promo),
            _ => Money::from_cents(self.sale_price_cents),
        }
    }

    /// Stock at or below the reorder threshold.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.stock_quantity <= self.min_stock
    }

    /// Checks whether `quantity` units can leave the shelf.
    #[inline]
    pub fn can_sell(&self, quantity: i64) -> bool {
        self.is_active && self.stock_quantity >= quantity
    }
}

/// Input for creating a product.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: ProductCategory,
    pub cost_price_cents: i64,
    pub sale_price_cents: i64,
    #[serde(default)]
    pub promo_price_cents: Option<i64>,
    #[serde(default)]
    pub stock_quantity: i64,
    #[serde(default)]
    pub min_stock: i64,
}

/// Input for editing a product.
///
/// Stock is deliberately absent: it only changes through sales and the
/// inventory ledger, so every change leaves a movement behind.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductUpdate {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: ProductCategory,
    pub cost_price_cents: i64,
    pub sale_price_cents: i64,
    #[serde(default)]
    pub promo_price_cents: Option<i64>,
    pub min_stock: i64,
}

// =============================================================================
// Sale Status
// =============================================================================

/// The status of a sale.
///
/// ```text
///   pending ──┐
///             ├──► cancelled (terminal)
///   completed ┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    /// Recorded but not paid yet.
    Pending,
    /// Paid; stock and ledger already reflect it.
    Completed,
    /// Reversed. No way back.
    Cancelled,
}

snake_case_names!(SaleStatus {
    Pending => "pending",
    Completed => "completed",
    Cancelled => "cancelled",
});

impl SaleStatus {
    pub const fn can_cancel(&self) -> bool {
        match self {
            SaleStatus::Pending | SaleStatus::Completed => true,
            SaleStatus::Cancelled => false,
        }
    }
}

impl Default for SaleStatus {
    fn default() -> Self {
        SaleStatus::Completed
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    /// Instant bank transfer.
    Pix,
    Credit,
    Debit,
    /// Meal / gift voucher cards.
    Voucher,
}

snake_case_names!(PaymentMethod {
    Cash => "cash",
    Pix => "pix",
    Credit => "credit",
    Debit => "debit",
    Voucher => "voucher",
});

// =============================================================================
// Sale
// =============================================================================

/// A checkout. Created once, afterwards only the cancellation fields change.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: String,
    pub store_id: String,
    pub customer_id: Option<String>,
    /// User who rang up the sale.
    pub seller_id: String,
    pub status: SaleStatus,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    /// subtotal - discount, always > 0.
    pub total_cents: i64,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancelled_by: Option<String>,
    pub cancel_reason: Option<String>,
}

impl Sale {
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.status == SaleStatus::Cancelled
    }
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line item in a sale.
/// Uses snapshot pattern to freeze the product name and price at time of sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub product_name: String,
    pub quantity: i64,
    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
    /// unit_price × quantity.
    pub line_total_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// One cart line submitted at checkout.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLine {
    pub product_id: String,
    pub quantity: i64,
    /// Price agreed at the counter. Falls back to the product's effective
    /// price when absent.
    #[serde(default)]
    pub unit_price_cents: Option<i64>,
}

/// Checkout request.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewSale {
    pub items: Vec<CartLine>,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub discount_cents: i64,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A sale together with its line items.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleWithItems {
    pub sale: Sale,
    pub items: Vec<SaleItem>,
}

/// Filters for listing and exporting sales.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleFilter {
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub from: Option<DateTime<Utc>>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub to: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<SaleStatus>,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
}

impl SaleFilter {
    pub fn range(&self) -> DateRange {
        DateRange {
            from: self.from,
            to: self.to,
        }
    }
}

// =============================================================================
// Stock Movement
// =============================================================================

/// Kind of stock change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StockMovementType {
    /// Goods received (adds).
    In,
    /// Goods left the shelf (subtracts).
    Out,
    /// Physical count (sets the absolute value).
    Adjustment,
    /// Breakage, theft, expiry (subtracts).
    Loss,
}

snake_case_names!(StockMovementType {
    In => "in",
    Out => "out",
    Adjustment => "adjustment",
    Loss => "loss",
});

/// Append-only audit record of a stock change.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StockMovement {
    pub id: String,
    pub store_id: String,
    pub product_id: String,
    pub movement_type: StockMovementType,
    pub quantity: i64,
    pub previous_stock: i64,
    pub new_stock: i64,
    pub reason: Option<String>,
    /// Set when the movement was caused by a sale or its cancellation.
    pub sale_id: Option<String>,
    pub created_by: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Manual stock entry.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockAdjustment {
    pub product_id: String,
    pub movement_type: StockMovementType,
    pub quantity: i64,
    #[serde(default)]
    pub reason: Option<String>,
}

// =============================================================================
// Financial Transaction
// =============================================================================

/// Direction of money.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    In,
    Out,
}

snake_case_names!(TransactionType {
    In => "in",
    Out => "out",
});

/// Append-only ledger entry.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct FinancialTransaction {
    pub id: String,
    pub store_id: String,
    pub transaction_type: TransactionType,
    /// Free-form; see [`crate::CATEGORY_SALE`] and [`crate::CATEGORY_SALE_CANCELLATION`].
    pub category: String,
    pub description: Option<String>,
    /// Always positive; direction comes from `transaction_type`.
    pub amount_cents: i64,
    pub sale_id: Option<String>,
    pub created_by: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl FinancialTransaction {
    /// Amount with sign: positive for money in, negative for money out.
    pub fn signed_amount(&self) -> Money {
        match self.transaction_type {
            TransactionType::In => Money::from_cents(self.amount_cents),
            TransactionType::Out => Money::from_cents(-self.amount_cents),
        }
    }
}

/// Manual ledger entry (expenses, supplier payments, cash float).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewFinancialTransaction {
    pub transaction_type: TransactionType,
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    pub amount_cents: i64,
}

// =============================================================================
// Delivery
// =============================================================================

/// Delivery progress.
///
/// ```text
/// pending ──► preparing ──► en_route ──► delivered
///    │            │             │
///    └────────────┴─────────────┴──────► cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Pending,
    Preparing,
    EnRoute,
    Delivered,
    Cancelled,
}

snake_case_names!(DeliveryStatus {
    Pending => "pending",
    Preparing => "preparing",
    EnRoute => "en_route",
    Delivered => "delivered",
    Cancelled => "cancelled",
});

impl DeliveryStatus {
    /// The single forward step, if any.
    pub const fn next(&self) -> Option<DeliveryStatus> {
        match self {
            DeliveryStatus::Pending => Some(DeliveryStatus::Preparing),
            DeliveryStatus::Preparing => Some(DeliveryStatus::EnRoute),
            DeliveryStatus::EnRoute => Some(DeliveryStatus::Delivered),
            DeliveryStatus::Delivered | DeliveryStatus::Cancelled => None,
        }
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(self, DeliveryStatus::Delivered | DeliveryStatus::Cancelled)
    }

    /// Forward one step, or cancel from any non-terminal state.
    pub fn can_transition_to(&self, to: DeliveryStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        to == DeliveryStatus::Cancelled || self.next() == Some(to)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Delivery {
    pub id: String,
    pub store_id: String,
    pub sale_id: String,
    pub recipient_name: String,
    pub phone: Option<String>,
    pub street: String,
    pub number: String,
    pub complement: Option<String>,
    pub neighborhood: Option<String>,
    pub city: String,
    /// Landmark to help the courier.
    pub reference: Option<String>,
    pub fee_cents: i64,
    pub status: DeliveryStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    /// Set only on transition to delivered.
    #[ts(as = "Option<String>")]
    pub delivered_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewDelivery {
    pub sale_id: String,
    pub recipient_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub street: String,
    pub number: String,
    #[serde(default)]
    pub complement: Option<String>,
    #[serde(default)]
    pub neighborhood: Option<String>,
    pub city: String,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub fee_cents: i64,
}

// =============================================================================
// Customer
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    pub id: String,
    pub store_id: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    #[ts(as = "Option<String>")]
    pub birth_date: Option<NaiveDate>,
    /// Never negative.
    pub loyalty_points: i64,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    #[inline]
    pub fn is_vip(&self) -> bool {
        self.loyalty_points >= VIP_POINTS_THRESHOLD
    }
}

/// Input for creating or editing a customer.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerInput {
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

// =============================================================================
// Store & Profile
// =============================================================================

/// Tenant boundary.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Store {
    pub id: String,
    pub name: String,
    /// Company tax id.
    pub document: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewStore {
    pub name: String,
    #[serde(default)]
    pub document: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// Role of a user inside a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StoreRole {
    Owner,
    Manager,
    Seller,
}

snake_case_names!(StoreRole {
    Owner => "owner",
    Manager => "manager",
    Seller => "seller",
});

/// A user account. The password hash never leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip)]
    pub password_hash: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Reports
// =============================================================================

/// Half-open period `[from, to)`. Missing bounds are open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DateRange {
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub from: Option<DateTime<Utc>>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub to: Option<DateTime<Utc>>,
}

/// Sales totals over a period.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SalesSummary {
    pub completed_count: i64,
    pub cancelled_count: i64,
    pub gross_cents: i64,
    pub discount_cents: i64,
    pub net_cents: i64,
    /// net / completed_count, truncated. Zero with no sales.
    pub average_ticket_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CategoryTotal {
    pub category: ProductCategory,
    pub quantity: i64,
    pub revenue_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct TopProduct {
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    pub revenue_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct DailyTotal {
    /// Business-day date, `YYYY-MM-DD`.
    pub day: String,
    pub sales_count: i64,
    pub total_cents: i64,
}

/// Ledger totals over a period.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct FinancialSummary {
    pub total_in_cents: i64,
    pub total_out_cents: i64,
    pub balance_cents: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(stock: i64, min: i64, price: i64, promo: Option<i64>) -> Product {
        Product {
            id: "p-1".to_string(),
            store_id: "s-1".to_string(),
            name: "Malbec".to_string(),
            description: None,
            category: ProductCategory::RedWine,
            cost_price_cents: 3000,
            sale_price_cents: price,
            promo_price_cents: promo,
            stock_quantity: stock,
            min_stock: min,
            image_url: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_effective_price_prefers_lower_promo() {
        assert_eq!(product(1, 0, 5000, Some(4500)).effective_price().cents(), 4500);
        assert_eq!(product(1, 0, 5000, Some(5500)).effective_price().cents(), 5000);
        assert_eq!(product(1, 0, 5000, None).effective_price().cents(), 5000);
    }

    #[test]
    fn test_low_stock_includes_threshold() {
        assert!(product(5, 5, 100, None).is_low_stock());
        assert!(!product(6, 5, 100, None).is_low_stock());
    }

    #[test]
    fn test_sale_status_can_cancel() {
        assert!(SaleStatus::Pending.can_cancel());
        assert!(SaleStatus::Completed.can_cancel());
        assert!(!SaleStatus::Cancelled.can_cancel());
    }

    #[test]
    fn test_delivery_chain_is_linear() {
        use DeliveryStatus::*;

        assert!(Pending.can_transition_to(Preparing));
        assert!(Preparing.can_transition_to(EnRoute));
        assert!(EnRoute.can_transition_to(Delivered));

        assert!(!Pending.can_transition_to(EnRoute));
        assert!(!Pending.can_transition_to(Delivered));
        assert!(!EnRoute.can_transition_to(Preparing));
        assert!(!Pending.can_transition_to(Pending));
    }

    #[test]
    fn test_delivery_cancel_from_any_open_state() {
        use DeliveryStatus::*;

        for from in [Pending, Preparing, EnRoute] {
            assert!(from.can_transition_to(Cancelled), "{from} -> cancelled");
        }
        assert!(!Delivered.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Pending));
    }

    #[test]
    fn test_enum_names_match_serde() {
        for category in ProductCategory::ALL {
            let json = serde_json::to_string(category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.as_str()));
        }
        assert_eq!(DeliveryStatus::EnRoute.to_string(), "en_route");
        assert_eq!(PaymentMethod::Pix.as_str(), "pix");
    }

    #[test]
    fn test_signed_amount() {
        let mut tx = FinancialTransaction {
            id: "t".to_string(),
            store_id: "s".to_string(),
            transaction_type: TransactionType::In,
            category: crate::CATEGORY_SALE.to_string(),
            description: None,
            amount_cents: 1500,
            sale_id: None,
            created_by: "u".to_string(),
            created_at: Utc::now(),
        };
        assert_eq!(tx.signed_amount().cents(), 1500);
        tx.transaction_type = TransactionType::Out;
        assert_eq!(tx.signed_amount().cents(), -1500);
    }

    #[test]
    fn test_profile_never_serializes_hash() {
        let profile = Profile {
            id: "u".to_string(),
            name: "Ana".to_string(),
            email: "ana@adega.test".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&profile).unwrap();
        assert!(!json.contains("argon2"));
    }
}
