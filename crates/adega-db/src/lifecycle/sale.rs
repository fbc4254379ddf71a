//! Sale creation and cancellation.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use super::{LifecycleError, LifecycleResult};
use crate::repository::{customer, finance, new_id, product, sale as sales, stock};
use adega_core::cancellation::{
    ensure_cancellable, restock_reason, reversal_description, validate_cancel_reason,
};
use adega_core::checkout::{
    loyalty_points_for, price_lines, requested_quantities, validate_cart, SaleTotals,
};
use adega_core::{
    BusinessCalendar, CoreError, FinancialTransaction, Money, NewSale, Sale, SaleItem, SaleStatus,
    StockMovement, StockMovementType, StoreContext, TransactionType, CATEGORY_SALE,
    CATEGORY_SALE_CANCELLATION,
};

/// Result of a completed checkout.
#[derive(Debug, Clone, Serialize)]
pub struct SaleReceipt {
    pub sale: Sale,
    pub items: Vec<SaleItem>,
    /// Points credited to the attached customer (0 without one).
    pub loyalty_points_awarded: i64,
}

/// Creates and cancels sales, each in a single transaction.
#[derive(Debug, Clone)]
pub struct SaleLifecycle {
    pool: SqlitePool,
    calendar: BusinessCalendar,
}

impl SaleLifecycle {
    pub fn new(pool: SqlitePool, calendar: BusinessCalendar) -> Self {
        SaleLifecycle { pool, calendar }
    }

    /// Checks out a cart.
    ///
    /// ## Errors
    /// - `EmptyCart`, `CartTooLarge`, `QuantityTooLarge`, `InvalidDiscount`,
    ///   `Validation` from the form-level checks
    /// - `CustomerNotFound` when the attached customer is not in the store
    /// - `ProductNotFound` for a missing or inactive product
    /// - `InsufficientStock` when the shelf can't cover the summed request,
    ///   including when a concurrent sale won the guarded decrement
    /// - `InvalidTotal` when the discount eats the whole subtotal
    ///
    /// Nothing is written on any error.
    pub async fn create_sale(&self, ctx: &StoreContext, request: &NewSale) -> LifecycleResult<SaleReceipt> {
        self.create_sale_at(ctx, request, Utc::now()).await
    }

    pub async fn create_sale_at(
        &self,
        ctx: &StoreContext,
        request: &NewSale,
        now: DateTime<Utc>,
    ) -> LifecycleResult<SaleReceipt> {
        validate_cart(request)?;

        let mut tx = self.pool.begin().await?;

        if let Some(customer_id) = &request.customer_id {
            if customer::find_customer(&mut *tx, &ctx.store_id, customer_id)
                .await?
                .is_none()
            {
                return Err(CoreError::CustomerNotFound(customer_id.clone()).into());
            }
        }

        let mut products = HashMap::new();
        for (product_id, _) in requested_quantities(&request.items) {
            if let Some(found) = product::find_in_store(&mut *tx, &ctx.store_id, &product_id).await? {
                products.insert(product_id, found);
            }
        }

        let lines = price_lines(&request.items, &products)?;
        let totals = SaleTotals::compute(&lines, request.discount_cents)?;

        let sale = Sale {
            id: new_id(),
            store_id: ctx.store_id.clone(),
            customer_id: request.customer_id.clone(),
            seller_id: ctx.user_id.clone(),
            status: SaleStatus::Completed,
            subtotal_cents: totals.subtotal.cents(),
            discount_cents: totals.discount.cents(),
            total_cents: totals.total.cents(),
            payment_method: request.payment_method,
            notes: request
                .notes
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(String::from),
            created_at: now,
            cancelled_at: None,
            cancelled_by: None,
            cancel_reason: None,
        };
        sales::insert_sale(&mut *tx, &sale).await?;

        let mut items = Vec::with_capacity(lines.len());
        for line in &lines {
            let item = SaleItem {
                id: new_id(),
                sale_id: sale.id.clone(),
                product_id: line.product_id.clone(),
                product_name: line.product_name.clone(),
                quantity: line.quantity,
                unit_price_cents: line.unit_price.cents(),
                line_total_cents: line.line_total.cents(),
                created_at: now,
            };
            sales::insert_item(&mut *tx, &item).await?;
            items.push(item);
        }

        for line in &lines {
            let new_stock = product::decrement_stock_if_available(
                &mut *tx,
                &ctx.store_id,
                &line.product_id,
                line.quantity,
                now,
            )
            .await?;

            let Some(new_stock) = new_stock else {
                let available = product::find_in_store(&mut *tx, &ctx.store_id, &line.product_id)
                    .await?
                    .map(|p| p.stock_quantity)
                    .unwrap_or(0);
                return Err(CoreError::InsufficientStock {
                    product: line.product_name.clone(),
                    available,
                    requested: line.quantity,
                }
                .into());
            };

            let movement = StockMovement {
                id: new_id(),
                store_id: ctx.store_id.clone(),
                product_id: line.product_id.clone(),
                movement_type: StockMovementType::Out,
                quantity: line.quantity,
                previous_stock: new_stock + line.quantity,
                new_stock,
                reason: Some(format!("Sale {}", sale.id)),
                sale_id: Some(sale.id.clone()),
                created_by: ctx.user_id.clone(),
                created_at: now,
            };
            stock::insert_movement(&mut *tx, &movement).await?;
        }

        let entry = FinancialTransaction {
            id: new_id(),
            store_id: ctx.store_id.clone(),
            transaction_type: TransactionType::In,
            category: CATEGORY_SALE.to_string(),
            description: Some(format!("Sale {}", sale.id)),
            amount_cents: sale.total_cents,
            sale_id: Some(sale.id.clone()),
            created_by: ctx.user_id.clone(),
            created_at: now,
        };
        finance::insert_transaction(&mut *tx, &entry).await?;

        let mut loyalty_points_awarded = 0;
        if let Some(customer_id) = &sale.customer_id {
            loyalty_points_awarded = loyalty_points_for(totals.total);
            customer::add_loyalty_points(&mut *tx, &ctx.store_id, customer_id, loyalty_points_awarded)
                .await?;
        }

        tx.commit().await?;

        info!(
            sale_id = %sale.id,
            store_id = %ctx.store_id,
            items = items.len(),
            total = %totals.total,
            payment_method = %sale.payment_method,
            "Sale completed"
        );

        Ok(SaleReceipt {
            sale,
            items,
            loyalty_points_awarded,
        })
    }

    /// Cancels a sale made on the current business day.
    ///
    /// ## Errors
    /// - `Validation` when the reason is blank
    /// - `SaleNotFound` when the sale is not in the store
    /// - `AlreadyCancelled`, also when a concurrent cancel committed first
    /// - `CancellationWindowExpired` for sales of a previous day
    pub async fn cancel_sale(&self, ctx: &StoreContext, sale_id: &str, reason: &str) -> LifecycleResult<Sale> {
        self.cancel_sale_at(ctx, sale_id, reason, Utc::now()).await
    }

    pub async fn cancel_sale_at(
        &self,
        ctx: &StoreContext,
        sale_id: &str,
        reason: &str,
        now: DateTime<Utc>,
    ) -> LifecycleResult<Sale> {
        let reason = validate_cancel_reason(reason)?;

        let mut tx = self.pool.begin().await?;

        let mut sale = sales::find_sale(&mut *tx, &ctx.store_id, sale_id)
            .await?
            .ok_or_else(|| CoreError::SaleNotFound(sale_id.to_string()))?;

        ensure_cancellable(&sale, now, &self.calendar)?;

        let items = sales::items_of(&mut *tx, &sale.id).await?;
        let movement_reason = restock_reason(&sale.id, &reason);

        for item in &items {
            let restored =
                product::increment_stock(&mut *tx, &ctx.store_id, &item.product_id, item.quantity, now)
                    .await?;

            let Some(new_stock) = restored else {
                warn!(
                    sale_id = %sale.id,
                    product_id = %item.product_id,
                    quantity = item.quantity,
                    "Product no longer exists, skipping restock"
                );
                continue;
            };

            let movement = StockMovement {
                id: new_id(),
                store_id: ctx.store_id.clone(),
                product_id: item.product_id.clone(),
                movement_type: StockMovementType::In,
                quantity: item.quantity,
                previous_stock: new_stock - item.quantity,
                new_stock,
                reason: Some(movement_reason.clone()),
                sale_id: Some(sale.id.clone()),
                created_by: ctx.user_id.clone(),
                created_at: now,
            };
            stock::insert_movement(&mut *tx, &movement).await?;
        }

        let flipped =
            sales::mark_cancelled(&mut *tx, &ctx.store_id, &sale.id, &ctx.user_id, &reason, now).await?;
        if !flipped {
            return Err(LifecycleError::Core(CoreError::AlreadyCancelled(sale.id.clone())));
        }

        let entry = FinancialTransaction {
            id: new_id(),
            store_id: ctx.store_id.clone(),
            transaction_type: TransactionType::Out,
            category: CATEGORY_SALE_CANCELLATION.to_string(),
            description: Some(reversal_description(&sale.id, &reason)),
            amount_cents: sale.total_cents,
            sale_id: Some(sale.id.clone()),
            created_by: ctx.user_id.clone(),
            created_at: now,
        };
        finance::insert_transaction(&mut *tx, &entry).await?;

        if let Some(customer_id) = &sale.customer_id {
            let points = loyalty_points_for(Money::from_cents(sale.total_cents));
            debug!(customer_id = %customer_id, points, "Reversing loyalty points");
            customer::add_loyalty_points(&mut *tx, &ctx.store_id, customer_id, -points).await?;
        }

        tx.commit().await?;

        info!(
            sale_id = %sale.id,
            store_id = %ctx.store_id,
            restocked_items = items.len(),
            "Sale cancelled"
        );

        sale.status = SaleStatus::Cancelled;
        sale.cancelled_at = Some(now);
        sale.cancelled_by = Some(ctx.user_id.clone());
        sale.cancel_reason = Some(reason);
        Ok(sale)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
