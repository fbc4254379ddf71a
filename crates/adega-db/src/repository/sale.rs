//! # Sale Repository
//!
//! Reads over sales and their line items. Writes happen only inside
//! [`SaleLifecycle`](crate::lifecycle::SaleLifecycle) transactions, through
//! the executor functions at the bottom of this file.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. CREATE (one transaction)                                           │
//! │     └── insert_sale()  → Sale { status: completed }                    │
//! │     └── insert_item()  × N  (name and price frozen)                    │
//! │                                                                         │
//! │  2. (OPTIONAL) CANCEL, same business day                               │
//! │     └── mark_cancelled() → Sale { status: cancelled }                  │
//! │         guarded by status <> 'cancelled'                               │
//! │                                                                         │
//! │  Line items never change after step 1.                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{Executor, QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use crate::repository::push_range;
use adega_core::export::SaleExport;
use adega_core::{Sale, SaleFilter, SaleItem, SaleWithItems, StoreContext};

const SALE_COLUMNS: &str = "id, store_id, customer_id, seller_id, status, subtotal_cents, \
     discount_cents, total_cents, payment_method, notes, created_at, cancelled_at, \
     cancelled_by, cancel_reason";

const ITEM_COLUMNS: &str =
    "id, sale_id, product_id, product_name, quantity, unit_price_cents, line_total_cents, created_at";

/// Default page size of the sales list.
const DEFAULT_LIST_LIMIT: i64 = 100;

/// Upper bound of sales rendered into one export.
const MAX_EXPORT_SALES: i64 = 10_000;

/// Sale row joined with the customer's display name.
#[derive(Debug, sqlx::FromRow)]
struct SaleWithCustomer {
    #[sqlx(flatten)]
    sale: Sale,
    customer_name: Option<String>,
}

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Gets a sale header.
    pub async fn get(&self, ctx: &StoreContext, id: &str) -> DbResult<Option<Sale>> {
        find_sale(&self.pool, &ctx.store_id, id).await
    }

    /// Gets a sale with its line items.
    pub async fn get_with_items(
        &self,
        ctx: &StoreContext,
        id: &str,
    ) -> DbResult<Option<SaleWithItems>> {
        let Some(sale) = self.get(ctx, id).await? else {
            return Ok(None);
        };
        let items = items_of(&self.pool, &sale.id).await?;

        Ok(Some(SaleWithItems { sale, items }))
    }

    /// Line items of a sale, in insertion order.
    pub async fn items(&self, ctx: &StoreContext, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        if self.get(ctx, sale_id).await?.is_none() {
            return Ok(Vec::new());
        }
        items_of(&self.pool, sale_id).await
    }

    /// Lists sales matching the filter, newest first.
    pub async fn list(&self, ctx: &StoreContext, filter: &SaleFilter) -> DbResult<Vec<Sale>> {
        debug!(?filter, "Listing sales");

        let mut qb = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE store_id = "
        ));
        qb.push_bind(&ctx.store_id);
        push_sale_filter(&mut qb, "", filter);
        qb.push(" ORDER BY created_at DESC, rowid DESC LIMIT ")
            .push_bind(filter.limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, 1000));

        let sales = qb.build_query_as::<Sale>().fetch_all(&self.pool).await?;
        Ok(sales)
    }

    /// Sales with customer names and items, oldest first, for the CSV export.
    pub async fn list_for_export(
        &self,
        ctx: &StoreContext,
        filter: &SaleFilter,
    ) -> DbResult<Vec<SaleExport>> {
        let mut qb = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT s.id, s.store_id, s.customer_id, s.seller_id, s.status,
                   s.subtotal_cents, s.discount_cents, s.total_cents, s.payment_method,
                   s.notes, s.created_at, s.cancelled_at, s.cancelled_by, s.cancel_reason,
                   c.name AS customer_name
            FROM sales s
            LEFT JOIN customers c ON c.id = s.customer_id
            WHERE s.store_id = "#,
        );
        qb.push_bind(&ctx.store_id);
        push_sale_filter(&mut qb, "s.", filter);
        qb.push(" ORDER BY s.created_at ASC, s.rowid ASC LIMIT ")
            .push_bind(filter.limit.unwrap_or(MAX_EXPORT_SALES).clamp(1, MAX_EXPORT_SALES));

        let rows = qb
            .build_query_as::<SaleWithCustomer>()
            .fetch_all(&self.pool)
            .await?;

        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let mut items_qb = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {ITEM_COLUMNS} FROM sale_items WHERE sale_id IN ("
        ));
        let mut ids = items_qb.separated(", ");
        for row in &rows {
            ids.push_bind(row.sale.id.clone());
        }
        ids.push_unseparated(") ORDER BY created_at ASC, rowid ASC");

        let items = items_qb
            .build_query_as::<SaleItem>()
            .fetch_all(&self.pool)
            .await?;

        let mut by_sale: HashMap<String, Vec<SaleItem>> = HashMap::new();
        for item in items {
            by_sale.entry(item.sale_id.clone()).or_default().push(item);
        }

        debug!(sales = rows.len(), "Prepared sales export");

        Ok(rows
            .into_iter()
            .map(|row| SaleExport {
                items: by_sale.remove(&row.sale.id).unwrap_or_default(),
                customer_name: row.customer_name,
                sale: row.sale,
            })
            .collect())
    }
}

fn push_sale_filter<'a>(qb: &mut QueryBuilder<'a, Sqlite>, alias: &str, filter: &'a SaleFilter) {
    push_range(qb, &format!("{alias}created_at"), &filter.range());

    if let Some(status) = filter.status {
        qb.push(format!(" AND {alias}status = ")).push_bind(status);
    }
    if let Some(method) = filter.payment_method {
        qb.push(format!(" AND {alias}payment_method = "))
            .push_bind(method);
    }
    if let Some(customer_id) = &filter.customer_id {
        qb.push(format!(" AND {alias}customer_id = "))
            .push_bind(customer_id);
    }
}

// =============================================================================
// Executor-level queries (usable inside transactions)
// =============================================================================

pub(crate) async fn find_sale<'e, E>(executor: E, store_id: &str, id: &str) -> DbResult<Option<Sale>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sale = sqlx::query_as::<_, Sale>(&format!(
        "SELECT {SALE_COLUMNS} FROM sales WHERE id = ? AND store_id = ?"
    ))
    .bind(id)
    .bind(store_id)
    .fetch_optional(executor)
    .await?;

    Ok(sale)
}

pub(crate) async fn items_of<'e, E>(executor: E, sale_id: &str) -> DbResult<Vec<SaleItem>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let items = sqlx::query_as::<_, SaleItem>(&format!(
        "SELECT {ITEM_COLUMNS} FROM sale_items WHERE sale_id = ? ORDER BY created_at ASC, rowid ASC"
    ))
    .bind(sale_id)
    .fetch_all(executor)
    .await?;

    Ok(items)
}

pub(crate) async fn insert_sale<'e, E>(executor: E, sale: &Sale) -> DbResult<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    debug!(id = %sale.id, total_cents = sale.total_cents, "Inserting sale");

    sqlx::query(
        r#"
        INSERT INTO sales (
            id, store_id, customer_id, seller_id, status, subtotal_cents,
            discount_cents, total_cents, payment_method, notes, created_at,
            cancelled_at, cancelled_by, cancel_reason
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&sale.id)
    .bind(&sale.store_id)
    .bind(&sale.customer_id)
    .bind(&sale.seller_id)
    .bind(sale.status)
    .bind(sale.subtotal_cents)
    .bind(sale.discount_cents)
    .bind(sale.total_cents)
    .bind(sale.payment_method)
    .bind(&sale.notes)
    .bind(sale.created_at)
    .bind(sale.cancelled_at)
    .bind(&sale.cancelled_by)
    .bind(&sale.cancel_reason)
    .execute(executor)
    .await?;

    Ok(())
}

pub(crate) async fn insert_item<'e, E>(executor: E, item: &SaleItem) -> DbResult<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO sale_items (
            id, sale_id, product_id, product_name, quantity,
            unit_price_cents, line_total_cents, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&item.id)
    .bind(&item.sale_id)
    .bind(&item.product_id)
    .bind(&item.product_name)
    .bind(item.quantity)
    .bind(item.unit_price_cents)
    .bind(item.line_total_cents)
    .bind(item.created_at)
    .execute(executor)
    .await?;

    Ok(())
}

/// Flips a sale to cancelled. Returns `false` when it already was.
pub(crate) async fn mark_cancelled<'e, E>(
    executor: E,
    store_id: &str,
    id: &str,
    cancelled_by: &str,
    reason: &str,
    at: DateTime<Utc>,
) -> DbResult<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        UPDATE sales
        SET status = 'cancelled', cancelled_at = ?, cancelled_by = ?, cancel_reason = ?
        WHERE id = ? AND store_id = ? AND status <> 'cancelled'
        "#,
    )
    .bind(at)
    .bind(cancelled_by)
    .bind(reason)
    .bind(id)
    .bind(store_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() == 1)
}
