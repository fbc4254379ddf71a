//! # Financial Transaction Repository
//!
//! Append-only money ledger. Sales post `in / sale`, cancellations post
//! `out / sale_cancellation`, operators post everything else by hand.
//!
//! ```text
//! ┌──────────┬────────┬────────────────────┬──────────┬─────────┐
//! │ created  │ type   │ category           │ amount   │ sale_id │
//! ├──────────┼────────┼────────────────────┼──────────┼─────────┤
//! │ 10:02    │ in     │ sale               │  5970    │ s-1     │
//! │ 10:40    │ out    │ sale_cancellation  │  5970    │ s-1     │
//! │ 11:15    │ out    │ supplier           │ 32000    │ -       │
//! └──────────┴────────┴────────────────────┴──────────┴─────────┘
//! ```

use chrono::Utc;
use sqlx::{Executor, QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use crate::repository::{new_id, push_range};
use adega_core::{DateRange, FinancialTransaction, NewFinancialTransaction, StoreContext};

const TRANSACTION_COLUMNS: &str = "id, store_id, transaction_type, category, description, \
     amount_cents, sale_id, created_by, created_at";

#[derive(Debug, Clone)]
pub struct FinancialRepository {
    pool: SqlitePool,
}

impl FinancialRepository {
    pub fn new(pool: SqlitePool) -> Self {
        FinancialRepository { pool }
    }

    /// Posts a manual entry (expenses, supplier payments, cash float).
    pub async fn record(
        &self,
        ctx: &StoreContext,
        input: &NewFinancialTransaction,
    ) -> DbResult<FinancialTransaction> {
        let entry = FinancialTransaction {
            id: new_id(),
            store_id: ctx.store_id.clone(),
            transaction_type: input.transaction_type,
            category: input.category.trim().to_string(),
            description: input.description.clone(),
            amount_cents: input.amount_cents,
            sale_id: None,
            created_by: ctx.user_id.clone(),
            created_at: Utc::now(),
        };

        insert_transaction(&self.pool, &entry).await?;
        Ok(entry)
    }

    /// Entries in a period, newest first.
    pub async fn list(
        &self,
        ctx: &StoreContext,
        range: &DateRange,
        limit: i64,
    ) -> DbResult<Vec<FinancialTransaction>> {
        let mut qb = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {TRANSACTION_COLUMNS} FROM financial_transactions WHERE store_id = "
        ));
        qb.push_bind(&ctx.store_id);
        push_range(&mut qb, "created_at", range);
        qb.push(" ORDER BY created_at DESC, rowid DESC LIMIT ")
            .push_bind(limit.clamp(1, 1000));

        let entries = qb
            .build_query_as::<FinancialTransaction>()
            .fetch_all(&self.pool)
            .await?;

        Ok(entries)
    }

    /// Entries linked to a sale, oldest first.
    pub async fn for_sale(
        &self,
        ctx: &StoreContext,
        sale_id: &str,
    ) -> DbResult<Vec<FinancialTransaction>> {
        let entries = sqlx::query_as::<_, FinancialTransaction>(&format!(
            r#"
            SELECT {TRANSACTION_COLUMNS} FROM financial_transactions
            WHERE store_id = ? AND sale_id = ?
            ORDER BY created_at ASC, rowid ASC
            "#
        ))
        .bind(&ctx.store_id)
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}

// =============================================================================
// Executor-level queries (usable inside transactions)
// =============================================================================

pub(crate) async fn insert_transaction<'e, E>(
    executor: E,
    entry: &FinancialTransaction,
) -> DbResult<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    debug!(
        transaction_type = %entry.transaction_type,
        category = %entry.category,
        amount_cents = entry.amount_cents,
        "Posting financial transaction"
    );

    sqlx::query(
        r#"
        INSERT INTO financial_transactions (
            id, store_id, transaction_type, category, description,
            amount_cents, sale_id, created_by, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&entry.id)
    .bind(&entry.store_id)
    .bind(entry.transaction_type)
    .bind(&entry.category)
    .bind(&entry.description)
    .bind(entry.amount_cents)
    .bind(&entry.sale_id)
    .bind(&entry.created_by)
    .bind(entry.created_at)
    .execute(executor)
    .await?;

    Ok(())
}
