//! # Stock Movement Repository
//!
//! Append-only audit trail of stock changes. Rows are written by the sale
//! lifecycle and the inventory ledger, never updated or deleted.

use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use adega_core::{StockMovement, StoreContext};

const MOVEMENT_COLUMNS: &str = "id, store_id, product_id, movement_type, quantity, \
     previous_stock, new_stock, reason, sale_id, created_by, created_at";

#[derive(Debug, Clone)]
pub struct StockMovementRepository {
    pool: SqlitePool,
}

impl StockMovementRepository {
    pub fn new(pool: SqlitePool) -> Self {
        StockMovementRepository { pool }
    }

    /// Latest movements of the store, newest first.
    pub async fn list(&self, ctx: &StoreContext, limit: i64) -> DbResult<Vec<StockMovement>> {
        let movements = sqlx::query_as::<_, StockMovement>(&format!(
            r#"
            SELECT {MOVEMENT_COLUMNS} FROM stock_movements
            WHERE store_id = ?
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?
            "#
        ))
        .bind(&ctx.store_id)
        .bind(limit.clamp(1, 1000))
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }

    /// History of one product, newest first.
    pub async fn for_product(
        &self,
        ctx: &StoreContext,
        product_id: &str,
        limit: i64,
    ) -> DbResult<Vec<StockMovement>> {
        let movements = sqlx::query_as::<_, StockMovement>(&format!(
            r#"
            SELECT {MOVEMENT_COLUMNS} FROM stock_movements
            WHERE store_id = ? AND product_id = ?
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?
            "#
        ))
        .bind(&ctx.store_id)
        .bind(product_id)
        .bind(limit.clamp(1, 1000))
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }

    /// Movements caused by a sale and its cancellation, oldest first.
    pub async fn for_sale(&self, ctx: &StoreContext, sale_id: &str) -> DbResult<Vec<StockMovement>> {
        let movements = sqlx::query_as::<_, StockMovement>(&format!(
            r#"
            SELECT {MOVEMENT_COLUMNS} FROM stock_movements
            WHERE store_id = ? AND sale_id = ?
            ORDER BY created_at ASC, rowid ASC
            "#
        ))
        .bind(&ctx.store_id)
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }
}

// =============================================================================
// Executor-level queries (usable inside transactions)
// =============================================================================

pub(crate) async fn insert_movement<'e, E>(executor: E, movement: &StockMovement) -> DbResult<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    debug!(
        product_id = %movement.product_id,
        movement_type = %movement.movement_type,
        previous = movement.previous_stock,
        new = movement.new_stock,
        "Recording stock movement"
    );

    sqlx::query(
        r#"
        INSERT INTO stock_movements (
            id, store_id, product_id, movement_type, quantity,
            previous_stock, new_stock, reason, sale_id, created_by, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&movement.id)
    .bind(&movement.store_id)
    .bind(&movement.product_id)
    .bind(movement.movement_type)
    .bind(movement.quantity)
    .bind(movement.previous_stock)
    .bind(movement.new_stock)
    .bind(&movement.reason)
    .bind(&movement.sale_id)
    .bind(&movement.created_by)
    .bind(movement.created_at)
    .execute(executor)
    .await?;

    Ok(())
}
