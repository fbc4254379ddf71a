//! Manual stock entries: receipts, removals, losses and physical counts.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;

use super::LifecycleResult;
use crate::repository::{new_id, product, stock};
use adega_core::cancellation::MAX_REASON_LEN;
use adega_core::stock::plan_movement;
use adega_core::validation::validate_required_text;
use adega_core::{CoreError, Product, StockAdjustment, StockMovement, StoreContext};

#[derive(Debug, Clone)]
pub struct InventoryLedger {
    pool: SqlitePool,
}

impl InventoryLedger {
    pub fn new(pool: SqlitePool) -> Self {
        InventoryLedger { pool }
    }

    /// Applies a manual movement and records it.
    ///
    /// ```text
    /// in          old + q
    /// out / loss  max(0, old - q)
    /// adjustment  q            (physical count)
    /// ```
    ///
    /// ## Errors
    /// - `Validation` for a quantity the movement type doesn't accept
    /// - `ProductNotFound` when the product is not in the store
    /// - `ConcurrentModification` when the stock changed between the read
    ///   and the write (not retried)
    pub async fn adjust_stock(
        &self,
        ctx: &StoreContext,
        adjustment: &StockAdjustment,
    ) -> LifecycleResult<StockMovement> {
        let mut tx = self.pool.begin().await?;

        let snapshot = product::find_in_store(&mut *tx, &ctx.store_id, &adjustment.product_id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(adjustment.product_id.clone()))?;

        let movement = apply_adjustment(&mut tx, ctx, adjustment, &snapshot, Utc::now()).await?;

        tx.commit().await?;

        info!(
            product_id = %movement.product_id,
            movement_type = %movement.movement_type,
            previous = movement.previous_stock,
            new = movement.new_stock,
            "Stock adjusted"
        );

        Ok(movement)
    }
}

/// Plans the movement from `snapshot` and writes it with a compare-and-swap.
async fn apply_adjustment(
    conn: &mut SqliteConnection,
    ctx: &StoreContext,
    adjustment: &StockAdjustment,
    snapshot: &Product,
    now: DateTime<Utc>,
) -> LifecycleResult<StockMovement> {
    let change = plan_movement(
        adjustment.movement_type,
        snapshot.stock_quantity,
        adjustment.quantity,
    )?;

    let reason = match adjustment.reason.as_deref() {
        Some(text) if !text.trim().is_empty() => {
            Some(validate_required_text("reason", text, MAX_REASON_LEN)?)
        }
        _ => None,
    };

    let swapped = product::compare_and_set_stock(
        &mut *conn,
        &ctx.store_id,
        &snapshot.id,
        change.previous,
        change.new,
        now,
    )
    .await?;

    if !swapped {
        return Err(CoreError::ConcurrentModification {
            entity: "Product",
            id: snapshot.id.clone(),
        }
        .into());
    }

    let movement = StockMovement {
        id: new_id(),
        store_id: ctx.store_id.clone(),
        product_id: snapshot.id.clone(),
        movement_type: adjustment.movement_type,
        quantity: adjustment.quantity,
        previous_stock: change.previous,
        new_stock: change.new,
        reason,
        sale_id: None,
        created_by: ctx.user_id.clone(),
        created_at: now,
    };
    stock::insert_movement(&mut *conn, &movement).await?;

    Ok(movement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::LifecycleError;
    use crate::repository::testing::{new_product, setup};
    use adega_core::StockMovementType::{self, *};

    fn adjustment(product: &Product, kind: StockMovementType, quantity: i64) -> StockAdjustment {
        StockAdjustment {
            product_id: product.id.clone(),
            movement_type: kind,
            quantity,
            reason: Some("Weekly count".to_string()),
        }
    }

    #[tokio::test]
    async fn test_movement_kinds() {
        let (db, ctx) = setup().await;
        let wine = db.products().create(&ctx, &new_product("Malbec", 10, 4990)).await.unwrap();
        let ledger = db.inventory();

        let m = ledger.adjust_stock(&ctx, &adjustment(&wine, In, 5)).await.unwrap();
        assert_eq!((m.previous_stock, m.new_stock), (10, 15));

        let m = ledger.adjust_stock(&ctx, &adjustment(&wine, Loss, 2)).await.unwrap();
        assert_eq!((m.previous_stock, m.new_stock), (15, 13));

        let m = ledger.adjust_stock(&ctx, &adjustment(&wine, Adjustment, 4)).await.unwrap();
        assert_eq!((m.previous_stock, m.new_stock), (13, 4));

        let m = ledger.adjust_stock(&ctx, &adjustment(&wine, Out, 9)).await.unwrap();
        assert_eq!((m.previous_stock, m.new_stock), (4, 0));

        let stock = db.products().get(&ctx, &wine.id).await.unwrap().unwrap().stock_quantity;
        assert_eq!(stock, 0);

        let history = db.stock_movements().for_product(&ctx, &wine.id, 10).await.unwrap();
        assert_eq!(history.len(), 5);
        assert_eq!(history[0].movement_type, Out);
    }

    #[tokio::test]
    async fn test_invalid_quantities_write_nothing() {
        let (db, ctx) = setup().await;
        let wine = db.products().create(&ctx, &new_product("Malbec", 10, 4990)).await.unwrap();

        for (kind, quantity) in [(In, 0), (Out, -1), (Loss, 0), (Adjustment, -3)] {
            let err = db
                .inventory()
                .adjust_stock(&ctx, &adjustment(&wine, kind, quantity))
                .await
                .unwrap_err();
            assert!(matches!(err, LifecycleError::Core(CoreError::Validation(_))));
        }

        let history = db.stock_movements().for_product(&ctx, &wine.id, 10).await.unwrap();
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_product() {
        let (db, ctx) = setup().await;
        let ghost = StockAdjustment {
            product_id: new_id(),
            movement_type: In,
            quantity: 1,
            reason: None,
        };
        let err = db.inventory().adjust_stock(&ctx, &ghost).await.unwrap_err();
        assert!(matches!(err, LifecycleError::Core(CoreError::ProductNotFound(_))));
    }

    #[tokio::test]
    async fn test_stale_snapshot_is_a_conflict() {
        let (db, ctx) = setup().await;
        let wine = db.products().create(&ctx, &new_product("Malbec", 10, 4990)).await.unwrap();

        // Operator A reads 10, operator B receives 6 bottles meanwhile.
        let stale = db.products().get(&ctx, &wine.id).await.unwrap().unwrap();
        db.inventory().adjust_stock(&ctx, &adjustment(&wine, In, 6)).await.unwrap();

        let mut conn = db.pool().acquire().await.unwrap();
        let err = apply_adjustment(&mut conn, &ctx, &adjustment(&wine, Loss, 1), &stale, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::Core(CoreError::ConcurrentModification { entity: "Product", .. })
        ));
        drop(conn);

        let current = db.products().get(&ctx, &wine.id).await.unwrap().unwrap();
        assert_eq!(current.stock_quantity, 16);
        let history = db.stock_movements().for_product(&ctx, &wine.id, 10).await.unwrap();
        assert_eq!(history.len(), 2);
    }
}
