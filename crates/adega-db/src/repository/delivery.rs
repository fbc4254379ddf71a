//! # Delivery Repository
//!
//! Reads over deliveries. Scheduling and status changes go through
//! [`DeliveryTracker`](crate::lifecycle::DeliveryTracker).

use chrono::{DateTime, Utc};
use sqlx::{Executor, QueryBuilder, Sqlite, SqlitePool};

use crate::error::DbResult;
use adega_core::{Delivery, DeliveryStatus, StoreContext};

const DELIVERY_COLUMNS: &str = "id, store_id, sale_id, recipient_name, phone, street, number, \
     complement, neighborhood, city, reference, fee_cents, status, created_at, updated_at, \
     delivered_at";

#[derive(Debug, Clone)]
pub struct DeliveryRepository {
    pool: SqlitePool,
}

impl DeliveryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        DeliveryRepository { pool }
    }

    pub async fn get(&self, ctx: &StoreContext, id: &str) -> DbResult<Option<Delivery>> {
        find_delivery(&self.pool, &ctx.store_id, id).await
    }

    /// The delivery scheduled for a sale, if any.
    pub async fn for_sale(&self, ctx: &StoreContext, sale_id: &str) -> DbResult<Option<Delivery>> {
        let delivery = sqlx::query_as::<_, Delivery>(&format!(
            "SELECT {DELIVERY_COLUMNS} FROM deliveries WHERE sale_id = ? AND store_id = ?"
        ))
        .bind(sale_id)
        .bind(&ctx.store_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(delivery)
    }

    /// Deliveries of the store, optionally in one status, oldest first so
    /// the courier queue reads top-down.
    pub async fn list(
        &self,
        ctx: &StoreContext,
        status: Option<DeliveryStatus>,
    ) -> DbResult<Vec<Delivery>> {
        let mut qb = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {DELIVERY_COLUMNS} FROM deliveries WHERE store_id = "
        ));
        qb.push_bind(&ctx.store_id);
        if let Some(status) = status {
            qb.push(" AND status = ").push_bind(status);
        }
        qb.push(" ORDER BY created_at ASC, rowid ASC LIMIT 500");

        let deliveries = qb.build_query_as::<Delivery>().fetch_all(&self.pool).await?;
        Ok(deliveries)
    }
}

// =============================================================================
// Executor-level queries (usable inside transactions)
// =============================================================================

pub(crate) async fn find_delivery<'e, E>(
    executor: E,
    store_id: &str,
    id: &str,
) -> DbResult<Option<Delivery>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let delivery = sqlx::query_as::<_, Delivery>(&format!(
        "SELECT {DELIVERY_COLUMNS} FROM deliveries WHERE id = ? AND store_id = ?"
    ))
    .bind(id)
    .bind(store_id)
    .fetch_optional(executor)
    .await?;

    Ok(delivery)
}

pub(crate) async fn insert_delivery<'e, E>(executor: E, delivery: &Delivery) -> DbResult<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO deliveries (
            id, store_id, sale_id, recipient_name, phone, street, number,
            complement, neighborhood, city, reference, fee_cents, status,
            created_at, updated_at, delivered_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&delivery.id)
    .bind(&delivery.store_id)
    .bind(&delivery.sale_id)
    .bind(&delivery.recipient_name)
    .bind(&delivery.phone)
    .bind(&delivery.street)
    .bind(&delivery.number)
    .bind(&delivery.complement)
    .bind(&delivery.neighborhood)
    .bind(&delivery.city)
    .bind(&delivery.reference)
    .bind(delivery.fee_cents)
    .bind(delivery.status)
    .bind(delivery.created_at)
    .bind(delivery.updated_at)
    .bind(delivery.delivered_at)
    .execute(executor)
    .await?;

    Ok(())
}

/// Moves `from` → `to` only if the row is still in `from`.
///
/// `delivered_at` is written when `to` is delivered and left alone otherwise.
pub(crate) async fn update_status_if<'e, E>(
    executor: E,
    store_id: &str,
    id: &str,
    from: DeliveryStatus,
    to: DeliveryStatus,
    now: DateTime<Utc>,
) -> DbResult<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let delivered_at = (to == DeliveryStatus::Delivered).then_some(now);

    let result = sqlx::query(
        r#"
        UPDATE deliveries
        SET status = ?, updated_at = ?, delivered_at = COALESCE(?, delivered_at)
        WHERE id = ? AND store_id = ? AND status = ?
        "#,
    )
    .bind(to)
    .bind(now)
    .bind(delivered_at)
    .bind(id)
    .bind(store_id)
    .bind(from)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() == 1)
}
