//! Delivery scheduling and status progression.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

use super::LifecycleResult;
use crate::error::DbError;
use crate::repository::{delivery, new_id, sale};
use adega_core::validation::validate_new_delivery;
use adega_core::{CoreError, Delivery, DeliveryStatus, NewDelivery, StoreContext};

#[derive(Debug, Clone)]
pub struct DeliveryTracker {
    pool: SqlitePool,
}

impl DeliveryTracker {
    pub fn new(pool: SqlitePool) -> Self {
        DeliveryTracker { pool }
    }

    /// Schedules the delivery of a sale.
    ///
    /// ## Errors
    /// - `SaleNotFound` / `SaleNotDeliverable` (cancelled sale)
    /// - `DbError::UniqueViolation` on `sale_id` when one already exists
    pub async fn schedule(&self, ctx: &StoreContext, input: &NewDelivery) -> LifecycleResult<Delivery> {
        validate_new_delivery(input)?;

        let mut tx = self.pool.begin().await?;

        let sale = sale::find_sale(&mut *tx, &ctx.store_id, &input.sale_id)
            .await?
            .ok_or_else(|| CoreError::SaleNotFound(input.sale_id.clone()))?;
        if sale.is_cancelled() {
            return Err(CoreError::SaleNotDeliverable(sale.id).into());
        }

        let now = Utc::now();
        let record = Delivery {
            id: new_id(),
            store_id: ctx.store_id.clone(),
            sale_id: sale.id.clone(),
            recipient_name: input.recipient_name.trim().to_string(),
            phone: input.phone.clone(),
            street: input.street.trim().to_string(),
            number: input.number.trim().to_string(),
            complement: input.complement.clone(),
            neighborhood: input.neighborhood.clone(),
            city: input.city.trim().to_string(),
            reference: input.reference.clone(),
            fee_cents: input.fee_cents,
            status: DeliveryStatus::Pending,
            created_at: now,
            updated_at: now,
            delivered_at: None,
        };

        delivery::insert_delivery(&mut *tx, &record)
            .await
            .map_err(|err| match err {
                DbError::UniqueViolation { .. } => DbError::duplicate("sale_id", &sale.id),
                other => other,
            })?;

        tx.commit().await?;

        info!(delivery_id = %record.id, sale_id = %record.sale_id, "Delivery scheduled");
        Ok(record)
    }

    /// Moves a delivery to `to`: the next step of the chain, or cancelled.
    ///
    /// ## Errors
    /// - `DeliveryNotFound`
    /// - `InvalidDeliveryTransition` when `to` skips a step, goes back, or
    ///   the delivery is already delivered / cancelled
    /// - `ConcurrentModification` when someone else moved it first
    pub async fn advance(
        &self,
        ctx: &StoreContext,
        delivery_id: &str,
        to: DeliveryStatus,
    ) -> LifecycleResult<Delivery> {
        let mut tx = self.pool.begin().await?;

        let current = delivery::find_delivery(&mut *tx, &ctx.store_id, delivery_id)
            .await?
            .ok_or_else(|| CoreError::DeliveryNotFound(delivery_id.to_string()))?;

        if !current.status.can_transition_to(to) {
            return Err(CoreError::InvalidDeliveryTransition {
                from: current.status,
                to,
            }
            .into());
        }

        let moved = delivery::update_status_if(
            &mut *tx,
            &ctx.store_id,
            delivery_id,
            current.status,
            to,
            Utc::now(),
        )
        .await?;
        if !moved {
            return Err(CoreError::ConcurrentModification {
                entity: "Delivery",
                id: delivery_id.to_string(),
            }
            .into());
        }

        let updated = delivery::find_delivery(&mut *tx, &ctx.store_id, delivery_id)
            .await?
            .ok_or_else(|| CoreError::DeliveryNotFound(delivery_id.to_string()))?;

        tx.commit().await?;

        info!(
            delivery_id = %delivery_id,
            from = %current.status,
            to = %to,
            "Delivery status changed"
        );
        Ok(updated)
    }
}
