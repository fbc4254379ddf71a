//! # Customer Repository
//!
//! Customer records and loyalty balances.
//!
//! ## Loyalty Points
//! ```text
//! sale completed   (R$ 59,70) ──► +59 points
//! sale cancelled   (R$ 59,70) ──► -59 points, floored at 0
//!
//! loyalty_points >= 500 ──► VIP
//! ```

use chrono::{Datelike, Utc};
use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::new_id;
use adega_core::{Customer, CustomerInput, StoreContext};

const CUSTOMER_COLUMNS: &str =
    "id, store_id, name, phone, email, birth_date, loyalty_points, notes, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    pub async fn create(&self, ctx: &StoreContext, input: &CustomerInput) -> DbResult<Customer> {
        let now = Utc::now();
        let customer = Customer {
            id: new_id(),
            store_id: ctx.store_id.clone(),
            name: input.name.trim().to_string(),
            phone: input.phone.clone(),
            email: input.email.clone(),
            birth_date: input.birth_date,
            loyalty_points: 0,
            notes: input.notes.clone(),
            created_at: now,
            updated_at: now,
        };

        debug!(id = %customer.id, "Creating customer");

        sqlx::query(
            r#"
            INSERT INTO customers (
                id, store_id, name, phone, email, birth_date,
                loyalty_points, notes, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.store_id)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.email)
        .bind(customer.birth_date)
        .bind(customer.loyalty_points)
        .bind(&customer.notes)
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(customer)
    }

    pub async fn get(&self, ctx: &StoreContext, id: &str) -> DbResult<Option<Customer>> {
        find_customer(&self.pool, &ctx.store_id, id).await
    }

    /// Edits contact data. Loyalty points are not editable here.
    pub async fn update(
        &self,
        ctx: &StoreContext,
        id: &str,
        input: &CustomerInput,
    ) -> DbResult<Customer> {
        let result = sqlx::query(
            r#"
            UPDATE customers
            SET name = ?, phone = ?, email = ?, birth_date = ?, notes = ?, updated_at = ?
            WHERE id = ? AND store_id = ?
            "#,
        )
        .bind(input.name.trim())
        .bind(&input.phone)
        .bind(&input.email)
        .bind(input.birth_date)
        .bind(&input.notes)
        .bind(Utc::now())
        .bind(id)
        .bind(&ctx.store_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        self.get(ctx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id))
    }

    /// Name, phone or email containing `text`; empty text lists everyone.
    pub async fn search(
        &self,
        ctx: &StoreContext,
        text: &str,
        limit: i64,
    ) -> DbResult<Vec<Customer>> {
        let pattern = format!("%{text}%");

        let customers = sqlx::query_as::<_, Customer>(&format!(
            r#"
            SELECT {CUSTOMER_COLUMNS} FROM customers
            WHERE store_id = ?
              AND (name LIKE ? OR IFNULL(phone, '') LIKE ? OR IFNULL(email, '') LIKE ?)
            ORDER BY name COLLATE NOCASE
            LIMIT ?
            "#
        ))
        .bind(&ctx.store_id)
        .bind(&pattern)
        .bind(&pattern)
        .bind(&pattern)
        .bind(limit.clamp(1, 500))
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Customers born in `month` (1-12), ordered by day of month.
    pub async fn birthdays_in_month(&self, ctx: &StoreContext, month: u32) -> DbResult<Vec<Customer>> {
        let mut customers = sqlx::query_as::<_, Customer>(&format!(
            r#"
            SELECT {CUSTOMER_COLUMNS} FROM customers
            WHERE store_id = ? AND birth_date IS NOT NULL
              AND CAST(strftime('%m', birth_date) AS INTEGER) = ?
            "#
        ))
        .bind(&ctx.store_id)
        .bind(i64::from(month))
        .fetch_all(&self.pool)
        .await?;

        customers.sort_by_key(|c| c.birth_date.map(|d| d.day()));
        Ok(customers)
    }
}

// =============================================================================
// Executor-level queries (usable inside transactions)
// =============================================================================

pub(crate) async fn find_customer<'e, E>(
    executor: E,
    store_id: &str,
    id: &str,
) -> DbResult<Option<Customer>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let customer = sqlx::query_as::<_, Customer>(&format!(
        "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ? AND store_id = ?"
    ))
    .bind(id)
    .bind(store_id)
    .fetch_optional(executor)
    .await?;

    Ok(customer)
}

/// Adds `delta` points (negative to reverse). The balance never drops below zero.
pub(crate) async fn add_loyalty_points<'e, E>(
    executor: E,
    store_id: &str,
    id: &str,
    delta: i64,
) -> DbResult<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        UPDATE customers
        SET loyalty_points = MAX(0, loyalty_points + ?), updated_at = ?
        WHERE id = ? AND store_id = ?
        "#,
    )
    .bind(delta)
    .bind(Utc::now())
    .bind(id)
    .bind(store_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() == 1)
}
