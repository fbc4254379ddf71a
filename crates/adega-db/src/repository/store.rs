//! # Store Repository
//!
//! Stores (tenants) and their members.
//!
//! ```text
//! profiles ──< store_members >── stores
//!               (role: owner | manager | seller)
//! ```
//!
//! Switching store is a membership lookup: a user may only act inside a
//! store they belong to.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;
use crate::repository::new_id;
use adega_core::{NewStore, Store, StoreRole};

const STORE_COLUMNS: &str = "id, name, document, phone, address, created_at";

#[derive(Debug, Clone)]
pub struct StoreRepository {
    pool: SqlitePool,
}

impl StoreRepository {
    pub fn new(pool: SqlitePool) -> Self {
        StoreRepository { pool }
    }

    /// Creates a store; its creator becomes the owner.
    pub async fn create(&self, owner_id: &str, input: &NewStore) -> DbResult<Store> {
        let store = Store {
            id: new_id(),
            name: input.name.trim().to_string(),
            document: input.document.clone(),
            phone: input.phone.clone(),
            address: input.address.clone(),
            created_at: Utc::now(),
        };

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO stores (id, name, document, phone, address, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&store.id)
        .bind(&store.name)
        .bind(&store.document)
        .bind(&store.phone)
        .bind(&store.address)
        .bind(store.created_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO store_members (store_id, user_id, role, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&store.id)
        .bind(owner_id)
        .bind(StoreRole::Owner)
        .bind(store.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(store_id = %store.id, owner_id = %owner_id, "Store created");
        Ok(store)
    }

    pub async fn get(&self, id: &str) -> DbResult<Option<Store>> {
        let store = sqlx::query_as::<_, Store>(&format!(
            "SELECT {STORE_COLUMNS} FROM stores WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(store)
    }

    /// Stores the user belongs to, by name.
    pub async fn list_for_user(&self, user_id: &str) -> DbResult<Vec<Store>> {
        let stores = sqlx::query_as::<_, Store>(
            r#"
            SELECT s.id, s.name, s.document, s.phone, s.address, s.created_at
            FROM stores s
            JOIN store_members m ON m.store_id = s.id
            WHERE m.user_id = ?
            ORDER BY s.name COLLATE NOCASE
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(stores)
    }

    /// The user's role in the store, or `None` when not a member.
    pub async fn membership(&self, store_id: &str, user_id: &str) -> DbResult<Option<StoreRole>> {
        let role = sqlx::query_scalar::<_, StoreRole>(
            "SELECT role FROM store_members WHERE store_id = ? AND user_id = ?",
        )
        .bind(store_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(role)
    }

    /// Adds a member, or changes the role of an existing one.
    pub async fn add_member(&self, store_id: &str, user_id: &str, role: StoreRole) -> DbResult<()> {
        debug!(store_id = %store_id, user_id = %user_id, role = %role, "Adding store member");

        sqlx::query(
            r#"
            INSERT INTO store_members (store_id, user_id, role, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (store_id, user_id) DO UPDATE SET role = excluded.role
            "#,
        )
        .bind(store_id)
        .bind(user_id)
        .bind(role)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
