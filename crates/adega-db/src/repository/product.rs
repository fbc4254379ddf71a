//! # Product Repository
//!
//! Catalog operations, plus the stock primitives used inside sale and
//! ledger transactions.
//!
//! ## Stock Writes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  ❌ Read-then-write (two sales both see 5, both write 5 - 3 = 2)   │
//! │     SELECT stock → compute → UPDATE products SET stock = 2         │
//! │                                                                     │
//! │  ✅ Sale: conditional decrement                                     │
//! │     UPDATE products SET stock = stock - 3                          │
//! │     WHERE id = ? AND stock >= 3  RETURNING stock                   │
//! │     (no row back → InsufficientStock, transaction rolls back)      │
//! │                                                                     │
//! │  ✅ Manual adjustment: compare-and-swap                             │
//! │     UPDATE products SET stock = 12 WHERE id = ? AND stock = 5      │
//! │     (0 rows → ConcurrentModification)                              │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{Executor, QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::{new_id, stock};
use adega_core::{
    NewProduct, Product, ProductCategory, ProductUpdate, StockMovement, StockMovementType,
    StoreContext,
};

pub(crate) const PRODUCT_COLUMNS: &str = "id, store_id, name, description, category, \
     cost_price_cents, sale_price_cents, promo_price_cents, stock_quantity, min_stock, \
     image_url, is_active, created_at, updated_at";

/// Search parameters for the catalog screen.
#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
    /// Substring of the name; empty lists everything.
    pub text: String,
    pub category: Option<ProductCategory>,
    pub include_inactive: bool,
    pub limit: i64,
}

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a product. Initial stock is recorded as an `in` movement.
    pub async fn create(&self, ctx: &StoreContext, input: &NewProduct) -> DbResult<Product> {
        let now = Utc::now();
        let product = Product {
            id: new_id(),
            store_id: ctx.store_id.clone(),
            name: input.name.trim().to_string(),
            description: input.description.clone(),
            category: input.category,
            cost_price_cents: input.cost_price_cents,
            sale_price_cents: input.sale_price_cents,
            promo_price_cents: input.promo_price_cents,
            stock_quantity: input.stock_quantity,
            min_stock: input.min_stock,
            image_url: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %product.id, name = %product.name, "Creating product");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO products (
                id, store_id, name, description, category,
                cost_price_cents, sale_price_cents, promo_price_cents,
                stock_quantity, min_stock, image_url, is_active,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&product.id)
        .bind(&product.store_id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.category)
        .bind(product.cost_price_cents)
        .bind(product.sale_price_cents)
        .bind(product.promo_price_cents)
        .bind(product.stock_quantity)
        .bind(product.min_stock)
        .bind(&product.image_url)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&mut *tx)
        .await?;

        if product.stock_quantity > 0 {
            let movement = StockMovement {
                id: new_id(),
                store_id: ctx.store_id.clone(),
                product_id: product.id.clone(),
                movement_type: StockMovementType::In,
                quantity: product.stock_quantity,
                previous_stock: 0,
                new_stock: product.stock_quantity,
                reason: Some("Initial stock".to_string()),
                sale_id: None,
                created_by: ctx.user_id.clone(),
                created_at: now,
            };
            stock::insert_movement(&mut *tx, &movement).await?;
        }

        tx.commit().await?;

        Ok(product)
    }

    /// Gets a product of the current store (active or not).
    pub async fn get(&self, ctx: &StoreContext, id: &str) -> DbResult<Option<Product>> {
        find_in_store(&self.pool, &ctx.store_id, id).await
    }

    /// Searches the catalog by name and category, ordered by name.
    pub async fn search(&self, ctx: &StoreContext, query: &ProductQuery) -> DbResult<Vec<Product>> {
        debug!(text = %query.text, category = ?query.category, "Searching products");

        let mut qb = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE store_id = "
        ));
        qb.push_bind(&ctx.store_id);

        if !query.include_inactive {
            qb.push(" AND is_active = 1");
        }
        if !query.text.is_empty() {
            qb.push(" AND name LIKE ")
                .push_bind(format!("%{}%", query.text));
        }
        if let Some(category) = query.category {
            qb.push(" AND category = ").push_bind(category);
        }

        qb.push(" ORDER BY name COLLATE NOCASE LIMIT ")
            .push_bind(query.limit.clamp(1, 500));

        let products = qb.build_query_as::<Product>().fetch_all(&self.pool).await?;
        Ok(products)
    }

    /// Active products at or below their reorder threshold.
    pub async fn low_stock(&self, ctx: &StoreContext) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS} FROM products
            WHERE store_id = ? AND is_active = 1 AND stock_quantity <= min_stock
            ORDER BY stock_quantity ASC, name COLLATE NOCASE
            "#
        ))
        .bind(&ctx.store_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Updates catalog fields. Stock is untouched.
    pub async fn update(
        &self,
        ctx: &StoreContext,
        id: &str,
        input: &ProductUpdate,
    ) -> DbResult<Product> {
        debug!(id = %id, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products
            SET
                name = ?,
                description = ?,
                category = ?,
                cost_price_cents = ?,
                sale_price_cents = ?,
                promo_price_cents = ?,
                min_stock = ?,
                updated_at = ?
            WHERE id = ? AND store_id = ?
            "#,
        )
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(input.category)
        .bind(input.cost_price_cents)
        .bind(input.sale_price_cents)
        .bind(input.promo_price_cents)
        .bind(input.min_stock)
        .bind(Utc::now())
        .bind(id)
        .bind(&ctx.store_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        self.get(ctx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Soft-deletes a product by setting is_active = false.
    ///
    /// ## Why Soft Delete?
    /// - Historical sale items and movements still reference this product
    /// - Can be restored if deleted by mistake
    pub async fn soft_delete(&self, ctx: &StoreContext, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting product");

        let result = sqlx::query(
            "UPDATE products SET is_active = 0, updated_at = ? WHERE id = ? AND store_id = ?",
        )
        .bind(Utc::now())
        .bind(id)
        .bind(&ctx.store_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Points the product at its uploaded photo.
    pub async fn set_image_url(&self, ctx: &StoreContext, id: &str, url: &str) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE products SET image_url = ?, updated_at = ? WHERE id = ? AND store_id = ?",
        )
        .bind(url)
        .bind(Utc::now())
        .bind(id)
        .bind(&ctx.store_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts active products (for diagnostics).
    pub async fn count(&self, ctx: &StoreContext) -> DbResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM products WHERE store_id = ? AND is_active = 1",
        )
        .bind(&ctx.store_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}

// =============================================================================
// Executor-level queries (usable inside transactions)
// =============================================================================

/// Fetches a product scoped to a store.
pub(crate) async fn find_in_store<'e, E>(
    executor: E,
    store_id: &str,
    id: &str,
) -> DbResult<Option<Product>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let product = sqlx::query_as::<_, Product>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ? AND store_id = ?"
    ))
    .bind(id)
    .bind(store_id)
    .fetch_optional(executor)
    .await?;

    Ok(product)
}

/// Decrements stock only if enough is on the shelf.
///
/// Returns the new stock, or `None` when the guard rejected the update.
pub(crate) async fn decrement_stock_if_available<'e, E>(
    executor: E,
    store_id: &str,
    id: &str,
    quantity: i64,
    now: DateTime<Utc>,
) -> DbResult<Option<i64>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let new_stock = sqlx::query_scalar::<_, i64>(
        r#"
        UPDATE products
        SET stock_quantity = stock_quantity - ?, updated_at = ?
        WHERE id = ? AND store_id = ? AND stock_quantity >= ?
        RETURNING stock_quantity
        "#,
    )
    .bind(quantity)
    .bind(now)
    .bind(id)
    .bind(store_id)
    .bind(quantity)
    .fetch_optional(executor)
    .await?;

    Ok(new_stock)
}

/// Adds stock back. Returns the new stock, or `None` if the product is gone.
pub(crate) async fn increment_stock<'e, E>(
    executor: E,
    store_id: &str,
    id: &str,
    quantity: i64,
    now: DateTime<Utc>,
) -> DbResult<Option<i64>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let new_stock = sqlx::query_scalar::<_, i64>(
        r#"
        UPDATE products
        SET stock_quantity = stock_quantity + ?, updated_at = ?
        WHERE id = ? AND store_id = ?
        RETURNING stock_quantity
        "#,
    )
    .bind(quantity)
    .bind(now)
    .bind(id)
    .bind(store_id)
    .fetch_optional(executor)
    .await?;

    Ok(new_stock)
}

/// Writes `new` only if the stock is still `expected`.
pub(crate) async fn compare_and_set_stock<'e, E>(
    executor: E,
    store_id: &str,
    id: &str,
    expected: i64,
    new: i64,
    now: DateTime<Utc>,
) -> DbResult<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        UPDATE products
        SET stock_quantity = ?, updated_at = ?
        WHERE id = ? AND store_id = ? AND stock_quantity = ?
        "#,
    )
    .bind(new)
    .bind(now)
    .bind(id)
    .bind(store_id)
    .bind(expected)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() == 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::testing::{new_product, setup};

    #[tokio::test]
    async fn test_create_records_initial_stock() {
        let (db, ctx) = setup().await;
        let product = db
            .products()
            .create(&ctx, &new_product("Malbec", 12, 4990))
            .await
            .unwrap();

        let movements = db.stock_movements().for_product(&ctx, &product.id, 10).await.unwrap();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].movement_type, StockMovementType::In);
        assert_eq!(movements[0].new_stock, 12);
    }

    #[tokio::test]
    async fn test_search_and_soft_delete() {
        let (db, ctx) = setup().await;
        let repo = db.products();
        let malbec = repo.create(&ctx, &new_product("Malbec", 5, 4990)).await.unwrap();
        repo.create(&ctx, &new_product("Merlot", 5, 3990)).await.unwrap();
        repo.create(&ctx, &new_product("Pilsen", 5, 590)).await.unwrap();

        let query = ProductQuery {
            text: "M".to_string(),
            limit: 10,
            ..Default::default()
        };
        let found = repo.search(&ctx, &query).await.unwrap();
        assert_eq!(found.len(), 2);

        repo.soft_delete(&ctx, &malbec.id).await.unwrap();
        let found = repo.search(&ctx, &query).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Merlot");
    }

    #[tokio::test]
    async fn test_products_are_store_scoped() {
        let (db, ctx) = setup().await;
        let product = db
            .products()
            .create(&ctx, &new_product("Malbec", 5, 4990))
            .await
            .unwrap();

        let other = StoreContext::new(ctx.user_id.clone(), "another-store");
        assert!(db.products().get(&other, &product.id).await.unwrap().is_none());
        assert!(db.products().soft_delete(&other, &product.id).await.is_err());
    }

    #[tokio::test]
    async fn test_low_stock() {
        let (db, ctx) = setup().await;
        let mut input = new_product("Gin", 2, 9990);
        input.min_stock = 3;
        db.products().create(&ctx, &input).await.unwrap();
        db.products().create(&ctx, &new_product("Rum", 10, 5990)).await.unwrap();

        let low = db.products().low_stock(&ctx).await.unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].name, "Gin");
    }

    #[tokio::test]
    async fn test_conditional_decrement() {
        let (db, ctx) = setup().await;
        let product = db
            .products()
            .create(&ctx, &new_product("Vodka", 3, 4590))
            .await
            .unwrap();

        let now = Utc::now();
        let ok = decrement_stock_if_available(db.pool(), &ctx.store_id, &product.id, 2, now)
            .await
            .unwrap();
        assert_eq!(ok, Some(1));

        let rejected = decrement_stock_if_available(db.pool(), &ctx.store_id, &product.id, 2, now)
            .await
            .unwrap();
        assert_eq!(rejected, None);
    }

    #[tokio::test]
    async fn test_compare_and_set() {
        let (db, ctx) = setup().await;
        let product = db
            .products()
            .create(&ctx, &new_product("Whisky", 5, 12990))
            .await
            .unwrap();

        let now = Utc::now();
        assert!(!compare_and_set_stock(db.pool(), &ctx.store_id, &product.id, 4, 9, now)
            .await
            .unwrap());
        assert!(compare_and_set_stock(db.pool(), &ctx.store_id, &product.id, 5, 9, now)
            .await
            .unwrap());
    }
}
