//! # Report Repository
//!
//! Dashboard aggregates computed by grouped SQL, scoped to one store.
//!
//! ```text
//! ┌──────────────────────┬────────────────────────────────────────────────┐
//! │ sales_summary        │ counts, gross, discount, net, average ticket   │
//! │ category_breakdown   │ quantity and revenue per product category      │
//! │ top_products         │ best sellers by quantity                       │
//! │ daily_totals         │ one row per business day (local calendar)      │
//! │ financial_summary    │ money in, money out, balance                   │
//! └──────────────────────┴────────────────────────────────────────────────┘
//! ```
//!
//! Sale aggregates only count `completed` sales (except the cancelled
//! counter). Item-level revenue is the sum of line totals, before the
//! sale-level discount.

use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::error::DbResult;
use crate::repository::push_range;
use adega_core::{
    BusinessCalendar, CategoryTotal, DailyTotal, DateRange, FinancialSummary, SalesSummary,
    StoreContext, TopProduct,
};

#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
    calendar: BusinessCalendar,
}

impl ReportRepository {
    pub fn new(pool: SqlitePool, calendar: BusinessCalendar) -> Self {
        ReportRepository { pool, calendar }
    }

    pub async fn sales_summary(&self, ctx: &StoreContext, range: &DateRange) -> DbResult<SalesSummary> {
        let mut qb = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT
                completed_count,
                cancelled_count,
                gross_cents,
                discount_cents,
                net_cents,
                CASE WHEN completed_count > 0 THEN net_cents / completed_count ELSE 0 END
                    AS average_ticket_cents
            FROM (
                SELECT
                    COALESCE(SUM(CASE WHEN status = 'completed' THEN 1 ELSE 0 END), 0) AS completed_count,
                    COALESCE(SUM(CASE WHEN status = 'cancelled' THEN 1 ELSE 0 END), 0) AS cancelled_count,
                    COALESCE(SUM(CASE WHEN status = 'completed' THEN subtotal_cents ELSE 0 END), 0) AS gross_cents,
                    COALESCE(SUM(CASE WHEN status = 'completed' THEN discount_cents ELSE 0 END), 0) AS discount_cents,
                    COALESCE(SUM(CASE WHEN status = 'completed' THEN total_cents ELSE 0 END), 0) AS net_cents
                FROM sales
                WHERE store_id = "#,
        );
        qb.push_bind(&ctx.store_id);
        push_range(&mut qb, "created_at", range);
        qb.push(")");

        let summary = qb
            .build_query_as::<SalesSummary>()
            .fetch_one(&self.pool)
            .await?;

        Ok(summary)
    }

    pub async fn category_breakdown(
        &self,
        ctx: &StoreContext,
        range: &DateRange,
    ) -> DbResult<Vec<CategoryTotal>> {
        let mut qb = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT
                p.category AS category,
                SUM(i.quantity) AS quantity,
                SUM(i.line_total_cents) AS revenue_cents
            FROM sale_items i
            JOIN sales s ON s.id = i.sale_id
            JOIN products p ON p.id = i.product_id
            WHERE s.status = 'completed' AND s.store_id = "#,
        );
        qb.push_bind(&ctx.store_id);
        push_range(&mut qb, "s.created_at", range);
        qb.push(" GROUP BY p.category ORDER BY revenue_cents DESC, p.category ASC");

        let totals = qb
            .build_query_as::<CategoryTotal>()
            .fetch_all(&self.pool)
            .await?;

        Ok(totals)
    }

    /// Best sellers by quantity. The name is the latest snapshot on record.
    pub async fn top_products(
        &self,
        ctx: &StoreContext,
        range: &DateRange,
        limit: i64,
    ) -> DbResult<Vec<TopProduct>> {
        let mut qb = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT
                i.product_id AS product_id,
                MAX(i.product_name) AS product_name,
                SUM(i.quantity) AS quantity,
                SUM(i.line_total_cents) AS revenue_cents
            FROM sale_items i
            JOIN sales s ON s.id = i.sale_id
            WHERE s.status = 'completed' AND s.store_id = "#,
        );
        qb.push_bind(&ctx.store_id);
        push_range(&mut qb, "s.created_at", range);
        qb.push(" GROUP BY i.product_id ORDER BY quantity DESC, revenue_cents DESC LIMIT ")
            .push_bind(limit.clamp(1, 100));

        let products = qb
            .build_query_as::<TopProduct>()
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Completed sales per business day, oldest first.
    ///
    /// Days follow the store's calendar: a sale at 01:30 UTC belongs to the
    /// previous day at UTC-3.
    pub async fn daily_totals(&self, ctx: &StoreContext, range: &DateRange) -> DbResult<Vec<DailyTotal>> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT date(created_at, ");
        qb.push_bind(self.calendar.sqlite_modifier());
        qb.push(
            r#") AS day,
                COUNT(*) AS sales_count,
                SUM(total_cents) AS total_cents
            FROM sales
            WHERE status = 'completed' AND store_id = "#,
        );
        qb.push_bind(&ctx.store_id);
        push_range(&mut qb, "created_at", range);
        qb.push(" GROUP BY day ORDER BY day ASC");

        let days = qb
            .build_query_as::<DailyTotal>()
            .fetch_all(&self.pool)
            .await?;

        Ok(days)
    }

    pub async fn financial_summary(
        &self,
        ctx: &StoreContext,
        range: &DateRange,
    ) -> DbResult<FinancialSummary> {
        let mut qb = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT
                total_in_cents,
                total_out_cents,
                total_in_cents - total_out_cents AS balance_cents
            FROM (
                SELECT
                    COALESCE(SUM(CASE WHEN transaction_type = 'in' THEN amount_cents ELSE 0 END), 0) AS total_in_cents,
                    COALESCE(SUM(CASE WHEN transaction_type = 'out' THEN amount_cents ELSE 0 END), 0) AS total_out_cents
                FROM financial_transactions
                WHERE store_id = "#,
        );
        qb.push_bind(&ctx.store_id);
        push_range(&mut qb, "created_at", range);
        qb.push(")");

        let summary = qb
            .build_query_as::<FinancialSummary>()
            .fetch_one(&self.pool)
            .await?;

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::new_id;
    use crate::repository::sale::{insert_item, insert_sale};
    use crate::repository::testing::{new_product, setup};
    use adega_core::{
        NewFinancialTransaction, PaymentMethod, Product, ProductCategory, Sale, SaleItem,
        SaleStatus, TransactionType,
    };
    use chrono::{DateTime, TimeZone, Utc};

    async fn record_sale(
        db: &crate::Database,
        ctx: &StoreContext,
        at: DateTime<Utc>,
        status: SaleStatus,
        lines: &[(&Product, i64)],
        discount_cents: i64,
    ) -> Sale {
        let subtotal: i64 = lines.iter().map(|(p, q)| p.sale_price_cents * q).sum();
        let sale = Sale {
            id: new_id(),
            store_id: ctx.store_id.clone(),
            customer_id: None,
            seller_id: ctx.user_id.clone(),
            status,
            subtotal_cents: subtotal,
            discount_cents,
            total_cents: subtotal - discount_cents,
            payment_method: PaymentMethod::Cash,
            notes: None,
            created_at: at,
            cancelled_at: None,
            cancelled_by: None,
            cancel_reason: None,
        };
        insert_sale(db.pool(), &sale).await.unwrap();

        for (product, quantity) in lines {
            let item = SaleItem {
                id: new_id(),
                sale_id: sale.id.clone(),
                product_id: product.id.clone(),
                product_name: product.name.clone(),
                quantity: *quantity,
                unit_price_cents: product.sale_price_cents,
                line_total_cents: product.sale_price_cents * quantity,
                created_at: at,
            };
            insert_item(db.pool(), &item).await.unwrap();
        }
        sale
    }

    #[tokio::test]
    async fn test_sales_summary_and_breakdowns() {
        let (db, ctx) = setup().await;
        let malbec = db.products().create(&ctx, &new_product("Malbec", 50, 5000)).await.unwrap();
        let mut beer = new_product("Pilsen", 50, 500);
        beer.category = ProductCategory::Beer;
        let beer = db.products().create(&ctx, &beer).await.unwrap();

        let now = Utc::now();
        record_sale(&db, &ctx, now, SaleStatus::Completed, &[(&malbec, 1), (&beer, 6)], 1000).await;
        record_sale(&db, &ctx, now, SaleStatus::Completed, &[(&beer, 2)], 0).await;
        record_sale(&db, &ctx, now, SaleStatus::Cancelled, &[(&malbec, 3)], 0).await;

        let reports = db.reports();
        let range = DateRange::default();

        let summary = reports.sales_summary(&ctx, &range).await.unwrap();
        assert_eq!(summary.completed_count, 2);
        assert_eq!(summary.cancelled_count, 1);
        assert_eq!(summary.gross_cents, 9000);
        assert_eq!(summary.discount_cents, 1000);
        assert_eq!(summary.net_cents, 8000);
        assert_eq!(summary.average_ticket_cents, 4000);

        let categories = reports.category_breakdown(&ctx, &range).await.unwrap();
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].category, ProductCategory::RedWine);
        assert_eq!(categories[0].revenue_cents, 5000);
        assert_eq!(categories[1].category, ProductCategory::Beer);
        assert_eq!(categories[1].quantity, 8);

        let top = reports.top_products(&ctx, &range, 5).await.unwrap();
        assert_eq!(top[0].product_name, "Pilsen");
        assert_eq!(top[0].quantity, 8);
        assert_eq!(top[1].quantity, 1);
    }

    #[tokio::test]
    async fn test_empty_summary_is_zero() {
        let (db, ctx) = setup().await;
        let summary = db.reports().sales_summary(&ctx, &DateRange::default()).await.unwrap();
        assert_eq!(summary, SalesSummary::default());
    }

    #[tokio::test]
    async fn test_daily_totals_use_business_calendar() {
        let (db, ctx) = setup().await;
        let malbec = db.products().create(&ctx, &new_product("Malbec", 50, 5000)).await.unwrap();

        // 01:30 UTC on the 11th is 22:30 on the 10th at UTC-3.
        let late_evening = Utc.with_ymd_and_hms(2026, 3, 11, 1, 30, 0).unwrap();
        let next_morning = Utc.with_ymd_and_hms(2026, 3, 11, 13, 0, 0).unwrap();
        record_sale(&db, &ctx, late_evening, SaleStatus::Completed, &[(&malbec, 1)], 0).await;
        record_sale(&db, &ctx, next_morning, SaleStatus::Completed, &[(&malbec, 2)], 0).await;

        let days = db.reports().daily_totals(&ctx, &DateRange::default()).await.unwrap();
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].day, "2026-03-10");
        assert_eq!(days[0].total_cents, 5000);
        assert_eq!(days[1].day, "2026-03-11");
        assert_eq!(days[1].sales_count, 1);
    }

    #[tokio::test]
    async fn test_financial_summary() {
        let (db, ctx) = setup().await;
        for (kind, amount) in [(TransactionType::In, 10_000), (TransactionType::Out, 2_500)] {
            db.finance()
                .record(
                    &ctx,
                    &NewFinancialTransaction {
                        transaction_type: kind,
                        category: "manual".to_string(),
                        description: None,
                        amount_cents: amount,
                    },
                )
                .await
                .unwrap();
        }

        let summary = db.reports().financial_summary(&ctx, &DateRange::default()).await.unwrap();
        assert_eq!(summary.total_in_cents, 10_000);
        assert_eq!(summary.total_out_cents, 2_500);
        assert_eq!(summary.balance_cents, 7_500);
    }
}
