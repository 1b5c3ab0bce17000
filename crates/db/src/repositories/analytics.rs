use chrono::NaiveDate;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use storefront_core::analytics::{
    AnalyticsDashboard, CategoryStat, DashboardStats, OrderFact, SalesSummary, TopProduct,
    MAX_CATEGORY_STATS, MAX_TOP_PRODUCTS,
};
use storefront_core::domain::inventory::DEFAULT_LOW_STOCK_THRESHOLD;
use storefront_core::domain::order::OrderStatus;

use super::product::{product_from_row, PRODUCT_COLUMNS};
use super::{parse_decimal, parse_timestamp, AnalyticsRepository, RepositoryError};
use crate::DbPool;

pub struct SqlAnalyticsRepository {
    pool: DbPool,
}

impl SqlAnalyticsRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn order_facts(&self) -> Result<Vec<OrderFact>, RepositoryError> {
        let rows = sqlx::query("SELECT customer_id, status, total_amount, created_at FROM orders")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(order_fact_from_row).collect()
    }

    async fn top_products(&self) -> Result<Vec<TopProduct>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product ORDER BY sales_count DESC, id ASC LIMIT ?"
        ))
        .bind(MAX_TOP_PRODUCTS as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| product_from_row(row).map(|product| TopProduct::from(&product)))
            .collect()
    }

    async fn category_stats(&self) -> Result<Vec<CategoryStat>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT category, COUNT(*) AS count, COALESCE(SUM(sales_count), 0) AS total_sales
             FROM product GROUP BY category
             ORDER BY total_sales DESC, category ASC LIMIT ?",
        )
        .bind(MAX_CATEGORY_STATS as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(category_stat_from_row).collect()
    }
}

#[async_trait::async_trait]
impl AnalyticsRepository for SqlAnalyticsRepository {
    async fn dashboard(&self, today: NaiveDate) -> Result<AnalyticsDashboard, RepositoryError> {
        let summary = SalesSummary::from_orders(&self.order_facts().await?, today);
        let total_products: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM product").fetch_one(&self.pool).await?;
        let low_stock_products: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM product WHERE stock < ?")
                .bind(DEFAULT_LOW_STOCK_THRESHOLD)
                .fetch_one(&self.pool)
                .await?;

        Ok(AnalyticsDashboard {
            stats: DashboardStats {
                total_sales: summary.total_sales,
                today_sales: summary.today_sales,
                total_orders: summary.total_orders,
                today_orders: summary.today_orders,
                active_users: summary.active_users,
                total_products,
                low_stock_products,
            },
            sales_trend: summary.trend,
            top_products: self.top_products().await?,
            category_stats: self.category_stats().await?,
        })
    }
}

fn order_fact_from_row(row: &SqliteRow) -> Result<OrderFact, RepositoryError> {
    let status_raw: String = row.try_get("status")?;
    let status = OrderStatus::parse(&status_raw)
        .ok_or_else(|| RepositoryError::Decode(format!("unknown order status `{status_raw}`")))?;
    let total_amount: String = row.try_get("total_amount")?;

    Ok(OrderFact {
        customer_id: row.try_get("customer_id")?,
        status,
        total_amount: parse_decimal("total_amount", &total_amount)?,
        created_at: parse_timestamp("created_at", row.try_get("created_at")?)?,
    })
}

fn category_stat_from_row(row: &SqliteRow) -> Result<CategoryStat, RepositoryError> {
    Ok(CategoryStat {
        category: row.try_get("category")?,
        count: row.try_get("count")?,
        total_sales: row.try_get("total_sales")?,
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use storefront_core::catalog::CatalogStore;
    use storefront_core::domain::order::{OrderItemRequest, OrderRequest};
    use storefront_core::domain::product::{Product, ProductId};

    use super::SqlAnalyticsRepository;
    use crate::repositories::{
        AnalyticsRepository, OrderRepository, SqlOrderRepository, SqlProductRepository,
    };
    use crate::{connect_with_settings, migrations, DbPool};

    async fn setup_pool() -> DbPool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");

        let catalog = SqlProductRepository::new(pool.clone());
        for (id, category, stock, sales) in [
            ("p-a", "Smart Home", 5, 300),
            ("p-b", "Smart Home", 50, 100),
            ("p-c", "Computer Peripherals", 20, 250),
        ] {
            let mut product = Product::new(id, id.to_uppercase(), id, category, Decimal::new(2500, 2));
            product.stock = stock;
            product.sales_count = sales;
            catalog.save(product).await.expect("save");
        }
        pool
    }

    async fn place(pool: &DbPool, customer: &str, product: &str, quantity: i64) -> i64 {
        let order = SqlOrderRepository::new(pool.clone())
            .place(&OrderRequest {
                customer_id: customer.to_string(),
                items: vec![OrderItemRequest { product_id: ProductId::from(product), quantity }],
                shipping_address: String::new(),
                source: None,
            })
            .await
            .expect("place order");
        order.id.0
    }

    #[tokio::test]
    async fn dashboard_counts_paid_sales_orders_and_catalog_figures() {
        let pool = setup_pool().await;
        let paid = place(&pool, "cust-1", "p-b", 2).await;
        place(&pool, "cust-2", "p-c", 1).await;
        sqlx::query("UPDATE orders SET status = 'PAID' WHERE id = ?")
            .bind(paid)
            .execute(&pool)
            .await
            .expect("mark paid");

        let dashboard = SqlAnalyticsRepository::new(pool)
            .dashboard(Utc::now().date_naive())
            .await
            .expect("dashboard");

        assert_eq!(dashboard.stats.total_sales, Decimal::new(5000, 2));
        assert_eq!(dashboard.stats.today_sales, Decimal::new(5000, 2));
        assert_eq!(dashboard.stats.total_orders, 2);
        assert_eq!(dashboard.stats.today_orders, 2);
        assert_eq!(dashboard.stats.active_users, 2);
        assert_eq!(dashboard.stats.total_products, 3);
        assert_eq!(dashboard.stats.low_stock_products, 1);
        assert_eq!(dashboard.sales_trend.last().map(|point| point.sales), Some(Decimal::new(5000, 2)));

        let top = dashboard.top_products.iter().map(|p| p.id.0.as_str()).collect::<Vec<_>>();
        assert_eq!(top, vec!["p-a", "p-c", "p-b"]);

        let categories = dashboard
            .category_stats
            .iter()
            .map(|stat| (stat.category.as_str(), stat.count, stat.total_sales))
            .collect::<Vec<_>>();
        assert_eq!(categories, vec![("Smart Home", 2, 400), ("Computer Peripherals", 1, 250)]);
    }

    #[tokio::test]
    async fn empty_store_yields_zeroed_dashboard() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");

        let dashboard = SqlAnalyticsRepository::new(pool)
            .dashboard(Utc::now().date_naive())
            .await
            .expect("dashboard");

        assert_eq!(dashboard.stats.total_sales, Decimal::ZERO);
        assert_eq!(dashboard.stats.total_products, 0);
        assert_eq!(dashboard.sales_trend.len(), 7);
        assert!(dashboard.top_products.is_empty());
        assert!(dashboard.category_stats.is_empty());
    }
}
