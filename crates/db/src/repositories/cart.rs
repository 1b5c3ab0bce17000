use chrono::Utc;
use sqlx::Row;

use storefront_core::domain::cart::{CartItem, CartSummary};
use storefront_core::domain::product::ProductId;
use storefront_core::errors::DomainError;

use super::product::product_from_row;
use super::{CartRepository, RepositoryError};
use crate::DbPool;

pub struct SqlCartRepository {
    pool: DbPool,
}

impl SqlCartRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn stock_of(&self, product_id: &ProductId) -> Result<i64, RepositoryError> {
        sqlx::query_scalar::<_, i64>("SELECT stock FROM product WHERE id = ?")
            .bind(&product_id.0)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| RepositoryError::NotFound { entity: "product", id: product_id.0.clone() })
    }

    async fn current_quantity(
        &self,
        customer_id: &str,
        product_id: &ProductId,
    ) -> Result<Option<i64>, RepositoryError> {
        Ok(sqlx::query_scalar::<_, i64>(
            "SELECT quantity FROM cart_item WHERE customer_id = ? AND product_id = ?",
        )
        .bind(customer_id)
        .bind(&product_id.0)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn write_line(
        &self,
        customer_id: &str,
        product_id: &ProductId,
        quantity: i64,
    ) -> Result<CartItem, RepositoryError> {
        sqlx::query(
            "INSERT INTO cart_item (customer_id, product_id, quantity, created_at)
             VALUES (?, ?, ?, ?)
             ON CONFLICT(customer_id, product_id) DO UPDATE SET quantity = excluded.quantity",
        )
        .bind(customer_id)
        .bind(&product_id.0)
        .bind(quantity)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(CartItem {
            customer_id: customer_id.to_string(),
            product_id: product_id.clone(),
            quantity,
        })
    }
}

fn capped_quantity(
    product_id: &ProductId,
    requested: i64,
    stock: i64,
) -> Result<i64, RepositoryError> {
    if stock <= 0 {
        return Err(DomainError::InsufficientStock {
            product_id: product_id.0.clone(),
            requested,
            available: stock.max(0),
        }
        .into());
    }
    Ok(requested.min(stock))
}

#[async_trait::async_trait]
impl CartRepository for SqlCartRepository {
    async fn summary(&self, customer_id: &str) -> Result<CartSummary, RepositoryError> {
        let rows = sqlx::query(
            "SELECT c.customer_id AS cart_customer_id, c.product_id AS cart_product_id,
                    c.quantity AS cart_quantity,
                    p.id, p.sku, p.name, p.category, p.price, p.original_price, p.stock,
                    p.image_url, p.description, p.rating, p.sales_count, p.potential_score,
                    p.selection_reason
             FROM cart_item c
             LEFT JOIN product p ON p.id = c.product_id
             WHERE c.customer_id = ?
             ORDER BY c.id ASC",
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        let mut lines = Vec::with_capacity(rows.len());
        for row in &rows {
            let item = CartItem {
                customer_id: row.try_get("cart_customer_id")?,
                product_id: ProductId(row.try_get("cart_product_id")?),
                quantity: row.try_get("cart_quantity")?,
            };
            let product = match row.try_get::<Option<String>, _>("id")? {
                Some(_) => Some(product_from_row(row)?),
                None => None,
            };
            lines.push((item, product));
        }

        Ok(CartSummary::build(customer_id, lines))
    }

    async fn add(
        &self,
        customer_id: &str,
        product_id: &ProductId,
        quantity: i64,
    ) -> Result<CartItem, RepositoryError> {
        if quantity <= 0 {
            return Err(DomainError::InvalidInput("quantity must be positive".to_string()).into());
        }
        let stock = self.stock_of(product_id).await?;
        let existing = self.current_quantity(customer_id, product_id).await?.unwrap_or(0);
        let quantity = capped_quantity(product_id, existing.saturating_add(quantity), stock)?;

        self.write_line(customer_id, product_id, quantity).await
    }

    async fn set_quantity(
        &self,
        customer_id: &str,
        product_id: &ProductId,
        quantity: i64,
    ) -> Result<Option<CartItem>, RepositoryError> {
        if quantity <= 0 {
            self.remove(customer_id, product_id).await?;
            return Ok(None);
        }
        let stock = self.stock_of(product_id).await?;
        let quantity = capped_quantity(product_id, quantity, stock)?;

        self.write_line(customer_id, product_id, quantity).await.map(Some)
    }

    async fn remove(
        &self,
        customer_id: &str,
        product_id: &ProductId,
    ) -> Result<bool, RepositoryError> {
        let removed = sqlx::query("DELETE FROM cart_item WHERE customer_id = ? AND product_id = ?")
            .bind(customer_id)
            .bind(&product_id.0)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use storefront_core::catalog::CatalogStore;
    use storefront_core::domain::product::{Product, ProductId};

    use super::SqlCartRepository;
    use crate::repositories::{CartRepository, RepositoryError, SqlProductRepository};
    use crate::{connect_with_settings, migrations, DbPool};

    async fn setup_pool() -> DbPool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");

        let mut mouse = Product::new(
            "prod-mouse",
            "PC-001",
            "Wireless Mouse",
            "Computer Peripherals",
            Decimal::new(9900, 2),
        );
        mouse.stock = 5;
        SqlProductRepository::new(pool.clone()).save(mouse).await.expect("save");
        pool
    }

    #[tokio::test]
    async fn adding_accumulates_and_caps_at_stock() {
        let repo = SqlCartRepository::new(setup_pool().await);
        let mouse = ProductId::from("prod-mouse");

        repo.add("cust-1", &mouse, 2).await.expect("first add");
        let item = repo.add("cust-1", &mouse, 10).await.expect("second add");
        assert_eq!(item.quantity, 5);

        let summary = repo.summary("cust-1").await.expect("summary");
        assert_eq!(summary.items.len(), 1);
        assert_eq!(summary.total_quantity, 5);
        assert_eq!(summary.total_amount, Decimal::new(49500, 2));
    }

    #[tokio::test]
    async fn oversized_add_is_capped_without_overflowing() {
        let repo = SqlCartRepository::new(setup_pool().await);
        let mouse = ProductId::from("prod-mouse");

        repo.add("cust-1", &mouse, 1).await.expect("first add");
        let item = repo.add("cust-1", &mouse, i64::MAX).await.expect("second add");

        assert_eq!(item.quantity, 5);
    }

    #[tokio::test]
    async fn setting_zero_removes_line() {
        let repo = SqlCartRepository::new(setup_pool().await);
        let mouse = ProductId::from("prod-mouse");

        repo.add("cust-1", &mouse, 1).await.expect("add");
        assert_eq!(repo.set_quantity("cust-1", &mouse, 0).await.expect("set"), None);
        assert!(repo.summary("cust-1").await.expect("summary").items.is_empty());
        assert!(!repo.remove("cust-1", &mouse).await.expect("remove"));
    }

    #[tokio::test]
    async fn carts_are_isolated_per_customer() {
        let repo = SqlCartRepository::new(setup_pool().await);
        let mouse = ProductId::from("prod-mouse");

        repo.add("cust-1", &mouse, 1).await.expect("add");
        assert!(repo.summary("cust-2").await.expect("summary").items.is_empty());
    }

    #[tokio::test]
    async fn unknown_product_is_not_found() {
        let repo = SqlCartRepository::new(setup_pool().await);

        let result = repo.add("cust-1", &ProductId::from("nope"), 1).await;
        assert!(matches!(result, Err(RepositoryError::NotFound { entity: "product", .. })));
    }
}
