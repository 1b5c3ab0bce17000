use std::collections::HashMap;

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::info;

use storefront_core::domain::order::{Order, OrderId, OrderLine, OrderRequest, OrderStatus};
use storefront_core::domain::product::ProductId;
use storefront_core::errors::DomainError;

use super::product::product_from_row;
use super::{parse_decimal, parse_timestamp, OrderRepository, RepositoryError};
use crate::DbPool;

pub struct SqlOrderRepository {
    pool: DbPool,
}

impl SqlOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn load_lines(&self, order_id: i64) -> Result<Vec<OrderLine>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT product_id, product_name, quantity, unit_price
             FROM order_item WHERE order_id = ? ORDER BY id ASC",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(line_from_row).collect()
    }
}

#[async_trait::async_trait]
impl OrderRepository for SqlOrderRepository {
    async fn place(&self, request: &OrderRequest) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let mut products = HashMap::new();
        for item in &request.items {
            if products.contains_key(&item.product_id) {
                continue;
            }
            let row = sqlx::query(
                "SELECT id, sku, name, category, price, original_price, stock, image_url,
                        description, rating, sales_count, potential_score, selection_reason
                 FROM product WHERE id = ?",
            )
            .bind(&item.product_id.0)
            .fetch_optional(&mut *tx)
            .await?;
            if let Some(row) = row {
                products.insert(item.product_id.clone(), product_from_row(&row)?);
            }
        }

        let priced = request.price(&products)?;
        let created_at = Utc::now();

        let order_id = sqlx::query(
            "INSERT INTO orders (customer_id, status, total_amount, shipping_address, source,
                                 created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&priced.customer_id)
        .bind(OrderStatus::Pending.as_str())
        .bind(priced.total_amount.to_string())
        .bind(&priced.shipping_address)
        .bind(&priced.source)
        .bind(created_at.to_rfc3339())
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        for line in &priced.lines {
            sqlx::query(
                "INSERT INTO order_item (order_id, product_id, product_name, quantity, unit_price)
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(order_id)
            .bind(&line.product_id.0)
            .bind(&line.product_name)
            .bind(line.quantity)
            .bind(line.unit_price.to_string())
            .execute(&mut *tx)
            .await?;

            let decremented = sqlx::query(
                "UPDATE product SET stock = stock - ?, updated_at = ?
                 WHERE id = ? AND stock >= ?",
            )
            .bind(line.quantity)
            .bind(created_at.to_rfc3339())
            .bind(&line.product_id.0)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await?
            .rows_affected();

            if decremented == 0 {
                let available: i64 = sqlx::query_scalar("SELECT stock FROM product WHERE id = ?")
                    .bind(&line.product_id.0)
                    .fetch_one(&mut *tx)
                    .await?;
                return Err(DomainError::InsufficientStock {
                    product_id: line.product_id.0.clone(),
                    requested: line.quantity,
                    available,
                }
                .into());
            }
        }

        tx.commit().await?;

        let order = Order {
            id: OrderId(order_id),
            customer_id: priced.customer_id,
            status: OrderStatus::Pending,
            total_amount: priced.total_amount,
            shipping_address: priced.shipping_address,
            tracking_number: None,
            source: priced.source,
            lines: priced.lines,
            created_at,
        };

        info!(
            event_name = "orders.placed",
            order_no = %order.id.order_no(),
            line_count = order.lines.len(),
            source = order.source.as_deref().unwrap_or("direct"),
            "order placed"
        );

        Ok(order)
    }

    async fn find(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, customer_id, status, total_amount, shipping_address, tracking_number,
                    source, created_at
             FROM orders WHERE id = ?",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let lines = self.load_lines(id.0).await?;
                Ok(Some(order_from_row(&row, lines)?))
            }
            None => Ok(None),
        }
    }

    async fn list_for_customer(&self, customer_id: &str) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, customer_id, status, total_amount, shipping_address, tracking_number,
                    source, created_at
             FROM orders WHERE customer_id = ? ORDER BY id DESC",
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in &rows {
            let lines = self.load_lines(row.try_get("id")?).await?;
            orders.push(order_from_row(row, lines)?);
        }
        Ok(orders)
    }
}

fn line_from_row(row: &SqliteRow) -> Result<OrderLine, RepositoryError> {
    let unit_price: String = row.try_get("unit_price")?;
    Ok(OrderLine {
        product_id: ProductId(row.try_get("product_id")?),
        product_name: row.try_get("product_name")?,
        quantity: row.try_get("quantity")?,
        unit_price: parse_decimal("unit_price", &unit_price)?,
    })
}

fn order_from_row(row: &SqliteRow, lines: Vec<OrderLine>) -> Result<Order, RepositoryError> {
    let status_raw: String = row.try_get("status")?;
    let status = OrderStatus::parse(&status_raw)
        .ok_or_else(|| RepositoryError::Decode(format!("unknown order status `{status_raw}`")))?;
    let total_amount: String = row.try_get("total_amount")?;

    Ok(Order {
        id: OrderId(row.try_get("id")?),
        customer_id: row.try_get("customer_id")?,
        status,
        total_amount: parse_decimal("total_amount", &total_amount)?,
        shipping_address: row.try_get("shipping_address")?,
        tracking_number: row.try_get("tracking_number")?,
        source: row.try_get("source")?,
        lines,
        created_at: parse_timestamp("created_at", row.try_get("created_at")?)?,
    })
}
