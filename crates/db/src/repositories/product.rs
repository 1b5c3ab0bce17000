use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite};

use storefront_core::catalog::{
    CatalogQuery, CatalogStore, ProductFilter, SortField, SortKey, TextField,
};
use storefront_core::domain::product::{Product, ProductId};
use storefront_core::errors::ApplicationError;

use super::{parse_decimal, RepositoryError};
use crate::DbPool;

pub(crate) const PRODUCT_COLUMNS: &str = "id, sku, name, category, price, original_price, stock, image_url,
     description, rating, sales_count, potential_score, selection_reason";

pub struct SqlProductRepository {
    pool: DbPool,
}

impl SqlProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, query: &CatalogQuery) -> Result<Vec<Product>, RepositoryError> {
        let mut builder =
            QueryBuilder::<Sqlite>::new(format!("SELECT {PRODUCT_COLUMNS} FROM product"));
        push_filters(&mut builder, &query.filters);
        push_order(&mut builder, &query.sort);

        match query.limit {
            Some(limit) => {
                builder.push(" LIMIT ").push_bind(to_i64(limit));
            }
            None if query.offset > 0 => {
                builder.push(" LIMIT -1");
            }
            None => {}
        }
        if query.offset > 0 {
            builder.push(" OFFSET ").push_bind(to_i64(query.offset));
        }

        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.iter().map(product_from_row).collect()
    }

    pub async fn count_matching(&self, query: &CatalogQuery) -> Result<usize, RepositoryError> {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) AS count FROM product");
        push_filters(&mut builder, &query.filters);

        let count: i64 = builder.build().fetch_one(&self.pool).await?.try_get("count")?;
        usize::try_from(count)
            .map_err(|_| RepositoryError::Decode(format!("negative product count: {count}")))
    }

    pub async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM product WHERE id = ?"))
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(product_from_row).transpose()
    }

    pub async fn find_by_sku(&self, sku: &str) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM product WHERE sku = ?"))
            .bind(sku)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(product_from_row).transpose()
    }

    pub async fn upsert(&self, product: &Product) -> Result<(), RepositoryError> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO product (id, sku, name, category, price, original_price, stock, image_url,
                                  description, rating, sales_count, potential_score,
                                  selection_reason, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                 sku = excluded.sku,
                 name = excluded.name,
                 category = excluded.category,
                 price = excluded.price,
                 original_price = excluded.original_price,
                 stock = excluded.stock,
                 image_url = excluded.image_url,
                 description = excluded.description,
                 rating = excluded.rating,
                 sales_count = excluded.sales_count,
                 potential_score = excluded.potential_score,
                 selection_reason = excluded.selection_reason,
                 updated_at = excluded.updated_at",
        )
        .bind(&product.id.0)
        .bind(&product.sku)
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.price.to_string())
        .bind(product.original_price.map(|price| price.to_string()))
        .bind(product.stock)
        .bind(&product.image_url)
        .bind(&product.description)
        .bind(product.rating)
        .bind(product.sales_count)
        .bind(product.potential_score)
        .bind(&product.selection_reason)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn write_selection(
        &self,
        id: &ProductId,
        potential_score: f64,
        selection_reason: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "UPDATE product SET potential_score = ?, selection_reason = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(potential_score)
        .bind(selection_reason)
        .bind(Utc::now().to_rfc3339())
        .bind(&id.0)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl CatalogStore for SqlProductRepository {
    async fn query(&self, query: &CatalogQuery) -> Result<Vec<Product>, ApplicationError> {
        Ok(self.list(query).await?)
    }

    async fn count(&self, query: &CatalogQuery) -> Result<usize, ApplicationError> {
        Ok(self.count_matching(query).await?)
    }

    async fn find(&self, id: &ProductId) -> Result<Option<Product>, ApplicationError> {
        Ok(self.find_by_id(id).await?)
    }

    async fn save(&self, product: Product) -> Result<(), ApplicationError> {
        Ok(self.upsert(&product).await?)
    }

    async fn update_selection(
        &self,
        id: &ProductId,
        potential_score: f64,
        selection_reason: &str,
    ) -> Result<(), ApplicationError> {
        Ok(self.write_selection(id, potential_score, selection_reason).await?)
    }
}

fn text_column(field: TextField) -> &'static str {
    match field {
        TextField::Name => "name",
        TextField::Sku => "sku",
        TextField::Category => "category",
        TextField::Description => "description",
    }
}

fn sort_column(field: SortField) -> &'static str {
    match field {
        SortField::Price => "CAST(price AS REAL)",
        SortField::PotentialScore => "potential_score",
        SortField::SalesCount => "sales_count",
        SortField::Rating => "rating",
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, filters: &[ProductFilter]) {
    for (index, filter) in filters.iter().enumerate() {
        builder.push(if index == 0 { " WHERE " } else { " AND " });

        match filter {
            ProductFilter::TextContainsAny { fields, terms } => {
                let terms = terms
                    .iter()
                    .map(|term| term.to_lowercase())
                    .filter(|term| !term.is_empty())
                    .collect::<Vec<_>>();
                if fields.is_empty() || terms.is_empty() {
                    builder.push("0");
                    continue;
                }

                builder.push("(");
                let mut first = true;
                for field in fields {
                    for term in &terms {
                        if !first {
                            builder.push(" OR ");
                        }
                        first = false;
                        builder
                            .push("instr(lower(")
                            .push(text_column(*field))
                            .push("), ")
                            .push_bind(term.clone())
                            .push(") > 0");
                    }
                }
                builder.push(")");
            }
            ProductFilter::NameOrCategory { name_term, category } => {
                builder
                    .push("(instr(lower(name), ")
                    .push_bind(name_term.to_lowercase())
                    .push(") > 0 OR lower(category) = ")
                    .push_bind(category.to_lowercase())
                    .push(")");
            }
            ProductFilter::CategoryEquals(category) => {
                builder.push("lower(category) = ").push_bind(category.to_lowercase());
            }
            ProductFilter::PriceAtLeast(bound) => {
                builder.push("CAST(price AS REAL) >= ").push_bind(bound.to_f64().unwrap_or(0.0));
            }
            ProductFilter::PriceAtMost(bound) => {
                builder
                    .push("CAST(price AS REAL) <= ")
                    .push_bind(bound.to_f64().unwrap_or(f64::MAX));
            }
            ProductFilter::StockAbove(threshold) => {
                builder.push("stock > ").push_bind(*threshold);
            }
        }
    }
}

/// Always ends with `id` so ties come back in a stable order.
fn push_order(builder: &mut QueryBuilder<'_, Sqlite>, sort: &[SortKey]) {
    builder.push(" ORDER BY ");
    for key in sort {
        builder
            .push(sort_column(key.field))
            .push(if key.descending { " DESC, " } else { " ASC, " });
    }
    builder.push("id ASC");
}

fn to_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

pub(crate) fn product_from_row(row: &SqliteRow) -> Result<Product, RepositoryError> {
    let price: String = row.try_get("price")?;
    let original_price: Option<String> = row.try_get("original_price")?;

    Ok(Product {
        id: ProductId(row.try_get("id")?),
        sku: row.try_get("sku")?,
        name: row.try_get("name")?,
        category: row.try_get("category")?,
        price: parse_decimal("price", &price)?,
        original_price: original_price
            .map(|value| parse_decimal("original_price", &value))
            .transpose()?,
        stock: row.try_get("stock")?,
        image_url: row.try_get("image_url")?,
        description: row.try_get("description")?,
        rating: row.try_get("rating")?,
        sales_count: row.try_get("sales_count")?,
        potential_score: row.try_get("potential_score")?,
        selection_reason: row.try_get("selection_reason")?,
    })
}
