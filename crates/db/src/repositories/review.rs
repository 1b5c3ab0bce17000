use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use storefront_core::domain::product::ProductId;
use storefront_core::domain::review::{NewReview, ProductReview, ReviewId};

use super::{parse_timestamp, RepositoryError, ReviewRepository};
use crate::DbPool;

const REVIEW_COLUMNS: &str = "id, product_id, customer_id, order_id, rating, content, images_json,
     helpful_count, created_at";

pub struct SqlReviewRepository {
    pool: DbPool,
}

impl SqlReviewRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn find(&self, id: ReviewId) -> Result<Option<ProductReview>, RepositoryError> {
        let row =
            sqlx::query(&format!("SELECT {REVIEW_COLUMNS} FROM product_review WHERE id = ?"))
                .bind(id.0)
                .fetch_optional(&self.pool)
                .await?;

        row.as_ref().map(review_from_row).transpose()
    }
}

#[async_trait::async_trait]
impl ReviewRepository for SqlReviewRepository {
    async fn list_for_product(
        &self,
        product_id: &ProductId,
    ) -> Result<Vec<ProductReview>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {REVIEW_COLUMNS} FROM product_review WHERE product_id = ?
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(&product_id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(review_from_row).collect()
    }

    async fn create(
        &self,
        product_id: &ProductId,
        review: NewReview,
    ) -> Result<ProductReview, RepositoryError> {
        review.validate()?;

        let product_exists: i64 =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM product WHERE id = ?)")
                .bind(&product_id.0)
                .fetch_one(&self.pool)
                .await?;
        if product_exists == 0 {
            return Err(RepositoryError::NotFound { entity: "product", id: product_id.0.clone() });
        }

        let images_json = serde_json::to_string(&review.images)
            .map_err(|error| RepositoryError::Decode(error.to_string()))?;
        let created_at = Utc::now();

        let id = sqlx::query(
            "INSERT INTO product_review (product_id, customer_id, order_id, rating, content,
                                         images_json, helpful_count, created_at)
             VALUES (?, ?, ?, ?, ?, ?, 0, ?)",
        )
        .bind(&product_id.0)
        .bind(review.customer_id.trim())
        .bind(review.order_id)
        .bind(i64::from(review.rating))
        .bind(&review.content)
        .bind(&images_json)
        .bind(created_at.to_rfc3339_opts(chrono::SecondsFormat::Micros, true))
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        Ok(ProductReview {
            id: ReviewId(id),
            product_id: product_id.clone(),
            customer_id: review.customer_id.trim().to_string(),
            order_id: review.order_id,
            rating: review.rating,
            content: review.content,
            images: review.images,
            helpful_count: 0,
            created_at,
        })
    }

    async fn mark_helpful(&self, id: ReviewId) -> Result<ProductReview, RepositoryError> {
        let updated =
            sqlx::query("UPDATE product_review SET helpful_count = helpful_count + 1 WHERE id = ?")
                .bind(id.0)
                .execute(&self.pool)
                .await?
                .rows_affected();
        if updated == 0 {
            return Err(RepositoryError::NotFound { entity: "review", id: id.0.to_string() });
        }

        self.find(id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound { entity: "review", id: id.0.to_string() })
    }
}

fn review_from_row(row: &SqliteRow) -> Result<ProductReview, RepositoryError> {
    let rating: i64 = row.try_get("rating")?;
    let rating = u8::try_from(rating)
        .map_err(|_| RepositoryError::Decode(format!("invalid review rating: {rating}")))?;
    let images_json: String = row.try_get("images_json")?;
    let images = serde_json::from_str::<Vec<String>>(&images_json)
        .map_err(|error| RepositoryError::Decode(format!("invalid review images: {error}")))?;

    Ok(ProductReview {
        id: ReviewId(row.try_get("id")?),
        product_id: ProductId(row.try_get("product_id")?),
        customer_id: row.try_get("customer_id")?,
        order_id: row.try_get("order_id")?,
        rating,
        content: row.try_get("content")?,
        images,
        helpful_count: row.try_get("helpful_count")?,
        created_at: parse_timestamp("created_at", row.try_get("created_at")?)?,
    })
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use storefront_core::catalog::CatalogStore;
    use storefront_core::domain::product::{Product, ProductId};
    use storefront_core::domain::review::{NewReview, ReviewId};
    use storefront_core::errors::DomainError;

    use super::SqlReviewRepository;
    use crate::repositories::{RepositoryError, ReviewRepository, SqlProductRepository};
    use crate::{connect_with_settings, migrations, DbPool};

    async fn setup_pool() -> DbPool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        SqlProductRepository::new(pool.clone())
            .save(Product::new(
                "prod-1",
                "HOME-001",
                "Smart Bulb",
                "Smart Home",
                Decimal::new(5900, 2),
            ))
            .await
            .expect("save product");
        pool
    }

    fn review(rating: u8, content: &str) -> NewReview {
        NewReview {
            customer_id: "cust-1".to_string(),
            order_id: None,
            rating,
            content: content.to_string(),
            images: vec!["https://cdn.example.com/r.png".to_string()],
        }
    }

    #[tokio::test]
    async fn reviews_list_newest_first_with_images() {
        let repo = SqlReviewRepository::new(setup_pool().await);
        let product = ProductId::from("prod-1");

        repo.create(&product, review(4, "bright")).await.expect("first");
        repo.create(&product, review(5, "even brighter")).await.expect("second");

        let reviews = repo.list_for_product(&product).await.expect("list");
        assert_eq!(reviews.len(), 2);
        assert_eq!(reviews[0].content, "even brighter");
        assert_eq!(reviews[0].images.len(), 1);
    }

    #[tokio::test]
    async fn invalid_rating_and_unknown_product_are_rejected() {
        let repo = SqlReviewRepository::new(setup_pool().await);

        let invalid = repo.create(&ProductId::from("prod-1"), review(9, "")).await;
        assert!(matches!(invalid, Err(RepositoryError::Domain(DomainError::InvalidInput(_)))));

        let missing = repo.create(&ProductId::from("prod-404"), review(3, "")).await;
        assert!(matches!(missing, Err(RepositoryError::NotFound { entity: "product", .. })));
    }

    #[tokio::test]
    async fn helpful_votes_accumulate() {
        let repo = SqlReviewRepository::new(setup_pool().await);
        let created = repo.create(&ProductId::from("prod-1"), review(5, "great")).await.expect("create");

        repo.mark_helpful(created.id).await.expect("first vote");
        let updated = repo.mark_helpful(created.id).await.expect("second vote");
        assert_eq!(updated.helpful_count, 2);

        let missing = repo.mark_helpful(ReviewId(9_999)).await;
        assert!(matches!(missing, Err(RepositoryError::NotFound { entity: "review", .. })));
    }
}
