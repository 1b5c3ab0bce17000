//! Catalog browsing and reviews.
//!
//! - `GET  /api/v1/products`                 - filtered, ordered, paged list
//! - `GET  /api/v1/products/{id}`            - product detail
//! - `GET  /api/v1/recommendations`          - best sellers
//! - `GET  /api/v1/products/{id}/reviews`    - reviews, newest first
//! - `POST /api/v1/products/{id}/reviews`    - create a review
//! - `POST /api/v1/reviews/{id}/helpful`     - count a helpful vote

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use storefront_core::catalog::{
    CatalogQuery, CatalogStore, ProductFilter, SortField, SortKey, TextField,
};
use storefront_core::domain::product::{Product, ProductId};
use storefront_core::domain::review::{NewReview, ProductReview, ReviewId};
use storefront_db::ReviewRepository;
use tracing::info;

use crate::bootstrap::AppState;
use crate::error::ApiError;

pub const DEFAULT_PAGE_SIZE: usize = 9;
pub const MAX_PAGE_SIZE: usize = 100;
pub const BEST_SELLER_LIMIT: usize = 10;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/products", get(list_products))
        .route("/api/v1/products/{id}", get(product_detail))
        .route("/api/v1/products/{id}/reviews", get(list_reviews).post(create_review))
        .route("/api/v1/recommendations", get(best_sellers))
        .route("/api/v1/reviews/{id}/helpful", post(mark_review_helpful))
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductView {
    pub id: String,
    pub sku: String,
    pub name: String,
    pub category: String,
    pub price: Decimal,
    pub original_price: Option<Decimal>,
    pub stock: i64,
    pub image: String,
    pub description: String,
    pub rating: f64,
    pub sales_count: i64,
    pub sales: i64,
    pub potential_score: f64,
    pub selection_reason: String,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.0.clone(),
            sku: product.sku.clone(),
            name: product.name.clone(),
            category: product.category.clone(),
            price: product.price,
            original_price: product.original_price,
            stock: product.stock,
            image: product.image_or_default().to_string(),
            description: product.description.clone(),
            rating: product.rating,
            sales_count: product.sales_count,
            sales: product.sales_count,
            potential_score: product.potential_score,
            selection_reason: product.selection_reason.clone(),
        }
    }
}

/// Query-string parameters are taken as raw text so that a malformed value
/// is ignored instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct ProductListParams {
    pub q: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub ordering: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

impl ProductListParams {
    pub fn page(&self) -> usize {
        parse_positive(self.page.as_deref()).unwrap_or(1)
    }

    pub fn page_size(&self) -> usize {
        parse_positive(self.page_size.as_deref()).unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE)
    }

    pub fn to_query(&self) -> CatalogQuery {
        let mut query = CatalogQuery::new();

        if let Some(term) = non_blank(self.q.as_deref()) {
            query = query.filter(ProductFilter::TextContainsAny {
                fields: vec![TextField::Name, TextField::Sku, TextField::Category],
                terms: vec![term.to_string()],
            });
        }
        if let Some(category) = non_blank(self.category.as_deref()) {
            query = query.filter(ProductFilter::CategoryEquals(category.to_string()));
        }
        if let Some(bound) = parse_decimal(self.min_price.as_deref()) {
            query = query.filter(ProductFilter::PriceAtLeast(bound));
        }
        if let Some(bound) = parse_decimal(self.max_price.as_deref()) {
            query = query.filter(ProductFilter::PriceAtMost(bound));
        }

        let sort = self
            .ordering
            .as_deref()
            .and_then(SortKey::parse)
            .unwrap_or(SortKey::desc(SortField::PotentialScore));
        let page_size = self.page_size();

        query.sort_by(sort).offset((self.page() - 1).saturating_mul(page_size)).limit(page_size)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn parse_positive(value: Option<&str>) -> Option<usize> {
    non_blank(value).and_then(|raw| raw.parse::<usize>().ok()).filter(|value| *value > 0)
}

fn parse_decimal(value: Option<&str>) -> Option<Decimal> {
    non_blank(value).and_then(|raw| raw.parse::<Decimal>().ok())
}

#[derive(Debug, Serialize)]
pub struct ProductPage {
    pub count: usize,
    pub page: usize,
    pub page_size: usize,
    pub results: Vec<ProductView>,
}

async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ProductListParams>,
) -> Result<Json<ProductPage>, ApiError> {
    let query = params.to_query();
    let count = state.catalog.count(&query.unpaged()).await?;
    let products = state.catalog.query(&query).await?;

    Ok(Json(ProductPage {
        count,
        page: params.page(),
        page_size: params.page_size(),
        results: products.iter().map(ProductView::from).collect(),
    }))
}

async fn product_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductView>, ApiError> {
    let product = state
        .catalog
        .find(&ProductId(id.clone()))
        .await?
        .ok_or_else(|| ApiError::not_found("product", id))?;
    Ok(Json(ProductView::from(&product)))
}

async fn best_sellers(State(state): State<AppState>) -> Result<Json<Vec<ProductView>>, ApiError> {
    let query = CatalogQuery::new()
        .sort_by(SortKey::desc(SortField::SalesCount))
        .limit(BEST_SELLER_LIMIT);
    let products = state.catalog.query(&query).await?;
    Ok(Json(products.iter().map(ProductView::from).collect()))
}

async fn require_product(state: &AppState, id: &str) -> Result<ProductId, ApiError> {
    let product_id = ProductId(id.to_string());
    match state.catalog.find(&product_id).await? {
        Some(_) => Ok(product_id),
        None => Err(ApiError::not_found("product", id)),
    }
}

async fn list_reviews(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<ProductReview>>, ApiError> {
    let product_id = require_product(&state, &id).await?;
    Ok(Json(state.reviews.list_for_product(&product_id).await?))
}

async fn create_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<NewReview>,
) -> Result<(StatusCode, Json<ProductReview>), ApiError> {
    let review = state.reviews.create(&ProductId(id), body).await?;
    info!(
        event_name = "reviews.created",
        review_id = review.id.0,
        product_id = %review.product_id,
        rating = review.rating,
        "product review created"
    );
    Ok((StatusCode::CREATED, Json(review)))
}

async fn mark_review_helpful(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ProductReview>, ApiError> {
    Ok(Json(state.reviews.mark_helpful(ReviewId(id)).await?))
}

#[cfg(test)]
mod tests {
    use axum::extract::{Path, Query};
    use axum::http::StatusCode;
    use axum::Json;
    use storefront_core::domain::review::NewReview;

    use super::{
        best_sellers, create_review, list_products, list_reviews, mark_review_helpful,
        product_detail, ProductListParams, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
    };
    use crate::test_support::{seeded_state, state};

    fn params(pairs: &[(&str, &str)]) -> ProductListParams {
        let mut params = ProductListParams::default();
        for (key, value) in pairs {
            let value = Some(value.to_string());
            match *key {
                "q" => params.q = value,
                "category" => params.category = value,
                "min_price" => params.min_price = value,
                "max_price" => params.max_price = value,
                "ordering" => params.ordering = value,
                "page" => params.page = value,
                "page_size" => params.page_size = value,
                _ => {}
            }
        }
        params
    }

    #[test]
    fn page_size_defaults_and_is_capped() {
        assert_eq!(params(&[]).page_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(params(&[("page_size", "1000")]).page_size(), MAX_PAGE_SIZE);
        assert_eq!(params(&[("page_size", "abc")]).page_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(params(&[("page", "0")]).page(), 1);
    }

    #[test]
    fn huge_page_number_saturates_the_offset() {
        let query = params(&[("page", "200000000000000000"), ("page_size", "100")]).to_query();

        assert_eq!(query.offset, usize::MAX);
        assert_eq!(query.limit, Some(100));
    }

    #[tokio::test]
    async fn page_past_the_end_is_empty_but_keeps_the_count() {
        let app = seeded_state().await;

        let Json(page) = list_products(
            state(&app),
            Query(params(&[("page", "200000000000000000"), ("page_size", "100")])),
        )
        .await
        .expect("list");
        assert_eq!(page.count, 4);
        assert!(page.results.is_empty());
    }

    #[tokio::test]
    async fn list_filters_by_text_and_price_and_ignores_bad_bounds() {
        let app = seeded_state().await;

        let Json(page) = list_products(
            state(&app),
            Query(params(&[("q", "KEYBOARD"), ("min_price", "oops")])),
        )
        .await
        .expect("list");
        assert_eq!(page.count, 1);
        assert_eq!(page.results[0].id, "prod-2");

        let Json(page) = list_products(
            state(&app),
            Query(params(&[("max_price", "200"), ("ordering", "-price")])),
        )
        .await
        .expect("list");
        let ids = page.results.iter().map(|p| p.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["prod-1", "prod-4"]);
    }

    #[tokio::test]
    async fn list_pages_results_and_reports_total_count() {
        let app = seeded_state().await;

        let Json(page) = list_products(
            state(&app),
            Query(params(&[("ordering", "price"), ("page", "2"), ("page_size", "3")])),
        )
        .await
        .expect("list");

        assert_eq!(page.count, 4);
        assert_eq!(page.page, 2);
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.results[0].id, "prod-2");
    }

    #[tokio::test]
    async fn detail_returns_placeholder_image_and_404_for_unknown_id() {
        let app = seeded_state().await;

        let Json(view) =
            product_detail(state(&app), Path("prod-1".to_string())).await.expect("detail");
        assert!(view.image.starts_with("https://"));
        assert_eq!(view.sales, 500);

        let missing = product_detail(state(&app), Path("prod-404".to_string())).await;
        assert_eq!(missing.err().map(|error| error.status()), Some(StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn best_sellers_are_sorted_by_sales() {
        let app = seeded_state().await;

        let Json(products) = best_sellers(state(&app)).await.expect("best sellers");
        let ids = products.iter().map(|p| p.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["prod-3", "prod-2", "prod-1", "prod-4"]);
    }

    #[tokio::test]
    async fn reviews_can_be_created_listed_and_voted() {
        let app = seeded_state().await;

        let (status, Json(created)) = create_review(
            state(&app),
            Path("prod-1".to_string()),
            Json(NewReview {
                customer_id: "cust-1".to_string(),
                order_id: None,
                rating: 5,
                content: "Great bass".to_string(),
                images: Vec::new(),
            }),
        )
        .await
        .expect("create");
        assert_eq!(status, StatusCode::CREATED);

        let Json(voted) =
            mark_review_helpful(state(&app), Path(created.id.0)).await.expect("vote");
        assert_eq!(voted.helpful_count, 1);

        let Json(reviews) =
            list_reviews(state(&app), Path("prod-1".to_string())).await.expect("list");
        assert_eq!(reviews.len(), 1);

        let missing = list_reviews(state(&app), Path("prod-404".to_string())).await;
        assert_eq!(missing.err().map(|error| error.status()), Some(StatusCode::NOT_FOUND));

        let missing_vote = mark_review_helpful(state(&app), Path(9_999)).await;
        assert_eq!(missing_vote.err().map(|error| error.status()), Some(StatusCode::NOT_FOUND));
    }
}
