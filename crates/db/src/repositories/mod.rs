use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use storefront_core::analytics::AnalyticsDashboard;
use storefront_core::domain::cart::{CartItem, CartSummary};
use storefront_core::domain::inventory::{InventoryReport, PurchaseOrderRequest, RestockRecord};
use storefront_core::domain::order::{Order, OrderId, OrderRequest};
use storefront_core::domain::product::ProductId;
use storefront_core::domain::review::{NewReview, ProductReview, ReviewId};
use storefront_core::errors::{ApplicationError, DomainError};

pub mod analytics;
pub mod cart;
pub mod inventory;
pub mod memory;
pub mod order;
pub mod product;
pub mod review;

pub use analytics::SqlAnalyticsRepository;
pub use cart::SqlCartRepository;
pub use inventory::SqlInventoryRepository;
pub use memory::InMemoryProductRepository;
pub use order::SqlOrderRepository;
pub use product::SqlProductRepository;
pub use review::SqlReviewRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("{entity} `{id}` not found")]
    NotFound { entity: &'static str, id: String },
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl From<RepositoryError> for ApplicationError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::Domain(domain) => ApplicationError::Domain(domain),
            RepositoryError::NotFound { entity, id } => {
                ApplicationError::Domain(DomainError::NotFound { entity, id })
            }
            other => ApplicationError::Persistence(other.to_string()),
        }
    }
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Validates, prices and persists the order, decrementing stock for every
    /// line in the same transaction.
    async fn place(&self, request: &OrderRequest) -> Result<Order, RepositoryError>;

    async fn find(&self, id: OrderId) -> Result<Option<Order>, RepositoryError>;

    /// Newest first.
    async fn list_for_customer(&self, customer_id: &str) -> Result<Vec<Order>, RepositoryError>;
}

#[async_trait]
pub trait CartRepository: Send + Sync {
    async fn summary(&self, customer_id: &str) -> Result<CartSummary, RepositoryError>;

    /// Adds to the existing quantity, capped at the product's stock.
    async fn add(
        &self,
        customer_id: &str,
        product_id: &ProductId,
        quantity: i64,
    ) -> Result<CartItem, RepositoryError>;

    /// Sets the quantity, capped at stock. A quantity of zero or less removes
    /// the line and returns `None`.
    async fn set_quantity(
        &self,
        customer_id: &str,
        product_id: &ProductId,
        quantity: i64,
    ) -> Result<Option<CartItem>, RepositoryError>;

    async fn remove(&self, customer_id: &str, product_id: &ProductId)
        -> Result<bool, RepositoryError>;
}

#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Newest first.
    async fn list_for_product(
        &self,
        product_id: &ProductId,
    ) -> Result<Vec<ProductReview>, RepositoryError>;

    async fn create(
        &self,
        product_id: &ProductId,
        review: NewReview,
    ) -> Result<ProductReview, RepositoryError>;

    async fn mark_helpful(&self, id: ReviewId) -> Result<ProductReview, RepositoryError>;
}

#[async_trait]
pub trait InventoryRepository: Send + Sync {
    /// Products below `threshold`, the alert trend ending on `today` and
    /// restock suggestions for products running low.
    async fn report(
        &self,
        threshold: i64,
        today: NaiveDate,
    ) -> Result<InventoryReport, RepositoryError>;

    /// Records a manual purchase order as an ordered restock suggestion.
    async fn place_purchase_order(
        &self,
        request: &PurchaseOrderRequest,
    ) -> Result<RestockRecord, RepositoryError>;
}

#[async_trait]
pub trait AnalyticsRepository: Send + Sync {
    async fn dashboard(&self, today: NaiveDate) -> Result<AnalyticsDashboard, RepositoryError>;
}

pub(crate) fn parse_decimal(
    column: &str,
    value: &str,
) -> Result<rust_decimal::Decimal, RepositoryError> {
    value.trim().parse::<rust_decimal::Decimal>().map_err(|error| {
        RepositoryError::Decode(format!("invalid decimal in `{column}`: `{value}` ({error})"))
    })
}

pub(crate) fn parse_timestamp(
    column: &str,
    value: String,
) -> Result<chrono::DateTime<chrono::Utc>, RepositoryError> {
    chrono::DateTime::parse_from_rfc3339(&value)
        .map(|timestamp| timestamp.with_timezone(&chrono::Utc))
        .map_err(|error| {
            RepositoryError::Decode(format!("invalid timestamp in `{column}`: `{value}` ({error})"))
        })
}
