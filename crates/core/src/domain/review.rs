use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::product::ProductId;
use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReviewId(pub i64);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductReview {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub customer_id: String,
    pub order_id: Option<i64>,
    pub rating: u8,
    pub content: String,
    pub images: Vec<String>,
    pub helpful_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReview {
    pub customer_id: String,
    #[serde(default)]
    pub order_id: Option<i64>,
    pub rating: u8,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub images: Vec<String>,
}

impl NewReview {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.customer_id.trim().is_empty() {
            return Err(DomainError::InvalidInput("customer_id is required".to_string()));
        }
        if !(1..=5).contains(&self.rating) {
            return Err(DomainError::InvalidInput("rating must be between 1 and 5".to_string()));
        }
        Ok(())
    }
}
