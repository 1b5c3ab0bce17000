use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use storefront_core::domain::product::Product;
use storefront_core::errors::DomainError;

use crate::recommend::MAX_RECOMMENDATIONS;
use crate::runtime::AssistantReply;

pub const NO_MESSAGES_ERROR: &str = "No messages provided";
pub const BLANK_QUESTION_ERROR: &str = "Please enter your question.";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<ChatTurn>,
    #[serde(default)]
    pub session_id: Option<String>,
}

impl ChatRequest {
    /// The trimmed content of the final message, which is the only part of
    /// the history the assistant answers.
    pub fn question(&self) -> Result<&str, DomainError> {
        let last = self
            .messages
            .last()
            .ok_or_else(|| DomainError::InvalidInput(NO_MESSAGES_ERROR.to_string()))?;
        let question = last.content.trim();
        if question.is_empty() {
            return Err(DomainError::InvalidInput(BLANK_QUESTION_ERROR.to_string()));
        }
        Ok(question)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecommendedProductView {
    pub id: String,
    pub name: String,
    /// A JSON number, unlike the string-encoded catalog prices.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub image: String,
    pub rating: f64,
    pub sales: i64,
}

impl From<&Product> for RecommendedProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.0.clone(),
            name: product.name.clone(),
            price: product.price,
            image: product.image_or_default().to_string(),
            rating: product.rating,
            sales: product.sales_count,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub message: String,
    pub recommended_products: Vec<RecommendedProductView>,
}

impl From<AssistantReply> for ChatResponse {
    fn from(reply: AssistantReply) -> Self {
        Self {
            message: reply.message,
            recommended_products: reply
                .products
                .iter()
                .take(MAX_RECOMMENDATIONS)
                .map(RecommendedProductView::from)
                .collect(),
        }
    }
}
