//! Remote advisory path with local fallback.
//!
//! Without a configured client every call goes straight to the local
//! [`ShoppingAssistant`]. With one, a single completion request is made over
//! a candidate shortlist; any failure along the way (catalog lookup,
//! transport, status, decoding, empty reply) is logged and answered locally
//! instead. Callers never see a remote error.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde_json::Value;
use storefront_core::catalog::{CatalogQuery, CatalogStore, ProductFilter, SortField, SortKey, TextField};
use storefront_core::config::LlmConfig;
use storefront_core::domain::product::Product;
use storefront_core::errors::ApplicationError;
use tracing::{info, warn};

use crate::llm::{ChatCompletionRequest, ChatMessage, LlmClient, LlmError, OpenAiCompatibleClient};
use crate::recommend::{top_sellers, MAX_RECOMMENDATIONS};
use crate::runtime::{AssistantReply, ReplySource, ShoppingAssistant};

/// Candidates described to the remote model.
pub const MAX_CONTEXT_PRODUCTS: usize = 10;

pub const STRUCTURED_TAG: &str = "RECOMMENDED_PRODUCTS";

/// Lead-in used when the remote reply carries picks but no prose.
pub const TAG_ONLY_LEAD_IN: &str = "Here are the products I recommend for you:";

static TAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"RECOMMENDED_PRODUCTS:\s*(\[.*?\])").expect("tag pattern is a valid literal")
});

#[derive(Clone, Debug, PartialEq)]
pub struct GatewaySettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl From<&LlmConfig> for GatewaySettings {
    fn from(config: &LlmConfig) -> Self {
        Self {
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

pub struct AdvisoryGateway {
    assistant: ShoppingAssistant,
    client: Option<Arc<dyn LlmClient>>,
    settings: GatewaySettings,
}

impl AdvisoryGateway {
    /// Local-only gateway.
    pub fn local(assistant: ShoppingAssistant, settings: GatewaySettings) -> Self {
        Self { assistant, client: None, settings }
    }

    pub fn with_client(
        assistant: ShoppingAssistant,
        client: Arc<dyn LlmClient>,
        settings: GatewaySettings,
    ) -> Self {
        Self { assistant, client: Some(client), settings }
    }

    /// Remote-capable when `config` carries a credential, local otherwise.
    pub fn from_config(assistant: ShoppingAssistant, config: &LlmConfig) -> Result<Self, LlmError> {
        let settings = GatewaySettings::from(config);
        Ok(match OpenAiCompatibleClient::from_config(config)? {
            Some(client) => Self::with_client(assistant, Arc::new(client), settings),
            None => Self::local(assistant, settings),
        })
    }

    pub fn is_remote_enabled(&self) -> bool {
        self.client.is_some()
    }

    pub async fn respond(
        &self,
        store: &dyn CatalogStore,
        message: &str,
    ) -> Result<AssistantReply, ApplicationError> {
        let Some(client) = &self.client else {
            info!(
                event_name = "assistant.gateway.fallback",
                reason = "no_credential",
                "llm credential not configured, answering locally"
            );
            return self.assistant.respond(store, message).await;
        };

        match self.ask_remote(client.as_ref(), store, message).await {
            Ok(reply) => Ok(reply),
            Err(reason) => {
                warn!(
                    event_name = "assistant.gateway.fallback",
                    reason = %reason,
                    "remote advisory failed, answering locally"
                );
                self.assistant.respond(store, message).await
            }
        }
    }

    async fn ask_remote(
        &self,
        client: &dyn LlmClient,
        store: &dyn CatalogStore,
        message: &str,
    ) -> Result<AssistantReply, String> {
        let candidates = self.context_candidates(store, message).await.map_err(|e| e.to_string())?;
        let request = ChatCompletionRequest {
            model: self.settings.model.clone(),
            messages: vec![ChatMessage::system(system_prompt(&candidates)), ChatMessage::user(message)],
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };

        let raw = client.complete(&request).await.map_err(|e| e.to_string())?;
        let (mut text, products) = parse_tagged_reply(&raw, &candidates);
        if text.is_empty() {
            if products.is_empty() {
                return Err("remote reply was empty".to_string());
            }
            text = TAG_ONLY_LEAD_IN.to_string();
        }

        info!(
            event_name = "assistant.gateway.replied",
            candidate_count = candidates.len(),
            product_count = products.len(),
            "remote advisory reply parsed"
        );
        Ok(AssistantReply { message: text, products, source: ReplySource::Remote })
    }

    async fn context_candidates(
        &self,
        store: &dyn CatalogStore,
        message: &str,
    ) -> Result<Vec<Product>, ApplicationError> {
        let keywords = self.assistant.extractor().keywords(message);
        if !keywords.is_empty() {
            let query = CatalogQuery::new()
                .filter(ProductFilter::TextContainsAny {
                    fields: vec![TextField::Name, TextField::Category],
                    terms: keywords,
                })
                .sort_by(SortKey::desc(SortField::PotentialScore))
                .sort_by(SortKey::desc(SortField::SalesCount))
                .limit(MAX_CONTEXT_PRODUCTS);
            let matched = store.query(&query).await?;
            if !matched.is_empty() {
                return Ok(matched);
            }
        }
        store.query(&top_sellers(MAX_CONTEXT_PRODUCTS)).await
    }
}

pub fn system_prompt(candidates: &[Product]) -> String {
    let context = candidates
        .iter()
        .map(|product| {
            format!(
                "ID: {}, Product: {}, Price: ¥{}, Category: {}, Stock: {}",
                product.id, product.name, product.price, product.category, product.stock
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are a professional AI shopping assistant. Help the user with product recommendations and questions.\n\n\
         Available products:\n{context}\n\n\
         Answer in natural language, and end your reply with the IDs of the products you recommend (if any) as a JSON array.\n\
         Format: {STRUCTURED_TAG}: [\"id1\", \"id2\"]\n"
    )
}

/// Splits a remote reply into visible text and the tagged products.
///
/// Tagged ids are compared as strings against `candidates`; unknown ids are
/// dropped and the result keeps candidate order, capped at
/// [`MAX_RECOMMENDATIONS`]. A malformed tag payload yields no products. Every
/// tag occurrence is removed from the text.
pub fn parse_tagged_reply(raw: &str, candidates: &[Product]) -> (String, Vec<Product>) {
    let picked_ids = TAG_PATTERN
        .captures(raw)
        .and_then(|captures| captures.get(1))
        .and_then(|payload| serde_json::from_str::<Vec<Value>>(payload.as_str()).ok())
        .map(|values| values.iter().map(id_string).collect::<Vec<_>>())
        .unwrap_or_default();

    let products = candidates
        .iter()
        .filter(|product| picked_ids.iter().any(|id| *id == product.id.0))
        .take(MAX_RECOMMENDATIONS)
        .cloned()
        .collect();

    let text = TAG_PATTERN.replace_all(raw, "").trim().to_string();
    (text, products)
}

fn id_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
