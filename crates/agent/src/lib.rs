//! Shopping assistant runtime.
//!
//! A chat question flows through a fixed local pipeline:
//! 1. **Intent extraction** (`conversation`) - vocabulary match to an
//!    [`Intent`](conversation::Intent) plus category and product-type keywords
//! 2. **Candidate lookup** (`recommend`) - priority chain of catalog queries,
//!    capped at six products
//! 3. **Reply rendering** (`compose`) - one canned template per intent
//!
//! `gateway` puts an optional remote completion model in front of that
//! pipeline. The model only picks among catalog products it was shown and
//! any remote failure is answered by the local pipeline.

pub mod chat;
pub mod compose;
pub mod conversation;
pub mod gateway;
pub mod llm;
pub mod recommend;
pub mod runtime;

pub use chat::{ChatRequest, ChatResponse, ChatTurn, RecommendedProductView};
pub use conversation::{ExtractedIntent, Intent, IntentExtractor};
pub use gateway::AdvisoryGateway;
pub use llm::{LlmClient, LlmError, OpenAiCompatibleClient};
pub use recommend::{RecommendationQueryBuilder, RecommendationStrategy, MAX_RECOMMENDATIONS};
pub use runtime::{AssistantReply, ReplySource, ShoppingAssistant};
