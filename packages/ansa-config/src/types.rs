use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub deployment: Deployment,
	pub features: Features,
	pub storage: Storage,
	pub providers: Providers,
	pub routing: Routing,
	pub faq: Faq,
	pub links: Option<Links>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub admin_bind: String,
	pub log_level: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Deployment {
	pub name: String,
	pub contact_email: String,
	pub contact_phone: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Features {
	pub external_links: bool,
	pub faq: bool,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
	pub qdrant: Qdrant,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Qdrant {
	pub url: String,
	pub learned_collection: String,
	pub chunk_collection: String,
	pub unanswered_collection: String,
	pub vector_dim: u32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	pub chat: ChatProviderConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ChatProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub max_tokens: u32,
	pub timeout_ms: u64,
	pub system_prompt: String,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Routing {
	/// Minimum similarity for a learned answer to short-circuit the cascade.
	pub learned_sim_threshold: f32,
	/// How many learned candidates to pull before the is_active check.
	pub learned_candidate_k: u32,
	/// Minimum similarity for two unanswered questions to count as the same.
	pub unanswered_dup_threshold: f32,
	pub rag_top_k: u32,
	pub rag_sim_threshold: f32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Faq {
	/// Citation prefix, e.g. the publication guide the records were taken from.
	pub source_label: String,
	pub keywords: Option<FaqKeywords>,
}

/// Per-deployment keyword overrides. A category left unset falls back to the
/// built-in default keyword list for that category.
#[derive(Clone, Debug, Deserialize)]
pub struct FaqKeywords {
	pub fees: Option<Vec<String>>,
	pub schedule: Option<Vec<String>>,
	pub membership: Option<Vec<String>>,
	pub submission: Option<Vec<String>>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Links {
	pub keywords: Vec<String>,
	pub default_labels: Vec<String>,
	pub urls: HashMap<String, String>,
	#[serde(default)]
	pub auto_match: Vec<AutoMatchRule>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AutoMatchRule {
	pub keywords: Vec<String>,
	pub links: Vec<String>,
}
