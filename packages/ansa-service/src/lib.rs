pub mod admin;
pub mod compose;
pub mod curate;
pub mod faq;
pub mod ledger;
pub mod resolve;
pub mod store;

use std::{future::Future, pin::Pin, sync::Arc};

use time::OffsetDateTime;
use uuid::Uuid;

pub use admin::RebuildReport;
pub use compose::{Intent, RoutingResult};
pub use curate::{AddAnswerRequest, AddAnswerResponse};
pub use resolve::ResolveRequest;

use ansa_config::{ChatProviderConfig, Config, EmbeddingProviderConfig};
use ansa_domain::render::{FeeTier, MembershipTerms, PublicationSchedule, SubmissionGuide};
use ansa_providers::{completion, embedding};
use ansa_storage::{
	db::Db,
	models::{LearnedAnswer, UnansweredQuestion},
	qdrant::QdrantStore,
};

pub type ServiceResult<T> = Result<T, ServiceError>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, ansa_providers::Result<Vec<f32>>>;
}

pub trait CompletionProvider
where
	Self: Send + Sync,
{
	fn complete<'a>(
		&'a self,
		cfg: &'a ChatProviderConfig,
		system_prompt: &'a str,
		user_prompt: &'a str,
	) -> BoxFuture<'a, ansa_providers::Result<String>>;
}

/// A similarity-ranked hit from a vector surface backed by a Postgres row.
#[derive(Clone, Copy, Debug)]
pub struct ScoredId {
	pub id: Uuid,
	pub similarity: f32,
}

/// A document-chunk hit. Chunks are owned by the vector store and read-only
/// to the pipeline; the payload carries everything needed to ground and cite
/// an answer.
#[derive(Clone, Debug)]
pub struct ChunkHit {
	pub doc_name: String,
	pub section: String,
	pub page: i64,
	pub content: String,
	pub similarity: f32,
}

/// The three logical query surfaces over the question embedding. Results are
/// ordered similarity-descending; nothing below `min_similarity` is returned
/// (the boundary itself is inclusive).
pub trait VectorIndex
where
	Self: Send + Sync,
{
	fn search_learned(
		&self,
		vector: Vec<f32>,
		top_k: u64,
		min_similarity: f32,
	) -> BoxFuture<'_, ServiceResult<Vec<ScoredId>>>;

	fn search_chunks(
		&self,
		vector: Vec<f32>,
		top_k: u64,
		min_similarity: f32,
	) -> BoxFuture<'_, ServiceResult<Vec<ChunkHit>>>;

	fn search_unanswered(
		&self,
		vector: Vec<f32>,
		top_k: u64,
		min_similarity: f32,
	) -> BoxFuture<'_, ServiceResult<Vec<ScoredId>>>;

	fn index_learned(
		&self,
		id: Uuid,
		question: String,
		vector: Vec<f32>,
	) -> BoxFuture<'_, ServiceResult<()>>;

	fn index_unanswered(
		&self,
		id: Uuid,
		question: String,
		vector: Vec<f32>,
	) -> BoxFuture<'_, ServiceResult<()>>;
}

/// System-of-record operations behind the pipeline: learned answers, the
/// unanswered ledger, and the structured FAQ records.
pub trait RecordStore
where
	Self: Send + Sync,
{
	fn learned_answer(&self, id: Uuid) -> BoxFuture<'_, ServiceResult<Option<LearnedAnswer>>>;

	fn insert_learned_answer(&self, row: LearnedAnswer) -> BoxFuture<'_, ServiceResult<()>>;

	fn all_learned_answers(&self) -> BoxFuture<'_, ServiceResult<Vec<LearnedAnswer>>>;

	fn bump_learned_usage(&self, id: Uuid) -> BoxFuture<'_, ServiceResult<()>>;

	fn insert_unanswered(&self, row: UnansweredQuestion) -> BoxFuture<'_, ServiceResult<()>>;

	fn unanswered_question(
		&self,
		id: Uuid,
	) -> BoxFuture<'_, ServiceResult<Option<UnansweredQuestion>>>;

	fn all_unanswered_questions(&self)
	-> BoxFuture<'_, ServiceResult<Vec<UnansweredQuestion>>>;

	fn bump_unanswered(
		&self,
		id: Uuid,
		asked_at: OffsetDateTime,
	) -> BoxFuture<'_, ServiceResult<()>>;

	fn mark_unanswered_answered(
		&self,
		id: Uuid,
		admin_note: String,
		resolved_at: OffsetDateTime,
	) -> BoxFuture<'_, ServiceResult<()>>;

	fn fee_tiers(&self) -> BoxFuture<'_, ServiceResult<Vec<FeeTier>>>;

	fn publication_schedule(&self)
	-> BoxFuture<'_, ServiceResult<Option<PublicationSchedule>>>;

	fn membership_terms(&self) -> BoxFuture<'_, ServiceResult<Option<MembershipTerms>>>;

	fn submission_guide(&self) -> BoxFuture<'_, ServiceResult<Option<SubmissionGuide>>>;
}

#[derive(Debug)]
pub enum ServiceError {
	InvalidRequest { message: String },
	Provider { message: String },
	Storage { message: String },
	Index { message: String },
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub chat: Arc<dyn CompletionProvider>,
}

pub struct ResolverService {
	pub cfg: Config,
	pub store: Arc<dyn RecordStore>,
	pub index: Arc<dyn VectorIndex>,
	pub providers: Providers,
}

struct DefaultProviders;

impl std::fmt::Display for ServiceError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::InvalidRequest { message } => write!(f, "Invalid request: {message}"),
			Self::Provider { message } => write!(f, "Provider error: {message}"),
			Self::Storage { message } => write!(f, "Storage error: {message}"),
			Self::Index { message } => write!(f, "Index error: {message}"),
		}
	}
}

impl std::error::Error for ServiceError {}

impl From<ansa_storage::Error> for ServiceError {
	fn from(err: ansa_storage::Error) -> Self {
		match err {
			ansa_storage::Error::Qdrant(_) => Self::Index { message: err.to_string() },
			_ => Self::Storage { message: err.to_string() },
		}
	}
}

impl From<ansa_providers::Error> for ServiceError {
	fn from(err: ansa_providers::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}

impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, ansa_providers::Result<Vec<f32>>> {
		Box::pin(embedding::embed(cfg, text))
	}
}

impl CompletionProvider for DefaultProviders {
	fn complete<'a>(
		&'a self,
		cfg: &'a ChatProviderConfig,
		system_prompt: &'a str,
		user_prompt: &'a str,
	) -> BoxFuture<'a, ansa_providers::Result<String>> {
		Box::pin(completion::complete(cfg, system_prompt, user_prompt))
	}
}

impl Providers {
	pub fn new(embedding: Arc<dyn EmbeddingProvider>, chat: Arc<dyn CompletionProvider>) -> Self {
		Self { embedding, chat }
	}
}

impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { embedding: provider.clone(), chat: provider }
	}
}

impl ResolverService {
	pub fn new(cfg: Config, db: Db, qdrant: QdrantStore) -> Self {
		Self {
			cfg,
			store: Arc::new(db),
			index: Arc::new(qdrant),
			providers: Providers::default(),
		}
	}

	pub fn with_components(
		cfg: Config,
		store: Arc<dyn RecordStore>,
		index: Arc<dyn VectorIndex>,
		providers: Providers,
	) -> Self {
		Self { cfg, store, index, providers }
	}

	pub(crate) async fn embed_question(&self, question: &str) -> ServiceResult<Vec<f32>> {
		let vector =
			self.providers.embedding.embed(&self.cfg.providers.embedding, question).await?;

		if vector.len() != self.cfg.storage.qdrant.vector_dim as usize {
			return Err(ServiceError::Provider {
				message: "Embedding vector dimension mismatch.".to_string(),
			});
		}

		Ok(vector)
	}
}

pub fn vector_to_pg(vec: &[f32]) -> String {
	let mut out = String::with_capacity(vec.len() * 8);

	out.push('[');

	for (i, value) in vec.iter().enumerate() {
		if i > 0 {
			out.push(',');
		}

		out.push_str(&value.to_string());
	}

	out.push(']');

	out
}

pub fn parse_pg_vector(text: &str) -> ServiceResult<Vec<f32>> {
	let trimmed = text.trim();
	let without_brackets =
		trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')).ok_or_else(|| {
			ServiceError::InvalidRequest { message: "Vector text is not bracketed.".to_string() }
		})?;

	if without_brackets.trim().is_empty() {
		return Ok(Vec::new());
	}

	let mut vec = Vec::new();

	for part in without_brackets.split(',') {
		let value: f32 = part.trim().parse().map_err(|_| ServiceError::InvalidRequest {
			message: "Vector text contains a non-numeric value.".to_string(),
		})?;

		vec.push(value);
	}

	Ok(vec)
}
