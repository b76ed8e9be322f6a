use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_ANSWERED: &str = "answered";
pub const STATUS_IGNORED: &str = "ignored";

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct LearnedAnswer {
	pub id: Uuid,
	pub question: String,
	/// Bracketed float text, the system-of-record copy of the vector.
	pub question_embedding: String,
	pub answer: String,
	pub keywords: Value,
	pub usage_count: i64,
	pub is_active: bool,
	pub created_at: OffsetDateTime,
	pub created_by: String,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct UnansweredQuestion {
	pub id: Uuid,
	pub question: String,
	pub question_embedding: String,
	pub status: String,
	pub asked_count: i64,
	pub asked_at: OffsetDateTime,
	pub admin_note: Option<String>,
	pub resolved_at: Option<OffsetDateTime>,
}
