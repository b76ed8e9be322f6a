//! Curation: promoting an operator-written answer into the learned surface.
//! An answer sourced from a ledger entry resolves that entry; a direct entry
//! gets a synthetic resolved ledger row so curation history stays complete.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{ResolverService, ServiceError, ServiceResult, vector_to_pg};
use ansa_storage::models::{LearnedAnswer, STATUS_ANSWERED, UnansweredQuestion};

pub const CURATION_VALIDATION_MESSAGE: &str = "질문과 답변을 모두 입력해주세요.";

#[derive(Clone, Debug, Deserialize)]
pub struct AddAnswerRequest {
	/// Ledger entry this answer resolves, if the operator started from one.
	pub question_id: Option<Uuid>,
	pub question: String,
	pub answer: String,
	#[serde(default)]
	pub keywords: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct AddAnswerResponse {
	pub id: Uuid,
}

impl ResolverService {
	pub async fn add_answer(&self, request: AddAnswerRequest) -> ServiceResult<AddAnswerResponse> {
		let question = request.question.trim();
		let answer = request.answer.trim();

		if question.is_empty() || answer.is_empty() {
			return Err(ServiceError::InvalidRequest {
				message: CURATION_VALIDATION_MESSAGE.to_string(),
			});
		}

		let vector = self.embed_question(question).await?;
		let now = OffsetDateTime::now_utc();
		let id = Uuid::new_v4();
		let row = LearnedAnswer {
			id,
			question: question.to_string(),
			question_embedding: vector_to_pg(&vector),
			answer: answer.to_string(),
			keywords: serde_json::json!(request.keywords),
			usage_count: 0,
			is_active: true,
			created_at: now,
			created_by: "admin".to_string(),
		};

		self.store.insert_learned_answer(row).await?;
		self.index.index_learned(id, question.to_string(), vector.clone()).await?;

		match request.question_id {
			Some(question_id) => {
				self.store
					.mark_unanswered_answered(
						question_id,
						format!("learned_answers ID: {id}"),
						now,
					)
					.await?;

				tracing::info!(%id, %question_id, "Learned answer added from ledger.");
			},
			None => {
				// Direct entry: record it as already resolved so future
				// misses on the same question still dedup against it.
				let ledger_id = Uuid::new_v4();
				let ledger_row = UnansweredQuestion {
					id: ledger_id,
					question: question.to_string(),
					question_embedding: vector_to_pg(&vector),
					status: STATUS_ANSWERED.to_string(),
					asked_count: 0,
					asked_at: now,
					admin_note: Some(format!("직접 입력 - learned_answers ID: {id}")),
					resolved_at: Some(now),
				};

				self.store.insert_unanswered(ledger_row).await?;
				self.index.index_unanswered(ledger_id, question.to_string(), vector).await?;

				tracing::info!(%id, "Learned answer added directly.");
			},
		}

		Ok(AddAnswerResponse { id })
	}
}
