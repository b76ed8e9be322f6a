//! Trait wiring for the concrete stores. The pipeline only sees
//! [`RecordStore`] and [`VectorIndex`]; these impls delegate to the Postgres
//! and Qdrant backends and translate their point payloads.

use qdrant_client::{
	client::Payload,
	qdrant::{ScoredPoint, point_id::PointIdOptions, value::Kind},
};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
	BoxFuture, ChunkHit, RecordStore, ScoredId, ServiceResult, VectorIndex,
};
use ansa_domain::render::{FeeTier, MembershipTerms, PublicationSchedule, SubmissionGuide};
use ansa_storage::{
	db::Db,
	models::{LearnedAnswer, UnansweredQuestion},
	qdrant::QdrantStore,
};

fn question_payload(id: Uuid, question: &str) -> Payload {
	let mut payload = Payload::new();

	payload.insert("id", id.to_string());
	payload.insert("question", question);

	payload
}

fn payload_str(point: &ScoredPoint, key: &str) -> Option<String> {
	match point.payload.get(key)?.kind.as_ref()? {
		Kind::StringValue(text) => Some(text.clone()),
		_ => None,
	}
}

fn payload_i64(point: &ScoredPoint, key: &str) -> Option<i64> {
	match point.payload.get(key)?.kind.as_ref()? {
		Kind::IntegerValue(value) => Some(*value),
		Kind::DoubleValue(value) => Some(*value as i64),
		_ => None,
	}
}

/// A point's identity lives in its id when it is a UUID point id; the `id`
/// payload field is a fallback for points written by older ingestors.
fn point_uuid(point: &ScoredPoint) -> Option<Uuid> {
	if let Some(point_id) = point.id.as_ref()
		&& let Some(PointIdOptions::Uuid(text)) = point_id.point_id_options.as_ref()
	{
		return Uuid::parse_str(text).ok();
	}

	payload_str(point, "id").and_then(|text| Uuid::parse_str(&text).ok())
}

fn scored_id(point: &ScoredPoint) -> Option<ScoredId> {
	let Some(id) = point_uuid(point) else {
		tracing::warn!(score = point.score, "Dropping point without a usable id.");

		return None;
	};

	Some(ScoredId { id, similarity: point.score })
}

fn chunk_hit(point: &ScoredPoint) -> Option<ChunkHit> {
	let doc_name = payload_str(point, "doc_name");
	let section = payload_str(point, "section");
	let page = payload_i64(point, "page");
	let content = payload_str(point, "content");

	match (doc_name, section, page, content) {
		(Some(doc_name), Some(section), Some(page), Some(content)) =>
			Some(ChunkHit { doc_name, section, page, content, similarity: point.score }),
		_ => {
			tracing::warn!(score = point.score, "Dropping chunk point with malformed payload.");

			None
		},
	}
}

impl VectorIndex for QdrantStore {
	fn search_learned(
		&self,
		vector: Vec<f32>,
		top_k: u64,
		min_similarity: f32,
	) -> BoxFuture<'_, ServiceResult<Vec<ScoredId>>> {
		Box::pin(async move {
			let points =
				self.search(&self.learned_collection, vector, top_k, min_similarity).await?;

			Ok(points.iter().filter_map(scored_id).collect())
		})
	}

	fn search_chunks(
		&self,
		vector: Vec<f32>,
		top_k: u64,
		min_similarity: f32,
	) -> BoxFuture<'_, ServiceResult<Vec<ChunkHit>>> {
		Box::pin(async move {
			let points = self.search(&self.chunk_collection, vector, top_k, min_similarity).await?;

			Ok(points.iter().filter_map(chunk_hit).collect())
		})
	}

	fn search_unanswered(
		&self,
		vector: Vec<f32>,
		top_k: u64,
		min_similarity: f32,
	) -> BoxFuture<'_, ServiceResult<Vec<ScoredId>>> {
		Box::pin(async move {
			let points =
				self.search(&self.unanswered_collection, vector, top_k, min_similarity).await?;

			Ok(points.iter().filter_map(scored_id).collect())
		})
	}

	fn index_learned(
		&self,
		id: Uuid,
		question: String,
		vector: Vec<f32>,
	) -> BoxFuture<'_, ServiceResult<()>> {
		Box::pin(async move {
			let payload = question_payload(id, &question);

			Ok(self.upsert(&self.learned_collection, id, vector, payload).await?)
		})
	}

	fn index_unanswered(
		&self,
		id: Uuid,
		question: String,
		vector: Vec<f32>,
	) -> BoxFuture<'_, ServiceResult<()>> {
		Box::pin(async move {
			let payload = question_payload(id, &question);

			Ok(self.upsert(&self.unanswered_collection, id, vector, payload).await?)
		})
	}
}

impl RecordStore for Db {
	fn learned_answer(&self, id: Uuid) -> BoxFuture<'_, ServiceResult<Option<LearnedAnswer>>> {
		Box::pin(async move { Ok(Db::learned_answer(self, id).await?) })
	}

	fn insert_learned_answer(&self, row: LearnedAnswer) -> BoxFuture<'_, ServiceResult<()>> {
		Box::pin(async move { Ok(Db::insert_learned_answer(self, &row).await?) })
	}

	fn all_learned_answers(&self) -> BoxFuture<'_, ServiceResult<Vec<LearnedAnswer>>> {
		Box::pin(async move { Ok(Db::all_learned_answers(self).await?) })
	}

	fn bump_learned_usage(&self, id: Uuid) -> BoxFuture<'_, ServiceResult<()>> {
		Box::pin(async move { Ok(Db::bump_learned_usage(self, id).await?) })
	}

	fn insert_unanswered(&self, row: UnansweredQuestion) -> BoxFuture<'_, ServiceResult<()>> {
		Box::pin(async move { Ok(Db::insert_unanswered(self, &row).await?) })
	}

	fn unanswered_question(
		&self,
		id: Uuid,
	) -> BoxFuture<'_, ServiceResult<Option<UnansweredQuestion>>> {
		Box::pin(async move { Ok(Db::unanswered_question(self, id).await?) })
	}

	fn all_unanswered_questions(
		&self,
	) -> BoxFuture<'_, ServiceResult<Vec<UnansweredQuestion>>> {
		Box::pin(async move { Ok(Db::all_unanswered_questions(self).await?) })
	}

	fn bump_unanswered(
		&self,
		id: Uuid,
		asked_at: OffsetDateTime,
	) -> BoxFuture<'_, ServiceResult<()>> {
		Box::pin(async move { Ok(Db::bump_unanswered(self, id, asked_at).await?) })
	}

	fn mark_unanswered_answered(
		&self,
		id: Uuid,
		admin_note: String,
		resolved_at: OffsetDateTime,
	) -> BoxFuture<'_, ServiceResult<()>> {
		Box::pin(
			async move { Ok(Db::mark_unanswered_answered(self, id, &admin_note, resolved_at).await?) },
		)
	}

	fn fee_tiers(&self) -> BoxFuture<'_, ServiceResult<Vec<FeeTier>>> {
		Box::pin(async move { Ok(Db::fee_tiers(self).await?) })
	}

	fn publication_schedule(
		&self,
	) -> BoxFuture<'_, ServiceResult<Option<PublicationSchedule>>> {
		Box::pin(async move { Ok(Db::publication_schedule(self).await?) })
	}

	fn membership_terms(&self) -> BoxFuture<'_, ServiceResult<Option<MembershipTerms>>> {
		Box::pin(async move { Ok(Db::membership_terms(self).await?) })
	}

	fn submission_guide(&self) -> BoxFuture<'_, ServiceResult<Option<SubmissionGuide>>> {
		Box::pin(async move { Ok(Db::submission_guide(self).await?) })
	}
}
