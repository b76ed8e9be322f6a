//! The unanswered-question ledger. Misses dedup by semantic similarity at a
//! stricter threshold than learned-answer matching: near-duplicate phrasing
//! should collapse into one row while related-but-distinct questions should
//! not. Repeat misses accumulate a frequency signal for operator triage.

use time::OffsetDateTime;
use uuid::Uuid;

use crate::{ResolverService, ServiceResult, vector_to_pg};
use ansa_storage::models::{STATUS_PENDING, UnansweredQuestion};

impl ResolverService {
	/// Best-effort: a ledger failure is logged and swallowed, never allowed
	/// to abort the caller's response.
	pub(crate) async fn record_miss(&self, question: &str, vector: &[f32]) {
		if let Err(err) = self.record_miss_inner(question, vector).await {
			tracing::warn!(error = %err, question, "Unanswered ledger write failed.");
		}
	}

	async fn record_miss_inner(&self, question: &str, vector: &[f32]) -> ServiceResult<()> {
		let hits = self
			.index
			.search_unanswered(vector.to_vec(), 1, self.cfg.routing.unanswered_dup_threshold)
			.await?;
		let now = OffsetDateTime::now_utc();

		if let Some(hit) = hits.first() {
			// Same semantic question: bump the counter, keep status and id.
			self.store.bump_unanswered(hit.id, now).await?;

			tracing::info!(id = %hit.id, similarity = hit.similarity, "Unanswered question repeated.");

			return Ok(());
		}

		let row = UnansweredQuestion {
			id: Uuid::new_v4(),
			question: question.to_string(),
			question_embedding: vector_to_pg(vector),
			status: STATUS_PENDING.to_string(),
			asked_count: 1,
			asked_at: now,
			admin_note: None,
			resolved_at: None,
		};
		let id = row.id;

		self.store.insert_unanswered(row).await?;
		// Indexed after the row lands; a failed upsert only weakens dedup
		// until the next index rebuild.
		self.index.index_unanswered(id, question.to_string(), vector.to_vec()).await?;

		tracing::info!(id = %id, "Unanswered question recorded.");

		Ok(())
	}
}
