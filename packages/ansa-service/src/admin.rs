//! Index maintenance. Postgres is the system of record; the vector index can
//! always be rebuilt from the persisted embedding text.

use serde::{Deserialize, Serialize};

use crate::{ResolverService, ServiceResult, parse_pg_vector};

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize)]
pub struct RebuildReport {
	pub learned_points: u64,
	pub unanswered_points: u64,
	pub skipped: u64,
}

impl ResolverService {
	/// Re-upserts every stored row into its vector surface. Rows with
	/// unparsable or wrong-dimension embedding text are skipped and counted,
	/// not fatal; the rebuild should recover as much of the index as it can.
	pub async fn rebuild_index(&self) -> ServiceResult<RebuildReport> {
		let dim = self.cfg.storage.qdrant.vector_dim as usize;
		let mut report = RebuildReport::default();

		for row in self.store.all_learned_answers().await? {
			let vector = match parse_pg_vector(&row.question_embedding) {
				Ok(vector) if vector.len() == dim => vector,
				Ok(vector) => {
					tracing::warn!(id = %row.id, dim = vector.len(), "Skipping row with wrong embedding dimension.");

					report.skipped += 1;

					continue;
				},
				Err(err) => {
					tracing::warn!(id = %row.id, error = %err, "Skipping row with unparsable embedding.");

					report.skipped += 1;

					continue;
				},
			};

			if let Err(err) = self.index.index_learned(row.id, row.question, vector).await {
				tracing::warn!(id = %row.id, error = %err, "Learned upsert failed during rebuild.");

				report.skipped += 1;
			} else {
				report.learned_points += 1;
			}
		}

		for row in self.store.all_unanswered_questions().await? {
			let vector = match parse_pg_vector(&row.question_embedding) {
				Ok(vector) if vector.len() == dim => vector,
				Ok(vector) => {
					tracing::warn!(id = %row.id, dim = vector.len(), "Skipping row with wrong embedding dimension.");

					report.skipped += 1;

					continue;
				},
				Err(err) => {
					tracing::warn!(id = %row.id, error = %err, "Skipping row with unparsable embedding.");

					report.skipped += 1;

					continue;
				},
			};

			if let Err(err) = self.index.index_unanswered(row.id, row.question, vector).await {
				tracing::warn!(id = %row.id, error = %err, "Unanswered upsert failed during rebuild.");

				report.skipped += 1;
			} else {
				report.unanswered_points += 1;
			}
		}

		tracing::info!(
			learned = report.learned_points,
			unanswered = report.unanswered_points,
			skipped = report.skipped,
			"Index rebuild finished."
		);

		Ok(report)
	}
}
