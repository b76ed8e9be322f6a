use serde_json::Value;
use sqlx::{PgPool, Row, postgres::PgPoolOptions};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
	Result,
	models::{LearnedAnswer, UnansweredQuestion},
	schema,
};
use ansa_domain::render::{FeeTier, MembershipTerms, PublicationSchedule, SubmissionGuide};

pub struct Db {
	pub pool: PgPool,
}
impl Db {
	pub async fn connect(cfg: &ansa_config::Postgres) -> Result<Self> {
		let pool =
			PgPoolOptions::new().max_connections(cfg.pool_max_conns).connect(&cfg.dsn).await?;

		Ok(Self { pool })
	}

	pub async fn ensure_schema(&self) -> Result<()> {
		let sql = schema::render_schema();
		let lock_id: i64 = 6_180_523;
		// Advisory locks are held per connection. Use a single transaction so
		// the lock is scoped to one connection and released when it ends.
		let mut tx = self.pool.begin().await?;

		sqlx::query("SELECT pg_advisory_xact_lock($1)").bind(lock_id).execute(&mut *tx).await?;

		for statement in sql.split(';') {
			let trimmed = statement.trim();

			if trimmed.is_empty() {
				continue;
			}

			sqlx::query(trimmed).execute(&mut *tx).await?;
		}

		tx.commit().await?;

		Ok(())
	}

	pub async fn insert_learned_answer(&self, row: &LearnedAnswer) -> Result<()> {
		sqlx::query(
			"\
INSERT INTO learned_answers (
	id,
	question,
	question_embedding,
	answer,
	keywords,
	usage_count,
	is_active,
	created_at,
	created_by
)
VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9)",
		)
		.bind(row.id)
		.bind(row.question.as_str())
		.bind(row.question_embedding.as_str())
		.bind(row.answer.as_str())
		.bind(&row.keywords)
		.bind(row.usage_count)
		.bind(row.is_active)
		.bind(row.created_at)
		.bind(row.created_by.as_str())
		.execute(&self.pool)
		.await?;

		Ok(())
	}

	pub async fn learned_answer(&self, id: Uuid) -> Result<Option<LearnedAnswer>> {
		let row = sqlx::query_as::<_, LearnedAnswer>(
			"\
SELECT id, question, question_embedding, answer, keywords, usage_count, is_active, created_at, created_by
FROM learned_answers
WHERE id = $1",
		)
		.bind(id)
		.fetch_optional(&self.pool)
		.await?;

		Ok(row)
	}

	pub async fn all_learned_answers(&self) -> Result<Vec<LearnedAnswer>> {
		let rows = sqlx::query_as::<_, LearnedAnswer>(
			"\
SELECT id, question, question_embedding, answer, keywords, usage_count, is_active, created_at, created_by
FROM learned_answers
ORDER BY created_at",
		)
		.fetch_all(&self.pool)
		.await?;

		Ok(rows)
	}

	/// Read-modify-write. Concurrent hits on the same answer may lose an
	/// increment; the counter is a triage signal, not a ledgered value.
	pub async fn bump_learned_usage(&self, id: Uuid) -> Result<()> {
		let current: Option<i64> =
			sqlx::query_scalar("SELECT usage_count FROM learned_answers WHERE id = $1")
				.bind(id)
				.fetch_optional(&self.pool)
				.await?;
		let Some(current) = current else {
			return Err(crate::Error::NotFound(format!("learned_answers {id}")));
		};

		sqlx::query("UPDATE learned_answers SET usage_count = $1 WHERE id = $2")
			.bind(current + 1)
			.bind(id)
			.execute(&self.pool)
			.await?;

		Ok(())
	}

	pub async fn insert_unanswered(&self, row: &UnansweredQuestion) -> Result<()> {
		sqlx::query(
			"\
INSERT INTO unanswered_questions (
	id,
	question,
	question_embedding,
	status,
	asked_count,
	asked_at,
	admin_note,
	resolved_at
)
VALUES ($1,$2,$3,$4,$5,$6,$7,$8)",
		)
		.bind(row.id)
		.bind(row.question.as_str())
		.bind(row.question_embedding.as_str())
		.bind(row.status.as_str())
		.bind(row.asked_count)
		.bind(row.asked_at)
		.bind(row.admin_note.as_deref())
		.bind(row.resolved_at)
		.execute(&self.pool)
		.await?;

		Ok(())
	}

	pub async fn unanswered_question(&self, id: Uuid) -> Result<Option<UnansweredQuestion>> {
		let row = sqlx::query_as::<_, UnansweredQuestion>(
			"\
SELECT id, question, question_embedding, status, asked_count, asked_at, admin_note, resolved_at
FROM unanswered_questions
WHERE id = $1",
		)
		.bind(id)
		.fetch_optional(&self.pool)
		.await?;

		Ok(row)
	}

	pub async fn all_unanswered_questions(&self) -> Result<Vec<UnansweredQuestion>> {
		let rows = sqlx::query_as::<_, UnansweredQuestion>(
			"\
SELECT id, question, question_embedding, status, asked_count, asked_at, admin_note, resolved_at
FROM unanswered_questions
ORDER BY asked_at",
		)
		.fetch_all(&self.pool)
		.await?;

		Ok(rows)
	}

	/// Same read-modify-write tolerance as [`Self::bump_learned_usage`].
	pub async fn bump_unanswered(&self, id: Uuid, asked_at: OffsetDateTime) -> Result<()> {
		let current: Option<i64> =
			sqlx::query_scalar("SELECT asked_count FROM unanswered_questions WHERE id = $1")
				.bind(id)
				.fetch_optional(&self.pool)
				.await?;
		let Some(current) = current else {
			return Err(crate::Error::NotFound(format!("unanswered_questions {id}")));
		};

		sqlx::query("UPDATE unanswered_questions SET asked_count = $1, asked_at = $2 WHERE id = $3")
			.bind(current + 1)
			.bind(asked_at)
			.bind(id)
			.execute(&self.pool)
			.await?;

		Ok(())
	}

	pub async fn mark_unanswered_answered(
		&self,
		id: Uuid,
		admin_note: &str,
		resolved_at: OffsetDateTime,
	) -> Result<()> {
		sqlx::query(
			"\
UPDATE unanswered_questions
SET status = 'answered', admin_note = $1, resolved_at = $2
WHERE id = $3",
		)
		.bind(admin_note)
		.bind(resolved_at)
		.bind(id)
		.execute(&self.pool)
		.await?;

		Ok(())
	}

	pub async fn fee_tiers(&self) -> Result<Vec<FeeTier>> {
		let rows = sqlx::query(
			"\
SELECT tier, review_fee_krw, publication_fee_krw, overpage_rule
FROM kb_fees
ORDER BY position",
		)
		.fetch_all(&self.pool)
		.await?;

		Ok(rows
			.into_iter()
			.map(|row| FeeTier {
				tier: row.get("tier"),
				review_fee_krw: row.get("review_fee_krw"),
				publication_fee_krw: row.get("publication_fee_krw"),
				overpage_rule: row.get("overpage_rule"),
			})
			.collect())
	}

	pub async fn publication_schedule(&self) -> Result<Option<PublicationSchedule>> {
		let row = sqlx::query("SELECT issues FROM kb_schedule LIMIT 1")
			.fetch_optional(&self.pool)
			.await?;
		let Some(row) = row else {
			return Ok(None);
		};
		let issues: Value = row.get("issues");
		let issues = string_list(&issues);

		if issues.is_empty() {
			return Ok(None);
		}

		Ok(Some(PublicationSchedule { issues }))
	}

	pub async fn membership_terms(&self) -> Result<Option<MembershipTerms>> {
		let row = sqlx::query(
			"SELECT join_fee_krw, annual_fee_krw, bank_account, contact FROM kb_membership LIMIT 1",
		)
		.fetch_optional(&self.pool)
		.await?;

		Ok(row.map(|row| MembershipTerms {
			join_fee_krw: row.get("join_fee_krw"),
			annual_fee_krw: row.get("annual_fee_krw"),
			bank_account: row.get("bank_account"),
			contact: row.get("contact"),
		}))
	}

	pub async fn submission_guide(&self) -> Result<Option<SubmissionGuide>> {
		let row = sqlx::query("SELECT email, subject_rule, forms, notes FROM kb_submission LIMIT 1")
			.fetch_optional(&self.pool)
			.await?;

		Ok(row.map(|row| {
			let forms: Value = row.get("forms");

			SubmissionGuide {
				email: row.get("email"),
				subject_rule: row.get("subject_rule"),
				forms: string_list(&forms),
				notes: row.get("notes"),
			}
		}))
	}
}

fn string_list(value: &Value) -> Vec<String> {
	value
		.as_array()
		.map(|items| {
			items.iter().filter_map(|item| item.as_str()).map(str::to_string).collect()
		})
		.unwrap_or_default()
}
