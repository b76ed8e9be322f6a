//! The cascade. Strategies are evaluated strictly in priority order and the
//! first confident one terminates the request: external links, learned
//! answers, structured FAQ, then retrieval-augmented generation. An upstream
//! failure in any branch surfaces as an error instead of falling through;
//! a partially built context must never be presented as grounded.

use serde::Deserialize;

use crate::{
	ResolverService, ServiceError, ServiceResult,
	compose::{self, EMPTY_GENERATION_ANSWER, EMPTY_QUESTION_MESSAGE, RoutingResult},
};
use ansa_domain::{faq::FaqCategory, links};

const CONTEXT_DELIMITER: &str = "\n\n---\n\n";

#[derive(Clone, Debug, Deserialize)]
pub struct ResolveRequest {
	pub question: String,
}

impl ResolverService {
	pub async fn resolve(&self, request: ResolveRequest) -> ServiceResult<RoutingResult> {
		let question = request.question.trim();

		if question.is_empty() {
			return Err(ServiceError::InvalidRequest {
				message: EMPTY_QUESTION_MESSAGE.to_string(),
			});
		}

		// 1) External links. No embedding is computed for this branch.
		if self.cfg.features.external_links
			&& let Some(links_cfg) = self.cfg.links.as_ref()
			&& links::wants_external_links(links_cfg, question)
		{
			let links = links::recommended_links(links_cfg, question);

			tracing::info!(intent = "external_links", links = links.len(), "Question routed.");

			return Ok(RoutingResult::external_links(links));
		}

		// One embedding serves the learned lookup, the chunk search, and the
		// ledger dedup below.
		let vector = self.embed_question(question).await?;

		// 2) Learned answers.
		let candidates = self
			.index
			.search_learned(
				vector.clone(),
				u64::from(self.cfg.routing.learned_candidate_k),
				self.cfg.routing.learned_sim_threshold,
			)
			.await?;

		for candidate in candidates {
			let Some(row) = self.store.learned_answer(candidate.id).await? else {
				tracing::warn!(id = %candidate.id, "Learned candidate has no backing row.");

				continue;
			};

			// Deactivated answers stay indexed but are never served.
			if !row.is_active {
				continue;
			}

			self.store.bump_learned_usage(row.id).await?;

			tracing::info!(
				intent = "learned",
				id = %row.id,
				similarity = candidate.similarity,
				"Question routed."
			);

			return Ok(RoutingResult::learned(row.answer));
		}

		// 3) Structured FAQ. A category match is terminal, found or not.
		if self.cfg.features.faq
			&& ansa_domain::faq::combined_pattern(&self.cfg.faq)
				.map(|pattern| pattern.is_match(question))
				.unwrap_or(false)
		{
			for category in FaqCategory::ALL {
				if ansa_domain::faq::matches_category(&self.cfg.faq, category, question) {
					return self.answer_faq(category).await;
				}
			}
		}

		// 4) Retrieval-augmented generation.
		self.answer_rag(question, vector).await
	}

	async fn answer_rag(&self, question: &str, vector: Vec<f32>) -> ServiceResult<RoutingResult> {
		let hits = self
			.index
			.search_chunks(
				vector.clone(),
				u64::from(self.cfg.routing.rag_top_k),
				self.cfg.routing.rag_sim_threshold,
			)
			.await?;

		if hits.is_empty() {
			self.record_miss(question, &vector).await;

			tracing::info!(intent = "rag", hits = 0, "Question routed without evidence.");

			return Ok(RoutingResult::rag(
				compose::rag_miss_answer(&self.cfg.deployment),
				Vec::new(),
			));
		}

		let context = hits
			.iter()
			.map(|hit| format!("[{} / {} p.{}]\n{}", hit.doc_name, hit.section, hit.page, hit.content))
			.collect::<Vec<_>>()
			.join(CONTEXT_DELIMITER);
		let citations: Vec<String> = hits
			.iter()
			.map(|hit| format!("{} / {} p.{}", hit.doc_name, hit.section, hit.page))
			.collect();
		let user_prompt = format!("질문: {question}\n\n다음 근거만 사용해 답하세요:\n\n{context}");
		let generated = self
			.providers
			.chat
			.complete(&self.cfg.providers.chat, &self.cfg.providers.chat.system_prompt, &user_prompt)
			.await?;
		let answer = if generated.trim().is_empty() {
			EMPTY_GENERATION_ANSWER.to_string()
		} else {
			generated
		};

		tracing::info!(intent = "rag", hits = citations.len(), "Question routed.");

		Ok(RoutingResult::rag(answer, citations))
	}
}
