use crate::{ResolverService, ServiceResult, compose::RoutingResult};
use ansa_domain::{faq::FaqCategory, render};

impl ResolverService {
	/// Fetches and renders the structured record behind a matched category.
	/// An absent record yields the category's not-found answer with empty
	/// citations; it never falls through to the RAG branch.
	pub(crate) async fn answer_faq(&self, category: FaqCategory) -> ServiceResult<RoutingResult> {
		let rendered = match category {
			FaqCategory::Fees => {
				let tiers = self.store.fee_tiers().await?;

				if tiers.is_empty() { None } else { Some(render::render_fees(&tiers)) }
			},
			FaqCategory::Schedule => self
				.store
				.publication_schedule()
				.await?
				.map(|schedule| render::render_schedule(&schedule)),
			FaqCategory::Membership =>
				self.store.membership_terms().await?.map(|terms| render::render_membership(&terms)),
			FaqCategory::Submission =>
				self.store.submission_guide().await?.map(|guide| render::render_submission(&guide)),
		};

		match rendered {
			Some(answer) => {
				let citation =
					format!("{} – {}", self.cfg.faq.source_label, category.citation_suffix());

				tracing::info!(intent = "faq", category = category.label(), "Question routed.");

				Ok(RoutingResult::faq(answer, vec![citation]))
			},
			None => {
				tracing::info!(
					intent = "faq",
					category = category.label(),
					found = false,
					"Question routed."
				);

				Ok(RoutingResult::faq(category.missing_answer().to_string(), Vec::new()))
			},
		}
	}
}
