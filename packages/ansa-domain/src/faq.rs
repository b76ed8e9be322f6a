//! FAQ intent detection. Each category resolves its keyword list in two
//! levels: the deployment override from config when present, else the
//! built-in default list. Patterns are case-insensitive alternations of
//! escaped keywords.

use ansa_config::Faq;
use regex::Regex;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FaqCategory {
	Fees,
	Schedule,
	Membership,
	Submission,
}

impl FaqCategory {
	/// Evaluation order is fixed; the first matching category wins.
	pub const ALL: [Self; 4] = [Self::Fees, Self::Schedule, Self::Membership, Self::Submission];

	pub fn default_keywords(self) -> &'static [&'static str] {
		match self {
			Self::Fees => &["비용", "심사비", "게재료", "초과페이지"],
			Self::Schedule => &["발간", "일정"],
			Self::Membership => &["회원", "정회원", "가입", "회비"],
			Self::Submission => &["제출", "양식", "메일", "제목"],
		}
	}

	pub fn label(self) -> &'static str {
		match self {
			Self::Fees => "fees",
			Self::Schedule => "schedule",
			Self::Membership => "membership",
			Self::Submission => "submission",
		}
	}

	/// Citation suffix appended to the deployment's FAQ source label.
	pub fn citation_suffix(self) -> &'static str {
		match self {
			Self::Fees => "심사비·게재료",
			Self::Schedule => "발간 일정",
			Self::Membership => "회원/회비",
			Self::Submission => "투고 방법/제출서류",
		}
	}

	/// Terminal answer when the category matched but no record backs it.
	pub fn missing_answer(self) -> &'static str {
		match self {
			Self::Fees => "비용 정보를 찾을 수 없습니다. 학회에 문의해주세요.",
			Self::Schedule => "발간 일정 정보를 찾을 수 없습니다.",
			Self::Membership => "회원 정보를 찾을 수 없습니다.",
			Self::Submission => "제출 정보를 찾을 수 없습니다.",
		}
	}
}

pub fn category_keywords(cfg: &Faq, category: FaqCategory) -> Vec<String> {
	let override_list = cfg.keywords.as_ref().and_then(|keywords| match category {
		FaqCategory::Fees => keywords.fees.as_ref(),
		FaqCategory::Schedule => keywords.schedule.as_ref(),
		FaqCategory::Membership => keywords.membership.as_ref(),
		FaqCategory::Submission => keywords.submission.as_ref(),
	});

	match override_list {
		Some(list) if !list.is_empty() => list.clone(),
		_ => category.default_keywords().iter().map(|word| word.to_string()).collect(),
	}
}

/// Pattern covering every category, used as the branch gate before the
/// per-category tests run.
pub fn combined_pattern(cfg: &Faq) -> Option<Regex> {
	let words: Vec<String> =
		FaqCategory::ALL.into_iter().flat_map(|category| category_keywords(cfg, category)).collect();

	keyword_regex(&words)
}

pub fn matches_category(cfg: &Faq, category: FaqCategory, question: &str) -> bool {
	keyword_regex(&category_keywords(cfg, category))
		.map(|pattern| pattern.is_match(question))
		.unwrap_or(false)
}

pub(crate) fn keyword_regex(words: &[String]) -> Option<Regex> {
	let escaped: Vec<String> =
		words.iter().filter(|word| !word.trim().is_empty()).map(|word| regex::escape(word)).collect();

	if escaped.is_empty() {
		return None;
	}

	Regex::new(&format!("(?i){}", escaped.join("|"))).ok()
}
