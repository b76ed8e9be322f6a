//! Response shaping. Every branch funnels through these constructors so the
//! envelope invariants hold regardless of origin: `citations` is always an
//! array, and `links` is only populated by the external-link branch.

use serde::Serialize;

use ansa_domain::links::Link;

pub const EXTERNAL_LINKS_ANSWER: &str =
	"다음 링크에서 정보를 확인하실 수 있습니다:\n\n아래 링크를 클릭하여 자세한 내용을 확인하세요.";
pub const EXTERNAL_LINKS_CITATION: &str = "외부 링크";
pub const LEARNED_CITATION: &str = "관리자가 추가한 답변";
pub const EMPTY_QUESTION_MESSAGE: &str = "질문을 입력해주세요.";
pub const EMPTY_GENERATION_ANSWER: &str = "답변을 생성할 수 없습니다.";
pub const GENERIC_ERROR_ANSWER: &str = "서버 오류가 발생했습니다.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
	ExternalLinks,
	Learned,
	Faq,
	Rag,
	Error,
}

#[derive(Clone, Debug, Serialize)]
pub struct RoutingResult {
	pub intent: Intent,
	pub answer: String,
	pub citations: Vec<String>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub links: Vec<Link>,
}

impl RoutingResult {
	pub fn external_links(links: Vec<Link>) -> Self {
		Self {
			intent: Intent::ExternalLinks,
			answer: EXTERNAL_LINKS_ANSWER.to_string(),
			citations: vec![EXTERNAL_LINKS_CITATION.to_string()],
			links,
		}
	}

	pub fn learned(answer: String) -> Self {
		Self {
			intent: Intent::Learned,
			answer,
			citations: vec![LEARNED_CITATION.to_string()],
			links: Vec::new(),
		}
	}

	pub fn faq(answer: String, citations: Vec<String>) -> Self {
		Self { intent: Intent::Faq, answer, citations, links: Vec::new() }
	}

	pub fn rag(answer: String, citations: Vec<String>) -> Self {
		Self { intent: Intent::Rag, answer, citations, links: Vec::new() }
	}
}

pub fn rag_miss_answer(deployment: &ansa_config::Deployment) -> String {
	let contact = match deployment.contact_phone.as_deref() {
		Some(phone) => format!("{} / {phone}", deployment.contact_email),
		None => deployment.contact_email.clone(),
	};

	format!(
		"죄송합니다. 해당 질문에 대한 정보를 찾을 수 없습니다. 직접 문의해주시기 바랍니다.\n\n연락처: {contact}",
	)
}
