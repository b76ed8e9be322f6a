//! Structured knowledge rendering. Pure formatting, no side effects: each
//! FAQ category pairs a record shape with a deterministic template. Currency
//! fields render with thousands separators, list fields join with ", ", and
//! empty optional fields are omitted from the rendered text.

#[derive(Clone, Debug)]
pub struct FeeTier {
	pub tier: String,
	pub review_fee_krw: i64,
	pub publication_fee_krw: i64,
	pub overpage_rule: Option<String>,
}

#[derive(Clone, Debug)]
pub struct PublicationSchedule {
	pub issues: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct MembershipTerms {
	pub join_fee_krw: i64,
	pub annual_fee_krw: i64,
	pub bank_account: String,
	pub contact: String,
}

#[derive(Clone, Debug)]
pub struct SubmissionGuide {
	pub email: String,
	pub subject_rule: String,
	pub forms: Vec<String>,
	pub notes: Option<String>,
}

pub fn render_fees(tiers: &[FeeTier]) -> String {
	let fee_text = tiers
		.iter()
		.map(|tier| {
			format!(
				"{}: 심사비 {}원, 게재료 {}원",
				tier.tier,
				group_digits(tier.review_fee_krw),
				group_digits(tier.publication_fee_krw),
			)
		})
		.collect::<Vec<_>>()
		.join(" / ");
	let overpage = tiers
		.iter()
		.find_map(|tier| tier.overpage_rule.as_deref())
		.filter(|rule| !rule.trim().is_empty())
		.map(|rule| format!("\n\n초과페이지 규정: {rule}"))
		.unwrap_or_default();

	format!("게재 비용은 다음과 같습니다.\n\n{fee_text}{overpage}")
}

pub fn render_schedule(schedule: &PublicationSchedule) -> String {
	format!("연간 발간일은 {} 입니다.", schedule.issues.join(", "))
}

pub fn render_membership(terms: &MembershipTerms) -> String {
	format!(
		"정회원만 투고 가능합니다.\n\n가입비: {}원\n연회비: {}원\n계좌: {}\n연락처: {}",
		group_digits(terms.join_fee_krw),
		group_digits(terms.annual_fee_krw),
		terms.bank_account,
		terms.contact,
	)
}

pub fn render_submission(guide: &SubmissionGuide) -> String {
	let mut out = format!(
		"홈페이지에서 양식을 내려받아 작성 후 이메일로 제출하세요.\n\n이메일: {}\n제목 규칙: {}",
		guide.email, guide.subject_rule,
	);

	if !guide.forms.is_empty() {
		out.push_str(&format!("\n필수 양식: {}", guide.forms.join(", ")));
	}
	if let Some(notes) = guide.notes.as_deref().filter(|notes| !notes.trim().is_empty()) {
		out.push_str(&format!("\n\n{notes}"));
	}

	out
}

pub fn group_digits(value: i64) -> String {
	let digits = value.unsigned_abs().to_string();
	let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);

	if value < 0 {
		out.push('-');
	}

	let leading = digits.len() % 3;

	if leading > 0 {
		out.push_str(&digits[..leading]);
	}

	for (i, chunk) in digits[leading..].as_bytes().chunks(3).enumerate() {
		if leading > 0 || i > 0 {
			out.push(',');
		}

		out.push_str(std::str::from_utf8(chunk).unwrap_or_default());
	}

	out
}
