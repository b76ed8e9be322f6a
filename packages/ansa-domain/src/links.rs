//! External-link recommendation. Auto-match rules are applied in config
//! order; links accumulate de-duplicated by label in first-seen order. When
//! no rule matches, the deployment's default labels are offered instead.

use ansa_config::Links;
use serde::Serialize;

use crate::faq::keyword_regex;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Link {
	pub label: String,
	pub href: String,
}

pub fn wants_external_links(cfg: &Links, question: &str) -> bool {
	keyword_regex(&cfg.keywords).map(|pattern| pattern.is_match(question)).unwrap_or(false)
}

pub fn recommended_links(cfg: &Links, question: &str) -> Vec<Link> {
	let mut out = Vec::new();

	for rule in &cfg.auto_match {
		let Some(pattern) = keyword_regex(&rule.keywords) else {
			continue;
		};

		if !pattern.is_match(question) {
			continue;
		}

		for label in &rule.links {
			push_link(&mut out, cfg, label);
		}
	}

	if out.is_empty() {
		for label in &cfg.default_labels {
			push_link(&mut out, cfg, label);
		}
	}

	out
}

fn push_link(out: &mut Vec<Link>, cfg: &Links, label: &str) {
	if out.iter().any(|link| link.label == label) {
		return;
	}

	// Labels without a configured URL are skipped rather than rendered bare.
	if let Some(href) = cfg.urls.get(label) {
		out.push(Link { label: label.to_string(), href: href.clone() });
	}
}
