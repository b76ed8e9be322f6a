use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::{Error, Result};

/// Generates a grounded answer. An empty string is a valid outcome ("no good
/// answer" is a routing policy decision, not a provider error).
pub async fn complete(
	cfg: &ansa_config::ChatProviderConfig,
	system_prompt: &str,
	user_prompt: &str,
) -> Result<String> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"max_tokens": cfg.max_tokens,
		"messages": [
			{ "role": "system", "content": system_prompt },
			{ "role": "user", "content": user_prompt },
		],
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_completion_text(json)
}

fn parse_completion_text(json: Value) -> Result<String> {
	let choices = json
		.get("choices")
		.and_then(|v| v.as_array())
		.ok_or_else(|| Error::invalid_response("Completion response is missing choices."))?;
	let content = choices
		.first()
		.and_then(|choice| choice.get("message"))
		.and_then(|message| message.get("content"))
		.and_then(|content| content.as_str())
		.unwrap_or_default();

	Ok(content.to_string())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_choice_content() {
		let json = serde_json::json!({
			"choices": [
				{ "message": { "content": "연간 발간일은 3월 31일입니다." } }
			]
		});

		assert_eq!(parse_completion_text(json).expect("parse failed"), "연간 발간일은 3월 31일입니다.");
	}

	#[test]
	fn missing_content_is_empty_not_an_error() {
		let json = serde_json::json!({ "choices": [{ "message": {} }] });

		assert_eq!(parse_completion_text(json).expect("parse failed"), "");
	}

	#[test]
	fn missing_choices_is_an_error() {
		let json = serde_json::json!({ "object": "chat.completion" });

		assert!(parse_completion_text(json).is_err());
	}
}
