use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::{Error, Result};

/// Embeds a single question. The response is expected in the OpenAI
/// embeddings wire shape; only the first vector is taken.
pub async fn embed(cfg: &ansa_config::EmbeddingProviderConfig, text: &str) -> Result<Vec<f32>> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"input": text,
		"dimensions": cfg.dimensions,
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_embedding_response(json)
}

fn parse_embedding_response(json: Value) -> Result<Vec<f32>> {
	let embedding = json
		.get("data")
		.and_then(|v| v.as_array())
		.and_then(|data| data.first())
		.and_then(|item| item.get("embedding"))
		.and_then(|v| v.as_array())
		.ok_or_else(|| Error::invalid_response("Embedding response is missing data[0].embedding."))?;
	let mut vec = Vec::with_capacity(embedding.len());

	for value in embedding {
		let number = value
			.as_f64()
			.ok_or_else(|| Error::invalid_response("Embedding value must be numeric."))?;

		vec.push(number as f32);
	}

	if vec.is_empty() {
		return Err(Error::invalid_response("Embedding response contains an empty vector."));
	}

	Ok(vec)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_first_embedding() {
		let json = serde_json::json!({
			"data": [
				{ "index": 0, "embedding": [0.5, 1.5, -0.25] }
			]
		});
		let parsed = parse_embedding_response(json).expect("parse failed");

		assert_eq!(parsed, vec![0.5, 1.5, -0.25]);
	}

	#[test]
	fn rejects_missing_data() {
		let json = serde_json::json!({ "object": "list" });

		assert!(parse_embedding_response(json).is_err());
	}

	#[test]
	fn rejects_empty_vector() {
		let json = serde_json::json!({ "data": [{ "embedding": [] }] });

		assert!(parse_embedding_response(json).is_err());
	}
}
