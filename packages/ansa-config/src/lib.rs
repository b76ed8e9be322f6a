mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	AutoMatchRule, ChatProviderConfig, Config, Deployment, EmbeddingProviderConfig, Faq,
	FaqKeywords, Features, Links, Postgres, Providers, Qdrant, Routing, Service, Storage,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(validation("service.http_bind must be non-empty."));
	}
	if cfg.service.admin_bind.trim().is_empty() {
		return Err(validation("service.admin_bind must be non-empty."));
	}
	if cfg.deployment.contact_email.is_empty() {
		return Err(validation("deployment.contact_email must be non-empty."));
	}
	if cfg.storage.qdrant.vector_dim == 0 {
		return Err(validation("storage.qdrant.vector_dim must be greater than zero."));
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(validation("providers.embedding.dimensions must be greater than zero."));
	}
	if cfg.providers.embedding.dimensions != cfg.storage.qdrant.vector_dim {
		return Err(validation(
			"providers.embedding.dimensions must match storage.qdrant.vector_dim.",
		));
	}

	for (name, collection) in [
		("learned_collection", &cfg.storage.qdrant.learned_collection),
		("chunk_collection", &cfg.storage.qdrant.chunk_collection),
		("unanswered_collection", &cfg.storage.qdrant.unanswered_collection),
	] {
		if collection.trim().is_empty() {
			return Err(validation(&format!("storage.qdrant.{name} must be non-empty.")));
		}
	}

	for (name, threshold) in [
		("learned_sim_threshold", cfg.routing.learned_sim_threshold),
		("unanswered_dup_threshold", cfg.routing.unanswered_dup_threshold),
		("rag_sim_threshold", cfg.routing.rag_sim_threshold),
	] {
		if !(0.0..=1.0).contains(&threshold) {
			return Err(validation(&format!("routing.{name} must be within [0, 1].")));
		}
	}

	if cfg.routing.learned_candidate_k == 0 {
		return Err(validation("routing.learned_candidate_k must be greater than zero."));
	}
	if cfg.routing.rag_top_k == 0 {
		return Err(validation("routing.rag_top_k must be greater than zero."));
	}
	if cfg.faq.source_label.trim().is_empty() {
		return Err(validation("faq.source_label must be non-empty."));
	}

	match &cfg.links {
		Some(links) => {
			if cfg.features.external_links && links.keywords.is_empty() {
				return Err(validation(
					"links.keywords must be non-empty when features.external_links is enabled.",
				));
			}

			for rule in &links.auto_match {
				if rule.keywords.is_empty() || rule.links.is_empty() {
					return Err(validation(
						"links.auto_match rules must have keywords and links.",
					));
				}
			}
		},
		None =>
			if cfg.features.external_links {
				return Err(validation(
					"features.external_links requires a [links] section.",
				));
			},
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.deployment.contact_email = cfg.deployment.contact_email.trim().to_string();
	cfg.deployment.contact_phone = cfg
		.deployment
		.contact_phone
		.take()
		.map(|phone| phone.trim().to_string())
		.filter(|phone| !phone.is_empty());

	if let Some(keywords) = cfg.faq.keywords.as_mut() {
		for list in [
			keywords.fees.as_mut(),
			keywords.schedule.as_mut(),
			keywords.membership.as_mut(),
			keywords.submission.as_mut(),
		]
		.into_iter()
		.flatten()
		{
			list.retain(|word| !word.trim().is_empty());
		}
	}

	if let Some(links) = cfg.links.as_mut() {
		links.keywords.retain(|word| !word.trim().is_empty());
	}
}

fn validation(message: &str) -> Error {
	Error::Validation { message: message.to_string() }
}
