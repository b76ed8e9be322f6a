//! HTTP surface tests over an in-memory service. The router, extractors, and
//! error envelopes are exercised for real; only the stores and model
//! providers are faked.

use std::{
	collections::HashMap,
	sync::{Arc, Mutex},
};

use axum::{
	body::{self, Body},
	http::{Request, StatusCode},
};
use time::OffsetDateTime;
use tower::util::ServiceExt;
use uuid::Uuid;

use ansa_api::{routes, state::AppState};
use ansa_domain::render::{FeeTier, MembershipTerms, PublicationSchedule, SubmissionGuide};
use ansa_service::{
	BoxFuture, ChunkHit, CompletionProvider, EmbeddingProvider, Providers, RecordStore,
	ResolverService, ScoredId, ServiceResult, VectorIndex,
};
use ansa_storage::models::{LearnedAnswer, UnansweredQuestion};

const DIM: usize = 4;

struct StubEmbedder {
	fail: bool,
}
impl EmbeddingProvider for StubEmbedder {
	fn embed<'a>(
		&'a self,
		_cfg: &'a ansa_config::EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, ansa_providers::Result<Vec<f32>>> {
		let result = if self.fail {
			Err(ansa_providers::Error::InvalidResponse {
				message: "upstream returned 503".to_string(),
			})
		} else {
			// Any deterministic unit vector keyed off the text length works
			// for routing; exactness is covered by the service tests.
			let mut vector = vec![0.; DIM];

			vector[text.chars().count() % DIM] = 1.;

			Ok(vector)
		};

		Box::pin(async move { result })
	}
}

struct StubChat;
impl CompletionProvider for StubChat {
	fn complete<'a>(
		&'a self,
		_cfg: &'a ansa_config::ChatProviderConfig,
		_system_prompt: &'a str,
		_user_prompt: &'a str,
	) -> BoxFuture<'a, ansa_providers::Result<String>> {
		Box::pin(async move { Ok("근거 기반 답변입니다.".to_string()) })
	}
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
	a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[derive(Default)]
struct MemoryIndex {
	learned: Mutex<Vec<(Uuid, Vec<f32>)>>,
	unanswered: Mutex<Vec<(Uuid, Vec<f32>)>>,
}
impl MemoryIndex {
	fn rank(entries: &[(Uuid, Vec<f32>)], vector: &[f32], top_k: u64, min: f32) -> Vec<ScoredId> {
		let mut hits: Vec<ScoredId> = entries
			.iter()
			.map(|(id, stored)| ScoredId { id: *id, similarity: dot(stored, vector) })
			.filter(|hit| hit.similarity >= min)
			.collect();

		hits.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
		hits.truncate(top_k as usize);

		hits
	}
}
impl VectorIndex for MemoryIndex {
	fn search_learned(
		&self,
		vector: Vec<f32>,
		top_k: u64,
		min_similarity: f32,
	) -> BoxFuture<'_, ServiceResult<Vec<ScoredId>>> {
		let hits =
			Self::rank(&self.learned.lock().expect("poisoned"), &vector, top_k, min_similarity);

		Box::pin(async move { Ok(hits) })
	}

	fn search_chunks(
		&self,
		_vector: Vec<f32>,
		_top_k: u64,
		_min_similarity: f32,
	) -> BoxFuture<'_, ServiceResult<Vec<ChunkHit>>> {
		Box::pin(async move { Ok(Vec::new()) })
	}

	fn search_unanswered(
		&self,
		vector: Vec<f32>,
		top_k: u64,
		min_similarity: f32,
	) -> BoxFuture<'_, ServiceResult<Vec<ScoredId>>> {
		let hits =
			Self::rank(&self.unanswered.lock().expect("poisoned"), &vector, top_k, min_similarity);

		Box::pin(async move { Ok(hits) })
	}

	fn index_learned(
		&self,
		id: Uuid,
		_question: String,
		vector: Vec<f32>,
	) -> BoxFuture<'_, ServiceResult<()>> {
		self.learned.lock().expect("poisoned").push((id, vector));

		Box::pin(async move { Ok(()) })
	}

	fn index_unanswered(
		&self,
		id: Uuid,
		_question: String,
		vector: Vec<f32>,
	) -> BoxFuture<'_, ServiceResult<()>> {
		self.unanswered.lock().expect("poisoned").push((id, vector));

		Box::pin(async move { Ok(()) })
	}
}

#[derive(Default)]
struct MemoryStore {
	learned: Mutex<HashMap<Uuid, LearnedAnswer>>,
	unanswered: Mutex<HashMap<Uuid, UnansweredQuestion>>,
}
impl RecordStore for MemoryStore {
	fn learned_answer(&self, id: Uuid) -> BoxFuture<'_, ServiceResult<Option<LearnedAnswer>>> {
		let row = self.learned.lock().expect("poisoned").get(&id).cloned();

		Box::pin(async move { Ok(row) })
	}

	fn insert_learned_answer(&self, row: LearnedAnswer) -> BoxFuture<'_, ServiceResult<()>> {
		self.learned.lock().expect("poisoned").insert(row.id, row);

		Box::pin(async move { Ok(()) })
	}

	fn all_learned_answers(&self) -> BoxFuture<'_, ServiceResult<Vec<LearnedAnswer>>> {
		let rows = self.learned.lock().expect("poisoned").values().cloned().collect();

		Box::pin(async move { Ok(rows) })
	}

	fn bump_learned_usage(&self, id: Uuid) -> BoxFuture<'_, ServiceResult<()>> {
		if let Some(row) = self.learned.lock().expect("poisoned").get_mut(&id) {
			row.usage_count += 1;
		}

		Box::pin(async move { Ok(()) })
	}

	fn insert_unanswered(&self, row: UnansweredQuestion) -> BoxFuture<'_, ServiceResult<()>> {
		self.unanswered.lock().expect("poisoned").insert(row.id, row);

		Box::pin(async move { Ok(()) })
	}

	fn unanswered_question(
		&self,
		id: Uuid,
	) -> BoxFuture<'_, ServiceResult<Option<UnansweredQuestion>>> {
		let row = self.unanswered.lock().expect("poisoned").get(&id).cloned();

		Box::pin(async move { Ok(row) })
	}

	fn all_unanswered_questions(
		&self,
	) -> BoxFuture<'_, ServiceResult<Vec<UnansweredQuestion>>> {
		let rows = self.unanswered.lock().expect("poisoned").values().cloned().collect();

		Box::pin(async move { Ok(rows) })
	}

	fn bump_unanswered(
		&self,
		id: Uuid,
		asked_at: OffsetDateTime,
	) -> BoxFuture<'_, ServiceResult<()>> {
		if let Some(row) = self.unanswered.lock().expect("poisoned").get_mut(&id) {
			row.asked_count += 1;
			row.asked_at = asked_at;
		}

		Box::pin(async move { Ok(()) })
	}

	fn mark_unanswered_answered(
		&self,
		id: Uuid,
		admin_note: String,
		resolved_at: OffsetDateTime,
	) -> BoxFuture<'_, ServiceResult<()>> {
		if let Some(row) = self.unanswered.lock().expect("poisoned").get_mut(&id) {
			row.status = "answered".to_string();
			row.admin_note = Some(admin_note);
			row.resolved_at = Some(resolved_at);
		}

		Box::pin(async move { Ok(()) })
	}

	fn fee_tiers(&self) -> BoxFuture<'_, ServiceResult<Vec<FeeTier>>> {
		Box::pin(async move { Ok(Vec::new()) })
	}

	fn publication_schedule(
		&self,
	) -> BoxFuture<'_, ServiceResult<Option<PublicationSchedule>>> {
		Box::pin(async move { Ok(None) })
	}

	fn membership_terms(&self) -> BoxFuture<'_, ServiceResult<Option<MembershipTerms>>> {
		Box::pin(async move { Ok(None) })
	}

	fn submission_guide(&self) -> BoxFuture<'_, ServiceResult<Option<SubmissionGuide>>> {
		Box::pin(async move { Ok(None) })
	}
}

fn test_config() -> ansa_config::Config {
	ansa_config::Config {
		service: ansa_config::Service {
			http_bind: "127.0.0.1:0".to_string(),
			admin_bind: "127.0.0.1:0".to_string(),
			log_level: "info".to_string(),
		},
		deployment: ansa_config::Deployment {
			name: "KITPM".to_string(),
			contact_email: "kitpm@kitpm.kr".to_string(),
			contact_phone: None,
		},
		features: ansa_config::Features { external_links: true, faq: true },
		storage: ansa_config::Storage {
			postgres: ansa_config::Postgres {
				dsn: "postgres://ansa@localhost/ansa".to_string(),
				pool_max_conns: 1,
			},
			qdrant: ansa_config::Qdrant {
				url: "http://127.0.0.1:1".to_string(),
				learned_collection: "learned_answers".to_string(),
				chunk_collection: "knowledge_chunks".to_string(),
				unanswered_collection: "unanswered_questions".to_string(),
				vector_dim: DIM as u32,
			},
		},
		providers: ansa_config::Providers {
			embedding: ansa_config::EmbeddingProviderConfig {
				provider_id: "test".to_string(),
				api_base: "http://127.0.0.1:1".to_string(),
				api_key: "test-key".to_string(),
				path: "/".to_string(),
				model: "test".to_string(),
				dimensions: DIM as u32,
				timeout_ms: 1_000,
				default_headers: serde_json::Map::new(),
			},
			chat: ansa_config::ChatProviderConfig {
				provider_id: "test".to_string(),
				api_base: "http://127.0.0.1:1".to_string(),
				api_key: "test-key".to_string(),
				path: "/".to_string(),
				model: "test".to_string(),
				temperature: 0.2,
				max_tokens: 800,
				timeout_ms: 1_000,
				system_prompt: "근거만 사용해 답하세요.".to_string(),
				default_headers: serde_json::Map::new(),
			},
		},
		routing: ansa_config::Routing {
			learned_sim_threshold: 0.75,
			learned_candidate_k: 3,
			unanswered_dup_threshold: 0.9,
			rag_top_k: 3,
			rag_sim_threshold: 0.5,
		},
		faq: ansa_config::Faq { source_label: "투고규정".to_string(), keywords: None },
		links: Some(ansa_config::Links {
			keywords: vec!["링크".to_string()],
			default_labels: vec!["학회 홈페이지".to_string()],
			urls: HashMap::from([(
				"학회 홈페이지".to_string(),
				"https://example.kr".to_string(),
			)]),
			auto_match: Vec::new(),
		}),
	}
}

fn test_state(fail_embedding: bool) -> AppState {
	let service = ResolverService::with_components(
		test_config(),
		Arc::new(MemoryStore::default()),
		Arc::new(MemoryIndex::default()),
		Providers::new(Arc::new(StubEmbedder { fail: fail_embedding }), Arc::new(StubChat)),
	);

	AppState { service: Arc::new(service) }
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
	let bytes = body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Failed to read response body.");

	serde_json::from_slice(&bytes).expect("Failed to parse response.")
}

fn post_json(uri: &str, payload: &serde_json::Value) -> Request<Body> {
	Request::builder()
		.method("POST")
		.uri(uri)
		.header("content-type", "application/json")
		.body(Body::from(payload.to_string()))
		.expect("Failed to build request.")
}

#[tokio::test]
async fn health_ok() {
	let app = routes::router(test_state(false));
	let response = app
		.oneshot(
			Request::builder().uri("/health").body(Body::empty()).expect("Failed to build request."),
		)
		.await
		.expect("Failed to call /health.");

	assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn resolve_returns_the_external_link_envelope() {
	let app = routes::router(test_state(false));
	let payload = serde_json::json!({ "question": "학회 홈페이지 링크 주세요" });
	let response = app.oneshot(post_json("/resolve", &payload)).await.expect("Failed to call /resolve.");

	assert_eq!(response.status(), StatusCode::OK);

	let json = json_body(response).await;

	assert_eq!(json["intent"], "external_links");
	assert_eq!(json["citations"][0], "외부 링크");
	assert_eq!(json["links"][0]["label"], "학회 홈페이지");
	assert_eq!(json["links"][0]["href"], "https://example.kr");
}

#[tokio::test]
async fn blank_question_is_a_bad_request() {
	let app = routes::router(test_state(false));
	let payload = serde_json::json!({ "question": "   " });
	let response = app.oneshot(post_json("/resolve", &payload)).await.expect("Failed to call /resolve.");

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);

	let json = json_body(response).await;

	assert_eq!(json["error"], "질문을 입력해주세요.");
}

#[tokio::test]
async fn provider_failure_is_masked_as_a_generic_error() {
	let app = routes::router(test_state(true));
	let payload = serde_json::json!({ "question": "심사 기간은 얼마나 걸리나요" });
	let response = app.oneshot(post_json("/resolve", &payload)).await.expect("Failed to call /resolve.");

	assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

	let json = json_body(response).await;

	assert_eq!(json["intent"], "error");
	assert_eq!(json["answer"], "서버 오류가 발생했습니다.");
	// The failure detail never leaks into the answer text.
	assert!(json["error"].as_str().expect("error detail missing").contains("503"));
}

#[tokio::test]
async fn evidence_miss_reports_the_contact_address() {
	let app = routes::router(test_state(false));
	let payload = serde_json::json!({ "question": "학회가 우주정거장을 운영하나요" });
	let response = app.oneshot(post_json("/resolve", &payload)).await.expect("Failed to call /resolve.");

	assert_eq!(response.status(), StatusCode::OK);

	let json = json_body(response).await;

	assert_eq!(json["intent"], "rag");
	assert!(
		json["answer"].as_str().expect("answer must be a string").contains("kitpm@kitpm.kr")
	);
	assert_eq!(json["citations"], serde_json::json!([]));
}

#[tokio::test]
async fn curated_answer_is_served_on_the_next_resolve() {
	let state = test_state(false);
	let question = "재인쇄본은 어떻게 신청하나요";
	let add_payload = serde_json::json!({
		"question_id": null,
		"question": question,
		"answer": "사무국 이메일로 신청하세요.",
		"keywords": ["재인쇄"]
	});
	let add_response = routes::admin_router(state.clone())
		.oneshot(post_json("/v1/admin/add_answer", &add_payload))
		.await
		.expect("Failed to call add_answer.");

	assert_eq!(add_response.status(), StatusCode::OK);

	let added = json_body(add_response).await;

	assert!(added["id"].as_str().is_some());

	let resolve_payload = serde_json::json!({ "question": question });
	let response = routes::router(state)
		.oneshot(post_json("/resolve", &resolve_payload))
		.await
		.expect("Failed to call /resolve.");
	let json = json_body(response).await;

	assert_eq!(json["intent"], "learned");
	assert_eq!(json["answer"], "사무국 이메일로 신청하세요.");
	assert_eq!(json["citations"][0], "관리자가 추가한 답변");
}

#[tokio::test]
async fn add_answer_requires_question_and_answer() {
	let app = routes::admin_router(test_state(false));
	let payload = serde_json::json!({
		"question_id": null,
		"question": "질문",
		"answer": ""
	});
	let response =
		app.oneshot(post_json("/v1/admin/add_answer", &payload)).await.expect("Failed to call add_answer.");

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);

	let json = json_body(response).await;

	assert_eq!(json["error"], "질문과 답변을 모두 입력해주세요.");
}

#[tokio::test]
async fn rebuild_reports_counts() {
	let app = routes::admin_router(test_state(false));
	let response = app
		.oneshot(post_json("/v1/admin/rebuild_index", &serde_json::json!({})))
		.await
		.expect("Failed to call rebuild_index.");

	assert_eq!(response.status(), StatusCode::OK);

	let json = json_body(response).await;

	assert_eq!(json["learned_points"], 0);
	assert_eq!(json["unanswered_points"], 0);
	assert_eq!(json["skipped"], 0);
}
