use axum::{
	Json, Router,
	extract::State,
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};

use crate::state::AppState;
use ansa_service::{
	AddAnswerRequest, AddAnswerResponse, RebuildReport, ResolveRequest, RoutingResult,
	ServiceError, compose,
};

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/resolve", post(resolve))
		.with_state(state)
}

pub fn admin_router(state: AppState) -> Router {
	Router::new()
		.route("/v1/admin/add_answer", post(add_answer))
		.route("/v1/admin/rebuild_index", post(rebuild_index))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn resolve(
	State(state): State<AppState>,
	Json(payload): Json<ResolveRequest>,
) -> Result<Json<RoutingResult>, ApiError> {
	let response = state.service.resolve(payload).await?;
	Ok(Json(response))
}

async fn add_answer(
	State(state): State<AppState>,
	Json(payload): Json<AddAnswerRequest>,
) -> Result<Json<AddAnswerResponse>, ApiError> {
	let response = state.service.add_answer(payload).await?;
	Ok(Json(response))
}

async fn rebuild_index(State(state): State<AppState>) -> Result<Json<RebuildReport>, ApiError> {
	let response = state.service.rebuild_index().await?;
	Ok(Json(response))
}

#[derive(Debug)]
pub enum ApiError {
	BadRequest { message: String },
	Internal { detail: String },
}

impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::InvalidRequest { message } => Self::BadRequest { message },
			other => Self::Internal { detail: other.to_string() },
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		match self {
			Self::BadRequest { message } =>
				(StatusCode::BAD_REQUEST, Json(serde_json::json!({ "error": message })))
					.into_response(),
			Self::Internal { detail } => {
				tracing::error!(error = %detail, "Request failed.");

				// The failure detail rides in its own field; the answer text
				// stays generic.
				(
					StatusCode::INTERNAL_SERVER_ERROR,
					Json(serde_json::json!({
						"intent": "error",
						"answer": compose::GENERIC_ERROR_ANSWER,
						"citations": [],
						"error": detail,
					})),
				)
					.into_response()
			},
		}
	}
}
