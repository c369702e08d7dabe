//! Axum Handlers for the REST API
//!
//! Thin adapters from HTTP to the interview conductor. Every turn endpoint
//! answers with the session's phase and, where there is one, the
//! interviewer's next utterance.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use conductor_core::ConductorError;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    models::{
        CreateSessionPayload, ErrorResponse, MessagePayload, SessionStatusResponse,
        TranscriptEntryResponse, TurnResponse,
    },
    state::AppState,
};

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    UnprocessableEntity(String),
    ServiceUnavailable(String),
    InternalServerError(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, message),
            ApiError::UnprocessableEntity(message) => (StatusCode::UNPROCESSABLE_ENTITY, message),
            ApiError::ServiceUnavailable(message) => {
                warn!("Service unavailable: {}", message);
                (StatusCode::SERVICE_UNAVAILABLE, message)
            }
            ApiError::InternalServerError(err) => {
                error!("Internal Server Error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred.".to_string(),
                )
            }
        };
        (status, Json(ErrorResponse { message })).into_response()
    }
}

impl From<ConductorError> for ApiError {
    fn from(err: ConductorError) -> Self {
        let message = err.to_string();
        match err {
            ConductorError::SessionNotFound(_) => ApiError::NotFound(message),
            ConductorError::SessionAlreadyExists(_) | ConductorError::InvalidTransition { .. } => {
                ApiError::Conflict(message)
            }
            ConductorError::InvalidCatalog(_) | ConductorError::CatalogExhaustedPrematurely => {
                ApiError::UnprocessableEntity(message)
            }
            ConductorError::JudgmentUnavailable(_) => ApiError::ServiceUnavailable(message),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<ConductorError>() {
            Ok(conductor_error) => conductor_error.into(),
            Err(err) => ApiError::InternalServerError(err),
        }
    }
}

fn require_text(payload: &MessagePayload) -> Result<&str, ApiError> {
    let text = payload.text.trim();
    if text.is_empty() {
        return Err(ApiError::BadRequest("text must not be empty".to_string()));
    }
    Ok(text)
}

/// Start a new interview session.
#[utoipa::path(
    post,
    path = "/sessions",
    request_body = CreateSessionPayload,
    responses(
        (status = 201, description = "Session created; the greeting is returned", body = TurnResponse),
        (status = 409, description = "A session with this id already exists", body = ErrorResponse),
        (status = 422, description = "The topic catalog is invalid or empty", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateSessionPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let id = payload.session_id.unwrap_or_else(Uuid::new_v4);
    let (catalog, context) = payload
        .into_parts()
        .map_err(ApiError::UnprocessableEntity)?;

    let outcome = state
        .conductor
        .initialize(id, Arc::new(catalog), context)
        .await?;
    info!(session_id = %id, "Session created");

    Ok((StatusCode::CREATED, Json(TurnResponse::from(outcome))))
}

/// Submit the candidate's self-introduction.
#[utoipa::path(
    post,
    path = "/sessions/{id}/introduction",
    request_body = MessagePayload,
    responses(
        (status = 200, description = "The first topic is opened", body = TurnResponse),
        (status = 400, description = "Empty text", body = ErrorResponse),
        (status = 404, description = "Session not found", body = ErrorResponse),
        (status = 409, description = "The session is not awaiting an introduction", body = ErrorResponse)
    ),
    params(
        ("id" = Uuid, Path, description = "Session ID")
    )
)]
pub async fn submit_introduction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<MessagePayload>,
) -> Result<Json<TurnResponse>, ApiError> {
    let text = require_text(&payload)?;
    let outcome = state.conductor.submit_introduction(id, text).await?;
    Ok(Json(outcome.into()))
}

/// Submit a candidate answer, or a question during the closing Q&A.
#[utoipa::path(
    post,
    path = "/sessions/{id}/answers",
    request_body = MessagePayload,
    responses(
        (status = 200, description = "The interviewer's next utterance", body = TurnResponse),
        (status = 400, description = "Empty text", body = ErrorResponse),
        (status = 404, description = "Session not found", body = ErrorResponse),
        (status = 409, description = "The session is not accepting answers", body = ErrorResponse)
    ),
    params(
        ("id" = Uuid, Path, description = "Session ID")
    )
)]
pub async fn submit_answer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<MessagePayload>,
) -> Result<Json<TurnResponse>, ApiError> {
    let text = require_text(&payload)?;
    let outcome = state.conductor.submit_answer(id, text).await?;
    Ok(Json(outcome.into()))
}

/// Get a snapshot of a session and its progress.
#[utoipa::path(
    get,
    path = "/sessions/{id}",
    responses(
        (status = 200, description = "Session details", body = SessionStatusResponse),
        (status = 404, description = "Session not found", body = ErrorResponse)
    ),
    params(
        ("id" = Uuid, Path, description = "Session ID")
    )
)]
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionStatusResponse>, ApiError> {
    let snapshot = state.conductor.get_status(id).await?;
    Ok(Json(snapshot.into()))
}

/// Get the full transcript of a session.
#[utoipa::path(
    get,
    path = "/sessions/{id}/transcript",
    responses(
        (status = 200, description = "Transcript entries, oldest first", body = [TranscriptEntryResponse]),
        (status = 404, description = "Session not found", body = ErrorResponse)
    ),
    params(
        ("id" = Uuid, Path, description = "Session ID")
    )
)]
pub async fn get_transcript(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<TranscriptEntryResponse>>, ApiError> {
    let transcript = state.conductor.transcript(id).await?;
    Ok(Json(transcript.into_iter().map(Into::into).collect()))
}
