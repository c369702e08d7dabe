//! Axum Router Configuration
//!
//! This module defines the complete HTTP routing for the application,
//! including the REST API and OpenAPI documentation.

use crate::{
    handlers,
    models::{
        CreateSessionPayload, ErrorResponse, MessagePayload, ProgressResponse,
        SessionStatusResponse, TopicPayload, TranscriptEntryResponse, TurnResponse,
    },
    state::AppState,
};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::create_session,
        handlers::submit_introduction,
        handlers::submit_answer,
        handlers::get_session,
        handlers::get_transcript,
    ),
    components(
        schemas(
            CreateSessionPayload,
            TopicPayload,
            MessagePayload,
            TurnResponse,
            SessionStatusResponse,
            ProgressResponse,
            TranscriptEntryResponse,
            ErrorResponse
        )
    ),
    tags(
        (name = "Interview Conductor API", description = "Turn-by-turn control of mock interview sessions")
    )
)]
pub struct ApiDoc;

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .route("/sessions", post(handlers::create_session))
        .route("/sessions/{id}", get(handlers::get_session))
        .route(
            "/sessions/{id}/introduction",
            post(handlers::submit_introduction),
        )
        .route("/sessions/{id}/answers", post(handlers::submit_answer))
        .route("/sessions/{id}/transcript", get(handlers::get_transcript))
        .with_state(app_state);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_router)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use conductor_core::{ConductorConfig, InterviewConductor, judgment::HeuristicJudge};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    const LONG_ANSWER: &str =
        "I would begin by identifying every support and drawing the free-body diagram first.";

    fn app() -> Router {
        let conductor = InterviewConductor::new(Arc::new(HeuristicJudge), ConductorConfig::default());
        create_router(Arc::new(AppState::new(conductor)))
    }

    fn catalog() -> Value {
        json!([
            {"id": "T1", "category": "technical", "priorityRank": 1, "seedText": "Explain T1."},
            {"id": "T2", "category": "technical", "priorityRank": 2, "seedText": "Explain T2."},
            {"id": "T3", "category": "behavioral", "priorityRank": 1, "seedText": "Describe T3."}
        ])
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn create(app: &Router) -> String {
        let (status, body) = send(
            app,
            "POST",
            "/sessions",
            Some(json!({"topics": catalog(), "candidateName": "Ada", "company": "Acme"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["sessionId"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_full_turn_flow() {
        let app = app();
        let id = create(&app).await;

        let (status, body) = send(&app, "GET", &format!("/sessions/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["phase"], "introduction");
        assert_eq!(body["progress"]["percentage"], 0);

        let (status, body) = send(
            &app,
            "POST",
            &format!("/sessions/{}/introduction", id),
            Some(json!({"text": "Hi, I'm Ada."})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["phase"], "questioning");
        assert_eq!(body["topicId"], "T1");
        assert_eq!(body["action"], "TRANSITION");

        let (status, body) = send(
            &app,
            "POST",
            &format!("/sessions/{}/answers", id),
            Some(json!({"text": LONG_ANSWER})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["action"], "DEEPEN");
        assert_eq!(body["turnCount"], 2);

        let (status, body) = send(&app, "GET", &format!("/sessions/{}/transcript", id), None).await;
        assert_eq!(status, StatusCode::OK);
        let entries = body.as_array().unwrap();
        assert_eq!(entries.len(), 5);
        assert_eq!(entries[0]["speaker"], "interviewer");
        assert_eq!(entries[1]["speaker"], "candidate");
    }

    #[tokio::test]
    async fn test_unknown_session_is_404() {
        let app = app();
        let uri = format!("/sessions/{}", uuid::Uuid::new_v4());
        let (status, body) = send(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["message"].as_str().unwrap().contains("not found"));
    }

    #[tokio::test]
    async fn test_wrong_phase_is_409() {
        let app = app();
        let id = create(&app).await;
        let (status, body) = send(
            &app,
            "POST",
            &format!("/sessions/{}/answers", id),
            Some(json!({"text": LONG_ANSWER})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["message"].as_str().unwrap().contains("introduction"));
    }

    #[tokio::test]
    async fn test_duplicate_session_id_is_409() {
        let app = app();
        let id = uuid::Uuid::new_v4();
        let payload = json!({"sessionId": id, "topics": catalog()});
        let (status, _) = send(&app, "POST", "/sessions", Some(payload.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, _) = send(&app, "POST", "/sessions", Some(payload)).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_invalid_catalogs_are_422() {
        let app = app();
        let (status, _) = send(&app, "POST", "/sessions", Some(json!({"topics": []}))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let duplicate = json!({"topics": [
            {"id": "T1", "category": "technical", "priorityRank": 1, "seedText": "a"},
            {"id": "T1", "category": "technical", "priorityRank": 2, "seedText": "b"}
        ]});
        let (status, body) = send(&app, "POST", "/sessions", Some(duplicate)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["message"].as_str().unwrap().contains("duplicate"));
    }

    #[tokio::test]
    async fn test_blank_answer_is_400() {
        let app = app();
        let id = create(&app).await;
        let (status, _) = send(
            &app,
            "POST",
            &format!("/sessions/{}/introduction", id),
            Some(json!({"text": "  "})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_openapi_document_is_served() {
        let app = app();
        let (status, body) = send(&app, "GET", "/api-docs/openapi.json", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"].get("/sessions/{id}/answers").is_some());
    }
}
