//! HTTP front door for the generation API.
//!
//! The proxy is stateless between requests: it validates the prompt, makes a
//! single upstream call and relays whatever comes back.

use crate::config::ServerConfig;
use crate::error::{Result, StudyAssistantError};
use crate::llm::client::{GeminiClient, GenerationApi};
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{header, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{error, info, warn};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub const MAX_PROMPT_CHARS: usize = 30_000;
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

const PROMPT_REQUIRED: &str = "Prompt richiesto e deve essere una stringa";
const PROMPT_TOO_LONG: &str = "Prompt troppo lungo (max 30.000 caratteri)";
const BODY_TOO_LARGE: &str = "Richiesta troppo grande (max 10MB)";
const UPSTREAM_ERROR: &str = "Errore dalla API di Gemini";
const INTERNAL_ERROR: &str = "Errore interno del server";
const NOT_FOUND: &str = "Endpoint non trovato";

#[derive(Clone)]
pub struct AppState {
    api: Arc<dyn GenerationApi>,
    expose_internal_errors: bool,
    started_at: Instant,
}

impl AppState {
    pub fn new(api: Arc<dyn GenerationApi>, expose_internal_errors: bool) -> Self {
        Self {
            api,
            expose_internal_errors,
            started_at: Instant::now(),
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        let client = GeminiClient::new(config.api_key.clone())
            .with_base_url(config.gemini_base_url.clone());
        Self::new(
            Arc::new(client),
            config.environment.exposes_internal_errors(),
        )
    }
}

/// Prompt length as browsers count it, in UTF-16 code units.
pub fn prompt_length(prompt: &str) -> usize {
    prompt.encode_utf16().count()
}

/// Checks a `/generate` body and returns the prompt it carries.
pub fn validate_prompt(body: &Value) -> Result<&str> {
    let prompt = body
        .get("prompt")
        .and_then(Value::as_str)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| StudyAssistantError::InvalidRequest(PROMPT_REQUIRED.to_string()))?;

    if prompt_length(prompt) > MAX_PROMPT_CHARS {
        return Err(StudyAssistantError::InvalidRequest(
            PROMPT_TOO_LONG.to_string(),
        ));
    }

    Ok(prompt)
}

/// Renders a failure as the JSON body the front-end expects.
fn error_response(err: StudyAssistantError, expose_internal_errors: bool) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let body = match err {
        StudyAssistantError::InvalidRequest(message) => json!({ "error": message }),
        StudyAssistantError::Upstream { details, .. } => json!({
            "error": UPSTREAM_ERROR,
            "details": details,
        }),
        other if expose_internal_errors => json!({
            "error": INTERNAL_ERROR,
            "message": other.to_string(),
        }),
        _ => json!({ "error": INTERNAL_ERROR }),
    };

    (status, Json(body)).into_response()
}

/// Maps a body that could not be read as JSON onto the proxy's error bodies.
fn rejection_response(rejection: JsonRejection, expose_internal_errors: bool) -> Response {
    warn!("Rejected generate request: {}", rejection.body_text());

    match rejection {
        JsonRejection::BytesRejection(_) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => (
            StatusCode::PAYLOAD_TOO_LARGE,
            Json(json!({ "error": BODY_TOO_LARGE })),
        )
            .into_response(),
        JsonRejection::BytesRejection(_) => error_response(
            StudyAssistantError::Internal(rejection.body_text()),
            expose_internal_errors,
        ),
        _ => error_response(
            StudyAssistantError::InvalidRequest(PROMPT_REQUIRED.to_string()),
            expose_internal_errors,
        ),
    }
}

async fn generate(
    State(state): State<AppState>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Response {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => return rejection_response(rejection, state.expose_internal_errors),
    };

    let prompt = match validate_prompt(&body) {
        Ok(prompt) => prompt,
        Err(e) => {
            warn!("Rejected generate request: {}", e);
            return error_response(e, state.expose_internal_errors);
        }
    };

    info!(
        "Generate request received, prompt length: {} characters",
        prompt_length(prompt)
    );

    match state.api.generate(prompt).await {
        Ok(result) => {
            info!("Generation completed successfully");
            Json(result).into_response()
        }
        Err(e @ StudyAssistantError::Upstream { .. }) => {
            error!("Upstream generation failure: {}", e);
            error_response(e, state.expose_internal_errors)
        }
        Err(e) => {
            error!("Generation call could not be completed: {}", e);
            error_response(e, state.expose_internal_errors)
        }
    }
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "OK",
        "timestamp": chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        "uptime": state.started_at.elapsed().as_secs_f64(),
    }))
}

async fn index() -> Json<Value> {
    Json(json!({
        "message": "AI Study Assistant Backend API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/api/health",
            "gemini": "POST /api/gemini/generate",
        },
    }))
}

async fn not_found(uri: Uri) -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": NOT_FOUND,
            "path": uri.path(),
        })),
    )
}

/// All routes, without CORS; see [`app`] for the served stack.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/health", get(health))
        .route("/health", get(health))
        .route("/api/gemini/generate", post(generate))
        .route("/generate", post(generate))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

pub fn cors_layer(frontend_url: &str) -> Result<CorsLayer> {
    let origin = HeaderValue::from_str(frontend_url).map_err(|e| {
        StudyAssistantError::Config(format!("FRONTEND_URL '{}' is invalid: {}", frontend_url, e))
    })?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true))
}

pub fn app(config: &ServerConfig) -> Result<Router> {
    Ok(router(AppState::from_config(config))
        .layer(cors_layer(&config.frontend_url)?)
        .layer(TraceLayer::new_for_http()))
}

pub async fn serve(config: ServerConfig) -> Result<()> {
    let app = app(&config)?;
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(
        "Study assistant backend listening on http://localhost:{} (environment: {})",
        config.port,
        config.environment.as_str()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("SIGINT received, shutting down"),
        _ = terminate => info!("SIGTERM received, shutting down"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::extract::FromRequest;
    use axum::http::Request;
    use std::sync::Mutex;

    /// Records prompts and answers with a canned outcome.
    struct FakeApi {
        calls: Mutex<Vec<String>>,
        outcome: fn() -> Result<Value>,
    }

    impl FakeApi {
        fn new(outcome: fn() -> Result<Value>) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                outcome,
            })
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl GenerationApi for FakeApi {
        async fn generate(&self, prompt: &str) -> Result<Value> {
            self.calls.lock().unwrap().push(prompt.to_string());
            (self.outcome)()
        }
    }

    fn ok_outcome() -> Result<Value> {
        Ok(json!({"candidates": [{"content": {"parts": [{"text": "ok"}]}}]}))
    }

    fn upstream_outcome() -> Result<Value> {
        Err(StudyAssistantError::Upstream {
            status: 429,
            details: json!({"error": {"code": 429, "message": "Resource exhausted"}}),
        })
    }

    fn internal_outcome() -> Result<Value> {
        Err(StudyAssistantError::Internal("socket closed".to_string()))
    }

    async fn send(api: Arc<FakeApi>, expose: bool, body: Value) -> (StatusCode, Value) {
        send_payload(api, expose, Ok(Json(body))).await
    }

    async fn send_payload(
        api: Arc<FakeApi>,
        expose: bool,
        payload: std::result::Result<Json<Value>, JsonRejection>,
    ) -> (StatusCode, Value) {
        let state = AppState::new(api, expose);
        let response = generate(State(state), payload).await;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_validate_prompt() {
        assert_eq!(validate_prompt(&json!({"prompt": "ciao"})).unwrap(), "ciao");
        assert!(validate_prompt(&json!({})).is_err());
        assert!(validate_prompt(&json!({"prompt": ""})).is_err());
        assert!(validate_prompt(&json!({"prompt": 42})).is_err());
        assert!(validate_prompt(&json!(["prompt"])).is_err());
    }

    #[test]
    fn test_prompt_length_counts_utf16_units() {
        assert_eq!(prompt_length("è"), 1);
        assert_eq!(prompt_length("😀"), 2);

        let at_limit = "😀".repeat(MAX_PROMPT_CHARS / 2);
        assert!(validate_prompt(&json!({ "prompt": at_limit })).is_ok());

        let astral = "😀".repeat(20_000);
        let err = validate_prompt(&json!({ "prompt": astral })).unwrap_err();
        assert!(matches!(err, StudyAssistantError::InvalidRequest(_)));

        let over = "a".repeat(MAX_PROMPT_CHARS + 1);
        assert!(validate_prompt(&json!({ "prompt": over })).is_err());
    }

    async fn json_payload(body: Vec<u8>) -> std::result::Result<Json<Value>, JsonRejection> {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/gemini/generate")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap();
        Json::<Value>::from_request(request, &()).await
    }

    #[tokio::test]
    async fn test_oversized_body_is_payload_too_large() {
        // Without the router's layer the extractor applies axum's 2 MB default limit.
        let mut body = b"{\"prompt\": \"".to_vec();
        body.extend(std::iter::repeat(b'a').take(3 * 1024 * 1024));
        body.extend(b"\"}");

        let api = FakeApi::new(ok_outcome);
        let (status, body) = send_payload(api.clone(), true, json_payload(body).await).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body, json!({ "error": BODY_TOO_LARGE }));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_json_is_a_bad_request() {
        let api = FakeApi::new(ok_outcome);
        let payload = json_payload(b"{not json".to_vec()).await;
        let (status, body) = send_payload(api.clone(), true, payload).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": PROMPT_REQUIRED }));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_success_is_passed_through() {
        let api = FakeApi::new(ok_outcome);
        let (status, body) = send(api.clone(), false, json!({"prompt": "Explain"})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, ok_outcome().unwrap());
        assert_eq!(api.calls(), vec!["Explain".to_string()]);
    }

    #[tokio::test]
    async fn test_oversized_prompt_makes_no_upstream_call() {
        let api = FakeApi::new(ok_outcome);
        let prompt = "x".repeat(MAX_PROMPT_CHARS + 1);
        let (status, body) = send(api.clone(), true, json!({ "prompt": prompt })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], PROMPT_TOO_LONG);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_prompt_is_rejected() {
        let api = FakeApi::new(ok_outcome);
        let (status, body) = send(api.clone(), true, json!({"text": "ciao"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": PROMPT_REQUIRED}));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_upstream_status_and_details_are_forwarded() {
        let api = FakeApi::new(upstream_outcome);
        let (status, body) = send(api, false, json!({"prompt": "ciao"})).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["error"], UPSTREAM_ERROR);
        assert_eq!(body["details"]["error"]["message"], "Resource exhausted");
    }

    #[tokio::test]
    async fn test_internal_message_only_in_development() {
        let (status, body) = send(FakeApi::new(internal_outcome), true, json!({"prompt": "a"})).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], INTERNAL_ERROR);
        assert!(body["message"].as_str().unwrap().contains("socket closed"));

        let (status, body) = send(FakeApi::new(internal_outcome), false, json!({"prompt": "a"})).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": INTERNAL_ERROR}));
    }

    #[tokio::test]
    async fn test_health_reports_uptime() {
        let state = AppState::new(FakeApi::new(internal_outcome), false);
        let Json(body) = health(State(state)).await;
        assert_eq!(body["status"], "OK");
        assert!(body["uptime"].as_f64().unwrap() >= 0.0);
        let timestamp = body["timestamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
    }

    #[test]
    fn test_cors_layer_rejects_invalid_origin() {
        assert!(cors_layer("http://localhost:4200").is_ok());
        assert!(cors_layer("http://bad\norigin").is_err());
    }
}
