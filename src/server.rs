//! HTTP chat server.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/chat` | Answer `{"message": "..."}` with `{"response": "..."}` |
//! | `POST` | `/` | Same as `/chat`, for single-route deployments |
//! | `OPTIONS` | any | Answered by the CORS layer, empty 200 |
//! | `GET`  | `/health` | Status, generator availability, record count |
//!
//! # Error Contract
//!
//! Errors are a flat JSON object with a human-readable message:
//!
//! ```json
//! { "error": "Message is required" }
//! ```
//!
//! `400` for a blank message or an undecodable body, `500` for anything
//! else (including panics inside a handler).
//!
//! # CORS
//!
//! All origins are permitted; every response carries
//! `Access-Control-Allow-Origin: *`.

use std::any::Any;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};

use crate::chat::ChatService;
use crate::config::{ChatMode, Config};
use crate::generation::create_generator;
use crate::knowledge::KnowledgeCache;

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub knowledge: Arc<KnowledgeCache>,
    pub chat: Arc<ChatService>,
}

impl AppState {
    /// Build the state for `config`: a lazy knowledge cache and, in
    /// generative mode, the configured generator.
    pub fn from_config(config: &Config) -> Self {
        let generator = match config.chat.mode {
            ChatMode::Generative => create_generator(&config.generation),
            ChatMode::Direct => None,
        };

        Self {
            knowledge: Arc::new(KnowledgeCache::from_config(&config.knowledge)),
            chat: Arc::new(ChatService::new(config, generator)),
        }
    }
}

/// Build the router with all routes and middleware.
///
/// `OPTIONS` requests never reach a handler: the CORS layer answers them
/// with an empty `200`.
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", post(handle_chat))
        .route("/chat", post(handle_chat))
        .route("/health", get(handle_health))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors)
        .with_state(state)
}

/// Starts the chat server on `[server].host:port` and runs until the
/// process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let bind_addr = config.server.bind_addr();
    let state = AppState::from_config(config);
    let records = state.knowledge.preload();

    tracing::info!(
        mode = config.chat.mode.as_str(),
        generation = state.chat.generation_enabled(),
        knowledge = %state.knowledge.path().display(),
        records,
        "Starting chat server"
    );

    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Chat server listening on http://{}", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Internal error type that converts into an Axum HTTP response.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

/// Turns a handler panic into a `500` with the panic message.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "internal server error".to_string()
    };

    tracing::error!("Error: {}", message);
    AppError::internal(message).into_response()
}

// ============ POST /chat ============

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

/// Handler for `POST /chat` and `POST /`.
async fn handle_chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let Json(request) = payload?;

    let query = request.message.trim();
    if query.is_empty() {
        return Err(AppError::bad_request("Message is required"));
    }

    let records = state.knowledge.records();
    let reply = state.chat.respond(records, query).await;
    tracing::debug!(kind = ?reply.kind, "Final response: {}", reply.text);

    Ok(Json(ChatResponse {
        response: reply.text,
    }))
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    /// Always `"ok"` when the server is running.
    status: String,
    /// Whether answers are being generated by the LLM.
    llm_loaded: bool,
    mode: String,
    records: usize,
}

async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        llm_loaded: state.chat.generation_enabled(),
        mode: state.chat.mode().as_str().to_string(),
        records: state.knowledge.records().len(),
    })
}
