//! Request handlers

use axum::{
    Form, Json, Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use docqa_core::{QueryEngine, Result};

use crate::page::{PageConfig, PageRenderer};

/// Application context built once at startup and shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<dyn QueryEngine>,
    pub page: Arc<PageRenderer>,
    /// Number of indexed chunks, reported by `/health`
    pub chunks: usize,
}

impl AppState {
    pub fn new(engine: Arc<dyn QueryEngine>, chunks: usize) -> Result<Self> {
        Ok(Self {
            engine,
            page: Arc::new(PageRenderer::new(PageConfig::default())?),
            chunks,
        })
    }

    pub fn with_page(mut self, page: PageConfig) -> Result<Self> {
        self.page = Arc::new(PageRenderer::new(page)?);
        Ok(self)
    }
}

#[derive(Debug, Default, Deserialize)]
struct AskForm {
    #[serde(default)]
    question: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub question: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
}

/// Build the router with all routes and request tracing
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handle_form).post(handle_submit))
        .route("/api/answer", post(handle_api_answer))
        .route("/health", get(handle_health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn handle_form(State(state): State<AppState>) -> Response {
    render_form(&state, "", None, StatusCode::OK)
}

async fn handle_submit(State(state): State<AppState>, Form(form): Form<AskForm>) -> Response {
    tracing::debug!(question = %form.question, "form submission");

    match state.engine.answer_query(&form.question).await {
        Ok(answer) => render_form(&state, &form.question, Some(&answer), StatusCode::OK),
        Err(e) => {
            tracing::error!(error = %e, "query failed");
            render_form(
                &state,
                &form.question,
                Some(&e.to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            )
        }
    }
}

fn render_form(state: &AppState, question: &str, answer: Option<&str>, status: StatusCode) -> Response {
    let failed = status != StatusCode::OK;
    match state.page.render(question, answer, failed) {
        Ok(body) => (status, Html(body)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "cannot render form");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

async fn handle_api_answer(State(state): State<AppState>, Json(request): Json<AskRequest>) -> Response {
    match state.engine.answer_query(&request.question).await {
        Ok(answer) => Json(AskResponse { answer }).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "query failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

async fn handle_health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "chunks": state.chunks,
    }))
}
