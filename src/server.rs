//! HTTP surface for the query API and the conversational endpoint.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/profile`, `/about`, `/contact` | Singleton envelopes |
//! | `GET`  | `/skills`, `/projects`, `/experience`, `/education`, `/certifications`, `/contributions` | Collection envelopes with filter/pagination parameters |
//! | `GET`  | `/projects/featured` | Featured projects, newest first |
//! | `GET`  | `/{entity}/{id}` | Single-record envelopes (404 on missing id) |
//! | `GET`  | `/media` | Media list, filterable by `related_type`/`related_id` |
//! | `GET`  | `/search?q=` | Cross-entity union search |
//! | `GET`  | `/tools/list` | The registered tool catalogue with schemas |
//! | `POST` | `/chat` | One conversational turn: `{ message, history }` → `{ response }` |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "page must be >= 1, got 0" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `provider_error`
//! (500), `internal` (500). Store failures map to `internal` with no
//! internal detail leaked.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted to support
//! browser-based clients.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::agent::{self, DecisionProvider, HistoryTurn};
use crate::config::Config;
use crate::envelope::Single;
use crate::error::Error;
use crate::models::{
    About, Certification, Contact, Contribution, Education, Experience, Profile, Project, Skill,
};
use crate::query::{self, ListParams};
use crate::store::Store;
use crate::tools::{ToolContext, ToolInfo, ToolRegistry};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    store: Store,
    config: Arc<Config>,
    tools: Arc<ToolRegistry>,
    provider: Arc<dyn DecisionProvider>,
}

impl AppState {
    fn owner(&self) -> &str {
        &self.config.owner.name
    }

    fn tool_ctx(&self) -> ToolContext {
        ToolContext::new(self.store.clone(), self.config.clone())
    }
}

/// Start the HTTP server. Binds to `[server].bind` and runs until the
/// process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let config = Arc::new(config.clone());

    let store = Store::connect(&config).await?;
    let tools = Arc::new(ToolRegistry::with_builtins());
    let provider = agent::create_provider(&config.agent);

    tracing::info!(tools = tools.len(), "tool registry ready");

    let state = AppState {
        store,
        config,
        tools,
        provider,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/profile", get(handle_profile))
        .route("/about", get(handle_about))
        .route("/contact", get(handle_contact))
        .route("/skills", get(handle_skills))
        .route("/skills/{id}", get(handle_skill))
        .route("/projects", get(handle_projects))
        .route("/projects/featured", get(handle_featured_projects))
        .route("/projects/{id}", get(handle_project))
        .route("/experience", get(handle_experience))
        .route("/experience/{id}", get(handle_experience_entry))
        .route("/education", get(handle_education))
        .route("/education/{id}", get(handle_education_entry))
        .route("/certifications", get(handle_certifications))
        .route("/contributions", get(handle_contributions))
        .route("/contributions/{id}", get(handle_contribution))
        .route("/media", get(handle_media))
        .route("/search", get(handle_search))
        .route("/tools/list", get(handle_list_tools))
        .route("/chat", post(handle_chat))
        .route("/health", get(handle_health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    tracing::info!(%bind_addr, "server listening");

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found".to_string(),
        message: message.into(),
    }
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        match err {
            Error::Validation(msg) | Error::ToolInvocation(msg) => bad_request(msg),
            Error::NotFound(kind) => not_found(format!("{} not found", kind)),
            Error::Provider(msg) => {
                tracing::error!(%msg, "decision provider failure");
                AppError {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    code: "provider_error".to_string(),
                    message: "the assistant is unavailable right now".to_string(),
                }
            }
            Error::Store(_) | Error::Serde(_) | Error::LoopBound(_) => {
                tracing::error!(%err, "internal failure");
                AppError {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    code: "internal".to_string(),
                    message: "internal error".to_string(),
                }
            }
        }
    }
}

// ============ Singleton & collection handlers ============

async fn handle_profile(State(state): State<AppState>) -> Result<Json<Single<Profile>>, AppError> {
    Ok(Json(query::profile(&state.store, state.owner()).await?))
}

async fn handle_about(State(state): State<AppState>) -> Result<Json<Single<About>>, AppError> {
    Ok(Json(query::about(&state.store, state.owner()).await?))
}

async fn handle_contact(State(state): State<AppState>) -> Result<Json<Single<Contact>>, AppError> {
    Ok(Json(query::contact(&state.store, state.owner()).await?))
}

async fn handle_skills(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<crate::envelope::Listing<Skill>>, AppError> {
    Ok(Json(
        query::skills(&state.store, state.owner(), &params).await?,
    ))
}

async fn handle_skill(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Single<Skill>>, AppError> {
    Ok(Json(
        query::skill_by_id(&state.store, state.owner(), id).await?,
    ))
}

async fn handle_projects(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<crate::envelope::Listing<Project>>, AppError> {
    Ok(Json(
        query::projects(&state.store, state.owner(), &params).await?,
    ))
}

async fn handle_featured_projects(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let data = query::featured_projects(&state.store).await?;
    Ok(Json(json!({ "data": data })))
}

async fn handle_project(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Single<Project>>, AppError> {
    Ok(Json(
        query::project_by_id(&state.store, state.owner(), id).await?,
    ))
}

async fn handle_experience(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<crate::envelope::Listing<Experience>>, AppError> {
    Ok(Json(
        query::experience(&state.store, state.owner(), &params).await?,
    ))
}

async fn handle_experience_entry(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Single<Experience>>, AppError> {
    Ok(Json(
        query::experience_by_id(&state.store, state.owner(), id).await?,
    ))
}

async fn handle_education(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<crate::envelope::Listing<Education>>, AppError> {
    Ok(Json(
        query::education(&state.store, state.owner(), &params).await?,
    ))
}

async fn handle_education_entry(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Single<Education>>, AppError> {
    Ok(Json(
        query::education_by_id(&state.store, state.owner(), id).await?,
    ))
}

async fn handle_certifications(
    State(state): State<AppState>,
) -> Result<Json<crate::envelope::Listing<Certification>>, AppError> {
    Ok(Json(
        query::certifications(&state.store, state.owner()).await?,
    ))
}

async fn handle_contributions(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<crate::envelope::Listing<Contribution>>, AppError> {
    Ok(Json(
        query::contributions(&state.store, state.owner(), &params).await?,
    ))
}

async fn handle_contribution(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Single<Contribution>>, AppError> {
    Ok(Json(
        query::contribution_by_id(&state.store, state.owner(), id).await?,
    ))
}

async fn handle_media(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let data = query::media(&state.store, &params).await?;
    Ok(Json(json!({ "data": data })))
}

// ============ Search ============

#[derive(Deserialize)]
struct SearchParams {
    q: Option<String>,
}

async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let q = params.q.unwrap_or_default();
    let results = query::portfolio_search(&state.store, &q).await?;
    Ok(Json(json!({ "results": results })))
}

// ============ GET /tools/list ============

#[derive(Serialize)]
struct ToolListResponse {
    tools: Vec<ToolInfo>,
}

async fn handle_list_tools(State(state): State<AppState>) -> Json<ToolListResponse> {
    Json(ToolListResponse {
        tools: state.tools.infos(),
    })
}

// ============ POST /chat ============

#[derive(Deserialize)]
struct ChatRequest {
    message: String,
    #[serde(default)]
    history: Vec<HistoryTurn>,
}

#[derive(Serialize)]
struct ChatResponse {
    response: String,
}

async fn handle_chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let ctx = state.tool_ctx();
    let response = agent::respond(
        state.provider.as_ref(),
        &state.tools,
        &ctx,
        &state.config.agent,
        &state.config.owner,
        &request.message,
        &request.history,
    )
    .await?;
    Ok(Json(ChatResponse { response }))
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
