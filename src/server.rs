//! HTTP routes of the recipes proxy.
//!
//! - `GET  /v1/api/recetas/databases/{databaseId}` lists entry summaries
//! - `GET  /v1/api/recetas/paginas/{pageId}` returns the Notion page
//! - `GET  /v1/api/recetas/paginas/contenido/{pageId}` returns the page's blocks
//! - `POST /v1/api/recetas` creates a recipe page

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};

use crate::config;
use crate::error::ProxyError;
use crate::notion::NotionService;
use crate::recipes::{self, EntrySummary, RecipeCreationRequest};

/// Shared by all handlers. Nothing in here is mutated after startup.
#[derive(Clone)]
pub struct AppState {
    pub notion: Arc<dyn NotionService>,
    pub recipes: Arc<config::Recipes>,
}

impl AppState {
    pub fn new(notion: Arc<dyn NotionService>, recipes: config::Recipes) -> Self {
        Self {
            notion,
            recipes: Arc::new(recipes),
        }
    }
}

#[instrument(skip_all, fields(database_id = %database_id))]
async fn list_entries(
    State(state): State<AppState>,
    Path(database_id): Path<String>,
) -> Result<Json<Vec<EntrySummary>>, ProxyError> {
    let response = state.notion.query_database(&database_id).await?;
    let entries = recipes::summarize_entries(&response, &state.recipes.summary_fields)?;
    info!(count = entries.len(), "listed recipe entries");
    Ok(Json(entries))
}

#[instrument(skip_all, fields(page_id = %page_id))]
async fn get_page(
    State(state): State<AppState>,
    Path(page_id): Path<String>,
) -> Result<Json<Value>, ProxyError> {
    let page = state.notion.retrieve_page(&page_id).await?;
    info!("retrieved page");
    Ok(Json(page))
}

#[instrument(skip_all, fields(page_id = %page_id))]
async fn list_page_content(
    State(state): State<AppState>,
    Path(page_id): Path<String>,
) -> Result<Json<Value>, ProxyError> {
    let blocks = state
        .notion
        .list_block_children(&page_id, state.recipes.children_page_size)
        .await?;
    info!("listed page blocks");
    Ok(Json(blocks))
}

#[instrument(skip_all)]
async fn create_entry(
    State(state): State<AppState>,
    payload: Result<Json<RecipeCreationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ProxyError> {
    let Json(request) =
        payload.map_err(|rejection| ProxyError::MalformedRequest(rejection.body_text()))?;
    info!(
        database_id = %request.database_id,
        page_name = %request.page_name,
        "creating recipe entry"
    );

    let page = recipes::build_create_page(request, &state.recipes);
    let created = state.notion.create_page(&page).await?;
    let page_id = created
        .get("id")
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default();
    info!(page_id, "created recipe entry");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "success!", "data": created })),
    ))
}

/// Build the router. Unknown paths fall through to axum's default 404.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/v1/api/recetas", post(create_entry))
        .route("/v1/api/recetas/databases/{database_id}", get(list_entries))
        .route("/v1/api/recetas/paginas/{page_id}", get(get_page))
        .route(
            "/v1/api/recetas/paginas/contenido/{page_id}",
            get(list_page_content),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
