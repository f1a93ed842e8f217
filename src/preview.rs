//! Local preview server: serves the generated sidebar bundle and renders the
//! sidebar as it would look on any page of the book.

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::config::{PageContext, SidebarConfig};
use crate::generator::ScriptGenerator;
use crate::outline::Outline;
use crate::parser::parse_outline;
use crate::sidebar::SidebarScrollbox;
use crate::storage::{MemoryStorage, SessionStorage};
use crate::ActivationReport;

struct PreviewState {
    outline: Outline,
    config: SidebarConfig,
    script: String,
    noscript: String,
}

#[derive(Debug, Deserialize)]
pub struct SidebarQuery {
    pub url: String,
    #[serde(default)]
    pub path_to_root: String,
    /// Offset left behind by the previous page, as the browser would have
    /// stored it.
    pub scroll: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SidebarPreview {
    pub report: ActivationReport,
    pub scroll_top: u32,
    pub html: String,
}

/// Builds the preview router for `outline_markup`, serving book pages from
/// `book_dir` under `/book`.
pub fn router(outline_markup: &str, config: SidebarConfig, book_dir: impl Into<PathBuf>) -> anyhow::Result<Router> {
    let generator = ScriptGenerator::new(config.clone())?;
    let state = Arc::new(PreviewState {
        outline: parse_outline(outline_markup)?,
        script: generator.script(outline_markup)?,
        noscript: generator.noscript_page(outline_markup)?,
        config,
    });

    Ok(Router::new()
        .route("/", get(|| async { "Book sidebar preview - try /sidebar?url=http://localhost:3000/book/index.html" }))
        .route("/toc.js", get(script))
        .route("/toc.html", get(noscript))
        .route("/sidebar", get(sidebar_html))
        .route("/sidebar.json", get(sidebar_json))
        .nest_service("/book", ServeDir::new(book_dir.into()))
        .layer(CorsLayer::permissive())
        .with_state(state))
}

async fn script(State(state): State<Arc<PreviewState>>) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/javascript; charset=utf-8")], state.script.clone())
}

async fn noscript(State(state): State<Arc<PreviewState>>) -> Html<String> {
    Html(state.noscript.clone())
}

fn activate(state: &PreviewState, query: SidebarQuery) -> SidebarPreview {
    let mut storage = MemoryStorage::new();
    if let Some(saved) = query.scroll {
        storage.set_item(&state.config.storage_key, saved);
    }
    let mut sidebar = SidebarScrollbox::new(&state.config);
    let report = sidebar.activate(
        &state.outline,
        &PageContext::new(query.url, query.path_to_root),
        &mut storage,
    );
    SidebarPreview {
        report,
        scroll_top: sidebar.scroll_top(),
        html: sidebar.render(),
    }
}

async fn sidebar_html(State(state): State<Arc<PreviewState>>, Query(query): Query<SidebarQuery>) -> Html<String> {
    Html(activate(&state, query).html)
}

async fn sidebar_json(
    State(state): State<Arc<PreviewState>>,
    Query(query): Query<SidebarQuery>,
) -> Json<SidebarPreview> {
    Json(activate(&state, query))
}
