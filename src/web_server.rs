use anyhow::{Context, Result};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use minijinja::{path_loader, Environment};
use minijinja_autoreload::AutoReloader;
use serde::Deserialize;
use std::{net::SocketAddr, sync::Arc};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::constants;
use crate::pipeline::{Accumulate, Pipeline};
use crate::presentation;
use crate::session::{SessionStore, Transcript};

// Shared application state
#[derive(Clone)]
pub struct AppState {
    templates: Arc<AutoReloader>,
    sessions: SessionStore,
    pipeline: Arc<Pipeline>,
    accumulate: Accumulate,
}

impl AppState {
    pub fn new(pipeline: Pipeline, accumulate: Accumulate, template_dir: &str) -> Self {
        Self {
            templates: Arc::new(create_minijinja_env(template_dir)),
            sessions: SessionStore::new(),
            pipeline: Arc::new(pipeline),
            accumulate,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }
}

// Minijinja Environment setup
fn create_minijinja_env(template_dir: &str) -> AutoReloader {
    let template_dir = template_dir.to_string();
    AutoReloader::new(move |notifier| {
        let mut env = Environment::new();
        env.set_loader(path_loader(template_dir.clone()));
        notifier.watch_path(template_dir.as_str(), true);
        Ok(env)
    })
}

#[derive(Debug, Deserialize)]
pub struct AskForm {
    #[serde(default)]
    question: String,
}

fn render_page(
    state: &AppState,
    session_id: Uuid,
    transcript: &Transcript,
    input_error: Option<&str>,
) -> Result<Html<String>, Html<String>> {
    let view = presentation::page_view(transcript, state.accumulate);
    state
        .templates
        .acquire_env()
        .and_then(|env| {
            env.get_template("index.html").and_then(|tmpl| {
                tmpl.render(minijinja::context! {
                    title => constants::PAGE_TITLE,
                    about => constants::ABOUT_TEXT,
                    built_with => constants::BUILT_WITH_TEXT,
                    session_id => session_id.to_string(),
                    view => view,
                    input_error => input_error,
                })
            })
        })
        .map(Html)
        .map_err(|e| {
            error!("Failed to get or render template: {:#}", e);
            Html(format!("Internal Server Error: {}", e))
        })
}

fn page_response(rendered: Result<Html<String>, Html<String>>, ok_status: StatusCode) -> Response {
    match rendered {
        Ok(html) => (ok_status, html).into_response(),
        Err(html) => (StatusCode::INTERNAL_SERVER_ERROR, html).into_response(),
    }
}

fn session_not_found(id: Uuid) -> Response {
    warn!(%id, "Unknown or ended session");
    (StatusCode::NOT_FOUND, Html("Session not found. <a href=\"/\">Start a new one</a>.".to_string()))
        .into_response()
}

async fn index_handler(State(state): State<AppState>) -> Redirect {
    let id = state.sessions.create().await;
    Redirect::to(&format!("/session/{id}"))
}

async fn session_handler(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match state.sessions.get(id).await {
        Some(session) => page_response(render_page(&state, id, &session.transcript, None), StatusCode::OK),
        None => session_not_found(id),
    }
}

async fn ask_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Form(form): Form<AskForm>,
) -> Response {
    if !state.sessions.contains(id).await {
        return session_not_found(id);
    }

    // No lock is held while the external calls run.
    match state.pipeline.submit(&form.question).await {
        Ok(messages) => match state.sessions.append(id, messages).await {
            Some(len) => {
                info!(%id, transcript_len = len, "Submission recorded");
                Redirect::to(&format!("/session/{id}")).into_response()
            }
            None => session_not_found(id),
        },
        Err(e) => {
            let Some(session) = state.sessions.get(id).await else {
                return session_not_found(id);
            };
            let message = e.to_string();
            page_response(
                render_page(&state, id, &session.transcript, Some(&message)),
                StatusCode::UNPROCESSABLE_ENTITY,
            )
        }
    }
}

async fn reset_handler(State(state): State<AppState>, Path(id): Path<Uuid>) -> Redirect {
    state.sessions.end(id).await;
    Redirect::to("/")
}

async fn transcript_handler(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match state.sessions.get(id).await {
        Some(session) => Json(session.transcript).into_response(),
        None => session_not_found(id),
    }
}

async fn health_handler() -> &'static str {
    "ok"
}

/// Builds the application router. The static directory is served under `/static`.
pub fn build_router(state: AppState, static_dir: &str) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/session/:id", get(session_handler))
        .route("/session/:id/ask", post(ask_handler))
        .route("/session/:id/reset", post(reset_handler))
        .route("/session/:id/transcript", get(transcript_handler))
        .nest_service("/static", ServeDir::new(static_dir))
        .with_state(state)
        .layer(TraceLayer::new_for_http()) // Add request logging
}

pub async fn start_web_server(port: u16, pipeline: Pipeline, accumulate: Accumulate) -> Result<()> {
    let state = AppState::new(pipeline, accumulate, &constants::TEMPLATE_DIR);
    let app = build_router(state, &constants::STATIC_DIR);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(?accumulate, "Web server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context(format!("Failed to bind to address {}", addr))?;

    axum::serve(listener, app.into_make_service())
        .await
        .context("Web server failed")?;

    Ok(())
}
