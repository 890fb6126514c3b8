//! REST endpoints for the embeddable coaching widget.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::coaching::{CoachController, OptionSets, SessionView, UserAction, ViewOptions};
use crate::error::SessionError;
use crate::sessions::{SessionHandle, SessionStore};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionStore>,
    pub controller: Arc<CoachController>,
    pub view_options: ViewOptions,
}

/// Build the Axum router with the session REST routes.
pub fn coach_routes(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/options", get(options))
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/{id}", get(get_session).delete(delete_session))
        .route("/api/sessions/{id}/events", post(apply_event))
        .layer(cors)
        .with_state(state)
}

#[derive(Serialize)]
struct SessionCreated {
    session_id: Uuid,
    view: SessionView,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({"error": message.into()}))).into_response()
}

// ── Health ──────────────────────────────────────────────────────────────

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "fitx-coach",
        "model": state.controller.model_name(),
        "sessions": state.sessions.len().await,
    }))
}

async fn options() -> impl IntoResponse {
    Json(OptionSets::all())
}

// ── Sessions ────────────────────────────────────────────────────────────

async fn create_session(State(state): State<AppState>) -> Response {
    let (session_id, handle) = state.sessions.create().await;
    let session = handle.lock().await;
    let view = SessionView::render(&session.state, None, &state.view_options);
    (StatusCode::CREATED, Json(SessionCreated { session_id, view })).into_response()
}

async fn lookup(state: &AppState, id: &str) -> Result<SessionHandle, Response> {
    let session_id = Uuid::parse_str(id)
        .map_err(|_| error_response(StatusCode::BAD_REQUEST, "Invalid session ID"))?;

    state.sessions.get(session_id).await.map_err(|e| {
        debug!(session_id = %session_id, error = %e, "Session lookup failed");
        match e {
            SessionError::NotFound { .. } => {
                error_response(StatusCode::NOT_FOUND, "Session not found")
            }
            SessionError::Expired { .. } => {
                error_response(StatusCode::NOT_FOUND, "Session expired")
            }
        }
    })
}

async fn get_session(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let handle = match lookup(&state, &id).await {
        Ok(handle) => handle,
        Err(response) => return response,
    };
    let session = handle.lock().await;
    Json(SessionView::render(&session.state, None, &state.view_options)).into_response()
}

async fn delete_session(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Ok(session_id) = Uuid::parse_str(&id) else {
        return error_response(StatusCode::BAD_REQUEST, "Invalid session ID");
    };
    if state.sessions.remove(session_id).await {
        Json(serde_json::json!({"status": "ended"})).into_response()
    } else {
        error_response(StatusCode::NOT_FOUND, "Session not found")
    }
}

async fn apply_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(action): Json<UserAction>,
) -> Response {
    let handle = match lookup(&state, &id).await {
        Ok(handle) => handle,
        Err(response) => return response,
    };

    // Held across the completion call: one interaction at a time per session.
    let mut session = handle.lock().await;
    let session_id = session.id;
    let action_name = action.name();

    match state.controller.handle(&mut session.state, action).await {
        Ok(notice) => {
            if notice.is_some() {
                info!(session_id = %session_id, action = action_name, step = %session.state.step, "Action produced a notice");
            }
            Json(SessionView::render(&session.state, notice, &state.view_options)).into_response()
        }
        Err(e) => {
            warn!(session_id = %session_id, action = action_name, error = %e, "Rejected action");
            error_response(StatusCode::CONFLICT, e.to_string())
        }
    }
}
