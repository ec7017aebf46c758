//! Mock sign-in routes: `/v1/auth/*`
//!
//! Login and signup accept any well-formed form; the resulting user record
//! becomes the single persisted session.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use secureauth_core::auth::{AuthMode, Credentials};
use secureauth_core::session::UserRecord;

use crate::error::AppError;
use crate::state::AppState;

/// Build the `/v1/auth` router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", post(login))
        .route("/signup", post(signup))
        .route("/session", get(current_session).delete(end_session))
}

// ── Response types ───────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserRecord,
    pub message: String,
}

// ── Handlers ─────────────────────────────────────────────────────────

async fn login(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<AuthResponse>, AppError> {
    submit(&state, AuthMode::Login, body).await
}

async fn signup(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<AuthResponse>, AppError> {
    submit(&state, AuthMode::Signup, body).await
}

async fn current_session(
    State(state): State<Arc<AppState>>,
) -> Result<Json<UserRecord>, AppError> {
    state
        .sessions()
        .load()
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("no active session".to_owned()))
}

async fn end_session(State(state): State<Arc<AppState>>) -> Result<StatusCode, AppError> {
    state.sessions().clear().await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn submit(
    state: &AppState,
    mode: AuthMode,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<AuthResponse>, AppError> {
    let Json(creds) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let user = state.authenticator.submit(mode, &creds).await?;
    let message = match mode {
        AuthMode::Login => format!("Welcome back, {}", user.display_name()),
        AuthMode::Signup => format!("Account created for {}", user.display_name()),
    };
    Ok(Json(AuthResponse { user, message }))
}
