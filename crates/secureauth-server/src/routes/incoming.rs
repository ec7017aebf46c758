//! Redirect landing routes: `/incoming`, `/r`, `/v1/incoming`.
//!
//! Each request is one navigation: the query is validated afresh, the
//! attempt is appended to the attempt log, and the verdict is rendered as
//! HTML (landing page) or JSON (API). Logging is best-effort; a storage
//! failure is reported in the server log and never changes the verdict.

use std::fmt::Write as _;
use std::sync::Arc;

use axum::extract::{RawQuery, State};
use axum::http::{HeaderMap, HeaderName};
use axum::http::header::{REFERER, USER_AGENT};
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use tracing::{info, warn};

use secureauth_core::attempt_log::AttemptRecord;
use secureauth_core::link::{SAMPLE_TOKEN, callback_url, display_name};
use secureauth_core::redirect::{ALLOWED_ROLES, RedirectParams, Verdict, validate};

use super::ui::{escape, page};
use crate::error::AppError;
use crate::state::AppState;

/// Build the incoming router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/incoming", get(incoming_page))
        .route("/r", get(incoming_page))
        .route("/v1/incoming", get(incoming_json))
        .route("/v1/incoming/logs", get(list_attempts))
}

// ── Handlers ─────────────────────────────────────────────────────────

async fn incoming_page(
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Html<String> {
    let verdict = evaluate(&state, query.as_deref(), &headers).await;
    Html(if verdict.is_valid {
        render_success(&verdict)
    } else {
        render_failure(&verdict)
    })
}

async fn incoming_json(
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Json<Verdict> {
    Json(evaluate(&state, query.as_deref(), &headers).await)
}

async fn list_attempts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<AttemptRecord>>, AppError> {
    Ok(Json(state.attempt_log.recent().await?))
}

// ── Helpers ──────────────────────────────────────────────────────────

async fn evaluate(state: &AppState, query: Option<&str>, headers: &HeaderMap) -> Verdict {
    let params = RedirectParams::from_query(query.unwrap_or_default());
    let verdict = validate(&params);

    let header = |name: HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_owned()
    };
    let record = AttemptRecord::from_verdict(
        &verdict,
        chrono::Utc::now(),
        header(USER_AGENT),
        header(REFERER),
    );
    if let Err(e) = state.attempt_log.append(record).await {
        warn!(error = %e, "failed to record redirect attempt");
    }

    info!(
        valid = verdict.is_valid,
        errors = verdict.errors.len(),
        "redirect parameters evaluated"
    );
    verdict
}

fn render_success(verdict: &Verdict) -> String {
    let data = &verdict.data;
    let user = display_name(data.name.as_deref(), data.family.as_deref());
    let website = data.website.as_deref().unwrap_or_default();

    let mut body = format!(
        "<h1>Welcome {}</h1><p>Your details were received and verified.</p>\
         <div class=\"card\"><h3>Received parameters</h3><ul>",
        escape(&user)
    );
    for (label, value) in [
        ("Role", &data.role),
        ("Website", &data.website),
        ("Name", &data.name),
        ("Family name", &data.family),
    ] {
        if let Some(value) = value {
            let _ = write!(body, "<li>{label}: <strong>{}</strong></li>", escape(value));
        }
    }
    body.push_str(
        "</ul></div>\
         <div class=\"card\"><h3>Next steps</h3><ol>\
         <li>Confirm your identity.</li><li>Receive an authentication token.</li>\
         <li>Return to the originating site.</li></ol>\
         <p><a class=\"btn\" href=\"/docs\">Read the docs</a></p></div>",
    );

    if let Ok(url) = callback_url(website, &user, SAMPLE_TOKEN) {
        let _ = write!(
            body,
            "<div class=\"card\"><h3>Sample callback</h3>\
             <p>When the process completes the user is sent to:</p><code>{}</code></div>",
            escape(url.as_str())
        );
    }

    page("Welcome", &body)
}

fn render_failure(verdict: &Verdict) -> String {
    let mut body = String::from(
        "<h1 class=\"error\">Invalid redirect parameters</h1>\
         <p>The link that brought you here is not valid.</p>\
         <div class=\"card\"><h3>Problems found</h3><ul>",
    );
    for error in &verdict.errors {
        let _ = write!(body, "<li class=\"error\">{}</li>", escape(error));
    }
    let _ = write!(
        body,
        "</ul></div><div class=\"card\"><h3>Correct usage</h3><ul>\
         <li><code>role</code> must be one of {}.</li>\
         <li><code>website</code> must be a valid domain such as <code>example.com</code>.</li>\
         <li><code>name</code> and <code>family</code> are optional.</li></ul>\
         <p><a class=\"btn\" href=\"/docs\">Read the docs</a> \
         <a class=\"btn btn-outline\" href=\"/\">Back to home</a></p></div>",
        ALLOWED_ROLES.join(", ")
    );
    page("Invalid link", &body)
}
