//! JSON and view endpoints.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

use crate::locale::Localizer;
use crate::state::AppState;
use crate::views::RenderError;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

// ── Health & readiness ────────────────────────────────────────────

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
pub struct ReadyResponse {
    pub ready: bool,
    pub languages: Vec<String>,
    pub watching: bool,
}

/// 200 once the first load finished, 503 before.
pub async fn ready(State(state): State<Arc<AppState>>) -> (StatusCode, Json<ReadyResponse>) {
    let ready = state.translator.is_ready();
    let body = ReadyResponse {
        ready,
        languages: state
            .translator
            .snapshot()
            .languages()
            .map(str::to_string)
            .collect(),
        watching: state.translator.is_watching(),
    };
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body))
}

// ── Translation ───────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct TranslateQuery {
    /// Comma-separated namespaces tried before the fallbacks.
    pub namespace: Option<String>,
    pub default: Option<String>,
}

#[derive(Serialize)]
pub struct TranslateResponse {
    pub key: String,
    pub lang: Vec<String>,
    pub value: Option<Value>,
}

pub async fn translate(
    Path(key): Path<String>,
    Query(query): Query<TranslateQuery>,
    localizer: Localizer,
) -> Json<TranslateResponse> {
    let mut opts = localizer.options();
    if let Some(namespace) = query.namespace.as_deref() {
        opts = opts.with_namespace(lingua_core::config::split_list(namespace));
    }
    if let Some(default) = query.default {
        opts = opts.with_default(default);
    }
    let value = localizer.resolve(&[key.as_str()], opts);
    Json(TranslateResponse {
        key,
        lang: localizer.languages(),
        value,
    })
}

#[derive(Serialize)]
pub struct LanguagesResponse {
    /// Languages detected for this request.
    pub requested: Vec<String>,
    /// Resolution order including fallbacks.
    pub candidates: Vec<String>,
    /// Languages present in the loaded dictionary.
    pub available: Vec<String>,
    pub html_lang: Option<String>,
}

fn languages_body(localizer: &Localizer) -> LanguagesResponse {
    let translator = localizer.translator();
    LanguagesResponse {
        requested: localizer.languages(),
        candidates: translator.languages(&localizer.options()),
        available: translator
            .snapshot()
            .languages()
            .map(str::to_string)
            .collect(),
        html_lang: localizer.locale().html_lang(),
    }
}

pub async fn languages(localizer: Localizer) -> Json<LanguagesResponse> {
    Json(languages_body(&localizer))
}

#[derive(Debug, Deserialize)]
pub struct SetLanguageRequest {
    pub lang: Vec<String>,
}

/// Switch the request languages; the response cookie carries the new list.
pub async fn set_language(
    localizer: Localizer,
    Json(body): Json<SetLanguageRequest>,
) -> Json<LanguagesResponse> {
    localizer.set_language(&body.lang);
    Json(languages_body(&localizer))
}

// ── Views ─────────────────────────────────────────────────────────

pub async fn view(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    localizer: Localizer,
) -> Response {
    let langs = localizer.languages();
    let context = json!({
        "lang": langs,
        "html_lang": localizer.locale().html_lang(),
    });

    let views = Arc::clone(&state.views);
    let rendered =
        tokio::task::spawn_blocking(move || views.render_localized(&name, &langs, &context)).await;

    match rendered {
        Ok(Ok(html)) => Html(html).into_response(),
        Ok(Err(RenderError::NotFound(name))) => {
            error(StatusCode::NOT_FOUND, format!("view not found: {name}"))
        }
        Ok(Err(e)) => {
            warn!(error = %e, "view render failed");
            error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
        Err(e) => error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}
