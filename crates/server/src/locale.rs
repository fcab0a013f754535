//! Per-request locale: detection middleware and the [`Localizer`] extractor.

use std::sync::{Arc, RwLock};

use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::SET_COOKIE;
use axum::http::request::Parts;
use axum::http::{HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use lingua_translator::{ResolveOptions, Translator};
use serde_json::Value;
use tracing::warn;

use crate::detect::{detect_languages, filter_allowed, normalize_languages, set_cookie_value};
use crate::state::AppState;

/// Languages chosen for the current request.
///
/// Cloned handles share the same list, so a handler changing the language
/// also changes the cookie the middleware writes afterwards.
#[derive(Debug, Clone)]
pub struct RequestLocale {
    langs: Arc<RwLock<Vec<String>>>,
    fallback: Option<String>,
}

impl RequestLocale {
    pub fn new(langs: Vec<String>, fallback: Option<String>) -> Self {
        Self {
            langs: Arc::new(RwLock::new(langs)),
            fallback,
        }
    }

    pub fn languages(&self) -> Vec<String> {
        match self.langs.read() {
            Ok(langs) => langs.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn replace(&self, langs: Vec<String>) {
        match self.langs.write() {
            Ok(mut current) => *current = langs,
            Err(poisoned) => *poisoned.into_inner() = langs,
        }
    }

    /// Value for an `<html lang>` attribute: first request language, else
    /// the first configured fallback.
    pub fn html_lang(&self) -> Option<String> {
        self.languages()
            .into_iter()
            .next()
            .or_else(|| self.fallback.clone())
    }
}

/// Detect the request's languages, wait for the first translation load,
/// then persist the final language list in the configured cookie.
pub async fn localize(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    state.translator.wait_ready().await;

    let langs = detect_languages(request.headers(), request.uri(), &state.detect);
    let fallback = state.translator.config().fallback_lang.first().cloned();
    let locale = RequestLocale::new(langs, fallback);
    request.extensions_mut().insert(locale.clone());

    let mut response = next.run(request).await;

    if let Some(cookie) = &state.detect.cookie {
        let value = set_cookie_value(cookie, &locale.languages());
        match HeaderValue::from_str(&value) {
            Ok(header) => {
                response.headers_mut().append(SET_COOKIE, header);
            }
            Err(e) => warn!(error = %e, "language cookie is not a valid header value"),
        }
    }
    response
}

/// Translation helper bound to the current request's languages.
#[derive(Clone)]
pub struct Localizer {
    translator: Arc<Translator>,
    locale: RequestLocale,
    allowed: Option<Vec<String>>,
}

impl FromRequestParts<Arc<AppState>> for Localizer {
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let locale = parts
            .extensions
            .get::<RequestLocale>()
            .cloned()
            .ok_or((
                StatusCode::INTERNAL_SERVER_ERROR,
                "localize middleware is not installed on this route",
            ))?;
        Ok(Self {
            translator: Arc::clone(&state.translator),
            locale,
            allowed: state.detect.allowed_langs.clone(),
        })
    }
}

impl Localizer {
    pub fn languages(&self) -> Vec<String> {
        self.locale.languages()
    }

    pub fn locale(&self) -> &RequestLocale {
        &self.locale
    }

    pub fn translator(&self) -> &Arc<Translator> {
        &self.translator
    }

    /// Options carrying the request languages.
    pub fn options(&self) -> ResolveOptions {
        ResolveOptions::default().with_lang(self.languages())
    }

    /// Translate `key` in the request languages.
    pub fn t(&self, key: &str) -> String {
        self.translator.translate(key, &self.options())
    }

    /// Resolve with `opts`, filling in the request languages when none are given.
    pub fn resolve<S: AsRef<str>>(&self, keys: &[S], mut opts: ResolveOptions) -> Option<Value> {
        if opts.lang.is_empty() {
            opts.lang = self.languages();
        }
        self.translator.resolve(keys, &opts)
    }

    /// Replace the request languages. Input is normalized and allow-listed
    /// like detected languages.
    pub fn set_language<S: AsRef<str>>(&self, langs: &[S]) {
        let normalized = langs
            .iter()
            .flat_map(|lang| normalize_languages(lang.as_ref()))
            .collect();
        self.locale
            .replace(filter_allowed(normalized, self.allowed.as_deref()));
    }
}
