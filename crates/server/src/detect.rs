//! Request language detection: query parameter, cookie, then `Accept-Language`.

use std::collections::HashMap;

use axum::extract::Query;
use axum::http::header::{ACCEPT_LANGUAGE, COOKIE};
use axum::http::{HeaderMap, Uri};
use lingua_core::{CookieConfig, DetectConfig};

/// Split a comma list and keep each item's leading language token.
///
/// Leading whitespace is ignored and anything after the token (quality
/// values, stray characters) is dropped: `"fr , en-GB;q=0.8"` gives
/// `["fr", "en-GB"]`. Items without a token are skipped.
pub fn normalize_languages(raw: &str) -> Vec<String> {
    raw.split(',').filter_map(language_token).collect()
}

fn language_token(item: &str) -> Option<String> {
    let item = item.trim_start();
    let end = item
        .find(|c: char| !(c.is_ascii_alphabetic() || c == '-'))
        .unwrap_or(item.len());
    (end > 0).then(|| item[..end].to_string())
}

/// Keep only allowed codes, preserving detected order.
pub fn filter_allowed(langs: Vec<String>, allowed: Option<&[String]>) -> Vec<String> {
    match allowed {
        Some(allowed) => langs
            .into_iter()
            .filter(|lang| allowed.contains(lang))
            .collect(),
        None => langs,
    }
}

/// Value of a named cookie from the request's `Cookie` headers.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().to_string())
}

fn query_value(uri: &Uri, param: &str) -> Option<String> {
    let Query(params) = Query::<HashMap<String, String>>::try_from_uri(uri).ok()?;
    params.get(param).cloned()
}

/// Raw language list for a request, by precedence.
fn raw_languages(headers: &HeaderMap, uri: &Uri, config: &DetectConfig) -> Option<String> {
    let from_query = config
        .query
        .as_deref()
        .and_then(|param| query_value(uri, param))
        .filter(|v| !v.is_empty());
    if from_query.is_some() {
        return from_query;
    }

    let from_cookie = config
        .cookie
        .as_ref()
        .and_then(|cookie| cookie_value(headers, &cookie.name))
        .filter(|v| !v.is_empty());
    if from_cookie.is_some() {
        return from_cookie;
    }

    if !config.detect_header {
        return None;
    }
    headers
        .get(ACCEPT_LANGUAGE)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty() && *v != "*")
        .map(str::to_string)
}

/// Detected, normalized and allow-listed languages for a request.
pub fn detect_languages(headers: &HeaderMap, uri: &Uri, config: &DetectConfig) -> Vec<String> {
    let langs = raw_languages(headers, uri, config)
        .map(|raw| normalize_languages(&raw))
        .unwrap_or_default();
    filter_allowed(langs, config.allowed_langs.as_deref())
}

/// `Set-Cookie` value persisting the language list.
pub fn set_cookie_value(cookie: &CookieConfig, langs: &[String]) -> String {
    let mut value = format!("{}={}; Path=/", cookie.name, langs.join(","));
    if let Some(max_age) = cookie.max_age {
        value.push_str(&format!("; Max-Age={max_age}"));
    }
    value
}
