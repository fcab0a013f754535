use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default resource path template, relative to each base directory.
pub const DEFAULT_PATH_TEMPLATE: &str = "locales/{lang}/{namespace}.{ext}";

/// Namespace whose content merges at the root of a language entry.
pub const DEFAULT_NAMESPACE: &str = "default";

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_u16(profile: &str, key: &str, default: u16) -> u16 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_bool(profile: &str, key: &str, default: bool) -> bool {
    profiled_env_opt(profile, key)
        .map(|v| parse_bool(&v))
        .unwrap_or(default)
}

fn profiled_env_list(profile: &str, key: &str) -> Option<Vec<String>> {
    profiled_env_opt(profile, key).map(|v| split_list(&v))
}

/// Accepts `1`, `true`, `yes`, `on` (case-insensitive) as true.
pub fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Split a comma-separated list, trimming entries and dropping empty ones.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub loader: LoaderConfig,
    pub translator: TranslatorConfig,
    pub server: ServerConfig,
    pub detect: DetectConfig,
    pub views: ViewConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `LINGUA_PROFILE`. When set (e.g. `PROD`), every key
    /// is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env::var("LINGUA_PROFILE").unwrap_or_default().to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            loader: LoaderConfig::from_env_profiled(p),
            translator: TranslatorConfig::from_env_profiled(p),
            server: ServerConfig::from_env_profiled(p),
            detect: DetectConfig::from_env_profiled(p),
            views: ViewConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!(
            "  loader:      path={}, base_dirs={}, watch={}",
            self.loader.path,
            if self.loader.base_dirs.is_empty() {
                "(project root)".to_string()
            } else {
                self.loader
                    .base_dirs
                    .iter()
                    .map(|d| d.display().to_string())
                    .collect::<Vec<_>>()
                    .join(",")
            },
            self.loader.watch
        );
        tracing::info!(
            "  translator:  fallback_lang={:?}, fallback_namespace={:?}",
            self.translator.fallback_lang,
            self.translator.fallback_namespace
        );
        tracing::info!("  server:      {}:{}", self.server.host, self.server.port);
        tracing::info!(
            "  detect:      query={}, cookie={}, header={}, allowed={:?}",
            self.detect.query.as_deref().unwrap_or("(off)"),
            self.detect
                .cookie
                .as_ref()
                .map(|c| c.name.as_str())
                .unwrap_or("(off)"),
            self.detect.detect_header,
            self.detect.allowed_langs
        );
        tracing::info!(
            "  views:       dirs={}, cache={}",
            self.views.dirs.len(),
            !self.views.no_cache
        );
    }
}

// ── Loader ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Path template with `{lang}`, `{namespace}` and `{ext}` placeholders.
    pub path: String,
    /// Directories to search. Empty means "the consuming project's root".
    #[serde(default)]
    pub base_dirs: Vec<PathBuf>,
    /// In-memory resources (`{ lang: { ... } }`) merged over file content.
    #[serde(default)]
    pub resources: serde_json::Value,
    /// Reload when resource files change.
    #[serde(default)]
    pub watch: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_PATH_TEMPLATE.to_string(),
            base_dirs: Vec::new(),
            resources: serde_json::Value::Null,
            watch: false,
        }
    }
}

impl LoaderConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            path: profiled_env_or(p, "LINGUA_PATH", DEFAULT_PATH_TEMPLATE),
            base_dirs: profiled_env_list(p, "LINGUA_BASE_DIRS")
                .unwrap_or_default()
                .into_iter()
                .map(PathBuf::from)
                .collect(),
            resources: serde_json::Value::Null,
            watch: profiled_env_bool(p, "LINGUA_WATCH", false),
        }
    }

    /// Builder-style helper used by tests and embedding applications.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dirs.push(dir.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_resources(mut self, resources: serde_json::Value) -> Self {
        self.resources = resources;
        self
    }

    pub fn with_watch(mut self, watch: bool) -> Self {
        self.watch = watch;
        self
    }
}

// ── Translator ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslatorConfig {
    /// Languages tried after the requested ones, in order.
    pub fallback_lang: Vec<String>,
    /// Namespaces tried after the requested ones, in order.
    pub fallback_namespace: Vec<String>,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            fallback_lang: vec!["en".to_string()],
            fallback_namespace: vec![DEFAULT_NAMESPACE.to_string()],
        }
    }
}

impl TranslatorConfig {
    fn from_env_profiled(p: &str) -> Self {
        let defaults = Self::default();
        Self {
            fallback_lang: profiled_env_list(p, "LINGUA_FALLBACK_LANG")
                .unwrap_or(defaults.fallback_lang),
            fallback_namespace: profiled_env_list(p, "LINGUA_FALLBACK_NAMESPACE")
                .unwrap_or(defaults.fallback_namespace),
        }
    }
}

// ── Server ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            cors_origin: "*".to_string(),
        }
    }
}

impl ServerConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            host: profiled_env_or(p, "LINGUA_HOST", "0.0.0.0"),
            port: profiled_env_u16(p, "LINGUA_PORT", 3000),
            cors_origin: profiled_env_or(p, "LINGUA_CORS_ORIGIN", "*"),
        }
    }
}

// ── Language detection ────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookieConfig {
    pub name: String,
    /// Cookie lifetime in seconds; session cookie when unset.
    pub max_age: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectConfig {
    /// Query parameter carrying a language list.
    pub query: Option<String>,
    /// Cookie used to read and persist the language list.
    pub cookie: Option<CookieConfig>,
    /// Read `Accept-Language` when neither query nor cookie supplied languages.
    pub detect_header: bool,
    /// Restrict detected languages to this list.
    pub allowed_langs: Option<Vec<String>>,
}

impl DetectConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            query: profiled_env_opt(p, "LINGUA_QUERY_PARAM"),
            cookie: profiled_env_opt(p, "LINGUA_COOKIE_NAME").map(|name| CookieConfig {
                name,
                max_age: profiled_env_opt(p, "LINGUA_COOKIE_MAX_AGE").and_then(|v| v.parse().ok()),
            }),
            detect_header: profiled_env_bool(p, "LINGUA_DETECT_HEADER", true),
            allowed_langs: profiled_env_list(p, "LINGUA_ALLOWED_LANGS"),
        }
    }
}

// ── Localized views ───────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Template search directories.
    pub dirs: Vec<PathBuf>,
    /// Disable the per-path existence cache.
    pub no_cache: bool,
}

impl ViewConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            dirs: profiled_env_list(p, "LINGUA_VIEW_DIRS")
                .unwrap_or_else(|| vec!["views".to_string()])
                .into_iter()
                .map(PathBuf::from)
                .collect(),
            no_cache: profiled_env_bool(p, "LINGUA_VIEW_NO_CACHE", false),
        }
    }
}
