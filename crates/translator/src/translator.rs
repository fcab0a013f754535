//! [`Translator`]: load lifecycle, live reload and key resolution.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, RwLock, Weak};

use lingua_core::{Dictionary, LoaderConfig, TranslatorConfig, DEFAULT_NAMESPACE};
use lingua_loader::{Backend, FsBackend, LoadOutcome, ReloadWatcher, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::languages::{language_candidates, namespace_candidates};
use crate::readiness::ReadyGate;


/// Per-call resolution options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveOptions {
    /// Requested languages, most preferred first.
    #[serde(default)]
    pub lang: Vec<String>,
    /// Requested namespaces, tried before the fallbacks.
    #[serde(default)]
    pub namespace: Vec<String>,
    /// Returned when no candidate has a value.
    #[serde(default)]
    pub default: Option<Value>,
    /// Return the first key itself when nothing matched and no default is set.
    #[serde(default = "default_self_key")]
    pub self_key: bool,
}

fn default_self_key() -> bool {
    true
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            lang: Vec::new(),
            namespace: Vec::new(),
            default: None,
            self_key: true,
        }
    }
}

impl ResolveOptions {
    pub fn with_lang<I, S>(mut self, langs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lang = langs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_namespace<I, S>(mut self, namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.namespace = namespaces.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_self_key(mut self, self_key: bool) -> Self {
        self.self_key = self_key;
        self
    }
}

/// Text form of a resolved value: strings verbatim, everything else as compact JSON.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn is_present(value: &Value) -> bool {
    !matches!(value, Value::Null) && value.as_str() != Some("")
}

/// Loads translation resources through a [`Backend`] and resolves keys
/// against the most recently published dictionary.
pub struct Translator {
    loader: LoaderConfig,
    config: TranslatorConfig,
    backend: Arc<dyn Backend>,
    /// Current snapshot. Replaced wholesale on every successful load.
    dictionary: RwLock<Arc<Dictionary>>,
    ready: ReadyGate,
    watcher: Mutex<Option<ReloadWatcher>>,
}

impl Translator {
    /// Translator backed by the filesystem loader.
    pub fn new(loader: LoaderConfig, config: TranslatorConfig) -> Arc<Self> {
        Self::with_backend(loader, config, Arc::new(FsBackend::new()))
    }

    pub fn with_backend(
        loader: LoaderConfig,
        config: TranslatorConfig,
        backend: Arc<dyn Backend>,
    ) -> Arc<Self> {
        Arc::new(Self {
            loader,
            config,
            backend,
            dictionary: RwLock::new(Arc::new(Dictionary::new())),
            ready: ReadyGate::new(),
            watcher: Mutex::new(None),
        })
    }

    /// Run the first load, open the readiness gate and, when configured,
    /// start watching for changes.
    ///
    /// A failed first load is returned and leaves the translator not ready.
    /// A watcher that cannot be started is logged and the translator keeps
    /// serving without live reload.
    pub async fn start(self: &Arc<Self>) -> Result<()> {
        let outcome = self.backend.load(&self.loader).await?;

        if self.loader.watch {
            self.start_watching(&outcome);
        }
        self.publish(outcome);
        self.ready.mark_ready();
        info!(languages = self.snapshot().len(), "translator ready");
        Ok(())
    }

    /// Load again and publish the result. On error the previous dictionary
    /// stays in place.
    pub async fn reload(&self) -> Result<()> {
        let outcome = self.backend.load(&self.loader).await?;
        self.publish(outcome);
        self.ready.mark_ready();
        Ok(())
    }

    fn publish(&self, outcome: LoadOutcome) {
        if let Ok(guard) = self.watcher.lock() {
            if let Some(watcher) = guard.as_ref() {
                watcher.update(&outcome);
            }
        }

        let next = Arc::new(outcome.dictionary);
        match self.dictionary.write() {
            Ok(mut current) => *current = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }

    fn start_watching(self: &Arc<Self>, outcome: &LoadOutcome) {
        let (tx, rx) = mpsc::channel(1);
        let watcher = match ReloadWatcher::start(outcome, tx) {
            Ok(w) => w,
            Err(e) => {
                warn!(error = %e, "failed to start resource watcher, live reload disabled");
                return;
            }
        };

        match self.watcher.lock() {
            Ok(mut slot) => *slot = Some(watcher),
            Err(_) => {
                warn!("watcher slot lock poisoned, live reload disabled");
                return;
            }
        }
        spawn_reload_loop(Arc::downgrade(self), rx);
    }

    /// Whether a live-reload watcher is active.
    pub fn is_watching(&self) -> bool {
        self.watcher
            .lock()
            .map(|slot| slot.is_some())
            .unwrap_or(false)
    }

    /// Stop live reload. The current dictionary stays published.
    pub fn stop_watching(&self) {
        if let Ok(mut slot) = self.watcher.lock() {
            if slot.take().is_some() {
                info!("stopped watching resource files");
            }
        }
    }

    /// The currently published dictionary.
    pub fn snapshot(&self) -> Arc<Dictionary> {
        match self.dictionary.read() {
            Ok(current) => Arc::clone(&current),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    pub fn ready(&self) -> &ReadyGate {
        &self.ready
    }

    pub fn is_ready(&self) -> bool {
        self.ready.is_ready()
    }

    pub async fn wait_ready(&self) {
        self.ready.wait().await
    }

    pub fn on_ready<F>(&self, listener: F) -> JoinHandle<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.ready.on_ready(listener)
    }

    pub fn loader_config(&self) -> &LoaderConfig {
        &self.loader
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    /// Language candidates for `opts`, in resolution order.
    pub fn languages(&self, opts: &ResolveOptions) -> Vec<String> {
        language_candidates(&opts.lang, &self.config.fallback_lang)
    }

    /// Namespace candidates for `opts`, in resolution order.
    pub fn namespaces(&self, opts: &ResolveOptions) -> Vec<String> {
        namespace_candidates(&opts.namespace, &self.config.fallback_namespace)
    }

    /// Resolve the first non-empty value across languages, then namespaces,
    /// then `keys`.
    ///
    /// Falls back to `opts.default`, then to the first key when
    /// `opts.self_key` is set.
    pub fn resolve<S: AsRef<str>>(&self, keys: &[S], opts: &ResolveOptions) -> Option<Value> {
        let dictionary = self.snapshot();
        let namespaces = self.namespaces(opts);

        for lang in self.languages(opts) {
            let Some(tree) = dictionary.language(&lang) else {
                continue;
            };
            for namespace in &namespaces {
                for key in keys {
                    let key = key.as_ref();
                    let found = if namespace == DEFAULT_NAMESPACE {
                        lingua_core::get_path(tree, key)
                    } else {
                        lingua_core::get_path(tree, &format!("{namespace}.{key}"))
                    };
                    if let Some(value) = found.filter(|v| is_present(v)) {
                        return Some(value.clone());
                    }
                }
            }
        }

        opts.default.clone().or_else(|| {
            keys.first()
                .filter(|_| opts.self_key)
                .map(|key| Value::String(key.as_ref().to_string()))
        })
    }

    /// Resolve a single key and render it as text. Missing yields an empty string.
    pub fn translate(&self, key: &str, opts: &ResolveOptions) -> String {
        self.resolve(&[key], opts)
            .map(|value| render_value(&value))
            .unwrap_or_default()
    }
}

/// Drain reload triggers one at a time so reloads never overlap.
fn spawn_reload_loop(translator: Weak<Translator>, mut rx: mpsc::Receiver<PathBuf>) {
    tokio::spawn(async move {
        while let Some(path) = rx.recv().await {
            let Some(translator) = translator.upgrade() else {
                break;
            };
            match translator.reload().await {
                Ok(()) => info!(
                    trigger = %path.display(),
                    languages = translator.snapshot().len(),
                    "reloaded translation resources"
                ),
                Err(e) => error!(
                    trigger = %path.display(),
                    error = %e,
                    "reload failed, keeping previous translations"
                ),
            }
        }
    });
}
