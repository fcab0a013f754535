//! Localized view selection.
//!
//! A view named `pages/about.html` rendered for `["de-AT", "de"]` first looks
//! for `pages/about_de-AT.html`, then `pages/about_de.html`, across every
//! search directory, before falling back to the unlocalized template.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex};

use lingua_translator::{ResolveOptions, Translator};
use serde_json::Value;
use tracing::{debug, warn};

/// Errors raised while rendering a view.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("view not found: {0}")]
    NotFound(String),

    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),
}

/// Renders a named view with a JSON context.
pub trait Renderer: Send + Sync {
    fn render(&self, name: &str, context: &Value) -> Result<String, RenderError>;
}

/// One localized candidate: the view name handed to the renderer and the
/// absolute path probed for existence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub name: String,
    pub path: PathBuf,
}

type Probe = Arc<dyn Fn(&Path) -> bool + Send + Sync>;

/// Lexically normalize `path` against the working directory, resolving `.`
/// and `..` without touching the filesystem.
fn absolutize(path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

/// Finds the first existing localized variant of a view.
pub struct ViewResolver {
    dirs: Vec<PathBuf>,
    no_cache: bool,
    cache: Mutex<HashMap<PathBuf, bool>>,
    probe: Probe,
}

impl ViewResolver {
    pub fn new(dirs: Vec<PathBuf>, no_cache: bool) -> Self {
        Self::with_probe(dirs, no_cache, Arc::new(|path: &Path| path.is_file()))
    }

    /// Resolver with a custom existence check.
    pub fn with_probe(dirs: Vec<PathBuf>, no_cache: bool, probe: Probe) -> Self {
        let dirs = if dirs.is_empty() {
            vec![PathBuf::from(".")]
        } else {
            dirs
        };
        Self {
            dirs: dirs.iter().map(|d| absolutize(d)).collect(),
            no_cache,
            cache: Mutex::new(HashMap::new()),
            probe,
        }
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Localized candidates in probe order: languages outer, directories inner.
    ///
    /// The extension is the name's own, else `ext`. Directories the view
    /// would escape from (via `..`) are skipped.
    pub fn candidates(&self, name: &str, ext: &str, langs: &[String]) -> Vec<Candidate> {
        let trimmed = name.trim_start_matches(['/', '\\']);
        let path = Path::new(trimmed);
        let own_ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{e}"));
        let ext = own_ext.as_deref().unwrap_or(ext);
        let base = trimmed.strip_suffix(ext).unwrap_or(trimmed);

        let dirs: Vec<&PathBuf> = self
            .dirs
            .iter()
            .filter(|dir| absolutize(&dir.join(base)).starts_with(dir))
            .collect();

        let mut out = Vec::with_capacity(langs.len() * dirs.len());
        for lang in langs {
            let file = format!("{base}_{lang}{ext}");
            for dir in &dirs {
                out.push(Candidate {
                    path: absolutize(&dir.join(&file)),
                    name: file.clone(),
                });
            }
        }
        out
    }

    /// First candidate that exists, consulting and filling the cache unless
    /// caching is disabled.
    pub fn first_existing<'a>(&self, candidates: &'a [Candidate]) -> Option<&'a Candidate> {
        candidates.iter().find(|candidate| self.exists(&candidate.path))
    }

    fn exists(&self, path: &Path) -> bool {
        if self.no_cache {
            return (self.probe)(path);
        }
        if let Some(known) = self.cache.lock().ok().and_then(|c| c.get(path).copied()) {
            return known;
        }
        let exists = (self.probe)(path);
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(path.to_path_buf(), exists);
        }
        exists
    }

    /// Forget every cached existence check.
    pub fn clear_cache(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.clear();
        }
    }
}

/// Languages requested through a render context's `lang` field.
fn context_languages(context: &Value) -> Vec<String> {
    match context.get("lang") {
        Some(Value::String(lang)) => vec![lang.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

/// Decorates a [`Renderer`] so views are rendered in the best available language.
pub struct LocalizedRenderer<R> {
    inner: R,
    resolver: ViewResolver,
    translator: Arc<Translator>,
    ext: String,
}

impl<R: Renderer> LocalizedRenderer<R> {
    pub fn new(inner: R, resolver: ViewResolver, translator: Arc<Translator>) -> Self {
        Self {
            inner,
            resolver,
            translator,
            ext: ".html".to_string(),
        }
    }

    /// Extension assumed for view names that carry none.
    pub fn with_default_ext(mut self, ext: impl Into<String>) -> Self {
        self.ext = ext.into();
        self
    }

    pub fn resolver(&self) -> &ViewResolver {
        &self.resolver
    }

    /// Name of the view that would be rendered for `langs`.
    pub fn select(&self, name: &str, langs: &[String]) -> String {
        let candidates = self.translator.languages(&ResolveOptions::default().with_lang(langs.iter().cloned()));
        let files = self.resolver.candidates(name, &self.ext, &candidates);
        match self.resolver.first_existing(&files) {
            Some(found) => {
                debug!(view = name, localized = %found.name, "using localized view");
                found.name.clone()
            }
            None => name.to_string(),
        }
    }

    pub fn render_localized(
        &self,
        name: &str,
        langs: &[String],
        context: &Value,
    ) -> Result<String, RenderError> {
        self.inner.render(&self.select(name, langs), context)
    }
}

impl<R: Renderer> Renderer for LocalizedRenderer<R> {
    fn render(&self, name: &str, context: &Value) -> Result<String, RenderError> {
        self.render_localized(name, &context_languages(context), context)
    }
}

/// Minijinja renderer loading templates from the search directories.
pub struct TemplateRenderer {
    env: minijinja::Environment<'static>,
}

impl TemplateRenderer {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        let mut env = minijinja::Environment::new();
        env.set_loader(move |name: &str| {
            for dir in &dirs {
                match fs::read_to_string(dir.join(name)) {
                    Ok(source) => return Ok(Some(source)),
                    Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                    Err(e) => {
                        warn!(view = name, dir = %dir.display(), error = %e, "failed to read view");
                        return Err(minijinja::Error::new(
                            minijinja::ErrorKind::InvalidOperation,
                            format!("failed to read view {name}"),
                        )
                        .with_source(e));
                    }
                }
            }
            Ok(None)
        });
        Self { env }
    }
}

impl Renderer for TemplateRenderer {
    fn render(&self, name: &str, context: &Value) -> Result<String, RenderError> {
        let template = self.env.get_template(name).map_err(|e| match e.kind() {
            minijinja::ErrorKind::TemplateNotFound => RenderError::NotFound(name.to_string()),
            _ => RenderError::Template(e),
        })?;
        Ok(template.render(context)?)
    }
}

#[cfg(test)]
mod tests;
