use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use lingua_core::{LoaderConfig, TranslatorConfig, DEFAULT_NAMESPACE, DEFAULT_PATH_TEMPLATE};
use lingua_translator::ResolveOptions;

/// Inspect and resolve file-backed translations.
#[derive(Parser, Debug)]
#[command(name = "lingua", about = "Inspect and resolve file-backed translations")]
pub struct CliArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Where resources come from and how lookups fall back.
#[derive(Args, Debug)]
pub struct SourceArgs {
    /// Path template with {lang}, {namespace} and {ext} placeholders
    #[arg(long, env = "LINGUA_PATH", default_value = DEFAULT_PATH_TEMPLATE, global = true)]
    pub path: String,

    /// Base directory to search (repeatable; later directories win)
    #[arg(long = "base-dir", env = "LINGUA_BASE_DIRS", value_delimiter = ',', global = true)]
    pub base_dirs: Vec<PathBuf>,

    /// Fallback languages, in order
    #[arg(long, env = "LINGUA_FALLBACK_LANG", value_delimiter = ',', default_value = "en", global = true)]
    pub fallback_lang: Vec<String>,

    /// Fallback namespaces, in order
    #[arg(long, env = "LINGUA_FALLBACK_NAMESPACE", value_delimiter = ',', default_value = DEFAULT_NAMESPACE, global = true)]
    pub fallback_namespace: Vec<String>,
}

impl SourceArgs {
    pub fn loader_config(&self, watch: bool) -> LoaderConfig {
        LoaderConfig {
            path: self.path.clone(),
            base_dirs: self.base_dirs.clone(),
            resources: serde_json::Value::Null,
            watch,
        }
    }

    pub fn translator_config(&self) -> TranslatorConfig {
        TranslatorConfig {
            fallback_lang: self.fallback_lang.clone(),
            fallback_namespace: self.fallback_namespace.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List discovered resource files in merge order
    Files,

    /// Print the merged dictionary as JSON
    Dump {
        /// Only print this language
        #[arg(long)]
        lang: Option<String>,
    },

    /// Resolve one or more candidate keys
    Resolve(ResolveArgs),

    /// Reload on changes and report each new dictionary until interrupted
    Watch,
}

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Keys tried in order
    #[arg(required = true)]
    pub keys: Vec<String>,

    /// Requested languages, most preferred first
    #[arg(long, value_delimiter = ',')]
    pub lang: Vec<String>,

    /// Requested namespaces
    #[arg(long, value_delimiter = ',')]
    pub namespace: Vec<String>,

    /// Value returned when nothing matches
    #[arg(long)]
    pub default: Option<String>,

    /// Print nothing instead of echoing the key when nothing matches
    #[arg(long)]
    pub no_self_key: bool,

    /// Print the language candidates tried
    #[arg(long)]
    pub explain: bool,
}

impl ResolveArgs {
    pub fn options(&self) -> ResolveOptions {
        let opts = ResolveOptions::default()
            .with_lang(self.lang.iter().cloned())
            .with_namespace(self.namespace.iter().cloned())
            .with_self_key(!self.no_self_key);
        match &self.default {
            Some(default) => opts.with_default(default.clone()),
            None => opts,
        }
    }
}
