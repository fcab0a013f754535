//! Subcommand implementations. Each returns the text to print.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use lingua_loader::{FsBackend, ResourceFile};
use lingua_translator::{render_value, Translator};
use serde_json::Value;
use tracing::info;

use crate::cli::{ResolveArgs, SourceArgs};

pub fn format_files(files: &[ResourceFile]) -> String {
    files
        .iter()
        .map(|f| {
            format!(
                "{:<8} {:<16} {:<5} {}\n",
                f.lang,
                f.namespace,
                f.ext,
                f.filename.display()
            )
        })
        .collect()
}

pub async fn files(source: &SourceArgs) -> Result<String> {
    let (files, _) = FsBackend::discover(&source.loader_config(false))
        .await
        .context("failed to discover resource files")?;
    Ok(format_files(&files))
}

async fn started(source: &SourceArgs, watch: bool) -> Result<Arc<Translator>> {
    let translator = Translator::new(source.loader_config(watch), source.translator_config());
    translator
        .start()
        .await
        .context("failed to load translation resources")?;
    Ok(translator)
}

pub async fn dump(source: &SourceArgs, lang: Option<&str>) -> Result<String> {
    let translator = started(source, false).await?;
    let snapshot = translator.snapshot();
    let value = match lang {
        Some(lang) => snapshot
            .language(lang)
            .cloned()
            .with_context(|| format!("no translations for language '{lang}'"))?,
        None => snapshot.to_value(),
    };
    Ok(serde_json::to_string_pretty(&value)?)
}

pub fn format_resolution(translator: &Translator, args: &ResolveArgs) -> String {
    let opts = args.options();
    let mut out = String::new();
    if args.explain {
        out.push_str(&format!("languages:  {}\n", translator.languages(&opts).join(", ")));
        out.push_str(&format!("namespaces: {}\n", translator.namespaces(&opts).join(", ")));
    }
    if let Some(value) = translator.resolve(&args.keys, &opts) {
        let text = match &value {
            Value::String(_) => render_value(&value),
            other => serde_json::to_string_pretty(other).unwrap_or_else(|_| render_value(other)),
        };
        out.push_str(&text);
        out.push('\n');
    }
    out
}

pub async fn resolve(source: &SourceArgs, args: &ResolveArgs) -> Result<String> {
    let translator = started(source, false).await?;
    Ok(format_resolution(&translator, args))
}

/// Report every published dictionary until Ctrl-C.
pub async fn watch(source: &SourceArgs) -> Result<()> {
    let translator = started(source, true).await?;
    if !translator.is_watching() {
        anyhow::bail!("resource watcher could not be started");
    }

    let mut current = translator.snapshot();
    println!("watching ({} languages), press Ctrl-C to stop", current.len());

    let mut ticker = tokio::time::interval(Duration::from_millis(250));
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = ticker.tick() => {
                let latest = translator.snapshot();
                if !Arc::ptr_eq(&latest, &current) {
                    let languages: Vec<&str> = latest.languages().collect();
                    println!("reloaded: {}", languages.join(", "));
                    current = latest;
                }
            }
        }
    }

    translator.stop_watching();
    info!("stopped");
    Ok(())
}
