//! End-to-end live reload against a real directory tree.

use std::fs;
use std::path::Path;
use std::time::Duration;

use lingua_core::{LoaderConfig, TranslatorConfig};
use lingua_translator::{ResolveOptions, Translator};
use tempfile::TempDir;

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// Poll `check` until it holds or the timeout elapses.
async fn eventually(mut check: impl FnMut() -> bool) -> bool {
    for _ in 0..100 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    false
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn edits_are_picked_up_while_watching() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "locales/en/default.json", r#"{"title": "Before"}"#);

    let loader = LoaderConfig::default()
        .with_base_dir(dir.path())
        .with_watch(true);
    let translator = Translator::new(loader, TranslatorConfig::default());
    translator.start().await.unwrap();
    assert!(translator.is_watching());

    let opts = ResolveOptions::default();
    assert_eq!(translator.translate("title", &opts), "Before");

    write(dir.path(), "locales/en/default.json", r#"{"title": "After"}"#);
    assert!(
        eventually(|| translator.translate("title", &opts) == "After").await,
        "modified file was not reloaded"
    );

    // a new namespace file is picked up too
    write(dir.path(), "locales/en/forms.json", r#"{"submit": "Send"}"#);
    assert!(
        eventually(|| translator.translate("forms.submit", &opts) == "Send").await,
        "new file was not reloaded"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn broken_edit_keeps_serving_previous_translations() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "locales/en/default.json", r#"{"title": "Good"}"#);

    let loader = LoaderConfig::default()
        .with_base_dir(dir.path())
        .with_watch(true);
    let translator = Translator::new(loader, TranslatorConfig::default());
    translator.start().await.unwrap();

    write(dir.path(), "locales/en/default.json", "{ broken");
    tokio::time::sleep(Duration::from_millis(1500)).await;

    let opts = ResolveOptions::default();
    assert_eq!(translator.translate("title", &opts), "Good");
    assert!(translator.is_ready());

    write(dir.path(), "locales/en/default.json", r#"{"title": "Fixed"}"#);
    assert!(eventually(|| translator.translate("title", &opts) == "Fixed").await);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn new_language_directory_is_picked_up() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "locales/en/default.json", r#"{"greeting": "Hello"}"#);

    let loader = LoaderConfig::default()
        .with_base_dir(dir.path())
        .with_watch(true);
    let translator = Translator::new(loader, TranslatorConfig::default());
    translator.start().await.unwrap();

    // directory and file created back to back
    write(dir.path(), "locales/fr/default.json", r#"{"greeting": "Bonjour"}"#);

    let opts = ResolveOptions::default().with_lang(["fr"]);
    assert!(
        eventually(|| translator.translate("greeting", &opts) == "Bonjour").await,
        "file in a new language directory was not reloaded"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn watching_a_missing_tree_picks_it_up_once_created() {
    let dir = TempDir::new().unwrap();
    let base = dir.path().join("absent");
    let loader = LoaderConfig::default()
        .with_base_dir(&base)
        .with_watch(true);
    let translator = Translator::new(loader, TranslatorConfig::default());

    translator.start().await.unwrap();
    assert!(translator.is_ready());
    assert!(translator.is_watching());
    assert!(translator.snapshot().is_empty());

    write(&base, "locales/en/default.json", r#"{"title": "Created later"}"#);

    let opts = ResolveOptions::default();
    assert!(
        eventually(|| translator.translate("title", &opts) == "Created later").await,
        "file under a root created after start was not reloaded"
    );

    translator.stop_watching();
    assert!(!translator.is_watching());
}
