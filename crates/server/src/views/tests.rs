use std::sync::atomic::{AtomicUsize, Ordering};

use lingua_core::{LoaderConfig, TranslatorConfig};
use serde_json::json;
use tempfile::TempDir;

use super::*;

fn langs(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn counting_probe(existing: Vec<PathBuf>) -> (Probe, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let probe: Probe = Arc::new(move |path: &Path| {
        counter.fetch_add(1, Ordering::SeqCst);
        existing.iter().any(|p| p == path)
    });
    (probe, calls)
}

// ── Candidate lists ─────────────────────────────────────────

#[test]
fn candidates_iterate_languages_then_directories() {
    let resolver = ViewResolver::new(vec![PathBuf::from("/app/views"), PathBuf::from("/shared")], false);
    let names: Vec<_> = resolver
        .candidates("/pages/about.html", ".njk", &langs(&["de", "en"]))
        .into_iter()
        .map(|c| c.path)
        .collect();
    assert_eq!(
        names,
        vec![
            PathBuf::from("/app/views/pages/about_de.html"),
            PathBuf::from("/shared/pages/about_de.html"),
            PathBuf::from("/app/views/pages/about_en.html"),
            PathBuf::from("/shared/pages/about_en.html"),
        ]
    );
}

#[test]
fn default_extension_applies_to_bare_names() {
    let resolver = ViewResolver::new(vec![PathBuf::from("/views")], false);
    let candidates = resolver.candidates("index", ".html", &langs(&["fr"]));
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].name, "index_fr.html");
    assert_eq!(candidates[0].path, PathBuf::from("/views/index_fr.html"));
}

#[test]
fn directories_the_view_escapes_are_skipped() {
    let resolver = ViewResolver::new(vec![PathBuf::from("/srv/views")], false);
    assert!(resolver
        .candidates("../secrets/keys.html", ".html", &langs(&["en"]))
        .is_empty());
}

// ── Existence checks ────────────────────────────────────────

#[test]
fn first_existing_short_circuits_and_caches() {
    let (probe, calls) = counting_probe(vec![PathBuf::from("/views/home_en.html")]);
    let resolver = ViewResolver::with_probe(vec![PathBuf::from("/views")], false, probe);
    let candidates = resolver.candidates("home", ".html", &langs(&["de", "en", "fr"]));

    let found = resolver.first_existing(&candidates).unwrap();
    assert_eq!(found.name, "home_en.html");
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    resolver.first_existing(&candidates).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2, "second lookup should hit the cache");

    resolver.clear_cache();
    resolver.first_existing(&candidates).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[test]
fn no_cache_probes_every_time() {
    let (probe, calls) = counting_probe(Vec::new());
    let resolver = ViewResolver::with_probe(vec![PathBuf::from("/views")], true, probe);
    let candidates = resolver.candidates("home", ".html", &langs(&["de"]));

    assert!(resolver.first_existing(&candidates).is_none());
    assert!(resolver.first_existing(&candidates).is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

// ── Rendering ───────────────────────────────────────────────

fn renderer(dir: &TempDir) -> LocalizedRenderer<TemplateRenderer> {
    let dirs = vec![dir.path().to_path_buf()];
    let translator = Translator::new(
        LoaderConfig::default().with_base_dir(dir.path()),
        TranslatorConfig::default(),
    );
    LocalizedRenderer::new(
        TemplateRenderer::new(dirs.clone()),
        ViewResolver::new(dirs, false),
        translator,
    )
}

#[test]
fn renders_best_localized_variant() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("hello.html"), "Hello {{ name }}").unwrap();
    fs::write(dir.path().join("hello_de.html"), "Hallo {{ name }}").unwrap();
    let views = renderer(&dir);

    let context = json!({"name": "Ada"});
    assert_eq!(
        views.render_localized("hello.html", &langs(&["de-AT"]), &context).unwrap(),
        "Hallo Ada"
    );
    assert_eq!(
        views.render_localized("hello.html", &langs(&["it"]), &context).unwrap(),
        "Hello Ada"
    );
}

#[test]
fn fallback_language_variant_is_used() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("hello.html"), "plain").unwrap();
    fs::write(dir.path().join("hello_en.html"), "english").unwrap();
    let views = renderer(&dir);

    assert_eq!(views.select("hello.html", &langs(&["ja"])), "hello_en.html");
}

#[test]
fn decorator_reads_languages_from_context() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("page.html"), "default").unwrap();
    fs::write(dir.path().join("page_fr.html"), "{{ lang[0] }}").unwrap();
    let views = renderer(&dir);

    let rendered = Renderer::render(&views, "page.html", &json!({"lang": ["fr"]})).unwrap();
    assert_eq!(rendered, "fr");
}

#[test]
fn missing_view_is_not_found() {
    let dir = TempDir::new().unwrap();
    let views = renderer(&dir);
    let err = views
        .render_localized("absent.html", &langs(&["en"]), &json!({}))
        .unwrap_err();
    assert!(matches!(err, RenderError::NotFound(_)), "{err}");
}
