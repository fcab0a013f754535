use std::sync::Arc;

use anyhow::Context;
use lingua_server::views::{LocalizedRenderer, TemplateRenderer, ViewResolver};
use lingua_server::{build_router, AppState};
use lingua_translator::Translator;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn load_config() -> lingua_core::Config {
    lingua_core::config::load_dotenv();
    lingua_core::Config::from_env()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true)
        .init();

    let config = load_config();
    config.log_summary();

    let translator = Translator::new(config.loader.clone(), config.translator.clone());
    translator
        .start()
        .await
        .context("initial translation load failed")?;

    let views = LocalizedRenderer::new(
        TemplateRenderer::new(config.views.dirs.clone()),
        ViewResolver::new(config.views.dirs.clone(), config.views.no_cache),
        Arc::clone(&translator),
    );

    let state = Arc::new(AppState {
        translator,
        detect: config.detect.clone(),
        views: Arc::new(views),
    });
    let app = build_router(state, &config.server.cors_origin);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
