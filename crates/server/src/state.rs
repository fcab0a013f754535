use std::sync::Arc;

use lingua_core::DetectConfig;
use lingua_translator::Translator;

use crate::views::{LocalizedRenderer, TemplateRenderer};

pub struct AppState {
    pub translator: Arc<Translator>,
    pub detect: DetectConfig,
    pub views: Arc<LocalizedRenderer<TemplateRenderer>>,
}
