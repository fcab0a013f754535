pub mod config;
pub mod dictionary;

pub use config::{
    Config, CookieConfig, DetectConfig, LoaderConfig, ServerConfig, TranslatorConfig, ViewConfig,
    DEFAULT_NAMESPACE, DEFAULT_PATH_TEMPLATE,
};
pub use dictionary::{deep_merge, get_path, nest_namespace, Dictionary};
