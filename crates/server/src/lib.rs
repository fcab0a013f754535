//! HTTP adapter: per-request language detection, translation endpoints and
//! localized views over a shared [`lingua_translator::Translator`].

pub mod api;
pub mod detect;
pub mod locale;
pub mod router;
pub mod state;
pub mod views;

pub use locale::{Localizer, RequestLocale};
pub use router::build_router;
pub use state::AppState;
