//! Translation resolution over a live dictionary snapshot.
//!
//! A [`Translator`] owns a loader backend, the published dictionary and a
//! readiness gate. Resolution walks language, namespace and key candidates in
//! priority order against an immutable snapshot and never blocks on I/O.

pub mod languages;
pub mod readiness;
pub mod translator;

pub use languages::{language_candidates, namespace_candidates};
pub use readiness::ReadyGate;
pub use translator::{render_value, ResolveOptions, Translator};
