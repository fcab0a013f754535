//! Translation resource loading.
//!
//! This crate provides:
//! - Path template compilation (`{lang}`, `{namespace}`, `{ext}`) to a glob and a capture regex
//! - Resource discovery across one or more base directories
//! - JSON and YAML parsing into one nested dictionary
//! - The `Backend` seam with a filesystem implementation
//! - A `notify` watcher that triggers coalesced reloads

pub mod backend;
pub mod discover;
pub mod error;
pub mod parse;
pub mod project_root;
pub mod template;
pub mod watcher;

pub use backend::{Backend, FsBackend, LoadOutcome, Scan};
pub use discover::ResourceFile;
pub use error::{LoadError, Result};
pub use template::{CaptureRegex, PathTemplate, Placeholder};
pub use watcher::ReloadWatcher;
