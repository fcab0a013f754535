//! Backend trait and the filesystem implementation of the load pipeline.

use std::path::PathBuf;

use async_trait::async_trait;
use lingua_core::{nest_namespace, Dictionary, LoaderConfig};
use tracing::{debug, info};

use crate::discover::{discover, ResourceFile};
use crate::error::{LoadError, Result};
use crate::parse::parse_resource;
use crate::project_root::project_root;
use crate::template::{CaptureRegex, PathTemplate};

/// One scanned base directory: where it was walked and what matched.
#[derive(Debug, Clone)]
pub struct Scan {
    pub root: PathBuf,
    pub pattern: CaptureRegex,
}

/// Everything a successful load produced.
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub dictionary: Dictionary,
    /// Contributing files in merge order.
    pub files: Vec<ResourceFile>,
    pub scans: Vec<Scan>,
}

/// A source of translation dictionaries.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Build a complete dictionary. An error means nothing usable was produced.
    async fn load(&self, config: &LoaderConfig) -> Result<LoadOutcome>;
}

/// Loads resource files from disk according to the configured path template.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsBackend;

impl FsBackend {
    pub fn new() -> Self {
        Self
    }

    /// Configured base directories, or the project root when none are given.
    pub fn base_dirs(config: &LoaderConfig) -> Vec<PathBuf> {
        if config.base_dirs.is_empty() {
            vec![project_root()]
        } else {
            config.base_dirs.clone()
        }
    }

    /// Discover files in every base directory, one directory at a time.
    pub async fn discover(config: &LoaderConfig) -> Result<(Vec<ResourceFile>, Vec<Scan>)> {
        let template = PathTemplate::parse(&config.path)?;
        let mut files = Vec::new();
        let mut scans = Vec::new();

        for dir in Self::base_dirs(config) {
            let resolved = template.resolve(&dir);
            let pattern = resolved.to_regex()?;
            let root = resolved.walk_root();
            debug!(dir = %dir.display(), glob = %resolved.to_glob(), "scanning for resources");

            let found = {
                let (root, pattern, dir) = (root.clone(), pattern.clone(), dir.clone());
                tokio::task::spawn_blocking(move || discover(&root, &pattern, &dir)).await??
            };
            files.extend(found);
            scans.push(Scan { root, pattern });
        }

        Ok((files, scans))
    }
}

#[async_trait]
impl Backend for FsBackend {
    async fn load(&self, config: &LoaderConfig) -> Result<LoadOutcome> {
        let (files, scans) = Self::discover(config).await?;

        let mut dictionary = Dictionary::new();
        for file in &files {
            let contents = tokio::fs::read_to_string(&file.filename)
                .await
                .map_err(|source| match source.kind() {
                    // not UTF-8
                    std::io::ErrorKind::InvalidData => LoadError::Syntax {
                        path: file.filename.clone(),
                        message: source.to_string(),
                    },
                    _ => LoadError::Io {
                        path: file.filename.clone(),
                        source,
                    },
                })?;
            let data = parse_resource(&file.filename, &file.ext, &contents)?;
            if data.is_null() {
                debug!(path = %file.filename.display(), "empty resource file");
                continue;
            }
            debug!(
                path = %file.filename.display(),
                lang = %file.lang,
                namespace = %file.namespace,
                "merged resource file"
            );
            dictionary.merge_language(&file.lang, nest_namespace(&file.namespace, data));
        }

        // explicit resources always win
        dictionary.merge_value(config.resources.clone());

        info!(
            languages = dictionary.len(),
            files = files.len(),
            "loaded translation resources"
        );

        Ok(LoadOutcome {
            dictionary,
            files,
            scans,
        })
    }
}
