//! Path template compilation.
//!
//! A template such as `locales/{lang}/{namespace}.{ext}` is parsed once into a
//! segment list. The glob and the capture regex are both derived from that
//! list, so capture-group indices always follow placeholder positions.

use std::path::{is_separator, Path, PathBuf, MAIN_SEPARATOR};

use regex::Regex;

use crate::error::{LoadError, Result};

/// File extensions with a known parser.
pub const EXTENSIONS: &[&str] = &["json", "yaml", "yml"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    Lang,
    Namespace,
    Ext,
}

impl Placeholder {
    pub const ALL: [Placeholder; 3] = [Self::Lang, Self::Namespace, Self::Ext];

    pub fn token(self) -> &'static str {
        match self {
            Self::Lang => "{lang}",
            Self::Namespace => "{namespace}",
            Self::Ext => "{ext}",
        }
    }

    fn glob(self) -> &'static str {
        match self {
            Self::Lang | Self::Namespace => "*",
            Self::Ext => "{json,yaml,yml}",
        }
    }

    fn capture(self) -> &'static str {
        match self {
            Self::Lang => r"([A-Za-z_-]+)",
            // dot-separated segments: `forms.errors`
            Self::Namespace => r"([A-Za-z_-]+(?:\.[A-Za-z_-]+)*)",
            Self::Ext => r"(json|yaml|yml)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(Placeholder),
}

/// Parsed resource path template.
#[derive(Debug, Clone)]
pub struct PathTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    /// Parse a template, requiring exactly one of each placeholder.
    pub fn parse(template: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut rest = template;

        loop {
            let next = Placeholder::ALL
                .iter()
                .filter_map(|p| rest.find(p.token()).map(|i| (i, *p)))
                .min_by_key(|(i, _)| *i);

            match next {
                Some((i, placeholder)) => {
                    if i > 0 {
                        segments.push(Segment::Literal(rest[..i].to_string()));
                    }
                    segments.push(Segment::Placeholder(placeholder));
                    rest = &rest[i + placeholder.token().len()..];
                }
                None => {
                    if !rest.is_empty() {
                        segments.push(Segment::Literal(rest.to_string()));
                    }
                    break;
                }
            }
        }

        for placeholder in Placeholder::ALL {
            let count = segments
                .iter()
                .filter(|s| **s == Segment::Placeholder(placeholder))
                .count();
            if count != 1 {
                return Err(LoadError::Template {
                    template: template.to_string(),
                    reason: format!(
                        "expected exactly one {} placeholder, found {}",
                        placeholder.token(),
                        count
                    ),
                });
            }
        }

        Ok(Self {
            source: template.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Placeholders in the order they appear.
    pub fn placeholders(&self) -> Vec<Placeholder> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Placeholder(p) => Some(*p),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    /// Anchor a relative template under `base`. Absolute templates are returned unchanged.
    pub fn resolve(&self, base: &Path) -> PathTemplate {
        if Path::new(&self.source).is_absolute() {
            return self.clone();
        }

        let base = base.to_string_lossy();
        let base = if base.is_empty() { "." } else { base.as_ref() };
        let mut prefix = base.trim_end_matches(is_separator).to_string();
        prefix.push(MAIN_SEPARATOR);

        let mut segments = self.segments.clone();
        match segments.first_mut() {
            Some(Segment::Literal(text)) => {
                let mut relative = text.as_str();
                while let Some(stripped) = relative
                    .strip_prefix("./")
                    .or_else(|| relative.strip_prefix(".\\"))
                {
                    relative = stripped;
                }
                *text = format!("{prefix}{relative}");
            }
            _ => segments.insert(0, Segment::Literal(prefix)),
        }

        let source = segments
            .iter()
            .map(|s| match s {
                Segment::Literal(text) => text.as_str(),
                Segment::Placeholder(p) => p.token(),
            })
            .collect();

        PathTemplate { source, segments }
    }

    /// Directory that contains every possible match: the leading literal up to
    /// its last path separator.
    pub fn walk_root(&self) -> PathBuf {
        let Some(Segment::Literal(text)) = self.segments.first() else {
            return PathBuf::from(".");
        };
        match text.rfind(is_separator) {
            Some(0) => PathBuf::from(MAIN_SEPARATOR.to_string()),
            Some(idx) => PathBuf::from(&text[..idx]),
            None => PathBuf::from("."),
        }
    }

    /// Filesystem glob with the placeholders replaced by wildcards.
    pub fn to_glob(&self) -> String {
        self.segments
            .iter()
            .map(|s| match s {
                Segment::Literal(text) => text.as_str(),
                Segment::Placeholder(p) => p.glob(),
            })
            .collect()
    }

    /// Anchored regex with one capture group per placeholder.
    pub fn to_regex(&self) -> Result<CaptureRegex> {
        let mut pattern = String::from("^");
        let (mut lang, mut namespace, mut ext) = (0, 0, 0);
        let mut group = 0;

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => pattern.push_str(&regex::escape(text)),
                Segment::Placeholder(p) => {
                    group += 1;
                    match p {
                        Placeholder::Lang => lang = group,
                        Placeholder::Namespace => namespace = group,
                        Placeholder::Ext => ext = group,
                    }
                    pattern.push_str(p.capture());
                }
            }
        }
        pattern.push('$');

        let regex = Regex::new(&pattern).map_err(|e| LoadError::Template {
            template: self.source.clone(),
            reason: e.to_string(),
        })?;

        Ok(CaptureRegex {
            regex,
            lang,
            namespace,
            ext,
        })
    }
}

/// Values extracted from a matching path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captured {
    pub lang: String,
    pub namespace: String,
    pub ext: String,
}

/// Compiled capture regex plus the group index of each placeholder.
#[derive(Debug, Clone)]
pub struct CaptureRegex {
    regex: Regex,
    lang: usize,
    namespace: usize,
    ext: usize,
}

impl CaptureRegex {
    pub fn group_index(&self, placeholder: Placeholder) -> usize {
        match placeholder {
            Placeholder::Lang => self.lang,
            Placeholder::Namespace => self.namespace,
            Placeholder::Ext => self.ext,
        }
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    pub fn is_match(&self, path: &Path) -> bool {
        path.to_str().is_some_and(|text| self.regex.is_match(text))
    }

    /// Extract language, namespace and extension. Empty captures count as no match.
    pub fn captures(&self, path: &Path) -> Option<Captured> {
        let caps = self.regex.captures(path.to_str()?)?;
        let group = |i: usize| {
            caps.get(i)
                .map(|m| m.as_str().to_string())
                .filter(|s| !s.is_empty())
        };
        Some(Captured {
            lang: group(self.lang)?,
            namespace: group(self.namespace)?,
            ext: group(self.ext)?,
        })
    }
}
