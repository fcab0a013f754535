//! Format-specific parsing of resource file contents.

use std::path::Path;

use serde_json::Value;

use crate::error::{LoadError, Result};

/// Parse `contents` according to `ext`.
///
/// JSON is parsed strictly; `yaml` and `yml` go through `serde_yaml` with
/// merge keys (`<<: *anchor`) applied. An empty YAML document parses to
/// `Value::Null`.
pub fn parse_resource(path: &Path, ext: &str, contents: &str) -> Result<Value> {
    let syntax = |message: String| LoadError::Syntax {
        path: path.to_path_buf(),
        message,
    };

    match ext {
        "json" => serde_json::from_str(contents).map_err(|e| syntax(e.to_string())),
        "yaml" | "yml" if contents.trim().is_empty() => Ok(Value::Null),
        "yaml" | "yml" => {
            let mut doc: serde_yaml::Value =
                serde_yaml::from_str(contents).map_err(|e| syntax(e.to_string()))?;
            doc.apply_merge().map_err(|e| syntax(e.to_string()))?;
            serde_json::to_value(doc).map_err(|e| syntax(e.to_string()))
        }
        _ => Err(LoadError::UnknownFormat(path.to_path_buf())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_json_and_yaml_to_same_shape() {
        let path = Path::new("en/default.json");
        let from_json = parse_resource(path, "json", r#"{"greeting": {"hello": "Hi"}}"#).unwrap();
        let from_yaml = parse_resource(path, "yml", "greeting:\n  hello: Hi\n").unwrap();
        assert_eq!(from_json, json!({"greeting": {"hello": "Hi"}}));
        assert_eq!(from_json, from_yaml);
    }

    #[test]
    fn malformed_json_names_the_file() {
        let path = Path::new("locales/en/broken.json");
        let err = parse_resource(path, "json", "{ not json").unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("localization file syntax error: "), "{message}");
        assert!(message.contains("locales/en/broken.json"), "{message}");
    }

    #[test]
    fn malformed_yaml_is_a_syntax_error() {
        let err = parse_resource(Path::new("x.yaml"), "yaml", "a: [unclosed").unwrap_err();
        assert!(matches!(err, LoadError::Syntax { .. }));
    }

    #[test]
    fn yaml_merge_keys_are_applied() {
        let yaml = "base: &base\n  ok: OK\n  cancel: Cancel\nform:\n  <<: *base\n  title: Form\n";
        let value = parse_resource(Path::new("en/default.yaml"), "yaml", yaml).unwrap();
        assert_eq!(
            value["form"],
            json!({"ok": "OK", "cancel": "Cancel", "title": "Form"})
        );
    }

    #[test]
    fn empty_yaml_is_null() {
        assert_eq!(parse_resource(Path::new("x.yaml"), "yaml", "").unwrap(), Value::Null);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = parse_resource(Path::new("x.toml"), "toml", "a = 1").unwrap_err();
        assert_eq!(err.to_string(), "unknown localization file format: x.toml");
    }
}
