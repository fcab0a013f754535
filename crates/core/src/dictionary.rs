//! Per-language translation store plus the deep-merge and dotted-path
//! helpers shared by the loader and the translator.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::DEFAULT_NAMESPACE;

/// Deep-merge `source` into `target`: maps merge recursively, everything else
/// (scalars, arrays, nulls) is replaced by the source value.
pub fn deep_merge(target: &mut Value, source: Value) {
    match (target, source) {
        (Value::Object(tm), Value::Object(sm)) => {
            for (key, source_val) in sm {
                match tm.get_mut(&key) {
                    Some(target_val) => deep_merge(target_val, source_val),
                    None => {
                        tm.insert(key, source_val);
                    }
                }
            }
        }
        (target, source) => *target = source,
    }
}

/// Wrap `content` under the dot-separated namespace path.
///
/// `"a.b"` with `{x: 1}` becomes `{a: {b: {x: 1}}}`. The `default` namespace
/// returns the content unchanged.
pub fn nest_namespace(namespace: &str, content: Value) -> Value {
    if namespace == DEFAULT_NAMESPACE {
        return content;
    }
    namespace
        .rsplit('.')
        .fold(content, |inner, part| {
            let mut map = Map::new();
            map.insert(part.to_string(), inner);
            Value::Object(map)
        })
}

/// Traverse `value` along a dotted path (`"a.b.c"`).
pub fn get_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |node, part| match node {
        Value::Object(map) => map.get(part),
        Value::Array(items) => part.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Language code → nested translation tree.
///
/// Rebuilt wholesale on every load and never mutated after publication.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dictionary {
    languages: BTreeMap<String, Value>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a `{ lang: { ... } }` object. Non-object input yields an empty dictionary.
    pub fn from_value(value: Value) -> Self {
        let mut dict = Self::new();
        dict.merge_value(value);
        dict
    }

    /// Deep-merge a `{ lang: { ... } }` object over the current content.
    pub fn merge_value(&mut self, value: Value) {
        if let Value::Object(map) = value {
            for (lang, tree) in map {
                self.merge_language(&lang, tree);
            }
        }
    }

    /// Deep-merge `tree` over the entry for `lang`.
    pub fn merge_language(&mut self, lang: &str, tree: Value) {
        match self.languages.get_mut(lang) {
            Some(existing) => deep_merge(existing, tree),
            None => {
                self.languages.insert(lang.to_string(), tree);
            }
        }
    }

    /// The tree for a language, if any file or resource contributed to it.
    pub fn language(&self, lang: &str) -> Option<&Value> {
        self.languages.get(lang)
    }

    /// Look up a dotted path inside one language.
    pub fn get(&self, lang: &str, path: &str) -> Option<&Value> {
        self.language(lang).and_then(|tree| get_path(tree, path))
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.languages.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.languages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }

    pub fn to_value(&self) -> Value {
        Value::Object(
            self.languages
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deep_merge_overwrites_leaves_and_keeps_siblings() {
        let mut target = json!({"a": {"x": 1, "y": 2}, "b": "keep"});
        deep_merge(&mut target, json!({"a": {"y": 20, "z": 30}}));
        assert_eq!(target, json!({"a": {"x": 1, "y": 20, "z": 30}, "b": "keep"}));
    }

    #[test]
    fn deep_merge_replaces_arrays_atomically() {
        let mut target = json!({"list": [1, 2, 3]});
        deep_merge(&mut target, json!({"list": [9]}));
        assert_eq!(target, json!({"list": [9]}));
    }

    #[test]
    fn deep_merge_scalar_over_map_replaces() {
        let mut target = json!({"a": {"nested": true}});
        deep_merge(&mut target, json!({"a": "flat"}));
        assert_eq!(target, json!({"a": "flat"}));
    }

    #[test]
    fn nest_namespace_builds_nested_shape() {
        assert_eq!(
            nest_namespace("a.b", json!({"x": 1})),
            json!({"a": {"b": {"x": 1}}})
        );
        assert_eq!(nest_namespace("single", json!("v")), json!({"single": "v"}));
        assert_eq!(nest_namespace("default", json!({"x": 1})), json!({"x": 1}));
    }

    #[test]
    fn get_path_walks_objects_and_array_indices() {
        let tree = json!({"a": {"b": ["zero", "one"]}});
        assert_eq!(get_path(&tree, "a.b.1"), Some(&json!("one")));
        assert_eq!(get_path(&tree, "a.missing"), None);
        assert_eq!(get_path(&tree, "a.b.x"), None);
    }

    #[test]
    fn dictionary_merge_value_is_per_language() {
        let mut dict = Dictionary::from_value(json!({"en": {"hi": "Hello"}, "fr": {"hi": "Salut"}}));
        dict.merge_value(json!({"en": {"bye": "Bye"}}));
        assert_eq!(dict.get("en", "hi"), Some(&json!("Hello")));
        assert_eq!(dict.get("en", "bye"), Some(&json!("Bye")));
        assert_eq!(dict.get("fr", "bye"), None);
        assert_eq!(dict.languages().collect::<Vec<_>>(), vec!["en", "fr"]);
    }

    #[test]
    fn dictionary_from_non_object_is_empty() {
        assert!(Dictionary::from_value(Value::Null).is_empty());
        assert!(Dictionary::from_value(json!([1, 2])).is_empty());
    }
}
