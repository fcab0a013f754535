//! Candidate list construction for languages and namespaces.

/// Primary subtag of a region-qualified code (`en-GB` → `en`).
pub fn primary_subtag(code: &str) -> Option<&str> {
    code.split_once('-').map(|(primary, _)| primary)
}

/// Ordered, de-duplicated language candidates.
///
/// Requested languages come first, each followed by its primary subtag when it
/// carries a region; the configured fallbacks come last.
/// `["en-GB", "en-US"]` with fallback `["en"]` gives `["en-GB", "en", "en-US"]`.
pub fn language_candidates<S: AsRef<str>>(requested: &[S], fallback: &[String]) -> Vec<String> {
    let mut ordered: Vec<&str> = Vec::with_capacity(requested.len() * 2 + fallback.len());
    for lang in requested {
        let lang = lang.as_ref();
        ordered.push(lang);
        if let Some(primary) = primary_subtag(lang) {
            ordered.push(primary);
        }
    }
    ordered.extend(fallback.iter().map(String::as_str));
    dedup(ordered)
}

/// Requested namespaces followed by the fallbacks, de-duplicated.
pub fn namespace_candidates<S: AsRef<str>>(requested: &[S], fallback: &[String]) -> Vec<String> {
    dedup(
        requested
            .iter()
            .map(AsRef::as_ref)
            .chain(fallback.iter().map(String::as_str)),
    )
}

fn dedup<'a>(items: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        if !item.is_empty() && !out.iter().any(|seen| seen == item) {
            out.push(item.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn en() -> Vec<String> {
        vec!["en".to_string()]
    }

    #[test]
    fn two_regional_variants_share_primary() {
        assert_eq!(
            language_candidates(&["en-GB", "en-US"], &en()),
            vec!["en-GB", "en", "en-US"]
        );
    }

    #[test]
    fn single_regional_code_gets_primary_then_fallback() {
        assert_eq!(language_candidates(&["fr-CA"], &en()), vec!["fr-CA", "fr", "en"]);
    }

    #[test]
    fn no_request_yields_fallbacks() {
        let none: [&str; 0] = [];
        assert_eq!(language_candidates(&none, &en()), vec!["en"]);
    }

    #[test]
    fn namespaces_keep_request_order() {
        let fallback = vec!["default".to_string()];
        assert_eq!(
            namespace_candidates(&["forms", "default", "forms"], &fallback),
            vec!["forms", "default"]
        );
    }
}
