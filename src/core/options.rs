//! Extraction options shared by every adapter during a run.

use regex::Regex;

use crate::core::merge::PlaceholderStyle;

/// Decides which attributes carry translatable text.
#[derive(Debug, Clone, Default)]
pub struct AttributePolicy {
    translate: Vec<String>,
    no_translate: Vec<String>,
    translate_suffixes: Vec<String>,
    no_translate_suffixes: Vec<String>,
}

impl AttributePolicy {
    pub fn new(
        translate: &[String],
        no_translate: &[String],
        translate_suffixes: &[String],
        no_translate_suffixes: &[String],
    ) -> Self {
        let lower = |items: &[String]| items.iter().map(|s| s.to_ascii_lowercase()).collect();
        Self {
            translate: lower(translate),
            no_translate: lower(no_translate),
            translate_suffixes: lower(translate_suffixes),
            no_translate_suffixes: lower(no_translate_suffixes),
        }
    }

    /// Exclusions win over inclusions. Names compare case-insensitively and
    /// a leading `:` (bound attribute) is ignored.
    pub fn is_translatable(&self, name: &str) -> bool {
        let name = name.trim_start_matches(':').to_ascii_lowercase();
        let excluded = self.no_translate.contains(&name)
            || self
                .no_translate_suffixes
                .iter()
                .any(|suffix| name.ends_with(suffix.as_str()));
        if excluded {
            return false;
        }
        self.translate.contains(&name)
            || self
                .translate_suffixes
                .iter()
                .any(|suffix| name.ends_with(suffix.as_str()))
    }
}

#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Access function inserted by rewrites (`t`).
    pub translation_fn: String,
    /// Callee paths recognized as existing wraps, in addition to `translation_fn`.
    pub recognized_calls: Vec<String>,
    pub attributes: AttributePolicy,
    pub placeholder_style: PlaceholderStyle,
    existing_call: Option<Regex>,
}

impl ExtractOptions {
    pub fn new(
        translation_fn: impl Into<String>,
        recognized_calls: Vec<String>,
        attributes: AttributePolicy,
        placeholder_style: PlaceholderStyle,
    ) -> Self {
        let translation_fn = translation_fn.into();
        let existing_call = existing_call_regex(&translation_fn, &recognized_calls);
        Self {
            translation_fn,
            recognized_calls,
            attributes,
            placeholder_style,
            existing_call,
        }
    }

    pub fn is_recognized_call(&self, callee: &str) -> bool {
        !callee.is_empty()
            && (callee == self.translation_fn || self.recognized_calls.iter().any(|c| c == callee))
    }

    /// Matches `fn('literal')` for every recognized callee. The literal is
    /// captured in group 1 (single quotes) or group 2 (double quotes).
    pub fn existing_call(&self) -> Option<&Regex> {
        self.existing_call.as_ref()
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self::new(
            "t",
            vec!["t".to_string(), "$t".to_string(), "i18n.t".to_string()],
            AttributePolicy::default(),
            PlaceholderStyle::Icu,
        )
    }
}

fn existing_call_regex(translation_fn: &str, recognized_calls: &[String]) -> Option<Regex> {
    let mut names: Vec<&str> = std::iter::once(translation_fn)
        .chain(recognized_calls.iter().map(String::as_str))
        .filter(|name| !name.is_empty())
        .collect();
    // Longest first so `i18n.t` is preferred over `t`.
    names.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    names.dedup();
    if names.is_empty() {
        return None;
    }

    let alternation = names
        .iter()
        .map(|name| regex::escape(name))
        .collect::<Vec<_>>()
        .join("|");
    let pattern = format!(
        r#"(?:^|[^\w$.])(?:{})\(\s*(?:'((?:[^'\\]|\\.)*)'|"((?:[^"\\]|\\.)*)")"#,
        alternation
    );
    Regex::new(&pattern).ok()
}
