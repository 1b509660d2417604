//! Deterministic translation key generation.
//!
//! A key looks like `namespace.scope.text_slug.hash`:
//!
//! - `scope` comes from the file basename and the attribute name (dropped
//!   in dedupe-by-value mode)
//! - `text_slug` is the first few words of the normalized text
//! - `hash` is a prefix of a SHA-256 digest over the text and its context
//!
//! Hashes are bound to the text they were first emitted for. A different
//! text landing on an already-bound hash gets a numeric suffix (`hash2`,
//! `hash3`, ...); the same text always gets the same hash back.

use std::{collections::HashMap, path::Path, sync::Mutex};

use sha2::{Digest, Sha256};

use crate::{
    core::candidate::CandidateKind,
    utils::{normalize_whitespace, slugify},
};

const TEXT_SLUG_WORDS: usize = 4;
const PREVIEW_CHARS: usize = 40;
const FIELD_SEPARATOR: &str = "\u{1f}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyGeneratorOptions {
    pub namespace: String,
    pub hash_length: usize,
    pub dedupe_by_value: bool,
}

impl Default for KeyGeneratorOptions {
    fn default() -> Self {
        Self {
            namespace: "app".to_string(),
            hash_length: 6,
            dedupe_by_value: false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct KeyContext<'a> {
    pub file_path: &'a str,
    pub kind: CandidateKind,
    pub attribute: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedKey {
    pub key: String,
    pub hash: String,
    /// Shortened text for display.
    pub preview: String,
}

#[derive(Debug)]
pub struct KeyGenerator {
    options: KeyGeneratorOptions,
    /// Emitted hash -> normalized text it is bound to.
    emitted: Mutex<HashMap<String, String>>,
}

impl KeyGenerator {
    pub fn new(options: KeyGeneratorOptions) -> Self {
        Self {
            options,
            emitted: Mutex::new(HashMap::new()),
        }
    }

    pub fn options(&self) -> &KeyGeneratorOptions {
        &self.options
    }

    /// Forgets all hash bindings. Subsequent keys are as if from a fresh run.
    pub fn reset(&self) {
        self.emitted.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    pub fn generate(&self, text: &str, context: KeyContext<'_>) -> GeneratedKey {
        let text = normalize_whitespace(text);
        let base = self.base_hash(&text, context);
        let hash = self.bind(base, &text);

        let scope = if self.options.dedupe_by_value {
            String::new()
        } else {
            scope_slug(context.file_path, context.attribute)
        };
        let text_slug = slugify(&text, Some(TEXT_SLUG_WORDS));

        let key = [
            self.options.namespace.as_str(),
            scope.as_str(),
            text_slug.as_str(),
            hash.as_str(),
        ]
        .into_iter()
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join(".");

        GeneratedKey {
            key,
            hash,
            preview: preview(&text),
        }
    }

    /// The unsuffixed hash for `text` in `context`.
    pub fn base_hash(&self, text: &str, context: KeyContext<'_>) -> String {
        let text = normalize_whitespace(text);
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        if !self.options.dedupe_by_value {
            hasher.update(FIELD_SEPARATOR);
            hasher.update(context.kind.as_str());
            hasher.update(FIELD_SEPARATOR);
            hasher.update(context.attribute.unwrap_or_default());
            hasher.update(FIELD_SEPARATOR);
            hasher.update(normalize_path(context.file_path));
        }
        let digest = format!("{:x}", hasher.finalize());
        let length = self.options.hash_length.clamp(1, digest.len());
        digest[..length].to_string()
    }

    fn bind(&self, base: String, text: &str) -> String {
        let mut emitted = self.emitted.lock().unwrap_or_else(|e| e.into_inner());

        let mut candidate = base.clone();
        let mut suffix = 2;
        loop {
            match emitted.get(&candidate) {
                Some(bound) if bound == text => return candidate,
                Some(_) => {
                    candidate = format!("{}{}", base, suffix);
                    suffix += 1;
                }
                None => {
                    emitted.insert(candidate.clone(), text.to_string());
                    return candidate;
                }
            }
        }
    }
}

fn normalize_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    path.trim_start_matches("./").to_string()
}

/// Slug for the file basename (without extension) plus the attribute name.
fn scope_slug(file_path: &str, attribute: Option<&str>) -> String {
    let stem = Path::new(file_path)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match attribute {
        Some(attribute) => slugify(&format!("{} {}", stem, attribute), None),
        None => slugify(&stem, None),
    }
}

fn preview(text: &str) -> String {
    if text.chars().count() <= PREVIEW_CHARS {
        return text.to_string();
    }
    let mut preview: String = text.chars().take(PREVIEW_CHARS).collect();
    preview.push('…');
    preview
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn context(file_path: &str) -> KeyContext<'_> {
        KeyContext {
            file_path,
            kind: CandidateKind::StaticText,
            attribute: None,
        }
    }

    #[test]
    fn test_key_shape() {
        let keygen = KeyGenerator::new(KeyGeneratorOptions::default());
        let generated = keygen.generate("  Sign in to   continue  ", context("src/LoginForm.tsx"));

        assert_eq!(generated.hash.len(), 6);
        assert_eq!(
            generated.key,
            format!("app.login_form.sign_in_to_continue.{}", generated.hash)
        );
        assert_eq!(generated.preview, "Sign in to continue");
    }

    #[test]
    fn test_attribute_is_part_of_scope() {
        let keygen = KeyGenerator::new(KeyGeneratorOptions::default());
        let generated = keygen.generate(
            "Search",
            KeyContext {
                file_path: "src/Header.tsx",
                kind: CandidateKind::AttributeValue,
                attribute: Some("aria-label"),
            },
        );
        assert!(generated.key.starts_with("app.header_aria_label.search."));
    }

    #[test]
    fn test_empty_segments_are_omitted() {
        let keygen = KeyGenerator::new(KeyGeneratorOptions {
            dedupe_by_value: true,
            ..Default::default()
        });
        let generated = keygen.generate("你好世界", context("src/App.tsx"));
        assert_eq!(generated.key, format!("app.{}", generated.hash));
    }

    #[test]
    fn test_generation_is_deterministic() {
        let keygen = KeyGenerator::new(KeyGeneratorOptions::default());
        let first = keygen.generate("Save changes", context("src/Editor.tsx"));
        let second = keygen.generate("Save   changes", context("./src/Editor.tsx"));
        assert_eq!(first, second);

        let other_file = keygen.generate("Save changes", context("src/Settings.tsx"));
        assert_ne!(first.hash, other_file.hash);
    }

    #[test]
    fn test_dedupe_by_value_ignores_scope() {
        let keygen = KeyGenerator::new(KeyGeneratorOptions {
            dedupe_by_value: true,
            ..Default::default()
        });
        let a = keygen.generate("Cancel", context("src/A.tsx"));
        let b = keygen.generate("Cancel", context("src/deep/B.vue"));
        assert_eq!(a, b);
        assert_eq!(a.key, format!("app.cancel.{}", a.hash));
    }

    #[test]
    fn test_colliding_hashes_get_suffixes() {
        // 17 texts over a 16-symbol alphabet: at least two must share a base hash.
        let keygen = KeyGenerator::new(KeyGeneratorOptions {
            hash_length: 1,
            ..Default::default()
        });
        let ctx = context("src/App.tsx");
        let texts: Vec<String> = (0..17).map(|i| format!("Message number {}", i)).collect();

        let mut by_base: HashMap<String, &str> = HashMap::new();
        let mut pair = None;
        for text in &texts {
            let base = keygen.base_hash(text, ctx);
            if let Some(first) = by_base.get(&base) {
                pair = Some((*first, text.as_str(), base));
                break;
            }
            by_base.insert(base, text);
        }
        let (first, second, base) = pair.expect("pigeonhole guarantees a collision");

        let run = |keygen: &KeyGenerator| {
            let a = keygen.generate(first, ctx);
            let b = keygen.generate(second, ctx);
            let a_again = keygen.generate(first, ctx);
            (a, b, a_again)
        };

        let (a, b, a_again) = run(&keygen);
        assert_eq!(a.hash, base);
        assert_eq!(b.hash, format!("{}2", base));
        assert_eq!(a_again, a);
        assert_ne!(a.key, b.key);

        keygen.reset();
        let (a2, b2, _) = run(&keygen);
        assert_eq!(a2, a);
        assert_eq!(b2, b);
    }

    #[test]
    fn test_preview_is_truncated() {
        let long = "word ".repeat(20);
        let preview = preview(&normalize_whitespace(&long));
        assert_eq!(preview.chars().count(), PREVIEW_CHARS + 1);
        assert!(preview.ends_with('…'));
    }
}
