use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Ok, Result, bail};
use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::merge::PlaceholderStyle;

pub const CONFIG_FILE_NAME: &str = ".glotxrc.json";

pub const TEST_FILE_PATTERNS: &[&str] = &[
    "**/*.test.tsx",
    "**/*.test.ts",
    "**/*.test.jsx",
    "**/*.test.js",
    "**/*.spec.tsx",
    "**/*.spec.ts",
    "**/*.spec.jsx",
    "**/*.spec.js",
    "**/__tests__/**",
];

pub const MAX_HASH_LENGTH: usize = 64;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub includes: Vec<String>,
    #[serde(default = "default_ignores")]
    pub ignores: Vec<String>,
    #[serde(default = "default_ignore_test_files")]
    pub ignore_test_files: bool,
    #[serde(default = "default_source_root")]
    pub source_root: String,
    #[serde(default = "default_translate_attributes")]
    pub translate_attributes: Vec<String>,
    #[serde(default = "default_no_translate_attributes")]
    pub no_translate_attributes: Vec<String>,
    #[serde(default = "default_translate_attribute_suffixes")]
    pub translate_attribute_suffixes: Vec<String>,
    #[serde(default = "default_no_translate_attribute_suffixes")]
    pub no_translate_attribute_suffixes: Vec<String>,
    #[serde(default)]
    pub ignore_texts: Vec<String>,
    #[serde(default)]
    pub allow_patterns: Vec<String>,
    #[serde(default)]
    pub deny_patterns: Vec<String>,
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default = "default_hash_length")]
    pub hash_length: usize,
    #[serde(default = "default_translation_fn")]
    pub translation_fn: String,
    #[serde(default = "default_recognized_calls")]
    pub recognized_calls: Vec<String>,
    #[serde(default)]
    pub dedupe_by_value: bool,
    #[serde(default)]
    pub placeholder_style: PlaceholderStyle,
    #[serde(default = "default_cache")]
    pub cache: bool,
    #[serde(default = "default_cache_file")]
    pub cache_file: String,
}

fn default_ignores() -> Vec<String> {
    ["**/node_modules/**", "**/dist/**", "**/build/**"]
        .map(String::from)
        .to_vec()
}

fn default_ignore_test_files() -> bool {
    true
}

fn default_source_root() -> String {
    "./".to_string()
}

fn default_translate_attributes() -> Vec<String> {
    [
        "placeholder",
        "title",
        "alt",
        "label",
        "aria-label",
        "aria-description",
        "aria-placeholder",
        "aria-roledescription",
        "aria-valuetext",
    ]
    .map(String::from)
    .to_vec()
}

fn default_no_translate_attributes() -> Vec<String> {
    ["id", "key", "name", "data-testid"].map(String::from).to_vec()
}

fn default_translate_attribute_suffixes() -> Vec<String> {
    ["Label", "Text", "Title", "Placeholder", "Message"]
        .map(String::from)
        .to_vec()
}

fn default_no_translate_attribute_suffixes() -> Vec<String> {
    ["ClassName", "Id", "Key", "Url", "Icon"].map(String::from).to_vec()
}

fn default_namespace() -> String {
    "app".to_string()
}

fn default_hash_length() -> usize {
    6
}

fn default_translation_fn() -> String {
    "t".to_string()
}

fn default_recognized_calls() -> Vec<String> {
    ["t", "$t", "i18n.t"].map(String::from).to_vec()
}

fn default_cache() -> bool {
    true
}

fn default_cache_file() -> String {
    ".glotx-cache.json".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            includes: Vec::new(),
            ignores: default_ignores(),
            ignore_test_files: default_ignore_test_files(),
            source_root: default_source_root(),
            translate_attributes: default_translate_attributes(),
            no_translate_attributes: default_no_translate_attributes(),
            translate_attribute_suffixes: default_translate_attribute_suffixes(),
            no_translate_attribute_suffixes: default_no_translate_attribute_suffixes(),
            ignore_texts: Vec::new(),
            allow_patterns: Vec::new(),
            deny_patterns: Vec::new(),
            namespace: default_namespace(),
            hash_length: default_hash_length(),
            translation_fn: default_translation_fn(),
            recognized_calls: default_recognized_calls(),
            dedupe_by_value: false,
            placeholder_style: PlaceholderStyle::default(),
            cache: default_cache(),
            cache_file: default_cache_file(),
        }
    }
}

impl Config {
    /// Validate configuration values.
    ///
    /// Returns an error naming the offending field for invalid glob patterns,
    /// invalid regexes, an out-of-range hash length or an empty access function.
    pub fn validate(&self) -> Result<()> {
        for pattern in &self.ignores {
            Pattern::new(pattern)
                .with_context(|| format!("Invalid glob pattern in 'ignores': \"{}\"", pattern))?;
        }

        // Includes without wildcards are literal directory paths.
        for pattern in &self.includes {
            if pattern.contains('*') || pattern.contains('?') {
                Pattern::new(pattern).with_context(|| {
                    format!("Invalid glob pattern in 'includes': \"{}\"", pattern)
                })?;
            }
        }

        for (field, patterns) in [
            ("allowPatterns", &self.allow_patterns),
            ("denyPatterns", &self.deny_patterns),
        ] {
            for pattern in patterns {
                Regex::new(pattern)
                    .with_context(|| format!("Invalid regex in '{}': \"{}\"", field, pattern))?;
            }
        }

        if !(1..=MAX_HASH_LENGTH).contains(&self.hash_length) {
            bail!(
                "Invalid value in 'hashLength': {} (expected 1..={})",
                self.hash_length,
                MAX_HASH_LENGTH
            );
        }

        if self.translation_fn.trim().is_empty() {
            bail!("Invalid value in 'translationFn': must not be empty");
        }

        Ok(())
    }
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// True if config was loaded from a file, false if using defaults.
    pub from_file: bool,
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            config.validate()?;
            Ok(ConfigLoadResult {
                config,
                from_file: true,
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            from_file: false,
        }),
    }
}
