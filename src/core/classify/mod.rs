//! Text classification: translatable prose versus code, markup or styling noise.
//!
//! [`TextClassifier::classify`] is a pure function of the text and the
//! optional attribute context. Rules are applied in a fixed order and the
//! first match wins:
//!
//! 1. empty text
//! 2. operator deny-list (`ignoreTexts` and `denyPatterns`)
//! 3. operator allow-list (`allowPatterns`), when non-empty
//! 4. single character
//! 5. structural shapes (URLs, literals, code, utility classes, ...)
//! 6. attribute context (non-text attributes, input types, link paths)
//! 7. no Unicode letters
//!
//! Structural rejections come before context rules, so an attribute name
//! never rescues text that already looks like styling or code.

pub mod patterns;

use std::collections::HashSet;

use anyhow::{Context, Result};
use regex::Regex;
use serde::Serialize;

use crate::utils::{contains_alphabetic, normalize_whitespace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    Empty,
    DenyPattern,
    AllowPatternMismatch,
    SingleCharacter,
    Url,
    Literal,
    HtmlEntity,
    CssVariable,
    NumericUnit,
    RepeatedPunctuation,
    CodeFragment,
    UtilityClass,
    SvgPath,
    IconIdentifier,
    Constant,
    Identifier,
    CatalogKey,
    FontFamily,
    KeywordToken,
    NonTextAttribute,
    InputType,
    RelativePath,
    NoLetters,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            SkipReason::Empty => "empty",
            SkipReason::DenyPattern => "deny-pattern",
            SkipReason::AllowPatternMismatch => "allow-pattern-mismatch",
            SkipReason::SingleCharacter => "single-character",
            SkipReason::Url => "url",
            SkipReason::Literal => "literal",
            SkipReason::HtmlEntity => "html-entity",
            SkipReason::CssVariable => "css-variable",
            SkipReason::NumericUnit => "numeric-unit",
            SkipReason::RepeatedPunctuation => "repeated-punctuation",
            SkipReason::CodeFragment => "code-fragment",
            SkipReason::UtilityClass => "utility-class",
            SkipReason::SvgPath => "svg-path",
            SkipReason::IconIdentifier => "icon-identifier",
            SkipReason::Constant => "constant",
            SkipReason::Identifier => "identifier",
            SkipReason::CatalogKey => "catalog-key",
            SkipReason::FontFamily => "font-family",
            SkipReason::KeywordToken => "keyword-token",
            SkipReason::NonTextAttribute => "non-text-attribute",
            SkipReason::InputType => "input-type",
            SkipReason::RelativePath => "relative-path",
            SkipReason::NoLetters => "no-letters",
        }
    }

    /// True for reasons that come from the shape of the text itself.
    pub fn is_structural(self) -> bool {
        !matches!(
            self,
            SkipReason::Empty
                | SkipReason::DenyPattern
                | SkipReason::AllowPatternMismatch
                | SkipReason::SingleCharacter
                | SkipReason::NonTextAttribute
                | SkipReason::InputType
                | SkipReason::RelativePath
                | SkipReason::NoLetters
        )
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Extract,
    Skip(SkipReason),
}

impl Verdict {
    pub fn is_extract(self) -> bool {
        matches!(self, Verdict::Extract)
    }

    pub fn reason(self) -> Option<SkipReason> {
        match self {
            Verdict::Extract => None,
            Verdict::Skip(reason) => Some(reason),
        }
    }
}

/// Decides whether a piece of text is translatable.
#[derive(Debug, Clone, Default)]
pub struct TextClassifier {
    deny: Vec<Regex>,
    allow: Vec<Regex>,
    ignore_texts: HashSet<String>,
}

impl TextClassifier {
    /// Builds a classifier from raw operator patterns.
    ///
    /// Returns an error naming the first pattern that fails to compile.
    pub fn new(deny_patterns: &[String], allow_patterns: &[String], ignore_texts: &[String]) -> Result<Self> {
        Ok(Self {
            deny: compile_all(deny_patterns, "denyPatterns")?,
            allow: compile_all(allow_patterns, "allowPatterns")?,
            ignore_texts: ignore_texts.iter().map(|t| normalize_whitespace(t)).collect(),
        })
    }

    pub fn classify(&self, text: &str, context: Option<&str>) -> Verdict {
        let text = normalize_whitespace(text);
        if text.is_empty() {
            return Verdict::Skip(SkipReason::Empty);
        }

        if self.ignore_texts.contains(&text) || self.deny.iter().any(|re| re.is_match(&text)) {
            return Verdict::Skip(SkipReason::DenyPattern);
        }

        if !self.allow.is_empty() && !self.allow.iter().any(|re| re.is_match(&text)) {
            return Verdict::Skip(SkipReason::AllowPatternMismatch);
        }

        if text.chars().count() == 1 {
            return Verdict::Skip(SkipReason::SingleCharacter);
        }

        if let Some(reason) = patterns::structural_rejection(&text) {
            return Verdict::Skip(reason);
        }

        if let Some(attribute) = context
            && let Some(reason) = patterns::context_rejection(attribute, &text)
        {
            return Verdict::Skip(reason);
        }

        if !contains_alphabetic(&text) {
            return Verdict::Skip(SkipReason::NoLetters);
        }

        Verdict::Extract
    }
}

fn compile_all(patterns: &[String], field: &str) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| Regex::new(p).with_context(|| format!("Invalid regex in {}: {}", field, p)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> TextClassifier {
        TextClassifier::default()
    }

    #[test]
    fn test_accepts_prose() {
        let c = classifier();
        assert_eq!(c.classify("Hello, world!", None), Verdict::Extract);
        assert_eq!(c.classify("  Sign in\n   to continue ", None), Verdict::Extract);
        assert_eq!(c.classify("欢迎回来", None), Verdict::Extract);
        assert_eq!(c.classify("Enter your email", Some("placeholder")), Verdict::Extract);
    }

    #[test]
    fn test_rule_order() {
        let c = classifier();
        assert_eq!(c.classify("   ", None), Verdict::Skip(SkipReason::Empty));
        assert_eq!(c.classify("A", None), Verdict::Skip(SkipReason::SingleCharacter));
        assert_eq!(c.classify("42", None), Verdict::Skip(SkipReason::NoLetters));
        assert_eq!(c.classify("—", None), Verdict::Skip(SkipReason::SingleCharacter));
        assert_eq!(c.classify("$1,000", None), Verdict::Skip(SkipReason::NoLetters));
    }

    #[test]
    fn test_deny_and_allow_patterns() {
        let c = TextClassifier::new(
            &["^TODO".to_string()],
            &["[A-Z]".to_string()],
            &["Lorem ipsum".to_string()],
        )
        .unwrap();

        assert_eq!(c.classify("TODO fix me", None), Verdict::Skip(SkipReason::DenyPattern));
        assert_eq!(c.classify("Lorem   ipsum", None), Verdict::Skip(SkipReason::DenyPattern));
        assert_eq!(
            c.classify("no capitals here", None),
            Verdict::Skip(SkipReason::AllowPatternMismatch)
        );
        assert_eq!(c.classify("Welcome back", None), Verdict::Extract);
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let err = TextClassifier::new(&["(".to_string()], &[], &[]).unwrap_err();
        assert!(err.to_string().contains("denyPatterns"));
    }

    #[test]
    fn test_structural_rejection_is_not_overridden_by_context() {
        let c = classifier();
        let text = "flex items-center gap-2";
        assert_eq!(c.classify(text, Some("class")), Verdict::Skip(SkipReason::UtilityClass));
        assert_eq!(c.classify(text, Some("title")), Verdict::Skip(SkipReason::UtilityClass));
    }

    #[test]
    fn test_context_rules() {
        let c = classifier();
        assert_eq!(
            c.classify("Main content", Some("style")),
            Verdict::Skip(SkipReason::NonTextAttribute)
        );
        assert_eq!(c.classify("email", Some("type")), Verdict::Skip(SkipReason::InputType));
        assert_eq!(c.classify("email", Some("aria-label")), Verdict::Extract);
        assert_eq!(
            c.classify("docs/getting-started", Some("href")),
            Verdict::Skip(SkipReason::RelativePath)
        );
    }

    #[test]
    fn test_classification_is_stable() {
        let c = classifier();
        for text in ["Save changes", "userName", "12px", "Loading...", "https://x.dev"] {
            for context in [None, Some("title"), Some("class")] {
                assert_eq!(c.classify(text, context), c.classify(text, context));
            }
        }
    }
}
