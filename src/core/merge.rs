//! Adjacency merging of static and dynamic siblings into one template.
//!
//! A run such as `Hello, {user.name}! You have {count} messages` arrives as
//! an ordered list of [`Fragment`]s. When every dynamic fragment is a simple
//! reference the run is merged into a single interpolation template with
//! named placeholders; otherwise the merge is refused and the caller handles
//! each sibling on its own.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
    core::candidate::{Interpolation, Variable},
    utils::{contains_alphabetic, normalize_whitespace},
};

/// One sibling in an adjacency run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// Literal text, whitespace preserved as in the source.
    Static(String),
    /// Source text of an embedded expression.
    Dynamic(String),
    /// A nested element or any structure that cannot become part of a template.
    Nested,
}

impl Fragment {
    pub fn is_dynamic(&self) -> bool {
        matches!(self, Fragment::Dynamic(_))
    }
}

/// Placeholder syntax of the target catalog format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceholderStyle {
    /// `{name}`
    #[default]
    Icu,
    /// `{{name}}`
    I18next,
}

impl PlaceholderStyle {
    pub fn render(self, name: &str) -> String {
        match self {
            PlaceholderStyle::Icu => format!("{{{}}}", name),
            PlaceholderStyle::I18next => format!("{{{{{}}}}}", name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeRefusal {
    ContainsNestedStructure,
    ComplexExpression,
}

impl std::fmt::Display for MergeRefusal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MergeRefusal::ContainsNestedStructure => write!(f, "contains-nested-structure"),
            MergeRefusal::ComplexExpression => write!(f, "complex-expression"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedTemplate {
    /// Template with generic `{name}` placeholders, whitespace normalized.
    pub template: String,
    /// Static parts only, used as key-generator input.
    pub key_text: String,
    /// Template in the catalog's placeholder syntax.
    pub locale_value: String,
    pub variables: Vec<Variable>,
    /// Whether any static fragment carried actual text.
    pub has_static: bool,
}

impl MergedTemplate {
    /// The call expression that replaces the run, or `None` if the run had
    /// no static content worth translating.
    pub fn replacement(&self, translation_fn: &str, key: &str) -> Option<String> {
        self.has_static
            .then(|| render_call(translation_fn, key, &self.variables))
    }

    pub fn into_interpolation(self) -> Interpolation {
        Interpolation {
            template: self.template,
            variables: self.variables,
            key_text: self.key_text,
            locale_value: self.locale_value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    Merged(MergedTemplate),
    Refused(MergeRefusal),
}

impl MergeOutcome {
    pub fn can_merge(&self) -> bool {
        matches!(self, MergeOutcome::Merged(_))
    }
}

// ============================================================
// Expressions
// ============================================================

const CHAIN: &str = concat!(
    r"[A-Za-z_$][\w$]*",
    r#"(?:\??\.[A-Za-z_$][\w$]*|\[(?:\d+|[A-Za-z_$][\w$.]*|'[^']*'|"[^"]*")\])*"#,
);

static SIMPLE_EXPRESSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"^{}$", CHAIN)).unwrap());

/// A formatting method call on a simple chain with literal arguments only.
static FORMATTING_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r#"^({})\s*\.\s*(?:join|toString|toFixed|toLocaleString|toUpperCase|toLowerCase|trim)\(\s*(?:'[^']*'|"[^"]*"|\d+(?:\.\d+)?)?\s*\)$"#,
        CHAIN
    ))
    .unwrap()
});

static TRAILING_PROPERTY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\??\.([A-Za-z_$][\w$]*)$").unwrap());

static TRAILING_INDEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Za-z_$][\w$]*)\[[^\[\]]+\]$").unwrap());

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z_$][\w$]*$").unwrap());

/// Returns the reference a simple(-enough) expression reads from.
///
/// Identifiers, property chains and index accesses are simple. A
/// formatting call such as `items.join(', ')` on a simple chain is treated
/// as simple too and named after its receiver. Anything else is complex.
pub fn simple_reference(expression: &str) -> Option<&str> {
    let expression = strip_wrapping_parens(expression.trim());
    if SIMPLE_EXPRESSION.is_match(expression) {
        return Some(expression);
    }
    FORMATTING_CALL
        .captures(expression)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn strip_wrapping_parens(mut expression: &str) -> &str {
    while let Some(inner) = expression
        .strip_prefix('(')
        .and_then(|e| e.strip_suffix(')'))
    {
        if inner.contains(['(', ')']) {
            break;
        }
        expression = inner.trim();
    }
    expression
}

/// Placeholder name for a simple reference, or `None` if none can be derived.
///
/// `user` -> `user`, `user.name` -> `name`, `users[i]` -> `userItem`.
pub fn placeholder_name(reference: &str) -> Option<String> {
    let name = if IDENTIFIER.is_match(reference) {
        reference.to_string()
    } else if let Some(caps) = TRAILING_PROPERTY.captures(reference) {
        caps[1].to_string()
    } else if let Some(caps) = TRAILING_INDEX.captures(reference) {
        format!("{}Item", singularize(&caps[1]))
    } else {
        return None;
    };

    let name = name.trim_start_matches('$').to_string();
    (IDENTIFIER.is_match(&name) && name != "this").then_some(name)
}

fn singularize(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("ies") {
        return format!("{}y", stem);
    }
    if word.len() > 2
        && !word.ends_with("ss")
        && let Some(stem) = word.strip_suffix('s')
    {
        return stem.to_string();
    }
    word.to_string()
}

/// Names of all `{name}` placeholders in a template, in order of appearance.
pub fn placeholder_names(template: &str) -> Vec<&str> {
    static PLACEHOLDER: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\{([A-Za-z_$][\w$]*)\}").unwrap());

    PLACEHOLDER
        .captures_iter(template)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}

// ============================================================
// Run heuristics
// ============================================================

/// True if the text has a token with at least two letters.
pub fn is_meaningful(text: &str) -> bool {
    text.split_whitespace()
        .any(|token| token.chars().filter(|c| c.is_alphabetic()).count() >= 2)
}

/// A lone label followed only by values, such as `User name: {userName}`.
///
/// Such runs are not merged: the label is extracted on its own and the
/// value stays as-is.
pub fn is_label_value_run(fragments: &[Fragment]) -> bool {
    let statics: Vec<&str> = fragments
        .iter()
        .filter_map(|f| match f {
            Fragment::Static(s) if !s.trim().is_empty() => Some(s.as_str()),
            _ => None,
        })
        .collect();

    let [label] = statics.as_slice() else {
        return false;
    };
    let first_text = fragments
        .iter()
        .position(|f| matches!(f, Fragment::Static(s) if !s.trim().is_empty()));
    let first_dynamic = fragments.iter().position(Fragment::is_dynamic);

    label.trim_end().ends_with(':')
        && matches!((first_text, first_dynamic), (Some(t), Some(d)) if t < d)
}

/// True if the run has what it takes to become one merged candidate.
pub fn should_merge(fragments: &[Fragment]) -> bool {
    let has_dynamic = fragments.iter().any(Fragment::is_dynamic);
    let has_meaningful_static = fragments
        .iter()
        .any(|f| matches!(f, Fragment::Static(s) if is_meaningful(s)));
    has_dynamic && has_meaningful_static && !is_label_value_run(fragments)
}

// ============================================================
// Merge
// ============================================================

const OPENING: &[char] = &['(', '[', '«', '“', '‘'];
const CLOSING: &[char] = &[')', ']', ',', '.', ';', ':', '!', '?', '»', '”', '’', '…', '%'];

#[derive(Debug)]
enum Piece {
    Text(String),
    Placeholder(String),
}

/// Merges an adjacency run.
pub fn merge(fragments: &[Fragment], style: PlaceholderStyle) -> MergeOutcome {
    if fragments.iter().any(|f| matches!(f, Fragment::Nested)) {
        return MergeOutcome::Refused(MergeRefusal::ContainsNestedStructure);
    }

    let mut variables: Vec<Variable> = Vec::new();
    let mut pieces: Vec<Piece> = Vec::new();
    let mut dynamic_index = 0;

    for fragment in fragments {
        match fragment {
            Fragment::Static(text) => pieces.push(Piece::Text(collapse_whitespace(text))),
            Fragment::Dynamic(expression) => {
                dynamic_index += 1;
                let Some(reference) = simple_reference(expression) else {
                    return MergeOutcome::Refused(MergeRefusal::ComplexExpression);
                };
                let expression = expression.trim().to_string();
                let name = bind_variable(&mut variables, reference, expression, dynamic_index);
                pieces.push(Piece::Placeholder(name));
            }
            Fragment::Nested => return MergeOutcome::Refused(MergeRefusal::ContainsNestedStructure),
        }
    }

    strip_placeholder_brackets(&mut pieces);

    let template = join_pieces(&pieces, PlaceholderStyle::Icu);
    let locale_value = match style {
        PlaceholderStyle::Icu => template.clone(),
        PlaceholderStyle::I18next => join_pieces(&pieces, style),
    };
    let key_text = key_text(&pieces);
    let has_static = pieces
        .iter()
        .any(|p| matches!(p, Piece::Text(t) if contains_alphabetic(t)));

    MergeOutcome::Merged(MergedTemplate {
        template,
        key_text,
        locale_value,
        variables,
        has_static,
    })
}

/// Binds `expression` to a placeholder name, reusing the binding when the
/// same expression appears twice and suffixing clashing names.
fn bind_variable(variables: &mut Vec<Variable>, reference: &str, expression: String, index: usize) -> String {
    if let Some(existing) = variables.iter().find(|v| v.expression == expression) {
        return existing.name.clone();
    }

    let base = placeholder_name(reference).unwrap_or_else(|| format!("var{}", index));
    let mut name = base.clone();
    let mut suffix = 2;
    while variables.iter().any(|v| v.name == name) {
        name = format!("{}{}", base, suffix);
        suffix += 1;
    }

    variables.push(Variable::new(name.clone(), expression));
    name
}

/// Collapses whitespace runs to one space, keeping a single boundary space.
fn collapse_whitespace(text: &str) -> String {
    let mut collapsed = String::with_capacity(text.len());
    if text.starts_with(char::is_whitespace) {
        collapsed.push(' ');
    }
    collapsed.push_str(&normalize_whitespace(text));
    if text.ends_with(char::is_whitespace) && !collapsed.ends_with(' ') {
        collapsed.push(' ');
    }
    collapsed
}

/// Drops a bracket that directly encloses a placeholder, as in `Items ({count})`.
///
/// The opener is only removed when its matching closer immediately follows
/// the placeholder.
fn strip_placeholder_brackets(pieces: &mut [Piece]) {
    for i in 1..pieces.len().saturating_sub(1) {
        if !matches!(pieces[i], Piece::Placeholder(_)) {
            continue;
        }
        let (before, rest) = pieces.split_at_mut(i);
        let (Piece::Text(left), Piece::Text(right)) = (&mut before[i - 1], &mut rest[1]) else {
            continue;
        };

        let left_trimmed = left.trim_end();
        let Some(opener) = left_trimmed.chars().last() else {
            continue;
        };
        let closer = match opener {
            '(' => ')',
            '[' => ']',
            _ => continue,
        };
        if !right.trim_start().starts_with(closer) {
            continue;
        }

        let new_left = left_trimmed[..left_trimmed.len() - opener.len_utf8()].to_string();
        let right_trimmed = right.trim_start();
        let new_right = right_trimmed[closer.len_utf8()..].to_string();
        *left = if new_left.trim().is_empty() {
            new_left.trim().to_string()
        } else {
            format!("{} ", new_left.trim_end())
        };
        *right = new_right;
    }
}

fn join_pieces(pieces: &[Piece], style: PlaceholderStyle) -> String {
    let mut out = String::new();
    for piece in pieces {
        let next = match piece {
            Piece::Text(text) => text.clone(),
            Piece::Placeholder(name) => style.render(name),
        };
        push_joined(&mut out, &next);
    }
    normalize_whitespace(&out)
}

/// Appends `next`, never leaving a space before closing punctuation or
/// after opening punctuation.
fn push_joined(out: &mut String, next: &str) {
    if next.is_empty() {
        return;
    }
    let mut next = next;
    if next.trim_start().starts_with(CLOSING) {
        out.truncate(out.trim_end().len());
        next = next.trim_start();
    }
    if out.trim_end().ends_with(OPENING) && out.ends_with(' ') {
        out.truncate(out.trim_end().len());
    }
    if out.ends_with(OPENING) {
        next = next.trim_start();
    }
    if out.ends_with(' ') && next.starts_with(' ') {
        next = &next[1..];
    }
    out.push_str(next);
}

/// Static text only, with punctuation that touched a placeholder trimmed.
fn key_text(pieces: &[Piece]) -> String {
    let mut parts: Vec<String> = Vec::new();
    for (i, piece) in pieces.iter().enumerate() {
        let Piece::Text(text) = piece else { continue };
        let mut part = normalize_whitespace(text);

        let placeholder_before = i > 0 && matches!(pieces[i - 1], Piece::Placeholder(_));
        let placeholder_after = matches!(pieces.get(i + 1), Some(Piece::Placeholder(_)));
        if placeholder_after {
            part = part.trim_end_matches(OPENING).trim_end().to_string();
        }
        if placeholder_before {
            part = part.trim_start_matches(CLOSING).trim_start().to_string();
        }

        if part.chars().any(char::is_alphanumeric) {
            parts.push(part);
        }
    }
    normalize_whitespace(&parts.join(" "))
}

/// Renders `fn('key')` or `fn('key', { a, b: expr })`.
pub fn render_call(translation_fn: &str, key: &str, variables: &[Variable]) -> String {
    let key = key.replace('\\', "\\\\").replace('\'', "\\'");
    if variables.is_empty() {
        return format!("{}('{}')", translation_fn, key);
    }

    let entries: Vec<String> = variables
        .iter()
        .map(|v| {
            if v.name == v.expression {
                v.name.clone()
            } else {
                format!("{}: {}", v.name, v.expression)
            }
        })
        .collect();
    format!("{}('{}', {{ {} }})", translation_fn, key, entries.join(", "))
}
