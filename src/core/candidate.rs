//! Extraction candidates and their lifecycle.
//!
//! A [`Candidate`] is produced by a source adapter's scan. Once the caller
//! starts approving and applying candidates, each one is wrapped into a
//! [`TransformCandidate`] which tracks a forward-only [`CandidateStatus`].

use serde::{Deserialize, Serialize};

// ============================================================
// Kinds and positions
// ============================================================

/// Where a candidate's text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CandidateKind {
    /// Plain markup text or a string literal in a rendered expression.
    StaticText,
    /// The value of a translatable attribute.
    AttributeValue,
    /// A run of static and dynamic siblings merged into one template.
    MergedExpression,
    /// A literal that is already the key argument of an access call.
    ExistingCallLiteral,
}

impl CandidateKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CandidateKind::StaticText => "static-text",
            CandidateKind::AttributeValue => "attribute-value",
            CandidateKind::MergedExpression => "merged-expression",
            CandidateKind::ExistingCallLiteral => "existing-call-literal",
        }
    }
}

impl std::fmt::Display for CandidateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Human-facing position: 1-based line, 0-based column (in characters).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Half-open byte range `[start, end)` into the file content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn overlaps(&self, other: &ByteRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// The slice of `content` covered by this range, if it is valid.
    pub fn slice<'a>(&self, content: &'a str) -> Option<&'a str> {
        content.get(self.start..self.end)
    }
}

/// How the on-disk span must be rewritten.
///
/// The span kind is decided by the dialect at scan time so that the
/// rewriter never has to re-inspect the syntax around a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpanKind {
    /// Markup text: the call must be wrapped in the dialect's interpolation syntax.
    Markup,
    /// Already inside an expression: the bare call replaces the span.
    Code,
    /// A quoted attribute value: replaced by an expression-valued attribute value.
    AttributeValue,
    /// A whole `name="value"` attribute: replaced by a bound attribute.
    Attribute,
}

// ============================================================
// Interpolation
// ============================================================

/// A named placeholder and the source expression it stands for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub expression: String,
}

impl Variable {
    pub fn new(name: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expression: expression.into(),
        }
    }
}

/// Interpolation data attached to merged candidates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interpolation {
    /// Template using the generic `{name}` placeholder form.
    pub template: String,
    /// Ordered placeholder bindings, unique by name.
    pub variables: Vec<Variable>,
    /// Static text only, used as key input.
    pub key_text: String,
    /// Template rendered in the catalog's placeholder syntax.
    pub locale_value: String,
}

impl Interpolation {
    /// Checks that every `{name}` in the template has exactly one variable and vice versa.
    pub fn is_consistent(&self) -> bool {
        let mut names = crate::core::merge::placeholder_names(&self.template);
        names.sort_unstable();
        names.dedup();

        let mut declared: Vec<&str> = self.variables.iter().map(|v| v.name.as_str()).collect();
        let declared_len = declared.len();
        declared.sort_unstable();
        declared.dedup();

        declared.len() == declared_len && names == declared
    }
}

// ============================================================
// Candidate
// ============================================================

/// The unit of extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Dedup key within one scan: `file:offset:kind`.
    pub id: String,
    pub kind: CandidateKind,
    pub file_path: String,
    /// Final, merged and whitespace-normalized text.
    pub text: String,
    pub position: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub byte_range: Option<ByteRange>,
    /// Exact content covered by `byte_range` at scan time.
    pub source_text: String,
    pub span_kind: SpanKind,
    /// Attribute or prop name the text came from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpolation: Option<Interpolation>,
    pub suggested_key: String,
    pub hash: String,
}

impl Candidate {
    pub fn make_id(file_path: &str, offset: usize, kind: CandidateKind) -> String {
        format!("{}:{}:{}", file_path, offset, kind)
    }

    /// Text used as key-generator input (static parts only for merged candidates).
    pub fn key_text(&self) -> &str {
        match &self.interpolation {
            Some(interpolation) => &interpolation.key_text,
            None => &self.text,
        }
    }

    /// Byte offset used for ordering candidates within a file.
    pub fn offset(&self) -> usize {
        self.byte_range.map(|r| r.start).unwrap_or_default()
    }

    pub fn is_existing(&self) -> bool {
        self.kind == CandidateKind::ExistingCallLiteral
    }
}

// ============================================================
// Transform lifecycle
// ============================================================

/// Lifecycle status of a candidate. Only ever advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CandidateStatus {
    Pending,
    Existing,
    Applied,
    Skipped,
}

impl std::fmt::Display for CandidateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CandidateStatus::Pending => write!(f, "pending"),
            CandidateStatus::Existing => write!(f, "existing"),
            CandidateStatus::Applied => write!(f, "applied"),
            CandidateStatus::Skipped => write!(f, "skipped"),
        }
    }
}

/// A candidate plus its transform status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformCandidate {
    #[serde(flatten)]
    pub candidate: Candidate,
    pub status: CandidateStatus,
}

impl TransformCandidate {
    /// Wraps a freshly scanned candidate. Existing access-call literals start as `existing`.
    pub fn from_scan(candidate: Candidate) -> Self {
        let status = if candidate.is_existing() {
            CandidateStatus::Existing
        } else {
            CandidateStatus::Pending
        };
        Self { candidate, status }
    }

    pub fn is_pending(&self) -> bool {
        self.status == CandidateStatus::Pending
    }

    /// Moves `pending` to `applied`. Returns false if the transition is not allowed.
    pub fn mark_applied(&mut self) -> bool {
        self.advance(CandidateStatus::Applied)
    }

    /// Moves `pending` to `skipped`. Returns false if the transition is not allowed.
    pub fn mark_skipped(&mut self) -> bool {
        self.advance(CandidateStatus::Skipped)
    }

    fn advance(&mut self, next: CandidateStatus) -> bool {
        let allowed = matches!(
            (self.status, next),
            (
                CandidateStatus::Pending,
                CandidateStatus::Applied | CandidateStatus::Skipped
            )
        );
        if allowed {
            self.status = next;
        }
        allowed
    }
}

// ============================================================
// Dynamic key warnings
// ============================================================

/// Why an access call's key argument could not be resolved to a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DynamicKeyReason {
    /// Template literal with expressions: `` t(`items.${kind}`) ``
    Template,
    /// String concatenation: `t('items.' + kind)`
    Binary,
    /// Any other expression: `t(keyName)`
    Expression,
}

impl std::fmt::Display for DynamicKeyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DynamicKeyReason::Template => write!(f, "template"),
            DynamicKeyReason::Binary => write!(f, "binary"),
            DynamicKeyReason::Expression => write!(f, "expression"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicKeyWarning {
    pub file_path: String,
    pub position: Position,
    pub expression: String,
    pub reason: DynamicKeyReason,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(kind: CandidateKind) -> Candidate {
        Candidate {
            id: Candidate::make_id("src/app.tsx", 10, kind),
            kind,
            file_path: "src/app.tsx".to_string(),
            text: "Hello".to_string(),
            position: Position::new(1, 10),
            byte_range: Some(ByteRange::new(10, 15)),
            source_text: "Hello".to_string(),
            span_kind: SpanKind::Markup,
            context: None,
            interpolation: None,
            suggested_key: "app.app.hello.abc123".to_string(),
            hash: "abc123".to_string(),
        }
    }

    #[test]
    fn test_status_only_advances_forward() {
        let mut tc = TransformCandidate::from_scan(candidate(CandidateKind::StaticText));
        assert_eq!(tc.status, CandidateStatus::Pending);

        assert!(tc.mark_applied());
        assert_eq!(tc.status, CandidateStatus::Applied);

        // Cannot go back or sideways once applied
        assert!(!tc.mark_skipped());
        assert_eq!(tc.status, CandidateStatus::Applied);
    }

    #[test]
    fn test_existing_candidates_are_never_applied() {
        let mut tc = TransformCandidate::from_scan(candidate(CandidateKind::ExistingCallLiteral));
        assert_eq!(tc.status, CandidateStatus::Existing);
        assert!(!tc.mark_applied());
        assert!(!tc.mark_skipped());
        assert_eq!(tc.status, CandidateStatus::Existing);
    }

    #[test]
    fn test_interpolation_consistency() {
        let ok = Interpolation {
            template: "Hello {name}, you have {count} messages".to_string(),
            variables: vec![
                Variable::new("name", "user.name"),
                Variable::new("count", "count"),
            ],
            key_text: "Hello you have messages".to_string(),
            locale_value: "Hello {name}, you have {count} messages".to_string(),
        };
        assert!(ok.is_consistent());

        let missing = Interpolation {
            variables: vec![Variable::new("name", "user.name")],
            ..ok.clone()
        };
        assert!(!missing.is_consistent());

        let duplicated = Interpolation {
            variables: vec![
                Variable::new("name", "user.name"),
                Variable::new("name", "other.name"),
                Variable::new("count", "count"),
            ],
            ..ok
        };
        assert!(!duplicated.is_consistent());
    }

    #[test]
    fn test_candidate_serializes_camel_case() {
        let json = serde_json::to_value(candidate(CandidateKind::AttributeValue)).unwrap();
        assert_eq!(json["kind"], "attribute-value");
        assert_eq!(json["spanKind"], "markup");
        assert_eq!(json["byteRange"]["start"], 10);
        assert!(json.get("interpolation").is_none());
    }

    #[test]
    fn test_byte_range_overlap() {
        let a = ByteRange::new(0, 5);
        assert!(a.overlaps(&ByteRange::new(4, 8)));
        assert!(!a.overlaps(&ByteRange::new(5, 8)));
        assert_eq!(a.slice("Hello world"), Some("Hello"));
        assert_eq!(ByteRange::new(8, 40).slice("Hello world"), None);
    }
}
