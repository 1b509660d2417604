//! Structured, per-file diagnostics for recoverable failures.
//!
//! Nothing in the extraction core aborts a run because of a single file.
//! Instead, problems are recorded as [`Diagnostic`]s attached to the file
//! they concern. A run-owned [`DiagnosticSink`] decides which of them are
//! worth printing (some classes are only shown once per run).

use std::{collections::HashSet, sync::Mutex};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// No structural parser is available for the file's dialect.
    ParserUnavailable,
    /// The structural parser rejected the file.
    ParseFailed,
    /// Unbalanced interpolation delimiters or similar.
    MalformedInput,
    /// An approved candidate's span no longer matches the content.
    UnlocatableSpan,
    /// The fingerprint cache was ignored and everything was rescanned.
    CacheDiscarded,
}

impl std::fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiagnosticKind::ParserUnavailable => write!(f, "parser-unavailable"),
            DiagnosticKind::ParseFailed => write!(f, "parse-failed"),
            DiagnosticKind::MalformedInput => write!(f, "malformed-input"),
            DiagnosticKind::UnlocatableSpan => write!(f, "unlocatable-span"),
            DiagnosticKind::CacheDiscarded => write!(f, "cache-discarded"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub file_path: String,
    pub kind: DiagnosticKind,
    pub message: String,
    /// Suspected 1-based line, when one can be pointed at.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl Diagnostic {
    pub fn new(file_path: impl Into<String>, kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            kind,
            message: message.into(),
            line: None,
        }
    }

    pub fn with_line(mut self, line: Option<usize>) -> Self {
        self.line = line;
        self
    }

    /// Key used to collapse repeated diagnostics of the warn-once class.
    fn dedupe_key(&self) -> String {
        match self.kind {
            // One warning per missing dialect parser, not one per file.
            DiagnosticKind::ParserUnavailable => std::path::Path::new(&self.file_path)
                .extension()
                .map(|e| e.to_string_lossy().to_lowercase())
                .unwrap_or_default(),
            _ => format!("{}:{:?}:{}", self.file_path, self.line, self.message),
        }
    }
}

/// Caller-owned deduplicating sink.
///
/// Replaces process-wide "warn once" flags: a sink lives exactly as long as
/// the run that owns it.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    seen: Mutex<HashSet<(DiagnosticKind, String)>>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true the first time an equivalent diagnostic is offered.
    pub fn first_occurrence(&self, diagnostic: &Diagnostic) -> bool {
        let mut seen = self.seen.lock().unwrap_or_else(|e| e.into_inner());
        seen.insert((diagnostic.kind, diagnostic.dedupe_key()))
    }

    /// Filters `diagnostics` down to the ones that should be shown to the user.
    pub fn filter<'a>(&self, diagnostics: impl IntoIterator<Item = &'a Diagnostic>) -> Vec<&'a Diagnostic> {
        diagnostics
            .into_iter()
            .filter(|d| self.first_occurrence(d))
            .collect()
    }
}
