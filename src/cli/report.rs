//! Report formatting and printing utilities.
//!
//! Candidates, dynamic key warnings and diagnostics are shown in
//! cargo-style format. Separate from core logic to allow glotx to be used
//! as a library.

use std::{
    collections::{BTreeSet, HashMap},
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use colored::Colorize;
use unicode_width::UnicodeWidthStr;

use crate::core::{
    ScanReport, TransformCandidate,
    candidate::{DynamicKeyReason, DynamicKeyWarning, Position},
    diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink},
};

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

/// Print pending candidates and dynamic key warnings to stdout.
pub fn print_scan(root: &Path, report: &ScanReport) {
    print_scan_to(root, report, &mut io::stdout().lock());
}

/// Print a scan report to a custom writer.
pub fn print_scan_to<W: Write>(root: &Path, report: &ScanReport, writer: &mut W) {
    let pending: Vec<&TransformCandidate> = report.pending().collect();
    if pending.is_empty() && report.dynamic_key_warnings.is_empty() {
        print_no_pending_to(report.files_scanned, writer);
        return;
    }

    let max_line_width = pending
        .iter()
        .map(|c| c.candidate.position.line)
        .chain(report.dynamic_key_warnings.iter().map(|w| w.position.line))
        .max()
        .map(|n| n.to_string().len())
        .unwrap_or(1);

    let mut sources = SourceLines::new(root);
    for tc in &pending {
        print_candidate(tc, &mut sources, writer, max_line_width);
    }
    for warning in &report.dynamic_key_warnings {
        print_dynamic_key(warning, &mut sources, writer, max_line_width);
    }

    print_summary(report, &pending, writer);
}

/// Print a success message when nothing is left to extract.
pub fn print_no_pending(files_scanned: usize) {
    print_no_pending_to(files_scanned, &mut io::stdout().lock());
}

pub fn print_no_pending_to<W: Write>(files_scanned: usize, writer: &mut W) {
    let _ = writeln!(
        writer,
        "{} {}",
        SUCCESS_MARK.green(),
        format!(
            "Scanned {} source {} - no hardcoded text found",
            files_scanned,
            if files_scanned == 1 { "file" } else { "files" }
        )
        .green()
    );
}

/// Print diagnostics to stderr.
///
/// Parser-unavailable diagnostics are shown once per file type. Cache
/// discards are only shown in verbose mode.
pub fn print_diagnostics(diagnostics: &[Diagnostic], verbose: bool) {
    print_diagnostics_to(diagnostics, verbose, &mut io::stderr().lock());
}

pub fn print_diagnostics_to<W: Write>(diagnostics: &[Diagnostic], verbose: bool, writer: &mut W) {
    let sink = DiagnosticSink::new();
    for diagnostic in sink.filter(diagnostics) {
        if diagnostic.kind == DiagnosticKind::CacheDiscarded {
            if verbose {
                let _ = writeln!(
                    writer,
                    "{} cache discarded: {}",
                    "note:".bold(),
                    diagnostic.message
                );
            }
            continue;
        }

        let _ = writeln!(
            writer,
            "{}: {}  {}",
            "warning".bold().yellow(),
            diagnostic.message,
            diagnostic.kind.to_string().dimmed().cyan()
        );
        match diagnostic.line {
            Some(line) => {
                let _ = writeln!(writer, "  {} {}:{}", "-->".blue(), diagnostic.file_path, line);
            }
            None => {
                let _ = writeln!(writer, "  {} {}", "-->".blue(), diagnostic.file_path);
            }
        }
    }
}

// ============================================================
// Internal Functions
// ============================================================

fn print_candidate<W: Write>(
    tc: &TransformCandidate,
    sources: &mut SourceLines,
    writer: &mut W,
    max_line_width: usize,
) {
    let candidate = &tc.candidate;
    let _ = writeln!(
        writer,
        "{}: \"{}\"  {}",
        "warning".bold().yellow(),
        candidate.text,
        candidate.kind.to_string().dimmed().cyan()
    );
    print_location(
        &candidate.file_path,
        candidate.position,
        sources,
        writer,
        max_line_width,
    );

    if let Some(interpolation) = &candidate.interpolation {
        print_note(writer, max_line_width, "template:", &interpolation.template);
    }
    print_note(writer, max_line_width, "key:", &candidate.suggested_key);
    let _ = writeln!(writer);
}

fn print_dynamic_key<W: Write>(
    warning: &DynamicKeyWarning,
    sources: &mut SourceLines,
    writer: &mut W,
    max_line_width: usize,
) {
    let _ = writeln!(
        writer,
        "{}: dynamic key `{}`  {}",
        "warning".bold().yellow(),
        warning.expression,
        "dynamic-key".dimmed().cyan()
    );
    print_location(&warning.file_path, warning.position, sources, writer, max_line_width);

    let note = match warning.reason {
        DynamicKeyReason::Template => "key is built from a template literal",
        DynamicKeyReason::Binary => "key is built by string concatenation",
        DynamicKeyReason::Expression => "key is computed at runtime",
    };
    print_note(writer, max_line_width, "note:", note);
    let _ = writeln!(writer);
}

/// `--> path:line:col` plus the source line and a caret under the column.
fn print_location<W: Write>(
    file_path: &str,
    position: Position,
    sources: &mut SourceLines,
    writer: &mut W,
    max_line_width: usize,
) {
    let col = position.column + 1;
    let _ = writeln!(
        writer,
        "  {} {}:{}:{}",
        "-->".blue(),
        file_path,
        position.line,
        col
    );

    let Some(source_line) = sources.line(file_path, position.line) else {
        return;
    };
    let _ = writeln!(writer, "{:>width$} {}", "", "|".blue(), width = max_line_width);
    let _ = writeln!(
        writer,
        "{:>width$} {} {}",
        position.line.to_string().blue(),
        "|".blue(),
        source_line,
        width = max_line_width
    );

    let prefix: String = source_line.chars().take(position.column).collect();
    let caret_padding = UnicodeWidthStr::width(prefix.as_str());
    let _ = writeln!(
        writer,
        "{:>width$} {} {:>padding$}{}",
        "",
        "|".blue(),
        "",
        "^".yellow(),
        width = max_line_width,
        padding = caret_padding
    );
}

fn print_note<W: Write>(writer: &mut W, max_line_width: usize, label: &str, text: &str) {
    let _ = writeln!(
        writer,
        "{:>width$} {} {} {}",
        "",
        "=".blue(),
        label.bold(),
        text,
        width = max_line_width
    );
}

fn print_summary<W: Write>(report: &ScanReport, pending: &[&TransformCandidate], writer: &mut W) {
    let files: BTreeSet<&str> = pending
        .iter()
        .map(|c| c.candidate.file_path.as_str())
        .collect();
    let dynamic = report.dynamic_key_warnings.len();

    let _ = writeln!(
        writer,
        "{} {} pending {} in {} {}, {} dynamic {}",
        FAILURE_MARK.red(),
        pending.len(),
        if pending.len() == 1 { "candidate" } else { "candidates" },
        files.len(),
        if files.len() == 1 { "file" } else { "files" },
        dynamic,
        if dynamic == 1 { "key" } else { "keys" }
    );
    let existing = report.existing_count();
    if existing > 0 {
        let _ = writeln!(writer, "  {} already translated", existing);
    }
}

/// Lazily loaded source files for context lines.
struct SourceLines {
    root: PathBuf,
    files: HashMap<String, Option<Vec<String>>>,
}

impl SourceLines {
    fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            files: HashMap::new(),
        }
    }

    fn line(&mut self, file_path: &str, line: usize) -> Option<String> {
        let root = &self.root;
        let lines = self.files.entry(file_path.to_string()).or_insert_with(|| {
            fs::read_to_string(root.join(file_path))
                .ok()
                .map(|content| content.lines().map(str::to_string).collect())
        });
        lines.as_ref()?.get(line.checked_sub(1)?).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::candidate::{Candidate, CandidateKind, CandidateStatus, SpanKind};
    use tempfile::TempDir;

    fn strip_ansi(s: &str) -> String {
        let mut result = String::new();
        let mut chars = s.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '\x1b' {
                while let Some(&next) = chars.peek() {
                    chars.next();
                    if next == 'm' {
                        break;
                    }
                }
            } else {
                result.push(c);
            }
        }
        result
    }

    fn candidate(text: &str, line: usize, column: usize, status: CandidateStatus) -> TransformCandidate {
        TransformCandidate {
            candidate: Candidate {
                id: format!("src/App.tsx:{}:static-text", column),
                kind: CandidateKind::StaticText,
                file_path: "src/App.tsx".to_string(),
                text: text.to_string(),
                position: Position::new(line, column),
                byte_range: None,
                source_text: text.to_string(),
                span_kind: SpanKind::Markup,
                context: None,
                interpolation: None,
                suggested_key: "app.app.welcome.abc123".to_string(),
                hash: "abc123".to_string(),
            },
            status,
        }
    }

    fn render(root: &Path, report: &ScanReport) -> String {
        let mut output = Vec::new();
        print_scan_to(root, report, &mut output);
        strip_ansi(&String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_report_without_pending_prints_success() {
        let report = ScanReport {
            files_scanned: 3,
            ..Default::default()
        };
        let output = render(Path::new("."), &report);
        assert_eq!(output, "✓ Scanned 3 source files - no hardcoded text found\n");
    }

    #[test]
    fn test_report_candidate_with_source_context() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/App.tsx"), "const A = () => <h1>Welcome</h1>;\n").unwrap();

        let report = ScanReport {
            candidates: vec![
                candidate("Welcome", 1, 20, CandidateStatus::Pending),
                candidate("Ignored", 1, 0, CandidateStatus::Existing),
            ],
            files_scanned: 1,
            ..Default::default()
        };
        let output = render(dir.path(), &report);

        assert!(output.contains("warning: \"Welcome\"  static-text"));
        assert!(output.contains("  --> src/App.tsx:1:21"));
        assert!(output.contains("1 | const A = () => <h1>Welcome</h1>;"));
        assert!(output.contains(&format!(" | {}^", " ".repeat(20))));
        assert!(output.contains("= key: app.app.welcome.abc123"));
        assert!(output.contains("✘ 1 pending candidate in 1 file, 0 dynamic keys"));
        assert!(output.contains("1 already translated"));
        assert!(!output.contains("\"Ignored\""));
    }

    #[test]
    fn test_report_dynamic_key() {
        let report = ScanReport {
            dynamic_key_warnings: vec![DynamicKeyWarning {
                file_path: "src/missing.tsx".to_string(),
                position: Position::new(4, 2),
                expression: "`${prefix}.title`".to_string(),
                reason: DynamicKeyReason::Template,
            }],
            ..Default::default()
        };
        let output = render(Path::new("."), &report);

        assert!(output.contains("warning: dynamic key `${prefix}.title`"));
        assert!(output.contains("--> src/missing.tsx:4:3"));
        assert!(output.contains("note: key is built from a template literal"));
        assert!(output.contains("0 pending candidates in 0 files, 1 dynamic key"));
    }

    #[test]
    fn test_diagnostics_are_deduplicated_and_cache_notes_need_verbose() {
        let diagnostics = vec![
            Diagnostic::new("a.vue", DiagnosticKind::ParserUnavailable, "no vue template parser available"),
            Diagnostic::new("b.vue", DiagnosticKind::ParserUnavailable, "no vue template parser available"),
            Diagnostic::new("c.tsx", DiagnosticKind::ParseFailed, "Unexpected token").with_line(Some(3)),
            Diagnostic::new(".glotx-cache.json", DiagnosticKind::CacheDiscarded, "schema version 0 does not match 1"),
        ];

        let mut output = Vec::new();
        print_diagnostics_to(&diagnostics, false, &mut output);
        let output = strip_ansi(&String::from_utf8(output).unwrap());
        assert_eq!(output.matches("parser-unavailable").count(), 1);
        assert!(output.contains("--> c.tsx:3"));
        assert!(!output.contains("cache discarded"));

        let mut verbose = Vec::new();
        print_diagnostics_to(&diagnostics, true, &mut verbose);
        let verbose = strip_ansi(&String::from_utf8(verbose).unwrap());
        assert!(verbose.contains("note: cache discarded: schema version 0 does not match 1"));
    }
}
