//! Fix command - replace hardcoded text with translation calls.
//!
//! Every pending candidate is rewritten into an access call using its
//! suggested key. Candidates whose span no longer matches the file are
//! skipped and reported.
//!
//! Use `--apply` to actually rewrite files (default is dry-run mode).

use anyhow::Result;
use colored::Colorize;

use super::super::{args::FixCommand, exit_status::ExitStatus, report};
use super::helper::{load_context, scan_options};
use crate::core::{
    CandidateStatus, ExtractContext, FileChange,
    adapters::{SourceAdapter, mutate::replacement},
};

#[derive(Debug, Default, PartialEq, Eq)]
struct FixStats {
    applied: usize,
    skipped: usize,
    files: usize,
}

impl FixStats {
    fn of(changes: &[FileChange]) -> Self {
        let mut stats = Self::default();
        for change in changes {
            let statuses = change.result.candidates.iter().map(|c| c.status);
            for status in statuses {
                match status {
                    CandidateStatus::Applied => stats.applied += 1,
                    CandidateStatus::Skipped => stats.skipped += 1,
                    CandidateStatus::Pending | CandidateStatus::Existing => {}
                }
            }
            if change.result.changed {
                stats.files += 1;
            }
        }
        stats
    }
}

pub fn fix(cmd: FixCommand) -> Result<ExitStatus> {
    let verbose = cmd.common.verbose;
    let ctx = load_context(&cmd.common)?;
    let files = ctx.discover();
    let scan_report = ctx.scan(&files, &scan_options(&ctx));
    report::print_diagnostics(&scan_report.diagnostics, verbose);

    if scan_report.pending_count() == 0 {
        report::print_no_pending(scan_report.files_scanned);
        return Ok(ExitStatus::Success);
    }

    let changes = ctx.apply(&scan_report, |_| true)?;
    let stats = FixStats::of(&changes);
    let mutate_diagnostics: Vec<_> = changes
        .iter()
        .flat_map(|change| change.result.diagnostics.iter().cloned())
        .collect();
    report::print_diagnostics(&mutate_diagnostics, verbose);

    if cmd.apply {
        let written = ctx.write_changes(&changes)?;
        println!(
            "{} {} candidate(s) in {} file(s).",
            "Replaced".green().bold(),
            stats.applied,
            written
        );
        if stats.skipped > 0 {
            println!("  - skipped: {} candidate(s) whose span changed", stats.skipped);
        }
    } else {
        print_preview(&ctx, &changes);
        println!(
            "{} {} candidate(s) in {} file(s).",
            "Would replace".yellow().bold(),
            stats.applied,
            stats.files
        );
        println!("Run with {} to rewrite these files.", "--apply".cyan());
    }

    Ok(ExitStatus::Success)
}

/// Prints planned replacements, one block per candidate.
fn print_preview(ctx: &ExtractContext, changes: &[FileChange]) {
    for change in changes {
        let Some(adapter) = ctx.registry().resolve(&change.file_path) else {
            continue;
        };
        let dialect = adapter.dialect();
        let call_name = dialect.call_name(&ctx.options().translation_fn);

        for tc in &change.result.candidates {
            if tc.status != CandidateStatus::Applied {
                continue;
            }
            let candidate = &tc.candidate;
            println!(
                "  {} {}:{}:{}",
                "-->".blue(),
                candidate.file_path,
                candidate.position.line,
                candidate.position.column + 1
            );
            println!("   {} {}", "-".red(), candidate.source_text.red());
            println!(
                "   {} {}",
                "+".green(),
                replacement(dialect, &call_name, candidate).green()
            );
            println!();
        }
    }
}
