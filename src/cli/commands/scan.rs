//! Scan command - report hardcoded translatable text.
//!
//! Exits with 1 while pending candidates remain so the command can gate CI.

use anyhow::{Context, Result};

use super::super::{args::ScanCommand, exit_status::ExitStatus, report};
use super::helper::{load_context, scan_options};

pub fn scan(cmd: ScanCommand) -> Result<ExitStatus> {
    let ctx = load_context(&cmd.common)?;
    let files = ctx.discover();
    let scan_report = ctx.scan(&files, &scan_options(&ctx));

    if cmd.json {
        let json = serde_json::to_string_pretty(&scan_report).context("Failed to serialize report")?;
        println!("{}", json);
    } else {
        report::print_diagnostics(&scan_report.diagnostics, cmd.common.verbose);
        report::print_scan(&ctx.root_dir, &scan_report);
    }

    if scan_report.pending_count() > 0 {
        Ok(ExitStatus::Failure)
    } else {
        Ok(ExitStatus::Success)
    }
}
