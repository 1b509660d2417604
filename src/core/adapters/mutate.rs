//! Applies approved candidates back into file content.

use std::ops::Range;

use crate::core::{
    adapters::{Dialect, MutateResult},
    candidate::{Candidate, TransformCandidate},
    diagnostics::{Diagnostic, DiagnosticKind},
    merge::render_call,
    options::ExtractOptions,
    position::LineIndex,
    rewrite::{Edit, RewriteError, apply_edits},
};

/// Rewrites every pending candidate whose span can still be found.
///
/// Candidates that cannot be located, or whose span overlaps one that was
/// already accepted, are marked skipped with an `unlocatable-span`
/// diagnostic. Candidates in any other status pass through unchanged.
pub fn mutate(
    dialect: Dialect,
    file_path: &str,
    content: &str,
    mut candidates: Vec<TransformCandidate>,
    options: &ExtractOptions,
) -> Result<MutateResult, RewriteError> {
    let lines = LineIndex::new(content);
    let call_name = dialect.call_name(&options.translation_fn);
    let mut diagnostics = Vec::new();

    let mut located: Vec<(usize, Range<usize>)> = Vec::new();
    for (index, tc) in candidates.iter_mut().enumerate() {
        if !tc.is_pending() {
            continue;
        }
        match locate(content, &lines, &tc.candidate) {
            Some(range) => located.push((index, range)),
            None => {
                tc.mark_skipped();
                diagnostics.push(unlocatable(file_path, &tc.candidate, "span no longer matches the file"));
            }
        }
    }

    located.sort_by_key(|(index, range)| (range.start, range.end, *index));
    let mut accepted: Vec<(usize, Range<usize>)> = Vec::new();
    for (index, range) in located {
        let overlaps = accepted
            .last()
            .is_some_and(|(_, previous)| range.start < previous.end);
        if overlaps {
            let tc = &mut candidates[index];
            tc.mark_skipped();
            diagnostics.push(unlocatable(
                file_path,
                &tc.candidate,
                "span overlaps another approved candidate",
            ));
        } else {
            accepted.push((index, range));
        }
    }

    let edits: Vec<Edit> = accepted
        .iter()
        .map(|(index, range)| {
            let candidate = &candidates[*index].candidate;
            Edit::new(range.start, range.end, replacement(dialect, &call_name, candidate))
        })
        .collect();

    let result = apply_edits(content, edits)?;
    for (index, _) in &accepted {
        candidates[*index].mark_applied();
    }

    Ok(MutateResult {
        changed: !result.edits.is_empty(),
        new_content: result.content,
        edits: result.edits,
        candidates,
        diagnostics,
    })
}

/// The text that replaces a candidate's span.
pub fn replacement(dialect: Dialect, call_name: &str, candidate: &Candidate) -> String {
    let variables = candidate
        .interpolation
        .as_ref()
        .map(|interpolation| interpolation.variables.as_slice())
        .unwrap_or_default();
    let call = render_call(call_name, &candidate.suggested_key, variables);
    dialect.render(candidate.span_kind, &call, candidate.context.as_deref())
}

/// Finds the candidate's span in `content`.
///
/// The stored byte range wins when it still covers the scanned text. Then
/// the line/column position is tried, and finally a unique textual match.
fn locate(content: &str, lines: &LineIndex, candidate: &Candidate) -> Option<Range<usize>> {
    let source = candidate.source_text.as_str();
    if source.is_empty() {
        return None;
    }

    if let Some(range) = candidate.byte_range
        && range.slice(content) == Some(source)
    {
        return Some(range.start..range.end);
    }

    if let Some(start) = lines.offset(content, candidate.position)
        && content.get(start..).is_some_and(|rest| rest.starts_with(source))
    {
        return Some(start..start + source.len());
    }

    let mut matches = content.match_indices(source);
    match (matches.next(), matches.next()) {
        (Some((start, _)), None) => Some(start..start + source.len()),
        _ => None,
    }
}

fn unlocatable(file_path: &str, candidate: &Candidate, reason: &str) -> Diagnostic {
    Diagnostic::new(
        file_path,
        DiagnosticKind::UnlocatableSpan,
        format!("skipped \"{}\": {}", candidate.text, reason),
    )
    .with_line(Some(candidate.position.line))
}
