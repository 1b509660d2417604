//! Conservative extractor for files without a usable tree.
//!
//! Works on raw text with regexes. Only plain text between tags (without
//! any interpolation) and static attribute values of translatable
//! attributes are extracted; `<script>`, `<style>` and HTML comments are
//! skipped entirely. Existing access calls are still recognized so that
//! already rewritten spans are reported as existing.

use std::{
    collections::HashSet,
    ops::Range,
    sync::LazyLock,
};

use regex::Regex;

use crate::{
    core::{
        adapters::{Dialect, ScanContext, ScanOutput},
        candidate::{ByteRange, Candidate, CandidateKind, SpanKind},
        keygen::KeyContext,
        position::LineIndex,
    },
    utils::normalize_whitespace,
};

static EXCLUDED_REGION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>|<!--.*?-->").unwrap()
});

static TEXT_BETWEEN_TAGS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r">([^<>{}]+)<").unwrap());

/// JSX text must follow a real opening or closing tag; comparison and arrow
/// operators in the surrounding code are not tag boundaries.
static JSX_TEXT_AFTER_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:<[A-Za-z][\w.:-]*(?:\s[^<>]*?)?/?|</[A-Za-z][\w.:-]*\s*)>([^<>{}]+)").unwrap()
});

static OPENING_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[A-Za-z][\w.:-]*(\s[^<>]*?)?/?>").unwrap());

static STATIC_ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:^|\s)([A-Za-z_][\w.:-]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap()
});

pub fn scan(dialect: Dialect, file_path: &str, content: &str, ctx: &ScanContext<'_>) -> ScanOutput {
    let mut extractor = Extractor {
        dialect,
        file_path,
        content,
        ctx: *ctx,
        lines: LineIndex::new(content),
        excluded: excluded_regions(content),
        output: ScanOutput::default(),
        seen: HashSet::new(),
    };
    extractor.texts();
    extractor.attributes();
    extractor.existing_calls();

    let mut output = extractor.output;
    output.normalize();
    output
}

/// 1-based line of the first unbalanced interpolation delimiter, if any.
pub fn find_unbalanced_line(dialect: Dialect, content: &str) -> Option<usize> {
    let (open, close) = dialect.interpolation_delimiters();
    let excluded = excluded_regions(content);

    let mut stack: Vec<usize> = Vec::new();
    let mut offset = 0;
    while offset < content.len() {
        if let Some(region) = excluded.iter().find(|r| r.contains(&offset)) {
            offset = region.end;
            continue;
        }
        let rest = &content[offset..];
        if rest.starts_with(open) {
            stack.push(offset);
            offset += open.len();
        } else if rest.starts_with(close) {
            if stack.pop().is_none() {
                return Some(crate::utils::line_of_offset(content, offset));
            }
            offset += close.len();
        } else {
            offset += rest.chars().next().map_or(1, char::len_utf8);
        }
    }
    stack
        .first()
        .map(|&offset| crate::utils::line_of_offset(content, offset))
}

fn excluded_regions(content: &str) -> Vec<Range<usize>> {
    EXCLUDED_REGION
        .find_iter(content)
        .map(|m| m.start()..m.end())
        .collect()
}

/// An opening `<` glued to an identifier is a type argument (`Array<string>`).
fn opens_markup(content: &str, tag_start: usize) -> bool {
    if content[tag_start..].starts_with("</") {
        return true;
    }
    !content[..tag_start]
        .chars()
        .next_back()
        .is_some_and(|c| c.is_alphanumeric() || matches!(c, '_' | '$' | '.' | ')' | ']'))
}

/// The run must end right before another tag, not before `< limit`.
fn closes_markup(content: &str, end: usize) -> bool {
    let mut rest = content[end..].chars();
    rest.next() == Some('<') && rest.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '/')
}

struct Extractor<'a> {
    dialect: Dialect,
    file_path: &'a str,
    content: &'a str,
    ctx: ScanContext<'a>,
    lines: LineIndex,
    excluded: Vec<Range<usize>>,
    output: ScanOutput,
    seen: HashSet<String>,
}

impl Extractor<'_> {
    fn is_excluded(&self, offset: usize) -> bool {
        self.excluded.iter().any(|r| r.contains(&offset))
    }

    fn texts(&mut self) {
        let content = self.content;
        let runs: Vec<Range<usize>> = match self.dialect {
            Dialect::Jsx => {
                // End of the last accepted run; a tag starting there is markup even
                // when glued to a word (`item<br/>`).
                let mut markup_end = None;
                JSX_TEXT_AFTER_TAG
                    .captures_iter(content)
                    .filter_map(|caps| {
                        let (tag, text) = (caps.get(0)?, caps.get(1)?);
                        let opens = markup_end == Some(tag.start()) || opens_markup(content, tag.start());
                        if !(opens && closes_markup(content, text.end())) {
                            return None;
                        }
                        markup_end = Some(text.end());
                        Some(text.range())
                    })
                    .collect()
            }
            Dialect::Vue | Dialect::Svelte => TEXT_BETWEEN_TAGS
                .captures_iter(content)
                .filter_map(|caps| caps.get(1).map(|m| m.range()))
                .collect(),
        };

        for run in runs {
            if self.is_excluded(run.start) {
                continue;
            }
            let raw = &content[run.clone()];
            let start = run.start + (raw.len() - raw.trim_start().len());
            let end = run.start + raw.trim_end().len();
            if start >= end {
                continue;
            }

            let text = normalize_whitespace(raw);
            if !self.ctx.classifier.classify(&text, None).is_extract() {
                continue;
            }
            self.push(CandidateKind::StaticText, start..end, text, SpanKind::Markup, None);
        }
    }

    fn attributes(&mut self) {
        let content = self.content;
        for tag in OPENING_TAG.captures_iter(content) {
            let Some(attrs) = tag.get(1) else { continue };
            if self.is_excluded(attrs.start()) {
                continue;
            }
            for caps in STATIC_ATTRIBUTE.captures_iter(attrs.as_str()) {
                let (Some(name), Some(value)) = (caps.get(1), caps.get(2).or_else(|| caps.get(3))) else {
                    continue;
                };
                let name_str = name.as_str();
                if name_str.starts_with("v-") || !self.ctx.options.attributes.is_translatable(name_str) {
                    continue;
                }
                let value_str = value.as_str();
                if !self.ctx.classifier.classify(value_str, Some(name_str)).is_extract() {
                    continue;
                }

                let base = attrs.start();
                // The value match excludes the quotes; widen by one on each side.
                let (range, span_kind) = match self.dialect.attribute_span_kind() {
                    SpanKind::Attribute => (base + name.start()..base + value.end() + 1, SpanKind::Attribute),
                    span_kind => (base + value.start() - 1..base + value.end() + 1, span_kind),
                };
                self.push(
                    CandidateKind::AttributeValue,
                    range,
                    normalize_whitespace(value_str),
                    span_kind,
                    Some(name_str),
                );
            }
        }
    }

    fn existing_calls(&mut self) {
        let Some(re) = self.ctx.options.existing_call() else {
            return;
        };
        let content = self.content;
        for caps in re.captures_iter(content) {
            let Some(literal) = caps.get(1).or_else(|| caps.get(2)) else {
                continue;
            };
            let range = literal.start() - 1..literal.end() + 1;
            let mut candidate = self.candidate(
                CandidateKind::ExistingCallLiteral,
                range,
                literal.as_str().to_string(),
                SpanKind::Code,
                None,
            );
            candidate.suggested_key = literal.as_str().to_string();
            self.insert(candidate);
        }
    }

    fn push(
        &mut self,
        kind: CandidateKind,
        range: Range<usize>,
        text: String,
        span_kind: SpanKind,
        attribute: Option<&str>,
    ) {
        let generated = self.ctx.keygen.generate(
            &text,
            KeyContext {
                file_path: self.file_path,
                kind,
                attribute,
            },
        );
        let mut candidate = self.candidate(kind, range, text, span_kind, attribute);
        candidate.suggested_key = generated.key;
        candidate.hash = generated.hash;
        self.insert(candidate);
    }

    fn candidate(
        &self,
        kind: CandidateKind,
        range: Range<usize>,
        text: String,
        span_kind: SpanKind,
        attribute: Option<&str>,
    ) -> Candidate {
        Candidate {
            id: Candidate::make_id(self.file_path, range.start, kind),
            kind,
            file_path: self.file_path.to_string(),
            text,
            position: self.lines.position(self.content, range.start),
            byte_range: Some(ByteRange::new(range.start, range.end)),
            source_text: self.content.get(range).unwrap_or_default().to_string(),
            span_kind,
            context: attribute.map(str::to_string),
            interpolation: None,
            suggested_key: String::new(),
            hash: String::new(),
        }
    }

    fn insert(&mut self, candidate: Candidate) {
        if self.seen.insert(candidate.id.clone()) {
            self.output.candidates.push(candidate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        classify::TextClassifier,
        keygen::{KeyGenerator, KeyGeneratorOptions},
        options::{AttributePolicy, ExtractOptions},
    };
    use pretty_assertions::assert_eq;

    fn scan_with(dialect: Dialect, file_path: &str, content: &str) -> ScanOutput {
        let classifier = TextClassifier::default();
        let keygen = KeyGenerator::new(KeyGeneratorOptions::default());
        let options = ExtractOptions::new(
            "t",
            vec!["t".to_string(), "$t".to_string()],
            AttributePolicy::new(&["title".to_string(), "placeholder".to_string()], &[], &[], &[]),
            Default::default(),
        );
        let ctx = ScanContext {
            classifier: &classifier,
            keygen: &keygen,
            options: &options,
        };
        scan(dialect, file_path, content, &ctx)
    }

    const VUE: &str = r#"<template>
  <div class="flex items-center gap-2">
    <h1 title="Main heading">Welcome to the dashboard</h1>
    <p>Hello {{ user.name }}</p>
    <span>{{ $t('app.dashboard.saved.abc123') }}</span>
    <!-- <p>Commented out text</p> -->
  </div>
</template>

<script setup>
const label = '<b>Not markup text</b>'
</script>

<style scoped>
.title > .hint { color: red }
</style>
"#;

    #[test]
    fn test_vue_fallback_extraction() {
        let output = scan_with(Dialect::Vue, "src/Dashboard.vue", VUE);
        let found: Vec<(&str, CandidateKind, SpanKind)> = output
            .candidates
            .iter()
            .map(|c| (c.text.as_str(), c.kind, c.span_kind))
            .collect();

        assert_eq!(
            found,
            vec![
                ("Main heading", CandidateKind::AttributeValue, SpanKind::Attribute),
                ("Welcome to the dashboard", CandidateKind::StaticText, SpanKind::Markup),
                ("app.dashboard.saved.abc123", CandidateKind::ExistingCallLiteral, SpanKind::Code),
            ]
        );
        assert_eq!(output.candidates[0].source_text, r#"title="Main heading""#);
    }

    #[test]
    fn test_svelte_attribute_keeps_value_span() {
        let output = scan_with(Dialect::Svelte, "src/A.svelte", r#"<input placeholder="Search the catalog" />"#);
        assert_eq!(output.candidates.len(), 1);
        assert_eq!(output.candidates[0].source_text, r#""Search the catalog""#);
        assert_eq!(output.candidates[0].span_kind, SpanKind::AttributeValue);
    }

    #[test]
    fn test_unbalanced_delimiters() {
        assert_eq!(find_unbalanced_line(Dialect::Vue, "<p>{{ a }}</p>\n<p>{{ b </p>\n"), Some(2));
        assert_eq!(find_unbalanced_line(Dialect::Vue, "<p>a }}</p>"), Some(1));
        assert_eq!(find_unbalanced_line(Dialect::Vue, "<p>{{ a }}</p>"), None);
        assert_eq!(find_unbalanced_line(Dialect::Jsx, "const a = {\n  b: 1,\n"), Some(1));
        assert_eq!(
            find_unbalanced_line(Dialect::Svelte, "<style>a { }}</style><p>{x}</p>"),
            None
        );
    }

    fn texts(output: &ScanOutput) -> Vec<&str> {
        output.candidates.iter().map(|c| c.text.as_str()).collect()
    }

    #[test]
    fn test_jsx_comparisons_are_not_tag_boundaries() {
        let content = "export function f(count, limit, value, max) {\n  if (count > limit) return value < max;\n  return <p>Hello there friend</p>\n";
        let output = scan_with(Dialect::Jsx, "src/A.tsx", content);
        assert_eq!(texts(&output), vec!["Hello there friend"]);
        assert_eq!(output.candidates[0].source_text, "Hello there friend");
    }

    #[test]
    fn test_jsx_generics_and_arrows_stay_code() {
        let content = r#"function first(items: Array<string>): string | undefined {
  const seen = new Map<string, number>();
  return items.length > 0 ? items[0] : undefined;
}
const visible = rows.filter((row) => row.count > 0 && row.count < limit);
export const A = () => <div className="list">Pick one item<br/>from the list</div>
"#;
        let output = scan_with(Dialect::Jsx, "src/A.tsx", content);
        assert_eq!(texts(&output), vec!["Pick one item", "from the list"]);
    }

    #[test]
    fn test_jsx_ternary_between_elements() {
        let content = "export const S = ({ done, count, total }) => (\n  <section>{done ? <p>All done here</p> : count < total ? <p>Keep going now</p> : null}</section>\n";
        let output = scan_with(Dialect::Jsx, "src/S.tsx", content);
        assert_eq!(texts(&output), vec!["All done here", "Keep going now"]);
    }
}
