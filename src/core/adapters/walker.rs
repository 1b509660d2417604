//! Dialect-agnostic candidate extraction over a [`SyntaxTree`].
//!
//! Element content is split into runs of siblings delimited by nested
//! elements. A run with text and simple dynamic values is merged into one
//! template candidate; anything else is handled sibling by sibling.
//! Expressions are walked in one of two modes: values that end up rendered
//! (markup interpolations, attribute expressions) may yield literal
//! candidates, while operands, conditions and call arguments are only
//! searched for nested markup and access calls.

use std::{collections::HashSet, ops::Range};

use crate::{
    core::{
        adapters::{Dialect, ScanContext, ScanOutput},
        candidate::{
            ByteRange, Candidate, CandidateKind, DynamicKeyReason, DynamicKeyWarning, Interpolation,
            SpanKind,
        },
        keygen::KeyContext,
        merge::{self, Fragment, MergeOutcome},
        position::LineIndex,
        tree::{NodeId, NodeKind, SyntaxTree},
    },
    utils::normalize_whitespace,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// The expression's value is shown to the user.
    Rendered,
    /// Conditions, operands and arguments: only nested structure matters.
    Structural,
}

/// Extracts candidates and dynamic key warnings from a parsed file.
pub fn walk(
    tree: &SyntaxTree,
    content: &str,
    file_path: &str,
    dialect: Dialect,
    ctx: &ScanContext<'_>,
) -> ScanOutput {
    let mut walker = TreeWalker {
        tree,
        content,
        file_path,
        dialect,
        ctx: *ctx,
        lines: LineIndex::new(content),
        output: ScanOutput::default(),
        seen: HashSet::new(),
    };
    walker.visit(tree.root(), Mode::Structural, None);

    let mut output = walker.output;
    output.normalize();
    output
}

struct TreeWalker<'a> {
    tree: &'a SyntaxTree,
    content: &'a str,
    file_path: &'a str,
    dialect: Dialect,
    ctx: ScanContext<'a>,
    lines: LineIndex,
    output: ScanOutput,
    seen: HashSet<String>,
}

impl<'a> TreeWalker<'a> {
    fn visit(&mut self, id: NodeId, mode: Mode, attribute: Option<&'a str>) {
        let tree = self.tree;
        match tree.kind(id) {
            NodeKind::Root => self.content_children(tree.children(id)),
            NodeKind::Element { tag } => self.element(id, tag),
            NodeKind::Attribute { name, bound } => self.attribute(id, name, *bound),
            NodeKind::StringLiteral { value } => {
                if mode == Mode::Rendered {
                    let kind = if attribute.is_some() {
                        CandidateKind::AttributeValue
                    } else {
                        CandidateKind::StaticText
                    };
                    self.static_value(id, value, kind, attribute);
                }
            }
            NodeKind::TemplateLiteral => self.template(id, mode, attribute),
            NodeKind::Binary { op } => self.binary(id, op, mode, attribute),
            NodeKind::Conditional => {
                for (i, &child) in tree.children(id).iter().enumerate() {
                    let mode = if i == 0 { Mode::Structural } else { mode };
                    self.visit(child, mode, attribute);
                }
            }
            NodeKind::Call { callee } => self.call(id, callee),
            NodeKind::ExpressionContainer => {
                for &child in tree.children(id) {
                    self.visit(child, mode, attribute);
                }
            }
            NodeKind::Text
            | NodeKind::TemplateChunk { .. }
            | NodeKind::Reference
            | NodeKind::Expression
            | NodeKind::Comment => {
                for &child in tree.children(id) {
                    self.visit(child, Mode::Structural, None);
                }
            }
        }
    }

    // ============================================================
    // Markup
    // ============================================================

    fn element(&mut self, id: NodeId, tag: &str) {
        if self.dialect.is_skipped_element(tag) {
            return;
        }

        let tree = self.tree;
        let (attributes, content): (Vec<NodeId>, Vec<NodeId>) = tree
            .children(id)
            .iter()
            .copied()
            .partition(|&child| matches!(tree.kind(child), NodeKind::Attribute { .. }));

        for attribute in attributes {
            self.visit(attribute, Mode::Structural, None);
        }
        self.content_children(&content);
    }

    fn content_children(&mut self, children: &[NodeId]) {
        let mut run = Vec::new();
        for &child in children {
            if matches!(self.tree.kind(child), NodeKind::Element { .. }) {
                self.run(&run);
                run.clear();
                self.visit(child, Mode::Rendered, None);
            } else {
                run.push(child);
            }
        }
        self.run(&run);
    }

    fn run(&mut self, nodes: &[NodeId]) {
        if nodes.is_empty() {
            return;
        }

        let fragments: Vec<Option<Fragment>> = nodes.iter().map(|&id| self.markup_fragment(id)).collect();
        let present: Vec<Fragment> = fragments.iter().flatten().cloned().collect();

        if merge::should_merge(&present) {
            let edges: Vec<usize> = fragments
                .iter()
                .enumerate()
                .filter(|(_, f)| match f {
                    Some(Fragment::Static(text)) => !text.trim().is_empty(),
                    Some(_) => true,
                    None => false,
                })
                .map(|(i, _)| i)
                .collect();
            if let (Some(&first), Some(&last)) = (edges.first(), edges.last()) {
                let range = self.trimmed_range(nodes[first]).start..self.trimmed_range(nodes[last]).end;
                if self.try_merge(&present, range, SpanKind::Markup, None) {
                    return;
                }
            }
        }

        for &id in nodes {
            if matches!(self.tree.kind(id), NodeKind::Text) {
                self.markup_text(id);
            } else {
                self.visit(id, Mode::Rendered, None);
            }
        }
    }

    /// Fragment for one content sibling; `None` for comments and empty interpolations.
    fn markup_fragment(&self, id: NodeId) -> Option<Fragment> {
        match self.tree.kind(id) {
            NodeKind::Text => Some(Fragment::Static(self.tree.text(id, self.content).to_string())),
            NodeKind::ExpressionContainer => {
                let &inner = self.tree.children(id).first()?;
                match self.tree.kind(inner) {
                    NodeKind::Comment => None,
                    _ => Some(self.expression_fragment(inner)),
                }
            }
            _ => Some(Fragment::Nested),
        }
    }

    fn expression_fragment(&self, id: NodeId) -> Fragment {
        if let NodeKind::StringLiteral { value } = self.tree.kind(id) {
            return Fragment::Static(value.clone());
        }
        if let Some(text) = self.static_template(id) {
            return Fragment::Static(text);
        }
        if self.contains_structure(id) {
            return Fragment::Nested;
        }
        Fragment::Dynamic(self.tree.text(id, self.content).to_string())
    }

    fn markup_text(&mut self, id: NodeId) {
        let range = self.trimmed_range(id);
        let Some(raw) = self.content.get(range.clone()) else {
            return;
        };
        let text = normalize_whitespace(raw);
        if !self.ctx.classifier.classify(&text, None).is_extract() {
            return;
        }
        self.keyed(CandidateKind::StaticText, range, text, SpanKind::Markup, None, None);
    }

    // ============================================================
    // Attributes
    // ============================================================

    fn attribute(&mut self, id: NodeId, name: &'a str, bound: bool) {
        let tree = self.tree;
        if !self.ctx.options.attributes.is_translatable(name) {
            for &child in tree.children(id) {
                self.visit(child, Mode::Structural, None);
            }
            return;
        }

        for &value in tree.children(id) {
            match tree.kind(value) {
                NodeKind::StringLiteral { value: text } if !bound => {
                    self.attribute_value(id, value, name, text);
                }
                _ => self.visit(value, Mode::Rendered, Some(name)),
            }
        }
    }

    fn attribute_value(&mut self, attribute_id: NodeId, value_id: NodeId, name: &'a str, text: &str) {
        if !self.ctx.classifier.classify(text, Some(name)).is_extract() {
            return;
        }
        let (range, span_kind) = match self.dialect.attribute_span_kind() {
            SpanKind::Attribute => (self.tree.range(attribute_id), SpanKind::Attribute),
            span_kind => (self.tree.range(value_id), span_kind),
        };
        self.keyed(
            CandidateKind::AttributeValue,
            range,
            normalize_whitespace(text),
            span_kind,
            Some(name),
            None,
        );
    }

    // ============================================================
    // Expressions
    // ============================================================

    fn static_value(&mut self, id: NodeId, text: &str, kind: CandidateKind, attribute: Option<&'a str>) {
        if !self.ctx.classifier.classify(text, attribute).is_extract() {
            return;
        }
        self.keyed(
            kind,
            self.tree.range(id),
            normalize_whitespace(text),
            SpanKind::Code,
            attribute,
            None,
        );
    }

    fn template(&mut self, id: NodeId, mode: Mode, attribute: Option<&'a str>) {
        let tree = self.tree;
        let expressions: Vec<NodeId> = tree
            .children(id)
            .iter()
            .copied()
            .filter(|&child| !matches!(tree.kind(child), NodeKind::TemplateChunk { .. }))
            .collect();

        if mode == Mode::Rendered {
            if let Some(text) = self.static_template(id) {
                let kind = if attribute.is_some() {
                    CandidateKind::AttributeValue
                } else {
                    CandidateKind::StaticText
                };
                self.static_value(id, &text, kind, attribute);
                return;
            }

            let fragments: Vec<Fragment> = tree
                .children(id)
                .iter()
                .map(|&child| match tree.kind(child) {
                    NodeKind::TemplateChunk { value } => Fragment::Static(value.clone()),
                    _ => self.expression_fragment(child),
                })
                .collect();
            if merge::should_merge(&fragments)
                && self.try_merge(&fragments, tree.range(id), SpanKind::Code, attribute)
            {
                return;
            }
        }

        for child in expressions {
            self.visit(child, mode, attribute);
        }
    }

    fn binary(&mut self, id: NodeId, op: &str, mode: Mode, attribute: Option<&'a str>) {
        let tree = self.tree;
        let children = tree.children(id);
        match (op, children) {
            ("+", _) => self.concatenation(id, mode, attribute),
            ("||" | "??", &[left, right]) => {
                self.visit(left, mode, attribute);
                // `t('key') || 'Fallback'`: the fallback is the catalog's business.
                if self.is_recognized_call(left) && self.is_static_literal(right) {
                    return;
                }
                self.visit(right, mode, attribute);
            }
            ("&&", &[left, right]) => {
                self.visit(left, Mode::Structural, None);
                self.visit(right, mode, attribute);
            }
            _ => {
                for &child in children {
                    self.visit(child, Mode::Structural, None);
                }
            }
        }
    }

    fn concatenation(&mut self, id: NodeId, mode: Mode, attribute: Option<&'a str>) {
        let mut leaves = Vec::new();
        self.flatten_concatenation(id, &mut leaves);

        if mode == Mode::Rendered {
            let fragments: Vec<Fragment> = leaves.iter().map(|&leaf| self.expression_fragment(leaf)).collect();

            if fragments.iter().all(|f| matches!(f, Fragment::Static(_))) {
                let text: String = fragments
                    .iter()
                    .filter_map(|f| match f {
                        Fragment::Static(text) => Some(text.as_str()),
                        _ => None,
                    })
                    .collect();
                self.static_value(id, &text, CandidateKind::MergedExpression, attribute);
                return;
            }

            if merge::should_merge(&fragments)
                && self.try_merge(&fragments, self.tree.range(id), SpanKind::Code, attribute)
            {
                return;
            }
        }

        for leaf in leaves {
            self.visit(leaf, mode, attribute);
        }
    }

    fn flatten_concatenation(&self, id: NodeId, leaves: &mut Vec<NodeId>) {
        match self.tree.kind(id) {
            NodeKind::Binary { op } if op == "+" => {
                for &child in self.tree.children(id) {
                    self.flatten_concatenation(child, leaves);
                }
            }
            _ => leaves.push(id),
        }
    }

    fn call(&mut self, id: NodeId, callee: &str) {
        let tree = self.tree;
        let children = tree.children(id);
        if !self.ctx.options.is_recognized_call(callee) {
            for &child in children {
                self.visit(child, Mode::Structural, None);
            }
            return;
        }

        let Some((&key, rest)) = children.split_first() else {
            return;
        };
        match tree.kind(key) {
            NodeKind::StringLiteral { value } => self.existing(key, value.clone()),
            NodeKind::TemplateLiteral => match self.static_template(key) {
                Some(value) => self.existing(key, value),
                None => self.dynamic_key(key, DynamicKeyReason::Template),
            },
            NodeKind::Binary { .. } => self.dynamic_key(key, DynamicKeyReason::Binary),
            _ => self.dynamic_key(key, DynamicKeyReason::Expression),
        }
        for &child in rest {
            self.visit(child, Mode::Structural, None);
        }
    }

    fn existing(&mut self, id: NodeId, key: String) {
        let mut candidate = self.candidate(
            CandidateKind::ExistingCallLiteral,
            self.tree.range(id),
            key.clone(),
            SpanKind::Code,
            None,
        );
        candidate.suggested_key = key;
        self.insert(candidate);
    }

    fn dynamic_key(&mut self, id: NodeId, reason: DynamicKeyReason) {
        let range = self.tree.range(id);
        self.output.dynamic_key_warnings.push(DynamicKeyWarning {
            file_path: self.file_path.to_string(),
            position: self.lines.position(self.content, range.start),
            expression: self.tree.text(id, self.content).to_string(),
            reason,
        });
    }

    // ============================================================
    // Helpers
    // ============================================================

    fn try_merge(
        &mut self,
        fragments: &[Fragment],
        range: Range<usize>,
        span_kind: SpanKind,
        attribute: Option<&'a str>,
    ) -> bool {
        let MergeOutcome::Merged(merged) = merge::merge(fragments, self.ctx.options.placeholder_style) else {
            return false;
        };
        if !merged.has_static || !self.ctx.classifier.classify(&merged.key_text, attribute).is_extract() {
            return false;
        }

        let text = merged.template.clone();
        self.keyed(
            CandidateKind::MergedExpression,
            range,
            text,
            span_kind,
            attribute,
            Some(merged.into_interpolation()),
        );
        true
    }

    /// Concatenated chunks of a template literal without expressions.
    fn static_template(&self, id: NodeId) -> Option<String> {
        if !matches!(self.tree.kind(id), NodeKind::TemplateLiteral) {
            return None;
        }
        let mut text = String::new();
        for &child in self.tree.children(id) {
            let NodeKind::TemplateChunk { value } = self.tree.kind(child) else {
                return None;
            };
            text.push_str(value);
        }
        Some(text)
    }

    /// Nested markup or access calls anywhere below `id`.
    fn contains_structure(&self, id: NodeId) -> bool {
        match self.tree.kind(id) {
            NodeKind::Element { .. } => true,
            NodeKind::Call { callee } if self.ctx.options.is_recognized_call(callee) => true,
            _ => self
                .tree
                .children(id)
                .iter()
                .any(|&child| self.contains_structure(child)),
        }
    }

    fn is_recognized_call(&self, id: NodeId) -> bool {
        matches!(self.tree.kind(id), NodeKind::Call { callee } if self.ctx.options.is_recognized_call(callee))
    }

    fn is_static_literal(&self, id: NodeId) -> bool {
        match self.tree.kind(id) {
            NodeKind::StringLiteral { .. } => true,
            NodeKind::TemplateLiteral => self.static_template(id).is_some(),
            _ => false,
        }
    }

    /// The node's range with surrounding whitespace removed (text nodes only).
    fn trimmed_range(&self, id: NodeId) -> Range<usize> {
        let range = self.tree.range(id);
        if !matches!(self.tree.kind(id), NodeKind::Text) {
            return range;
        }
        let raw = self.tree.text(id, self.content);
        let start = range.start + (raw.len() - raw.trim_start().len());
        let end = (range.start + raw.trim_end().len()).max(start);
        start..end
    }

    fn keyed(
        &mut self,
        kind: CandidateKind,
        range: Range<usize>,
        text: String,
        span_kind: SpanKind,
        attribute: Option<&'a str>,
        interpolation: Option<Interpolation>,
    ) {
        let key_text = interpolation
            .as_ref()
            .map_or(text.as_str(), |interpolation| interpolation.key_text.as_str());
        let generated = self.ctx.keygen.generate(
            key_text,
            KeyContext {
                file_path: self.file_path,
                kind,
                attribute,
            },
        );

        let mut candidate = self.candidate(kind, range, text, span_kind, attribute);
        candidate.interpolation = interpolation;
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
        candidate::{CandidateStatus, TransformCandidate, Variable},
        classify::TextClassifier,
        keygen::{KeyGenerator, KeyGeneratorOptions},
        options::{AttributePolicy, ExtractOptions},
        parsers::{ParseOutcome, TreeProvider, jsx::SwcTreeProvider},
    };
    use pretty_assertions::assert_eq;

    const FILE: &str = "src/Demo.tsx";

    fn options() -> ExtractOptions {
        let strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        ExtractOptions::new(
            "t",
            strings(&["t", "$t", "i18n.t"]),
            AttributePolicy::new(&strings(&["title", "placeholder", "alt"]), &[], &strings(&["Label"]), &[]),
            Default::default(),
        )
    }

    fn scan(content: &str) -> ScanOutput {
        let ParseOutcome::Parsed(tree) = SwcTreeProvider.parse(FILE, content) else {
            panic!("fixture must parse");
        };
        let classifier = TextClassifier::default();
        let keygen = KeyGenerator::new(KeyGeneratorOptions::default());
        let options = options();
        let ctx = ScanContext {
            classifier: &classifier,
            keygen: &keygen,
            options: &options,
        };
        walk(&tree, content, FILE, Dialect::Jsx, &ctx)
    }

    fn texts(output: &ScanOutput) -> Vec<&str> {
        output.candidates.iter().map(|c| c.text.as_str()).collect()
    }

    #[test]
    fn test_concatenated_literals_become_one_candidate() {
        let content = r#"const A = () => <p>{"Hello, " + "world!"}</p>;"#;
        let output = scan(content);

        assert_eq!(texts(&output), vec!["Hello, world!"]);
        let candidate = &output.candidates[0];
        assert_eq!(candidate.kind, CandidateKind::MergedExpression);
        assert_eq!(candidate.source_text, r#""Hello, " + "world!""#);
        assert_eq!(candidate.span_kind, SpanKind::Code);
    }

    #[test]
    fn test_label_value_run_extracts_label_only() {
        let output = scan("const A = () => <p>User name: {userName}</p>;");

        assert_eq!(texts(&output), vec!["User name:"]);
        let candidate = &output.candidates[0];
        assert_eq!(candidate.kind, CandidateKind::StaticText);
        assert_eq!(candidate.source_text, "User name:");
        assert!(candidate.interpolation.is_none());
    }

    #[test]
    fn test_merges_text_and_references() {
        let content = "const A = () => <p>\n  Welcome back, {user.name}!\n</p>;";
        let output = scan(content);

        assert_eq!(texts(&output), vec!["Welcome back, {name}!"]);
        let candidate = &output.candidates[0];
        assert_eq!(candidate.kind, CandidateKind::MergedExpression);
        assert_eq!(candidate.source_text, "Welcome back, {user.name}!");
        assert_eq!(candidate.position.line, 2);
        let interpolation = candidate.interpolation.as_ref().unwrap();
        assert_eq!(interpolation.variables, vec![Variable::new("name", "user.name")]);
        assert!(interpolation.is_consistent());
    }

    #[test]
    fn test_merges_bracketed_count_and_joined_list() {
        let output = scan("const A = () => <p>Items ({count}): {items.join(', ')}</p>;");

        assert_eq!(output.candidates.len(), 1);
        let interpolation = output.candidates[0].interpolation.as_ref().unwrap();
        assert!(!interpolation.template.contains('('));
        assert!(interpolation.key_text.starts_with("Items"));
        assert_eq!(interpolation.variables.len(), 2);
    }

    #[test]
    fn test_complex_expression_falls_back_to_siblings() {
        let output = scan("const A = () => <p>Total price {format(price)} today</p>;");
        assert_eq!(texts(&output), vec!["Total price", "today"]);
    }

    #[test]
    fn test_nested_elements_split_runs() {
        let output = scan("const A = () => <p>Read the <a href=\"/docs\">documentation</a> first</p>;");
        assert_eq!(texts(&output), vec!["Read the", "documentation", "first"]);
    }

    #[test]
    fn test_existing_calls_are_recognized() {
        let output = scan("const A = () => <p>{t('app.demo.hello.abc123')}</p>;");

        assert_eq!(output.candidates.len(), 1);
        let candidate = output.candidates[0].clone();
        assert_eq!(candidate.kind, CandidateKind::ExistingCallLiteral);
        assert_eq!(candidate.suggested_key, "app.demo.hello.abc123");
        assert_eq!(
            TransformCandidate::from_scan(candidate).status,
            CandidateStatus::Existing
        );
    }

    #[test]
    fn test_fallback_literal_is_not_extracted() {
        let output = scan(r#"const A = () => <p>{t('home.title') || "Welcome home"}</p>;"#);
        assert_eq!(texts(&output), vec!["home.title"]);

        let output = scan(r#"const A = () => <p>{i18n.t('home.title') ?? `Welcome home`}</p>;"#);
        assert_eq!(texts(&output), vec!["home.title"]);
    }

    #[test]
    fn test_dynamic_keys_are_reported() {
        let content = "const A = () => <p>{t(`items.${kind}`)}{t('items.' + kind)}{t(keyName)}</p>;";
        let output = scan(content);

        assert!(output.candidates.is_empty());
        let reasons: Vec<DynamicKeyReason> = output.dynamic_key_warnings.iter().map(|w| w.reason).collect();
        assert_eq!(
            reasons,
            vec![
                DynamicKeyReason::Template,
                DynamicKeyReason::Binary,
                DynamicKeyReason::Expression
            ]
        );
        assert_eq!(output.dynamic_key_warnings[2].expression, "keyName");
    }

    #[test]
    fn test_attributes_follow_policy() {
        let content = r#"const A = () => <input title="Your email address" className="flex items-center gap-2" placeholder={"Type here please"} buttonLabel="Send it now" />;"#;
        let output = scan(content);

        assert_eq!(texts(&output), vec!["Your email address", "Type here please", "Send it now"]);
        let title = &output.candidates[0];
        assert_eq!(title.kind, CandidateKind::AttributeValue);
        assert_eq!(title.source_text, r#""Your email address""#);
        assert_eq!(title.span_kind, SpanKind::AttributeValue);
        assert_eq!(title.context.as_deref(), Some("title"));

        let placeholder = &output.candidates[1];
        assert_eq!(placeholder.span_kind, SpanKind::Code);
        assert_eq!(placeholder.context.as_deref(), Some("placeholder"));
    }

    #[test]
    fn test_styling_tokens_rejected_even_in_text_attributes() {
        let output = scan(r#"const A = () => <img title="flex items-center gap-2" alt="" />;"#);
        assert!(output.candidates.is_empty());
    }

    #[test]
    fn test_conditionals_and_guards() {
        let content = r#"const A = () => <p>{isOpen ? "Close menu" : "Open menu"}{ready && "All done here"}</p>;"#;
        let output = scan(content);
        assert_eq!(texts(&output), vec!["Close menu", "Open menu", "All done here"]);
    }

    #[test]
    fn test_style_and_code_outside_markup_are_ignored() {
        let content = r#"
const label = "Not extracted";
console.log("Debug message here");
const A = () => <style>{"body { color: red }"}</style>;
"#;
        assert!(scan(content).candidates.is_empty());
    }

    #[test]
    fn test_markup_inside_callbacks() {
        let content = "const L = () => <ul>{items.map((item) => <li>Remove {item.label}</li>)}</ul>;";
        let output = scan(content);
        assert_eq!(texts(&output), vec!["Remove {label}"]);
    }
}
