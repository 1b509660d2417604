use std::sync::Arc;

use tracing::debug;

use crate::core::{
    adapters::{
        Dialect, MutateResult, ScanContext, ScanOutput, SourceAdapter, degraded_scan, mutate, walker,
    },
    candidate::TransformCandidate,
    diagnostics::{Diagnostic, DiagnosticKind},
    options::ExtractOptions,
    parsers::{NoTreeProvider, ParseOutcome, TreeProvider},
    rewrite::RewriteError,
};

/// Adapter for single-file component templates (`.vue`, `.svelte`).
///
/// There is no built-in parser for these dialects. Without an injected
/// provider every file goes through the fallback extractor.
#[derive(Clone)]
pub struct TemplateAdapter {
    dialect: Dialect,
    extensions: &'static [&'static str],
    provider: Arc<dyn TreeProvider>,
}

impl TemplateAdapter {
    pub fn vue() -> Self {
        Self {
            dialect: Dialect::Vue,
            extensions: &["vue"],
            provider: Arc::new(NoTreeProvider),
        }
    }

    pub fn svelte() -> Self {
        Self {
            dialect: Dialect::Svelte,
            extensions: &["svelte"],
            provider: Arc::new(NoTreeProvider),
        }
    }

    pub fn with_provider(mut self, provider: impl TreeProvider + 'static) -> Self {
        self.provider = Arc::new(provider);
        self
    }
}

impl std::fmt::Debug for TemplateAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateAdapter")
            .field("dialect", &self.dialect)
            .finish_non_exhaustive()
    }
}

impl SourceAdapter for TemplateAdapter {
    fn name(&self) -> &str {
        self.dialect.as_str()
    }

    fn extensions(&self) -> &[&'static str] {
        self.extensions
    }

    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn scan(&self, file_path: &str, content: &str, ctx: &ScanContext<'_>) -> ScanOutput {
        match self.provider.parse(file_path, content) {
            ParseOutcome::Parsed(tree) => {
                debug!(file = file_path, nodes = tree.len(), "parsed");
                walker::walk(&tree, content, file_path, self.dialect, ctx)
            }
            ParseOutcome::Failed { message, line } => {
                let reason = Diagnostic::new(file_path, DiagnosticKind::ParseFailed, message).with_line(line);
                degraded_scan(self.dialect, file_path, content, ctx, reason)
            }
            ParseOutcome::Unavailable => {
                let reason = Diagnostic::new(
                    file_path,
                    DiagnosticKind::ParserUnavailable,
                    format!("no {} template parser available", self.dialect),
                );
                degraded_scan(self.dialect, file_path, content, ctx, reason)
            }
        }
    }

    fn mutate(
        &self,
        file_path: &str,
        content: &str,
        candidates: Vec<TransformCandidate>,
        options: &ExtractOptions,
    ) -> Result<MutateResult, RewriteError> {
        mutate::mutate(self.dialect, file_path, content, candidates, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        classify::TextClassifier,
        keygen::{KeyGenerator, KeyGeneratorOptions},
        options::AttributePolicy,
        tree::{NodeKind, TreeBuilder},
    };
    use pretty_assertions::assert_eq;

    fn options() -> ExtractOptions {
        ExtractOptions::new(
            "t",
            vec!["t".to_string(), "$t".to_string()],
            AttributePolicy::new(&["title".to_string()], &[], &[], &[]),
            Default::default(),
        )
    }

    fn scan(adapter: &TemplateAdapter, file_path: &str, content: &str) -> ScanOutput {
        let classifier = TextClassifier::default();
        let keygen = KeyGenerator::new(KeyGeneratorOptions::default());
        let options = options();
        let ctx = ScanContext {
            classifier: &classifier,
            keygen: &keygen,
            options: &options,
        };
        adapter.scan(file_path, content, &ctx)
    }

    #[test]
    fn test_without_parser_falls_back_and_reports_malformed_line() {
        let content = "<template>\n  <p>Welcome aboard friend</p>\n  <p>{{ user.name </p>\n</template>\n";
        let output = scan(&TemplateAdapter::vue(), "src/A.vue", content);

        let kinds: Vec<DiagnosticKind> = output.diagnostics.iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![DiagnosticKind::ParserUnavailable, DiagnosticKind::MalformedInput]
        );
        assert_eq!(output.diagnostics[1].line, Some(3));
        assert_eq!(output.candidates[0].text, "Welcome aboard friend");
    }

    /// Builds `<p title="Say hello">Hello {{ name }}!</p>` by hand.
    fn vue_provider(_: &str, content: &str) -> ParseOutcome {
        let mut builder = TreeBuilder::new(content.len());
        let find = |needle: &str| {
            let start = content.find(needle).unwrap_or_default();
            start..start + needle.len()
        };

        let p = builder.push(
            builder.root(),
            NodeKind::Element { tag: "p".to_string() },
            find(r#"<p title="Say hello">Hello {{ name }}!</p>"#),
        );
        let attribute = builder.push(
            p,
            NodeKind::Attribute {
                name: "title".to_string(),
                bound: false,
            },
            find(r#"title="Say hello""#),
        );
        builder.push(
            attribute,
            NodeKind::StringLiteral {
                value: "Say hello".to_string(),
            },
            find(r#""Say hello""#),
        );
        builder.push(p, NodeKind::Text, find("Hello "));
        let container = builder.push(p, NodeKind::ExpressionContainer, find("{{ name }}"));
        builder.push(container, NodeKind::Reference, find("name"));
        builder.push(p, NodeKind::Text, find("!</p>").start..find("!</p>").start + 1);
        ParseOutcome::Parsed(builder.finish())
    }

    #[test]
    fn test_injected_provider_rewrites_in_vue_syntax() {
        let content = r#"<p title="Say hello">Hello {{ name }}!</p>"#;
        let adapter = TemplateAdapter::vue().with_provider(vue_provider);

        let output = scan(&adapter, "src/Greeting.vue", content);
        assert!(output.diagnostics.is_empty());
        assert_eq!(output.candidates.len(), 2);

        let keys: Vec<String> = output.candidates.iter().map(|c| c.suggested_key.clone()).collect();
        let result = adapter
            .mutate(
                "src/Greeting.vue",
                content,
                output.candidates.into_iter().map(TransformCandidate::from_scan).collect(),
                &options(),
            )
            .unwrap();

        assert_eq!(
            result.new_content,
            format!(
                r#"<p :title="$t('{}')">{{{{ $t('{}', {{ name }}) }}}}</p>"#,
                keys[0], keys[1]
            )
        );
    }

    #[test]
    fn test_svelte_names() {
        let adapter = TemplateAdapter::svelte();
        assert_eq!(adapter.name(), "svelte");
        assert_eq!(adapter.extensions(), &["svelte"]);
        assert_eq!(adapter.dialect(), Dialect::Svelte);
    }
}
