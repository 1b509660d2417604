use std::sync::Arc;

use tracing::debug;

use crate::core::{
    adapters::{
        Dialect, MutateResult, ScanContext, ScanOutput, SourceAdapter, degraded_scan, mutate, walker,
    },
    candidate::TransformCandidate,
    diagnostics::{Diagnostic, DiagnosticKind},
    options::ExtractOptions,
    parsers::{ParseOutcome, TreeProvider, jsx::SwcTreeProvider},
    rewrite::RewriteError,
};

const EXTENSIONS: &[&str] = &["tsx", "jsx", "ts", "js", "mjs", "cjs", "mts", "cts"];

/// Adapter for JavaScript and TypeScript sources with JSX markup.
#[derive(Clone)]
pub struct JsxAdapter {
    provider: Arc<dyn TreeProvider>,
}

impl JsxAdapter {
    pub fn new() -> Self {
        Self {
            provider: Arc::new(SwcTreeProvider),
        }
    }

    /// Replaces the built-in swc provider.
    pub fn with_provider(mut self, provider: impl TreeProvider + 'static) -> Self {
        self.provider = Arc::new(provider);
        self
    }
}

impl Default for JsxAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for JsxAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsxAdapter").finish_non_exhaustive()
    }
}

impl SourceAdapter for JsxAdapter {
    fn name(&self) -> &str {
        "jsx"
    }

    fn extensions(&self) -> &[&'static str] {
        EXTENSIONS
    }

    fn dialect(&self) -> Dialect {
        Dialect::Jsx
    }

    fn scan(&self, file_path: &str, content: &str, ctx: &ScanContext<'_>) -> ScanOutput {
        match self.provider.parse(file_path, content) {
            ParseOutcome::Parsed(tree) => {
                debug!(file = file_path, nodes = tree.len(), "parsed");
                walker::walk(&tree, content, file_path, Dialect::Jsx, ctx)
            }
            ParseOutcome::Failed { message, line } => {
                let reason = Diagnostic::new(file_path, DiagnosticKind::ParseFailed, message).with_line(line);
                degraded_scan(Dialect::Jsx, file_path, content, ctx, reason)
            }
            ParseOutcome::Unavailable => {
                let reason = Diagnostic::new(
                    file_path,
                    DiagnosticKind::ParserUnavailable,
                    "no parser available for this file type",
                );
                degraded_scan(Dialect::Jsx, file_path, content, ctx, reason)
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
        mutate::mutate(Dialect::Jsx, file_path, content, candidates, options)
    }
}
