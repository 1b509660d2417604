//! Source adapters: one per dialect family.
//!
//! An adapter turns file content into candidates (`scan`) and applies
//! approved candidates back into the content (`mutate`). Adapters share the
//! classifier, merger, key generator and rewrite engine; they only differ
//! in how they obtain a tree and which replacement syntax they emit.
//!
//! - `jsx`: `.tsx`, `.jsx`, `.ts`, `.js` via swc
//! - `template`: `.vue` and `.svelte`, parser injected by the caller

pub mod dialect;
pub mod fallback;
pub mod jsx;
pub mod mutate;
pub mod template;
pub mod walker;

use std::path::Path;

use enum_dispatch::enum_dispatch;
use tracing::warn;

pub use dialect::Dialect;
pub use jsx::JsxAdapter;
pub use template::TemplateAdapter;

use crate::core::{
    candidate::{Candidate, DynamicKeyWarning, TransformCandidate},
    classify::TextClassifier,
    diagnostics::{Diagnostic, DiagnosticKind},
    keygen::KeyGenerator,
    options::ExtractOptions,
    rewrite::{Edit, RewriteError},
};

/// Shared, read-only state handed to every adapter call of a run.
#[derive(Debug, Clone, Copy)]
pub struct ScanContext<'a> {
    pub classifier: &'a TextClassifier,
    pub keygen: &'a KeyGenerator,
    pub options: &'a ExtractOptions,
}

/// Everything a single file's scan produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOutput {
    pub candidates: Vec<Candidate>,
    pub dynamic_key_warnings: Vec<DynamicKeyWarning>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ScanOutput {
    /// Orders candidates by byte offset and drops duplicate ids.
    pub fn normalize(&mut self) {
        self.candidates.sort_by(|a, b| a.offset().cmp(&b.offset()).then(a.kind.cmp(&b.kind)));
        let mut seen = std::collections::HashSet::new();
        self.candidates.retain(|c| seen.insert(c.id.clone()));
        self.dynamic_key_warnings
            .sort_by(|a, b| a.position.cmp(&b.position));
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutateResult {
    pub changed: bool,
    pub new_content: String,
    /// Applied edits, sorted by start ascending.
    pub edits: Vec<Edit>,
    /// Input candidates with updated statuses.
    pub candidates: Vec<TransformCandidate>,
    pub diagnostics: Vec<Diagnostic>,
}

#[enum_dispatch]
pub trait SourceAdapter {
    fn name(&self) -> &str;

    /// Lowercase file extensions without the dot.
    fn extensions(&self) -> &[&'static str];

    fn dialect(&self) -> Dialect;

    fn scan(&self, file_path: &str, content: &str, ctx: &ScanContext<'_>) -> ScanOutput;

    fn mutate(
        &self,
        file_path: &str,
        content: &str,
        candidates: Vec<TransformCandidate>,
        options: &ExtractOptions,
    ) -> Result<MutateResult, RewriteError>;
}

#[enum_dispatch(SourceAdapter)]
#[derive(Debug, Clone)]
pub enum Adapter {
    Jsx(JsxAdapter),
    Template(TemplateAdapter),
}

// ============================================================
// Registry
// ============================================================

/// Maps file extensions to adapters. The first registered match wins.
#[derive(Debug, Clone, Default)]
pub struct AdapterRegistry {
    adapters: Vec<Adapter>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// JSX/TSX via swc, plus Vue and Svelte without a structural parser.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(JsxAdapter::new());
        registry.register(TemplateAdapter::vue());
        registry.register(TemplateAdapter::svelte());
        registry
    }

    pub fn register(&mut self, adapter: impl Into<Adapter>) {
        self.adapters.push(adapter.into());
    }

    pub fn resolve(&self, file_path: &str) -> Option<&Adapter> {
        let extension = extension_of(file_path)?;
        self.adapters
            .iter()
            .find(|adapter| adapter.extensions().contains(&extension.as_str()))
    }

    pub fn supports(&self, path: &Path) -> bool {
        self.resolve(&path.to_string_lossy()).is_some()
    }

    pub fn extensions(&self) -> Vec<&'static str> {
        let mut extensions: Vec<&'static str> = Vec::new();
        for adapter in &self.adapters {
            for extension in adapter.extensions() {
                if !extensions.contains(extension) {
                    extensions.push(extension);
                }
            }
        }
        extensions
    }
}

fn extension_of(file_path: &str) -> Option<String> {
    Path::new(file_path)
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
}

/// Runs the conservative extractor after a structural parse could not be
/// used, recording why and, if found, the first unbalanced interpolation.
pub(crate) fn degraded_scan(
    dialect: Dialect,
    file_path: &str,
    content: &str,
    ctx: &ScanContext<'_>,
    reason: Diagnostic,
) -> ScanOutput {
    warn!(file = file_path, kind = %reason.kind, "{}; using fallback extractor", reason.message);

    let mut output = fallback::scan(dialect, file_path, content, ctx);
    output.diagnostics.push(reason);
    if let Some(line) = fallback::find_unbalanced_line(dialect, content) {
        let (open, close) = dialect.interpolation_delimiters();
        output.diagnostics.push(
            Diagnostic::new(
                file_path,
                DiagnosticKind::MalformedInput,
                format!("unbalanced `{}` / `{}` delimiters", open, close),
            )
            .with_line(Some(line)),
        );
    }
    output
}
