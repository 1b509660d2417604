use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use anyhow::{Context as _, Result};
use rayon::prelude::*;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::{
    config::Config,
    core::{
        adapters::{AdapterRegistry, MutateResult, ScanContext, ScanOutput, SourceAdapter},
        cache::{CacheEntry, CacheEnvelope, CacheLoad, Fingerprint, FingerprintCache},
        candidate::{CandidateStatus, DynamicKeyWarning, TransformCandidate},
        classify::TextClassifier,
        diagnostics::{Diagnostic, DiagnosticKind},
        file_scanner::scan_files,
        keygen::{KeyContext, KeyGenerator, KeyGeneratorOptions},
        options::{AttributePolicy, ExtractOptions},
    },
};

const IDENTIFIER_DIGEST_LENGTH: usize = 8;

/// Per-run switches for [`ExtractContext::scan`].
#[derive(Debug, Clone, Copy)]
pub struct ScanOptions {
    /// Read and flush the fingerprint cache.
    pub use_cache: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self { use_cache: true }
    }
}

/// Aggregated result of scanning a set of files.
///
/// Candidates are ordered by file path, then byte offset.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub candidates: Vec<TransformCandidate>,
    pub dynamic_key_warnings: Vec<DynamicKeyWarning>,
    pub diagnostics: Vec<Diagnostic>,
    pub files_scanned: usize,
    pub cache_hits: usize,
    /// True if the run stopped scheduling files before finishing.
    pub cancelled: bool,
}

impl ScanReport {
    pub fn pending(&self) -> impl Iterator<Item = &TransformCandidate> {
        self.candidates.iter().filter(|c| c.is_pending())
    }

    pub fn pending_count(&self) -> usize {
        self.pending().count()
    }

    pub fn existing_count(&self) -> usize {
        self.candidates
            .iter()
            .filter(|c| c.status == CandidateStatus::Existing)
            .count()
    }
}

/// Mutation result for one file.
#[derive(Debug, Clone)]
pub struct FileChange {
    /// Path relative to the project root.
    pub file_path: String,
    pub result: MutateResult,
}

impl FileChange {
    /// A change that leaves the file alone and skips every candidate.
    fn skipped(file_path: &str, mut candidates: Vec<TransformCandidate>, message: &str) -> Self {
        warn!(file = file_path, "{}", message);
        for candidate in candidates.iter_mut() {
            candidate.mark_skipped();
        }
        Self {
            file_path: file_path.to_string(),
            result: MutateResult {
                changed: false,
                new_content: String::new(),
                edits: Vec::new(),
                candidates,
                diagnostics: vec![Diagnostic::new(file_path, DiagnosticKind::UnlocatableSpan, message)],
            },
        }
    }
}

/// Run pipeline: discovery, cached parallel scan, deterministic key
/// assignment and parallel rewrite.
pub struct ExtractContext {
    pub config: Config,

    /// Project root. Candidate paths and cache keys are relative to it.
    pub root_dir: PathBuf,

    classifier: TextClassifier,
    registry: AdapterRegistry,
    options: ExtractOptions,
    key_options: KeyGeneratorOptions,
    active_identifier: String,
    cancelled: Arc<AtomicBool>,
}

impl ExtractContext {
    /// Builds the classifier, adapter registry and extraction options.
    ///
    /// # Errors
    ///
    /// Returns an error if the config fails validation.
    pub fn new(config: Config, root_dir: impl Into<PathBuf>) -> Result<Self> {
        Self::with_registry(config, root_dir, AdapterRegistry::with_defaults())
    }

    /// Like [`ExtractContext::new`] with caller-provided adapters.
    pub fn with_registry(
        config: Config,
        root_dir: impl Into<PathBuf>,
        registry: AdapterRegistry,
    ) -> Result<Self> {
        config.validate()?;

        let classifier = TextClassifier::new(
            &config.deny_patterns,
            &config.allow_patterns,
            &config.ignore_texts,
        )?;
        let attributes = AttributePolicy::new(
            &config.translate_attributes,
            &config.no_translate_attributes,
            &config.translate_attribute_suffixes,
            &config.no_translate_attribute_suffixes,
        );
        let options = ExtractOptions::new(
            config.translation_fn.clone(),
            config.recognized_calls.clone(),
            attributes,
            config.placeholder_style,
        );
        let key_options = KeyGeneratorOptions {
            namespace: config.namespace.clone(),
            hash_length: config.hash_length,
            dedupe_by_value: config.dedupe_by_value,
        };
        let active_identifier = active_identifier(&config)?;

        Ok(Self {
            config,
            root_dir: root_dir.into(),
            classifier,
            registry,
            options,
            key_options,
            active_identifier,
            cancelled: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    /// Cache identifier: the access function plus a digest of every setting
    /// that affects scan output.
    pub fn active_identifier(&self) -> &str {
        &self.active_identifier
    }

    /// Flag that stops scheduling new files when set. A cancelled run does
    /// not flush the cache.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    pub fn cache_path(&self) -> PathBuf {
        self.root_dir.join(&self.config.cache_file)
    }

    /// Source files under the configured source root, relative to the
    /// project root and sorted.
    pub fn discover(&self) -> Vec<String> {
        let base = self.root_dir.join(&self.config.source_root);
        let scan_result = scan_files(
            &base.to_string_lossy(),
            &self.config.includes,
            &self.config.ignores,
            self.config.ignore_test_files,
            &self.registry.extensions(),
        );
        if scan_result.skipped_count > 0 {
            warn!(
                skipped = scan_result.skipped_count,
                "some paths were skipped due to access errors"
            );
        }

        let mut files: Vec<String> = scan_result
            .files
            .iter()
            .map(|file| self.relative_path(Path::new(file)))
            .collect();
        files.sort();
        files.dedup();
        files
    }

    /// Scans `files` (relative to the project root).
    ///
    /// Unchanged files are served from the fingerprint cache; the rest are
    /// scanned in parallel. Final keys are assigned afterwards in path and
    /// offset order so they do not depend on scheduling.
    pub fn scan(&self, files: &[String], scan_options: &ScanOptions) -> ScanReport {
        let mut report = ScanReport::default();

        let cache = if scan_options.use_cache {
            let (cache, status) = FingerprintCache::load(&self.cache_path(), &self.active_identifier);
            match status {
                CacheLoad::Loaded { entries } => debug!(entries, "cache loaded"),
                CacheLoad::Missing => debug!("no cache file"),
                CacheLoad::Discarded(reason) => {
                    debug!(%reason, "cache discarded");
                    report.diagnostics.push(Diagnostic::new(
                        self.config.cache_file.clone(),
                        DiagnosticKind::CacheDiscarded,
                        reason,
                    ));
                }
            }
            cache
        } else {
            FingerprintCache::empty()
        };

        let results: Vec<(String, FileScan)> = files
            .par_iter()
            .filter_map(|file_path| {
                if self.cancelled.load(Ordering::Relaxed) {
                    return None;
                }
                Some((file_path.clone(), self.scan_file(file_path, &cache)))
            })
            .collect();

        report.cancelled = self.cancelled.load(Ordering::Relaxed);

        let mut results: BTreeMap<String, FileScan> = results.into_iter().collect();
        self.assign_keys(&mut results);

        let mut envelope = CacheEnvelope::new(self.active_identifier.clone());
        for (file_path, scan) in results {
            report.files_scanned += 1;
            let FileScan {
                output,
                fingerprint,
                from_cache,
            } = scan;
            if from_cache {
                report.cache_hits += 1;
            }
            if let Some(fingerprint) = fingerprint {
                envelope.insert(
                    file_path,
                    CacheEntry {
                        fingerprint,
                        candidates: output.candidates.clone(),
                        dynamic_key_warnings: output.dynamic_key_warnings.clone(),
                        diagnostics: output.diagnostics.clone(),
                    },
                );
            }
            report
                .candidates
                .extend(output.candidates.into_iter().map(TransformCandidate::from_scan));
            report.dynamic_key_warnings.extend(output.dynamic_key_warnings);
            report.diagnostics.extend(output.diagnostics);
        }

        if scan_options.use_cache && !report.cancelled {
            let path = self.cache_path();
            if let Err(e) = envelope.write_atomic(&path) {
                warn!(path = %path.display(), "failed to write cache: {:#}", e);
            }
        }

        info!(
            files = report.files_scanned,
            cache_hits = report.cache_hits,
            candidates = report.candidates.len(),
            pending = report.pending_count(),
            "scan finished"
        );
        report
    }

    fn scan_file(&self, file_path: &str, cache: &FingerprintCache) -> FileScan {
        let absolute = self.root_dir.join(file_path);
        let fingerprint = Fingerprint::of(&absolute).ok();

        if let Some(fingerprint) = fingerprint
            && let Some(entry) = cache.get(file_path, fingerprint)
        {
            debug!(file = file_path, "cache hit");
            return FileScan {
                output: ScanOutput {
                    candidates: entry.candidates.clone(),
                    dynamic_key_warnings: entry.dynamic_key_warnings.clone(),
                    diagnostics: entry.diagnostics.clone(),
                },
                fingerprint: Some(fingerprint),
                from_cache: true,
            };
        }
        debug!(file = file_path, "cache miss");

        let Some(adapter) = self.registry.resolve(file_path) else {
            return FileScan::failed(file_path, "no adapter registered for this file type");
        };
        let content = match fs::read_to_string(&absolute) {
            Ok(content) => content,
            Err(e) => return FileScan::failed(file_path, &format!("failed to read file: {}", e)),
        };

        // Keys from this generator are provisional; `assign_keys` replaces them.
        let keygen = KeyGenerator::new(self.key_options.clone());
        let ctx = ScanContext {
            classifier: &self.classifier,
            keygen: &keygen,
            options: &self.options,
        };
        debug!(file = file_path, adapter = adapter.name(), "scanning");
        let mut output = adapter.scan(file_path, &content, &ctx);
        output.normalize();

        FileScan {
            output,
            fingerprint,
            from_cache: false,
        }
    }

    /// Regenerates keys through one run-scoped generator in path, then offset order.
    fn assign_keys(&self, results: &mut BTreeMap<String, FileScan>) {
        let keygen = KeyGenerator::new(self.key_options.clone());
        for (file_path, scan) in results.iter_mut() {
            for candidate in scan.output.candidates.iter_mut() {
                if candidate.is_existing() {
                    continue;
                }
                let generated = keygen.generate(
                    candidate.key_text(),
                    KeyContext {
                        file_path,
                        kind: candidate.kind,
                        attribute: candidate.context.as_deref(),
                    },
                );
                candidate.suggested_key = generated.key;
                candidate.hash = generated.hash;
            }
        }
    }

    /// Rewrites every file holding at least one approved pending candidate.
    ///
    /// Files are mutated in parallel; within a file all approved candidates
    /// go through a single `mutate` call. Nothing is written to disk. A file
    /// that has no adapter or can no longer be read yields an unchanged
    /// [`FileChange`] with its candidates skipped and an `unlocatable-span`
    /// diagnostic; the other files are still rewritten.
    ///
    /// # Errors
    ///
    /// Returns an error only if the rewrite engine rejects a file's edits
    /// as overlapping.
    pub fn apply<F>(&self, report: &ScanReport, approve: F) -> Result<Vec<FileChange>>
    where
        F: Fn(&TransformCandidate) -> bool + Sync,
    {
        let mut by_file: BTreeMap<&str, Vec<TransformCandidate>> = BTreeMap::new();
        for candidate in report.pending().filter(|&c| approve(c)) {
            by_file
                .entry(candidate.candidate.file_path.as_str())
                .or_default()
                .push(candidate.clone());
        }

        by_file
            .into_par_iter()
            .map(|(file_path, candidates)| -> Result<FileChange> {
                let Some(adapter) = self.registry.resolve(file_path) else {
                    return Ok(FileChange::skipped(file_path, candidates, "no adapter for this file"));
                };
                let absolute = self.root_dir.join(file_path);
                let content = match fs::read_to_string(&absolute) {
                    Ok(content) => content,
                    Err(e) => {
                        let message = format!("cannot read file: {}", e);
                        return Ok(FileChange::skipped(file_path, candidates, &message));
                    }
                };
                let result = adapter
                    .mutate(file_path, &content, candidates, &self.options)
                    .with_context(|| format!("Failed to rewrite file: {}", file_path))?;
                Ok(FileChange {
                    file_path: file_path.to_string(),
                    result,
                })
            })
            .collect()
    }

    /// Writes changed files back to disk. Returns the number of files written.
    pub fn write_changes(&self, changes: &[FileChange]) -> Result<usize> {
        let mut written = 0;
        for change in changes.iter().filter(|c| c.result.changed) {
            let path = self.root_dir.join(&change.file_path);
            fs::write(&path, &change.result.new_content)
                .with_context(|| format!("Failed to write file: {}", path.display()))?;
            written += 1;
        }
        Ok(written)
    }

    fn relative_path(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root_dir).unwrap_or(path);
        let relative = relative.strip_prefix(".").unwrap_or(relative);
        relative.to_string_lossy().replace('\\', "/")
    }
}

struct FileScan {
    output: ScanOutput,
    /// None when the file could not be fingerprinted; such files are not cached.
    fingerprint: Option<Fingerprint>,
    from_cache: bool,
}

impl FileScan {
    fn failed(file_path: &str, message: &str) -> Self {
        warn!(file = file_path, "{}", message);
        Self {
            output: ScanOutput {
                diagnostics: vec![Diagnostic::new(file_path, DiagnosticKind::ParseFailed, message)],
                ..Default::default()
            },
            fingerprint: None,
            from_cache: false,
        }
    }
}

/// Settings that change what a scan produces.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExtractionSettings<'a> {
    translate_attributes: &'a [String],
    no_translate_attributes: &'a [String],
    translate_attribute_suffixes: &'a [String],
    no_translate_attribute_suffixes: &'a [String],
    ignore_texts: &'a [String],
    allow_patterns: &'a [String],
    deny_patterns: &'a [String],
    recognized_calls: &'a [String],
    namespace: &'a str,
    hash_length: usize,
    dedupe_by_value: bool,
    placeholder_style: crate::core::merge::PlaceholderStyle,
}

fn active_identifier(config: &Config) -> Result<String> {
    let settings = ExtractionSettings {
        translate_attributes: &config.translate_attributes,
        no_translate_attributes: &config.no_translate_attributes,
        translate_attribute_suffixes: &config.translate_attribute_suffixes,
        no_translate_attribute_suffixes: &config.no_translate_attribute_suffixes,
        ignore_texts: &config.ignore_texts,
        allow_patterns: &config.allow_patterns,
        deny_patterns: &config.deny_patterns,
        recognized_calls: &config.recognized_calls,
        namespace: &config.namespace,
        hash_length: config.hash_length,
        dedupe_by_value: config.dedupe_by_value,
        placeholder_style: config.placeholder_style,
    };
    let json = serde_json::to_string(&settings).context("Failed to serialize extraction settings")?;
    let digest = format!("{:x}", Sha256::digest(json.as_bytes()));
    Ok(format!(
        "{}@{}",
        config.translation_fn,
        &digest[..IDENTIFIER_DIGEST_LENGTH]
    ))
}
