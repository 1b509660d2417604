//! Extraction, interpolation merging and rewrite engine.
//!
//! Leaf-first:
//!
//! - `tree` / `parsers`: generic syntax tree and the providers producing it
//! - `classify`: decides whether a text fragment is translatable prose
//! - `merge`: folds adjacent static and dynamic siblings into one template
//! - `keygen`: deterministic translation keys
//! - `adapters`: per-dialect scan and mutate over the shared pieces
//! - `rewrite`: applies byte-range edits
//! - `cache`: per-file fingerprint cache
//! - `context`: the run pipeline tying everything together

pub mod adapters;
pub mod cache;
pub mod candidate;
pub mod classify;
pub mod context;
pub mod diagnostics;
pub mod file_scanner;
pub mod keygen;
pub mod merge;
pub mod options;
pub mod parsers;
pub mod position;
pub mod rewrite;
pub mod tree;

pub use candidate::{Candidate, CandidateKind, CandidateStatus, TransformCandidate};
pub use context::{ExtractContext, FileChange, ScanOptions, ScanReport};
