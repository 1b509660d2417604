//! glotx - extract hardcoded UI text into translation calls
//!
//! glotx is a CLI tool and library that finds human-readable text in
//! component sources (JSX/TSX, Vue, Svelte), merges text and dynamic
//! sub-expressions into interpolation templates, derives stable keys and
//! rewrites the source to call the translation function.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer
//! - `config`: Configuration file loading and validation
//! - `core`: Extraction, merging, key generation and rewrite engine
//! - `utils`: Shared text helpers

pub mod cli;
pub mod config;
pub mod core;
pub mod utils;
