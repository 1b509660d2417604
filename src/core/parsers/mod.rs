//! Tree providers: per-dialect parsers that deliver a generic [`SyntaxTree`].
//!
//! Providers are injected into the adapters. A provider that cannot handle
//! a file answers [`ParseOutcome::Unavailable`], which the adapter treats
//! exactly like a missing optional parser: it falls back to the
//! conservative extractor and records a diagnostic.
//!
//! - `jsx`: JS/TS/JSX/TSX via swc

pub mod jsx;

use crate::core::tree::SyntaxTree;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    Parsed(SyntaxTree),
    /// No parser is available for this file's dialect.
    Unavailable,
    /// The parser rejected the file.
    Failed { message: String, line: Option<usize> },
}

pub trait TreeProvider: Send + Sync {
    fn parse(&self, file_path: &str, content: &str) -> ParseOutcome;
}

impl<F> TreeProvider for F
where
    F: Fn(&str, &str) -> ParseOutcome + Send + Sync,
{
    fn parse(&self, file_path: &str, content: &str) -> ParseOutcome {
        self(file_path, content)
    }
}

/// Provider for dialects without a built-in parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTreeProvider;

impl TreeProvider for NoTreeProvider {
    fn parse(&self, _file_path: &str, _content: &str) -> ParseOutcome {
        ParseOutcome::Unavailable
    }
}
