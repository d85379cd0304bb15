use std::ops::Range;
use std::path::PathBuf;

use codespan_reporting::diagnostic::{Diagnostic, Label};
use thiserror::Error;

/// Errors that make a document impossible to process at all.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractError {
    #[error("unknown directive: {0}")]
    UnknownDirective(String),

    #[error("malformed directive `{directive}`: {reason}")]
    MalformedDirective { directive: String, reason: String },

    #[error("duplicate code sample id `{id}` (first defined at {first})")]
    DuplicateId { id: String, first: String },

    #[error("{value} is not a valid {enum_name}. Expected one of: {expected}")]
    InvalidEnumValue {
        enum_name: String,
        value: String,
        expected: String,
    },

    #[error("unknown document format: {0}")]
    UnknownFormat(String),
}

impl ExtractError {
    pub fn malformed(directive: &str, reason: impl Into<String>) -> Self {
        ExtractError::MalformedDirective {
            directive: directive.to_string(),
            reason: reason.into(),
        }
    }
}

/// An [`ExtractError`] pinned to the document line that triggered it.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{source_file}:{}: {error}", .line + 1)]
pub struct ScanError {
    pub error: ExtractError,
    /// 0-based document line.
    pub line: usize,
    /// Byte span of that line in the document.
    pub span: Range<usize>,
    pub source_file: String,
}

impl ScanError {
    pub fn new(error: ExtractError, line: usize, span: Range<usize>, source_file: &str) -> Self {
        ScanError {
            error,
            line,
            span,
            source_file: source_file.to_string(),
        }
    }

    /// Convert to a codespan-reporting Diagnostic for display.
    pub fn to_diagnostic(&self, file_id: usize) -> Diagnostic<usize> {
        let mut notes = Vec::new();
        if let ExtractError::UnknownDirective(_) = self.error {
            notes.push("directives are written as `verifier:<name>[:<args>]`".to_string());
        }
        Diagnostic::error()
            .with_message(self.error.to_string())
            .with_labels(vec![Label::primary(file_id, self.span.clone())])
            .with_notes(notes)
    }
}

/// Composition steps were run out of order.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ComposeError {
    #[error(
        "{descriptor}: sample `{id}` still refers to replacement `{replacement_id}`; replacements must be applied before prefixes"
    )]
    UnresolvedReplacement {
        id: String,
        replacement_id: String,
        descriptor: String,
    },
}

/// Failure to load the directory of replacement sources.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("replacement directory {0} does not exist")]
    MissingDirectory(PathBuf),

    #[error("invalid replacement pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("cannot list replacement sources: {0}")]
    Glob(#[from] glob::GlobError),

    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
