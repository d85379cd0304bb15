use std::path::PathBuf;

use thiserror::Error;

use literate::{ComposeError, ScanError};

/// An external tool could not be run or did not behave as expected.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("cannot find `{tool}`: {source}")]
    ToolNotFound {
        tool: String,
        #[source]
        source: which::Error,
    },

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("refusing to write `{0}`: it is not a plain path inside the sample directory")]
    OutsideSampleDir(String),

    #[error("{0}")]
    Protocol(String),
}

/// Errors that stop the whole run.
#[derive(Debug, Error)]
pub enum FatalError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Compose(#[from] ComposeError),

    #[error("cannot create scratch directory: {0}")]
    Scratch(#[source] std::io::Error),
}
