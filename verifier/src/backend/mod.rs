//! Interfaces to the external tools samples are checked with.

mod node;
mod tsc;

use std::path::Path;

pub use node::{NodeRepl, NodeRunner};
pub use tsc::TscChecker;

use literate::options::CompilerOptions;
use literate::sample::SampleOutput;

use crate::error::BackendError;

/// An error span in a checked unit, or one the author expects there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerError {
    /// 0-based line.
    pub line: usize,
    pub start: usize,
    pub end: usize,
    pub message: String,
}

/// What to do with a unit besides type checking it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    CheckOnly,
    /// Compile and run; a `-output` sample expects what it prints.
    Run,
    /// Compile; a `-emit-js` sample expects the emitted JavaScript.
    Emit,
}

/// Ask for the type at a position. `character` is `None` to mean "the
/// first identifier on the line".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeQuery {
    pub line: usize,
    pub character: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct CheckRequest<'a> {
    pub file_name: &'a str,
    pub content: &'a str,
    pub jsx: bool,
    pub options: &'a CompilerOptions,
    /// Directory holding the unit and its auxiliary files, beneath the
    /// scratch root with its `node_modules`.
    pub work_dir: &'a Path,
    pub mode: OutputMode,
    pub type_queries: &'a [TypeQuery],
}

#[derive(Debug, Clone, Default)]
pub struct CheckResult {
    pub diagnostics: Vec<CompilerError>,
    /// Emitted JavaScript, in emit mode.
    pub emitted: Option<String>,
    /// Program output, in run mode.
    pub output: Option<SampleOutput>,
    /// One answer per type query, or `None` if the checker cannot answer
    /// type queries at all.
    pub types: Option<Vec<Option<String>>>,
}

pub trait TypeChecker {
    fn version(&self) -> String;

    fn check(&mut self, request: &CheckRequest<'_>) -> Result<CheckResult, BackendError>;
}

pub trait ScriptRunner {
    /// Run a script; color and formatting must not depend on the terminal.
    fn run(&mut self, path: &Path) -> Result<SampleOutput, BackendError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionInput {
    Statement(String),
    /// Start a fresh session.
    Reset,
}

pub trait SessionRunner {
    /// Replay `inputs`, returning one captured output block per statement.
    fn replay(
        &mut self,
        inputs: &[SessionInput],
        preamble: Option<&Path>,
    ) -> Result<Vec<String>, BackendError>;
}
