pub mod asciidoc;
pub mod markdown;

use std::path::Path;

use crate::error::{ExtractError, ScanError};
use crate::position::LineIndex;

/// Receives the structural events a scanner finds in a document.
///
/// Both dialects drive this interface and must produce the same events for
/// equivalent documents.
pub trait SampleConsumer {
    /// The 0-based line where the next code block's content begins.
    fn set_line_num(&mut self, line: usize);

    /// A structural heading. Implies a full `reset`.
    fn set_header(&mut self, header: &str);

    /// The text of one directive, without its comment syntax.
    fn set_directive(&mut self, directive: &str) -> Result<(), ExtractError>;

    /// Id marker for the next block, found on 0-based `line`.
    fn set_next_id(&mut self, id: &str, line: usize);

    fn set_next_language(&mut self, language: Option<&str>);

    fn set_in_comment_block(&mut self, in_comment_block: bool);

    /// A complete code block.
    fn add_sample(&mut self, content: &str) -> Result<(), ExtractError>;

    /// Any line that is neither a directive nor a marker.
    fn reset_with_normal_line(&mut self);
}

/// Markup dialect of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Asciidoc,
    Markdown,
}

impl Dialect {
    pub fn from_path(path: &Path) -> Result<Dialect, ExtractError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("asciidoc" | "adoc" | "asc") => Ok(Dialect::Asciidoc),
            Some("md" | "markdown") => Ok(Dialect::Markdown),
            _ => Err(ExtractError::UnknownFormat(path.display().to_string())),
        }
    }

    pub fn scan(
        self,
        text: &str,
        source_file: &str,
        consumer: &mut impl SampleConsumer,
    ) -> Result<(), ScanError> {
        match self {
            Dialect::Asciidoc => asciidoc::scan(text, source_file, consumer),
            Dialect::Markdown => markdown::scan(text, source_file, consumer),
        }
    }
}

/// Attaches document positions to consumer errors.
struct Locator<'a> {
    index: LineIndex,
    source_file: &'a str,
}

impl<'a> Locator<'a> {
    fn new(text: &str, source_file: &'a str) -> Self {
        Locator {
            index: LineIndex::new(text),
            source_file,
        }
    }

    fn locate<T>(&self, line: usize, result: Result<T, ExtractError>) -> Result<T, ScanError> {
        result.map_err(|error| ScanError::new(error, line, self.index.line_span(line), self.source_file))
    }
}

/// Index of the line closing a block opened just before `start`, or
/// `lines.len()` when the block runs to the end of the document.
fn find_closing(lines: &[&str], start: usize, is_close: impl Fn(&str) -> bool) -> usize {
    lines[start.min(lines.len())..]
        .iter()
        .position(|line| is_close(line))
        .map(|offset| start + offset)
        .unwrap_or(lines.len())
}
