//! Mapping between sample content positions and document positions.

use std::ops::Range;

/// A span inside a sample's composed content. `line` is 0-based, columns
/// are 0-based character offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentLocation {
    pub line: usize,
    pub start: usize,
    pub end: usize,
}

/// A span in the document. `line` is 1-based, columns are 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentLocation {
    pub line: usize,
    pub start: usize,
    pub end: usize,
}

/// Translate a content line into a 1-based document line.
///
/// Lines that fall inside concatenated prefix material have no document
/// position in this sample and yield `None`.
pub fn remap_line(line_number: usize, prefixes_length: usize, content_line: usize) -> Option<usize> {
    content_line
        .checked_sub(prefixes_length)
        .map(|offset| line_number + offset + 1)
}

pub fn remap(
    line_number: usize,
    prefixes_length: usize,
    location: ContentLocation,
) -> Option<DocumentLocation> {
    remap_line(line_number, prefixes_length, location.line).map(|line| DocumentLocation {
        line,
        start: location.start,
        end: location.end,
    })
}

/// Byte offsets of line starts, for turning line numbers into spans.
#[derive(Debug, Clone)]
pub struct LineIndex {
    starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        LineIndex {
            starts,
            len: text.len(),
        }
    }

    pub fn line_count(&self) -> usize {
        self.starts.len()
    }

    /// Byte span of the 0-based `line`, without its line terminator.
    pub fn line_span(&self, line: usize) -> Range<usize> {
        let Some(&start) = self.starts.get(line) else {
            return self.len..self.len;
        };
        let end = self
            .starts
            .get(line + 1)
            .map(|next| next - 1)
            .unwrap_or(self.len);
        start..end.max(start)
    }
}
