use std::fmt;
use std::ops::Range;

use codespan_reporting::diagnostic::{Diagnostic, Label};

use crate::position::{ContentLocation, DocumentLocation, remap};
use crate::sample::Sample;

/// A recorded, non-fatal verification failure of one sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    pub descriptor: String,
    pub source_file: String,
    pub message: String,
    /// Where in the document the problem is, if it has a position.
    pub location: Option<DocumentLocation>,
    /// Supporting lines for the detail log (expected/actual text, diffs).
    pub details: Vec<String>,
}

impl Failure {
    pub fn new(sample: &Sample, message: impl Into<String>) -> Self {
        Failure {
            descriptor: sample.descriptor.clone(),
            source_file: sample.source_file.clone(),
            message: message.into(),
            location: None,
            details: Vec::new(),
        }
    }

    /// A failure at a position in the sample's composed content.
    ///
    /// Positions inside concatenated prefix material are reported on the
    /// sample's own first line.
    pub fn at(sample: &Sample, message: impl Into<String>, location: ContentLocation) -> Self {
        let location = remap(sample.line_number, sample.prefixes_length, location)
            .unwrap_or_else(|| {
                let first_line = sample.displayed_content().split('\n').next().unwrap_or("");
                DocumentLocation {
                    line: sample.line_number + 1,
                    start: 0,
                    end: first_line.chars().count(),
                }
            });
        Failure {
            location: Some(location),
            ..Failure::new(sample, message)
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.details.push(detail.into());
        self
    }

    /// Convert to a codespan-reporting Diagnostic.
    ///
    /// `line_span` is the byte span of `location.line` in the document, when
    /// the caller has the document loaded.
    pub fn to_diagnostic(&self, file_id: usize, line_span: Option<Range<usize>>) -> Diagnostic<usize> {
        let mut diagnostic = Diagnostic::error().with_message(&self.message);
        match (self.location, line_span) {
            (Some(location), Some(span)) => {
                let start = (span.start + location.start).min(span.end);
                let end = (span.start + location.end).clamp(start, span.end);
                diagnostic = diagnostic.with_labels(vec![
                    Label::primary(file_id, start..end).with_message(&self.descriptor),
                ]);
            }
            _ => {
                diagnostic = diagnostic.with_notes(vec![format!("in sample {}", self.descriptor)]);
            }
        }
        diagnostic
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(location) => write!(
                f,
                "{}:{}:{}-{}: {}",
                self.source_file,
                location.line,
                location.start + 1,
                location.end + 1,
                self.message
            ),
            None => write!(f, "{}: {}", self.descriptor, self.message),
        }
    }
}
