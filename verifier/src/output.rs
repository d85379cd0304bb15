//! Comparing what a program printed with what the document says it prints.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use similar::{Algorithm, TextDiff};

use literate::compose::strip_hide_markers;
use literate::failure::Failure;
use literate::sample::{Sample, SampleOutput};

static NODE_BANNER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^Node\.js v\d+").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputMismatch {
    pub expected: String,
    pub actual: String,
}

impl OutputMismatch {
    pub fn diff(&self) -> String {
        TextDiff::configure()
            .algorithm(Algorithm::Myers)
            .diff_lines(&self.expected, &self.actual)
            .unified_diff()
            .header("expected", "actual")
            .to_string()
    }

    pub fn into_failure(self, sample: &Sample, message: &str) -> Failure {
        let diff = self.diff();
        Failure::new(sample, message)
            .with_detail(format!("Expected:\n{}", self.expected))
            .with_detail(format!("Actual:\n{}", self.actual))
            .with_detail(diff)
    }
}

/// Make captured program output comparable across machines: stack frames,
/// the runtime's version banner and scratch paths are removed.
pub fn clean_output(output: &SampleOutput, scratch_dir: Option<&Path>) -> String {
    let scratch = scratch_dir.map(|dir| dir.display().to_string());
    let combined = format!("{}{}", output.stderr, output.stdout);
    combined
        .split('\n')
        .filter(|line| !line.starts_with("    at "))
        .filter(|line| !NODE_BANNER.is_match(line))
        .map(|line| match &scratch {
            Some(dir) if !dir.is_empty() => line
                .replace(&format!("/private{}", dir), "")
                .replace(dir.as_str(), ""),
            _ => line.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Compare an expected-output block with what its paired sample printed.
pub fn check_output(
    expected: &str,
    actual: &SampleOutput,
    scratch_dir: Option<&Path>,
) -> Result<(), OutputMismatch> {
    let expected = strip_hide_markers(expected).trim().to_string();
    let actual = clean_output(actual, scratch_dir);
    if expected == actual {
        Ok(())
    } else {
        Err(OutputMismatch { expected, actual })
    }
}

/// Halve leading indentation: the compiler emits four-space indents, the
/// prose uses two.
pub fn reduce_indentation(text: &str) -> String {
    text.split('\n')
        .map(|line| {
            let body = line.trim_start_matches(' ');
            let indent = line.len() - body.len();
            format!("{}{}", " ".repeat(indent / 2), body)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Compare an `-emit-js` block with the JavaScript emitted for its input.
pub fn check_emit_output(expected: &str, emitted: &str) -> Result<(), OutputMismatch> {
    let actual = reduce_indentation(emitted.trim());
    let expected = expected.trim();
    if expected == actual {
        Ok(())
    } else {
        Err(OutputMismatch {
            expected: expected.to_string(),
            actual,
        })
    }
}
