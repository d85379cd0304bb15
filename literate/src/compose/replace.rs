use std::collections::HashMap;

use similar::{Algorithm, TextDiff};
use tracing::{debug, info};

use crate::compose::strip::strip_source;
use crate::failure::Failure;
use crate::sample::Sample;

/// A printed sample that does not match its full source.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceMismatch {
    pub expected: String,
    pub actual: String,
    pub diff: String,
}

impl SourceMismatch {
    pub fn into_failure(self, sample: &Sample) -> Failure {
        Failure::new(sample, "Inline sample does not match sample in source file")
            .with_detail(format!("Inline sample:\n{}", self.expected))
            .with_detail(format!("Stripped source file sample:\n{}", self.actual))
            .with_detail(self.diff)
    }
}

/// Check that `content` is what `source` looks like once stripped.
pub fn check_source(content: &str, source: &str) -> Result<(), SourceMismatch> {
    let expected = content.trim();
    let stripped = strip_source(source);
    let actual = stripped.trim();
    if expected == actual {
        return Ok(());
    }
    let diff = TextDiff::configure()
        .algorithm(Algorithm::Myers)
        .diff_lines(expected, actual)
        .unified_diff()
        .header("inline", "source")
        .to_string();
    Err(SourceMismatch {
        expected: expected.to_string(),
        actual: actual.to_string(),
        diff,
    })
}

/// Substitute full sources for the printed samples they stand in for.
///
/// External `sources` (keyed by sample id) are applied first, then inline
/// `replace-with-id` references to other samples of the same document. A
/// replacement is only taken once the printed content checks out against
/// it. A reference to an id that does not exist marks the sample `skip`.
pub fn apply_replacements(
    samples: Vec<Sample>,
    sources: &HashMap<String, String>,
    failures: &mut Vec<Failure>,
) -> Vec<Sample> {
    let mut samples: Vec<Sample> = samples
        .into_iter()
        .map(|mut sample| {
            if let Some(source) = sources.get(&sample.id) {
                match check_source(&sample.content, source) {
                    Ok(()) => {
                        debug!(id = %sample.id, "using external source");
                        sample.original_content = Some(std::mem::replace(&mut sample.content, source.clone()));
                    }
                    Err(mismatch) => failures.push(mismatch.into_failure(&sample)),
                }
            }
            sample
        })
        .collect();

    let contents: HashMap<String, String> = samples
        .iter()
        .map(|s| (s.id.clone(), s.content.clone()))
        .collect();

    for sample in &mut samples {
        let Some(replacement_id) = sample.replacement_id.take() else {
            continue;
        };
        let Some(source) = contents.get(&replacement_id) else {
            failures.push(Failure::new(
                sample,
                format!("No sample with id #{} to replace this one with", replacement_id),
            ));
            sample.skip = true;
            continue;
        };
        match check_source(&sample.content, source) {
            Ok(()) => {
                info!(id = %sample.id, replacement = %replacement_id, "replaced inline sample");
                sample.original_content = Some(std::mem::replace(&mut sample.content, source.clone()));
            }
            Err(mismatch) => failures.push(mismatch.into_failure(sample)),
        }
    }
    samples
}
