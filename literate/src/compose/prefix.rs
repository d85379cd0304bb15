use std::collections::HashMap;

use tracing::debug;

use crate::error::ComposeError;
use crate::failure::Failure;
use crate::jsonc;
use crate::sample::{AuxiliaryFile, Kind, Sample};

/// Build each sample's standalone source from its prefixes.
///
/// Prefixes pointing at a `prepend-as-file` sample become auxiliary files;
/// all others are concatenated, in order, ahead of the sample's own content.
/// Expected-output blocks never receive prefixes.
pub fn apply_prefixes(
    samples: Vec<Sample>,
    failures: &mut Vec<Failure>,
) -> Result<Vec<Sample>, ComposeError> {
    // References resolve against content as it was before any prefixing.
    let table: HashMap<String, Sample> = samples
        .iter()
        .map(|s| (s.id.clone(), s.clone()))
        .collect();

    samples
        .into_iter()
        .map(|sample| compose_one(sample, &table, failures))
        .collect()
}

fn compose_one(
    mut sample: Sample,
    table: &HashMap<String, Sample>,
    failures: &mut Vec<Failure>,
) -> Result<Sample, ComposeError> {
    if let Some(replacement_id) = &sample.replacement_id {
        return Err(ComposeError::UnresolvedReplacement {
            id: sample.id.clone(),
            replacement_id: replacement_id.clone(),
            descriptor: sample.descriptor.clone(),
        });
    }
    if sample.is_output() || sample.prefixes.is_empty() {
        return Ok(sample);
    }

    let mut fragments: Vec<String> = Vec::new();
    let mut prefixes_length = 0;
    let mut auxiliary_files = Vec::new();

    for prefix in &sample.prefixes {
        let Some(referenced) = table.get(&prefix.id) else {
            failures.push(Failure::new(
                &sample,
                format!("Unable to find prefix with id #{}", prefix.id),
            ));
            continue;
        };

        if let Some(filename) = &referenced.target_filename {
            let content = match referenced.kind {
                Kind::Json => jsonc::to_json(&referenced.content),
                _ => referenced.content.clone(),
            };
            auxiliary_files.push(AuxiliaryFile {
                filename: filename.clone(),
                content,
            });
            continue;
        }

        let lines: Vec<&str> = match prefix.lines {
            Some(range) => range.slice(&referenced.content),
            None => referenced.content.split('\n').collect(),
        };
        prefixes_length += lines.len();
        fragments.push(lines.join("\n"));
    }

    debug!(
        id = %sample.id,
        prefixes = fragments.len(),
        auxiliary = auxiliary_files.len(),
        "applying prefixes"
    );

    if !fragments.is_empty() {
        let own = std::mem::take(&mut sample.content);
        if sample.original_content.is_none() {
            sample.original_content = Some(own.clone());
        }
        fragments.push(own);
        sample.content = fragments.join("\n");
    }
    sample.prefixes_length = prefixes_length;
    sample.auxiliary_files = auxiliary_files;
    Ok(sample)
}
