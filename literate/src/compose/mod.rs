//! Second pass over a fully scanned document: turn each sample into a
//! standalone unit.
//!
//! Order matters. Replacements run first so that prefixes see the final
//! content of every sample, and the equivalent-type rewrite runs last on
//! the fully assembled source.

mod prefix;
mod replace;
mod resolved;
mod strip;

use std::collections::HashMap;

pub use prefix::apply_prefixes;
pub use replace::{SourceMismatch, apply_replacements, check_source};
pub use resolved::add_resolved_checks;
pub use strip::{strip_hide_markers, strip_source};

use crate::error::ComposeError;
use crate::failure::Failure;
use crate::sample::Sample;

/// Run the whole pipeline. Soft failures are appended to `failures`.
pub fn compose(
    samples: Vec<Sample>,
    sources: &HashMap<String, String>,
    failures: &mut Vec<Failure>,
) -> Result<Vec<Sample>, ComposeError> {
    let samples = apply_replacements(samples, sources, failures);
    let samples = apply_prefixes(samples, failures)?;
    Ok(samples.into_iter().map(add_resolved_checks).collect())
}
