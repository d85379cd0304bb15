pub mod compose;
pub mod directive;
pub mod error;
pub mod failure;
pub mod jsonc;
pub mod options;
pub mod position;
pub mod processor;
pub mod replacements;
pub mod sample;
pub mod scanner;

use std::path::Path;

pub use error::{ComposeError, ExtractError, LoadError, ScanError};
pub use failure::Failure;
pub use processor::Processor;
pub use sample::{Kind, Sample};
pub use scanner::Dialect;

/// Extract every sample from a document, choosing the dialect by file extension.
pub fn extract_samples(text: &str, source_file: &str) -> Result<Vec<Sample>, ScanError> {
    let path = Path::new(source_file);
    let dialect = Dialect::from_path(path)
        .map_err(|error| ScanError::new(error, 0, 0..0, source_file))?;
    extract_with(dialect, text, &file_slug(path), source_file)
}

/// Extract every sample from a document in a known dialect.
pub fn extract_with(
    dialect: Dialect,
    text: &str,
    slug: &str,
    source_file: &str,
) -> Result<Vec<Sample>, ScanError> {
    let mut processor = Processor::new(slug, source_file);
    dialect.scan(text, source_file, &mut processor)?;
    Ok(processor.into_samples())
}

/// The document name used to build synthesized ids: the file stem.
pub fn file_slug(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("sample")
        .to_string()
}
