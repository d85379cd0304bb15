use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use crate::error::LoadError;

const SOURCE_EXTENSIONS: &[&str] = &["ts", "js", "txt"];

/// Load external replacement sources, keyed by sample id.
///
/// A file `foo.ts` anywhere under `dir` supplies the source of sample `foo`.
/// Only the first two dot-separated parts of a file name are considered.
pub fn load_sources(dir: &Path) -> Result<HashMap<String, String>, LoadError> {
    if !dir.is_dir() {
        return Err(LoadError::MissingDirectory(dir.to_path_buf()));
    }
    let pattern = dir.join("**").join("*");
    let mut sources = HashMap::new();
    for entry in glob::glob(&pattern.to_string_lossy())? {
        let path = entry?;
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let mut parts = name.split('.');
        let (Some(id), Some(ext)) = (parts.next(), parts.next()) else {
            continue;
        };
        if !SOURCE_EXTENSIONS.contains(&ext) {
            continue;
        }
        let content = std::fs::read_to_string(&path).map_err(|source| LoadError::Io {
            path: path.clone(),
            source,
        })?;
        debug!(id, path = %path.display(), "replacement source");
        sources.insert(id.to_string(), content);
    }
    Ok(sources)
}
