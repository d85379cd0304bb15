use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use tempfile::TempDir;
use tracing::debug;

use literate::sample::AuxiliaryFile;

use crate::error::BackendError;

/// The per-run working directory. Each sample gets a directory of its own
/// beneath it; copied `node_modules` and the detail log sit at the root,
/// where module resolution from every sample directory finds them.
#[derive(Debug)]
pub struct Scratch {
    dir: TempDir,
}

impl Scratch {
    pub fn new() -> io::Result<Self> {
        Scratch::create(false)
    }

    /// A scratch directory that outlives the run, so its log can be read.
    pub fn kept() -> io::Result<Self> {
        Scratch::create(true)
    }

    fn create(keep: bool) -> io::Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("literate-")
            .keep(keep)
            .tempdir()?;
        Ok(Scratch { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// An empty directory for the files of sample `id`.
    pub fn sample_dir(&self, id: &str) -> Result<SampleDir, BackendError> {
        let path = self.path().join("samples").join(contained(id)?);
        let write_error = |source| BackendError::Write {
            path: path.clone(),
            source,
        };
        if path.exists() {
            fs::remove_dir_all(&path).map_err(write_error)?;
        }
        fs::create_dir_all(&path).map_err(write_error)?;
        Ok(SampleDir { path })
    }

    /// Make `node_modules/<name>` available to samples, copying it from the
    /// nearest `node_modules` at or above `document_dir`.
    ///
    /// On failure returns every location that was tried.
    pub fn install_node_module(&self, name: &str, document_dir: &Path) -> Result<(), Vec<PathBuf>> {
        let target = self.path().join("node_modules").join(name);
        if target.exists() {
            return Ok(());
        }
        let candidates: Vec<PathBuf> = document_dir
            .ancestors()
            .map(|dir| dir.join("node_modules").join(name))
            .collect();
        let Some(found) = candidates.iter().find(|c| c.is_dir()) else {
            return Err(candidates);
        };
        debug!(from = %found.display(), to = %target.display(), "copying module");
        copy_dir(found, &target).map_err(|_| vec![found.clone()])
    }
}

/// Where one sample's unit, auxiliary files and compiler output live.
#[derive(Debug, Clone)]
pub struct SampleDir {
    path: PathBuf,
}

impl SampleDir {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `name`, which must stay inside this directory.
    pub fn write_file(&self, name: &str, content: &str) -> Result<PathBuf, BackendError> {
        let path = self.path.join(contained(name)?);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| BackendError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&path, content).map_err(|source| BackendError::Write {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    pub fn write_auxiliary_files(&self, files: &[AuxiliaryFile]) -> Result<(), BackendError> {
        for file in files {
            self.write_file(&file.filename, &file.content)?;
        }
        Ok(())
    }
}

/// `name` as a relative path with no `..`, root or prefix components.
fn contained(name: &str) -> Result<&Path, BackendError> {
    let path = Path::new(name);
    let plain = path.components().next().is_some()
        && path.components().all(|c| matches!(c, Component::Normal(_)));
    if plain {
        Ok(path)
    } else {
        Err(BackendError::OutsideSampleDir(name.to_string()))
    }
}

fn copy_dir(from: &Path, to: &Path) -> io::Result<()> {
    fs::create_dir_all(to)?;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let dest = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir(&entry.path(), &dest)?;
        } else {
            fs::copy(entry.path(), dest)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn files_stay_inside_the_sample_directory() {
        let scratch = Scratch::new().unwrap();
        let dir = scratch.sample_dir("first").unwrap();
        let written = dir.write_file("lib/types.ts", "export type T = 1;").unwrap();
        assert!(written.starts_with(dir.path()));

        for name in ["../escape.ts", "/etc/passwd", "", "a/../../b.ts"] {
            assert!(
                matches!(dir.write_file(name, ""), Err(BackendError::OutsideSampleDir(_))),
                "{} was accepted",
                name
            );
        }
        assert!(scratch.sample_dir("..").is_err());
    }

    #[test]
    fn auxiliary_files_do_not_leak_between_samples() {
        let scratch = Scratch::new().unwrap();
        let first = scratch.sample_dir("first").unwrap();
        first
            .write_auxiliary_files(&[AuxiliaryFile {
                filename: "helper.ts".to_string(),
                content: "export const x = 1;".to_string(),
            }])
            .unwrap();
        assert!(first.path().join("helper.ts").exists());

        let second = scratch.sample_dir("second").unwrap();
        assert!(!second.path().join("helper.ts").exists());

        // Checking a sample again starts from an empty directory.
        let again = scratch.sample_dir("first").unwrap();
        assert!(!again.path().join("helper.ts").exists());
    }
}
