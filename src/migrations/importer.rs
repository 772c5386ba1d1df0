use anyhow::Result;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::traits::FileSystem;

/// A copy that failed; the run carries on without it
#[derive(Debug, Clone, PartialEq)]
pub struct CopyFailure {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub message: String,
}

/// What happened to each migration file seen under one or more source roots
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportReport {
    /// Destination paths written, in copy order
    pub copied: Vec<PathBuf>,
    pub already_present: usize,
    pub excluded: usize,
    pub failures: Vec<CopyFailure>,
}

impl ImportReport {
    pub fn merge(&mut self, other: ImportReport) {
        self.copied.extend(other.copied);
        self.already_present += other.already_present;
        self.excluded += other.excluded;
        self.failures.extend(other.failures);
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.copied.is_empty()
            && self.already_present == 0
            && self.excluded == 0
            && self.failures.is_empty()
    }
}

/// Copies migration files from a source root into the project's
/// migrations directory, never replacing a file that is already there.
pub struct MigrationImporter<'a> {
    fs: &'a dyn FileSystem,
    destination: PathBuf,
    source_dir: String,
    exclude: Vec<String>,
}

impl<'a> MigrationImporter<'a> {
    pub fn new(
        fs: &'a dyn FileSystem,
        destination: PathBuf,
        source_dir: impl Into<String>,
        exclude: Vec<String>,
    ) -> Self {
        Self {
            fs,
            destination,
            source_dir: source_dir.into(),
            exclude,
        }
    }

    /// Patterns are matched against the lossy UTF-8 form of the name, so a
    /// name that is not valid UTF-8 can still be excluded
    fn is_excluded(&self, file_name: &OsStr) -> bool {
        let file_name = file_name.to_string_lossy();
        self.exclude
            .iter()
            .any(|pattern| file_name.contains(pattern.as_str()))
    }

    /// Import everything under `<root>/<source_dir>`.
    ///
    /// A root without a migrations directory yields an empty report. Failing
    /// to list the directory is an error; failing to copy one file is
    /// recorded in the report.
    pub fn import_from(&self, root: &Path) -> Result<ImportReport> {
        let mut report = ImportReport::default();

        let source = root.join(&self.source_dir);
        if !self.fs.exists(&source) {
            return Ok(report);
        }

        for entry in self.fs.read_dir(&source)? {
            let Some(file_name) = entry.file_name() else {
                continue;
            };

            if self.is_excluded(file_name) {
                report.excluded += 1;
                continue;
            }

            let destination = self.destination.join(file_name);
            if self.fs.exists(&destination) {
                report.already_present += 1;
                continue;
            }

            match self.copy_into_destination(&entry, &destination) {
                Ok(()) => report.copied.push(destination),
                Err(e) => report.failures.push(CopyFailure {
                    source: entry.clone(),
                    destination,
                    message: format!("{:#}", e),
                }),
            }
        }

        Ok(report)
    }

    fn copy_into_destination(&self, source: &Path, destination: &Path) -> Result<()> {
        if !self.fs.is_dir(&self.destination) {
            self.fs.create_dir_all(&self.destination)?;
        }
        self.fs.copy(source, destination)
    }
}
