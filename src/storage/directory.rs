//! A filesystem backed tree of Terraform sources
//!
//! The [`Directory`] finds every `.tf` file below a root and validates the
//! AWS resources they declare against an [`AllowList`].

use std::{
    io,
    path::{Path, PathBuf},
};

use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use serde::Serialize;
use walkdir::WalkDir;

use crate::domain::{AllowList, Violation, resource::extract_resources, validate_resources};

/// Directory names that are never scanned. `.terraform` holds provider
/// binaries and downloaded module copies.
const SKIPPED_DIRS: [&str; 1] = [".terraform"];

/// A directory of Terraform source files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directory {
    root: PathBuf,
}

/// The outcome of validating a [`Directory`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TagReport {
    /// Number of `.tf` files read.
    pub files_scanned: usize,
    /// Number of AWS resource blocks found across all files.
    pub resources_checked: usize,
    /// Every violation, ordered by file then by position within the file.
    pub violations: Vec<Violation>,
}

impl TagReport {
    /// Whether every resource passed validation.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

#[derive(Debug)]
struct FileReport {
    resources: usize,
    violations: Vec<Violation>,
}

impl Directory {
    /// Opens a directory at the given path.
    #[must_use]
    pub const fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// The root of the tree.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lists every `.tf` file below the root, sorted by file name within
    /// each directory.
    ///
    /// # Errors
    ///
    /// Returns an error if any part of the tree cannot be read.
    pub fn terraform_files(&self) -> Result<Vec<PathBuf>, ScanError> {
        let mut paths = Vec::new();

        let walker = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                !(entry.file_type().is_dir()
                    && SKIPPED_DIRS.iter().any(|skipped| entry.file_name() == *skipped))
            });

        for entry in walker {
            let entry = entry?;
            if entry.file_type().is_dir() {
                continue;
            }
            if entry.file_name().to_string_lossy().ends_with(".tf") {
                paths.push(entry.into_path());
            }
        }

        Ok(paths)
    }

    /// Validates every AWS resource in the tree against `allow_list`.
    ///
    /// The whole tree is always scanned; violations never stop the run.
    /// Violation paths are relative to the root.
    ///
    /// # Errors
    ///
    /// Returns an error if the tree cannot be walked or any `.tf` file cannot
    /// be read.
    pub fn validate(&self, allow_list: &AllowList) -> Result<TagReport, ScanError> {
        let paths = self.terraform_files()?;
        tracing::info!("Scanning {} Terraform files in {}", paths.len(), self.root.display());

        let reports = paths
            .par_iter()
            .map(|path| self.validate_file(path, allow_list))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(TagReport {
            files_scanned: paths.len(),
            resources_checked: reports.iter().map(|report| report.resources).sum(),
            violations: reports
                .into_iter()
                .flat_map(|report| report.violations)
                .collect(),
        })
    }

    fn validate_file(&self, path: &Path, allow_list: &AllowList) -> Result<FileReport, ScanError> {
        let source = std::fs::read_to_string(path).map_err(|source| ScanError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let resources = extract_resources(&source);
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let violations = validate_resources(relative, &resources, allow_list);

        tracing::debug!(
            "{}: {} AWS resources, {} violations",
            relative.display(),
            resources.len(),
            violations.len()
        );

        Ok(FileReport {
            resources: resources.len(),
            violations,
        })
    }
}

/// Errors that abort a scan.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The directory tree could not be walked.
    #[error("failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),

    /// A Terraform file could not be read.
    #[error("failed to read {}", path.display())]
    Read {
        /// The unreadable file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
}
