use serde::{Deserialize, Serialize};

/// A pull request as returned by `GET /repos/{repo}/pulls`.
///
/// Only the fields the auditor needs are kept; everything else in the API
/// response is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    /// The sequential number of the pull request within its repository.
    pub number: u64,
    /// The pull request title.
    pub title: String,
}

/// A changed file as returned by `GET /repos/{repo}/pulls/{number}/files`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestFile {
    /// Path of the file within the repository.
    pub filename: String,
    /// Unified diff of the change. GitHub omits it for binary files and for
    /// diffs that are too large.
    #[serde(default)]
    pub patch: Option<String>,
}

impl PullRequestFile {
    /// Whether the file is Terraform source.
    #[must_use]
    pub fn is_terraform(&self) -> bool {
        self.filename.ends_with(".tf")
    }

    /// The patch text, or an empty string when GitHub did not send one.
    #[must_use]
    pub fn patch(&self) -> &str {
        self.patch.as_deref().unwrap_or_default()
    }
}
