//! Flags pull requests whose Terraform changes touch networking.

use serde::Serialize;

use super::{Client, Error, HttpTransport, Transport};
use crate::domain::{NetworkTerms, PullRequest, PullRequestFile, RepoSlug};

/// A Terraform file whose patch mentions network terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlaggedFile {
    /// Path of the file within the repository.
    pub filename: String,
    /// The vocabulary terms found in the patch.
    pub terms: Vec<&'static str>,
}

/// The audit result for one pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRequestReport {
    /// Pull request number.
    pub number: u64,
    /// Pull request title.
    pub title: String,
    /// Number of changed `.tf` files inspected.
    pub terraform_files: usize,
    /// Terraform files with network-related changes.
    pub flagged: Vec<FlaggedFile>,
    /// Set when the file list could not be fetched. The pull request is then
    /// treated as having no files.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch_failure: Option<String>,
}

/// The audit result for a whole repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    /// The audited repository.
    pub repo: RepoSlug,
    /// One entry per pull request, in the order the API listed them.
    pub pull_requests: Vec<PullRequestReport>,
}

impl AuditReport {
    /// Total number of flagged files across all pull requests.
    #[must_use]
    pub fn flagged_files(&self) -> usize {
        self.pull_requests.iter().map(|pr| pr.flagged.len()).sum()
    }

    /// Pull requests whose file list could not be fetched.
    pub fn fetch_failures(&self) -> impl Iterator<Item = &PullRequestReport> {
        self.pull_requests
            .iter()
            .filter(|pr| pr.fetch_failure.is_some())
    }
}

/// Walks a repository's pull requests looking for network changes.
#[derive(Debug, Clone)]
pub struct Auditor<T = HttpTransport> {
    client: Client<T>,
    terms: NetworkTerms,
}

impl<T: Transport> Auditor<T> {
    /// Creates an auditor matching patches against `terms`.
    #[must_use]
    pub const fn new(client: Client<T>, terms: NetworkTerms) -> Self {
        Self { client, terms }
    }

    /// Audits every pull request of `repo`.
    ///
    /// # Errors
    ///
    /// See [`Auditor::audit_with`].
    pub fn audit(&self, repo: &RepoSlug) -> Result<AuditReport, Error> {
        self.audit_with(repo, |_| {})
    }

    /// Audits every pull request of `repo`, calling `on_report` as each one
    /// completes.
    ///
    /// Failing to list pull requests is fatal. A non-200 answer for one pull
    /// request's files is not: it is logged, recorded on that pull request's
    /// report, and the audit moves on.
    ///
    /// # Errors
    ///
    /// Returns an error if the pull request list cannot be fetched, or if a
    /// file list request fails without any response or returns an
    /// unreadable body.
    #[tracing::instrument(level = "debug", skip(self, repo, on_report), fields(repo = %repo))]
    pub fn audit_with(
        &self,
        repo: &RepoSlug,
        mut on_report: impl FnMut(&PullRequestReport),
    ) -> Result<AuditReport, Error> {
        let pull_requests = self.client.pull_requests(repo)?;
        tracing::info!("Auditing {} pull requests in {repo}", pull_requests.len());

        let mut reports = Vec::with_capacity(pull_requests.len());
        for pull_request in pull_requests {
            let report = self.audit_pull_request(repo, pull_request)?;
            on_report(&report);
            reports.push(report);
        }

        Ok(AuditReport {
            repo: repo.clone(),
            pull_requests: reports,
        })
    }

    fn audit_pull_request(
        &self,
        repo: &RepoSlug,
        pull_request: PullRequest,
    ) -> Result<PullRequestReport, Error> {
        let (files, fetch_failure) = match self.client.pull_request_files(repo, pull_request.number) {
            Ok(files) => (files, None),
            Err(error @ Error::Status { .. }) => {
                tracing::warn!(
                    "Failed to fetch files for PR #{}: {error}",
                    pull_request.number
                );
                (Vec::new(), Some(error.to_string()))
            }
            Err(error) => return Err(error),
        };

        let terraform_files = files.iter().filter(|file| file.is_terraform()).count();
        let flagged = self.flag_files(&files);
        for file in &flagged {
            tracing::debug!(
                "PR #{}: {} matches {:?}",
                pull_request.number,
                file.filename,
                file.terms
            );
        }

        Ok(PullRequestReport {
            number: pull_request.number,
            title: pull_request.title,
            terraform_files,
            flagged,
            fetch_failure,
        })
    }
}

impl<T> Auditor<T> {
    /// Returns the Terraform files among `files` whose patch contains a
    /// network term. Non-Terraform files are never flagged.
    #[must_use]
    pub fn flag_files(&self, files: &[PullRequestFile]) -> Vec<FlaggedFile> {
        files
            .iter()
            .filter(|file| file.is_terraform())
            .filter_map(|file| {
                let terms = self.terms.matching(file.patch());
                (!terms.is_empty()).then(|| FlaggedFile {
                    filename: file.filename.clone(),
                    terms,
                })
            })
            .collect()
    }
}
