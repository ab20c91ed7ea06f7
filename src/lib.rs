//! Terraform Guardrails
//!
//! Two independent checks for Terraform-managed AWS infrastructure: a
//! tag-compliance linter over `.tf` sources, and an auditor that walks a
//! GitHub repository's pull requests looking for network-related changes.

pub mod domain;
pub use domain::{AllowList, NetworkTerms, PullRequest, PullRequestFile, RepoSlug, TagKey, Violation};

/// Filesystem access: Terraform source scanning and auditor configuration.
pub mod storage;
pub use storage::{AuditConfig, Directory};

/// GitHub REST client and the pull-request auditor built on it.
pub mod github;
pub use github::{AuditReport, Auditor, Client};
