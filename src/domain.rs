//! Domain models for tag validation and pull-request auditing.
//!
//! This module contains the allow-list, the Terraform resource extraction
//! logic, tag violations, and the records returned by the GitHub API.

/// Allow-list of accepted tag values.
pub mod allow_list;
pub use allow_list::{AllowList, TagKey};

/// Terraform resource block extraction.
pub mod resource;
pub use resource::{ResourceBlock, Tags};

mod violation;
pub use violation::{Violation, ViolationKind};

mod network;
pub use network::{NETWORK_TERMS, NetworkTerms};

mod pull_request;
pub use pull_request::{PullRequest, PullRequestFile};

mod repo;
pub use repo::{InvalidRepoError, RepoSlug};

use std::path::Path;

/// Validate extracted resources against the allow-list.
///
/// Violations are returned in resource order. A resource without a `tags`
/// block yields exactly one [`ViolationKind::MissingTagsBlock`] and no
/// per-key violations.
#[must_use]
pub fn validate_resources(
    path: &Path,
    resources: &[ResourceBlock<'_>],
    allow_list: &AllowList,
) -> Vec<Violation> {
    resources
        .iter()
        .flat_map(|resource| validate_resource(path, resource, allow_list))
        .collect()
}

fn validate_resource(path: &Path, resource: &ResourceBlock<'_>, allow_list: &AllowList) -> Vec<Violation> {
    let violation = |kind| Violation::new(path, resource, kind);

    let Some(tags) = resource.tags() else {
        return vec![violation(ViolationKind::MissingTagsBlock)];
    };

    TagKey::ALL
        .into_iter()
        .filter_map(|key| match tags.get(key.as_str()) {
            None => Some(violation(ViolationKind::MissingTag { key })),
            Some(value) if !allow_list.allows(key, value) => Some(violation(ViolationKind::InvalidValue {
                key,
                value: value.clone(),
            })),
            Some(_) => None,
        })
        .collect()
}
