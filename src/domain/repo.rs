use std::{fmt, str::FromStr};

use non_empty_string::NonEmptyString;
use serde::{Serialize, Serializer};

/// A GitHub repository identifier in `owner/name` form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RepoSlug {
    owner: NonEmptyString,
    name: NonEmptyString,
}

impl RepoSlug {
    /// The account or organisation owning the repository.
    #[must_use]
    pub fn owner(&self) -> &str {
        self.owner.as_str()
    }

    /// The repository name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }
}

impl FromStr for RepoSlug {
    type Err = InvalidRepoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidRepoError(s.to_string());

        let (owner, name) = s.trim().split_once('/').ok_or_else(invalid)?;
        if name.contains('/') || owner.contains(char::is_whitespace) || name.contains(char::is_whitespace) {
            return Err(invalid());
        }

        Ok(Self {
            owner: NonEmptyString::from_str(owner).map_err(|_| invalid())?,
            name: NonEmptyString::from_str(name).map_err(|_| invalid())?,
        })
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl Serialize for RepoSlug {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Error returned when a repository identifier is not `owner/name`.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("invalid repository '{0}': expected 'owner/name'")]
pub struct InvalidRepoError(String);

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test]
    fn parses_owner_and_name() {
        let slug: RepoSlug = "acme/infrastructure".parse().unwrap();

        assert_eq!(slug.owner(), "acme");
        assert_eq!(slug.name(), "infrastructure");
        assert_eq!(slug.to_string(), "acme/infrastructure");
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        let slug: RepoSlug = "  acme/infra \n".parse().unwrap();
        assert_eq!(slug.to_string(), "acme/infra");
    }

    #[test_case(""; "empty")]
    #[test_case("acme"; "no slash")]
    #[test_case("/infra"; "empty owner")]
    #[test_case("acme/"; "empty name")]
    #[test_case("acme/infra/extra"; "too many segments")]
    #[test_case("acme corp/infra"; "inner whitespace")]
    fn rejects_malformed(input: &str) {
        assert_eq!(
            input.parse::<RepoSlug>(),
            Err(InvalidRepoError(input.to_string()))
        );
    }
}
