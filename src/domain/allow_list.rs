use std::{collections::BTreeSet, fmt, path::Path, str::FromStr};

use serde::Serialize;

/// One of the three tags every AWS resource must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TagKey {
    /// The owning team.
    Team,
    /// The architectural component the resource belongs to.
    Component,
    /// The service the resource belongs to.
    Service,
}

impl TagKey {
    /// All required keys, in the order they are checked and reported.
    pub const ALL: [Self; 3] = [Self::Team, Self::Component, Self::Service];

    /// The tag key as it appears in Terraform source and in the tagging file.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Team => "team",
            Self::Component => "component",
            Self::Service => "service",
        }
    }
}

impl fmt::Display for TagKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TagKey {
    type Err = UnknownTagKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "team" => Ok(Self::Team),
            "component" => Ok(Self::Component),
            "service" => Ok(Self::Service),
            other => Err(UnknownTagKey(other.to_string())),
        }
    }
}

/// Error returned when a string is not one of the required tag keys.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown tag key '{0}': expected one of team, component, service")]
pub struct UnknownTagKey(String);

/// The accepted values for each required tag.
///
/// Built once from a line-oriented `key:value` file and never mutated
/// afterwards. Lines whose prefix is not a [`TagKey`], or which have no value,
/// are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowList {
    teams: BTreeSet<String>,
    components: BTreeSet<String>,
    services: BTreeSet<String>,
}

impl AllowList {
    /// Parses an allow-list from the contents of a tagging file.
    ///
    /// Each line is split on `:` and the second field is taken as the value,
    /// so `team:core:extra` contributes `core`.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let mut allow_list = Self::default();

        for line in content.lines() {
            let mut fields = line.trim().split(':');
            let (Some(prefix), Some(value)) = (fields.next(), fields.next()) else {
                continue;
            };
            let Ok(key) = prefix.parse::<TagKey>() else {
                tracing::trace!("Ignoring tagging line: {line}");
                continue;
            };
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            allow_list.values_mut(key).insert(value.to_string());
        }

        allow_list
    }

    /// Loads an allow-list from a tagging file on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let content = std::fs::read_to_string(path).map_err(|source| LoadError {
            path: path.to_path_buf(),
            source,
        })?;
        let allow_list = Self::parse(&content);
        tracing::debug!(
            "Loaded allow-list from {}: {} teams, {} components, {} services",
            path.display(),
            allow_list.teams.len(),
            allow_list.components.len(),
            allow_list.services.len()
        );
        Ok(allow_list)
    }

    /// Returns the accepted values for a tag key.
    #[must_use]
    pub const fn values(&self, key: TagKey) -> &BTreeSet<String> {
        match key {
            TagKey::Team => &self.teams,
            TagKey::Component => &self.components,
            TagKey::Service => &self.services,
        }
    }

    /// Checks whether `value` is accepted for `key`.
    #[must_use]
    pub fn allows(&self, key: TagKey, value: &str) -> bool {
        self.values(key).contains(value)
    }

    const fn values_mut(&mut self, key: TagKey) -> &mut BTreeSet<String> {
        match key {
            TagKey::Team => &mut self.teams,
            TagKey::Component => &mut self.components,
            TagKey::Service => &mut self.services,
        }
    }
}

/// The tagging file could not be read.
#[derive(Debug, thiserror::Error)]
#[error("failed to read tagging file {}", path.display())]
pub struct LoadError {
    path: std::path::PathBuf,
    #[source]
    source: std::io::Error,
}
