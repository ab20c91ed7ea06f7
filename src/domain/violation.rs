use std::{
    fmt,
    path::{Path, PathBuf},
};

use serde::Serialize;

use super::{ResourceBlock, TagKey};

/// A tagging problem on one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// The `.tf` file declaring the resource.
    pub path: PathBuf,
    /// Resource type, e.g. `aws_vpc`.
    pub resource_type: String,
    /// Local resource name.
    pub resource_name: String,
    /// 1-based line of the resource declaration.
    pub line: usize,
    /// What is wrong.
    #[serde(flatten)]
    pub kind: ViolationKind,
}

/// The ways a resource can fail tag validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "violation", rename_all = "snake_case")]
pub enum ViolationKind {
    /// The resource has no `tags = { ... }` attribute at all.
    MissingTagsBlock,
    /// A required key is absent from the `tags` block.
    MissingTag {
        /// The absent key.
        key: TagKey,
    },
    /// A required key is present but its value is not allow-listed.
    InvalidValue {
        /// The offending key.
        key: TagKey,
        /// The value found in source.
        value: String,
    },
}

impl Violation {
    pub(super) fn new(path: &Path, resource: &ResourceBlock<'_>, kind: ViolationKind) -> Self {
        Self {
            path: path.to_path_buf(),
            resource_type: resource.kind.to_string(),
            resource_name: resource.name.to_string(),
            line: resource.line,
            kind,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {}.{}: {}",
            self.path.display(),
            self.line,
            self.resource_type,
            self.resource_name,
            self.kind
        )
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingTagsBlock => write!(f, "missing tags block"),
            Self::MissingTag { key } => write!(f, "missing required tag '{key}'"),
            Self::InvalidValue { key, value } => {
                write!(f, "invalid value '{value}' for tag '{key}'")
            }
        }
    }
}
