use std::{
    io,
    path::{Path, PathBuf},
};

use ini::Ini;

use crate::domain::{InvalidRepoError, RepoSlug};

/// The public GitHub REST endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const SECTION: &str = "github";
const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Settings for the pull-request auditor, read from an INI file.
///
/// ```ini
/// [github]
/// token = ghp_...
/// repo = owner/name
/// # optional, for GitHub Enterprise
/// api_url = https://github.example.com/api/v3
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct AuditConfig {
    /// Access token sent as a bearer credential.
    pub token: String,
    /// The repository to audit.
    pub repo: RepoSlug,
    /// Base URL of the REST API, without a trailing slash.
    pub api_url: String,
}

impl std::fmt::Debug for AuditConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditConfig")
            .field("token", &"<redacted>")
            .field("repo", &self.repo)
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl AuditConfig {
    /// Loads the configuration from an INI file.
    ///
    /// A non-empty `GITHUB_TOKEN` environment variable takes precedence over
    /// the file's `token` key.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, if the
    /// `[github]` section or one of its required keys is missing, or if
    /// `repo` is not `owner/name`.
    pub fn load(path: &Path) -> Result<Self, AuditConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| AuditConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let env_token = std::env::var(TOKEN_ENV)
            .ok()
            .filter(|token| !token.trim().is_empty());
        if env_token.is_some() {
            tracing::debug!("Using token from {TOKEN_ENV}");
        }
        Self::parse(&content, env_token)
    }

    /// Parses configuration from INI text, with an optional token that
    /// overrides the one in the text.
    ///
    /// # Errors
    ///
    /// See [`AuditConfig::load`].
    pub fn parse(content: &str, token_override: Option<String>) -> Result<Self, AuditConfigError> {
        let ini = Ini::load_from_str(content)?;
        let section = ini
            .section(Some(SECTION))
            .ok_or(AuditConfigError::MissingSection(SECTION))?;

        let get = |key: &'static str| {
            section
                .get(key)
                .map(str::trim)
                .filter(|value| !value.is_empty())
        };

        let token = match token_override {
            Some(token) => token,
            None => get("token")
                .ok_or(AuditConfigError::MissingKey("token"))?
                .to_string(),
        };
        let repo = get("repo").ok_or(AuditConfigError::MissingKey("repo"))?.parse()?;
        let api_url = get("api_url")
            .unwrap_or(DEFAULT_API_URL)
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            token,
            repo,
            api_url,
        })
    }
}

/// Errors loading the auditor configuration. All of them are fatal.
#[derive(Debug, thiserror::Error)]
pub enum AuditConfigError {
    /// The file could not be read.
    #[error("failed to read config file {}", path.display())]
    Read {
        /// The config file path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The file is not valid INI.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] ini::ParseError),

    /// The required section is absent.
    #[error("missing configuration section [{0}]")]
    MissingSection(&'static str),

    /// A required key is absent or empty.
    #[error("missing configuration key '{0}' in [github]")]
    MissingKey(&'static str),

    /// The `repo` key is malformed.
    #[error(transparent)]
    InvalidRepo(#[from] InvalidRepoError),
}
