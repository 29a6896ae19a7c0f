//! Configuration loading and parsing for `release-prep.toml` files.
//!
//! Every field is optional; a missing file yields the defaults.
use serde::Deserialize;
use std::path::Path;
use tokio::fs;

use crate::error::Result;

/// Default configuration filename.
pub const DEFAULT_CONFIG_FILE: &str = "release-prep.toml";

pub const DEFAULT_MAIN_BRANCH: &str = "main";
pub const DEFAULT_REMOTE: &str = "origin";
pub const DEFAULT_COMMIT_MESSAGE: &str = "chore(release): prepare release";
pub const DEFAULT_MANIFEST: &str = "Cargo.toml";

/// Default pull request title template.
pub const DEFAULT_PR_TITLE: &str = "Release v{{ version }}";

/// Default pull request body template.
pub const DEFAULT_PR_BODY: &str =
    "Automated release pull request for version {{ version }}.";

/// Default changelog file, relative to the repository root.
pub const DEFAULT_CHANGELOG_FILE: &str = "CHANGELOG.md";

/// Default template for the section prepended to the changelog.
pub const DEFAULT_CHANGELOG_BODY: &str = r#"## {{ tag }}

{% for entry in entries -%}
{{ entry }}
{% endfor %}"#;

/// Tool that owns the package version.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersioningBackend {
    /// `package.version` in a Cargo manifest.
    #[default]
    Cargo,
    /// `poetry version`.
    Poetry,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)] // Use default for missing fields
pub struct VersioningConfig {
    pub backend: VersioningBackend,
    /// Manifest path relative to the repository root (cargo backend only).
    pub manifest: String,
}

impl Default for VersioningConfig {
    fn default() -> Self {
        Self {
            backend: VersioningBackend::default(),
            manifest: DEFAULT_MANIFEST.into(),
        }
    }
}

/// Changelog file and the Tera template for each release section.
/// Available variables: `version`, `tag` and `entries`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ChangelogConfig {
    /// Path relative to the repository root.
    pub path: String,
    pub body: String,
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_CHANGELOG_FILE.into(),
            body: DEFAULT_CHANGELOG_BODY.into(),
        }
    }
}

/// Pull request templates using Tera syntax. Available variables:
/// `version`, `branch` and `tag`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PullRequestConfig {
    pub title: String,
    pub body: String,
}

impl Default for PullRequestConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_PR_TITLE.into(),
            body: DEFAULT_PR_BODY.into(),
        }
    }
}

/// Root configuration structure for `release-prep.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Branch returned to after a run or a rollback. Falls back to `master`
    /// when it cannot be checked out.
    pub main_branch: String,
    /// Remote release branches are pushed to.
    pub remote: String,
    /// Message for the release commit.
    pub commit_message: String,
    pub versioning: VersioningConfig,
    pub changelog: ChangelogConfig,
    pub pull_request: PullRequestConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            main_branch: DEFAULT_MAIN_BRANCH.into(),
            remote: DEFAULT_REMOTE.into(),
            commit_message: DEFAULT_COMMIT_MESSAGE.into(),
            versioning: VersioningConfig::default(),
            changelog: ChangelogConfig::default(),
            pull_request: PullRequestConfig::default(),
        }
    }
}

impl Config {
    /// Reads the configuration at `path`, using defaults when it is absent.
    pub async fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!("configuration not found: using default");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).await?;
        let config: Config = toml::from_str(&content)?;
        log::debug!("loaded configuration from {}", path.display());
        Ok(config)
    }
}
