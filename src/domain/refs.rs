//! Git reference names derived from a release version.
use regex::Regex;
use serde::Serialize;
use std::{fmt::Display, sync::LazyLock};

use crate::{
    domain::version::ReleaseVersion,
    error::{ReleaseError, Result},
};

static RELEASE_BRANCH_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^release/v(?<major>\d+)\.(?<minor>\d+)\.(?<patch>\d+)$")
        .unwrap()
});

static TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^v(?<major>\d+)\.(?<minor>\d+)\.(?<patch>\d+)$").unwrap()
});

/// Extracts the embedded version triple, or None when the value does not
/// match or a component overflows.
fn embedded_version(regex: &Regex, value: &str) -> Option<ReleaseVersion> {
    let caps = regex.captures(value)?;
    let major = caps["major"].parse::<u64>().ok()?;
    let minor = caps["minor"].parse::<u64>().ok()?;
    let patch = caps["patch"].parse::<u64>().ok()?;
    Some(ReleaseVersion::new(major, minor, patch))
}

/// Name of a release branch: `release/v<major>.<minor>.<patch>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ReleaseBranchName {
    value: String,
    #[serde(skip)]
    version: ReleaseVersion,
}

impl ReleaseBranchName {
    pub const PREFIX: &'static str = "release/v";

    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        let version = embedded_version(&RELEASE_BRANCH_REGEX, &value)
            .ok_or_else(|| ReleaseError::InvalidReleaseBranchName(value.clone()))?;
        Ok(Self { value, version })
    }

    pub fn from_version(version: &ReleaseVersion) -> Self {
        Self {
            value: format!("{}{}", Self::PREFIX, version),
            version: *version,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn version(&self) -> &ReleaseVersion {
        &self.version
    }
}

impl Display for ReleaseBranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value)
    }
}

/// Name of a release tag: `v<major>.<minor>.<patch>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TagName {
    value: String,
    #[serde(skip)]
    version: ReleaseVersion,
}

impl TagName {
    pub const PREFIX: &'static str = "v";

    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        let version = embedded_version(&TAG_REGEX, &value)
            .ok_or_else(|| ReleaseError::InvalidTagName(value.clone()))?;
        Ok(Self { value, version })
    }

    pub fn for_version(version: &ReleaseVersion) -> Self {
        Self {
            value: format!("{}{}", Self::PREFIX, version),
            version: *version,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn version(&self) -> &ReleaseVersion {
        &self.version
    }
}

impl Display for TagName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value)
    }
}
