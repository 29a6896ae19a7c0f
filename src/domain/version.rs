//! Semantic version triple and release level value objects.
use serde::Serialize;
use std::{fmt::Display, str::FromStr};

use crate::error::{ReleaseError, Result};

/// Granularity of a semantic version increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseLevel {
    Patch,
    Minor,
    Major,
}

impl ReleaseLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseLevel::Patch => "patch",
            ReleaseLevel::Minor => "minor",
            ReleaseLevel::Major => "major",
        }
    }
}

impl FromStr for ReleaseLevel {
    type Err = ReleaseError;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_lowercase().as_str() {
            "patch" => Ok(ReleaseLevel::Patch),
            "minor" => Ok(ReleaseLevel::Minor),
            "major" => Ok(ReleaseLevel::Major),
            _ => Err(ReleaseError::InvalidReleaseLevel(value.to_string())),
        }
    }
}

impl Display for ReleaseLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable `major.minor.patch` triple.
///
/// Components are unsigned, so a constructed version can never hold a
/// negative part. Signed input goes through [`TryFrom`] which rejects
/// negatives.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
)]
pub struct ReleaseVersion {
    major: u64,
    minor: u64,
    patch: u64,
}

impl ReleaseVersion {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse a version as printed by git tags or package managers.
    ///
    /// A single leading `v` is accepted. Pre-release and build metadata are
    /// rejected since release branches and tags only carry the triple.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let candidate = trimmed.strip_prefix('v').unwrap_or(trimmed);

        let parsed = semver::Version::parse(candidate)
            .map_err(|_| ReleaseError::InvalidReleaseVersion(raw.to_string()))?;

        if !parsed.pre.is_empty() || !parsed.build.is_empty() {
            return Err(ReleaseError::InvalidReleaseVersion(raw.to_string()));
        }

        Ok(Self::new(parsed.major, parsed.minor, parsed.patch))
    }

    pub fn major(&self) -> u64 {
        self.major
    }

    pub fn minor(&self) -> u64 {
        self.minor
    }

    pub fn patch(&self) -> u64 {
        self.patch
    }

    /// Rendered `major.minor.patch` form.
    pub fn value(&self) -> String {
        self.to_string()
    }

    /// Next version at the given level. Minor and major reset the lower
    /// components, patch resets nothing. Fails when the bumped component
    /// would overflow.
    pub fn bump(&self, level: ReleaseLevel) -> Result<Self> {
        let next = match level {
            ReleaseLevel::Major => self
                .major
                .checked_add(1)
                .map(|major| Self::new(major, 0, 0)),
            ReleaseLevel::Minor => self
                .minor
                .checked_add(1)
                .map(|minor| Self::new(self.major, minor, 0)),
            ReleaseLevel::Patch => self
                .patch
                .checked_add(1)
                .map(|patch| Self::new(self.major, self.minor, patch)),
        };

        next.ok_or_else(|| {
            ReleaseError::InvalidReleaseVersion(format!(
                "{self} cannot be bumped to the next {level} release"
            ))
        })
    }
}

impl TryFrom<(i64, i64, i64)> for ReleaseVersion {
    type Error = ReleaseError;

    fn try_from((major, minor, patch): (i64, i64, i64)) -> Result<Self> {
        let invalid = || {
            ReleaseError::InvalidReleaseVersion(format!(
                "{major}.{minor}.{patch}"
            ))
        };

        Ok(Self::new(
            u64::try_from(major).map_err(|_| invalid())?,
            u64::try_from(minor).map_err(|_| invalid())?,
            u64::try_from(patch).map_err(|_| invalid())?,
        ))
    }
}

impl FromStr for ReleaseVersion {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Display for ReleaseVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
