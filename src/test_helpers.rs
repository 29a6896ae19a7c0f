//! Common test helper functions shared across test modules.
//!
//! This module provides reusable fixtures for release versions, reference
//! names and pre-configured port mocks.
use std::{fs, path::Path};

use crate::{
    domain::{ReleaseBranchName, ReleaseVersion, TagName},
    ports::MockVersioningService,
};

/// Version used as "next" throughout the service tests.
pub const NEXT_VERSION: ReleaseVersion = ReleaseVersion::new(1, 2, 0);

/// Release branch for [`NEXT_VERSION`].
pub fn release_branch() -> ReleaseBranchName {
    ReleaseBranchName::from_version(&NEXT_VERSION)
}

/// Release tag for [`NEXT_VERSION`].
pub fn release_tag() -> TagName {
    TagName::for_version(&NEXT_VERSION)
}

/// Creates a versioning mock that reports `current` and computes `next` for
/// any level.
///
/// # Example
/// ```ignore
/// let mut versioning = mock_versioning("1.1.0", "1.2.0");
/// versioning.expect_apply_version().never();
/// ```
pub fn mock_versioning(current: &str, next: &str) -> MockVersioningService {
    let current = ReleaseVersion::parse(current).unwrap();
    let next = ReleaseVersion::parse(next).unwrap();

    let mut versioning = MockVersioningService::new();
    versioning
        .expect_current_version()
        .returning(move || Ok(current));
    versioning
        .expect_compute_next_version()
        .returning(move |_| Ok(next));
    versioning
}

/// Writes `content` to `name` inside `dir`, returning the full path.
pub fn write_file(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}
