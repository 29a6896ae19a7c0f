//! Outbound ports consumed by the release use cases.
//!
//! Every port is non-interactive and reports failure through [`Result`]
//! rather than a status value. Implementations live in `adapters`.
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use serde::Serialize;

use crate::{
    domain::{
        PullRequestBase, PullRequestBody, PullRequestHead, PullRequestTitle,
        ReleaseBranchName, ReleaseLevel, ReleaseVersion, TagName,
    },
    error::Result,
};

/// Reads, computes and applies the package version.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait VersioningService: Send + Sync {
    /// Version currently recorded in the package manifest.
    async fn current_version(&self) -> Result<ReleaseVersion>;

    /// Next version at the given level. Never mutates the manifest.
    async fn compute_next_version(
        &self,
        level: ReleaseLevel,
    ) -> Result<ReleaseVersion>;

    async fn apply_version(&self, version: &ReleaseVersion) -> Result<()>;

    /// Restores a previously captured version.
    async fn rollback_version(&self, previous: &ReleaseVersion) -> Result<()>;
}

/// Version control operations needed by the release workflow.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait VersionControl: Send + Sync {
    /// Local branch existence check.
    async fn branch_exists(&self, branch: &ReleaseBranchName) -> Result<bool>;

    /// Remote (`<remote>/<branch>`) existence check.
    async fn remote_branch_exists(
        &self,
        branch: &ReleaseBranchName,
    ) -> Result<bool>;

    async fn checkout(&self, branch: &ReleaseBranchName) -> Result<()>;

    /// Return to the main branch.
    async fn checkout_main(&self) -> Result<()>;

    async fn create_branch(&self, branch: &ReleaseBranchName) -> Result<()>;

    async fn delete_local_branch(
        &self,
        branch: &ReleaseBranchName,
    ) -> Result<()>;

    async fn delete_remote_branch(
        &self,
        branch: &ReleaseBranchName,
    ) -> Result<()>;

    /// True if the tag exists locally or is otherwise resolvable.
    async fn tag_exists(&self, tag: &TagName) -> Result<bool>;

    async fn create_tag(&self, tag: &TagName) -> Result<()>;

    async fn delete_tag(&self, tag: &TagName) -> Result<()>;

    /// Commit the version bump and generated artifacts.
    async fn commit_release_artifacts(&self) -> Result<()>;

    async fn push(
        &self,
        branch: &ReleaseBranchName,
        push_tags: bool,
    ) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Request to generate changelog entries since a version.
pub struct ChangelogRequest {
    pub from_version: ReleaseVersion,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
/// Ordered changelog entries, newest first.
pub struct ChangelogResponse {
    pub entries: Vec<String>,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ChangelogGenerator: Send + Sync {
    async fn generate(&self, req: ChangelogRequest)
    -> Result<ChangelogResponse>;
}

/// Records generated changelog entries as a release artifact.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ChangelogWriter: Send + Sync {
    /// Prepends a section for `version`. Returns the contents the file had
    /// before, or None when it did not exist.
    async fn write(
        &self,
        version: &ReleaseVersion,
        changelog: &ChangelogResponse,
    ) -> Result<Option<String>>;

    /// Puts back contents returned by [`ChangelogWriter::write`].
    async fn restore(&self, previous: Option<String>) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Request to open a pull request on the hosting platform.
pub struct OpenPullRequestRequest {
    pub base: PullRequestBase,
    pub head: PullRequestHead,
    pub title: PullRequestTitle,
    pub body: PullRequestBody,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
/// Identity of an opened pull request as reported by the host.
pub struct OpenPullRequestOutput {
    pub pr_id: Option<String>,
    pub url: Option<String>,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait PullRequestService: Send + Sync {
    async fn open(
        &self,
        req: OpenPullRequestRequest,
    ) -> Result<OpenPullRequestOutput>;
}
