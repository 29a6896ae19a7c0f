//! Release domain: value objects, the release pull request entity and the
//! messages passed between release phases.

/// Identity trait shared by entities.
pub mod entity;

/// Command messages and their metadata.
pub mod messages;

/// Release pull request entity and its parts.
pub mod pull_request;

/// Release branch and tag names.
pub mod refs;

/// Version triple and release level.
pub mod version;

pub use entity::Entity;
pub use messages::{Command, MessageMetadata, OpenPullRequestCommand};
pub use pull_request::{
    PullRequestBase, PullRequestBody, PullRequestHead, PullRequestId,
    PullRequestTitle, ReleasePullRequest,
};
pub use refs::{ReleaseBranchName, TagName};
pub use version::{ReleaseLevel, ReleaseVersion};
