//! Concrete implementations of the outbound ports, all driven through
//! external command line tools.

/// Changelog from git history and the file it is written to.
pub mod changelog;

/// git version control.
pub mod git;

/// GitHub pull requests through `gh`.
pub mod github;

/// Child process runner shared by every adapter.
pub mod process;

/// Cargo manifest and poetry versioning.
pub mod versioning;

pub use changelog::{FileChangelogWriter, GitChangelogGenerator};
pub use git::GitVersionControl;
pub use github::GhCliPullRequestService;
pub use process::{CommandRunner, ProcessCommand, TokioCommandRunner};
pub use versioning::{CargoVersioningService, PoetryVersioningService};
