//! Custom error types for release preparation.

use thiserror::Error;

/// Main error type for release-prep operations.
#[derive(Error, Debug)]
pub enum ReleaseError {
    // Value object validation errors
    #[error("Invalid release level '{0}'. Allowed values: patch, minor, major.")]
    InvalidReleaseLevel(String),

    #[error("Invalid release version '{0}': expected <major>.<minor>.<patch>")]
    InvalidReleaseVersion(String),

    #[error(
        "Invalid release branch name '{0}'. Release branches must follow 'release/v<major>.<minor>.<patch>'."
    )]
    InvalidReleaseBranchName(String),

    #[error(
        "Invalid tag name '{0}'. Tags must follow 'v<major>.<minor>.<patch>'."
    )]
    InvalidTagName(String),

    #[error("Pull request title length must be between {min} and {max}")]
    InvalidPullRequestTitle { min: usize, max: usize },

    #[error("Invalid pull request ID: {0}. It must be a positive integer.")]
    InvalidPullRequestId(String),

    #[error("{}", join_messages(.0))]
    InvalidFields(Vec<ReleaseError>),

    // Entity invariants
    #[error("Invalid release pull request: {0}")]
    InvalidReleasePullRequest(String),

    // Preconditions
    #[error("Tag '{0}' already exists.")]
    TagAlreadyExists(String),

    #[error("Release branch '{0}' already exists")]
    ReleaseBranchExists(String),

    // Infrastructure errors
    #[error("Command failed: {command}\n{stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("Changelog generation failed: {0}")]
    ChangelogGeneration(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("No handler registered for command {0}")]
    UnregisteredCommand(&'static str),

    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("TOML edit error: {0}")]
    TomlEditError(#[from] toml_edit::TomlError),

    #[error("Template rendering failed: {0}")]
    TemplateError(#[from] tera::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] log::SetLoggerError),

    // Generic wrapper for other errors
    #[error(transparent)]
    Other(#[from] color_eyre::Report),
}

/// Result type alias using ReleaseError
pub type Result<T> = std::result::Result<T, ReleaseError>;

fn join_messages(errors: &[ReleaseError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<String>>()
        .join("; ")
}

impl ReleaseError {
    /// Create a command failure carrying the rendered command line
    pub fn command_failed(
        command: impl Into<String>,
        stderr: impl Into<String>,
    ) -> Self {
        Self::CommandFailed {
            command: command.into(),
            stderr: stderr.into(),
        }
    }

    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// True for errors raised while validating raw input.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidReleaseLevel(_)
                | Self::InvalidReleaseVersion(_)
                | Self::InvalidReleaseBranchName(_)
                | Self::InvalidTagName(_)
                | Self::InvalidPullRequestTitle { .. }
                | Self::InvalidPullRequestId(_)
                | Self::InvalidFields(_)
        )
    }
}

// Wraps in Other variant for generic I/O errors
impl From<std::io::Error> for ReleaseError {
    fn from(err: std::io::Error) -> Self {
        Self::Other(color_eyre::Report::from(err))
    }
}
