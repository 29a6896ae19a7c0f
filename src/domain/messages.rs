//! Messages exchanged between release phases.
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::{any::Any, fmt::Debug};

/// Infrastructure data attached to every message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageMetadata {
    pub message_id: String,
    pub created_at: DateTime<Utc>,
}

impl Default for MessageMetadata {
    fn default() -> Self {
        Self {
            message_id: nanoid::nanoid!(),
            created_at: Utc::now(),
        }
    }
}

/// A request for some other part of the system to act. Commands are routed
/// by their concrete type.
pub trait Command: Any + Debug + Send + Sync {
    fn metadata(&self) -> &MessageMetadata;

    fn message_id(&self) -> &str {
        &self.metadata().message_id
    }

    fn message_type(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send>;
}

/// Asks for the release pull request to be opened once a release branch is
/// ready.
#[derive(Debug, Clone, Serialize)]
pub struct OpenPullRequestCommand {
    version: String,
    branch: String,
    dry_run: bool,
    #[serde(flatten)]
    metadata: MessageMetadata,
}

impl OpenPullRequestCommand {
    pub fn new(
        version: impl Into<String>,
        branch: impl Into<String>,
        dry_run: bool,
    ) -> Self {
        Self {
            version: version.into(),
            branch: branch.into(),
            dry_run,
            metadata: MessageMetadata::default(),
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }
}

// Payload equality: two commands carrying the same request are equal even
// though their message ids differ.
impl PartialEq for OpenPullRequestCommand {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version
            && self.branch == other.branch
            && self.dry_run == other.dry_run
    }
}

impl Eq for OpenPullRequestCommand {}

impl Command for OpenPullRequestCommand {
    fn metadata(&self) -> &MessageMetadata {
        &self.metadata
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
        self
    }
}
