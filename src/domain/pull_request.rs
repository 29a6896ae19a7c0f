//! Release pull request entity and its value objects.
use serde::Serialize;
use std::fmt::Display;

use crate::{
    domain::{entity::Entity, refs::ReleaseBranchName},
    error::{ReleaseError, Result},
};

/// Inclusive bounds on pull request title length, in characters.
pub const TITLE_MIN_LENGTH: usize = 10;
pub const TITLE_MAX_LENGTH: usize = 50;

/// Target branch of a pull request. Any value is well formed; only the
/// entity decides whether it is usable for a release.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PullRequestBase(String);

impl PullRequestBase {
    pub const MAIN: &'static str = "main";

    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn main() -> Self {
        Self(Self::MAIN.into())
    }

    pub fn is_main(&self) -> bool {
        self.0 == Self::MAIN
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

/// Source branch of a release pull request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PullRequestHead(ReleaseBranchName);

impl PullRequestHead {
    pub fn new(branch: ReleaseBranchName) -> Self {
        Self(branch)
    }

    /// Always true: the head can only be built from a release branch name.
    pub fn is_release_branch(&self) -> bool {
        true
    }

    pub fn branch(&self) -> &ReleaseBranchName {
        &self.0
    }

    pub fn value(&self) -> &str {
        self.0.value()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PullRequestTitle(String);

impl PullRequestTitle {
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        let length = value.chars().count();

        if !(TITLE_MIN_LENGTH..=TITLE_MAX_LENGTH).contains(&length) {
            return Err(ReleaseError::InvalidPullRequestTitle {
                min: TITLE_MIN_LENGTH,
                max: TITLE_MAX_LENGTH,
            });
        }

        Ok(Self(value))
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PullRequestBody(String);

impl PullRequestBody {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

/// Number assigned to a pull request by the hosting platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PullRequestId(u64);

impl PullRequestId {
    pub fn new(value: u64) -> Result<Self> {
        if value == 0 {
            return Err(ReleaseError::InvalidPullRequestId(value.to_string()));
        }
        Ok(Self(value))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
            return Err(ReleaseError::InvalidPullRequestId(raw.to_string()));
        }
        let value = trimmed
            .parse::<u64>()
            .map_err(|_| ReleaseError::InvalidPullRequestId(raw.to_string()))?;
        Self::new(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl Display for PullRequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The intent to publish a release: a pull request from a release branch
/// into main.
#[derive(Debug, Clone, Serialize)]
pub struct ReleasePullRequest {
    base: PullRequestBase,
    head: PullRequestHead,
    title: PullRequestTitle,
    body: PullRequestBody,
    pr_id: Option<PullRequestId>,
}

impl ReleasePullRequest {
    /// Builds a draft pull request. Well-formed parts can still violate the
    /// relationship between them, so base and head are checked again here.
    pub fn new(
        base: PullRequestBase,
        head: PullRequestHead,
        title: PullRequestTitle,
        body: PullRequestBody,
    ) -> Result<Self> {
        if !base.is_main() {
            return Err(ReleaseError::InvalidReleasePullRequest(
                "Base branch must be main".into(),
            ));
        }

        if !head.is_release_branch() {
            return Err(ReleaseError::InvalidReleasePullRequest(
                "Head must be a release branch".into(),
            ));
        }

        Ok(Self {
            base,
            head,
            title,
            body,
            pr_id: None,
        })
    }

    /// Draft -> Opened once the host has assigned an id.
    pub fn opened(self, pr_id: PullRequestId) -> Self {
        Self {
            pr_id: Some(pr_id),
            ..self
        }
    }

    pub fn base(&self) -> &PullRequestBase {
        &self.base
    }

    pub fn head(&self) -> &PullRequestHead {
        &self.head
    }

    pub fn title(&self) -> &PullRequestTitle {
        &self.title
    }

    pub fn body(&self) -> &PullRequestBody {
        &self.body
    }
}

impl Entity for ReleasePullRequest {
    type Id = PullRequestId;

    fn id(&self) -> Option<&PullRequestId> {
        self.pr_id.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::version::ReleaseVersion;

    fn head() -> PullRequestHead {
        PullRequestHead::new(ReleaseBranchName::from_version(
            &ReleaseVersion::new(1, 2, 0),
        ))
    }

    fn title() -> PullRequestTitle {
        PullRequestTitle::new("Release v1.2.0").unwrap()
    }

    #[test]
    fn test_title_accepts_boundary_lengths() {
        assert!(PullRequestTitle::new("a".repeat(10)).is_ok());
        assert!(PullRequestTitle::new("a".repeat(50)).is_ok());
    }

    #[test]
    fn test_title_rejects_lengths_outside_bounds() {
        for len in [0, 9, 51] {
            let err = PullRequestTitle::new("a".repeat(len)).unwrap_err();
            assert!(matches!(
                err,
                ReleaseError::InvalidPullRequestTitle { min: 10, max: 50 }
            ));
        }
    }

    #[test]
    fn test_title_counts_characters_not_bytes() {
        assert!(PullRequestTitle::new("é".repeat(10)).is_ok());
        assert!(PullRequestTitle::new("é".repeat(50)).is_ok());
    }

    #[test]
    fn test_base_recognises_main() {
        assert!(PullRequestBase::main().is_main());
        assert!(PullRequestBase::new("main").is_main());
        assert!(!PullRequestBase::new("master").is_main());
        assert!(!PullRequestBase::new("Main").is_main());
    }

    #[test]
    fn test_entity_rejects_non_main_base() {
        for base in ["develop", "master", "", "release/v1.2.0"] {
            for body in ["", "notes"] {
                let err = ReleasePullRequest::new(
                    PullRequestBase::new(base),
                    head(),
                    title(),
                    PullRequestBody::new(body),
                )
                .unwrap_err();
                assert!(matches!(err, ReleaseError::InvalidReleasePullRequest(_)));
            }
        }
    }

    #[test]
    fn test_new_entity_is_a_draft_until_opened() {
        let pr = ReleasePullRequest::new(
            PullRequestBase::main(),
            head(),
            title(),
            PullRequestBody::new("notes"),
        )
        .unwrap();
        assert!(pr.is_draft());
        assert!(!pr.same_identity_as(&pr.clone()));

        let opened = pr.opened(PullRequestId::new(42).unwrap());
        assert!(!opened.is_draft());
        assert_eq!(opened.id().map(|id| id.value()), Some(42));
        assert!(opened.same_identity_as(&opened.clone()));
    }

    #[test]
    fn test_pull_request_id_requires_positive_integer() {
        assert_eq!(PullRequestId::parse("17").unwrap().value(), 17);
        for raw in ["0", "-3", "abc", "", "1.5"] {
            assert!(matches!(
                PullRequestId::parse(raw).unwrap_err(),
                ReleaseError::InvalidPullRequestId(_)
            ));
        }
    }
}
