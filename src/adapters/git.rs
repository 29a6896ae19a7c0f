//! [`VersionControl`] over the system `git` binary.
use async_trait::async_trait;
use log::*;
use std::sync::Arc;

use crate::{
    adapters::process::{CommandRunner, ProcessCommand},
    domain::{ReleaseBranchName, TagName},
    error::{ReleaseError, Result},
    ports::VersionControl,
};

const FALLBACK_MAIN_BRANCH: &str = "master";

pub struct GitVersionControl {
    runner: Arc<dyn CommandRunner>,
    remote: String,
    main_branch: String,
    commit_message: String,
    /// Files staged explicitly before the release commit, since
    /// `commit -a` skips untracked ones.
    artifacts: Vec<String>,
}

impl GitVersionControl {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        remote: impl Into<String>,
        main_branch: impl Into<String>,
        commit_message: impl Into<String>,
    ) -> Self {
        Self {
            runner,
            remote: remote.into(),
            main_branch: main_branch.into(),
            commit_message: commit_message.into(),
            artifacts: vec![],
        }
    }

    /// Adds a path, relative to the repository root, to stage with every
    /// release commit.
    pub fn with_artifact(mut self, path: impl Into<String>) -> Self {
        self.artifacts.push(path.into());
        self
    }

    async fn git<I, S>(&self, args: I) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.runner.run(ProcessCommand::git(args)).await
    }

    /// Exit status as a boolean. Only a failed command means "no"; anything
    /// else is a real error.
    async fn check<I, S>(&self, args: I) -> Result<bool>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        match self.runner.run(ProcessCommand::git(args).quiet()).await {
            Ok(_) => Ok(true),
            Err(ReleaseError::CommandFailed { .. }) => Ok(false),
            Err(err) => Err(err),
        }
    }
}

#[async_trait]
impl VersionControl for GitVersionControl {
    async fn branch_exists(&self, branch: &ReleaseBranchName) -> Result<bool> {
        self.check([
            "rev-parse".to_string(),
            "--verify".to_string(),
            format!("refs/heads/{}", branch.value()),
        ])
        .await
    }

    async fn remote_branch_exists(
        &self,
        branch: &ReleaseBranchName,
    ) -> Result<bool> {
        self.check([
            "ls-remote",
            "--exit-code",
            "--heads",
            self.remote.as_str(),
            branch.value(),
        ])
        .await
    }

    async fn checkout(&self, branch: &ReleaseBranchName) -> Result<()> {
        self.git(["checkout", branch.value()]).await?;
        Ok(())
    }

    async fn checkout_main(&self) -> Result<()> {
        match self.git(["checkout", self.main_branch.as_str()]).await {
            Ok(_) => Ok(()),
            Err(err) if self.main_branch != FALLBACK_MAIN_BRANCH => {
                warn!(
                    "could not check out {}, trying {FALLBACK_MAIN_BRANCH}: {err}",
                    self.main_branch
                );
                self.git(["checkout", FALLBACK_MAIN_BRANCH]).await?;
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    async fn create_branch(&self, branch: &ReleaseBranchName) -> Result<()> {
        match self.git(["checkout", "-b", branch.value()]).await {
            Ok(_) => Ok(()),
            Err(ReleaseError::CommandFailed { stderr, .. })
                if stderr.contains("already exists") =>
            {
                Err(ReleaseError::ReleaseBranchExists(branch.value().into()))
            }
            Err(err) => Err(err),
        }
    }

    async fn delete_local_branch(
        &self,
        branch: &ReleaseBranchName,
    ) -> Result<()> {
        self.git(["branch", "-D", branch.value()]).await?;
        Ok(())
    }

    async fn delete_remote_branch(
        &self,
        branch: &ReleaseBranchName,
    ) -> Result<()> {
        self.git(["push", self.remote.as_str(), "--delete", branch.value()])
            .await?;
        Ok(())
    }

    async fn tag_exists(&self, tag: &TagName) -> Result<bool> {
        self.check([
            "rev-parse".to_string(),
            "--verify".to_string(),
            format!("refs/tags/{}", tag.value()),
        ])
        .await
    }

    async fn create_tag(&self, tag: &TagName) -> Result<()> {
        self.git(["tag", tag.value()]).await?;
        Ok(())
    }

    async fn delete_tag(&self, tag: &TagName) -> Result<()> {
        self.git(["tag", "-d", tag.value()]).await?;
        self.git(["push", self.remote.as_str(), "--delete", tag.value()])
            .await?;
        Ok(())
    }

    async fn commit_release_artifacts(&self) -> Result<()> {
        if !self.artifacts.is_empty() {
            let mut args = vec!["add".to_string(), "--".to_string()];
            args.extend(self.artifacts.iter().cloned());
            self.git(args).await?;
        }

        self.git(["commit", "-am", self.commit_message.as_str()]).await?;
        Ok(())
    }

    async fn push(
        &self,
        branch: &ReleaseBranchName,
        push_tags: bool,
    ) -> Result<()> {
        self.git(["push", self.remote.as_str(), branch.value()]).await?;

        if push_tags {
            self.git(["push", self.remote.as_str(), "--tags"]).await?;
        }

        Ok(())
    }
}
