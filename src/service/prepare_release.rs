//! Release preparation: bump, branch, changelog, commit and push, with every
//! repository side effect undone when a later step fails.
use derive_builder::Builder;
use log::*;
use serde::Serialize;
use std::sync::Arc;

use crate::{
    bus::ReleaseCommandBus,
    domain::{
        OpenPullRequestCommand, ReleaseBranchName, ReleaseLevel,
        ReleaseVersion, TagName,
    },
    error::{ReleaseError, Result},
    ports::{
        ChangelogGenerator, ChangelogRequest, ChangelogWriter, VersionControl,
        VersioningService,
    },
    transaction::{
        self, ReleaseStep, ReleaseTransaction, TransactionFactory,
    },
};

/// Raw request from the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrepareReleaseInput {
    pub level: String,
    pub dry_run: bool,
}

/// What was (or would be) prepared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrepareReleaseOutput {
    pub version: String,
    pub branch: String,
    pub tag: String,
}

/// Facts resolved once at the start of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseContext {
    pub previous_version: ReleaseVersion,
    pub version: ReleaseVersion,
    pub branch: ReleaseBranchName,
    pub tag: TagName,
    /// Always false in dry-run: the branch is not checked.
    pub branch_exists: bool,
    pub dry_run: bool,
}

impl From<&ReleaseContext> for PrepareReleaseOutput {
    fn from(ctx: &ReleaseContext) -> Self {
        Self {
            version: ctx.version.value(),
            branch: ctx.branch.value().to_string(),
            tag: ctx.tag.value().to_string(),
        }
    }
}

#[derive(Builder)]
#[builder(build_fn(private, name = "_build"))]
pub struct PrepareReleaseParams {
    pub versioning: Arc<dyn VersioningService>,
    pub vcs: Arc<dyn VersionControl>,
    pub changelog: Arc<dyn ChangelogGenerator>,
    pub changelog_writer: Arc<dyn ChangelogWriter>,
    pub bus: Arc<dyn ReleaseCommandBus>,
    pub transaction_factory: TransactionFactory,
}

impl PrepareReleaseParamsBuilder {
    pub fn build(&self) -> Result<PrepareReleaseService> {
        let params = self._build().map_err(|e| {
            ReleaseError::invalid_config(format!(
                "Failed to build release preparation service: {}",
                e
            ))
        })?;
        Ok(PrepareReleaseService::new(params))
    }
}

pub struct PrepareReleaseService {
    versioning: Arc<dyn VersioningService>,
    vcs: Arc<dyn VersionControl>,
    changelog: Arc<dyn ChangelogGenerator>,
    changelog_writer: Arc<dyn ChangelogWriter>,
    bus: Arc<dyn ReleaseCommandBus>,
    transaction_factory: TransactionFactory,
}

impl PrepareReleaseService {
    pub fn builder() -> PrepareReleaseParamsBuilder {
        PrepareReleaseParamsBuilder::default()
    }

    pub fn new(params: PrepareReleaseParams) -> Self {
        Self {
            versioning: params.versioning,
            vcs: params.vcs,
            changelog: params.changelog,
            changelog_writer: params.changelog_writer,
            bus: params.bus,
            transaction_factory: params.transaction_factory,
        }
    }

    /// Prepares the next release and asks for its pull request to be opened.
    ///
    /// In dry-run only the version and tag lookups run. Otherwise the branch
    /// is created (or resumed), bumped, committed and pushed inside a fresh
    /// transaction; a failure there rolls back and returns the original
    /// error. The pull request command is sent after the transaction has
    /// committed, so its failure leaves the pushed branch in place.
    pub async fn execute(
        &self,
        input: PrepareReleaseInput,
    ) -> Result<PrepareReleaseOutput> {
        let level: ReleaseLevel = input.level.parse()?;

        let ctx = self.resolve_context(level, input.dry_run).await?;

        if ctx.dry_run {
            warn!(
                "dry_run: would prepare {} on branch {}",
                ctx.tag, ctx.branch
            );
        } else {
            let mut tx = (self.transaction_factory)();
            let outcome = self.apply_release(&ctx, tx.as_mut()).await;
            transaction::finish(tx.as_mut(), outcome).await?;
        }

        self.request_pull_request(&ctx).await?;

        Ok(PrepareReleaseOutput::from(&ctx))
    }

    async fn resolve_context(
        &self,
        level: ReleaseLevel,
        dry_run: bool,
    ) -> Result<ReleaseContext> {
        let previous_version = self.versioning.current_version().await?;
        let version = self.versioning.compute_next_version(level).await?;

        info!("preparing {level} release: {previous_version} -> {version}");

        let branch = ReleaseBranchName::from_version(&version);
        let tag = TagName::for_version(&version);

        if self.vcs.tag_exists(&tag).await? {
            return Err(ReleaseError::TagAlreadyExists(tag.value().into()));
        }

        let branch_exists = if dry_run {
            false
        } else {
            self.release_branch_exists(&branch).await?
        };

        Ok(ReleaseContext {
            previous_version,
            version,
            branch,
            tag,
            branch_exists,
            dry_run,
        })
    }

    async fn release_branch_exists(
        &self,
        branch: &ReleaseBranchName,
    ) -> Result<bool> {
        if self.vcs.branch_exists(branch).await? {
            return Ok(true);
        }
        self.vcs.remote_branch_exists(branch).await
    }

    async fn apply_release(
        &self,
        ctx: &ReleaseContext,
        transaction: &mut dyn ReleaseTransaction,
    ) -> Result<()> {
        // registered first so it is the last undo to run
        let vcs = Arc::clone(&self.vcs);
        transaction.register_step(ReleaseStep::new(
            "checkout-main",
            move || async move { vcs.checkout_main().await },
        ));

        if ctx.branch_exists {
            info!("resuming existing release branch {}", ctx.branch);
            self.vcs.checkout(&ctx.branch).await?;
        } else {
            self.create_release_commit(ctx, transaction).await?;
        }

        self.vcs.push(&ctx.branch, false).await?;

        if !ctx.branch_exists {
            let vcs = Arc::clone(&self.vcs);
            let branch = ctx.branch.clone();
            transaction.register_step(ReleaseStep::new(
                "delete-remote-branch",
                move || async move { vcs.delete_remote_branch(&branch).await },
            ));
        }

        info!("pushed release branch {}", ctx.branch);

        Ok(())
    }

    async fn create_release_commit(
        &self,
        ctx: &ReleaseContext,
        transaction: &mut dyn ReleaseTransaction,
    ) -> Result<()> {
        self.vcs.create_branch(&ctx.branch).await?;

        // git refuses to delete the checked out branch
        let vcs = Arc::clone(&self.vcs);
        let branch = ctx.branch.clone();
        transaction.register_step(ReleaseStep::new(
            "delete-release-branch",
            move || async move {
                vcs.checkout_main().await?;
                vcs.delete_local_branch(&branch).await
            },
        ));

        self.versioning.apply_version(&ctx.version).await?;

        let versioning = Arc::clone(&self.versioning);
        let previous = ctx.previous_version;
        transaction.register_step(ReleaseStep::new(
            "restore-version",
            move || async move { versioning.rollback_version(&previous).await },
        ));

        let changelog = self
            .changelog
            .generate(ChangelogRequest {
                from_version: ctx.previous_version,
            })
            .await?;

        info!("generated {} changelog entries", changelog.entries.len());

        let previous_changelog =
            self.changelog_writer.write(&ctx.version, &changelog).await?;

        let writer = Arc::clone(&self.changelog_writer);
        transaction.register_step(ReleaseStep::new(
            "restore-changelog",
            move || async move { writer.restore(previous_changelog).await },
        ));

        self.vcs.commit_release_artifacts().await
    }

    async fn request_pull_request(&self, ctx: &ReleaseContext) -> Result<()> {
        let command = OpenPullRequestCommand::new(
            ctx.version.value(),
            ctx.branch.value(),
            ctx.dry_run,
        );

        debug!("sending command: {}", serde_json::to_string(&command)?);

        self.bus.send(Box::new(command)).await
    }
}
