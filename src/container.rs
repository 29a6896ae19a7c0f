//! Wires configuration, adapters and use cases together.
use log::*;
use std::{path::Path, sync::Arc};

use crate::{
    adapters::{
        CargoVersioningService, CommandRunner, FileChangelogWriter,
        GhCliPullRequestService, GitChangelogGenerator, GitVersionControl,
        PoetryVersioningService, TokioCommandRunner,
    },
    bus::InMemoryReleaseCommandBus,
    config::{Config, VersioningBackend},
    domain::OpenPullRequestCommand,
    error::Result,
    ports::{
        ChangelogGenerator, ChangelogWriter, PullRequestService,
        VersionControl, VersioningService,
    },
    service::{
        CreateReleasePullRequestService, OpenPullRequestHandler,
        OpenReleasePullRequestService, PrepareReleaseService,
    },
    transaction::InMemoryReleaseTransaction,
};

/// Fully assembled use cases for one repository.
pub struct Container {
    prepare_release: PrepareReleaseService,
    create_pull_request: CreateReleasePullRequestService,
}

impl Container {
    pub async fn new(repo: &Path, config: Config) -> Result<Self> {
        let runner: Arc<dyn CommandRunner> =
            Arc::new(TokioCommandRunner::new(repo));

        let versioning: Arc<dyn VersioningService> =
            match config.versioning.backend {
                VersioningBackend::Cargo => {
                    let manifest = repo.join(&config.versioning.manifest);
                    debug!("using cargo manifest {}", manifest.display());
                    Arc::new(CargoVersioningService::new(manifest))
                }
                VersioningBackend::Poetry => {
                    debug!("using poetry versioning");
                    Arc::new(PoetryVersioningService::new(Arc::clone(&runner)))
                }
            };

        let vcs: Arc<dyn VersionControl> = Arc::new(
            GitVersionControl::new(
                Arc::clone(&runner),
                config.remote,
                config.main_branch,
                config.commit_message,
            )
            .with_artifact(config.changelog.path.as_str()),
        );

        let changelog: Arc<dyn ChangelogGenerator> =
            Arc::new(GitChangelogGenerator::new(Arc::clone(&runner)));

        let changelog_writer: Arc<dyn ChangelogWriter> =
            Arc::new(FileChangelogWriter::new(
                repo.join(&config.changelog.path),
                config.changelog.body,
            ));

        let pull_requests: Arc<dyn PullRequestService> =
            Arc::new(GhCliPullRequestService::new(runner));

        let open_pull_request = Arc::new(OpenReleasePullRequestService::new(
            Arc::clone(&pull_requests),
            config.pull_request,
        ));

        let bus = InMemoryReleaseCommandBus::new();
        bus.register::<OpenPullRequestCommand, _>(OpenPullRequestHandler::new(
            open_pull_request,
        ))
        .await;

        let prepare_release = PrepareReleaseService::builder()
            .versioning(versioning)
            .vcs(vcs)
            .changelog(changelog)
            .changelog_writer(changelog_writer)
            .bus(Arc::new(bus))
            .transaction_factory(InMemoryReleaseTransaction::factory())
            .build()?;

        Ok(Self {
            prepare_release,
            create_pull_request: CreateReleasePullRequestService::new(
                pull_requests,
            ),
        })
    }

    pub fn prepare_release(&self) -> &PrepareReleaseService {
        &self.prepare_release
    }

    pub fn create_pull_request(&self) -> &CreateReleasePullRequestService {
        &self.create_pull_request
    }
}
