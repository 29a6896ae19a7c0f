use async_trait::async_trait;
use log::*;
use serde::Serialize;
use std::sync::Arc;
use tera::{Context, Tera};

use crate::{
    bus::CommandHandler,
    config::PullRequestConfig,
    domain::{
        Command, OpenPullRequestCommand, PullRequestBase, PullRequestBody,
        PullRequestHead, PullRequestTitle, ReleaseBranchName,
        ReleasePullRequest, ReleaseVersion, TagName,
    },
    error::Result,
    ports::{OpenPullRequestOutput, PullRequestService},
    service::submit_pull_request,
};

const TITLE_TEMPLATE: &str = "title";
const BODY_TEMPLATE: &str = "body";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenReleasePullRequestInput {
    pub version: String,
    pub branch: String,
    pub dry_run: bool,
}

/// Values exposed to the title and body templates.
#[derive(Serialize)]
struct TemplateVars<'a> {
    version: String,
    branch: &'a str,
    tag: String,
}

/// Opens the pull request for a prepared release branch into main.
pub struct OpenReleasePullRequestService {
    pull_requests: Arc<dyn PullRequestService>,
    templates: PullRequestConfig,
}

impl OpenReleasePullRequestService {
    pub fn new(
        pull_requests: Arc<dyn PullRequestService>,
        templates: PullRequestConfig,
    ) -> Self {
        Self {
            pull_requests,
            templates,
        }
    }

    pub async fn execute(
        &self,
        input: OpenReleasePullRequestInput,
    ) -> Result<OpenPullRequestOutput> {
        let version = ReleaseVersion::parse(&input.version)?;
        let branch = ReleaseBranchName::new(input.branch)?;

        let (title, body) = self.render(&version, &branch)?;

        let draft = ReleasePullRequest::new(
            PullRequestBase::main(),
            PullRequestHead::new(branch),
            PullRequestTitle::new(title)?,
            PullRequestBody::new(body),
        )?;

        submit_pull_request(self.pull_requests.as_ref(), draft, input.dry_run)
            .await
    }

    fn render(
        &self,
        version: &ReleaseVersion,
        branch: &ReleaseBranchName,
    ) -> Result<(String, String)> {
        let mut tera = Tera::default();
        tera.add_raw_template(TITLE_TEMPLATE, &self.templates.title)?;
        tera.add_raw_template(BODY_TEMPLATE, &self.templates.body)?;

        let context = Context::from_serialize(TemplateVars {
            version: version.value(),
            branch: branch.value(),
            tag: TagName::for_version(version).value().to_string(),
        })?;

        let title = tera.render(TITLE_TEMPLATE, &context)?;
        let body = tera.render(BODY_TEMPLATE, &context)?;

        Ok((title.trim().to_string(), body))
    }
}

/// Bridges [`OpenPullRequestCommand`] from the bus to the open use case.
pub struct OpenPullRequestHandler {
    use_case: Arc<OpenReleasePullRequestService>,
}

impl OpenPullRequestHandler {
    pub fn new(use_case: Arc<OpenReleasePullRequestService>) -> Self {
        Self { use_case }
    }
}

#[async_trait]
impl CommandHandler<OpenPullRequestCommand> for OpenPullRequestHandler {
    async fn handle(&self, command: OpenPullRequestCommand) -> Result<()> {
        debug!("handling open pull request command {}", command.message_id());

        let output = self
            .use_case
            .execute(OpenReleasePullRequestInput {
                version: command.version().to_string(),
                branch: command.branch().to_string(),
                dry_run: command.dry_run(),
            })
            .await?;

        if let Some(url) = output.url {
            info!("release pull request: {url}");
        }

        Ok(())
    }
}
