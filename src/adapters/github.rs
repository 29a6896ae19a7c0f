//! [`PullRequestService`] over the GitHub CLI.
use async_trait::async_trait;
use std::sync::Arc;

use crate::{
    adapters::process::{CommandRunner, ProcessCommand},
    error::Result,
    ports::{OpenPullRequestOutput, OpenPullRequestRequest, PullRequestService},
};

pub struct GhCliPullRequestService {
    runner: Arc<dyn CommandRunner>,
}

impl GhCliPullRequestService {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

/// `gh pr create` prints the new pull request URL as its last line; the id
/// is the URL's last path segment.
fn parse_created(stdout: &str) -> OpenPullRequestOutput {
    let Some(url) = stdout.lines().map(str::trim).rfind(|l| !l.is_empty())
    else {
        return OpenPullRequestOutput::default();
    };

    let pr_id = url
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .map(String::from);

    OpenPullRequestOutput {
        pr_id,
        url: Some(url.to_string()),
    }
}

#[async_trait]
impl PullRequestService for GhCliPullRequestService {
    async fn open(
        &self,
        req: OpenPullRequestRequest,
    ) -> Result<OpenPullRequestOutput> {
        let stdout = self
            .runner
            .run(ProcessCommand::new(
                "gh",
                [
                    "pr",
                    "create",
                    "--base",
                    req.base.value(),
                    "--head",
                    req.head.value(),
                    "--title",
                    req.title.value(),
                    "--body",
                    req.body.value(),
                ],
            ))
            .await?;

        Ok(parse_created(&stdout))
    }
}
