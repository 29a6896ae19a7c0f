use std::sync::Arc;

use crate::{
    domain::{
        PullRequestBase, PullRequestBody, PullRequestHead, PullRequestTitle,
        ReleaseBranchName, ReleasePullRequest,
    },
    error::{ReleaseError, Result},
    ports::{OpenPullRequestOutput, PullRequestService},
    service::submit_pull_request,
};

/// Raw pull request fields, as typed on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateReleasePullRequestInput {
    pub base: String,
    pub head: String,
    pub title: String,
    pub body: String,
    pub dry_run: bool,
}

pub struct CreateReleasePullRequestService {
    pull_requests: Arc<dyn PullRequestService>,
}

impl CreateReleasePullRequestService {
    pub fn new(pull_requests: Arc<dyn PullRequestService>) -> Self {
        Self { pull_requests }
    }

    /// Validates every field before giving up, so all problems are reported
    /// at once.
    pub async fn execute(
        &self,
        input: CreateReleasePullRequestInput,
    ) -> Result<OpenPullRequestOutput> {
        let head = ReleaseBranchName::new(input.head).map(PullRequestHead::new);
        let title = PullRequestTitle::new(input.title);

        let (head, title) = match (head, title) {
            (Ok(head), Ok(title)) => (head, title),
            (Err(err), Ok(_)) | (Ok(_), Err(err)) => return Err(err),
            (Err(head), Err(title)) => {
                return Err(ReleaseError::InvalidFields(vec![head, title]));
            }
        };

        let draft = ReleasePullRequest::new(
            PullRequestBase::new(input.base),
            head,
            title,
            PullRequestBody::new(input.body),
        )?;

        submit_pull_request(self.pull_requests.as_ref(), draft, input.dry_run)
            .await
    }
}
