//! Release use cases.
use log::*;

use crate::{
    domain::{Entity, PullRequestId, ReleasePullRequest},
    error::Result,
    ports::{OpenPullRequestOutput, OpenPullRequestRequest, PullRequestService},
};

/// Direct pull request creation from raw fields.
pub mod create_pull_request;

/// Pull request opening triggered after a release is prepared.
pub mod open_pull_request;

/// Transactional release preparation.
pub mod prepare_release;

pub use create_pull_request::{
    CreateReleasePullRequestInput, CreateReleasePullRequestService,
};
pub use open_pull_request::{
    OpenPullRequestHandler, OpenReleasePullRequestInput,
    OpenReleasePullRequestService,
};
pub use prepare_release::{
    PrepareReleaseInput, PrepareReleaseOutput, PrepareReleaseParams,
    PrepareReleaseService, ReleaseContext,
};

/// Hands a validated draft to the hosting platform, or only logs it in
/// dry-run. The host's answer is returned as is.
async fn submit_pull_request(
    pull_requests: &dyn PullRequestService,
    draft: ReleasePullRequest,
    dry_run: bool,
) -> Result<OpenPullRequestOutput> {
    if dry_run {
        warn!(
            "dry_run: would open pull request {} -> {}: {}",
            draft.head().value(),
            draft.base().value(),
            draft.title().value()
        );
        return Ok(OpenPullRequestOutput::default());
    }

    let output = pull_requests
        .open(OpenPullRequestRequest {
            base: draft.base().clone(),
            head: draft.head().clone(),
            title: draft.title().clone(),
            body: draft.body().clone(),
        })
        .await?;

    match output.pr_id.as_deref().map(PullRequestId::parse) {
        Some(Ok(id)) => {
            let opened = draft.opened(id);
            if let Some(id) = opened.id() {
                info!(
                    "opened pull request #{id} for {}",
                    opened.head().value()
                );
            }
        }
        Some(Err(err)) => warn!("host returned an unusable pull request id: {err}"),
        None => info!(
            "opened pull request for {}: {}",
            draft.head().value(),
            output.url.as_deref().unwrap_or("<no url>")
        ),
    }

    Ok(output)
}
