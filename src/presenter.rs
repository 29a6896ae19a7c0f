//! Presentation boundary: runs the requested command, prints its result and
//! turns failures into remediation text and an exit code.
use log::*;
use serde::Serialize;
use serde_json::Value;

use crate::{
    cli::{Args, Command},
    config::Config,
    container::Container,
    error::{ReleaseError, Result},
    service::{CreateReleasePullRequestInput, PrepareReleaseInput},
};

/// Longest error summary shown before truncation.
const MAX_SUMMARY_LENGTH: usize = 200;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;

/// Runs the parsed command and returns the process exit code.
pub async fn present(args: Args) -> i32 {
    match run(args).await {
        Ok(()) => EXIT_SUCCESS,
        Err(err) => {
            debug!("release failed: {err:?}");
            for line in failure_report(&err) {
                eprintln!("{line}");
            }
            EXIT_FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let config = Config::load(&args.config_path()).await?;
    let container = Container::new(&args.repo, config).await?;
    let json = args.command.json();

    match args.command {
        Command::Prepare { level, execute, .. } => {
            let dry_run = !execute;
            info!("preparing release with level: {level}, dry_run: {dry_run}");

            let output = container
                .prepare_release()
                .execute(PrepareReleaseInput { level, dry_run })
                .await?;

            println!("{}", render(&output, json)?);

            if dry_run {
                info!("dry run mode - no changes were made");
            } else {
                info!("release executed successfully");
            }
        }
        Command::CreatePr {
            base,
            head,
            title,
            body,
            execute,
            ..
        } => {
            let output = container
                .create_pull_request()
                .execute(CreateReleasePullRequestInput {
                    base,
                    head,
                    title,
                    body,
                    dry_run: !execute,
                })
                .await?;

            println!("{}", render(&output, json)?);
        }
    }

    Ok(())
}

/// JSON, or one `key: value` line per field for humans.
pub fn render<T: Serialize>(payload: &T, json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(payload)?);
    }

    let rendered = match serde_json::to_value(payload)? {
        Value::Object(fields) => fields
            .iter()
            .map(|(key, value)| format!("{key}: {}", human_value(value)))
            .collect::<Vec<String>>()
            .join("\n"),
        other => human_value(&other),
    };

    Ok(rendered)
}

fn human_value(value: &Value) -> String {
    match value {
        Value::Null => "-".into(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// First line of an error message, cut to a readable length.
pub fn summarize(message: &str) -> String {
    let first = message.lines().next().unwrap_or_default().trim();

    if first.chars().count() > MAX_SUMMARY_LENGTH {
        let cut: String = first.chars().take(MAX_SUMMARY_LENGTH).collect();
        return format!("{cut}...");
    }

    first.to_string()
}

fn header(title: &str) -> String {
    format!("\n❌ Release Failed: {title}")
}

/// Lines explaining a failure and how to recover from it.
pub fn failure_report(err: &ReleaseError) -> Vec<String> {
    match err {
        ReleaseError::TagAlreadyExists(tag) => vec![
            header("Tag already exists"),
            format!("   {err}"),
            "   Choose another release level, or remove the tag:".into(),
            format!("   git tag -d {tag} && git push origin --delete {tag}"),
        ],
        ReleaseError::ReleaseBranchExists(branch) => vec![
            header("Branch already exists with these changes"),
            format!("   Branch '{branch}' already exists and may hold the release artifacts."),
            "   To start over, delete it locally and remotely:".into(),
            format!("   git branch -D {branch}"),
            format!("   git push origin --delete {branch}"),
        ],
        ReleaseError::CommandFailed { stderr, .. }
            if stderr.contains("nothing to commit") =>
        {
            vec![
                header("Nothing to commit"),
                "   The release branch already exists with the same changes."
                    .into(),
            ]
        }
        ReleaseError::CommandFailed { command, stderr }
            if command.starts_with("git push") =>
        {
            vec![
                header("Git push error"),
                "   Could not push release branch to remote.".into(),
                format!("   {}", summarize(stderr)),
                "   Check network connection and repository permissions."
                    .into(),
            ]
        }
        ReleaseError::CommandFailed { command, stderr }
            if command.starts_with("gh ") =>
        {
            vec![
                header("Pull request creation error"),
                "   Could not create pull request.".into(),
                format!("   {}", summarize(stderr)),
                "   Install GitHub CLI: gh --version".into(),
                "   Authenticate: gh auth status".into(),
            ]
        }
        ReleaseError::InvalidReleasePullRequest(_) => vec![
            header("Invalid pull request"),
            format!("   {err}"),
        ],
        err if err.is_validation() => {
            vec![header("Invalid input"), format!("   {err}")]
        }
        err => vec![
            header("Unexpected error"),
            format!("   {}", summarize(&err.to_string())),
            "   Check if all dependencies are installed (git, gh, poetry)"
                .into(),
            "   and rerun with --debug for details.".into(),
        ],
    }
}
