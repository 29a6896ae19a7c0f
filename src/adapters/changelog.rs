//! Changelog entries from `git log`, and the changelog file they are
//! written to.
use async_trait::async_trait;
use log::*;
use regex::Regex;
use serde::Serialize;
use std::{
    io::ErrorKind,
    path::PathBuf,
    sync::{Arc, LazyLock},
};
use tokio::fs;

use crate::{
    adapters::process::{CommandRunner, ProcessCommand},
    domain::{ReleaseVersion, TagName},
    error::{ReleaseError, Result},
    ports::{
        ChangelogGenerator, ChangelogRequest, ChangelogResponse,
        ChangelogWriter,
    },
};

/// One line per commit: `- <subject> (<short hash>)`.
const LOG_FORMAT: &str = "--pretty=format:- %s (%h)";

static EXTRA_NEW_LINES_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

pub struct GitChangelogGenerator {
    runner: Arc<dyn CommandRunner>,
}

impl GitChangelogGenerator {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    /// The tag of the requested version if it exists, otherwise the most
    /// recent tag, otherwise nothing (whole history).
    async fn start_ref(&self, from: &ReleaseVersion) -> Option<String> {
        let tag = TagName::for_version(from);

        let requested = ProcessCommand::git([
            "rev-parse".to_string(),
            "--verify".to_string(),
            format!("refs/tags/{}", tag.value()),
        ])
        .quiet();
        if self.runner.run(requested).await.is_ok() {
            return Some(tag.value().to_string());
        }

        debug!("tag {tag} not found, falling back to latest tag");

        let latest =
            ProcessCommand::git(["describe", "--tags", "--abbrev=0"]).quiet();
        match self.runner.run(latest).await {
            Ok(latest) if !latest.is_empty() => Some(latest),
            _ => None,
        }
    }
}

#[async_trait]
impl ChangelogGenerator for GitChangelogGenerator {
    async fn generate(
        &self,
        req: ChangelogRequest,
    ) -> Result<ChangelogResponse> {
        let range = match self.start_ref(&req.from_version).await {
            Some(start) => format!("{start}..HEAD"),
            None => {
                info!("no tags found: using entire history for changelog");
                "HEAD".to_string()
            }
        };

        let stdout = self
            .runner
            .run(ProcessCommand::git(["log", range.as_str(), LOG_FORMAT]))
            .await
            .map_err(|e| {
                ReleaseError::ChangelogGeneration(format!(
                    "Failed to generate changelog: {e}"
                ))
            })?;

        let entries = stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect();

        Ok(ChangelogResponse { entries })
    }
}

/// Values exposed to the changelog section template.
#[derive(Serialize)]
struct ChangelogSection<'a> {
    version: String,
    tag: String,
    entries: &'a [String],
}

/// Prepends a rendered section per release to a markdown changelog.
pub struct FileChangelogWriter {
    path: PathBuf,
    body: String,
}

impl FileChangelogWriter {
    pub fn new(path: impl Into<PathBuf>, body: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            body: body.into(),
        }
    }

    fn render(
        &self,
        version: &ReleaseVersion,
        changelog: &ChangelogResponse,
    ) -> Result<String> {
        let context = tera::Context::from_serialize(ChangelogSection {
            version: version.value(),
            tag: TagName::for_version(version).value().to_string(),
            entries: &changelog.entries,
        })?;
        let section = tera::Tera::one_off(&self.body, &context, false)?;
        Ok(section.trim().to_string())
    }
}

#[async_trait]
impl ChangelogWriter for FileChangelogWriter {
    async fn write(
        &self,
        version: &ReleaseVersion,
        changelog: &ChangelogResponse,
    ) -> Result<Option<String>> {
        let previous = match fs::read_to_string(&self.path).await {
            Ok(content) => Some(content),
            Err(err) if err.kind() == ErrorKind::NotFound => None,
            Err(err) => return Err(err.into()),
        };

        let section = self.render(version, changelog)?;
        let content = format!(
            "{section}\n\n{}",
            previous.as_deref().unwrap_or_default()
        );
        let content = EXTRA_NEW_LINES_REGEX
            .replace_all(&content, "\n\n")
            .trim()
            .to_string()
            + "\n";

        info!(
            "writing {} changelog entries to {}",
            changelog.entries.len(),
            self.path.display()
        );
        fs::write(&self.path, content).await?;

        Ok(previous)
    }

    async fn restore(&self, previous: Option<String>) -> Result<()> {
        match previous {
            Some(content) => {
                info!("restoring {}", self.path.display());
                fs::write(&self.path, content).await?;
            }
            None => {
                info!("removing {}", self.path.display());
                fs::remove_file(&self.path).await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        adapters::process::MockCommandRunner, config::DEFAULT_CHANGELOG_BODY,
        test_helpers::write_file,
    };

    fn request() -> ChangelogRequest {
        ChangelogRequest {
            from_version: ReleaseVersion::new(1, 1, 0),
        }
    }

    fn fail(cmd: ProcessCommand) -> Result<String> {
        Err(ReleaseError::command_failed(cmd.to_string(), "fatal"))
    }

    #[tokio::test]
    async fn test_uses_requested_tag_when_present() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|cmd| cmd.quiet && cmd.to_string() == "git rev-parse --verify refs/tags/v1.1.0")
            .returning(|_| Ok("abc".into()));
        runner
            .expect_run()
            .withf(|cmd| cmd.args == ["log", "v1.1.0..HEAD", LOG_FORMAT])
            .times(1)
            .returning(|_| {
                Ok("- feat: add (abc1234)\n\n  - fix: bug (def5678)  \n".into())
            });

        let response = GitChangelogGenerator::new(Arc::new(runner))
            .generate(request())
            .await
            .unwrap();

        assert_eq!(
            response.entries,
            vec!["- feat: add (abc1234)", "- fix: bug (def5678)"]
        );
    }

    #[tokio::test]
    async fn test_falls_back_to_latest_tag() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|cmd| cmd.args.first().map(String::as_str) == Some("rev-parse"))
            .returning(fail);
        runner
            .expect_run()
            .withf(|cmd| cmd.args.first().map(String::as_str) == Some("describe"))
            .returning(|_| Ok("v1.0.3".into()));
        runner
            .expect_run()
            .withf(|cmd| cmd.args == ["log", "v1.0.3..HEAD", LOG_FORMAT])
            .times(1)
            .returning(|_| Ok(String::new()));

        let response = GitChangelogGenerator::new(Arc::new(runner))
            .generate(request())
            .await
            .unwrap();

        assert!(response.entries.is_empty());
    }

    #[tokio::test]
    async fn test_uses_whole_history_without_tags() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|cmd| cmd.args.first().map(String::as_str) != Some("log"))
            .returning(fail);
        runner
            .expect_run()
            .withf(|cmd| cmd.args == ["log", "HEAD", LOG_FORMAT])
            .times(1)
            .returning(|_| Ok("- initial commit (0000001)".into()));

        let response = GitChangelogGenerator::new(Arc::new(runner))
            .generate(request())
            .await
            .unwrap();

        assert_eq!(response.entries, vec!["- initial commit (0000001)"]);
    }

    #[tokio::test]
    async fn test_log_failure_is_a_changelog_error() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|cmd| cmd.args.first().map(String::as_str) != Some("log"))
            .returning(fail);
        runner
            .expect_run()
            .withf(|cmd| cmd.args.first().map(String::as_str) == Some("log"))
            .returning(fail);

        let err = GitChangelogGenerator::new(Arc::new(runner))
            .generate(request())
            .await
            .unwrap_err();

        assert!(matches!(err, ReleaseError::ChangelogGeneration(_)));
    }

    fn entries(lines: &[&str]) -> ChangelogResponse {
        ChangelogResponse {
            entries: lines.iter().map(|l| l.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_writer_creates_then_prepends_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("CHANGELOG.md");
        let writer = FileChangelogWriter::new(&path, DEFAULT_CHANGELOG_BODY);

        let previous = writer
            .write(
                &ReleaseVersion::new(1, 2, 0),
                &entries(&["- feat: add (abc1234)", "- fix: bug (def5678)"]),
            )
            .await
            .unwrap();

        assert!(previous.is_none());
        let first = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            first,
            "## v1.2.0\n\n- feat: add (abc1234)\n- fix: bug (def5678)\n"
        );

        let previous = writer
            .write(&ReleaseVersion::new(1, 3, 0), &entries(&["- feat: more (0000001)"]))
            .await
            .unwrap();

        assert_eq!(previous.as_deref(), Some(first.as_str()));
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "## v1.3.0\n\n- feat: more (0000001)\n\n## v1.2.0\n\n- feat: add (abc1234)\n- fix: bug (def5678)\n"
        );
    }

    #[tokio::test]
    async fn test_writer_uses_configured_template() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("CHANGES.md");
        let writer = FileChangelogWriter::new(
            &path,
            "# {{ version }} ({{ entries | length }} changes)",
        );

        writer
            .write(&ReleaseVersion::new(2, 0, 0), &entries(&["- a (1)", "- b (2)"]))
            .await
            .unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "# 2.0.0 (2 changes)\n"
        );
    }

    #[tokio::test]
    async fn test_restore_puts_back_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "CHANGELOG.md", "## v1.1.0\n\n- old\n");
        let writer = FileChangelogWriter::new(&path, DEFAULT_CHANGELOG_BODY);

        let previous = writer
            .write(&ReleaseVersion::new(1, 2, 0), &entries(&["- new"]))
            .await
            .unwrap();
        writer.restore(previous).await.unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "## v1.1.0\n\n- old\n"
        );
    }

    #[tokio::test]
    async fn test_restore_removes_created_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("CHANGELOG.md");
        let writer = FileChangelogWriter::new(&path, DEFAULT_CHANGELOG_BODY);

        let previous = writer
            .write(&ReleaseVersion::new(1, 2, 0), &entries(&["- new"]))
            .await
            .unwrap();
        writer.restore(previous).await.unwrap();

        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_broken_template_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "CHANGELOG.md", "keep\n");
        let writer = FileChangelogWriter::new(&path, "{% for %}");

        let err = writer
            .write(&ReleaseVersion::new(1, 2, 0), &entries(&["- new"]))
            .await
            .unwrap_err();

        assert!(matches!(err, ReleaseError::TemplateError(_)));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "keep\n");
    }
}
