//! [`VersioningService`] backends.
use async_trait::async_trait;
use log::*;
use std::{path::PathBuf, sync::Arc};
use tokio::fs;
use toml_edit::{DocumentMut, value};

use crate::{
    adapters::process::{CommandRunner, ProcessCommand},
    domain::{ReleaseLevel, ReleaseVersion},
    error::{ReleaseError, Result},
    ports::VersioningService,
};

/// Reads and writes the version through `poetry version`.
pub struct PoetryVersioningService {
    runner: Arc<dyn CommandRunner>,
}

impl PoetryVersioningService {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    async fn set_version(&self, version: &ReleaseVersion) -> Result<()> {
        let version = version.value();
        self.runner
            .run(ProcessCommand::new("poetry", ["version", version.as_str()]))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl VersioningService for PoetryVersioningService {
    async fn current_version(&self) -> Result<ReleaseVersion> {
        // prints "<package> <version>"
        let output = self
            .runner
            .run(ProcessCommand::new("poetry", ["version"]))
            .await?;

        let raw = output
            .split_whitespace()
            .last()
            .ok_or_else(|| ReleaseError::InvalidReleaseVersion(output.clone()))?;

        ReleaseVersion::parse(raw)
    }

    async fn compute_next_version(
        &self,
        level: ReleaseLevel,
    ) -> Result<ReleaseVersion> {
        self.current_version().await?.bump(level)
    }

    async fn apply_version(&self, version: &ReleaseVersion) -> Result<()> {
        info!("setting version to {version}");
        self.set_version(version).await
    }

    async fn rollback_version(&self, previous: &ReleaseVersion) -> Result<()> {
        info!("restoring version {previous}");
        self.set_version(previous).await
    }
}

/// Edits `package.version` in a Cargo manifest, keeping its formatting.
pub struct CargoVersioningService {
    manifest: PathBuf,
}

impl CargoVersioningService {
    pub fn new(manifest: impl Into<PathBuf>) -> Self {
        Self {
            manifest: manifest.into(),
        }
    }

    async fn load_doc(&self) -> Result<DocumentMut> {
        let content = fs::read_to_string(&self.manifest).await?;
        let doc: DocumentMut = content.parse()?;
        Ok(doc)
    }

    async fn write_version(&self, version: &ReleaseVersion) -> Result<()> {
        let mut doc = self.load_doc().await?;

        if doc.get("package").is_none() {
            return Err(ReleaseError::invalid_config(format!(
                "{} has no [package] table",
                self.manifest.display()
            )));
        }

        doc["package"]["version"] = value(version.value());
        fs::write(&self.manifest, doc.to_string()).await?;
        Ok(())
    }
}

#[async_trait]
impl VersioningService for CargoVersioningService {
    async fn current_version(&self) -> Result<ReleaseVersion> {
        let doc = self.load_doc().await?;

        let raw = doc
            .get("package")
            .and_then(|package| package.get("version"))
            .and_then(|version| version.as_str())
            .ok_or_else(|| {
                ReleaseError::invalid_config(format!(
                    "{} has no package.version",
                    self.manifest.display()
                ))
            })?;

        ReleaseVersion::parse(raw)
    }

    async fn compute_next_version(
        &self,
        level: ReleaseLevel,
    ) -> Result<ReleaseVersion> {
        self.current_version().await?.bump(level)
    }

    async fn apply_version(&self, version: &ReleaseVersion) -> Result<()> {
        info!("setting {} version to {version}", self.manifest.display());
        self.write_version(version).await
    }

    async fn rollback_version(&self, previous: &ReleaseVersion) -> Result<()> {
        info!("restoring {} version {previous}", self.manifest.display());
        self.write_version(previous).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{adapters::process::MockCommandRunner, test_helpers::write_file};

    const MANIFEST: &str = r#"[package]
name = "demo" # the demo crate
version = "1.1.0"
edition = "2024"

[dependencies]
serde = "1"
"#;

    #[tokio::test]
    async fn test_poetry_reads_version_from_output() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|cmd| cmd.to_string() == "poetry version")
            .returning(|_| Ok("demo 1.1.0".into()));
        let service = PoetryVersioningService::new(Arc::new(runner));

        assert_eq!(
            service.current_version().await.unwrap(),
            ReleaseVersion::new(1, 1, 0)
        );
        assert_eq!(
            service
                .compute_next_version(ReleaseLevel::Minor)
                .await
                .unwrap(),
            ReleaseVersion::new(1, 2, 0)
        );
    }

    #[tokio::test]
    async fn test_poetry_next_version_overflow_is_an_error() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .returning(|_| Ok("demo 1.2.18446744073709551615".into()));
        let service = PoetryVersioningService::new(Arc::new(runner));

        let err = service
            .compute_next_version(ReleaseLevel::Patch)
            .await
            .unwrap_err();

        assert!(matches!(err, ReleaseError::InvalidReleaseVersion(_)));
    }

    #[tokio::test]
    async fn test_poetry_sets_and_restores_version() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|cmd| cmd.to_string() == "poetry version 1.2.0")
            .times(1)
            .returning(|_| Ok(String::new()));
        runner
            .expect_run()
            .withf(|cmd| cmd.to_string() == "poetry version 1.1.0")
            .times(1)
            .returning(|_| Ok(String::new()));
        let service = PoetryVersioningService::new(Arc::new(runner));

        service
            .apply_version(&ReleaseVersion::new(1, 2, 0))
            .await
            .unwrap();
        service
            .rollback_version(&ReleaseVersion::new(1, 1, 0))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_poetry_rejects_unparseable_output() {
        let mut runner = MockCommandRunner::new();
        runner.expect_run().returning(|_| Ok(String::new()));
        let service = PoetryVersioningService::new(Arc::new(runner));

        assert!(matches!(
            service.current_version().await.unwrap_err(),
            ReleaseError::InvalidReleaseVersion(_)
        ));
    }

    #[tokio::test]
    async fn test_cargo_compute_does_not_touch_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "Cargo.toml", MANIFEST);
        let service = CargoVersioningService::new(path.clone());

        let next = service
            .compute_next_version(ReleaseLevel::Major)
            .await
            .unwrap();

        assert_eq!(next, ReleaseVersion::new(2, 0, 0));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), MANIFEST);
    }

    #[tokio::test]
    async fn test_cargo_apply_then_rollback_restores_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "Cargo.toml", MANIFEST);
        let service = CargoVersioningService::new(path.clone());

        service
            .apply_version(&ReleaseVersion::new(1, 2, 0))
            .await
            .unwrap();

        let updated = std::fs::read_to_string(&path).unwrap();
        assert!(updated.contains(r#"version = "1.2.0""#));
        assert!(updated.contains("# the demo crate"));
        assert_eq!(
            service.current_version().await.unwrap(),
            ReleaseVersion::new(1, 2, 0)
        );

        service
            .rollback_version(&ReleaseVersion::new(1, 1, 0))
            .await
            .unwrap();

        let restored = std::fs::read_to_string(&path).unwrap();
        assert!(restored.contains(r#"version = "1.1.0""#));
        assert!(restored.contains("# the demo crate"));
        assert!(restored.contains("[dependencies]"));
    }

    #[tokio::test]
    async fn test_cargo_workspace_manifest_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "Cargo.toml",
            "[workspace]\nmembers = [\"a\"]\n",
        );
        let service = CargoVersioningService::new(path.clone());

        assert!(matches!(
            service.current_version().await.unwrap_err(),
            ReleaseError::InvalidConfig(_)
        ));
        assert!(matches!(
            service
                .apply_version(&ReleaseVersion::new(1, 0, 0))
                .await
                .unwrap_err(),
            ReleaseError::InvalidConfig(_)
        ));
    }
}
