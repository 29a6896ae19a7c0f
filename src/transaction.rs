//! Compensating transaction over non-transactional side effects.
//!
//! Each forward action that changes repository state registers a
//! [`ReleaseStep`] holding its undo. On failure the undos run newest first.
use async_trait::async_trait;
use log::*;
#[cfg(test)]
use mockall::automock;
use std::{fmt, future::Future, pin::Pin, sync::Arc};

use crate::error::Result;

/// Future returned by an undo action.
pub type UndoFuture = Pin<Box<dyn Future<Output = Result<()>> + Send>>;

/// One-shot compensating action.
pub type UndoAction = Box<dyn FnOnce() -> UndoFuture + Send>;

/// Builds a fresh transaction for each release run.
pub type TransactionFactory =
    Arc<dyn Fn() -> Box<dyn ReleaseTransaction> + Send + Sync>;

/// A named undo registered after its forward action succeeded.
pub struct ReleaseStep {
    name: String,
    undo: UndoAction,
}

impl ReleaseStep {
    pub fn new<F, Fut>(name: impl Into<String>, undo: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        Self {
            name: name.into(),
            undo: Box::new(move || Box::pin(undo()) as UndoFuture),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Consumes the step so the undo can only ever run once.
    pub async fn undo(self) -> Result<()> {
        (self.undo)().await
    }
}

impl fmt::Debug for ReleaseStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReleaseStep")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ReleaseTransaction: Send {
    /// Appends a step. Steps are never reordered or deduplicated.
    fn register_step(&mut self, step: ReleaseStep);

    /// Marks the run successful and forgets every registered step.
    async fn commit(&mut self) -> Result<()>;

    /// Runs every registered undo in reverse registration order.
    async fn rollback(&mut self) -> Result<()>;
}

/// Saga coordinator that keeps its steps in memory.
#[derive(Debug, Default)]
pub struct InMemoryReleaseTransaction {
    steps: Vec<ReleaseStep>,
}

impl InMemoryReleaseTransaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn factory() -> TransactionFactory {
        Arc::new(|| Box::new(Self::new()) as Box<dyn ReleaseTransaction>)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[async_trait]
impl ReleaseTransaction for InMemoryReleaseTransaction {
    fn register_step(&mut self, step: ReleaseStep) {
        debug!("registered release step: {}", step.name());
        self.steps.push(step);
    }

    async fn commit(&mut self) -> Result<()> {
        debug!("committing release transaction");
        self.steps.clear();
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        let steps = std::mem::take(&mut self.steps);

        if steps.is_empty() {
            return Ok(());
        }

        warn!("rolling back {} release step(s)", steps.len());

        for step in steps.into_iter().rev() {
            let name = step.name().to_string();
            info!("undoing: {name}");
            if let Err(err) = step.undo().await {
                error!("failed to undo step '{name}': {err}");
            }
        }

        Ok(())
    }
}

/// Settles a transaction from the outcome of its block: commit on success,
/// roll back on failure. The block's own error is always what the caller
/// sees.
pub async fn finish<T>(
    transaction: &mut dyn ReleaseTransaction,
    outcome: Result<T>,
) -> Result<T> {
    match outcome {
        Ok(value) => {
            transaction.commit().await?;
            Ok(value)
        }
        Err(err) => {
            error!("release failed, rolling back: {err}");
            if let Err(rollback_err) = transaction.rollback().await {
                error!("rollback did not complete: {rollback_err}");
            }
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReleaseError;
    use std::sync::{Arc, Mutex};

    type Journal = Arc<Mutex<Vec<String>>>;

    fn recording_step(name: &str, journal: &Journal) -> ReleaseStep {
        let journal = Arc::clone(journal);
        let label = name.to_string();
        ReleaseStep::new(name, move || async move {
            journal.lock().unwrap().push(label);
            Ok(())
        })
    }

    fn failing_step(name: &str, journal: &Journal) -> ReleaseStep {
        let journal = Arc::clone(journal);
        let label = name.to_string();
        ReleaseStep::new(name, move || async move {
            journal.lock().unwrap().push(label);
            Err(ReleaseError::command_failed("git branch -D x", "boom"))
        })
    }

    #[tokio::test]
    async fn test_rollback_runs_steps_in_reverse_order() {
        let journal = Journal::default();
        let mut tx = InMemoryReleaseTransaction::new();

        tx.register_step(recording_step("s1", &journal));
        tx.register_step(recording_step("s2", &journal));
        tx.register_step(recording_step("s3", &journal));

        tx.rollback().await.unwrap();

        assert_eq!(*journal.lock().unwrap(), vec!["s3", "s2", "s1"]);
        assert!(tx.is_empty());
    }

    #[tokio::test]
    async fn test_rollback_continues_past_failing_undo() {
        let journal = Journal::default();
        let mut tx = InMemoryReleaseTransaction::new();

        tx.register_step(recording_step("s1", &journal));
        tx.register_step(failing_step("s2", &journal));
        tx.register_step(recording_step("s3", &journal));

        tx.rollback().await.unwrap();

        assert_eq!(*journal.lock().unwrap(), vec!["s3", "s2", "s1"]);
    }

    #[tokio::test]
    async fn test_rollback_runs_each_undo_once() {
        let journal = Journal::default();
        let mut tx = InMemoryReleaseTransaction::new();
        tx.register_step(recording_step("s1", &journal));

        tx.rollback().await.unwrap();
        tx.rollback().await.unwrap();

        assert_eq!(*journal.lock().unwrap(), vec!["s1"]);
    }

    #[tokio::test]
    async fn test_commit_discards_steps() {
        let journal = Journal::default();
        let mut tx = InMemoryReleaseTransaction::new();
        tx.register_step(recording_step("s1", &journal));
        assert_eq!(tx.len(), 1);

        tx.commit().await.unwrap();
        tx.rollback().await.unwrap();

        assert!(journal.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_finish_commits_on_success() {
        let journal = Journal::default();
        let mut tx = InMemoryReleaseTransaction::new();
        tx.register_step(recording_step("s1", &journal));

        let value = finish(&mut tx, Ok(7)).await.unwrap();

        assert_eq!(value, 7);
        assert!(tx.is_empty());
        assert!(journal.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_finish_rolls_back_and_returns_original_error() {
        let journal = Journal::default();
        let mut tx = InMemoryReleaseTransaction::new();
        tx.register_step(recording_step("s1", &journal));
        tx.register_step(failing_step("s2", &journal));

        let result: Result<()> = finish(
            &mut tx,
            Err(ReleaseError::command_failed("git push origin x", "denied")),
        )
        .await;

        let err = result.unwrap_err();
        assert!(
            matches!(err, ReleaseError::CommandFailed { ref command, .. } if command == "git push origin x")
        );
        assert_eq!(*journal.lock().unwrap(), vec!["s2", "s1"]);
    }

    #[tokio::test]
    async fn test_finish_returns_error_even_if_rollback_fails() {
        let mut tx = MockReleaseTransaction::new();
        tx.expect_rollback()
            .times(1)
            .returning(|| Err(ReleaseError::invalid_config("broken")));
        tx.expect_commit().never();

        let result: Result<()> = finish(
            &mut tx,
            Err(ReleaseError::TagAlreadyExists("v1.0.0".into())),
        )
        .await;

        assert!(matches!(
            result.unwrap_err(),
            ReleaseError::TagAlreadyExists(_)
        ));
    }
}
