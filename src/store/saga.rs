//! Ordered multi-step writes with compensations
//!
//! Each forward step may register a compensation. If a later step fails the
//! registered compensations run newest-first, then the step's error is
//! returned. If any compensation fails the step's error is wrapped in
//! `RollbackFailed`. `commit` drops the compensations once every step
//! succeeded.

use crate::error::{QuireError, QuireResult};
use futures_util::future::BoxFuture;
use std::future::Future;
use tracing::{debug, warn};

/// Undo action for a completed step
pub type Compensation<'a> = Box<dyn FnOnce() -> BoxFuture<'a, QuireResult<()>> + Send + 'a>;

/// Wrap an async closure as a compensation
pub fn compensate<'a, F, Fut>(f: F) -> Compensation<'a>
where
    F: FnOnce() -> Fut + Send + 'a,
    Fut: Future<Output = QuireResult<()>> + Send + 'a,
{
    Box::new(move || Box::pin(f()))
}

/// A running sequence of steps
pub struct Saga<'a> {
    name: &'static str,
    completed: Vec<(&'static str, Compensation<'a>)>,
}

impl<'a> Saga<'a> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            completed: Vec::new(),
        }
    }

    /// Run one forward step
    ///
    /// On success the compensation (if any) is recorded. On failure all
    /// recorded compensations run before the error is returned.
    pub async fn step<T, F>(
        &mut self,
        label: &'static str,
        forward: F,
        compensation: Option<Compensation<'a>>,
    ) -> QuireResult<T>
    where
        F: Future<Output = QuireResult<T>>,
    {
        match forward.await {
            Ok(value) => {
                debug!("{}: step '{}' done", self.name, label);
                if let Some(compensation) = compensation {
                    self.completed.push((label, compensation));
                }
                Ok(value)
            }
            Err(e) => {
                warn!("{}: step '{}' failed: {}", self.name, label, e);
                let failures = self.unwind().await;
                if failures.is_empty() {
                    Err(e)
                } else {
                    Err(QuireError::RollbackFailed {
                        step: label,
                        reason: failures.join("; "),
                        source: Box::new(e),
                    })
                }
            }
        }
    }

    /// Number of compensations currently registered
    pub fn pending(&self) -> usize {
        self.completed.len()
    }

    /// Finish successfully, discarding all compensations
    pub fn commit(self) {
        debug!("{}: committed", self.name);
    }

    /// Run every recorded compensation; returns the ones that failed
    async fn unwind(&mut self) -> Vec<String> {
        let mut failures = Vec::new();
        while let Some((label, compensation)) = self.completed.pop() {
            match compensation().await {
                Ok(()) => debug!("{}: compensated '{}'", self.name, label),
                Err(e) => {
                    warn!("{}: compensation for '{}' failed: {}", self.name, label, e);
                    failures.push(format!("undo '{}': {}", label, e));
                }
            }
        }
        failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recorder(log: &Arc<Mutex<Vec<String>>>, entry: &str) -> Compensation<'static> {
        let log = Arc::clone(log);
        let entry = entry.to_string();
        compensate(move || async move {
            log.lock().unwrap().push(entry);
            Ok(())
        })
    }

    #[tokio::test]
    async fn failure_unwinds_in_reverse() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut saga = Saga::new("test");

        saga.step("one", async { Ok(()) }, Some(recorder(&log, "undo one")))
            .await
            .unwrap();
        saga.step("two", async { Ok(()) }, Some(recorder(&log, "undo two")))
            .await
            .unwrap();
        let err = saga
            .step::<(), _>(
                "three",
                async { Err(QuireError::User("boom".to_string())) },
                Some(recorder(&log, "undo three")),
            )
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "boom");
        assert_eq!(*log.lock().unwrap(), vec!["undo two", "undo one"]);
        assert_eq!(saga.pending(), 0);
    }

    #[tokio::test]
    async fn commit_skips_compensations() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut saga = Saga::new("test");

        let value = saga
            .step("one", async { Ok(7) }, Some(recorder(&log, "undo one")))
            .await
            .unwrap();
        assert_eq!(value, 7);
        assert_eq!(saga.pending(), 1);
        saga.commit();

        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failing_compensation_does_not_stop_unwind() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut saga = Saga::new("test");

        saga.step("one", async { Ok(()) }, Some(recorder(&log, "undo one")))
            .await
            .unwrap();
        saga.step(
            "two",
            async { Ok(()) },
            Some(compensate(|| async {
                Err(QuireError::User("cannot undo".to_string()))
            })),
        )
        .await
        .unwrap();
        let err = saga
            .step::<(), _>(
                "three",
                async { Err(QuireError::User("boom".to_string())) },
                None,
            )
            .await
            .unwrap_err();

        assert_eq!(*log.lock().unwrap(), vec!["undo one"]);
        match err {
            QuireError::RollbackFailed {
                step,
                reason,
                source,
            } => {
                assert_eq!(step, "three");
                assert!(reason.contains("undo 'two'"));
                assert!(reason.contains("cannot undo"));
                assert_eq!(source.to_string(), "boom");
            }
            other => panic!("expected RollbackFailed, got {other:?}"),
        }
    }
}
