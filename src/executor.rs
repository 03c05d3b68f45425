//! Fixed-size worker pool for slow downstream calls.
//!
//! Tasks are spawned onto the runtime and gated by a semaphore, so at most
//! `workers` of them make progress at once and the rest queue. Waiting on a
//! [`TaskHandle`] is bounded by a deadline; when it passes, the waiter gives up
//! but the task keeps running to completion in the background and its result
//! is dropped. Nothing is cancelled, so repeated timeouts pile up stragglers;
//! [`TaskExecutor::in_flight`] makes that visible.

use anyhow::{Context, anyhow};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

#[derive(Debug, Error)]
pub enum WaitError {
    #[error("task did not finish within {0:?}")]
    Timeout(Duration),

    #[error("task failed: {0:#}")]
    Task(anyhow::Error),
}

/// Bounded task executor. Cheap to clone; clones share the same pool.
#[derive(Clone)]
pub struct TaskExecutor {
    permits: Arc<Semaphore>,
    in_flight: Arc<AtomicUsize>,
}

impl TaskExecutor {
    pub fn new(workers: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(workers)),
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Queue a task. It starts as soon as a worker is free.
    pub fn submit<F, T>(&self, task: F) -> TaskHandle<T>
    where
        F: Future<Output = anyhow::Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        let permits = Arc::clone(&self.permits);
        let guard = InFlight::enter(Arc::clone(&self.in_flight));

        let join = tokio::spawn(async move {
            let _guard = guard;
            let _permit = permits
                .acquire_owned()
                .await
                .context("executor is shut down")?;
            task.await
        });

        TaskHandle { join }
    }

    /// Workers not currently running a task.
    pub fn idle_workers(&self) -> usize {
        self.permits.available_permits()
    }

    /// Submitted tasks that have not finished yet, queued, running or detached.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }
}

/// Counts a task as in flight until dropped.
struct InFlight(Arc<AtomicUsize>);

impl InFlight {
    fn enter(counter: Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A submitted task's result, not yet collected.
pub struct TaskHandle<T> {
    join: JoinHandle<anyhow::Result<T>>,
}

impl<T> TaskHandle<T> {
    /// Wait up to `timeout` for the result. On timeout the task is detached,
    /// not aborted.
    pub async fn wait(self, timeout: Duration) -> Result<T, WaitError> {
        match tokio::time::timeout(timeout, self.join).await {
            Err(_) => Err(WaitError::Timeout(timeout)),
            Ok(Err(join_err)) => Err(WaitError::Task(anyhow!("task panicked: {join_err}"))),
            Ok(Ok(Err(e))) => Err(WaitError::Task(e)),
            Ok(Ok(Ok(value))) => Ok(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;

    #[tokio::test]
    async fn returns_result() {
        let executor = TaskExecutor::new(2);
        let value = executor
            .submit(async { Ok(21 * 2) })
            .wait(Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn task_error_is_reported() {
        let executor = TaskExecutor::new(1);
        let err = executor
            .submit(async { Err::<(), _>(anyhow!("boom")) })
            .wait(Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, WaitError::Task(ref e) if e.to_string().contains("boom")));
    }

    #[tokio::test]
    async fn panic_is_reported_as_task_error() {
        let executor = TaskExecutor::new(1);
        let err = executor
            .submit(async {
                if true {
                    panic!("worker blew up");
                }
                Ok(())
            })
            .wait(Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, WaitError::Task(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_detaches_without_cancelling() {
        let executor = TaskExecutor::new(1);
        let finished = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&finished);

        let err = executor
            .submit(async move {
                tokio::time::sleep(Duration::from_secs(30)).await;
                flag.store(true, Ordering::SeqCst);
                Ok(())
            })
            .wait(Duration::from_secs(20))
            .await
            .unwrap_err();

        assert!(matches!(err, WaitError::Timeout(d) if d == Duration::from_secs(20)));
        assert_eq!(executor.in_flight(), 1);
        assert!(!finished.load(Ordering::SeqCst));

        // The straggler still runs to completion.
        tokio::time::sleep(Duration::from_secs(15)).await;
        assert!(finished.load(Ordering::SeqCst));
        assert_eq!(executor.in_flight(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn excess_submissions_queue() {
        let executor = TaskExecutor::new(1);
        let _slow = executor.submit(async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(())
        });
        // Let the first task take the only worker.
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(executor.idle_workers(), 0);

        let queued = executor.submit(async { Ok("second") });
        assert_eq!(executor.in_flight(), 2);

        // Queue time counts against the deadline.
        let err = queued.wait(Duration::from_secs(5)).await.unwrap_err();
        assert!(matches!(err, WaitError::Timeout(_)));

        let late = executor.submit(async { Ok("third") });
        assert_eq!(late.wait(Duration::from_secs(20)).await.unwrap(), "third");
    }
}
