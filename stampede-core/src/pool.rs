//! Bounded worker pool with a wait-for-all barrier

use futures::future::join_all;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Outcome of one pooled task
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome<T> {
    Completed(T),
    /// The task panicked or was cancelled
    Failed(String),
}

impl<T> TaskOutcome<T> {
    pub fn into_result(self) -> Result<T, String> {
        match self {
            TaskOutcome::Completed(value) => Ok(value),
            TaskOutcome::Failed(message) => Err(message),
        }
    }
}

/// Runs tasks on the tokio runtime with at most `max_workers` live at once
#[derive(Debug, Clone)]
pub struct WorkerPool {
    max_workers: usize,
    permits: Arc<Semaphore>,
}

impl WorkerPool {
    /// `max_workers` of zero is treated as one
    pub fn new(max_workers: usize) -> Self {
        let max_workers = max_workers.max(1);
        Self {
            max_workers,
            permits: Arc::new(Semaphore::new(max_workers)),
        }
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Tasks currently holding a worker slot
    pub fn busy(&self) -> usize {
        self.max_workers - self.permits.available_permits()
    }

    /// Run every task and wait for all of them.
    ///
    /// A slot is taken before each task is spawned, so no more than
    /// `max_workers` tasks exist at any time. Outcomes come back in
    /// submission order regardless of completion order.
    pub async fn run_all<I, Fut, T>(&self, tasks: I) -> Vec<TaskOutcome<T>>
    where
        I: IntoIterator<Item = Fut>,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let mut handles: Vec<Option<JoinHandle<T>>> = Vec::new();

        for task in tasks {
            match self.permits.clone().acquire_owned().await {
                Ok(permit) => {
                    handles.push(Some(tokio::spawn(async move {
                        let output = task.await;
                        drop(permit);
                        output
                    })));
                }
                Err(_) => {
                    warn!("Worker pool closed; task not started");
                    handles.push(None);
                }
            }
        }

        debug!(tasks = handles.len(), max_workers = self.max_workers, "Waiting for pooled tasks");

        join_all(handles.into_iter().map(|handle| async move {
            match handle {
                Some(handle) => match handle.await {
                    Ok(value) => TaskOutcome::Completed(value),
                    Err(e) if e.is_panic() => {
                        TaskOutcome::Failed(format!("task panicked: {}", panic_message(e)))
                    }
                    Err(e) => TaskOutcome::Failed(format!("task cancelled: {e}")),
                },
                None => TaskOutcome::Failed("worker pool closed".to_string()),
            }
        }))
        .await
    }
}

fn panic_message(error: tokio::task::JoinError) -> String {
    let payload = error.into_panic();
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_outcomes_in_submission_order() {
        let pool = WorkerPool::new(4);
        let tasks = (0..10u64).map(|i| async move {
            // Later tasks finish first
            tokio::time::sleep(Duration::from_millis(20 - i * 2)).await;
            i
        });

        let outcomes = pool.run_all(tasks).await;
        let values: Vec<u64> = outcomes
            .into_iter()
            .map(|o| o.into_result().unwrap())
            .collect();
        assert_eq!(values, (0..10).collect::<Vec<_>>());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrency_never_exceeds_max_workers() {
        let pool = WorkerPool::new(5);
        let live = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let tasks = (0..40).map(|_| {
            let live = live.clone();
            let peak = peak.clone();
            async move {
                let now = live.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                live.fetch_sub(1, Ordering::SeqCst);
            }
        });

        let outcomes = pool.run_all(tasks).await;
        assert_eq!(outcomes.len(), 40);
        assert!(peak.load(Ordering::SeqCst) <= 5);
        assert_eq!(peak.load(Ordering::SeqCst), 5);
        assert_eq!(live.load(Ordering::SeqCst), 0);
        assert_eq!(pool.busy(), 0);
    }

    #[tokio::test]
    async fn test_panic_becomes_failed_outcome() {
        let pool = WorkerPool::new(2);
        let tasks = (0..3u32).map(|i| async move {
            if i == 1 {
                panic!("user {} exploded", i);
            }
            i
        });

        let outcomes = pool.run_all(tasks).await;
        assert_eq!(outcomes[0], TaskOutcome::Completed(0));
        assert_eq!(outcomes[2], TaskOutcome::Completed(2));
        match &outcomes[1] {
            TaskOutcome::Failed(message) => assert!(message.contains("user 1 exploded")),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_zero_workers_still_progresses() {
        let pool = WorkerPool::new(0);
        assert_eq!(pool.max_workers(), 1);
        let outcomes = pool.run_all((0..3).map(|i| async move { i * 2 })).await;
        assert_eq!(outcomes.len(), 3);
    }
}
