//! A bounded task executor with deterministic shutdown (§4.6): stop
//! accepting new tasks, wait for in-flight work up to a grace period,
//! then force-abort whatever is left.

pub mod error;

pub use error::ExecutorError;

use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{warn, Instrument};

type BoxedTask = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// A task that was still queued (never started) when the executor shut
/// down. Mirrors `ExecutorService.shutdownNow()` returning its pending
/// work back to the caller instead of silently dropping it.
pub struct PendingTask {
    id: u64,
    future: BoxedTask,
}

impl PendingTask {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn into_future(self) -> BoxedTask {
        self.future
    }
}

struct Inner {
    shutting_down: bool,
    queued: VecDeque<(u64, BoxedTask)>,
    running_count: usize,
    handles: HashMap<u64, JoinHandle<()>>,
    next_id: u64,
}

/// Thread (task) names are prefixed with `name_prefix` via a tracing
/// span rather than OS thread renaming, since tasks here are tokio
/// tasks, not dedicated OS threads; the span still shows up in any
/// `tracing` subscriber the same way a named thread would in a log line.
pub struct GracefulExecutor {
    name_prefix: String,
    termination_timeout: Duration,
    max_concurrency: usize,
    inner: Arc<Mutex<Inner>>,
}

impl GracefulExecutor {
    pub fn new(name_prefix: impl Into<String>, max_concurrency: usize, termination_timeout: Duration) -> Self {
        Self {
            name_prefix: name_prefix.into(),
            termination_timeout,
            max_concurrency: max_concurrency.max(1),
            inner: Arc::new(Mutex::new(Inner {
                shutting_down: false,
                queued: VecDeque::new(),
                running_count: 0,
                handles: HashMap::new(),
                next_id: 0,
            })),
        }
    }

    pub fn is_shutting_down(&self) -> bool {
        self.inner.lock().shutting_down
    }

    pub fn queued_count(&self) -> usize {
        self.inner.lock().queued.len()
    }

    pub fn running_count(&self) -> usize {
        self.inner.lock().running_count
    }

    /// Enqueues `fut`. Runs immediately if a concurrency slot is free,
    /// otherwise waits behind whatever is already queued.
    pub fn spawn<F>(&self, fut: F) -> Result<(), ExecutorError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let id = {
            let mut guard = self.inner.lock();
            if guard.shutting_down {
                return Err(ExecutorError::ShuttingDown);
            }
            let id = guard.next_id;
            guard.next_id += 1;
            guard.queued.push_back((id, Box::pin(fut)));
            id
        };
        let _ = id;
        drain_ready(self.inner.clone(), self.max_concurrency, self.name_prefix.clone());
        Ok(())
    }

    /// Stops accepting new tasks, waits up to `terminationTimeoutSeconds`
    /// for in-flight tasks, then force-aborts and discards whatever
    /// remains. Safe to call repeatedly; only the first call does work.
    pub async fn shutdown(&self) {
        {
            let mut guard = self.inner.lock();
            if guard.shutting_down {
                return;
            }
            guard.shutting_down = true;
        }

        let deadline = Instant::now() + self.termination_timeout;
        loop {
            let done = {
                let guard = self.inner.lock();
                guard.running_count == 0 && guard.handles.is_empty()
            };
            if done {
                return;
            }
            if Instant::now() >= deadline {
                warn!(
                    prefix = %self.name_prefix,
                    "graceful executor termination timeout elapsed, force-aborting in-flight tasks"
                );
                let mut guard = self.inner.lock();
                for (_, handle) in guard.handles.drain() {
                    handle.abort();
                }
                guard.running_count = 0;
                guard.queued.clear();
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    /// Immediately stops accepting new tasks, aborts in-flight tasks,
    /// and returns whatever was still queued so the caller can decide
    /// what to do with it.
    pub fn shutdown_now(&self) -> Vec<PendingTask> {
        let mut guard = self.inner.lock();
        guard.shutting_down = true;
        let queued = guard
            .queued
            .drain(..)
            .map(|(id, future)| PendingTask { id, future })
            .collect();
        for (_, handle) in guard.handles.drain() {
            handle.abort();
        }
        guard.running_count = 0;
        queued
    }
}

fn drain_ready(inner: Arc<Mutex<Inner>>, max_concurrency: usize, name_prefix: String) {
    loop {
        let next = {
            let mut guard = inner.lock();
            if guard.shutting_down || guard.running_count >= max_concurrency {
                None
            } else {
                guard.queued.pop_front()
            }
        };
        let Some((id, task)) = next else {
            break;
        };
        {
            let mut guard = inner.lock();
            guard.running_count += 1;
        }

        let inner_for_task = inner.clone();
        let max_for_task = max_concurrency;
        let prefix_for_task = name_prefix.clone();
        let span = tracing::info_span!("curve_executor_task", task_name = %format!("{name_prefix}-{id}"));

        let handle = tokio::spawn(
            async move {
                task.await;
                {
                    let mut guard = inner_for_task.lock();
                    guard.running_count -= 1;
                    guard.handles.remove(&id);
                }
                drain_ready(inner_for_task, max_for_task, prefix_for_task);
            }
            .instrument(span),
        );
        inner.lock().handles.insert(id, handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn runs_spawned_tasks_within_concurrency_limit() {
        let executor = GracefulExecutor::new("test", 2, Duration::from_secs(5));
        let completed = Arc::new(AtomicUsize::new(0));
        for _ in 0..5 {
            let completed = completed.clone();
            executor
                .spawn(async move {
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    completed.fetch_add(1, Ordering::SeqCst);
                })
                .unwrap();
        }
        executor.shutdown().await;
        assert_eq!(completed.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn rejects_new_tasks_after_shutdown() {
        let executor = GracefulExecutor::new("test", 2, Duration::from_secs(5));
        executor.shutdown().await;
        let result = executor.spawn(async {});
        assert_eq!(result, Err(ExecutorError::ShuttingDown));
    }

    #[tokio::test]
    async fn shutdown_is_idempotent() {
        let executor = GracefulExecutor::new("test", 2, Duration::from_secs(5));
        executor.shutdown().await;
        executor.shutdown().await;
    }

    #[tokio::test]
    async fn shutdown_now_returns_never_started_tasks() {
        let executor = GracefulExecutor::new("test", 1, Duration::from_secs(5));
        let started = Arc::new(AtomicUsize::new(0));
        for _ in 0..3 {
            let started = started.clone();
            executor
                .spawn(async move {
                    started.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_secs(60)).await;
                })
                .unwrap();
        }
        // first task grabs the only concurrency slot immediately
        tokio::task::yield_now().await;
        let pending = executor.shutdown_now();
        assert!(!pending.is_empty());
        assert!(started.load(Ordering::SeqCst) <= 1);
    }

    #[tokio::test]
    async fn force_aborts_when_grace_period_elapses() {
        let executor = GracefulExecutor::new("test", 2, Duration::from_millis(20));
        executor
            .spawn(async {
                tokio::time::sleep(Duration::from_secs(60)).await;
            })
            .unwrap();
        tokio::task::yield_now().await;
        executor.shutdown().await;
        assert_eq!(executor.running_count(), 0);
    }
}
