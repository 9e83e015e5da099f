//! Per-task health polling loops.
//!
//! Each started watch owns one spawned loop. A loop runs a tick, sleeps for the
//! interval and repeats until its cancellation token fires. A tick in flight
//! always completes; cancellation is seen before the next tick or during the
//! sleep. Tick failures are logged and never end the loop.
mod ticker;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use canary_core::{AlertSink, Gateway, MetricsHandle, TickOutcome, noop_metrics};
use canary_model::{ServiceRef, TaskId, WatchTask};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::error::{WatchError, WatchResult};
use crate::scheduler::ticker::Ticker;

/// Polling interval of a per-task loop.
pub const PER_TASK_INTERVAL: Duration = Duration::from_secs(5);
/// Polling interval of the batch sweep.
pub const BATCH_INTERVAL: Duration = Duration::from_secs(120);

struct RunningTask {
    token: CancellationToken,
    join: JoinHandle<()>,
}

/// Counts of one [`HealthScheduler::sweep`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub healthy: usize,
    pub unhealthy: usize,
    pub failed: usize,
}

/// Owns the live loops, keyed by task id.
pub struct HealthScheduler {
    ticker: Ticker,
    interval: Duration,
    running: Mutex<HashMap<TaskId, RunningTask>>,
    root: CancellationToken,
}

impl HealthScheduler {
    pub fn new(gateway: Arc<dyn Gateway>, sink: Arc<dyn AlertSink>) -> Self {
        Self {
            ticker: Ticker::new(gateway, sink, noop_metrics()),
            interval: PER_TASK_INTERVAL,
            running: Mutex::new(HashMap::new()),
            root: CancellationToken::new(),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_metrics(mut self, metrics: MetricsHandle) -> Self {
        self.ticker.set_metrics(metrics);
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    fn running(&self) -> MutexGuard<'_, HashMap<TaskId, RunningTask>> {
        self.running.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Spawn the polling loop of `task`.
    ///
    /// Fails with [`WatchError::AlreadyRunning`] when a loop for the same id is live.
    #[instrument(level = "debug", skip(self, task), fields(task = %task.id, service = %task.spec.service))]
    pub fn start(&self, task: WatchTask) -> WatchResult<()> {
        if self.root.is_cancelled() {
            return Err(WatchError::ShutDown);
        }
        let target = task.spec.service_ref()?;
        let mut running = self.running();
        if running.contains_key(&task.id) {
            return Err(WatchError::AlreadyRunning(task.id));
        }

        let id = task.id;
        let token = self.root.child_token();
        let join = tokio::spawn(run_loop(
            self.ticker.clone(),
            task,
            target,
            token.clone(),
            self.interval,
        ));
        running.insert(id, RunningTask { token, join });
        info!(task = %id, interval_ms = self.interval.as_millis() as u64, "watch started");
        Ok(())
    }

    /// Request cancellation of a loop.
    ///
    /// Returns `false` when no loop was live for `id`; a second stop is a no-op.
    /// A tick already in flight finishes, alert included; no tick starts afterwards.
    pub fn stop(&self, id: TaskId) -> bool {
        let Some(task) = self.running().remove(&id) else {
            debug!(task = %id, "stop requested for idle watch");
            return false;
        };
        task.token.cancel();
        info!(task = %id, "watch stopped");
        true
    }

    pub fn is_running(&self, id: TaskId) -> bool {
        self.running().contains_key(&id)
    }

    /// Ids of live loops, ascending.
    pub fn running_ids(&self) -> Vec<TaskId> {
        let mut ids: Vec<TaskId> = self.running().keys().copied().collect();
        ids.sort();
        ids
    }

    /// Run one tick for `task` without starting a loop.
    pub async fn check(&self, task: &WatchTask) -> WatchResult<TickOutcome> {
        let target = task.spec.service_ref()?;
        Ok(self.ticker.tick(task, &target).await)
    }

    /// One tick for each descriptor, sequentially.
    ///
    /// Descriptors whose service reference does not parse count as failed.
    #[instrument(level = "debug", skip_all, fields(tasks = tasks.len()))]
    pub async fn sweep(&self, tasks: &[WatchTask]) -> SweepReport {
        let mut report = SweepReport::default();
        for task in tasks {
            if self.root.is_cancelled() {
                break;
            }
            match self.check(task).await {
                Ok(TickOutcome::Healthy) => report.healthy += 1,
                Ok(TickOutcome::Unhealthy) => report.unhealthy += 1,
                Ok(TickOutcome::Failed) | Err(_) => report.failed += 1,
            }
        }
        report
    }

    /// Cancel every loop and wait for them to exit.
    ///
    /// Later [`HealthScheduler::start`] calls fail with [`WatchError::ShutDown`].
    pub async fn shutdown(&self) {
        self.root.cancel();
        let drained: Vec<(TaskId, RunningTask)> = self.running().drain().collect();
        let count = drained.len();
        for (id, task) in drained {
            task.token.cancel();
            if let Err(e) = task.join.await {
                debug!(task = %id, error = %e, "watch loop ended abnormally");
            }
        }
        info!(stopped = count, "health scheduler shut down");
    }
}

impl Drop for HealthScheduler {
    fn drop(&mut self) {
        self.root.cancel();
    }
}

async fn run_loop(ticker: Ticker, task: WatchTask, target: ServiceRef, token: CancellationToken, interval: Duration) {
    debug!(task = %task.id, service = %target, "watch loop entered");
    loop {
        if token.is_cancelled() {
            break;
        }
        ticker.tick(&task, &target).await;
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }
    debug!(task = %task.id, "watch loop exited");
}

#[cfg(test)]
mod tests;
