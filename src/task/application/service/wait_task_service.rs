use crate::{
    ProxmoxError, ProxmoxResult,
    core::domain::{
        error::require_path_segment,
        model::{
            api_envelope::ApiEnvelope, client_config::DEFAULT_POLL_INTERVAL, task::TaskStatus,
        },
    },
    core::infrastructure::api_client::ApiClient,
};
use async_trait::async_trait;
use std::future;
use std::time::Duration;
use tokio::time::{Instant, sleep, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// How long [`WaitTaskService`] waits when the caller has no better estimate.
pub const DEFAULT_TASK_TIMEOUT: Duration = Duration::from_secs(60 * 60);

/// Something that can report the current state of a task.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskStatusSource: Send + Sync {
    /// Fetches one status snapshot of `upid` on `node`.
    async fn task_status(
        &self,
        node: &str,
        upid: &str,
        cancel: &CancellationToken,
    ) -> ProxmoxResult<TaskStatus>;
}

#[async_trait]
impl TaskStatusSource for ApiClient {
    async fn task_status(
        &self,
        node: &str,
        upid: &str,
        cancel: &CancellationToken,
    ) -> ProxmoxResult<TaskStatus> {
        require_path_segment("node", node)?;
        require_path_segment("upid", upid)?;
        let path = format!("nodes/{}/tasks/{}/status", node, upid);
        let envelope: ApiEnvelope<TaskStatus> = self.get(&path, None, cancel).await?;
        envelope.into_data()
    }
}

/// Waits for a server-side task to leave the `running` state.
///
/// Polls at a fixed interval, with no backoff: tasks run on a human timescale
/// (seconds to hours). A failed status check ends the wait with that error.
#[derive(Debug, Clone)]
pub struct WaitTaskService {
    poll_interval: Duration,
}

impl WaitTaskService {
    pub fn new(poll_interval: Duration) -> Self {
        Self { poll_interval }
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Polls `source` until the task stops, `timeout` elapses, or `cancel` fires.
    ///
    /// The first check happens immediately. Cancellation and the deadline are
    /// observed both while a check is in flight and while sleeping between checks.
    /// A `timeout` beyond what the clock can represent (such as `Duration::MAX`)
    /// waits without a deadline.
    ///
    /// # Errors
    /// * `ProxmoxError::Validation` for a blank node or task id (no request is made)
    /// * `ProxmoxError::Timeout` once `timeout` has elapsed
    /// * `ProxmoxError::Cancelled` when `cancel` fires
    /// * any error returned by the status check, unchanged
    pub async fn execute<S>(
        &self,
        source: &S,
        node: &str,
        upid: &str,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> ProxmoxResult<TaskStatus>
    where
        S: TaskStatusSource + ?Sized,
    {
        require_path_segment("node", node)?;
        require_path_segment("upid", upid)?;

        let started = Instant::now();
        // A timeout too large to represent means no deadline at all.
        let deadline = started.checked_add(timeout);
        let timed_out = || ProxmoxError::Timeout {
            upid: upid.to_string(),
            elapsed: started.elapsed(),
        };

        let mut polls: u32 = 0;
        loop {
            let status = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ProxmoxError::Cancelled),
                _ = expire(deadline) => return Err(timed_out()),
                result = source.task_status(node, upid, cancel) => result?,
            };
            polls += 1;

            if !status.is_running() {
                info!(
                    upid = %upid,
                    polls,
                    exit_status = status.exit_status.as_deref().unwrap_or(""),
                    "task finished"
                );
                return Ok(status);
            }
            debug!(upid = %upid, polls, "task still running");

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ProxmoxError::Cancelled),
                _ = expire(deadline) => return Err(timed_out()),
                _ = sleep(self.poll_interval) => {}
            }
        }
    }
}

/// Completes at `deadline`, or never when there is none.
async fn expire(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => future::pending().await,
    }
}

impl Default for WaitTaskService {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}
