//! Waiting for a Supervisor Namespace to settle
//!
//! After create or delete is submitted, the backend moves the object through
//! its phases on its own. The functions here poll [`api::read`] on a fixed
//! cadence until a terminal phase shows up, the timeout elapses, or the
//! cancellation token fires.
//!
//! Phases are compared upper-cased. `ERROR` always aborts the wait. Any phase
//! other than the target and `ERROR` counts as pending. A transport failure
//! aborts the wait too, except "not found" while waiting for deletion, which
//! means the object is gone.
//!
//! Time is read through an injected [`Clock`] so tests can run the loop on
//! virtual time.

use super::api;
use super::model::SupervisorNamespace;
use crate::error::{Error, Result, LABEL};
use crate::vcfa::client::VcfaClient;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

pub const PHASE_CREATED: &str = "CREATED";
pub const PHASE_DELETED: &str = "DELETED";
pub const PHASE_ERROR: &str = "ERROR";

/// Delay before the first poll and between polls
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Default bound on a single wait
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20 * 60);

/// Source of time for the polling loop
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;

    async fn sleep(&self, duration: Duration);
}

/// Wall clock backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Virtual clock: sleeping advances time instantly
#[derive(Debug)]
pub struct ManualClock {
    start: Instant,
    elapsed: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            elapsed: Mutex::new(Duration::ZERO),
        }
    }

    /// Virtual time passed since creation
    pub fn elapsed(&self) -> Duration {
        *self.elapsed.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn advance(&self, duration: Duration) {
        *self.elapsed.lock().unwrap_or_else(|e| e.into_inner()) += duration;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.start + self.elapsed()
    }

    async fn sleep(&self, duration: Duration) {
        self.advance(duration);
        tokio::task::yield_now().await;
    }
}

/// Timing of a wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    /// Pause before the first poll
    pub delay: Duration,
    /// Minimum spacing between polls
    pub poll_interval: Duration,
    /// Overall bound
    pub timeout: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            delay: POLL_INTERVAL,
            poll_interval: POLL_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl WaitPolicy {
    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }

    /// Instant at which a wait started at `now` gives up.
    ///
    /// Rejects a zero poll interval and timeouts past the clock's range.
    pub fn deadline(&self, now: Instant) -> Result<Instant> {
        if self.poll_interval.is_zero() {
            return Err(Error::validation("poll_interval", "must be greater than zero"));
        }
        now.checked_add(self.timeout).ok_or_else(|| {
            Error::validation("timeout", format!("{:?} is out of range", self.timeout))
        })
    }
}

/// Where a phase sits relative to the awaited target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseClass {
    Pending,
    Succeeded,
    Failed,
}

/// Classify `phase` against `target` (both compared upper-cased)
pub fn classify(phase: &str, target: &str) -> PhaseClass {
    let phase = phase.to_ascii_uppercase();
    if phase == PHASE_ERROR {
        PhaseClass::Failed
    } else if phase == target.to_ascii_uppercase() {
        PhaseClass::Succeeded
    } else {
        PhaseClass::Pending
    }
}

/// Result of one poll
#[derive(Debug)]
pub enum PollOutcome<T> {
    /// Not settled yet, poll again
    Pending(T),
    /// Reached the target
    Done(T),
    /// Stop waiting with this error
    Failed(Error),
}

/// What is being waited on, for error reporting
#[derive(Debug, Clone, Copy)]
pub struct WaitSubject<'a> {
    pub project: &'a str,
    pub name: &'a str,
    /// Target description, e.g. "created"
    pub target: &'static str,
}

impl WaitSubject<'_> {
    fn timeout(&self, timeout: Duration, polls: u32) -> Error {
        Error::WaitTimeout {
            project: self.project.to_string(),
            name: self.name.to_string(),
            target: self.target,
            timeout,
            polls,
        }
    }

    fn cancelled(&self) -> Error {
        Error::Cancelled {
            project: self.project.to_string(),
            name: self.name.to_string(),
            target: self.target,
        }
    }
}

/// Sleep up to `duration` but never past `deadline`; cancellation wins
async fn pause(
    clock: &dyn Clock,
    cancel: &CancellationToken,
    subject: &WaitSubject<'_>,
    duration: Duration,
    deadline: Instant,
) -> Result<()> {
    let duration = duration.min(deadline.saturating_duration_since(clock.now()));
    if duration.is_zero() {
        return Ok(());
    }
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(subject.cancelled()),
        _ = clock.sleep(duration) => Ok(()),
    }
}

/// Poll until `poll` reports done or failed, the timeout elapses, or `cancel` fires.
pub async fn wait_until<T, F, Fut>(
    clock: &dyn Clock,
    policy: &WaitPolicy,
    cancel: &CancellationToken,
    subject: WaitSubject<'_>,
    mut poll: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = PollOutcome<T>>,
{
    let deadline = policy.deadline(clock.now())?;
    let mut polls: u32 = 0;

    pause(clock, cancel, &subject, policy.delay, deadline).await?;

    loop {
        if cancel.is_cancelled() {
            return Err(subject.cancelled());
        }
        if clock.now() >= deadline {
            tracing::warn!(
                "{} {} in Project {} not {} after {:?}",
                LABEL,
                subject.name,
                subject.project,
                subject.target,
                policy.timeout
            );
            return Err(subject.timeout(policy.timeout, polls));
        }

        polls += 1;
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(subject.cancelled()),
            outcome = poll() => outcome,
        };

        match outcome {
            PollOutcome::Done(value) => return Ok(value),
            PollOutcome::Failed(err) => return Err(err),
            PollOutcome::Pending(_) => {}
        }

        pause(clock, cancel, &subject, policy.poll_interval, deadline).await?;
    }
}

fn backend_error(project: &str, name: &str) -> Error {
    tracing::warn!("{} {} in Project {} is in an ERROR state", LABEL, name, project);
    Error::BackendErrorState {
        project: project.to_string(),
        name: name.to_string(),
    }
}

/// Wait until the object reaches `CREATED`
pub async fn wait_for_create(
    client: &VcfaClient,
    clock: &dyn Clock,
    policy: &WaitPolicy,
    cancel: &CancellationToken,
    project: &str,
    name: &str,
) -> Result<SupervisorNamespace> {
    let subject = WaitSubject {
        project,
        name,
        target: "created",
    };

    wait_until(clock, policy, cancel, subject, || async move {
        let object = match api::read(client, project, name).await {
            Ok(object) => object,
            Err(err) => return PollOutcome::Failed(err),
        };
        tracing::debug!("{} {} current phase is {}", LABEL, name, object.phase());

        match classify(object.phase(), PHASE_CREATED) {
            PhaseClass::Succeeded => PollOutcome::Done(object),
            PhaseClass::Pending => PollOutcome::Pending(object),
            PhaseClass::Failed => PollOutcome::Failed(backend_error(project, name)),
        }
    })
    .await
}

/// Wait until the object is gone. "Not found" on read counts as `DELETED`.
pub async fn wait_for_delete(
    client: &VcfaClient,
    clock: &dyn Clock,
    policy: &WaitPolicy,
    cancel: &CancellationToken,
    project: &str,
    name: &str,
) -> Result<()> {
    let subject = WaitSubject {
        project,
        name,
        target: "deleted",
    };

    wait_until(clock, policy, cancel, subject, || async move {
        let object = match api::read(client, project, name).await {
            Ok(object) => object,
            Err(err) if err.is_not_found() => {
                tracing::debug!("{} {} current phase is {}", LABEL, name, PHASE_DELETED);
                return PollOutcome::Done(());
            }
            Err(err) => return PollOutcome::Failed(err),
        };
        tracing::debug!("{} {} current phase is {}", LABEL, name, object.phase());

        match classify(object.phase(), PHASE_DELETED) {
            PhaseClass::Succeeded => PollOutcome::Done(()),
            PhaseClass::Pending => PollOutcome::Pending(()),
            PhaseClass::Failed => PollOutcome::Failed(backend_error(project, name)),
        }
    })
    .await
}
