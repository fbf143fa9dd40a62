//! Drives a plan's discovery or execution phase to a terminal state.
//!
//! Each iteration performs exactly one status fetch. A transient status is
//! followed by one sleep of [`PollSettings::interval`]; anything else ends
//! the poll. Fetch failures are returned immediately and never retried.

use std::time::Duration;

use ato_types::TestPlan;
use futures_util::future::join_all;
use indexmap::{IndexMap, IndexSet};
use tracing::{debug, info, warn};

use crate::error::PollError;
use crate::policy::{Phase, PhaseClassification, classify};
use crate::source::{PlanStatusSource, Sleeper, TokioSleeper};

/// Interval used between discovery status checks unless overridden.
pub const DEFAULT_DISCOVERY_INTERVAL: Duration = Duration::from_secs(2);
/// Interval used between execution status checks unless overridden.
pub const DEFAULT_EXECUTION_INTERVAL: Duration = Duration::from_secs(3);

/// Tunables for one poll loop.
///
/// `max_attempts` is `None` by default: the loop waits as long as the server
/// keeps reporting a transient status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub max_attempts: Option<u32>,
}

impl PollSettings {
    pub fn discovery() -> Self {
        Self {
            interval: DEFAULT_DISCOVERY_INTERVAL,
            max_attempts: None,
        }
    }

    pub fn execution() -> Self {
        Self {
            interval: DEFAULT_EXECUTION_INTERVAL,
            max_attempts: None,
        }
    }

    /// Default settings for `phase`.
    pub fn for_phase(phase: Phase) -> Self {
        match phase {
            Phase::Discovery => Self::discovery(),
            Phase::Execution => Self::execution(),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Cap the number of status checks. Zero is treated as one.
    pub fn with_max_attempts(mut self, max_attempts: Option<u32>) -> Self {
        self.max_attempts = max_attempts.map(|attempts| attempts.max(1));
        self
    }
}

/// Reported to observers after every status check.
#[derive(Debug, Clone, Copy)]
pub struct PollProgress<'a> {
    pub phase: Phase,
    pub plan_id: &'a str,
    pub attempt: u32,
    pub status: &'a str,
    pub classification: PhaseClassification,
}

/// Polls plan status through a [`PlanStatusSource`].
#[derive(Debug, Clone)]
pub struct PlanPoller<S, Z = TokioSleeper> {
    source: S,
    sleeper: Z,
}

impl<S: PlanStatusSource> PlanPoller<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            sleeper: TokioSleeper,
        }
    }
}

impl<S: PlanStatusSource, Z: Sleeper> PlanPoller<S, Z> {
    pub fn with_sleeper(source: S, sleeper: Z) -> Self {
        Self { source, sleeper }
    }

    /// Poll until `plan_id` leaves its transient states for `phase`.
    pub async fn poll(&self, phase: Phase, plan_id: &str, settings: &PollSettings) -> Result<TestPlan, PollError> {
        self.poll_with_observer(phase, plan_id, settings, |_| {}).await
    }

    /// Like [`Self::poll`], notifying `observer` after every status check.
    pub async fn poll_with_observer<F>(&self, phase: Phase, plan_id: &str, settings: &PollSettings, mut observer: F) -> Result<TestPlan, PollError>
    where
        F: FnMut(&PollProgress<'_>),
    {
        info!(
            plan_id = %plan_id,
            phase = %phase,
            interval_ms = settings.interval.as_millis(),
            max_attempts = ?settings.max_attempts,
            "polling started"
        );

        let mut attempts = 0u32;
        loop {
            attempts += 1;
            let plan = self.source.fetch_plan(plan_id).await.inspect_err(|error| {
                warn!(plan_id = %plan_id, phase = %phase, attempt = attempts, error = %error, "status fetch failed; polling aborted");
            })?;

            let classification = classify(phase, &plan.status);
            observer(&PollProgress {
                phase,
                plan_id,
                attempt: attempts,
                status: &plan.status,
                classification,
            });

            match classification {
                PhaseClassification::Continue => {
                    if let Some(max_attempts) = settings.max_attempts
                        && attempts >= max_attempts
                    {
                        warn!(plan_id = %plan_id, phase = %phase, attempts, status = %plan.status, "poll attempts exhausted");
                        return Err(PollError::AttemptsExhausted {
                            phase,
                            attempts,
                            plan: Box::new(plan),
                        });
                    }
                    debug!(plan_id = %plan_id, phase = %phase, attempt = attempts, status = %plan.status, "plan still in progress");
                    self.sleeper.sleep(settings.interval).await;
                }
                PhaseClassification::Success => {
                    info!(plan_id = %plan_id, phase = %phase, attempts, status = %plan.status, "polling finished");
                    return Ok(plan);
                }
                PhaseClassification::Failure => {
                    warn!(
                        plan_id = %plan_id,
                        phase = %phase,
                        attempts,
                        reason = plan.failure_reason.as_deref().unwrap_or("<none>"),
                        "server reported phase failure"
                    );
                    return Err(PollError::OperationFailed {
                        phase,
                        reason: plan.failure_reason.clone(),
                        plan: Box::new(plan),
                    });
                }
                PhaseClassification::Unexpected => {
                    warn!(plan_id = %plan_id, phase = %phase, attempts, status = %plan.status, "unexpected plan status");
                    return Err(PollError::UnexpectedState {
                        phase,
                        tag: plan.status.clone(),
                        plan: Box::new(plan),
                    });
                }
            }
        }
    }

    /// Poll several plans concurrently. Each loop is independent; outcomes are
    /// keyed by plan id in first-seen order, duplicates polled once.
    pub async fn poll_many<I, P>(&self, phase: Phase, plan_ids: I, settings: &PollSettings) -> IndexMap<String, Result<TestPlan, PollError>>
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        let unique: IndexSet<String> = plan_ids.into_iter().map(Into::into).collect();
        let polls = unique.into_iter().map(|plan_id| async move {
            let outcome = self.poll(phase, &plan_id, settings).await;
            (plan_id, outcome)
        });
        join_all(polls).await.into_iter().collect()
    }
}
