//! Terminal outcomes of a poll other than success.

use ato_api::ClientError;
use ato_types::TestPlan;
use thiserror::Error;

use crate::policy::Phase;

/// Why waiting on a plan ended without reaching a success state.
///
/// Every variant except [`PollError::Client`] carries the last fetched plan so
/// callers can report what the server said.
#[derive(Debug, Error)]
pub enum PollError {
    /// Fetching the plan failed (network or API error). Never retried.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The server reported the phase as failed.
    #[error("test plan {phase} failed on the server{}", reason_suffix(.reason))]
    OperationFailed {
        phase: Phase,
        reason: Option<String>,
        plan: Box<TestPlan>,
    },

    /// The server reported a status the phase does not recognise.
    #[error("unexpected plan status '{tag}' during {phase}")]
    UnexpectedState { phase: Phase, tag: String, plan: Box<TestPlan> },

    /// The configured attempt budget ran out while the plan was still transient.
    #[error("test plan {phase} still '{}' after {attempts} status checks", .plan.status)]
    AttemptsExhausted { phase: Phase, attempts: u32, plan: Box<TestPlan> },
}

fn reason_suffix(reason: &Option<String>) -> String {
    reason.as_deref().map(|reason| format!(": {reason}")).unwrap_or_default()
}

impl PollError {
    /// The last plan snapshot fetched before the poll ended, if any.
    pub fn last_plan(&self) -> Option<&TestPlan> {
        match self {
            PollError::Client(_) => None,
            PollError::OperationFailed { plan, .. } | PollError::UnexpectedState { plan, .. } | PollError::AttemptsExhausted { plan, .. } => {
                Some(plan)
            }
        }
    }

    /// Server-supplied failure reason for [`PollError::OperationFailed`].
    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            PollError::OperationFailed { reason, .. } => reason.as_deref(),
            _ => None,
        }
    }
}
