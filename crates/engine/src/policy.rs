//! Phase policy: how a status tag is interpreted while waiting on a phase.

use std::fmt;

use ato_types::status;

/// Which long-running server-side operation is being waited on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Discovery,
    Execution,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Discovery => "discovery",
            Phase::Execution => "execution",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of interpreting one status tag under a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseClassification {
    /// Transient; poll again after the interval.
    Continue,
    /// Terminal success.
    Success,
    /// Terminal failure reported by the server.
    Failure,
    /// A tag outside the phase's known set.
    Unexpected,
}

impl PhaseClassification {
    pub fn is_terminal(self) -> bool {
        !matches!(self, PhaseClassification::Continue)
    }
}

/// Classify `tag` under `phase`. Total over all strings.
///
/// Discovery treats every tag other than `DISCOVERING` and `DISCOVERY_FAILED`
/// as success, while execution rejects anything outside its known set as
/// [`PhaseClassification::Unexpected`].
pub fn classify(phase: Phase, tag: &str) -> PhaseClassification {
    match phase {
        Phase::Discovery => match tag {
            status::DISCOVERING => PhaseClassification::Continue,
            status::DISCOVERY_FAILED => PhaseClassification::Failure,
            _ => PhaseClassification::Success,
        },
        Phase::Execution => match tag {
            status::EXECUTING | status::AWAITING_SELECTION => PhaseClassification::Continue,
            status::EXECUTION_FAILED => PhaseClassification::Failure,
            status::COMPLETED => PhaseClassification::Success,
            _ => PhaseClassification::Unexpected,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PhaseClassification::*;

    #[test]
    fn discovery_tags() {
        assert_eq!(classify(Phase::Discovery, "DISCOVERING"), Continue);
        assert_eq!(classify(Phase::Discovery, "DISCOVERY_FAILED"), Failure);
    }

    #[test]
    fn discovery_treats_every_other_tag_as_success() {
        for tag in ["AWAITING_SELECTION", "COMPLETED", "EXECUTING", "EXECUTION_FAILED", "PENDING", "", "discovering"] {
            assert_eq!(classify(Phase::Discovery, tag), Success, "tag {tag:?}");
        }
    }

    #[test]
    fn execution_tags() {
        assert_eq!(classify(Phase::Execution, "EXECUTING"), Continue);
        assert_eq!(classify(Phase::Execution, "AWAITING_SELECTION"), Continue);
        assert_eq!(classify(Phase::Execution, "EXECUTION_FAILED"), Failure);
        assert_eq!(classify(Phase::Execution, "COMPLETED"), Success);
    }

    #[test]
    fn execution_flags_unknown_tags_as_unexpected() {
        for tag in ["SOMETHING_ELSE", "DISCOVERING", "DISCOVERY_FAILED", "", "completed"] {
            assert_eq!(classify(Phase::Execution, tag), Unexpected, "tag {tag:?}");
        }
    }

    #[test]
    fn classification_is_repeatable() {
        for phase in [Phase::Discovery, Phase::Execution] {
            for tag in ["DISCOVERING", "EXECUTING", "COMPLETED", "???"] {
                assert_eq!(classify(phase, tag), classify(phase, tag));
            }
        }
    }

    #[test]
    fn only_continue_is_non_terminal() {
        assert!(!Continue.is_terminal());
        assert!(Success.is_terminal() && Failure.is_terminal() && Unexpected.is_terminal());
    }
}
