//! Schedule entry lifecycle.
//!
//! ```text
//! scheduled ──► in-progress ──► completed
//!     │              │
//!     └──────────────┴────────► cancelled
//! ```
//!
//! `completed` and `cancelled` are terminal.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl EntryStatus {
    pub const ALL: [EntryStatus; 4] = [
        EntryStatus::Scheduled,
        EntryStatus::InProgress,
        EntryStatus::Completed,
        EntryStatus::Cancelled,
    ];

    pub fn is_terminal(self) -> bool {
        matches!(self, EntryStatus::Completed | EntryStatus::Cancelled)
    }

    /// Whether `self -> next` is an edge of the lifecycle graph.
    pub fn can_transition_to(self, next: EntryStatus) -> bool {
        use EntryStatus::*;
        matches!(
            (self, next),
            (Scheduled, InProgress) | (InProgress, Completed) | (Scheduled, Cancelled) | (InProgress, Cancelled)
        )
    }

    /// Validate `self -> next` and return the new status.
    ///
    /// Transitions out of a terminal state and self-transitions are errors,
    /// never silent no-ops.
    pub fn transition(self, next: EntryStatus) -> Result<EntryStatus> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(CoreError::IllegalTransition { from: self, to: next })
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EntryStatus::Scheduled => "scheduled",
            EntryStatus::InProgress => "in-progress",
            EntryStatus::Completed => "completed",
            EntryStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EntryStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        EntryStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::InvalidEntry(format!("unknown status '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::EntryStatus::*;
    use super::*;

    #[test]
    fn forward_path_is_allowed() {
        assert_eq!(Scheduled.transition(InProgress), Ok(InProgress));
        assert_eq!(InProgress.transition(Completed), Ok(Completed));
    }

    #[test]
    fn cancel_from_open_states() {
        assert_eq!(Scheduled.transition(Cancelled), Ok(Cancelled));
        assert_eq!(InProgress.transition(Cancelled), Ok(Cancelled));
    }

    #[test]
    fn completed_cannot_reopen() {
        let err = Completed.transition(InProgress).unwrap_err();
        assert_eq!(
            err,
            CoreError::IllegalTransition {
                from: Completed,
                to: InProgress
            }
        );
    }

    #[test]
    fn terminal_states_reject_everything() {
        for from in [Completed, Cancelled] {
            assert!(from.is_terminal());
            for to in EntryStatus::ALL {
                assert!(from.transition(to).is_err(), "{from} -> {to} should fail");
            }
        }
    }

    #[test]
    fn skipping_and_self_transitions_are_illegal() {
        assert!(Scheduled.transition(Completed).is_err());
        assert!(Scheduled.transition(Scheduled).is_err());
        assert!(InProgress.transition(Scheduled).is_err());
    }

    #[test]
    fn serde_uses_kebab_case() {
        assert_eq!(serde_json::to_string(&InProgress).unwrap(), "\"in-progress\"");
        let parsed: EntryStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(parsed, Cancelled);
    }

    #[test]
    fn from_str_is_case_insensitive() {
        assert_eq!("In-Progress".parse::<EntryStatus>().unwrap(), InProgress);
        assert!("done".parse::<EntryStatus>().is_err());
    }
}
