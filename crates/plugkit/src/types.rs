//! Core types shared by the runner, prober and orchestrator

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of a single external command invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Whether the process exit was observed
    pub exit_observed: bool,
    /// Exit code, when the platform reported one
    pub exit_code: Option<i32>,
    /// Stdout lines only, newline separated
    pub stdout: String,
    /// Stdout and stderr lines in arrival order, newline separated
    pub combined_output: String,
    /// False only for transport-level faults (spawn failure, lost pipes)
    pub succeeded: bool,
}

impl ExecutionResult {
    /// Result for a process that could not be started or waited on
    pub fn transport_failure() -> Self {
        Self {
            exit_observed: false,
            exit_code: None,
            stdout: String::new(),
            combined_output: String::new(),
            succeeded: false,
        }
    }

    /// Result for a process that ran, wrote `stdout` and nothing to
    /// stderr, and exited with `code`
    pub fn exited(code: Option<i32>, stdout: impl Into<String>) -> Self {
        let stdout = stdout.into();
        Self {
            exit_observed: true,
            exit_code: code,
            combined_output: stdout.clone(),
            stdout,
            succeeded: true,
        }
    }

    /// Replace the combined stream, keeping stdout as is
    pub fn with_combined_output(mut self, combined_output: impl Into<String>) -> Self {
        self.combined_output = combined_output.into();
        self
    }

    /// Spawned, exited, and reported status zero
    pub fn is_clean(&self) -> bool {
        self.succeeded && self.exit_observed && self.exit_code == Some(0)
    }
}

/// Status of a pending change as it moves through a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeStatus {
    /// Waiting for its turn
    Queued,
    /// Commands are running
    InProgress,
    /// Apply finished
    Completed,
    /// Revert finished
    Reverted,
    /// Every command of the entry failed
    Failed,
}

impl ChangeStatus {
    /// Terminal states are absorbing
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Reverted | Self::Failed)
    }

    /// Whether `next` is a legal successor of this status
    pub fn can_advance_to(&self, next: ChangeStatus) -> bool {
        match self {
            Self::Queued => next == Self::InProgress,
            Self::InProgress => next.is_terminal(),
            Self::Completed | Self::Reverted | Self::Failed => false,
        }
    }

    /// Label used in progress displays
    pub fn label(&self) -> &'static str {
        match self {
            Self::Queued => "Queued",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Reverted => "Reverted",
            Self::Failed => "Failed",
        }
    }
}

impl fmt::Display for ChangeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Counts of terminal statuses reached in a batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub completed: usize,
    pub reverted: usize,
    pub failed: usize,
}

impl BatchSummary {
    /// Total number of entries that reached a terminal state
    pub fn total(&self) -> usize {
        self.completed + self.reverted + self.failed
    }

    /// Check if the batch ran without any failed entry
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Count a terminal status; non-terminal statuses are ignored
    pub fn add_status(&mut self, status: ChangeStatus) {
        match status {
            ChangeStatus::Completed => self.completed += 1,
            ChangeStatus::Reverted => self.reverted += 1,
            ChangeStatus::Failed => self.failed += 1,
            ChangeStatus::Queued | ChangeStatus::InProgress => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions_follow_state_machine() {
        assert!(ChangeStatus::Queued.can_advance_to(ChangeStatus::InProgress));
        assert!(!ChangeStatus::Queued.can_advance_to(ChangeStatus::Completed));
        assert!(ChangeStatus::InProgress.can_advance_to(ChangeStatus::Completed));
        assert!(ChangeStatus::InProgress.can_advance_to(ChangeStatus::Reverted));
        assert!(ChangeStatus::InProgress.can_advance_to(ChangeStatus::Failed));
        assert!(!ChangeStatus::InProgress.can_advance_to(ChangeStatus::Queued));
    }

    #[test]
    fn test_terminal_states_are_absorbing() {
        for terminal in [
            ChangeStatus::Completed,
            ChangeStatus::Reverted,
            ChangeStatus::Failed,
        ] {
            assert!(terminal.is_terminal());
            for next in [
                ChangeStatus::Queued,
                ChangeStatus::InProgress,
                ChangeStatus::Completed,
                ChangeStatus::Reverted,
                ChangeStatus::Failed,
            ] {
                assert!(!terminal.can_advance_to(next));
            }
        }
    }

    #[test]
    fn test_is_clean_requires_zero_exit() {
        assert!(ExecutionResult::exited(Some(0), "ok").is_clean());
        assert!(!ExecutionResult::exited(Some(2), "boom").is_clean());
        assert!(!ExecutionResult::exited(None, "signal").is_clean());
        assert!(!ExecutionResult::transport_failure().is_clean());
    }

    #[test]
    fn test_summary_counts_terminal_only() {
        let mut summary = BatchSummary::default();
        summary.add_status(ChangeStatus::InProgress);
        summary.add_status(ChangeStatus::Completed);
        summary.add_status(ChangeStatus::Reverted);
        summary.add_status(ChangeStatus::Failed);

        assert_eq!(summary.total(), 3);
        assert!(!summary.is_success());
    }
}
