//! Change orchestrator - drains pending changes through the runner
//!
//! A batch is a lazy iterator of [`BatchEvent`]s. Each entry produces two
//! events, `InProgress` and then its terminal status, and an entry's
//! commands only run when the iterator is advanced past its `InProgress`
//! event. Entries never overlap.

use crate::context::BatchObserver;
use crate::pending::{PendingChange, PendingChanges, Target, TargetKey};
use crate::runner::CommandRunner;
use crate::types::{BatchSummary, ChangeStatus};
use std::iter::FusedIterator;

/// A status transition of one batch entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchEvent {
    /// 1-based position in the batch
    pub step: usize,
    pub key: TargetKey,
    pub label: String,
    pub desired_state: bool,
    pub status: ChangeStatus,
}

/// Final state of a drained batch
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub entries: Vec<PendingChange>,
    pub summary: BatchSummary,
}

/// Runs batches of pending changes one entry at a time
pub struct Orchestrator<'r> {
    runner: &'r dyn CommandRunner,
}

impl<'r> Orchestrator<'r> {
    pub fn new(runner: &'r dyn CommandRunner) -> Self {
        Self { runner }
    }

    /// Start a batch over everything queued in `pending`.
    ///
    /// The queue is moved out immediately, so `pending` is empty whether
    /// or not the returned run is ever drained.
    pub fn run_batch(&self, pending: &mut PendingChanges) -> BatchRun<'r> {
        BatchRun::new(self.runner, pending.take())
    }

    /// Run a batch to completion, forwarding every event to `observer`
    pub fn run_batch_with<O: BatchObserver + ?Sized>(
        &self,
        pending: &mut PendingChanges,
        observer: &mut O,
    ) -> BatchReport {
        let mut run = self.run_batch(pending);
        observer.on_batch_start(run.len());

        for event in run.by_ref() {
            observer.on_event(&event);
        }

        let report = run.into_report();
        observer.on_batch_complete(&report.summary);
        report
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Start,
    Execute,
}

/// An in-flight batch. Finite and not restartable.
pub struct BatchRun<'r> {
    runner: &'r dyn CommandRunner,
    entries: Vec<PendingChange>,
    cursor: usize,
    phase: Phase,
    summary: BatchSummary,
}

impl<'r> BatchRun<'r> {
    fn new(runner: &'r dyn CommandRunner, entries: Vec<PendingChange>) -> Self {
        Self {
            runner,
            entries,
            cursor: 0,
            phase: Phase::Start,
            summary: BatchSummary::default(),
        }
    }

    /// Number of entries in the batch
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drain whatever is left and return the final entries
    pub fn into_report(mut self) -> BatchReport {
        for _ in self.by_ref() {}
        if !self.is_empty() {
            log::info!("Execution completed.");
        }
        BatchReport {
            entries: self.entries,
            summary: self.summary,
        }
    }

    fn transition(&mut self, status: ChangeStatus) -> BatchEvent {
        let step = self.cursor + 1;
        let entry = &mut self.entries[self.cursor];

        if let Err(e) = entry.advance(status) {
            log::error!("Step {} ({}): {}", step, entry.target.label(), e);
        }

        BatchEvent {
            step,
            key: entry.key(),
            label: entry.target.label(),
            desired_state: entry.desired_state,
            status: entry.status(),
        }
    }
}

impl Iterator for BatchRun<'_> {
    type Item = BatchEvent;

    fn next(&mut self) -> Option<BatchEvent> {
        if self.cursor >= self.entries.len() {
            return None;
        }

        match self.phase {
            Phase::Start => {
                self.phase = Phase::Execute;
                Some(self.transition(ChangeStatus::InProgress))
            }
            Phase::Execute => {
                let status = execute_entry(self.runner, &self.entries[self.cursor]);
                let event = self.transition(status);
                self.summary.add_status(event.status);
                self.cursor += 1;
                self.phase = Phase::Start;
                Some(event)
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining_entries = self.entries.len().saturating_sub(self.cursor);
        let mut remaining = remaining_entries * 2;
        if self.phase == Phase::Execute {
            remaining = remaining.saturating_sub(1);
        }
        (remaining, Some(remaining))
    }
}

impl FusedIterator for BatchRun<'_> {}

/// Run one entry's commands and pick its terminal status
fn execute_entry(runner: &dyn CommandRunner, change: &PendingChange) -> ChangeStatus {
    let success = if change.desired_state {
        ChangeStatus::Completed
    } else {
        ChangeStatus::Reverted
    };

    let tally = match (&change.target, change.desired_state) {
        (Target::Native(descriptor), true) => {
            log::info!("Applying plugin: {}", descriptor.id);
            let tally = run_commands(runner, &descriptor.id, &descriptor.apply_commands);
            log::info!("Activated plugin: {}", descriptor.id);
            tally
        }
        (Target::Native(descriptor), false) => {
            log::info!("Undoing plugin: {}", descriptor.id);
            let tally = run_commands(runner, &descriptor.id, &descriptor.undo_commands);
            log::info!("Deactivated plugin: {}", descriptor.id);
            tally
        }
        (Target::Script(script), true) => {
            log::info!("Executing PowerShell script: {}", script.file_name());
            let result = runner.run_script(&script.path);
            let mut tally = Tally::default();
            tally.record(result.is_clean());
            if result.is_clean() {
                log::info!("Executed PowerShell script: {}", script.file_name());
            } else {
                log::error!("PowerShell script failed: {}", script.path.display());
            }
            tally
        }
        (Target::Script(script), false) => {
            log::info!("PowerShell script cannot be undone: {}", script.file_name());
            Tally::default()
        }
    };

    if tally.all_failed() {
        ChangeStatus::Failed
    } else {
        success
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    attempted: usize,
    failed: usize,
}

impl Tally {
    fn record(&mut self, clean: bool) {
        self.attempted += 1;
        if !clean {
            self.failed += 1;
        }
    }

    /// An entry with nothing to run never fails
    fn all_failed(&self) -> bool {
        self.attempted > 0 && self.failed == self.attempted
    }
}

/// Run every command in order, continuing past failures
fn run_commands(runner: &dyn CommandRunner, plugin_id: &str, commands: &[String]) -> Tally {
    let mut tally = Tally::default();

    for command in commands {
        let result = runner.run_auto(command);
        let clean = result.is_clean();
        tally.record(clean);

        if !result.succeeded {
            log::error!("Error executing plugin '{}': {}", plugin_id, command);
        } else if !clean {
            log::error!(
                "Command for plugin '{}' exited with {}: {}",
                plugin_id,
                result
                    .exit_code
                    .map_or_else(|| "no exit code".to_string(), |c| format!("code {c}")),
                command
            );
        } else {
            log::debug!("Plugin '{}' executed command: {}", plugin_id, command);
        }
    }

    tally
}
