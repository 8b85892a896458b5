//! Review summary shown before a batch runs, and live progress while it runs

use colored::Colorize;
use indicatif::ProgressBar;
use plugkit::{BatchEvent, BatchObserver, BatchSummary, ChangeStatus, PendingChanges};

use crate::progress;
use crate::ui;

const SEPARATOR_WIDTH: usize = 35;

/// Message shown when nothing is queued
pub const NOTHING_SELECTED: &str =
    "No plugins selected. Please select plugins to apply or revert.";

/// Render the numbered step list for every pending change
pub fn render(pending: &PendingChanges) -> String {
    if pending.is_empty() {
        return format!("{}\n", NOTHING_SELECTED);
    }

    let mut out = String::new();
    for (index, change) in pending.iter().enumerate() {
        let intent = change.intent();
        let description = change.target.description();
        let mut description = description.lines();

        out.push_str(&format!("Step {}:\n", index + 1));
        out.push_str(&format!(
            "  - Plugin: {} ({})\n",
            change.target.label(),
            intent
        ));
        out.push_str(&format!(
            "    Description: {}\n",
            description.next().unwrap_or_default()
        ));
        for line in description {
            out.push_str(&format!("                 {}\n", line));
        }
        out.push_str(&format!("    Status: [{}...]\n", intent));
        out.push_str(&"-".repeat(SEPARATOR_WIDTH));
        out.push('\n');
    }
    out
}

/// Print the review summary
pub fn print(pending: &PendingChanges) {
    ui::header("Review");
    print!("{}", render(pending));
}

/// Shows each step as a spinner while it runs, then replaces it with the
/// step's final status line
#[derive(Default)]
pub struct TerminalObserver {
    total: usize,
    running: Option<ProgressBar>,
}

impl TerminalObserver {
    pub fn new() -> Self {
        Self::default()
    }

    fn settle(&mut self) {
        if let Some(pb) = self.running.take() {
            progress::finish_clear(&pb);
        }
    }
}

/// "label [Status]" with the status colored by outcome
pub fn status_line(event: &BatchEvent) -> String {
    let status = match event.status {
        ChangeStatus::InProgress => event.status.label().cyan(),
        ChangeStatus::Completed => event.status.label().green(),
        ChangeStatus::Reverted => event.status.label().blue(),
        ChangeStatus::Failed => event.status.label().red().bold(),
        ChangeStatus::Queued => event.status.label().dimmed(),
    };
    format!("{} [{}]", event.label, status)
}

impl BatchObserver for TerminalObserver {
    fn on_batch_start(&mut self, total: usize) {
        self.total = total;
        ui::header(&format!("Running {} step(s)", total));
    }

    fn on_event(&mut self, event: &BatchEvent) {
        self.settle();
        let line = status_line(event);

        if event.status.is_terminal() {
            ui::step(event.step, self.total, &line);
        } else {
            let prefix = format!("[{}/{}]", event.step, self.total);
            self.running = Some(progress::step_spinner(&prefix, &line));
        }
    }

    fn on_batch_complete(&mut self, summary: &BatchSummary) {
        self.settle();
        println!();
        if summary.is_success() {
            ui::success("Execution completed.");
        } else {
            ui::warn("Execution completed with errors.");
        }
        if summary.completed > 0 {
            println!("    • {} applied", summary.completed);
        }
        if summary.reverted > 0 {
            println!("    • {} reverted", summary.reverted);
        }
        if summary.failed > 0 {
            println!("    • {} {}", summary.failed, "failed".red());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plugkit::{PluginDescriptor, ScriptPlugin, Target};
    use std::sync::Arc;

    fn event(step: usize, status: ChangeStatus) -> BatchEvent {
        BatchEvent {
            step,
            key: plugkit::TargetKey::Native("tips".to_string()),
            label: "tips".to_string(),
            desired_state: true,
            status,
        }
    }

    #[test]
    fn test_status_line_names_label_and_status() {
        let running = status_line(&event(1, ChangeStatus::InProgress));
        assert!(running.starts_with("tips ["));
        assert!(running.contains("In Progress"));

        let failed = status_line(&event(1, ChangeStatus::Failed));
        assert!(failed.contains("Failed"));
    }

    #[test]
    fn test_observer_replaces_running_step_with_final_status() {
        let mut observer = TerminalObserver::new();
        observer.on_batch_start(2);

        observer.on_event(&event(1, ChangeStatus::InProgress));
        assert!(observer.running.is_some());

        observer.on_event(&event(1, ChangeStatus::Completed));
        assert!(observer.running.is_none());

        observer.on_event(&event(2, ChangeStatus::InProgress));
        observer.on_batch_complete(&BatchSummary::default());
        assert!(observer.running.is_none());
    }

    #[test]
    fn test_render_empty() {
        let pending = PendingChanges::new();
        assert_eq!(render(&pending), format!("{}\n", NOTHING_SELECTED));
    }

    #[test]
    fn test_render_steps() {
        let mut pending = PendingChanges::new();
        pending.toggle(
            Target::Native(Arc::new(
                PluginDescriptor::new("Disable tips").with_info("Hides tips"),
            )),
            true,
            false,
        );
        pending.toggle(
            Target::Script(ScriptPlugin::from_path("/scripts/clean.ps1")),
            false,
            true,
        );

        let text = render(&pending);
        let expected = "\
Step 1:
  - Plugin: Disable tips (To be Applied)
    Description: Native Plugin: Disable tips
                 Hides tips
    Status: [To be Applied...]
-----------------------------------
Step 2:
  - Plugin: clean.ps1 (To be Reverted)
    Description: PowerShell Script: clean.ps1
                 /scripts/clean.ps1
    Status: [To be Reverted...]
-----------------------------------
";
        assert_eq!(text, expected);
    }
}
