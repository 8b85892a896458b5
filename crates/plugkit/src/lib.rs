//! # plugkit
//!
//! An engine for declarative system-tweak plugins.
//!
//! A plugin is a manifest with three command lists: `check` probes whether
//! the tweak is active, `do` applies it and `undo` reverts it. This crate
//! discovers manifests, probes their current state, and runs batches of
//! apply/revert decisions one entry at a time.
//!
//! ## Core Concepts
//!
//! - **CommandRunner**: Spawns one external command and captures its output
//! - **PluginDescriptor**: Immutable check/do/undo contract from a manifest
//! - **probe**: Reduces probe outputs to an active/inactive verdict
//! - **Catalog**: Discovered, probed plugins grouped by category
//! - **PendingChanges**: Ordered apply/revert decisions, one per plugin
//! - **Orchestrator**: Drains pending changes, yielding status events
//!
//! ## Example
//!
//! ```no_run
//! use plugkit::{Catalog, Orchestrator, PendingChanges, ShellRunner};
//! use std::path::Path;
//!
//! let runner = ShellRunner::new();
//! let catalog = Catalog::discover(Path::new("plugins"), &runner);
//!
//! let mut pending = PendingChanges::new();
//! if let Some(item) = catalog.find("Disable telemetry") {
//!     pending.toggle_item(item, !item.activation_state);
//! }
//!
//! for event in Orchestrator::new(&runner).run_batch(&mut pending) {
//!     println!("Step {}: {} [{}]", event.step, event.label, event.status);
//! }
//! ```
//!
//! ## Failure Model
//!
//! Nothing in a discovery pass or a batch aborts the caller. Unreadable
//! manifests are skipped, failed probes read as inactive, and failed
//! commands are logged while the batch moves on. Every entry still reaches
//! a terminal [`ChangeStatus`].

pub mod catalog;
pub mod context;
pub mod descriptor;
pub mod error;
pub mod orchestrator;
pub mod pending;
pub mod probe;
pub mod runner;
pub mod types;

#[cfg(test)]
mod testing;

// Re-export main types at crate root
pub use catalog::{Catalog, CatalogItem, Category, SkippedManifest};
pub use context::{BatchObserver, NoObserver};
pub use descriptor::{DEFAULT_CATEGORY, PluginDescriptor, ScriptPlugin, discover_scripts};
pub use error::{Error, Result};
pub use orchestrator::{BatchEvent, BatchReport, BatchRun, Orchestrator};
pub use pending::{PendingChange, PendingChanges, Target, TargetKey};
pub use probe::probe;
pub use runner::{CommandRunner, ShellKind, ShellPrograms, ShellRunner, classify};
pub use types::{BatchSummary, ChangeStatus, ExecutionResult};

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_end_to_end_apply_then_revert() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("echo.json"),
            r#"{
                "id": "echo",
                "info": "Echo plugin",
                "category": "Test",
                "check": ["echo 0"],
                "do": ["echo applied"],
                "undo": ["echo reverted"]
            }"#,
        )
        .unwrap();

        let runner = ShellRunner::new();
        let catalog = Catalog::discover(dir.path(), &runner);
        let item = catalog.find("echo").unwrap();
        assert!(!item.activation_state);

        let orchestrator = Orchestrator::new(&runner);
        let mut pending = PendingChanges::new();

        pending.toggle_item(item, true);
        let report = orchestrator.run_batch(&mut pending).into_report();
        assert_eq!(report.entries[0].status(), ChangeStatus::Completed);
        assert!(pending.is_empty());

        pending.toggle(Target::from(item), false, true);
        let events: Vec<_> = orchestrator.run_batch(&mut pending).collect();
        assert_eq!(
            events.iter().map(|e| e.status).collect::<Vec<_>>(),
            vec![ChangeStatus::InProgress, ChangeStatus::Reverted]
        );
        assert!(pending.is_empty());
    }

    #[test]
    fn test_real_probe_reads_command_output() {
        let runner = ShellRunner::new();
        let active = PluginDescriptor::new("on").with_probe(["echo 100% done"]);
        let inactive = PluginDescriptor::new("off").with_probe(["echo off"]);

        assert!(probe(&active, &runner));
        assert!(!probe(&inactive, &runner));
    }

    #[test]
    fn test_real_probe_ignores_stderr() {
        let runner = ShellRunner::new();
        let descriptor =
            PluginDescriptor::new("p").with_probe(["echo 'error at line:1 char:1' >&2; echo 0"]);

        assert!(!probe(&descriptor, &runner));
    }
}
