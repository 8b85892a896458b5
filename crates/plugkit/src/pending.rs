//! Pending changes - the queue of apply/revert decisions awaiting a run

use crate::catalog::CatalogItem;
use crate::descriptor::{PluginDescriptor, ScriptPlugin};
use crate::error::{Error, Result};
use crate::types::ChangeStatus;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// What a pending change acts on
#[derive(Debug, Clone)]
pub enum Target {
    /// Manifest plugin with probe/apply/undo command lists
    Native(Arc<PluginDescriptor>),
    /// Script file run as a whole; has no undo
    Script(ScriptPlugin),
}

/// Identity of a target within the pending set
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TargetKey {
    /// Native plugin loaded from this manifest file
    Manifest(PathBuf),
    /// Native plugin built in memory, known only by id
    Native(String),
    Script(PathBuf),
}

impl fmt::Display for TargetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native(id) => write!(f, "{}", id),
            Self::Manifest(path) | Self::Script(path) => write!(f, "{}", path.display()),
        }
    }
}

impl Target {
    /// Manifests may share an id, so loaded plugins are keyed by file
    pub fn key(&self) -> TargetKey {
        match self {
            Self::Native(descriptor) => match &descriptor.source {
                Some(path) => TargetKey::Manifest(path.clone()),
                None => TargetKey::Native(descriptor.id.clone()),
            },
            Self::Script(script) => TargetKey::Script(script.path.clone()),
        }
    }

    /// Short name for progress displays
    pub fn label(&self) -> String {
        match self {
            Self::Native(descriptor) => descriptor.id.clone(),
            Self::Script(script) => script.file_name(),
        }
    }

    /// Longer description for the review summary
    pub fn description(&self) -> String {
        match self {
            Self::Native(descriptor) => {
                format!("Native Plugin: {}\n{}", descriptor.id, descriptor.information())
            }
            Self::Script(script) => format!(
                "PowerShell Script: {}\n{}",
                script.file_name(),
                script.path.display()
            ),
        }
    }
}

impl From<&CatalogItem> for Target {
    fn from(item: &CatalogItem) -> Self {
        Self::Native(Arc::clone(&item.descriptor))
    }
}

impl From<ScriptPlugin> for Target {
    fn from(script: ScriptPlugin) -> Self {
        Self::Script(script)
    }
}

/// One queued apply (`desired_state == true`) or revert decision
#[derive(Debug, Clone)]
pub struct PendingChange {
    pub target: Target,
    pub desired_state: bool,
    status: ChangeStatus,
}

impl PendingChange {
    pub fn new(target: Target, desired_state: bool) -> Self {
        Self {
            target,
            desired_state,
            status: ChangeStatus::Queued,
        }
    }

    pub fn status(&self) -> ChangeStatus {
        self.status
    }

    pub fn key(&self) -> TargetKey {
        self.target.key()
    }

    /// "To be Applied" / "To be Reverted"
    pub fn intent(&self) -> &'static str {
        if self.desired_state {
            "To be Applied"
        } else {
            "To be Reverted"
        }
    }

    /// Move to `next`, rejecting transitions the state machine forbids
    pub fn advance(&mut self, next: ChangeStatus) -> Result<()> {
        if !self.status.can_advance_to(next) {
            return Err(Error::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}

/// Insertion-ordered set of pending changes, one per target
#[derive(Debug, Clone, Default)]
pub struct PendingChanges {
    entries: Vec<PendingChange>,
}

impl PendingChanges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a selection toggle.
    ///
    /// Toggling a target that already has an entry overwrites its desired
    /// state and keeps its queue position. Toggling back to `last_known`
    /// (the state the target was last observed in) withdraws the entry.
    pub fn toggle(&mut self, target: Target, desired_state: bool, last_known: bool) {
        let key = target.key();
        log_toggle(&target, desired_state);

        if desired_state == last_known {
            self.entries.retain(|e| e.key() != key);
            return;
        }

        match self.entries.iter_mut().find(|e| e.key() == key) {
            Some(entry) => {
                entry.target = target;
                entry.desired_state = desired_state;
            }
            None => self.entries.push(PendingChange::new(target, desired_state)),
        }
    }

    /// Toggle a catalog item against its probed state
    pub fn toggle_item(&mut self, item: &CatalogItem, desired_state: bool) {
        self.toggle(Target::from(item), desired_state, item.activation_state);
    }

    /// Queue a script run; scripts are never known to be applied
    pub fn queue_script(&mut self, script: ScriptPlugin) {
        self.toggle(script.into(), true, false);
    }

    pub fn get(&self, key: &TargetKey) -> Option<&PendingChange> {
        self.entries.iter().find(|e| &e.key() == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PendingChange> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Move every entry out, leaving the set empty
    pub fn take(&mut self) -> Vec<PendingChange> {
        std::mem::take(&mut self.entries)
    }
}

fn log_toggle(target: &Target, desired_state: bool) {
    let verb = if desired_state { "Activated" } else { "Deactivated" };
    let what = match target {
        Target::Native(descriptor) => format!("Plugin: {}", descriptor.id),
        Target::Script(script) => format!("PowerShell script: {}", script.file_name()),
    };

    if desired_state {
        log::info!("{} {}", verb, what);
    } else {
        log::warn!("{} {}", verb, what);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn native(id: &str) -> Target {
        Target::Native(Arc::new(PluginDescriptor::new(id)))
    }

    fn keys(pending: &PendingChanges) -> Vec<String> {
        pending.iter().map(|e| e.key().to_string()).collect()
    }

    #[test]
    fn test_toggle_preserves_insertion_order() {
        let mut pending = PendingChanges::new();
        pending.toggle(native("x"), true, false);
        pending.toggle(native("y"), false, true);
        pending.toggle(native("z"), true, false);

        assert_eq!(keys(&pending), vec!["x", "y", "z"]);
    }

    #[test]
    fn test_retoggle_overwrites_in_place() {
        let mut pending = PendingChanges::new();
        pending.toggle(native("x"), true, false);
        pending.toggle(native("y"), true, false);
        // x was last seen active elsewhere; now request revert
        pending.toggle(native("x"), false, true);

        assert_eq!(pending.len(), 2);
        assert_eq!(keys(&pending), vec!["x", "y"]);
        let x = pending.get(&TargetKey::Native("x".into())).unwrap();
        assert!(!x.desired_state);
    }

    #[test]
    fn test_toggle_back_to_last_known_withdraws() {
        let mut pending = PendingChanges::new();
        pending.toggle(native("x"), true, false);
        pending.toggle(native("x"), false, false);

        assert!(pending.is_empty());
    }

    #[test]
    fn test_script_targets_keyed_by_path() {
        let mut pending = PendingChanges::new();
        pending.queue_script(ScriptPlugin::from_path("/scripts/a.ps1"));
        pending.queue_script(ScriptPlugin::from_path("/scripts/a.ps1"));
        pending.queue_script(ScriptPlugin::from_path("/scripts/b.ps1"));

        assert_eq!(pending.len(), 2);
        let first = pending.iter().next().unwrap();
        assert_eq!(first.target.label(), "a.ps1");
        assert!(first.desired_state);
    }

    #[test]
    fn test_shared_id_across_manifests_stays_distinct() {
        let from = |file: &str| {
            let text = r#"{ "id": "Disable tips" }"#;
            let descriptor =
                PluginDescriptor::from_json(text, &PathBuf::from(format!("/plugins/{file}")))
                    .unwrap();
            Target::Native(Arc::new(descriptor))
        };

        let mut pending = PendingChanges::new();
        pending.toggle(from("a.json"), true, false);
        pending.toggle(from("b.json"), true, false);

        assert_eq!(pending.len(), 2);
        assert_eq!(keys(&pending), vec!["/plugins/a.json", "/plugins/b.json"]);
        assert!(
            pending
                .get(&TargetKey::Manifest(PathBuf::from("/plugins/b.json")))
                .is_some()
        );

        pending.toggle(from("a.json"), false, false);
        assert_eq!(keys(&pending), vec!["/plugins/b.json"]);
    }

    #[test]
    fn test_take_empties_the_set() {
        let mut pending = PendingChanges::new();
        pending.toggle(native("x"), true, false);

        let taken = pending.take();
        assert_eq!(taken.len(), 1);
        assert!(pending.is_empty());
    }

    #[test]
    fn test_advance_enforces_state_machine() {
        let mut change = PendingChange::new(native("x"), true);
        assert_eq!(change.status(), ChangeStatus::Queued);

        assert!(change.advance(ChangeStatus::Completed).is_err());
        change.advance(ChangeStatus::InProgress).unwrap();
        change.advance(ChangeStatus::Completed).unwrap();

        let err = change.advance(ChangeStatus::Failed).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidTransition {
                from: ChangeStatus::Completed,
                to: ChangeStatus::Failed
            }
        ));
        assert_eq!(change.status(), ChangeStatus::Completed);
    }

    #[test]
    fn test_descriptions() {
        let target = Target::Native(Arc::new(
            PluginDescriptor::new("tips").with_info("Hide tips\\nand ads"),
        ));
        assert_eq!(target.description(), "Native Plugin: tips\nHide tips\nand ads");

        let script = Target::Script(ScriptPlugin::from_path("/s/clean.ps1"));
        assert!(script.description().starts_with("PowerShell Script: clean.ps1\n"));
    }
}
