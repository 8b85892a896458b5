//! State prober - decides whether a plugin is currently active

use crate::descriptor::PluginDescriptor;
use crate::runner::CommandRunner;

/// Marker a probe output must contain to count as "active"
const ACTIVE_MARKER: &str = "1";

/// Whether one probe's stdout asserts the tweak is active.
///
/// This is plain substring containment: `"100% done"` or a version string
/// like `"10.0.19045"` counts as active. Manifests in the wild rely on it,
/// so it must not be tightened to an equality check.
pub fn asserts_active(output: &str) -> bool {
    output.contains(ACTIVE_MARKER)
}

/// Determine the activation state of `descriptor`.
///
/// Only stdout is inspected; stderr diagnostics never count.
/// Every probe command must assert active; the first one that does not
/// (including one that fails to run at all) ends the probe and no later
/// probe command is started. With no probe commands the manifest's
/// `defaultState` decides, and a missing default means inactive.
pub fn probe(descriptor: &PluginDescriptor, runner: &dyn CommandRunner) -> bool {
    if !descriptor.has_probe() {
        let state = descriptor.default_state.unwrap_or(false);
        log::debug!(
            "Plugin '{}' has no probe, using default state {}",
            descriptor.id,
            state
        );
        return state;
    }

    let mut active = true;
    for command in &descriptor.probe_commands {
        let result = runner.run_auto(command);

        if !result.succeeded {
            log::error!(
                "Probe for '{}' could not run: {}",
                descriptor.id,
                command
            );
            active = false;
            break;
        }

        if !asserts_active(&result.stdout) {
            active = false;
            break;
        }
    }

    log::info!(
        "Plugin '{}' is {}",
        descriptor.id,
        if active { "active" } else { "inactive" }
    );
    active
}
