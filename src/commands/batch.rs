//! Apply / revert / select commands
//!
//! Each command builds a [`PendingChanges`] queue from the catalog, shows
//! the review, asks for confirmation, then hands the queue to the
//! orchestrator and prints every status transition.

use anyhow::{Context as AnyhowContext, Result, bail};
use dialoguer::{Confirm, MultiSelect};
use plugkit::{
    Catalog, CatalogItem, Orchestrator, PendingChanges, ScriptPlugin, Target, discover_scripts,
};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use super::review::{self, TerminalObserver};
use crate::Context;
use crate::cli::{ApplyArgs, RevertArgs, RunArgs};
use crate::ui;

pub fn apply(ctx: &Context, args: ApplyArgs) -> Result<()> {
    if args.ids.is_empty() && args.scripts.is_empty() {
        bail!("Nothing to apply: pass plugin ids and/or --script <file>");
    }

    let runner = super::runner(ctx);
    let catalog = super::load_catalog(ctx, &runner);

    let mut pending = PendingChanges::new();
    queue_items(&catalog, &args.ids, true, args.force, &mut pending)?;
    for script in &args.scripts {
        let path = resolve_script(&ctx.settings.scripts_dir, script)?;
        pending.queue_script(ScriptPlugin::from_path(path));
    }

    execute(ctx, &runner, &mut pending, args.run)
}

pub fn revert(ctx: &Context, args: RevertArgs) -> Result<()> {
    let runner = super::runner(ctx);
    let catalog = super::load_catalog(ctx, &runner);

    let mut pending = PendingChanges::new();
    queue_items(&catalog, &args.ids, false, args.force, &mut pending)?;

    execute(ctx, &runner, &mut pending, args.run)
}

/// Interactive selection: checked = should be active
pub fn select(ctx: &Context, args: RunArgs) -> Result<()> {
    if !std::io::stdin().is_terminal() {
        bail!("Interactive selection needs a terminal; use 'tweakbox apply' or 'tweakbox revert'");
    }

    let runner = super::runner(ctx);
    let catalog = super::load_catalog(ctx, &runner);
    let scripts = discover_scripts(&ctx.settings.scripts_dir);
    log::info!("Plugins [PS] initialized.");

    if catalog.is_empty() && scripts.is_empty() {
        ui::warn("No plugins or scripts found");
        return Ok(());
    }

    let items: Vec<&CatalogItem> = catalog.items().collect();
    let mut labels: Vec<String> = items
        .iter()
        .map(|item| format!("{} / {}", item.category, item.id()))
        .collect();
    let mut defaults: Vec<bool> = items.iter().map(|item| item.activation_state).collect();
    for script in &scripts {
        labels.push(format!("Scripts / {}", script.file_name()));
        defaults.push(false);
    }

    let chosen = MultiSelect::new()
        .with_prompt("Select the tweaks that should be active (space toggles, enter confirms)")
        .items(&labels)
        .defaults(&defaults)
        .interact()
        .context("Failed to read selection")?;

    let mut selected = vec![false; labels.len()];
    for index in chosen {
        selected[index] = true;
    }

    let mut pending = PendingChanges::new();
    for (item, desired) in items.iter().zip(&selected) {
        if *desired != item.activation_state {
            pending.toggle_item(item, *desired);
        }
    }
    for (script, desired) in scripts.into_iter().zip(&selected[items.len()..]) {
        if *desired {
            pending.queue_script(script);
        }
    }

    execute(ctx, &runner, &mut pending, args)
}

/// Queue catalog items by id.
///
/// Items already in the desired state are skipped unless `force` is set.
fn queue_items(
    catalog: &Catalog,
    ids: &[String],
    desired: bool,
    force: bool,
    pending: &mut PendingChanges,
) -> Result<()> {
    for id in ids {
        let item = catalog
            .find(id)
            .ok_or_else(|| plugkit::Error::PluginNotFound(id.clone()))?;

        if item.activation_state == desired && !force {
            ui::dim(&format!(
                "{} is already {} (use --force to queue it anyway)",
                id,
                if desired { "active" } else { "inactive" }
            ));
            continue;
        }

        pending.toggle(Target::from(item), desired, !desired);
    }
    Ok(())
}

/// Find a script by path, or by name inside the scripts directory
fn resolve_script(scripts_dir: &Path, name: &str) -> Result<PathBuf> {
    let direct = PathBuf::from(name);
    if direct.is_file() {
        return Ok(direct);
    }

    let in_dir = scripts_dir.join(name);
    if in_dir.is_file() {
        return Ok(in_dir);
    }

    let with_ext = scripts_dir.join(format!("{}.ps1", name));
    if with_ext.is_file() {
        return Ok(with_ext);
    }

    bail!(
        "Script not found: {} (looked in {})",
        name,
        scripts_dir.display()
    )
}

/// Review, confirm, then drain the queue through the orchestrator
fn execute(
    ctx: &Context,
    runner: &plugkit::ShellRunner,
    pending: &mut PendingChanges,
    args: RunArgs,
) -> Result<()> {
    review::print(pending);

    if pending.is_empty() {
        return Ok(());
    }

    if args.dry_run {
        println!();
        ui::info("Dry run - no changes made");
        return Ok(());
    }

    if !args.yes && !confirm_proceed()? {
        println!();
        ui::error("Aborted");
        pending.clear();
        return Ok(());
    }

    let report = if ctx.quiet {
        Orchestrator::new(runner).run_batch_with(pending, &mut plugkit::NoObserver)
    } else {
        Orchestrator::new(runner).run_batch_with(pending, &mut TerminalObserver::new())
    };

    if !report.summary.is_success() {
        bail!("{} step(s) failed", report.summary.failed);
    }
    Ok(())
}

/// Confirm with user
fn confirm_proceed() -> Result<bool> {
    let confirmed = Confirm::new()
        .with_prompt("Continue?")
        .default(true)
        .interact()
        .context("Failed to read confirmation")?;

    Ok(confirmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_script_by_name_and_stem() {
        let dir = TempDir::new().unwrap();
        let script = dir.path().join("clean.ps1");
        fs::write(&script, "Write-Host clean").unwrap();

        assert_eq!(resolve_script(dir.path(), "clean.ps1").unwrap(), script);
        assert_eq!(resolve_script(dir.path(), "clean").unwrap(), script);
        assert_eq!(
            resolve_script(dir.path(), script.to_str().unwrap()).unwrap(),
            script
        );
        assert!(resolve_script(dir.path(), "missing").is_err());
    }

    fn catalog_with(dir: &Path) -> Catalog {
        fs::write(
            dir.join("on.json"),
            r#"{ "id": "on", "defaultState": true }"#,
        )
        .unwrap();
        fs::write(
            dir.join("off.json"),
            r#"{ "id": "off", "defaultState": false }"#,
        )
        .unwrap();
        Catalog::discover(dir, &plugkit::ShellRunner::new())
    }

    #[test]
    fn test_queue_items_skips_items_already_in_state() {
        let dir = TempDir::new().unwrap();
        let catalog = catalog_with(dir.path());

        let mut pending = PendingChanges::new();
        queue_items(
            &catalog,
            &["on".to_string(), "off".to_string()],
            true,
            false,
            &mut pending,
        )
        .unwrap();

        let labels: Vec<_> = pending.iter().map(|c| c.target.label()).collect();
        assert_eq!(labels, vec!["off"]);
    }

    #[test]
    fn test_queue_items_force() {
        let dir = TempDir::new().unwrap();
        let catalog = catalog_with(dir.path());

        let mut pending = PendingChanges::new();
        queue_items(&catalog, &["off".to_string()], false, true, &mut pending).unwrap();

        assert_eq!(pending.len(), 1);
        assert!(!pending.iter().next().unwrap().desired_state);
    }

    #[test]
    fn test_queue_items_unknown_id() {
        let dir = TempDir::new().unwrap();
        let catalog = catalog_with(dir.path());

        let mut pending = PendingChanges::new();
        let err = queue_items(&catalog, &["nope".to_string()], true, false, &mut pending)
            .unwrap_err();
        assert!(err.to_string().contains("nope"));
    }
}
