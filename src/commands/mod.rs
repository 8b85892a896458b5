// Catalog browsing
pub mod list;
pub mod show;

// Apply / revert flow
pub mod batch;
pub mod review;

// Scripts and configuration
pub mod config;
pub mod scripts;

use plugkit::{Catalog, ShellRunner};

use crate::Context;
use crate::progress;

/// Runner configured with the resolved interpreter programs
pub fn runner(ctx: &Context) -> ShellRunner {
    ShellRunner::with_programs(ctx.settings.programs.clone())
}

/// Discover and probe every plugin, with a spinner unless quiet
pub fn load_catalog(ctx: &Context, runner: &ShellRunner) -> Catalog {
    let pb = if ctx.quiet {
        progress::hidden()
    } else {
        progress::spinner("Probing plugins...")
    };

    let catalog = Catalog::discover_with_jobs(&ctx.settings.plugins_dir, runner, ctx.settings.jobs);
    progress::finish_clear(&pb);

    for skipped in catalog.skipped() {
        log::warn!("Skipped {}: {}", skipped.path.display(), skipped.reason);
    }
    log::info!("Plugins [Native] initialized");

    catalog
}
