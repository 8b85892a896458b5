use anyhow::{Context as AnyhowContext, Result};
use plugkit::discover_scripts;
use std::fs;

use crate::Context;
use crate::ui;

const SCRIPT_SEPARATOR_WIDTH: usize = 50;

pub fn run(ctx: &Context, show: bool) -> Result<()> {
    let dir = &ctx.settings.scripts_dir;
    let scripts = discover_scripts(dir);
    log::info!("Plugins [PS] initialized.");

    if scripts.is_empty() {
        ui::warn(&format!("No scripts found in {}", dir.display()));
        return Ok(());
    }

    if !show {
        ui::header("Scripts");
        for script in &scripts {
            println!("  {}", script.file_name());
        }
        println!();
        ui::dim("Scripts run with 'tweakbox apply --script <name>' and cannot be undone.");
        return Ok(());
    }

    for script in &scripts {
        let content = fs::read_to_string(&script.path)
            .with_context(|| format!("Could not read {}", script.path.display()))?;

        println!("--- Content of {} ---", script.file_name());
        println!("{}", content.trim_end());
        println!("{}", "-".repeat(SCRIPT_SEPARATOR_WIDTH));
    }

    Ok(())
}
