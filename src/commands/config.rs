use anyhow::Result;

use crate::Context;
use crate::paths;
use crate::ui;

pub fn run(ctx: &Context) -> Result<()> {
    ui::header("Configuration");

    let file = paths::config_file()?;
    let found = file.exists();
    ui::kv("Config file", &file.display().to_string());
    if !found {
        ui::dim("Not found - using defaults");
    }

    let settings = &ctx.settings;
    ui::section("Directories");
    ui::kv("Plugins", &settings.plugins_dir.display().to_string());
    ui::kv("Scripts", &settings.scripts_dir.display().to_string());

    ui::section("Execution");
    ui::kv("Plain shell", &settings.programs.plain);
    ui::kv("Script shell", &settings.programs.script);
    ui::kv("Probe jobs", &settings.jobs.to_string());

    println!();
    ui::dim(&format!(
        "Override directories with --plugins-dir/--scripts-dir or {}.",
        paths::ENV_CONFIG_DIR
    ));

    Ok(())
}
