use anyhow::Result;
use colored::Colorize;

use crate::Context;
use crate::ui;

pub fn run(ctx: &Context, id: &str) -> Result<()> {
    let runner = super::runner(ctx);
    let catalog = super::load_catalog(ctx, &runner);

    let item = catalog
        .find(id)
        .ok_or_else(|| plugkit::Error::PluginNotFound(id.to_string()))?;
    let descriptor = &item.descriptor;

    ui::header(&descriptor.id);
    ui::kv("Category", &item.category);
    ui::kv(
        "State",
        &if item.activation_state {
            "active".green().to_string()
        } else {
            "inactive".dimmed().to_string()
        },
    );
    if let Some(source) = &descriptor.source {
        ui::kv("Manifest", &source.display().to_string());
    }
    if !descriptor.has_probe()
        && let Some(default) = descriptor.default_state
    {
        ui::kv("Default state", &default.to_string());
    }

    let information = descriptor.information();
    if !information.is_empty() {
        ui::section("Information");
        for line in information.lines() {
            println!("  {}", line);
        }
    }

    print_commands("Check", &descriptor.probe_commands);
    print_commands("Do", &descriptor.apply_commands);
    print_commands("Undo", &descriptor.undo_commands);

    Ok(())
}

fn print_commands(title: &str, commands: &[String]) {
    ui::section(title);
    if commands.is_empty() {
        ui::dim("(none)");
        return;
    }
    for command in commands {
        let shell = match plugkit::classify(command) {
            plugkit::ShellKind::Plain => "cmd",
            plugkit::ShellKind::Script => "ps",
        };
        println!("  {} {}", format!("[{}]", shell).dimmed(), command);
    }
}
