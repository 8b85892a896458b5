use anyhow::Result;
use colored::Colorize;
use plugkit::CatalogItem;

use crate::Context;
use crate::cli::ListArgs;
use crate::ui;

pub fn run(ctx: &Context, args: ListArgs) -> Result<()> {
    let runner = super::runner(ctx);
    let catalog = super::load_catalog(ctx, &runner);

    if catalog.is_empty() {
        ui::warn(&format!(
            "No plugins found in {}",
            ctx.settings.plugins_dir.display()
        ));
        return Ok(());
    }

    ui::header("Plugins");

    let mut shown = 0;
    for category in catalog.categories() {
        if let Some(filter) = &args.category
            && !category.name.eq_ignore_ascii_case(filter)
        {
            continue;
        }

        let items: Vec<&CatalogItem> = category
            .items
            .iter()
            .filter(|item| keep(item, &args))
            .collect();
        if items.is_empty() {
            continue;
        }

        ui::section(&category.name);
        for item in items {
            println!("  {} {}", ui::state_marker(item.activation_state), item.id());
            if ctx.verbose > 0
                && let Some(source) = &item.descriptor.source
            {
                println!("      {}", source.display().to_string().dimmed());
            }
            shown += 1;
        }
    }

    println!();
    let active = catalog.items().filter(|i| i.activation_state).count();
    println!(
        "{} plugins shown, {} of {} active",
        shown.to_string().bold(),
        active.to_string().green(),
        catalog.len()
    );

    if !catalog.skipped().is_empty() {
        ui::warn(&format!(
            "{} manifest(s) could not be loaded (run with -v for details)",
            catalog.skipped().len()
        ));
    }

    Ok(())
}

fn keep(item: &CatalogItem, args: &ListArgs) -> bool {
    if args.active {
        return item.activation_state;
    }
    if args.inactive {
        return !item.activation_state;
    }
    true
}
