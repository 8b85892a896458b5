mod cli;
mod commands;
mod config;
mod paths;
mod progress;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use std::io;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    pub settings: config::Settings,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    if let Command::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "tweakbox", &mut io::stdout());
        return Ok(());
    }

    let config = config::Config::load()?;
    let settings = config::Settings::resolve(
        cli.plugins_dir,
        cli.scripts_dir,
        &config,
        &paths::config_dir()?,
    );
    log::debug!("Resolved settings: {:?}", settings);

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
        settings,
    };

    match cli.command {
        Command::List(args) => commands::list::run(&ctx, args),
        Command::Show { id } => commands::show::run(&ctx, &id),
        Command::Apply(args) => commands::batch::apply(&ctx, args),
        Command::Revert(args) => commands::batch::revert(&ctx, args),
        Command::Select(args) => commands::batch::select(&ctx, args),
        Command::Scripts { show } => commands::scripts::run(&ctx, show),
        Command::Config => commands::config::run(&ctx),
        Command::Completions { .. } => Ok(()),
    }
}
