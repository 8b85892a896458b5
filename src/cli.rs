use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tweakbox")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Apply and revert declarative system tweaks", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Directory holding plugin manifests (*.json)
    #[arg(long, global = true, env = "TWEAKBOX_PLUGINS_DIR")]
    pub plugins_dir: Option<PathBuf>,

    /// Directory holding PowerShell plugin scripts (*.ps1)
    #[arg(long, global = true, env = "TWEAKBOX_SCRIPTS_DIR")]
    pub scripts_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List plugins grouped by category with their current state
    List(ListArgs),

    /// Show a plugin's description and commands
    Show {
        /// Plugin id
        id: String,
    },

    /// Apply plugins (and run scripts)
    Apply(ApplyArgs),

    /// Revert plugins using their undo commands
    Revert(RevertArgs),

    /// Pick plugins interactively, then apply/revert the differences
    Select(RunArgs),

    /// List PowerShell plugin scripts
    Scripts {
        /// Print each script's content
        #[arg(long)]
        show: bool,
    },

    /// Show configuration and resolved directories
    Config,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser)]
pub struct ListArgs {
    /// Only show one category
    #[arg(short, long)]
    pub category: Option<String>,

    /// Only show active plugins
    #[arg(long, conflicts_with = "inactive")]
    pub active: bool,

    /// Only show inactive plugins
    #[arg(long)]
    pub inactive: bool,
}

#[derive(Parser, Clone, Copy)]
pub struct RunArgs {
    /// Show the review and stop without running anything
    #[arg(short, long)]
    pub dry_run: bool,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Parser)]
pub struct ApplyArgs {
    /// Plugin ids to apply
    pub ids: Vec<String>,

    /// Script files to run (by path or by name in the scripts directory)
    #[arg(short, long = "script")]
    pub scripts: Vec<String>,

    /// Queue plugins even if their probe reports them active
    #[arg(short, long)]
    pub force: bool,

    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Parser)]
pub struct RevertArgs {
    /// Plugin ids to revert
    #[arg(required = true)]
    pub ids: Vec<String>,

    /// Queue plugins even if their probe reports them inactive
    #[arg(short, long)]
    pub force: bool,

    #[command(flatten)]
    pub run: RunArgs,
}
