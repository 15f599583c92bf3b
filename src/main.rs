use anyhow::{Context, Result};
use architect::architect_config::ArchitectConfig;
use architect::init::is_initialized;
use architect::logging::init_logging;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cmd;

#[derive(Parser)]
#[command(name = "architect")]
#[command(version, about = "Turn a one-line idea into a reviewed set of project files")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Accept recommended answers and approve every change without prompting
    #[arg(long, global = true)]
    pub yes: bool,

    /// Delay between streamed lines in milliseconds. Overrides architect.toml.
    #[arg(long, global = true)]
    pub line_delay_ms: Option<u64>,

    #[arg(long, global = true)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the .architect/ directory
    Init,
    /// Clarify an idea, generate files and review them
    New {
        /// What you want to build, e.g. "a todo list cli"
        description: String,
        /// Where generated files are written (defaults to a prompt)
        #[arg(long)]
        dest: Option<PathBuf>,
    },
    /// Generate from a confirmed specification left by an interrupted run
    Resume {
        #[arg(long)]
        dest: Option<PathBuf>,
    },
    /// Show project state and any pending specification
    Status,
    /// View or validate configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Validate configuration and show any warnings
    Validate,
    /// Initialize a default architect.toml file
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let project_dir = match cli.project_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    let config =
        ArchitectConfig::with_cli_args(project_dir.clone(), cli.verbose, cli.yes, cli.line_delay_ms)?;

    let writes_state = matches!(cli.command, Commands::New { .. } | Commands::Resume { .. });
    let log_dir = (writes_state || is_initialized(&project_dir)).then(|| config.log_dir());
    let _log_guard = init_logging(log_dir.as_deref(), cli.verbose);

    match &cli.command {
        Commands::Init => cmd::cmd_init(&project_dir)?,
        Commands::New { description, dest } => {
            cmd::cmd_new(&config, description, dest.as_deref()).await?
        }
        Commands::Resume { dest } => cmd::cmd_resume(&config, dest.as_deref()).await?,
        Commands::Status => cmd::cmd_status(&project_dir)?,
        Commands::Config { command } => cmd::cmd_config(&project_dir, command.clone())?,
    }

    Ok(())
}
