use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use waypoint::cli::{config as config_cmd, export, list, note, save, stats};
use waypoint::config::Config;
use waypoint::export::ExportFormat;
use waypoint::git::GitCollector;
use waypoint::store::NoteStore;

#[derive(Parser)]
#[command(name = "waypoint")]
#[command(about = "Save notes about your work together with the state of your git repository")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "waypoint.yaml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Save a note with the current repository state
    Save {
        /// What you are working on
        message: String,

        /// Skip the AI interpretation
        #[arg(long)]
        no_ai: bool,
    },

    /// Show the most recent note for this repository
    Resume {
        /// Search all repositories
        #[arg(short, long)]
        all: bool,
    },

    /// List recent notes
    List {
        /// Number of notes to show
        #[arg(short = 'n', long, default_value_t = 10)]
        count: usize,

        /// Include all repositories
        #[arg(short, long)]
        all: bool,
    },

    /// Show a note in full
    Show {
        /// Note ID (full or unique prefix)
        id: String,
    },

    /// Delete a note
    Delete {
        /// Note ID (full or unique prefix)
        id: String,
    },

    /// List notes taken on a branch (current branch by default)
    Branch {
        /// Branch name
        name: Option<String>,
    },

    /// Export notes
    Export {
        /// Export notes from all repositories
        #[arg(short, long)]
        all: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "markdown")]
        format: ExportFormat,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show storage statistics
    Stats,

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Check that the AI interpretation API is reachable
    TestAi,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print one setting
    Get {
        /// apiKey, maxCommits, model or aiEnabled
        key: String,

        /// Print the API key unmasked
        #[arg(long)]
        reveal: bool,
    },
    /// Change one setting
    Set { key: String, value: String },
    /// Print all settings
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("WAYPOINT_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Load config
    let config = Config::load(&cli.config)?;

    // Initialize store
    let mut store = NoteStore::open(&config.storage_path())
        .context("Failed to open note storage")?;
    if store.migrated() > 0 {
        eprintln!(
            "Migrated {} notes to repository-scoped storage",
            store.migrated()
        );
    }

    let cwd = std::env::current_dir().context("Cannot determine current directory")?;
    let collector = GitCollector::new(cwd);

    match cli.command {
        Commands::Save { message, no_ai } => {
            save::run(&config, &mut store, &collector, &message, no_ai).await?;
        }
        Commands::Resume { all } => {
            list::resume(&store, &collector, all).await?;
        }
        Commands::List { count, all } => {
            list::run(&store, &collector, count, all).await?;
        }
        Commands::Show { id } => {
            note::show(&store, &id)?;
        }
        Commands::Delete { id } => {
            note::delete(&mut store, &id)?;
        }
        Commands::Branch { name } => {
            note::branch(&store, &collector, name).await?;
        }
        Commands::Export {
            all,
            format,
            output,
        } => {
            export::run(&store, &collector, all, format, output).await?;
        }
        Commands::Stats => {
            stats::run(&store)?;
        }
        Commands::Config { command } => match command {
            ConfigCommands::Get { key, reveal } => config_cmd::get(&store, &key, reveal)?,
            ConfigCommands::Set { key, value } => config_cmd::set(&mut store, &key, &value)?,
            ConfigCommands::List => config_cmd::list(&store)?,
        },
        Commands::TestAi => {
            config_cmd::test_ai(&config, &store).await?;
        }
    }

    Ok(())
}
