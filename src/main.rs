//! Stamps CLI - Command-line interface for the stamp collection tracker

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use stamps::config;
use stamps::output::OutputMode;
use stamps::storage::StampStore;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "stamps")]
#[command(version)]
#[command(about = "Personal stamp collection tracker")]
#[command(long_about = r#"
Stamps keeps your collection and a table of postage rates in one SQLite file.
Lira issues are normalized to euro cents so the whole collection can be valued.

Example usage:
  stamps
  stamps stamp add "Europa" 0.85 --quantity 4
  stamps stamp add "Castelli d'Italia" 800 --currency ITL
  stamps rate add "Raccomandata" 5.40 20
  stamps stats --json

The database defaults to database/stamps.db; override it with --database,
the STAMPS_DB_PATH environment variable, or a stamps.toml file.
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the database file
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Path to the config file (defaults to ./stamps.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the collection and postage rates (default)
    Show,

    /// Manage stamps in the collection
    Stamp {
        #[command(subcommand)]
        command: StampCommand,
    },

    /// Manage postage rates
    Rate {
        #[command(subcommand)]
        command: RateCommand,
    },

    /// Load the sample collection
    Sample,

    /// Show collection statistics
    Stats,

    /// Write a stamps.toml pointing at the current database
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
pub enum StampCommand {
    /// Add a stamp
    Add {
        /// Display name
        name: String,

        /// Face value in the stamp's currency
        value: f64,

        /// Currency code (EUR or ITL)
        #[arg(short, long, default_value = "EUR")]
        currency: String,

        /// Number of copies owned
        #[arg(short = 'n', long, default_value_t = 1)]
        quantity: u32,

        /// Id of the postage rate this stamp covers
        #[arg(short, long)]
        rate_id: Option<i64>,
    },

    /// List all stamps
    List,

    /// Show a single stamp
    Get {
        id: i64,
    },

    /// Set how many copies of a stamp you own
    SetQuantity {
        id: i64,
        quantity: u32,
    },

    /// Remove a stamp
    Delete {
        id: i64,
    },

    /// Remove every stamp
    Clear,
}

#[derive(Subcommand)]
pub enum RateCommand {
    /// Add a rate, replacing any rate with the same name
    Add {
        name: String,
        /// Rate in euro
        value: f64,
        /// Maximum weight in grams
        max_weight: u32,
    },

    /// List all rates
    List {
        /// Only rates that can carry an item of this many grams
        #[arg(short, long)]
        weight: Option<u32>,
    },

    /// Show a single rate
    Get {
        name: String,
    },

    /// Change value and max weight of an existing rate
    Update {
        name: String,
        value: f64,
        max_weight: u32,
    },

    /// Remove a rate
    Delete {
        name: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let output_mode = OutputMode::from_flag(cli.json);
    let file_config = config::load_config(cli.config.as_deref())?;
    let env_path = config::database_path_from_env();
    let database = config::resolve_database_path(
        cli.database.as_deref(),
        env_path.as_deref(),
        file_config.as_ref(),
    );

    tracing::debug!("Using database {}", database.display());
    let store = StampStore::open(&database)?;

    match cli.command.unwrap_or(Commands::Show) {
        Commands::Show => commands::run_show(&store, output_mode)?,
        Commands::Stamp { command } => commands::run_stamp(&store, command, output_mode)?,
        Commands::Rate { command } => commands::run_rate(&store, command, output_mode)?,
        Commands::Sample => commands::run_sample(&store, output_mode)?,
        Commands::Stats => commands::run_stats(&store, output_mode)?,
        Commands::Init { force } => {
            let path = cli.config.unwrap_or_else(config::default_config_path);
            commands::run_init(&path, &database, force, output_mode)?
        }
    }

    Ok(())
}
