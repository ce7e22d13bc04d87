//! MeloDB CLI
//!
//! Offline inspection and admin tool for a MeloDB data directory.

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use melodb::{Config, MeloError, Registry};

/// MeloDB CLI
#[derive(Parser, Debug)]
#[command(name = "melodb-cli")]
#[command(about = "Inspect and administer a MeloDB data directory")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./database")]
    data_dir: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List databases and their row counts
    List,

    /// Dump every row of a database as pretty JSON
    Dump {
        /// The database to dump
        database: String,
    },

    /// Get a single row's value
    Get {
        /// The database holding the row
        database: String,

        /// The row key
        key: String,
    },

    /// Delete a row
    Del {
        /// The database holding the row
        database: String,

        /// The row key
        key: String,
    },
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,melodb=info"));

    fmt().with_env_filter(filter).with_target(false).init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> melodb::Result<()> {
    let config = Config::builder().data_dir(&args.data_dir).build();
    let registry = Registry::open(config)?;

    match args.command {
        Commands::List => {
            for name in registry.names() {
                let rows = registry.get(&name).map(|s| s.len()).unwrap_or(0);
                println!("{}  ({} rows)", name, rows);
            }
        }

        Commands::Dump { database } => {
            let store = registry
                .get(&database)
                .ok_or_else(|| MeloError::not_found(database.as_str()))?;
            for key in store.keys() {
                if let Some(value) = store.get(&key) {
                    let pretty = serde_json::to_string_pretty(&value)
                        .map_err(|e| MeloError::Serialization(e.to_string()))?;
                    println!("{}: {}", key, pretty);
                }
            }
        }

        Commands::Get { database, key } => {
            let store = registry
                .get(&database)
                .ok_or_else(|| MeloError::not_found(database.as_str()))?;
            let value = store.get(&key).ok_or_else(|| MeloError::not_found(key.as_str()))?;
            let pretty = serde_json::to_string_pretty(&value)
                .map_err(|e| MeloError::Serialization(e.to_string()))?;
            println!("{}", pretty);
        }

        Commands::Del { database, key } => {
            let store = registry
                .get(&database)
                .ok_or_else(|| MeloError::not_found(database.as_str()))?;
            store.delete(&key)?;
            println!("deleted '{}' from {}", key, database);
        }
    }

    Ok(())
}
