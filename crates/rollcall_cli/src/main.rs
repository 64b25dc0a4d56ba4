//! Rollcall CLI
//!
//! Command-line tools for Rollcall database files.
//!
//! # Commands
//!
//! - `inspect` - Display file size, collections and record counts
//! - `dump` - Print one collection as JSON
//! - `verify` - Check the database structure
//! - `import` - Append records from a JSON file

mod commands;
mod error;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Rollcall command-line database tools.
#[derive(Parser)]
#[command(name = "rollcall")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the database file
    #[arg(
        global = true,
        short,
        long,
        env = "ROLLCALL_DB_PATH",
        default_value = "data/db.json"
    )]
    path: PathBuf,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for `inspect`.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum Format {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Display file size, collections and record counts
    Inspect {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Print a collection as JSON
    Dump {
        /// Collection name
        collection: String,

        /// Pretty-print the output
        #[arg(long)]
        pretty: bool,
    },

    /// Check that the database is well formed
    Verify,

    /// Append records from a JSON array file to a collection
    Import {
        /// Target collection
        collection: String,

        /// JSON file holding an array of objects
        file: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so that `dump` output stays clean
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Inspect { format } => {
            commands::inspect::run(&cli.path, matches!(format, Format::Json))
        }
        Commands::Dump { collection, pretty } => {
            commands::dump::run(&cli.path, &collection, pretty)
        }
        Commands::Verify => commands::verify::run(&cli.path),
        Commands::Import { collection, file } => {
            commands::import::run(&cli.path, &collection, &file)
        }
        Commands::Version => {
            println!("Rollcall CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("Rollcall Core v{}", rollcall_core::VERSION);
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
