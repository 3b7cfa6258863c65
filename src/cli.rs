use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "csv-mongo-loader", version, about = "Load CSV files into MongoDB")]
pub struct Cli {
    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Convert a CSV file and insert every row into a collection
    Load {
        /// CSV file with a header row
        #[arg(long)]
        file: PathBuf,

        #[arg(long, env = "DATABASE_NAME")]
        database: String,

        #[arg(long, env = "COLLECTION_NAME")]
        collection: String,
    },

    /// Convert a CSV file and print the records as JSON lines
    Convert {
        #[arg(long)]
        file: PathBuf,
    },

    /// Check that MongoDB is reachable
    Ping,
}
