//! Command-line inspector for MMDB files: print metadata or run ad hoc
//! IP lookups.

use clap::{Parser, Subcommand};
use mmdb_core::Database;
use std::net::IpAddr;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "mmdb-tool", version, about = "Inspect MaxMind DB files")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print a database's metadata as JSON
    Info {
        /// Path to the .mmdb file
        file: PathBuf,
    },
    /// Look up one or more addresses and print the resolved record
    Lookup {
        /// Path to the .mmdb file
        file: PathBuf,
        /// Addresses to look up
        #[arg(required = true)]
        addresses: Vec<IpAddr>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("mmdb-tool: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Info { file } => {
            let db = Database::open(&file)?;
            println!("{}", serde_json::to_string_pretty(&db.metadata().raw.to_json())?);
        }
        Command::Lookup { file, addresses } => {
            let db = Database::open(&file)?;
            for addr in addresses {
                let record = db.lookup(addr)?;
                let json = record.map(|v| v.to_json()).unwrap_or(serde_json::Value::Null);
                println!("{}", serde_json::to_string_pretty(&json)?);
            }
        }
    }

    Ok(())
}
