//! table_sync CLI
//!
//! Synchronize tables from definition files, inspect live tables and list
//! the type catalog.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use table_sync::db::capture::{render_script, write_capture_file};
use table_sync::utils::logging::init_logging;
use table_sync::{config, SyncOutcome, TableSpecFile, TableStructure};

/// Create or alter database tables to match their definitions.
#[derive(Parser)]
#[command(name = "table_sync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file.
    #[arg(short, long, default_value = "table_sync.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Synchronize a table with a definition file.
    Sync {
        /// Table definition (.toml, .yaml, .yml or .json).
        file: PathBuf,

        /// Drop live columns that the definition does not name.
        #[arg(long)]
        explicit: bool,

        /// Drop and re-create the table if it exists.
        #[arg(long)]
        drop: bool,

        /// Print the SQL instead of executing it.
        #[arg(long)]
        capture: bool,

        /// Also write captured SQL to a timestamped file in this directory.
        #[arg(long, requires = "capture")]
        out_dir: Option<PathBuf>,
    },

    /// Print the live columns of a table as JSON.
    Inspect {
        /// Table name without the configured prefix.
        table: String,
    },

    /// List the type names of a catalog family.
    Types {
        #[arg(default_value = "all")]
        family: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Commands::Types { family } = &cli.command {
        for type_name in TableStructure::<table_sync::DatabaseConnection>::types(family) {
            println!("{}", type_name);
        }
        return Ok(());
    }

    let config_path = cli.config.to_string_lossy().to_string();
    let config = config::load_from_file(&config_path)
        .with_context(|| format!("loading {}", config_path))?;
    init_logging(&config.logging)?;

    let mut structure = table_sync::connect(&config)
        .await
        .context("connecting to the database")?;

    match cli.command {
        Commands::Sync {
            file,
            explicit,
            drop,
            capture,
            out_dir,
        } => {
            let spec = TableSpecFile::load(&file)
                .with_context(|| format!("loading {}", file.display()))?;
            spec.apply(&mut structure)?;

            if capture {
                structure.capture_only(true);
            }

            let table_name = structure.physical_table_name();
            let outcome = structure.synchronize(explicit, drop).await?;
            info!(table = %table_name, outcome = ?outcome, "Synchronization finished");

            if capture {
                let statements = structure.take_captured_sql();
                print!("{}", render_script(&statements));
                if let Some(dir) = out_dir {
                    let path = write_capture_file(&dir, &table_name, &statements)?;
                    println!("-- written to {}", path.display());
                }
            } else if outcome == SyncOutcome::Unchanged {
                println!("{} is already in sync", table_name);
            } else {
                println!("{} {:?}", table_name, outcome);
            }
        }

        Commands::Inspect { table } => {
            structure.table(&table, None);
            if !structure.table_exists().await? {
                anyhow::bail!("table {} does not exist", structure.physical_table_name());
            }
            let columns = structure.existing_columns().await?;
            println!("{}", serde_json::to_string_pretty(columns)?);
        }

        Commands::Types { .. } => {}
    }

    Ok(())
}
