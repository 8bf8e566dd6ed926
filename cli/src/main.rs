//! Railway tariffs - command line front end
//!
//! ```sh
//! # List tariffs, cheapest final price first
//! railway-tariffs list --sort final-cost
//!
//! # Add a tariff with a 10% discount
//! railway-tariffs add "Санкт-Петербург" 3000 --discount 10
//!
//! # Which direction is cheapest?
//! railway-tariffs cheapest
//!
//! # Flat-file export / import
//! railway-tariffs export tariffs.txt
//! railway-tariffs import tariffs.txt
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, info};

use railway_tariffs::application::{
    tariff_from_input, SortColumn, SortOrder, TariffCatalogService,
};
use railway_tariffs::bootstrap::{init_tracing, select_repository};
use railway_tariffs::domain::Tariff;
use railway_tariffs::shared::errors::{AppError, InfraError};
use railway_tariffs::{default_config_path, AppConfig};

/// Railway tariff catalogue.
#[derive(Parser, Debug)]
#[command(name = "railway-tariffs", version, about)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "RAILWAY_TARIFFS_CONFIG")]
    config: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Skip the database and keep tariffs in memory for this run.
    /// Changes made this way are lost when the command exits.
    #[arg(long)]
    memory: bool,

    /// Add the sample tariffs if the catalogue is empty. Off unless enabled
    /// here or by `seed_sample_data = true` under `[catalog]`.
    #[arg(long)]
    seed_sample_data: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show all tariffs.
    List {
        #[arg(long, value_enum)]
        sort: Option<SortArg>,
        /// Sort descending.
        #[arg(long, requires = "sort")]
        desc: bool,
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Add a tariff. The direction is trimmed; the base cost must lie in
    /// 1..=10000000.
    Add {
        direction: String,
        base_cost: f64,
        /// Discount percent (0-100).
        #[arg(short, long)]
        discount: Option<i32>,
    },
    /// Remove the tariff for a direction (case-insensitive).
    Remove { direction: String },
    /// Replace the tariff stored under OLD_DIRECTION.
    Update {
        old_direction: String,
        direction: String,
        base_cost: f64,
        #[arg(short, long)]
        discount: Option<i32>,
    },
    /// Show the direction(s) with the lowest final cost.
    Cheapest,
    /// Remove every tariff.
    Clear,
    /// Write all tariffs to a flat file.
    Export { path: PathBuf },
    /// Replace all tariffs with the contents of a flat file.
    Import { path: PathBuf },
    /// Show the active backend and paths.
    Info,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SortArg {
    Direction,
    BaseCost,
    FinalCost,
    Discount,
}

impl From<SortArg> for SortColumn {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Direction => SortColumn::Direction,
            SortArg::BaseCost => SortColumn::BaseCost,
            SortArg::FinalCost => SortColumn::FinalCost,
            SortArg::Discount => SortColumn::Discount,
        }
    }
}

fn print_table(tariffs: &[Tariff]) {
    println!(
        "{:<24} {:>12} {:>14} {:>12}",
        "Direction", "Base cost", "Discount", "Final cost"
    );
    for t in tariffs {
        println!(
            "{:<24} {:>12.2} {:>14} {:>12.2}",
            t.direction(),
            t.base_cost(),
            t.discount_label(),
            t.final_cost()
        );
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let (mut config, load_error) = match AppConfig::load(&config_path) {
        Ok(cfg) => (cfg, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    // ── Apply CLI overrides ────────────────────────────────────
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    if cli.memory {
        config.storage.use_database = false;
    }
    if cli.seed_sample_data {
        config.catalog.seed_sample_data = true;
    }

    init_tracing(&config);
    match load_error {
        None => info!("Configuration loaded from {}", config_path.display()),
        Some(e) => {
            error!("Failed to load config from {}: {}", config_path.display(), e);
            error!("Using default configuration.");
        }
    }

    match run(cli.command, &config, &config_path).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(
    command: Command,
    config: &AppConfig,
    config_path: &std::path::Path,
) -> Result<(), AppError> {
    let backend = select_repository(config).await;
    let service = TariffCatalogService::new(backend.repository.clone());

    let mutates_everything = matches!(command, Command::Clear | Command::Import { .. });
    let mutates = mutates_everything
        || matches!(
            command,
            Command::Add { .. } | Command::Remove { .. } | Command::Update { .. }
        );
    if mutates && !backend.is_persistent() {
        eprintln!(
            "Note: using the {} backend; this change will not be kept after exit.",
            backend.kind
        );
    }
    if config.catalog.seed_sample_data && !mutates_everything {
        service.seed_sample_data().await?;
    }

    match command {
        Command::List { sort, desc, json } => {
            let order = if desc {
                SortOrder::Descending
            } else {
                SortOrder::Ascending
            };
            let tariffs = service.list(sort.map(|s| (s.into(), order))).await?;
            if json {
                let json = serde_json::to_string_pretty(&tariffs)
                    .map_err(|e| InfraError::Io(e.into()))?;
                println!("{}", json);
            } else {
                print_table(&tariffs);
            }
        }
        Command::Add {
            direction,
            base_cost,
            discount,
        } => {
            service
                .add(tariff_from_input(&direction, base_cost, discount)?)
                .await?;
        }
        Command::Remove { direction } => {
            service.remove(&direction).await?;
        }
        Command::Update {
            old_direction,
            direction,
            base_cost,
            discount,
        } => {
            let tariff = tariff_from_input(&direction, base_cost, discount)?;
            service.update(&old_direction, tariff).await?;
        }
        Command::Cheapest => {
            println!("{}", service.cheapest().await?.message());
        }
        Command::Clear => {
            service.clear().await?;
        }
        Command::Export { path } => {
            let count = service.export_to_file(&path).await?;
            println!("Saved {} tariffs to {}", count, path.display());
        }
        Command::Import { path } => {
            let report = service.import_from_file(&path).await?;
            println!(
                "Loaded {} tariffs ({} duplicates skipped)",
                report.imported, report.skipped_duplicates
            );
        }
        Command::Info => {
            println!("Backend       : {}", backend.kind);
            println!("Config file   : {}", config_path.display());
            println!("Database path : {}", config.storage.database_path.display());
            println!("Error log     : {}", config.storage.error_log_path.display());
            if let Some(err) = &backend.probe_error {
                println!("Probe error   : {}", err);
            }
        }
    }

    Ok(())
}
