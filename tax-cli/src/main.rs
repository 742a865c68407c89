use std::path::PathBuf;

use anyhow::Context;
use chrono::Datelike;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::debug;

use tax_cli::app::{self, SaveRequest};
use tax_cli::config::Settings;
use tax_cli::logging;
use tax_cli::utils::parse_decimal;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Country income tax estimator.
///
/// Applies a country's marginal brackets plus its social security and
/// health insurance surcharges, and keeps a history of saved business
/// estimates.
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    /// Settings file. Defaults to `tax-estimator.toml` when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database backend to use.
    #[arg(long, global = true)]
    backend: Option<String>,

    /// Database connection string.
    /// For SQLite this is a file path (e.g. `taxes.db`) or `:memory:`.
    #[arg(long, global = true)]
    db: Option<String>,

    /// CSV rate table to use instead of the built-in rates.
    #[arg(long, global = true)]
    rates: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `tax_core=trace`.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Also append logs to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Estimate tax on one income.
    Calculate {
        /// Gross annual income, e.g. `50000` or `1,250,000.50`.
        #[arg(value_parser = parse_decimal)]
        income: Decimal,

        /// Country key. Defaults to `estimator.default_country`.
        #[arg(long)]
        country: Option<String>,

        /// Store the result as a business tax record.
        #[arg(long, requires = "business_name")]
        save: bool,

        #[arg(long)]
        business_name: Option<String>,

        #[arg(long)]
        business_type: Option<String>,

        /// Defaults to the current year.
        #[arg(long)]
        tax_year: Option<i32>,
    },

    /// List the countries in the active rate table.
    Countries,

    /// Estimate every business in a CSV file.
    Batch {
        file: PathBuf,

        /// Store every calculated row.
        #[arg(long)]
        save: bool,
    },

    /// Show saved records, newest first, with totals.
    History {
        #[arg(long)]
        year: Option<i32>,
    },

    /// Delete a saved record.
    Delete { id: i64 },
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Start with the flag (or default) level so settings loading is logged,
    // then switch to the configured level.
    logging::init_logging(cli.log_level.as_deref().unwrap_or("info"));

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(backend) = cli.backend {
        settings.database.backend = backend;
    }
    if let Some(db) = cli.db {
        settings.database.connection_string = db;
    }
    if let Some(rates) = cli.rates {
        settings.estimator.rates_file = Some(rates);
    }
    if let Some(level) = cli.log_level {
        settings.logging.level = level;
    }
    if let Some(file) = cli.log_file {
        settings.logging.file = Some(file);
    }

    logging::set_log_level(&settings.logging.level)?;
    if let Some(file) = &settings.logging.file {
        logging::enable_file_logging(file)?;
    }
    debug!(?settings, "settings resolved");

    let table = app::load_rate_table(settings.estimator.rates_file.as_deref())?;

    match cli.command {
        Command::Calculate {
            income,
            country,
            save,
            business_name,
            business_type,
            tax_year,
        } => {
            let country = country.unwrap_or_else(|| settings.estimator.default_country.clone());
            let output = if save {
                let request = SaveRequest {
                    business_name: business_name.context("--save needs --business-name")?,
                    business_type,
                    tax_year: tax_year.unwrap_or_else(|| chrono::Local::now().year()),
                };
                let repo = app::open_repository(&settings.db_config()).await?;
                app::calculate(&table, income, &country, Some((&request, repo.as_ref()))).await?
            } else {
                app::calculate(&table, income, &country, None).await?
            };
            println!("{output}");
        }
        Command::Countries => print!("{}", app::countries(&table)),
        Command::Batch { file, save } => {
            let repo = if save {
                Some(app::open_repository(&settings.db_config()).await?)
            } else {
                None
            };
            let report = app::batch(&table, &file, repo.as_deref()).await?;
            println!("{}", report.render());
        }
        Command::History { year } => {
            let repo = app::open_repository(&settings.db_config()).await?;
            println!("{}", app::history(repo.as_ref(), year).await?);
        }
        Command::Delete { id } => {
            let repo = app::open_repository(&settings.db_config()).await?;
            println!("{}", app::delete(repo.as_ref(), id).await?);
        }
    }

    debug!("done");
    Ok(())
}
