use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tax_data::RateTableLoader;

/// Validate a country rate CSV and print what it defines.
///
/// The CSV file should have the following columns:
/// - country: table key (lowercase, e.g. slovakia)
/// - name: display name
/// - min_income: bracket lower bound
/// - max_income: bracket upper bound (empty for unlimited)
/// - rate: marginal rate in percent
/// - social_security: flat percent of gross income (empty for none)
/// - health_insurance: flat percent of gross income (empty for none)
#[derive(Parser, Debug)]
#[command(name = "tax-rates-check")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the rate CSV file
    #[arg(short, long)]
    file: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let table = RateTableLoader::load_file(&args.file)
        .with_context(|| format!("Invalid rate file: {}", args.file.display()))?;

    println!("{} countries in {}", table.len(), args.file.display());
    for (key, rates) in table.countries() {
        println!(
            "  {key:<12} {:<20} {} bracket(s), social security {}, health insurance {}",
            rates.name,
            rates.brackets.len(),
            rates
                .social_security
                .map_or_else(|| "-".to_string(), |p| format!("{p}%")),
            rates
                .health_insurance
                .map_or_else(|| "-".to_string(), |p| format!("{p}%")),
        );
    }

    Ok(())
}
