//! Command implementations behind the `tax-estimator` binary.
//!
//! Each command returns its output as a `String` so `main` only prints, and
//! tests can drive commands against an in-memory repository.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use rust_decimal::Decimal;
use tax_core::calculations::common::round_half_up;
use tax_core::db::{DbConfig, RepositoryRegistry};
use tax_core::{
    BusinessTaxRecord, NewBusinessTaxRecord, TaxEstimateError, TaxEstimator, TaxHistorySummary,
    TaxRecordRepository, TaxResult, TaxTable, builtin_table,
};
use tax_data::RateTableLoader;
use tax_db_sqlite::SqliteRepositoryFactory;
use tracing::{info, warn};

use crate::csv_loader::{self, BusinessInput};
use crate::utils::{normalize_country_key, opt_display};

/// Every storage backend this binary was built with.
pub fn build_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(SqliteRepositoryFactory));
    registry
}

pub async fn open_repository(config: &DbConfig) -> Result<Box<dyn TaxRecordRepository>> {
    build_registry()
        .create(config)
        .await
        .with_context(|| {
            format!(
                "Failed to open {} database '{}'",
                config.backend, config.connection_string
            )
        })
}

/// The rate table for this run: the CSV at `rates_file`, or the built-in one.
pub fn load_rate_table(rates_file: Option<&Path>) -> Result<TaxTable> {
    match rates_file {
        Some(path) => RateTableLoader::load_file(path)
            .with_context(|| format!("Failed to load rate table: {}", path.display())),
        None => Ok(builtin_table().clone()),
    }
}

/// Runs the estimator on user input.
///
/// The key is normalised first. An unsupported country becomes a message
/// listing the supported keys; no fallback rate is ever applied.
pub fn estimate(
    table: &TaxTable,
    income: Decimal,
    country: &str,
) -> Result<TaxResult> {
    let key = normalize_country_key(country);
    TaxEstimator::new(table)
        .calculate(income, &key)
        .map_err(|e| match e {
            TaxEstimateError::UnknownCountry(_) => {
                anyhow!("{e}; supported countries: {}", table.keys().join(", "))
            }
            other => other.into(),
        })
}

/// Business metadata attached when a calculation is saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    pub business_name: String,
    pub business_type: Option<String>,
    pub tax_year: i32,
}

/// `calculate`: print the breakdown, optionally persisting it.
pub async fn calculate(
    table: &TaxTable,
    income: Decimal,
    country: &str,
    save: Option<(&SaveRequest, &dyn TaxRecordRepository)>,
) -> Result<String> {
    let result = estimate(table, income, country)?;
    let mut out = result.to_string();

    if let Some((request, repo)) = save {
        let record = repo
            .create_record(NewBusinessTaxRecord::from_result(
                request.business_name.clone(),
                request.business_type.clone(),
                normalize_country_key(country),
                request.tax_year,
                &result,
            ))
            .await
            .context("Failed to save tax record")?;
        info!(id = record.id, business = %record.business_name, "tax record saved");
        write!(out, "\nSaved as record #{}", record.id)?;
    }

    Ok(out)
}

/// `countries`: one line per country in the active table.
pub fn countries(table: &TaxTable) -> String {
    let mut out = String::new();
    for (key, rates) in table.countries() {
        let brackets = rates
            .brackets
            .iter()
            .map(|b| match b.max_income {
                Some(max) => format!("{}-{}: {}%", b.min_income, max, b.rate),
                None => format!("{}+: {}%", b.min_income, b.rate),
            })
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(
            out,
            "{key:<10} {:<16} brackets [{brackets}] social security {} health insurance {}",
            rates.name,
            opt_display(rates.social_security.map(|p| format!("{p}%"))),
            opt_display(rates.health_insurance.map(|p| format!("{p}%"))),
        );
    }
    out
}

/// Outcome of a `batch` run.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub calculated: Vec<(BusinessInput, TaxResult)>,
    /// `(row, message)` for rows the estimator rejected.
    pub rejected: Vec<(usize, String)>,
    pub saved: usize,
}

impl BatchReport {
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (input, result) in &self.calculated {
            let _ = writeln!(
                out,
                "{:<28} {:<14} {:>14.2} tax {:>14.2} net {:>14.2} ({:.2}%)",
                input.business_name,
                result.country,
                round_half_up(result.gross_income),
                round_half_up(result.tax_amount),
                round_half_up(result.net_income),
                round_half_up(result.tax_rate),
            );
        }
        for (row, message) in &self.rejected {
            let _ = writeln!(out, "row {row}: {message}");
        }
        let _ = write!(
            out,
            "{} calculated, {} rejected, {} saved",
            self.calculated.len(),
            self.rejected.len(),
            self.saved
        );
        out
    }
}

/// `batch`: estimate every row of a business CSV.
///
/// Rows with an unsupported country are reported and skipped; the rest are
/// still calculated (and saved when `repo` is given).
///
/// Each row is saved on its own. If a save fails, rows saved before it stay
/// committed and the error says how many there were.
pub async fn batch(
    table: &TaxTable,
    path: &Path,
    repo: Option<&dyn TaxRecordRepository>,
) -> Result<BatchReport> {
    let inputs = csv_loader::load_from_file(path)
        .with_context(|| format!("Failed to read batch file: {}", path.display()))?;

    let mut report = BatchReport::default();
    for (idx, input) in inputs.into_iter().enumerate() {
        let result = match estimate(table, input.annual_revenue, &input.country) {
            Ok(result) => result,
            Err(e) => {
                warn!(row = idx + 1, error = %e, "batch row rejected");
                report.rejected.push((idx + 1, e.to_string()));
                continue;
            }
        };

        if let Some(repo) = repo {
            repo.create_record(NewBusinessTaxRecord::from_result(
                input.business_name.clone(),
                input.business_type.clone(),
                input.country.clone(),
                input.tax_year,
                &result,
            ))
            .await
            .with_context(|| {
                format!(
                    "Failed to save row {}; {} earlier row(s) already saved",
                    idx + 1,
                    report.saved
                )
            })?;
            report.saved += 1;
        }
        report.calculated.push((input, result));
    }

    info!(
        calculated = report.calculated.len(),
        rejected = report.rejected.len(),
        saved = report.saved,
        "batch finished"
    );
    Ok(report)
}

fn render_record(record: &BusinessTaxRecord) -> String {
    format!(
        "#{:<4} {} {:<28} {:<14} {:<10} revenue {:>14.2} tax {:>14.2} profit {:>14.2} ({:.2}%)",
        record.id,
        record.tax_year,
        record.business_name,
        opt_display(record.business_type.as_deref()),
        record.country,
        round_half_up(record.annual_revenue),
        round_half_up(record.calculated_tax),
        round_half_up(record.profit_loss),
        round_half_up(record.tax_rate),
    )
}

fn render_summary(summary: &TaxHistorySummary) -> String {
    format!(
        "{} record(s): revenue {:.2} tax {:.2} profit {:.2}",
        summary.record_count,
        round_half_up(summary.total_revenue),
        round_half_up(summary.total_tax),
        round_half_up(summary.total_profit),
    )
}

/// `history`: saved records newest first, then totals.
pub async fn history(
    repo: &dyn TaxRecordRepository,
    tax_year: Option<i32>,
) -> Result<String> {
    let records = repo
        .list_records(tax_year)
        .await
        .context("Failed to list tax records")?;

    let mut out = String::new();
    for record in &records {
        writeln!(out, "{}", render_record(record))?;
    }
    let summary = TaxHistorySummary::from_records(&records)
        .context("History totals are too large to add up")?;
    out.push_str(&render_summary(&summary));
    Ok(out)
}

/// `delete`: remove one saved record.
pub async fn delete(
    repo: &dyn TaxRecordRepository,
    id: i64,
) -> Result<String> {
    repo.delete_record(id)
        .await
        .with_context(|| format!("Failed to delete record #{id}"))?;
    info!(id, "tax record deleted");
    Ok(format!("Deleted record #{id}"))
}
