//! CSV loader for batch business tax input.
//!
//! ## CSV Format
//!
//! Column order does **not** matter (headers are matched by name). Header
//! names are case-sensitive.
//!
//! | Column           | Required | Type    | Notes                                   |
//! |------------------|----------|---------|-----------------------------------------|
//! | `business_name`  | yes      | string  | must not be blank                       |
//! | `business_type`  | no       | string  | leave empty for none                    |
//! | `country`        | yes      | string  | rate table key, case-insensitive        |
//! | `annual_revenue` | yes      | decimal | gross income, must not be negative      |
//! | `tax_year`       | yes      | integer | e.g. `2025`                             |
//!
//! ### Example
//!
//! ```csv
//! business_name,business_type,country,annual_revenue,tax_year
//! Bratislava Bakery,retail,slovakia,50000.00,2025
//! Boston Consulting Co,,USA,100000,2025
//! ```
//!
//! Whether a country is supported is decided by the estimator, not here.
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::utils::normalize_country_key;

#[derive(Debug, Deserialize)]
struct CsvRow {
    business_name: String,
    business_type: Option<String>,
    country: String,
    annual_revenue: Decimal,
    tax_year: i32,
}

/// One business to estimate, as read from the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusinessInput {
    pub business_name: String,
    pub business_type: Option<String>,
    /// Normalised (trimmed, lowercase) country key.
    pub country: String,
    pub annual_revenue: Decimal,
    pub tax_year: i32,
}

/// Errors that can occur while loading batch input.
#[derive(Debug, thiserror::Error)]
pub enum CsvLoadError {
    /// Bad structure, missing required column, or type mismatch.
    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),

    #[error("cannot read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// `row` is 1-based, header excluded.
    #[error("missing business name on row {row}")]
    MissingBusinessName { row: usize },

    #[error("negative annual revenue {revenue} on row {row}")]
    NegativeRevenue { revenue: Decimal, row: usize },
}

fn convert_row(
    row: CsvRow,
    row_number: usize,
) -> Result<BusinessInput, CsvLoadError> {
    let business_name = row.business_name.trim().to_string();
    if business_name.is_empty() {
        return Err(CsvLoadError::MissingBusinessName { row: row_number });
    }
    if row.annual_revenue < Decimal::ZERO {
        return Err(CsvLoadError::NegativeRevenue {
            revenue: row.annual_revenue,
            row: row_number,
        });
    }

    Ok(BusinessInput {
        business_name,
        business_type: row
            .business_type
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty()),
        country: normalize_country_key(&row.country),
        annual_revenue: row.annual_revenue,
        tax_year: row.tax_year,
    })
}

/// Parse CSV text and return the rows in file order.
pub fn load_from_str(input: &str) -> Result<Vec<BusinessInput>, CsvLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(input.as_bytes());

    reader
        .deserialize::<CsvRow>()
        .enumerate()
        .map(|(idx, result)| convert_row(result?, idx + 1))
        .collect()
}

/// Read a file from disk and delegate to [`load_from_str`].
pub fn load_from_file(path: &Path) -> Result<Vec<BusinessInput>, CsvLoadError> {
    let contents = std::fs::read_to_string(path).map_err(|source| CsvLoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    load_from_str(&contents)
}
