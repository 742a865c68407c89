use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde::Deserialize;
use tax_core::{CountryRates, RateTableError, TaxBracket, TaxTable};
use thiserror::Error;
use tracing::{debug, info};

static COUNTRY_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z][a-z0-9_-]*$").expect("country key pattern is valid")
});

/// Errors that can occur when loading a rate table.
#[derive(Debug, Error)]
pub enum RateTableLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Cannot read rate file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid country key '{0}' (expected lowercase letters, digits, '-' or '_')")]
    InvalidCountryKey(String),

    #[error("Country '{country}' has conflicting {field} values across rows")]
    ConflictingField {
        country: String,
        field: &'static str,
    },

    #[error("Invalid rates: {0}")]
    InvalidRates(#[from] RateTableError),
}

impl From<csv::Error> for RateTableLoaderError {
    fn from(err: csv::Error) -> Self {
        RateTableLoaderError::CsvParse(err.to_string())
    }
}

/// One bracket row of a rate file.
///
/// - `country`: table key, e.g. `slovakia`
/// - `name`: display name, e.g. `Slovakia`
/// - `min_income` / `max_income`: bracket bounds (empty max for unlimited)
/// - `rate`: marginal rate in percent (e.g. `24` for 24%)
/// - `social_security` / `health_insurance`: flat percent of gross income,
///   empty for none; must repeat identically on every row of the country
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RateRecord {
    pub country: String,
    pub name: String,
    pub min_income: Decimal,
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub max_income: Option<Decimal>,
    pub rate: Decimal,
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub social_security: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub health_insurance: Option<Decimal>,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Builds a [`TaxTable`] from CSV rate files.
///
/// ```csv
/// country,name,min_income,max_income,rate,social_security,health_insurance
/// slovakia,Slovakia,0,,24,13.4,14
/// usa,United States,0,,25.57,,
/// ```
pub struct RateTableLoader;

impl RateTableLoader {
    /// Parse rate rows from any reader.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<RateRecord>, RateTableLoaderError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: RateRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Group rows by country and build a validated table.
    ///
    /// Rows of one country may appear in any order; they are sorted by
    /// `min_income` before validation.
    pub fn build(records: &[RateRecord]) -> Result<TaxTable, RateTableLoaderError> {
        let mut groups: BTreeMap<&str, Vec<&RateRecord>> = BTreeMap::new();
        for record in records {
            if !COUNTRY_KEY.is_match(&record.country) {
                return Err(RateTableLoaderError::InvalidCountryKey(
                    record.country.clone(),
                ));
            }
            groups.entry(record.country.as_str()).or_default().push(record);
        }

        let mut table = TaxTable::new();
        for (country, mut rows) in groups {
            rows.sort_by(|a, b| a.min_income.cmp(&b.min_income));
            let rates = Self::country_rates(country, &rows)?;
            debug!(country, brackets = rates.brackets.len(), "rate table entry built");
            table.insert(country, rates)?;
        }

        Ok(table)
    }

    /// Read, parse and build a table from a CSV file.
    pub fn load_file(path: &Path) -> Result<TaxTable, RateTableLoaderError> {
        let file = File::open(path).map_err(|source| RateTableLoaderError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let records = Self::parse(file)?;
        let table = Self::build(&records)?;
        info!(
            path = %path.display(),
            countries = table.len(),
            "rate table loaded"
        );
        Ok(table)
    }

    fn country_rates(
        country: &str,
        rows: &[&RateRecord],
    ) -> Result<CountryRates, RateTableLoaderError> {
        let first = rows[0];
        let conflict = |field| RateTableLoaderError::ConflictingField {
            country: country.to_string(),
            field,
        };

        for row in &rows[1..] {
            if row.name != first.name {
                return Err(conflict("name"));
            }
            if row.social_security != first.social_security {
                return Err(conflict("social_security"));
            }
            if row.health_insurance != first.health_insurance {
                return Err(conflict("health_insurance"));
            }
        }

        Ok(CountryRates {
            name: first.name.clone(),
            brackets: rows
                .iter()
                .map(|r| TaxBracket::new(r.min_income, r.max_income, r.rate))
                .collect(),
            social_security: first.social_security,
            health_insurance: first.health_insurance,
        })
    }
}
