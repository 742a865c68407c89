//! Country rate tables.
//!
//! A [`TaxTable`] maps a lowercase country key (`"slovakia"`, `"usa"`, ...)
//! to that country's [`CountryRates`]. Tables are built once, validated on
//! insert, and only read afterwards, so a shared reference can be handed to
//! any number of concurrent callers.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use rust_decimal::Decimal;

use crate::models::{CountryRates, RateTableError};

static BUILTIN: LazyLock<TaxTable> = LazyLock::new(TaxTable::builtin);

/// The process-wide built-in table, constructed on first use.
pub fn builtin_table() -> &'static TaxTable {
    &BUILTIN
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaxTable {
    countries: BTreeMap<String, CountryRates>,
}

impl TaxTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The five countries the estimator ships with.
    ///
    /// | key        | bracket | social security | health insurance |
    /// |------------|---------|-----------------|------------------|
    /// | `slovakia` | 24      | 13.4            | 14               |
    /// | `usa`      | 25.57   | -               | -                |
    /// | `uk`       | 25      | -               | -                |
    /// | `germany`  | 30.06   | 18.6            | 14.6             |
    /// | `france`   | 25.82   | 22              | -                |
    pub fn builtin() -> Self {
        let entries = [
            (
                "slovakia",
                CountryRates::flat("Slovakia", Decimal::new(24, 0))
                    .with_social_security(Decimal::new(134, 1))
                    .with_health_insurance(Decimal::new(14, 0)),
            ),
            (
                "usa",
                CountryRates::flat("United States", Decimal::new(2557, 2)),
            ),
            (
                "uk",
                CountryRates::flat("United Kingdom", Decimal::new(25, 0)),
            ),
            (
                "germany",
                CountryRates::flat("Germany", Decimal::new(3006, 2))
                    .with_social_security(Decimal::new(186, 1))
                    .with_health_insurance(Decimal::new(146, 1)),
            ),
            (
                "france",
                CountryRates::flat("France", Decimal::new(2582, 2))
                    .with_social_security(Decimal::new(22, 0)),
            ),
        ];

        Self {
            countries: entries
                .into_iter()
                .map(|(key, rates)| (key.to_string(), rates))
                .collect(),
        }
    }

    /// Add or replace a country after validating its brackets.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        rates: CountryRates,
    ) -> Result<(), RateTableError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(RateTableError::EmptyKey);
        }
        rates.validate()?;
        self.countries.insert(key, rates);
        Ok(())
    }

    pub fn get(
        &self,
        key: &str,
    ) -> Option<&CountryRates> {
        self.countries.get(key)
    }

    pub fn contains(
        &self,
        key: &str,
    ) -> bool {
        self.countries.contains_key(key)
    }

    /// Every `(key, rates)` pair, sorted by key.
    pub fn countries(&self) -> impl Iterator<Item = (&str, &CountryRates)> {
        self.countries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Country keys, sorted.
    pub fn keys(&self) -> Vec<&str> {
        self.countries.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::TaxBracket;

    #[test]
    fn builtin_has_the_five_supported_countries() {
        let table = TaxTable::builtin();

        assert_eq!(
            table.keys(),
            vec!["france", "germany", "slovakia", "uk", "usa"]
        );
    }

    #[test]
    fn builtin_countries_are_valid() {
        for (key, rates) in TaxTable::builtin().countries() {
            assert_eq!(rates.validate(), Ok(()), "{key} failed validation");
        }
    }

    #[test]
    fn builtin_slovakia_rates() {
        let table = TaxTable::builtin();
        let slovakia = table.get("slovakia").unwrap();

        assert_eq!(slovakia.name, "Slovakia");
        assert_eq!(slovakia.brackets, vec![TaxBracket::flat(dec!(24))]);
        assert_eq!(slovakia.social_security, Some(dec!(13.4)));
        assert_eq!(slovakia.health_insurance, Some(dec!(14)));
    }

    #[test]
    fn builtin_france_has_no_health_insurance() {
        let table = TaxTable::builtin();
        let france = table.get("france").unwrap();

        assert_eq!(france.social_security, Some(dec!(22)));
        assert_eq!(france.health_insurance, None);
    }

    #[test]
    fn builtin_table_is_shared() {
        assert!(std::ptr::eq(builtin_table(), builtin_table()));
        assert_eq!(builtin_table(), &TaxTable::builtin());
    }

    #[test]
    fn unknown_key_is_absent() {
        let table = TaxTable::builtin();

        assert!(table.get("atlantis").is_none());
        assert!(!table.contains("atlantis"));
    }

    #[test]
    fn insert_adds_valid_country() {
        let mut table = TaxTable::new();
        assert!(table.is_empty());

        table
            .insert("austria", CountryRates::flat("Austria", dec!(30)))
            .unwrap();

        assert_eq!(table.len(), 1);
        assert!(table.contains("austria"));
    }

    #[test]
    fn insert_rejects_invalid_country() {
        let mut table = TaxTable::new();
        let mut rates = CountryRates::flat("Broken", dec!(10));
        rates.brackets.clear();

        let result = table.insert("broken", rates);

        assert_eq!(result, Err(RateTableError::NoBrackets("Broken".to_string())));
        assert!(table.is_empty());
    }

    #[test]
    fn insert_rejects_blank_key() {
        let mut table = TaxTable::new();

        assert_eq!(
            table.insert("  ", CountryRates::flat("Blank", dec!(10))),
            Err(RateTableError::EmptyKey)
        );
    }
}
