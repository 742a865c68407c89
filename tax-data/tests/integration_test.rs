//! Rate files on disk driving the estimator end to end.

use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tax_core::{TaxEstimateError, TaxEstimator, TaxTable};
use tax_data::RateTableLoader;

fn fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("test-data")
        .join("rates.csv")
}

fn load() -> TaxTable {
    RateTableLoader::load_file(&fixture()).expect("fixture rate file should load")
}

#[test]
fn fixture_defines_builtin_countries_plus_austria() {
    let table = load();

    assert_eq!(
        table.keys(),
        vec!["austria", "france", "germany", "slovakia", "uk", "usa"]
    );
}

#[test]
fn fixture_matches_builtin_rates_for_shared_countries() {
    let table = load();
    let builtin = TaxTable::builtin();

    for (key, rates) in builtin.countries() {
        assert_eq!(table.get(key), Some(rates), "{key} differs from built-in");
    }
}

#[test]
fn loaded_table_gives_same_answers_as_builtin() {
    let table = load();
    let estimator = TaxEstimator::new(&table);

    let slovakia = estimator.calculate(dec!(50000), "slovakia").unwrap();
    assert_eq!(slovakia.tax_amount, dec!(25700));
    assert_eq!(slovakia.tax_rate, dec!(51.4));

    let usa = estimator.calculate(dec!(100000), "usa").unwrap();
    assert_eq!(usa.net_income, dec!(74430));
}

#[test]
fn austria_is_taxed_progressively() {
    let table = load();
    let estimator = TaxEstimator::new(&table);

    // 0 on the first 12816, 20% of 8002, 30% of 13695, 40% of 15487
    let result = estimator.calculate(dec!(50000), "austria").unwrap();

    assert_eq!(result.tax_amount, dec!(11903.70));
    assert_eq!(result.net_income, dec!(38096.30));
    assert_eq!(result.country, "Austria");
}

#[test]
fn austria_below_allowance_owes_nothing() {
    let table = load();
    let estimator = TaxEstimator::new(&table);

    let result = estimator.calculate(dec!(12000), "austria").unwrap();

    assert_eq!(result.tax_amount, Decimal::ZERO);
    assert_eq!(result.tax_rate, Decimal::ZERO);
}

#[test]
fn loaded_table_still_rejects_unknown_country() {
    let table = load();
    let estimator = TaxEstimator::new(&table);

    assert_eq!(
        estimator.calculate(dec!(1), "atlantis"),
        Err(TaxEstimateError::UnknownCountry("atlantis".to_string()))
    );
}
