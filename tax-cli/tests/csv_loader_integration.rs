//! Loader and batch tests against an on-disk fixture file.
//!
//! The unit tests inside csv_loader.rs use inline strings; these cover the
//! read-from-disk path and the batch command built on it.

use std::path::Path;

use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use tax_cli::{app, csv_loader};
use tax_core::{TaxRecordRepository, builtin_table};
use tax_core::db::DbConfig;

fn fixture_path() -> &'static Path {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("sample_businesses.csv")
        .leak()
}

#[test]
fn test_load_fixture_file_succeeds() {
    let rows = csv_loader::load_from_file(fixture_path()).expect("fixture file should load");

    assert_eq!(rows.len(), 4);
}

#[test]
fn test_load_fixture_first_row() {
    let rows = csv_loader::load_from_file(fixture_path()).unwrap();
    let row = &rows[0];

    assert_eq!(row.business_name, "Bratislava Bakery");
    assert_eq!(row.business_type.as_deref(), Some("retail"));
    assert_eq!(row.country, "slovakia");
    assert_eq!(row.annual_revenue, dec!(50000.00));
    assert_eq!(row.tax_year, 2025);
}

#[test]
fn test_load_fixture_normalises_country_case() {
    let rows = csv_loader::load_from_file(fixture_path()).unwrap();

    let countries: Vec<&str> = rows.iter().map(|r| r.country.as_str()).collect();
    assert_eq!(countries, vec!["slovakia", "usa", "france", "atlantis"]);
}

#[test]
fn test_load_missing_file_is_io_error() {
    let result = csv_loader::load_from_file(Path::new("/definitely/not/here.csv"));

    assert!(matches!(result, Err(csv_loader::CsvLoadError::Io { .. })));
}

#[tokio::test]
async fn test_batch_skips_unsupported_rows() {
    let report = app::batch(builtin_table(), fixture_path(), None)
        .await
        .unwrap();

    assert_eq!(report.calculated.len(), 3);
    assert_eq!(report.saved, 0);
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.rejected[0].0, 4);
    assert!(report.rejected[0].1.contains("atlantis"));

    let taxes: Vec<_> = report
        .calculated
        .iter()
        .map(|(_, result)| result.tax_amount)
        .collect();
    assert_eq!(taxes, vec![dec!(25700), dec!(25570), dec!(9564)]);
    assert!(report.render().ends_with("3 calculated, 1 rejected, 0 saved"));
}

#[tokio::test]
async fn test_batch_save_then_history_by_year() {
    let config = DbConfig {
        backend: "sqlite".to_string(),
        connection_string: ":memory:".to_string(),
    };
    let repo = app::open_repository(&config).await.unwrap();

    let report = app::batch(builtin_table(), fixture_path(), Some(repo.as_ref()))
        .await
        .unwrap();
    assert_eq!(report.saved, 3);

    let all = repo.list_records(None).await.unwrap();
    let names: Vec<&str> = all.iter().map(|r| r.business_name.as_str()).collect();
    assert_eq!(
        names,
        vec!["Lyon Bistro", "Boston Consulting Co", "Bratislava Bakery"]
    );

    let listing = app::history(repo.as_ref(), Some(2025)).await.unwrap();
    assert!(listing.ends_with("2 record(s): revenue 150000.00 tax 51270.00 profit 98730.00"));
}
