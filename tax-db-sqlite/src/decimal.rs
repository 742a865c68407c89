use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, TypeInfo, ValueRef};
use tax_core::RepositoryError;

/// Reads a money or percentage column.
///
/// Values are written as TEXT so they round-trip exactly, but INTEGER and
/// REAL cells (hand-edited rows, older files) are accepted too.
pub fn get_decimal(
    row: &SqliteRow,
    column: &str,
) -> Result<Decimal, RepositoryError> {
    let value_ref = row
        .try_get_raw(column)
        .map_err(|e| RepositoryError::Database(format!("Column '{column}' not found: {e}")))?;

    let type_name = value_ref.type_info().name().to_string();

    match type_name.as_str() {
        "TEXT" => {
            let text: String = row.try_get(column).map_err(|e| {
                RepositoryError::Database(format!("Failed to get TEXT from '{column}': {e}"))
            })?;
            parse_decimal(&text)
        }
        "INTEGER" => {
            let val: i64 = row.try_get(column).map_err(|e| {
                RepositoryError::Database(format!("Failed to get INTEGER from '{column}': {e}"))
            })?;
            Ok(Decimal::from(val))
        }
        "REAL" => {
            let val: f64 = row.try_get(column).map_err(|e| {
                RepositoryError::Database(format!("Failed to get REAL from '{column}': {e}"))
            })?;
            Decimal::try_from(val).map_err(|e| {
                RepositoryError::Database(format!("Failed to convert {val} to Decimal: {e}"))
            })
        }
        "NULL" => Err(RepositoryError::Database(format!(
            "Column '{column}' is NULL"
        ))),
        other => Err(RepositoryError::Database(format!(
            "Unexpected type '{other}' for column '{column}'"
        ))),
    }
}

/// Storage form of a decimal: its exact string representation.
pub fn decimal_to_text(d: Decimal) -> String {
    d.normalize().to_string()
}

fn parse_decimal(s: &str) -> Result<Decimal, RepositoryError> {
    s.trim()
        .parse::<Decimal>()
        .map_err(|e| RepositoryError::Database(format!("Failed to parse decimal '{s}': {e}")))
}
