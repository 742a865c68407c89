use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tax_core::{BusinessTaxRecord, NewBusinessTaxRecord, RepositoryError, TaxRecordRepository};
use tracing::{debug, info};

use crate::decimal::{decimal_to_text, get_decimal};

const SELECT_RECORD: &str = "SELECT id, business_name, business_type, country, annual_revenue,
        tax_year, tax_rate, calculated_tax, profit_loss, created_at, updated_at
 FROM business_tax_records";

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Connect to a sqlx SQLite URL such as `sqlite:taxes.db?mode=rwc` or
    /// `sqlite::memory:`.
    ///
    /// An in-memory database lives only as long as its connection, so it is
    /// opened with exactly one connection that is never recycled.
    pub async fn new(database_url: &str) -> Result<Self, RepositoryError> {
        let options = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
        };

        let pool = options
            .connect(database_url)
            .await
            .map_err(|e| RepositoryError::Connection(format!("{database_url}: {e}")))?;
        debug!(url = database_url, "connected to sqlite");
        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<(), RepositoryError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(format!("Failed to run migrations: {e}")))?;
        info!("database migrations applied");
        Ok(())
    }
}

fn database_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Database(e.to_string())
}

fn row_to_record(row: &SqliteRow) -> Result<BusinessTaxRecord, RepositoryError> {
    Ok(BusinessTaxRecord {
        id: row.try_get("id").map_err(database_error)?,
        business_name: row.try_get("business_name").map_err(database_error)?,
        business_type: row.try_get("business_type").map_err(database_error)?,
        country: row.try_get("country").map_err(database_error)?,
        annual_revenue: get_decimal(row, "annual_revenue")?,
        tax_year: row.try_get("tax_year").map_err(database_error)?,
        tax_rate: get_decimal(row, "tax_rate")?,
        calculated_tax: get_decimal(row, "calculated_tax")?,
        profit_loss: get_decimal(row, "profit_loss")?,
        created_at: row
            .try_get::<DateTime<Utc>, _>("created_at")
            .map_err(|e| RepositoryError::Database(format!("Failed to get created_at: {e}")))?,
        updated_at: row
            .try_get::<DateTime<Utc>, _>("updated_at")
            .map_err(|e| RepositoryError::Database(format!("Failed to get updated_at: {e}")))?,
    })
}

#[async_trait]
impl TaxRecordRepository for SqliteRepository {
    async fn create_record(
        &self,
        record: NewBusinessTaxRecord,
    ) -> Result<BusinessTaxRecord, RepositoryError> {
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO business_tax_records (
                business_name, business_type, country, annual_revenue, tax_year,
                tax_rate, calculated_tax, profit_loss, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.business_name)
        .bind(&record.business_type)
        .bind(&record.country)
        .bind(decimal_to_text(record.annual_revenue))
        .bind(record.tax_year)
        .bind(decimal_to_text(record.tax_rate))
        .bind(decimal_to_text(record.calculated_tax))
        .bind(decimal_to_text(record.profit_loss))
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        let id = result.last_insert_rowid();
        debug!(id, business = %record.business_name, "tax record created");
        self.get_record(id).await
    }

    async fn get_record(&self, id: i64) -> Result<BusinessTaxRecord, RepositoryError> {
        let row = sqlx::query(&format!("{SELECT_RECORD} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?
            .ok_or(RepositoryError::NotFound)?;

        row_to_record(&row)
    }

    async fn delete_record(&self, id: i64) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM business_tax_records WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        debug!(id, "tax record deleted");
        Ok(())
    }

    async fn list_records(
        &self,
        tax_year: Option<i32>,
    ) -> Result<Vec<BusinessTaxRecord>, RepositoryError> {
        let rows = match tax_year {
            Some(year) => {
                sqlx::query(&format!(
                    "{SELECT_RECORD} WHERE tax_year = ? ORDER BY id DESC"
                ))
                .bind(year)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(&format!("{SELECT_RECORD} ORDER BY id DESC"))
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(database_error)?;

        rows.iter().map(row_to_record).collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use tax_core::compute_tax;

    use super::*;

    async fn setup_test_repo() -> SqliteRepository {
        let repo = SqliteRepository::new("sqlite::memory:")
            .await
            .expect("Failed to open in-memory database");
        repo.run_migrations()
            .await
            .expect("Failed to run migrations");
        repo
    }

    fn new_record(
        name: &str,
        country: &str,
        revenue: rust_decimal::Decimal,
        tax_year: i32,
    ) -> NewBusinessTaxRecord {
        let result = compute_tax(revenue, country).expect("supported country");
        NewBusinessTaxRecord::from_result(name, None, country, tax_year, &result)
    }

    #[tokio::test]
    async fn create_then_get_returns_same_values() {
        let repo = setup_test_repo().await;
        let mut new = new_record("Bratislava Bakery", "slovakia", dec!(50000), 2025);
        new.business_type = Some("retail".to_string());

        let created = repo.create_record(new).await.unwrap();
        let fetched = repo.get_record(created.id).await.unwrap();

        assert_eq!(fetched, created);
        assert_eq!(fetched.business_name, "Bratislava Bakery");
        assert_eq!(fetched.business_type.as_deref(), Some("retail"));
        assert_eq!(fetched.country, "slovakia");
        assert_eq!(fetched.annual_revenue, dec!(50000));
        assert_eq!(fetched.calculated_tax, dec!(25700));
        assert_eq!(fetched.profit_loss, dec!(24300));
        assert_eq!(fetched.tax_rate, dec!(51.4));
        assert_eq!(fetched.tax_year, 2025);
    }

    #[tokio::test]
    async fn fractional_amounts_survive_storage() {
        let repo = setup_test_repo().await;

        let created = repo
            .create_record(new_record("Corner Shop", "usa", dec!(12345.67), 2024))
            .await
            .unwrap();

        // 12345.67 × 25.57%
        assert_eq!(created.calculated_tax, dec!(3156.787819));
        assert_eq!(created.annual_revenue, dec!(12345.67));
    }

    #[tokio::test]
    async fn get_missing_record_is_not_found() {
        let repo = setup_test_repo().await;

        assert_eq!(repo.get_record(42).await, Err(RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn delete_removes_record() {
        let repo = setup_test_repo().await;
        let created = repo
            .create_record(new_record("Gone Soon", "uk", dec!(1000), 2025))
            .await
            .unwrap();

        repo.delete_record(created.id).await.unwrap();

        assert_eq!(repo.get_record(created.id).await, Err(RepositoryError::NotFound));
        assert_eq!(repo.delete_record(created.id).await, Err(RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn list_is_newest_first_and_filters_by_year() {
        let repo = setup_test_repo().await;
        let first = repo
            .create_record(new_record("First", "germany", dec!(10000), 2024))
            .await
            .unwrap();
        let second = repo
            .create_record(new_record("Second", "france", dec!(20000), 2025))
            .await
            .unwrap();
        let third = repo
            .create_record(new_record("Third", "usa", dec!(30000), 2025))
            .await
            .unwrap();

        let all: Vec<i64> = repo
            .list_records(None)
            .await
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(all, vec![third.id, second.id, first.id]);

        let only_2025: Vec<i64> = repo
            .list_records(Some(2025))
            .await
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(only_2025, vec![third.id, second.id]);

        assert!(repo.list_records(Some(1999)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let repo = setup_test_repo().await;

        repo.run_migrations().await.unwrap();
    }
}
