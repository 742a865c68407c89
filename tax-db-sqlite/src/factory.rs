use async_trait::async_trait;
use tax_core::db::{DbConfig, RepositoryFactory};
use tax_core::{RepositoryError, TaxRecordRepository};

use crate::repository::SqliteRepository;

/// Turns a [`DbConfig::connection_string`] into a sqlx URL.
///
/// * `:memory:` becomes `sqlite::memory:`.
/// * Values already starting with `sqlite:` pass through unchanged.
/// * Anything else is a file path, created if missing.
fn connection_url(connection_string: &str) -> String {
    let trimmed = connection_string.trim();
    if trimmed == ":memory:" {
        "sqlite::memory:".to_string()
    } else if trimmed.starts_with("sqlite:") {
        trimmed.to_string()
    } else {
        format!("sqlite:{trimmed}?mode=rwc")
    }
}

/// [`RepositoryFactory`] for SQLite.
///
/// ```rust,no_run
/// use tax_core::db::RepositoryRegistry;
/// use tax_db_sqlite::SqliteRepositoryFactory;
///
/// let mut registry = RepositoryRegistry::new();
/// registry.register(Box::new(SqliteRepositoryFactory));
/// ```
pub struct SqliteRepositoryFactory;

#[async_trait]
impl RepositoryFactory for SqliteRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn TaxRecordRepository>, RepositoryError> {
        let repo = SqliteRepository::new(&connection_url(&config.connection_string)).await?;
        repo.run_migrations().await?;
        Ok(Box::new(repo))
    }
}
