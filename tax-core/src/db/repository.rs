use async_trait::async_trait;
use thiserror::Error;

use crate::models::{BusinessTaxRecord, NewBusinessTaxRecord};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Storage for saved business tax calculations.
#[async_trait]
pub trait TaxRecordRepository: Send + Sync {
    async fn create_record(
        &self,
        record: NewBusinessTaxRecord,
    ) -> Result<BusinessTaxRecord, RepositoryError>;

    async fn get_record(&self, id: i64) -> Result<BusinessTaxRecord, RepositoryError>;

    async fn delete_record(&self, id: i64) -> Result<(), RepositoryError>;

    /// Records newest first, optionally limited to one tax year.
    async fn list_records(
        &self,
        tax_year: Option<i32>,
    ) -> Result<Vec<BusinessTaxRecord>, RepositoryError>;
}
