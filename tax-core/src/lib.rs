pub mod calculations;
pub mod db;
pub mod models;
pub mod rates;

pub use calculations::{TaxEstimateError, TaxEstimator, compute_tax};
pub use db::repository::{RepositoryError, TaxRecordRepository};
pub use models::*;
pub use rates::{TaxTable, builtin_table};
