//! Rate tables loaded from data files instead of code.

mod loader;

pub use loader::{RateRecord, RateTableLoader, RateTableLoaderError};
