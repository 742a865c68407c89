//! Tax calculation modules.
//!
//! [`estimator`] holds the bracket walk; [`common`] the shared decimal
//! helpers.

pub mod common;
pub mod estimator;

pub use estimator::{TaxEstimateError, TaxEstimator, compute_tax};
