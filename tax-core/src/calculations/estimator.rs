//! Country income tax estimator.
//!
//! Walks a country's ordered brackets applying each marginal rate to the
//! slice of income inside it, then adds the flat surcharges.
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Reject negative income |
//! | 2    | Look up the country's rates |
//! | 3    | Sum `taxable slice × rate` over the brackets income reaches |
//! | 4    | Add social security on full gross income |
//! | 5    | Add health insurance on full gross income |
//! | 6    | Net income = gross − total tax |
//! | 7    | Effective rate = total tax ÷ gross × 100 (0 when gross is 0) |
//!
//! Surcharges are always charged on gross income, never on what is left
//! after the brackets.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::calculations::compute_tax;
//!
//! let result = compute_tax(dec!(50000), "slovakia").unwrap();
//!
//! assert_eq!(result.tax_amount, dec!(25700));
//! assert_eq!(result.net_income, dec!(24300));
//! assert_eq!(result.tax_rate, dec!(51.4));
//! assert_eq!(result.country, "Slovakia");
//! ```

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::debug;

use crate::calculations::common::{percent_of, percentage};
use crate::models::{CountryRates, TaxResult};
use crate::rates::{TaxTable, builtin_table};

/// Errors that can occur during a tax estimate.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaxEstimateError {
    /// The country key is not in the rate table.
    #[error("unsupported country '{0}'")]
    UnknownCountry(String),

    #[error("income must not be negative, got {0}")]
    NegativeIncome(Decimal),

    #[error("income too large to estimate")]
    Overflow,
}

/// Estimates tax against the built-in rate table.
pub fn compute_tax(
    income: Decimal,
    country_key: &str,
) -> Result<TaxResult, TaxEstimateError> {
    TaxEstimator::new(builtin_table()).calculate(income, country_key)
}

/// Calculator bound to one rate table.
#[derive(Debug, Clone, Copy)]
pub struct TaxEstimator<'a> {
    table: &'a TaxTable,
}

impl<'a> TaxEstimator<'a> {
    pub fn new(table: &'a TaxTable) -> Self {
        Self { table }
    }

    /// Produces the full breakdown for `income` in `country_key`.
    ///
    /// # Errors
    ///
    /// * [`TaxEstimateError::NegativeIncome`] for income below zero.
    /// * [`TaxEstimateError::UnknownCountry`] when the key is not in the table.
    /// * [`TaxEstimateError::Overflow`] if the arithmetic leaves `Decimal` range.
    pub fn calculate(
        &self,
        income: Decimal,
        country_key: &str,
    ) -> Result<TaxResult, TaxEstimateError> {
        if income < Decimal::ZERO {
            return Err(TaxEstimateError::NegativeIncome(income));
        }

        let rates = self
            .table
            .get(country_key)
            .ok_or_else(|| TaxEstimateError::UnknownCountry(country_key.to_string()))?;

        let bracket_tax = self.bracket_tax(rates, income)?;
        let surcharges = self.surcharges(rates, income)?;
        let tax_amount = bracket_tax
            .checked_add(surcharges)
            .ok_or(TaxEstimateError::Overflow)?;

        let net_income = income - tax_amount;
        let tax_rate = percentage(tax_amount, income).ok_or(TaxEstimateError::Overflow)?;

        debug!(
            country = country_key,
            %income,
            %bracket_tax,
            %surcharges,
            %tax_rate,
            "tax estimated"
        );

        Ok(TaxResult {
            gross_income: income,
            tax_amount,
            net_income,
            tax_rate,
            country: rates.name.clone(),
        })
    }

    /// Marginal tax over the ordered brackets.
    fn bracket_tax(
        &self,
        rates: &CountryRates,
        income: Decimal,
    ) -> Result<Decimal, TaxEstimateError> {
        let mut total = Decimal::ZERO;
        let mut remaining = income;

        for bracket in &rates.brackets {
            if remaining <= Decimal::ZERO {
                break;
            }
            let taxable = bracket.taxable_portion(income);
            if taxable <= Decimal::ZERO {
                continue;
            }
            let tax = percent_of(taxable, bracket.rate).ok_or(TaxEstimateError::Overflow)?;
            total = total.checked_add(tax).ok_or(TaxEstimateError::Overflow)?;
            remaining -= taxable;
        }

        Ok(total)
    }

    /// Flat social security and health insurance on gross income.
    fn surcharges(
        &self,
        rates: &CountryRates,
        income: Decimal,
    ) -> Result<Decimal, TaxEstimateError> {
        [rates.social_security, rates.health_insurance]
            .into_iter()
            .flatten()
            .try_fold(Decimal::ZERO, |acc, percent| {
                percent_of(income, percent)
                    .and_then(|charge| acc.checked_add(charge))
                    .ok_or(TaxEstimateError::Overflow)
            })
    }
}
