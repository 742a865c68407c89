use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::TaxResult;

/// A saved calculation for one business and tax year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessTaxRecord {
    pub id: i64,
    pub business_name: String,
    pub business_type: Option<String>,
    /// Rate table key, e.g. `slovakia`.
    pub country: String,
    pub annual_revenue: Decimal,
    pub tax_year: i32,

    // Calculated values
    pub tax_rate: Decimal,
    pub calculated_tax: Decimal,
    pub profit_loss: Decimal,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// For creating new records (no id or timestamps)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBusinessTaxRecord {
    pub business_name: String,
    pub business_type: Option<String>,
    pub country: String,
    pub annual_revenue: Decimal,
    pub tax_year: i32,
    pub tax_rate: Decimal,
    pub calculated_tax: Decimal,
    pub profit_loss: Decimal,
}

impl NewBusinessTaxRecord {
    /// Pairs an estimator result with the business it was computed for.
    pub fn from_result(
        business_name: impl Into<String>,
        business_type: Option<String>,
        country_key: impl Into<String>,
        tax_year: i32,
        result: &TaxResult,
    ) -> Self {
        Self {
            business_name: business_name.into(),
            business_type,
            country: country_key.into(),
            annual_revenue: result.gross_income,
            tax_year,
            tax_rate: result.tax_rate,
            calculated_tax: result.tax_amount,
            profit_loss: result.net_income,
        }
    }
}

/// Totals over a set of saved records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxHistorySummary {
    pub record_count: usize,
    pub total_revenue: Decimal,
    pub total_tax: Decimal,
    pub total_profit: Decimal,
}

impl TaxHistorySummary {
    /// Sums the records, or `None` if a total leaves `Decimal` range.
    pub fn from_records(records: &[BusinessTaxRecord]) -> Option<Self> {
        records.iter().try_fold(Self::default(), |acc, record| {
            Some(Self {
                record_count: acc.record_count + 1,
                total_revenue: acc.total_revenue.checked_add(record.annual_revenue)?,
                total_tax: acc.total_tax.checked_add(record.calculated_tax)?,
                total_profit: acc.total_profit.checked_add(record.profit_loss)?,
            })
        })
    }
}
