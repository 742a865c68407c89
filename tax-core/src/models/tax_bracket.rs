use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One marginal-rate slice `[min_income, max_income)` of a country's schedule.
///
/// `rate` is a percentage (`24` means 24%). A `max_income` of `None` marks
/// the top, unbounded bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub min_income: Decimal,
    pub max_income: Option<Decimal>,
    pub rate: Decimal,
}

impl TaxBracket {
    pub fn new(
        min_income: Decimal,
        max_income: Option<Decimal>,
        rate: Decimal,
    ) -> Self {
        Self {
            min_income,
            max_income,
            rate,
        }
    }

    /// A single bracket covering all income at a flat `rate`.
    pub fn flat(rate: Decimal) -> Self {
        Self::new(Decimal::ZERO, None, rate)
    }

    /// Portion of `income` that falls inside this bracket.
    pub fn taxable_portion(
        &self,
        income: Decimal,
    ) -> Decimal {
        if income <= self.min_income {
            return Decimal::ZERO;
        }
        let above_min = income - self.min_income;
        match self.max_income {
            Some(max) => above_min.min(max - self.min_income),
            None => above_min,
        }
    }
}
