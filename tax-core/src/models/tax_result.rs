use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::round_half_up;

/// Breakdown produced by one estimator call.
///
/// `tax_rate` is the effective rate in percent (total tax / gross income).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxResult {
    pub gross_income: Decimal,
    pub tax_amount: Decimal,
    pub net_income: Decimal,
    pub tax_rate: Decimal,
    /// Display name of the country, not its table key.
    pub country: String,
}

impl fmt::Display for TaxResult {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        writeln!(f, "Country:        {}", self.country)?;
        writeln!(f, "Gross income:   {:.2}", round_half_up(self.gross_income))?;
        writeln!(f, "Tax amount:     {:.2}", round_half_up(self.tax_amount))?;
        writeln!(f, "Net income:     {:.2}", round_half_up(self.net_income))?;
        write!(f, "Effective rate: {:.2}%", round_half_up(self.tax_rate))
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn display_rounds_to_cents() {
        let result = TaxResult {
            gross_income: dec!(1000),
            tax_amount: dec!(333.3333),
            net_income: dec!(666.6667),
            tax_rate: dec!(33.33333),
            country: "Somewhere".to_string(),
        };

        let rendered = result.to_string();

        assert!(rendered.contains("Country:        Somewhere"));
        assert!(rendered.contains("Tax amount:     333.33"));
        assert!(rendered.contains("Net income:     666.67"));
        assert!(rendered.ends_with("Effective rate: 33.33%"));
    }

    #[test]
    fn display_pads_whole_amounts() {
        let result = TaxResult {
            gross_income: dec!(1000),
            tax_amount: dec!(250),
            net_income: dec!(750),
            tax_rate: dec!(25),
            country: "United Kingdom".to_string(),
        };

        let rendered = result.to_string();

        assert!(rendered.contains("Gross income:   1000.00"));
        assert!(rendered.contains("Tax amount:     250.00"));
        assert!(rendered.ends_with("Effective rate: 25.00%"));
    }
}
