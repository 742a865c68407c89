use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::TaxBracket;

/// Reasons a country's rates cannot be added to a [`crate::TaxTable`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RateTableError {
    #[error("country '{0}' has no tax brackets")]
    NoBrackets(String),

    #[error("country '{country}': bracket starting at {min_income} is not above the previous bracket")]
    UnorderedBrackets { country: String, min_income: Decimal },

    #[error("country '{country}': bracket starting at {min_income} begins below the previous bracket's max {previous_max}")]
    OverlappingBrackets {
        country: String,
        min_income: Decimal,
        previous_max: Decimal,
    },

    #[error("country '{country}': negative bracket min {min_income}")]
    NegativeMinIncome { country: String, min_income: Decimal },

    #[error("country '{country}': bracket max {max_income} is not above its min {min_income}")]
    EmptyBracket {
        country: String,
        min_income: Decimal,
        max_income: Decimal,
    },

    #[error("country '{country}': only the last bracket may be unbounded")]
    UnboundedBeforeLast { country: String },

    #[error("country '{country}': negative rate {rate}")]
    NegativeRate { country: String, rate: Decimal },

    #[error("country key must not be empty")]
    EmptyKey,
}

/// Income tax schedule and flat surcharges for one country.
///
/// Surcharges are percentages of full gross income, independent of the
/// brackets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryRates {
    pub name: String,
    pub brackets: Vec<TaxBracket>,
    pub social_security: Option<Decimal>,
    pub health_insurance: Option<Decimal>,
}

impl CountryRates {
    /// A country taxed at one flat bracket rate with no surcharges.
    pub fn flat(
        name: impl Into<String>,
        rate: Decimal,
    ) -> Self {
        Self {
            name: name.into(),
            brackets: vec![TaxBracket::flat(rate)],
            social_security: None,
            health_insurance: None,
        }
    }

    pub fn with_social_security(
        mut self,
        percent: Decimal,
    ) -> Self {
        self.social_security = Some(percent);
        self
    }

    pub fn with_health_insurance(
        mut self,
        percent: Decimal,
    ) -> Self {
        self.health_insurance = Some(percent);
        self
    }

    /// Checks the bracket invariants the estimator relies on.
    pub fn validate(&self) -> Result<(), RateTableError> {
        let country = || self.name.clone();

        if self.brackets.is_empty() {
            return Err(RateTableError::NoBrackets(country()));
        }

        let last = self.brackets.len() - 1;
        let mut previous: Option<&TaxBracket> = None;

        for (index, bracket) in self.brackets.iter().enumerate() {
            if bracket.min_income < Decimal::ZERO {
                return Err(RateTableError::NegativeMinIncome {
                    country: country(),
                    min_income: bracket.min_income,
                });
            }
            if let Some(prev) = previous {
                if bracket.min_income <= prev.min_income {
                    return Err(RateTableError::UnorderedBrackets {
                        country: country(),
                        min_income: bracket.min_income,
                    });
                }
                if let Some(previous_max) = prev.max_income.filter(|max| bracket.min_income < *max) {
                    return Err(RateTableError::OverlappingBrackets {
                        country: country(),
                        min_income: bracket.min_income,
                        previous_max,
                    });
                }
            }
            match bracket.max_income {
                Some(max) if max <= bracket.min_income => {
                    return Err(RateTableError::EmptyBracket {
                        country: country(),
                        min_income: bracket.min_income,
                        max_income: max,
                    });
                }
                None if index != last => {
                    return Err(RateTableError::UnboundedBeforeLast { country: country() });
                }
                _ => {}
            }
            if bracket.rate < Decimal::ZERO {
                return Err(RateTableError::NegativeRate {
                    country: country(),
                    rate: bracket.rate,
                });
            }
            previous = Some(bracket);
        }

        for surcharge in [self.social_security, self.health_insurance]
            .into_iter()
            .flatten()
        {
            if surcharge < Decimal::ZERO {
                return Err(RateTableError::NegativeRate {
                    country: country(),
                    rate: surcharge,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn progressive() -> CountryRates {
        CountryRates {
            name: "Progressia".to_string(),
            brackets: vec![
                TaxBracket::new(dec!(0), Some(dec!(10000)), dec!(10)),
                TaxBracket::new(dec!(10000), Some(dec!(40000)), dec!(20)),
                TaxBracket::new(dec!(40000), None, dec!(40)),
            ],
            social_security: None,
            health_insurance: None,
        }
    }

    #[test]
    fn flat_builder_sets_surcharges() {
        let rates = CountryRates::flat("Slovakia", dec!(24))
            .with_social_security(dec!(13.4))
            .with_health_insurance(dec!(14));

        assert_eq!(rates.brackets, vec![TaxBracket::flat(dec!(24))]);
        assert_eq!(rates.social_security, Some(dec!(13.4)));
        assert_eq!(rates.health_insurance, Some(dec!(14)));
        assert_eq!(rates.validate(), Ok(()));
    }

    #[test]
    fn validate_accepts_ordered_progressive_schedule() {
        assert_eq!(progressive().validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_empty_schedule() {
        let mut rates = progressive();
        rates.brackets.clear();

        assert_eq!(
            rates.validate(),
            Err(RateTableError::NoBrackets("Progressia".to_string()))
        );
    }

    #[test]
    fn validate_rejects_unordered_brackets() {
        let mut rates = progressive();
        rates.brackets.swap(0, 1);

        assert!(matches!(
            rates.validate(),
            Err(RateTableError::UnorderedBrackets { .. })
        ));
    }

    #[test]
    fn validate_rejects_unbounded_bracket_before_last() {
        let mut rates = progressive();
        rates.brackets[1].max_income = None;

        assert_eq!(
            rates.validate(),
            Err(RateTableError::UnboundedBeforeLast {
                country: "Progressia".to_string()
            })
        );
    }

    #[test]
    fn validate_rejects_zero_width_bracket() {
        let mut rates = progressive();
        rates.brackets[0].max_income = Some(dec!(0));

        assert!(matches!(
            rates.validate(),
            Err(RateTableError::EmptyBracket { .. })
        ));
    }

    #[test]
    fn validate_rejects_overlapping_brackets() {
        let rates = CountryRates {
            name: "Overlapia".to_string(),
            brackets: vec![
                TaxBracket::new(dec!(0), Some(dec!(50000)), dec!(10)),
                TaxBracket::new(dec!(10000), None, dec!(20)),
            ],
            social_security: None,
            health_insurance: None,
        };

        assert_eq!(
            rates.validate(),
            Err(RateTableError::OverlappingBrackets {
                country: "Overlapia".to_string(),
                min_income: dec!(10000),
                previous_max: dec!(50000),
            })
        );
    }

    #[test]
    fn validate_accepts_gap_between_brackets() {
        let mut rates = progressive();
        rates.brackets[1].min_income = dec!(15000);

        assert_eq!(rates.validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_negative_min_income() {
        let mut rates = progressive();
        rates.brackets[0].min_income = dec!(-100);

        assert_eq!(
            rates.validate(),
            Err(RateTableError::NegativeMinIncome {
                country: "Progressia".to_string(),
                min_income: dec!(-100),
            })
        );
    }

    #[test]
    fn validate_rejects_negative_surcharge() {
        let rates = CountryRates::flat("Nowhere", dec!(10)).with_health_insurance(dec!(-1));

        assert_eq!(
            rates.validate(),
            Err(RateTableError::NegativeRate {
                country: "Nowhere".to_string(),
                rate: dec!(-1)
            })
        );
    }
}
