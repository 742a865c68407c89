mod business_tax_record;
mod country_rates;
mod tax_bracket;
mod tax_result;

pub use business_tax_record::{BusinessTaxRecord, NewBusinessTaxRecord, TaxHistorySummary};
pub use country_rates::{CountryRates, RateTableError};
pub use tax_bracket::TaxBracket;
pub use tax_result::TaxResult;
