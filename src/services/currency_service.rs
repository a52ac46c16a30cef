use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;

use crate::models::currency::{
    CURRENCIES, ConversionResult, CurrencyEntry, CurrencyInfo, CurrencyList, find_currency,
};

/// Currency service errors
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CurrencyError {
    #[error("Unsupported currency code: {0}")]
    InvalidCurrency(String),

    #[error("Amount {0} cannot be converted without overflowing")]
    AmountOutOfRange(Decimal),
}

/// Trait defining currency lookups and conversions
pub trait CurrencyService: Send + Sync {
    /// Every supported currency, plus its approximate USD rate
    fn list_currencies(&self) -> CurrencyList;

    /// Convert an amount between two supported currencies, going through USD
    fn convert(&self, amount: Decimal, from: &str, to: &str)
    -> Result<ConversionResult, CurrencyError>;
}

/// Implementation of CurrencyService backed by the static rate table
#[derive(Debug, Default)]
pub struct CurrencyServiceImpl;

impl CurrencyServiceImpl {
    pub fn new() -> Self {
        Self
    }
}

fn lookup(code: &str) -> Result<(&'static CurrencyInfo, Decimal), CurrencyError> {
    let info = find_currency(code).ok_or_else(|| CurrencyError::InvalidCurrency(code.to_string()))?;
    let rate = Decimal::from_f64(info.usd_rate)
        .filter(|r| !r.is_zero())
        .ok_or_else(|| CurrencyError::InvalidCurrency(code.to_string()))?;
    Ok((info, rate))
}

impl CurrencyService for CurrencyServiceImpl {
    fn list_currencies(&self) -> CurrencyList {
        CurrencyList {
            currencies: CURRENCIES.iter().map(CurrencyEntry::from).collect(),
            rates: CURRENCIES
                .iter()
                .map(|c| (c.code.to_string(), c.usd_rate))
                .collect(),
        }
    }

    fn convert(
        &self,
        amount: Decimal,
        from: &str,
        to: &str,
    ) -> Result<ConversionResult, CurrencyError> {
        let (from_info, from_rate) = lookup(from)?;
        let (to_info, to_rate) = lookup(to)?;

        let converted = amount
            .checked_div(from_rate)
            .and_then(|usd_amount| usd_amount.checked_mul(to_rate))
            .ok_or(CurrencyError::AmountOutOfRange(amount))?;
        let rate = to_rate
            .checked_div(from_rate)
            .ok_or(CurrencyError::AmountOutOfRange(amount))?;

        Ok(ConversionResult {
            from: from_info.code.to_string(),
            to: to_info.code.to_string(),
            original_amount: amount,
            converted_amount: converted.round_dp(2),
            rate: rate.round_dp(6),
        })
    }
}
