use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// Static currency metadata with an approximate rate per 1 USD
#[derive(Debug, Clone, Copy)]
pub struct CurrencyInfo {
    pub code: &'static str,
    pub name: &'static str,
    pub symbol: &'static str,
    pub usd_rate: f64,
}

const fn currency(
    code: &'static str,
    name: &'static str,
    symbol: &'static str,
    usd_rate: f64,
) -> CurrencyInfo {
    CurrencyInfo {
        code,
        name,
        symbol,
        usd_rate,
    }
}

/// Supported currencies. Rates are approximate and only used for display conversions.
pub const CURRENCIES: &[CurrencyInfo] = &[
    currency("USD", "US Dollar", "$", 1.0),
    currency("EUR", "Euro", "€", 0.92),
    currency("GBP", "British Pound", "£", 0.79),
    currency("JPY", "Japanese Yen", "¥", 149.50),
    currency("AUD", "Australian Dollar", "A$", 1.53),
    currency("CAD", "Canadian Dollar", "C$", 1.36),
    currency("CHF", "Swiss Franc", "CHF", 0.88),
    currency("CNY", "Chinese Yuan", "¥", 7.24),
    currency("INR", "Indian Rupee", "₹", 83.12),
    currency("MXN", "Mexican Peso", "$", 17.15),
    currency("BRL", "Brazilian Real", "R$", 4.97),
    currency("KRW", "South Korean Won", "₩", 1320.0),
    currency("SGD", "Singapore Dollar", "S$", 1.34),
    currency("HKD", "Hong Kong Dollar", "HK$", 7.82),
    currency("NOK", "Norwegian Krone", "kr", 10.65),
    currency("SEK", "Swedish Krona", "kr", 10.42),
    currency("DKK", "Danish Krone", "kr", 6.87),
    currency("NZD", "New Zealand Dollar", "NZ$", 1.64),
    currency("ZAR", "South African Rand", "R", 18.65),
    currency("RUB", "Russian Ruble", "₽", 92.50),
    currency("TRY", "Turkish Lira", "₺", 32.10),
    currency("AED", "UAE Dirham", "د.إ", 3.67),
    currency("SAR", "Saudi Riyal", "﷼", 3.75),
    currency("PLN", "Polish Zloty", "zł", 3.98),
    currency("THB", "Thai Baht", "฿", 35.50),
    currency("IDR", "Indonesian Rupiah", "Rp", 15650.0),
    currency("MYR", "Malaysian Ringgit", "RM", 4.72),
    currency("PHP", "Philippine Peso", "₱", 56.20),
    currency("CZK", "Czech Koruna", "Kč", 22.85),
    currency("ILS", "Israeli Shekel", "₪", 3.72),
    currency("CLP", "Chilean Peso", "$", 890.0),
    currency("PKR", "Pakistani Rupee", "₨", 279.0),
    currency("EGP", "Egyptian Pound", "£", 30.90),
    currency("BDT", "Bangladeshi Taka", "৳", 110.0),
    currency("VND", "Vietnamese Dong", "₫", 24500.0),
    currency("NGN", "Nigerian Naira", "₦", 1550.0),
    currency("ARS", "Argentine Peso", "$", 870.0),
    currency("COP", "Colombian Peso", "$", 3950.0),
    currency("PEN", "Peruvian Sol", "S/", 3.72),
    currency("UAH", "Ukrainian Hryvnia", "₴", 37.50),
];

/// Serialized form of a [`CurrencyInfo`]
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CurrencyEntry {
    pub code: String,
    pub name: String,
    pub symbol: String,
}

impl From<&CurrencyInfo> for CurrencyEntry {
    fn from(info: &CurrencyInfo) -> Self {
        Self {
            code: info.code.to_string(),
            name: info.name.to_string(),
            symbol: info.symbol.to_string(),
        }
    }
}

/// Response of the currency listing: metadata plus units per 1 USD keyed by code
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CurrencyList {
    pub currencies: Vec<CurrencyEntry>,
    pub rates: BTreeMap<String, f64>,
}

pub fn find_currency(code: &str) -> Option<&'static CurrencyInfo> {
    CURRENCIES.iter().find(|c| c.code.eq_ignore_ascii_case(code))
}

/// Query string of the conversion endpoint
#[derive(Debug, Clone, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ConvertQuery {
    pub amount: rust_decimal::Decimal,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConversionResult {
    pub from: String,
    pub to: String,
    pub original_amount: rust_decimal::Decimal,
    pub converted_amount: rust_decimal::Decimal,
    pub rate: rust_decimal::Decimal,
}
