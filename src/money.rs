use rust_decimal::Decimal;

/// Currencies the processor reports without a minor unit (amount 500 JPY is ¥500)
const ZERO_DECIMAL_CURRENCIES: &[&str] = &[
    "BIF", "CLP", "DJF", "GNF", "JPY", "KMF", "KRW", "MGA", "PYG", "RWF", "UGX", "VND", "VUV",
    "XAF", "XOF", "XPF",
];

/// Number of decimal places between minor and major units
pub fn exponent(currency: &str) -> u32 {
    if ZERO_DECIMAL_CURRENCIES
        .iter()
        .any(|c| c.eq_ignore_ascii_case(currency.trim()))
    {
        0
    } else {
        2
    }
}

/// Convert an amount in minor units (e.g. cents) to major units
pub fn amount(minor: i64, currency: &str) -> Decimal {
    Decimal::new(minor, exponent(currency))
}

pub fn normalize_currency(s: &str) -> String {
    s.trim().to_uppercase()
}

pub fn display_amount(amount: Decimal) -> String {
    format!("{:.2}", amount)
}
