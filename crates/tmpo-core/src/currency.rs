//! Formatting of monetary amounts. No conversion is ever performed.

use thiserror::Error;

pub const DEFAULT_CURRENCY: &str = "USD";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CurrencyError {
    #[error("currency code must be 3 letters (e.g., USD, EUR, GBP), got {0:?}")]
    InvalidLength(String),
    #[error("currency code must contain only letters, got {0:?}")]
    NonAlphabetic(String),
}

/// Normalizes and validates an ISO 4217-style currency code.
pub fn validate_currency_code(input: &str) -> Result<String, CurrencyError> {
    let code = input.trim();
    if code.chars().count() != 3 {
        return Err(CurrencyError::InvalidLength(code.to_string()));
    }
    if !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(CurrencyError::NonAlphabetic(code.to_string()));
    }
    Ok(code.to_ascii_uppercase())
}

fn symbol(code: &str) -> Option<&'static str> {
    let symbol = match code {
        "USD" | "CAD" | "AUD" | "NZD" | "MXN" => "$",
        "EUR" => "€",
        "GBP" => "£",
        "JPY" | "CNY" => "¥",
        "INR" => "₹",
        "KRW" => "₩",
        "BRL" => "R$",
        "CHF" => "CHF ",
        "SEK" | "NOK" | "DKK" => "kr ",
        "PLN" => "zł ",
        _ => return None,
    };
    Some(symbol)
}

/// Formats `amount` with two decimals using the symbol for `code`.
///
/// Unknown codes fall back to `"<CODE> <amount>"`.
pub fn format_currency(amount: f64, code: &str) -> String {
    let code = code.trim().to_ascii_uppercase();
    match symbol(&code) {
        Some(symbol) => format!("{symbol}{amount:.2}"),
        None => format!("{code} {amount:.2}"),
    }
}
