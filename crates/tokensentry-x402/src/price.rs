use alloy::primitives::U256;
use serde::Serialize;

use crate::config::CurrencyConfig;

/// Validated payment terms with the price converted to minor units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentQuote {
    /// The price exactly as the server sent it.
    pub price: String,
    /// Amount in the currency's smallest unit.
    pub amount: U256,
    pub recipient: String,
    pub chain: String,
    /// Token identifier the payment is made in.
    pub asset: String,
}

/// Parse `"<integer>[.<fraction>] <CODE>"` into minor units.
///
/// The currency code is matched case-insensitively and may be separated from
/// the number by any amount of whitespace, including none. The fraction is
/// padded or truncated (never rounded) to `currency.decimals` digits.
/// Returns `None` for anything else, including amounts that overflow.
pub fn parse_minor_units(price: &str, currency: &CurrencyConfig) -> Option<U256> {
    let trimmed = price.trim();

    let split = trimmed.len().checked_sub(currency.code.len())?;
    if !trimmed.is_char_boundary(split) {
        return None;
    }
    let (number, code) = trimmed.split_at(split);
    if !code.eq_ignore_ascii_case(&currency.code) {
        return None;
    }
    let number = number.trim_end();

    // No sign, no exponent, no leading or trailing dot.
    let (integer, fraction) = match number.split_once('.') {
        Some((i, f)) => (i, f),
        None => (number, ""),
    };
    if integer.is_empty() || !integer.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if number.contains('.') && (fraction.is_empty() || !fraction.bytes().all(|b| b.is_ascii_digit()))
    {
        return None;
    }

    let decimals = currency.decimals as usize;
    let mut digits = fraction[..fraction.len().min(decimals)].to_string();
    while digits.len() < decimals {
        digits.push('0');
    }

    let whole = U256::from_str_radix(integer, 10).ok()?;
    let frac = if digits.is_empty() {
        U256::ZERO
    } else {
        U256::from_str_radix(&digits, 10).ok()?
    };
    let scale = U256::from(10u64).checked_pow(U256::from(currency.decimals))?;

    whole.checked_mul(scale)?.checked_add(frac)
}

/// Render a minor-unit amount as a decimal string, e.g. `250000` → `"0.25"`.
pub fn format_minor_units(amount: U256, decimals: u32) -> String {
    let raw = amount.to_string();
    let decimals = decimals as usize;
    if decimals == 0 {
        return raw;
    }

    let padded = format!("{raw:0>width$}", width = decimals + 1);
    let (whole, frac) = padded.split_at(padded.len() - decimals);
    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{frac}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usdc() -> CurrencyConfig {
        CurrencyConfig::default()
    }

    fn parse(price: &str) -> Option<u64> {
        parse_minor_units(price, &usdc()).map(|v| v.to::<u64>())
    }

    #[test]
    fn test_parse_quarter() {
        assert_eq!(parse("0.25 USDC"), Some(250_000));
    }

    #[test]
    fn test_parse_whole_unit() {
        assert_eq!(parse("1 USDC"), Some(1_000_000));
    }

    #[test]
    fn test_parse_truncates_beyond_decimals() {
        // 7 fractional digits: the last one is dropped, not rounded
        assert_eq!(parse("1.2345678 USDC"), Some(1_234_567));
        assert_eq!(parse("0.0000019 USDC"), Some(1));
    }

    #[test]
    fn test_parse_code_case_insensitive_and_spacing() {
        assert_eq!(parse("0.25 usdc"), Some(250_000));
        assert_eq!(parse("0.25USDC"), Some(250_000));
        assert_eq!(parse("  2.5   Usdc  "), Some(2_500_000));
    }

    #[test]
    fn test_parse_leading_zeros() {
        assert_eq!(parse("007.5 USDC"), Some(7_500_000));
    }

    #[test]
    fn test_parse_rejects_non_numeric() {
        assert_eq!(parse("abc USDC"), None);
        assert_eq!(parse("1e3 USDC"), None);
        assert_eq!(parse("-1 USDC"), None);
        assert_eq!(parse("$1 USDC"), None);
    }

    #[test]
    fn test_parse_rejects_other_currency() {
        assert_eq!(parse("5 EUR"), None);
        assert_eq!(parse("5"), None);
        assert_eq!(parse("USDC"), None);
        assert_eq!(parse(""), None);
    }

    #[test]
    fn test_parse_rejects_dangling_dot() {
        assert_eq!(parse(".5 USDC"), None);
        assert_eq!(parse("1. USDC"), None);
        assert_eq!(parse("1.2.3 USDC"), None);
    }

    #[test]
    fn test_parse_overflow_fails() {
        let huge = format!("{} USDC", "9".repeat(80));
        assert!(parse_minor_units(&huge, &usdc()).is_none());
    }

    #[test]
    fn test_parse_multibyte_input_does_not_panic() {
        assert_eq!(parse("1 USDÇ"), None);
        assert_eq!(parse("€"), None);
    }

    #[test]
    fn test_format_minor_units() {
        assert_eq!(format_minor_units(U256::from(250_000u64), 6), "0.25");
        assert_eq!(format_minor_units(U256::from(1_000_000u64), 6), "1");
        assert_eq!(format_minor_units(U256::from(1_234_567u64), 6), "1.234567");
        assert_eq!(format_minor_units(U256::from(1u64), 6), "0.000001");
        assert_eq!(format_minor_units(U256::ZERO, 6), "0");
        assert_eq!(format_minor_units(U256::from(42u64), 0), "42");
    }
}
