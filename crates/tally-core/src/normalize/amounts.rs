//! Lenient numeric parsing for prices and quantities.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse a money-like amount ("$1,234.56", "1 234,56", "21.99", "(3.00)").
///
/// Currency symbols and spaces are ignored. A lone comma followed by one or two
/// digits is a decimal comma; otherwise commas are thousands separators.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let s = s.trim();
    let negative = s.starts_with('-') || (s.starts_with('(') && s.ends_with(')'));

    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();

    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let normalized = match (cleaned.rfind(','), cleaned.rfind('.')) {
        // Both present: whichever comes last is the decimal separator
        (Some(c), Some(d)) if c > d => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (Some(c), None) => {
            let decimals = cleaned.len() - c - 1;
            if cleaned.matches(',').count() == 1 && (1..=2).contains(&decimals) {
                cleaned.replace(',', ".")
            } else {
                cleaned.replace(',', "")
            }
        }
        _ => cleaned,
    };

    let value = Decimal::from_str(&normalized).ok()?;
    Some(if negative { -value } else { value })
}

/// Outcome of coercing a numeric field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coerced<T> {
    pub value: T,
    /// Text was present but unusable.
    pub failed: bool,
    /// Text was present and usable.
    pub known: bool,
}

impl<T> Coerced<T> {
    fn known(value: T) -> Self {
        Self {
            value,
            failed: false,
            known: true,
        }
    }

    fn failed(value: T) -> Self {
        Self {
            value,
            failed: true,
            known: false,
        }
    }

    fn missing(value: T) -> Self {
        Self {
            value,
            failed: false,
            known: false,
        }
    }
}

/// Coerce a price. Missing, unparseable and negative values become zero.
pub fn coerce_price(text: Option<&str>) -> Coerced<Decimal> {
    match text.map(str::trim).filter(|t| !t.is_empty()) {
        None => Coerced::missing(Decimal::ZERO),
        Some(t) => match parse_amount(t) {
            Some(v) if v >= Decimal::ZERO => Coerced::known(v),
            _ => Coerced::failed(Decimal::ZERO),
        },
    }
}

/// Coerce a quantity. Fractional values are truncated and flagged; missing,
/// unparseable and negative values become zero.
pub fn coerce_quantity(text: Option<&str>) -> Coerced<u64> {
    match text.map(str::trim).filter(|t| !t.is_empty()) {
        None => Coerced::missing(0),
        Some(t) => match parse_amount(t) {
            Some(v) if v >= Decimal::ZERO => match v.trunc().to_u64() {
                Some(n) if v.fract().is_zero() => Coerced::known(n),
                Some(n) => Coerced {
                    value: n,
                    failed: true,
                    known: true,
                },
                None => Coerced::failed(0),
            },
            _ => Coerced::failed(0),
        },
    }
}

/// Format an amount with two decimal places.
pub fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(2))
}
