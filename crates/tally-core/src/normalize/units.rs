//! Unit conversion to liters-equivalent factors.

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;

lazy_static! {
    // Trailing alphabetic unit of a pack size: "12/750 ml", "1.75LTR", "24/12oz."
    static ref TRAILING_UNIT: Regex = Regex::new(r"([A-Za-z]+)\.?\s*$").unwrap();
}

/// Canonical unit token for common spellings.
pub fn canonical_unit(token: &str) -> String {
    let lower = token.trim().trim_end_matches('.').to_lowercase();
    match lower.as_str() {
        "floz" | "ounce" | "ounces" => "oz".to_string(),
        "l" | "lt" | "liter" | "litre" | "liters" | "litres" => "ltr".to_string(),
        "gallon" | "gallons" => "gal".to_string(),
        "milliliter" | "millilitre" => "ml".to_string(),
        _ => lower,
    }
}

/// Liters-equivalent factor for a unit token. Unknown or missing units map to 1.
pub fn unit_factor(unit: Option<&str>) -> Decimal {
    match unit.map(canonical_unit).as_deref() {
        Some("oz") => Decimal::new(295735, 7),
        Some("ml") => Decimal::new(1, 3),
        Some("ltr") => Decimal::ONE,
        Some("gal") => Decimal::new(378541, 5),
        _ => Decimal::ONE,
    }
}

/// Last alphabetic token of a pack size, canonicalized.
pub fn unit_from_pack_size(pack_size: &str) -> Option<String> {
    TRAILING_UNIT
        .captures(pack_size.trim())
        .map(|caps| canonical_unit(&caps[1]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_fixed_table() {
        assert_eq!(unit_factor(Some("oz")), Decimal::from_str("0.0295735").unwrap());
        assert_eq!(unit_factor(Some("ML")), Decimal::from_str("0.001").unwrap());
        assert_eq!(unit_factor(Some("Ltr")), Decimal::ONE);
        assert_eq!(unit_factor(Some("gal")), Decimal::from_str("3.78541").unwrap());
    }

    #[test]
    fn test_unknown_units_default_to_one() {
        assert_eq!(unit_factor(Some("case")), Decimal::ONE);
        assert_eq!(unit_factor(None), Decimal::ONE);
    }

    #[test]
    fn test_unit_from_pack_size() {
        assert_eq!(unit_from_pack_size("12/750 ml").as_deref(), Some("ml"));
        assert_eq!(unit_from_pack_size("1.75LTR").as_deref(), Some("ltr"));
        assert_eq!(unit_from_pack_size("24/12oz.").as_deref(), Some("oz"));
        assert_eq!(unit_from_pack_size("1 L").as_deref(), Some("ltr"));
        assert_eq!(unit_from_pack_size("24/12"), None);
    }
}
