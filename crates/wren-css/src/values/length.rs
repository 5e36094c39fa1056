//! Numeric grammars: lengths, percentages, integers and numbers.
//!
//! [§ 5 Numeric Data Types](https://www.w3.org/TR/css-values-4/#numeric-types)

use super::{format_number, number_prefix_len, parens_balanced, parse_number};

/// [§ 6 Distance Units](https://www.w3.org/TR/css-values-4/#lengths)
///
/// Font-relative, viewport-percentage and absolute length units.
pub const LENGTH_UNITS: [&str; 19] = [
    "px", "em", "rem", "ex", "ch", "lh", "rlh", "vw", "vh", "vmin", "vmax", "cm", "mm", "q",
    "in", "pt", "pc", "cap", "ic",
];

/// [§ 10 Mathematical Expressions](https://www.w3.org/TR/css-values-4/#math)
const MATH_FUNCTIONS: [&str; 4] = ["calc", "min", "max", "clamp"];

/// [§ 6 Distance Units](https://www.w3.org/TR/css-values-4/#lengths)
///
/// "`<length>` = `<number>` immediately followed by a unit". A unitless zero
/// is accepted and serialized as `0px`. Math functions are passed through
/// when their parentheses balance.
#[must_use]
pub fn normalize_length(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if let Some(math) = normalize_math_function(trimmed) {
        return Some(math);
    }
    // [§ 6](https://www.w3.org/TR/css-values-4/#lengths)
    // "for zero lengths the unit identifier is optional"
    if parse_number(trimmed) == Some(0.0) {
        return Some("0px".to_string());
    }
    let (value, unit) = split_dimension(trimmed)?;
    let unit = unit.to_ascii_lowercase();
    if !LENGTH_UNITS.contains(&unit.as_str()) {
        return None;
    }
    Some(format!("{}{unit}", format_number(value)))
}

/// [§ 5.5 Percentages](https://www.w3.org/TR/css-values-4/#percentages)
///
/// "`<percentage>` = `<number>` immediately followed by a percent sign %"
#[must_use]
pub fn normalize_percentage(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let number = trimmed.strip_suffix('%')?;
    let value = parse_number(number)?;
    Some(format!("{}%", format_number(value)))
}

/// `<length-percentage>`
#[must_use]
pub fn normalize_measurement(raw: &str) -> Option<String> {
    normalize_length(raw).or_else(|| normalize_percentage(raw))
}

/// `auto | <length-percentage>`
#[must_use]
pub fn normalize_measurement_or_auto(raw: &str) -> Option<String> {
    if raw.trim().eq_ignore_ascii_case("auto") {
        return Some("auto".to_string());
    }
    normalize_measurement(raw)
}

/// [§ 5.2 Integers](https://www.w3.org/TR/css-values-4/#integers)
///
/// "one or more decimal digits 0 through 9 ... optionally preceded by a
/// single + or - sign"
#[must_use]
pub fn normalize_integer(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let digits = trimmed
        .strip_prefix(['+', '-'])
        .unwrap_or(trimmed);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    trimmed.parse::<i64>().ok().map(|n| n.to_string())
}

/// [§ 5.3 Real Numbers](https://www.w3.org/TR/css-values-4/#numbers)
#[must_use]
pub fn normalize_number(raw: &str) -> Option<String> {
    parse_number(raw.trim()).map(format_number)
}

/// Split `12.5px` into `(12.5, "px")`. The unit must be non-empty.
fn split_dimension(text: &str) -> Option<(f64, &str)> {
    let len = number_prefix_len(text);
    if len == 0 || len == text.len() {
        return None;
    }
    let value = text[..len].parse::<f64>().ok()?;
    let unit = &text[len..];
    unit.chars()
        .all(|c| c.is_ascii_alphabetic())
        .then_some((value, unit))
}

/// Pass through `calc()`, `min()`, `max()` and `clamp()` with a lowercased
/// function name.
fn normalize_math_function(text: &str) -> Option<String> {
    let open = text.find('(')?;
    let name = text[..open].to_ascii_lowercase();
    if !MATH_FUNCTIONS.contains(&name.as_str()) || !text.ends_with(')') || !parens_balanced(text)
    {
        return None;
    }
    if text[open + 1..text.len() - 1].trim().is_empty() {
        return None;
    }
    Some(format!("{name}{}", &text[open..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unitless_zero() {
        assert_eq!(normalize_length("0").as_deref(), Some("0px"));
        assert_eq!(normalize_length("-0.0").as_deref(), Some("0px"));
    }

    #[test]
    fn test_units_are_lowercased() {
        assert_eq!(normalize_length("10PX").as_deref(), Some("10px"));
        assert_eq!(normalize_length("1.50Em").as_deref(), Some("1.5em"));
    }

    #[test]
    fn test_unitless_nonzero_is_invalid() {
        assert_eq!(normalize_length("10"), None);
        assert_eq!(normalize_length("px"), None);
        assert_eq!(normalize_length("10 px"), None);
        assert_eq!(normalize_length("10furlongs"), None);
    }

    #[test]
    fn test_calc_passthrough() {
        assert_eq!(
            normalize_length("CALC(100% - 10px)").as_deref(),
            Some("calc(100% - 10px)")
        );
        assert_eq!(normalize_length("calc(1px"), None);
        assert_eq!(normalize_length("calc()"), None);
        assert_eq!(normalize_length("blur(1px)"), None);
    }

    #[test]
    fn test_percentage() {
        assert_eq!(normalize_percentage("50%").as_deref(), Some("50%"));
        assert_eq!(normalize_percentage("50"), None);
        assert_eq!(normalize_measurement("12.5%").as_deref(), Some("12.5%"));
        assert_eq!(normalize_measurement_or_auto("AUTO").as_deref(), Some("auto"));
    }

    #[test]
    fn test_integer() {
        assert_eq!(normalize_integer("+5").as_deref(), Some("5"));
        assert_eq!(normalize_integer("-12").as_deref(), Some("-12"));
        assert_eq!(normalize_integer("1.5"), None);
        assert_eq!(normalize_integer("-"), None);
    }
}
