//! Shorthand expansion and collapse.
//!
//! [CSS Cascading § 1.2 Shorthand Properties](https://www.w3.org/TR/css-cascade-4/#shorthand)
//!
//! "Some properties are shorthand properties, meaning that they allow authors
//! to specify the values of several properties with a single property. ...
//! When values are omitted from a shorthand form, unless otherwise defined,
//! each 'missing' sub-property is assigned its initial value."

use crate::computed::ResolvedProperty;
use crate::properties::Property;
use crate::values::{
    self, BackgroundAttachment, BackgroundRepeat, BorderStyle, css_wide_keyword, normalize_keyword,
    parse_number, split_components,
};

/// An ordered list of longhand assignments produced by [`expand`].
pub type Longhands = Vec<(Property, ResolvedProperty)>;

/// Initial values of the border components (width, style, color).
const BORDER_INITIAL: [&str; 3] = ["medium", "none", "currentcolor"];

/// Initial values of the `background` longhands, in [`Property::longhands`] order.
const BACKGROUND_INITIAL: [&str; 5] = ["transparent", "none", "repeat", "scroll", "0% 0%"];

/// Expand `raw` for `property` into longhand assignments.
///
/// For a longhand the value is validated against the property's grammar and a
/// single entry is returned. For a shorthand every component must be valid or
/// the whole declaration is rejected (`None`).
#[must_use]
pub fn expand(property: Property, raw: &str, important: bool) -> Option<Longhands> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    // [CSS Flexbox § 7.1.1](https://www.w3.org/TR/css-flexbox-1/#flex-common)
    // `flex: initial` is "0 1 auto", not the CSS-wide keyword on each longhand.
    if property == Property::Flex && raw.eq_ignore_ascii_case("initial") {
        return Some(assign(property.longhands(), &["0", "1", "auto"], important));
    }

    if let Some(keyword) = css_wide_keyword(raw) {
        let targets: &[Property] = if property.is_shorthand() {
            property.longhands()
        } else {
            std::slice::from_ref(&property)
        };
        return Some(
            targets
                .iter()
                .map(|&p| (p, ResolvedProperty::new(keyword, important)))
                .collect(),
        );
    }

    if !property.is_shorthand() {
        let value = (property.grammar())(raw)?;
        return Some(vec![(property, ResolvedProperty::new(&value, important))]);
    }

    let values: Vec<String> = match property {
        Property::Margin => box_edges(raw, values::normalize_measurement_or_auto)?,
        Property::Padding => box_edges(raw, values::normalize_non_negative_measurement)?,
        Property::BorderWidth => box_edges(raw, values::normalize_border_width)?,
        Property::BorderStyle => box_edges(raw, normalize_keyword::<BorderStyle>)?,
        Property::BorderColor => box_edges(raw, values::normalize_color)?,
        Property::BorderRadius => {
            // Elliptical corners (`a / b`) are not supported.
            if raw.contains('/') {
                return None;
            }
            box_edges(raw, values::normalize_non_negative_measurement)?
        }
        Property::BorderTop | Property::BorderRight | Property::BorderBottom | Property::BorderLeft => {
            border_components(raw)?.to_vec()
        }
        Property::Border => {
            let side = border_components(raw)?;
            side.iter().cloned().cycle().take(12).collect()
        }
        Property::Background => background_components(raw)?,
        Property::Flex => flex_components(raw)?,
        _ => return None,
    };

    let refs: Vec<&str> = values.iter().map(String::as_str).collect();
    Some(assign(property.longhands(), &refs, important))
}

/// Serialize a shorthand from its longhands.
///
/// Returns the empty string unless every longhand is present with the same
/// importance and the values can be represented by the shorthand.
#[must_use]
pub fn collapse<'a, F>(shorthand: Property, lookup: F) -> String
where
    F: Fn(Property) -> Option<&'a ResolvedProperty>,
{
    let longhands = shorthand.longhands();
    if longhands.is_empty() {
        return String::new();
    }
    let Some(resolved) = longhands
        .iter()
        .map(|&p| lookup(p))
        .collect::<Option<Vec<&ResolvedProperty>>>()
    else {
        return String::new();
    };
    let important = resolved[0].important;
    if resolved.iter().any(|r| r.important != important) {
        return String::new();
    }
    let values: Vec<&str> = resolved.iter().map(|r| r.value.as_str()).collect();

    // CSS-wide keywords only collapse when every longhand carries the same one.
    let keywords: Vec<Option<&str>> = values.iter().map(|v| css_wide_keyword(v)).collect();
    if keywords.iter().any(Option::is_some) {
        return match keywords[0] {
            Some(k) if keywords.iter().all(|other| *other == Some(k)) => k.to_string(),
            _ => String::new(),
        };
    }
    if values.iter().any(|v| v.contains("var(")) {
        return String::new();
    }

    match shorthand {
        Property::Margin
        | Property::Padding
        | Property::BorderWidth
        | Property::BorderStyle
        | Property::BorderColor
        | Property::BorderRadius => minimize_edges(&values),
        Property::BorderTop | Property::BorderRight | Property::BorderBottom | Property::BorderLeft => {
            serialize_border(values[0], values[1], values[2])
        }
        Property::Border => {
            let sides: Vec<&[&str]> = values.chunks(3).collect();
            if sides.iter().all(|side| *side == sides[0]) {
                serialize_border(values[0], values[1], values[2])
            } else {
                String::new()
            }
        }
        Property::Background => {
            let parts: Vec<&str> = values
                .iter()
                .zip(BACKGROUND_INITIAL)
                .filter(|(value, initial)| **value != *initial)
                .map(|(value, _)| *value)
                .collect();
            if parts.is_empty() {
                "none".to_string()
            } else {
                parts.join(" ")
            }
        }
        Property::Flex => values.join(" "),
        _ => String::new(),
    }
}

fn assign(targets: &[Property], values: &[&str], important: bool) -> Longhands {
    targets
        .iter()
        .zip(values)
        .map(|(&p, v)| (p, ResolvedProperty::new(v, important)))
        .collect()
}

/// [CSS Box § 6.1](https://www.w3.org/TR/css-box-4/#margin-shorthand)
///
/// "If there is only one component value, it applies to all sides. If there
/// are two values, the top and bottom margins are set to the first value and
/// the right and left margins are set to the second. If there are three
/// values, the top is set to the first value, the left and right are set to
/// the second, and the bottom is set to the third. If there are four values
/// they apply to the top, right, bottom, and left, respectively."
fn box_edges(raw: &str, grammar: fn(&str) -> Option<String>) -> Option<Vec<String>> {
    let parts: Vec<String> = split_components(raw)
        .iter()
        .map(|p| grammar(p))
        .collect::<Option<_>>()?;
    let [top, right, bottom, left] = match parts.as_slice() {
        [a] => [a, a, a, a],
        [a, b] => [a, b, a, b],
        [a, b, c] => [a, b, c, b],
        [a, b, c, d] => [a, b, c, d],
        _ => return None,
    };
    Some(vec![top.clone(), right.clone(), bottom.clone(), left.clone()])
}

/// Inverse of [`box_edges`]: the shortest 1-4 value form.
fn minimize_edges(values: &[&str]) -> String {
    let [top, right, bottom, left] = [values[0], values[1], values[2], values[3]];
    if right == left {
        if top == bottom {
            if top == right {
                top.to_string()
            } else {
                format!("{top} {right}")
            }
        } else {
            format!("{top} {right} {bottom}")
        }
    } else {
        format!("{top} {right} {bottom} {left}")
    }
}

/// [CSS Backgrounds § 4.4](https://www.w3.org/TR/css-backgrounds-3/#border-shorthands)
///
/// "`<line-width>` || `<line-style>` || `<color>`" - each component at most
/// once, in any order. Returns `[width, style, color]`.
fn border_components(raw: &str) -> Option<[String; 3]> {
    let mut slots: [Option<String>; 3] = [None, None, None];
    for part in split_components(raw) {
        let (slot, value) = if let Some(style) = normalize_keyword::<BorderStyle>(&part) {
            (1, style)
        } else if let Some(width) = values::normalize_border_width(&part) {
            (0, width)
        } else if let Some(color) = values::normalize_color(&part) {
            (2, color)
        } else {
            return None;
        };
        if slots[slot].replace(value).is_some() {
            return None;
        }
    }
    let [width, style, color] = slots;
    Some([
        width.unwrap_or_else(|| BORDER_INITIAL[0].to_string()),
        style.unwrap_or_else(|| BORDER_INITIAL[1].to_string()),
        color.unwrap_or_else(|| BORDER_INITIAL[2].to_string()),
    ])
}

/// Border components equal to their initial value are omitted.
fn serialize_border(width: &str, style: &str, color: &str) -> String {
    let parts: Vec<&str> = [width, style, color]
        .into_iter()
        .zip(BORDER_INITIAL)
        .filter(|(value, initial)| value != initial)
        .map(|(value, _)| value)
        .collect();
    if parts.is_empty() {
        style.to_string()
    } else {
        parts.join(" ")
    }
}

/// [CSS Backgrounds § 3.10](https://www.w3.org/TR/css-backgrounds-3/#background)
///
/// Color, image, repeat, attachment and position, each optional and in any
/// order. Position components must be adjacent. Returns the five longhand
/// values in [`Property::longhands`] order.
fn background_components(raw: &str) -> Option<Vec<String>> {
    let mut color: Option<String> = None;
    let mut image: Option<String> = None;
    let mut repeat: Vec<String> = Vec::new();
    let mut attachment: Option<String> = None;
    let mut position: Vec<String> = Vec::new();
    let mut position_closed = false;
    let mut last_was_repeat = false;

    for part in split_components(raw) {
        let is_position = values::normalize_position_component(&part).is_some();
        if !is_position && !position.is_empty() {
            position_closed = true;
        }

        if let Some(value) = values::normalize_image(&part) {
            if image.replace(value).is_some() {
                return None;
            }
            last_was_repeat = false;
        } else if let Some(value) = normalize_keyword::<BackgroundRepeat>(&part) {
            if !repeat.is_empty() && !last_was_repeat {
                return None;
            }
            repeat.push(value);
            last_was_repeat = true;
        } else if let Some(value) = normalize_keyword::<BackgroundAttachment>(&part) {
            if attachment.replace(value).is_some() {
                return None;
            }
            last_was_repeat = false;
        } else if let Some(value) = values::normalize_position_component(&part) {
            if position_closed || position.len() == 2 {
                return None;
            }
            position.push(value);
            last_was_repeat = false;
        } else if let Some(value) = values::normalize_color(&part) {
            if color.replace(value).is_some() {
                return None;
            }
            last_was_repeat = false;
        } else {
            return None;
        }
    }

    let repeat = if repeat.is_empty() {
        BACKGROUND_INITIAL[2].to_string()
    } else {
        values::normalize_background_repeat(&repeat.join(" "))?
    };
    let position = if position.is_empty() {
        BACKGROUND_INITIAL[4].to_string()
    } else {
        values::normalize_background_position(&position.join(" "))?
    };

    Some(vec![
        color.unwrap_or_else(|| BACKGROUND_INITIAL[0].to_string()),
        image.unwrap_or_else(|| BACKGROUND_INITIAL[1].to_string()),
        repeat,
        attachment.unwrap_or_else(|| BACKGROUND_INITIAL[3].to_string()),
        position,
    ])
}

/// [CSS Flexbox § 7.2](https://www.w3.org/TR/css-flexbox-1/#flex-property)
///
/// "none | [ `<'flex-grow'>` `<'flex-shrink'>`? || `<'flex-basis'>` ]"
///
/// "When omitted from the flex shorthand, its specified value is 1" (grow and
/// shrink) and "When omitted from the flex shorthand, its specified value is
/// 0" (basis, serialized as `0%`).
fn flex_components(raw: &str) -> Option<Vec<String>> {
    match raw.to_ascii_lowercase().as_str() {
        "none" => return Some(vec!["0".into(), "0".into(), "auto".into()]),
        "auto" => return Some(vec!["1".into(), "1".into(), "auto".into()]),
        _ => {}
    }

    let parts = split_components(raw);
    if parts.is_empty() || parts.len() > 3 {
        return None;
    }

    let mut numbers: Vec<String> = Vec::new();
    let mut basis: Option<String> = None;
    let mut numbers_closed = false;
    for part in &parts {
        if let Some(n) = parse_number(part) {
            if n < 0.0 || numbers_closed || numbers.len() == 2 {
                return None;
            }
            numbers.push(values::format_number(n));
        } else {
            let value = values::normalize_flex_basis(part)?;
            if basis.replace(value).is_some() {
                return None;
            }
            if !numbers.is_empty() {
                numbers_closed = true;
            }
        }
    }

    let grow = numbers.first().cloned().unwrap_or_else(|| "1".to_string());
    let shrink = numbers.get(1).cloned().unwrap_or_else(|| "1".to_string());
    let basis = basis.unwrap_or_else(|| "0%".to_string());
    Some(vec![grow, shrink, basis])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values_of(longhands: &Longhands) -> Vec<&str> {
        longhands.iter().map(|(_, r)| r.value.as_str()).collect()
    }

    #[test]
    fn test_edges_rule() {
        let margin = expand(Property::Margin, "1px 2px 3px", false).unwrap();
        assert_eq!(values_of(&margin), vec!["1px", "2px", "3px", "2px"]);
        assert_eq!(margin[3].0, Property::MarginLeft);
    }

    #[test]
    fn test_flex_number_then_basis() {
        let flex = expand(Property::Flex, "2 10px", false).unwrap();
        assert_eq!(values_of(&flex), vec!["2", "1", "10px"]);
    }

    #[test]
    fn test_flex_numbers_must_be_adjacent() {
        assert!(expand(Property::Flex, "1 10px 2", false).is_none());
        assert!(expand(Property::Flex, "-1", false).is_none());
    }

    #[test]
    fn test_background_position_must_be_adjacent() {
        assert!(expand(Property::Background, "left red top", false).is_none());
        let bg = expand(Property::Background, "red left top", false).unwrap();
        assert_eq!(values_of(&bg)[4], "left top");
    }

    #[test]
    fn test_two_value_repeat() {
        let bg = expand(Property::Background, "repeat no-repeat", false).unwrap();
        assert_eq!(values_of(&bg)[2], "repeat no-repeat");
        assert!(expand(Property::Background, "repeat red no-repeat", false).is_none());
    }

    #[test]
    fn test_minimize_edges() {
        assert_eq!(minimize_edges(&["1px", "1px", "1px", "1px"]), "1px");
        assert_eq!(minimize_edges(&["1px", "2px", "1px", "2px"]), "1px 2px");
        assert_eq!(minimize_edges(&["1px", "2px", "3px", "2px"]), "1px 2px 3px");
        assert_eq!(minimize_edges(&["1px", "2px", "3px", "4px"]), "1px 2px 3px 4px");
    }
}
