//! Conditional group rule evaluation.
//!
//! [CSS Conditional Rules § 2](https://www.w3.org/TR/css-conditional-3/#processing)
//!
//! `@media`, `@supports` and `@container` preludes are evaluated against the
//! [`EngineConfig`]: there is no layout, so container queries are answered
//! from the viewport as well. An invalid condition never matches.

use crate::config::EngineConfig;
use crate::properties::{Property, is_custom_property};
use crate::selector::parse_selector;
use crate::shorthand;
use crate::values::{number_prefix_len, parse_number, split_top_level};

/// Root font size used to resolve `em`/`rem` in media features.
///
/// [Media Queries § 1.3](https://www.w3.org/TR/mediaqueries-4/#units)
/// "Relative length units in media queries are based on the initial value,
/// which means that units are never based on results of declarations."
const INITIAL_FONT_SIZE_PX: f64 = 16.0;

/// [Media Queries § 2.1 Combining Media Queries](https://www.w3.org/TR/mediaqueries-4/#mq-list)
///
/// "A media query list is true if any of its component media queries are
/// true, and false only if all of its component media queries are false."
/// An empty list is true.
#[must_use]
pub fn media_query_list_matches(text: &str, config: &EngineConfig) -> bool {
    let text = text.trim();
    if text.is_empty() {
        return true;
    }
    split_top_level(text, ',')
        .iter()
        // "A media query that does not match the grammar ... is replaced by
        // not all during parsing."
        .any(|query| media_query_matches(query, config).unwrap_or(false))
}

/// [Media Queries § 3 Syntax](https://www.w3.org/TR/mediaqueries-4/#mq-syntax)
///
/// `<media-query> = <media-condition> | [ not | only ]? <media-type>
/// [ and <media-condition-without-or> ]?`
fn media_query_matches(query: &str, config: &EngineConfig) -> Option<bool> {
    let query = query.trim().to_ascii_lowercase();
    if query.is_empty() {
        return None;
    }
    if query.starts_with('(') || query.starts_with("not (") || query.starts_with("not(") {
        return evaluate_condition(&query, &|feature| media_feature_matches(feature, config));
    }

    let mut words = query.splitn(2, char::is_whitespace);
    let mut first = words.next()?;
    let mut rest = words.next().unwrap_or("").trim();
    let mut negated = false;
    if first == "not" || first == "only" {
        negated = first == "not";
        let mut tail = rest.splitn(2, char::is_whitespace);
        first = tail.next()?;
        rest = tail.next().unwrap_or("").trim();
    }

    // [§ 2.3 Media Types](https://www.w3.org/TR/mediaqueries-4/#media-types)
    let type_matches = match first {
        "all" => true,
        "screen" | "print" | "speech" => first == config.media_type,
        // Deprecated types are valid but match nothing.
        "tty" | "tv" | "projection" | "handheld" | "braille" | "embossed" | "aural" => false,
        _ => return None,
    };

    let condition_matches = if rest.is_empty() {
        true
    } else {
        let condition = rest.strip_prefix("and")?;
        if !condition.starts_with(|c: char| c.is_whitespace() || c == '(') {
            return None;
        }
        evaluate_condition(condition, &|feature| media_feature_matches(feature, config))?
    };

    Some((type_matches && condition_matches) != negated)
}

/// [CSS Conditional § 6.1 @supports](https://www.w3.org/TR/css-conditional-3/#at-supports)
///
/// "`<supports-condition> = not <supports-in-parens> | <supports-in-parens>
/// [ and <supports-in-parens> ]* | <supports-in-parens> [ or
/// <supports-in-parens> ]*`". A declaration is supported when its value is
/// accepted for the property.
#[must_use]
pub fn supports_condition_matches(text: &str) -> bool {
    evaluate_condition(text, &supports_feature_matches).unwrap_or(false)
}

/// [CSS Containment 3 § 6.1 @container](https://www.w3.org/TR/css-contain-3/#container-rule)
///
/// `@container [ <container-name> ]? <container-condition>`. The name is
/// accepted and ignored; size features use the viewport.
#[must_use]
pub fn container_condition_matches(text: &str, config: &EngineConfig) -> bool {
    let text = text.trim().to_ascii_lowercase();
    let condition = match text.split_once(|c: char| c.is_whitespace() || c == '(') {
        Some((name, _)) if !name.is_empty() && name != "not" && !name.starts_with("style") => {
            text[name.len()..].trim_start()
        }
        _ => text.as_str(),
    };
    if condition.is_empty() {
        return false;
    }
    evaluate_condition(condition, &|feature| container_feature_matches(feature, config))
        .unwrap_or(false)
}

type Leaf<'a> = &'a dyn Fn(&str) -> Option<bool>;

/// Evaluate a boolean condition of `not`, `and`, `or` over parenthesized
/// groups. `leaf` answers the innermost tests (the text inside the parens,
/// or a bare function such as `selector(...)`). `None` means invalid.
fn evaluate_condition(text: &str, leaf: Leaf<'_>) -> Option<bool> {
    let tokens = tokenize(text.trim());
    match tokens.as_slice() {
        [] => None,
        [not, operand] if not.eq_ignore_ascii_case("not") => {
            evaluate_in_parens(operand, leaf).map(|b| !b)
        }
        [operand] => evaluate_in_parens(operand, leaf),
        [first, rest @ ..] => {
            // Operators alternate with operands and may not be mixed.
            let operator = rest.first()?.to_ascii_lowercase();
            if operator != "and" && operator != "or" {
                return None;
            }
            let mut result = evaluate_in_parens(first, leaf)?;
            for pair in rest.chunks(2) {
                let [op, operand] = pair else {
                    return None;
                };
                if !op.eq_ignore_ascii_case(&operator) {
                    return None;
                }
                let value = evaluate_in_parens(operand, leaf)?;
                result = if operator == "and" {
                    result && value
                } else {
                    result || value
                };
            }
            Some(result)
        }
    }
}

fn evaluate_in_parens(token: &str, leaf: Leaf<'_>) -> Option<bool> {
    let Some(inner) = token.strip_prefix('(').and_then(|t| t.strip_suffix(')')) else {
        // A functional test such as `selector(...)`.
        return token.ends_with(')').then(|| leaf(token)).flatten();
    };
    let inner = inner.trim();
    let nested = inner.starts_with('(')
        || inner
            .get(..4)
            .is_some_and(|p| p.eq_ignore_ascii_case("not ") || p.eq_ignore_ascii_case("not("));
    if nested {
        evaluate_condition(inner, leaf)
    } else {
        leaf(inner)
    }
}

/// Split at top-level whitespace, keeping parenthesized groups (and the
/// function name glued to them) together.
fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut depth = 0u32;
    for c in text.chars() {
        match c {
            '(' => {
                // `and(` / `not(`: a keyword glued to a group.
                if depth == 0
                    && (current.eq_ignore_ascii_case("and")
                        || current.eq_ignore_ascii_case("or")
                        || current.eq_ignore_ascii_case("not"))
                {
                    tokens.push(std::mem::take(&mut current));
                }
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            c if c.is_whitespace() && depth == 0 => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// One `@supports` test.
fn supports_feature_matches(test: &str) -> Option<bool> {
    if let Some(arguments) = function_arguments(test, "selector") {
        return Some(parse_selector(arguments).is_some());
    }
    if function_arguments(test, "font-tech").is_some()
        || function_arguments(test, "font-format").is_some()
    {
        return Some(false);
    }
    let (name, value) = test.split_once(':')?;
    let name = name.trim();
    let value = value.trim();
    if is_custom_property(name) {
        return Some(true);
    }
    Some(
        Property::from_name(name)
            .and_then(|property| shorthand::expand(property, value, false))
            .is_some(),
    )
}

/// `name(arguments)` to `arguments`, ASCII case-insensitively.
fn function_arguments<'a>(text: &'a str, name: &str) -> Option<&'a str> {
    let open = name.len();
    let head = text.get(..open)?;
    if !head.eq_ignore_ascii_case(name) {
        return None;
    }
    text[open..].strip_prefix('(')?.strip_suffix(')')
}

/// How a range test compares its two sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Comparison {
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    Equal,
}

impl Comparison {
    fn holds(self, left: f64, right: f64) -> bool {
        const EPSILON: f64 = 1e-9;
        match self {
            Self::Less => left < right - EPSILON,
            Self::LessOrEqual => left <= right + EPSILON,
            Self::Greater => left > right + EPSILON,
            Self::GreaterOrEqual => left >= right - EPSILON,
            Self::Equal => (left - right).abs() <= EPSILON,
        }
    }

    const fn flipped(self) -> Self {
        match self {
            Self::Less => Self::Greater,
            Self::LessOrEqual => Self::GreaterOrEqual,
            Self::Greater => Self::Less,
            Self::GreaterOrEqual => Self::LessOrEqual,
            Self::Equal => Self::Equal,
        }
    }
}

/// [Media Queries § 4 Media Features](https://www.w3.org/TR/mediaqueries-4/#mq-features)
fn media_feature_matches(feature: &str, config: &EngineConfig) -> Option<bool> {
    let feature = feature.trim().to_ascii_lowercase();

    if let Some(result) = range_feature_matches(&feature, config) {
        return result;
    }

    let Some((name, value)) = feature.split_once(':') else {
        // [§ 2.4.2 Evaluating in a boolean context](https://www.w3.org/TR/mediaqueries-4/#mq-boolean-context)
        return boolean_feature(&feature, config);
    };
    let name = name.trim();
    let value = value.trim();

    let (comparison, base) = if let Some(base) = name.strip_prefix("min-") {
        (Comparison::GreaterOrEqual, base)
    } else if let Some(base) = name.strip_prefix("max-") {
        (Comparison::LessOrEqual, base)
    } else {
        (Comparison::Equal, name)
    };

    if let Some(actual) = numeric_feature(base, config) {
        let expected = feature_value(base, value, config)?;
        return Some(comparison.holds(actual, expected));
    }
    if comparison != Comparison::Equal {
        return None;
    }
    discrete_feature(base, value, config)
}

/// `width >= 600px`, `400px < width <= 800px` and friends. Returns `None`
/// when `feature` is not in range form.
fn range_feature_matches(feature: &str, config: &EngineConfig) -> Option<Option<bool>> {
    let parts = split_range(feature)?;
    let evaluate = || -> Option<bool> {
        match parts.as_slice() {
            // name op value | value op name
            [(left, Some(op)), (right, None)] => {
                if let Some(actual) = numeric_feature(left, config) {
                    Some(op.holds(actual, feature_value(left, right, config)?))
                } else {
                    let actual = numeric_feature(right, config)?;
                    Some(op.flipped().holds(actual, feature_value(right, left, config)?))
                }
            }
            // value op name op value
            [(low, Some(first)), (name, Some(second)), (high, None)] => {
                let actual = numeric_feature(name, config)?;
                let low = feature_value(name, low, config)?;
                let high = feature_value(name, high, config)?;
                Some(first.flipped().holds(actual, low) && second.holds(actual, high))
            }
            _ => None,
        }
    };
    Some(evaluate())
}

/// Split `a <= b < c` into `[(a, Some(<=)), (b, Some(<)), (c, None)]`.
/// `None` if the text has no comparison operator.
fn split_range(feature: &str) -> Option<Vec<(String, Option<Comparison>)>> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = feature.chars().peekable();
    while let Some(c) = chars.next() {
        let op = match c {
            '<' | '>' => {
                let or_equal = chars.peek() == Some(&'=');
                if or_equal {
                    let _ = chars.next();
                }
                match (c, or_equal) {
                    ('<', false) => Comparison::Less,
                    ('<', true) => Comparison::LessOrEqual,
                    ('>', false) => Comparison::Greater,
                    _ => Comparison::GreaterOrEqual,
                }
            }
            '=' => Comparison::Equal,
            _ => {
                current.push(c);
                continue;
            }
        };
        parts.push((current.trim().to_string(), Some(op)));
        current.clear();
    }
    if parts.is_empty() {
        return None;
    }
    parts.push((current.trim().to_string(), None));
    Some(parts)
}

/// Current value of a numeric media feature.
fn numeric_feature(name: &str, config: &EngineConfig) -> Option<f64> {
    let viewport = config.viewport;
    match name.trim() {
        "width" | "device-width" | "inline-size" => Some(viewport.width),
        "height" | "device-height" | "block-size" => Some(viewport.height),
        "aspect-ratio" | "device-aspect-ratio" => {
            (viewport.height > 0.0).then(|| viewport.width / viewport.height)
        }
        "resolution" => Some(config.device_pixel_ratio),
        "color" => Some(8.0),
        "color-index" | "monochrome" | "grid" => Some(0.0),
        _ => None,
    }
}

/// Parse `value` in the unit family of the numeric feature `name`.
fn feature_value(name: &str, value: &str, config: &EngineConfig) -> Option<f64> {
    let value = value.trim();
    match name.trim() {
        "aspect-ratio" | "device-aspect-ratio" => {
            let (w, h) = value.split_once('/').unwrap_or((value, "1"));
            let (w, h) = (parse_number(w.trim())?, parse_number(h.trim())?);
            (h > 0.0).then(|| w / h)
        }
        "resolution" => resolution_to_dppx(value),
        "color" | "color-index" | "monochrome" | "grid" => parse_number(value),
        _ => length_to_px(value, config),
    }
}

fn boolean_feature(name: &str, config: &EngineConfig) -> Option<bool> {
    if let Some(value) = numeric_feature(name, config) {
        return Some(value != 0.0);
    }
    match name {
        "hover" | "any-hover" | "pointer" | "any-pointer" | "orientation" | "scripting" => {
            Some(true)
        }
        "prefers-reduced-motion" | "prefers-contrast" | "forced-colors" | "inverted-colors" => {
            Some(false)
        }
        "prefers-color-scheme" | "display-mode" | "color-gamut" | "update" | "overflow-block" => {
            Some(true)
        }
        _ => None,
    }
}

fn discrete_feature(name: &str, value: &str, config: &EngineConfig) -> Option<bool> {
    let viewport = config.viewport;
    Some(match name {
        // [§ 4.3 orientation](https://www.w3.org/TR/mediaqueries-4/#orientation)
        // "The orientation media feature is portrait when the value of the
        // height media feature is greater than or equal to the value of the
        // width media feature."
        "orientation" => match value {
            "portrait" => viewport.height >= viewport.width,
            "landscape" => viewport.height < viewport.width,
            _ => return None,
        },
        "prefers-color-scheme" => match value {
            "light" | "dark" => value == config.prefers_color_scheme.as_str(),
            _ => return None,
        },
        "hover" | "any-hover" => value == "hover",
        "pointer" | "any-pointer" => value == "fine",
        "prefers-reduced-motion" | "prefers-contrast" | "prefers-reduced-transparency" => {
            value == "no-preference"
        }
        "forced-colors" | "inverted-colors" => value == "none",
        "scripting" => value == "enabled",
        "display-mode" => value == "browser",
        "color-gamut" => value == "srgb",
        "update" => value == "fast",
        _ => return None,
    })
}

/// Container size features are the viewport's; style and state queries do
/// not match.
fn container_feature_matches(feature: &str, config: &EngineConfig) -> Option<bool> {
    if feature.trim_start().starts_with("style(") || feature.trim_start().starts_with("scroll-state(") {
        return Some(false);
    }
    media_feature_matches(feature, config)
}

/// [CSS Values § 6.2 Absolute lengths](https://www.w3.org/TR/css-values-4/#absolute-lengths)
fn length_to_px(value: &str, config: &EngineConfig) -> Option<f64> {
    let split = number_prefix_len(value);
    let number = parse_number(&value[..split])?;
    let unit = &value[split..];
    let factor = match unit {
        "" if number == 0.0 => 0.0,
        "px" => 1.0,
        "em" | "rem" => INITIAL_FONT_SIZE_PX,
        "in" => 96.0,
        "cm" => 96.0 / 2.54,
        "mm" => 96.0 / 25.4,
        "q" => 96.0 / 101.6,
        "pt" => 96.0 / 72.0,
        "pc" => 16.0,
        "vw" => config.viewport.width / 100.0,
        "vh" => config.viewport.height / 100.0,
        "vmin" => config.viewport.width.min(config.viewport.height) / 100.0,
        "vmax" => config.viewport.width.max(config.viewport.height) / 100.0,
        _ => return None,
    };
    Some(number * factor)
}

/// [CSS Values § 7.4 Resolution units](https://www.w3.org/TR/css-values-4/#resolution)
fn resolution_to_dppx(value: &str) -> Option<f64> {
    let split = number_prefix_len(value);
    let number = parse_number(&value[..split])?;
    let factor = match &value[split..] {
        "dppx" | "x" => 1.0,
        "dpi" => 1.0 / 96.0,
        "dpcm" => 2.54 / 96.0,
        _ => return None,
    };
    Some(number * factor)
}
