//! CSS value grammars.
//!
//! [CSS Values and Units Module Level 4](https://www.w3.org/TR/css-values-4/)
//!
//! Every grammar is a pure function from raw text to its canonical serialized
//! form. `None` means the text is not valid for the grammar; callers drop the
//! declaration.

mod color;
mod keywords;
mod length;
mod url;

pub use color::{Rgba, normalize_color};
pub use keywords::{
    BackgroundAttachment, BackgroundPositionKeyword, BackgroundRepeat, BorderCollapse,
    BorderStyle, BorderWidthKeyword, BoxSizing, Clear, Direction, Display, FlexDirection,
    FlexWrap, Float, FontSizeKeyword, FontStyle, FontWeightKeyword, Overflow, Position,
    TextAlign, TextTransform, VerticalAlignKeyword, Visibility, WhiteSpace, normalize_keyword,
};
pub use length::{
    LENGTH_UNITS, normalize_integer, normalize_length, normalize_measurement,
    normalize_measurement_or_auto, normalize_number, normalize_percentage,
};
pub use url::normalize_url;

/// [§ 7.3 CSS-wide keywords](https://www.w3.org/TR/css-values-4/#common-keywords)
///
/// "All CSS properties accept the CSS-wide keyword values as the sole
/// component of their property value."
pub const CSS_WIDE_KEYWORDS: [&str; 5] = ["inherit", "initial", "unset", "revert", "revert-layer"];

/// Returns the lowercased CSS-wide keyword if `raw` is one.
#[must_use]
pub fn css_wide_keyword(raw: &str) -> Option<&'static str> {
    let trimmed = raw.trim();
    CSS_WIDE_KEYWORDS
        .iter()
        .find(|k| trimmed.eq_ignore_ascii_case(k))
        .copied()
}

/// Accept any non-empty value, collapsing runs of whitespace outside strings.
#[must_use]
pub fn normalize_any(raw: &str) -> Option<String> {
    let parts = split_components(raw);
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

/// `normal | <length>` (letter-spacing, word-spacing).
#[must_use]
pub fn normalize_spacing(raw: &str) -> Option<String> {
    if raw.trim().eq_ignore_ascii_case("normal") {
        return Some("normal".to_string());
    }
    normalize_length(raw)
}

/// `<length-percentage> | none` (max-width, max-height).
#[must_use]
pub fn normalize_measurement_or_none(raw: &str) -> Option<String> {
    if raw.trim().eq_ignore_ascii_case("none") {
        return Some("none".to_string());
    }
    normalize_measurement(raw)
}

/// Non-negative `<length-percentage>` (padding).
#[must_use]
pub fn normalize_non_negative_measurement(raw: &str) -> Option<String> {
    normalize_measurement(raw).filter(|v| !v.starts_with('-'))
}

/// [§ 3.1 border-width](https://www.w3.org/TR/css-backgrounds-3/#border-width)
///
/// "`<line-width>` = `<length [0,∞]>` | thin | medium | thick"
#[must_use]
pub fn normalize_border_width(raw: &str) -> Option<String> {
    normalize_keyword::<BorderWidthKeyword>(raw)
        .or_else(|| normalize_length(raw).filter(|v| !v.starts_with('-')))
}

/// [§ 2.2 font-size](https://www.w3.org/TR/css-fonts-4/#font-size-prop)
///
/// "`<absolute-size>` | `<relative-size>` | `<length-percentage [0,∞]>` | math"
#[must_use]
pub fn normalize_font_size(raw: &str) -> Option<String> {
    normalize_keyword::<FontSizeKeyword>(raw)
        .or_else(|| normalize_measurement(raw).filter(|v| !v.starts_with('-')))
}

/// [§ 2.1 font-weight](https://www.w3.org/TR/css-fonts-4/#font-weight-prop)
///
/// "normal | bold | bolder | lighter | `<number [1,1000]>`"
#[must_use]
pub fn normalize_font_weight(raw: &str) -> Option<String> {
    normalize_keyword::<FontWeightKeyword>(raw).or_else(|| {
        let n = parse_number(raw.trim())?;
        (1.0..=1000.0).contains(&n).then(|| format_number(n))
    })
}

/// `normal | <number> | <length-percentage>` (line-height).
#[must_use]
pub fn normalize_line_height(raw: &str) -> Option<String> {
    if raw.trim().eq_ignore_ascii_case("normal") {
        return Some("normal".to_string());
    }
    normalize_number(raw)
        .filter(|v| !v.starts_with('-'))
        .or_else(|| normalize_measurement(raw).filter(|v| !v.starts_with('-')))
}

/// `auto | <integer>` (z-index).
#[must_use]
pub fn normalize_integer_or_auto(raw: &str) -> Option<String> {
    if raw.trim().eq_ignore_ascii_case("auto") {
        return Some("auto".to_string());
    }
    normalize_integer(raw)
}

/// `<number> | <percentage>` clamped to the alpha range (opacity).
#[must_use]
pub fn normalize_alpha(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let n = match trimmed.strip_suffix('%') {
        Some(p) => parse_number(p)? / 100.0,
        None => parse_number(trimmed)?,
    };
    Some(format_number(n.clamp(0.0, 1.0)))
}

/// Non-negative `<number>` (flex-grow, flex-shrink).
#[must_use]
pub fn normalize_non_negative_number(raw: &str) -> Option<String> {
    normalize_number(raw).filter(|v| !v.starts_with('-'))
}

/// [§ 7.2.3 flex-basis](https://www.w3.org/TR/css-flexbox-1/#flex-basis-property)
///
/// "content | `<'width'>`"
#[must_use]
pub fn normalize_flex_basis(raw: &str) -> Option<String> {
    if raw.trim().eq_ignore_ascii_case("content") {
        return Some("content".to_string());
    }
    normalize_measurement_or_auto(raw).filter(|v| !v.starts_with('-'))
}

/// `<baseline-keyword> | <length-percentage>` (vertical-align).
#[must_use]
pub fn normalize_vertical_align(raw: &str) -> Option<String> {
    normalize_keyword::<VerticalAlignKeyword>(raw).or_else(|| normalize_measurement(raw))
}

/// [§ 3.3 background-image](https://www.w3.org/TR/css-backgrounds-3/#background-image)
///
/// "`<bg-image>` = none | `<image>`". Gradients are passed through when their
/// parentheses balance.
#[must_use]
pub fn normalize_image(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("none") {
        return Some("none".to_string());
    }
    if let Some(url) = normalize_url(trimmed) {
        return Some(url);
    }
    let lower = trimmed.to_ascii_lowercase();
    let open = lower.find('(')?;
    let name = &lower[..open];
    if name.ends_with("gradient") && lower.ends_with(')') && parens_balanced(trimmed) {
        return Some(format!("{name}{}", &trimmed[open..]));
    }
    None
}

/// [§ 3.4 background-repeat](https://www.w3.org/TR/css-backgrounds-3/#background-repeat)
///
/// "`<repeat-style>` = repeat-x | repeat-y | [repeat | space | round | no-repeat]{1,2}"
#[must_use]
pub fn normalize_background_repeat(raw: &str) -> Option<String> {
    let parts = split_components(raw);
    match parts.as_slice() {
        [single] => normalize_keyword::<BackgroundRepeat>(single),
        [a, b] => {
            let a = normalize_keyword::<BackgroundRepeat>(a)?;
            let b = normalize_keyword::<BackgroundRepeat>(b)?;
            if a.starts_with("repeat-") || b.starts_with("repeat-") {
                return None;
            }
            Some(format!("{a} {b}"))
        }
        _ => None,
    }
}

/// [§ 3.6 background-position](https://www.w3.org/TR/css-backgrounds-3/#background-position)
///
/// One or two components, each a position keyword or a `<length-percentage>`.
#[must_use]
pub fn normalize_background_position(raw: &str) -> Option<String> {
    let parts = split_components(raw);
    if parts.is_empty() || parts.len() > 2 {
        return None;
    }
    let normalized: Option<Vec<String>> = parts
        .iter()
        .map(|p| normalize_position_component(p))
        .collect();
    let normalized = normalized?;
    if let [a, b] = normalized.as_slice() {
        // Two horizontal or two vertical keywords cannot be combined.
        let axis = |k: &str| match k {
            "left" | "right" => Some('x'),
            "top" | "bottom" => Some('y'),
            _ => None,
        };
        if axis(a).is_some() && axis(a) == axis(b) {
            return None;
        }
    }
    Some(normalized.join(" "))
}

/// A single `background-position` component.
#[must_use]
pub fn normalize_position_component(raw: &str) -> Option<String> {
    normalize_keyword::<BackgroundPositionKeyword>(raw).or_else(|| normalize_measurement(raw))
}

/// Split a value into whitespace-separated components, keeping parenthesized
/// groups and quoted strings intact.
#[must_use]
pub fn split_components(raw: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0u32;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in raw.chars() {
        if escaped {
            current.push(c);
            escaped = false;
            continue;
        }
        match c {
            '\\' => {
                escaped = true;
                current.push(c);
            }
            '"' | '\'' if quote.is_none() => {
                quote = Some(c);
                current.push(c);
            }
            q if quote == Some(q) => {
                quote = None;
                current.push(c);
            }
            _ if quote.is_some() => current.push(c),
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            c if c.is_whitespace() && depth == 0 => {
                if !current.is_empty() {
                    parts.push(std::mem::take(&mut current));
                }
            }
            c if c.is_whitespace() => {
                if !current.ends_with(' ') {
                    current.push(' ');
                }
            }
            _ => current.push(c),
        }
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

/// Split `raw` at every top-level occurrence of `separator` (outside
/// parentheses, brackets and strings). Pieces are trimmed.
#[must_use]
pub fn split_top_level(raw: &str, separator: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0u32;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in raw.chars() {
        if escaped {
            current.push(c);
            escaped = false;
            continue;
        }
        match c {
            '\\' => {
                escaped = true;
                current.push(c);
            }
            '"' | '\'' if quote.is_none() => {
                quote = Some(c);
                current.push(c);
            }
            q if quote == Some(q) => {
                quote = None;
                current.push(c);
            }
            _ if quote.is_some() => current.push(c),
            '(' | '[' => {
                depth += 1;
                current.push(c);
            }
            ')' | ']' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            c if c == separator && depth == 0 => {
                parts.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    parts.push(current.trim().to_string());
    parts
}

/// True if every `(` has a matching `)` outside strings.
#[must_use]
pub fn parens_balanced(raw: &str) -> bool {
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for c in raw.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '"' | '\'' if quote.is_none() => quote = Some(c),
            q if quote == Some(q) => quote = None,
            _ if quote.is_some() => {}
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0 && quote.is_none()
}

/// [§ 4.3.12 Consume a number](https://www.w3.org/TR/css-syntax-3/#consume-number)
///
/// Parses the whole of `text` as a CSS `<number>`: optional sign, digits with
/// an optional fraction, optional exponent. Returns `None` for anything else,
/// including Rust-only forms such as `inf` or `1.`.
#[must_use]
pub fn parse_number(text: &str) -> Option<f64> {
    let len = number_prefix_len(text);
    if len == 0 || len != text.len() {
        return None;
    }
    text.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Length in bytes of the longest prefix of `text` that is a CSS `<number>`.
#[must_use]
pub fn number_prefix_len(text: &str) -> usize {
    let bytes = text.as_bytes();
    let mut i = 0;
    if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
        i += 1;
    }
    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;
    if i + 1 < bytes.len() && bytes[i] == b'.' && bytes[i + 1].is_ascii_digit() {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
            digits += 1;
        }
    }
    if digits == 0 {
        return 0;
    }
    // STEP: exponent, only when followed by digits ("1em" is not an exponent)
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        if j < bytes.len() && bytes[j].is_ascii_digit() {
            while j < bytes.len() && bytes[j].is_ascii_digit() {
                j += 1;
            }
            i = j;
        }
    }
    i
}

/// Serialize a number the way CSSOM does: shortest form, no trailing zeros,
/// at most six fractional digits, never `-0`.
#[must_use]
pub fn format_number(n: f64) -> String {
    let rounded = (n * 1_000_000.0).round() / 1_000_000.0;
    if rounded == 0.0 {
        return "0".to_string();
    }
    format!("{rounded}")
}
