//! CSS Color values and parsing
//!
//! [CSS Color Level 4](https://www.w3.org/TR/css-color-4/)

use super::{format_number, parse_number, split_top_level};

/// [§ 4 Color syntax](https://www.w3.org/TR/css-color-4/#color-syntax)
/// sRGB color with an alpha channel in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    /// "the red color channel" (0-255)
    pub r: u8,
    /// "the green color channel" (0-255)
    pub g: u8,
    /// "the blue color channel" (0-255)
    pub b: u8,
    /// "the alpha channel" (0.0 = transparent, 1.0 = opaque)
    pub a: f64,
}

impl Rgba {
    /// [§ 4.2 The RGB hexadecimal notations](https://www.w3.org/TR/css-color-4/#hex-notation)
    /// "The syntax of a <hex-color> is a <hash-token> token whose value consists of
    /// 3, 4, 6, or 8 hexadecimal digits."
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        let doubled = |i: usize| channel(&hex[i..=i].repeat(2));
        match hex.len() {
            // "The three-digit RGB notation (#RGB) is converted into six-digit form
            // (#RRGGBB) by replicating digits, not by adding zeros."
            3 => Some(Self {
                r: doubled(0)?,
                g: doubled(1)?,
                b: doubled(2)?,
                a: 1.0,
            }),
            4 => Some(Self {
                r: doubled(0)?,
                g: doubled(1)?,
                b: doubled(2)?,
                a: f64::from(doubled(3)?) / 255.0,
            }),
            6 => Some(Self {
                r: channel(&hex[0..2])?,
                g: channel(&hex[2..4])?,
                b: channel(&hex[4..6])?,
                a: 1.0,
            }),
            8 => Some(Self {
                r: channel(&hex[0..2])?,
                g: channel(&hex[2..4])?,
                b: channel(&hex[4..6])?,
                a: f64::from(channel(&hex[6..8])?) / 255.0,
            }),
            _ => None,
        }
    }

    /// [§ 4.1 The RGB functions](https://www.w3.org/TR/css-color-4/#rgb-functions)
    /// [§ 7.1 The HSL notation](https://www.w3.org/TR/css-color-4/#the-hsl-notation)
    ///
    /// Parses `rgb()`, `rgba()`, `hsl()` and `hsla()` in both the legacy
    /// comma-separated and the modern space-separated syntax.
    #[must_use]
    pub fn from_function(text: &str) -> Option<Self> {
        let open = text.find('(')?;
        let name = text[..open].trim().to_ascii_lowercase();
        let inner = text[open + 1..].strip_suffix(')')?;
        let args = color_arguments(inner)?;
        match name.as_str() {
            "rgb" | "rgba" => parse_rgb_arguments(&args),
            "hsl" | "hsla" => parse_hsl_arguments(&args),
            _ => None,
        }
    }

    /// Serialize as `rgb(r, g, b)` or `rgba(r, g, b, a)` when translucent.
    #[must_use]
    pub fn to_css_string(&self) -> String {
        if self.a >= 1.0 {
            format!("rgb({}, {}, {})", self.r, self.g, self.b)
        } else {
            format!(
                "rgba({}, {}, {}, {})",
                self.r,
                self.g,
                self.b,
                format_number((self.a * 1000.0).round() / 1000.0)
            )
        }
    }
}

/// [§ 6.1 Named Colors](https://www.w3.org/TR/css-color-4/#named-colors)
/// "CSS defines a large set of named colors..."
const NAMED_COLORS: [&str; 148] = [
    "aliceblue", "antiquewhite", "aqua", "aquamarine", "azure", "beige", "bisque", "black",
    "blanchedalmond", "blue", "blueviolet", "brown", "burlywood", "cadetblue", "chartreuse",
    "chocolate", "coral", "cornflowerblue", "cornsilk", "crimson", "cyan", "darkblue",
    "darkcyan", "darkgoldenrod", "darkgray", "darkgreen", "darkgrey", "darkkhaki",
    "darkmagenta", "darkolivegreen", "darkorange", "darkorchid", "darkred", "darksalmon",
    "darkseagreen", "darkslateblue", "darkslategray", "darkslategrey", "darkturquoise",
    "darkviolet", "deeppink", "deepskyblue", "dimgray", "dimgrey", "dodgerblue", "firebrick",
    "floralwhite", "forestgreen", "fuchsia", "gainsboro", "ghostwhite", "gold", "goldenrod",
    "gray", "green", "greenyellow", "grey", "honeydew", "hotpink", "indianred", "indigo",
    "ivory", "khaki", "lavender", "lavenderblush", "lawngreen", "lemonchiffon", "lightblue",
    "lightcoral", "lightcyan", "lightgoldenrodyellow", "lightgray", "lightgreen", "lightgrey",
    "lightpink", "lightsalmon", "lightseagreen", "lightskyblue", "lightslategray",
    "lightslategrey", "lightsteelblue", "lightyellow", "lime", "limegreen", "linen", "magenta",
    "maroon", "mediumaquamarine", "mediumblue", "mediumorchid", "mediumpurple",
    "mediumseagreen", "mediumslateblue", "mediumspringgreen", "mediumturquoise",
    "mediumvioletred", "midnightblue", "mintcream", "mistyrose", "moccasin", "navajowhite",
    "navy", "oldlace", "olive", "olivedrab", "orange", "orangered", "orchid", "palegoldenrod",
    "palegreen", "paleturquoise", "palevioletred", "papayawhip", "peachpuff", "peru", "pink",
    "plum", "powderblue", "purple", "rebeccapurple", "red", "rosybrown", "royalblue",
    "saddlebrown", "salmon", "sandybrown", "seagreen", "seashell", "sienna", "silver",
    "skyblue", "slateblue", "slategray", "slategrey", "snow", "springgreen", "steelblue", "tan",
    "teal", "thistle", "tomato", "turquoise", "violet", "wheat", "white", "whitesmoke",
    "yellow", "yellowgreen",
];

/// [§ 4 Representing Colors](https://www.w3.org/TR/css-color-4/#color-type)
///
/// Canonical forms:
/// - hex colors are kept as hex, lowercased;
/// - `rgb()`/`rgba()`/`hsl()`/`hsla()` become `rgb(r, g, b)` or
///   `rgba(r, g, b, a)`;
/// - named colors, `transparent` and `currentcolor` are lowercased.
#[must_use]
pub fn normalize_color(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let lower = trimmed.to_ascii_lowercase();

    if lower.starts_with('#') {
        return Rgba::from_hex(&lower).map(|_| lower);
    }
    if lower == "transparent" || lower == "currentcolor" || NAMED_COLORS.contains(&lower.as_str())
    {
        return Some(lower);
    }
    if lower.contains('(') {
        return Rgba::from_function(trimmed).map(|c| c.to_css_string());
    }
    None
}

/// A single numeric argument of a color function.
#[derive(Debug, Clone, Copy)]
enum ColorArg {
    Number(f64),
    Percentage(f64),
}

impl ColorArg {
    fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.eq_ignore_ascii_case("none") {
            return Some(Self::Number(0.0));
        }
        if let Some(p) = text.strip_suffix('%') {
            return parse_number(p).map(Self::Percentage);
        }
        // Hue angles: deg is the default unit.
        let lower = text.to_ascii_lowercase();
        if let Some(d) = lower.strip_suffix("deg") {
            return parse_number(d).map(Self::Number);
        }
        if let Some(t) = lower.strip_suffix("turn") {
            return parse_number(t).map(|n| Self::Number(n * 360.0));
        }
        parse_number(text).map(Self::Number)
    }
}

/// Split the inside of a color function into channel arguments plus an
/// optional alpha. Accepts `a, b, c[, d]` and `a b c[ / d]`.
fn color_arguments(inner: &str) -> Option<Vec<ColorArg>> {
    let pieces: Vec<String> = if inner.contains(',') {
        split_top_level(inner, ',')
    } else {
        let (channels, alpha) = match inner.split_once('/') {
            Some((c, a)) => (c, Some(a)),
            None => (inner, None),
        };
        let mut pieces: Vec<String> = channels.split_whitespace().map(str::to_string).collect();
        if let Some(a) = alpha {
            pieces.push(a.trim().to_string());
        }
        pieces
    };
    if !(3..=4).contains(&pieces.len()) {
        return None;
    }
    pieces.iter().map(|p| ColorArg::parse(p)).collect()
}

/// [§ 4.1](https://www.w3.org/TR/css-color-4/#rgb-functions)
fn parse_rgb_arguments(args: &[ColorArg]) -> Option<Rgba> {
    let a = args.get(3).map_or(1.0, |&arg| alpha_to_unit(arg));
    Some(Rgba {
        r: color_channel_to_u8(args[0]),
        g: color_channel_to_u8(args[1]),
        b: color_channel_to_u8(args[2]),
        a,
    })
}

/// [§ 7.1](https://www.w3.org/TR/css-color-4/#the-hsl-notation)
fn parse_hsl_arguments(args: &[ColorArg]) -> Option<Rgba> {
    let hue = match args[0] {
        ColorArg::Number(n) => n,
        ColorArg::Percentage(_) => return None,
    };
    let fraction = |arg: ColorArg| match arg {
        ColorArg::Percentage(p) | ColorArg::Number(p) => p / 100.0,
    };
    let (r, g, b) = hsl_to_rgb(hue, fraction(args[1]), fraction(args[2]));
    let a = args.get(3).map_or(1.0, |&arg| alpha_to_unit(arg));
    Some(Rgba { r, g, b, a })
}

/// Convert a color channel argument to a u8 (0-255).
///
/// [§ 4.1](https://www.w3.org/TR/css-color-4/#rgb-functions)
///
/// "Values outside these ranges are not invalid, but are clamped."
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn color_channel_to_u8(arg: ColorArg) -> u8 {
    let v = match arg {
        ColorArg::Number(n) => n,
        // "100% = 255"
        ColorArg::Percentage(p) => p * 255.0 / 100.0,
    };
    v.round().clamp(0.0, 255.0) as u8
}

/// Convert an alpha argument to `0.0..=1.0`.
///
/// "The <alpha-value> can be a <number> (clamped to [0, 1]) or a
/// <percentage> (clamped to [0%, 100%])."
fn alpha_to_unit(arg: ColorArg) -> f64 {
    match arg {
        ColorArg::Number(n) => n,
        ColorArg::Percentage(p) => p / 100.0,
    }
    .clamp(0.0, 1.0)
}

/// [§ 7.1 HSL-to-RGB](https://www.w3.org/TR/css-color-4/#hsl-to-rgb)
///
/// - hue: angle in degrees (wraps)
/// - saturation: 0.0-1.0
/// - lightness: 0.0-1.0
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::many_single_char_names
)]
fn hsl_to_rgb(hue: f64, saturation: f64, lightness: f64) -> (u8, u8, u8) {
    let h = hue.rem_euclid(360.0);
    let s = saturation.clamp(0.0, 1.0);
    let l = lightness.clamp(0.0, 1.0);

    let c = (1.0 - 2.0f64.mul_add(l, -1.0).abs()) * s;
    let h_prime = h / 60.0;
    let x = c * (1.0 - (h_prime % 2.0 - 1.0).abs());

    let (r1, g1, b1) = match h_prime as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        5 => (c, 0.0, x),
        _ => (0.0, 0.0, 0.0),
    };

    let m = l - c / 2.0;
    let to_u8 = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;

    (to_u8(r1), to_u8(g1), to_u8(b1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_lengths() {
        assert_eq!(normalize_color("#FFF").as_deref(), Some("#fff"));
        assert_eq!(normalize_color("#ff000080").as_deref(), Some("#ff000080"));
        assert_eq!(normalize_color("#abcd").as_deref(), Some("#abcd"));
        assert_eq!(normalize_color("#abcde"), None);
        assert_eq!(normalize_color("#ggg"), None);
    }

    #[test]
    fn test_named_colors() {
        assert_eq!(normalize_color("RebeccaPurple").as_deref(), Some("rebeccapurple"));
        assert_eq!(normalize_color("CurrentColor").as_deref(), Some("currentcolor"));
        assert_eq!(normalize_color("transparent").as_deref(), Some("transparent"));
        assert_eq!(normalize_color("notacolor"), None);
    }

    #[test]
    fn test_rgb_functions() {
        assert_eq!(
            normalize_color("rgb(255,0,0)").as_deref(),
            Some("rgb(255, 0, 0)")
        );
        assert_eq!(
            normalize_color("rgba(0, 0, 0, 0.5)").as_deref(),
            Some("rgba(0, 0, 0, 0.5)")
        );
        assert_eq!(
            normalize_color("rgb(100% 0% 0% / 50%)").as_deref(),
            Some("rgba(255, 0, 0, 0.5)")
        );
        assert_eq!(
            normalize_color("rgba(0, 0, 0, 1)").as_deref(),
            Some("rgb(0, 0, 0)")
        );
        assert_eq!(normalize_color("rgb(1, 2)"), None);
        assert_eq!(normalize_color("rgb(a, b, c)"), None);
    }

    #[test]
    fn test_hsl_converts_to_rgb() {
        assert_eq!(
            normalize_color("hsl(0, 100%, 50%)").as_deref(),
            Some("rgb(255, 0, 0)")
        );
        assert_eq!(
            normalize_color("hsl(120deg 100% 25%)").as_deref(),
            Some("rgb(0, 128, 0)")
        );
        assert_eq!(normalize_color("hsl(10%, 1%, 1%)"), None);
    }

    #[test]
    fn test_from_hex_alpha() {
        let c = Rgba::from_hex("#00000080").unwrap();
        assert_eq!(c.to_css_string(), "rgba(0, 0, 0, 0.502)");
    }
}
