//! The property table.
//!
//! [CSS Cascading § 1.2 Property Definitions](https://www.w3.org/TR/css-cascade-4/)
//!
//! Every property the engine knows is a variant of [`Property`]. The table
//! answers four questions per property: its canonical kebab-case name, the
//! grammar its values must match, whether it is inherited, and (for
//! shorthands) which longhands it sets.

use std::str::FromStr;

use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, EnumIter, EnumString, IntoStaticStr};

use crate::values::{
    self, BackgroundAttachment, BorderCollapse, BorderStyle, BoxSizing, Clear, Direction, Display,
    FlexDirection, FlexWrap, Float, FontStyle, Overflow, Position, TextAlign, TextTransform,
    Visibility, WhiteSpace, normalize_keyword,
};

/// A value grammar: raw text in, canonical text out, `None` if invalid.
pub type Grammar = fn(&str) -> Option<String>;

/// Every property known to the engine.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, AsRefStr, IntoStaticStr, EnumString, EnumIter,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[allow(missing_docs)]
pub enum Property {
    AlignContent,
    AlignItems,
    AlignSelf,
    Background,
    BackgroundAttachment,
    BackgroundClip,
    BackgroundColor,
    BackgroundImage,
    BackgroundOrigin,
    BackgroundPosition,
    BackgroundRepeat,
    BackgroundSize,
    Border,
    BorderBottom,
    BorderBottomColor,
    BorderBottomLeftRadius,
    BorderBottomRightRadius,
    BorderBottomStyle,
    BorderBottomWidth,
    BorderCollapse,
    BorderColor,
    BorderLeft,
    BorderLeftColor,
    BorderLeftStyle,
    BorderLeftWidth,
    BorderRadius,
    BorderRight,
    BorderRightColor,
    BorderRightStyle,
    BorderRightWidth,
    BorderSpacing,
    BorderStyle,
    BorderTop,
    BorderTopColor,
    BorderTopLeftRadius,
    BorderTopRightRadius,
    BorderTopStyle,
    BorderTopWidth,
    BorderWidth,
    Bottom,
    BoxShadow,
    BoxSizing,
    Clear,
    Color,
    Content,
    Cursor,
    Direction,
    Display,
    Flex,
    FlexBasis,
    FlexDirection,
    FlexGrow,
    FlexShrink,
    FlexWrap,
    Float,
    Font,
    FontFamily,
    FontSize,
    FontStyle,
    FontVariant,
    FontWeight,
    Gap,
    Height,
    JustifyContent,
    Left,
    LetterSpacing,
    LineHeight,
    ListStyle,
    ListStyleType,
    Margin,
    MarginBottom,
    MarginLeft,
    MarginRight,
    MarginTop,
    MaxHeight,
    MaxWidth,
    MinHeight,
    MinWidth,
    Opacity,
    Outline,
    Overflow,
    Padding,
    PaddingBottom,
    PaddingLeft,
    PaddingRight,
    PaddingTop,
    PointerEvents,
    Position,
    Right,
    TextAlign,
    TextDecoration,
    TextIndent,
    TextTransform,
    Top,
    Transform,
    Transition,
    VerticalAlign,
    Visibility,
    WhiteSpace,
    Width,
    WordSpacing,
    ZIndex,
}

/// Longhands of `border-top`, in serialization order (width, style, color).
const BORDER_TOP: [Property; 3] = [
    Property::BorderTopWidth,
    Property::BorderTopStyle,
    Property::BorderTopColor,
];
const BORDER_RIGHT: [Property; 3] = [
    Property::BorderRightWidth,
    Property::BorderRightStyle,
    Property::BorderRightColor,
];
const BORDER_BOTTOM: [Property; 3] = [
    Property::BorderBottomWidth,
    Property::BorderBottomStyle,
    Property::BorderBottomColor,
];
const BORDER_LEFT: [Property; 3] = [
    Property::BorderLeftWidth,
    Property::BorderLeftStyle,
    Property::BorderLeftColor,
];

/// `border` sets all twelve side longhands, grouped by side.
const BORDER: [Property; 12] = [
    Property::BorderTopWidth,
    Property::BorderTopStyle,
    Property::BorderTopColor,
    Property::BorderRightWidth,
    Property::BorderRightStyle,
    Property::BorderRightColor,
    Property::BorderBottomWidth,
    Property::BorderBottomStyle,
    Property::BorderBottomColor,
    Property::BorderLeftWidth,
    Property::BorderLeftStyle,
    Property::BorderLeftColor,
];

/// Box edges are always listed top, right, bottom, left.
const BORDER_WIDTH: [Property; 4] = [
    Property::BorderTopWidth,
    Property::BorderRightWidth,
    Property::BorderBottomWidth,
    Property::BorderLeftWidth,
];
const BORDER_STYLE: [Property; 4] = [
    Property::BorderTopStyle,
    Property::BorderRightStyle,
    Property::BorderBottomStyle,
    Property::BorderLeftStyle,
];
const BORDER_COLOR: [Property; 4] = [
    Property::BorderTopColor,
    Property::BorderRightColor,
    Property::BorderBottomColor,
    Property::BorderLeftColor,
];
const MARGIN: [Property; 4] = [
    Property::MarginTop,
    Property::MarginRight,
    Property::MarginBottom,
    Property::MarginLeft,
];
const PADDING: [Property; 4] = [
    Property::PaddingTop,
    Property::PaddingRight,
    Property::PaddingBottom,
    Property::PaddingLeft,
];
/// Corners are listed top-left, top-right, bottom-right, bottom-left.
const BORDER_RADIUS: [Property; 4] = [
    Property::BorderTopLeftRadius,
    Property::BorderTopRightRadius,
    Property::BorderBottomRightRadius,
    Property::BorderBottomLeftRadius,
];
const BACKGROUND: [Property; 5] = [
    Property::BackgroundColor,
    Property::BackgroundImage,
    Property::BackgroundRepeat,
    Property::BackgroundAttachment,
    Property::BackgroundPosition,
];
const FLEX: [Property; 3] = [
    Property::FlexGrow,
    Property::FlexShrink,
    Property::FlexBasis,
];

impl Property {
    /// Look a property up by name.
    ///
    /// Accepts the canonical kebab-case name in any ASCII case
    /// (`background-color`), the camelCase attribute alias
    /// (`backgroundColor`), and `cssFloat`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.starts_with("--") || name.is_empty() {
            return None;
        }
        if name == "cssFloat" {
            return Some(Self::Float);
        }
        if let Ok(property) = Self::from_str(name) {
            return Some(property);
        }
        if name.contains('-') {
            return None;
        }
        Self::from_str(&camel_to_kebab(name)).ok()
    }

    /// The canonical kebab-case name.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// The camelCase alias used by the `style` object (`cssFloat` for `float`).
    #[must_use]
    pub fn camel_case_name(self) -> String {
        if self == Self::Float {
            return "cssFloat".to_string();
        }
        let mut out = String::new();
        let mut upper_next = false;
        for c in self.name().chars() {
            if c == '-' {
                upper_next = true;
            } else if upper_next {
                out.push(c.to_ascii_uppercase());
                upper_next = false;
            } else {
                out.push(c);
            }
        }
        out
    }

    /// The longhands this shorthand sets, or an empty slice for longhands.
    #[must_use]
    pub const fn longhands(self) -> &'static [Self] {
        match self {
            Self::Border => &BORDER,
            Self::BorderTop => &BORDER_TOP,
            Self::BorderRight => &BORDER_RIGHT,
            Self::BorderBottom => &BORDER_BOTTOM,
            Self::BorderLeft => &BORDER_LEFT,
            Self::BorderWidth => &BORDER_WIDTH,
            Self::BorderStyle => &BORDER_STYLE,
            Self::BorderColor => &BORDER_COLOR,
            Self::Margin => &MARGIN,
            Self::Padding => &PADDING,
            Self::BorderRadius => &BORDER_RADIUS,
            Self::Background => &BACKGROUND,
            Self::Flex => &FLEX,
            _ => &[],
        }
    }

    /// True if this property is a shorthand expanded by [`crate::shorthand`].
    #[must_use]
    pub const fn is_shorthand(self) -> bool {
        !self.longhands().is_empty()
    }

    /// Shorthands that set this longhand, most specific first.
    #[must_use]
    pub fn shorthands(self) -> Vec<Self> {
        Self::iter()
            .filter(|s| s.longhands().contains(&self))
            .collect()
    }

    /// [CSS Cascading § 7.2 Inherited Properties](https://www.w3.org/TR/css-cascade-4/#inheriting)
    ///
    /// "Some properties are inherited properties, as defined in their property
    /// definition table."
    #[must_use]
    pub const fn inherited(self) -> bool {
        matches!(
            self,
            Self::BorderCollapse
                | Self::BorderSpacing
                | Self::Color
                | Self::Cursor
                | Self::Direction
                | Self::Font
                | Self::FontFamily
                | Self::FontSize
                | Self::FontStyle
                | Self::FontVariant
                | Self::FontWeight
                | Self::LetterSpacing
                | Self::LineHeight
                | Self::ListStyle
                | Self::ListStyleType
                | Self::PointerEvents
                | Self::TextAlign
                | Self::TextIndent
                | Self::TextTransform
                | Self::Visibility
                | Self::WhiteSpace
                | Self::WordSpacing
        )
    }

    /// The grammar a longhand's value must match. Shorthands return
    /// [`values::normalize_any`]; their values are checked by the expander.
    #[must_use]
    pub fn grammar(self) -> Grammar {
        match self {
            Self::BackgroundAttachment => normalize_keyword::<BackgroundAttachment>,
            Self::BackgroundColor
            | Self::BorderBottomColor
            | Self::BorderLeftColor
            | Self::BorderRightColor
            | Self::BorderTopColor
            | Self::Color => values::normalize_color,
            Self::BackgroundImage => values::normalize_image,
            Self::BackgroundPosition => values::normalize_background_position,
            Self::BackgroundRepeat => values::normalize_background_repeat,
            Self::BorderBottomStyle
            | Self::BorderLeftStyle
            | Self::BorderRightStyle
            | Self::BorderTopStyle => normalize_keyword::<BorderStyle>,
            Self::BorderBottomWidth
            | Self::BorderLeftWidth
            | Self::BorderRightWidth
            | Self::BorderTopWidth => values::normalize_border_width,
            Self::BorderBottomLeftRadius
            | Self::BorderBottomRightRadius
            | Self::BorderTopLeftRadius
            | Self::BorderTopRightRadius
            | Self::PaddingBottom
            | Self::PaddingLeft
            | Self::PaddingRight
            | Self::PaddingTop => values::normalize_non_negative_measurement,
            Self::BorderCollapse => normalize_keyword::<BorderCollapse>,
            Self::Bottom
            | Self::Left
            | Self::Right
            | Self::Top
            | Self::Height
            | Self::Width
            | Self::MinHeight
            | Self::MinWidth
            | Self::MarginBottom
            | Self::MarginLeft
            | Self::MarginRight
            | Self::MarginTop => values::normalize_measurement_or_auto,
            Self::BoxSizing => normalize_keyword::<BoxSizing>,
            Self::Clear => normalize_keyword::<Clear>,
            Self::Direction => normalize_keyword::<Direction>,
            Self::Display => normalize_keyword::<Display>,
            Self::FlexBasis => values::normalize_flex_basis,
            Self::FlexDirection => normalize_keyword::<FlexDirection>,
            Self::FlexGrow | Self::FlexShrink => values::normalize_non_negative_number,
            Self::FlexWrap => normalize_keyword::<FlexWrap>,
            Self::Float => normalize_keyword::<Float>,
            Self::FontSize => values::normalize_font_size,
            Self::FontStyle => normalize_keyword::<FontStyle>,
            Self::FontWeight => values::normalize_font_weight,
            Self::LetterSpacing | Self::WordSpacing => values::normalize_spacing,
            Self::LineHeight => values::normalize_line_height,
            Self::MaxHeight | Self::MaxWidth => values::normalize_measurement_or_none,
            Self::Opacity => values::normalize_alpha,
            Self::Overflow => normalize_keyword::<Overflow>,
            Self::Position => normalize_keyword::<Position>,
            Self::TextAlign => normalize_keyword::<TextAlign>,
            Self::TextIndent => values::normalize_measurement,
            Self::TextTransform => normalize_keyword::<TextTransform>,
            Self::VerticalAlign => values::normalize_vertical_align,
            Self::Visibility => normalize_keyword::<Visibility>,
            Self::WhiteSpace => normalize_keyword::<WhiteSpace>,
            Self::ZIndex => values::normalize_integer_or_auto,
            _ => values::normalize_any,
        }
    }

    /// All longhands, in table order.
    pub fn all_longhands() -> impl Iterator<Item = Self> {
        Self::iter().filter(|p| !p.is_shorthand())
    }
}

/// True if `name` is a custom property name (`--*`).
///
/// [CSS Variables § 2](https://www.w3.org/TR/css-variables-1/#defining-variables)
/// "A custom property is any property whose name starts with two dashes"
#[must_use]
pub fn is_custom_property(name: &str) -> bool {
    name.starts_with("--") && name.len() > 2
}

/// Canonicalize a property name for storage: custom properties keep their
/// case, known properties use their kebab-case name, anything else is
/// lowercased.
#[must_use]
pub fn canonical_name(name: &str) -> String {
    let name = name.trim();
    if is_custom_property(name) {
        return name.to_string();
    }
    Property::from_name(name).map_or_else(|| name.to_ascii_lowercase(), |p| p.name().to_string())
}

/// `backgroundColor` -> `background-color`
fn camel_to_kebab(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kebab_case_names() {
        assert_eq!(Property::BorderTopLeftRadius.name(), "border-top-left-radius");
        assert_eq!(Property::ZIndex.name(), "z-index");
        assert_eq!(Property::BackgroundColor.as_ref(), "background-color");
    }

    #[test]
    fn test_from_name_aliases() {
        assert_eq!(Property::from_name("background-color"), Some(Property::BackgroundColor));
        assert_eq!(Property::from_name("BACKGROUND-COLOR"), Some(Property::BackgroundColor));
        assert_eq!(Property::from_name("backgroundColor"), Some(Property::BackgroundColor));
        assert_eq!(Property::from_name("cssFloat"), Some(Property::Float));
        assert_eq!(Property::from_name("zIndex"), Some(Property::ZIndex));
        assert_eq!(Property::from_name("not-a-property"), None);
        assert_eq!(Property::from_name("--custom"), None);
    }

    #[test]
    fn test_camel_case_round_trip() {
        for property in Property::iter() {
            assert_eq!(
                Property::from_name(&property.camel_case_name()),
                Some(property),
                "{property:?}"
            );
        }
    }

    #[test]
    fn test_shorthand_tables() {
        assert_eq!(Property::Border.longhands().len(), 12);
        assert_eq!(Property::BorderTop.longhands().len(), 3);
        assert!(Property::Margin.is_shorthand());
        assert!(!Property::MarginTop.is_shorthand());
        assert!(Property::MarginTop.shorthands().contains(&Property::Margin));
        let border_top_width = Property::BorderTopWidth.shorthands();
        assert!(border_top_width.contains(&Property::Border));
        assert!(border_top_width.contains(&Property::BorderTop));
        assert!(border_top_width.contains(&Property::BorderWidth));
    }

    #[test]
    fn test_inherited_flags() {
        assert!(Property::Color.inherited());
        assert!(Property::FontSize.inherited());
        assert!(!Property::Display.inherited());
        assert!(!Property::MarginTop.inherited());
    }

    #[test]
    fn test_canonical_name() {
        assert_eq!(canonical_name("--Brand-Color"), "--Brand-Color");
        assert_eq!(canonical_name("Color"), "color");
        assert_eq!(canonical_name("marginTop"), "margin-top");
        assert_eq!(canonical_name("X-Unknown"), "x-unknown");
    }
}
