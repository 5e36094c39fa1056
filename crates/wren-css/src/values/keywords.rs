//! Keyword value sets.
//!
//! Each set is a `strum` enum serialized in kebab-case and parsed
//! case-insensitively, so `normalize_keyword::<BorderStyle>("SOLID")` yields
//! `"solid"`.

use std::str::FromStr;

use strum_macros::{AsRefStr, EnumIter, EnumString};

/// Parse `raw` as a member of the keyword set `K` and return its canonical
/// lowercase spelling.
#[must_use]
pub fn normalize_keyword<K>(raw: &str) -> Option<String>
where
    K: FromStr + AsRef<str>,
{
    K::from_str(raw.trim())
        .ok()
        .map(|k| k.as_ref().to_string())
}

/// [§ 3.2 border-style](https://www.w3.org/TR/css-backgrounds-3/#border-style)
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum BorderStyle {
    /// `none`
    None,
    /// `hidden`
    Hidden,
    /// `dotted`
    Dotted,
    /// `dashed`
    Dashed,
    /// `solid`
    Solid,
    /// `double`
    Double,
    /// `groove`
    Groove,
    /// `ridge`
    Ridge,
    /// `inset`
    Inset,
    /// `outset`
    Outset,
}

/// [§ 3.1 border-width](https://www.w3.org/TR/css-backgrounds-3/#border-width)
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum BorderWidthKeyword {
    /// `thin`
    Thin,
    /// `medium`
    Medium,
    /// `thick`
    Thick,
}

/// [CSS 2.2 § 17.6 border-collapse](https://www.w3.org/TR/CSS22/tables.html#borders)
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum BorderCollapse {
    /// `separate`
    Separate,
    /// `collapse`
    Collapse,
}

/// [§ 3.4 background-repeat](https://www.w3.org/TR/css-backgrounds-3/#background-repeat)
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum BackgroundRepeat {
    /// `repeat`
    Repeat,
    /// `repeat-x`
    RepeatX,
    /// `repeat-y`
    RepeatY,
    /// `no-repeat`
    NoRepeat,
    /// `space`
    Space,
    /// `round`
    Round,
}

/// [§ 3.5 background-attachment](https://www.w3.org/TR/css-backgrounds-3/#background-attachment)
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum BackgroundAttachment {
    /// `scroll`
    Scroll,
    /// `fixed`
    Fixed,
    /// `local`
    Local,
}

/// [§ 3.6 background-position](https://www.w3.org/TR/css-backgrounds-3/#background-position)
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum BackgroundPositionKeyword {
    /// `left`
    Left,
    /// `center`
    Center,
    /// `right`
    Right,
    /// `top`
    Top,
    /// `bottom`
    Bottom,
}

/// [CSS 2.2 § 9.5.2 clear](https://www.w3.org/TR/CSS22/visuren.html#flow-control)
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Clear {
    /// `none`
    None,
    /// `left`
    Left,
    /// `right`
    Right,
    /// `both`
    Both,
    /// `inline-start`
    InlineStart,
    /// `inline-end`
    InlineEnd,
}

/// [CSS 2.2 § 9.5.1 float](https://www.w3.org/TR/CSS22/visuren.html#float-position)
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Float {
    /// `none`
    None,
    /// `left`
    Left,
    /// `right`
    Right,
    /// `inline-start`
    InlineStart,
    /// `inline-end`
    InlineEnd,
}

/// [§ 2.2 font-size](https://www.w3.org/TR/css-fonts-4/#font-size-prop)
/// `<absolute-size>` and `<relative-size>` keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum FontSizeKeyword {
    /// `xx-small`
    XxSmall,
    /// `x-small`
    XSmall,
    /// `small`
    Small,
    /// `medium`
    Medium,
    /// `large`
    Large,
    /// `x-large`
    XLarge,
    /// `xx-large`
    XxLarge,
    /// `xxx-large`
    XxxLarge,
    /// `smaller`
    Smaller,
    /// `larger`
    Larger,
}

/// [§ 2.1 font-weight](https://www.w3.org/TR/css-fonts-4/#font-weight-prop)
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum FontWeightKeyword {
    /// `normal`
    Normal,
    /// `bold`
    Bold,
    /// `bolder`
    Bolder,
    /// `lighter`
    Lighter,
}

/// [§ 2.4 font-style](https://www.w3.org/TR/css-fonts-4/#font-style-prop)
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum FontStyle {
    /// `normal`
    Normal,
    /// `italic`
    Italic,
    /// `oblique`
    Oblique,
}

/// [CSS Display § 2](https://www.w3.org/TR/css-display-3/#the-display-properties)
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Display {
    /// `inline`
    Inline,
    /// `block`
    Block,
    /// `inline-block`
    InlineBlock,
    /// `flex`
    Flex,
    /// `inline-flex`
    InlineFlex,
    /// `grid`
    Grid,
    /// `inline-grid`
    InlineGrid,
    /// `flow-root`
    FlowRoot,
    /// `list-item`
    ListItem,
    /// `table`
    Table,
    /// `inline-table`
    InlineTable,
    /// `table-row`
    TableRow,
    /// `table-cell`
    TableCell,
    /// `table-row-group`
    TableRowGroup,
    /// `table-header-group`
    TableHeaderGroup,
    /// `table-footer-group`
    TableFooterGroup,
    /// `table-column`
    TableColumn,
    /// `table-column-group`
    TableColumnGroup,
    /// `table-caption`
    TableCaption,
    /// `contents`
    Contents,
    /// `none`
    None,
}

/// [CSS Positioned Layout § 2](https://www.w3.org/TR/css-position-3/#position-property)
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Position {
    /// `static`
    Static,
    /// `relative`
    Relative,
    /// `absolute`
    Absolute,
    /// `fixed`
    Fixed,
    /// `sticky`
    Sticky,
}

/// [CSS Display § 4.1 visibility](https://www.w3.org/TR/css-display-3/#visibility)
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Visibility {
    /// `visible`
    Visible,
    /// `hidden`
    Hidden,
    /// `collapse`
    Collapse,
}

/// [CSS Box Sizing § 4.1](https://www.w3.org/TR/css-sizing-3/#box-sizing)
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum BoxSizing {
    /// `content-box`
    ContentBox,
    /// `border-box`
    BorderBox,
}

/// [CSS Flexbox § 5.1 flex-direction](https://www.w3.org/TR/css-flexbox-1/#flex-direction-property)
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum FlexDirection {
    /// `row`
    Row,
    /// `row-reverse`
    RowReverse,
    /// `column`
    Column,
    /// `column-reverse`
    ColumnReverse,
}

/// [CSS Flexbox § 5.2 flex-wrap](https://www.w3.org/TR/css-flexbox-1/#flex-wrap-property)
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum FlexWrap {
    /// `nowrap`
    Nowrap,
    /// `wrap`
    Wrap,
    /// `wrap-reverse`
    WrapReverse,
}

/// [CSS Text § 6.1 text-align](https://www.w3.org/TR/css-text-3/#text-align-property)
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum TextAlign {
    /// `start`
    Start,
    /// `end`
    End,
    /// `left`
    Left,
    /// `right`
    Right,
    /// `center`
    Center,
    /// `justify`
    Justify,
}

/// [CSS Text § 2.1 text-transform](https://www.w3.org/TR/css-text-3/#text-transform-property)
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum TextTransform {
    /// `none`
    None,
    /// `capitalize`
    Capitalize,
    /// `uppercase`
    Uppercase,
    /// `lowercase`
    Lowercase,
}

/// [CSS Text § 3 white-space](https://www.w3.org/TR/css-text-3/#white-space-property)
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum WhiteSpace {
    /// `normal`
    Normal,
    /// `pre`
    Pre,
    /// `nowrap`
    Nowrap,
    /// `pre-wrap`
    PreWrap,
    /// `pre-line`
    PreLine,
    /// `break-spaces`
    BreakSpaces,
}

/// [CSS Overflow § 3](https://www.w3.org/TR/css-overflow-3/#overflow-properties)
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Overflow {
    /// `visible`
    Visible,
    /// `hidden`
    Hidden,
    /// `clip`
    Clip,
    /// `scroll`
    Scroll,
    /// `auto`
    Auto,
}

/// [CSS Writing Modes § 2.1 direction](https://www.w3.org/TR/css-writing-modes-3/#direction)
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Direction {
    /// `ltr`
    Ltr,
    /// `rtl`
    Rtl,
}

/// [CSS 2.2 § 10.8.1 vertical-align](https://www.w3.org/TR/CSS22/visudet.html#propdef-vertical-align)
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum VerticalAlignKeyword {
    /// `baseline`
    Baseline,
    /// `sub`
    Sub,
    /// `super`
    Super,
    /// `text-top`
    TextTop,
    /// `text-bottom`
    TextBottom,
    /// `middle`
    Middle,
    /// `top`
    Top,
    /// `bottom`
    Bottom,
}
