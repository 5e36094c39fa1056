//! Integration tests for shorthand expansion and collapse.

use wren_css::shorthand::{collapse, expand};
use wren_css::{ComputedStyleMap, DeclarationBlock, Property};

/// Expand `value` for `name` into a fresh map.
fn expanded(name: &str, value: &str) -> ComputedStyleMap {
    let property = Property::from_name(name).expect("known property");
    let mut map = ComputedStyleMap::new();
    for (longhand, resolved) in expand(property, value, false).expect("valid value") {
        map.insert(longhand.name(), resolved);
    }
    map
}

fn round_trip(name: &str, value: &str) -> String {
    let property = Property::from_name(name).expect("known property");
    let map = expanded(name, value);
    collapse(property, |p| map.get_longhand(p))
}

#[test]
fn test_margin_round_trip() {
    assert_eq!(round_trip("margin", "1px 2px 3px 4px"), "1px 2px 3px 4px");
    assert_eq!(round_trip("margin", "1px 2px 3px 2px"), "1px 2px 3px");
    assert_eq!(round_trip("margin", "1px 2px 1px 2px"), "1px 2px");
    assert_eq!(round_trip("margin", "auto 0"), "auto 0px");
}

#[test]
fn test_single_value_fills_every_edge() {
    let map = expanded("margin", "5px");
    for edge in ["margin-top", "margin-right", "margin-bottom", "margin-left"] {
        assert_eq!(map.get_property_value(edge), "5px", "{edge}");
    }
    assert_eq!(map.len(), 4);
}

#[test]
fn test_three_values_mirror_right_to_left() {
    let map = expanded("padding", "1px 2px 3px");
    assert_eq!(map.get_property_value("padding-top"), "1px");
    assert_eq!(map.get_property_value("padding-right"), "2px");
    assert_eq!(map.get_property_value("padding-bottom"), "3px");
    assert_eq!(map.get_property_value("padding-left"), "2px");
}

#[test]
fn test_invalid_component_rejects_whole_shorthand() {
    assert!(expand(Property::Margin, "1px bogus", false).is_none());
    assert!(expand(Property::Padding, "-1px", false).is_none());
    assert!(expand(Property::Margin, "1px 2px 3px 4px 5px", false).is_none());
    assert!(expand(Property::Border, "1px solid red blue", false).is_none());
}

#[test]
fn test_border_expands_to_every_side() {
    let map = expanded("border", "2px dashed #ff0000");
    assert_eq!(map.len(), 12);
    assert_eq!(map.get_property_value("border-left-width"), "2px");
    assert_eq!(map.get_property_value("border-top-style"), "dashed");
    assert_eq!(map.get_property_value("border-bottom-color"), "#ff0000");
    assert_eq!(map.get_property_value("border"), "2px dashed #ff0000");
    assert_eq!(map.get_property_value("border-width"), "2px");
}

#[test]
fn test_border_components_in_any_order() {
    assert_eq!(round_trip("border-top", "red solid"), "solid red");
    assert_eq!(round_trip("border-top", "thin"), "thin");
}

#[test]
fn test_background_omits_initial_components() {
    assert_eq!(round_trip("background", "red"), "red");
    assert_eq!(
        round_trip("background", "url(a.png) no-repeat"),
        "url(\"a.png\") no-repeat"
    );
    assert_eq!(round_trip("background", "none"), "none");
}

#[test]
fn test_flex_keywords() {
    let map = expanded("flex", "initial");
    assert_eq!(map.get_property_value("flex-grow"), "0");
    assert_eq!(map.get_property_value("flex-shrink"), "1");
    assert_eq!(map.get_property_value("flex-basis"), "auto");
}

#[test]
fn test_css_wide_keyword_applies_to_every_longhand() {
    let map = expanded("margin", "inherit");
    assert_eq!(map.get_property_value("margin-top"), "inherit");
    assert_eq!(map.get_property_value("margin"), "inherit");
}

#[test]
fn test_mixed_importance_does_not_collapse() {
    let mut block = DeclarationBlock::new();
    assert!(block.set_property("margin", "1px", false));
    assert!(block.set_property("margin-top", "2px", true));
    assert_eq!(block.get_property_value("margin"), "");
    assert_eq!(block.get_property_value("margin-top"), "2px");
}
