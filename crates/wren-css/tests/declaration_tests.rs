//! Integration tests for declaration blocks (the CSSOM `CSSStyleDeclaration`).

use wren_css::DeclarationBlock;

#[test]
fn test_parse_and_serialize() {
    let block = DeclarationBlock::parse("color: RED; margin: 1px 2px; float: left");
    assert_eq!(block.css_text(), "color: red; margin: 1px 2px; float: left;");
    assert_eq!(block.len(), 6);
    assert_eq!(block.item(0), Some("color"));
    assert_eq!(block.item(1), Some("margin-top"));
    assert_eq!(block.item(6), None);
}

#[test]
fn test_later_declaration_wins_unless_earlier_is_important() {
    let block = DeclarationBlock::parse("color: red !important; color: blue; width: 1px; width: 2px");
    assert_eq!(block.get_property_value("color"), "red");
    assert_eq!(block.get_property_priority("color"), "important");
    assert_eq!(block.get_property_value("width"), "2px");
}

#[test]
fn test_set_property_validates() {
    let mut block = DeclarationBlock::new();
    assert!(block.set_property("width", "10px", false));
    assert!(!block.set_property("width", "ten", false));
    assert!(!block.set_property("no-such-property", "1px", false));
    assert_eq!(block.get_property_value("width"), "10px");

    // An empty value removes the property.
    assert!(block.set_property("width", "", false));
    assert!(block.is_empty());
}

#[test]
fn test_camel_case_and_float_aliases() {
    let mut block = DeclarationBlock::new();
    assert!(block.set_property("backgroundColor", "#FFF", false));
    assert!(block.set_property("cssFloat", "right", false));
    assert_eq!(block.get_property_value("background-color"), "#fff");
    assert_eq!(block.get_property_value("float"), "right");
    assert_eq!(block.css_text(), "background-color: #fff; float: right;");
}

#[test]
fn test_shorthand_reads_collapse_from_longhands() {
    let mut block = DeclarationBlock::parse("margin-top: 1px; margin-right: 2px; margin-bottom: 1px");
    assert_eq!(block.get_property_value("margin"), "");
    assert!(block.set_property("margin-left", "2px", false));
    assert_eq!(block.get_property_value("margin"), "1px 2px");
    assert_eq!(block.css_text(), "margin: 1px 2px;");
}

#[test]
fn test_remove_shorthand_removes_longhands() {
    let mut block = DeclarationBlock::parse("padding: 1px; color: red");
    assert_eq!(block.remove_property("padding"), "1px");
    assert_eq!(block.css_text(), "color: red;");
    assert_eq!(block.remove_property("padding"), "");
}

#[test]
fn test_var_values_are_kept_verbatim() {
    let block = DeclarationBlock::parse("--gap: 4px; margin: var(--gap) 0; color: var(--fg, blue)");
    assert_eq!(block.get_property_value("--gap"), "4px");
    assert_eq!(block.get_property_value("margin"), "var(--gap) 0");
    assert_eq!(block.get_property_value("color"), "var(--fg, blue)");
    assert!(block.iter().filter(|d| d.name != "--gap").all(|d| d.has_var()));
}

#[test]
fn test_custom_property_names_are_case_sensitive() {
    let block = DeclarationBlock::parse("--Accent: red; --accent: blue");
    assert_eq!(block.get_property_value("--Accent"), "red");
    assert_eq!(block.get_property_value("--accent"), "blue");
}

#[test]
fn test_set_css_text_replaces_everything() {
    let mut block = DeclarationBlock::parse("color: red");
    block.set_css_text("width: 5px; bogus");
    assert_eq!(block.css_text(), "width: 5px;");
}

#[test]
fn test_hsl_normalizes_to_rgb() {
    let block = DeclarationBlock::parse("color: hsl(0, 100%, 50%)");
    assert_eq!(block.get_property_value("color"), "rgb(255, 0, 0)");
}
