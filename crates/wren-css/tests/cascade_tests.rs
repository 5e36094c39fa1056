//! Integration tests for the cascade: specificity, importance, inheritance,
//! custom properties, shadow scoping and conditional rules.

use wren_css::StyleEngine;
use wren_dom::{DomTree, NodeId, ShadowRootMode};

/// Create an element with attributes and append it to `parent`.
fn element(tree: &mut DomTree, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
    let id = tree.create_element(tag);
    for (name, value) in attrs {
        tree.set_attribute(id, name, value);
    }
    tree.append_child(parent, id);
    id
}

/// Append a `<style>` element holding `css` to `parent`.
fn style(tree: &mut DomTree, parent: NodeId, css: &str) -> NodeId {
    let style = tree.create_element("style");
    let text = tree.create_text(css);
    tree.append_child(style, text);
    tree.append_child(parent, style);
    style
}

/// `<html><head><style>css</style></head><body></body></html>`, returning body.
fn document(css: &str) -> (DomTree, NodeId) {
    let mut tree = DomTree::new();
    let html = element(&mut tree, NodeId::ROOT, "html", &[]);
    let head = element(&mut tree, html, "head", &[]);
    let _ = style(&mut tree, head, css);
    let body = element(&mut tree, html, "body", &[]);
    (tree, body)
}

fn value(engine: &mut StyleEngine, tree: &DomTree, id: NodeId, property: &str) -> String {
    engine.get_computed_style(tree, id).get_property_value(property)
}

// ========== specificity ==========

#[test]
fn test_id_beats_class_beats_type_regardless_of_order() {
    for css in [
        "#a { color: red } .b.c { color: green } div { color: blue }",
        "div { color: blue } .b.c { color: green } #a { color: red }",
    ] {
        let (mut tree, body) = document(css);
        let with_id = element(&mut tree, body, "div", &[("id", "a"), ("class", "b c")]);
        let with_classes = element(&mut tree, body, "div", &[("class", "b c")]);
        let plain = element(&mut tree, body, "div", &[]);

        let mut engine = StyleEngine::default();
        assert_eq!(value(&mut engine, &tree, with_id, "color"), "red", "{css}");
        assert_eq!(value(&mut engine, &tree, with_classes, "color"), "green", "{css}");
        assert_eq!(value(&mut engine, &tree, plain, "color"), "blue", "{css}");
    }
}

#[test]
fn test_equal_specificity_later_rule_wins() {
    let (mut tree, body) = document(".x { color: red } .y { color: blue }");
    let div = element(&mut tree, body, "div", &[("class", "y x")]);
    let mut engine = StyleEngine::default();
    assert_eq!(value(&mut engine, &tree, div, "color"), "blue");
}

#[test]
fn test_where_adds_no_specificity() {
    let (mut tree, body) = document(":where(#a) { color: red } div { color: blue }");
    let div = element(&mut tree, body, "div", &[("id", "a")]);
    let mut engine = StyleEngine::default();
    assert_eq!(value(&mut engine, &tree, div, "color"), "blue");
}

// ========== importance ==========

#[test]
fn test_important_beats_higher_specificity() {
    let (mut tree, body) = document("div { color: red !important } #a { color: blue }");
    let div = element(&mut tree, body, "div", &[("id", "a")]);
    let mut engine = StyleEngine::default();
    let style = engine.get_computed_style(&tree, div);
    assert_eq!(style.get_property_value("color"), "red");
    assert_eq!(style.get_property_priority("color"), "important");
}

#[test]
fn test_inline_and_sheet_importance() {
    let (mut tree, body) = document("div { color: red !important; margin: 1px !important }");
    let div = element(
        &mut tree,
        body,
        "div",
        &[("style", "color: blue !important; margin: 5px")],
    );
    let mut engine = StyleEngine::default();
    // Inline important beats sheet important.
    assert_eq!(value(&mut engine, &tree, div, "color"), "blue");
    // Sheet important beats inline normal.
    assert_eq!(value(&mut engine, &tree, div, "margin"), "1px");
}

#[test]
fn test_inline_beats_id_rule() {
    let (mut tree, body) = document("#a { color: red }");
    let div = element(&mut tree, body, "div", &[("id", "a"), ("style", "color: green")]);
    let mut engine = StyleEngine::default();
    assert_eq!(value(&mut engine, &tree, div, "color"), "green");
}

// ========== inheritance ==========

#[test]
fn test_inherited_and_non_inherited_properties() {
    let (mut tree, body) = document("");
    let div = element(&mut tree, body, "div", &[("style", "color: red; margin: 4px")]);
    let span = element(&mut tree, div, "span", &[]);

    let mut engine = StyleEngine::default();
    let style = engine.get_computed_style(&tree, span);
    assert_eq!(style.get_property_value("color"), "red");
    assert_eq!(style.get_property_value("display"), "inline");
    assert_eq!(style.get_property_value("margin-top"), "");
    assert_eq!(value(&mut engine, &tree, div, "display"), "block");
}

#[test]
fn test_own_declaration_beats_inherited_value() {
    let (mut tree, body) = document("#outer { color: red } span { color: blue }");
    let div = element(&mut tree, body, "div", &[("id", "outer")]);
    let span = element(&mut tree, div, "span", &[]);
    let mut engine = StyleEngine::default();
    assert_eq!(value(&mut engine, &tree, span, "color"), "blue");
}

#[test]
fn test_inherit_and_unset_keywords() {
    let (mut tree, body) = document(
        "div { background-color: red; color: green }
         span { background-color: inherit; color: unset }
         em { color: blue; margin-top: unset }",
    );
    let div = element(&mut tree, body, "div", &[]);
    let span = element(&mut tree, div, "span", &[]);
    let em = element(&mut tree, span, "em", &[("style", "margin-top: 3px !important")]);

    let mut engine = StyleEngine::default();
    assert_eq!(value(&mut engine, &tree, span, "background-color"), "red");
    assert_eq!(value(&mut engine, &tree, span, "color"), "green");
    assert_eq!(value(&mut engine, &tree, em, "color"), "blue");
    assert_eq!(value(&mut engine, &tree, em, "margin-top"), "3px");
}

#[test]
fn test_tag_defaults_are_lowest_layer() {
    let (mut tree, body) = document("div { display: flex } h1 { font-size: 40px }");
    let div = element(&mut tree, body, "div", &[]);
    let h1 = element(&mut tree, body, "h1", &[]);
    let script = element(&mut tree, body, "script", &[]);
    let row_table = element(&mut tree, body, "table", &[]);
    let tr = element(&mut tree, row_table, "tr", &[]);

    let mut engine = StyleEngine::default();
    assert_eq!(value(&mut engine, &tree, div, "display"), "flex");
    assert_eq!(value(&mut engine, &tree, h1, "font-size"), "40px");
    assert_eq!(value(&mut engine, &tree, h1, "font-weight"), "bold");
    assert_eq!(value(&mut engine, &tree, script, "display"), "none");
    assert_eq!(value(&mut engine, &tree, tr, "display"), "table-row");
}

// ========== custom properties ==========

#[test]
fn test_var_substitution() {
    let (mut tree, body) = document("div { --x: 2px; width: var(--x) }");
    let div = element(&mut tree, body, "div", &[]);
    let mut engine = StyleEngine::default();
    let style = engine.get_computed_style(&tree, div);
    assert_eq!(style.get_property_value("width"), "2px");
    assert_eq!(style.get_property_value("--x"), "2px");
}

#[test]
fn test_undefined_var_falls_through_to_lower_declaration() {
    let (mut tree, body) = document("div { width: 10px } #a { width: var(--undefined) }");
    let div = element(&mut tree, body, "div", &[("id", "a")]);
    let other = element(&mut tree, body, "p", &[("id", "a")]);
    let mut engine = StyleEngine::default();
    assert_eq!(value(&mut engine, &tree, div, "width"), "10px");
    assert_eq!(value(&mut engine, &tree, other, "width"), "");
}

#[test]
fn test_custom_properties_inherit_and_chain() {
    let (mut tree, body) = document(
        ":root { --base: 4px; --double: var(--base) var(--base) }
         p { margin: var(--double); color: var(--accent, rgb(0, 0, 255)) }",
    );
    let p = element(&mut tree, body, "p", &[]);
    let mut engine = StyleEngine::default();
    let style = engine.get_computed_style(&tree, p);
    assert_eq!(style.get_property_value("margin"), "4px");
    assert_eq!(style.get_property_value("margin-left"), "4px");
    assert_eq!(style.get_property_value("color"), "rgb(0, 0, 255)");
    assert_eq!(style.get_property_value("--base"), "4px");
}

#[test]
fn test_invalid_substituted_value_is_dropped() {
    let (mut tree, body) = document("p { --c: 12px; color: green } p { color: var(--c) }");
    let p = element(&mut tree, body, "p", &[]);
    let mut engine = StyleEngine::default();
    assert_eq!(value(&mut engine, &tree, p, "color"), "green");
}

#[test]
fn test_cyclic_custom_properties_are_invalid() {
    let (mut tree, body) = document("div { --a: var(--b); --b: var(--a); width: var(--a, 7px) }");
    let div = element(&mut tree, body, "div", &[]);
    let mut engine = StyleEngine::default();
    let style = engine.get_computed_style(&tree, div);
    assert_eq!(style.get_property_value("--a"), "");
    assert_eq!(style.get_property_value("--b"), "");
    assert_eq!(style.get_property_value("width"), "7px");
}

// ========== shadow scoping ==========

#[test]
fn test_host_rule_styles_host_and_shadow_rules_do_not_leak() {
    let (mut tree, body) = document("");
    let host = element(&mut tree, body, "my-card", &[]);
    let light_p = element(&mut tree, body, "p", &[]);
    let shadow = tree
        .attach_shadow(host, ShadowRootMode::Open)
        .expect("host accepts a shadow root");
    let _ = style(&mut tree, shadow, ":host { color: red } p { color: blue }");
    let inner_p = element(&mut tree, shadow, "p", &[]);
    let inner_span = element(&mut tree, shadow, "span", &[]);

    let mut engine = StyleEngine::default();
    assert_eq!(value(&mut engine, &tree, host, "color"), "red");
    assert_eq!(value(&mut engine, &tree, light_p, "color"), "");
    assert_eq!(value(&mut engine, &tree, inner_p, "color"), "blue");
    // Inherits from the host across the shadow boundary.
    assert_eq!(value(&mut engine, &tree, inner_span, "color"), "red");
}

#[test]
fn test_outer_rules_beat_host_rules() {
    let (mut tree, body) = document("my-card { color: green }");
    let host = element(&mut tree, body, "my-card", &[("class", "dark")]);
    let shadow = tree
        .attach_shadow(host, ShadowRootMode::Closed)
        .expect("host accepts a shadow root");
    let _ = style(
        &mut tree,
        shadow,
        ":host { color: red; margin: 2px } :host(.dark) p { color: white }",
    );
    let inner = element(&mut tree, shadow, "p", &[]);

    let mut engine = StyleEngine::default();
    assert_eq!(value(&mut engine, &tree, host, "color"), "green");
    assert_eq!(value(&mut engine, &tree, host, "margin"), "2px");
    assert_eq!(value(&mut engine, &tree, inner, "color"), "white");
}

#[test]
fn test_document_rules_do_not_reach_into_shadow_tree() {
    let (mut tree, body) = document("p { color: red } body p { margin: 1px }");
    let host = element(&mut tree, body, "div", &[]);
    let shadow = tree
        .attach_shadow(host, ShadowRootMode::Open)
        .expect("host accepts a shadow root");
    let inner = element(&mut tree, shadow, "p", &[]);

    let mut engine = StyleEngine::default();
    assert_eq!(value(&mut engine, &tree, inner, "color"), "");
    assert_eq!(value(&mut engine, &tree, inner, "margin-top"), "1em");
}

// ========== conditional rules and tolerance ==========

#[test]
fn test_media_and_supports() {
    let (mut tree, body) = document(
        "@media (min-width: 2000px) { p { color: blue } }
         @media screen and (min-width: 600px) { p { margin: 3px } }
         @supports (display: grid) { p { padding: 1px } }
         @supports (display: nonsense) { p { color: red } }",
    );
    let p = element(&mut tree, body, "p", &[]);
    let mut engine = StyleEngine::default();
    let style = engine.get_computed_style(&tree, p);
    assert_eq!(style.get_property_value("color"), "");
    assert_eq!(style.get_property_value("margin"), "3px");
    assert_eq!(style.get_property_value("padding"), "1px");
}

#[test]
fn test_unparsable_rule_does_not_break_the_sheet() {
    let (mut tree, body) = document(
        "p { color: red }
         ..broken > { color: green }
         @unknown-thing foo { p { color: purple } }
         span { color: nonsense; margin: 2px }
         em { color: blue }",
    );
    let p = element(&mut tree, body, "p", &[]);
    let span = element(&mut tree, body, "span", &[]);
    let em = element(&mut tree, body, "em", &[]);
    let mut engine = StyleEngine::default();
    assert_eq!(value(&mut engine, &tree, p, "color"), "red");
    assert_eq!(value(&mut engine, &tree, span, "color"), "");
    assert_eq!(value(&mut engine, &tree, span, "margin"), "2px");
    assert_eq!(value(&mut engine, &tree, em, "color"), "blue");
}

#[test]
fn test_disconnected_element_gets_defaults_only() {
    let (mut tree, _body) = document("div { color: red }");
    let div = tree.create_element("div");
    tree.set_attribute(div, "style", "margin: 1px");

    let mut engine = StyleEngine::default();
    let style = engine.get_computed_style(&tree, div);
    assert_eq!(style.get_property_value("display"), "block");
    assert_eq!(style.get_property_value("color"), "");
    assert_eq!(style.get_property_value("margin"), "");
}

#[test]
fn test_local_style_is_inline_only() {
    let (mut tree, body) = document("div { color: red }");
    let div = element(
        &mut tree,
        body,
        "div",
        &[("style", "margin: 1px 2px; color: bogus; width: var(--w)")],
    );
    let mut engine = StyleEngine::default();
    let local = engine.get_local_style(&tree, div);
    assert_eq!(local.get_property_value("margin"), "1px 2px");
    assert_eq!(local.get_property_value("color"), "");
    assert_eq!(local.get_property_value("width"), "var(--w)");
    assert_eq!(local.get_property_value("display"), "");
}

#[test]
fn test_inline_shorthand_round_trip_through_engine() {
    let (mut tree, body) = document("");
    let div = element(&mut tree, body, "div", &[]);
    assert!(StyleEngine::set_inline_property(
        &mut tree, div, "border", "1px solid red", false
    ));
    assert_eq!(
        StyleEngine::inline_style(&tree, div).css_text(),
        "border: 1px solid red;"
    );
    let mut engine = StyleEngine::default();
    assert_eq!(value(&mut engine, &tree, div, "border-left-style"), "solid");
    assert_eq!(value(&mut engine, &tree, div, "border"), "1px solid red");
}
