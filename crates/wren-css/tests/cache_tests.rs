//! Integration tests for computed-style caching and invalidation.

use wren_css::cache::CacheStats;
use wren_css::{StyleEngine, StyleSheet};
use wren_dom::{DomTree, NodeId};

struct Fixture {
    tree: DomTree,
    body: NodeId,
    div: NodeId,
    span: NodeId,
    text: NodeId,
}

/// `html > (head > style, body > div > span)` with `css` in the style element.
fn fixture(css: &str) -> Fixture {
    let mut tree = DomTree::new();
    let html = tree.create_element("html");
    tree.append_child(NodeId::ROOT, html);
    let head = tree.create_element("head");
    tree.append_child(html, head);
    let style = tree.create_element("style");
    let text = tree.create_text(css);
    tree.append_child(style, text);
    tree.append_child(head, style);
    let body = tree.create_element("body");
    tree.append_child(html, body);
    let div = tree.create_element("div");
    tree.append_child(body, div);
    let span = tree.create_element("span");
    tree.append_child(div, span);
    Fixture {
        tree,
        body,
        div,
        span,
        text,
    }
}

fn color(engine: &mut StyleEngine, tree: &DomTree, id: NodeId) -> String {
    engine.get_computed_style(tree, id).get_property_value("color")
}

#[test]
fn test_ancestor_class_change_invalidates_descendant() {
    let mut f = fixture(".on span { color: red }");
    let mut engine = StyleEngine::default();
    assert_eq!(color(&mut engine, &f.tree, f.span), "");

    f.tree.set_attribute(f.div, "class", "on");
    assert_eq!(color(&mut engine, &f.tree, f.span), "red");

    f.tree.remove_attribute(f.div, "class");
    assert_eq!(color(&mut engine, &f.tree, f.span), "");
}

#[test]
fn test_repeated_lookup_is_a_hit() {
    let f = fixture("span { color: red }");
    let mut engine = StyleEngine::default();

    let first = engine.get_computed_style(&f.tree, f.span);
    // html, body, div and span were cascaded.
    assert_eq!(engine.cache_stats(), CacheStats { hits: 0, misses: 4 });

    let second = engine.get_computed_style(&f.tree, f.span);
    assert!(std::rc::Rc::ptr_eq(&first, &second));
    assert_eq!(engine.cache_stats(), CacheStats { hits: 1, misses: 4 });

    // The ancestors were cached on the way down.
    let _ = engine.get_computed_style(&f.tree, f.div);
    assert_eq!(engine.cache_stats(), CacheStats { hits: 2, misses: 4 });
}

#[test]
fn test_cached_ancestor_stops_the_walk() {
    let f = fixture("");
    let mut engine = StyleEngine::default();
    let _ = engine.get_computed_style(&f.tree, f.body);
    assert_eq!(engine.cache_stats().misses, 2);

    let _ = engine.get_computed_style(&f.tree, f.span);
    // Only div and span are new.
    assert_eq!(engine.cache_stats().misses, 4);
}

#[test]
fn test_style_text_change_invalidates() {
    let mut f = fixture("span { color: red }");
    let mut engine = StyleEngine::default();
    assert_eq!(color(&mut engine, &f.tree, f.span), "red");

    f.tree.set_text(f.text, "span { color: blue }");
    assert_eq!(color(&mut engine, &f.tree, f.span), "blue");
}

#[test]
fn test_inline_style_change_invalidates() {
    let mut f = fixture("");
    let mut engine = StyleEngine::default();
    assert_eq!(color(&mut engine, &f.tree, f.span), "");

    assert!(StyleEngine::set_inline_property(
        &mut f.tree,
        f.div,
        "color",
        "green",
        false
    ));
    assert_eq!(color(&mut engine, &f.tree, f.span), "green");
}

#[test]
fn test_cssom_edit_invalidates() {
    let f = fixture("");
    let mut engine = StyleEngine::default();
    assert_eq!(color(&mut engine, &f.tree, f.span), "");

    let mut sheet = StyleSheet::new();
    sheet.replace_sync("div span { color: purple }");
    let index = engine.adopt_style_sheet(&f.tree, NodeId::ROOT, sheet);
    assert_eq!(color(&mut engine, &f.tree, f.span), "purple");

    let _ = adopted_mut(&mut engine, index)
        .insert_rule("span { color: orange !important }", Some(0))
        .expect("valid rule");
    assert_eq!(color(&mut engine, &f.tree, f.span), "orange");

    adopted_mut(&mut engine, index).set_disabled(true);
    assert_eq!(color(&mut engine, &f.tree, f.span), "");
}

fn adopted_mut(engine: &mut StyleEngine, index: usize) -> &mut StyleSheet {
    engine
        .adopted_style_sheet_mut(NodeId::ROOT, index)
        .expect("adopted sheet")
}

#[test]
fn test_local_style_cached_by_text() {
    let mut f = fixture("");
    f.tree.set_attribute(f.span, "style", "margin: 1px");
    let mut engine = StyleEngine::default();

    let first = engine.get_local_style(&f.tree, f.span);
    // An unrelated mutation leaves the local entry valid.
    f.tree.set_attribute(f.body, "class", "x");
    let second = engine.get_local_style(&f.tree, f.span);
    assert!(std::rc::Rc::ptr_eq(&first, &second));

    f.tree.set_attribute(f.span, "style", "margin: 2px");
    assert_eq!(
        engine.get_local_style(&f.tree, f.span).get_property_value("margin"),
        "2px"
    );
}

#[test]
fn test_cached_and_uncached_results_agree() {
    let f = fixture("body { color: red } div > span { margin: 1px 2px }");
    let mut engine = StyleEngine::default();
    let cached = engine.get_computed_style(&f.tree, f.span);
    let fresh = engine.resolve(&f.tree, f.span, true);
    assert_eq!(*cached, fresh);
}
