//! Integration tests for CSS selector parsing, matching and specificity.

use wren_css::selector::{MatchContext, SimpleSelector, Specificity, parse_selector, parse_selector_list};
use wren_dom::{DomTree, NodeId, ShadowRootMode};

fn element(tree: &mut DomTree, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
    let id = tree.create_element(tag);
    for (name, value) in attrs {
        tree.set_attribute(id, name, value);
    }
    tree.append_child(parent, id);
    id
}

fn matches(tree: &DomTree, id: NodeId, selector: &str) -> bool {
    parse_selector(selector)
        .unwrap()
        .matches(tree, id, &MatchContext::document())
}

/// `<html lang="en-US"><body><form>` with a few controls.
fn form_tree() -> (DomTree, Vec<NodeId>) {
    let mut tree = DomTree::new();
    let html = element(&mut tree, NodeId::ROOT, "html", &[("lang", "en-US")]);
    let body = element(&mut tree, html, "body", &[]);
    let form = element(&mut tree, body, "form", &[("data-state", "draft ready")]);
    let checkbox = element(
        &mut tree,
        form,
        "input",
        &[("type", "checkbox"), ("checked", ""), ("required", "")],
    );
    let text = element(&mut tree, form, "input", &[("type", "TEXT"), ("disabled", "")]);
    let link = element(&mut tree, form, "a", &[("href", "/help"), ("hreflang", "en-GB")]);
    (tree, vec![form, checkbox, text, link])
}

#[test]
fn test_parse_compound_parts() {
    let list = parse_selector_list("DIV.note#main[data-x]").unwrap();
    let subject = &list.selectors[0].subject;
    assert!(matches!(&subject.simple_selectors[0], SimpleSelector::Type(name) if name == "div"));
    assert!(matches!(&subject.simple_selectors[1], SimpleSelector::Class(name) if name == "note"));
    assert!(matches!(&subject.simple_selectors[2], SimpleSelector::Id(name) if name == "main"));
    assert!(matches!(&subject.simple_selectors[3], SimpleSelector::Attribute(_)));
    assert_eq!(list.specificity(), Specificity(1, 2, 1));
}

#[test]
fn test_invalid_selectors_are_rejected() {
    for text in ["", "div >", "> p", "a..b", "p::", "[x=", ":nth-child(x)", ":not()"] {
        assert!(parse_selector(text).is_none(), "{text:?} should be invalid");
    }
}

#[test]
fn test_attribute_operators() {
    let (tree, nodes) = form_tree();
    let [form, _, text, link] = nodes[..] else {
        panic!("four nodes");
    };
    assert!(matches(&tree, form, "[data-state~=ready]"));
    assert!(!matches(&tree, form, "[data-state~=read]"));
    assert!(matches(&tree, form, "[data-state^=dr]"));
    assert!(matches(&tree, form, "[data-state$=\"dy\"]"));
    assert!(matches(&tree, form, "[data-state*=\"t r\"]"));
    assert!(matches(&tree, link, "[hreflang|=en]"));
    assert!(matches(&tree, text, "[type=text i]"));
    assert!(!matches(&tree, text, "[type=text]"));
}

#[test]
fn test_form_pseudo_classes() {
    let (tree, nodes) = form_tree();
    let [form, checkbox, text, link] = nodes[..] else {
        panic!("four nodes");
    };
    assert!(matches(&tree, checkbox, "input:checked:required:enabled"));
    assert!(matches(&tree, text, "input:disabled:optional"));
    assert!(!matches(&tree, form, ":enabled"));
    assert!(matches(&tree, link, "a:link"));
    assert!(matches(&tree, link, ":any-link"));
    assert!(!matches(&tree, link, "a:hover"));
    assert!(!matches(&tree, link, "a:visited"));
}

#[test]
fn test_lang_is_inherited() {
    let (tree, nodes) = form_tree();
    assert!(matches(&tree, nodes[0], ":lang(en)"));
    assert!(matches(&tree, nodes[0], ":lang(en-us)"));
    assert!(!matches(&tree, nodes[0], ":lang(fr)"));
}

#[test]
fn test_defined_and_custom_elements() {
    let mut tree = DomTree::new();
    let html = element(&mut tree, NodeId::ROOT, "html", &[]);
    let custom = element(&mut tree, html, "x-widget", &[]);
    assert!(matches(&tree, html, ":defined"));
    assert!(!matches(&tree, custom, ":defined"));
}

#[test]
fn test_shadow_tree_selectors_stop_at_the_host() {
    let mut tree = DomTree::new();
    let html = element(&mut tree, NodeId::ROOT, "html", &[]);
    let outer = element(&mut tree, html, "section", &[("class", "page")]);
    let host = element(&mut tree, outer, "x-card", &[("class", "dark")]);
    let shadow = tree.attach_shadow(host, ShadowRootMode::Open).unwrap();
    let inner = element(&mut tree, shadow, "p", &[]);

    let shadow_context = MatchContext::shadow(host);
    let check = |selector: &str, id: NodeId| {
        parse_selector(selector)
            .unwrap()
            .matches(&tree, id, &shadow_context)
    };
    assert!(check(":host", host));
    assert!(check(":host(.dark)", host));
    assert!(!check(":host(.light)", host));
    assert!(check(":host(.dark) > p", inner));
    assert!(check(":host p", inner));
    // Nothing above the host is visible from inside.
    assert!(!check(".page p", inner));
    assert!(!check("x-card", host));

    // From the document the inner element is unreachable through the host.
    assert!(!matches(&tree, inner, "x-card p"));
    assert!(!matches(&tree, host, ":host"));
}

#[test]
fn test_specificity_ordering() {
    let id = parse_selector("#a").unwrap().specificity();
    let classes = parse_selector(".b.c").unwrap().specificity();
    let tag = parse_selector("div").unwrap().specificity();
    assert!(id > classes);
    assert!(classes > tag);
    assert!(Specificity(0, 11, 0) < Specificity(1, 0, 0));
    assert_eq!(Specificity(0, 1, 2).to_string(), "(0, 1, 2)");
}

#[test]
fn test_nth_with_extreme_coefficients() {
    let mut tree = DomTree::new();
    let ul = element(&mut tree, NodeId::ROOT, "ul", &[]);
    let li = element(&mut tree, ul, "li", &[]);

    assert!(matches(&tree, li, "li:nth-child(n-2147483648)"));
    assert!(matches(&tree, li, "li:nth-child(-n+2147483647)"));
    assert!(matches(&tree, li, "li:nth-child(-2147483648n+1)"));
    assert!(!matches(&tree, li, "li:nth-child(2147483647n-2147483648)"));
    assert!(!matches(&tree, li, "li:nth-last-of-type(-1n-2147483648)"));
}
