//! Collecting the style rules that apply inside one scope.
//!
//! [CSS Cascading § 6.1 Cascade Sorting Order](https://www.w3.org/TR/css-cascade-4/#cascade-sort)
//!
//! Grouping rules are flattened here: a style rule nested in `@media`,
//! `@supports` or `@container` is kept only if every enclosing condition
//! holds, and rules nested in `@scope` remember their scoping bounds so the
//! cascade can check them per element.

use std::sync::Arc;

use wren_dom::{DomTree, NodeId};

use crate::config::EngineConfig;
use crate::declaration::DeclarationBlock;
use crate::media::{container_condition_matches, media_query_list_matches, supports_condition_matches};
use crate::parser::{RuleId, RuleKind};
use crate::selector::{MatchContext, SelectorList, parse_selector};
use crate::stylesheet::StyleSheet;

/// Supplies the stylesheets that apply inside one scope.
///
/// [CSS Scoping § 3.2 Shadow Trees and the Cascade](https://drafts.csswg.org/css-scoping/#shadow-cascading)
pub trait StyleSheetSource {
    /// Stylesheets of the tree rooted at `scope` (the document root or a
    /// shadow root), in document order.
    fn sheets_in_scope(&self, tree: &DomTree, scope: NodeId) -> Vec<&StyleSheet>;
}

/// A style rule reachable from one scope, ready for matching.
#[derive(Debug, Clone)]
pub struct CollectedRule {
    /// The rule's parsed selector list.
    pub selectors: Arc<SelectorList>,
    /// The rule's declarations.
    pub declarations: DeclarationBlock,
    /// Position among all collected rules of the scope.
    pub source_order: usize,
    scopes: Vec<ScopeBounds>,
}

/// [CSS Cascade 6 § 2.5.1](https://www.w3.org/TR/css-cascade-6/#scope-syntax)
///
/// "`@scope [(<scope-start>)]? [to (<scope-end>)]?`"
#[derive(Debug, Clone)]
struct ScopeBounds {
    start: Option<Arc<SelectorList>>,
    end: Option<Arc<SelectorList>>,
}

impl CollectedRule {
    /// True if `element` lies inside every `@scope` enclosing this rule.
    #[must_use]
    pub fn in_scope(&self, tree: &DomTree, element: NodeId, context: &MatchContext) -> bool {
        self.scopes
            .iter()
            .all(|bounds| bounds.contains(tree, element, context))
    }
}

impl ScopeBounds {
    /// [CSS Cascade 6 § 2.5.2](https://www.w3.org/TR/css-cascade-6/#scope-limits)
    ///
    /// "An element is in scope if it is an inclusive descendant of the
    /// scoping root, and it is not an inclusive descendant of a scoping
    /// limit." A limit only bounds the roots above it.
    fn contains(&self, tree: &DomTree, element: NodeId, context: &MatchContext) -> bool {
        let mut limited = false;
        let chain = std::iter::once(element)
            .chain(tree.ancestors(element))
            .filter(|&id| tree.as_element(id).is_some());
        for candidate in chain {
            let is_root = self
                .start
                .as_ref()
                .is_some_and(|start| start.matches(tree, candidate, context));
            if is_root && !limited {
                return true;
            }
            if self
                .end
                .as_ref()
                .is_some_and(|end| end.matches(tree, candidate, context))
            {
                limited = true;
            }
        }
        // Without a start selector the scoping root is the tree root itself.
        self.start.is_none() && !limited
    }
}

/// Flatten `sheets` into the style rules that currently apply, in source
/// order. Disabled sheets contribute nothing.
#[must_use]
pub fn collect_rules(sheets: &[&StyleSheet], config: &EngineConfig) -> Vec<CollectedRule> {
    let mut collector = Collector {
        config,
        scopes: Vec::new(),
        rules: Vec::new(),
    };
    for sheet in sheets.iter().filter(|sheet| !sheet.disabled()) {
        for &id in sheet.css_rules() {
            collector.visit(sheet, id);
        }
    }
    collector.rules
}

struct Collector<'a> {
    config: &'a EngineConfig,
    scopes: Vec<ScopeBounds>,
    rules: Vec<CollectedRule>,
}

impl Collector<'_> {
    fn visit(&mut self, sheet: &StyleSheet, id: RuleId) {
        let Some(node) = sheet.rule(id) else { return };
        match &node.kind {
            RuleKind::Style {
                selector_text,
                declarations,
            } => {
                // The parser only links rules whose selectors parsed.
                let Some(selectors) = parse_selector(selector_text) else {
                    return;
                };
                self.rules.push(CollectedRule {
                    selectors,
                    declarations: declarations.clone(),
                    source_order: self.rules.len(),
                    scopes: self.scopes.clone(),
                });
            }
            // [CSS Conditional § 6.1](https://www.w3.org/TR/css-conditional-3/#at-media)
            // "The rules inside the @media rule apply only if the media query
            // list matches."
            RuleKind::Media {
                condition,
                children,
            } => {
                if media_query_list_matches(condition, self.config) {
                    self.visit_all(sheet, children);
                }
            }
            RuleKind::Supports {
                condition,
                children,
            } => {
                if supports_condition_matches(condition) {
                    self.visit_all(sheet, children);
                }
            }
            RuleKind::Container {
                condition,
                children,
            } => {
                if container_condition_matches(condition, self.config) {
                    self.visit_all(sheet, children);
                }
            }
            RuleKind::Scope {
                start,
                end,
                children,
            } => {
                let Some(bounds) = scope_bounds(start.as_deref(), end.as_deref()) else {
                    return;
                };
                self.scopes.push(bounds);
                self.visit_all(sheet, children);
                let _ = self.scopes.pop();
            }
            RuleKind::Keyframes { .. } | RuleKind::Keyframe { .. } | RuleKind::FontFace { .. } => {}
        }
    }

    fn visit_all(&mut self, sheet: &StyleSheet, children: &[RuleId]) {
        for &child in children {
            self.visit(sheet, child);
        }
    }
}

/// Parse both bounds; an invalid selector invalidates the whole `@scope`.
fn scope_bounds(start: Option<&str>, end: Option<&str>) -> Option<ScopeBounds> {
    let start = match start {
        Some(text) => Some(parse_selector(text)?),
        None => None,
    };
    let end = match end {
        Some(text) => Some(parse_selector(text)?),
        None => None,
    };
    Some(ScopeBounds { start, end })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_stylesheet;

    #[test]
    fn test_conditions_filter_nested_rules() {
        let sheet = parse_stylesheet(
            "p { color: red }
             @media (min-width: 2000px) { p { color: blue } }
             @media screen and (min-width: 600px) { p { color: green } }
             @supports (display: grid) { p { margin: 0 } }
             @supports (display: nonsense) { p { padding: 0 } }
             @keyframes spin { from { opacity: 0 } }",
        );
        let rules = collect_rules(&[&sheet], &EngineConfig::default());
        let texts: Vec<String> = rules.iter().map(|r| r.declarations.css_text()).collect();
        assert_eq!(
            texts,
            vec!["color: red;", "color: green;", "margin: 0px;"]
        );
        let orders: Vec<usize> = rules.iter().map(|r| r.source_order).collect();
        assert_eq!(orders, vec![0, 1, 2]);
    }

    #[test]
    fn test_disabled_sheets_are_skipped() {
        let mut sheet = parse_stylesheet("p { color: red }");
        sheet.set_disabled(true);
        assert!(collect_rules(&[&sheet], &EngineConfig::default()).is_empty());
    }

    #[test]
    fn test_scope_bounds() {
        let mut tree = DomTree::new();
        let html = tree.create_element("html");
        tree.append_child(NodeId::ROOT, html);
        let card = tree.create_element("div");
        tree.set_attribute(card, "class", "card");
        tree.append_child(html, card);
        let inner = tree.create_element("p");
        tree.append_child(card, inner);
        let slot = tree.create_element("section");
        tree.set_attribute(slot, "class", "content");
        tree.append_child(card, slot);
        let hidden = tree.create_element("p");
        tree.append_child(slot, hidden);
        let outside = tree.create_element("p");
        tree.append_child(html, outside);

        let sheet = parse_stylesheet("@scope (.card) to (.content) { p { color: red } }");
        let rules = collect_rules(&[&sheet], &EngineConfig::default());
        assert_eq!(rules.len(), 1);
        let context = MatchContext::document();
        assert!(rules[0].in_scope(&tree, inner, &context));
        assert!(!rules[0].in_scope(&tree, hidden, &context));
        assert!(!rules[0].in_scope(&tree, outside, &context));
    }
}
