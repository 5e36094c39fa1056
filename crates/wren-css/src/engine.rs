//! The per-document style engine.
//!
//! [CSSOM § 6.2 Style Sheet Collections](https://drafts.csswg.org/cssom/#css-style-sheet-collections)
//!
//! [`StyleEngine`] owns every stylesheet of one document: the sheets of
//! `<style>` elements (kept in sync with their text), sheets registered for
//! `<link>` elements, and adopted sheets per scope. It wires them into the
//! cascade and caches the results.

use std::collections::HashMap;
use std::rc::Rc;

use wren_dom::{DomTree, NodeId};

use crate::cache::{CacheStats, ComputedStyleCache, RuleCache};
use crate::cascade::{CascadeResolver, StyleSheetSource};
use crate::computed::ComputedStyleMap;
use crate::config::EngineConfig;
use crate::declaration::DeclarationBlock;
use crate::stylesheet::StyleSheet;

/// The sheet of one `<style>` element and the text it was parsed from.
#[derive(Debug)]
struct StyleElementSheet {
    text: String,
    sheet: StyleSheet,
}

/// Every stylesheet known to the engine.
#[derive(Debug, Default)]
struct SheetRegistry {
    style_elements: HashMap<NodeId, StyleElementSheet>,
    linked: HashMap<NodeId, StyleSheet>,
    adopted: HashMap<NodeId, Vec<StyleSheet>>,
    synced_generation: Option<u64>,
}

impl SheetRegistry {
    /// [HTML § 4.2.6 The style element](https://html.spec.whatwg.org/multipage/semantics.html#update-a-style-block)
    ///
    /// "The user agent must run the update a style block algorithm whenever
    /// one of the following conditions occur: ... The element's children
    /// changed steps run." Reparse every `<style>` whose text changed since
    /// the last sync. Nothing happens while the generation is unchanged.
    fn sync(&mut self, tree: &DomTree) {
        let generation = tree.generation();
        if self.synced_generation == Some(generation) {
            return;
        }
        for index in 0..tree.len() {
            let id = NodeId(index);
            if tree.tag_name(id).as_deref() != Some("style") {
                continue;
            }
            let text = tree.text_content(id);
            let entry = self.style_elements.entry(id).or_insert_with(|| {
                let mut sheet = StyleSheet::new();
                sheet.attach_generation(tree.generation_handle());
                StyleElementSheet {
                    text: String::new(),
                    sheet,
                }
            });
            if entry.text != text {
                entry.sheet.replace_rules(&text);
                entry.text = text;
            }
        }
        self.synced_generation = Some(tree.generation());
    }
}

impl StyleSheetSource for SheetRegistry {
    /// [CSS Scoping § 3.2](https://drafts.csswg.org/css-scoping/#shadow-cascading)
    ///
    /// `<style>` elements of the scope in tree order, then `<link>` sheets in
    /// tree order, then adopted sheets in adoption order.
    fn sheets_in_scope(&self, tree: &DomTree, scope: NodeId) -> Vec<&StyleSheet> {
        let in_tree: Vec<NodeId> = tree.descendants(scope).collect();
        let styles = in_tree
            .iter()
            .filter_map(|id| self.style_elements.get(id))
            .map(|entry| &entry.sheet);
        let links = in_tree.iter().filter_map(|id| self.linked.get(id));
        let adopted = self.adopted.get(&scope).into_iter().flatten();
        styles.chain(links).chain(adopted).collect()
    }
}

/// Style resolution for one document.
///
/// ```
/// use wren_css::StyleEngine;
/// use wren_dom::{DomTree, NodeId};
///
/// let mut tree = DomTree::new();
/// let html = tree.create_element("html");
/// tree.append_child(NodeId::ROOT, html);
/// let style = tree.create_element("style");
/// let css = tree.create_text("p { color: red }");
/// tree.append_child(style, css);
/// tree.append_child(html, style);
/// let p = tree.create_element("p");
/// tree.append_child(html, p);
///
/// let mut engine = StyleEngine::default();
/// let computed = engine.get_computed_style(&tree, p);
/// assert_eq!(computed.get_property_value("color"), "red");
/// assert_eq!(computed.get_property_value("display"), "block");
/// ```
#[derive(Debug, Default)]
pub struct StyleEngine {
    config: EngineConfig,
    registry: SheetRegistry,
    cache: ComputedStyleCache,
    rules: RuleCache,
}

impl StyleEngine {
    /// Create an engine answering media queries from `config`.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// The current configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Replace the configuration. Cached results depended on the old
    /// viewport, so they are all dropped.
    pub fn set_config(&mut self, config: EngineConfig) {
        self.config = config;
        self.cache.clear();
        self.rules.clear();
    }

    /// [CSSOM § 9 getComputedStyle()](https://drafts.csswg.org/cssom/#dom-window-getcomputedstyle)
    pub fn get_computed_style(&mut self, tree: &DomTree, element: NodeId) -> Rc<ComputedStyleMap> {
        self.prepare(tree);
        let resolver = CascadeResolver::new(tree, &self.registry, &self.config, &self.rules);
        self.cache.get_or_compute(&resolver, element, true)
    }

    /// The element's inline style as a map, cached by the attribute text.
    pub fn get_local_style(&mut self, tree: &DomTree, element: NodeId) -> Rc<ComputedStyleMap> {
        let resolver = CascadeResolver::new(tree, &self.registry, &self.config, &self.rules);
        self.cache.get_or_compute(&resolver, element, false)
    }

    /// Resolve without reading or filling the computed-style cache.
    pub fn resolve(&mut self, tree: &DomTree, element: NodeId, computed: bool) -> ComputedStyleMap {
        self.registry.sync(tree);
        let rules = RuleCache::new();
        CascadeResolver::new(tree, &self.registry, &self.config, &rules).resolve(element, computed)
    }

    /// Cache counters.
    #[must_use]
    pub const fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    fn prepare(&mut self, tree: &DomTree) {
        self.registry.sync(tree);
        self.rules.validate(tree.generation());
    }

    /// [HTML § 4.2.6](https://html.spec.whatwg.org/multipage/semantics.html#the-style-element)
    ///
    /// The sheet of a `<style>` element, or `None` for other nodes.
    pub fn style_sheet(&mut self, tree: &DomTree, style_element: NodeId) -> Option<&StyleSheet> {
        self.registry.sync(tree);
        self.registry
            .style_elements
            .get(&style_element)
            .map(|entry| &entry.sheet)
    }

    /// Mutable access to a `<style>` element's sheet for CSSOM edits. Edits
    /// last until the element's text changes.
    pub fn style_sheet_mut(
        &mut self,
        tree: &DomTree,
        style_element: NodeId,
    ) -> Option<&mut StyleSheet> {
        self.registry.sync(tree);
        self.registry
            .style_elements
            .get_mut(&style_element)
            .map(|entry| &mut entry.sheet)
    }

    /// [HTML § 4.2.4 The link element](https://html.spec.whatwg.org/multipage/semantics.html#link-type-stylesheet)
    ///
    /// Register the fetched text of a `<link rel=stylesheet>`. Fetching is
    /// the host's job.
    pub fn set_linked_style_sheet(&mut self, tree: &DomTree, link: NodeId, css_text: &str) {
        let mut sheet = StyleSheet::new();
        sheet.replace_rules(css_text);
        sheet.attach_generation(tree.generation_handle());
        let _ = self.registry.linked.insert(link, sheet);
        let _ = tree.bump_generation();
    }

    /// The registered sheet of a `<link>` element.
    pub fn linked_style_sheet_mut(&mut self, link: NodeId) -> Option<&mut StyleSheet> {
        self.registry.linked.get_mut(&link)
    }

    /// [CSSOM § 6.2 adoptedStyleSheets](https://drafts.csswg.org/cssom/#dom-documentorshadowroot-adoptedstylesheets)
    ///
    /// Append `sheet` to the adopted sheets of `scope` (the document root or
    /// a shadow root) and return its index.
    pub fn adopt_style_sheet(&mut self, tree: &DomTree, scope: NodeId, mut sheet: StyleSheet) -> usize {
        sheet.attach_generation(tree.generation_handle());
        let sheets = self.registry.adopted.entry(scope).or_default();
        sheets.push(sheet);
        let _ = tree.bump_generation();
        sheets.len() - 1
    }

    /// Mutable access to an adopted sheet.
    pub fn adopted_style_sheet_mut(&mut self, scope: NodeId, index: usize) -> Option<&mut StyleSheet> {
        self.registry
            .adopted
            .get_mut(&scope)
            .and_then(|sheets| sheets.get_mut(index))
    }

    /// [CSSOM § 6.7 ElementCSSInlineStyle](https://drafts.csswg.org/cssom/#the-elementcssinlinestyle-mixin)
    ///
    /// The element's `style` attribute parsed as a declaration block.
    #[must_use]
    pub fn inline_style(tree: &DomTree, element: NodeId) -> DeclarationBlock {
        tree.get_attribute(element, "style")
            .map(DeclarationBlock::parse)
            .unwrap_or_default()
    }

    /// Set one inline property and write the serialized block back to the
    /// `style` attribute.
    ///
    /// "Mutating the declarations must set the owner node's style attribute
    /// to the result of serializing the declarations."
    pub fn set_inline_property(
        tree: &mut DomTree,
        element: NodeId,
        name: &str,
        value: &str,
        important: bool,
    ) -> bool {
        let mut block = Self::inline_style(tree, element);
        if !block.set_property(name, value, important) {
            return false;
        }
        tree.set_attribute(element, "style", &block.css_text());
        true
    }

    /// Remove one inline property, returning its old value.
    pub fn remove_inline_property(tree: &mut DomTree, element: NodeId, name: &str) -> String {
        let mut block = Self::inline_style(tree, element);
        let old = block.remove_property(name);
        if !old.is_empty() {
            tree.set_attribute(element, "style", &block.css_text());
        }
        old
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document() -> (DomTree, NodeId) {
        let mut tree = DomTree::new();
        let html = tree.create_element("html");
        tree.append_child(NodeId::ROOT, html);
        (tree, html)
    }

    #[test]
    fn test_style_element_text_is_resynced() {
        let (mut tree, html) = document();
        let style = tree.create_element("style");
        let text = tree.create_text("p { color: red }");
        tree.append_child(style, text);
        tree.append_child(html, style);
        let p = tree.create_element("p");
        tree.append_child(html, p);

        let mut engine = StyleEngine::default();
        assert_eq!(engine.get_computed_style(&tree, p).get_property_value("color"), "red");
        tree.set_text(text, "p { color: blue }");
        assert_eq!(engine.get_computed_style(&tree, p).get_property_value("color"), "blue");
        assert_eq!(
            engine.style_sheet(&tree, style).map(StyleSheet::css_text),
            Some("p { color: blue; }".to_string())
        );
    }

    #[test]
    fn test_sheet_order_is_style_link_adopted() {
        let (mut tree, html) = document();
        let link = tree.create_element("link");
        tree.append_child(html, link);
        let style = tree.create_element("style");
        let text = tree.create_text("p { color: red; margin: 1px }");
        tree.append_child(style, text);
        tree.append_child(html, style);
        let p = tree.create_element("p");
        tree.append_child(html, p);

        let mut engine = StyleEngine::default();
        engine.set_linked_style_sheet(&tree, link, "p { color: green }");
        let mut adopted = StyleSheet::new();
        adopted.replace_sync("p { margin: 2px }");
        let _ = engine.adopt_style_sheet(&tree, NodeId::ROOT, adopted);

        let style = engine.get_computed_style(&tree, p);
        assert_eq!(style.get_property_value("color"), "green");
        assert_eq!(style.get_property_value("margin"), "2px");
    }

    #[test]
    fn test_inline_property_round_trip() {
        let (mut tree, html) = document();
        let div = tree.create_element("div");
        tree.append_child(html, div);

        assert!(StyleEngine::set_inline_property(&mut tree, div, "margin", "1px 2px", false));
        assert!(StyleEngine::set_inline_property(&mut tree, div, "color", "RED", true));
        assert!(!StyleEngine::set_inline_property(&mut tree, div, "color", "nonsense", false));
        assert_eq!(
            tree.get_attribute(div, "style"),
            Some("margin: 1px 2px; color: red !important;")
        );
        assert_eq!(StyleEngine::remove_inline_property(&mut tree, div, "margin"), "1px 2px");
        assert_eq!(tree.get_attribute(div, "style"), Some("color: red !important;"));
    }
}
