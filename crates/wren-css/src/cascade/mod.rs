//! CSS Cascading and Style Computation
//!
//! This module implements style computation per
//! [CSS Cascading and Inheritance Level 4](https://www.w3.org/TR/css-cascade-4/).
//!
//! Each element is cascaded in the scope it lives in: the document, or the
//! shadow tree that contains it. The layers, lowest first, are the per-tag
//! defaults, `:host` rules from the element's own shadow root, author rules
//! of its scope, and its inline `style` attribute.

mod collect;
mod substitute;

use std::collections::HashMap;
use std::rc::Rc;

pub use collect::{CollectedRule, StyleSheetSource, collect_rules};
pub use substitute::{CustomProperties, substitute_var};

use wren_dom::{DomTree, NodeId};

use crate::cache::RuleCache;
use crate::computed::{ComputedStyleMap, ResolvedProperty};
use crate::config::EngineConfig;
use crate::declaration::{Declaration, DeclarationBlock};
use crate::properties::{Property, is_custom_property};
use crate::selector::{MatchContext, Specificity};
use crate::shorthand;
use crate::ua_defaults::{self, INITIAL_DISPLAY};
use crate::values::css_wide_keyword;

/// [§ 6.1 Cascade Sorting Order](https://www.w3.org/TR/css-cascade-4/#cascade-sort)
///
/// Where a declaration entered the element's cascade. Later variants win.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Layer {
    /// Per-tag defaults.
    Defaults,
    /// [CSS Scoping § 3.2](https://drafts.csswg.org/css-scoping/#shadow-cascading)
    /// "When comparing two declarations that have different tree contexts,
    /// for normal rules the declaration earlier in the shadow-including tree
    /// order wins". Rules from the element's own shadow tree lose to outer
    /// ones.
    Host,
    /// Rules from the stylesheets of the element's scope.
    Author,
    /// [§ 6.2 Style Attributes](https://www.w3.org/TR/css-cascade-4/#style-attr)
    Inline,
}

/// [§ 6 Cascading](https://www.w3.org/TR/css-cascade-4/#cascading)
///
/// A matched declaration block with its cascade position.
struct MatchedBlock<'a> {
    layer: Layer,
    specificity: Specificity,
    source_order: usize,
    block: &'a DeclarationBlock,
}

/// Resolves computed and local styles against one tree.
pub struct CascadeResolver<'a> {
    tree: &'a DomTree,
    sheets: &'a dyn StyleSheetSource,
    config: &'a EngineConfig,
    rules: &'a RuleCache,
}

impl<'a> CascadeResolver<'a> {
    /// Create a resolver. `rules` memoizes the collected rules of each scope.
    #[must_use]
    pub fn new(
        tree: &'a DomTree,
        sheets: &'a dyn StyleSheetSource,
        config: &'a EngineConfig,
        rules: &'a RuleCache,
    ) -> Self {
        Self {
            tree,
            sheets,
            config,
            rules,
        }
    }

    /// The tree this resolver reads.
    #[must_use]
    pub const fn tree(&self) -> &'a DomTree {
        self.tree
    }

    /// Resolve `element` without any caching of computed maps.
    ///
    /// With `computed` false only the inline `style` attribute is parsed;
    /// otherwise the full cascade runs for the element and every ancestor.
    #[must_use]
    pub fn resolve(&self, element: NodeId, computed: bool) -> ComputedStyleMap {
        if !computed {
            return self.local_style(element);
        }
        if self.tree.as_element(element).is_none() {
            return ComputedStyleMap::new();
        }
        if !self.tree.is_connected(element) {
            return self.disconnected_style(element);
        }

        let mut chain: Vec<NodeId> = std::iter::successors(Some(element), |&id| {
            self.tree.parent_element_composed(id)
        })
        .collect();
        chain.reverse();

        let mut parent: Option<ComputedStyleMap> = None;
        for id in chain {
            parent = Some(self.cascade_element(id, parent.as_ref()));
        }
        parent.unwrap_or_default()
    }

    /// [CSSOM § 6.7](https://drafts.csswg.org/cssom/#dom-elementcssinlinestyle-style)
    ///
    /// The inline `style` attribute alone, each declaration validated and
    /// expanded. Values with `var()` are kept verbatim.
    #[must_use]
    pub fn local_style(&self, element: NodeId) -> ComputedStyleMap {
        let mut map = ComputedStyleMap::new();
        let Some(text) = self.tree.get_attribute(element, "style") else {
            return map;
        };
        for declaration in DeclarationBlock::parse(text).iter() {
            map.insert(
                &declaration.name,
                ResolvedProperty::new(&declaration.value, declaration.important),
            );
        }
        map
    }

    /// Elements outside a document have no stylesheets, only defaults.
    #[must_use]
    pub fn disconnected_style(&self, element: NodeId) -> ComputedStyleMap {
        self.tree
            .tag_name(element)
            .map(|tag| ua_defaults::default_style(&tag))
            .unwrap_or_default()
    }

    /// [§ 6 Cascading](https://www.w3.org/TR/css-cascade-4/#cascading)
    /// "The cascade takes an unordered list of declared values for a given
    /// property on a given element, sorts them by their declaration's
    /// precedence..."
    ///
    /// Cascade one element given its parent's computed style.
    #[must_use]
    pub fn cascade_element(
        &self,
        element: NodeId,
        parent: Option<&ComputedStyleMap>,
    ) -> ComputedStyleMap {
        let Some(tag) = self.tree.tag_name(element) else {
            return ComputedStyleMap::new();
        };

        let host_rules = self
            .tree
            .shadow_root(element)
            .map(|shadow_root| self.rules.rules_for(shadow_root, || self.collect(shadow_root)));
        let scope = self.tree.tree_root(element);
        let author_rules = self.rules.rules_for(scope, || self.collect(scope));
        let author_context = self
            .tree
            .host(scope)
            .map_or_else(MatchContext::document, MatchContext::shadow);
        let inline = self
            .tree
            .get_attribute(element, "style")
            .map(DeclarationBlock::parse);

        // [§ 6.4 Cascade Sorting Order](https://www.w3.org/TR/css-cascade-4/#cascade-sort)
        let mut matched: Vec<MatchedBlock<'_>> = Vec::new();
        if let Some(block) = ua_defaults::tag_declarations(&tag) {
            matched.push(MatchedBlock {
                layer: Layer::Defaults,
                specificity: Specificity::default(),
                source_order: 0,
                block,
            });
        }
        if let Some(rules) = &host_rules {
            self.match_rules(element, rules, Layer::Host, &MatchContext::shadow(element), &mut matched);
        }
        self.match_rules(element, &author_rules, Layer::Author, &author_context, &mut matched);
        if let Some(block) = &inline {
            matched.push(MatchedBlock {
                layer: Layer::Inline,
                specificity: Specificity::default(),
                source_order: 0,
                block,
            });
        }
        matched.sort_by_key(|m| (m.layer, m.specificity, m.source_order));

        let mut cascade = ElementCascade::new(&tag, parent);
        cascade.apply_custom_properties(&matched);
        for m in &matched {
            for declaration in m.block.iter() {
                if !is_custom_property(&declaration.name) {
                    cascade.apply(declaration);
                }
            }
        }
        cascade.map
    }

    fn collect(&self, scope: NodeId) -> Vec<CollectedRule> {
        collect_rules(&self.sheets.sheets_in_scope(self.tree, scope), self.config)
    }

    fn match_rules<'r>(
        &self,
        element: NodeId,
        rules: &'r Rc<Vec<CollectedRule>>,
        layer: Layer,
        context: &MatchContext,
        matched: &mut Vec<MatchedBlock<'r>>,
    ) {
        for rule in rules.iter() {
            let Some(specificity) = rule.selectors.match_element(self.tree, element, context) else {
                continue;
            };
            if !rule.in_scope(self.tree, element, context) {
                continue;
            }
            matched.push(MatchedBlock {
                layer,
                specificity,
                source_order: rule.source_order,
                block: &rule.declarations,
            });
        }
    }
}

/// The in-progress computed style of one element.
struct ElementCascade<'p> {
    tag: &'p str,
    parent: Option<&'p ComputedStyleMap>,
    map: ComputedStyleMap,
    /// Importance of each property already set by the element's own cascade.
    own: HashMap<String, bool>,
    /// The element's resolved custom properties, own and inherited.
    customs: HashMap<String, String>,
}

impl<'p> ElementCascade<'p> {
    /// [§ 7 Inheritance](https://www.w3.org/TR/css-cascade-4/#inheriting)
    ///
    /// "The inherited value of a property on an element is the computed value
    /// of the property on the element's parent element." Start from the
    /// parent's inherited properties and every custom property.
    fn new(tag: &'p str, parent: Option<&'p ComputedStyleMap>) -> Self {
        let mut map = ComputedStyleMap::new();
        if let Some(parent) = parent {
            for (name, resolved) in parent.iter() {
                let inherited = is_custom_property(name)
                    || Property::from_name(name).is_some_and(Property::inherited);
                if inherited {
                    map.insert(name, ResolvedProperty::new(&resolved.value, false));
                }
            }
        }
        map.insert("display", ResolvedProperty::new(INITIAL_DISPLAY, false));
        Self {
            tag,
            parent,
            map,
            own: HashMap::new(),
            customs: HashMap::new(),
        }
    }

    /// True if a declaration with `important` may replace what the element's
    /// own cascade already set for `name`.
    fn may_set(&self, name: &str, important: bool) -> bool {
        important || !self.own.get(name).copied().unwrap_or(false)
    }

    /// [CSS Variables § 2](https://www.w3.org/TR/css-variables-1/#defining-variables)
    ///
    /// Cascade custom properties first so every other declaration can be
    /// substituted against the final set.
    fn apply_custom_properties(&mut self, matched: &[MatchedBlock<'_>]) {
        let mut declared: HashMap<String, (String, bool)> = HashMap::new();
        for declaration in matched
            .iter()
            .flat_map(|m| m.block.iter())
            .filter(|d| is_custom_property(&d.name))
        {
            let locked = declared.get(&declaration.name).is_some_and(|(_, important)| *important);
            if declaration.important || !locked {
                let _ = declared.insert(
                    declaration.name.clone(),
                    (declaration.value.clone(), declaration.important),
                );
            }
        }

        // [CSS Variables § 2](https://www.w3.org/TR/css-variables-1/#defining-variables)
        // CSS-wide keywords apply to custom properties as to any other.
        let mut raw: HashMap<String, String> = HashMap::new();
        let mut importance: HashMap<String, bool> = HashMap::new();
        for (name, (value, important)) in declared {
            match css_wide_keyword(&value) {
                Some("initial") => {
                    let _ = self.map.remove(&name);
                }
                Some(_) => {}
                None => {
                    let _ = importance.insert(name.clone(), important);
                    let _ = raw.insert(name, value);
                }
            }
        }

        let resolved = CustomProperties::new(raw, Some(&self.map)).resolve_all();
        for (name, value) in resolved {
            match value {
                Some(value) => {
                    let important = importance.get(&name).copied().unwrap_or(false);
                    trace(self.tag, &name, &value, important);
                    self.map.insert(&name, ResolvedProperty::new(&value, important));
                }
                // "invalid at computed-value time": the guaranteed-invalid
                // value, which is not inherited either.
                None => {
                    let _ = self.map.remove(&name);
                }
            }
        }
        self.customs = self
            .map
            .custom_properties()
            .map(|(name, r)| (name.to_string(), r.value.clone()))
            .collect();
    }

    /// Apply one non-custom declaration. Values with `var()` are substituted
    /// and validated first; a failure drops the declaration so whatever the
    /// lower layers set stays in place.
    fn apply(&mut self, declaration: &Declaration) {
        let Some(property) = Property::from_name(&declaration.name) else {
            return;
        };
        if !self.may_set(property.name(), declaration.important) && !property.is_shorthand() {
            return;
        }

        let longhands = if declaration.has_var() {
            let customs = &self.customs;
            let Some(value) = substitute_var(&declaration.value, &mut |name: &str| customs.get(name).cloned(), 0)
            else {
                return;
            };
            match shorthand::expand(property, &value, declaration.important) {
                Some(longhands) => longhands,
                None => return,
            }
        } else {
            vec![(property, ResolvedProperty::new(&declaration.value, declaration.important))]
        };

        for (longhand, resolved) in longhands {
            self.apply_longhand(longhand, &resolved);
        }
    }

    fn apply_longhand(&mut self, property: Property, resolved: &ResolvedProperty) {
        let name = property.name();
        if !self.may_set(name, resolved.important) {
            return;
        }
        let _ = self.own.insert(name.to_string(), resolved.important);

        let value = match css_wide_keyword(&resolved.value) {
            // [§ 7.3.1 inherit](https://www.w3.org/TR/css-cascade-4/#inherit)
            // "the cascaded value of the property on the element is the
            // computed value of the property on the element's parent"
            Some("inherit") => self.inherited_value(property),
            // [§ 7.3.3 unset](https://www.w3.org/TR/css-cascade-4/#inherit-initial)
            // "If the cascaded value of a property is the unset keyword, then
            // if it is an inherited property, this is treated as inherit, and
            // if it is not, this is treated as initial."
            Some("unset") if property.inherited() => self.inherited_value(property),
            // [§ 7.3.4 revert](https://www.w3.org/TR/css-cascade-4/#default)
            // Roll back to the per-tag defaults.
            Some("revert" | "revert-layer") => ua_defaults::tag_declarations(self.tag)
                .and_then(|block| block.iter().find(|d| d.name == name))
                .map(|d| d.value.clone())
                .or_else(|| initial_value(property).map(str::to_string)),
            Some(_) => initial_value(property).map(str::to_string),
            None => Some(resolved.value.clone()),
        };

        match value {
            Some(value) => {
                trace(self.tag, name, &value, resolved.important);
                self.map.insert(name, ResolvedProperty::new(&value, resolved.important));
            }
            None => {
                let _ = self.map.remove(name);
            }
        }
    }

    fn inherited_value(&self, property: Property) -> Option<String> {
        self.parent
            .and_then(|parent| parent.get_longhand(property))
            .map(|r| r.value.clone())
    }
}

/// [§ 7.3.2 initial](https://www.w3.org/TR/css-cascade-4/#initial)
///
/// Initial values the engine reports. Properties not listed read as empty
/// when reset to their initial value.
fn initial_value(property: Property) -> Option<&'static str> {
    match property {
        Property::Display => Some(INITIAL_DISPLAY),
        Property::Position => Some("static"),
        Property::Visibility => Some("visible"),
        Property::Float | Property::Clear => Some("none"),
        Property::Opacity => Some("1"),
        _ => None,
    }
}

#[cfg(feature = "cascade-trace")]
fn trace(tag: &str, name: &str, value: &str, important: bool) {
    let priority = if important { " !important" } else { "" };
    eprintln!("[CASCADE] <{tag}> {name}: {value}{priority}");
}

#[cfg(not(feature = "cascade-trace"))]
const fn trace(_tag: &str, _name: &str, _value: &str, _important: bool) {}
