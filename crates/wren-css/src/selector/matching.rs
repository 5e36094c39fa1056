//! Matching selectors against elements of a [`DomTree`].
//!
//! [§ 4.1 Selector Matching](https://www.w3.org/TR/selectors-4/#match-a-selector-against-an-element)

use wren_dom::{DomTree, ElementData, NodeId};

use super::{
    AttributeOperator, AttributeSelector, Combinator, ComplexSelector, CompoundSelector,
    PseudoClass, SelectorList, SimpleSelector, Specificity,
};

/// Where the selector being matched came from.
///
/// [CSS Scoping § 3.1](https://drafts.csswg.org/css-scoping/#selectors-data-model)
///
/// "When a selector is matched against a shadow tree, the selector match list
/// is initially the shadow host, followed by all children of the shadow
/// root and their descendants, ordered by a pre-order traversal."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchContext {
    /// The host of the shadow tree whose stylesheet holds the selector;
    /// `None` for document stylesheets.
    pub shadow_host: Option<NodeId>,
}

impl MatchContext {
    /// Context for selectors from document-level stylesheets.
    #[must_use]
    pub const fn document() -> Self {
        Self { shadow_host: None }
    }

    /// Context for selectors from a shadow tree's stylesheets.
    #[must_use]
    pub const fn shadow(host: NodeId) -> Self {
        Self {
            shadow_host: Some(host),
        }
    }

    /// The parent to continue an ancestor walk with.
    ///
    /// "The shadow host is featureless" past its `:host` role: walking up
    /// from the top of a shadow tree reaches the host, and nothing above it.
    fn parent(self, tree: &DomTree, id: NodeId) -> Option<NodeId> {
        if self.shadow_host == Some(id) {
            return None;
        }
        let parent = tree.parent(id)?;
        if tree.as_element(parent).is_some() {
            return Some(parent);
        }
        tree.host(parent).filter(|&host| self.shadow_host == Some(host))
    }

    /// The closest preceding element sibling, if any.
    fn previous_element(self, tree: &DomTree, id: NodeId) -> Option<NodeId> {
        if self.shadow_host == Some(id) {
            return None;
        }
        tree.preceding_siblings(id)
            .find(|&sibling| tree.as_element(sibling).is_some())
    }
}

impl SelectorList {
    /// Match every alternative against `element`, returning the highest
    /// specificity among those that match.
    #[must_use]
    pub fn match_element(
        &self,
        tree: &DomTree,
        element: NodeId,
        context: &MatchContext,
    ) -> Option<Specificity> {
        self.selectors
            .iter()
            .filter(|complex| complex.matches(tree, element, *context))
            .map(ComplexSelector::specificity)
            .max()
    }

    /// True if any alternative matches.
    #[must_use]
    pub fn matches(&self, tree: &DomTree, element: NodeId, context: &MatchContext) -> bool {
        self.selectors
            .iter()
            .any(|complex| complex.matches(tree, element, *context))
    }
}

impl ComplexSelector {
    /// True if this selector matches `element`.
    #[must_use]
    pub fn matches(&self, tree: &DomTree, element: NodeId, context: MatchContext) -> bool {
        compound_matches(&self.subject, tree, element, context)
            && chain_matches(&self.combinators, tree, element, context)
    }
}

/// [§ 15 Combinators](https://www.w3.org/TR/selectors-4/#combinators)
///
/// Walk the (combinator, compound) chain leftwards from `current`. Descendant
/// and subsequent-sibling combinators try every candidate, backtracking when
/// the rest of the chain fails for one of them.
fn chain_matches(
    chain: &[(Combinator, CompoundSelector)],
    tree: &DomTree,
    current: NodeId,
    context: MatchContext,
) -> bool {
    let Some(((combinator, compound), rest)) = chain.split_first() else {
        return true;
    };
    let try_candidate = |candidate: NodeId| {
        compound_matches(compound, tree, candidate, context)
            && chain_matches(rest, tree, candidate, context)
    };

    match combinator {
        Combinator::Child => context
            .parent(tree, current)
            .is_some_and(try_candidate),
        Combinator::Descendant => {
            let mut next = context.parent(tree, current);
            while let Some(ancestor) = next {
                if try_candidate(ancestor) {
                    return true;
                }
                next = context.parent(tree, ancestor);
            }
            false
        }
        Combinator::NextSibling => context
            .previous_element(tree, current)
            .is_some_and(try_candidate),
        Combinator::SubsequentSibling => {
            let mut next = context.previous_element(tree, current);
            while let Some(sibling) = next {
                if try_candidate(sibling) {
                    return true;
                }
                next = context.previous_element(tree, sibling);
            }
            false
        }
    }
}

/// All simple selectors of `compound` match `id`.
///
/// [CSS Scoping § 3.2.1](https://drafts.csswg.org/css-scoping/#host-selector)
/// "the shadow host in a shadow tree is featureless and cannot be matched by
/// any pseudo-class except for :host". A compound with `:host` therefore
/// matches the host alone, and one without it never matches the host.
fn compound_matches(
    compound: &CompoundSelector,
    tree: &DomTree,
    id: NodeId,
    context: MatchContext,
) -> bool {
    let Some(element) = tree.as_element(id) else {
        return false;
    };
    let is_host = context.shadow_host == Some(id);
    if is_host != compound.has_host() {
        return false;
    }
    compound
        .simple_selectors
        .iter()
        .all(|simple| simple_matches(simple, tree, id, element, context))
}

fn simple_matches(
    simple: &SimpleSelector,
    tree: &DomTree,
    id: NodeId,
    element: &ElementData,
    context: MatchContext,
) -> bool {
    match simple {
        // [§ 5.1](https://www.w3.org/TR/selectors-4/#type-selectors)
        SimpleSelector::Type(name) => element.tag_name.eq_ignore_ascii_case(name),
        SimpleSelector::Universal => true,
        // [§ 6.6](https://www.w3.org/TR/selectors-4/#class-html)
        SimpleSelector::Class(class) => element.classes().contains(class.as_str()),
        // [§ 6.7](https://www.w3.org/TR/selectors-4/#id-selectors)
        SimpleSelector::Id(expected) => element.id().is_some_and(|actual| actual == expected),
        SimpleSelector::Attribute(attribute) => attribute_matches(attribute, element),
        SimpleSelector::PseudoClass(pseudo) => pseudo_class_matches(pseudo, tree, id, element),
        SimpleSelector::PseudoElement(_) => false,
        SimpleSelector::Not(list) => !list.matches(tree, id, &context),
        SimpleSelector::Is(list) | SimpleSelector::Where(list) => list.matches(tree, id, &context),
        SimpleSelector::Host(argument) => {
            context.shadow_host == Some(id)
                && argument.as_deref().is_none_or(|compound| {
                    // The argument is matched against the host in its own tree.
                    compound_matches(compound, tree, id, MatchContext::document())
                })
        }
    }
}

/// [§ 6.1](https://www.w3.org/TR/selectors-4/#attribute-representation)
fn attribute_matches(selector: &AttributeSelector, element: &ElementData) -> bool {
    let Some(actual) = element
        .attrs
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(&selector.name))
        .map(|(_, value)| value.as_str())
    else {
        return false;
    };

    let (actual, expected) = if selector.case_insensitive {
        (actual.to_ascii_lowercase(), selector.value.to_ascii_lowercase())
    } else {
        (actual.to_string(), selector.value.clone())
    };

    match selector.operator {
        AttributeOperator::Exists => true,
        AttributeOperator::Equals => actual == expected,
        // "If "val" contains whitespace, it will never represent anything."
        AttributeOperator::Includes => {
            !expected.is_empty()
                && !expected.contains(char::is_whitespace)
                && actual.split_ascii_whitespace().any(|word| word == expected)
        }
        AttributeOperator::DashMatch => {
            actual == expected || actual.starts_with(&format!("{expected}-"))
        }
        // "If "val" is the empty string then the selector does not represent
        // anything."
        AttributeOperator::Prefix => !expected.is_empty() && actual.starts_with(&expected),
        AttributeOperator::Suffix => !expected.is_empty() && actual.ends_with(&expected),
        AttributeOperator::Substring => !expected.is_empty() && actual.contains(&expected),
    }
}

/// Elements that take part in form enablement.
///
/// [HTML § 4.16.2](https://html.spec.whatwg.org/multipage/semantics-other.html#concept-element-disabled)
const FORM_CONTROLS: [&str; 7] = [
    "button", "input", "select", "textarea", "optgroup", "option", "fieldset",
];

/// Elements that can be `:required` or `:optional`.
const REQUIRABLE: [&str; 3] = ["input", "select", "textarea"];

fn pseudo_class_matches(
    pseudo: &PseudoClass,
    tree: &DomTree,
    id: NodeId,
    element: &ElementData,
) -> bool {
    let tag = element.tag_name.to_ascii_lowercase();
    let has = |name: &str| element.attrs.contains_key(name);

    match pseudo {
        // [§ 14.1](https://www.w3.org/TR/selectors-4/#the-root-pseudo)
        // "The :root pseudo-class represents an element that is the root of
        // the document."
        PseudoClass::Root => tree.document_element() == Some(id),

        // [§ 14.2](https://www.w3.org/TR/selectors-4/#the-empty-pseudo)
        // "The :empty pseudo-class represents an element that has no children
        // except, optionally, document white space characters."
        PseudoClass::Empty => tree.children(id).iter().all(|&child| {
            tree.as_element(child).is_none()
                && tree
                    .as_text(child)
                    .is_none_or(|text| text.chars().all(|c| matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0c')))
        }),

        PseudoClass::FirstChild => position(tree, id, false, false) == Some(1),
        PseudoClass::LastChild => position(tree, id, true, false) == Some(1),
        PseudoClass::OnlyChild => {
            position(tree, id, false, false) == Some(1) && position(tree, id, true, false) == Some(1)
        }
        PseudoClass::FirstOfType => position(tree, id, false, true) == Some(1),
        PseudoClass::LastOfType => position(tree, id, true, true) == Some(1),
        PseudoClass::OnlyOfType => {
            position(tree, id, false, true) == Some(1) && position(tree, id, true, true) == Some(1)
        }
        PseudoClass::NthChild(nth) => position(tree, id, false, false).is_some_and(|i| nth.matches(i)),
        PseudoClass::NthLastChild(nth) => {
            position(tree, id, true, false).is_some_and(|i| nth.matches(i))
        }
        PseudoClass::NthOfType(nth) => position(tree, id, false, true).is_some_and(|i| nth.matches(i)),
        PseudoClass::NthLastOfType(nth) => {
            position(tree, id, true, true).is_some_and(|i| nth.matches(i))
        }

        // [§ 8.1](https://www.w3.org/TR/selectors-4/#the-any-link-pseudo)
        // "The :any-link pseudo-class represents an element that acts as the
        // source anchor of a hyperlink." In HTML: a, area and link with href.
        PseudoClass::Link | PseudoClass::AnyLink => {
            matches!(tag.as_str(), "a" | "area" | "link") && has("href")
        }

        PseudoClass::Enabled => FORM_CONTROLS.contains(&tag.as_str()) && !has("disabled"),
        PseudoClass::Disabled => FORM_CONTROLS.contains(&tag.as_str()) && has("disabled"),

        // [HTML § 4.16.3 :checked](https://html.spec.whatwg.org/multipage/semantics-other.html#selector-checked)
        PseudoClass::Checked => match tag.as_str() {
            "input" => {
                let kind = element.attrs.get("type").map(|t| t.to_ascii_lowercase());
                matches!(kind.as_deref(), Some("checkbox" | "radio")) && has("checked")
            }
            "option" => has("selected"),
            _ => false,
        },

        PseudoClass::Required => REQUIRABLE.contains(&tag.as_str()) && has("required"),
        PseudoClass::Optional => REQUIRABLE.contains(&tag.as_str()) && !has("required"),

        // No custom element registry exists, so names that could be custom
        // elements are never defined.
        PseudoClass::Defined => !tag.contains('-'),

        // [§ 7.2](https://www.w3.org/TR/selectors-4/#the-lang-pseudo)
        // The language is inherited from the closest ancestor with `lang`.
        PseudoClass::Lang(range) => std::iter::once(id)
            .chain(tree.ancestors(id))
            .find_map(|node| tree.get_attribute(node, "lang"))
            .is_some_and(|lang| {
                let lang = lang.to_ascii_lowercase();
                lang == *range || lang.starts_with(&format!("{range}-"))
            }),

        PseudoClass::Dynamic(_) => false,
    }
}

/// 1-based index of `id` among its element siblings, counted from the end
/// when `from_end` is set and among same-type siblings when `same_type` is
/// set. `None` if `id` has no parent.
///
/// [§ 14.3](https://www.w3.org/TR/selectors-4/#child-index)
/// "The child-indexed pseudo-classes ... require an element to have a
/// parent."
fn position(tree: &DomTree, id: NodeId, from_end: bool, same_type: bool) -> Option<i32> {
    let parent = tree.parent(id)?;
    let tag = tree.as_element(id)?.tag_name.to_ascii_lowercase();
    let mut siblings = tree.element_children(parent).filter(|&sibling| {
        !same_type
            || tree
                .as_element(sibling)
                .is_some_and(|e| e.tag_name.eq_ignore_ascii_case(&tag))
    });
    let index = if from_end {
        siblings.collect::<Vec<_>>().iter().rev().position(|&s| s == id)?
    } else {
        siblings.position(|s| s == id)?
    };
    i32::try_from(index + 1).ok()
}
