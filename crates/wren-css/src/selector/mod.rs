//! CSS selector parsing, matching and specificity.
//!
//! [Selectors Level 4](https://www.w3.org/TR/selectors-4/)
//!
//! Parsed selector lists are immutable and shared: [`parse_selector`] caches
//! every result (failures included) by the exact selector text.

mod matching;
mod parser;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

pub use matching::MatchContext;
pub use parser::parse_selector_list;

/// [§ 5 Elemental selectors](https://www.w3.org/TR/selectors-4/#elemental-selectors)
///
/// A simple selector is a single condition on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    /// [§ 5.1 Type selector](https://www.w3.org/TR/selectors-4/#type-selectors)
    /// "A type selector is the name of a document language element type,
    /// and represents an instance of that element type in the document tree."
    ///
    /// Stored lowercased; matched ASCII case-insensitively.
    Type(String),

    /// [§ 5.2 Universal selector](https://www.w3.org/TR/selectors-4/#universal-selector)
    Universal,

    /// [§ 6.6 Class selector](https://www.w3.org/TR/selectors-4/#class-html)
    Class(String),

    /// [§ 6.7 ID selector](https://www.w3.org/TR/selectors-4/#id-selectors)
    Id(String),

    /// [§ 6 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
    Attribute(AttributeSelector),

    /// [§ 4 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes)
    PseudoClass(PseudoClass),

    /// [§ 3.6 Pseudo-elements](https://www.w3.org/TR/selectors-4/#pseudo-elements)
    ///
    /// Element styles never include pseudo-element rules, so this never
    /// matches. It still counts toward specificity.
    PseudoElement(String),

    /// [§ 4.3 :not()](https://www.w3.org/TR/selectors-4/#negation)
    /// "The negation pseudo-class, :not(), is a functional pseudo-class taking
    /// a selector list as an argument. It represents an element that is not
    /// represented by its argument."
    Not(SelectorList),

    /// [§ 4.2 :is()](https://www.w3.org/TR/selectors-4/#matches)
    /// "The matches-any pseudo-class, :is(), is a functional pseudo-class
    /// taking a `<forgiving-selector-list>` as its sole argument."
    Is(SelectorList),

    /// [§ 4.4 :where()](https://www.w3.org/TR/selectors-4/#zero-matches)
    /// "The Specificity-adjustment pseudo-class, :where(), is a functional
    /// pseudo-class with the same syntax and functionality as :is(). Unlike
    /// :is(), neither the :where() pseudo-class, nor any of its arguments,
    /// contribute to the specificity of the selector."
    Where(SelectorList),

    /// [CSS Scoping § 3.2.1 :host](https://drafts.csswg.org/css-scoping/#host-selector)
    ///
    /// "The :host pseudo-class, when evaluated in the context of a shadow
    /// tree, matches the shadow tree's shadow host. In any other context, it
    /// matches nothing." The functional form additionally requires the host
    /// to match the compound argument.
    Host(Option<Box<CompoundSelector>>),
}

/// [§ 6.1 Attribute presence and value selectors](https://www.w3.org/TR/selectors-4/#attribute-representation)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSelector {
    /// Attribute name, lowercased.
    pub name: String,
    /// How the value is compared.
    pub operator: AttributeOperator,
    /// Expected value; empty for [`AttributeOperator::Exists`].
    pub value: String,
    /// [§ 6.3 Case-sensitivity](https://www.w3.org/TR/selectors-4/#attribute-case)
    /// "Adding the identifier i before the closing bracket causes the
    /// attribute value to be compared ASCII case-insensitively."
    pub case_insensitive: bool,
}

/// Attribute comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeOperator {
    /// `[att]`
    Exists,
    /// `[att=val]`
    Equals,
    /// `[att~=val]`
    Includes,
    /// `[att|=val]`
    DashMatch,
    /// `[att^=val]`
    Prefix,
    /// `[att$=val]`
    Suffix,
    /// `[att*=val]`
    Substring,
}

/// Pseudo-classes answered from the tree and element attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PseudoClass {
    /// [§ 14.1 :root](https://www.w3.org/TR/selectors-4/#the-root-pseudo)
    Root,
    /// [§ 14.2 :empty](https://www.w3.org/TR/selectors-4/#the-empty-pseudo)
    Empty,
    /// [§ 14.3.3 :first-child](https://www.w3.org/TR/selectors-4/#the-first-child-pseudo)
    FirstChild,
    /// [§ 14.3.4 :last-child](https://www.w3.org/TR/selectors-4/#the-last-child-pseudo)
    LastChild,
    /// [§ 14.3.5 :only-child](https://www.w3.org/TR/selectors-4/#the-only-child-pseudo)
    OnlyChild,
    /// [§ 14.4.3 :first-of-type](https://www.w3.org/TR/selectors-4/#the-first-of-type-pseudo)
    FirstOfType,
    /// [§ 14.4.4 :last-of-type](https://www.w3.org/TR/selectors-4/#the-last-of-type-pseudo)
    LastOfType,
    /// [§ 14.4.5 :only-of-type](https://www.w3.org/TR/selectors-4/#the-only-of-type-pseudo)
    OnlyOfType,
    /// [§ 14.3.1 :nth-child()](https://www.w3.org/TR/selectors-4/#the-nth-child-pseudo)
    NthChild(Nth),
    /// [§ 14.3.2 :nth-last-child()](https://www.w3.org/TR/selectors-4/#the-nth-last-child-pseudo)
    NthLastChild(Nth),
    /// [§ 14.4.1 :nth-of-type()](https://www.w3.org/TR/selectors-4/#the-nth-of-type-pseudo)
    NthOfType(Nth),
    /// [§ 14.4.2 :nth-last-of-type()](https://www.w3.org/TR/selectors-4/#the-nth-last-of-type-pseudo)
    NthLastOfType(Nth),
    /// [§ 8.2 :link](https://www.w3.org/TR/selectors-4/#link)
    ///
    /// Nothing is ever visited, so every hyperlink is a `:link`.
    Link,
    /// [§ 8.1 :any-link](https://www.w3.org/TR/selectors-4/#the-any-link-pseudo)
    AnyLink,
    /// [§ 13.1.1 :enabled](https://www.w3.org/TR/selectors-4/#enableddisabled)
    Enabled,
    /// [§ 13.1.1 :disabled](https://www.w3.org/TR/selectors-4/#enableddisabled)
    Disabled,
    /// [§ 13.3.3 :checked](https://www.w3.org/TR/selectors-4/#checked)
    Checked,
    /// [§ 13.4.6 :required](https://www.w3.org/TR/selectors-4/#required-pseudo)
    Required,
    /// [§ 13.4.6 :optional](https://www.w3.org/TR/selectors-4/#optional-pseudo)
    Optional,
    /// [§ 4.6 :defined](https://www.w3.org/TR/selectors-4/#the-defined-pseudo)
    Defined,
    /// [§ 7.2 :lang()](https://www.w3.org/TR/selectors-4/#the-lang-pseudo)
    Lang(String),
    /// User-action and other dynamic pseudo-classes (`:hover`, `:focus`, ...)
    /// and pseudo-classes we do not model. They parse but never match.
    Dynamic(String),
}

/// [§ 14.3.1 An+B](https://www.w3.org/TR/css-syntax-3/#anb-microsyntax)
///
/// Matches the elements whose 1-based index is `a*n + b` for some `n >= 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nth {
    /// Step.
    pub a: i32,
    /// Offset.
    pub b: i32,
}

impl Nth {
    /// True if `index` (1-based) is selected.
    #[must_use]
    pub fn matches(self, index: i32) -> bool {
        // Widened so extreme coefficients cannot overflow.
        let (a, b, index) = (i64::from(self.a), i64::from(self.b), i64::from(index));
        if a == 0 {
            return index == b;
        }
        let diff = index - b;
        diff % a == 0 && diff / a >= 0
    }
}

/// [§ 3.1 Compound selector](https://www.w3.org/TR/selectors-4/#compound)
///
/// "A compound selector is a sequence of simple selectors that are not
/// separated by a combinator, and represents a set of simultaneous
/// conditions on a single element."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundSelector {
    /// The simple selectors, in source order.
    pub simple_selectors: Vec<SimpleSelector>,
}

impl CompoundSelector {
    /// True if this compound targets the shadow host.
    #[must_use]
    pub fn has_host(&self) -> bool {
        self.simple_selectors
            .iter()
            .any(|s| matches!(s, SimpleSelector::Host(_)))
    }
}

/// [§ 15 Combinators](https://www.w3.org/TR/selectors-4/#combinators)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// Whitespace: "an element B that is an arbitrary descendant of some
    /// ancestor element A."
    Descendant,
    /// `>`: "an element B that is a direct child of element A."
    Child,
    /// `+`: "an element B that immediately follows element A."
    NextSibling,
    /// `~`: "an element B that follows element A (not necessarily
    /// immediately)."
    SubsequentSibling,
}

/// [§ 3.1 Complex selector](https://www.w3.org/TR/selectors-4/#complex)
///
/// For `A > B C` the subject is `C` and `combinators` is
/// `[(Descendant, B), (Child, A)]`: right to left, the order matching walks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    /// The rightmost compound.
    pub subject: CompoundSelector,
    /// (combinator, compound) pairs going left from the subject.
    pub combinators: Vec<(Combinator, CompoundSelector)>,
}

impl ComplexSelector {
    /// [§ 16 Calculating a selector's specificity](https://www.w3.org/TR/selectors-4/#specificity-rules)
    #[must_use]
    pub fn specificity(&self) -> Specificity {
        self.combinators
            .iter()
            .map(|(_, compound)| compound_specificity(compound))
            .fold(compound_specificity(&self.subject), |acc, s| acc + s)
    }
}

/// [§ 3.1 Selector list](https://www.w3.org/TR/selectors-4/#selector-list)
///
/// "A list of simple/compound/complex selectors is a comma-separated list of
/// simple, compound, or complex selectors."
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectorList {
    /// Alternatives, in source order.
    pub selectors: Vec<ComplexSelector>,
}

impl SelectorList {
    /// The highest specificity among the alternatives.
    #[must_use]
    pub fn specificity(&self) -> Specificity {
        self.selectors
            .iter()
            .map(ComplexSelector::specificity)
            .max()
            .unwrap_or_default()
    }
}

/// [§ 16 Calculating a selector's specificity](https://www.w3.org/TR/selectors-4/#specificity-rules)
///
/// "A selector's specificity is calculated for a given element as follows:
/// count the number of ID selectors in the selector (= A); count the number
/// of class selectors, attributes selectors, and pseudo-classes in the
/// selector (= B); count the number of type selectors and pseudo-elements in
/// the selector (= C); ignore the universal selector."
///
/// Compared lexicographically: A, then B, then C.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Specificity(pub u32, pub u32, pub u32);

impl Specificity {
    /// Create a new specificity with (A, B, C) components.
    #[must_use]
    pub const fn new(a: u32, b: u32, c: u32) -> Self {
        Self(a, b, c)
    }
}

impl std::ops::Add for Specificity {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0, self.1 + other.1, self.2 + other.2)
    }
}

impl std::fmt::Display for Specificity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.0, self.1, self.2)
    }
}

fn compound_specificity(compound: &CompoundSelector) -> Specificity {
    compound
        .simple_selectors
        .iter()
        .map(simple_specificity)
        .fold(Specificity::default(), |acc, s| acc + s)
}

fn simple_specificity(simple: &SimpleSelector) -> Specificity {
    match simple {
        SimpleSelector::Id(_) => Specificity(1, 0, 0),
        SimpleSelector::Class(_)
        | SimpleSelector::Attribute(_)
        | SimpleSelector::PseudoClass(_)
        | SimpleSelector::Not(_) => Specificity(0, 1, 0),
        SimpleSelector::Type(_) | SimpleSelector::PseudoElement(_) => Specificity(0, 0, 1),
        SimpleSelector::Universal | SimpleSelector::Where(_) => Specificity::default(),
        // "The specificity of an :is() ... pseudo-class is replaced by the
        // specificity of the most specific complex selector in its selector
        // list argument."
        SimpleSelector::Is(list) => list.specificity(),
        SimpleSelector::Host(argument) => {
            Specificity(0, 1, 0)
                + argument
                    .as_deref()
                    .map(compound_specificity)
                    .unwrap_or_default()
        }
    }
}

type SelectorCache = HashMap<String, Option<Arc<SelectorList>>>;

static SELECTOR_CACHE: OnceLock<Mutex<SelectorCache>> = OnceLock::new();

/// Parse a selector list, sharing the result with every other caller that
/// passes the same text.
///
/// Returns `None` if the text is not a valid selector list. Callers treat
/// that as "the rule does not apply".
#[must_use]
pub fn parse_selector(text: &str) -> Option<Arc<SelectorList>> {
    let cache = SELECTOR_CACHE.get_or_init(|| Mutex::new(HashMap::new()));
    let mut cache = cache.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(hit) = cache.get(text) {
        return hit.clone();
    }
    let parsed = parse_selector_list(text).map(Arc::new);
    let _ = cache.insert(text.to_string(), parsed.clone());
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn specificity_of(text: &str) -> Specificity {
        parse_selector(text).unwrap().specificity()
    }

    #[test]
    fn test_basic_specificity() {
        assert_eq!(specificity_of("*"), Specificity(0, 0, 0));
        assert_eq!(specificity_of("div"), Specificity(0, 0, 1));
        assert_eq!(specificity_of(".a.b"), Specificity(0, 2, 0));
        assert_eq!(specificity_of("#a"), Specificity(1, 0, 0));
        assert_eq!(specificity_of("ul li.x[href]:first-child"), Specificity(0, 3, 2));
        assert_eq!(specificity_of("p::before"), Specificity(0, 0, 2));
    }

    #[test]
    fn test_logical_specificity() {
        assert_eq!(specificity_of(":not(#a.b)"), Specificity(0, 1, 0));
        assert_eq!(specificity_of(":is(#a, .b)"), Specificity(1, 0, 0));
        assert_eq!(specificity_of(":where(#a, .b) p"), Specificity(0, 0, 1));
        assert_eq!(specificity_of(":host(.x)"), Specificity(0, 2, 0));
    }

    #[test]
    fn test_list_takes_max() {
        assert_eq!(specificity_of("div, #a, .b"), Specificity(1, 0, 0));
    }

    #[test]
    fn test_ordering_is_lexicographic() {
        assert!(Specificity(1, 0, 0) > Specificity(0, 99, 99));
        assert!(Specificity(0, 2, 0) > Specificity(0, 1, 5));
        assert!(Specificity(0, 0, 2) > Specificity(0, 0, 1));
    }

    #[test]
    fn test_cache_shares_results() {
        let a = parse_selector("div > p.cached").unwrap();
        let b = parse_selector("div > p.cached").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(parse_selector("div >").is_none());
        assert!(parse_selector("div >").is_none());
    }

    #[test]
    fn test_nth_matches() {
        let odd = Nth { a: 2, b: 1 };
        assert!(odd.matches(1) && odd.matches(3) && !odd.matches(2));
        let first_three = Nth { a: -1, b: 3 };
        assert!(first_three.matches(1) && first_three.matches(3) && !first_three.matches(4));
        let exact = Nth { a: 0, b: 2 };
        assert!(exact.matches(2) && !exact.matches(4));
    }
}
