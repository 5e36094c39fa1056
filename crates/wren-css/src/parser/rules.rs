//! Rule nodes and the per-stylesheet arena that owns them.
//!
//! [CSSOM § 6.4 CSS Rules](https://drafts.csswg.org/cssom/#css-rules)
//!
//! Rules refer to their parent by [`RuleId`] instead of by pointer, and a
//! grouping rule owns the ids of its children. Rules are only ever appended
//! to an arena; removing a rule from a list leaves its node in place.

use serde::Serialize;

use crate::declaration::DeclarationBlock;

/// Index of a rule inside its stylesheet's [`RuleArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RuleId(pub usize);

/// One rule and its (non-owning) parent link.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleNode {
    /// What kind of rule this is, with its payload.
    pub kind: RuleKind,
    /// [CSSOM § 6.4.1](https://drafts.csswg.org/cssom/#dom-cssrule-parentrule)
    /// "The parentRule attribute must return the parent CSS rule."
    pub parent: Option<RuleId>,
}

/// The rule variants the parser produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum RuleKind {
    /// [CSSOM § 6.4.3 CSSStyleRule](https://drafts.csswg.org/cssom/#the-cssstylerule-interface)
    Style {
        /// Selector text as written, trimmed.
        selector_text: String,
        /// The rule's declarations.
        declarations: DeclarationBlock,
    },
    /// [CSS Conditional § 6.1 CSSMediaRule](https://www.w3.org/TR/css-conditional-3/#the-cssmediarule-interface)
    Media {
        /// Media query list text.
        condition: String,
        /// Nested rules.
        children: Vec<RuleId>,
    },
    /// [CSS Conditional § 6.2 CSSSupportsRule](https://www.w3.org/TR/css-conditional-3/#the-csssupportsrule-interface)
    Supports {
        /// Supports condition text.
        condition: String,
        /// Nested rules.
        children: Vec<RuleId>,
    },
    /// [CSS Containment § 7 CSSContainerRule](https://www.w3.org/TR/css-contain-3/#the-csscontainerrule-interface)
    Container {
        /// Container condition text, including an optional container name.
        condition: String,
        /// Nested rules.
        children: Vec<RuleId>,
    },
    /// [CSS Animations § 6.2 CSSKeyframesRule](https://www.w3.org/TR/css-animations-1/#interface-csskeyframesrule)
    Keyframes {
        /// Animation name.
        name: String,
        /// [`RuleKind::Keyframe`] children.
        children: Vec<RuleId>,
    },
    /// [CSS Animations § 6.1 CSSKeyframeRule](https://www.w3.org/TR/css-animations-1/#interface-csskeyframerule)
    Keyframe {
        /// Normalized keyframe selector, e.g. `0%, 100%`.
        key_text: String,
        /// The keyframe's declarations.
        declarations: DeclarationBlock,
    },
    /// [CSS Fonts § 4.1 @font-face](https://www.w3.org/TR/css-fonts-4/#font-face-rule)
    FontFace {
        /// Font descriptors, kept verbatim.
        declarations: DeclarationBlock,
    },
    /// [CSS Cascade 6 § 2.5 @scope](https://www.w3.org/TR/css-cascade-6/#scoped-styles)
    Scope {
        /// Scoping root selector; `None` scopes to the whole tree.
        start: Option<String>,
        /// Scoping limit selector.
        end: Option<String>,
        /// Nested rules.
        children: Vec<RuleId>,
    },
}

impl RuleKind {
    /// Nested rule ids for grouping rules; empty for the others.
    #[must_use]
    pub fn children(&self) -> &[RuleId] {
        match self {
            Self::Media { children, .. }
            | Self::Supports { children, .. }
            | Self::Container { children, .. }
            | Self::Keyframes { children, .. }
            | Self::Scope { children, .. } => children,
            Self::Style { .. } | Self::Keyframe { .. } | Self::FontFace { .. } => &[],
        }
    }

    fn children_mut(&mut self) -> Option<&mut Vec<RuleId>> {
        match self {
            Self::Media { children, .. }
            | Self::Supports { children, .. }
            | Self::Container { children, .. }
            | Self::Keyframes { children, .. }
            | Self::Scope { children, .. } => Some(children),
            Self::Style { .. } | Self::Keyframe { .. } | Self::FontFace { .. } => None,
        }
    }

    /// The rule's declaration block, if it has one.
    #[must_use]
    pub const fn declarations(&self) -> Option<&DeclarationBlock> {
        match self {
            Self::Style { declarations, .. }
            | Self::Keyframe { declarations, .. }
            | Self::FontFace { declarations } => Some(declarations),
            _ => None,
        }
    }

    /// Mutable access to the rule's declaration block, if it has one.
    pub fn declarations_mut(&mut self) -> Option<&mut DeclarationBlock> {
        match self {
            Self::Style { declarations, .. }
            | Self::Keyframe { declarations, .. }
            | Self::FontFace { declarations } => Some(declarations),
            _ => None,
        }
    }
}

/// Owns every rule of one stylesheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RuleArena {
    nodes: Vec<RuleNode>,
}

impl RuleArena {
    /// Create an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule, linking it into its parent's child list.
    pub fn push(&mut self, kind: RuleKind, parent: Option<RuleId>) -> RuleId {
        let id = RuleId(self.nodes.len());
        self.nodes.push(RuleNode { kind, parent });
        if let Some(children) = parent
            .and_then(|p| self.nodes.get_mut(p.0))
            .and_then(|node| node.kind.children_mut())
        {
            children.push(id);
        }
        id
    }

    /// Look up a rule.
    #[must_use]
    pub fn get(&self, id: RuleId) -> Option<&RuleNode> {
        self.nodes.get(id.0)
    }

    /// Look up a rule mutably.
    pub fn get_mut(&mut self, id: RuleId) -> Option<&mut RuleNode> {
        self.nodes.get_mut(id.0)
    }

    /// Number of rules ever created in this arena.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if no rule was ever created.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// [CSSOM § 6.4.2 Serializing CSS Rules](https://drafts.csswg.org/cssom/#serialize-a-css-rule)
    #[must_use]
    pub fn css_text(&self, id: RuleId) -> String {
        let Some(node) = self.get(id) else {
            return String::new();
        };
        match &node.kind {
            // "The result of concatenating the following: The result of
            // performing serialize a group of selectors on the rule's
            // associated selectors, the string " {", ..."
            RuleKind::Style {
                selector_text,
                declarations,
            } => block(selector_text, &declarations.css_text()),
            RuleKind::Keyframe {
                key_text,
                declarations,
            } => block(key_text, &declarations.css_text()),
            RuleKind::FontFace { declarations } => block("@font-face", &declarations.css_text()),
            RuleKind::Media {
                condition,
                children,
            } => self.group(&format!("@media {condition}"), children),
            RuleKind::Supports {
                condition,
                children,
            } => self.group(&format!("@supports {condition}"), children),
            RuleKind::Container {
                condition,
                children,
            } => self.group(&format!("@container {condition}"), children),
            RuleKind::Keyframes { name, children } => {
                self.group(&format!("@keyframes {name}"), children)
            }
            RuleKind::Scope {
                start,
                end,
                children,
            } => {
                let mut prelude = String::from("@scope");
                if let Some(start) = start {
                    prelude.push_str(&format!(" ({start})"));
                }
                if let Some(end) = end {
                    prelude.push_str(&format!(" to ({end})"));
                }
                self.group(&prelude, children)
            }
        }
    }

    /// `prelude {\n  child\n  child\n}`
    fn group(&self, prelude: &str, children: &[RuleId]) -> String {
        let mut text = format!("{} {{\n", prelude.trim());
        for &child in children {
            text.push_str("  ");
            text.push_str(&self.css_text(child));
            text.push('\n');
        }
        text.push('}');
        text
    }
}

/// `prelude { declarations }`, or `prelude { }` when empty.
fn block(prelude: &str, declarations: &str) -> String {
    if declarations.is_empty() {
        format!("{prelude} {{ }}")
    } else {
        format!("{prelude} {{ {declarations} }}")
    }
}
