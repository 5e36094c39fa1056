//! The stylesheet object model.
//!
//! [CSSOM § 6.1 CSSStyleSheet](https://drafts.csswg.org/cssom/#the-cssstylesheet-interface)
//!
//! A [`StyleSheet`] owns the arena of every rule parsed into it. Once a sheet
//! is attached to a document it shares the document's
//! [`MutationGeneration`], and every mutation entry point bumps it so cached
//! computed styles are recomputed.

use serde::Serialize;
use wren_common::DomException;
use wren_dom::MutationGeneration;

use crate::declaration::DeclarationBlock;
use crate::parser::{RuleArena, RuleId, RuleNode, parse_rules, strip_comments};

/// A parsed stylesheet.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StyleSheet {
    arena: RuleArena,
    /// [CSSOM § 6.1](https://drafts.csswg.org/cssom/#dom-cssstylesheet-cssrules)
    /// "The CSS rules associated with the CSS style sheet", top level only.
    rules: Vec<RuleId>,
    /// [CSSOM § 6.1](https://drafts.csswg.org/cssom/#concept-css-style-sheet-disabled-flag)
    disabled: bool,
    #[serde(skip)]
    generation: Option<MutationGeneration>,
}

impl StyleSheet {
    /// Create an empty, detached stylesheet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Share `generation` with the document this sheet belongs to.
    pub fn attach_generation(&mut self, generation: MutationGeneration) {
        self.generation = Some(generation);
    }

    /// True if this sheet bumps `generation` on mutation.
    #[must_use]
    pub fn is_attached_to(&self, generation: &MutationGeneration) -> bool {
        self.generation
            .as_ref()
            .is_some_and(|own| own.same_counter(generation))
    }

    fn bump(&self) {
        if let Some(generation) = &self.generation {
            let _ = generation.bump();
        }
    }

    /// Reparse from `css_text` without signalling a mutation. Used when the
    /// text of an owning `<style>` element changed, which the tree has
    /// already signalled.
    pub fn replace_rules(&mut self, css_text: &str) {
        self.arena = RuleArena::new();
        self.rules = parse_rules(&mut self.arena, css_text);
    }

    /// [CSSOM § 6.1 replaceSync()](https://drafts.csswg.org/cssom/#dom-cssstylesheet-replacesync)
    ///
    /// "Let rules be the result of running parse a stylesheet's contents from
    /// text. ... Set sheet's CSS rules to rules."
    pub fn replace_sync(&mut self, css_text: &str) {
        self.replace_rules(css_text);
        self.bump();
    }

    /// [CSSOM § 6.1 insertRule()](https://drafts.csswg.org/cssom/#dom-cssstylesheet-insertrule)
    ///
    /// "If index is greater than length, then throw an IndexSizeError
    /// exception. ... Set new rule to the results of performing parse a CSS
    /// rule on argument rule. If new rule is a syntax error, throw a
    /// SyntaxError exception." `index` defaults to 0.
    ///
    /// # Errors
    ///
    /// [`DomException::IndexSize`] when `index` is past the end, and
    /// [`DomException::Syntax`] when `rule` is not exactly one valid rule.
    /// The sheet is unchanged in both cases.
    pub fn insert_rule(&mut self, rule: &str, index: Option<usize>) -> Result<usize, DomException> {
        let index = index.unwrap_or(0);
        if index > self.rules.len() {
            return Err(DomException::IndexSize {
                index,
                length: self.rules.len(),
            });
        }

        // [CSSOM § 6.4.1 Parse a CSS rule](https://drafts.csswg.org/cssom/#parse-a-css-rule)
        // Validate against a scratch arena so a failure leaves no trace.
        let mut scratch = RuleArena::new();
        if !is_single_block(&strip_comments(rule)) || parse_rules(&mut scratch, rule).len() != 1 {
            return Err(DomException::Syntax(format!("failed to parse rule `{}`", rule.trim())));
        }
        let parsed = parse_rules(&mut self.arena, rule);
        let Some(&id) = parsed.first() else {
            return Err(DomException::Syntax(format!("failed to parse rule `{}`", rule.trim())));
        };

        self.rules.insert(index, id);
        self.bump();
        Ok(index)
    }

    /// [CSSOM § 6.1 deleteRule()](https://drafts.csswg.org/cssom/#dom-cssstylesheet-deleterule)
    ///
    /// # Errors
    ///
    /// [`DomException::IndexSize`] when `index` does not name a rule.
    pub fn delete_rule(&mut self, index: usize) -> Result<(), DomException> {
        if index >= self.rules.len() {
            return Err(DomException::IndexSize {
                index,
                length: self.rules.len(),
            });
        }
        let _ = self.rules.remove(index);
        self.bump();
        Ok(())
    }

    /// Top-level rules in order.
    #[must_use]
    pub fn css_rules(&self) -> &[RuleId] {
        &self.rules
    }

    /// Number of top-level rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True if there are no top-level rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Look up any rule of this sheet, nested ones included.
    #[must_use]
    pub fn rule(&self, id: RuleId) -> Option<&RuleNode> {
        self.arena.get(id)
    }

    /// Edit the declarations of a style, keyframe or font-face rule.
    ///
    /// [CSSOM § 6.4.3](https://drafts.csswg.org/cssom/#dom-cssstylerule-style)
    /// Changes made through a rule's `style` are style sheet mutations, so
    /// the generation is bumped.
    pub fn update_declarations<R>(
        &mut self,
        id: RuleId,
        edit: impl FnOnce(&mut DeclarationBlock) -> R,
    ) -> Option<R> {
        let block = self.arena.get_mut(id)?.kind.declarations_mut()?;
        let result = edit(block);
        self.bump();
        Some(result)
    }

    /// [CSSOM § 6.1 disabled](https://drafts.csswg.org/cssom/#dom-stylesheet-disabled)
    #[must_use]
    pub const fn disabled(&self) -> bool {
        self.disabled
    }

    /// "Setting the disabled attribute must set the disabled flag if the new
    /// value is true, or unset it otherwise."
    pub fn set_disabled(&mut self, disabled: bool) {
        if self.disabled != disabled {
            self.disabled = disabled;
            self.bump();
        }
    }

    /// [CSSOM § 6.4.2 Serialize a CSS rule](https://drafts.csswg.org/cssom/#serialize-a-css-rule)
    #[must_use]
    pub fn rule_css_text(&self, id: RuleId) -> String {
        self.arena.css_text(id)
    }

    /// All top-level rules serialized, one per line.
    #[must_use]
    pub fn css_text(&self) -> String {
        self.rules
            .iter()
            .map(|&id| self.arena.css_text(id))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// True if `text` is one prelude followed by one `{}` block and nothing
/// else. The block may be left open at the end of the input.
fn is_single_block(text: &str) -> bool {
    let mut depth = 0_usize;
    let mut blocks = 0_usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in text.chars() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        if depth == 0 && blocks == 1 && !c.is_whitespace() {
            return false;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '{' => {
                if depth == 0 {
                    blocks += 1;
                }
                depth += 1;
            }
            '}' if depth == 0 => return false,
            '}' => depth -= 1,
            ';' if depth == 0 => return false,
            _ => {}
        }
    }
    blocks == 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_stylesheet;

    #[test]
    fn test_insert_and_delete_bump_generation() {
        let generation = MutationGeneration::new();
        let mut sheet = parse_stylesheet("p { color: red }");
        sheet.attach_generation(generation.clone());
        assert!(sheet.is_attached_to(&generation));

        let before = generation.current();
        assert_eq!(sheet.insert_rule("div { color: blue }", Some(1)), Ok(1));
        assert_eq!(generation.current(), before + 1);
        assert_eq!(sheet.delete_rule(0), Ok(()));
        assert_eq!(generation.current(), before + 2);
        assert_eq!(sheet.css_text(), "div { color: blue; }");
    }

    #[test]
    fn test_failed_insert_leaves_sheet_unchanged() {
        let generation = MutationGeneration::new();
        let mut sheet = parse_stylesheet("p { color: red }");
        sheet.attach_generation(generation.clone());
        let before = generation.current();

        assert_eq!(
            sheet.insert_rule("div { }", Some(5)),
            Err(DomException::IndexSize { index: 5, length: 1 })
        );
        assert!(matches!(
            sheet.insert_rule("}}} not a rule", None),
            Err(DomException::Syntax(_))
        ));
        assert!(matches!(
            sheet.insert_rule("a { } b { }", None),
            Err(DomException::Syntax(_))
        ));
        assert_eq!(sheet.len(), 1);
        assert_eq!(generation.current(), before);
    }

    #[test]
    fn test_update_declarations() {
        let mut sheet = parse_stylesheet("p { color: red }");
        let id = sheet.css_rules()[0];
        let accepted = sheet.update_declarations(id, |block| block.set_property("margin", "1px 2px", false));
        assert_eq!(accepted, Some(true));
        assert_eq!(sheet.css_text(), "p { color: red; margin: 1px 2px; }");
    }
}
