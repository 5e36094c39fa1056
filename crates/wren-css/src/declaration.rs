//! Declaration blocks.
//!
//! [CSSOM § 6.6 CSSStyleDeclaration](https://drafts.csswg.org/cssom/#the-cssstyledeclaration-interface)
//!
//! "A CSS declaration block is an ordered collection of CSS properties with
//! their associated values, also named CSS declarations."
//!
//! Known shorthands are stored as their longhands. The only shorthands stored
//! verbatim are those whose value contains `var()`: they cannot be validated
//! until the custom properties are known, so the cascade expands them later.

use serde::Serialize;

use crate::properties::{Property, canonical_name, is_custom_property};
use crate::shorthand;
use crate::values::split_top_level;

/// [CSSOM § 6.6](https://drafts.csswg.org/cssom/#css-declaration)
///
/// "A CSS declaration is an abstract concept that is not exposed as an object
/// in the DOM. A CSS declaration has the following associated properties:
/// property name, value, important flag."
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Declaration {
    /// "The property name of the declaration."
    pub name: String,
    /// "The value of the declaration represented as a list of component values."
    pub value: String,
    /// "Either set or unset."
    pub important: bool,
}

impl Declaration {
    /// True if the value must be resolved against custom properties first.
    #[must_use]
    pub fn has_var(&self) -> bool {
        contains_var(&self.value)
    }
}

/// An ordered declaration block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeclarationBlock {
    declarations: Vec<Declaration>,
    /// At-rule descriptor blocks (`@font-face`) keep names and values verbatim.
    #[serde(skip)]
    descriptors: bool,
}

impl DeclarationBlock {
    /// Create an empty block.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `text` as the contents of a style attribute or style rule.
    /// Invalid declarations are dropped individually.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut block = Self::new();
        block.parse_into(text);
        block
    }

    /// Parse `text` as an at-rule descriptor block: names are lowercased,
    /// values are kept verbatim and never validated.
    #[must_use]
    pub fn parse_descriptors(text: &str) -> Self {
        let mut block = Self {
            declarations: Vec::new(),
            descriptors: true,
        };
        block.parse_into(text);
        block
    }

    /// [CSSOM § 6.6 cssText setter](https://drafts.csswg.org/cssom/#dom-cssstyledeclaration-csstext)
    ///
    /// "Empty the declarations. Parse the given value and, if the return value
    /// is not the empty list, insert the items in the list into the
    /// declarations, in specified order."
    pub fn set_css_text(&mut self, text: &str) {
        self.declarations.clear();
        self.parse_into(text);
    }

    fn parse_into(&mut self, text: &str) {
        for piece in split_top_level(text, ';') {
            let Some((name, value, important)) = parse_declaration(&piece) else {
                continue;
            };
            // [CSS Cascading § 6](https://www.w3.org/TR/css-cascade-4/#cascade-sort)
            // Within one block a normal declaration never overrides an
            // important one for the same property.
            if !important && self.would_downgrade(&name, &value) {
                continue;
            }
            let _ = self.set_property(&name, &value, important);
        }
    }

    /// True if setting `name` without `!important` would replace an important
    /// declaration.
    fn would_downgrade(&self, name: &str, value: &str) -> bool {
        let canonical = canonical_name(name);
        if self.find(&canonical).is_some_and(|d| d.important) {
            return true;
        }
        match Property::from_name(name) {
            Some(property) if property.is_shorthand() && !contains_var(value) => property
                .longhands()
                .iter()
                .any(|p| self.find(p.name()).is_some_and(|d| d.important)),
            _ => false,
        }
    }

    /// [CSSOM § 6.6 setProperty](https://drafts.csswg.org/cssom/#dom-cssstyledeclaration-setproperty)
    ///
    /// "If value is the empty string, invoke removeProperty() with property as
    /// argument and return." Unknown properties and values that do not match
    /// the property's grammar are ignored; the return value reports whether
    /// the declaration was accepted.
    pub fn set_property(&mut self, name: &str, value: &str, important: bool) -> bool {
        let value = value.trim();
        if value.is_empty() {
            let _ = self.remove_property(name);
            return true;
        }
        let name = name.trim();
        if is_custom_property(name) || self.descriptors {
            let canonical = if is_custom_property(name) {
                name.to_string()
            } else {
                name.to_ascii_lowercase()
            };
            self.upsert(&canonical, value, important);
            return true;
        }

        let Some(property) = Property::from_name(name) else {
            return false;
        };

        // [CSS Variables § 3](https://www.w3.org/TR/css-variables-1/#using-variables)
        // "If a property contains one or more var() functions, and those
        // functions are syntactically valid, the entire property's grammar
        // must be assumed to be valid at parse time."
        if contains_var(value) {
            if !crate::values::parens_balanced(value) {
                return false;
            }
            self.upsert(property.name(), value, important);
            return true;
        }

        let Some(longhands) = shorthand::expand(property, value, important) else {
            return false;
        };
        // A concrete value replaces a pending `var()` value of the same name.
        if property.is_shorthand() {
            self.declarations.retain(|d| d.name != property.name());
        }
        for (longhand, resolved) in longhands {
            self.upsert(longhand.name(), &resolved.value, resolved.important);
        }
        true
    }

    /// [CSSOM § 6.6 removeProperty](https://drafts.csswg.org/cssom/#dom-cssstyledeclaration-removeproperty)
    ///
    /// "Let value be the return value of invoking getPropertyValue() with
    /// property as argument. ... If property is a shorthand, for each longhand
    /// property longhand that property maps to ... remove it. Return value."
    pub fn remove_property(&mut self, name: &str) -> String {
        let value = self.get_property_value(name);
        let canonical = canonical_name(name);
        let mut doomed: Vec<&str> = vec![canonical.as_str()];
        if !self.descriptors
            && let Some(property) = Property::from_name(name)
        {
            doomed.extend(property.longhands().iter().map(|p| p.name()));
        }
        self.declarations.retain(|d| !doomed.contains(&d.name.as_str()));
        value
    }

    /// [CSSOM § 6.6 getPropertyValue](https://drafts.csswg.org/cssom/#dom-cssstyledeclaration-getpropertyvalue)
    #[must_use]
    pub fn get_property_value(&self, name: &str) -> String {
        let canonical = canonical_name(name);
        if let Some(declaration) = self.find(&canonical) {
            return declaration.value.clone();
        }
        match Property::from_name(name) {
            Some(property) if property.is_shorthand() && !self.descriptors => {
                let resolved = self.resolved_longhands(property);
                shorthand::collapse(property, |p| {
                    resolved.iter().find(|(q, _)| *q == p).map(|(_, r)| r)
                })
            }
            _ => String::new(),
        }
    }

    /// [CSSOM § 6.6 getPropertyPriority](https://drafts.csswg.org/cssom/#dom-cssstyledeclaration-getpropertypriority)
    #[must_use]
    pub fn get_property_priority(&self, name: &str) -> &'static str {
        let canonical = canonical_name(name);
        let important = match self.find(&canonical) {
            Some(declaration) => declaration.important,
            None => match Property::from_name(name) {
                Some(property) if property.is_shorthand() => property
                    .longhands()
                    .iter()
                    .all(|p| self.find(p.name()).is_some_and(|d| d.important)),
                _ => false,
            },
        };
        if important { "important" } else { "" }
    }

    /// [CSSOM § 6.6 cssText getter](https://drafts.csswg.org/cssom/#serialize-a-css-declaration-block)
    ///
    /// "To serialize a CSS declaration block declaration block means to run
    /// the steps below: ... For each property in declarations ... If property
    /// is in already serialized, continue ... If property maps to one or more
    /// shorthand properties, let shorthands be an array of those shorthand
    /// properties, in preferred order."
    #[must_use]
    pub fn css_text(&self) -> String {
        let mut list: Vec<String> = Vec::new();
        let mut already_serialized: Vec<&str> = Vec::new();

        for declaration in &self.declarations {
            let name = declaration.name.as_str();
            if already_serialized.contains(&name) {
                continue;
            }

            if !self.descriptors
                && let Some(property) = Property::from_name(name)
                && !property.is_shorthand()
            {
                let mut shorthands = property.shorthands();
                // Preferred order: the shorthand covering the most longhands first.
                shorthands.sort_by_key(|s| std::cmp::Reverse(s.longhands().len()));
                let collapsed = shorthands.into_iter().find_map(|s| {
                    let longhands = s.longhands();
                    if longhands
                        .iter()
                        .any(|p| already_serialized.contains(&p.name()))
                    {
                        return None;
                    }
                    let value = self.get_property_value(s.name());
                    (!value.is_empty()).then_some((s, value))
                });
                if let Some((s, value)) = collapsed {
                    list.push(serialize_declaration(
                        s.name(),
                        &value,
                        self.get_property_priority(s.name()) == "important",
                    ));
                    already_serialized.extend(s.longhands().iter().map(|p| p.name()));
                    continue;
                }
            }

            list.push(serialize_declaration(
                name,
                &declaration.value,
                declaration.important,
            ));
            already_serialized.push(name);
        }
        list.join(" ")
    }

    /// [CSSOM § 6.6 length](https://drafts.csswg.org/cssom/#dom-cssstyledeclaration-length)
    #[must_use]
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    /// True if the block holds no declarations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// True for at-rule descriptor blocks.
    #[must_use]
    pub const fn is_descriptor_block(&self) -> bool {
        self.descriptors
    }

    /// [CSSOM § 6.6 item()](https://drafts.csswg.org/cssom/#dom-cssstyledeclaration-item)
    #[must_use]
    pub fn item(&self, index: usize) -> Option<&str> {
        self.declarations.get(index).map(|d| d.name.as_str())
    }

    /// Declarations in order.
    pub fn iter(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations.iter()
    }

    fn find(&self, name: &str) -> Option<&Declaration> {
        self.declarations.iter().find(|d| d.name == name)
    }

    fn resolved_longhands(
        &self,
        property: Property,
    ) -> Vec<(Property, crate::computed::ResolvedProperty)> {
        property
            .longhands()
            .iter()
            .filter_map(|&p| {
                self.find(p.name()).map(|d| {
                    (
                        p,
                        crate::computed::ResolvedProperty::new(&d.value, d.important),
                    )
                })
            })
            .collect()
    }

    /// Update `name` in place or append it.
    fn upsert(&mut self, name: &str, value: &str, important: bool) {
        if let Some(existing) = self.declarations.iter_mut().find(|d| d.name == name) {
            value.clone_into(&mut existing.value);
            existing.important = important;
        } else {
            self.declarations.push(Declaration {
                name: name.to_string(),
                value: value.to_string(),
                important,
            });
        }
    }
}

/// Split one declaration (`name: value !important`) into its parts.
///
/// Returns `None` when there is no colon, the name is empty, or the value is
/// empty.
#[must_use]
pub fn parse_declaration(text: &str) -> Option<(String, String, bool)> {
    let (name, value) = text.split_once(':')?;
    let name = name.trim();
    if name.is_empty() || name.contains(char::is_whitespace) {
        return None;
    }
    let (value, important) = strip_important(value.trim());
    if value.is_empty() {
        return None;
    }
    Some((name.to_string(), value.to_string(), important))
}

/// [CSS Syntax § 5.4.6](https://www.w3.org/TR/css-syntax-3/#consume-declaration)
///
/// "If the last two non-`<whitespace-token>`s in the declaration's value are
/// a `<delim-token>` with the value "!" followed by an `<ident-token>` with a
/// value that is an ASCII case-insensitive match for "important", remove them
/// from the declaration's value and set the declaration's important flag to
/// true."
fn strip_important(value: &str) -> (&str, bool) {
    let lower = value.to_ascii_lowercase();
    if let Some(before) = lower.strip_suffix("important")
        && let Some(bang) = before.trim_end().strip_suffix('!')
    {
        return (value[..bang.len()].trim_end(), true);
    }
    (value, false)
}

/// `name: value;` or `name: value !important;`
fn serialize_declaration(name: &str, value: &str, important: bool) -> String {
    if important {
        format!("{name}: {value} !important;")
    } else {
        format!("{name}: {value};")
    }
}

/// True if `value` references a custom property.
#[must_use]
pub fn contains_var(value: &str) -> bool {
    value.to_ascii_lowercase().contains("var(")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_important() {
        assert_eq!(strip_important("red !important"), ("red", true));
        assert_eq!(strip_important("red ! IMPORTANT"), ("red", true));
        assert_eq!(strip_important("red"), ("red", false));
        assert_eq!(strip_important("important"), ("important", false));
    }

    #[test]
    fn test_parse_declaration() {
        assert_eq!(
            parse_declaration(" color : red "),
            Some(("color".to_string(), "red".to_string(), false))
        );
        assert_eq!(parse_declaration("color"), None);
        assert_eq!(parse_declaration("color:"), None);
        assert_eq!(parse_declaration("font family: x"), None);
    }

    #[test]
    fn test_url_with_colon_keeps_value() {
        let block = DeclarationBlock::parse("background-image: url(http://x/a.png)");
        assert_eq!(
            block.get_property_value("background-image"),
            "url(\"http://x/a.png\")"
        );
    }
}
