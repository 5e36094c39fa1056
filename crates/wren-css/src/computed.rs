//! Computed style maps.
//!
//! [CSSOM § 9 getComputedStyle](https://drafts.csswg.org/cssom/#dom-window-getcomputedstyle)
//!
//! A [`ComputedStyleMap`] stores longhands and custom properties. Reading a
//! shorthand collapses its longhands on demand.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::properties::{Property, canonical_name, is_custom_property};
use crate::shorthand;

/// The winning value of one property together with its importance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedProperty {
    /// Canonical serialized value.
    pub value: String,
    /// True if the winning declaration was `!important`.
    pub important: bool,
}

impl ResolvedProperty {
    /// Create a resolved property.
    #[must_use]
    pub fn new(value: &str, important: bool) -> Self {
        Self {
            value: value.to_string(),
            important,
        }
    }
}

/// Property name to resolved value.
///
/// Every property the engine knows can be read; names without an entry read
/// as the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ComputedStyleMap {
    entries: BTreeMap<String, ResolvedProperty>,
}

impl ComputedStyleMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a longhand or custom property under its canonical name.
    pub fn insert(&mut self, name: &str, resolved: ResolvedProperty) {
        let _ = self.entries.insert(canonical_name(name), resolved);
    }

    /// Remove an entry, returning it.
    pub fn remove(&mut self, name: &str) -> Option<ResolvedProperty> {
        self.entries.remove(&canonical_name(name))
    }

    /// The stored entry for a longhand or custom property.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ResolvedProperty> {
        self.entries.get(&canonical_name(name))
    }

    /// The stored entry for a known longhand.
    #[must_use]
    pub fn get_longhand(&self, property: Property) -> Option<&ResolvedProperty> {
        self.entries.get(property.name())
    }

    /// [CSSOM § 6.6 getPropertyValue](https://drafts.csswg.org/cssom/#dom-cssstyledeclaration-getpropertyvalue)
    ///
    /// "If property is a shorthand property, then follow these substeps: ...
    /// Return the serialization of list." Unknown or unset properties return
    /// the empty string.
    #[must_use]
    pub fn get_property_value(&self, name: &str) -> String {
        if is_custom_property(name.trim()) {
            return self
                .get(name)
                .map(|r| r.value.clone())
                .unwrap_or_default();
        }
        match Property::from_name(name) {
            // A shorthand is only stored verbatim when its value could not be
            // expanded yet (local style with `var()`).
            Some(property) if property.is_shorthand() => self.entries.get(property.name()).map_or_else(
                || shorthand::collapse(property, |p| self.get_longhand(p)),
                |r| r.value.clone(),
            ),
            Some(property) => self
                .get_longhand(property)
                .map(|r| r.value.clone())
                .unwrap_or_default(),
            None => String::new(),
        }
    }

    /// [CSSOM § 6.6 getPropertyPriority](https://drafts.csswg.org/cssom/#dom-cssstyledeclaration-getpropertypriority)
    ///
    /// Returns `"important"` or the empty string.
    #[must_use]
    pub fn get_property_priority(&self, name: &str) -> &'static str {
        let important = match Property::from_name(name) {
            Some(property) if property.is_shorthand() => {
                let longhands = property.longhands();
                longhands
                    .iter()
                    .all(|&p| self.get_longhand(p).is_some_and(|r| r.important))
            }
            _ => self.get(name).is_some_and(|r| r.important),
        };
        if important { "important" } else { "" }
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stored entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResolvedProperty)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Every readable name: all known longhands followed by the stored
    /// custom properties.
    #[must_use]
    pub fn property_names(&self) -> Vec<String> {
        Property::all_longhands()
            .map(|p| p.name().to_string())
            .chain(
                self.entries
                    .keys()
                    .filter(|k| is_custom_property(k))
                    .cloned(),
            )
            .collect()
    }

    /// Custom properties only.
    pub fn custom_properties(&self) -> impl Iterator<Item = (&str, &ResolvedProperty)> {
        self.iter().filter(|(k, _)| is_custom_property(k))
    }
}
