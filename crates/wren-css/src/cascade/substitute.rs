//! CSS Custom Properties `var()` Substitution
//!
//! [CSS Custom Properties for Cascading Variables Module Level 1 § 3](https://www.w3.org/TR/css-variables-1/#using-variables)
//!
//! "If a property value contains one or more `var()` functions, and those
//! functions are syntactically valid, the entire property's grammar must be
//! assumed to be valid at parse time. It is only syntax-checked at
//! computed-value time, after `var()` functions have been substituted."

use std::collections::{HashMap, HashSet};

use crate::computed::ComputedStyleMap;
use crate::declaration::contains_var;
use crate::properties::is_custom_property;

/// Maximum nesting of fallbacks inside fallbacks.
///
/// [§ 2.3 Resolving Dependency Cycles](https://www.w3.org/TR/css-variables-1/#cycles)
///
/// Cycles between custom properties are detected exactly by
/// [`CustomProperties`]; the depth limit only bounds pathological fallback
/// nesting inside a single value.
const MAX_SUBSTITUTION_DEPTH: u32 = 32;

/// [§ 3 Using Cascading Variables](https://www.w3.org/TR/css-variables-1/#using-variables)
///
/// "To substitute a `var()` in a property's value:
///  2. If the value of the custom property named by the first argument to
///     the `var()` function is anything but the initial value, replace the
///     `var()` function by the value of the corresponding custom property.
///  3. Otherwise, if the `var()` function has a fallback value as its second
///     argument, replace the `var()` function by the fallback value. If there
///     are any `var()` references in the fallback, substitute them as well.
///  4. Otherwise, the property containing the `var()` function is invalid at
///     computed-value time."
///
/// Returns `None` if substitution fails.
pub fn substitute_var<F>(value: &str, lookup: &mut F, depth: u32) -> Option<String>
where
    F: FnMut(&str) -> Option<String>,
{
    if depth > MAX_SUBSTITUTION_DEPTH {
        return None;
    }

    let mut result = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(start) = find_var(rest) {
        result.push_str(&rest[..start]);
        let after_open = &rest[start + "var(".len()..];
        let close = matching_paren(after_open)?;
        let (name, fallback) = parse_var_arguments(&after_open[..close])?;

        if let Some(substituted) = lookup(&name) {
            result.push_str(&substituted);
        } else if let Some(fallback) = fallback {
            result.push_str(&substitute_var(fallback, lookup, depth + 1)?);
        } else {
            return None;
        }
        rest = &after_open[close + 1..];
    }
    result.push_str(rest);
    Some(result.trim().to_string())
}

/// Byte offset of the next `var(` outside quoted strings that is not the
/// tail of a longer identifier.
fn find_var(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut quote: Option<u8> = None;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) if b == b'\\' => i += 1,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None => {
                let starts_here = bytes.len() - i >= 4
                    && bytes[i..i + 4].eq_ignore_ascii_case(b"var(")
                    && (i == 0 || !is_ident_byte(bytes[i - 1]));
                if starts_here {
                    return Some(i);
                }
            }
        }
        i += 1;
    }
    None
}

const fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_'
}

/// Offset of the `)` that closes an already-opened parenthesis.
fn matching_paren(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, c) {
            (_, '\\') => escaped = true,
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') if depth == 0 => return Some(i),
            (None, ')') => depth -= 1,
            _ => {}
        }
    }
    None
}

/// Parse the arguments of a `var()` function.
///
/// "`var()` = var( <custom-property-name> \[, <declaration-value>\]? )"
///
/// "var(--foo, red, blue) defines a fallback of `red, blue`." An empty
/// fallback (`var(--x,)`) is valid and substitutes nothing.
fn parse_var_arguments(args: &str) -> Option<(String, Option<&str>)> {
    let (name, fallback) = match args.split_once(',') {
        Some((name, fallback)) => (name.trim(), Some(fallback.trim())),
        None => (args.trim(), None),
    };
    is_custom_property(name).then(|| (name.to_string(), fallback))
}

/// The custom properties of one element during its cascade.
///
/// Declared values may reference each other; they are resolved lazily and
/// memoized. Names without a declared value fall back to the parent's
/// computed custom properties.
pub struct CustomProperties<'a> {
    declared: HashMap<String, String>,
    inherited: Option<&'a ComputedStyleMap>,
    resolved: HashMap<String, Option<String>>,
    stack: Vec<String>,
    in_cycle: HashSet<String>,
}

impl<'a> CustomProperties<'a> {
    /// `declared` holds the cascaded, still unsubstituted value of every
    /// custom property set on the element itself.
    #[must_use]
    pub fn new(declared: HashMap<String, String>, inherited: Option<&'a ComputedStyleMap>) -> Self {
        Self {
            declared,
            inherited,
            resolved: HashMap::new(),
            stack: Vec::new(),
            in_cycle: HashSet::new(),
        }
    }

    /// The computed value of `name`, or `None` if it is undefined or invalid
    /// at computed-value time.
    ///
    /// [§ 2.3](https://www.w3.org/TR/css-variables-1/#cycles)
    /// "If there is a cycle in the dependency graph, all the custom properties
    /// in the cycle are invalid at computed-value time."
    pub fn resolve(&mut self, name: &str) -> Option<String> {
        if let Some(resolved) = self.resolved.get(name) {
            return resolved.clone();
        }
        let Some(raw) = self.declared.get(name).cloned() else {
            return self
                .inherited
                .and_then(|parent| parent.get(name))
                .map(|r| r.value.clone());
        };
        if let Some(position) = self.stack.iter().position(|n| n == name) {
            self.in_cycle.extend(self.stack[position..].iter().cloned());
            return None;
        }

        self.stack.push(name.to_string());
        let value = if contains_var(&raw) {
            substitute_var(&raw, &mut |n: &str| self.resolve(n), 0)
        } else {
            Some(raw)
        };
        let _ = self.stack.pop();

        let value = value.filter(|_| !self.in_cycle.contains(name));
        let _ = self.resolved.insert(name.to_string(), value.clone());
        value
    }

    /// Resolve every declared custom property.
    pub fn resolve_all(&mut self) -> Vec<(String, Option<String>)> {
        let mut names: Vec<String> = self.declared.keys().cloned().collect();
        names.sort();
        names
            .into_iter()
            .map(|name| {
                let value = self.resolve(&name);
                (name, value)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::computed::ResolvedProperty;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl FnMut(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_simple_substitution() {
        let mut lookup = lookup_from(&[("--x", "2px")]);
        assert_eq!(substitute_var("var(--x)", &mut lookup, 0), Some("2px".to_string()));
        assert_eq!(
            substitute_var("calc(var(--x) + 1px)", &mut lookup, 0),
            Some("calc(2px + 1px)".to_string())
        );
        assert_eq!(
            substitute_var("VAR(--x) solid", &mut lookup, 0),
            Some("2px solid".to_string())
        );
    }

    #[test]
    fn test_fallbacks() {
        let mut lookup = lookup_from(&[("--b", "blue")]);
        assert_eq!(substitute_var("var(--a, red)", &mut lookup, 0), Some("red".to_string()));
        assert_eq!(
            substitute_var("var(--a, var(--b))", &mut lookup, 0),
            Some("blue".to_string())
        );
        assert_eq!(
            substitute_var("var(--a, 1px, 2px)", &mut lookup, 0),
            Some("1px, 2px".to_string())
        );
        assert_eq!(substitute_var("var(--a)", &mut lookup, 0), None);
        assert_eq!(substitute_var("var(a)", &mut lookup, 0), None);
    }

    #[test]
    fn test_var_inside_strings_and_identifiers_is_left_alone() {
        let mut lookup = lookup_from(&[]);
        assert_eq!(
            substitute_var("\"var(--x)\"", &mut lookup, 0),
            Some("\"var(--x)\"".to_string())
        );
        assert_eq!(substitute_var("novar(1)", &mut lookup, 0), Some("novar(1)".to_string()));
    }

    #[test]
    fn test_custom_property_chains_resolve() {
        let declared = HashMap::from([
            ("--a".to_string(), "var(--b)".to_string()),
            ("--b".to_string(), "4px".to_string()),
        ]);
        let mut customs = CustomProperties::new(declared, None);
        assert_eq!(customs.resolve("--a"), Some("4px".to_string()));
        assert_eq!(
            substitute_var("var(--a) var(--b)", &mut |n: &str| customs.resolve(n), 0),
            Some("4px 4px".to_string())
        );
    }

    #[test]
    fn test_cycles_invalidate_every_member() {
        let declared = HashMap::from([
            ("--a".to_string(), "var(--b)".to_string()),
            ("--b".to_string(), "var(--a)".to_string()),
            ("--self".to_string(), "var(--self, red)".to_string()),
            ("--outside".to_string(), "var(--a, green)".to_string()),
        ]);
        let mut customs = CustomProperties::new(declared, None);
        let resolved: HashMap<String, Option<String>> = customs.resolve_all().into_iter().collect();
        assert_eq!(resolved["--a"], None);
        assert_eq!(resolved["--b"], None);
        assert_eq!(resolved["--self"], None);
        assert_eq!(resolved["--outside"], Some("green".to_string()));
    }

    #[test]
    fn test_inherited_values_are_used() {
        let mut parent = ComputedStyleMap::new();
        parent.insert("--gap", ResolvedProperty::new("8px", false));
        let declared = HashMap::from([("--double".to_string(), "var(--gap) var(--gap)".to_string())]);
        let mut customs = CustomProperties::new(declared, Some(&parent));
        assert_eq!(customs.resolve("--double"), Some("8px 8px".to_string()));
        assert_eq!(customs.resolve("--gap"), Some("8px".to_string()));
        assert_eq!(customs.resolve("--missing"), None);
    }
}
