//! Selector text to [`SelectorList`].
//!
//! [§ 18 Grammar](https://www.w3.org/TR/selectors-4/#grammar)

use super::{
    AttributeOperator, AttributeSelector, Combinator, ComplexSelector, CompoundSelector, Nth,
    PseudoClass, SelectorList, SimpleSelector,
};
use crate::values::split_top_level;

/// Legacy single-colon pseudo-elements.
///
/// [§ 3.6.1](https://www.w3.org/TR/selectors-4/#pseudo-element-syntax)
/// "For compatibility with existing style sheets, user agents must also
/// accept the previous one-colon notation for pseudo-elements introduced in
/// CSS levels 1 and 2 (namely, :first-line, :first-letter, :before and
/// :after)."
const LEGACY_PSEUDO_ELEMENTS: [&str; 4] = ["before", "after", "first-line", "first-letter"];

/// Parse a comma-separated selector list without consulting the cache.
///
/// Any invalid alternative invalidates the whole list.
#[must_use]
pub fn parse_selector_list(text: &str) -> Option<SelectorList> {
    let selectors = split_top_level(text, ',')
        .iter()
        .map(|piece| parse_complex(piece))
        .collect::<Option<Vec<_>>>()?;
    if selectors.is_empty() {
        return None;
    }
    Some(SelectorList { selectors })
}

/// `<forgiving-selector-list>`: invalid alternatives are dropped instead of
/// invalidating the list.
fn parse_forgiving_list(text: &str) -> SelectorList {
    SelectorList {
        selectors: split_top_level(text, ',')
            .iter()
            .filter_map(|piece| parse_complex(piece))
            .collect(),
    }
}

fn parse_complex(text: &str) -> Option<ComplexSelector> {
    let mut cursor = Cursor::new(text.trim());
    if cursor.at_end() {
        return None;
    }

    let mut compounds: Vec<CompoundSelector> = Vec::new();
    let mut combinators: Vec<Combinator> = Vec::new();

    loop {
        let saw_whitespace = cursor.skip_whitespace();
        let Some(c) = cursor.peek() else {
            break;
        };

        let explicit = match c {
            '>' => Some(Combinator::Child),
            '+' => Some(Combinator::NextSibling),
            '~' => Some(Combinator::SubsequentSibling),
            _ => None,
        };

        if let Some(combinator) = explicit {
            // A combinator needs a compound on both sides.
            if compounds.len() != combinators.len() + 1 {
                return None;
            }
            cursor.bump();
            combinators.push(combinator);
            continue;
        }

        if compounds.len() == combinators.len() + 1 {
            if !saw_whitespace {
                return None;
            }
            combinators.push(Combinator::Descendant);
        }
        compounds.push(parse_compound(&mut cursor)?);
    }

    if compounds.len() != combinators.len() + 1 {
        return None;
    }

    let subject = compounds.pop()?;
    let combinators = combinators.into_iter().rev().zip(compounds.into_iter().rev()).collect();
    Some(ComplexSelector {
        subject,
        combinators,
    })
}

/// Parse one compound selector starting at the cursor. Stops before
/// whitespace, a combinator, or the end of input.
fn parse_compound(cursor: &mut Cursor<'_>) -> Option<CompoundSelector> {
    let mut simple_selectors = Vec::new();

    // [§ 5.1](https://www.w3.org/TR/selectors-4/#type-selectors)
    // A type or universal selector may only come first.
    if cursor.peek() == Some('*') {
        cursor.bump();
        simple_selectors.push(SimpleSelector::Universal);
    } else if cursor.at_ident_start() {
        let name = cursor.consume_ident()?;
        simple_selectors.push(SimpleSelector::Type(name.to_ascii_lowercase()));
    }

    while let Some(c) = cursor.peek() {
        match c {
            '.' => {
                cursor.bump();
                simple_selectors.push(SimpleSelector::Class(cursor.consume_ident()?));
            }
            '#' => {
                cursor.bump();
                let id = cursor.consume_name()?;
                simple_selectors.push(SimpleSelector::Id(id));
            }
            '[' => {
                cursor.bump();
                simple_selectors.push(SimpleSelector::Attribute(parse_attribute(cursor)?));
            }
            ':' => {
                cursor.bump();
                simple_selectors.push(parse_pseudo(cursor)?);
            }
            c if c.is_whitespace() || matches!(c, '>' | '+' | '~') => break,
            _ => return None,
        }
    }

    if simple_selectors.is_empty() {
        return None;
    }
    Some(CompoundSelector { simple_selectors })
}

/// Parse the inside of `[...]`, with the cursor just past the `[`.
fn parse_attribute(cursor: &mut Cursor<'_>) -> Option<AttributeSelector> {
    let _ = cursor.skip_whitespace();
    let name = cursor.consume_ident()?.to_ascii_lowercase();
    let _ = cursor.skip_whitespace();

    let operator = match cursor.next()? {
        ']' => {
            return Some(AttributeSelector {
                name,
                operator: AttributeOperator::Exists,
                value: String::new(),
                case_insensitive: false,
            });
        }
        '=' => AttributeOperator::Equals,
        op @ ('~' | '|' | '^' | '$' | '*') => {
            if cursor.next()? != '=' {
                return None;
            }
            match op {
                '~' => AttributeOperator::Includes,
                '|' => AttributeOperator::DashMatch,
                '^' => AttributeOperator::Prefix,
                '$' => AttributeOperator::Suffix,
                _ => AttributeOperator::Substring,
            }
        }
        _ => return None,
    };

    let _ = cursor.skip_whitespace();
    let value = match cursor.peek()? {
        q @ ('"' | '\'') => {
            cursor.bump();
            cursor.consume_string(q)?
        }
        _ => cursor.consume_ident()?,
    };
    let _ = cursor.skip_whitespace();

    // [§ 6.3](https://www.w3.org/TR/selectors-4/#attribute-case)
    let mut case_insensitive = false;
    if let Some(flag @ ('i' | 'I' | 's' | 'S')) = cursor.peek() {
        cursor.bump();
        case_insensitive = flag.eq_ignore_ascii_case(&'i');
        let _ = cursor.skip_whitespace();
    }

    if cursor.next()? != ']' {
        return None;
    }
    Some(AttributeSelector {
        name,
        operator,
        value,
        case_insensitive,
    })
}

/// Parse a pseudo-class or pseudo-element, with the cursor just past the
/// first `:`.
fn parse_pseudo(cursor: &mut Cursor<'_>) -> Option<SimpleSelector> {
    let is_element = cursor.peek() == Some(':');
    if is_element {
        cursor.bump();
    }
    let name = cursor.consume_ident()?.to_ascii_lowercase();

    let argument = if cursor.peek() == Some('(') {
        cursor.bump();
        Some(cursor.consume_parenthesized()?)
    } else {
        None
    };

    if is_element || (argument.is_none() && LEGACY_PSEUDO_ELEMENTS.contains(&name.as_str())) {
        return Some(SimpleSelector::PseudoElement(name));
    }

    let Some(argument) = argument else {
        let pseudo = match name.as_str() {
            "root" => PseudoClass::Root,
            "empty" => PseudoClass::Empty,
            "first-child" => PseudoClass::FirstChild,
            "last-child" => PseudoClass::LastChild,
            "only-child" => PseudoClass::OnlyChild,
            "first-of-type" => PseudoClass::FirstOfType,
            "last-of-type" => PseudoClass::LastOfType,
            "only-of-type" => PseudoClass::OnlyOfType,
            "link" => PseudoClass::Link,
            "any-link" => PseudoClass::AnyLink,
            "enabled" => PseudoClass::Enabled,
            "disabled" => PseudoClass::Disabled,
            "checked" => PseudoClass::Checked,
            "required" => PseudoClass::Required,
            "optional" => PseudoClass::Optional,
            "defined" => PseudoClass::Defined,
            "host" => return Some(SimpleSelector::Host(None)),
            _ => PseudoClass::Dynamic(name),
        };
        return Some(SimpleSelector::PseudoClass(pseudo));
    };

    let simple = match name.as_str() {
        "not" => SimpleSelector::Not(parse_selector_list(&argument)?),
        "is" | "matches" | "-webkit-any" | "-moz-any" => {
            SimpleSelector::Is(parse_forgiving_list(&argument))
        }
        "where" => SimpleSelector::Where(parse_forgiving_list(&argument)),
        "host" => {
            let mut inner = Cursor::new(argument.trim());
            let compound = parse_compound(&mut inner)?;
            if !inner.at_end() {
                return None;
            }
            SimpleSelector::Host(Some(Box::new(compound)))
        }
        "nth-child" => SimpleSelector::PseudoClass(PseudoClass::NthChild(parse_nth(&argument)?)),
        "nth-last-child" => {
            SimpleSelector::PseudoClass(PseudoClass::NthLastChild(parse_nth(&argument)?))
        }
        "nth-of-type" => SimpleSelector::PseudoClass(PseudoClass::NthOfType(parse_nth(&argument)?)),
        "nth-last-of-type" => {
            SimpleSelector::PseudoClass(PseudoClass::NthLastOfType(parse_nth(&argument)?))
        }
        "lang" => {
            let lang = argument.trim().trim_matches(|c| c == '"' || c == '\'');
            if lang.is_empty() {
                return None;
            }
            SimpleSelector::PseudoClass(PseudoClass::Lang(lang.to_ascii_lowercase()))
        }
        _ => SimpleSelector::PseudoClass(PseudoClass::Dynamic(name)),
    };
    Some(simple)
}

/// [CSS Syntax § 6 The An+B microsyntax](https://www.w3.org/TR/css-syntax-3/#anb-microsyntax)
///
/// Accepts `odd`, `even`, an integer, or `An+B` with optional sign and
/// whitespace around the binary operator.
pub(super) fn parse_nth(text: &str) -> Option<Nth> {
    let compact: String = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();

    match compact.as_str() {
        "odd" => return Some(Nth { a: 2, b: 1 }),
        "even" => return Some(Nth { a: 2, b: 0 }),
        "" => return None,
        _ => {}
    }

    let Some((step, offset)) = compact.split_once('n') else {
        return Some(Nth {
            a: 0,
            b: parse_signed(&compact)?,
        });
    };
    let a = match step {
        "" | "+" => 1,
        "-" => -1,
        _ => parse_signed(step)?,
    };
    let b = if offset.is_empty() {
        0
    } else {
        // The offset needs an explicit sign: `2n+1`, `-n-3`.
        if !offset.starts_with(['+', '-']) {
            return None;
        }
        parse_signed(offset)?
    };
    Some(Nth { a, b })
}

fn parse_signed(text: &str) -> Option<i32> {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.strip_prefix('+').unwrap_or(text).parse().ok()
}

/// A character cursor over selector text.
struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    const fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    fn next(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn bump(&mut self) {
        let _ = self.next();
    }

    fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    /// Skip whitespace, reporting whether any was skipped.
    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
        self.pos > start
    }

    /// [CSS Syntax § 4.3.9](https://www.w3.org/TR/css-syntax-3/#would-start-an-identifier)
    /// "Check if three code points would start an ident sequence."
    fn at_ident_start(&self) -> bool {
        match self.peek() {
            Some('-') => match self.peek_second() {
                Some(c) => is_ident_start_char(c) || c == '-' || c == '\\',
                None => false,
            },
            Some('\\') => self.peek_second().is_some_and(|c| c != '\n'),
            Some(c) => is_ident_start_char(c),
            None => false,
        }
    }

    /// [CSS Syntax § 4.3.11 Consume an ident sequence](https://www.w3.org/TR/css-syntax-3/#consume-name)
    fn consume_ident(&mut self) -> Option<String> {
        if !self.at_ident_start() {
            return None;
        }
        self.consume_name()
    }

    /// Consume ident code points and escapes; `None` if nothing was consumed.
    fn consume_name(&mut self) -> Option<String> {
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if c == '\\' {
                self.bump();
                name.push(self.consume_escape()?);
            } else if is_ident_char(c) {
                name.push(c);
                self.bump();
            } else {
                break;
            }
        }
        (!name.is_empty()).then_some(name)
    }

    /// [CSS Syntax § 4.3.7 Consume an escaped code point](https://www.w3.org/TR/css-syntax-3/#consume-escaped-code-point)
    fn consume_escape(&mut self) -> Option<char> {
        let first = self.next()?;
        if !first.is_ascii_hexdigit() {
            return (first != '\n').then_some(first);
        }
        let mut hex = String::from(first);
        while hex.len() < 6 && self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
            hex.push(self.next()?);
        }
        // "If the next input code point is whitespace, consume it as well."
        if self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
        let code = u32::from_str_radix(&hex, 16).ok()?;
        Some(match char::from_u32(code) {
            Some(c) if code != 0 => c,
            _ => char::REPLACEMENT_CHARACTER,
        })
    }

    /// Consume a quoted string body up to and including the closing quote.
    fn consume_string(&mut self, quote: char) -> Option<String> {
        let mut value = String::new();
        loop {
            match self.next()? {
                c if c == quote => return Some(value),
                '\\' => value.push(self.consume_escape()?),
                '\n' => return None,
                c => value.push(c),
            }
        }
    }

    /// Consume up to the `)` that balances an already consumed `(`, returning
    /// the text in between.
    fn consume_parenthesized(&mut self) -> Option<String> {
        let start = self.pos;
        let mut depth = 1u32;
        let mut quote: Option<char> = None;
        while let Some(c) = self.next() {
            match (quote, c) {
                (Some(_), '\\') => self.bump(),
                (Some(q), c) if c == q => quote = None,
                (Some(_), _) => {}
                (None, '"' | '\'') => quote = Some(c),
                (None, '(') => depth += 1,
                (None, ')') => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(self.text[start..self.pos - 1].to_string());
                    }
                }
                (None, _) => {}
            }
        }
        None
    }
}

/// [CSS Syntax § 4.2 ident-start code point](https://www.w3.org/TR/css-syntax-3/#ident-start-code-point)
const fn is_ident_start_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

/// [CSS Syntax § 4.2 ident code point](https://www.w3.org/TR/css-syntax-3/#ident-code-point)
const fn is_ident_char(c: char) -> bool {
    is_ident_start_char(c) || c.is_ascii_digit() || c == '-'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combinator_chain_is_right_to_left() {
        let list = parse_selector_list("div.container > ul li + a").unwrap();
        let complex = &list.selectors[0];
        assert_eq!(
            complex.subject.simple_selectors,
            vec![SimpleSelector::Type("a".to_string())]
        );
        let combinators: Vec<Combinator> = complex.combinators.iter().map(|(c, _)| *c).collect();
        assert_eq!(
            combinators,
            vec![
                Combinator::NextSibling,
                Combinator::Descendant,
                Combinator::Child
            ]
        );
    }

    #[test]
    fn test_whitespace_around_combinators() {
        assert!(parse_selector_list("ul>li").is_some());
        assert!(parse_selector_list("ul  >  li").is_some());
        assert!(parse_selector_list("h1~p").is_some());
    }

    #[test]
    fn test_invalid_selectors() {
        for text in ["", "  ", ">", "div >", "> div", "a..b", "div[", "[=x]", "a, ", "!x", "div {", "a > > b", "#", "."] {
            assert!(parse_selector_list(text).is_none(), "{text:?} should be invalid");
        }
    }

    #[test]
    fn test_attribute_forms() {
        let list = parse_selector_list(r#"[data-x="a b" i]"#).unwrap();
        let SimpleSelector::Attribute(attr) = &list.selectors[0].subject.simple_selectors[0] else {
            panic!("expected attribute selector");
        };
        assert_eq!(attr.name, "data-x");
        assert_eq!(attr.value, "a b");
        assert_eq!(attr.operator, AttributeOperator::Equals);
        assert!(attr.case_insensitive);

        assert!(parse_selector_list("[lang|=en]").is_some());
        assert!(parse_selector_list("[ href ^= 'https' ]").is_some());
    }

    #[test]
    fn test_escapes() {
        let list = parse_selector_list(r".a\:b #\31 23").unwrap();
        let complex = &list.selectors[0];
        assert_eq!(
            complex.subject.simple_selectors,
            vec![SimpleSelector::Id("123".to_string())]
        );
        assert_eq!(
            complex.combinators[0].1.simple_selectors,
            vec![SimpleSelector::Class("a:b".to_string())]
        );
    }

    #[test]
    fn test_pseudo_elements() {
        let list = parse_selector_list("p::before, p:after").unwrap();
        for complex in &list.selectors {
            assert!(matches!(
                complex.subject.simple_selectors[1],
                SimpleSelector::PseudoElement(_)
            ));
        }
    }

    #[test]
    fn test_forgiving_is() {
        let list = parse_selector_list(":is(.a, !!, .b)").unwrap();
        let SimpleSelector::Is(inner) = &list.selectors[0].subject.simple_selectors[0] else {
            panic!("expected :is");
        };
        assert_eq!(inner.selectors.len(), 2);
        assert!(parse_selector_list(":not(!!)").is_none());
    }

    #[test]
    fn test_parse_nth() {
        assert_eq!(parse_nth("odd"), Some(Nth { a: 2, b: 1 }));
        assert_eq!(parse_nth("EVEN"), Some(Nth { a: 2, b: 0 }));
        assert_eq!(parse_nth("3"), Some(Nth { a: 0, b: 3 }));
        assert_eq!(parse_nth("n"), Some(Nth { a: 1, b: 0 }));
        assert_eq!(parse_nth("-n + 3"), Some(Nth { a: -1, b: 3 }));
        assert_eq!(parse_nth("2n-1"), Some(Nth { a: 2, b: -1 }));
        assert_eq!(parse_nth("+5n"), Some(Nth { a: 5, b: 0 }));
        assert_eq!(parse_nth("2n1"), None);
        assert_eq!(parse_nth("x"), None);
        assert_eq!(parse_nth(""), None);
    }

    #[test]
    fn test_host_forms() {
        assert!(parse_selector_list(":host").is_some());
        assert!(parse_selector_list(":host(.dark) .label").is_some());
        assert!(parse_selector_list(":host(.a .b)").is_none());
    }
}
