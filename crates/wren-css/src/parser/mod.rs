//! Stylesheet text to rule trees.
//!
//! [CSS Syntax § 5 Parsing](https://www.w3.org/TR/css-syntax-3/#parsing)
//!
//! Rule nesting is delimited by braces, so a single forward scan with an
//! explicit stack of open frames is enough: `{` opens a frame for the
//! prelude read since the last boundary, `}` closes the innermost frame and
//! parses the declaration text it collected.

mod rules;

pub use rules::{RuleArena, RuleId, RuleKind, RuleNode};

use wren_common::warning::warn_once;

use crate::declaration::DeclarationBlock;
use crate::selector::parse_selector;
use crate::stylesheet::StyleSheet;
use crate::values::{format_number, parse_number, split_top_level};

/// Vendor prefixes stripped from at-keywords (`@-webkit-keyframes`).
const VENDOR_PREFIXES: [&str; 4] = ["-webkit-", "-moz-", "-o-", "-ms-"];

/// [§ 5.3.3 Parse a stylesheet](https://www.w3.org/TR/css-syntax-3/#parse-stylesheet)
#[must_use]
pub fn parse_stylesheet(css_text: &str) -> StyleSheet {
    let mut sheet = StyleSheet::new();
    sheet.replace_rules(css_text);
    sheet
}

/// Parse `css_text` into `arena`, returning the top-level rules in source
/// order. Invalid rules are dropped; they never stop the rest of the text
/// from being parsed.
pub fn parse_rules(arena: &mut RuleArena, css_text: &str) -> Vec<RuleId> {
    let text = strip_comments(css_text);
    let mut parser = Scanner {
        arena,
        frames: Vec::new(),
        top_level: Vec::new(),
        pending: String::new(),
    };

    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut paren_depth = 0u32;

    for c in text.chars() {
        if escaped {
            escaped = false;
            parser.pending.push(c);
            continue;
        }
        match c {
            '\\' => {
                escaped = true;
                parser.pending.push(c);
            }
            '"' | '\'' if quote.is_none() => {
                quote = Some(c);
                parser.pending.push(c);
            }
            q if quote == Some(q) => {
                quote = None;
                parser.pending.push(c);
            }
            // An unescaped newline ends a string token.
            '\n' if quote.is_some() => {
                quote = None;
                parser.pending.push(c);
            }
            _ if quote.is_some() => parser.pending.push(c),
            '(' => {
                paren_depth += 1;
                parser.pending.push(c);
            }
            ')' => {
                paren_depth = paren_depth.saturating_sub(1);
                parser.pending.push(c);
            }
            '{' if paren_depth == 0 => parser.open(),
            '}' if paren_depth == 0 => parser.close(),
            _ => parser.pending.push(c),
        }
    }

    // "Unclosed frames at EOF are closed as if `}` were present."
    while !parser.frames.is_empty() {
        parser.close();
    }
    parser.top_level
}

/// What an open frame does with its body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    /// A grouping rule: its body holds rules.
    Group(RuleId),
    /// `@keyframes`: its body holds keyframe rules.
    Keyframes(RuleId),
    /// A rule whose body is a declaration block.
    Declarations(RuleId),
    /// An ignored rule: the body is consumed and dropped.
    Ignored,
}

#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    /// Declaration text collected so far (only used by `Declarations`).
    declarations: String,
}

struct Scanner<'a> {
    arena: &'a mut RuleArena,
    frames: Vec<Frame>,
    top_level: Vec<RuleId>,
    pending: String,
}

impl Scanner<'_> {
    fn current(&self) -> Option<FrameKind> {
        self.frames.last().map(|f| f.kind)
    }

    /// Handle `{`.
    fn open(&mut self) {
        let pending = std::mem::take(&mut self.pending);
        let (head, prelude) = split_at_last_semicolon(&pending);
        if let Some(frame) = self.frames.last_mut()
            && matches!(frame.kind, FrameKind::Declarations(_))
        {
            append_declarations(&mut frame.declarations, head);
        }
        let prelude = strip_cdo_cdc(prelude);

        let kind = match self.current() {
            None => self.open_rule(prelude, None),
            Some(FrameKind::Group(parent)) => self.open_rule(prelude, Some(parent)),
            Some(FrameKind::Keyframes(parent)) => self.open_keyframe(prelude, parent),
            // Rules nested inside a declaration block are not supported.
            Some(FrameKind::Declarations(_) | FrameKind::Ignored) => FrameKind::Ignored,
        };
        self.frames.push(Frame {
            kind,
            declarations: String::new(),
        });
    }

    /// Handle `}`.
    fn close(&mut self) {
        let pending = std::mem::take(&mut self.pending);
        let Some(mut frame) = self.frames.pop() else {
            // Unmatched `}` is ignored.
            return;
        };
        if let FrameKind::Declarations(id) = frame.kind {
            append_declarations(&mut frame.declarations, &pending);
            if let Some(block) = self
                .arena
                .get_mut(id)
                .and_then(|node| node.kind.declarations_mut())
            {
                let descriptors = block.is_descriptor_block();
                *block = if descriptors {
                    DeclarationBlock::parse_descriptors(&frame.declarations)
                } else {
                    DeclarationBlock::parse(&frame.declarations)
                };
            }
        }
    }

    /// Create the node for `prelude` in a rule-list context.
    fn open_rule(&mut self, prelude: &str, parent: Option<RuleId>) -> FrameKind {
        if let Some(at_rule) = prelude.strip_prefix('@') {
            return self.open_at_rule(at_rule, parent);
        }

        if parse_selector(prelude).is_none() {
            warn_once("CSS", &format!("dropping rule with invalid selector `{prelude}`"));
            return FrameKind::Ignored;
        }
        let id = self.push(
            RuleKind::Style {
                selector_text: prelude.to_string(),
                declarations: DeclarationBlock::new(),
            },
            parent,
        );
        FrameKind::Declarations(id)
    }

    /// [§ 5.4.2 Consume an at-rule](https://www.w3.org/TR/css-syntax-3/#consume-at-rule)
    fn open_at_rule(&mut self, text: &str, parent: Option<RuleId>) -> FrameKind {
        let name_len = text
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
            .unwrap_or(text.len());
        let raw_name = text[..name_len].to_ascii_lowercase();
        let name = VENDOR_PREFIXES
            .iter()
            .find_map(|prefix| raw_name.strip_prefix(prefix))
            .unwrap_or(&raw_name);
        let rest = text[name_len..].trim();

        let kind = match name {
            "media" => RuleKind::Media {
                condition: rest.to_string(),
                children: Vec::new(),
            },
            "supports" => RuleKind::Supports {
                condition: rest.to_string(),
                children: Vec::new(),
            },
            "container" => RuleKind::Container {
                condition: rest.to_string(),
                children: Vec::new(),
            },
            "keyframes" => {
                let animation = rest.trim_matches(|c| c == '"' || c == '\'');
                if animation.is_empty() {
                    return FrameKind::Ignored;
                }
                let id = self.push(
                    RuleKind::Keyframes {
                        name: animation.to_string(),
                        children: Vec::new(),
                    },
                    parent,
                );
                return FrameKind::Keyframes(id);
            }
            "font-face" => {
                let id = self.push(
                    RuleKind::FontFace {
                        declarations: DeclarationBlock::parse_descriptors(""),
                    },
                    parent,
                );
                return FrameKind::Declarations(id);
            }
            "scope" => {
                let Some((start, end)) = parse_scope_prelude(rest) else {
                    warn_once("CSS", &format!("dropping @scope with invalid prelude `{rest}`"));
                    return FrameKind::Ignored;
                };
                RuleKind::Scope {
                    start,
                    end,
                    children: Vec::new(),
                }
            }
            _ => {
                warn_once("CSS", &format!("ignoring unsupported at-rule @{raw_name}"));
                return FrameKind::Ignored;
            }
        };
        FrameKind::Group(self.push(kind, parent))
    }

    /// [CSS Animations § 3](https://www.w3.org/TR/css-animations-1/#keyframes)
    fn open_keyframe(&mut self, prelude: &str, parent: RuleId) -> FrameKind {
        let Some(key_text) = normalize_keyframe_selector(prelude) else {
            return FrameKind::Ignored;
        };
        let id = self.push(
            RuleKind::Keyframe {
                key_text,
                declarations: DeclarationBlock::new(),
            },
            Some(parent),
        );
        FrameKind::Declarations(id)
    }

    fn push(&mut self, kind: RuleKind, parent: Option<RuleId>) -> RuleId {
        let id = self.arena.push(kind, parent);
        if parent.is_none() {
            self.top_level.push(id);
        }
        id
    }
}

/// [CSS Animations § 3](https://www.w3.org/TR/css-animations-1/#keyframes)
///
/// "`<keyframe-selector>` = from | to | `<percentage [0,100]>`". `from` is
/// `0%` and `to` is `100%`; a list is normalized to `0%, 100%` form.
#[must_use]
pub fn normalize_keyframe_selector(text: &str) -> Option<String> {
    let keys = split_top_level(text, ',')
        .iter()
        .map(|key| {
            let key = key.to_ascii_lowercase();
            match key.as_str() {
                "from" => Some("0%".to_string()),
                "to" => Some("100%".to_string()),
                _ => {
                    let n = parse_number(key.strip_suffix('%')?)?;
                    (0.0..=100.0)
                        .contains(&n)
                        .then(|| format!("{}%", format_number(n)))
                }
            }
        })
        .collect::<Option<Vec<_>>>()?;
    Some(keys.join(", "))
}

/// `@scope [(<scope-start>)]? [to (<scope-end>)]?`
fn parse_scope_prelude(text: &str) -> Option<(Option<String>, Option<String>)> {
    fn parenthesized(text: &str) -> Option<(String, &str)> {
        let inner = text.strip_prefix('(')?;
        let mut depth = 1u32;
        for (i, c) in inner.char_indices() {
            match c {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        let selector = inner[..i].trim().to_string();
                        let _ = parse_selector(&selector)?;
                        return Some((selector, inner[i + 1..].trim_start()));
                    }
                }
                _ => {}
            }
        }
        None
    }

    let mut rest = text.trim();
    let mut start = None;
    if rest.starts_with('(') {
        let (selector, tail) = parenthesized(rest)?;
        start = Some(selector);
        rest = tail;
    }
    let mut end = None;
    if let Some(tail) = rest.strip_prefix("to") {
        let (selector, tail) = parenthesized(tail.trim_start())?;
        end = Some(selector);
        rest = tail;
    }
    rest.is_empty().then_some((start, end))
}

/// [§ 3.3 Preprocessing](https://www.w3.org/TR/css-syntax-3/#consume-comments)
///
/// Remove `/* ... */` comments. Comment delimiters inside strings are kept;
/// an unterminated comment runs to the end of the input.
#[must_use]
pub fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut quote: Option<char> = None;

    while let Some(c) = chars.next() {
        match quote {
            Some(q) => {
                out.push(c);
                if c == '\\' {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                } else if c == q || c == '\n' {
                    quote = None;
                }
            }
            None if c == '/' && chars.peek() == Some(&'*') => {
                let _ = chars.next();
                let mut previous = '\0';
                for inner in chars.by_ref() {
                    if previous == '*' && inner == '/' {
                        break;
                    }
                    previous = inner;
                }
            }
            None => {
                if c == '"' || c == '\'' {
                    quote = Some(c);
                }
                out.push(c);
            }
        }
    }
    out
}

/// Split `text` at its last top-level `;` into (declaration head, prelude).
fn split_at_last_semicolon(text: &str) -> (&str, &str) {
    let mut last = None;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut depth = 0u32;
    for (i, c) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '"' | '\'' if quote.is_none() => quote = Some(c),
            q if quote == Some(q) => quote = None,
            _ if quote.is_some() => {}
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            ';' if depth == 0 => last = Some(i),
            _ => {}
        }
    }
    match last {
        Some(i) => (&text[..i], text[i + 1..].trim()),
        None => ("", text.trim()),
    }
}

/// Drop the HTML comment markers tolerated at the top level of a sheet.
fn strip_cdo_cdc(prelude: &str) -> &str {
    let mut prelude = prelude.trim();
    loop {
        if let Some(rest) = prelude.strip_prefix("<!--") {
            prelude = rest.trim_start();
        } else if let Some(rest) = prelude.strip_prefix("-->") {
            prelude = rest.trim_start();
        } else {
            return prelude;
        }
    }
}

/// Append a chunk of declaration text, keeping chunks `;`-separated.
fn append_declarations(buffer: &mut String, chunk: &str) {
    if chunk.trim().is_empty() {
        return;
    }
    if !buffer.is_empty() {
        buffer.push(';');
    }
    buffer.push_str(chunk);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_comments_keeps_strings() {
        assert_eq!(strip_comments("a/* x */b"), "ab");
        assert_eq!(strip_comments("a /* x */ /* y */ b"), "a   b");
        assert_eq!(
            strip_comments(r#"content: "/* kept */""#),
            r#"content: "/* kept */""#
        );
        assert_eq!(strip_comments("a /* unterminated"), "a ");
    }

    #[test]
    fn test_split_at_last_semicolon() {
        assert_eq!(split_at_last_semicolon("a: b; c: d; div"), ("a: b; c: d", "div"));
        assert_eq!(split_at_last_semicolon("div"), ("", "div"));
        assert_eq!(
            split_at_last_semicolon(r#"[data-x=";"] p"#),
            ("", r#"[data-x=";"] p"#)
        );
    }

    #[test]
    fn test_keyframe_selectors() {
        assert_eq!(normalize_keyframe_selector("from").as_deref(), Some("0%"));
        assert_eq!(normalize_keyframe_selector("TO").as_deref(), Some("100%"));
        assert_eq!(
            normalize_keyframe_selector("from, 50.0%, to").as_deref(),
            Some("0%, 50%, 100%")
        );
        assert_eq!(normalize_keyframe_selector("150%"), None);
        assert_eq!(normalize_keyframe_selector("middle"), None);
    }

    #[test]
    fn test_scope_prelude() {
        assert_eq!(
            parse_scope_prelude("(.card) to (.content)"),
            Some((Some(".card".to_string()), Some(".content".to_string())))
        );
        assert_eq!(parse_scope_prelude(""), Some((None, None)));
        assert_eq!(parse_scope_prelude("(.card) junk"), None);
    }
}
