//! `url()` values.
//!
//! [§ 4.5 Resource Locators](https://www.w3.org/TR/css-values-4/#urls)

/// [§ 4.5](https://www.w3.org/TR/css-values-4/#urls)
///
/// "`<url>` = url( `<string>` `<url-modifier>`* ) | `<url-token>`"
///
/// Quoted URLs must close with the opening quote and may not contain an
/// unescaped copy of it. Unquoted URLs may not contain whitespace, quotes or
/// parentheses unless escaped. The canonical form is always double-quoted:
/// `url("...")`.
#[must_use]
pub fn normalize_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if !trimmed
        .get(..4)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("url("))
    {
        return None;
    }
    let inner = trimmed[4..].strip_suffix(')')?.trim();

    let body = match inner.chars().next() {
        Some(q @ ('"' | '\'')) => quoted_body(inner, q)?,
        _ => unquoted_body(inner)?,
    };
    Some(format!("url(\"{}\")", body.replace('"', "\\\"")))
}

/// The contents of a quoted URL, with the surrounding quotes removed.
fn quoted_body(inner: &str, quote: char) -> Option<String> {
    let rest = &inner[quote.len_utf8()..];
    let mut body = String::new();
    let mut chars = rest.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                // A backslash at the very end escapes nothing.
                let escaped = chars.next()?;
                if escaped != quote {
                    body.push('\\');
                }
                body.push(escaped);
            }
            c if c == quote => {
                // The closing quote must be the last character.
                return chars.as_str().is_empty().then_some(body);
            }
            '\n' => return None,
            c => body.push(c),
        }
    }
    None
}

/// The contents of an unquoted URL.
fn unquoted_body(inner: &str) -> Option<String> {
    let mut body = String::new();
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                body.push('\\');
                body.push(chars.next()?);
            }
            '"' | '\'' | '(' | ')' => return None,
            c if c.is_whitespace() => return None,
            c => body.push(c),
        }
    }
    Some(body)
}
