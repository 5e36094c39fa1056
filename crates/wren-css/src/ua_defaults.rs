//! Per-tag default declarations.
//!
//! [WHATWG HTML § 15 Rendering](https://html.spec.whatwg.org/multipage/rendering.html)
//!
//! "User agents are expected to have a default style sheet that presents elements
//! of HTML documents in ways consistent with general user expectations."
//!
//! The defaults are the lowest layer of every element's cascade. They are
//! written as CSS so they go through the same declaration parser as author
//! styles, then indexed by tag name once.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::computed::{ComputedStyleMap, ResolvedProperty};
use crate::declaration::DeclarationBlock;
use crate::parser::{RuleKind, parse_stylesheet};
use crate::values::split_top_level;

/// [WHATWG HTML § 15.3 Rendering](https://html.spec.whatwg.org/multipage/rendering.html#the-css-user-agent-style-sheet-and-presentational-hints)
///
/// Only type selectors appear here; each rule applies to the listed tags.
const UA_CSS: &str = r#"
/* [§ 15.3.1 Hidden elements](https://html.spec.whatwg.org/multipage/rendering.html#hidden-elements) */
area, base, basefont, datalist, head, link, meta, noembed,
noframes, param, rp, script, style, template, title {
    display: none;
}

/* [§ 15.3.3 Flow content](https://html.spec.whatwg.org/multipage/rendering.html#flow-content-3) */
address, article, aside, blockquote, body, center, dd, details,
dialog, dir, div, dl, dt, fieldset, figcaption, figure, footer,
form, h1, h2, h3, h4, h5, h6, header, hgroup, hr, html, legend,
listing, main, menu, nav, ol, p, plaintext, pre, search,
section, summary, ul, xmp, optgroup {
    display: block;
}

/* [§ 15.3.7 Lists](https://html.spec.whatwg.org/multipage/rendering.html#lists) */
li {
    display: list-item;
}

/* [§ 15.3.8 Tables](https://html.spec.whatwg.org/multipage/rendering.html#tables-2) */
table { display: table; border-collapse: separate; box-sizing: border-box; }
caption { display: table-caption; text-align: center; }
colgroup { display: table-column-group; }
col { display: table-column; }
thead { display: table-header-group; vertical-align: middle; }
tbody { display: table-row-group; vertical-align: middle; }
tfoot { display: table-footer-group; vertical-align: middle; }
tr { display: table-row; }
td, th { display: table-cell; }
th { font-weight: bold; }

/* [§ 15.5 Form controls](https://html.spec.whatwg.org/multipage/rendering.html#form-controls) */
button, input, select, textarea, meter, progress {
    display: inline-block;
}

/* [§ 15.3.4 Phrasing content](https://html.spec.whatwg.org/multipage/rendering.html#phrasing-content-3) */
b, strong { font-weight: bold; }
i, em, cite, var, dfn, address { font-style: italic; }
code, kbd, samp, tt { font-family: monospace; }
sub { vertical-align: sub; }
sup { vertical-align: super; }
u, ins { text-decoration: underline; }
s, strike, del { text-decoration: line-through; }
center { text-align: center; }

/* [§ 15.3.6 Sections and headings](https://html.spec.whatwg.org/multipage/rendering.html#sections-and-headings) */
h1 { font-size: 2em; font-weight: bold; margin-top: 0.67em; margin-bottom: 0.67em; }
h2 { font-size: 1.5em; font-weight: bold; margin-top: 0.83em; margin-bottom: 0.83em; }
h3 { font-size: 1.17em; font-weight: bold; margin-top: 1em; margin-bottom: 1em; }
h4 { font-weight: bold; margin-top: 1.33em; margin-bottom: 1.33em; }
h5 { font-size: 0.83em; font-weight: bold; margin-top: 1.67em; margin-bottom: 1.67em; }
h6 { font-size: 0.67em; font-weight: bold; margin-top: 2.33em; margin-bottom: 2.33em; }

/* [§ 15.3.3 Flow content](https://html.spec.whatwg.org/multipage/rendering.html#flow-content-3) */
body { margin: 8px; }
p, blockquote, figure, dl { margin-top: 1em; margin-bottom: 1em; }
ul, ol, menu, dir { margin-top: 1em; margin-bottom: 1em; padding-left: 40px; }
ul, menu, dir { list-style-type: disc; }
ol { list-style-type: decimal; }
pre, listing, xmp, plaintext { white-space: pre; font-family: monospace; margin-top: 1em; margin-bottom: 1em; }
textarea { white-space: pre-wrap; }
"#;

/// [CSS Display § 2](https://www.w3.org/TR/css-display-3/#the-display-properties)
///
/// "Initial: inline". Every element gets a `display` value even if its tag
/// is not listed above.
pub const INITIAL_DISPLAY: &str = "inline";

/// Default declarations, keyed by lowercase tag name.
fn table() -> &'static HashMap<String, DeclarationBlock> {
    static TABLE: OnceLock<HashMap<String, DeclarationBlock>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let sheet = parse_stylesheet(UA_CSS);
        let mut table: HashMap<String, DeclarationBlock> = HashMap::new();
        for &id in sheet.css_rules() {
            let Some(RuleKind::Style {
                selector_text,
                declarations,
            }) = sheet.rule(id).map(|node| &node.kind)
            else {
                continue;
            };
            for selector in split_top_level(selector_text, ',') {
                let block = table.entry(selector.trim().to_ascii_lowercase()).or_default();
                for declaration in declarations.iter() {
                    let _ = block.set_property(&declaration.name, &declaration.value, false);
                }
            }
        }
        table
    })
}

/// The default declarations for `tag`, before the initial `display`.
#[must_use]
pub fn tag_declarations(tag: &str) -> Option<&'static DeclarationBlock> {
    table().get(&tag.to_ascii_lowercase())
}

/// Defaults for `tag` as a computed map, the starting point of every
/// element's own cascade and the whole answer for disconnected elements.
#[must_use]
pub fn default_style(tag: &str) -> ComputedStyleMap {
    let mut map = ComputedStyleMap::new();
    map.insert("display", ResolvedProperty::new(INITIAL_DISPLAY, false));
    if let Some(block) = tag_declarations(tag) {
        for declaration in block.iter() {
            map.insert(&declaration.name, ResolvedProperty::new(&declaration.value, false));
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_and_hidden_defaults() {
        assert_eq!(default_style("div").get_property_value("display"), "block");
        assert_eq!(default_style("DIV").get_property_value("display"), "block");
        assert_eq!(default_style("script").get_property_value("display"), "none");
        assert_eq!(default_style("head").get_property_value("display"), "none");
        assert_eq!(default_style("tr").get_property_value("display"), "table-row");
    }

    #[test]
    fn test_unlisted_tag_is_inline() {
        let style = default_style("span");
        assert_eq!(style.get_property_value("display"), "inline");
        assert_eq!(style.len(), 1);
        assert_eq!(default_style("my-widget").get_property_value("display"), "inline");
    }

    #[test]
    fn test_shorthands_are_expanded() {
        let body = default_style("body");
        assert_eq!(body.get_property_value("margin-left"), "8px");
        assert_eq!(body.get_property_value("margin"), "8px");
        let h1 = default_style("h1");
        assert_eq!(h1.get_property_value("font-weight"), "bold");
        assert_eq!(h1.get_property_value("margin-top"), "0.67em");
    }

    #[test]
    fn test_later_rules_extend_earlier_ones() {
        let pre = default_style("pre");
        assert_eq!(pre.get_property_value("display"), "block");
        assert_eq!(pre.get_property_value("white-space"), "pre");
    }
}
