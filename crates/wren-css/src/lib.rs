//! CSS parsing, selector matching, cascade and computed-style caching for the
//! Wren engine.
//!
//! # Scope
//!
//! This crate implements:
//! - **Value grammars** ([CSS Values Level 4](https://www.w3.org/TR/css-values-4/))
//!   - Lengths, percentages, numbers, colors (hex, `rgb()`, `hsl()`, named), `url()`
//!   - Keyword sets for the supported properties
//!
//! - **Shorthands** ([CSS Cascading § 1.2](https://www.w3.org/TR/css-cascade-4/#shorthand))
//!   - Expansion to longhands and collapse back to the shortest form
//!
//! - **Parser** ([CSS Syntax Level 3](https://www.w3.org/TR/css-syntax-3/))
//!   - Style rules, `@media`, `@supports`, `@container`, `@keyframes`,
//!     `@font-face` and `@scope`
//!   - Forgiving recovery: a bad rule or declaration is dropped on its own
//!
//! - **Selectors** ([Selectors Level 4](https://www.w3.org/TR/selectors-4/))
//!   - Compound and complex selectors, attribute selectors, structural and
//!     logical pseudo-classes, `:host`
//!   - Specificity
//!
//! - **Cascade** ([CSS Cascading Level 4](https://www.w3.org/TR/css-cascade-4/))
//!   - Per-tag defaults, shadow-scoped stylesheets, inline style
//!   - `!important`, inheritance, custom properties and `var()`
//!
//! - **Caching** keyed on the document's mutation generation
//!
//! # Not Implemented
//!
//! - Layout, fonts and anything that needs geometry
//! - Animation timing
//! - Cascade layers (`@layer` blocks are ignored)

/// Computed-style cache per document generation.
pub mod cache;
/// CSS cascade and style computation per [CSS Cascading Level 4](https://www.w3.org/TR/css-cascade-4/).
pub mod cascade;
/// Computed style maps per [CSSOM § 9](https://drafts.csswg.org/cssom/#dom-window-getcomputedstyle).
pub mod computed;
/// Engine configuration.
pub mod config;
/// Declaration blocks per [CSSOM § 6.6](https://drafts.csswg.org/cssom/#the-cssstyledeclaration-interface).
pub mod declaration;
/// The per-document style engine.
pub mod engine;
/// Media, supports and container conditions per [CSS Conditional Rules](https://www.w3.org/TR/css-conditional-3/).
pub mod media;
/// CSS parser per [§ 5 Parsing](https://www.w3.org/TR/css-syntax-3/#parsing).
pub mod parser;
/// The property table.
pub mod properties;
/// CSS selector parsing and matching per [Selectors Level 4](https://www.w3.org/TR/selectors-4/).
pub mod selector;
/// Shorthand expansion and collapse.
pub mod shorthand;
/// The stylesheet object model per [CSSOM § 6.1](https://drafts.csswg.org/cssom/#the-cssstylesheet-interface).
pub mod stylesheet;
/// Per-tag default declarations per [HTML § 15](https://html.spec.whatwg.org/multipage/rendering.html).
pub mod ua_defaults;
/// Value grammars per [CSS Values Level 4](https://www.w3.org/TR/css-values-4/).
pub mod values;

pub use computed::{ComputedStyleMap, ResolvedProperty};
pub use config::{ConfigError, EngineConfig};
pub use declaration::{Declaration, DeclarationBlock};
pub use engine::StyleEngine;
pub use parser::parse_stylesheet;
pub use properties::Property;
pub use selector::{Specificity, parse_selector};
pub use stylesheet::StyleSheet;
