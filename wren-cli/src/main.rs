//! Wren CLI
//!
//! Inspect how the style engine parses stylesheets, expands shorthands,
//! validates values and resolves the computed style of an element.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand, ValueEnum};
use owo_colors::OwoColorize;
use wren_common::warning::clear_warnings;
use wren_css::media::{media_query_list_matches, supports_condition_matches};
use wren_css::shorthand::{collapse, expand};
use wren_css::{
    ComputedStyleMap, EngineConfig, Property, StyleEngine, parse_selector, parse_stylesheet,
    values,
};
use wren_dom::{DomTree, NodeId};

/// Wren: headless CSS style resolution
#[derive(Parser, Debug)]
#[command(name = "wren")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Print the rules of a stylesheet
    wren parse styles.css

    # Dump the rule tree as JSON
    wren parse --css 'p { margin: 1px 2px }' --json

    # Expand a shorthand
    wren expand border '1px solid red'

    # Validate a value
    wren check color 'hsl(120, 100%, 25%)'

    # Compute the style of <p class="note"> against a stylesheet
    wren style --css-file styles.css --tag p --class note

    # Answer media queries for a phone-sized viewport
    wren --config phone.json check media '(max-width: 600px)'
"#)]
struct Cli {
    /// Engine configuration (JSON) answering media queries
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a stylesheet and print its rules
    Parse {
        /// Stylesheet file
        #[arg(value_name = "FILE", conflicts_with = "css")]
        path: Option<PathBuf>,

        /// Parse this CSS text instead of a file
        #[arg(long, value_name = "CSS")]
        css: Option<String>,

        /// Print the rule tree as JSON
        #[arg(long)]
        json: bool,
    },

    /// Expand a property value into longhands
    Expand {
        /// Property name (kebab-case or camelCase)
        property: String,

        /// Property value
        value: String,

        /// Mark the declaration `!important`
        #[arg(long)]
        important: bool,
    },

    /// Validate a value, selector or condition
    Check {
        /// What `value` should be
        kind: CheckKind,

        /// Text to check
        value: String,
    },

    /// Compute the style of a single element
    Style {
        /// Stylesheet file placed in the document head
        #[arg(long, value_name = "FILE", conflicts_with = "css")]
        css_file: Option<PathBuf>,

        /// Stylesheet text placed in the document head
        #[arg(long, value_name = "CSS")]
        css: Option<String>,

        /// Tag name of the element
        #[arg(long, default_value = "div")]
        tag: String,

        /// `id` attribute
        #[arg(long)]
        id: Option<String>,

        /// `class` attribute
        #[arg(long)]
        class: Option<String>,

        /// Inline `style` attribute
        #[arg(long, value_name = "DECLARATIONS")]
        inline: Option<String>,

        /// Inline style of a wrapping `<div>` the element inherits from
        #[arg(long, value_name = "DECLARATIONS")]
        parent_style: Option<String>,

        /// Only the inline style, without the cascade
        #[arg(long)]
        local: bool,

        /// Print the style as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Kinds accepted by `wren check`.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum CheckKind {
    Length,
    Percentage,
    Integer,
    Number,
    Color,
    Url,
    MeasurementOrAuto,
    Selector,
    Media,
    Supports,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    clear_warnings();

    match cli.command {
        Command::Parse { path, css, json } => {
            let text = read_css(path.as_deref(), css)?;
            print_stylesheet(&text, json)
        }
        Command::Expand {
            property,
            value,
            important,
        } => print_expansion(&property, &value, important),
        Command::Check { kind, value } => check(kind, &value, &config),
        Command::Style {
            css_file,
            css,
            tag,
            id,
            class,
            inline,
            parent_style,
            local,
            json,
        } => {
            let text = read_css(css_file.as_deref(), css)?;
            let element = ElementSpec {
                tag,
                id,
                class,
                inline,
                parent_style,
            };
            print_style(&text, &element, config, local, json)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => Ok(EngineConfig::load(path)?),
        None => Ok(EngineConfig::default()),
    }
}

/// The stylesheet from `--css`, a file, or nothing.
fn read_css(path: Option<&Path>, css: Option<String>) -> Result<String> {
    match (path, css) {
        (_, Some(css)) => Ok(css),
        (Some(path), None) => {
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
        }
        (None, None) => Ok(String::new()),
    }
}

fn print_stylesheet(text: &str, json: bool) -> Result<()> {
    let sheet = parse_stylesheet(text);
    if json {
        println!("{}", serde_json::to_string_pretty(&sheet)?);
        return Ok(());
    }

    println!("=== Stylesheet ===");
    println!("{} rules\n", sheet.len());
    for &id in sheet.css_rules() {
        println!("{}", sheet.rule_css_text(id));
    }
    Ok(())
}

fn print_expansion(name: &str, value: &str, important: bool) -> Result<()> {
    let property =
        Property::from_name(name).ok_or_else(|| anyhow!("unknown property `{name}`"))?;
    let longhands = expand(property, value, important)
        .ok_or_else(|| anyhow!("invalid value for {}: `{value}`", property.name()))?;

    let mut map = ComputedStyleMap::new();
    for (longhand, resolved) in longhands {
        map.insert(longhand.name(), resolved);
    }
    for longhand in property.longhands() {
        print_property(longhand.name(), &map);
    }
    if property.is_shorthand() {
        let collapsed = collapse(property, |p| map.get_longhand(p));
        println!("\n{} {collapsed}", "collapsed:".dimmed());
    } else {
        print_property(property.name(), &map);
    }
    Ok(())
}

fn check(kind: CheckKind, value: &str, config: &EngineConfig) -> Result<()> {
    let normalized = match kind {
        CheckKind::Length => values::normalize_length(value),
        CheckKind::Percentage => values::normalize_percentage(value),
        CheckKind::Integer => values::normalize_integer(value),
        CheckKind::Number => values::normalize_number(value),
        CheckKind::Color => values::normalize_color(value),
        CheckKind::Url => values::normalize_url(value),
        CheckKind::MeasurementOrAuto => values::normalize_measurement_or_auto(value),
        CheckKind::Selector => {
            parse_selector(value).map(|list| format!("specificity {}", list.specificity()))
        }
        CheckKind::Media => Some(media_query_list_matches(value, config).to_string()),
        CheckKind::Supports => Some(supports_condition_matches(value).to_string()),
    };

    match normalized {
        Some(normalized) => {
            println!("{} {normalized}", "valid:".green());
            Ok(())
        }
        None => bail!("invalid {kind:?}: `{value}`"),
    }
}

/// The element `wren style` builds.
#[derive(Debug)]
struct ElementSpec {
    tag: String,
    id: Option<String>,
    class: Option<String>,
    inline: Option<String>,
    parent_style: Option<String>,
}

/// `html > (head > style, body > [div >] element)`, returning the element.
fn build_document(css: &str, spec: &ElementSpec) -> (DomTree, NodeId) {
    let mut tree = DomTree::new();
    let html = tree.create_element("html");
    tree.append_child(NodeId::ROOT, html);
    let head = tree.create_element("head");
    tree.append_child(html, head);
    let style = tree.create_element("style");
    let text = tree.create_text(css);
    tree.append_child(style, text);
    tree.append_child(head, style);
    let body = tree.create_element("body");
    tree.append_child(html, body);

    let mut parent = body;
    if let Some(parent_style) = &spec.parent_style {
        let wrapper = tree.create_element("div");
        tree.set_attribute(wrapper, "style", parent_style);
        tree.append_child(body, wrapper);
        parent = wrapper;
    }

    let element = tree.create_element(&spec.tag);
    for (name, value) in [
        ("id", &spec.id),
        ("class", &spec.class),
        ("style", &spec.inline),
    ] {
        if let Some(value) = value {
            tree.set_attribute(element, name, value);
        }
    }
    tree.append_child(parent, element);
    (tree, element)
}

fn print_style(
    css: &str,
    spec: &ElementSpec,
    config: EngineConfig,
    local: bool,
    json: bool,
) -> Result<()> {
    let (tree, element) = build_document(css, spec);
    let mut engine = StyleEngine::new(config);
    let style = if local {
        engine.get_local_style(&tree, element)
    } else {
        engine.get_computed_style(&tree, element)
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&*style)?);
        return Ok(());
    }

    let kind = if local { "Local" } else { "Computed" };
    println!("=== {kind} Style <{}> ===", spec.tag);
    for name in style.property_names() {
        print_property(&name, &style);
    }
    Ok(())
}

fn print_property(name: &str, map: &ComputedStyleMap) {
    let Some(resolved) = map.get(name) else {
        return;
    };
    let priority = if resolved.important {
        format!(" {}", "!important".red())
    } else {
        String::new()
    };
    println!("  {}: {}{priority}", name.cyan(), resolved.value);
}
