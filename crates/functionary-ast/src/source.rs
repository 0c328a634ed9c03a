//! Top-level function declarations extracted with ast-grep
//!
//! Only `function name({ ... }) {}` declarations that are direct children of
//! the program are collected (async and generator forms included). Function
//! expressions, arrow functions, nested functions and `export`-wrapped
//! declarations are skipped.

use ast_grep_core::{AstGrep, Doc, Node};
use ast_grep_language::JavaScript;
use smallvec::SmallVec;
use thiserror::Error;
use tracing::debug;

/// Reasons the source text could not be turned into declarations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("syntax error at line {line}, column {column}")]
    Unparseable { line: usize, column: usize },
}

/// One field of a function's destructured record argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceField {
    /// Property name callers pass
    pub name: String,
    /// Raw default expression text, e.g. `1`, `"test"`, `{ a: 1 }`
    pub default: Option<String>,
    /// Whether the default is an object literal
    pub default_is_object: bool,
}

/// A top-level function declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFunction {
    pub name: String,
    pub fields: SmallVec<[SourceField; 4]>,
}

/// Declarations of one source file, in source order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceModule {
    pub functions: Vec<SourceFunction>,
}

const FUNCTION_KINDS: &[&str] = &["function_declaration", "generator_function_declaration"];

/// Parse JavaScript source text into its top-level function declarations
pub fn parse(source: &str) -> Result<SourceModule, SourceError> {
    let sg = AstGrep::new(source, JavaScript);
    let root = sg.root();

    if root.get_ts_node().has_error() {
        let offset = first_error_offset(&root).unwrap_or(root.range().start);
        let (line, column) = position_of(source, offset);
        return Err(SourceError::Unparseable { line, column });
    }

    let mut module = SourceModule::default();
    for node in root.children() {
        if !FUNCTION_KINDS.contains(&&*node.kind()) {
            continue;
        }
        let Some(name) = node.field("name") else {
            continue;
        };
        let function = SourceFunction {
            name: name.text().to_string(),
            fields: node
                .field("parameters")
                .map(|params| record_fields(&params))
                .unwrap_or_default(),
        };
        debug!(
            "Found function '{}' with {} fields",
            function.name,
            function.fields.len()
        );
        module.functions.push(function);
    }

    Ok(module)
}

/// Byte offset of the first error node or inserted missing token
fn first_error_offset<D: Doc>(node: &Node<'_, D>) -> Option<usize> {
    if node.is_error() || node.get_ts_node().is_missing() {
        return Some(node.range().start);
    }
    node.children().find_map(|child| first_error_offset(&child))
}

fn position_of(source: &str, offset: usize) -> (usize, usize) {
    let before = &source[..offset.min(source.len())];
    let line = before.matches('\n').count() + 1;
    let column = before.rfind('\n').map_or(before.len(), |nl| before.len() - nl - 1) + 1;
    (line, column)
}

/// Syntax nodes that are not part of the parameter list proper
fn is_trivia(kind: &str) -> bool {
    matches!(kind, "(" | ")" | "{" | "}" | "," | "comment")
}

/// Fields of the single destructured parameter, or nothing when the
/// function takes anything else
fn record_fields<D: Doc>(params: &Node<'_, D>) -> SmallVec<[SourceField; 4]> {
    let declared: Vec<_> = params
        .children()
        .filter(|child| !is_trivia(&child.kind()))
        .collect();

    let [param] = declared.as_slice() else {
        return SmallVec::new();
    };

    // `function f({ a } = {})` destructures the same record
    let pattern = if param.kind() == "assignment_pattern" {
        match param.field("left") {
            Some(left) => left,
            None => return SmallVec::new(),
        }
    } else {
        param.clone()
    };

    if pattern.kind() != "object_pattern" {
        return SmallVec::new();
    }

    pattern
        .children()
        .filter_map(|property| field_from_property(&property))
        .collect()
}

fn field_from_property<D: Doc>(property: &Node<'_, D>) -> Option<SourceField> {
    match &*property.kind() {
        // { a }
        "shorthand_property_identifier_pattern" => Some(SourceField {
            name: property.text().to_string(),
            default: None,
            default_is_object: false,
        }),
        // { a = 1 }
        "object_assignment_pattern" => {
            let name = property.field("left")?.text().to_string();
            Some(with_default(name, property.field("right")))
        }
        // { a: b } and { a: b = 1 }
        "pair_pattern" => {
            let name = property_key(&property.field("key")?);
            let value = property.field("value")?;
            let default = if value.kind() == "assignment_pattern" {
                value.field("right")
            } else {
                None
            };
            Some(with_default(name, default))
        }
        // rest elements, punctuation and comments
        _ => None,
    }
}

fn with_default<D: Doc>(name: String, default: Option<Node<'_, D>>) -> SourceField {
    SourceField {
        name,
        default_is_object: default.as_ref().is_some_and(|node| node.kind() == "object"),
        default: default.map(|node| node.text().to_string()),
    }
}

/// Property name of a pattern key, without quotes for `{ "a-b": x }`
fn property_key<D: Doc>(key: &Node<'_, D>) -> String {
    let text = key.text();
    let text = text.trim();
    for quote in ['"', '\''] {
        if let Some(inner) = text
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner.to_string();
        }
    }
    text.to_string()
}
