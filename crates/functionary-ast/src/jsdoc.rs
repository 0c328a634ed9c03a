//! JSDoc extraction
//!
//! Reads `/** ... */` blocks straight from the source text, independently of
//! the syntax tree, so documentation is still available when the code itself
//! fails to parse. Each block is attached to the declaration that follows it
//! (`function`, `async function`, `const`/`let`/`var`, `class`). Blocks
//! tagged `@file`, `@fileoverview` or `@overview` describe the package.
//!
//! Supported tags: `@param` (`@arg`, `@argument`), `@returns` (`@return`),
//! `@summary`, `@description` (`@desc`) and the file tags above.

use ahash::AHashMap;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::debug;

/// Wrapper type unwrapped during normalization (`Promise<object>` -> `object`)
const PROMISE_WRAPPER: &str = "promise";

static DECLARATION: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(
        r"^(?:export\s+(?:default\s+)?)?(?:(?:async\s+)?function\b\s*\*?\s*|(?:const|let|var)\s+|class\s+)([A-Za-z_$][\w$]*)",
    )
    .ok()
});

/// Errors that make a source's documentation unusable
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocError {
    #[error("unterminated documentation comment starting on line {line}")]
    Unterminated { line: usize },

    #[error("unbalanced braces in @{tag} type on line {line}")]
    UnbalancedType { tag: String, line: usize },
}

/// One documented parameter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocParam {
    /// Name as written, e.g. `options.count`
    pub name: String,
    /// Raw type expression between the braces
    pub type_name: Option<String>,
    pub optional: bool,
    /// Raw default text from `[name=default]`
    pub default_value: Option<String>,
}

impl DocParam {
    /// Field name with any `record.` prefix removed
    pub fn field_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}

/// Documentation attached to one declaration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocRecord {
    pub description: Option<String>,
    pub summary: Option<String>,
    pub params: Vec<DocParam>,
    pub return_type_name: Option<String>,
}

impl DocRecord {
    /// Documented fields of the destructured record argument, in order.
    ///
    /// By convention the first `@param` documents the record itself
    /// (`@param {object} options`) and the fields follow it
    /// (`@param {number} options.count`). A leading undotted entry is therefore
    /// skipped; the remaining entries are matched to fields by position.
    pub fn field_params(&self) -> &[DocParam] {
        match self.params.first() {
            Some(first) if !first.name.contains('.') => &self.params[1..],
            _ => &self.params,
        }
    }
}

/// All documentation found in one source file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocIndex {
    functions: AHashMap<String, DocRecord>,
    file_description: Option<String>,
}

impl DocIndex {
    pub fn get(&self, name: &str) -> Option<&DocRecord> {
        self.functions.get(name)
    }

    pub fn file_description(&self) -> Option<&str> {
        self.file_description.as_deref()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty() && self.file_description.is_none()
    }

    fn insert(&mut self, name: String, record: DocRecord) {
        self.functions.entry(name).or_insert(record);
    }
}

/// Extract the documentation index from JavaScript source text
pub fn extract(source: &str) -> Result<DocIndex, DocError> {
    let mut index = DocIndex::default();
    let mut cursor = 0;

    while let Some(start) = next_doc_comment(source, cursor) {
        let body_start = start + 3;

        // `/**/` is an empty plain comment
        if source[body_start..].starts_with('/') {
            cursor = body_start + 1;
            continue;
        }

        let Some(len) = source[body_start..].find("*/") else {
            return Err(DocError::Unterminated {
                line: line_of(source, start),
            });
        };
        let body_end = body_start + len;
        cursor = body_end + 2;

        let block = parse_block(&source[body_start..body_end], line_of(source, start))?;

        if block.is_file {
            if index.file_description.is_none() {
                index.file_description = block.file_description.or(block.record.description);
            }
            continue;
        }

        // First non-blank block for a name wins, even one holding only unknown tags
        if !block.has_content {
            continue;
        }

        match declared_name(&source[cursor..]) {
            Some(name) => {
                debug!("Documentation block attached to '{}'", name);
                index.insert(name, block.record);
            }
            None => debug!(
                "Documentation block on line {} precedes no declaration",
                line_of(source, start)
            ),
        }
    }

    Ok(index)
}

/// Offset of the next `/**` at or after `from` that opens a comment.
///
/// String literals, line comments and plain block comments are skipped, so a
/// `"/**"` inside them does not start a block. Regex literals are not
/// recognized.
fn next_doc_comment(source: &str, from: usize) -> Option<usize> {
    let bytes = source.as_bytes();
    let mut i = from;

    while i < bytes.len() {
        match bytes[i] {
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                i = source[i..].find('\n').map_or(bytes.len(), |nl| i + nl + 1);
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                if bytes.get(i + 2) == Some(&b'*') {
                    return Some(i);
                }
                i = source[i + 2..].find("*/").map_or(bytes.len(), |end| i + 2 + end + 2);
            }
            quote @ (b'\'' | b'"' | b'`') => i = string_end(bytes, i + 1, quote),
            _ => i += 1,
        }
    }

    None
}

/// Offset just past the string literal whose body starts at `start`
fn string_end(bytes: &[u8], start: usize, quote: u8) -> usize {
    let mut i = start;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return i + 1,
            // Unterminated quote; only template literals span lines
            b'\n' if quote != b'`' => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

/// Name declared by the first line of code after a comment
fn declared_name(rest: &str) -> Option<String> {
    let code = rest.trim_start();
    let regex = DECLARATION.as_ref()?;
    regex
        .captures(code)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn line_of(source: &str, offset: usize) -> usize {
    source[..offset].matches('\n').count() + 1
}

// =============================================================================
// BLOCK PARSING
// =============================================================================

struct ParsedBlock {
    record: DocRecord,
    /// Any text at all between the delimiters
    has_content: bool,
    is_file: bool,
    file_description: Option<String>,
}

/// A tag and its text, continuation lines included
struct RawTag {
    name: String,
    text: String,
    line: usize,
}

fn parse_block(body: &str, first_line: usize) -> Result<ParsedBlock, DocError> {
    let mut description_lines: Vec<&str> = Vec::new();
    let mut tags: Vec<RawTag> = Vec::new();

    for (offset, line) in body.lines().enumerate() {
        let content = strip_comment_prefix(line);

        if let Some(tag_line) = content.strip_prefix('@') {
            let (name, text) = tag_line
                .split_once(char::is_whitespace)
                .unwrap_or((tag_line, ""));
            tags.push(RawTag {
                name: name.to_string(),
                text: text.trim().to_string(),
                line: first_line + offset,
            });
        } else if let Some(tag) = tags.last_mut() {
            if !content.is_empty() {
                if !tag.text.is_empty() {
                    tag.text.push('\n');
                }
                tag.text.push_str(content);
            }
        } else {
            description_lines.push(content);
        }
    }

    let mut block = ParsedBlock {
        record: DocRecord {
            description: join_text(&description_lines),
            ..DocRecord::default()
        },
        has_content: body.lines().any(|line| !strip_comment_prefix(line).is_empty()),
        is_file: false,
        file_description: None,
    };

    for tag in tags {
        match tag.name.as_str() {
            "param" | "arg" | "argument" => {
                block.record.params.push(parse_param(&tag)?);
            }
            "returns" | "return" => {
                let (type_name, _) = split_type(&tag)?;
                block.record.return_type_name = type_name;
            }
            "summary" => block.record.summary = non_empty(&tag.text),
            "description" | "desc" => {
                if let Some(text) = non_empty(&tag.text) {
                    block.record.description = Some(text);
                }
            }
            "file" | "fileoverview" | "overview" => {
                block.is_file = true;
                block.file_description = non_empty(&tag.text);
            }
            other => debug!("Ignoring @{} tag on line {}", other, tag.line),
        }
    }

    Ok(block)
}

/// Remove the leading whitespace and `*` gutter of a comment line
fn strip_comment_prefix(line: &str) -> &str {
    let trimmed = line.trim_start();
    let trimmed = trimmed.strip_prefix('*').unwrap_or(trimmed);
    trimmed.trim()
}

/// Join description lines, dropping blank lines at either end
fn join_text(lines: &[&str]) -> Option<String> {
    let start = lines.iter().position(|l| !l.is_empty())?;
    let end = lines.iter().rposition(|l| !l.is_empty())?;
    Some(lines[start..=end].join("\n"))
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Split `{type} rest` into the type expression and the remaining text
fn split_type(tag: &RawTag) -> Result<(Option<String>, &str), DocError> {
    let text = tag.text.as_str();
    if !text.starts_with('{') {
        return Ok((None, text));
    }

    let mut depth = 0usize;
    for (i, ch) in text.char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let type_name = text[1..i].trim();
                    let type_name = (!type_name.is_empty()).then(|| type_name.to_string());
                    return Ok((type_name, text[i + 1..].trim_start()));
                }
            }
            _ => {}
        }
    }

    Err(DocError::UnbalancedType {
        tag: tag.name.clone(),
        line: tag.line,
    })
}

fn parse_param(tag: &RawTag) -> Result<DocParam, DocError> {
    let (type_name, rest) = split_type(tag)?;
    let mut param = DocParam::default();

    // Closure-style optional marker: {number=}
    param.type_name = match type_name {
        Some(ty) if ty.ends_with('=') => {
            param.optional = true;
            non_empty(ty.trim_end_matches('='))
        }
        other => other,
    };

    if let Some(bracketed) = rest.strip_prefix('[') {
        param.optional = true;
        let inner = match bracket_end(bracketed) {
            Some(end) => &bracketed[..end],
            None => bracketed,
        };
        match inner.split_once('=') {
            Some((name, default)) => {
                param.name = name.trim().to_string();
                param.default_value = Some(default.trim().to_string());
            }
            None => param.name = inner.trim().to_string(),
        }
    } else {
        param.name = rest
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_string();
    }

    Ok(param)
}

/// Index of the `]` closing an optional-parameter name, skipping nested
/// brackets and quoted text inside the default
fn bracket_end(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for (i, ch) in text.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'' | '`') => quote = Some(ch),
            (None, '[' | '{' | '(') => depth += 1,
            (None, ']') if depth == 0 => return Some(i),
            (None, ']' | '}' | ')') => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    None
}

// =============================================================================
// TYPE NAME NORMALIZATION
// =============================================================================

/// Normalize a JSDoc type expression to a candidate canonical name.
///
/// - unions keep their first alternative (`number|string` -> `number`)
/// - case is folded
/// - `Promise<T>` / `Promise.<T>` unwraps to `T`
/// - a leading nullable `?` or non-null `!` is dropped
/// - `number` folds to `float` and `object` to `json`
///
/// The result still has to be checked against the canonical set.
pub fn normalize_type_name(raw: &str) -> Option<String> {
    let first = first_alternative(raw.trim());
    let first = strip_parens(first);
    let mut name = strip_nullability(&first.to_lowercase()).to_string();

    if let Some(inner) = unwrap_promise(&name) {
        name = strip_nullability(inner).to_string();
    }

    let name = match name.as_str() {
        "number" => "float".to_string(),
        "object" => "json".to_string(),
        _ => name,
    };

    (!name.is_empty()).then_some(name)
}

fn first_alternative(raw: &str) -> &str {
    let mut depth = 0usize;
    for (i, ch) in raw.char_indices() {
        match ch {
            '<' | '(' | '{' | '[' => depth += 1,
            '>' | ')' | '}' | ']' => depth = depth.saturating_sub(1),
            '|' if depth == 0 => return raw[..i].trim(),
            _ => {}
        }
    }
    raw
}

fn strip_parens(raw: &str) -> &str {
    let mut current = raw.trim();
    while let Some(inner) = current
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
    {
        current = first_alternative(inner.trim());
    }
    current
}

fn strip_nullability(name: &str) -> &str {
    name.trim().trim_start_matches(['?', '!']).trim()
}

fn unwrap_promise(name: &str) -> Option<&str> {
    let rest = name.strip_prefix(PROMISE_WRAPPER)?;
    let rest = rest.strip_prefix('.').unwrap_or(rest);
    let inner = rest.strip_prefix('<')?.strip_suffix('>')?;
    Some(inner.trim())
}

#[cfg(test)]
mod tests {
    use crate::jsdoc::*;

    const DOCUMENTED: &str = r#"
/**
 * @file This is a simple calculator in node js
 */

/**
 * testTypes ...
 *
 * @param {object} options
 * @param {number} options.b
 * @param {string} options.c
 * @param {boolean} options.d
 * @param {object} options.e
 * @returns {object}
 */
function testTypes({ b, c, d, e }) {
  return null;
}

/**
 * testOptional ...
 *
 * @summary Optional values
 * @param {object} options
 * @param {number} [options.o]
 * @param {number} [options.d=1]
 * @param {string=} options.s
 * @returns {Promise<object>}
 */
async function testOptional({ o, d, s }) {
  return null;
}
"#;

    #[test]
    fn test_extracts_function_records() {
        let index = extract(DOCUMENTED).unwrap();
        assert_eq!(index.len(), 2);

        let record = index.get("testTypes").unwrap();
        assert_eq!(record.description.as_deref(), Some("testTypes ..."));
        assert_eq!(record.params.len(), 5);
        assert_eq!(record.return_type_name.as_deref(), Some("object"));

        let fields = record.field_params();
        assert_eq!(fields.len(), 4);
        assert_eq!(fields[0].name, "options.b");
        assert_eq!(fields[0].field_name(), "b");
        assert_eq!(fields[0].type_name.as_deref(), Some("number"));
        assert!(!fields[0].optional);
    }

    #[test]
    fn test_file_description() {
        let index = extract(DOCUMENTED).unwrap();
        assert_eq!(
            index.file_description(),
            Some("This is a simple calculator in node js")
        );
    }

    #[test]
    fn test_optional_and_default_params() {
        let index = extract(DOCUMENTED).unwrap();
        let record = index.get("testOptional").unwrap();
        assert_eq!(record.summary.as_deref(), Some("Optional values"));
        assert_eq!(record.return_type_name.as_deref(), Some("Promise<object>"));

        let fields = record.field_params();
        assert!(fields[0].optional);
        assert_eq!(fields[0].default_value, None);

        assert!(fields[1].optional);
        assert_eq!(fields[1].name, "options.d");
        assert_eq!(fields[1].default_value.as_deref(), Some("1"));

        assert!(fields[2].optional);
        assert_eq!(fields[2].type_name.as_deref(), Some("string"));
    }

    #[test]
    fn test_fields_without_record_entry() {
        let source = r#"
/**
 * @param {number} options.a
 * @param {string} options.b
 */
function f({ a, b }) {}
"#;
        let index = extract(source).unwrap();
        let fields = index.get("f").unwrap().field_params();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].field_name(), "a");
    }

    #[test]
    fn test_default_with_brackets_and_quotes() {
        let source = r#"
/**
 * @param {object} options
 * @param {string} [options.sep="]"] separator
 * @param {object} [options.opts={ a: [1] }]
 */
function f({ sep, opts }) {}
"#;
        let index = extract(source).unwrap();
        let fields = index.get("f").unwrap().field_params();
        assert_eq!(fields[0].default_value.as_deref(), Some("\"]\""));
        assert_eq!(fields[1].default_value.as_deref(), Some("{ a: [1] }"));
    }

    #[test]
    fn test_attaches_to_other_declarations() {
        let source = r#"
/** Arrow helper */
const helper = ({ a }) => a;

/** A class */
export default class Widget {}
"#;
        let index = extract(source).unwrap();
        assert_eq!(
            index.get("helper").unwrap().description.as_deref(),
            Some("Arrow helper")
        );
        assert!(index.get("Widget").is_some());
    }

    #[test]
    fn test_first_record_wins() {
        let source = r#"
/** First */
function twice() {}

/** Second */
function twice() {}
"#;
        let index = extract(source).unwrap();
        assert_eq!(
            index.get("twice").unwrap().description.as_deref(),
            Some("First")
        );
    }

    #[test]
    fn test_empty_blocks_do_not_shadow_later_ones() {
        let source = r#"
/** */
function later() {}

/** Documented */
function later() {}
"#;
        let index = extract(source).unwrap();
        assert_eq!(
            index.get("later").unwrap().description.as_deref(),
            Some("Documented")
        );
    }

    #[test]
    fn test_unknown_tag_block_shadows_later_ones() {
        let source = r#"
/** @private */
function hidden() {}

/** Later */
function hidden() {}
"#;
        let index = extract(source).unwrap();
        assert_eq!(index.get("hidden"), Some(&DocRecord::default()));
    }

    #[test]
    fn test_comment_openers_in_strings_and_line_comments() {
        let source = r#"
const pattern = "/**";
const other = '/** also';
const tpl = `/**`;
// a stray /** opener
/* plain /** comment */

/** Documented */
function real({ a }) {}
"#;
        let index = extract(source).unwrap();
        assert_eq!(
            index.get("real").unwrap().description.as_deref(),
            Some("Documented")
        );
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_plain_comments_are_ignored() {
        let source = "/* not jsdoc */\nfunction a() {}\n/**/\nfunction b() {}\n// line\n";
        let index = extract(source).unwrap();
        assert!(index.is_empty());
    }

    #[test]
    fn test_unterminated_block() {
        let source = "function a() {}\n\n/** never closed\nfunction b() {}\n";
        assert_eq!(extract(source), Err(DocError::Unterminated { line: 3 }));
    }

    #[test]
    fn test_unbalanced_type() {
        let source = "/**\n * @param {number options.a\n */\nfunction a({ a }) {}\n";
        assert!(matches!(
            extract(source),
            Err(DocError::UnbalancedType { line: 2, .. })
        ));
    }

    #[test]
    fn test_multiline_description() {
        let source = "/**\n * First line.\n *\n * Second paragraph.\n * @returns {string}\n */\nfunction d() {}\n";
        let index = extract(source).unwrap();
        assert_eq!(
            index.get("d").unwrap().description.as_deref(),
            Some("First line.\n\nSecond paragraph.")
        );
    }

    #[test]
    fn test_normalize_type_name() {
        assert_eq!(normalize_type_name("number").as_deref(), Some("float"));
        assert_eq!(normalize_type_name("Object").as_deref(), Some("json"));
        assert_eq!(normalize_type_name("String").as_deref(), Some("string"));
        assert_eq!(normalize_type_name("Promise<json>").as_deref(), Some("json"));
        assert_eq!(normalize_type_name("Promise.<Object>").as_deref(), Some("json"));
        assert_eq!(normalize_type_name("?object").as_deref(), Some("json"));
        assert_eq!(normalize_type_name("Promise<?number>").as_deref(), Some("float"));
        assert_eq!(normalize_type_name("number|string").as_deref(), Some("float"));
        assert_eq!(normalize_type_name("(string|null)").as_deref(), Some("string"));
        assert_eq!(
            normalize_type_name("Array<number>").as_deref(),
            Some("array<number>")
        );
        assert_eq!(normalize_type_name("  "), None);
    }
}
