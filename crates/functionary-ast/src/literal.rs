//! Interpretation of default-value text
//!
//! Both destructuring defaults (`{ a = 1 }`) and JSDoc defaults
//! (`[options.a=1]`) arrive as raw source text. `coerce_literal` reads that
//! text as a boolean, then a number, then a string.

use functionary_manifest::DefaultValue;

/// Interpret raw default text as a manifest default value
pub fn coerce_literal(raw: &str) -> DefaultValue {
    let raw = raw.trim();

    match raw {
        "true" => return DefaultValue::Boolean(true),
        "false" => return DefaultValue::Boolean(false),
        _ => {}
    }

    if let Some(text) = unquote(raw) {
        return DefaultValue::String(text);
    }

    if let Some(number) = parse_number(raw) {
        return DefaultValue::Number(number);
    }

    // Identifiers, arrays, calls and the like are kept verbatim
    DefaultValue::String(raw.to_string())
}

/// Parse a JavaScript numeric literal, including a leading sign
fn parse_number(raw: &str) -> Option<f64> {
    let (negative, digits) = match raw.as_bytes().first()? {
        b'-' => (true, raw[1..].trim_start()),
        b'+' => (false, raw[1..].trim_start()),
        _ => (false, raw),
    };

    let cleaned = digits.replace('_', "");
    let cleaned = cleaned.strip_suffix('n').unwrap_or(&cleaned);

    let radix = match cleaned.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };

    let value = match radix {
        Some(radix) => u64::from_str_radix(&cleaned[2..], radix).ok()? as f64,
        None => {
            // Rust accepts "inf" and "NaN"; JavaScript spells those as identifiers
            let first = cleaned.chars().next()?;
            if !(first.is_ascii_digit() || first == '.') {
                return None;
            }
            cleaned.parse::<f64>().ok()?
        }
    };

    Some(if negative { -value } else { value })
}

/// Strip matching quotes from a string literal and resolve simple escapes
fn unquote(raw: &str) -> Option<String> {
    let quote = raw.chars().next()?;
    if !matches!(quote, '"' | '\'' | '`') || raw.len() < 2 || !raw.ends_with(quote) {
        return None;
    }
    let body = &raw[1..raw.len() - 1];
    // Template literals with substitutions are not constant
    if quote == '`' && body.contains("${") {
        return None;
    }

    let mut text = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            text.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => text.push('\n'),
            Some('t') => text.push('\t'),
            Some('r') => text.push('\r'),
            Some('0') => text.push('\0'),
            Some(other) => text.push(other),
            None => text.push('\\'),
        }
    }
    Some(text)
}
