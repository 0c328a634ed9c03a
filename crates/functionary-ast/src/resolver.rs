//! Parameter type resolution
//!
//! A field's type comes from exactly one tier:
//! 1. the documented `@param` at the same position, when there is one
//! 2. otherwise the keyword table, when type guessing is enabled
//! 3. otherwise the field's literal default
//!
//! Anything left unresolved becomes the missing-value marker.

use functionary_manifest::{CanonicalType, DefaultValue, ParamSpec, Resolved};
use tracing::debug;

use crate::jsdoc::{normalize_type_name, DocParam};
use crate::keywords::KeywordTable;
use crate::literal::coerce_literal;
use crate::source::SourceField;

/// Type, requiredness and default of one parameter
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedParam {
    pub param_type: Resolved<CanonicalType>,
    pub required: Resolved<bool>,
    pub default: Option<Resolved<DefaultValue>>,
}

impl ResolvedParam {
    pub fn into_param_spec(self, name: impl Into<String>) -> ParamSpec {
        ParamSpec::new(name, self.param_type, self.default, self.required)
    }
}

pub struct TypeResolver<'k> {
    keywords: &'k KeywordTable,
    guess_types: bool,
}

impl<'k> TypeResolver<'k> {
    pub fn new(keywords: &'k KeywordTable, guess_types: bool) -> Self {
        TypeResolver {
            keywords,
            guess_types,
        }
    }

    /// Resolve one field, given the documentation entry at its position
    pub fn resolve(&self, field: &SourceField, doc: Option<&DocParam>) -> ResolvedParam {
        let param_type = if let Some(doc) = doc {
            debug!("'{}' typed from documentation", field.name);
            documented_type(doc)
        } else if self.guess_types {
            let guessed = self.keywords.classify(&field.name);
            match &guessed {
                Some(ty) => debug!("'{}' guessed as {} from its name", field.name, ty),
                None => debug!("'{}' has no single type clue in its name", field.name),
            }
            Resolved::from(guessed)
        } else {
            Resolved::from(literal_type(field))
        };

        let required = match doc {
            Some(doc) => Resolved::Known(!doc.optional),
            None => Resolved::Missing,
        };

        let default = doc
            .and_then(documented_default)
            .or_else(|| literal_default(field));

        ResolvedParam {
            param_type,
            required,
            default,
        }
    }
}

/// Canonical type named by a documentation entry.
///
/// The entry is authoritative: no type, or a name outside the canonical set,
/// yields the marker rather than falling through to the other tiers.
fn documented_type(doc: &DocParam) -> Resolved<CanonicalType> {
    let canonical = doc
        .type_name
        .as_deref()
        .and_then(normalize_type_name)
        .and_then(|name| CanonicalType::from_name(&name));
    Resolved::from(canonical)
}

/// `[name=value]` default; `[name=]` asks the author for one
fn documented_default(doc: &DocParam) -> Option<Resolved<DefaultValue>> {
    let raw = doc.default_value.as_deref()?;
    if raw.trim().is_empty() {
        return Some(Resolved::Missing);
    }
    Some(Resolved::Known(coerce_literal(raw)))
}

fn literal_default(field: &SourceField) -> Option<Resolved<DefaultValue>> {
    let raw = field.default.as_deref()?;
    let value = if field.default_is_object {
        DefaultValue::String(raw.to_string())
    } else {
        coerce_literal(raw)
    };
    Some(Resolved::Known(value))
}

fn literal_type(field: &SourceField) -> Option<CanonicalType> {
    if field.default_is_object {
        return Some(CanonicalType::Json);
    }
    field
        .default
        .as_deref()
        .map(|raw| coerce_literal(raw).canonical_type())
}
