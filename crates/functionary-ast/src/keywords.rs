//! Keyword table for guessing parameter types from their names

use ahash::AHashMap;
use functionary_manifest::CanonicalType;
use once_cell::sync::Lazy;
use smallvec::SmallVec;

use crate::naming::split_words;

const JSON: CanonicalType = CanonicalType::Json;
const FLOAT: CanonicalType = CanonicalType::Float;
const STRING: CanonicalType = CanonicalType::String;
const BOOLEAN: CanonicalType = CanonicalType::Boolean;

/// Name tokens that hint at a parameter's type
pub const BUILTIN_CLUES: &[(&str, CanonicalType)] = &[
    ("obj", JSON),
    ("json", JSON),
    ("is", BOOLEAN),
    ("has", BOOLEAN),
    ("valid", BOOLEAN),
    ("found", BOOLEAN),
    ("not", BOOLEAN),
    ("count", FLOAT),
    ("age", FLOAT),
    ("quantity", FLOAT),
    ("num", FLOAT),
    ("length", FLOAT),
    ("height", FLOAT),
    ("width", FLOAT),
    ("size", FLOAT),
    ("ratio", FLOAT),
    ("percent", FLOAT),
    ("rate", FLOAT),
    ("speed", FLOAT),
    ("val", FLOAT),
    ("index", FLOAT),
    ("name", STRING),
    ("message", STRING),
    ("title", STRING),
    ("label", STRING),
    ("text", STRING),
    ("url", STRING),
    ("description", STRING),
    ("color", STRING),
    ("str", STRING),
];

static BUILTIN: Lazy<KeywordTable> = Lazy::new(|| KeywordTable::from_entries(BUILTIN_CLUES));

/// Read-only mapping from name token to canonical type
#[derive(Debug, Clone)]
pub struct KeywordTable {
    clues: AHashMap<&'static str, CanonicalType>,
}

impl KeywordTable {
    /// The process-wide built-in table
    pub fn builtin() -> &'static KeywordTable {
        &BUILTIN
    }

    pub fn from_entries(entries: &[(&'static str, CanonicalType)]) -> Self {
        KeywordTable {
            clues: entries.iter().copied().collect(),
        }
    }

    pub fn get(&self, token: &str) -> Option<CanonicalType> {
        self.clues.get(token).copied()
    }

    /// Guess a type from an identifier.
    ///
    /// Exactly one token of the identifier must be a known clue. No match, or
    /// several matching tokens (even of the same type), yields `None`.
    pub fn classify(&self, identifier: &str) -> Option<CanonicalType> {
        let matches: SmallVec<[CanonicalType; 2]> = split_words(identifier)
            .iter()
            .filter_map(|token| self.get(token))
            .collect();

        match matches.as_slice() {
            [single] => Some(*single),
            _ => None,
        }
    }
}
