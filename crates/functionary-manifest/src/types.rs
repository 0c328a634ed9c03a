//! Typed model of a functionary `package.yaml`
//!
//! This module provides:
//! - `Manifest` / `Package` - the document root and its package header
//! - `FunctionSpec` / `ParamSpec` - per-function and per-parameter metadata
//! - `Resolved<T>` - a value or the missing-value marker
//! - `CanonicalType` - the four types the platform can register
//!
//! Field declaration order is the rendered key order, so do not reorder fields.

use serde::{Serialize, Serializer};
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

/// Placeholder written wherever the author has to fill in a value by hand
pub const MISSING_VALUE: &str = "__enterValue__";

/// Schema version of the manifest document
pub const SCHEMA_VERSION: &str = "1.0";

/// Language identifier for manifests generated from JavaScript sources
pub const LANGUAGE: &str = "javascript";

// =============================================================================
// RESOLVED - value or missing-value marker
// =============================================================================

/// A manifest value that is either known or left for the author to supply.
///
/// `Missing` renders as [`MISSING_VALUE`]. It is distinct from a field being
/// absent: absent optional fields are modelled with `Option` around this type.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved<T> {
    Known(T),
    Missing,
}

impl<T> Resolved<T> {
    pub fn is_missing(&self) -> bool {
        matches!(self, Resolved::Missing)
    }

    pub fn known(&self) -> Option<&T> {
        match self {
            Resolved::Known(value) => Some(value),
            Resolved::Missing => None,
        }
    }
}

impl<T> Default for Resolved<T> {
    fn default() -> Self {
        Resolved::Missing
    }
}

impl<T> From<Option<T>> for Resolved<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Resolved::Known(value),
            None => Resolved::Missing,
        }
    }
}

impl<T: Serialize> Serialize for Resolved<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Resolved::Known(value) => value.serialize(serializer),
            Resolved::Missing => serializer.serialize_str(MISSING_VALUE),
        }
    }
}

// =============================================================================
// CANONICAL TYPES
// =============================================================================

/// The fixed set of parameter and return types understood by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CanonicalType {
    Json,
    Float,
    String,
    Boolean,
}

impl CanonicalType {
    pub const ALL: [CanonicalType; 4] = [
        CanonicalType::Json,
        CanonicalType::Float,
        CanonicalType::String,
        CanonicalType::Boolean,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CanonicalType::Json => "json",
            CanonicalType::Float => "float",
            CanonicalType::String => "string",
            CanonicalType::Boolean => "boolean",
        }
    }

    /// Look up an already-normalized type name. Only the four canonical
    /// spellings match; aliases are folded by the caller.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ty| ty.as_str() == name)
    }
}

impl fmt::Display for CanonicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// DEFAULT VALUES
// =============================================================================

/// Scalar default value of a parameter
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    Boolean(bool),
    Number(f64),
    String(String),
}

impl DefaultValue {
    /// Canonical type a default of this kind implies
    pub fn canonical_type(&self) -> CanonicalType {
        match self {
            DefaultValue::Boolean(_) => CanonicalType::Boolean,
            DefaultValue::Number(_) => CanonicalType::Float,
            DefaultValue::String(_) => CanonicalType::String,
        }
    }
}

/// Largest magnitude at which every integer is exactly representable in f64
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

impl Serialize for DefaultValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DefaultValue::Boolean(value) => serializer.serialize_bool(*value),
            // Whole numbers render as `1`, not `1.0`
            DefaultValue::Number(value)
                if value.fract() == 0.0 && value.abs() <= MAX_EXACT_INTEGER =>
            {
                serializer.serialize_i64(*value as i64)
            }
            DefaultValue::Number(value) => serializer.serialize_f64(*value),
            DefaultValue::String(value) => serializer.serialize_str(value),
        }
    }
}

// =============================================================================
// MANIFEST - document root
// =============================================================================

/// Top-level `package.yaml` document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Manifest {
    pub version: Arc<str>,
    pub package: Package,
}

impl Manifest {
    /// Start an empty manifest for the package `name`
    pub fn new(name: impl Into<Arc<str>>, description: Resolved<String>) -> Self {
        Manifest {
            version: Arc::from(SCHEMA_VERSION),
            package: Package {
                name: name.into(),
                description,
                language: Arc::from(LANGUAGE),
                functions: Vec::new(),
            },
        }
    }

    /// Append a function, keeping insertion order
    pub fn push_function(&mut self, function: FunctionSpec) {
        self.package.functions.push(function);
    }

    pub fn functions(&self) -> &[FunctionSpec] {
        &self.package.functions
    }
}

/// Package header and its function list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Package {
    pub name: Arc<str>,
    pub description: Resolved<String>,
    pub language: Arc<str>,
    pub functions: Vec<FunctionSpec>,
}

// =============================================================================
// FUNCTIONS AND PARAMETERS
// =============================================================================

/// Metadata for one exported function
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionSpec {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<Resolved<String>>,
    pub description: Resolved<String>,
    pub return_type: Resolved<CanonicalType>,
    pub parameters: SmallVec<[ParamSpec; 4]>,
}

impl FunctionSpec {
    pub fn new(
        name: impl Into<String>,
        description: Resolved<String>,
        return_type: Resolved<CanonicalType>,
    ) -> Self {
        FunctionSpec {
            name: name.into(),
            summary: None,
            description,
            return_type,
            parameters: SmallVec::new(),
        }
    }

    /// Attach a summary; an empty summary becomes the missing-value marker
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        let summary = summary.into();
        self.summary = Some(if summary.trim().is_empty() {
            Resolved::Missing
        } else {
            Resolved::Known(summary)
        });
        self
    }

    /// Append a parameter; call in declaration order
    pub fn push_param(&mut self, param: ParamSpec) {
        self.parameters.push(param);
    }
}

/// Metadata for one field of a function's record argument
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: Resolved<CanonicalType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Resolved<DefaultValue>>,
    pub required: Resolved<bool>,
}

impl ParamSpec {
    pub fn new(
        name: impl Into<String>,
        param_type: Resolved<CanonicalType>,
        default: Option<Resolved<DefaultValue>>,
        required: Resolved<bool>,
    ) -> Self {
        ParamSpec {
            name: name.into(),
            param_type,
            default,
            required,
        }
    }
}
