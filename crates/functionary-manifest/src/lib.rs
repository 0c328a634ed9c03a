//! Functionary package manifests
//!
//! This crate holds the typed model of a `package.yaml` document and the
//! writer that renders it. The manifest describes every function a package
//! exposes (name, description, return type, ordered parameters) so the
//! functionary platform can register them without executing the package.

pub mod errors;
pub mod manifest_writer;
pub mod types;

pub use types::{
    CanonicalType, DefaultValue, FunctionSpec, Manifest, Package, ParamSpec, Resolved,
    LANGUAGE, MISSING_VALUE, SCHEMA_VERSION,
};

pub use errors::ManifestError;

pub use manifest_writer::{render, write_to_dir, write_to_path, MANIFEST_FILE_NAME};
