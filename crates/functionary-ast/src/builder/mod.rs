use functionary_manifest::{CanonicalType, FunctionSpec, Manifest, Resolved};
use tracing::debug;

use crate::jsdoc::{normalize_type_name, DocIndex, DocParam, DocRecord};
use crate::resolver::TypeResolver;
use crate::source::{SourceFunction, SourceModule};


/// Assembles a manifest from parsed declarations and their documentation
pub struct ManifestBuilder<'a> {
    resolver: TypeResolver<'a>,
    docs: Option<&'a DocIndex>,
}

impl<'a> ManifestBuilder<'a> {
    /// `docs` is `None` when documentation is disabled
    pub fn new(resolver: TypeResolver<'a>, docs: Option<&'a DocIndex>) -> Self {
        ManifestBuilder { resolver, docs }
    }

    pub fn build(&self, package_name: &str, module: &SourceModule) -> Manifest {
        let description = self
            .docs
            .and_then(DocIndex::file_description)
            .map(str::to_string);

        let mut manifest = Manifest::new(package_name, Resolved::from(description));
        for function in &module.functions {
            manifest.push_function(self.build_function(function));
        }

        debug!(
            "Built manifest for '{}' with {} functions",
            package_name,
            manifest.functions().len()
        );
        manifest
    }

    pub fn build_function(&self, function: &SourceFunction) -> FunctionSpec {
        let record = self.docs.and_then(|docs| docs.get(&function.name));

        let description = Resolved::from(record.and_then(|r| r.description.clone()));
        let return_type = record
            .and_then(|r| r.return_type_name.as_deref())
            .map_or(Resolved::Missing, canonical_return_type);

        let mut spec = FunctionSpec::new(&function.name, description, return_type);
        if let Some(summary) = record.and_then(|r| r.summary.as_deref()) {
            spec = spec.with_summary(summary);
        }

        // Documented fields are matched by position, not by name
        let documented: &[DocParam] = record.map(DocRecord::field_params).unwrap_or_default();
        for (position, field) in function.fields.iter().enumerate() {
            let doc = documented.get(position);
            if let Some(doc) = doc.filter(|doc| doc.field_name() != field.name) {
                debug!(
                    "{}: field '{}' matched to documented '{}' by position",
                    function.name, field.name, doc.name
                );
            }
            let resolved = self.resolver.resolve(field, doc);
            spec.push_param(resolved.into_param_spec(&field.name));
        }

        spec
    }
}

fn canonical_return_type(raw: &str) -> Resolved<CanonicalType> {
    let canonical = normalize_type_name(raw).and_then(|name| CanonicalType::from_name(&name));
    Resolved::from(canonical)
}
