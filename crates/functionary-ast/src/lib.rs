//! Manifest generation from JavaScript sources
//!
//! A package's `functions.js` is read twice, independently:
//! 1. `source` parses it with ast-grep into top-level function declarations
//! 2. `jsdoc` scans its `/** ... */` blocks into a documentation index
//!
//! `builder` then walks the declarations in order, resolving each parameter
//! through `resolver` (documentation, then name keywords, then literal
//! defaults), and `functionary_manifest` renders the result.
//!
//! Failures in either reading stage are reported and degrade to an empty
//! result; only rendering or writing the manifest can fail a generation.
pub mod builder;
pub mod discovery;
pub mod jsdoc;
pub mod keywords;
pub mod literal;
pub mod naming;
pub mod resolver;
pub mod source;

use functionary_config::GenerateOptions;
use functionary_logger as logger;
use functionary_manifest::{Manifest, ManifestError};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use builder::ManifestBuilder;
use jsdoc::DocIndex;
use keywords::KeywordTable;
use resolver::TypeResolver;
use source::SourceModule;

/// Package name used when the directory has no usable base name
const FALLBACK_PACKAGE_NAME: &str = "package";

/// Result of a successful generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutput {
    /// `package.yaml` was written to this path
    Written(PathBuf),
    /// The rendered YAML, returned instead of written
    Rendered(String),
}

/// Generates the manifest for one package directory
pub struct ManifestGenerator {
    options: GenerateOptions,
    base_dir: PathBuf,
    keywords: &'static KeywordTable,
}

impl ManifestGenerator {
    /// Relative paths in `options` resolve against the working directory
    pub fn new(options: GenerateOptions) -> Self {
        let base_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::with_base_dir(options, base_dir)
    }

    /// Relative paths in `options` resolve against `base_dir`
    pub fn with_base_dir(options: GenerateOptions, base_dir: impl Into<PathBuf>) -> Self {
        ManifestGenerator {
            options,
            base_dir: base_dir.into(),
            keywords: KeywordTable::builtin(),
        }
    }

    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    pub fn source_dir(&self) -> PathBuf {
        self.options.resolve_directory(&self.base_dir)
    }

    /// Base name of the source directory
    pub fn package_name(&self) -> String {
        let dir = self.source_dir();
        let name = match dir.file_name() {
            Some(name) => Some(name.to_string_lossy().into_owned()),
            // "." and ".." have no base name until resolved
            None => fs::canonicalize(&dir)
                .ok()
                .and_then(|dir| dir.file_name().map(|n| n.to_string_lossy().into_owned())),
        };
        name.unwrap_or_else(|| FALLBACK_PACKAGE_NAME.to_string())
    }

    /// Build a manifest from source text already in memory
    pub fn manifest_from_source(&self, package_name: &str, source: &str) -> Manifest {
        let module = match source::parse(source) {
            Ok(module) => module,
            Err(err) => {
                logger::warn(&format!(
                    "{}: could not parse source ({}); no functions collected",
                    package_name, err
                ));
                SourceModule::default()
            }
        };

        let docs = if self.options.jsdoc {
            match jsdoc::extract(source) {
                Ok(docs) => Some(docs),
                Err(err) => {
                    logger::warn(&format!(
                        "{}: could not read documentation ({}); continuing without it",
                        package_name, err
                    ));
                    Some(DocIndex::default())
                }
            }
        } else {
            None
        };

        let resolver = TypeResolver::new(self.keywords, self.options.guess_types);
        ManifestBuilder::new(resolver, docs.as_ref()).build(package_name, &module)
    }

    /// Read `functions.js` and build its manifest.
    ///
    /// An unreadable source is reported and treated as empty.
    pub fn build_manifest(&self) -> Manifest {
        let source_path = self.options.source_path(&self.base_dir);
        let package_name = self.package_name();
        logger::debug(&format!("Reading source: {}", source_path.display()));

        let source = read_source(&source_path).unwrap_or_default();
        self.manifest_from_source(&package_name, &source)
    }

    /// Build the manifest and either write it or return its text
    pub fn generate(&self) -> Result<GenerationOutput, ManifestError> {
        let manifest = self.build_manifest();

        if self.options.write_file {
            let output_dir = self.options.resolve_output_dir(&self.base_dir);
            let path = functionary_manifest::write_to_dir(&manifest, &output_dir)?;
            info!("Generated {:?}", path);
            Ok(GenerationOutput::Written(path))
        } else {
            Ok(GenerationOutput::Rendered(functionary_manifest::render(
                &manifest,
            )?))
        }
    }
}

fn read_source(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(source) => Some(source),
        Err(err) => {
            logger::warn(&format!(
                "Could not read {}: {}; generating an empty manifest",
                path.display(),
                err
            ));
            None
        }
    }
}

/// Generate the manifest described by `options`
pub fn generate_manifest(options: &GenerateOptions) -> Result<GenerationOutput, ManifestError> {
    ManifestGenerator::new(options.clone()).generate()
}

#[cfg(test)]
mod tests {
    use crate::*;
    use functionary_manifest::MISSING_VALUE;
    use tempfile::TempDir;

    const CALCULATOR: &str = r#"/**
 * @fileoverview This is a simple calculator in node js
 */

/**
 * Add two numbers
 *
 * @param {object} options
 * @param {number} options.a
 * @param {number} [options.b=0]
 * @returns {number}
 */
function add({ a, b = 0 }) {
  return a + b;
}
"#;

    fn package(temp: &TempDir, name: &str, source: &str) -> PathBuf {
        let dir = temp.path().join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("functions.js"), source).unwrap();
        dir
    }

    fn render(temp: &TempDir, options: GenerateOptions) -> String {
        let generator = ManifestGenerator::with_base_dir(options.write_file(false), temp.path());
        match generator.generate().unwrap() {
            GenerationOutput::Rendered(yaml) => yaml,
            GenerationOutput::Written(path) => panic!("unexpected write to {:?}", path),
        }
    }

    #[test]
    fn test_renders_documented_package() {
        let temp = TempDir::new().unwrap();
        package(&temp, "calculator", CALCULATOR);

        let yaml = render(&temp, GenerateOptions::new("calculator"));
        let expected = "\
version: 1.0
package:
  name: calculator
  description: This is a simple calculator in node js
  language: javascript
  functions:
  - name: add
    description: Add two numbers
    return_type: float
    parameters:
    - name: a
      type: float
      required: true
    - name: b
      type: float
      default: 0
      required: false
";
        assert_eq!(yaml, expected);
    }

    #[test]
    fn test_header_only_package() {
        let temp = TempDir::new().unwrap();
        package(
            &temp,
            "header",
            "/**\n * @file This is a simple calculator in node js\n */\n",
        );

        let yaml = render(&temp, GenerateOptions::new("header"));
        let value: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(value["version"], serde_yaml::Value::from(1.0));
        assert_eq!(value["package"]["name"].as_str(), Some("header"));
        assert_eq!(
            value["package"]["description"].as_str(),
            Some("This is a simple calculator in node js")
        );
        assert!(value["package"]["functions"]
            .as_sequence()
            .is_some_and(Vec::is_empty));
    }

    #[test]
    fn test_missing_source_yields_empty_manifest() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("nothing")).unwrap();

        let generator = ManifestGenerator::with_base_dir(GenerateOptions::new("nothing"), temp.path());
        let manifest = generator.build_manifest();
        assert_eq!(&*manifest.package.name, "nothing");
        assert!(manifest.functions().is_empty());
        assert!(manifest.package.description.is_missing());
    }

    #[test]
    fn test_unparseable_source_keeps_documentation() {
        let temp = TempDir::new().unwrap();
        package(
            &temp,
            "broken",
            "/** @file Still described */\nfunction ok({ a }) {}\n%%% )(\n",
        );

        let generator = ManifestGenerator::with_base_dir(GenerateOptions::new("broken"), temp.path());
        let manifest = generator.build_manifest();
        assert!(manifest.functions().is_empty());
        assert_eq!(
            manifest.package.description.known().map(String::as_str),
            Some("Still described")
        );
    }

    #[test]
    fn test_broken_documentation_keeps_functions() {
        let temp = TempDir::new().unwrap();
        package(
            &temp,
            "undocumented",
            "/**\n * @param {number options.a\n */\nfunction f({ a = 1 }) {}\n",
        );

        let generator =
            ManifestGenerator::with_base_dir(GenerateOptions::new("undocumented"), temp.path());
        let manifest = generator.build_manifest();
        assert_eq!(manifest.functions().len(), 1);
        assert!(manifest.functions()[0].description.is_missing());
    }

    #[test]
    fn test_writes_to_output_dir() {
        let temp = TempDir::new().unwrap();
        package(&temp, "calculator", CALCULATOR);
        let out = temp.path().join("out");
        fs::create_dir_all(&out).unwrap();

        let options = GenerateOptions::new("calculator").output_dir(&out);
        let generator = ManifestGenerator::with_base_dir(options, temp.path());
        let output = generator.generate().unwrap();

        let path = out.join("package.yaml");
        assert_eq!(output, GenerationOutput::Written(path.clone()));
        let written = fs::read_to_string(path).unwrap();
        assert!(written.starts_with("version: 1.0\n"));
    }

    #[test]
    fn test_writes_to_base_dir_by_default() {
        let temp = TempDir::new().unwrap();
        package(&temp, "calculator", CALCULATOR);

        let generator = ManifestGenerator::with_base_dir(GenerateOptions::new("calculator"), temp.path());
        generator.generate().unwrap();
        assert!(temp.path().join("package.yaml").exists());
        assert!(!temp.path().join("calculator/package.yaml").exists());
    }

    #[test]
    fn test_write_failure_is_reported() {
        let temp = TempDir::new().unwrap();
        package(&temp, "calculator", CALCULATOR);

        let options = GenerateOptions::new("calculator").output_dir(temp.path().join("missing/dir"));
        let generator = ManifestGenerator::with_base_dir(options, temp.path());
        assert!(matches!(
            generator.generate(),
            Err(ManifestError::Write { .. })
        ));
    }

    #[test]
    fn test_jsdoc_disabled() {
        let temp = TempDir::new().unwrap();
        package(&temp, "calculator", CALCULATOR);

        let yaml = render(&temp, GenerateOptions::new("calculator").jsdoc(false));
        assert!(yaml.contains(&format!("description: {}", MISSING_VALUE)));
        assert!(yaml.contains(&format!("return_type: {}", MISSING_VALUE)));
        // b still has its literal default
        assert!(yaml.contains("default: 0"));
    }

    #[test]
    fn test_rerun_is_byte_identical() {
        let temp = TempDir::new().unwrap();
        package(&temp, "calculator", CALCULATOR);
        let options = GenerateOptions::new("calculator").guess_types(true);
        assert_eq!(render(&temp, options.clone()), render(&temp, options));
    }

    #[test]
    fn test_package_name_of_dot_directory() {
        let temp = TempDir::new().unwrap();
        let dir = package(&temp, "dotted", "");
        let generator = ManifestGenerator::with_base_dir(GenerateOptions::new("."), dir);
        assert_eq!(generator.package_name(), "dotted");
    }
}
