//! Manifest rendering and persistence
//!
//! `render` produces the YAML text, `write_to_path` / `write_to_dir` persist it.
//! Rendering is deterministic: the same manifest always yields the same bytes.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::errors::ManifestError;
use crate::types::Manifest;

/// File name the platform looks for in a package directory
pub const MANIFEST_FILE_NAME: &str = "package.yaml";

/// Render a manifest to YAML text
pub fn render(manifest: &Manifest) -> Result<String, ManifestError> {
    let yaml = serde_yaml::to_string(manifest)?;
    Ok(unquote_version(&yaml))
}

/// Drop the quotes the emitter puts around the version string.
///
/// `version` is the first key and the emitter always quotes a string that
/// looks like a number, so the first two quote characters in the document are
/// exactly the ones around `1.0`. Nothing else is touched.
fn unquote_version(rendered: &str) -> String {
    let mut remaining = 2;
    rendered
        .chars()
        .filter(|ch| {
            if remaining > 0 && (*ch == '\'' || *ch == '"') {
                remaining -= 1;
                false
            } else {
                true
            }
        })
        .collect()
}

/// Render and write a manifest to `output_path`
pub fn write_to_path(manifest: &Manifest, output_path: &Path) -> Result<(), ManifestError> {
    debug!("Writing manifest to: {:?}", output_path);

    let yaml = render(manifest)?;
    fs::write(output_path, yaml).map_err(|source| ManifestError::Write {
        path: output_path.to_path_buf(),
        source,
    })?;

    info!(
        "Manifest for '{}' written to {:?} ({} functions)",
        manifest.package.name,
        output_path,
        manifest.functions().len()
    );

    Ok(())
}

/// Write `package.yaml` into `directory`, returning the file path
pub fn write_to_dir(manifest: &Manifest, directory: &Path) -> Result<PathBuf, ManifestError> {
    let output_path = directory.join(MANIFEST_FILE_NAME);
    write_to_path(manifest, &output_path)?;
    Ok(output_path)
}
