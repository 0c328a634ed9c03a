use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while rendering or persisting a manifest
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Failed to render manifest: {0}")]
    Serialize(#[from] serde_yaml::Error),

    #[error("Failed to write manifest to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
