/// Error types for migration generation
use thiserror::Error;

/// Errors that can occur while generating the migration script
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// The manifest file does not exist or could not be read
    #[error("Manifest not found: {0}")]
    ManifestNotFound(String),

    /// The manifest exists but reading it failed (permissions, I/O)
    #[error("Failed to read manifest {path}: {source}")]
    ManifestRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The manifest exists but is not valid JSON of the expected shape
    #[error("Failed to parse manifest {path}: {source}")]
    ManifestParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// The output script could not be written
    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
