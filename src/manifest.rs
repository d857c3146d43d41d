use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::GeneratorError;

/// One entry in the user manifest. Usernames are expected to look like
/// `YLES-001` but nothing here enforces that; records pass through as-is.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: String,
    pub password: String,
}

/// The manifest file shape: `{"users": [...]}`. Order is preserved.
///
/// Some manifest producers also emit a `totalUsers` field; it is display-only
/// metadata and ignored here. Unknown fields never fail parsing.
#[derive(Clone, Debug, Deserialize)]
pub struct Manifest {
    pub users: Vec<UserRecord>,
}

/// Read and parse the manifest. A missing file maps to `ManifestNotFound`,
/// any other read failure to `ManifestRead`; bad JSON or a missing `users`
/// key maps to `ManifestParse`.
pub fn load_manifest(path: &Path) -> Result<Manifest, GeneratorError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            GeneratorError::ManifestNotFound(path.display().to_string())
        } else {
            GeneratorError::ManifestRead {
                path: path.display().to_string(),
                source: e,
            }
        }
    })?;
    serde_json::from_str(&text).map_err(|e| GeneratorError::ManifestParse {
        path: path.display().to_string(),
        source: e,
    })
}
