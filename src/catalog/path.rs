//! Catalog path rules
//!
//! Paths are stored relative to the backup root, `/`-separated, with no
//! empty, `.` or `..` components. The same rule guards the restore engine
//! against writing outside its target directory.

use super::errors::{CatalogError, CatalogResult};

/// Validates a catalog path.
pub fn validate_path(path: &str) -> CatalogResult<()> {
    if path.is_empty() {
        return Err(CatalogError::invalid_path(path, "empty path"));
    }
    if path.starts_with('/') {
        return Err(CatalogError::invalid_path(path, "absolute path"));
    }
    if path.contains('\0') {
        return Err(CatalogError::invalid_path(path, "NUL byte"));
    }

    for component in path.split('/') {
        match component {
            "" => return Err(CatalogError::invalid_path(path, "empty component")),
            "." | ".." => {
                return Err(CatalogError::invalid_path(path, "relative component"))
            }
            _ => {}
        }
    }

    Ok(())
}
