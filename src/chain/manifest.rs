//! Chain manifest (`chain.json`)
//!
//! Records, oldest first, every archive of the chain together with the
//! checksum of its catalog file:
//!
//! ```text
//! <chain_dir>/
//! ├── chain.json
//! ├── full/catalog.json
//! ├── diff1/catalog.json
//! └── ...
//! ```
//!
//! Archive numbers are not stored: they are reassigned by the registry on
//! every load from the manifest order, which keeps the registry the single
//! numbering authority.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::{ChainError, ChainResult};
use super::registry::ChainRegistry;

/// Manifest file name inside the chain directory
pub const MANIFEST_FILE: &str = "chain.json";

/// Current manifest format version
pub const FORMAT_VERSION: u8 = 1;

/// One archive entry of the manifest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManifestArchive {
    /// Archive base name (directory under the chain root)
    pub name: String,

    /// When the archive was taken (RFC3339)
    pub created_at: DateTime<Utc>,

    /// `crc32:xxxxxxxx` of the archive's catalog.json
    pub catalog_checksum: String,
}

/// The persisted description of a chain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChainManifest {
    /// Identity of the chain, shared by all of its archives
    pub chain_id: Uuid,

    /// Format version (always 1)
    pub format_version: u8,

    /// Archives oldest first
    pub archives: Vec<ManifestArchive>,
}

impl ChainManifest {
    /// Creates an empty manifest for a new chain.
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4())
    }

    /// Creates an empty manifest with an explicit chain id.
    pub fn with_id(chain_id: Uuid) -> Self {
        Self {
            chain_id,
            format_version: FORMAT_VERSION,
            archives: Vec::new(),
        }
    }

    /// Appends an archive entry.
    pub fn push_archive(
        &mut self,
        name: impl Into<String>,
        created_at: DateTime<Utc>,
        catalog_checksum: impl Into<String>,
    ) {
        self.archives.push(ManifestArchive {
            name: name.into(),
            created_at,
            catalog_checksum: catalog_checksum.into(),
        });
    }

    /// Builds the registry, assigning archive numbers in manifest order.
    pub fn build_registry(&self) -> ChainResult<ChainRegistry> {
        let mut registry = ChainRegistry::new();
        for archive in &self.archives {
            let name = archive.name.as_str();
            if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
                return Err(ChainError::invalid_manifest(format!(
                    "invalid archive name '{}'",
                    archive.name
                )));
            }
            registry.register(archive.name.clone(), archive.created_at)?;
        }
        Ok(registry)
    }

    /// Serializes the manifest to JSON
    pub fn to_json(&self) -> ChainResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            ChainError::invalid_manifest(format!("Failed to serialize chain manifest: {}", e))
        })
    }

    /// Deserializes the manifest from JSON and checks the format version
    pub fn from_json(json: &str) -> ChainResult<Self> {
        let manifest: ChainManifest = serde_json::from_str(json).map_err(|e| {
            ChainError::invalid_manifest(format!("Failed to parse chain manifest: {}", e))
        })?;

        if manifest.format_version != FORMAT_VERSION {
            return Err(ChainError::invalid_manifest(format!(
                "unsupported format_version {}",
                manifest.format_version
            )));
        }

        Ok(manifest)
    }

    /// Reads `chain.json` from a chain directory
    pub fn load(chain_dir: &Path) -> ChainResult<Self> {
        let path = chain_dir.join(MANIFEST_FILE);
        let json =
            fs::read_to_string(&path).map_err(|e| ChainError::io_error_at_path(&path, e))?;
        Self::from_json(&json)
    }

    /// Writes `chain.json` into a chain directory with fsync
    pub fn write_to_dir(&self, chain_dir: &Path) -> ChainResult<()> {
        let json = self.to_json()?;
        fs::create_dir_all(chain_dir).map_err(|e| ChainError::io_error_at_path(chain_dir, e))?;

        let path = chain_dir.join(MANIFEST_FILE);
        let mut file = File::create(&path).map_err(|e| ChainError::io_error_at_path(&path, e))?;
        file.write_all(json.as_bytes())
            .map_err(|e| ChainError::io_error_at_path(&path, e))?;
        file.sync_all()
            .map_err(|e| ChainError::io_error_at_path(&path, e))?;

        Ok(())
    }
}

impl Default for ChainManifest {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::ChainErrorCode;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, day, 3, 0, 0).unwrap()
    }

    fn sample() -> ChainManifest {
        let mut manifest = ChainManifest::new();
        manifest.push_archive("full", at(1), "crc32:00000001");
        manifest.push_archive("diff1", at(8), "crc32:00000002");
        manifest
    }

    #[test]
    fn test_build_registry_numbers_in_order() {
        let registry = sample().build_registry().unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.by_name("full").unwrap().num().value(), 1);
        assert_eq!(registry.by_name("diff1").unwrap().num().value(), 2);
    }

    #[test]
    fn test_write_and_load() {
        let dir = TempDir::new().unwrap();
        let manifest = sample();
        manifest.write_to_dir(dir.path()).unwrap();

        let loaded = ChainManifest::load(dir.path()).unwrap();
        assert_eq!(loaded, manifest);
        assert_eq!(loaded.archives[1].catalog_checksum, "crc32:00000002");
    }

    #[test]
    fn test_unknown_format_version_rejected() {
        let mut manifest = sample();
        manifest.format_version = 9;
        let json = serde_json::to_string(&manifest).unwrap();

        let err = ChainManifest::from_json(&json).unwrap_err();
        assert_eq!(err.code(), ChainErrorCode::ChainManifestInvalid);
    }

    #[test]
    fn test_missing_manifest_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = ChainManifest::load(dir.path()).unwrap_err();
        assert_eq!(err.code(), ChainErrorCode::ChainIo);
    }

    #[test]
    fn test_archive_name_with_separator_rejected() {
        let mut manifest = ChainManifest::new();
        manifest.push_archive("../escape", at(1), "crc32:00000000");
        assert!(manifest.build_registry().is_err());
    }

    #[test]
    fn test_out_of_order_dates_rejected() {
        let mut manifest = ChainManifest::new();
        manifest.push_archive("full", at(9), "crc32:00000000");
        manifest.push_archive("diff1", at(2), "crc32:00000000");

        let err = manifest.build_registry().unwrap_err();
        assert_eq!(err.code(), ChainErrorCode::ChainDateRegression);
    }
}
