//! Per-archive catalog (`<archive>/catalog.json`)
//!
//! Maps each path the archive mentions to its content state and, when the
//! archive tracked it, its metadata state (ownership, permissions).
//! A path absent from the map is "not mentioned", which is not a removal.

use std::collections::BTreeMap;
use std::fmt;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::chain::{compute_checksum, format_checksum, ArchiveNum, ObjectState};

use super::errors::{CatalogError, CatalogResult};
use super::path::validate_path;

/// Catalog file name inside an archive directory
pub const CATALOG_FILE: &str = "catalog.json";

/// One archive's record for one path.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// State of the object's bytes
    pub content: ObjectState,

    /// State of the object's metadata; `None` when this archive does not
    /// mention it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ObjectState>,
}

impl CatalogEntry {
    /// Content and metadata share one state.
    pub fn uniform(state: ObjectState) -> Self {
        Self {
            content: state,
            metadata: Some(state),
        }
    }

    /// Content state only; metadata not mentioned.
    pub fn content_only(state: ObjectState) -> Self {
        Self {
            content: state,
            metadata: None,
        }
    }

    /// Explicit content and metadata states.
    pub fn new(content: ObjectState, metadata: ObjectState) -> Self {
        Self {
            content,
            metadata: Some(metadata),
        }
    }
}

#[derive(Serialize)]
struct CatalogFile<'a> {
    format_version: u8,
    entries: &'a BTreeMap<String, CatalogEntry>,
}

/// On-disk form as read back. Entries keep file order and repeats so a
/// path listed twice can be rejected instead of silently overwritten.
#[derive(Deserialize)]
struct RawCatalogFile {
    format_version: u8,
    entries: EntryList,
}

struct EntryList(Vec<(String, CatalogEntry)>);

impl<'de> Deserialize<'de> for EntryList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntryListVisitor;

        impl<'de> Visitor<'de> for EntryListVisitor {
            type Value = EntryList;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of path to catalog entry")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<EntryList, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0).min(4096));
                while let Some((path, entry)) = map.next_entry::<String, CatalogEntry>()? {
                    entries.push((path, entry));
                }
                Ok(EntryList(entries))
            }
        }

        deserializer.deserialize_map(EntryListVisitor)
    }
}

/// The catalog of one archive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveCatalog {
    archive: ArchiveNum,
    entries: BTreeMap<String, CatalogEntry>,
}

impl ArchiveCatalog {
    /// Creates an empty catalog for an archive.
    pub fn new(archive: ArchiveNum) -> Self {
        Self {
            archive,
            entries: BTreeMap::new(),
        }
    }

    /// Records the entry for `path`.
    ///
    /// An archive assigns exactly one state to a path it mentions, so a
    /// second insert of the same path is rejected.
    pub fn insert(&mut self, path: impl Into<String>, entry: CatalogEntry) -> CatalogResult<()> {
        let path = path.into();
        validate_path(&path)?;

        if self.entries.contains_key(&path) {
            return Err(CatalogError::duplicate_path(self.archive, &path));
        }
        self.entries.insert(path, entry);
        Ok(())
    }

    #[inline]
    pub fn archive(&self) -> ArchiveNum {
        self.archive
    }

    /// The entry for `path`, or `None` when the archive does not mention it.
    pub fn get(&self, path: &str) -> Option<&CatalogEntry> {
        self.entries.get(path)
    }

    /// Paths in lexicographic order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serializes the catalog to JSON
    pub fn to_json(&self) -> CatalogResult<String> {
        let file = CatalogFile {
            format_version: 1,
            entries: &self.entries,
        };
        serde_json::to_string_pretty(&file)
            .map_err(|e| CatalogError::invalid(format!("Failed to serialize catalog: {}", e)))
    }

    /// Parses a catalog for `archive`, validating every path.
    ///
    /// A path listed twice fails with `CATALOG_DUPLICATE_PATH`, same as a
    /// second `insert`.
    pub fn from_json(archive: ArchiveNum, json: &str) -> CatalogResult<Self> {
        let file: RawCatalogFile = serde_json::from_str(json).map_err(|e| {
            CatalogError::invalid(format!("Failed to parse catalog of archive {}: {}", archive, e))
        })?;

        if file.format_version != 1 {
            return Err(CatalogError::invalid(format!(
                "catalog of archive {}: unsupported format_version {}",
                archive, file.format_version
            )));
        }

        let mut catalog = Self::new(archive);
        for (path, entry) in file.entries.0 {
            catalog.insert(path, entry)?;
        }
        Ok(catalog)
    }

    /// Reads and parses `catalog.json` after verifying its checksum.
    pub fn load(path: &Path, archive: ArchiveNum, expected_checksum: &str) -> CatalogResult<Self> {
        let bytes = fs::read(path).map_err(|e| CatalogError::io_error_at_path(path, e))?;

        let actual = format_checksum(compute_checksum(&bytes));
        if actual != expected_checksum {
            return Err(CatalogError::checksum_mismatch(path, expected_checksum, &actual));
        }

        let json = String::from_utf8(bytes)
            .map_err(|_| CatalogError::invalid(format!("{} is not UTF-8", path.display())))?;
        Self::from_json(archive, &json)
    }

    /// Writes the catalog with fsync and returns its formatted checksum.
    pub fn write_to_file(&self, path: &Path) -> CatalogResult<String> {
        let json = self.to_json()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| CatalogError::io_error_at_path(parent, e))?;
        }

        let mut file = File::create(path).map_err(|e| CatalogError::io_error_at_path(path, e))?;
        file.write_all(json.as_bytes())
            .map_err(|e| CatalogError::io_error_at_path(path, e))?;
        file.sync_all()
            .map_err(|e| CatalogError::io_error_at_path(path, e))?;

        Ok(format_checksum(compute_checksum(json.as_bytes())))
    }
}
