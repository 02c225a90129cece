//! ChainCatalog - the registry plus one catalog per registered archive

use std::collections::BTreeMap;
use std::path::Path;

use uuid::Uuid;

use crate::chain::{ArchiveNum, ChainManifest, ChainRegistry};
use crate::observability::{log_event_with_fields, Event};

use super::archive_catalog::{ArchiveCatalog, CATALOG_FILE};
use super::errors::{CatalogError, CatalogResult};

/// All catalogs of one chain, keyed by archive number.
///
/// Immutable once loaded; walkers borrow it read-only.
#[derive(Clone, Debug)]
pub struct ChainCatalog {
    chain_id: Uuid,
    registry: ChainRegistry,
    catalogs: BTreeMap<ArchiveNum, ArchiveCatalog>,
}

impl ChainCatalog {
    /// Creates a catalog set for a fresh chain.
    pub fn new(registry: ChainRegistry) -> Self {
        Self::with_id(Uuid::new_v4(), registry)
    }

    /// Creates a catalog set for an existing chain id.
    pub fn with_id(chain_id: Uuid, registry: ChainRegistry) -> Self {
        Self {
            chain_id,
            registry,
            catalogs: BTreeMap::new(),
        }
    }

    /// Attaches the catalog of a registered archive.
    pub fn attach(&mut self, catalog: ArchiveCatalog) -> CatalogResult<()> {
        let archive = catalog.archive();

        if !self.registry.contains(archive) {
            return Err(CatalogError::unknown_archive(format!(
                "archive {} is not registered in this chain",
                archive
            )));
        }
        if self.catalogs.contains_key(&archive) {
            return Err(CatalogError::invalid(format!(
                "archive {} already has a catalog",
                archive
            )));
        }

        self.catalogs.insert(archive, catalog);
        Ok(())
    }

    /// Fails if any registered archive lacks a catalog.
    pub fn validate_complete(&self) -> CatalogResult<()> {
        match self
            .registry
            .iter()
            .find(|info| !self.catalogs.contains_key(&info.num()))
        {
            Some(info) => Err(CatalogError::unknown_archive(format!(
                "archive {} ('{}') has no catalog",
                info.num(),
                info.name()
            ))),
            None => Ok(()),
        }
    }

    #[inline]
    pub fn chain_id(&self) -> Uuid {
        self.chain_id
    }

    #[inline]
    pub fn registry(&self) -> &ChainRegistry {
        &self.registry
    }

    pub fn catalog(&self, archive: ArchiveNum) -> Option<&ArchiveCatalog> {
        self.catalogs.get(&archive)
    }

    /// Catalogs of archives `<= upper`, newest first.
    pub fn catalogs_newest_first(
        &self,
        upper: ArchiveNum,
    ) -> impl Iterator<Item = &ArchiveCatalog> {
        self.catalogs.range(..=upper).rev().map(|(_, catalog)| catalog)
    }

    /// Loads `chain.json` and every archive catalog from a chain directory.
    pub fn open(chain_dir: &Path) -> CatalogResult<Self> {
        let result = Self::open_inner(chain_dir);

        let dir = chain_dir.display().to_string();
        match &result {
            Ok(chain) => {
                let archives = chain.registry.len().to_string();
                let chain_id = chain.chain_id.to_string();
                log_event_with_fields(
                    Event::ChainLoaded,
                    &[
                        ("archives", archives.as_str()),
                        ("chain_dir", dir.as_str()),
                        ("chain_id", chain_id.as_str()),
                    ],
                );
            }
            Err(e) => {
                let error = e.to_string();
                log_event_with_fields(
                    Event::ChainLoadFailed,
                    &[("chain_dir", dir.as_str()), ("error", error.as_str())],
                );
            }
        }

        result
    }

    fn open_inner(chain_dir: &Path) -> CatalogResult<Self> {
        let manifest = ChainManifest::load(chain_dir)?;
        let registry = manifest.build_registry()?;
        let mut chain = Self::with_id(manifest.chain_id, registry);

        for entry in &manifest.archives {
            let num = chain
                .registry
                .by_name(&entry.name)
                .map(|info| info.num())
                .ok_or_else(|| CatalogError::unknown_archive(entry.name.clone()))?;

            let path = chain_dir.join(&entry.name).join(CATALOG_FILE);
            let catalog = ArchiveCatalog::load(&path, num, &entry.catalog_checksum)?;
            chain.attach(catalog)?;
        }

        chain.validate_complete()?;
        Ok(chain)
    }

    /// Writes every catalog and `chain.json` into a chain directory.
    pub fn save(&self, chain_dir: &Path) -> CatalogResult<()> {
        self.validate_complete()?;

        let mut manifest = ChainManifest::with_id(self.chain_id);
        for info in self.registry.iter() {
            let catalog = &self.catalogs[&info.num()];
            let path = chain_dir.join(info.name()).join(CATALOG_FILE);
            let checksum = catalog.write_to_file(&path)?;
            manifest.push_archive(info.name(), info.created_at(), checksum);
        }

        manifest.write_to_dir(chain_dir)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogEntry, CatalogErrorCode};
    use crate::chain::{ObjectState, MANIFEST_FILE};
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn two_archive_chain() -> ChainCatalog {
        let mut registry = ChainRegistry::new();
        let full = registry
            .register("full", Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap())
            .unwrap();
        let diff = registry
            .register("diff1", Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap())
            .unwrap();

        let mut chain = ChainCatalog::new(registry);

        let mut full_catalog = ArchiveCatalog::new(full);
        full_catalog
            .insert("etc/hosts", CatalogEntry::uniform(ObjectState::Saved))
            .unwrap();
        chain.attach(full_catalog).unwrap();

        let mut diff_catalog = ArchiveCatalog::new(diff);
        diff_catalog
            .insert("etc/hosts", CatalogEntry::uniform(ObjectState::Unchanged))
            .unwrap();
        chain.attach(diff_catalog).unwrap();

        chain
    }

    #[test]
    fn test_attach_unknown_archive_rejected() {
        let mut chain = ChainCatalog::new(ChainRegistry::new());
        let err = chain
            .attach(ArchiveCatalog::new(ArchiveNum::FIRST))
            .unwrap_err();
        assert_eq!(err.code(), CatalogErrorCode::CatalogUnknownArchive);
    }

    #[test]
    fn test_missing_catalog_detected() {
        let mut registry = ChainRegistry::new();
        registry.register("full", Utc::now()).unwrap();
        let chain = ChainCatalog::new(registry);

        let err = chain.validate_complete().unwrap_err();
        assert_eq!(err.code(), CatalogErrorCode::CatalogUnknownArchive);
    }

    #[test]
    fn test_newest_first_respects_upper_bound() {
        let chain = two_archive_chain();

        let all: Vec<u32> = chain
            .catalogs_newest_first(ArchiveNum::new(2).unwrap())
            .map(|c| c.archive().value())
            .collect();
        assert_eq!(all, vec![2, 1]);

        let bounded: Vec<u32> = chain
            .catalogs_newest_first(ArchiveNum::FIRST)
            .map(|c| c.archive().value())
            .collect();
        assert_eq!(bounded, vec![1]);
    }

    #[test]
    fn test_save_then_open() {
        let dir = TempDir::new().unwrap();
        let chain = two_archive_chain();
        chain.save(dir.path()).unwrap();

        assert!(dir.path().join(MANIFEST_FILE).exists());
        assert!(dir.path().join("diff1").join(CATALOG_FILE).exists());

        let opened = ChainCatalog::open(dir.path()).unwrap();
        assert_eq!(opened.chain_id(), chain.chain_id());
        assert_eq!(opened.registry().len(), 2);
        assert_eq!(
            opened.catalog(ArchiveNum::new(2).unwrap()).unwrap().get("etc/hosts"),
            Some(&CatalogEntry::uniform(ObjectState::Unchanged))
        );
    }

    #[test]
    fn test_open_detects_tampered_catalog() {
        let dir = TempDir::new().unwrap();
        two_archive_chain().save(dir.path()).unwrap();

        let path = dir.path().join("full").join(CATALOG_FILE);
        let tampered = std::fs::read_to_string(&path)
            .unwrap()
            .replace("saved", "removed");
        std::fs::write(&path, tampered).unwrap();

        let err = ChainCatalog::open(dir.path()).unwrap_err();
        assert_eq!(err.code(), CatalogErrorCode::CatalogChecksumMismatch);
    }
}
