//! ChainRegistry - the numbering authority for a chain
//!
//! - Append-only: archives are registered oldest first
//! - Numbers are assigned 1, 2, 3, ... and never change
//! - Built once per load, read-only during resolution

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::errors::{ChainError, ChainResult};
use super::ArchiveNum;

/// One registered archive.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ArchiveInfo {
    num: ArchiveNum,
    name: String,
    created_at: DateTime<Utc>,
}

impl ArchiveInfo {
    #[inline]
    pub fn num(&self) -> ArchiveNum {
        self.num
    }

    /// Archive base name, also its directory name under the chain root.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// The ordered set of archives forming one chain.
#[derive(Clone, Debug, Default)]
pub struct ChainRegistry {
    archives: Vec<ArchiveInfo>,
}

impl ChainRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the next archive of the chain and returns its number.
    ///
    /// # Errors
    ///
    /// - `CHAIN_DUPLICATE_ARCHIVE` if `name` is already registered
    /// - `CHAIN_DATE_REGRESSION` if `created_at` precedes the latest archive
    /// - `CHAIN_NUMBERING_EXHAUSTED` past `u32::MAX` archives
    pub fn register(
        &mut self,
        name: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> ChainResult<ArchiveNum> {
        let name = name.into();

        if self.by_name(&name).is_some() {
            return Err(ChainError::duplicate_archive(&name));
        }

        let num = match self.latest() {
            Some(previous) => {
                if created_at < previous.created_at {
                    return Err(ChainError::date_regression(&name, &previous.name));
                }
                previous.num.next().ok_or_else(ChainError::numbering_exhausted)?
            }
            None => ArchiveNum::FIRST,
        };

        self.archives.push(ArchiveInfo {
            num,
            name,
            created_at,
        });
        Ok(num)
    }

    /// Looks up an archive by number.
    pub fn get(&self, num: ArchiveNum) -> Option<&ArchiveInfo> {
        // Numbers are dense from 1, so the slot is num - 1.
        self.archives.get(num.value() as usize - 1)
    }

    /// Looks up an archive by name.
    pub fn by_name(&self, name: &str) -> Option<&ArchiveInfo> {
        self.archives.iter().find(|a| a.name == name)
    }

    /// True if `num` belongs to this chain.
    pub fn contains(&self, num: ArchiveNum) -> bool {
        self.get(num).is_some()
    }

    /// The most recent archive.
    pub fn latest(&self) -> Option<&ArchiveInfo> {
        self.archives.last()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.archives.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.archives.is_empty()
    }

    /// Archives oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &ArchiveInfo> {
        self.archives.iter()
    }

    /// Archives newest first, the order observations are fed to resolvers.
    pub fn iter_newest_first(&self) -> impl Iterator<Item = &ArchiveInfo> {
        self.archives.iter().rev()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::ChainErrorCode;
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, day, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_numbers_start_at_one_and_increase() {
        let mut registry = ChainRegistry::new();
        let full = registry.register("full", at(1)).unwrap();
        let diff1 = registry.register("diff1", at(2)).unwrap();
        let diff2 = registry.register("diff2", at(3)).unwrap();

        assert_eq!(full.value(), 1);
        assert_eq!(diff1.value(), 2);
        assert_eq!(diff2.value(), 3);
        assert_eq!(registry.latest().unwrap().name(), "diff2");
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut registry = ChainRegistry::new();
        registry.register("full", at(1)).unwrap();

        let err = registry.register("full", at(2)).unwrap_err();
        assert_eq!(err.code(), ChainErrorCode::ChainDuplicateArchive);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_date_regression_rejected() {
        let mut registry = ChainRegistry::new();
        registry.register("full", at(5)).unwrap();

        let err = registry.register("diff1", at(4)).unwrap_err();
        assert_eq!(err.code(), ChainErrorCode::ChainDateRegression);
    }

    #[test]
    fn test_same_timestamp_allowed() {
        let mut registry = ChainRegistry::new();
        registry.register("full", at(5)).unwrap();
        assert!(registry.register("diff1", at(5)).is_ok());
    }

    #[test]
    fn test_lookup() {
        let mut registry = ChainRegistry::new();
        registry.register("full", at(1)).unwrap();
        let diff = registry.register("diff1", at(2)).unwrap();

        assert_eq!(registry.get(diff).unwrap().name(), "diff1");
        assert_eq!(registry.by_name("full").unwrap().num(), ArchiveNum::FIRST);
        assert!(!registry.contains(ArchiveNum::new(3).unwrap()));
        assert!(registry.by_name("diff9").is_none());
    }

    #[test]
    fn test_newest_first_iteration() {
        let mut registry = ChainRegistry::new();
        for (i, name) in ["full", "diff1", "diff2"].iter().enumerate() {
            registry.register(*name, at(i as u32 + 1)).unwrap();
        }

        let order: Vec<u32> = registry.iter_newest_first().map(|a| a.num().value()).collect();
        assert_eq!(order, vec![3, 2, 1]);
    }
}
