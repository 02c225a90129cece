//! ChainWalker - feeds per-path observations to resolvers
//!
//! For a path, every in-range catalog is visited newest first; catalogs
//! that do not mention the path are skipped, the others contribute one
//! observation. Content and metadata are walked as two independent tracks.
//!
//! Bounding the walk to an archive restores the chain as of that archive:
//! later archives are invisible.

use std::collections::BTreeSet;

use crate::chain::{ArchiveInfo, ArchiveNum, ObjectState};
use crate::resolver::CandidateSet;

use super::archive_catalog::CatalogEntry;
use super::chain_catalog::ChainCatalog;
use super::errors::{CatalogError, CatalogResult};

/// Which state of a catalog entry a walk reads.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Track {
    Content,
    Metadata,
}

impl Track {
    pub fn as_str(&self) -> &'static str {
        match self {
            Track::Content => "content",
            Track::Metadata => "metadata",
        }
    }

    fn state(&self, entry: &CatalogEntry) -> Option<ObjectState> {
        match self {
            Track::Content => Some(entry.content),
            Track::Metadata => entry.metadata,
        }
    }
}

/// Read-only walk over a chain, optionally bounded to a target archive.
#[derive(Clone, Copy, Debug)]
pub struct ChainWalker<'a> {
    chain: &'a ChainCatalog,
    report_removals: bool,
    upper: Option<ArchiveNum>,
}

impl<'a> ChainWalker<'a> {
    /// Walks the whole chain up to its latest archive.
    pub fn new(chain: &'a ChainCatalog, report_removals: bool) -> Self {
        Self {
            chain,
            report_removals,
            upper: chain.registry().latest().map(ArchiveInfo::num),
        }
    }

    /// Restricts the walk to archives `<= target`.
    pub fn up_to(mut self, target: ArchiveNum) -> CatalogResult<Self> {
        if !self.chain.registry().contains(target) {
            return Err(CatalogError::unknown_archive(format!(
                "archive {} is not part of this chain",
                target
            )));
        }
        self.upper = Some(target);
        Ok(self)
    }

    /// The newest archive visible to this walk; `None` for an empty chain.
    pub fn target(&self) -> Option<&'a ArchiveInfo> {
        self.upper.and_then(|num| self.chain.registry().get(num))
    }

    #[inline]
    pub fn chain(&self) -> &'a ChainCatalog {
        self.chain
    }

    #[inline]
    pub fn report_removals(&self) -> bool {
        self.report_removals
    }

    /// Every path mentioned by an in-range catalog, sorted.
    pub fn paths(&self) -> BTreeSet<&'a str> {
        let mut paths = BTreeSet::new();
        if let Some(upper) = self.upper {
            for catalog in self.chain.catalogs_newest_first(upper) {
                paths.extend(catalog.paths());
            }
        }
        paths
    }

    /// Builds the content resolver for `path`.
    pub fn content_candidates(&self, path: &str) -> CatalogResult<CandidateSet> {
        self.candidates(path, Track::Content)
    }

    /// Builds the metadata resolver for `path`.
    pub fn metadata_candidates(&self, path: &str) -> CatalogResult<CandidateSet> {
        self.candidates(path, Track::Metadata)
    }

    /// Builds the resolver for one track of `path`, fed newest first.
    pub fn candidates(&self, path: &str, track: Track) -> CatalogResult<CandidateSet> {
        let mut set = CandidateSet::new(self.report_removals);

        if let Some(upper) = self.upper {
            for catalog in self.chain.catalogs_newest_first(upper) {
                let state = catalog.get(path).and_then(|entry| track.state(entry));
                if let Some(state) = state {
                    set.add(catalog.archive(), state)?;
                }
            }
        }

        Ok(set)
    }
}
