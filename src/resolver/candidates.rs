//! CandidateSet - per-path restoration candidate resolver
//!
//! ## Resolution rule
//!
//! Given the observations for one path, fed newest archive first:
//! 1. Scan in feed order
//! 2. The first `Saved` wins: `Found(archive)`
//! 3. A `Removed` seen before any `Saved` ends the scan: `RemovedAt(archive)`
//!    when removals are reported, `NotFound` otherwise
//! 4. `Unchanged` never decides anything
//! 5. An exhausted scan is `NotFound`
//!
//! Older history behind the first decisive record is never consulted.
//!
//! ## Lifecycle
//!
//! One instance per path. `add` until the walker is done, then read the
//! decision. The first read seals the instance: later `add` calls fail.

use std::cell::Cell;
use std::collections::BTreeSet;

use crate::chain::{ArchiveNum, ObjectState, Observation};

use super::errors::{ResolverError, ResolverResult};
use super::LookupResult;

/// Outcome of the newest-first scan, before the removal policy is applied.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Scan {
    Saved(ArchiveNum),
    Removed(ArchiveNum),
    /// Ran off the end. Non-empty means only `Unchanged` was seen.
    Exhausted,
}

/// Accumulates observations for one path and computes its restore decision.
///
/// `Send` but not `Sync`: a set is owned by the single pass resolving its
/// path. Distinct paths can be resolved on distinct threads freely.
#[derive(Debug)]
pub struct CandidateSet {
    report_removals: bool,
    observations: Vec<Observation>,
    sealed: Cell<bool>,
}

impl CandidateSet {
    /// Creates an empty set.
    ///
    /// With `report_removals`, a tombstone resolves to `RemovedAt` instead
    /// of collapsing into `NotFound`.
    pub fn new(report_removals: bool) -> Self {
        Self {
            report_removals,
            observations: Vec::new(),
            sealed: Cell::new(false),
        }
    }

    /// Builds a set from observations already in newest-first order.
    pub fn from_observations<I>(report_removals: bool, observations: I) -> ResolverResult<Self>
    where
        I: IntoIterator<Item = (ArchiveNum, ObjectState)>,
    {
        let mut set = Self::new(report_removals);
        for (archive, state) in observations {
            set.add(archive, state)?;
        }
        Ok(set)
    }

    /// Appends one archive's record for this path.
    ///
    /// # Errors
    ///
    /// - `RESOLVER_SEALED` once the decision has been read
    /// - `RESOLVER_DUPLICATE_ARCHIVE` if `archive` was already added
    /// - `RESOLVER_OUT_OF_ORDER` if `archive` is not older than the last one
    pub fn add(&mut self, archive: ArchiveNum, state: ObjectState) -> ResolverResult<()> {
        if self.sealed.get() {
            return Err(ResolverError::sealed(archive));
        }

        if let Some(last) = self.observations.last() {
            // Strictly decreasing feed: anything seen before is >= last.
            if archive >= last.archive() {
                return Err(if self.observations.iter().any(|o| o.archive() == archive) {
                    ResolverError::duplicate_archive(archive)
                } else {
                    ResolverError::out_of_order(archive, last.archive())
                });
            }
        }

        self.observations.push(Observation::new(archive, state));
        Ok(())
    }

    /// Computes the decision and seals the set.
    ///
    /// Pure function of the accumulated observations: repeated calls
    /// return the same result.
    pub fn resolve(&self) -> LookupResult {
        self.sealed.set(true);

        match self.scan() {
            Scan::Saved(archive) => LookupResult::Found(archive),
            Scan::Removed(archive) if self.report_removals => LookupResult::RemovedAt(archive),
            Scan::Removed(_) | Scan::Exhausted => LookupResult::NotFound,
        }
    }

    /// Archives a restore must read from: the `Found` archive, or nothing.
    ///
    /// Seals the set, like `resolve`.
    pub fn archives_needed(&self) -> BTreeSet<ArchiveNum> {
        self.resolve().found_archive().into_iter().collect()
    }

    /// True when the set holds observations but none of them is decisive:
    /// the path is referenced as `Unchanged` with no reachable save.
    ///
    /// Such a `NotFound` indicates a broken chain (missing full backup or
    /// corrupted differential), unlike a path that was never observed.
    pub fn is_dangling(&self) -> bool {
        !self.observations.is_empty() && self.scan() == Scan::Exhausted
    }

    /// True once the decision has been read.
    pub fn is_sealed(&self) -> bool {
        self.sealed.get()
    }

    #[inline]
    pub fn report_removals(&self) -> bool {
        self.report_removals
    }

    /// Observations in feed order (newest first).
    #[inline]
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Stops at the newest decisive observation.
    fn scan(&self) -> Scan {
        match self.observations.iter().find(|o| o.state().is_decisive()) {
            Some(o) if o.state() == ObjectState::Saved => Scan::Saved(o.archive()),
            Some(o) => Scan::Removed(o.archive()),
            None => Scan::Exhausted,
        }
    }
}
