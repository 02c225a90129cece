//! RestorePlan - two-track resolution over every path of a walk
//!
//! Content and metadata of a path are resolved by two independent
//! `CandidateSet`s. Pairing rule:
//! - content not `Found`: nothing to restore, metadata ignored
//! - content `Found`, metadata `Found`: read both archives (union)
//! - content `Found`, metadata otherwise: metadata comes from the content
//!   archive, which carries the object's inode metadata with its bytes
//!
//! A track whose observations are all `Unchanged` is counted and logged as
//! a catalog inconsistency, distinct from a path that was never observed.

use std::collections::BTreeSet;

use regex::Regex;
use serde::Serialize;

use crate::chain::ArchiveNum;
use crate::observability::{log_event_with_fields, Event, MetricsRegistry};
use crate::resolver::{CandidateSet, LookupResult};

use super::errors::CatalogResult;
use super::walker::{ChainWalker, Track};

/// The restore decision for one path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PathDecision {
    pub path: String,
    pub content: LookupResult,
    pub metadata: LookupResult,
    /// Content observations were all `Unchanged`
    pub content_dangling: bool,
    /// Metadata observations were all `Unchanged`
    pub metadata_dangling: bool,
    archives: BTreeSet<ArchiveNum>,
}

impl PathDecision {
    fn from_tracks(path: &str, content: &CandidateSet, metadata: &CandidateSet) -> Self {
        let content_result = content.resolve();
        let metadata_result = metadata.resolve();

        let archives = if content_result.is_found() {
            let mut archives = content.archives_needed();
            archives.extend(metadata.archives_needed());
            archives
        } else {
            BTreeSet::new()
        };

        Self {
            path: path.to_string(),
            content: content_result,
            metadata: metadata_result,
            content_dangling: content.is_dangling(),
            metadata_dangling: metadata.is_dangling(),
            archives,
        }
    }

    /// Archives a restore of this path must read.
    pub fn archives(&self) -> &BTreeSet<ArchiveNum> {
        &self.archives
    }

    /// Archive holding the content to restore.
    pub fn content_archive(&self) -> Option<ArchiveNum> {
        self.content.found_archive()
    }

    /// Archive holding the metadata to apply, under the pairing rule.
    pub fn metadata_archive(&self) -> Option<ArchiveNum> {
        let content = self.content.found_archive()?;
        Some(self.metadata.found_archive().unwrap_or(content))
    }

    /// True when the path has nothing to restore because the chain is broken.
    pub fn is_inconsistent(&self) -> bool {
        !self.content.is_found() && self.content_dangling
    }
}

/// Counts per outcome.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PlanSummary {
    pub found: usize,
    pub removed: usize,
    /// `NotFound`, dangling paths excluded
    pub not_found: usize,
    /// Content never reached a `Saved` record
    pub dangling: usize,
}

/// Decisions for every path of a walk, in path order.
#[derive(Clone, Debug, Serialize)]
pub struct RestorePlan {
    /// Archive the plan restores as of
    target: Option<ArchiveNum>,
    decisions: Vec<PathDecision>,
}

impl RestorePlan {
    /// Resolves every path the walk sees.
    pub fn build(walker: &ChainWalker<'_>, metrics: &MetricsRegistry) -> CatalogResult<Self> {
        Self::build_filtered(walker, None, metrics)
    }

    /// Resolves every path the walk sees that matches `filter`.
    pub fn build_filtered(
        walker: &ChainWalker<'_>,
        filter: Option<&Regex>,
        metrics: &MetricsRegistry,
    ) -> CatalogResult<Self> {
        let mut decisions = Vec::new();

        for path in walker.paths() {
            if filter.is_some_and(|re| !re.is_match(path)) {
                continue;
            }
            decisions.push(Self::resolve_path(walker, path, metrics)?);
        }

        let plan = Self {
            target: walker.target().map(|info| info.num()),
            decisions,
        };

        let summary = plan.summary();
        let target = plan.target.map(|t| t.to_string()).unwrap_or_default();
        let (found, removed, not_found, dangling) = (
            summary.found.to_string(),
            summary.removed.to_string(),
            summary.not_found.to_string(),
            summary.dangling.to_string(),
        );
        log_event_with_fields(
            Event::PlanBuilt,
            &[
                ("dangling", dangling.as_str()),
                ("found", found.as_str()),
                ("not_found", not_found.as_str()),
                ("removed", removed.as_str()),
                ("target", target.as_str()),
            ],
        );

        Ok(plan)
    }

    /// Resolves both tracks of one path.
    pub fn resolve_path(
        walker: &ChainWalker<'_>,
        path: &str,
        metrics: &MetricsRegistry,
    ) -> CatalogResult<PathDecision> {
        let content = walker.candidates(path, Track::Content)?;
        let metadata = walker.candidates(path, Track::Metadata)?;
        let decision = PathDecision::from_tracks(path, &content, &metadata);

        metrics.record_resolution(decision.content.is_found(), decision.content.is_removed());
        for (dangling, track) in [
            (decision.content_dangling, Track::Content),
            (decision.metadata_dangling, Track::Metadata),
        ] {
            if dangling {
                metrics.increment_dangling();
                log_event_with_fields(
                    Event::CatalogInconsistent,
                    &[("path", path), ("track", track.as_str())],
                );
            }
        }

        log_event_with_fields(
            Event::PathResolved,
            &[("path", path), ("status", decision.content.as_str())],
        );

        Ok(decision)
    }

    pub fn target(&self) -> Option<ArchiveNum> {
        self.target
    }

    pub fn decisions(&self) -> &[PathDecision] {
        &self.decisions
    }

    /// Union of every path's archive set.
    pub fn archives_needed(&self) -> BTreeSet<ArchiveNum> {
        self.decisions
            .iter()
            .flat_map(|d| d.archives.iter().copied())
            .collect()
    }

    pub fn summary(&self) -> PlanSummary {
        let mut summary = PlanSummary::default();
        for decision in &self.decisions {
            match decision.content {
                LookupResult::Found(_) => summary.found += 1,
                LookupResult::RemovedAt(_) => summary.removed += 1,
                LookupResult::NotFound if decision.content_dangling => summary.dangling += 1,
                LookupResult::NotFound => summary.not_found += 1,
            }
        }
        summary
    }
}
