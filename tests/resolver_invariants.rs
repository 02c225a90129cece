//! Resolver Invariant Tests
//!
//! Decision rules of `CandidateSet` over newest-first observation feeds:
//! - First `Saved` wins, older history is never consulted
//! - A leading `Removed` ends the scan
//! - `Unchanged` never decides
//! - Reads are idempotent and seal the set

use chainrestore::chain::{ArchiveNum, ObjectState};
use chainrestore::resolver::{CandidateSet, LookupResult, ResolverErrorCode};

use ObjectState::{Removed, Saved, Unchanged};

// =============================================================================
// Helper Functions
// =============================================================================

fn num(n: u32) -> ArchiveNum {
    ArchiveNum::new(n).unwrap()
}

fn resolve(report_removals: bool, observations: &[(u32, ObjectState)]) -> CandidateSet {
    CandidateSet::from_observations(
        report_removals,
        observations.iter().map(|&(n, state)| (num(n), state)),
    )
    .unwrap()
}

/// Every newest-first feed of up to `max_len` archives, numbered max_len..1.
fn all_feeds(max_len: u32) -> Vec<Vec<(u32, ObjectState)>> {
    let states = [Saved, Unchanged, Removed];
    let mut feeds = vec![Vec::new()];

    for len in 1..=max_len {
        let combinations = 3usize.pow(len);
        for mut code in 0..combinations {
            let mut feed = Vec::with_capacity(len as usize);
            for archive in (1..=len).rev() {
                feed.push((archive, states[code % 3]));
                code /= 3;
            }
            feeds.push(feed);
        }
    }

    feeds
}

/// First non-`Unchanged` observation of a feed.
fn first_decisive(feed: &[(u32, ObjectState)]) -> Option<(u32, ObjectState)> {
    feed.iter().copied().find(|&(_, state)| state != Unchanged)
}

// =============================================================================
// Decision Rule Tests
// =============================================================================

/// Found(a) iff a is the first Saved and no Removed precedes it.
#[test]
fn test_found_iff_first_decisive_is_saved() {
    for feed in all_feeds(4) {
        for report in [false, true] {
            let result = resolve(report, &feed).resolve();
            match first_decisive(&feed) {
                Some((a, Saved)) => assert_eq!(result, LookupResult::Found(num(a)), "{:?}", feed),
                _ => assert!(!result.is_found(), "{:?}", feed),
            }
        }
    }
}

/// Leading removal: NotFound without reporting, RemovedAt with it.
#[test]
fn test_leading_removal_policy() {
    for feed in all_feeds(4) {
        if let Some((a, Removed)) = first_decisive(&feed) {
            assert_eq!(resolve(false, &feed).resolve(), LookupResult::NotFound);

            let reported = resolve(true, &feed);
            assert_eq!(reported.resolve(), LookupResult::RemovedAt(num(a)));
            assert!(reported.archives_needed().is_empty());
        }
    }
}

/// archives_needed is exactly the Found archive, else empty.
#[test]
fn test_archives_needed_matches_decision() {
    for feed in all_feeds(4) {
        for report in [false, true] {
            let set = resolve(report, &feed);
            let needed: Vec<ArchiveNum> = set.archives_needed().into_iter().collect();
            match set.resolve() {
                LookupResult::Found(a) => assert_eq!(needed, vec![a]),
                _ => assert!(needed.is_empty()),
            }
        }
    }
}

/// Dangling means non-empty and all Unchanged.
#[test]
fn test_dangling_only_for_all_unchanged() {
    for feed in all_feeds(4) {
        let set = resolve(true, &feed);
        let all_unchanged = !feed.is_empty() && feed.iter().all(|&(_, s)| s == Unchanged);
        assert_eq!(set.is_dangling(), all_unchanged, "{:?}", feed);
        if all_unchanged {
            assert_eq!(set.resolve(), LookupResult::NotFound);
        }
    }
}

#[test]
fn test_resolve_idempotent() {
    for feed in all_feeds(3) {
        let set = resolve(true, &feed);
        assert_eq!(set.resolve(), set.resolve());
        assert_eq!(set.archives_needed(), set.archives_needed());
    }
}

#[test]
fn test_empty_feed_not_found() {
    let set = CandidateSet::new(true);
    assert_eq!(set.resolve(), LookupResult::NotFound);
    assert!(!set.is_dangling());
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_scenario_a_removal_hidden() {
    assert_eq!(resolve(false, &[(5, Removed)]).resolve(), LookupResult::NotFound);
}

#[test]
fn test_scenario_b_removal_reported() {
    assert_eq!(resolve(true, &[(5, Removed)]).resolve(), LookupResult::RemovedAt(num(5)));
}

#[test]
fn test_scenario_c_unchanged_skipped() {
    let set = resolve(false, &[(7, Unchanged), (4, Saved), (1, Saved)]);
    assert_eq!(set.resolve(), LookupResult::Found(num(4)));
}

#[test]
fn test_scenario_d_newest_save_wins() {
    let set = resolve(true, &[(9, Saved), (6, Removed), (2, Saved)]);
    assert_eq!(set.resolve(), LookupResult::Found(num(9)));
}

#[test]
fn test_scenario_e_dangling() {
    let set = resolve(true, &[(3, Unchanged)]);
    assert_eq!(set.resolve(), LookupResult::NotFound);
    assert!(set.is_dangling());
}

// =============================================================================
// Feed Contract Tests
// =============================================================================

#[test]
fn test_feed_violations_rejected() {
    let mut set = CandidateSet::new(false);
    set.add(num(4), Unchanged).unwrap();

    let err = set.add(num(4), Saved).unwrap_err();
    assert_eq!(err.code(), ResolverErrorCode::ResolverDuplicateArchive);

    let err = set.add(num(6), Saved).unwrap_err();
    assert_eq!(err.code(), ResolverErrorCode::ResolverOutOfOrder);
    assert!(err.is_fatal());

    // rejected adds leave the set untouched
    assert_eq!(set.len(), 1);

    set.add(num(2), Saved).unwrap();
    assert_eq!(set.resolve(), LookupResult::Found(num(2)));

    let err = set.add(num(1), Saved).unwrap_err();
    assert_eq!(err.code(), ResolverErrorCode::ResolverSealed);
    assert_eq!(err.archive(), num(1));
}
