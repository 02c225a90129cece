//! Observable events
//!
//! Every log line emitted by the crate names one of these events.

use std::fmt;

/// Observable events during chain loading, resolution and restore
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration file loaded and validated
    ConfigLoaded,

    // Chain
    /// Chain manifest and catalogs loaded, registry built
    ChainLoaded,
    /// Chain manifest or a catalog failed to load
    ChainLoadFailed,

    // Resolution
    /// A single path was resolved
    PathResolved,
    /// A path's observations are all `Unchanged` with no reachable save
    CatalogInconsistent,
    /// Restore plan built for every path in range
    PlanBuilt,

    // Restore
    /// Restore started
    RestoreStart,
    /// One object written to the target
    RestoreFile,
    /// Restore finished
    RestoreComplete,
    /// Restore aborted on an error
    RestoreFailed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",

            Event::ChainLoaded => "CHAIN_LOADED",
            Event::ChainLoadFailed => "CHAIN_LOAD_FAILED",

            Event::PathResolved => "PATH_RESOLVED",
            Event::CatalogInconsistent => "CATALOG_INCONSISTENT",
            Event::PlanBuilt => "RESTORE_PLAN_BUILT",

            Event::RestoreStart => "RESTORE_BEGIN",
            Event::RestoreFile => "RESTORE_FILE",
            Event::RestoreComplete => "RESTORE_COMPLETE",
            Event::RestoreFailed => "RESTORE_FAILED",
        }
    }

    /// Returns true if this event indicates a failed operation
    pub fn is_failure(&self) -> bool {
        matches!(self, Event::ChainLoadFailed | Event::RestoreFailed)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
