//! Catalog subsystem
//!
//! Per-archive catalogs, the chain-wide catalog set, and the walk that
//! turns them into per-path restore decisions.
//!
//! On-disk layout of a chain directory:
//!
//! ```text
//! <chain_dir>/
//!   chain.json              manifest: archive order, dates, catalog checksums
//!   <archive>/catalog.json  path -> content/metadata state
//!   <archive>/data/...      saved bytes (directory source)
//!   <archive>/data.tar      saved bytes (tar source)
//! ```
//!
//! Loading is all-or-nothing: a checksum mismatch or a registered archive
//! without a catalog fails the whole chain.

mod archive_catalog;
mod chain_catalog;
mod errors;
mod path;
mod plan;
mod walker;

pub use archive_catalog::{ArchiveCatalog, CatalogEntry, CATALOG_FILE};
pub use chain_catalog::ChainCatalog;
pub use errors::{CatalogError, CatalogErrorCode, CatalogResult};
pub use path::validate_path;
pub use plan::{PathDecision, PlanSummary, RestorePlan};
pub use walker::{ChainWalker, Track};
