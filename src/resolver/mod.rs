//! Restoration candidate resolver
//!
//! Decides, for one path, which archive of the chain holds the content to
//! restore, whether the path was deleted, or whether nothing usable exists.
//!
//! - `CandidateSet` - accumulates newest-first observations, computes the decision
//! - `LookupResult` - `Found` / `RemovedAt` / `NotFound`
//!
//! Resolution is pure in-memory computation: no I/O, no logging, no
//! shared state between sets.

mod candidates;
mod errors;
mod lookup;

pub use candidates::CandidateSet;
pub use errors::{ResolverError, ResolverErrorCode, ResolverResult};
pub use lookup::LookupResult;
