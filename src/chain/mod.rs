//! Chain domain types
//!
//! The vocabulary every other subsystem speaks:
//! - `ArchiveNum` - totally ordered archive identity (lower = older)
//! - `ObjectState` - what one archive's catalog records for one path
//! - `Observation` - an `(ArchiveNum, ObjectState)` pair for one path
//! - `ChainRegistry` - the single authority assigning archive numbers
//! - `ChainManifest` - the persisted archive list (`chain.json`)
//!
//! These types carry no resolution logic; see `resolver` for that.

mod archive_num;
mod checksum;
mod errors;
mod manifest;
mod object_state;
mod registry;

pub use archive_num::{ArchiveNum, ZeroArchiveNum};
pub use checksum::{compute_checksum, format_checksum, parse_checksum, verify_checksum};
pub use errors::{ChainError, ChainErrorCode, ChainResult};
pub use manifest::{ChainManifest, ManifestArchive, FORMAT_VERSION, MANIFEST_FILE};
pub use object_state::{ObjectState, Observation};
pub use registry::{ArchiveInfo, ChainRegistry};
