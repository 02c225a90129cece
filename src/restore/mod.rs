//! Restore subsystem
//!
//! Writes the objects of a `RestorePlan` into a target directory.
//!
//! # Algorithm
//!
//! 1. Create the target directory
//! 2. For each path decision, in path order:
//!    - `Found`: read content from the content archive, write it, apply
//!      metadata from the metadata archive, fsync the file
//!    - `RemovedAt`: record the removal
//!    - `NotFound`: record as not found, or as dangling when the chain
//!      never saved the path
//! 3. fsync every directory that received a file
//!
//! Removals are reported, never applied: the target is not expected to
//! hold an older state of the tree.
//!
//! Restore stops at the first error. Files already written stay in place.

mod errors;
mod local_file;
mod report;
mod source;

pub use errors::{RestoreError, RestoreErrorCode, RestoreResult};
pub use local_file::{LocalFile, LocalFileTarget, OpenMode};
pub use report::{RemovedPath, RestoreReport, RestoredFile};
pub use source::{
    ArchiveSource, DirectorySource, ObjectMetadata, SourceError, SourceResult, TarSource,
    DATA_DIR, DATA_TAR, META_FILE,
};

use std::collections::BTreeSet;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use crate::catalog::{validate_path, PathDecision, RestorePlan};
use crate::chain::{ArchiveInfo, ArchiveNum, ChainRegistry};
use crate::observability::{log_event_with_fields, Event, MetricsRegistry};
use crate::resolver::LookupResult;

/// Per-pass restore switches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RestoreOptions {
    /// Apply saved uid/gid; needs privileges for foreign owners
    pub restore_ownership: bool,
    /// Replace files already present in the target
    pub overwrite: bool,
}

/// Restores plans of one chain.
pub struct RestoreEngine<'a> {
    registry: &'a ChainRegistry,
    metrics: &'a MetricsRegistry,
}

impl<'a> RestoreEngine<'a> {
    pub fn new(registry: &'a ChainRegistry, metrics: &'a MetricsRegistry) -> Self {
        Self { registry, metrics }
    }

    /// Restores every `Found` path of `plan` under `target_dir`.
    pub fn restore<S: ArchiveSource + ?Sized>(
        &self,
        plan: &RestorePlan,
        source: &S,
        target_dir: &Path,
        options: RestoreOptions,
    ) -> RestoreResult<RestoreReport> {
        let dir = target_dir.display().to_string();
        let as_of = plan.target().map(|t| t.to_string()).unwrap_or_default();
        log_event_with_fields(
            Event::RestoreStart,
            &[("as_of", as_of.as_str()), ("target_dir", dir.as_str())],
        );

        match self.restore_inner(plan, source, target_dir, options) {
            Ok(report) => {
                self.metrics.increment_restores();
                let files = report.restored.len().to_string();
                let bytes = report.bytes_restored().to_string();
                let dangling = report.dangling.len().to_string();
                log_event_with_fields(
                    Event::RestoreComplete,
                    &[
                        ("bytes", bytes.as_str()),
                        ("dangling", dangling.as_str()),
                        ("files", files.as_str()),
                        ("target_dir", dir.as_str()),
                    ],
                );
                Ok(report)
            }
            Err(e) => {
                self.metrics.increment_restore_failures();
                let error = e.to_string();
                log_event_with_fields(
                    Event::RestoreFailed,
                    &[("error", error.as_str()), ("target_dir", dir.as_str())],
                );
                Err(e)
            }
        }
    }

    fn restore_inner<S: ArchiveSource + ?Sized>(
        &self,
        plan: &RestorePlan,
        source: &S,
        target_dir: &Path,
        options: RestoreOptions,
    ) -> RestoreResult<RestoreReport> {
        fs::create_dir_all(target_dir)
            .map_err(|e| RestoreError::io_error_at_path(target_dir, e))?;

        let mut report = RestoreReport::new(plan.target());
        let mut touched_dirs = BTreeSet::new();
        touched_dirs.insert(target_dir.to_path_buf());

        for decision in plan.decisions() {
            validate_path(&decision.path)
                .map_err(|e| RestoreError::invalid_path(&decision.path, e))?;

            match decision.content {
                LookupResult::Found(content) => {
                    let restored = self.restore_file(decision, content, source, target_dir, options)?;
                    if let Some(parent) = target_dir.join(&decision.path).parent() {
                        touched_dirs.insert(parent.to_path_buf());
                    }
                    report.restored.push(restored);
                }
                LookupResult::RemovedAt(archive) => report.removed.push(RemovedPath {
                    path: decision.path.clone(),
                    archive,
                }),
                LookupResult::NotFound if decision.is_inconsistent() => {
                    report.dangling.push(decision.path.clone())
                }
                LookupResult::NotFound => report.not_found.push(decision.path.clone()),
            }
        }

        for dir in &touched_dirs {
            fsync_dir(dir)?;
        }

        Ok(report)
    }

    fn restore_file<S: ArchiveSource + ?Sized>(
        &self,
        decision: &PathDecision,
        content: ArchiveNum,
        source: &S,
        target_dir: &Path,
        options: RestoreOptions,
    ) -> RestoreResult<RestoredFile> {
        let path = decision.path.as_str();
        let content_info = self.archive(content)?;
        let metadata_num = decision.metadata_archive().unwrap_or(content);
        let metadata_info = self.archive(metadata_num)?;

        let bytes = source.read_content(content_info, path)?;
        let metadata = source.read_metadata(metadata_info, path)?;

        let dest: PathBuf = target_dir.join(path);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| RestoreError::io_error_at_path(parent, e))?;
        }

        let mode = if options.overwrite {
            OpenMode::replace()
        } else {
            OpenMode::create_new()
        };
        let io_err = |e: io::Error| RestoreError::io_error_at_path(&dest, e);

        let mut file = LocalFileTarget::open(&dest, mode).map_err(io_err)?;
        write_object(&mut file, &bytes, metadata, options.restore_ownership).map_err(io_err)?;

        let size = bytes.len() as u64;
        self.metrics.record_file_restored(size);
        let size_str = size.to_string();
        let content_str = content.to_string();
        log_event_with_fields(
            Event::RestoreFile,
            &[
                ("archive", content_str.as_str()),
                ("bytes", size_str.as_str()),
                ("path", path),
            ],
        );

        Ok(RestoredFile {
            path: path.to_string(),
            content_archive: content,
            metadata_archive: metadata_num,
            bytes: size,
        })
    }

    fn archive(&self, num: ArchiveNum) -> RestoreResult<&'a ArchiveInfo> {
        self.registry
            .get(num)
            .ok_or_else(|| RestoreError::failed(format!("archive {} is not registered", num)))
    }
}

/// Writes `bytes`, checks the resulting length, applies metadata and syncs.
fn write_object<F: LocalFile>(
    file: &mut F,
    bytes: &[u8],
    metadata: ObjectMetadata,
    restore_ownership: bool,
) -> io::Result<()> {
    file.write_all(bytes)?;

    let written = file.size()?;
    if written != bytes.len() as u64 {
        return Err(io::Error::new(
            io::ErrorKind::Other,
            format!("file holds {} bytes after writing {}", written, bytes.len()),
        ));
    }

    file.set_permissions(metadata.mode)?;
    if restore_ownership {
        file.set_ownership(metadata.uid, metadata.gid)?;
    }
    file.sync()
}

/// fsync a directory
fn fsync_dir(dir: &Path) -> RestoreResult<()> {
    let d = OpenOptions::new()
        .read(true)
        .open(dir)
        .map_err(|e| RestoreError::io_error_at_path(dir, e))?;

    d.sync_all()
        .map_err(|e| RestoreError::io_error_at_path(dir, e))
}
