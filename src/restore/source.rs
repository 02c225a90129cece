//! Archive sources - where restored bytes and metadata come from
//!
//! The resolver only names an archive; a source knows how that archive's
//! data is stored.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chain::ArchiveInfo;

/// Data directory inside an archive directory
pub const DATA_DIR: &str = "data";

/// Metadata map inside an archive directory
pub const META_FILE: &str = "meta.json";

/// Tar container inside an archive directory
pub const DATA_TAR: &str = "data.tar";

/// Result type for source operations
pub type SourceResult<T> = Result<T, SourceError>;

/// Archive source errors
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("object '{path}' not found in archive '{archive}'")]
    ObjectNotFound { archive: String, path: String },

    #[error("no metadata for '{path}' in archive '{archive}'")]
    MetadataNotFound { archive: String, path: String },

    #[error("malformed metadata in archive '{archive}': {reason}")]
    InvalidMetadata { archive: String, reason: String },

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl SourceError {
    fn io(path: &Path, source: io::Error) -> Self {
        SourceError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Inode metadata applied to a restored file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMetadata {
    /// Permission bits
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
}

/// Read access to the data of the archives of one chain.
pub trait ArchiveSource {
    /// The saved bytes of `path` in `archive`.
    fn read_content(&self, archive: &ArchiveInfo, path: &str) -> SourceResult<Vec<u8>>;

    /// The saved metadata of `path` in `archive`.
    fn read_metadata(&self, archive: &ArchiveInfo, path: &str) -> SourceResult<ObjectMetadata>;
}

/// Archives stored as plain directories:
/// `<chain_dir>/<archive>/data/<path>` and `<chain_dir>/<archive>/meta.json`.
#[derive(Debug)]
pub struct DirectorySource {
    chain_dir: PathBuf,
    meta_cache: RefCell<BTreeMap<String, BTreeMap<String, ObjectMetadata>>>,
}

impl DirectorySource {
    pub fn new(chain_dir: impl Into<PathBuf>) -> Self {
        Self {
            chain_dir: chain_dir.into(),
            meta_cache: RefCell::new(BTreeMap::new()),
        }
    }

    fn archive_dir(&self, archive: &ArchiveInfo) -> PathBuf {
        self.chain_dir.join(archive.name())
    }

    fn load_meta(&self, archive: &ArchiveInfo) -> SourceResult<BTreeMap<String, ObjectMetadata>> {
        let path = self.archive_dir(archive).join(META_FILE);
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(SourceError::io(&path, e)),
        };

        serde_json::from_str(&json).map_err(|e| SourceError::InvalidMetadata {
            archive: archive.name().to_string(),
            reason: e.to_string(),
        })
    }
}

impl ArchiveSource for DirectorySource {
    fn read_content(&self, archive: &ArchiveInfo, path: &str) -> SourceResult<Vec<u8>> {
        let full_path = self.archive_dir(archive).join(DATA_DIR).join(path);

        fs::read(&full_path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                SourceError::ObjectNotFound {
                    archive: archive.name().to_string(),
                    path: path.to_string(),
                }
            } else {
                SourceError::io(&full_path, e)
            }
        })
    }

    fn read_metadata(&self, archive: &ArchiveInfo, path: &str) -> SourceResult<ObjectMetadata> {
        if !self.meta_cache.borrow().contains_key(archive.name()) {
            let meta = self.load_meta(archive)?;
            self.meta_cache
                .borrow_mut()
                .insert(archive.name().to_string(), meta);
        }

        self.meta_cache
            .borrow()
            .get(archive.name())
            .and_then(|meta| meta.get(path).copied())
            .ok_or_else(|| SourceError::MetadataNotFound {
                archive: archive.name().to_string(),
                path: path.to_string(),
            })
    }
}

/// Initial buffer ceiling for one object; larger bodies grow as read
const MAX_PREALLOC: u64 = 1 << 20;

/// Archives stored as one tar file each: `<chain_dir>/<archive>/data.tar`.
///
/// Content and metadata both come from the tar entry: the header carries
/// mode, uid and gid. Each tar is scanned once into an index of data
/// offsets; content reads then seek straight to the entry.
#[derive(Debug)]
pub struct TarSource {
    chain_dir: PathBuf,
    index: RefCell<BTreeMap<String, TarIndex>>,
}

type TarIndex = BTreeMap<PathBuf, TarEntryInfo>;

#[derive(Clone, Copy, Debug)]
struct TarEntryInfo {
    /// Offset of the entry's data in the tar file
    offset: u64,
    size: u64,
    mode: u32,
    uid: u64,
    gid: u64,
    /// Data is not stored contiguously; read through the tar reader
    sparse: bool,
}

/// Entry path with leading `./` components removed.
fn normalize_entry_path(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

fn read_capped(reader: &mut impl Read, size: u64) -> io::Result<Vec<u8>> {
    let mut bytes = Vec::with_capacity(size.min(MAX_PREALLOC) as usize);
    reader.take(size).read_to_end(&mut bytes)?;
    if bytes.len() as u64 != size {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("entry truncated: {} of {} bytes", bytes.len(), size),
        ));
    }
    Ok(bytes)
}

impl TarSource {
    pub fn new(chain_dir: impl Into<PathBuf>) -> Self {
        Self {
            chain_dir: chain_dir.into(),
            index: RefCell::new(BTreeMap::new()),
        }
    }

    fn tar_path(&self, archive: &ArchiveInfo) -> PathBuf {
        self.chain_dir.join(archive.name()).join(DATA_TAR)
    }

    /// Scans the archive's tar once. A later entry for a path replaces an
    /// earlier one, as tar extraction does.
    fn build_index(&self, archive: &ArchiveInfo) -> SourceResult<TarIndex> {
        let tar_path = self.tar_path(archive);
        let io_err = |e: io::Error| SourceError::io(&tar_path, e);

        let file = File::open(&tar_path).map_err(io_err)?;
        let mut tar = tar::Archive::new(file);
        let mut index = TarIndex::new();

        for entry in tar.entries_with_seek().map_err(io_err)? {
            let entry = entry.map_err(io_err)?;
            let header = entry.header();
            let entry_type = header.entry_type();
            if !entry_type.is_file() && !entry_type.is_gnu_sparse() {
                continue;
            }

            let info = TarEntryInfo {
                offset: entry.raw_file_position(),
                size: entry.size(),
                mode: header.mode().map_err(io_err)?,
                uid: header.uid().map_err(io_err)?,
                gid: header.gid().map_err(io_err)?,
                sparse: entry_type.is_gnu_sparse(),
            };
            let path = entry.path().map_err(io_err)?;
            index.insert(normalize_entry_path(&path), info);
        }

        Ok(index)
    }

    fn entry_info(&self, archive: &ArchiveInfo, path: &str) -> SourceResult<TarEntryInfo> {
        if !self.index.borrow().contains_key(archive.name()) {
            let index = self.build_index(archive)?;
            self.index
                .borrow_mut()
                .insert(archive.name().to_string(), index);
        }

        self.index
            .borrow()
            .get(archive.name())
            .and_then(|index| index.get(Path::new(path)).copied())
            .ok_or_else(|| SourceError::ObjectNotFound {
                archive: archive.name().to_string(),
                path: path.to_string(),
            })
    }

    /// Reads a sparse entry through the tar reader, which expands holes.
    fn read_sparse(&self, archive: &ArchiveInfo, path: &str) -> SourceResult<Vec<u8>> {
        let tar_path = self.tar_path(archive);
        let io_err = |e: io::Error| SourceError::io(&tar_path, e);

        let file = File::open(&tar_path).map_err(io_err)?;
        let mut tar = tar::Archive::new(file);
        let mut found = None;
        for entry in tar.entries().map_err(io_err)? {
            let mut entry = entry.map_err(io_err)?;
            let matches = normalize_entry_path(&entry.path().map_err(io_err)?) == Path::new(path);
            if matches {
                let size = entry.size();
                found = Some(read_capped(&mut entry, size).map_err(io_err)?);
            }
        }

        found.ok_or_else(|| SourceError::ObjectNotFound {
            archive: archive.name().to_string(),
            path: path.to_string(),
        })
    }
}

impl ArchiveSource for TarSource {
    fn read_content(&self, archive: &ArchiveInfo, path: &str) -> SourceResult<Vec<u8>> {
        let info = self.entry_info(archive, path)?;
        if info.sparse {
            return self.read_sparse(archive, path);
        }

        let tar_path = self.tar_path(archive);
        let io_err = |e: io::Error| SourceError::io(&tar_path, e);
        let mut file = File::open(&tar_path).map_err(io_err)?;
        file.seek(SeekFrom::Start(info.offset)).map_err(io_err)?;
        read_capped(&mut file, info.size).map_err(io_err)
    }

    fn read_metadata(&self, archive: &ArchiveInfo, path: &str) -> SourceResult<ObjectMetadata> {
        let info = self.entry_info(archive, path)?;

        let narrow = |id: u64| {
            u32::try_from(id).map_err(|_| SourceError::InvalidMetadata {
                archive: archive.name().to_string(),
                reason: format!("id {} of '{}' exceeds 32 bits", id, path),
            })
        };

        Ok(ObjectMetadata {
            mode: info.mode,
            uid: narrow(info.uid)?,
            gid: narrow(info.gid)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::ChainRegistry;
    use chrono::Utc;
    use tempfile::TempDir;

    fn registry() -> ChainRegistry {
        let mut registry = ChainRegistry::new();
        registry.register("full", Utc::now()).unwrap();
        registry
    }

    #[test]
    fn test_directory_source_reads_content_and_meta() {
        let dir = TempDir::new().unwrap();
        let data = dir.path().join("full").join(DATA_DIR).join("etc");
        fs::create_dir_all(&data).unwrap();
        fs::write(data.join("hosts"), b"127.0.0.1 localhost\n").unwrap();
        fs::write(
            dir.path().join("full").join(META_FILE),
            r#"{"etc/hosts":{"mode":420,"uid":0,"gid":0}}"#,
        )
        .unwrap();

        let registry = registry();
        let full = registry.latest().unwrap();
        let source = DirectorySource::new(dir.path());

        assert_eq!(
            source.read_content(full, "etc/hosts").unwrap(),
            b"127.0.0.1 localhost\n"
        );
        assert_eq!(
            source.read_metadata(full, "etc/hosts").unwrap(),
            ObjectMetadata {
                mode: 0o644,
                uid: 0,
                gid: 0
            }
        );
    }

    #[test]
    fn test_directory_source_missing_object() {
        let dir = TempDir::new().unwrap();
        let registry = registry();
        let source = DirectorySource::new(dir.path());

        let err = source
            .read_content(registry.latest().unwrap(), "etc/hosts")
            .unwrap_err();
        assert!(matches!(err, SourceError::ObjectNotFound { .. }));

        let err = source
            .read_metadata(registry.latest().unwrap(), "etc/hosts")
            .unwrap_err();
        assert!(matches!(err, SourceError::MetadataNotFound { .. }));
    }

    #[test]
    fn test_tar_source_reads_entry_and_header() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("full")).unwrap();

        let file = File::create(dir.path().join("full").join(DATA_TAR)).unwrap();
        let mut builder = tar::Builder::new(file);
        let body = b"export PATH=/bin\n";
        let mut header = tar::Header::new_gnu();
        header.set_size(body.len() as u64);
        header.set_mode(0o600);
        header.set_uid(1000);
        header.set_gid(100);
        header.set_cksum();
        builder
            .append_data(&mut header, "home/user/.profile", &body[..])
            .unwrap();
        builder.finish().unwrap();
        drop(builder);

        let registry = registry();
        let full = registry.latest().unwrap();
        let source = TarSource::new(dir.path());

        assert_eq!(source.read_content(full, "home/user/.profile").unwrap(), body);
        assert_eq!(
            source.read_metadata(full, "home/user/.profile").unwrap(),
            ObjectMetadata {
                mode: 0o600,
                uid: 1000,
                gid: 100
            }
        );
        assert!(matches!(
            source.read_content(full, "home/user/.bashrc").unwrap_err(),
            SourceError::ObjectNotFound { .. }
        ));
    }

    fn append_raw(builder: &mut tar::Builder<File>, name: &str, body: &[u8], mode: u32) {
        let mut header = tar::Header::new_gnu();
        header.as_old_mut().name[..name.len()].copy_from_slice(name.as_bytes());
        header.set_entry_type(tar::EntryType::Regular);
        header.set_size(body.len() as u64);
        header.set_mode(mode);
        header.set_uid(0);
        header.set_gid(0);
        header.set_cksum();
        builder.append(&header, body).unwrap();
    }

    #[test]
    fn test_tar_source_strips_leading_curdir() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("full")).unwrap();

        let file = File::create(dir.path().join("full").join(DATA_TAR)).unwrap();
        let mut builder = tar::Builder::new(file);
        append_raw(&mut builder, "./etc/motd", b"hello\n", 0o644);
        append_raw(&mut builder, "./etc/hosts", b"127.0.0.1 localhost\n", 0o640);
        builder.finish().unwrap();
        drop(builder);

        let registry = registry();
        let full = registry.latest().unwrap();
        let source = TarSource::new(dir.path());

        assert_eq!(source.read_content(full, "etc/hosts").unwrap(), b"127.0.0.1 localhost\n");
        assert_eq!(source.read_content(full, "etc/motd").unwrap(), b"hello\n");
        assert_eq!(source.read_metadata(full, "etc/hosts").unwrap().mode, 0o640);
    }

    #[test]
    fn test_tar_source_later_entry_wins_and_index_reused() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("full")).unwrap();
        let tar_path = dir.path().join("full").join(DATA_TAR);

        let file = File::create(&tar_path).unwrap();
        let mut builder = tar::Builder::new(file);
        append_raw(&mut builder, "etc/hosts", b"old", 0o600);
        append_raw(&mut builder, "etc/hosts", b"new body", 0o644);
        builder.finish().unwrap();
        drop(builder);

        let registry = registry();
        let full = registry.latest().unwrap();
        let source = TarSource::new(dir.path());

        assert_eq!(source.read_metadata(full, "etc/hosts").unwrap().mode, 0o644);
        // answered from the index built by the first read
        assert!(matches!(
            source.read_metadata(full, "etc/passwd").unwrap_err(),
            SourceError::ObjectNotFound { .. }
        ));
        assert_eq!(source.read_content(full, "etc/hosts").unwrap(), b"new body");
    }

    #[test]
    fn test_tar_source_truncated_entry_is_error() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("full")).unwrap();
        let tar_path = dir.path().join("full").join(DATA_TAR);

        let file = File::create(&tar_path).unwrap();
        let mut builder = tar::Builder::new(file);
        append_raw(&mut builder, "var/blob", &[7u8; 2048], 0o644);
        builder.finish().unwrap();
        drop(builder);

        let registry = registry();
        let full = registry.latest().unwrap();
        let source = TarSource::new(dir.path());
        source.read_metadata(full, "var/blob").unwrap();

        // cut the data short after the index is built
        let file = fs::OpenOptions::new().write(true).open(&tar_path).unwrap();
        file.set_len(512 + 1000).unwrap();

        assert!(matches!(
            source.read_content(full, "var/blob").unwrap_err(),
            SourceError::Io { .. }
        ));
    }
}
