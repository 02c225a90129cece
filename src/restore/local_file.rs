//! Local file capability used by the restore engine
//!
//! `LocalFile` is the narrow set of operations a restore performs on a
//! target file. `LocalFileTarget` implements it over `std::fs`.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// Operations the restore engine needs on a target file.
pub trait LocalFile {
    /// Appends `data` at the current position.
    fn write_all(&mut self, data: &[u8]) -> io::Result<()>;

    /// Current size in bytes.
    fn size(&self) -> io::Result<u64>;

    /// Flushes data and metadata to stable storage.
    fn sync(&mut self) -> io::Result<()>;

    /// Applies permission bits.
    fn set_permissions(&mut self, mode: u32) -> io::Result<()>;

    /// Changes owner and group.
    fn set_ownership(&mut self, uid: u32, gid: u32) -> io::Result<()>;
}

/// How an existing file at the target path is treated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OpenMode {
    /// Fail with `AlreadyExists` instead of opening an existing file
    pub fail_if_exists: bool,
    /// Truncate an existing file on open
    pub erase: bool,
}

impl OpenMode {
    /// Create a new file; never touch an existing one.
    pub fn create_new() -> Self {
        Self {
            fail_if_exists: true,
            erase: false,
        }
    }

    /// Create the file, or empty it if it exists.
    pub fn replace() -> Self {
        Self {
            fail_if_exists: false,
            erase: true,
        }
    }
}

/// A target file on the local filesystem.
#[derive(Debug)]
pub struct LocalFileTarget {
    file: File,
}

impl LocalFileTarget {
    /// Opens `path` for writing according to `mode`.
    pub fn open(path: &Path, mode: OpenMode) -> io::Result<Self> {
        let mut options = OpenOptions::new();
        options.write(true);
        if mode.fail_if_exists {
            options.create_new(true);
        } else {
            options.create(true).truncate(mode.erase);
        }

        Ok(Self {
            file: options.open(path)?,
        })
    }
}

impl LocalFile for LocalFileTarget {
    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.file.write_all(data)
    }

    fn size(&self) -> io::Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    fn sync(&mut self) -> io::Result<()> {
        self.file.sync_all()
    }

    #[cfg(unix)]
    fn set_permissions(&mut self, mode: u32) -> io::Result<()> {
        use std::os::unix::fs::PermissionsExt;
        self.file
            .set_permissions(std::fs::Permissions::from_mode(mode & 0o7777))
    }

    #[cfg(not(unix))]
    fn set_permissions(&mut self, mode: u32) -> io::Result<()> {
        let mut permissions = self.file.metadata()?.permissions();
        permissions.set_readonly(mode & 0o222 == 0);
        self.file.set_permissions(permissions)
    }

    #[cfg(unix)]
    fn set_ownership(&mut self, uid: u32, gid: u32) -> io::Result<()> {
        std::os::unix::fs::fchown(&self.file, Some(uid), Some(gid))
    }

    #[cfg(not(unix))]
    fn set_ownership(&mut self, _uid: u32, _gid: u32) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "ownership is not supported on this platform",
        ))
    }
}
