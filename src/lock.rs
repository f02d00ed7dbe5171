//! Directory-scoped advisory lock.
//!
//! One `DirLock` is taken by the service per mutating sequence and handed to
//! the repository, config store and writer by reference. Components never
//! lock on their own.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::error::{Error, Result};

/// Lock file name inside the data directory.
pub const LOCK_FILE: &str = ".hostswitch.lock";

/// Exclusive lock on a data directory, released on drop.
#[derive(Debug)]
pub struct DirLock {
    dir: PathBuf,
    file: File,
}

impl DirLock {
    /// Block until the exclusive lock on `dir` is held. Creates `dir` if needed.
    pub fn exclusive(dir: &Path) -> Result<Self> {
        let lock_path = dir.join(LOCK_FILE);
        let err = |source| Error::Lock {
            path: lock_path.clone(),
            source,
        };
        fs::create_dir_all(dir).map_err(err)?;
        let file = fs::OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(err)?;
        file.lock_exclusive().map_err(err)?;
        tracing::trace!(dir = %dir.display(), "data directory locked");
        Ok(Self {
            dir: dir.to_path_buf(),
            file,
        })
    }

    /// Directory this lock guards.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub(crate) fn guards(&self, dir: &Path) -> bool {
        self.dir == dir
    }
}

impl Drop for DirLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
