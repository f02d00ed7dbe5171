//! System hosts file read, projection, and backups.

use std::borrow::Cow;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::config::{DataPaths, SystemConfig};
use crate::error::{Error, Result};
use crate::lock::DirLock;
use crate::merge;
use crate::platform::HostsEditor;
use crate::store::GroupRepository;

/// Snapshot of the system hosts file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostsFile {
    pub path: PathBuf,
    pub content: Vec<u8>,
}

impl HostsFile {
    /// Content for display; undecodable bytes become U+FFFD.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }
}

/// What happened to the automatic backup during a write. Never an error for
/// the write itself.
#[derive(Debug)]
pub enum BackupOutcome {
    /// Auto-backup is off, or nothing was written.
    Skipped,
    Written(PathBuf),
    Failed(Error),
}

impl BackupOutcome {
    pub fn path(&self) -> Option<&Path> {
        match self {
            BackupOutcome::Written(p) => Some(p),
            _ => None,
        }
    }
}

/// Result of projecting state onto the system hosts file.
#[derive(Debug)]
pub struct Projection {
    pub path: PathBuf,
    /// False when the file already had the merged content.
    pub changed: bool,
    pub backup: BackupOutcome,
}

/// Read the system hosts file.
pub fn get_system_hosts(editor: &dyn HostsEditor) -> Result<HostsFile> {
    let content = editor.read()?;
    Ok(HostsFile {
        path: editor.path().to_path_buf(),
        content,
    })
}

/// Merge active groups into the current hosts content and write the result,
/// backing up the previous content first when `auto_backup` is on.
pub fn update_system_hosts(
    editor: &dyn HostsEditor,
    lock: &DirLock,
    paths: &DataPaths,
    config: &SystemConfig,
    groups: &GroupRepository,
) -> Result<Projection> {
    debug_assert!(lock.guards(&paths.data_dir));
    let current = editor.read()?;
    let merged = merge::merge(&current, groups.list(), config.hosts_mode);
    if merged == current {
        tracing::debug!(path = %editor.path().display(), "hosts file already up to date");
        return Ok(Projection {
            path: editor.path().to_path_buf(),
            changed: false,
            backup: BackupOutcome::Skipped,
        });
    }
    replace_with(editor, paths, config, &current, &merged)
}

/// Back up the current hosts content regardless of `auto_backup`.
pub fn backup_system_hosts(
    editor: &dyn HostsEditor,
    lock: &DirLock,
    paths: &DataPaths,
    config: &SystemConfig,
) -> Result<PathBuf> {
    debug_assert!(lock.guards(&paths.data_dir));
    let current = editor.read()?;
    let path = write_backup(&config.backup_dir(paths), &current)?;
    tracing::info!(backup = %path.display(), "hosts file backed up");
    Ok(path)
}

/// Replace the system hosts file with the content of `backup`.
pub fn restore_backup(
    editor: &dyn HostsEditor,
    lock: &DirLock,
    paths: &DataPaths,
    config: &SystemConfig,
    backup: &Path,
) -> Result<Projection> {
    debug_assert!(lock.guards(&paths.data_dir));
    let restored = fs::read(backup).map_err(|e| Error::persistence("read backup", backup, e))?;
    let current = editor.read()?;
    let projection = replace_with(editor, paths, config, &current, &restored)?;
    tracing::info!(backup = %backup.display(), "hosts file restored");
    Ok(projection)
}

/// Backups in the configured folder, oldest first.
pub fn list_backups(paths: &DataPaths, config: &SystemConfig) -> Result<Vec<PathBuf>> {
    let dir = config.backup_dir(paths);
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let err = |e| Error::persistence("list backups", &dir, e);
    let mut out = Vec::new();
    for entry in fs::read_dir(&dir).map_err(err)? {
        let entry = entry.map_err(err)?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with("hosts-") && name.ends_with(".bak") {
            out.push(entry.path());
        }
    }
    out.sort();
    Ok(out)
}

/// Write a new timestamped backup file into `dir`.
pub fn write_backup(dir: &Path, content: &[u8]) -> Result<PathBuf> {
    fs::create_dir_all(dir).map_err(|e| Error::persistence("write backup", dir, e))?;
    let stamp = Local::now().format("%Y%m%d-%H%M%S-%3f");
    let mut attempt = 0u32;
    loop {
        let name = if attempt == 0 {
            format!("hosts-{stamp}.bak")
        } else {
            format!("hosts-{stamp}-{attempt}.bak")
        };
        let path = dir.join(name);
        match fs::OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                file.write_all(content)
                    .and_then(|_| file.sync_all())
                    .map_err(|e| Error::persistence("write backup", &path, e))?;
                return Ok(path);
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists && attempt < 100 => attempt += 1,
            Err(e) => return Err(Error::persistence("write backup", &path, e)),
        }
    }
}

fn replace_with(
    editor: &dyn HostsEditor,
    paths: &DataPaths,
    config: &SystemConfig,
    current: &[u8],
    next: &[u8],
) -> Result<Projection> {
    let backup = if config.auto_backup {
        match write_backup(&config.backup_dir(paths), current) {
            Ok(p) => {
                tracing::debug!(backup = %p.display(), "hosts file backed up");
                BackupOutcome::Written(p)
            }
            Err(e) => {
                tracing::warn!(error = %e, "hosts backup failed, writing anyway");
                BackupOutcome::Failed(e)
            }
        }
    } else {
        BackupOutcome::Skipped
    };
    editor.write(next)?;
    tracing::info!(path = %editor.path().display(), "hosts file written");
    Ok(Projection {
        path: editor.path().to_path_buf(),
        changed: true,
        backup,
    })
}
