//! Data directory relocation.
//!
//! The whole data directory is copied to the new place and re-opened there
//! before anything is swapped. Until the swap the caller's workspace is never
//! touched, so every failure leaves the old directory and in-memory state
//! authoritative.

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::config::{self, DataPaths, LOCATION_FILE};
use crate::error::{Error, Result};
use crate::hosts::{self, Projection};
use crate::lock::{DirLock, LOCK_FILE};
use crate::platform::HostsEditor;
use crate::service::Workspace;
use crate::store::GroupRepository;

/// Outcome of a relocation.
#[derive(Debug)]
pub struct Relocation {
    pub from: PathBuf,
    pub to: PathBuf,
    /// False when the target already was the data directory.
    pub moved: bool,
    /// Best-effort re-projection after the move; `None` when nothing moved.
    pub reprojection: Option<Result<Projection>>,
}

/// Move the data directory of `ws` to `new_path`.
///
/// `lock` must guard the current data directory; the new directory is locked
/// here for the whole copy-and-swap.
pub fn relocate(
    root: &Path,
    ws: &mut Workspace,
    lock: &DirLock,
    new_path: &Path,
    editor: &dyn HostsEditor,
) -> Result<Relocation> {
    let old_dir = absolute(&ws.paths.data_dir)?;
    let new_dir = absolute(new_path)?;
    debug_assert!(lock.guards(&ws.paths.data_dir));

    if same_dir(&old_dir, &new_dir) {
        tracing::debug!(dir = %old_dir.display(), "data location unchanged");
        return Ok(Relocation {
            from: old_dir.clone(),
            to: old_dir,
            moved: false,
            reprojection: None,
        });
    }
    if inside(&new_dir, &old_dir) {
        return Err(Error::validation(
            "dataDir",
            new_dir.display(),
            "must not be inside the current data directory",
        ));
    }

    let next = match prepare(root, ws, &old_dir, &new_dir) {
        Ok(next) => next,
        Err(e) => {
            tracing::warn!(
                from = %old_dir.display(),
                to = %new_dir.display(),
                error = %e,
                "relocation aborted, keeping current data directory"
            );
            return Err(e);
        }
    };
    let (next_ws, new_lock) = next;
    *ws = next_ws;
    tracing::info!(from = %old_dir.display(), to = %new_dir.display(), "data directory relocated");

    let reprojection =
        hosts::update_system_hosts(editor, &new_lock, &ws.paths, &ws.config, &ws.groups);
    if let Err(e) = &reprojection {
        tracing::warn!(error = %e, "hosts file not updated after relocation");
    }

    Ok(Relocation {
        from: old_dir,
        to: new_dir,
        moved: true,
        reprojection: Some(reprojection),
    })
}

/// Copy, reopen and persist at the new location without touching `ws`.
fn prepare(
    root: &Path,
    ws: &Workspace,
    old_dir: &Path,
    new_dir: &Path,
) -> Result<(Workspace, DirLock)> {
    fs::create_dir_all(new_dir)
        .map_err(|e| Error::persistence("create data directory", new_dir, e))?;
    let new_lock = DirLock::exclusive(new_dir)?;

    copy_dir(old_dir, new_dir, true)?;

    let paths = DataPaths::from_base(new_dir.to_path_buf());
    let groups = GroupRepository::open(&paths)?;
    let config = ws.config.clone();
    config.save(&paths, &new_lock)?;
    config::write_location(root, new_dir)?;

    Ok((
        Workspace {
            paths,
            config,
            groups,
        },
        new_lock,
    ))
}

/// Recursively copy `src` into `dst`, keeping permissions. The lock file and,
/// at the top level, the location pointer are not copied.
pub fn copy_dir(src: &Path, dst: &Path, top: bool) -> Result<()> {
    let op = "copy data directory";
    let meta = fs::metadata(src).map_err(|e| Error::persistence(op, src, e))?;
    fs::create_dir_all(dst).map_err(|e| Error::persistence(op, dst, e))?;

    for entry in fs::read_dir(src).map_err(|e| Error::persistence(op, src, e))? {
        let entry = entry.map_err(|e| Error::persistence(op, src, e))?;
        let name = entry.file_name();
        if name == LOCK_FILE || (top && name == LOCATION_FILE) {
            continue;
        }
        let from = entry.path();
        let to = dst.join(&name);
        let file_type = entry.file_type().map_err(|e| Error::persistence(op, &from, e))?;
        if file_type.is_dir() {
            copy_dir(&from, &to, false)?;
        } else {
            // fs::copy carries the permission bits over.
            fs::copy(&from, &to).map_err(|e| Error::persistence(op, &to, e))?;
        }
    }

    fs::set_permissions(dst, meta.permissions()).map_err(|e| Error::persistence(op, dst, e))
}

/// Absolute form of `path` with `.` and `..` resolved lexically, so targets
/// that do not exist yet compare correctly.
fn absolute(path: &Path) -> Result<PathBuf> {
    let abs = std::path::absolute(path)
        .map_err(|e| Error::validation("dataDir", path.display(), &e.to_string()))?;
    let mut out = PathBuf::new();
    for component in abs.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    Ok(out)
}

fn same_dir(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Whether `path` is `dir` or below it.
fn inside(path: &Path, dir: &Path) -> bool {
    let canonical = |p: &Path| fs::canonicalize(p).unwrap_or_else(|_| p.to_path_buf());
    path.starts_with(dir) || canonical(path).starts_with(canonical(dir))
}
