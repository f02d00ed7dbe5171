//! Data store operations: atomic file replacement and the group repository.

use std::collections::BTreeSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;

use crate::config::DataPaths;
use crate::error::{Error, Result};
use crate::group::HostGroup;
use crate::lock::DirLock;

/// Ensure the data directory exists.
pub fn ensure_dirs(paths: &DataPaths) -> Result<()> {
    fs::create_dir_all(&paths.data_dir)
        .map_err(|e| Error::persistence("create data directory", &paths.data_dir, e))
}

/// Replace `path` with `bytes` via a temp file in the same directory and a
/// rename, so readers see either the old or the new content. Existing
/// permissions carry over to the new file.
pub(crate) fn replace_file(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;
    let mut tmp = tempfile::Builder::new()
        .prefix(".hostswitch-")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    if let Ok(meta) = fs::metadata(path) {
        tmp.as_file().set_permissions(meta.permissions())?;
    }
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Serialize `value` as pretty JSON and replace `path` atomically.
pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T, op: &'static str) -> Result<()> {
    let mut s = serde_json::to_string_pretty(value)
        .map_err(|e| Error::persistence(op, path, io::Error::other(e)))?;
    s.push('\n');
    replace_file(path, s.as_bytes()).map_err(|e| Error::persistence(op, path, e))
}

/// The persisted group collection. Insertion order is list order.
#[derive(Debug, Clone)]
pub struct GroupRepository {
    data_dir: PathBuf,
    path: PathBuf,
    groups: Vec<HostGroup>,
}

impl GroupRepository {
    /// Load groups.json; empty when absent, `Error::Parse` when malformed.
    pub fn open(paths: &DataPaths) -> Result<Self> {
        let groups = if paths.groups_file.is_file() {
            let s = fs::read_to_string(&paths.groups_file)
                .map_err(|e| Error::persistence("load groups", &paths.groups_file, e))?;
            serde_json::from_str(&s).map_err(|source| Error::Parse {
                path: paths.groups_file.clone(),
                source,
            })?
        } else {
            Vec::new()
        };
        Ok(Self {
            data_dir: paths.data_dir.clone(),
            path: paths.groups_file.clone(),
            groups,
        })
    }

    pub fn list(&self) -> &[HostGroup] {
        &self.groups
    }

    pub fn active(&self) -> impl Iterator<Item = &HostGroup> {
        self.groups.iter().filter(|g| g.is_active)
    }

    pub fn get(&self, id: &str) -> Result<&HostGroup> {
        self.groups
            .iter()
            .find(|g| g.id == id)
            .ok_or_else(|| Error::not_found("get group", id))
    }

    pub fn create(
        &mut self,
        lock: &DirLock,
        title: &str,
        content: &str,
        is_remote: bool,
        remote_url: Option<String>,
    ) -> Result<HostGroup> {
        debug_assert!(lock.guards(&self.data_dir));
        let mut group = HostGroup::new(title, content, is_remote, remote_url, Utc::now());
        while self.groups.iter().any(|g| g.id == group.id) {
            group.id = uuid::Uuid::new_v4().to_string();
        }
        let mut next = self.groups.clone();
        next.push(group.clone());
        self.commit(next, "create group")?;
        tracing::info!(id = %group.id, title = %group.title, "group created");
        Ok(group)
    }

    pub fn update(
        &mut self,
        lock: &DirLock,
        id: &str,
        title: &str,
        content: &str,
        is_active: bool,
    ) -> Result<()> {
        self.edit(lock, "update group", id, |g| {
            g.title = title.to_string();
            g.content = content.to_string();
            g.is_active = is_active;
        })
    }

    pub fn toggle(&mut self, lock: &DirLock, id: &str) -> Result<()> {
        self.edit(lock, "toggle group", id, |g| g.is_active = !g.is_active)
    }

    /// Replace the tag set.
    pub fn set_tags<I, S>(&mut self, lock: &DirLock, id: &str, tags: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tags: BTreeSet<String> = tags
            .into_iter()
            .map(Into::into)
            .filter(|t: &String| !t.trim().is_empty())
            .collect();
        self.edit(lock, "tag group", id, |g| g.tags = tags)
    }

    /// Set or clear the advisory parent reference.
    pub fn set_parent(&mut self, lock: &DirLock, id: &str, parent: Option<&str>) -> Result<()> {
        let parent = parent.filter(|p| !p.is_empty()).map(String::from);
        self.edit(lock, "set group parent", id, |g| g.parent = parent)
    }

    /// Remove a group. Children pointing at it through `parent` are left as is.
    pub fn delete(&mut self, lock: &DirLock, id: &str) -> Result<()> {
        debug_assert!(lock.guards(&self.data_dir));
        let pos = self
            .groups
            .iter()
            .position(|g| g.id == id)
            .ok_or_else(|| Error::not_found("delete group", id))?;
        let mut next = self.groups.clone();
        next.remove(pos);
        self.commit(next, "delete group")?;
        tracing::info!(id, "group deleted");
        Ok(())
    }

    fn edit(
        &mut self,
        lock: &DirLock,
        op: &'static str,
        id: &str,
        f: impl FnOnce(&mut HostGroup),
    ) -> Result<()> {
        debug_assert!(lock.guards(&self.data_dir));
        let pos = self
            .groups
            .iter()
            .position(|g| g.id == id)
            .ok_or_else(|| Error::not_found(op, id))?;
        let mut next = self.groups.clone();
        f(&mut next[pos]);
        next[pos].touch(Utc::now());
        self.commit(next, op)?;
        tracing::info!(id, op, "group updated");
        Ok(())
    }

    /// Persist `next` wholesale; memory only changes once the write succeeded.
    fn commit(&mut self, next: Vec<HostGroup>, op: &'static str) -> Result<()> {
        write_json(&self.path, &next, op)?;
        self.groups = next;
        Ok(())
    }
}
