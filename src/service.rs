//! Top-level service: the single owned state plus the lock discipline.

use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::config::{DataPaths, HostsMode, SystemConfig};
use crate::error::Result;
use crate::group::HostGroup;
use crate::hosts::{self, HostsFile, Projection};
use crate::lock::DirLock;
use crate::migrate::{self, Relocation};
use crate::platform::{self, HostsEditor};
use crate::store::{self, GroupRepository};

/// Everything persisted in one data directory, held in memory.
#[derive(Debug)]
pub struct Workspace {
    pub paths: DataPaths,
    pub config: SystemConfig,
    pub groups: GroupRepository,
}

impl Workspace {
    /// Create the directory if needed and load config and groups.
    pub fn open(paths: DataPaths) -> Result<Self> {
        store::ensure_dirs(&paths)?;
        let config = SystemConfig::load(&paths)?;
        let groups = GroupRepository::open(&paths)?;
        Ok(Self {
            paths,
            config,
            groups,
        })
    }
}

/// Entry point for every operation. Reads share the state lock; mutations
/// hold it exclusively together with the data directory lock, which is then
/// handed down to the components.
pub struct HostsService {
    root: PathBuf,
    state: RwLock<Workspace>,
    editor: Box<dyn HostsEditor>,
}

impl HostsService {
    /// Open the data directory `root` points at.
    pub fn open(root: impl Into<PathBuf>, editor: Box<dyn HostsEditor>) -> Result<Self> {
        let root = root.into();
        let paths = DataPaths::resolve(&root)?;
        let ws = Workspace::open(paths)?;
        tracing::debug!(
            root = %root.display(),
            data_dir = %ws.paths.data_dir.display(),
            groups = ws.groups.list().len(),
            "workspace opened"
        );
        Ok(Self {
            root,
            state: RwLock::new(ws),
            editor,
        })
    }

    /// Default root (HOSTSWITCH_HOME or the platform data dir) and hosts file.
    pub fn open_default() -> Result<Self> {
        Self::open(DataPaths::default_root(), platform::default_hosts_editor())
    }

    fn read(&self) -> RwLockReadGuard<'_, Workspace> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Workspace> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn data_location(&self) -> PathBuf {
        self.read().paths.data_dir.clone()
    }

    pub fn paths(&self) -> DataPaths {
        self.read().paths.clone()
    }

    pub fn list_groups(&self) -> Vec<HostGroup> {
        self.read().groups.list().to_vec()
    }

    pub fn get_group(&self, id: &str) -> Result<HostGroup> {
        self.read().groups.get(id).cloned()
    }

    pub fn create_group(
        &self,
        title: &str,
        content: &str,
        is_remote: bool,
        remote_url: Option<&str>,
    ) -> Result<HostGroup> {
        let mut ws = self.write();
        let lock = DirLock::exclusive(&ws.paths.data_dir)?;
        ws.groups
            .create(&lock, title, content, is_remote, remote_url.map(String::from))
    }

    pub fn update_group(
        &self,
        id: &str,
        title: &str,
        content: &str,
        is_active: bool,
    ) -> Result<()> {
        let mut ws = self.write();
        let lock = DirLock::exclusive(&ws.paths.data_dir)?;
        ws.groups.update(&lock, id, title, content, is_active)
    }

    /// Delete a group. The hosts file is not re-projected.
    pub fn delete_group(&self, id: &str) -> Result<()> {
        let mut ws = self.write();
        let lock = DirLock::exclusive(&ws.paths.data_dir)?;
        ws.groups.delete(&lock, id)
    }

    pub fn toggle_group(&self, id: &str) -> Result<()> {
        let mut ws = self.write();
        let lock = DirLock::exclusive(&ws.paths.data_dir)?;
        ws.groups.toggle(&lock, id)
    }

    pub fn set_group_tags(&self, id: &str, tags: &[String]) -> Result<()> {
        let mut ws = self.write();
        let lock = DirLock::exclusive(&ws.paths.data_dir)?;
        ws.groups.set_tags(&lock, id, tags.iter().cloned())
    }

    pub fn set_group_parent(&self, id: &str, parent: Option<&str>) -> Result<()> {
        let mut ws = self.write();
        let lock = DirLock::exclusive(&ws.paths.data_dir)?;
        ws.groups.set_parent(&lock, id, parent)
    }

    pub fn config(&self) -> SystemConfig {
        self.read().config.clone()
    }

    /// Validate and persist `config`; the in-memory copy changes only on success.
    pub fn save_config(&self, config: SystemConfig) -> Result<()> {
        let mut ws = self.write();
        let lock = DirLock::exclusive(&ws.paths.data_dir)?;
        config.save(&ws.paths, &lock)?;
        ws.config = config;
        Ok(())
    }

    /// Switch the merge mode and re-project the hosts file with it.
    pub fn set_hosts_mode(&self, mode: &str) -> Result<Projection> {
        let mode: HostsMode = mode.parse()?;
        let mut ws = self.write();
        let lock = DirLock::exclusive(&ws.paths.data_dir)?;
        let mut config = ws.config.clone();
        config.hosts_mode = mode;
        config.save(&ws.paths, &lock)?;
        ws.config = config;
        tracing::info!(%mode, "hosts mode changed");
        hosts::update_system_hosts(self.editor.as_ref(), &lock, &ws.paths, &ws.config, &ws.groups)
    }

    pub fn get_system_hosts(&self) -> Result<HostsFile> {
        hosts::get_system_hosts(self.editor.as_ref())
    }

    /// Project the active groups onto the system hosts file.
    pub fn update_system_hosts(&self) -> Result<Projection> {
        let ws = self.write();
        let lock = DirLock::exclusive(&ws.paths.data_dir)?;
        hosts::update_system_hosts(self.editor.as_ref(), &lock, &ws.paths, &ws.config, &ws.groups)
    }

    pub fn backup_system_hosts(&self) -> Result<PathBuf> {
        let ws = self.write();
        let lock = DirLock::exclusive(&ws.paths.data_dir)?;
        hosts::backup_system_hosts(self.editor.as_ref(), &lock, &ws.paths, &ws.config)
    }

    pub fn list_backups(&self) -> Result<Vec<PathBuf>> {
        let ws = self.read();
        hosts::list_backups(&ws.paths, &ws.config)
    }

    pub fn restore_backup(&self, backup: &Path) -> Result<Projection> {
        let ws = self.write();
        let lock = DirLock::exclusive(&ws.paths.data_dir)?;
        hosts::restore_backup(self.editor.as_ref(), &lock, &ws.paths, &ws.config, backup)
    }

    /// Relocate the data directory. All-or-nothing up to the final
    /// best-effort re-projection.
    pub fn set_data_location(&self, new_path: &Path) -> Result<Relocation> {
        let mut ws = self.write();
        let lock = DirLock::exclusive(&ws.paths.data_dir)?;
        migrate::relocate(&self.root, &mut ws, &lock, new_path, self.editor.as_ref())
    }
}
