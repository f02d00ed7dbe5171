//! Configuration loading and path resolution.
//!
//! Supports HOSTSWITCH_HOME env var override for testing.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::lock::DirLock;
use crate::store;

/// File in the root directory that redirects to a relocated data directory.
pub const LOCATION_FILE: &str = "location.json";

/// Paths for a hostswitch data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    pub data_dir: PathBuf,
    pub config_file: PathBuf,
    pub groups_file: PathBuf,
    pub backups_dir: PathBuf,
}

impl DataPaths {
    /// Build paths from base directory.
    pub fn from_base(base: PathBuf) -> Self {
        let config_file = base.join("config.json");
        let groups_file = base.join("groups.json");
        let backups_dir = base.join("backups");
        Self {
            data_dir: base,
            config_file,
            groups_file,
            backups_dir,
        }
    }

    /// Paths for testing: use a temp dir as base.
    pub fn for_test(base: impl AsRef<Path>) -> Self {
        Self::from_base(base.as_ref().to_path_buf())
    }

    /// Root directory (respects HOSTSWITCH_HOME).
    pub fn default_root() -> PathBuf {
        if let Ok(home) = std::env::var("HOSTSWITCH_HOME") {
            PathBuf::from(home)
        } else if let Some(dirs) =
            directories::ProjectDirs::from("io", "hostswitch", "hostswitch")
        {
            dirs.data_dir().to_path_buf()
        } else {
            PathBuf::from(".hostswitch")
        }
    }

    /// Active data directory under `root`: the location pointer if one was
    /// written by a relocation, else the root itself.
    pub fn resolve(root: &Path) -> Result<Self> {
        match read_location(root)? {
            Some(dir) => Ok(Self::from_base(dir)),
            None => Ok(Self::from_base(root.to_path_buf())),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LocationPointer {
    data_dir: PathBuf,
}

/// Read the relocation pointer in `root`, if any.
pub fn read_location(root: &Path) -> Result<Option<PathBuf>> {
    let path = root.join(LOCATION_FILE);
    if !path.is_file() {
        return Ok(None);
    }
    let s = fs::read_to_string(&path)
        .map_err(|e| Error::persistence("read location pointer", &path, e))?;
    let pointer: LocationPointer =
        serde_json::from_str(&s).map_err(|source| Error::Parse { path, source })?;
    Ok(Some(pointer.data_dir))
}

/// Point `root` at `data_dir` for future runs.
pub fn write_location(root: &Path, data_dir: &Path) -> Result<()> {
    let path = root.join(LOCATION_FILE);
    let pointer = LocationPointer {
        data_dir: data_dir.to_path_buf(),
    };
    store::write_json(&path, &pointer, "write location pointer")
}

/// Merge policy for the system hosts file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostsMode {
    /// Keep the existing file and own a marker-delimited block inside it.
    #[default]
    Append,
    /// Replace the whole file with the active groups.
    Exclusive,
}

impl HostsMode {
    pub fn as_str(self) -> &'static str {
        match self {
            HostsMode::Append => "append",
            HostsMode::Exclusive => "exclusive",
        }
    }
}

impl fmt::Display for HostsMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HostsMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "append" => Ok(HostsMode::Append),
            "exclusive" => Ok(HostsMode::Exclusive),
            other => Err(Error::validation(
                "hostsMode",
                other,
                "expected 'append' or 'exclusive'",
            )),
        }
    }
}

/// Default remote refresh interval in minutes.
pub const DEFAULT_UPDATE_FREQ: u32 = 60;

/// Main config.json structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SystemConfig {
    pub theme: String,
    pub auto_backup: bool,
    /// Empty or absent means `<data dir>/backups`.
    pub backup_folder: Option<PathBuf>,
    /// Minutes between remote group refreshes.
    pub update_freq: u32,
    pub hosts_mode: HostsMode,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            theme: "light".to_string(),
            auto_backup: false,
            backup_folder: None,
            update_freq: DEFAULT_UPDATE_FREQ,
            hosts_mode: HostsMode::Append,
        }
    }
}

impl SystemConfig {
    /// Load config from paths; defaults when the file is absent.
    pub fn load(paths: &DataPaths) -> Result<SystemConfig> {
        if !paths.config_file.is_file() {
            tracing::debug!(path = %paths.config_file.display(), "no config file, using defaults");
            return Ok(SystemConfig::default());
        }
        let s = fs::read_to_string(&paths.config_file)
            .map_err(|e| Error::persistence("load config", &paths.config_file, e))?;
        serde_json::from_str(&s).map_err(|source| Error::Parse {
            path: paths.config_file.clone(),
            source,
        })
    }

    /// Validate, then replace config.json atomically.
    pub fn save(&self, paths: &DataPaths, lock: &DirLock) -> Result<()> {
        debug_assert!(lock.guards(&paths.data_dir));
        self.validate()?;
        store::write_json(&paths.config_file, self, "save config")?;
        tracing::debug!(path = %paths.config_file.display(), "config saved");
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.update_freq == 0 {
            return Err(Error::validation(
                "updateFreq",
                self.update_freq,
                "must be at least one minute",
            ));
        }
        if self.theme.trim().is_empty() {
            return Err(Error::validation("theme", &self.theme, "must not be empty"));
        }
        Ok(())
    }

    /// Folder backups are written to.
    pub fn backup_dir(&self, paths: &DataPaths) -> PathBuf {
        match &self.backup_folder {
            Some(p) if !p.as_os_str().is_empty() => p.clone(),
            _ => paths.backups_dir.clone(),
        }
    }
}
