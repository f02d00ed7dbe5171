//! Platform abstraction for the system hosts file.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::store;

/// Trait for system hosts file access.
pub trait HostsEditor: Send + Sync {
    /// Location of the hosts file.
    fn path(&self) -> &Path;
    /// Current content, as raw bytes. Hosts files are not always UTF-8.
    fn read(&self) -> Result<Vec<u8>>;
    /// Replace the content atomically.
    fn write(&self, content: &[u8]) -> Result<()>;
}

/// Well-known hosts file location for this platform.
pub fn system_hosts_path() -> PathBuf {
    #[cfg(windows)]
    {
        let root = std::env::var_os("SystemRoot").unwrap_or_else(|| r"C:\Windows".into());
        PathBuf::from(root)
            .join("System32")
            .join("drivers")
            .join("etc")
            .join("hosts")
    }

    // /etc is a symlink into /private on macOS.
    #[cfg(target_os = "macos")]
    {
        PathBuf::from("/private/etc/hosts")
    }

    #[cfg(not(any(windows, target_os = "macos")))]
    {
        PathBuf::from("/etc/hosts")
    }
}

/// Get platform HostsEditor implementation.
/// If HOSTSWITCH_HOSTS_FILE is set (e.g. in tests), that path is used instead.
pub fn default_hosts_editor() -> Box<dyn HostsEditor> {
    if let Ok(path) = std::env::var("HOSTSWITCH_HOSTS_FILE") {
        return Box::new(FileHostsEditor::new(path));
    }
    Box::new(FileHostsEditor::new(system_hosts_path()))
}

/// HostsEditor that reads/writes a file at the given path.
#[derive(Debug, Clone)]
pub struct FileHostsEditor {
    path: PathBuf,
}

impl FileHostsEditor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl HostsEditor for FileHostsEditor {
    fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Vec<u8>> {
        std::fs::read(&self.path).map_err(|e| Error::io("read hosts file", &self.path, e))
    }

    fn write(&self, content: &[u8]) -> Result<()> {
        // Replace the link target, not the link.
        let target = std::fs::canonicalize(&self.path).unwrap_or_else(|_| self.path.clone());
        store::replace_file(&target, content)
            .map_err(|e| Error::io("write hosts file", &self.path, e))
    }
}
