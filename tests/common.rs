//! Shared test helpers.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use hostswitch::platform::{FileHostsEditor, HostsEditor};
use hostswitch::service::HostsService;
use tempfile::TempDir;

/// Create a temp directory for use as HOSTSWITCH_HOME.
/// Uses current dir (workspace) so sandbox allows full access.
pub fn temp_home() -> TempDir {
    tempfile::Builder::new()
        .prefix("hostswitch_test_")
        .tempdir_in(std::env::current_dir().unwrap_or_else(|_| Path::new(".").into()))
        .expect("temp dir")
}

/// Fake system hosts file inside `dir`, with the given starting content.
pub fn hosts_file(dir: &Path, content: impl AsRef<[u8]>) -> PathBuf {
    let path = dir.join("hosts");
    std::fs::write(&path, content).unwrap();
    path
}

/// Service rooted at `<dir>/data`, writing to `<dir>/hosts`.
pub fn service_in(dir: &Path, hosts_content: impl AsRef<[u8]>) -> HostsService {
    let hosts = hosts_file(dir, hosts_content);
    HostsService::open(dir.join("data"), Box::new(FileHostsEditor::new(hosts))).unwrap()
}

pub fn read_hosts(dir: &Path) -> String {
    std::fs::read_to_string(dir.join("hosts")).unwrap()
}

pub fn read_hosts_bytes(dir: &Path) -> Vec<u8> {
    std::fs::read(dir.join("hosts")).unwrap()
}

/// Editor whose writes always fail, like a hosts file without write permission.
pub struct ReadOnlyHosts {
    pub path: PathBuf,
    pub content: Vec<u8>,
}

impl ReadOnlyHosts {
    pub fn new(content: &str) -> Self {
        Self {
            path: PathBuf::from("/nonexistent/hosts"),
            content: content.as_bytes().to_vec(),
        }
    }
}

impl HostsEditor for ReadOnlyHosts {
    fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> hostswitch::Result<Vec<u8>> {
        Ok(self.content.clone())
    }

    fn write(&self, _content: &[u8]) -> hostswitch::Result<()> {
        Err(hostswitch::Error::Io {
            op: "write hosts file",
            path: self.path.clone(),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        })
    }
}
