// 下载功能：把远程日志目录拉到本地镜像
use crate::config::RemoteConfig;
use crate::remote::{Connector, RemoteSession};
use crate::utils::error::{SyncError, TransferError};
use crate::utils::file::base_name;
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
pub struct SyncReport {
    pub fetched: Vec<String>,
    pub failed: Vec<(String, TransferError)>,
}

pub struct MirrorSync<'a, C: Connector + ?Sized> {
    remote: RemoteConfig,
    mirror_dir: PathBuf,
    connector: &'a C,
}

impl<'a, C: Connector + ?Sized> MirrorSync<'a, C> {
    /// `remote` supplies endpoint and credentials; `remote_log_dir` replaces
    /// its upload directory.
    pub fn new(connector: &'a C, remote: &RemoteConfig, remote_log_dir: &str, mirror_dir: &Path) -> Self {
        Self {
            remote: remote.with_directory(remote_log_dir),
            mirror_dir: mirror_dir.to_path_buf(),
            connector,
        }
    }

    /// Fetches every listed remote entry, overwriting local copies.
    pub fn refresh(&self) -> Result<SyncReport, SyncError> {
        std::fs::create_dir_all(&self.mirror_dir).map_err(|source| SyncError::MirrorDir {
            path: self.mirror_dir.clone(),
            source,
        })?;

        let mut session = RemoteSession::open(self.connector, &self.remote)?;
        let entries = session.list_entries()?;
        log::debug!("{} remote entries in {}", entries.len(), self.remote.directory);

        let mut report = SyncReport::default();
        for entry in entries {
            let name = base_name(&entry);
            if name.is_empty() || name == "." || name == ".." {
                continue;
            }

            let local_path = self.mirror_dir.join(name);
            log::debug!("Downloading {} to {}", entry, local_path.display());
            match session.get(&entry, &local_path) {
                Ok(()) => report.fetched.push(name.to_string()),
                Err(e) => {
                    log::warn!("{}", e);
                    report.failed.push((name.to_string(), e));
                }
            }
        }

        session.close();
        Ok(report)
    }
}
