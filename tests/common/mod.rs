#![allow(dead_code)]

use ftp_courier::config::{Config, FilterPolicy, Protocol, RemoteConfig, ViewerConfig};
use ftp_courier::remote::{AuthMethod, Connector, RemoteStore};
use ftp_courier::utils::error::{SessionError, TransferError};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

/// What the fake server holds and how it misbehaves.
#[derive(Default)]
pub struct RemoteState {
    pub uploaded: Vec<(String, Vec<u8>)>,
    pub files: BTreeMap<String, Vec<u8>>,
    pub fail_put: HashSet<String>,
    pub fail_get: HashSet<String>,
    pub refuse_connect: bool,
    pub reject_login: bool,
    pub missing_dir: bool,
    /// Remove the local file during `put`, so the engine's delete fails.
    pub steal_local_file: bool,
    /// Log file whose data rows are counted at the start of every `put`.
    pub watched_log: Option<PathBuf>,
    pub log_rows_at_put: Vec<usize>,
    /// Log file deleted right after the first successful `put`.
    pub remove_log_after_put: Option<PathBuf>,
    pub cwd: Option<String>,
    pub connects: usize,
    pub closes: usize,
}

#[derive(Clone, Default)]
pub struct FakeConnector {
    pub state: Rc<RefCell<RemoteState>>,
}

impl FakeConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn uploaded_names(&self) -> Vec<String> {
        self.state
            .borrow()
            .uploaded
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }
}

struct FakeStore {
    state: Rc<RefCell<RemoteState>>,
}

impl Connector for FakeConnector {
    fn connect(&self, remote: &RemoteConfig) -> Result<Box<dyn RemoteStore>, SessionError> {
        let mut state = self.state.borrow_mut();
        if state.refuse_connect {
            return Err(SessionError::Connection {
                host: remote.host.clone(),
                message: "Connection refused (os error 111)".to_string(),
            });
        }
        state.connects += 1;
        Ok(Box::new(FakeStore {
            state: Rc::clone(&self.state),
        }))
    }
}

impl RemoteStore for FakeStore {
    fn authenticate(&mut self, user: &str, _auth: &AuthMethod) -> Result<(), SessionError> {
        if self.state.borrow().reject_login {
            return Err(SessionError::Auth {
                user: user.to_string(),
                message: "530 Login incorrect.".to_string(),
            });
        }
        Ok(())
    }

    fn change_dir(&mut self, path: &str) -> Result<(), SessionError> {
        let mut state = self.state.borrow_mut();
        if state.missing_dir {
            return Err(SessionError::Path {
                path: path.to_string(),
                message: "550 Failed to change directory.".to_string(),
            });
        }
        state.cwd = Some(path.to_string());
        Ok(())
    }

    fn list_entries(&mut self) -> Result<Vec<String>, SessionError> {
        Ok(self.state.borrow().files.keys().cloned().collect())
    }

    fn put(&mut self, local_path: &Path, remote_name: &str) -> Result<(), TransferError> {
        let mut state = self.state.borrow_mut();
        if let Some(log) = state.watched_log.clone() {
            let rows = log_lines(&log).len().saturating_sub(1);
            state.log_rows_at_put.push(rows);
        }
        if state.fail_put.contains(remote_name) {
            return Err(TransferError::Put {
                name: remote_name.to_string(),
                message: "451 Transfer aborted: connection reset".to_string(),
            });
        }
        let data = std::fs::read(local_path).map_err(|source| TransferError::LocalIo {
            path: local_path.to_path_buf(),
            source,
        })?;
        if state.steal_local_file {
            std::fs::remove_file(local_path).unwrap();
        }
        state.uploaded.push((remote_name.to_string(), data.clone()));
        state.files.insert(remote_name.to_string(), data);
        if let Some(log) = state.remove_log_after_put.take() {
            std::fs::remove_file(log).unwrap();
        }
        Ok(())
    }

    fn get(&mut self, remote_name: &str, local_path: &Path) -> Result<(), TransferError> {
        let state = self.state.borrow();
        if state.fail_get.contains(remote_name) {
            return Err(TransferError::Get {
                name: remote_name.to_string(),
                message: "550 Permission denied".to_string(),
            });
        }
        let data = state.files.get(remote_name).ok_or_else(|| TransferError::Get {
            name: remote_name.to_string(),
            message: "550 No such file".to_string(),
        })?;
        std::fs::write(local_path, data).map_err(|source| TransferError::LocalIo {
            path: local_path.to_path_buf(),
            source,
        })
    }

    fn close(&mut self) {
        self.state.borrow_mut().closes += 1;
    }
}

pub fn config(log_path: &Path, mirror_dir: &Path) -> Config {
    Config {
        remote: RemoteConfig {
            protocol: Protocol::Ftp,
            host: "10.0.0.5".to_string(),
            port: 21,
            user: "eagle".to_string(),
            password: "secret".to_string(),
            directory: "ENG_DATA/HR".to_string(),
            key_file: None,
            timeout: None,
        },
        log_path: log_path.to_path_buf(),
        source_dir: None,
        filters: FilterPolicy {
            extensions: vec![".csv".to_string()],
            min_size: 100,
        },
        viewer: Some(ViewerConfig {
            remote_log_dir: "ENG_DATA/HR/log".to_string(),
            mirror_dir: mirror_dir.to_path_buf(),
            refresh: Duration::from_secs(60),
            suffix: "_upload_log".to_string(),
        }),
    }
}

pub fn write_file(dir: &Path, name: &str, size: usize) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, vec![b'x'; size]).unwrap();
    path
}

/// Raw lines of a log file.
pub fn log_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}
