// 远程存储客户端封装
use crate::config::{Protocol, RemoteConfig};
use crate::remote::{FtpStore, SftpStore};
use crate::utils::error::{SessionError, TransferError};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub enum AuthMethod {
    Password(String),
    PublicKey {
        key_file: PathBuf,
        passphrase: Option<String>,
    },
}

impl AuthMethod {
    // 配置了 key_file 时用密钥，密码作为口令
    pub fn from_config(remote: &RemoteConfig) -> Self {
        match &remote.key_file {
            Some(key_file) => AuthMethod::PublicKey {
                key_file: key_file.clone(),
                passphrase: Some(remote.password.clone()).filter(|p| !p.is_empty()),
            },
            None => AuthMethod::Password(remote.password.clone()),
        }
    }
}

// 远程存储；put/get 的名字相对于当前远程目录
pub trait RemoteStore {
    fn authenticate(&mut self, user: &str, auth: &AuthMethod) -> Result<(), SessionError>;

    fn change_dir(&mut self, path: &str) -> Result<(), SessionError>;

    fn list_entries(&mut self) -> Result<Vec<String>, SessionError>;

    fn put(&mut self, local_path: &Path, remote_name: &str) -> Result<(), TransferError>;

    fn get(&mut self, remote_name: &str, local_path: &Path) -> Result<(), TransferError>;

    // 尽力而为，忽略错误
    fn close(&mut self);
}

pub trait Connector {
    fn connect(&self, remote: &RemoteConfig) -> Result<Box<dyn RemoteStore>, SessionError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProtocolConnector;

impl Connector for ProtocolConnector {
    fn connect(&self, remote: &RemoteConfig) -> Result<Box<dyn RemoteStore>, SessionError> {
        match remote.protocol {
            Protocol::Ftp => Ok(Box::new(FtpStore::connect(remote)?)),
            Protocol::Sftp => Ok(Box::new(SftpStore::connect(remote)?)),
        }
    }
}

// 已登录并进入工作目录的会话，drop 时如未关闭也会关闭
pub struct RemoteSession {
    store: Box<dyn RemoteStore>,
    closed: bool,
}

impl RemoteSession {
    pub fn open<C: Connector + ?Sized>(
        connector: &C,
        remote: &RemoteConfig,
    ) -> Result<Self, SessionError> {
        log::info!("Connecting to {}:{}...", remote.host, remote.port);
        let store = connector.connect(remote)?;
        let mut session = RemoteSession {
            store,
            closed: false,
        };

        log::debug!("Authenticating as {}", remote.user);
        session
            .store
            .authenticate(&remote.user, &AuthMethod::from_config(remote))?;

        log::debug!("Changing directory to {}", remote.directory);
        session.store.change_dir(&remote.directory)?;

        Ok(session)
    }

    pub fn list_entries(&mut self) -> Result<Vec<String>, SessionError> {
        self.store.list_entries()
    }

    pub fn put(&mut self, local_path: &Path, remote_name: &str) -> Result<(), TransferError> {
        self.store.put(local_path, remote_name)
    }

    pub fn get(&mut self, remote_name: &str, local_path: &Path) -> Result<(), TransferError> {
        self.store.get(remote_name, local_path)
    }

    pub fn close(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if !self.closed {
            self.closed = true;
            self.store.close();
        }
    }
}

impl Drop for RemoteSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}
