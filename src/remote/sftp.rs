// SFTP 后端（ssh2）
use crate::config::RemoteConfig;
use crate::remote::client::{AuthMethod, RemoteStore};
use crate::utils::error::{SessionError, TransferError};
use crate::utils::file::replace_file;
use ssh2::{Session, Sftp};
use std::fs::File;
use std::io;
use std::net::TcpStream;
use std::path::{Path, PathBuf};

pub struct SftpStore {
    session: Session,
    sftp: Option<Sftp>,
    cwd: PathBuf,
    host: String,
}

impl SftpStore {
    pub fn connect(remote: &RemoteConfig) -> Result<Self, SessionError> {
        let connection_error = |message: String| SessionError::Connection {
            host: remote.host.clone(),
            message,
        };

        let tcp = TcpStream::connect((remote.host.as_str(), remote.port))
            .map_err(|e| connection_error(e.to_string()))?;

        let mut session =
            Session::new().map_err(|e| connection_error(format!("cannot create session: {}", e)))?;
        session.set_tcp_stream(tcp);
        if let Some(timeout) = remote.timeout {
            // ssh2 以毫秒计，0 表示不超时
            session.set_timeout(u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX));
        }
        session
            .handshake()
            .map_err(|e| connection_error(format!("SSH handshake failed: {}", e)))?;

        Ok(Self {
            session,
            sftp: None,
            cwd: PathBuf::from("."),
            host: remote.host.clone(),
        })
    }

    fn resolve(&self, name: &str) -> PathBuf {
        let path = Path::new(name);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }

    fn channel(&self) -> Option<&Sftp> {
        self.sftp.as_ref()
    }
}

impl RemoteStore for SftpStore {
    fn authenticate(&mut self, user: &str, auth: &AuthMethod) -> Result<(), SessionError> {
        let auth_error = |message: String| SessionError::Auth {
            user: user.to_string(),
            message,
        };

        match auth {
            AuthMethod::Password(password) => self
                .session
                .userauth_password(user, password)
                .map_err(|e| auth_error(e.to_string()))?,
            AuthMethod::PublicKey {
                key_file,
                passphrase,
            } => self
                .session
                .userauth_pubkey_file(user, None, key_file, passphrase.as_deref())
                .map_err(|e| auth_error(e.to_string()))?,
        }

        if !self.session.authenticated() {
            return Err(auth_error("server did not accept the credentials".to_string()));
        }

        let sftp = self.session.sftp().map_err(|e| SessionError::Connection {
            host: self.host.clone(),
            message: format!("cannot start SFTP subsystem: {}", e),
        })?;
        // 相对路径以登录目录为起点
        if let Ok(home) = sftp.realpath(Path::new(".")) {
            self.cwd = home;
        }
        self.sftp = Some(sftp);
        Ok(())
    }

    fn change_dir(&mut self, path: &str) -> Result<(), SessionError> {
        let target = self.resolve(path);
        let path_error = |message: String| SessionError::Path {
            path: path.to_string(),
            message,
        };

        let sftp = self
            .channel()
            .ok_or_else(|| path_error("session is not authenticated".to_string()))?;
        match sftp.stat(&target) {
            Ok(stat) if stat.is_dir() => {
                self.cwd = target;
                Ok(())
            }
            Ok(_) => Err(path_error("not a directory".to_string())),
            Err(e) => Err(path_error(e.to_string())),
        }
    }

    // 只列出普通文件
    fn list_entries(&mut self) -> Result<Vec<String>, SessionError> {
        let sftp = self.channel().ok_or_else(|| SessionError::List {
            message: "session is not authenticated".to_string(),
        })?;

        let entries = sftp.readdir(&self.cwd).map_err(|e| SessionError::List {
            message: e.to_string(),
        })?;

        Ok(entries
            .into_iter()
            .filter(|(_, stat)| !stat.is_dir())
            .filter_map(|(path, _)| {
                path.file_name()
                    .map(|name| name.to_string_lossy().to_string())
            })
            .collect())
    }

    fn put(&mut self, local_path: &Path, remote_name: &str) -> Result<(), TransferError> {
        let put_error = |message: String| TransferError::Put {
            name: remote_name.to_string(),
            message,
        };

        let mut local_file = File::open(local_path).map_err(|source| TransferError::LocalIo {
            path: local_path.to_path_buf(),
            source,
        })?;

        let target = self.resolve(remote_name);
        let sftp = self
            .channel()
            .ok_or_else(|| put_error("session is not authenticated".to_string()))?;
        let mut remote_file = sftp.create(&target).map_err(|e| put_error(e.to_string()))?;

        io::copy(&mut local_file, &mut remote_file).map_err(|e| put_error(e.to_string()))?;

        // 部分服务器不支持 fsync
        remote_file.fsync().ok();
        Ok(())
    }

    fn get(&mut self, remote_name: &str, local_path: &Path) -> Result<(), TransferError> {
        let get_error = |message: String| TransferError::Get {
            name: remote_name.to_string(),
            message,
        };

        let source = self.resolve(remote_name);
        let sftp = self
            .channel()
            .ok_or_else(|| get_error("session is not authenticated".to_string()))?;
        let mut remote_file = sftp.open(&source).map_err(|e| get_error(e.to_string()))?;

        replace_file(local_path, |local_file| {
            io::copy(&mut remote_file, local_file)
                .map(|_| ())
                .map_err(|e| get_error(e.to_string()))
        })
    }

    fn close(&mut self) {
        self.sftp = None;
        if let Err(e) = self.session.disconnect(None, "closing", None) {
            log::debug!("SSH disconnect failed: {}", e);
        }
    }
}
