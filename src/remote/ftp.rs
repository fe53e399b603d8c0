// FTP 后端
use crate::config::RemoteConfig;
use crate::remote::client::{AuthMethod, RemoteStore};
use crate::utils::error::{SessionError, TransferError};
use crate::utils::file::replace_file;
use ::ftp::types::FileType;
use ::ftp::FtpStream;
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

pub struct FtpStore {
    stream: FtpStream,
    host: String,
}

impl FtpStore {
    pub fn connect(remote: &RemoteConfig) -> Result<Self, SessionError> {
        let stream = FtpStream::connect((remote.host.as_str(), remote.port)).map_err(|e| {
            SessionError::Connection {
                host: remote.host.clone(),
                message: e.to_string(),
            }
        })?;

        Ok(Self {
            stream,
            host: remote.host.clone(),
        })
    }
}

impl RemoteStore for FtpStore {
    fn authenticate(&mut self, user: &str, auth: &AuthMethod) -> Result<(), SessionError> {
        let password = match auth {
            AuthMethod::Password(password) => password,
            AuthMethod::PublicKey { .. } => {
                return Err(SessionError::Auth {
                    user: user.to_string(),
                    message: "key-file authentication is only available over sftp".to_string(),
                })
            }
        };

        self.stream
            .login(user, password)
            .map_err(|e| SessionError::Auth {
                user: user.to_string(),
                message: e.to_string(),
            })?;

        // 二进制模式，避免换行被改写
        self.stream
            .transfer_type(FileType::Binary)
            .map_err(|e| SessionError::Connection {
                host: self.host.clone(),
                message: format!("cannot switch to binary mode: {}", e),
            })
    }

    fn change_dir(&mut self, path: &str) -> Result<(), SessionError> {
        self.stream.cwd(path).map_err(|e| SessionError::Path {
            path: path.to_string(),
            message: e.to_string(),
        })
    }

    fn list_entries(&mut self) -> Result<Vec<String>, SessionError> {
        self.stream
            .nlst(None)
            .map_err(|e| SessionError::List {
                message: e.to_string(),
            })
    }

    fn put(&mut self, local_path: &Path, remote_name: &str) -> Result<(), TransferError> {
        let file = File::open(local_path).map_err(|source| TransferError::LocalIo {
            path: local_path.to_path_buf(),
            source,
        })?;
        let mut reader = BufReader::new(file);

        self.stream
            .put(remote_name, &mut reader)
            .map_err(|e| TransferError::Put {
                name: remote_name.to_string(),
                message: e.to_string(),
            })
    }

    fn get(&mut self, remote_name: &str, local_path: &Path) -> Result<(), TransferError> {
        let data = self
            .stream
            .simple_retr(remote_name)
            .map_err(|e| TransferError::Get {
                name: remote_name.to_string(),
                message: e.to_string(),
            })?;

        replace_file(local_path, |file| {
            file.write_all(data.get_ref())
                .map_err(|source| TransferError::LocalIo {
                    path: local_path.to_path_buf(),
                    source,
                })
        })
    }

    fn close(&mut self) {
        if let Err(e) = self.stream.quit() {
            log::debug!("FTP quit failed: {}", e);
        }
    }
}
