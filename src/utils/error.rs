use std::path::PathBuf;
use thiserror::Error;

/// 会话级错误：出现在连接、认证、切换目录或列目录阶段，整个批次/刷新因此中止
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Connection to {host} failed: {message}")]
    Connection { host: String, message: String },

    #[error("Authentication failed for user {user}: {message}")]
    Auth { user: String, message: String },

    #[error("Cannot change to remote directory {path}: {message}")]
    Path { path: String, message: String },

    #[error("Cannot list remote directory: {message}")]
    List { message: String },
}

/// 单个文件的传输错误：记录为 FAILED 后继续处理下一个文件
#[derive(Error, Debug)]
pub enum TransferError {
    #[error("Upload of {name} failed: {message}")]
    Put { name: String, message: String },

    #[error("Download of {name} failed: {message}")]
    Get { name: String, message: String },

    #[error("Local I/O error on {path}: {source}")]
    LocalIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid config value for {field}: {message}")]
    Invalid { field: &'static str, message: String },
}

#[derive(Error, Debug)]
pub enum LogStoreError {
    #[error("Log file I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Malformed log row in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Log file has no records: {0}")]
    EmptyFile(PathBuf),
}

/// 批次致命错误，与 `TransferError` 区分开
#[derive(Error, Debug)]
pub enum BatchError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    LogStore(#[from] LogStoreError),

    #[error("Cannot read source directory {path}: {source}")]
    SourceDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// 镜像同步失败：本次刷新沿用已有的本地镜像
#[derive(Error, Debug)]
pub enum SyncError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Cannot prepare mirror directory {path}: {source}")]
    MirrorDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
