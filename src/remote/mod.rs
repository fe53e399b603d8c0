// 远程存储模块入口
pub mod client;
pub mod ftp;
pub mod sftp;

pub use client::{AuthMethod, Connector, ProtocolConnector, RemoteSession, RemoteStore};
pub use self::ftp::FtpStore;
pub use sftp::SftpStore;
