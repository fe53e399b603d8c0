// 传输模块入口
pub mod download;
pub mod policy;
pub mod progress;
pub mod upload;

pub use download::{MirrorSync, SyncReport};
pub use upload::{BatchReport, UploadOptions, Uploader};
