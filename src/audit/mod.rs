// 审计日志模块入口
pub mod record;
pub mod store;

pub use record::{AuditRecord, Outcome, Status};
pub use store::{latest_record_of, read_records, LogStore};
