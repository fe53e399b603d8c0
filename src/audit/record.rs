// 审计记录
use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "SUCCESS")]
    Success,
    #[serde(rename = "FAILED")]
    Failed,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Success => "SUCCESS",
            Status::Failed => "FAILED",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success { remote_location: String },
    Failure { reason: String },
}

// 日志文件中的一行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    #[serde(rename = "Timestamp", with = "timestamp")]
    pub timestamp: NaiveDateTime,
    #[serde(rename = "File Name")]
    pub file_name: String,
    #[serde(rename = "Status")]
    pub status: Status,
    #[serde(rename = "Message")]
    pub message: String,
}

impl AuditRecord {
    pub fn from_outcome(file_name: &str, outcome: &Outcome, at: NaiveDateTime) -> Self {
        let (status, message) = match outcome {
            Outcome::Success { remote_location } => (
                Status::Success,
                format!("Uploaded successfully to {}", remote_location),
            ),
            Outcome::Failure { reason } => (Status::Failed, reason.clone()),
        };

        // 秒级精度
        let timestamp = at.with_nanosecond(0).unwrap_or(at);

        Self {
            timestamp,
            file_name: file_name.to_string(),
            status,
            message,
        }
    }

    pub fn now(file_name: &str, outcome: &Outcome) -> Self {
        Self::from_outcome(file_name, outcome, Local::now().naive_local())
    }

    pub fn formatted_timestamp(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }
}

mod timestamp {
    use super::TIMESTAMP_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(TIMESTAMP_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(raw.trim(), TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
    }
}
