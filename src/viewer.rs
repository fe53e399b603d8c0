// 日志查看：解析镜像目录并渲染状态表
use crate::audit::{latest_record_of, Status};
use crate::config::{Config, ViewerConfig};
use crate::remote::Connector;
use crate::transfer::MirrorSync;
use crate::utils::error::LogStoreError;
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use serde::Serialize;
use std::path::Path;

const COLUMNS: [&str; 4] = ["File", "Timestamp", "Status", "Message"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LatestStatus {
    pub file: String,
    pub timestamp: String,
    pub status: Status,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct StatusReport {
    pub entries: Vec<LatestStatus>,
    // 读不出来的日志及原因
    pub skipped: Vec<(String, LogStoreError)>,
}

// `<name><suffix>`，可带 `.csv` 扩展名
pub fn is_log_file(name: &str, suffix: &str) -> bool {
    name.strip_suffix(".csv").unwrap_or(name).ends_with(suffix)
}

// 每个日志文件的最后一条记录，按文件名排序；单个文件出错不影响其他文件
pub fn collect_latest(mirror_dir: &Path, suffix: &str) -> std::io::Result<StatusReport> {
    let mut report = StatusReport::default();

    for entry in std::fs::read_dir(mirror_dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        if !is_log_file(&name, suffix) || !entry.path().is_file() {
            continue;
        }

        match latest_record_of(entry.path()) {
            Ok(record) => report.entries.push(LatestStatus {
                file: name,
                timestamp: record.formatted_timestamp(),
                status: record.status,
                message: record.message,
            }),
            Err(e) => {
                match &e {
                    LogStoreError::EmptyFile(_) => log::debug!("{}", e),
                    _ => log::warn!("Cannot read log file {}: {}", name, e),
                }
                report.skipped.push((name, e));
            }
        }
    }

    report.entries.sort_by(|a, b| a.file.cmp(&b.file));
    Ok(report)
}

#[derive(Debug, Default)]
pub struct Refresh {
    pub warning: Option<String>,
    pub status: StatusReport,
}

// 同步失败只给出警告，继续显示已有镜像
pub fn refresh<C: Connector + ?Sized>(
    connector: &C,
    config: &Config,
    viewer: &ViewerConfig,
    sync: bool,
) -> Refresh {
    let mut warning = None;

    if sync {
        let mirror = MirrorSync::new(
            connector,
            &config.remote,
            &viewer.remote_log_dir,
            &viewer.mirror_dir,
        );
        match mirror.refresh() {
            Ok(report) => {
                log::info!(
                    "Mirror sync: {} fetched, {} failed",
                    report.fetched.len(),
                    report.failed.len()
                );
            }
            Err(e) => {
                log::warn!("Mirror sync failed: {}", e);
                warning = Some(format!("Mirror sync failed, showing last known state: {}", e));
            }
        }
    }

    let status = match collect_latest(&viewer.mirror_dir, &viewer.suffix) {
        Ok(status) => status,
        Err(e) => {
            log::warn!("Cannot read mirror {}: {}", viewer.mirror_dir.display(), e);
            warning.get_or_insert_with(|| {
                format!("Cannot read mirror {}: {}", viewer.mirror_dir.display(), e)
            });
            StatusReport::default()
        }
    };

    Refresh { warning, status }
}

// 状态单元格按结果着色；多行消息留在同一行单元格内
pub fn render_table(entries: &[LatestStatus], colorize: bool) -> String {
    let mut table = Table::new();
    if colorize {
        table.enforce_styling();
    } else {
        table.force_no_tty();
    }
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(COLUMNS.map(|title| Cell::new(title).fg(Color::White)));

    for entry in entries {
        let status_color = match entry.status {
            Status::Success => Color::Green,
            Status::Failed => Color::Red,
        };
        table.add_row(vec![
            Cell::new(&entry.file),
            Cell::new(&entry.timestamp).fg(Color::Cyan),
            Cell::new(entry.status.as_str())
                .fg(Color::White)
                .bg(status_color),
            Cell::new(&entry.message),
        ]);
    }

    table.to_string()
}
