// 日志文件：只追加的 CSV
use crate::audit::record::AuditRecord;
use crate::utils::error::LogStoreError;
use crate::utils::file::ensure_parent_dir;
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

pub const HEADER: [&str; 4] = ["Timestamp", "File Name", "Status", "Message"];

// 只追加的审计日志，表头只在创建时写一次
#[derive(Debug, Clone)]
pub struct LogStore {
    path: PathBuf,
}

impl LogStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // 文件不存在时创建并写表头，返回是否新建
    pub fn ensure_header(&self) -> Result<bool, LogStoreError> {
        ensure_parent_dir(&self.path).map_err(|e| self.io_error(e))?;

        // create_new 保证已存在的文件（即使为空）不会被重写表头
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
            Err(e) => return Err(self.io_error(e)),
        };

        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.write_record(HEADER)?;
        let bytes = wtr.into_inner().map_err(|e| self.io_error(e.into_error()))?;

        file.write_all(&bytes).map_err(|e| self.io_error(e))?;
        file.sync_all().map_err(|e| self.io_error(e))?;
        log::info!("Created log file {}", self.path.display());
        Ok(true)
    }

    pub fn append(&self, record: &AuditRecord) -> Result<(), LogStoreError> {
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        wtr.serialize(record)?;
        let bytes = wtr.into_inner().map_err(|e| self.io_error(e.into_error()))?;

        // 文件必须已由 ensure_header 创建
        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;
        file.write_all(&bytes).map_err(|e| self.io_error(e))?;
        file.sync_data().map_err(|e| self.io_error(e))?;
        Ok(())
    }

    fn io_error(&self, source: std::io::Error) -> LogStoreError {
        LogStoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

fn open_reader(path: &Path) -> Result<csv::Reader<File>, LogStoreError> {
    let file = File::open(path).map_err(|source| LogStoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(file);

    let headers = rdr.headers()?;
    if headers.is_empty() {
        return Err(LogStoreError::EmptyFile(path.to_path_buf()));
    }
    if headers.len() != HEADER.len() || headers.iter().zip(HEADER).any(|(a, b)| a != b) {
        return Err(LogStoreError::Parse {
            path: path.to_path_buf(),
            message: format!("unexpected header {:?}", headers.iter().collect::<Vec<_>>()),
        });
    }
    Ok(rdr)
}

fn parse_row(
    path: &Path,
    row: &csv::StringRecord,
    headers: &csv::StringRecord,
) -> Result<AuditRecord, LogStoreError> {
    row.deserialize(Some(headers))
        .map_err(|e| LogStoreError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

pub fn read_records<P: AsRef<Path>>(path: P) -> Result<Vec<AuditRecord>, LogStoreError> {
    let path = path.as_ref();
    let mut rdr = open_reader(path)?;
    let headers = rdr.headers()?.clone();

    let mut records = Vec::new();
    for row in rdr.records() {
        records.push(parse_row(path, &row?, &headers)?);
    }
    Ok(records)
}

// 只解析最后一行，前面的行只要是合法 CSV 即可
pub fn latest_record_of<P: AsRef<Path>>(path: P) -> Result<AuditRecord, LogStoreError> {
    let path = path.as_ref();
    let mut rdr = open_reader(path)?;
    let headers = rdr.headers()?.clone();

    let mut last = None;
    for row in rdr.records() {
        last = Some(row?);
    }

    match last {
        Some(row) => parse_row(path, &row, &headers),
        None => Err(LogStoreError::EmptyFile(path.to_path_buf())),
    }
}
