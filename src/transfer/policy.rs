// 待上传文件的筛选
use crate::config::FilterPolicy;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub name: String,
    pub path: PathBuf,
    pub size: u64,
}

#[derive(Debug, Default)]
pub struct Scan {
    pub candidates: Vec<Candidate>,
    pub skipped: usize,
}

impl Scan {
    pub fn total_bytes(&self) -> u64 {
        self.candidates.iter().map(|c| c.size).sum()
    }
}

/// Lists the immediate entries of `dir` and keeps the ones the policy accepts.
///
/// Order is whatever `read_dir` yields unless `sorted` is set.
pub fn scan_candidates(dir: &Path, policy: &FilterPolicy, sorted: bool) -> std::io::Result<Scan> {
    let mut scan = Scan::default();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        let name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(raw) => {
                log::warn!("Skipping entry with non UTF-8 name: {:?}", raw);
                scan.skipped += 1;
                continue;
            }
        };

        // 跟随符号链接，和 is_file 的判断一致
        let metadata = match std::fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(e) => {
                log::debug!("Skipping {}: {}", name, e);
                scan.skipped += 1;
                continue;
            }
        };

        if !metadata.is_file() || !policy.accepts(&name, metadata.len()) {
            log::debug!("Skipping {} ({} bytes)", name, metadata.len());
            scan.skipped += 1;
            continue;
        }

        scan.candidates.push(Candidate {
            name,
            path,
            size: metadata.len(),
        });
    }

    if sorted {
        scan.candidates.sort_by(|a, b| a.name.cmp(&b.name));
    }

    Ok(scan)
}
