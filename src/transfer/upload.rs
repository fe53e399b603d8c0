// 上传功能
use crate::audit::{AuditRecord, LogStore, Outcome};
use crate::config::Config;
use crate::remote::{Connector, RemoteSession};
use crate::transfer::policy::{scan_candidates, Candidate};
use crate::transfer::progress::{format_size, BatchProgress};
use crate::utils::error::BatchError;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Default)]
pub struct UploadOptions {
    // 按文件名而不是目录顺序处理
    pub sorted: bool,
    pub show_progress: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub delete_failures: Vec<PathBuf>,
}

pub struct Uploader<'a, C: Connector + ?Sized> {
    config: &'a Config,
    connector: &'a C,
    options: UploadOptions,
}

impl<'a, C: Connector + ?Sized> Uploader<'a, C> {
    pub fn new(config: &'a Config, connector: &'a C) -> Self {
        Self {
            config,
            connector,
            options: UploadOptions::default(),
        }
    }

    pub fn with_options(mut self, options: UploadOptions) -> Self {
        self.options = options;
        self
    }

    // 每条记录落盘后才开始下一个上传
    pub fn run(&self, source_dir: &Path) -> Result<BatchReport, BatchError> {
        let remote = &self.config.remote;
        let mut session = RemoteSession::open(self.connector, remote)?;

        let store = LogStore::new(&self.config.log_path);
        store.ensure_header()?;

        let scan = scan_candidates(source_dir, &self.config.filters, self.options.sorted).map_err(
            |source| BatchError::SourceDir {
                path: source_dir.to_path_buf(),
                source,
            },
        )?;

        log::info!(
            "{} candidate(s) in {} ({}), {} skipped",
            scan.candidates.len(),
            source_dir.display(),
            format_size(scan.total_bytes()),
            scan.skipped
        );

        let progress = BatchProgress::new(
            scan.total_bytes(),
            scan.candidates.len(),
            self.options.show_progress,
        );
        let mut report = BatchReport {
            skipped: scan.skipped,
            ..BatchReport::default()
        };

        for candidate in &scan.candidates {
            progress.start_file(&candidate.name);
            let outcome = self.transfer(&mut session, candidate, &mut report, &progress);

            let record = AuditRecord::now(&candidate.name, &outcome);
            store.append(&record)?;
            progress.finish_file(candidate.size);
        }

        progress.finish(report.succeeded, report.failed);
        session.close();
        Ok(report)
    }

    fn transfer(
        &self,
        session: &mut RemoteSession,
        candidate: &Candidate,
        report: &mut BatchReport,
        progress: &BatchProgress,
    ) -> Outcome {
        report.attempted += 1;

        match session.put(&candidate.path, &candidate.name) {
            Ok(()) => {
                report.succeeded += 1;
                // 删除失败不改变 SUCCESS 记录，远程已有副本
                if let Err(e) = std::fs::remove_file(&candidate.path) {
                    progress.suspend(|| {
                        log::warn!(
                            "Uploaded {} but could not delete local copy: {}",
                            candidate.path.display(),
                            e
                        )
                    });
                    report.delete_failures.push(candidate.path.clone());
                }
                Outcome::Success {
                    remote_location: self.config.remote.location(),
                }
            }
            Err(e) => {
                report.failed += 1;
                progress.suspend(|| log::warn!("{}", e));
                Outcome::Failure {
                    reason: e.to_string(),
                }
            }
        }
    }
}
