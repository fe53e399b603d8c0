// 进度显示
use indicatif::{ProgressBar, ProgressStyle};

pub struct BatchProgress {
    progress_bar: ProgressBar,
}

impl BatchProgress {
    pub fn new(total_bytes: u64, files: usize, visible: bool) -> Self {
        if !visible {
            return Self {
                progress_bar: ProgressBar::hidden(),
            };
        }

        let progress_bar = ProgressBar::new(total_bytes);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")
        {
            progress_bar.set_style(style.progress_chars("#>-"));
        }
        progress_bar.set_message(format!("{} file(s) queued", files));

        Self { progress_bar }
    }

    pub fn start_file(&self, name: &str) {
        self.progress_bar.set_message(format!("Uploading {}", name));
    }

    pub fn finish_file(&self, size: u64) {
        self.progress_bar.inc(size);
    }

    pub fn finish(&self, succeeded: usize, failed: usize) {
        self.progress_bar.finish_with_message(format!(
            "{} uploaded, {} failed",
            succeeded, failed
        ));
    }

    // 日志输出前先挂起进度条，避免覆盖
    pub fn suspend<F: FnOnce() -> R, R>(&self, f: F) -> R {
        self.progress_bar.suspend(f)
    }
}

pub fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.2} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}
