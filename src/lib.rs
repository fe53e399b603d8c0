// 库文件，导出模块
pub mod audit;
pub mod cli;
pub mod config;
pub mod remote;
pub mod transfer;
pub mod utils;
pub mod viewer;

use anyhow::{Context, Result};
use config::Config;
use remote::ProtocolConnector;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;
use transfer::{BatchReport, MirrorSync, SyncReport, UploadOptions, Uploader};
use viewer::Refresh;

pub async fn run_upload(
    config: Config,
    source: Option<PathBuf>,
    options: UploadOptions,
) -> Result<BatchReport> {
    let source_dir = source
        .or_else(|| config.source_dir.clone())
        .context("No source directory: pass --source or set paths.source")?;

    let report = tokio::task::spawn_blocking(move || {
        Uploader::new(&config, &ProtocolConnector)
            .with_options(options)
            .run(&source_dir)
    })
    .await
    .context("Upload batch was interrupted")??;

    Ok(report)
}

pub async fn run_sync(config: Config) -> Result<SyncReport> {
    let report = tokio::task::spawn_blocking(move || -> Result<SyncReport> {
        let viewer = config.viewer()?;
        let mirror = MirrorSync::new(
            &ProtocolConnector,
            &config.remote,
            &viewer.remote_log_dir,
            &viewer.mirror_dir,
        );
        Ok(mirror.refresh()?)
    })
    .await
    .context("Mirror sync was interrupted")??;

    Ok(report)
}

async fn refresh_view(config: Config, sync: bool) -> Result<Refresh> {
    tokio::task::spawn_blocking(move || -> Result<Refresh> {
        let viewer = config.viewer()?;
        Ok(viewer::refresh(&ProtocolConnector, &config, viewer, sync))
    })
    .await
    .context("Viewer refresh was interrupted")?
}

fn print_refresh(refresh: &Refresh, json: bool) -> Result<()> {
    if let Some(warning) = &refresh.warning {
        eprintln!("⚠️  {}", warning);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&refresh.status.entries)?);
    } else {
        let colorize = std::io::stdout().is_terminal();
        println!("{}", viewer::render_table(&refresh.status.entries, colorize));
    }
    Ok(())
}

pub async fn run_status(config: Config, sync: bool, json: bool) -> Result<()> {
    let refresh = refresh_view(config, sync).await?;
    print_refresh(&refresh, json)
}

/// Refreshes on a fixed interval. Each refresh completes before the next
/// wait starts, so refreshes never overlap.
pub async fn run_watch(config: Config, interval: Option<u64>) -> Result<()> {
    let period = match interval {
        Some(0) => anyhow::bail!("--interval must be at least 1 second"),
        Some(secs) => Duration::from_secs(secs),
        None => config.viewer()?.refresh,
    };
    let clear = std::io::stdout().is_terminal();

    loop {
        let refresh = refresh_view(config.clone(), true).await?;
        if clear {
            // 清屏并回到左上角
            print!("\x1B[2J\x1B[H");
        }
        println!(
            "Last refresh: {}",
            chrono::Local::now().format(audit::record::TIMESTAMP_FORMAT)
        );
        print_refresh(&refresh, false)?;

        tokio::select! {
            _ = tokio::time::sleep(period) => {}
            _ = tokio::signal::ctrl_c() => {
                println!("Stopped.");
                return Ok(());
            }
        }
    }
}
