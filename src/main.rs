use anyhow::{Context, Result};
use clap::Parser;
use ftp_courier::cli::{Cli, Commands};
use ftp_courier::config::Config;
use ftp_courier::transfer::UploadOptions;
use ftp_courier::{run_status, run_sync, run_upload, run_watch};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let config = match Config::load(&config_path)
        .with_context(|| format!("Failed to load config {}", config_path.display()))
    {
        Ok(config) => config,
        Err(e) => {
            eprintln!("\n❌ {:#}\n", e);
            std::process::exit(1);
        }
    };
    log::debug!("Loaded config: {:?}", config);

    let result = match cli.command {
        Commands::Upload { source, sorted, quiet } => {
            println!("Target: {}@{}", config.remote.user, config.remote.location());
            let options = UploadOptions {
                sorted,
                show_progress: !quiet,
            };
            run_upload(config, source, options).await.map(|report| {
                println!(
                    "\n✅ Batch finished: {} attempted, {} uploaded, {} failed, {} skipped\n",
                    report.attempted, report.succeeded, report.failed, report.skipped
                );
                for path in &report.delete_failures {
                    println!("⚠️  Uploaded but still on disk: {}", path.display());
                }
            })
        }
        Commands::Sync => run_sync(config).await.map(|report| {
            println!(
                "\n✅ Mirror refreshed: {} fetched, {} failed\n",
                report.fetched.len(),
                report.failed.len()
            );
        }),
        Commands::Status { no_sync, json } => run_status(config, !no_sync, json).await,
        Commands::Watch { interval } => run_watch(config, interval).await,
    };

    if let Err(e) = result {
        eprintln!("\n❌ Failed: {:#}\n", e);
        std::process::exit(1);
    }

    Ok(())
}
