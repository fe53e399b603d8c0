// 命令行参数解析
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ftp-courier")]
#[command(about = "Uploads qualifying files to a remote store and keeps an audit log of every attempt")]
#[command(version)]
pub struct Cli {
    /// Config file (default: config.toml next to the executable)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload qualifying files once, deleting each after a confirmed upload
    Upload {
        /// Local directory to upload from (overrides paths.source)
        #[arg(short, long)]
        source: Option<PathBuf>,
        /// Process files in name order instead of directory order
        #[arg(long)]
        sorted: bool,
        /// Hide the progress bar
        #[arg(short, long)]
        quiet: bool,
    },
    /// Refresh the local mirror of the remote log directory once
    Sync,
    /// Show the latest status of every mirrored log file
    Status {
        /// Skip the mirror refresh and show the local mirror as is
        #[arg(long)]
        no_sync: bool,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Refresh and show status periodically until Ctrl-C
    Watch {
        /// Seconds between refreshes (overrides viewer.refresh_secs)
        #[arg(short, long)]
        interval: Option<u64>,
    },
}
