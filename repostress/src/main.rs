//! Command line entry point for the repository stress tool.
//!
//! Connection settings for the real repository come from the environment:
//! `REPOSTRESS_URL`, `REPOSTRESS_USER` and `REPOSTRESS_TOKEN`.

use std::env;
use std::sync::Arc;

use anyhow::{Context, Result};
use argh::FromArgs;
use bytesize::ByteSize;
use tracing_subscriber::EnvFilter;

use repostress::Config;
use repostress_client::ClientBuilder;

/// Stress tool for an artifact repository.
#[derive(Debug, FromArgs)]
struct Args {
    #[argh(subcommand)]
    command: Command,
}

#[derive(Debug, FromArgs)]
#[argh(subcommand)]
enum Command {
    Stress(StressCommand),
}

/// apply continuous upload/download load to a repository
///
/// Upload workers upload files full of random bytes; download workers
/// download previously uploaded files. Every attempt is logged with its
/// HTTP status or transport error until the process is interrupted.
#[derive(Debug, FromArgs)]
#[argh(subcommand, name = "stress")]
struct StressCommand {
    /// number of workers downloading artifacts (default: 10)
    #[argh(option, default = "10")]
    download_workers: usize,

    /// number of workers uploading artifacts (default: 2)
    #[argh(option, default = "2")]
    upload_workers: usize,

    /// size of uploaded files in megabytes (default: 50)
    #[argh(option, default = "50")]
    file_size: u64,

    /// the repository to target
    #[argh(option)]
    repo: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args: Args = argh::from_env();
    let Command::Stress(cmd) = args.command;

    let config = Config {
        upload_workers: cmd.upload_workers,
        download_workers: cmd.download_workers,
        file_size: ByteSize::mb(cmd.file_size),
        repo: cmd.repo,
    };
    config.validate()?;

    let client = ClientBuilder::new(env::var("REPOSTRESS_URL").unwrap_or_default())
        .credentials(
            env::var("REPOSTRESS_USER").unwrap_or_default(),
            env::var("REPOSTRESS_TOKEN").unwrap_or_default(),
        )
        .build()
        .context("reading connection settings (REPOSTRESS_URL, REPOSTRESS_USER, REPOSTRESS_TOKEN)")?;

    repostress::run(Arc::new(client), config).await
}

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("repostress=info"));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter)
        .with_target(true)
        .init();
}
