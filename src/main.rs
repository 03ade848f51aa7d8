use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context as _;
use clap::Parser as _;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    let cli = simania_scrape::cli::Cli::parse();
    simania_scrape::logging::init(cli.log_file.as_deref()).context("init logging")?;
    tracing::debug!(?cli, "parsed cli");

    let cancel = Arc::new(AtomicBool::new(false));
    let listener_flag = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received; stopping after the current item");
            listener_flag.store(true, Ordering::SeqCst);
        }
    });

    let command = cli.command;
    tokio::task::spawn_blocking(move || match command {
        simania_scrape::cli::Command::Listings(args) => {
            simania_scrape::run::listings(args, &cancel).context("listings")
        }
        simania_scrape::cli::Command::Details(args) => {
            simania_scrape::run::details(args, &cancel).context("details")
        }
    })
    .await
    .context("spawn_blocking join")??;

    Ok(())
}
