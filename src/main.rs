mod args;

use anyhow::{bail, Context, Result};
use args::{Cli, Command};
use bridge_desktop::{RcloneFolderLister, ReqwestHttpClient};
use clap::Parser;
use core_runtime::logging::{init_logging, strip_path};
use core_sync::LinkExportCoordinator;
use provider_encora::FetchCompletion;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.logging_config()).context("Failed to initialize logging")?;

    let config = cli.exporter_config().context("Invalid configuration")?;
    info!(config = ?config, command = ?cli.subcommand(), "Starting link exporter");

    let snapshot_path = config.snapshot_path().display().to_string();
    let snapshot = strip_path(&snapshot_path);

    let http_client = ReqwestHttpClient::with_timeout(config.http_timeout)
        .context("Failed to build HTTP client")?;
    let rclone_config = config.rclone_config.display().to_string();
    info!(
        remote = %config.remote,
        rclone_config = %strip_path(&rclone_config),
        "Using rclone remote"
    );
    let folder_lister = RcloneFolderLister::new(
        config.rclone_binary.clone(),
        config.rclone_config.clone(),
        config.remote.clone(),
    );

    let coordinator =
        LinkExportCoordinator::new(Arc::new(http_client), Arc::new(folder_lister), &config)?;

    let completion = match cli.subcommand() {
        Command::Run => {
            let report = coordinator.run().await?;
            info!(
                fetched = report.fetch.records,
                pages = report.fetch.pages,
                matched_links = report.reconcile.matched_links,
                new_candidates = report.reconcile.new_candidates,
                updated_records = report.reconcile.updated_records,
                total_records = report.reconcile.total_records,
                snapshot = %snapshot,
                "Done"
            );
            report.fetch.completion
        }
        Command::Fetch => {
            let outcome = coordinator.fetch_only().await?;
            info!(
                records = outcome.collection.len(),
                pages = outcome.pages,
                snapshot = %snapshot,
                "Done"
            );
            outcome.completion
        }
        Command::Link => {
            let summary = coordinator.link_existing().await?;
            info!(
                matched_links = summary.matched_links,
                new_candidates = summary.new_candidates,
                updated_records = summary.updated_records,
                total_records = summary.total_records,
                snapshot = %snapshot,
                "Done"
            );
            FetchCompletion::Complete
        }
    };

    if let FetchCompletion::Aborted(reason) = completion {
        warn!(reason = %reason, "Collection snapshot is incomplete");
        if cli.fail_on_partial {
            bail!("pagination stopped before the last page: {}", reason);
        }
    }

    Ok(())
}
