use anyhow::Context;
use clap::Parser;
use kvartali::cli::Cli;
use kvartali::config::Config;
use kvartali::worker::{SnapshotWorker, reload, spawn_snapshot_worker};
use kvartali::{RatingsServer, ServerContext, snapshot};
use rmcp::{ServiceExt, transport::stdio};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    kvartali::tracing::init(cli.verbose, cli.log_format);

    let mut config = Config::discover(cli.config.as_deref())?;
    cli.apply(&mut config);
    config.validate()?;

    tracing::info!(
        city = %config.default_city,
        location_type = %config.default_location_type,
        "Starting kvartali MCP server"
    );

    let context = ServerContext::new(config);
    let shutdown = CancellationToken::new();

    let worker = match context.config().snapshot.path.clone() {
        Some(path) => {
            reload(context.state(), &path)
                .await
                .context("Failed to load initial snapshot")?;
            let snapshot_config = &context.config().snapshot;
            let mut worker = SnapshotWorker::new(
                context.state().clone(),
                path.clone(),
                snapshot_config.poll_interval(),
                context.config().search.debounce(),
            );
            if let Ok(modified) = snapshot::modified(&path).await {
                worker = worker.with_last_seen(modified);
            }
            Some(spawn_snapshot_worker(worker, shutdown.clone()))
        }
        None => {
            tracing::warn!("No snapshot file configured, serving an empty snapshot");
            None
        }
    };

    let server = RatingsServer::new(context);
    let service = server.serve(stdio()).await.inspect_err(|e| {
        tracing::error!("Error serving MCP server: {:?}", e);
    })?;

    service.waiting().await?;

    shutdown.cancel();
    if let Some(handle) = worker {
        handle.await.ok();
    }

    Ok(())
}
