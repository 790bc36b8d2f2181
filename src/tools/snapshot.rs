use crate::context::ServerContext;
use crate::worker::reload;

/// Reload the configured snapshot file now instead of waiting for the worker.
pub async fn handle_reload_snapshot(ctx: &ServerContext) -> Result<String, String> {
    let path = ctx
        .config()
        .snapshot
        .path
        .as_deref()
        .ok_or_else(|| "No snapshot file configured. Start with --snapshot PATH.".to_string())?;

    let generation = reload(ctx.state(), path)
        .await
        .map_err(|e| format!("Failed to reload snapshot (previous one kept): {:#}", e))?;
    let records = ctx.state().read().await.snapshot().len();
    Ok(format!(
        "Loaded {} records from {} (generation {}).",
        records,
        path.display(),
        generation
    ))
}
