use tracing::{debug, info};

use crate::error::DownloadError;

/// Run `player <url>` and wait for it to exit.
pub async fn play(player: &str, url: &str, verbose: bool) -> Result<(), DownloadError> {
    info!("Viewing in player '{player}'...");
    debug!(url, "Player stream");

    let status = process_utils::quiet_command(player, verbose)
        .arg(url)
        .status()
        .await
        .map_err(|e| DownloadError::player(player, e.to_string()))?;

    if !status.success() {
        return Err(DownloadError::player(player, format!("exited with {status}")));
    }
    Ok(())
}
