//! Completion waiting: suspend until the download is believed stable.

use linkarr_config::CompletionStrategy;
use linkarr_core::{DownloadActivity, DownloadClient, ReconcileError, ReconcileResult};
use tracing::{debug, info};

/// Wait until the download's files are expected to be finalised on disk.
///
/// With [`CompletionStrategy::Poll`] the download client's activity is
/// consulted on a bounded interval; `Missing` is tolerated while polling
/// because the grab event can arrive before the client has registered the
/// download. With [`CompletionStrategy::FixedDelay`] a single quiescence
/// delay is applied without consulting the client, matching the original
/// deployed behavior.
///
/// # Errors
///
/// Returns [`ReconcileError::CompletionTimeout`] when polling exhausts its
/// attempt budget, or a download error when the status query itself fails.
pub async fn wait_for_completion(
    client: &dyn DownloadClient,
    download_id: &str,
    strategy: CompletionStrategy,
) -> ReconcileResult<()> {
    match strategy {
        CompletionStrategy::FixedDelay(delay) => {
            debug!(download_id, delay_secs = delay.as_secs(), "fixed quiescence delay");
            tokio::time::sleep(delay).await;
            Ok(())
        }
        CompletionStrategy::Poll {
            interval,
            max_attempts,
        } => {
            for attempt in 1..=max_attempts {
                let activity = client
                    .activity(download_id)
                    .await
                    .map_err(|err| ReconcileError::download("activity", download_id, err))?;
                match activity {
                    DownloadActivity::Stable => {
                        info!(download_id, attempt, "download stable");
                        return Ok(());
                    }
                    DownloadActivity::Writing | DownloadActivity::Missing => {
                        debug!(download_id, attempt, activity = ?activity, "download not ready");
                    }
                }
                if attempt < max_attempts {
                    tokio::time::sleep(interval).await;
                }
            }
            Err(ReconcileError::CompletionTimeout {
                download_id: download_id.to_string(),
                attempts: max_attempts,
            })
        }
    }
}
