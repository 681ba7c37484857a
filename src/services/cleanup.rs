//! Periodic deletion of stale rooms so the database never accumulates dead
//! classroom sessions.

use std::time::Duration;

use chrono::{Duration as Retention, Utc};
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::dao::models::RoomStatus;
use crate::dao::store;
use crate::state::SharedState;

/// Time between cleanup passes.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(6 * 60 * 60);
/// Finished rooms are kept for a day so students can revisit the summary.
const FINISHED_RETENTION_HOURS: i64 = 24;
/// Waiting or playing rooms idle this long are considered abandoned.
const ACTIVE_RETENTION_HOURS: i64 = 2;

/// Run cleanup passes until the shutdown signal fires.
pub async fn run(state: SharedState, mut shutdown: watch::Receiver<bool>) {
    loop {
        tokio::select! {
            _ = sleep(SWEEP_INTERVAL) => {
                match sweep(&state).await {
                    Ok((finished, stale)) => {
                        info!(finished, stale, "cleanup pass completed");
                    }
                    Err(err) => warn!(error = %err, "cleanup pass failed"),
                }
            }
            _ = shutdown.changed() => {
                info!("cleanup task stopping");
                return;
            }
        }
    }
}

/// One cleanup pass. Returns (finished rooms deleted, stale rooms deleted).
pub async fn sweep(state: &SharedState) -> Result<(usize, usize), sqlx::Error> {
    let finished_cutoff = Utc::now() - Retention::hours(FINISHED_RETENTION_HOURS);
    let finished = store::delete_rooms_idle_since(
        state.db(),
        &[RoomStatus::Finished],
        finished_cutoff,
    )
    .await?;
    for (room_id, code) in &finished {
        debug!(%room_id, code, "deleted finished room");
    }

    let stale_cutoff = Utc::now() - Retention::hours(ACTIVE_RETENTION_HOURS);
    let stale = store::delete_rooms_idle_since(
        state.db(),
        &[RoomStatus::Waiting, RoomStatus::Playing],
        stale_cutoff,
    )
    .await?;
    for (room_id, code) in &stale {
        debug!(%room_id, code, "deleted stale room");
    }

    Ok((finished.len(), stale.len()))
}
