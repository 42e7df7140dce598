use std::{sync::Arc, time::Duration};

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::{
    client::SessionService,
    session::{Session, SessionCode},
};

/// Interval between session polls while a session view is live.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Poll `code` on a fixed interval, publishing snapshots into a watch channel.
///
/// The first poll fires immediately. Failed polls and absent results keep
/// the last published snapshot so one bad poll never blanks a live view.
/// Dropping every receiver stops the task.
pub fn spawn_session_poller(
    service: Arc<dyn SessionService>,
    code: SessionCode,
    interval: Duration,
) -> watch::Receiver<Option<Session>> {
    let (tx, rx) = watch::channel(None);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = tx.closed() => break,
                _ = ticker.tick() => {
                    match service.get_session(code.to_string()).await {
                        Ok(Some(session)) => {
                            tx.send_replace(Some(session));
                        }
                        Ok(None) => {
                            warn!(code = %code, "session poll found no session; keeping last snapshot");
                        }
                        Err(err) => {
                            warn!(code = %code, error = %err, "session poll failed; keeping last snapshot");
                        }
                    }
                }
            }
        }

        debug!(code = %code, "session poller stopped");
    });

    rx
}
