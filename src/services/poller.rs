//! Fixed-interval seat-status polling.
//!
//! Each tick issues an independent fetch: a slow response never delays the
//! next tick, and overlapping fetches are resolved by completion order
//! (whichever seat list arrives last replaces the cache). A transiently
//! stale overwrite self-heals on the next tick.

use tokio::task::JoinHandle;
use tokio::time::{self, Duration, MissedTickBehavior};
use tracing::debug;

use crate::api_client::EventApi;
use crate::services::session::{Dashboard, Notifier};

/// Owns the polling task; dropping the handle aborts it, so the interval is
/// torn down on every exit path of the owning scope.
pub struct PollHandle {
    task: JoinHandle<()>,
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub fn start<S, N>(dashboard: Dashboard<S, N>, interval: Duration) -> PollHandle
where
    S: EventApi + 'static,
    N: Notifier + 'static,
{
    let task = tokio::spawn(async move {
        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            debug!("Poll tick, refreshing seats");
            let dashboard = dashboard.clone();
            tokio::spawn(async move {
                dashboard.refresh().await;
            });
        }
    });
    PollHandle { task }
}
