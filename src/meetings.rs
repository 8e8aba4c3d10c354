use crate::services::meetings::MeetingScheduler;
use chrono::Local;
use tokio::time::{interval, Duration};
use tracing::{debug, info};

/// Drives [`MeetingScheduler::check_due`] on a fixed tick against local
/// wall-clock time.
pub struct MeetingDispatcher {
    scheduler: MeetingScheduler,
    poll_interval: Duration,
}

impl MeetingDispatcher {
    pub fn new(scheduler: MeetingScheduler, poll_interval_secs: u64) -> Self {
        Self {
            scheduler,
            poll_interval: Duration::from_secs(poll_interval_secs.max(1)),
        }
    }

    pub async fn run(self) {
        info!(
            "Meeting dispatcher started (every {:?})",
            self.poll_interval
        );
        let mut ticker = interval(self.poll_interval);
        loop {
            ticker.tick().await;
            let now = Local::now().naive_local();
            match self.scheduler.check_due(now).await {
                0 => debug!("Meeting dispatcher: nothing due"),
                n => info!("Meeting dispatcher: fired {} meeting(s)", n),
            }
        }
    }
}
