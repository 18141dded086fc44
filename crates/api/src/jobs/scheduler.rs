use chrono::{DateTime, Duration, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::sync::Arc;
use tokio::task::JoinHandle;

use salonbook_core::clock::Clock;
use salonbook_core::config::SchedulingConfig;

use super::DailyJob;

/// Longest DST gap searched past a trigger time
const MAX_GAP_MINUTES: i64 = 180;

/// First instant strictly after `now` whose wall-clock time in `tz` is `at`.
///
/// On a day where `at` falls into a DST gap, the job runs at the first wall
/// clock minute after the gap.
pub fn next_run_after(now: DateTime<Utc>, at: NaiveTime, tz: Tz) -> DateTime<Utc> {
    let local_today = now.with_timezone(&tz).date_naive();

    for offset in 0..=3 {
        let date = local_today + Duration::days(offset);
        if let Some(candidate) = earliest_on_or_after(tz, date.and_time(at)) {
            if candidate > now {
                return candidate;
            }
        }
    }

    now + Duration::days(1)
}

fn earliest_on_or_after(tz: Tz, local: NaiveDateTime) -> Option<DateTime<Utc>> {
    (0..=MAX_GAP_MINUTES).find_map(|minutes| {
        tz.from_local_datetime(&(local + Duration::minutes(minutes)))
            .earliest()
            .map(|instant| instant.with_timezone(&Utc))
    })
}

/// Runs `job` every day at its trigger time until the task is aborted.
pub fn spawn_daily(job: Arc<dyn DailyJob>, clock: Arc<dyn Clock>, config: Arc<SchedulingConfig>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let now = clock.now();
            let next = next_run_after(now, job.run_at(), config.timezone);
            tracing::debug!("Job {} next runs at {}", job.name(), next);

            let wait = (next - now).to_std().unwrap_or_default();
            tokio::time::sleep(wait).await;

            let today = config.today(clock.now());
            match job.run(today).await {
                Ok(report) => tracing::info!("Job {} finished for {}: {}", job.name(), today, report),
                Err(e) => tracing::error!("Job {} failed for {}: {}", job.name(), today, e),
            }
        }
    })
}
