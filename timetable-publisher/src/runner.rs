//! Periodic job scheduling.
//!
//! After one initial cycle, each job runs in its own task on its own
//! cadence, so a slow scrape never delays the departure updates.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::publish::Publisher;
use crate::scrape::TimetableSource;
use crate::service::ScheduleService;
use crate::store::TimetableStore;

/// Default time between scrapes.
pub const DEFAULT_SCRAPE_INTERVAL: Duration = Duration::from_secs(12 * 60 * 60);

/// Default time between timetable publications.
pub const DEFAULT_TIMETABLE_INTERVAL: Duration = Duration::from_secs(6 * 60 * 60);

/// Default time between departure publications.
pub const DEFAULT_DEPARTURE_INTERVAL: Duration = Duration::from_secs(10);

/// Cadence of each job. Every interval must be non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Intervals {
    pub scrape: Duration,
    pub timetables: Duration,
    pub departures: Duration,
}

impl Default for Intervals {
    fn default() -> Self {
        Self {
            scrape: DEFAULT_SCRAPE_INTERVAL,
            timetables: DEFAULT_TIMETABLE_INTERVAL,
            departures: DEFAULT_DEPARTURE_INTERVAL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Job {
    Scrape,
    PublishTimetables,
    PublishDepartures,
}

impl Job {
    fn name(self) -> &'static str {
        match self {
            Job::Scrape => "scrape",
            Job::PublishTimetables => "publish_timetables",
            Job::PublishDepartures => "publish_departures",
        }
    }
}

/// Runs the service's jobs.
pub struct ScheduleRunner<Src, St, P, C> {
    service: Arc<ScheduleService<Src, St, P, C>>,
    intervals: Intervals,
}

impl<Src, St, P, C> ScheduleRunner<Src, St, P, C>
where
    Src: TimetableSource + 'static,
    St: TimetableStore + 'static,
    P: Publisher + 'static,
    C: Clock + 'static,
{
    pub fn new(service: ScheduleService<Src, St, P, C>, intervals: Intervals) -> Self {
        Self {
            service: Arc::new(service),
            intervals,
        }
    }

    pub fn service(&self) -> &Arc<ScheduleService<Src, St, P, C>> {
        &self.service
    }

    /// Run the initial cycle, then start the periodic tasks.
    ///
    /// The initial cycle scrapes first so the first publications see fresh
    /// timetables.
    pub async fn start(self) -> RunnerHandle {
        info!("running initial cycle");
        for job in [Job::Scrape, Job::PublishDepartures, Job::PublishTimetables] {
            run_job(&self.service, job).await;
        }

        let tasks = vec![
            spawn_job(Arc::clone(&self.service), Job::Scrape, self.intervals.scrape),
            spawn_job(
                Arc::clone(&self.service),
                Job::PublishTimetables,
                self.intervals.timetables,
            ),
            spawn_job(
                Arc::clone(&self.service),
                Job::PublishDepartures,
                self.intervals.departures,
            ),
        ];

        info!(
            scrape_secs = self.intervals.scrape.as_secs(),
            timetable_secs = self.intervals.timetables.as_secs(),
            departure_secs = self.intervals.departures.as_secs(),
            "scheduler started"
        );

        RunnerHandle { tasks }
    }
}

/// Handle to the running periodic tasks.
#[derive(Debug)]
pub struct RunnerHandle {
    tasks: Vec<JoinHandle<()>>,
}

impl RunnerHandle {
    /// Stop every periodic task and wait for them to wind down.
    pub async fn shutdown(self) {
        for task in &self.tasks {
            task.abort();
        }
        for task in self.tasks {
            // Aborted tasks resolve to a cancellation error
            let _ = task.await;
        }
        info!("scheduler stopped");
    }
}

fn spawn_job<Src, St, P, C>(
    service: Arc<ScheduleService<Src, St, P, C>>,
    job: Job,
    period: Duration,
) -> JoinHandle<()>
where
    Src: TimetableSource + 'static,
    St: TimetableStore + 'static,
    P: Publisher + 'static,
    C: Clock + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        interval.tick().await; // First tick is immediate, the initial cycle covered it
        loop {
            interval.tick().await;
            run_job(&service, job).await;
        }
    })
}

async fn run_job<Src, St, P, C>(service: &ScheduleService<Src, St, P, C>, job: Job)
where
    Src: TimetableSource,
    St: TimetableStore,
    P: Publisher,
    C: Clock,
{
    match job {
        Job::Scrape => {
            service.scrape().await;
        }
        Job::PublishTimetables => {
            let summary = service.publish_timetables().await;
            info!(
                published = summary.published,
                skipped = summary.skipped,
                failed = summary.failed,
                "timetables published"
            );
        }
        Job::PublishDepartures => {
            let summary = service.publish_departures().await;
            debug!(
                published = summary.published,
                skipped = summary.skipped,
                failed = summary.failed,
                "departures published"
            );
        }
    }
    debug!(job = job.name(), "job finished");
}
