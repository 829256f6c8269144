//! The three jobs of the publisher: scrape, publish timetables, publish
//! departures.
//!
//! A failure for one route is logged and counted; it never stops the other
//! routes of the same cycle.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveTime;
use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::domain::{DayType, RouteKey, RouteSource, Timetable};
use crate::engine::compute_departures;
use crate::publish::Publisher;
use crate::scrape::TimetableSource;
use crate::store::{TimetableStore, routes_by_day_type};


/// Outcome of a scrape cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrapeSummary {
    /// Routes whose page was fetched and stored.
    pub scraped: usize,
    /// Routes whose page could not be fetched or stored.
    pub failed: usize,
}

/// Outcome of a publish cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishSummary {
    /// Routes with every value published.
    pub published: usize,
    /// Routes with nothing to publish this cycle.
    pub skipped: usize,
    /// Routes where loading or publishing failed.
    pub failed: usize,
}

impl PublishSummary {
    fn record(&mut self, outcome: RouteOutcome) {
        match outcome {
            RouteOutcome::Published => self.published += 1,
            RouteOutcome::Skipped => self.skipped += 1,
            RouteOutcome::Failed => self.failed += 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RouteOutcome {
    Published,
    Skipped,
    Failed,
}

/// Scrapes, stores and publishes timetables for a fixed set of routes.
pub struct ScheduleService<Src, St, P, C> {
    source: Src,
    store: St,
    publisher: P,
    clock: C,
    routes: Vec<RouteSource>,
}

impl<Src, St, P, C> ScheduleService<Src, St, P, C>
where
    Src: TimetableSource,
    St: TimetableStore,
    P: Publisher,
    C: Clock,
{
    pub fn new(source: Src, store: St, publisher: P, clock: C, routes: Vec<RouteSource>) -> Self {
        Self {
            source,
            store,
            publisher,
            clock,
            routes,
        }
    }

    pub fn source(&self) -> &Src {
        &self.source
    }

    pub fn store(&self) -> &St {
        &self.store
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Fetch every configured route and store its timetables.
    ///
    /// All three day types are written for a route whose page was read; a
    /// day type missing from the page is stored as an empty timetable. A
    /// route whose page could not be read keeps its previous files.
    pub async fn scrape(&self) -> ScrapeSummary {
        info!(routes = self.routes.len(), "updating timetables");
        let mut summary = ScrapeSummary::default();

        for source in &self.routes {
            let route = source.route();

            let timetables = match self.source.fetch(source).await {
                Ok(timetables) => timetables,
                Err(e) => {
                    warn!(route = %route, url = source.url(), error = %e, "failed to fetch timetable");
                    summary.failed += 1;
                    continue;
                }
            };

            let mut stored = true;
            for day_type in DayType::ALL {
                let timetable = timetables.get(&day_type).cloned().unwrap_or_default();
                if let Err(e) = self.store.save(route, day_type, &timetable).await {
                    warn!(route = %route, %day_type, error = %e, "failed to store timetable");
                    stored = false;
                } else {
                    debug!(route = %route, %day_type, departures = timetable.len(), "stored timetable");
                }
            }

            if stored {
                summary.scraped += 1;
            } else {
                summary.failed += 1;
            }
        }

        info!(scraped = summary.scraped, failed = summary.failed, "timetable update finished");
        summary
    }

    /// Publish every stored timetable as a `<daytype>_timetable` long-text
    /// entity.
    pub async fn publish_timetables(&self) -> PublishSummary {
        info!("publishing timetables");
        let mut summary = PublishSummary::default();

        let Some(routes) = self.stored_routes().await else {
            summary.failed += 1;
            return summary;
        };

        for (route, day_types) in &routes {
            let mut outcome = RouteOutcome::Skipped;

            for day_type in day_types {
                match self.publish_timetable(route, *day_type).await {
                    RouteOutcome::Failed => outcome = RouteOutcome::Failed,
                    RouteOutcome::Published if outcome == RouteOutcome::Skipped => {
                        outcome = RouteOutcome::Published;
                    }
                    _ => {}
                }
            }

            summary.record(outcome);
        }

        summary
    }

    async fn publish_timetable(&self, route: &RouteKey, day_type: DayType) -> RouteOutcome {
        let timetable = match self.store.load(route, day_type).await {
            Ok(Some(timetable)) => timetable,
            Ok(None) => return RouteOutcome::Skipped,
            Err(e) => {
                warn!(route = %route, %day_type, error = %e, "failed to load timetable");
                return RouteOutcome::Failed;
            }
        };

        let entity = format!("{day_type}_timetable");
        match self
            .publisher
            .publish(route, &entity, &timetable.to_payload(), true)
            .await
        {
            Ok(()) => RouteOutcome::Published,
            Err(e) => {
                warn!(route = %route, entity, error = %e, "failed to publish timetable");
                RouteOutcome::Failed
            }
        }
    }

    /// Publish current/next departure facts for every route that has a
    /// timetable for today's day type.
    pub async fn publish_departures(&self) -> PublishSummary {
        let now = self.clock.now();
        let today = DayType::of(now.date());
        debug!(%today, time = %now.time(), "publishing departures");

        let mut summary = PublishSummary::default();
        let Some(routes) = self.stored_routes().await else {
            summary.failed += 1;
            return summary;
        };

        let mut pending = Vec::new();
        for (route, day_types) in &routes {
            if day_types.contains(&today) {
                pending.push(self.publish_route_departures(route, today, now.time()));
            }
        }

        for outcome in join_all(pending).await {
            summary.record(outcome);
        }
        summary
    }

    async fn publish_route_departures(
        &self,
        route: &RouteKey,
        today: DayType,
        now: NaiveTime,
    ) -> RouteOutcome {
        let timetable = match self.store.load(route, today).await {
            Ok(Some(timetable)) if !timetable.is_empty() => timetable,
            Ok(_) => {
                debug!(route = %route, %today, "no departures today");
                return RouteOutcome::Skipped;
            }
            Err(e) => {
                warn!(route = %route, %today, error = %e, "failed to load timetable");
                return RouteOutcome::Failed;
            }
        };

        let next_day = self.load_next_day(route, today.next()).await;
        let Some(result) = compute_departures(&timetable, next_day.as_ref(), now) else {
            debug!(route = %route, "no upcoming departure known");
            return RouteOutcome::Skipped;
        };

        let mut outcome = RouteOutcome::Published;
        for (entity, value) in result.entities() {
            if let Err(e) = self.publisher.publish(route, entity, &value, false).await {
                warn!(route = %route, entity, error = %e, "failed to publish departure");
                outcome = RouteOutcome::Failed;
            }
        }
        outcome
    }

    /// The next day type's timetable; a load failure counts as absent.
    async fn load_next_day(&self, route: &RouteKey, day_type: DayType) -> Option<Timetable> {
        match self.store.load(route, day_type).await {
            Ok(timetable) => timetable,
            Err(e) => {
                warn!(route = %route, %day_type, error = %e, "failed to load next day timetable");
                None
            }
        }
    }

    async fn stored_routes(&self) -> Option<BTreeMap<RouteKey, BTreeSet<DayType>>> {
        match self.store.keys().await {
            Ok(keys) => Some(routes_by_day_type(keys)),
            Err(e) => {
                warn!(error = %e, "failed to list stored timetables");
                None
            }
        }
    }
}
