use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use timetable_publisher::clock::SystemClock;
use timetable_publisher::config::ServiceConfig;
use timetable_publisher::publish::{MqttPublisher, drive_event_loop};
use timetable_publisher::runner::ScheduleRunner;
use timetable_publisher::scrape::HttpTimetableSource;
use timetable_publisher::service::ScheduleService;
use timetable_publisher::store::{CachedTimetableStore, FileTimetableStore};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match ServiceConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let source = match HttpTimetableSource::new(config.scraper.clone()) {
        Ok(source) => source,
        Err(e) => {
            error!(error = %e, "failed to create HTTP client");
            return ExitCode::FAILURE;
        }
    };

    let store = CachedTimetableStore::new(FileTimetableStore::new(&config.data_dir), &config.cache);

    let (publisher, event_loop) = MqttPublisher::new(&config.mqtt);
    let mqtt_task = tokio::spawn(drive_event_loop(event_loop));

    info!(
        routes = config.routes.len(),
        data_dir = %config.data_dir.display(),
        broker = %format!("{}:{}", config.mqtt.host, config.mqtt.port),
        "starting timetable publisher"
    );

    let service = ScheduleService::new(source, store, publisher, SystemClock, config.routes);
    let handle = ScheduleRunner::new(service, config.intervals).start().await;

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
    }

    info!("shutting down");
    handle.shutdown().await;
    mqtt_task.abort();

    ExitCode::SUCCESS
}
