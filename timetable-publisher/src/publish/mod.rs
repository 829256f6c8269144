//! Publication of timetable facts.
//!
//! Every published value is an (entity, value) pair scoped to a route, for
//! example `current_departure = "07:30"`. The MQTT publisher exposes each
//! pair as a Home Assistant sensor via MQTT discovery.

mod discovery;
mod error;
mod memory;
mod mqtt;

use std::future::Future;

use crate::domain::RouteKey;

pub use discovery::{DeviceInfo, DiscoveryConfig, LONG_TEXT_PLACEHOLDER, SensorTopics};
pub use error::PublishError;
pub use memory::{MemoryPublisher, Publication};
pub use mqtt::{MqttConfig, MqttPublisher, drive_event_loop};

/// Sink for route facts.
///
/// Publication is fire-and-forget from the caller's point of view: an error
/// is reported so it can be logged, never retried.
pub trait Publisher: Send + Sync {
    /// Publish one value for a route.
    ///
    /// `is_long_text` marks values too long for a sensor state (whole
    /// timetables); they travel as an attribute instead.
    fn publish(
        &self,
        route: &RouteKey,
        entity: &str,
        value: &str,
        is_long_text: bool,
    ) -> impl Future<Output = Result<(), PublishError>> + Send;
}
