//! Home Assistant MQTT discovery topics and payloads.

use serde::Serialize;

use crate::domain::RouteKey;

/// State shown for sensors whose value is carried in the attributes.
pub const LONG_TEXT_PLACEHOLDER: &str = "Long text stored in attributes";

/// Topics of one sensor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorTopics {
    pub config: String,
    pub state: String,
    pub attributes: String,
}

impl SensorTopics {
    /// Topics for a route entity:
    /// `<prefix>/sensor/<node_id>/<bus>_<stop>_<direction>_<entity>/{config,state,attributes}`.
    pub fn new(prefix: &str, node_id: &str, route: &RouteKey, entity: &str) -> Self {
        let base = format!("{prefix}/sensor/{node_id}/{route}_{entity}");
        Self {
            config: format!("{base}/config"),
            state: format!("{base}/state"),
            attributes: format!("{base}/attributes"),
        }
    }
}

/// Device block shared by every sensor of this publisher.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceInfo {
    pub identifiers: Vec<String>,
    pub name: String,
    pub model: String,
    pub manufacturer: String,
}

impl DeviceInfo {
    pub fn new(node_id: &str) -> Self {
        Self {
            identifiers: vec![node_id.to_string()],
            name: "Autobusų tvarkaraštis".to_string(),
            model: "Timetable Publisher".to_string(),
            manufacturer: "stops.lt".to_string(),
        }
    }
}

/// Sensor discovery payload.
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveryConfig<'a> {
    pub name: String,
    pub unique_id: String,
    pub state_topic: &'a str,
    pub json_attributes_topic: &'a str,
    pub device: &'a DeviceInfo,
    pub enabled_by_default: bool,
}

impl<'a> DiscoveryConfig<'a> {
    pub fn new(
        node_id: &str,
        route: &RouteKey,
        entity: &str,
        topics: &'a SensorTopics,
        device: &'a DeviceInfo,
    ) -> Self {
        Self {
            name: format!(
                "{} {} {} {}",
                route.bus_number(),
                route.stop_id(),
                route.direction(),
                entity_title(entity)
            ),
            unique_id: format!(
                "{node_id}_{entity}_{}_{}_{}",
                route.bus_number(),
                route.stop_id(),
                route.direction()
            ),
            state_topic: &topics.state,
            json_attributes_topic: &topics.attributes,
            device,
            enabled_by_default: true,
        }
    }
}

/// Attributes payload carrying a long value.
#[derive(Debug, Serialize)]
pub(crate) struct LongTextAttributes<'a> {
    pub long_text: &'a str,
}

/// "next_departure_remaining" → "Next Departure Remaining".
fn entity_title(entity: &str) -> String {
    entity
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
