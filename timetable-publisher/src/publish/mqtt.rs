//! MQTT publisher with Home Assistant discovery.

use std::time::Duration;

use rumqttc::{AsyncClient, ClientError, EventLoop, MqttOptions, QoS};
use tracing::{debug, warn};

use crate::domain::RouteKey;

use super::Publisher;
use super::discovery::{
    DeviceInfo, DiscoveryConfig, LONG_TEXT_PLACEHOLDER, LongTextAttributes, SensorTopics,
};
use super::error::PublishError;

/// Default discovery prefix Home Assistant listens on.
const DEFAULT_DISCOVERY_PREFIX: &str = "homeassistant";

/// Default node id (topic segment and device identifier).
const DEFAULT_NODE_ID: &str = "stops_lt";

/// Capacity of the client's outgoing request queue.
const REQUEST_QUEUE_CAPACITY: usize = 64;

/// Pause after a connection error before polling again.
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Configuration for the MQTT publisher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MqttConfig {
    /// Broker host name
    pub host: String,
    /// Broker port
    pub port: u16,
    /// Broker user name
    pub username: String,
    /// Broker password
    pub password: String,
    /// Node id used in topics and as the device identifier
    pub node_id: String,
    /// Discovery topic prefix
    pub discovery_prefix: String,
    /// Keep-alive interval in seconds
    pub keep_alive_secs: u64,
}

impl MqttConfig {
    /// Create a new config for a broker with credentials.
    pub fn new(
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            username: username.into(),
            password: password.into(),
            node_id: DEFAULT_NODE_ID.to_string(),
            discovery_prefix: DEFAULT_DISCOVERY_PREFIX.to_string(),
            keep_alive_secs: 30,
        }
    }

    /// Set the node id.
    pub fn with_node_id(mut self, node_id: impl Into<String>) -> Self {
        self.node_id = node_id.into();
        self
    }

    /// Set the discovery prefix.
    pub fn with_discovery_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.discovery_prefix = prefix.into();
        self
    }
}

/// Publishes route facts as retained Home Assistant sensors.
///
/// Every publication sends the sensor's discovery config, then its state,
/// then (for long values) its attributes, all at QoS 1 and retained.
#[derive(Clone)]
pub struct MqttPublisher {
    client: AsyncClient,
    node_id: String,
    discovery_prefix: String,
    device: DeviceInfo,
}

impl MqttPublisher {
    /// Create a publisher and the event loop that carries its traffic.
    ///
    /// Nothing is sent until the event loop is driven, see
    /// [`drive_event_loop`].
    pub fn new(config: &MqttConfig) -> (Self, EventLoop) {
        let mut options = MqttOptions::new(
            format!("{}-publisher", config.node_id),
            config.host.clone(),
            config.port,
        );
        options.set_keep_alive(Duration::from_secs(config.keep_alive_secs));
        options.set_credentials(config.username.clone(), config.password.clone());

        let (client, event_loop) = AsyncClient::new(options, REQUEST_QUEUE_CAPACITY);

        let publisher = Self {
            client,
            node_id: config.node_id.clone(),
            discovery_prefix: config.discovery_prefix.clone(),
            device: DeviceInfo::new(&config.node_id),
        };

        (publisher, event_loop)
    }

    /// Queue one retained message without waiting for room in the queue.
    ///
    /// While the broker is unreachable the event loop stops draining the
    /// queue; once it is full, messages are dropped with an error.
    fn send(&self, topic: &str, payload: String) -> Result<(), PublishError> {
        match self.client.try_publish(topic, QoS::AtLeastOnce, true, payload) {
            Ok(()) => Ok(()),
            Err(ClientError::TryRequest(_)) => Err(PublishError::QueueFull {
                topic: topic.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }
}

impl Publisher for MqttPublisher {
    async fn publish(
        &self,
        route: &RouteKey,
        entity: &str,
        value: &str,
        is_long_text: bool,
    ) -> Result<(), PublishError> {
        let topics = SensorTopics::new(&self.discovery_prefix, &self.node_id, route, entity);
        let config = serde_json::to_string(&DiscoveryConfig::new(
            &self.node_id,
            route,
            entity,
            &topics,
            &self.device,
        ))?;

        self.send(&topics.config, config)?;

        if is_long_text {
            let attributes = serde_json::to_string(&LongTextAttributes { long_text: value })?;
            self.send(&topics.state, LONG_TEXT_PLACEHOLDER.to_string())?;
            self.send(&topics.attributes, attributes)?;
        } else {
            self.send(&topics.state, value.to_string())?;
        }

        debug!(route = %route, entity, "published");
        Ok(())
    }
}

/// Drive the MQTT connection forever, reconnecting after errors.
///
/// Run this in its own task; publications queue up in the client until the
/// event loop delivers them.
pub async fn drive_event_loop(mut event_loop: EventLoop) {
    loop {
        match event_loop.poll().await {
            Ok(event) => debug!(?event, "mqtt event"),
            Err(e) => {
                warn!(error = %e, "mqtt connection error, retrying");
                tokio::time::sleep(RECONNECT_DELAY).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = MqttConfig::new("broker.local", 1883, "user", "secret");
        assert_eq!(config.host, "broker.local");
        assert_eq!(config.port, 1883);
        assert_eq!(config.node_id, "stops_lt");
        assert_eq!(config.discovery_prefix, "homeassistant");
        assert_eq!(config.keep_alive_secs, 30);
    }

    #[test]
    fn config_builders() {
        let config = MqttConfig::new("broker.local", 1883, "user", "secret")
            .with_node_id("buses")
            .with_discovery_prefix("ha");
        assert_eq!(config.node_id, "buses");
        assert_eq!(config.discovery_prefix, "ha");
    }

    #[tokio::test]
    async fn publish_queues_without_connection() {
        // Requests are queued in the client; the event loop is never driven
        let config = MqttConfig::new("localhost", 1883, "user", "secret");
        let (publisher, _event_loop) = MqttPublisher::new(&config);
        let route = RouteKey::new("4g", "0705", "a-b").unwrap();

        publisher
            .publish(&route, "current_departure", "07:30", false)
            .await
            .unwrap();
        publisher
            .publish(&route, "workday_timetable", "06:00,06:30", true)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn full_queue_drops_instead_of_waiting() {
        // Nothing drains the queue, as when the broker is unreachable
        let config = MqttConfig::new("localhost", 1883, "user", "secret");
        let (publisher, _event_loop) = MqttPublisher::new(&config);
        let route = RouteKey::new("4g", "0705", "a-b").unwrap();

        let outcomes = tokio::time::timeout(Duration::from_secs(5), async {
            let mut outcomes = Vec::new();
            for minute in 0..REQUEST_QUEUE_CAPACITY {
                let value = format!("07:{:02}", minute % 60);
                outcomes.push(
                    publisher
                        .publish(&route, "current_departure", &value, false)
                        .await,
                );
            }
            outcomes
        })
        .await
        .expect("publishing must not wait for the broker");

        // Two messages per publication: the first half fills the queue
        let accepted = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
        assert_eq!(accepted, REQUEST_QUEUE_CAPACITY / 2);
        assert!(outcomes[REQUEST_QUEUE_CAPACITY / 2..]
            .iter()
            .all(|outcome| matches!(outcome, Err(PublishError::QueueFull { .. }))));
    }
}
