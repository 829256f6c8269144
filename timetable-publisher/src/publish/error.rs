//! Publisher error types.

/// Errors that can occur when handing a value to the broker.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// MQTT client rejected the request (request queue closed)
    #[error("MQTT client error: {0}")]
    Client(#[from] rumqttc::ClientError),

    /// Request queue is full or closed; the message was dropped
    #[error("MQTT request queue unavailable, dropped message for {topic}")]
    QueueFull { topic: String },

    /// Discovery payload could not be encoded
    #[error("failed to encode payload: {0}")]
    Encode(#[from] serde_json::Error),

    /// Sink is not accepting publications
    #[error("publisher unavailable: {0}")]
    Unavailable(String),
}
