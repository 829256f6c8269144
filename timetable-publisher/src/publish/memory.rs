//! Recording publisher for tests and dry runs.

use std::collections::HashSet;
use std::sync::Mutex;

use crate::domain::RouteKey;

use super::Publisher;
use super::error::PublishError;

/// One recorded publication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publication {
    pub route: RouteKey,
    pub entity: String,
    pub value: String,
    pub is_long_text: bool,
}

/// Publisher that keeps every publication in memory.
///
/// Routes can be marked as failing to exercise error paths.
#[derive(Debug, Default)]
pub struct MemoryPublisher {
    publications: Mutex<Vec<Publication>>,
    failing: Mutex<HashSet<RouteKey>>,
}

impl MemoryPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every publication for `route` from now on.
    pub fn fail_route(&self, route: RouteKey) {
        self.failing
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(route);
    }

    /// Everything published so far, in order.
    pub fn publications(&self) -> Vec<Publication> {
        self.publications
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// The most recent value published for a route entity.
    pub fn latest(&self, route: &RouteKey, entity: &str) -> Option<String> {
        self.publications
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .rev()
            .find(|p| &p.route == route && p.entity == entity)
            .map(|p| p.value.clone())
    }

    /// How many times a route entity was published.
    pub fn count(&self, route: &RouteKey, entity: &str) -> usize {
        self.publications
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|p| &p.route == route && p.entity == entity)
            .count()
    }

    /// Forget everything published so far.
    pub fn clear(&self) {
        self.publications
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}

impl Publisher for MemoryPublisher {
    async fn publish(
        &self,
        route: &RouteKey,
        entity: &str,
        value: &str,
        is_long_text: bool,
    ) -> Result<(), PublishError> {
        let failing = self
            .failing
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(route);
        if failing {
            return Err(PublishError::Unavailable(format!("route {route} rejected")));
        }

        self.publications
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(Publication {
                route: route.clone(),
                entity: entity.to_string(),
                value: value.to_string(),
                is_long_text,
            });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route() -> RouteKey {
        RouteKey::new("4g", "0705", "a-b").unwrap()
    }

    #[tokio::test]
    async fn records_publications() {
        let publisher = MemoryPublisher::new();

        publisher.publish(&route(), "current_departure", "07:00", false).await.unwrap();
        publisher.publish(&route(), "current_departure", "07:30", false).await.unwrap();

        assert_eq!(publisher.publications().len(), 2);
        assert_eq!(publisher.latest(&route(), "current_departure").as_deref(), Some("07:30"));
        assert_eq!(publisher.count(&route(), "current_departure"), 2);
        assert!(publisher.latest(&route(), "next_departure").is_none());

        publisher.clear();
        assert!(publisher.publications().is_empty());
    }

    #[tokio::test]
    async fn failing_route_is_rejected() {
        let publisher = MemoryPublisher::new();
        publisher.fail_route(route());

        let err = publisher
            .publish(&route(), "current_departure", "07:00", false)
            .await
            .unwrap_err();
        assert!(matches!(err, PublishError::Unavailable(_)));
        assert!(publisher.publications().is_empty());
    }
}
