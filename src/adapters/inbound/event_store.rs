use crate::common::{EventEnvelope, EventStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Editor journal kept in memory, one stream per editor id.
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    streams: RwLock<HashMap<String, Vec<EventEnvelope>>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of events stored for one editor.
    pub async fn stream_len(&self, aggregate_id: &str) -> usize {
        self.streams
            .read()
            .await
            .get(aggregate_id)
            .map_or(0, Vec::len)
    }

    pub async fn event_types(&self, aggregate_id: &str) -> Vec<String> {
        self.streams
            .read()
            .await
            .get(aggregate_id)
            .map(|events| events.iter().map(|e| e.event_type.clone()).collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn append_events(
        &self,
        aggregate_id: &str,
        expected_version: u64,
        events: Vec<EventEnvelope>,
    ) -> Result<(), String> {
        let mut streams = self.streams.write().await;
        let stream = streams.entry(aggregate_id.to_string()).or_default();

        // Optimistic concurrency: the caller must have seen every stored event.
        let current_version = stream.len() as u64;
        if current_version != expected_version {
            return Err(format!(
                "Version mismatch for {}: expected {}, stream is at {}",
                aggregate_id, expected_version, current_version
            ));
        }

        for (offset, event) in events.iter().enumerate() {
            let expected = current_version + offset as u64 + 1;
            if event.sequence != expected {
                return Err(format!(
                    "Out-of-sequence event for {}: got {}, expected {}",
                    aggregate_id, event.sequence, expected
                ));
            }
        }

        stream.extend(events);
        Ok(())
    }

    async fn stream_version(&self, aggregate_id: &str) -> Result<u64, String> {
        Ok(self.stream_len(aggregate_id).await as u64)
    }

    async fn load_events(&self, aggregate_id: &str, after: u64) -> Result<Vec<EventEnvelope>, String> {
        let streams = self.streams.read().await;
        Ok(streams
            .get(aggregate_id)
            .map(|events| events.iter().filter(|e| e.sequence > after).cloned().collect())
            .unwrap_or_default())
    }

    async fn load_events_by_type(
        &self,
        event_type: &str,
        from_timestamp: Option<DateTime<Utc>>,
    ) -> Result<Vec<EventEnvelope>, String> {
        let streams = self.streams.read().await;

        let mut matching: Vec<EventEnvelope> = streams
            .values()
            .flatten()
            .filter(|e| e.event_type == event_type)
            .filter(|e| from_timestamp.map_or(true, |from| e.occurred_at >= from))
            .cloned()
            .collect();

        matching.sort_by(|a, b| a.occurred_at.cmp(&b.occurred_at));
        Ok(matching)
    }
}
