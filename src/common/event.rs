use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub trait DomainEvent: Send + Sync + Clone {
    fn event_type(&self) -> &'static str;
    fn aggregate_id(&self) -> &str;
    fn occurred_at(&self) -> DateTime<Utc>;
}

/// A journalled event as stored: the serialized payload plus its place in the stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub event_id: Uuid,
    pub aggregate_id: String,
    pub aggregate_type: String,
    pub event_type: String,
    /// 1-based position in the aggregate's stream.
    pub sequence: u64,
    pub payload: serde_json::Value,
    /// Component that recorded the event.
    pub source: String,
    pub occurred_at: DateTime<Utc>,
}

impl EventEnvelope {
    pub fn seal<E: DomainEvent + Serialize>(
        event: &E,
        aggregate_type: &str,
        sequence: u64,
        source: &str,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            event_id: Uuid::new_v4(),
            aggregate_id: event.aggregate_id().to_string(),
            aggregate_type: aggregate_type.to_string(),
            event_type: event.event_type().to_string(),
            sequence,
            payload: serde_json::to_value(event)?,
            source: source.to_string(),
            occurred_at: event.occurred_at(),
        })
    }

    pub fn decode<E: DeserializeOwned>(&self) -> Result<E, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }
}

/// Append-only journal of editor changes.
#[async_trait::async_trait]
pub trait EventStore: Send + Sync {
    /// Append to a stream. Fails unless the stream holds exactly
    /// `expected_version` events.
    async fn append_events(
        &self,
        aggregate_id: &str,
        expected_version: u64,
        events: Vec<EventEnvelope>,
    ) -> Result<(), String>;

    /// Number of events stored for an aggregate.
    async fn stream_version(&self, aggregate_id: &str) -> Result<u64, String>;

    /// Events with `sequence > after`, oldest first.
    async fn load_events(&self, aggregate_id: &str, after: u64) -> Result<Vec<EventEnvelope>, String>;

    async fn load_events_by_type(
        &self,
        event_type: &str,
        from_timestamp: Option<DateTime<Utc>>,
    ) -> Result<Vec<EventEnvelope>, String>;
}
