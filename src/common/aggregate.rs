use crate::common::DomainEvent;
use serde::{Deserialize, Serialize};

pub trait AggregateRoot: Send + Sync {
    type Event: DomainEvent + Serialize + for<'de> Deserialize<'de>;

    const AGGREGATE_TYPE: &'static str;

    fn aggregate_id(&self) -> &str;
    fn version(&self) -> u64;

    /// Get uncommitted events
    fn uncommitted_events(&self) -> &[Self::Event];

    /// Mark events as committed
    fn mark_events_as_committed(&mut self);

    /// Record a new event and bump the aggregate version
    fn add_event(&mut self, event: Self::Event);

    /// Drain uncommitted events for hand-off to an event store
    fn take_uncommitted_events(&mut self) -> Vec<Self::Event> {
        let events = self.uncommitted_events().to_vec();
        self.mark_events_as_committed();
        events
    }
}
