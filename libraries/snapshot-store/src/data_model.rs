use chrono::{DateTime, Utc};

/// An event that can be stored alongside a snapshot. Implementors usually
/// wrap themselves in a versioned enum so old events keep deserializing.
pub trait Event: Clone + Sized {
    fn to_json(&self) -> Result<serde_json::Value, serde_json::Error>;
    fn from_json(json: &serde_json::Value) -> Result<Self, serde_json::Error>;
}

/// An event together with when it happened. Ordering is by timestamp first,
/// then by the index the device assigned it, so replay is deterministic even
/// when two events share a timestamp.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct Timestamped<E> {
    pub timestamp: DateTime<Utc>,
    pub within_device_events_index: usize,
    pub event: E,
}

impl<E> Timestamped<E> {
    pub fn new(timestamp: DateTime<Utc>, within_device_events_index: usize, event: E) -> Self {
        Self {
            timestamp,
            within_device_events_index,
            event,
        }
    }

    pub fn timestamp_millis(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }

    pub fn as_ref(&self) -> Timestamped<&E> {
        Timestamped {
            timestamp: self.timestamp,
            within_device_events_index: self.within_device_events_index,
            event: &self.event,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(E) -> U) -> Timestamped<U> {
        Timestamped {
            timestamp: self.timestamp,
            within_device_events_index: self.within_device_events_index,
            event: f(self.event),
        }
    }
}
