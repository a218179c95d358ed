//! Local-first state handling for the study app.
//!
//! State is never edited in place. Starting from some initial state, the app
//! produces "events" (an exercise was completed, progress was reset, ...) and
//! applies them in timestamp order to get the next state. Persistence is a
//! plain snapshot of the resulting state: the UI saves it after each change
//! and loads it on startup. Saving is best effort; there are no transaction
//! guarantees beyond "the file on disk is either the old or the new snapshot".

pub mod data_model;
mod store;

pub use store::{Error, JsonFileSnapshotStore, MemorySnapshotStore, SnapshotStore};

use crate::data_model::{Event, Timestamped};

/// Core trait for partial event processing without derived state computation
pub trait PartialAppState: Sized {
    type Event: Event;

    /// The intermediate state type returned by process_event.
    /// For simple cases, this can just be Self.
    type Partial: Sized;

    /// Process an event partially, without computing derived state.
    /// This is called for each event when applying multiple events.
    fn process_event(partial: Self::Partial, event: &Timestamped<Self::Event>) -> Self::Partial;

    /// Finalize the state by computing any derived state.
    /// This is called once after all events have been processed.
    fn finalize(partial: Self::Partial) -> Self;
}

pub trait AppState: PartialAppState {
    /// Apply a single event completely, including finalization.
    fn apply_event(self, event: &Timestamped<Self::Event>) -> Self;

    /// Apply a batch of events in order, finalizing once at the end.
    fn apply_events<'a, I>(self, events: I) -> Self
    where
        I: IntoIterator<Item = &'a Timestamped<Self::Event>>,
        Self::Event: 'a;
}

impl<T> AppState for T
where
    T: PartialAppState,
    T::Partial: From<T>,
{
    fn apply_event(self, event: &Timestamped<Self::Event>) -> Self {
        let partial = T::Partial::from(self);
        let partial = T::process_event(partial, event);
        T::finalize(partial)
    }

    fn apply_events<'a, I>(self, events: I) -> Self
    where
        I: IntoIterator<Item = &'a Timestamped<Self::Event>>,
        Self::Event: 'a,
    {
        let partial = events
            .into_iter()
            .fold(T::Partial::from(self), T::process_event);
        T::finalize(partial)
    }
}
