use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info};

use super::entities::{Subject, SubjectId, TimeIncrement, TimeSpent};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("no subject with id {0}")]
    UnknownSubject(SubjectId),
}

/// What the last mutation did. Observers can use it to re-render only what changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreChange {
    SubjectAdded(SubjectId),
    TimeLogged {
        id: SubjectId,
        increment: TimeIncrement,
    },
}

/// Immutable view of the store after a mutation. `revision` grows by one with every mutation.
#[derive(Debug, Clone)]
pub struct StoreSnapshot {
    pub revision: u64,
    pub subjects: Arc<[Subject]>,
    pub last_change: Option<StoreChange>,
}

impl Default for StoreSnapshot {
    fn default() -> Self {
        Self {
            revision: 0,
            subjects: Arc::from([]),
            last_change: None,
        }
    }
}

/// Owns the session's subjects. The only ways to change them are [SubjectStore::add_subject] and
/// [SubjectStore::log_time]; everyone else gets read access or a subscription.
pub struct SubjectStore {
    subjects: Vec<Subject>,
    revision: u64,
    notifier: watch::Sender<StoreSnapshot>,
}

impl Default for SubjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SubjectStore {
    pub fn new() -> Self {
        let (notifier, _) = watch::channel(StoreSnapshot::default());
        Self {
            subjects: Vec::new(),
            revision: 0,
            notifier,
        }
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    pub fn get(&self, id: SubjectId) -> Option<&Subject> {
        self.subjects.iter().find(|v| v.id() == id)
    }

    /// Receives a new snapshot after every mutation. The receiver starts at the current state.
    pub fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.notifier.subscribe()
    }

    /// Appends a subject with zero time. Names that are empty after trimming are ignored and
    /// nothing is published.
    pub fn add_subject(&mut self, name: &str, created_at: DateTime<Utc>) -> Option<SubjectId> {
        let name = name.trim();
        if name.is_empty() {
            debug!("Ignoring subject with an empty name");
            return None;
        }

        let subject = Subject::new(name, created_at);
        let id = subject.id();
        self.subjects.push(subject);
        info!("Added subject {name} ({id})");
        self.publish(StoreChange::SubjectAdded(id));
        Some(id)
    }

    /// Accumulates `increment` into the subject and returns its new total.
    pub fn log_time(
        &mut self,
        id: SubjectId,
        increment: TimeIncrement,
    ) -> Result<TimeSpent, StoreError> {
        debug!("Logging {increment} for {id}");
        let subject = self
            .subjects
            .iter_mut()
            .find(|v| v.id() == id)
            .ok_or(StoreError::UnknownSubject(id))?;

        let total = subject.log(increment);
        info!("Updated: {} - {total}", subject.name());
        self.publish(StoreChange::TimeLogged { id, increment });
        Ok(total)
    }

    fn publish(&mut self, change: StoreChange) {
        self.revision += 1;
        // send_replace keeps the latest value even when nobody is subscribed yet.
        self.notifier.send_replace(StoreSnapshot {
            revision: self.revision,
            subjects: self.subjects.as_slice().into(),
            last_change: Some(change),
        });
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use crate::tally::{
        entities::{SubjectId, TimeIncrement, TimeSpent},
        store::{StoreChange, StoreError, SubjectStore},
    };

    fn now() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 10, 5, 9, 30, 0).unwrap()
    }

    fn increment(hours: u8, minutes: u8) -> TimeIncrement {
        TimeIncrement::new_opt(hours, minutes).unwrap()
    }

    #[test]
    fn test_add_subject_basic() {
        let mut store = SubjectStore::new();
        let id = store.add_subject("Math", now());

        assert!(id.is_some());
        assert_eq!(store.len(), 1);
        let subject = &store.subjects()[0];
        assert_eq!(subject.name(), "Math");
        assert_eq!(subject.time(), TimeSpent::ZERO);
        assert_eq!(subject.created_at(), now());
    }

    #[test]
    fn test_add_subject_empty_name() {
        let mut store = SubjectStore::new();
        assert_eq!(store.add_subject("", now()), None);
        assert_eq!(store.add_subject("   \t", now()), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_add_subject_trims_and_allows_duplicates() {
        let mut store = SubjectStore::new();
        let first = store.add_subject("  Art ", now()).unwrap();
        let second = store.add_subject("Art", now()).unwrap();

        assert_ne!(first, second);
        assert_eq!(store.subjects()[0].name(), "Art");
        assert_eq!(store.subjects()[1].name(), "Art");
    }

    #[test]
    fn test_log_time_carries() {
        let mut store = SubjectStore::new();
        let id = store.add_subject("History", now()).unwrap();
        store.log_time(id, increment(2, 45)).unwrap();

        let total = store.log_time(id, increment(1, 30)).unwrap();

        assert_eq!(total, TimeSpent::new_opt(4, 15).unwrap());
        assert_eq!(store.get(id).unwrap().time(), total);
    }

    #[test]
    fn test_log_time_unknown_subject() {
        let mut store = SubjectStore::new();
        store.add_subject("History", now());
        let missing = SubjectId::new();

        assert_eq!(
            store.log_time(missing, increment(1, 0)),
            Err(StoreError::UnknownSubject(missing))
        );
    }

    #[test]
    fn test_order_survives_updates() {
        let mut store = SubjectStore::new();
        let ids = ["A", "B", "C"]
            .map(|name| store.add_subject(name, now()).unwrap());

        store.log_time(ids[2], increment(5, 0)).unwrap();
        store.log_time(ids[0], increment(0, 10)).unwrap();
        store.log_time(ids[1], increment(23, 59)).unwrap();

        let names = store
            .subjects()
            .iter()
            .map(|v| v.name().to_string())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_subscribers_see_every_mutation() {
        let mut store = SubjectStore::new();
        let mut receiver = store.subscribe();
        assert_eq!(receiver.borrow_and_update().revision, 0);

        let id = store.add_subject("Math", now()).unwrap();
        assert!(receiver.has_changed().unwrap());
        {
            let snapshot = receiver.borrow_and_update();
            assert_eq!(snapshot.revision, 1);
            assert_eq!(snapshot.subjects.len(), 1);
            assert_eq!(snapshot.last_change, Some(StoreChange::SubjectAdded(id)));
        }

        store.add_subject(" ", now());
        assert!(!receiver.has_changed().unwrap());

        store.log_time(id, increment(0, 20)).unwrap();
        let snapshot = receiver.borrow_and_update();
        assert_eq!(snapshot.revision, 2);
        assert_eq!(
            snapshot.subjects[0].time(),
            TimeSpent::new_opt(0, 20).unwrap()
        );
        assert_eq!(
            snapshot.last_change,
            Some(StoreChange::TimeLogged {
                id,
                increment: increment(0, 20)
            })
        );
    }

    #[test]
    fn test_subscription_closes_with_store() {
        let store = SubjectStore::new();
        let receiver = store.subscribe();
        drop(store);
        assert!(receiver.has_changed().is_err());
    }
}
