// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::subscription::{Detach, Subscription};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};

/// Messages each subscriber may have queued before further ones are dropped.
pub const DEFAULT_SUBSCRIBER_BUFFER: usize = 10;

/// The topic under which a date's headcount is published.
#[must_use]
pub fn topic_for_date(date: NaiveDate) -> String {
    date.to_string()
}

/// Delivery counts for one publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PublishOutcome {
    /// Subscribers whose queue accepted the payload.
    pub delivered: usize,
    /// Subscribers whose queue was full or closed.
    pub dropped: usize,
}

type Senders = HashMap<u64, mpsc::Sender<Arc<str>>>;

#[derive(Debug, Default)]
pub(crate) struct TopicRegistry {
    topics: RwLock<HashMap<String, Senders>>,
}

impl TopicRegistry {
    fn insert(&self, topic: &str, id: u64, tx: mpsc::Sender<Arc<str>>) {
        // The map holds only senders, so a poisoned lock leaves it usable.
        let mut topics = self.topics.write().unwrap_or_else(PoisonError::into_inner);
        topics.entry(String::from(topic)).or_default().insert(id, tx);
    }

    pub(crate) fn remove(&self, topic: &str, id: u64) {
        let mut topics = self.topics.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(senders) = topics.get_mut(topic) {
            senders.remove(&id);
            if senders.is_empty() {
                topics.remove(topic);
            }
        }
    }

    fn dates_between(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        let topics = self.topics.read().unwrap_or_else(PoisonError::into_inner);
        let mut dates: Vec<NaiveDate> = topics
            .keys()
            .filter_map(|topic| NaiveDate::parse_from_str(topic, "%Y-%m-%d").ok())
            .filter(|date| start <= *date && *date <= end)
            .collect();
        dates.sort_unstable();
        dates
    }

    fn count(&self, topic: &str) -> usize {
        self.topics
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(topic)
            .map_or(0, HashMap::len)
    }
}

/// Publish/subscribe relay keyed by topic.
///
/// One hub exists per process and is shared by reference.
#[derive(Debug)]
pub struct BroadcastHub {
    registry: Arc<TopicRegistry>,
    subscriber_buffer: usize,
    next_id: AtomicU64,
}

impl BroadcastHub {
    /// Creates a hub whose subscribers each buffer `subscriber_buffer`
    /// messages. A zero buffer is raised to one.
    #[must_use]
    pub fn new(subscriber_buffer: usize) -> Self {
        Self {
            registry: Arc::new(TopicRegistry::default()),
            subscriber_buffer: subscriber_buffer.max(1),
            next_id: AtomicU64::new(1),
        }
    }

    /// Registers a new subscriber for `topic`.
    #[must_use]
    pub fn subscribe(&self, topic: &str) -> Subscription {
        let id: u64 = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel::<Arc<str>>(self.subscriber_buffer);
        self.registry.insert(topic, id, tx);
        debug!(topic, id, "Subscriber registered");

        Subscription::new(
            id,
            rx,
            Detach::Topic {
                registry: Arc::downgrade(&self.registry),
                topic: String::from(topic),
            },
        )
    }

    /// Sends `payload` to every subscriber of `topic` without waiting.
    pub fn publish(&self, topic: &str, payload: &Arc<str>) -> PublishOutcome {
        let topics = self
            .registry
            .topics
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let Some(senders) = topics.get(topic) else {
            debug!(topic, "No subscribers for topic");
            return PublishOutcome::default();
        };

        let mut outcome: PublishOutcome = PublishOutcome::default();
        for (id, tx) in senders {
            match tx.try_send(Arc::clone(payload)) {
                Ok(()) => outcome.delivered += 1,
                Err(TrySendError::Full(_)) => {
                    warn!(topic, id, "Subscriber queue full, dropping message");
                    outcome.dropped += 1;
                }
                Err(TrySendError::Closed(_)) => {
                    debug!(topic, id, "Subscriber queue closed");
                    outcome.dropped += 1;
                }
            }
        }
        debug!(
            topic,
            delivered = outcome.delivered,
            dropped = outcome.dropped,
            "Published to topic"
        );
        outcome
    }

    /// Dates in `[start, end]` whose topic has at least one subscriber,
    /// in ascending order.
    ///
    /// Cost follows the number of watched topics, not the span of the range.
    #[must_use]
    pub fn watched_dates(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        self.registry.dates_between(start, end)
    }

    /// Number of subscribers currently registered for `topic`.
    #[must_use]
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.registry.count(topic)
    }
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new(DEFAULT_SUBSCRIBER_BUFFER)
    }
}
