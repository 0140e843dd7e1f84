// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::hub::TopicRegistry;
use crate::org::OrgCommand;
use futures::Stream;
use std::sync::{Arc, Weak};
use tokio::sync::mpsc;
use tracing::debug;

/// Lifecycle of a subscriber.
///
/// `Registered` until the first receive, `Streaming` afterwards, and
/// `Unregistered` once detached. `Unregistered` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriberState {
    /// Attached to a hub, nothing received yet.
    Registered,
    /// Actively receiving.
    Streaming,
    /// Detached; no further messages are delivered.
    Unregistered,
}

/// How a subscription removes itself from the hub that created it.
#[derive(Debug)]
pub(crate) enum Detach {
    Topic {
        registry: Weak<TopicRegistry>,
        topic: String,
    },
    Org {
        commands: mpsc::Sender<OrgCommand>,
    },
}

/// A live feed from one of the hubs.
///
/// Dropping the subscription unregisters it.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    state: SubscriberState,
    rx: mpsc::Receiver<Arc<str>>,
    detach: Detach,
}

impl Subscription {
    pub(crate) const fn new(id: u64, rx: mpsc::Receiver<Arc<str>>, detach: Detach) -> Self {
        Self {
            id,
            state: SubscriberState::Registered,
            rx,
            detach,
        }
    }

    /// The subscriber identifier, unique within its hub.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// The current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> SubscriberState {
        self.state
    }

    /// Waits for the next payload.
    ///
    /// Returns `None` once unregistered or when the hub has gone away.
    pub async fn recv(&mut self) -> Option<Arc<str>> {
        if self.state == SubscriberState::Unregistered {
            return None;
        }
        self.state = SubscriberState::Streaming;
        self.rx.recv().await
    }

    /// Detaches from the hub and closes the queue.
    ///
    /// Calling this more than once has no further effect.
    pub fn unsubscribe(&mut self) {
        if self.state == SubscriberState::Unregistered {
            return;
        }
        self.state = SubscriberState::Unregistered;
        self.rx.close();

        match &self.detach {
            Detach::Topic { registry, topic } => {
                if let Some(registry) = registry.upgrade() {
                    registry.remove(topic, self.id);
                }
            }
            Detach::Org { commands } => {
                if commands
                    .try_send(OrgCommand::Unregister { id: self.id })
                    .is_err()
                {
                    // The actor prunes closed queues on its next publish.
                    debug!(id = self.id, "Deferred organization unsubscribe");
                }
            }
        }
        debug!(id = self.id, "Subscriber unregistered");
    }

    /// Turns the subscription into a stream of payloads.
    pub fn into_stream(self) -> impl Stream<Item = Arc<str>> + Send {
        futures::stream::unfold(self, |mut subscription: Self| async move {
            let payload: Arc<str> = subscription.recv().await?;
            Some((payload, subscription))
        })
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
