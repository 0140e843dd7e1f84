// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Organization-wide hub.
//!
//! A single actor task owns the subscriber registry. Register, unregister and
//! publish all travel through one bounded inbound queue, so the actor is the
//! only writer and no lock is needed.

use crate::error::HubError;
use crate::subscription::{Detach, Subscription};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, info, warn};

/// Capacity of the actor's inbound queue.
pub const ORG_INBOUND_CAPACITY: usize = 256;

#[derive(Debug)]
pub(crate) enum OrgCommand {
    Register {
        id: u64,
        tx: mpsc::Sender<Arc<str>>,
    },
    Unregister {
        id: u64,
    },
    Publish(Arc<str>),
}

/// Publish/subscribe relay with no topics, driven by an actor task.
#[derive(Debug)]
pub struct OrgBroadcastHub {
    commands: mpsc::Sender<OrgCommand>,
    subscriber_buffer: usize,
    next_id: AtomicU64,
}

impl OrgBroadcastHub {
    /// Spawns the actor task and returns a handle to it.
    ///
    /// Must be called from within a Tokio runtime. The task ends once the hub
    /// and every subscription created from it are dropped.
    ///
    /// # Arguments
    ///
    /// * `inbound_capacity` - Bound of the shared inbound queue
    /// * `subscriber_buffer` - Bound of each subscriber's queue
    #[must_use]
    pub fn spawn(inbound_capacity: usize, subscriber_buffer: usize) -> Self {
        let (commands, inbound) = mpsc::channel::<OrgCommand>(inbound_capacity.max(1));
        tokio::spawn(run(inbound));
        info!(inbound_capacity, subscriber_buffer, "Organization hub started");

        Self {
            commands,
            subscriber_buffer: subscriber_buffer.max(1),
            next_id: AtomicU64::new(1),
        }
    }

    /// Registers a new organization-wide subscriber.
    ///
    /// Registration waits for room in the inbound queue rather than being
    /// dropped.
    ///
    /// # Errors
    ///
    /// Returns `HubError::Closed` if the actor task has stopped.
    pub async fn subscribe(&self) -> Result<Subscription, HubError> {
        let id: u64 = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel::<Arc<str>>(self.subscriber_buffer);
        self.commands
            .send(OrgCommand::Register { id, tx })
            .await
            .map_err(|_| HubError::Closed)?;

        Ok(Subscription::new(
            id,
            rx,
            Detach::Org {
                commands: self.commands.clone(),
            },
        ))
    }

    /// Queues `payload` for every subscriber without waiting.
    ///
    /// Returns `false` if the inbound queue was full or the actor has stopped,
    /// in which case the payload is dropped.
    pub fn publish(&self, payload: &Arc<str>) -> bool {
        match self.commands.try_send(OrgCommand::Publish(Arc::clone(payload))) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!("Organization hub inbound queue full, dropping message");
                false
            }
            Err(TrySendError::Closed(_)) => {
                warn!("Organization hub is not running, dropping message");
                false
            }
        }
    }
}

async fn run(mut inbound: mpsc::Receiver<OrgCommand>) {
    let mut subscribers: HashMap<u64, mpsc::Sender<Arc<str>>> = HashMap::new();

    while let Some(command) = inbound.recv().await {
        match command {
            OrgCommand::Register { id, tx } => {
                subscribers.insert(id, tx);
                debug!(id, total = subscribers.len(), "Organization subscriber registered");
            }
            OrgCommand::Unregister { id } => {
                subscribers.remove(&id);
                debug!(id, total = subscribers.len(), "Organization subscriber removed");
            }
            OrgCommand::Publish(payload) => {
                subscribers.retain(|id, tx| match tx.try_send(Arc::clone(&payload)) {
                    Ok(()) => true,
                    Err(TrySendError::Full(_)) => {
                        warn!(id, "Organization subscriber queue full, dropping message");
                        true
                    }
                    Err(TrySendError::Closed(_)) => false,
                });
            }
        }
    }

    info!("Organization hub stopped");
}
