// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Live headcount streaming support for dashboards.
//!
//! Two hubs relay serialized snapshots to connected observers:
//!
//! - [`BroadcastHub`] keys subscribers by topic (a date). Its registry sits
//!   behind a reader-writer lock and publishing never waits on a subscriber.
//! - [`OrgBroadcastHub`] has no topics. An actor task owns its registry and
//!   drains a single bounded inbound queue.
//!
//! Each subscriber has its own bounded queue. When that queue is full the
//! message is dropped for that subscriber only. Payloads are full snapshots,
//! so a subscriber that misses one catches up on the next.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod error;
mod event;
mod hub;
mod org;
mod subscription;

#[cfg(test)]
mod tests;

pub use error::HubError;
pub use event::LiveEvent;
pub use hub::{BroadcastHub, DEFAULT_SUBSCRIBER_BUFFER, PublishOutcome, topic_for_date};
pub use org::{ORG_INBOUND_CAPACITY, OrgBroadcastHub};
pub use subscription::{SubscriberState, Subscription};
