// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{OrgBroadcastHub, Subscription};
use std::sync::Arc;

fn payload(text: &str) -> Arc<str> {
    Arc::from(text)
}

#[tokio::test]
async fn test_org_subscribers_receive_in_publish_order() {
    let hub: OrgBroadcastHub = OrgBroadcastHub::spawn(16, 10);
    let mut first: Subscription = hub.subscribe().await.unwrap();
    let mut second: Subscription = hub.subscribe().await.unwrap();

    assert!(hub.publish(&payload("1")));
    assert!(hub.publish(&payload("2")));

    for expected in ["1", "2"] {
        assert_eq!(first.recv().await.as_deref(), Some(expected));
        assert_eq!(second.recv().await.as_deref(), Some(expected));
    }
}

#[tokio::test]
async fn test_full_inbound_queue_drops_publish() {
    let hub: OrgBroadcastHub = OrgBroadcastHub::spawn(1, 10);

    // Nothing yields between these calls, so the actor cannot drain the queue.
    assert!(hub.publish(&payload("kept")));
    assert!(!hub.publish(&payload("dropped")));
}

#[tokio::test]
async fn test_saturated_org_subscriber_does_not_block_others() {
    let hub: OrgBroadcastHub = OrgBroadcastHub::spawn(16, 1);
    let _stalled: Subscription = hub.subscribe().await.unwrap();
    let mut live: Subscription = hub.subscribe().await.unwrap();

    assert!(hub.publish(&payload("a")));
    assert_eq!(live.recv().await.as_deref(), Some("a"));
    assert!(hub.publish(&payload("b")));
    assert_eq!(live.recv().await.as_deref(), Some("b"));
}

#[tokio::test]
async fn test_unsubscribed_org_subscriber_stops_receiving() {
    let hub: OrgBroadcastHub = OrgBroadcastHub::spawn(16, 10);
    let mut leaving: Subscription = hub.subscribe().await.unwrap();
    let mut staying: Subscription = hub.subscribe().await.unwrap();

    leaving.unsubscribe();
    assert!(hub.publish(&payload("after")));

    assert_eq!(staying.recv().await.as_deref(), Some("after"));
    assert_eq!(leaving.recv().await, None);
}
