// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Live headcount streaming for dashboards.
//!
//! Streams are server-sent events and read-only. Each opens with a
//! `connected` event and the current snapshot, then relays every
//! `headcount-update` published after a mutation. Clients that reconnect
//! simply subscribe again; there is no resume.

use crate::AppState;
use crate::error::HttpError;
use axum::{
    extract::{Path, State as AxumState},
    response::sse::{Event, KeepAlive, KeepAliveStream, Sse},
};
use chrono::{DateTime, NaiveDate, Utc};
use craftsbite::DailySummary;
use craftsbite_domain::parse_date;
use craftsbite_live::{HubError, LiveEvent, PublishOutcome, Subscription, topic_for_date};
use futures::{Stream, StreamExt};
use std::collections::BTreeSet;
use std::convert::Infallible;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{debug, error, info};

type EventStream = Pin<Box<dyn Stream<Item = Result<Event, Infallible>> + Send>>;
type LiveResponse = Sse<KeepAliveStream<EventStream>>;

/// Recomputes the summary for `date` and pushes it to both hubs.
///
/// The mutation has already been stored, so failures here are logged and
/// never reported to the caller.
pub fn publish_headcount(app_state: &AppState, date: NaiveDate) {
    let summary: DailySummary = match app_state.aggregator().summarize(date) {
        Ok(summary) => summary,
        Err(e) => {
            error!(%date, error = %e, "Failed to recompute headcount for broadcast");
            return;
        }
    };
    let payload: Arc<str> = match LiveEvent::headcount_updated(summary).to_json() {
        Ok(payload) => payload,
        Err(e) => {
            error!(%date, error = %e, "Failed to encode headcount update");
            return;
        }
    };

    let outcome: PublishOutcome = app_state.hub.publish(&topic_for_date(date), &payload);
    let org_queued: bool = app_state.org_hub.publish(&payload);
    debug!(
        %date,
        delivered = outcome.delivered,
        dropped = outcome.dropped,
        org_queued,
        "Headcount update published"
    );
}

/// Publishes every date in `[start, end]` that someone is watching.
///
/// Today and tomorrow are always refreshed for the organization dashboard.
pub fn publish_headcount_range(app_state: &AppState, start: NaiveDate, end: NaiveDate) {
    for date in dates_to_refresh(app_state, start, end) {
        publish_headcount(app_state, date);
    }
}

/// Watched dates in `[start, end]` plus today and tomorrow when they fall
/// inside it, ascending and without repeats.
pub fn dates_to_refresh(app_state: &AppState, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let today: NaiveDate = app_state.today();
    let mut dates: BTreeSet<NaiveDate> = app_state
        .hub
        .watched_dates(start, end)
        .into_iter()
        .collect();
    dates.extend(
        [Some(today), today.succ_opt()]
            .into_iter()
            .flatten()
            .filter(|date| start <= *date && *date <= end),
    );
    dates.into_iter().collect()
}

fn to_sse(event: &LiveEvent) -> Result<Event, HubError> {
    let payload: Arc<str> = event.to_json()?;
    Ok(Event::default().event(event.event_name()).data(&*payload))
}

fn event_stream(
    now: DateTime<Utc>,
    snapshot: &LiveEvent,
    subscription: Subscription,
) -> Result<LiveResponse, HttpError> {
    let opening: Vec<Result<Event, Infallible>> =
        vec![Ok(to_sse(&LiveEvent::connected(now))?), Ok(to_sse(snapshot)?)];
    let updates = subscription.into_stream().map(|payload: Arc<str>| {
        Ok::<Event, Infallible>(Event::default().event("headcount-update").data(&*payload))
    });

    let stream: EventStream = Box::pin(futures::stream::iter(opening).chain(updates));
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// Handler for GET `/live/headcount/{date}` endpoint.
///
/// Streams the headcount of one date.
pub async fn handle_live_headcount(
    AxumState(app_state): AxumState<AppState>,
    Path(date): Path<String>,
) -> Result<LiveResponse, HttpError> {
    let date: NaiveDate = parse_date(&date)?;

    // Subscribe before reading the snapshot so no update falls in between.
    let subscription: Subscription = app_state.hub.subscribe(&topic_for_date(date));
    info!(%date, id = subscription.id(), "Client connected to live headcount stream");

    let snapshot: LiveEvent = LiveEvent::headcount_updated(app_state.aggregator().summarize(date)?);
    event_stream(app_state.now(), &snapshot, subscription)
}

/// Handler for GET `/live/headcount` endpoint.
///
/// Streams every published headcount regardless of date, opening with
/// today's snapshot.
pub async fn handle_live_org_headcount(
    AxumState(app_state): AxumState<AppState>,
) -> Result<LiveResponse, HttpError> {
    let subscription: Subscription = app_state.org_hub.subscribe().await?;
    info!(id = subscription.id(), "Client connected to organization headcount stream");

    let today: NaiveDate = app_state.today();
    let snapshot: LiveEvent =
        LiveEvent::headcount_updated(app_state.aggregator().summarize(today)?);
    event_stream(app_state.now(), &snapshot, subscription)
}
