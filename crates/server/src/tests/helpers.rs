// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{AppState, build_router};
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{DateTime, TimeZone, Utc};
use craftsbite_domain::{CutoffGate, Role, Team, TeamId, User, UserId, WeekendDays};
use craftsbite_live::{BroadcastHub, OrgBroadcastHub};
use craftsbite_persistence::{Persistence, Seed};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// Sunday 2026-01-04, 09:00 in Dhaka. Monday's choices are still open.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 4, 3, 0, 0).unwrap()
}

fn create_test_user(id: &str, role: Role) -> User {
    User::new(
        UserId::new(id),
        format!("User {id}"),
        format!("{id}@example.com"),
        role,
    )
}

/// Six active users; `lead` leads `u1` and `u2`.
pub fn create_test_app_state() -> AppState {
    let seed: Seed = Seed {
        users: vec![
            create_test_user("admin", Role::Admin),
            create_test_user("lead", Role::TeamLead),
            create_test_user("u1", Role::Employee),
            create_test_user("u2", Role::Employee),
            create_test_user("u3", Role::Employee),
            create_test_user("outsider", Role::Employee),
        ],
        teams: vec![Team {
            id: TeamId::new("t1"),
            name: String::from("Platform"),
            lead_id: UserId::new("lead"),
            members: vec![UserId::new("u1"), UserId::new("u2")],
        }],
        ..Seed::default()
    };

    AppState {
        store: Arc::new(Persistence::from_seed(seed).unwrap()),
        hub: Arc::new(BroadcastHub::new(10)),
        org_hub: Arc::new(OrgBroadcastHub::spawn(16, 10)),
        gate: CutoffGate::new("21:00", "Asia/Dhaka").unwrap(),
        weekend_days: WeekendDays::default(),
        monthly_wfh_allowance: 2,
        clock: fixed_now,
    }
}

pub fn create_test_app() -> Router {
    build_router(create_test_app_state())
}

/// Sends one request and returns the status with the decoded JSON body.
pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request: Request<Body> = match body {
        Some(json) => Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status: StatusCode = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value: Value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}
