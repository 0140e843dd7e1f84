// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use craftsbite_domain::{
    BulkOptOut, GlobalWorkLocationPolicy, MealType, Role, Team, TeamId, User, UserId, WorkLocation,
};

pub fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}

pub fn early() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 12, 1, 9, 0, 0).unwrap()
}

pub fn create_test_user(id: &str, role: Role) -> User {
    User::new(
        UserId::new(id),
        format!("User {id}"),
        format!("{id}@example.com"),
        role,
    )
}

pub fn create_test_team(id: &str, lead: &str, members: &[&str]) -> Team {
    Team {
        id: TeamId::new(id),
        name: format!("Team {id}"),
        lead_id: UserId::new(lead),
        members: members.iter().map(|m| UserId::new(m)).collect(),
    }
}

pub fn create_test_opt_out(user: &str, start: &str, end: &str, meal: MealType) -> BulkOptOut {
    BulkOptOut {
        bulk_opt_out_id: None,
        user_id: UserId::new(user),
        start_date: date(start),
        end_date: date(end),
        meal_type: meal,
        active: true,
        created_by: None,
        reason: None,
    }
}

pub fn create_test_policy(start: &str, end: &str, location: WorkLocation) -> GlobalWorkLocationPolicy {
    GlobalWorkLocationPolicy {
        policy_id: None,
        start_date: date(start),
        end_date: date(end),
        location,
        active: true,
        declared_by: UserId::new("admin"),
        reason: None,
    }
}
