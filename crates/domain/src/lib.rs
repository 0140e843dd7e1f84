// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

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

mod calendar;
mod capabilities;
mod error;
mod types;

#[cfg(test)]
mod tests;

pub use calendar::{
    CUTOFF_TIME_FORMAT, CutoffGate, DATE_FORMAT, DayPlan, WeekendDays, YearMonth, is_weekend,
    parse_date, plan_day, validate_cutoff, validate_date_range,
};
pub use capabilities::{Actor, OverrideAuthority, can_override, override_authority};

// Re-export public types
pub use error::DomainError;
pub use types::{
    BulkOptOut, DaySchedule, DayStatus, GlobalWorkLocationPolicy, MealPreference, MealType,
    ParticipationRecord, Role, Team, TeamId, User, UserId, WorkLocation, WorkLocationStatus,
};
