// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

/// Errors that can occur during domain validation.
///
/// Input errors (`InvalidDate`, `InvalidMealType`, ...) are per-request.
/// `InvalidTimezone`, `InvalidCutoffTime` and `InvalidWeekday` are
/// configuration errors and are expected to surface at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// A calendar date string could not be parsed.
    #[error("Invalid date '{value}': expected YYYY-MM-DD ({reason})")]
    InvalidDate {
        /// The rejected input.
        value: String,
        /// The parser's description of the failure.
        reason: String,
    },
    /// A calendar month string could not be parsed.
    #[error("Invalid month '{0}': expected YYYY-MM")]
    InvalidYearMonth(String),
    /// A date range ends before it starts.
    #[error("Invalid date range: end {end} is before start {start}")]
    InvalidDateRange {
        /// The range start.
        start: NaiveDate,
        /// The range end.
        end: NaiveDate,
    },
    /// A request named no items where at least one is required.
    #[error("At least one {0} is required")]
    EmptySelection(&'static str),
    /// Meal type is not one of the known meal types.
    #[error("Invalid meal type: '{0}'")]
    InvalidMealType(String),
    /// Day status is not one of the known day statuses.
    #[error("Invalid day status: '{0}'")]
    InvalidDayStatus(String),
    /// Work location is not `office` or `wfh`.
    #[error("Invalid work location: '{0}'. Must be 'office' or 'wfh'")]
    InvalidLocation(String),
    /// Role is not one of the known roles.
    #[error("Invalid role: '{0}'")]
    InvalidRole(String),
    /// Default meal preference is not `opt_in` or `opt_out`.
    #[error("Invalid meal preference: '{0}'. Must be 'opt_in' or 'opt_out'")]
    InvalidMealPreference(String),
    /// A configured weekend day name is not a weekday.
    #[error("Invalid weekday name: '{0}'")]
    InvalidWeekday(String),
    /// The configured timezone is not a known IANA zone.
    #[error("Invalid timezone: '{0}'")]
    InvalidTimezone(String),
    /// The configured cutoff time is not `HH:MM`.
    #[error("Invalid cutoff time '{value}': expected HH:MM ({reason})")]
    InvalidCutoffTime {
        /// The rejected input.
        value: String,
        /// The parser's description of the failure.
        reason: String,
    },
    /// A local wall-clock time does not exist in the configured timezone.
    #[error("Local time {time} on {date} does not exist in the configured timezone")]
    UnresolvableLocalTime {
        /// The calendar date.
        date: NaiveDate,
        /// The wall-clock time.
        time: NaiveTime,
    },
    /// Date arithmetic overflow.
    #[error("Date arithmetic overflow while {operation}")]
    DateArithmeticOverflow {
        /// Description of the operation that failed.
        operation: String,
    },
    /// The mutation window for a date has closed.
    #[error("Cutoff ({cutoff}) has passed for date {target_date}")]
    CutoffPassed {
        /// The date whose choices were being changed.
        target_date: NaiveDate,
        /// The cutoff instant, RFC 3339 in the configured timezone.
        cutoff: String,
    },
}
