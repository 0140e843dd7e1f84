// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Calendar rules: date parsing, weekend detection, the mutation cutoff and
//! the meal set that applies to a date.
//!
//! ## Invariants
//!
//! - Dates are plain calendar dates (`YYYY-MM-DD`), never instants
//! - The cutoff for a date is a wall-clock time on the previous calendar day,
//!   evaluated in the configured timezone
//! - A mutation attempted at or after the cutoff instant is rejected
//! - An ambiguous local cutoff (DST fold) resolves to the earlier instant

use crate::error::DomainError;
use crate::types::{DaySchedule, DayStatus, MealType};
use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Serialize, Serializer};
use std::str::FromStr;

/// The calendar date format accepted on every boundary.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The cutoff time-of-day format.
pub const CUTOFF_TIME_FORMAT: &str = "%H:%M";

/// Parses a `YYYY-MM-DD` calendar date.
///
/// # Errors
///
/// Returns `DomainError::InvalidDate` if the input is not a valid date.
pub fn parse_date(value: &str) -> Result<NaiveDate, DomainError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|e| DomainError::InvalidDate {
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Validates that `end` is not before `start`.
///
/// # Errors
///
/// Returns `DomainError::InvalidDateRange` if the range is inverted.
pub fn validate_date_range(start: NaiveDate, end: NaiveDate) -> Result<(), DomainError> {
    if end < start {
        return Err(DomainError::InvalidDateRange { start, end });
    }
    Ok(())
}

/// A calendar month, written `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearMonth {
    first_day: NaiveDate,
}

impl YearMonth {
    /// The month containing `date`.
    #[must_use]
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            first_day: date.with_day(1).unwrap_or(date),
        }
    }

    /// The first day of the month.
    #[must_use]
    pub const fn first_day(self) -> NaiveDate {
        self.first_day
    }

    /// The last day of the month.
    #[must_use]
    pub fn last_day(self) -> NaiveDate {
        self.first_day
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    /// Whether `date` falls in this month.
    #[must_use]
    pub fn contains(self, date: NaiveDate) -> bool {
        date.year() == self.first_day.year() && date.month() == self.first_day.month()
    }
}

impl FromStr for YearMonth {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::InvalidYearMonth(s.to_string());
        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|first_day| Self { first_day })
            .ok_or_else(invalid)
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.first_day.format("%Y-%m"))
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The set of weekdays an organization treats as its weekend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekendDays {
    /// Bit `n` is set when the weekday `n` days from Monday is a weekend day.
    mask: u8,
}

impl WeekendDays {
    /// A week with no weekend days.
    pub const NONE: Self = Self { mask: 0 };

    /// Builds a weekend set from weekdays.
    #[must_use]
    pub fn from_weekdays(days: &[Weekday]) -> Self {
        let mask: u8 = days
            .iter()
            .fold(0, |mask, day| mask | (1 << day.num_days_from_monday()));
        Self { mask }
    }

    /// Builds a weekend set from weekday names such as `saturday` or `Fri`.
    ///
    /// Names are matched case-insensitively; blank entries are skipped.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidWeekday` for a name that is not a weekday.
    pub fn from_names<I, S>(names: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut days: Vec<Weekday> = Vec::new();
        for name in names {
            let trimmed: &str = name.as_ref().trim();
            if trimmed.is_empty() {
                continue;
            }
            let day: Weekday = trimmed
                .parse()
                .map_err(|_| DomainError::InvalidWeekday(trimmed.to_string()))?;
            days.push(day);
        }
        Ok(Self::from_weekdays(&days))
    }

    /// Whether `day` is a weekend day.
    #[must_use]
    pub fn contains(self, day: Weekday) -> bool {
        self.mask & (1 << day.num_days_from_monday()) != 0
    }

    /// Whether `date` falls on a weekend day.
    #[must_use]
    pub fn is_weekend(self, date: NaiveDate) -> bool {
        self.contains(date.weekday())
    }
}

impl Default for WeekendDays {
    fn default() -> Self {
        Self::from_weekdays(&[Weekday::Sat, Weekday::Sun])
    }
}

/// Whether `date` falls on one of the configured weekend days.
#[must_use]
pub fn is_weekend(date: NaiveDate, weekend_days: WeekendDays) -> bool {
    weekend_days.is_weekend(date)
}

/// The mutation gate: choices for a date lock at a wall-clock time on the
/// previous calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CutoffGate {
    /// Wall-clock cutoff on the day before the target date.
    cutoff_time: NaiveTime,
    /// The timezone the cutoff is evaluated in.
    timezone: Tz,
}

impl CutoffGate {
    /// Builds a gate from configuration strings.
    ///
    /// # Arguments
    ///
    /// * `cutoff_time` - Time of day as `HH:MM` (e.g. `21:00`)
    /// * `timezone` - IANA timezone name (e.g. `Asia/Dhaka`)
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidCutoffTime` or `DomainError::InvalidTimezone`.
    pub fn new(cutoff_time: &str, timezone: &str) -> Result<Self, DomainError> {
        let cutoff_time: NaiveTime = NaiveTime::parse_from_str(cutoff_time, CUTOFF_TIME_FORMAT)
            .map_err(|e| DomainError::InvalidCutoffTime {
                value: cutoff_time.to_string(),
                reason: e.to_string(),
            })?;
        let timezone: Tz = timezone
            .parse()
            .map_err(|_| DomainError::InvalidTimezone(timezone.to_string()))?;
        Ok(Self {
            cutoff_time,
            timezone,
        })
    }

    /// Returns the configured cutoff time of day.
    #[must_use]
    pub const fn cutoff_time(&self) -> NaiveTime {
        self.cutoff_time
    }

    /// Returns the configured timezone.
    #[must_use]
    pub const fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Computes the instant after which `target_date` is locked.
    ///
    /// # Errors
    ///
    /// Returns an error if the previous day underflows the calendar or the
    /// local cutoff time falls into a DST gap.
    pub fn cutoff_for(&self, target_date: NaiveDate) -> Result<DateTime<Tz>, DomainError> {
        let cutoff_date: NaiveDate =
            target_date
                .pred_opt()
                .ok_or_else(|| DomainError::DateArithmeticOverflow {
                    operation: format!("computing the day before {target_date}"),
                })?;

        self.timezone
            .from_local_datetime(&cutoff_date.and_time(self.cutoff_time))
            .earliest()
            .ok_or(DomainError::UnresolvableLocalTime {
                date: cutoff_date,
                time: self.cutoff_time,
            })
    }

    /// Checks whether a mutation of `target_date` is still allowed at `now`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::CutoffPassed` if `now` is at or after the cutoff.
    pub fn validate(&self, target_date: NaiveDate, now: DateTime<Utc>) -> Result<(), DomainError> {
        let cutoff: DateTime<Tz> = self.cutoff_for(target_date)?;
        if now >= cutoff.with_timezone(&Utc) {
            return Err(DomainError::CutoffPassed {
                target_date,
                cutoff: cutoff.to_rfc3339(),
            });
        }
        Ok(())
    }
}

/// Validates a mutation against the cutoff rule from raw configuration values.
///
/// # Arguments
///
/// * `target_date` - The date being changed (`YYYY-MM-DD`)
/// * `cutoff_time` - Cutoff time of day on the previous day (`HH:MM`)
/// * `timezone` - IANA timezone the cutoff is evaluated in
/// * `now` - The current instant
///
/// # Errors
///
/// Returns a configuration error for a bad time or timezone,
/// `DomainError::InvalidDate` for a bad date, or `DomainError::CutoffPassed`.
pub fn validate_cutoff(
    target_date: &str,
    cutoff_time: &str,
    timezone: &str,
    now: DateTime<Utc>,
) -> Result<(), DomainError> {
    let gate: CutoffGate = CutoffGate::new(cutoff_time, timezone)?;
    gate.validate(parse_date(target_date)?, now)
}

/// The effective shape of a date: its status and the meals served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayPlan {
    /// The effective day status.
    pub status: DayStatus,
    /// Meals served, in display order.
    pub meals: Vec<MealType>,
}

/// Computes the meals that apply to `date`.
///
/// Without a schedule, a configured weekend day serves nothing and any other
/// day serves the weekday default. With a schedule, closed-by-default statuses
/// serve only an explicitly configured list and the rest fall back to the
/// weekday default when no list is configured.
#[must_use]
pub fn plan_day(
    date: NaiveDate,
    schedule: Option<&DaySchedule>,
    weekend_days: WeekendDays,
) -> DayPlan {
    let Some(schedule) = schedule else {
        if weekend_days.is_weekend(date) {
            return DayPlan {
                status: DayStatus::Weekend,
                meals: Vec::new(),
            };
        }
        return DayPlan {
            status: DayStatus::Normal,
            meals: MealType::WEEKDAY_DEFAULT.to_vec(),
        };
    };

    let mut meals: Vec<MealType> = match schedule.explicit_meals() {
        Some(explicit) => explicit.to_vec(),
        None if schedule.status.is_closed_by_default() => Vec::new(),
        None => MealType::WEEKDAY_DEFAULT.to_vec(),
    };
    meals.sort_unstable();
    meals.dedup();

    DayPlan {
        status: schedule.status,
        meals,
    }
}
