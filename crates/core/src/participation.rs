// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Meal participation resolution.
//!
//! Precedence, first match wins:
//!
//! 1. Configured weekend day not re-opened by a `normal`/`celebration` schedule
//! 2. Day-schedule blackout (office closed, or a holiday with no meals)
//! 3. Explicit participation record
//! 4. Active bulk opt-out covering the date and meal
//! 5. The user's default preference when it is `opt_out`
//! 6. System default: participating

use crate::error::CoreError;
use crate::repository::{
    BulkOptOutRepository, ParticipationRepository, ScheduleRepository, UserRepository,
};
use chrono::NaiveDate;
use craftsbite_domain::{
    DayPlan, DaySchedule, DayStatus, MealPreference, MealType, User, UserId, WeekendDays,
    plan_day,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which rule produced a participation decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipationSource {
    /// The date is a weekend day with no re-opening schedule.
    Weekend,
    /// The day schedule blacks out meals.
    DaySchedule,
    /// The user or an overriding actor made an explicit choice.
    Explicit,
    /// An active bulk opt-out covers the date.
    BulkOptOut,
    /// The user's default preference is opt-out.
    UserDefault,
    /// Nothing else applied.
    SystemDefault,
}

impl ParticipationSource {
    /// Converts this source to its wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Weekend => "weekend",
            Self::DaySchedule => "day_schedule",
            Self::Explicit => "explicit",
            Self::BulkOptOut => "bulk_opt_out",
            Self::UserDefault => "user_default",
            Self::SystemDefault => "system_default",
        }
    }
}

impl std::fmt::Display for ParticipationSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A resolved participation value and its provenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipationDecision {
    /// Whether the user eats the meal.
    pub is_participating: bool,
    /// The rule that decided.
    pub source: ParticipationSource,
}

impl ParticipationDecision {
    const fn new(is_participating: bool, source: ParticipationSource) -> Self {
        Self {
            is_participating,
            source,
        }
    }
}

/// Every applicable meal of a date resolved for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayParticipation {
    /// The user.
    pub user_id: UserId,
    /// The date.
    pub date: NaiveDate,
    /// The effective day status.
    pub day_status: DayStatus,
    /// One decision per applicable meal.
    pub meals: BTreeMap<MealType, ParticipationDecision>,
}

/// Resolves whether a user participates in a meal on a date.
///
/// The resolver is read-only and holds no state beyond its configuration, so
/// repeated calls without an intervening mutation return the same decision.
#[derive(Debug)]
pub struct ParticipationResolver<'a, R: ?Sized> {
    repository: &'a R,
    weekend_days: WeekendDays,
}

impl<'a, R> ParticipationResolver<'a, R>
where
    R: ParticipationRepository + BulkOptOutRepository + ScheduleRepository + UserRepository + ?Sized,
{
    /// Creates a resolver over `repository`.
    #[must_use]
    pub const fn new(repository: &'a R, weekend_days: WeekendDays) -> Self {
        Self {
            repository,
            weekend_days,
        }
    }

    /// Resolves participation for `(user_id, date, meal_type)`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::NotFound` if the user does not exist and the
    /// decision falls through to the user default, or `CoreError::Upstream`
    /// if a repository call fails.
    pub fn resolve(
        &self,
        user_id: &UserId,
        date: NaiveDate,
        meal_type: MealType,
    ) -> Result<ParticipationDecision, CoreError> {
        let schedule: Option<DaySchedule> = self.repository.find_schedule(date)?;
        self.decide(user_id, None, date, meal_type, schedule.as_ref())
    }

    /// Resolves every meal that applies to `date` for `user_id`.
    ///
    /// # Errors
    ///
    /// See [`Self::resolve`].
    pub fn resolve_day(
        &self,
        user_id: &UserId,
        date: NaiveDate,
    ) -> Result<DayParticipation, CoreError> {
        let schedule: Option<DaySchedule> = self.repository.find_schedule(date)?;
        let plan: DayPlan = plan_day(date, schedule.as_ref(), self.weekend_days);

        let mut meals: BTreeMap<MealType, ParticipationDecision> = BTreeMap::new();
        for meal_type in plan.meals {
            let decision: ParticipationDecision =
                self.decide(user_id, None, date, meal_type, schedule.as_ref())?;
            meals.insert(meal_type, decision);
        }

        Ok(DayParticipation {
            user_id: user_id.clone(),
            date,
            day_status: plan.status,
            meals,
        })
    }

    /// Resolves for a user record already in hand, with the day's schedule
    /// already loaded.
    pub(crate) fn resolve_for_user(
        &self,
        user: &User,
        date: NaiveDate,
        meal_type: MealType,
        schedule: Option<&DaySchedule>,
    ) -> Result<ParticipationDecision, CoreError> {
        self.decide(&user.id, Some(user), date, meal_type, schedule)
    }

    fn decide(
        &self,
        user_id: &UserId,
        known_user: Option<&User>,
        date: NaiveDate,
        meal_type: MealType,
        schedule: Option<&DaySchedule>,
    ) -> Result<ParticipationDecision, CoreError> {
        let weekend_lifted: bool = schedule.is_some_and(|s| s.status.lifts_weekend());
        if self.weekend_days.is_weekend(date) && !weekend_lifted {
            return Ok(ParticipationDecision::new(
                false,
                ParticipationSource::Weekend,
            ));
        }

        if schedule.is_some_and(DaySchedule::is_blackout) {
            return Ok(ParticipationDecision::new(
                false,
                ParticipationSource::DaySchedule,
            ));
        }

        if let Some(record) = self
            .repository
            .find_participation(user_id, date, meal_type)?
        {
            return Ok(ParticipationDecision::new(
                record.is_participating,
                ParticipationSource::Explicit,
            ));
        }

        let opted_out: bool = self
            .repository
            .find_active_bulk_opt_outs(user_id, date)?
            .iter()
            .any(|opt_out| opt_out.covers(date, meal_type));
        if opted_out {
            return Ok(ParticipationDecision::new(
                false,
                ParticipationSource::BulkOptOut,
            ));
        }

        let preference: MealPreference = match known_user {
            Some(user) => user.default_meal_preference,
            None => {
                self.repository
                    .find_user(user_id)?
                    .ok_or_else(|| CoreError::NotFound {
                        entity: "user",
                        id: user_id.to_string(),
                    })?
                    .default_meal_preference
            }
        };
        if preference == MealPreference::OptOut {
            return Ok(ParticipationDecision::new(
                false,
                ParticipationSource::UserDefault,
            ));
        }

        Ok(ParticipationDecision::new(
            true,
            ParticipationSource::SystemDefault,
        ))
    }
}
