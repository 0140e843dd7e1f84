// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read/write contracts the engine needs from storage.
//!
//! Absent records are `Ok(None)` or an empty `Vec`, never an error.

use chrono::NaiveDate;
use craftsbite_audit::HistoryRecord;
use craftsbite_domain::{
    BulkOptOut, DaySchedule, GlobalWorkLocationPolicy, MealPreference, MealType,
    ParticipationRecord, Team, User, UserId, WorkLocationStatus,
};
use thiserror::Error;

/// Errors raised by a repository implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// The backing store could not be reached.
    #[error("Repository unavailable: {0}")]
    Unavailable(String),
    /// A query or write failed.
    #[error("Repository query failed: {0}")]
    Query(String),
}

/// Explicit per-day meal choices.
pub trait ParticipationRepository {
    /// Finds the explicit record for `(user_id, date, meal_type)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn find_participation(
        &self,
        user_id: &UserId,
        date: NaiveDate,
        meal_type: MealType,
    ) -> Result<Option<ParticipationRecord>, RepositoryError>;

    /// Inserts or replaces the record keyed by `(user_id, date, meal_type)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn upsert_participation(&self, record: ParticipationRecord) -> Result<(), RepositoryError>;
}

/// Date-range meal opt-outs.
pub trait BulkOptOutRepository {
    /// Returns the active opt-outs of `user_id` whose range contains `date`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn find_active_bulk_opt_outs(
        &self,
        user_id: &UserId,
        date: NaiveDate,
    ) -> Result<Vec<BulkOptOut>, RepositoryError>;

    /// Stores a new opt-out and returns it with its assigned identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn insert_bulk_opt_out(&self, opt_out: BulkOptOut) -> Result<BulkOptOut, RepositoryError>;

    /// Finds an opt-out by identifier, active or not.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn find_bulk_opt_out(&self, id: i64) -> Result<Option<BulkOptOut>, RepositoryError>;

    /// Returns every opt-out of `user_id`, active or not, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn find_bulk_opt_outs_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<BulkOptOut>, RepositoryError>;

    /// Marks an opt-out inactive.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn deactivate_bulk_opt_out(&self, id: i64) -> Result<(), RepositoryError>;
}

/// Day schedules.
pub trait ScheduleRepository {
    /// Finds the schedule for `date`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn find_schedule(&self, date: NaiveDate) -> Result<Option<DaySchedule>, RepositoryError>;
}

/// User records.
pub trait UserRepository {
    /// Finds a user by identifier, active or not.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn find_user(&self, user_id: &UserId) -> Result<Option<User>, RepositoryError>;

    /// Returns every active user.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn find_active_users(&self) -> Result<Vec<User>, RepositoryError>;

    /// Replaces the default meal preference of an existing user.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn update_default_meal_preference(
        &self,
        user_id: &UserId,
        preference: MealPreference,
    ) -> Result<(), RepositoryError>;
}

/// Teams and their member sets.
pub trait TeamRepository {
    /// Returns every team with its members.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn find_teams_with_members(&self) -> Result<Vec<Team>, RepositoryError>;
}

/// Per-day work locations and company-wide policies.
pub trait WorkLocationRepository {
    /// Finds the explicit status for `(user_id, date)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn find_work_location_status(
        &self,
        user_id: &UserId,
        date: NaiveDate,
    ) -> Result<Option<WorkLocationStatus>, RepositoryError>;

    /// Inserts or replaces the status keyed by `(user_id, date)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn upsert_work_location_status(&self, status: WorkLocationStatus)
    -> Result<(), RepositoryError>;

    /// Returns every explicit status dated within `[start, end]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn find_work_location_statuses_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<WorkLocationStatus>, RepositoryError>;

    /// Finds an active policy covering `date`.
    ///
    /// When several overlap, implementations return the most recently declared.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn find_active_global_policy(
        &self,
        date: NaiveDate,
    ) -> Result<Option<GlobalWorkLocationPolicy>, RepositoryError>;

    /// Stores a new policy and returns it with its assigned identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn insert_global_policy(
        &self,
        policy: GlobalWorkLocationPolicy,
    ) -> Result<GlobalWorkLocationPolicy, RepositoryError>;

    /// Finds a policy by identifier, active or not.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn find_global_policy(
        &self,
        id: i64,
    ) -> Result<Option<GlobalWorkLocationPolicy>, RepositoryError>;

    /// Marks a policy inactive.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn deactivate_global_policy(&self, id: i64) -> Result<(), RepositoryError>;
}

/// The append-only change history.
pub trait HistoryRepository {
    /// Appends one entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails. Callers treat this as non-fatal.
    fn append_history(&self, record: HistoryRecord) -> Result<(), RepositoryError>;
}

/// Every contract the engine uses, for stores that implement them all.
pub trait Repository:
    ParticipationRepository
    + BulkOptOutRepository
    + ScheduleRepository
    + UserRepository
    + TeamRepository
    + WorkLocationRepository
    + HistoryRepository
{
}

impl<T> Repository for T where
    T: ParticipationRepository
        + BulkOptOutRepository
        + ScheduleRepository
        + UserRepository
        + TeamRepository
        + WorkLocationRepository
        + HistoryRepository
        + ?Sized
{
}
