// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Storage for the CraftsBite meal system.
//!
//! [`Persistence`] keeps every table in process memory behind a single
//! `RwLock` and implements each repository contract the engine consumes.
//! Stores start empty or are populated from a JSON [`Seed`] fixture.
//!
//! Lookups of absent records return `Ok(None)` or an empty `Vec`. The only
//! failure a caller can observe is a poisoned lock, reported as
//! `RepositoryError::Unavailable`.

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
mod seed;

#[cfg(test)]
mod tests;

pub use error::PersistenceError;
pub use seed::Seed;

use chrono::NaiveDate;
use craftsbite::{
    BulkOptOutRepository, HistoryRepository, ParticipationRepository, RepositoryError,
    ScheduleRepository, TeamRepository, UserRepository, WorkLocationRepository,
};
use craftsbite_audit::HistoryRecord;
use craftsbite_domain::{
    BulkOptOut, DaySchedule, GlobalWorkLocationPolicy, MealPreference, MealType,
    ParticipationRecord, Team, TeamId, User, UserId, WorkLocationStatus,
};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};

/// Atomic counter for numbering store instances in log output.
static STORE_COUNTER: AtomicU64 = AtomicU64::new(0);

type ParticipationKey = (UserId, NaiveDate, MealType);

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    teams: BTreeMap<TeamId, Team>,
    schedules: BTreeMap<NaiveDate, DaySchedule>,
    participations: HashMap<ParticipationKey, ParticipationRecord>,
    bulk_opt_outs: BTreeMap<i64, BulkOptOut>,
    work_locations: HashMap<(UserId, NaiveDate), WorkLocationStatus>,
    global_policies: BTreeMap<i64, GlobalWorkLocationPolicy>,
    history: Vec<HistoryRecord>,
}

/// In-memory implementation of every repository contract.
///
/// The store is `Send + Sync` and is shared behind an `Arc` by the server.
#[derive(Debug)]
pub struct Persistence {
    store_id: u64,
    next_id: AtomicI64,
    tables: RwLock<Tables>,
}

impl Persistence {
    /// Creates an empty store.
    ///
    /// Each call receives a distinct instance number used in log output.
    #[must_use]
    pub fn new_in_memory() -> Self {
        let store_id: u64 = STORE_COUNTER.fetch_add(1, Ordering::SeqCst);
        debug!(store_id, "Created in-memory store");
        Self {
            store_id,
            next_id: AtomicI64::new(1),
            tables: RwLock::new(Tables::default()),
        }
    }

    /// Creates a store populated from a seed fixture.
    ///
    /// # Errors
    ///
    /// Returns an error if the seed references unknown users.
    pub fn from_seed(seed: Seed) -> Result<Self, PersistenceError> {
        let store: Self = Self::new_in_memory();
        store.load_seed(seed)?;
        Ok(store)
    }

    /// Creates a store populated from a JSON seed file.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the seed file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid seed JSON, or
    /// references unknown users.
    pub fn from_seed_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path: &Path = path.as_ref();
        let contents: String =
            std::fs::read_to_string(path).map_err(|e| PersistenceError::SeedReadFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        let seed: Seed = serde_json::from_str(&contents)?;
        info!(path = %path.display(), "Loading seed file");
        Self::from_seed(seed)
    }

    /// Loads a seed fixture into this store.
    ///
    /// Users are loaded first so that every other section can be checked
    /// against them. Bulk opt-outs and policies receive fresh identifiers.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::InvalidSeed` if a record names a user that
    /// is neither already stored nor part of the seed.
    pub fn load_seed(&self, seed: Seed) -> Result<(), PersistenceError> {
        let mut tables: RwLockWriteGuard<'_, Tables> = self.write()?;

        for user in seed.users {
            tables.users.insert(user.id.clone(), user);
        }

        for team in seed.teams {
            ensure_known_user(&tables, &team.lead_id, &format!("team {}", team.id))?;
            for member in &team.members {
                ensure_known_user(&tables, member, &format!("team {}", team.id))?;
            }
            tables.teams.insert(team.id.clone(), team);
        }
        for schedule in seed.schedules {
            tables.schedules.insert(schedule.date, schedule);
        }
        for record in seed.participations {
            ensure_known_user(&tables, &record.user_id, "participation")?;
            tables.participations.insert(
                (record.user_id.clone(), record.date, record.meal_type),
                record,
            );
        }
        for mut opt_out in seed.bulk_opt_outs {
            ensure_known_user(&tables, &opt_out.user_id, "bulk opt-out")?;
            let id: i64 = self.allocate_id();
            opt_out.bulk_opt_out_id = Some(id);
            tables.bulk_opt_outs.insert(id, opt_out);
        }
        for status in seed.work_locations {
            ensure_known_user(&tables, &status.user_id, "work location")?;
            tables
                .work_locations
                .insert((status.user_id.clone(), status.date), status);
        }
        for mut policy in seed.global_policies {
            let id: i64 = self.allocate_id();
            policy.policy_id = Some(id);
            tables.global_policies.insert(id, policy);
        }

        info!(
            store_id = self.store_id,
            users = tables.users.len(),
            teams = tables.teams.len(),
            schedules = tables.schedules.len(),
            "Seed loaded"
        );
        Ok(())
    }

    /// Inserts or replaces a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the store lock is poisoned.
    pub fn insert_user(&self, user: User) -> Result<(), PersistenceError> {
        self.write()?.users.insert(user.id.clone(), user);
        Ok(())
    }

    /// Inserts or replaces a team.
    ///
    /// # Errors
    ///
    /// Returns an error if the store lock is poisoned.
    pub fn insert_team(&self, team: Team) -> Result<(), PersistenceError> {
        self.write()?.teams.insert(team.id.clone(), team);
        Ok(())
    }

    /// Inserts or replaces the schedule for its date.
    ///
    /// # Errors
    ///
    /// Returns an error if the store lock is poisoned.
    pub fn upsert_schedule(&self, schedule: DaySchedule) -> Result<(), PersistenceError> {
        debug!(date = %schedule.date, status = %schedule.status, "Upserting day schedule");
        self.write()?.schedules.insert(schedule.date, schedule);
        Ok(())
    }

    /// Returns the history entries concerning `user_id`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store lock is poisoned.
    pub fn history_for_user(&self, user_id: &UserId) -> Result<Vec<HistoryRecord>, PersistenceError> {
        Ok(self
            .read()?
            .history
            .iter()
            .filter(|record| &record.user_id == user_id)
            .cloned()
            .collect())
    }

    /// Returns the number of history entries stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the store lock is poisoned.
    pub fn history_len(&self) -> Result<usize, PersistenceError> {
        Ok(self.read()?.history.len())
    }

    fn allocate_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, PersistenceError> {
        self.tables
            .read()
            .map_err(|_| PersistenceError::LockPoisoned("store"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, PersistenceError> {
        self.tables
            .write()
            .map_err(|_| PersistenceError::LockPoisoned("store"))
    }
}

fn ensure_known_user(
    tables: &Tables,
    user_id: &UserId,
    context: &str,
) -> Result<(), PersistenceError> {
    if tables.users.contains_key(user_id) {
        Ok(())
    } else {
        Err(PersistenceError::InvalidSeed(format!(
            "{context} references unknown user {user_id}"
        )))
    }
}

impl Default for Persistence {
    fn default() -> Self {
        Self::new_in_memory()
    }
}

impl ParticipationRepository for Persistence {
    fn find_participation(
        &self,
        user_id: &UserId,
        date: NaiveDate,
        meal_type: MealType,
    ) -> Result<Option<ParticipationRecord>, RepositoryError> {
        Ok(self
            .read()?
            .participations
            .get(&(user_id.clone(), date, meal_type))
            .cloned())
    }

    fn upsert_participation(&self, record: ParticipationRecord) -> Result<(), RepositoryError> {
        let key: ParticipationKey = (record.user_id.clone(), record.date, record.meal_type);
        self.write()?.participations.insert(key, record);
        Ok(())
    }
}

impl BulkOptOutRepository for Persistence {
    fn find_active_bulk_opt_outs(
        &self,
        user_id: &UserId,
        date: NaiveDate,
    ) -> Result<Vec<BulkOptOut>, RepositoryError> {
        Ok(self
            .read()?
            .bulk_opt_outs
            .values()
            .filter(|o| o.active && &o.user_id == user_id)
            .filter(|o| o.start_date <= date && date <= o.end_date)
            .cloned()
            .collect())
    }

    fn insert_bulk_opt_out(&self, mut opt_out: BulkOptOut) -> Result<BulkOptOut, RepositoryError> {
        let id: i64 = self.allocate_id();
        opt_out.bulk_opt_out_id = Some(id);
        self.write()?.bulk_opt_outs.insert(id, opt_out.clone());
        debug!(id, user_id = %opt_out.user_id, "Stored bulk opt-out");
        Ok(opt_out)
    }

    fn find_bulk_opt_out(&self, id: i64) -> Result<Option<BulkOptOut>, RepositoryError> {
        Ok(self.read()?.bulk_opt_outs.get(&id).cloned())
    }

    fn find_bulk_opt_outs_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<BulkOptOut>, RepositoryError> {
        Ok(self
            .read()?
            .bulk_opt_outs
            .values()
            .filter(|o| &o.user_id == user_id)
            .cloned()
            .collect())
    }

    fn deactivate_bulk_opt_out(&self, id: i64) -> Result<(), RepositoryError> {
        if let Some(opt_out) = self.write()?.bulk_opt_outs.get_mut(&id) {
            opt_out.active = false;
        }
        Ok(())
    }
}

impl ScheduleRepository for Persistence {
    fn find_schedule(&self, date: NaiveDate) -> Result<Option<DaySchedule>, RepositoryError> {
        Ok(self.read()?.schedules.get(&date).cloned())
    }
}

impl UserRepository for Persistence {
    fn find_user(&self, user_id: &UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.read()?.users.get(user_id).cloned())
    }

    fn find_active_users(&self) -> Result<Vec<User>, RepositoryError> {
        Ok(self
            .read()?
            .users
            .values()
            .filter(|user| user.active)
            .cloned()
            .collect())
    }

    fn update_default_meal_preference(
        &self,
        user_id: &UserId,
        preference: MealPreference,
    ) -> Result<(), RepositoryError> {
        if let Some(user) = self.write()?.users.get_mut(user_id) {
            user.default_meal_preference = preference;
        }
        Ok(())
    }
}

impl TeamRepository for Persistence {
    fn find_teams_with_members(&self) -> Result<Vec<Team>, RepositoryError> {
        Ok(self.read()?.teams.values().cloned().collect())
    }
}

impl WorkLocationRepository for Persistence {
    fn find_work_location_status(
        &self,
        user_id: &UserId,
        date: NaiveDate,
    ) -> Result<Option<WorkLocationStatus>, RepositoryError> {
        Ok(self
            .read()?
            .work_locations
            .get(&(user_id.clone(), date))
            .cloned())
    }

    fn upsert_work_location_status(
        &self,
        status: WorkLocationStatus,
    ) -> Result<(), RepositoryError> {
        let key: (UserId, NaiveDate) = (status.user_id.clone(), status.date);
        self.write()?.work_locations.insert(key, status);
        Ok(())
    }

    fn find_work_location_statuses_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<WorkLocationStatus>, RepositoryError> {
        let mut statuses: Vec<WorkLocationStatus> = self
            .read()?
            .work_locations
            .values()
            .filter(|status| start <= status.date && status.date <= end)
            .cloned()
            .collect();
        statuses.sort_by(|a, b| (a.date, &a.user_id).cmp(&(b.date, &b.user_id)));
        Ok(statuses)
    }

    fn find_active_global_policy(
        &self,
        date: NaiveDate,
    ) -> Result<Option<GlobalWorkLocationPolicy>, RepositoryError> {
        // Identifiers increase monotonically, so the last match is the newest.
        Ok(self
            .read()?
            .global_policies
            .values()
            .rev()
            .find(|policy| policy.covers(date))
            .cloned())
    }

    fn insert_global_policy(
        &self,
        mut policy: GlobalWorkLocationPolicy,
    ) -> Result<GlobalWorkLocationPolicy, RepositoryError> {
        let id: i64 = self.allocate_id();
        policy.policy_id = Some(id);
        self.write()?.global_policies.insert(id, policy.clone());
        debug!(id, location = %policy.location, "Stored global work location policy");
        Ok(policy)
    }

    fn find_global_policy(
        &self,
        id: i64,
    ) -> Result<Option<GlobalWorkLocationPolicy>, RepositoryError> {
        Ok(self.read()?.global_policies.get(&id).cloned())
    }

    fn deactivate_global_policy(&self, id: i64) -> Result<(), RepositoryError> {
        if let Some(policy) = self.write()?.global_policies.get_mut(&id) {
            policy.active = false;
        }
        Ok(())
    }
}

impl HistoryRepository for Persistence {
    fn append_history(&self, record: HistoryRecord) -> Result<(), RepositoryError> {
        self.write()?.history.push(record);
        Ok(())
    }
}
