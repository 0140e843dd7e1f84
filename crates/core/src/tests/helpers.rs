// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::repository::{
    BulkOptOutRepository, HistoryRepository, ParticipationRepository, RepositoryError,
    ScheduleRepository, TeamRepository, UserRepository, WorkLocationRepository,
};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use craftsbite_audit::HistoryRecord;
use craftsbite_domain::{
    BulkOptOut, CutoffGate, DaySchedule, DayStatus, GlobalWorkLocationPolicy, MealPreference,
    MealType, ParticipationRecord, Role, Team, TeamId, User, UserId, WorkLocation,
    WorkLocationStatus,
};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

pub fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}

/// Monday 2026-01-05.
pub fn weekday() -> NaiveDate {
    date("2026-01-05")
}

/// Saturday 2026-01-03.
pub fn saturday() -> NaiveDate {
    date("2026-01-03")
}

/// Well before any cutoff used in these tests.
pub fn early() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 12, 1, 9, 0, 0).unwrap()
}

pub fn create_test_gate() -> CutoffGate {
    CutoffGate::new("21:00", "Asia/Dhaka").unwrap()
}

pub fn create_test_user(id: &str, role: Role) -> User {
    User::new(
        UserId::new(id),
        format!("User {id}"),
        format!("{id}@example.com"),
        role,
    )
}

/// In-memory repository with failure injection and call counters.
#[derive(Default)]
pub struct FakeRepository {
    pub users: RefCell<Vec<User>>,
    pub teams: RefCell<Vec<Team>>,
    pub schedules: RefCell<HashMap<NaiveDate, DaySchedule>>,
    pub participations: RefCell<HashMap<(UserId, NaiveDate, MealType), ParticipationRecord>>,
    pub bulk_opt_outs: RefCell<Vec<BulkOptOut>>,
    pub locations: RefCell<HashMap<(UserId, NaiveDate), WorkLocationStatus>>,
    pub policies: RefCell<Vec<GlobalWorkLocationPolicy>>,
    pub history: RefCell<Vec<HistoryRecord>>,
    pub fail_reads: Cell<bool>,
    pub fail_history: Cell<bool>,
    pub policy_lookups: Cell<usize>,
}

impl FakeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, id: &str, role: Role) -> Self {
        self.users.borrow_mut().push(create_test_user(id, role));
        self
    }

    pub fn with_opt_out_user(self, id: &str) -> Self {
        let mut user: User = create_test_user(id, Role::Employee);
        user.default_meal_preference = MealPreference::OptOut;
        self.users.borrow_mut().push(user);
        self
    }

    pub fn with_inactive_user(self, id: &str) -> Self {
        let mut user: User = create_test_user(id, Role::Employee);
        user.active = false;
        self.users.borrow_mut().push(user);
        self
    }

    pub fn with_team(self, id: &str, name: &str, lead: &str, members: &[&str]) -> Self {
        self.teams.borrow_mut().push(Team {
            id: TeamId::new(id),
            name: String::from(name),
            lead_id: UserId::new(lead),
            members: members.iter().map(|m| UserId::new(m)).collect(),
        });
        self
    }

    pub fn with_schedule(
        self,
        on: NaiveDate,
        status: DayStatus,
        meals: Option<Vec<MealType>>,
        reason: Option<&str>,
    ) -> Self {
        let mut schedule: DaySchedule = DaySchedule::new(on, status);
        schedule.meals = meals;
        schedule.reason = reason.map(String::from);
        self.schedules.borrow_mut().insert(on, schedule);
        self
    }

    pub fn with_choice(self, user: &str, on: NaiveDate, meal_type: MealType, value: bool) -> Self {
        self.participations.borrow_mut().insert(
            (UserId::new(user), on, meal_type),
            ParticipationRecord {
                user_id: UserId::new(user),
                date: on,
                meal_type,
                is_participating: value,
                opted_out_at: None,
                override_by: None,
                override_reason: None,
            },
        );
        self
    }

    pub fn with_bulk_opt_out(
        self,
        user: &str,
        start: NaiveDate,
        end: NaiveDate,
        meal_type: MealType,
    ) -> Self {
        let id: i64 = i64::try_from(self.bulk_opt_outs.borrow().len()).unwrap() + 1;
        self.bulk_opt_outs.borrow_mut().push(BulkOptOut {
            bulk_opt_out_id: Some(id),
            user_id: UserId::new(user),
            start_date: start,
            end_date: end,
            meal_type,
            active: true,
            created_by: Some(UserId::new(user)),
            reason: None,
        });
        self
    }

    pub fn with_location(self, user: &str, on: NaiveDate, location: WorkLocation) -> Self {
        self.locations.borrow_mut().insert(
            (UserId::new(user), on),
            WorkLocationStatus {
                user_id: UserId::new(user),
                date: on,
                location,
                updated_by: None,
                reason: None,
            },
        );
        self
    }

    pub fn with_policy(
        self,
        start: NaiveDate,
        end: NaiveDate,
        location: WorkLocation,
        active: bool,
    ) -> Self {
        let id: i64 = i64::try_from(self.policies.borrow().len()).unwrap() + 1;
        self.policies.borrow_mut().push(GlobalWorkLocationPolicy {
            policy_id: Some(id),
            start_date: start,
            end_date: end,
            location,
            active,
            declared_by: UserId::new("admin"),
            reason: None,
        });
        self
    }

    fn check(&self) -> Result<(), RepositoryError> {
        if self.fail_reads.get() {
            return Err(RepositoryError::Unavailable(String::from("injected")));
        }
        Ok(())
    }
}

impl ParticipationRepository for FakeRepository {
    fn find_participation(
        &self,
        user_id: &UserId,
        on: NaiveDate,
        meal_type: MealType,
    ) -> Result<Option<ParticipationRecord>, RepositoryError> {
        self.check()?;
        Ok(self
            .participations
            .borrow()
            .get(&(user_id.clone(), on, meal_type))
            .cloned())
    }

    fn upsert_participation(&self, record: ParticipationRecord) -> Result<(), RepositoryError> {
        self.check()?;
        self.participations.borrow_mut().insert(
            (record.user_id.clone(), record.date, record.meal_type),
            record,
        );
        Ok(())
    }
}

impl BulkOptOutRepository for FakeRepository {
    fn find_active_bulk_opt_outs(
        &self,
        user_id: &UserId,
        on: NaiveDate,
    ) -> Result<Vec<BulkOptOut>, RepositoryError> {
        self.check()?;
        Ok(self
            .bulk_opt_outs
            .borrow()
            .iter()
            .filter(|o| &o.user_id == user_id && o.active && o.start_date <= on && on <= o.end_date)
            .cloned()
            .collect())
    }

    fn insert_bulk_opt_out(&self, mut opt_out: BulkOptOut) -> Result<BulkOptOut, RepositoryError> {
        self.check()?;
        let id: i64 = i64::try_from(self.bulk_opt_outs.borrow().len()).unwrap() + 1;
        opt_out.bulk_opt_out_id = Some(id);
        self.bulk_opt_outs.borrow_mut().push(opt_out.clone());
        Ok(opt_out)
    }

    fn find_bulk_opt_out(&self, id: i64) -> Result<Option<BulkOptOut>, RepositoryError> {
        self.check()?;
        Ok(self
            .bulk_opt_outs
            .borrow()
            .iter()
            .find(|o| o.bulk_opt_out_id == Some(id))
            .cloned())
    }

    fn find_bulk_opt_outs_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<BulkOptOut>, RepositoryError> {
        self.check()?;
        Ok(self
            .bulk_opt_outs
            .borrow()
            .iter()
            .filter(|o| &o.user_id == user_id)
            .cloned()
            .collect())
    }

    fn deactivate_bulk_opt_out(&self, id: i64) -> Result<(), RepositoryError> {
        self.check()?;
        for opt_out in self.bulk_opt_outs.borrow_mut().iter_mut() {
            if opt_out.bulk_opt_out_id == Some(id) {
                opt_out.active = false;
            }
        }
        Ok(())
    }
}

impl ScheduleRepository for FakeRepository {
    fn find_schedule(&self, on: NaiveDate) -> Result<Option<DaySchedule>, RepositoryError> {
        self.check()?;
        Ok(self.schedules.borrow().get(&on).cloned())
    }
}

impl UserRepository for FakeRepository {
    fn find_user(&self, user_id: &UserId) -> Result<Option<User>, RepositoryError> {
        self.check()?;
        Ok(self
            .users
            .borrow()
            .iter()
            .find(|u| &u.id == user_id)
            .cloned())
    }

    fn find_active_users(&self) -> Result<Vec<User>, RepositoryError> {
        self.check()?;
        Ok(self
            .users
            .borrow()
            .iter()
            .filter(|u| u.active)
            .cloned()
            .collect())
    }

    fn update_default_meal_preference(
        &self,
        user_id: &UserId,
        preference: MealPreference,
    ) -> Result<(), RepositoryError> {
        self.check()?;
        for user in self.users.borrow_mut().iter_mut() {
            if &user.id == user_id {
                user.default_meal_preference = preference;
            }
        }
        Ok(())
    }
}

impl TeamRepository for FakeRepository {
    fn find_teams_with_members(&self) -> Result<Vec<Team>, RepositoryError> {
        self.check()?;
        Ok(self.teams.borrow().clone())
    }
}

impl WorkLocationRepository for FakeRepository {
    fn find_work_location_status(
        &self,
        user_id: &UserId,
        on: NaiveDate,
    ) -> Result<Option<WorkLocationStatus>, RepositoryError> {
        self.check()?;
        Ok(self
            .locations
            .borrow()
            .get(&(user_id.clone(), on))
            .cloned())
    }

    fn upsert_work_location_status(
        &self,
        status: WorkLocationStatus,
    ) -> Result<(), RepositoryError> {
        self.check()?;
        self.locations
            .borrow_mut()
            .insert((status.user_id.clone(), status.date), status);
        Ok(())
    }

    fn find_work_location_statuses_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<WorkLocationStatus>, RepositoryError> {
        self.check()?;
        let mut statuses: Vec<WorkLocationStatus> = self
            .locations
            .borrow()
            .values()
            .filter(|s| start <= s.date && s.date <= end)
            .cloned()
            .collect();
        statuses.sort_by(|a, b| (a.date, &a.user_id).cmp(&(b.date, &b.user_id)));
        Ok(statuses)
    }

    fn find_active_global_policy(
        &self,
        on: NaiveDate,
    ) -> Result<Option<GlobalWorkLocationPolicy>, RepositoryError> {
        self.check()?;
        self.policy_lookups.set(self.policy_lookups.get() + 1);
        Ok(self
            .policies
            .borrow()
            .iter()
            .rev()
            .find(|p| p.covers(on))
            .cloned())
    }

    fn insert_global_policy(
        &self,
        mut policy: GlobalWorkLocationPolicy,
    ) -> Result<GlobalWorkLocationPolicy, RepositoryError> {
        self.check()?;
        let id: i64 = i64::try_from(self.policies.borrow().len()).unwrap() + 1;
        policy.policy_id = Some(id);
        self.policies.borrow_mut().push(policy.clone());
        Ok(policy)
    }

    fn find_global_policy(
        &self,
        id: i64,
    ) -> Result<Option<GlobalWorkLocationPolicy>, RepositoryError> {
        self.check()?;
        Ok(self
            .policies
            .borrow()
            .iter()
            .find(|p| p.policy_id == Some(id))
            .cloned())
    }

    fn deactivate_global_policy(&self, id: i64) -> Result<(), RepositoryError> {
        self.check()?;
        for policy in self.policies.borrow_mut().iter_mut() {
            if policy.policy_id == Some(id) {
                policy.active = false;
            }
        }
        Ok(())
    }
}

impl HistoryRepository for FakeRepository {
    fn append_history(&self, record: HistoryRecord) -> Result<(), RepositoryError> {
        if self.fail_history.get() {
            return Err(RepositoryError::Query(String::from("history table locked")));
        }
        self.history.borrow_mut().push(record);
        Ok(())
    }
}
