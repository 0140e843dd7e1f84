// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Headcount aggregation.
//!
//! The aggregator resolves every active user against every applicable meal of
//! a date and rolls the decisions into organization and team tallies. Team
//! tallies count only active members; a user in several teams is counted in
//! each of them.

use crate::announcement::special_day_note;
use crate::error::CoreError;
use crate::mutation::require_organization_role;
use crate::participation::{ParticipationDecision, ParticipationResolver, ParticipationSource};
use crate::repository::Repository;
use crate::work_location::{LocationDecision, WorkLocationResolver};
use chrono::NaiveDate;
use craftsbite_domain::{
    Actor, DayPlan, DaySchedule, DayStatus, GlobalWorkLocationPolicy, MealType, Team, TeamId, User,
    UserId, WeekendDays, WorkLocation, plan_day,
};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Participation tally for one meal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MealHeadcount {
    /// Users eating the meal.
    pub participating: usize,
    /// Users not eating the meal.
    pub opted_out: usize,
}

impl MealHeadcount {
    const fn record(&mut self, is_participating: bool) {
        if is_participating {
            self.participating += 1;
        } else {
            self.opted_out += 1;
        }
    }
}

/// Office versus work-from-home tally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct OfficeWfhSplit {
    /// Users at the office.
    pub office: usize,
    /// Users working from home.
    pub wfh: usize,
}

impl OfficeWfhSplit {
    const fn record(&mut self, location: WorkLocation) {
        match location {
            WorkLocation::Office => self.office += 1,
            WorkLocation::Wfh => self.wfh += 1,
        }
    }
}

/// Tallies for one team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamHeadcount {
    /// The team.
    pub team_id: TeamId,
    /// The team's display name.
    pub team_name: String,
    /// Active members counted.
    pub total_members: usize,
    /// Office/WFH split of the active members.
    pub office_wfh_split: OfficeWfhSplit,
    /// Per-meal tallies of the active members.
    pub meals: BTreeMap<MealType, MealHeadcount>,
}

/// The organization-wide headcount for one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailySummary {
    /// The date.
    pub date: NaiveDate,
    /// The effective day status.
    pub day_status: DayStatus,
    /// Note describing a non-ordinary day.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_day_note: Option<String>,
    /// Active users in the organization.
    pub total_active_users: usize,
    /// Per-meal tallies across all active users.
    pub meals: BTreeMap<MealType, MealHeadcount>,
    /// Per-team tallies, sorted by name case-insensitively.
    pub teams: Vec<TeamHeadcount>,
    /// Office/WFH split across all active users.
    pub office_wfh_split: OfficeWfhSplit,
    /// Active users who belong to no team.
    pub unassigned_users: usize,
}

/// One user's resolved participation in a meal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParticipantInfo {
    /// The user.
    pub user_id: UserId,
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Whether the user eats the meal.
    pub is_participating: bool,
    /// The rule that decided.
    pub source: ParticipationSource,
}

/// Every active user's participation in one meal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MealDetail {
    /// The date.
    pub date: NaiveDate,
    /// The meal.
    pub meal_type: MealType,
    /// Users eating the meal.
    pub participants: Vec<ParticipantInfo>,
    /// Users not eating the meal.
    pub non_participants: Vec<ParticipantInfo>,
    /// Number of active users listed.
    pub total_count: usize,
}

/// One team member's decisions for every applicable meal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberParticipation {
    /// The member.
    pub user_id: UserId,
    /// Display name.
    pub name: String,
    /// One decision per applicable meal.
    pub meals: BTreeMap<MealType, ParticipationDecision>,
}

/// Participation of every active member of one team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamParticipation {
    /// The team.
    pub team_id: TeamId,
    /// The team's display name.
    pub team_name: String,
    /// The user who leads the team.
    pub team_lead_user_id: UserId,
    /// Active members, in team order.
    pub members: Vec<MemberParticipation>,
}

/// Per-user results for a date, computed once and shared by every tally.
struct UserOutcome<'u> {
    user: &'u User,
    meals: BTreeMap<MealType, bool>,
    location: WorkLocation,
}

/// Rolls resolved decisions into headcounts.
#[derive(Debug)]
pub struct HeadcountAggregator<'a, R: ?Sized> {
    repository: &'a R,
    weekend_days: WeekendDays,
}

impl<'a, R> HeadcountAggregator<'a, R>
where
    R: Repository + ?Sized,
{
    /// Creates an aggregator over `repository`.
    #[must_use]
    pub const fn new(repository: &'a R, weekend_days: WeekendDays) -> Self {
        Self {
            repository,
            weekend_days,
        }
    }

    /// Computes the daily summary for `date`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Upstream` if a repository call fails.
    pub fn summarize(&self, date: NaiveDate) -> Result<DailySummary, CoreError> {
        let users: Vec<User> = self.repository.find_active_users()?;
        let schedule: Option<DaySchedule> = self.repository.find_schedule(date)?;

        if schedule.is_none() && self.weekend_days.is_weekend(date) {
            return Ok(DailySummary {
                date,
                day_status: DayStatus::Weekend,
                special_day_note: special_day_note(DayStatus::Weekend, None),
                total_active_users: users.len(),
                meals: BTreeMap::new(),
                teams: Vec::new(),
                office_wfh_split: OfficeWfhSplit::default(),
                unassigned_users: 0,
            });
        }

        let plan: DayPlan = plan_day(date, schedule.as_ref(), self.weekend_days);
        let outcomes: Vec<UserOutcome<'_>> =
            self.resolve_users(&users, date, &plan.meals, schedule.as_ref())?;

        let meals: BTreeMap<MealType, MealHeadcount> = tally_meals(&plan.meals, &outcomes);
        let mut office_wfh_split: OfficeWfhSplit = OfficeWfhSplit::default();
        for outcome in &outcomes {
            office_wfh_split.record(outcome.location);
        }

        let index: HashMap<&UserId, &UserOutcome<'_>> = outcomes
            .iter()
            .map(|outcome| (&outcome.user.id, outcome))
            .collect();
        let teams: Vec<Team> = self.repository.find_teams_with_members()?;

        let mut assigned: HashSet<&UserId> = HashSet::new();
        let mut team_totals: Vec<TeamHeadcount> = Vec::with_capacity(teams.len());
        for team in &teams {
            let members: Vec<&UserOutcome<'_>> = active_members(team, &index);
            let mut split: OfficeWfhSplit = OfficeWfhSplit::default();
            for member in &members {
                split.record(member.location);
                assigned.insert(&member.user.id);
            }
            team_totals.push(TeamHeadcount {
                team_id: team.id.clone(),
                team_name: team.name.clone(),
                total_members: members.len(),
                office_wfh_split: split,
                meals: tally_meals(&plan.meals, members.iter().copied()),
            });
        }
        team_totals.sort_by_key(|team| team.team_name.to_lowercase());

        tracing::debug!(
            %date,
            day_status = %plan.status,
            active_users = users.len(),
            teams = team_totals.len(),
            "Computed daily headcount"
        );

        Ok(DailySummary {
            date,
            day_status: plan.status,
            special_day_note: special_day_note(plan.status, schedule.as_ref()),
            total_active_users: users.len(),
            meals,
            teams: team_totals,
            office_wfh_split,
            unassigned_users: users.len() - assigned.len(),
        })
    }

    /// Splits every active user into participants and non-participants of one
    /// meal, with provenance.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Upstream` if a repository call fails.
    pub fn detailed_headcount(
        &self,
        date: NaiveDate,
        meal_type: MealType,
    ) -> Result<MealDetail, CoreError> {
        let users: Vec<User> = self.repository.find_active_users()?;
        let schedule: Option<DaySchedule> = self.repository.find_schedule(date)?;
        let resolver: ParticipationResolver<'_, R> =
            ParticipationResolver::new(self.repository, self.weekend_days);

        let mut participants: Vec<ParticipantInfo> = Vec::new();
        let mut non_participants: Vec<ParticipantInfo> = Vec::new();
        for user in &users {
            let decision: ParticipationDecision =
                resolver.resolve_for_user(user, date, meal_type, schedule.as_ref())?;
            let info: ParticipantInfo = ParticipantInfo {
                user_id: user.id.clone(),
                name: user.name.clone(),
                email: user.email.clone(),
                is_participating: decision.is_participating,
                source: decision.source,
            };
            if decision.is_participating {
                participants.push(info);
            } else {
                non_participants.push(info);
            }
        }

        Ok(MealDetail {
            date,
            meal_type,
            participants,
            non_participants,
            total_count: users.len(),
        })
    }

    /// Lists per-meal decisions for the active members of every team led by
    /// `lead_id`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Upstream` if a repository call fails.
    pub fn team_participation(
        &self,
        lead_id: &UserId,
        date: NaiveDate,
    ) -> Result<Vec<TeamParticipation>, CoreError> {
        let teams: Vec<Team> = self
            .repository
            .find_teams_with_members()?
            .into_iter()
            .filter(|team| team.is_led_by(lead_id))
            .collect();
        self.participation_for_teams(teams, date)
    }

    /// Lists per-meal decisions for every team, ordered by team name.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Forbidden` unless `actor` is admin or logistics, or
    /// `CoreError::Upstream`.
    pub fn all_teams_participation(
        &self,
        actor: &Actor,
        date: NaiveDate,
    ) -> Result<Vec<TeamParticipation>, CoreError> {
        require_organization_role(actor, "view participation for all teams")?;
        let mut teams: Vec<Team> = self.repository.find_teams_with_members()?;
        teams.sort_by_cached_key(|team| team.name.to_lowercase());
        self.participation_for_teams(teams, date)
    }

    fn participation_for_teams(
        &self,
        teams: Vec<Team>,
        date: NaiveDate,
    ) -> Result<Vec<TeamParticipation>, CoreError> {
        if teams.is_empty() {
            return Ok(Vec::new());
        }

        let users: Vec<User> = self.repository.find_active_users()?;
        let by_id: HashMap<&UserId, &User> = users.iter().map(|user| (&user.id, user)).collect();
        let schedule: Option<DaySchedule> = self.repository.find_schedule(date)?;
        let plan: DayPlan = plan_day(date, schedule.as_ref(), self.weekend_days);
        let resolver: ParticipationResolver<'_, R> =
            ParticipationResolver::new(self.repository, self.weekend_days);

        let mut result: Vec<TeamParticipation> = Vec::with_capacity(teams.len());
        for team in teams {
            let mut members: Vec<MemberParticipation> = Vec::new();
            for member_id in &team.members {
                let Some(user) = by_id.get(member_id) else {
                    continue;
                };
                let mut meals: BTreeMap<MealType, ParticipationDecision> = BTreeMap::new();
                for meal_type in &plan.meals {
                    let decision: ParticipationDecision =
                        resolver.resolve_for_user(user, date, *meal_type, schedule.as_ref())?;
                    meals.insert(*meal_type, decision);
                }
                members.push(MemberParticipation {
                    user_id: user.id.clone(),
                    name: user.name.clone(),
                    meals,
                });
            }
            result.push(TeamParticipation {
                team_id: team.id,
                team_name: team.name,
                team_lead_user_id: team.lead_id,
                members,
            });
        }
        Ok(result)
    }

    fn resolve_users<'u>(
        &self,
        users: &'u [User],
        date: NaiveDate,
        meals: &[MealType],
        schedule: Option<&DaySchedule>,
    ) -> Result<Vec<UserOutcome<'u>>, CoreError> {
        let participation: ParticipationResolver<'_, R> =
            ParticipationResolver::new(self.repository, self.weekend_days);
        let locations: WorkLocationResolver<'_, R> = WorkLocationResolver::new(self.repository);
        let policy: Option<GlobalWorkLocationPolicy> =
            self.repository.find_active_global_policy(date)?;

        let mut outcomes: Vec<UserOutcome<'u>> = Vec::with_capacity(users.len());
        for user in users {
            let mut decisions: BTreeMap<MealType, bool> = BTreeMap::new();
            for meal_type in meals {
                let decision: ParticipationDecision =
                    participation.resolve_for_user(user, date, *meal_type, schedule)?;
                decisions.insert(*meal_type, decision.is_participating);
            }
            let location: LocationDecision =
                locations.resolve_with_policy(&user.id, date, policy.as_ref())?;
            outcomes.push(UserOutcome {
                user,
                meals: decisions,
                location: location.location,
            });
        }
        Ok(outcomes)
    }
}

fn active_members<'o, 'u>(
    team: &Team,
    index: &HashMap<&UserId, &'o UserOutcome<'u>>,
) -> Vec<&'o UserOutcome<'u>> {
    let mut seen: HashSet<&UserId> = HashSet::new();
    team.members
        .iter()
        .filter(|member_id| seen.insert(*member_id))
        .filter_map(|member_id| index.get(member_id).copied())
        .collect()
}

fn tally_meals<'o, 'u: 'o, I>(meals: &[MealType], outcomes: I) -> BTreeMap<MealType, MealHeadcount>
where
    I: IntoIterator<Item = &'o UserOutcome<'u>>,
{
    let mut totals: BTreeMap<MealType, MealHeadcount> = meals
        .iter()
        .map(|meal_type| (*meal_type, MealHeadcount::default()))
        .collect();
    for outcome in outcomes {
        for (meal_type, is_participating) in &outcome.meals {
            if let Some(total) = totals.get_mut(meal_type) {
                total.record(*is_participating);
            }
        }
    }
    totals
}
