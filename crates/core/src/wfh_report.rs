// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Monthly work-from-home usage against an allowance.
//!
//! Only explicit per-day `wfh` statuses count toward a user's allowance.
//! Days covered by a company-wide policy do not.

use crate::error::CoreError;
use crate::mutation::require_organization_role;
use crate::repository::Repository;
use craftsbite_domain::{Actor, Role, Team, User, UserId, WorkLocation, YearMonth};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Default number of WFH days a user may take per month.
pub const DEFAULT_MONTHLY_WFH_ALLOWANCE: u32 = 5;

/// One user's WFH usage for a month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyWfhSummary {
    /// The user.
    pub user_id: UserId,
    /// The month, `YYYY-MM`.
    pub year_month: YearMonth,
    /// Explicit WFH days recorded in the month.
    pub wfh_days: u32,
    /// Days allowed per month.
    pub allowance: u32,
    /// Whether `wfh_days` exceeds the allowance.
    pub is_over_limit: bool,
}

/// One member's line in a team report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberWfhSummary {
    /// The member.
    pub user_id: UserId,
    /// Display name.
    pub name: String,
    /// Explicit WFH days recorded in the month.
    pub wfh_days: u32,
    /// Whether `wfh_days` exceeds the allowance.
    pub is_over_limit: bool,
    /// Days beyond the allowance, zero when within it.
    pub extra_days: u32,
}

/// WFH usage for every user an actor oversees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamMonthlyReport {
    /// The month, `YYYY-MM`.
    pub year_month: YearMonth,
    /// Days allowed per month.
    pub allowance: u32,
    /// Users covered by the report.
    pub total_employees: usize,
    /// Users over the allowance.
    pub over_limit_count: usize,
    /// Sum of `extra_days` across members.
    pub total_extra_days: u32,
    /// One line per user.
    pub members: Vec<MemberWfhSummary>,
}

/// Computes monthly WFH usage.
#[derive(Debug)]
pub struct WfhReporter<'a, R: ?Sized> {
    repository: &'a R,
    monthly_allowance: u32,
}

impl<'a, R> WfhReporter<'a, R>
where
    R: Repository + ?Sized,
{
    /// Creates a reporter over `repository`.
    ///
    /// # Arguments
    ///
    /// * `repository` - The store to read work locations from
    /// * `monthly_allowance` - WFH days allowed per user per month
    #[must_use]
    pub const fn new(repository: &'a R, monthly_allowance: u32) -> Self {
        Self {
            repository,
            monthly_allowance,
        }
    }

    /// Counts one user's WFH days in `month`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::NotFound` for an unknown user, or `CoreError::Upstream`.
    pub fn monthly_summary(
        &self,
        user_id: &UserId,
        month: YearMonth,
    ) -> Result<MonthlyWfhSummary, CoreError> {
        if self.repository.find_user(user_id)?.is_none() {
            return Err(CoreError::NotFound {
                entity: "user",
                id: user_id.to_string(),
            });
        }

        let wfh_days: u32 = self
            .wfh_counts(month)?
            .get(user_id)
            .copied()
            .unwrap_or_default();
        Ok(MonthlyWfhSummary {
            user_id: user_id.clone(),
            year_month: month,
            wfh_days,
            allowance: self.monthly_allowance,
            is_over_limit: wfh_days > self.monthly_allowance,
        })
    }

    /// Reports WFH usage for everyone `actor` oversees.
    ///
    /// Admin and logistics see every active user. A team lead sees the active
    /// members of the teams they lead, each listed once.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Forbidden` for employees, or `CoreError::Upstream`.
    pub fn team_monthly_report(
        &self,
        actor: &Actor,
        month: YearMonth,
    ) -> Result<TeamMonthlyReport, CoreError> {
        let users: Vec<User> = self.repository.find_active_users()?;
        let covered: Vec<&User> = if actor.role == Role::TeamLead {
            let teams: Vec<Team> = self.repository.find_teams_with_members()?;
            led_members(&actor.id, &teams, &users)
        } else {
            require_organization_role(actor, "view the monthly WFH report")?;
            users.iter().collect()
        };

        let counts: HashMap<UserId, u32> = self.wfh_counts(month)?;
        let mut report: TeamMonthlyReport = TeamMonthlyReport {
            year_month: month,
            allowance: self.monthly_allowance,
            total_employees: covered.len(),
            over_limit_count: 0,
            total_extra_days: 0,
            members: Vec::with_capacity(covered.len()),
        };
        for user in covered {
            let wfh_days: u32 = counts.get(&user.id).copied().unwrap_or_default();
            let extra_days: u32 = wfh_days.saturating_sub(self.monthly_allowance);
            if extra_days > 0 {
                report.over_limit_count += 1;
                report.total_extra_days += extra_days;
            }
            report.members.push(MemberWfhSummary {
                user_id: user.id.clone(),
                name: user.name.clone(),
                wfh_days,
                is_over_limit: extra_days > 0,
                extra_days,
            });
        }

        tracing::debug!(
            actor = %actor.id,
            year_month = %month,
            members = report.total_employees,
            over_limit = report.over_limit_count,
            "Monthly WFH report computed"
        );
        Ok(report)
    }

    fn wfh_counts(&self, month: YearMonth) -> Result<HashMap<UserId, u32>, CoreError> {
        let mut counts: HashMap<UserId, u32> = HashMap::new();
        for status in self
            .repository
            .find_work_location_statuses_between(month.first_day(), month.last_day())?
        {
            if status.location == WorkLocation::Wfh {
                *counts.entry(status.user_id).or_default() += 1;
            }
        }
        Ok(counts)
    }
}

fn led_members<'u>(lead_id: &UserId, teams: &[Team], users: &'u [User]) -> Vec<&'u User> {
    let by_id: HashMap<&UserId, &User> = users.iter().map(|user| (&user.id, user)).collect();
    let mut seen: HashSet<&UserId> = HashSet::new();
    teams
        .iter()
        .filter(|team| team.is_led_by(lead_id))
        .flat_map(|team| team.members.iter())
        .filter(|member_id| seen.insert(*member_id))
        .filter_map(|member_id| by_id.get(member_id).copied())
        .collect()
}
