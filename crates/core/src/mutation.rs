// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! State-changing operations.
//!
//! Every accepted mutation is persisted and then recorded in the change
//! history. History writes are best effort: a failure is logged and the
//! mutation still succeeds. Meal participation changes are gated by the
//! cutoff; work location, policy and bulk opt-out changes are not.

use crate::error::CoreError;
use crate::repository::Repository;
use chrono::{DateTime, NaiveDate, Utc};
use craftsbite_audit::{HistoryAction, HistoryRecord, HistorySubject};
use craftsbite_domain::{
    Actor, BulkOptOut, CutoffGate, DomainError, GlobalWorkLocationPolicy, MealPreference,
    MealType, OverrideAuthority, ParticipationRecord, Role, Team, User, UserId, WorkLocation,
    WorkLocationStatus, override_authority, validate_date_range,
};
use serde::Serialize;
use std::collections::HashSet;

/// A participation choice for one user, date and meal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipationChange {
    /// The user whose choice changes.
    pub user_id: UserId,
    /// The date.
    pub date: NaiveDate,
    /// The meal.
    pub meal_type: MealType,
    /// The new participation value.
    pub is_participating: bool,
}

/// A work location for one user and date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationChange {
    /// The user whose location changes.
    pub user_id: UserId,
    /// The date.
    pub date: NaiveDate,
    /// The new location.
    pub location: WorkLocation,
    /// Reason recorded with the change.
    pub reason: Option<String>,
}

/// A request to declare a company-wide work location policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalPolicyRequest {
    /// First date covered.
    pub start_date: NaiveDate,
    /// Last date covered.
    pub end_date: NaiveDate,
    /// The location everyone works from.
    pub location: WorkLocation,
    /// Reason recorded with the policy.
    pub reason: Option<String>,
}

/// A request to opt a user out of a meal for a date range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkOptOutRequest {
    /// The user opting out.
    pub user_id: UserId,
    /// First date covered.
    pub start_date: NaiveDate,
    /// Last date covered.
    pub end_date: NaiveDate,
    /// The meal.
    pub meal_type: MealType,
    /// Reason recorded with the opt-out.
    pub reason: Option<String>,
}

/// A request by an admin or team lead to opt several users out at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminBulkOptOutRequest {
    /// The users to opt out.
    pub user_ids: Vec<UserId>,
    /// First date covered.
    pub start_date: NaiveDate,
    /// Last date covered.
    pub end_date: NaiveDate,
    /// The meals to opt out of.
    pub meal_types: Vec<MealType>,
    /// Reason recorded with every opt-out.
    pub reason: Option<String>,
}

/// A user an admin bulk opt-out could not cover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminBulkOptOutFailure {
    /// The rejected user.
    pub user_id: UserId,
    /// Why the user was rejected.
    pub reason: String,
}

/// Outcome of an admin bulk opt-out.
///
/// The request is all or nothing: when `failed` is non-empty, `created` is
/// empty and `accepted` lists the users that passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminBulkOptOutResult {
    /// Users that passed validation.
    pub accepted: Vec<UserId>,
    /// Users that were rejected.
    pub failed: Vec<AdminBulkOptOutFailure>,
    /// Opt-outs written, one per user and meal.
    pub created: Vec<BulkOptOut>,
}

/// Applies mutations against a repository.
#[derive(Debug)]
pub struct MutationService<'a, R: ?Sized> {
    repository: &'a R,
    gate: CutoffGate,
}

impl<'a, R> MutationService<'a, R>
where
    R: Repository + ?Sized,
{
    /// Creates a service over `repository` that gates meal changes with `gate`.
    #[must_use]
    pub const fn new(repository: &'a R, gate: CutoffGate) -> Self {
        Self { repository, gate }
    }

    /// Loads the acting user.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::NotFound` if the user does not exist.
    pub fn actor(&self, user_id: &UserId) -> Result<Actor, CoreError> {
        let user: User = self.require_user(user_id)?;
        Ok(Actor::new(user.id, user.role))
    }

    /// Records a user's own meal choice.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::DomainViolation` if the cutoff has passed,
    /// `CoreError::NotFound` for an unknown user, or `CoreError::Upstream`.
    pub fn set_participation(
        &self,
        change: &ParticipationChange,
        now: DateTime<Utc>,
    ) -> Result<ParticipationRecord, CoreError> {
        self.gate.validate(change.date, now)?;
        self.require_user(&change.user_id)?;

        let record: ParticipationRecord = ParticipationRecord {
            user_id: change.user_id.clone(),
            date: change.date,
            meal_type: change.meal_type,
            is_participating: change.is_participating,
            opted_out_at: (!change.is_participating).then_some(now),
            override_by: None,
            override_reason: None,
        };
        let previous: Option<bool> = self.store_participation(record.clone())?;

        tracing::info!(
            user_id = %change.user_id,
            date = %change.date,
            meal_type = %change.meal_type,
            is_participating = change.is_participating,
            "Participation updated"
        );
        self.record_history(HistoryRecord {
            user_id: change.user_id.clone(),
            date: change.date,
            subject: HistorySubject::Meal {
                meal_type: change.meal_type,
            },
            action: HistoryAction::for_participation(change.is_participating, false),
            previous_value: previous.map(|value| value.to_string()),
            new_value: change.is_participating.to_string(),
            changed_by: change.user_id.clone(),
            reason: None,
            recorded_at: now,
        });
        Ok(record)
    }

    /// Records a meal choice on another user's behalf.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::DomainViolation` if the cutoff has passed,
    /// `CoreError::NotFound` for an unknown target, `CoreError::Forbidden` if
    /// the actor may not act for the target, or `CoreError::Upstream`.
    pub fn override_participation(
        &self,
        actor: &Actor,
        change: &ParticipationChange,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<ParticipationRecord, CoreError> {
        self.gate.validate(change.date, now)?;
        self.require_user(&change.user_id)?;
        self.require_authority(actor, &change.user_id, "override meal participation")?;

        let record: ParticipationRecord = ParticipationRecord {
            user_id: change.user_id.clone(),
            date: change.date,
            meal_type: change.meal_type,
            is_participating: change.is_participating,
            opted_out_at: (!change.is_participating).then_some(now),
            override_by: Some(actor.id.clone()),
            override_reason: reason.clone(),
        };
        let previous: Option<bool> = self.store_participation(record.clone())?;

        tracing::info!(
            actor = %actor.id,
            user_id = %change.user_id,
            date = %change.date,
            meal_type = %change.meal_type,
            is_participating = change.is_participating,
            "Participation overridden"
        );
        self.record_history(HistoryRecord {
            user_id: change.user_id.clone(),
            date: change.date,
            subject: HistorySubject::Meal {
                meal_type: change.meal_type,
            },
            action: HistoryAction::for_participation(change.is_participating, true),
            previous_value: previous.map(|value| value.to_string()),
            new_value: change.is_participating.to_string(),
            changed_by: actor.id.clone(),
            reason,
            recorded_at: now,
        });
        Ok(record)
    }

    /// Sets a user's own work location.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::NotFound` for an unknown user, or `CoreError::Upstream`.
    pub fn set_own_location(
        &self,
        user_id: &UserId,
        date: NaiveDate,
        location: WorkLocation,
        now: DateTime<Utc>,
    ) -> Result<WorkLocationStatus, CoreError> {
        self.require_user(user_id)?;
        let status: WorkLocationStatus = WorkLocationStatus {
            user_id: user_id.clone(),
            date,
            location,
            updated_by: None,
            reason: None,
        };
        self.store_location(status, user_id, HistoryAction::SelfSet, now)
    }

    /// Sets another user's work location.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::NotFound` for an unknown target, `CoreError::Forbidden`
    /// if the actor may not act for the target, or `CoreError::Upstream`.
    pub fn set_location_for(
        &self,
        actor: &Actor,
        change: &LocationChange,
        now: DateTime<Utc>,
    ) -> Result<WorkLocationStatus, CoreError> {
        self.require_user(&change.user_id)?;
        let authority: OverrideAuthority =
            self.require_authority(actor, &change.user_id, "set work location")?;
        let action: HistoryAction = match authority {
            OverrideAuthority::TeamLead => HistoryAction::LeadOverride,
            OverrideAuthority::Organization => HistoryAction::AdminOverride,
        };

        let status: WorkLocationStatus = WorkLocationStatus {
            user_id: change.user_id.clone(),
            date: change.date,
            location: change.location,
            updated_by: Some(actor.id.clone()),
            reason: change.reason.clone(),
        };
        self.store_location(status, &actor.id, action, now)
    }

    /// Declares a company-wide work location policy.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Forbidden` unless the actor is admin or logistics,
    /// `CoreError::DomainViolation` for an inverted range, or `CoreError::Upstream`.
    pub fn create_global_policy(
        &self,
        actor: &Actor,
        request: GlobalPolicyRequest,
        now: DateTime<Utc>,
    ) -> Result<GlobalWorkLocationPolicy, CoreError> {
        require_organization_role(actor, "declare a global work location policy")?;
        validate_date_range(request.start_date, request.end_date)?;

        let policy: GlobalWorkLocationPolicy =
            self.repository
                .insert_global_policy(GlobalWorkLocationPolicy {
                    policy_id: None,
                    start_date: request.start_date,
                    end_date: request.end_date,
                    location: request.location,
                    active: true,
                    declared_by: actor.id.clone(),
                    reason: request.reason,
                })?;

        tracing::info!(
            actor = %actor.id,
            policy_id = ?policy.policy_id,
            start_date = %policy.start_date,
            end_date = %policy.end_date,
            location = %policy.location,
            "Global work location policy declared"
        );
        self.record_history(HistoryRecord {
            user_id: actor.id.clone(),
            date: policy.start_date,
            subject: HistorySubject::GlobalPolicy,
            action: HistoryAction::GlobalPolicyCreated,
            previous_value: None,
            new_value: policy.location.to_string(),
            changed_by: actor.id.clone(),
            reason: policy.reason.clone(),
            recorded_at: now,
        });
        Ok(policy)
    }

    /// Deactivates a company-wide work location policy.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Forbidden` unless the actor is admin or logistics,
    /// `CoreError::NotFound` if the policy is absent or already inactive, or
    /// `CoreError::Upstream`.
    pub fn remove_global_policy(
        &self,
        actor: &Actor,
        policy_id: i64,
        now: DateTime<Utc>,
    ) -> Result<GlobalWorkLocationPolicy, CoreError> {
        require_organization_role(actor, "remove a global work location policy")?;

        let mut policy: GlobalWorkLocationPolicy = self
            .repository
            .find_global_policy(policy_id)?
            .filter(|policy| policy.active)
            .ok_or_else(|| CoreError::NotFound {
                entity: "global policy",
                id: policy_id.to_string(),
            })?;
        self.repository.deactivate_global_policy(policy_id)?;
        policy.active = false;

        tracing::info!(actor = %actor.id, policy_id, "Global work location policy removed");
        self.record_history(HistoryRecord {
            user_id: actor.id.clone(),
            date: policy.start_date,
            subject: HistorySubject::GlobalPolicy,
            action: HistoryAction::GlobalPolicyRemoved,
            previous_value: Some(policy.location.to_string()),
            new_value: String::from("inactive"),
            changed_by: actor.id.clone(),
            reason: policy.reason.clone(),
            recorded_at: now,
        });
        Ok(policy)
    }

    /// Opts a user out of a meal for a date range.
    ///
    /// Users may opt themselves out; anyone else needs override authority.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::DomainViolation` for an inverted range,
    /// `CoreError::NotFound` for an unknown user, `CoreError::Forbidden`, or
    /// `CoreError::Upstream`.
    pub fn create_bulk_opt_out(
        &self,
        actor: &Actor,
        request: BulkOptOutRequest,
        now: DateTime<Utc>,
    ) -> Result<BulkOptOut, CoreError> {
        validate_date_range(request.start_date, request.end_date)?;
        self.require_user(&request.user_id)?;
        if actor.id != request.user_id {
            self.require_authority(actor, &request.user_id, "create a bulk opt-out")?;
        }

        let reason: String = request.reason.unwrap_or_else(|| {
            format!(
                "Bulk opt-out from {} to {}",
                request.start_date, request.end_date
            )
        });
        let opt_out: BulkOptOut = self.repository.insert_bulk_opt_out(BulkOptOut {
            bulk_opt_out_id: None,
            user_id: request.user_id,
            start_date: request.start_date,
            end_date: request.end_date,
            meal_type: request.meal_type,
            active: true,
            created_by: Some(actor.id.clone()),
            reason: Some(reason),
        })?;

        tracing::info!(
            actor = %actor.id,
            user_id = %opt_out.user_id,
            bulk_opt_out_id = ?opt_out.bulk_opt_out_id,
            meal_type = %opt_out.meal_type,
            "Bulk opt-out created"
        );
        self.record_history(HistoryRecord {
            user_id: opt_out.user_id.clone(),
            date: opt_out.start_date,
            subject: HistorySubject::BulkOptOut {
                meal_type: opt_out.meal_type,
            },
            action: HistoryAction::BulkOptOutCreated,
            previous_value: None,
            new_value: format!("{}..{}", opt_out.start_date, opt_out.end_date),
            changed_by: actor.id.clone(),
            reason: opt_out.reason.clone(),
            recorded_at: now,
        });
        Ok(opt_out)
    }

    /// Deactivates a bulk opt-out.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::NotFound` if the opt-out is absent or already
    /// inactive, `CoreError::Forbidden`, or `CoreError::Upstream`.
    pub fn remove_bulk_opt_out(
        &self,
        actor: &Actor,
        bulk_opt_out_id: i64,
        now: DateTime<Utc>,
    ) -> Result<BulkOptOut, CoreError> {
        let mut opt_out: BulkOptOut = self
            .repository
            .find_bulk_opt_out(bulk_opt_out_id)?
            .filter(|opt_out| opt_out.active)
            .ok_or_else(|| CoreError::NotFound {
                entity: "bulk opt-out",
                id: bulk_opt_out_id.to_string(),
            })?;
        if actor.id != opt_out.user_id {
            self.require_authority(actor, &opt_out.user_id, "remove a bulk opt-out")?;
        }
        self.repository.deactivate_bulk_opt_out(bulk_opt_out_id)?;
        opt_out.active = false;

        tracing::info!(actor = %actor.id, bulk_opt_out_id, "Bulk opt-out removed");
        self.record_history(HistoryRecord {
            user_id: opt_out.user_id.clone(),
            date: opt_out.start_date,
            subject: HistorySubject::BulkOptOut {
                meal_type: opt_out.meal_type,
            },
            action: HistoryAction::BulkOptOutRemoved,
            previous_value: Some(format!("{}..{}", opt_out.start_date, opt_out.end_date)),
            new_value: String::from("inactive"),
            changed_by: actor.id.clone(),
            reason: None,
            recorded_at: now,
        });
        Ok(opt_out)
    }

    /// Changes a user's default meal preference.
    ///
    /// The default applies to every date without a more specific decision, so
    /// the cutoff does not gate it. Setting the current value again writes no
    /// history.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::NotFound` for an unknown user, or `CoreError::Upstream`.
    pub fn set_default_preference(
        &self,
        user_id: &UserId,
        preference: MealPreference,
        now: DateTime<Utc>,
    ) -> Result<User, CoreError> {
        let mut user: User = self.require_user(user_id)?;
        let previous: MealPreference = user.default_meal_preference;
        if previous == preference {
            return Ok(user);
        }
        self.repository
            .update_default_meal_preference(user_id, preference)?;
        user.default_meal_preference = preference;

        tracing::info!(%user_id, %previous, %preference, "Default meal preference changed");
        self.record_history(HistoryRecord {
            user_id: user_id.clone(),
            date: now.with_timezone(&self.gate.timezone()).date_naive(),
            subject: HistorySubject::MealPreference,
            action: HistoryAction::from(preference),
            previous_value: Some(previous.to_string()),
            new_value: preference.to_string(),
            changed_by: user_id.clone(),
            reason: None,
            recorded_at: now,
        });
        Ok(user)
    }

    /// Opts several users out of several meals for a date range.
    ///
    /// Admin and logistics may include anyone. A team lead may include only
    /// members of teams they lead. If any user is rejected nothing is written.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::DomainViolation` for an inverted range or an empty
    /// user or meal list, `CoreError::Forbidden` for employees, or
    /// `CoreError::Upstream`.
    pub fn admin_bulk_opt_out(
        &self,
        actor: &Actor,
        request: AdminBulkOptOutRequest,
        now: DateTime<Utc>,
    ) -> Result<AdminBulkOptOutResult, CoreError> {
        validate_date_range(request.start_date, request.end_date)?;
        if request.user_ids.is_empty() {
            return Err(DomainError::EmptySelection("user").into());
        }
        if request.meal_types.is_empty() {
            return Err(DomainError::EmptySelection("meal type").into());
        }
        if actor.role == Role::Employee {
            return Err(CoreError::Forbidden {
                actor: actor.id.clone(),
                action: String::from("opt out other users in bulk"),
            });
        }

        let mut result: AdminBulkOptOutResult = self.screen_targets(actor, request.user_ids)?;
        if !result.failed.is_empty() {
            tracing::warn!(
                actor = %actor.id,
                rejected = result.failed.len(),
                "Admin bulk opt-out rejected"
            );
            return Ok(result);
        }

        let mut meal_types: Vec<MealType> = request.meal_types;
        meal_types.sort_unstable();
        meal_types.dedup();
        let reason: String = request.reason.unwrap_or_else(|| {
            format!(
                "Admin bulk opt-out from {} to {}",
                request.start_date, request.end_date
            )
        });
        for user_id in &result.accepted {
            for meal_type in &meal_types {
                let opt_out: BulkOptOut = self.repository.insert_bulk_opt_out(BulkOptOut {
                    bulk_opt_out_id: None,
                    user_id: user_id.clone(),
                    start_date: request.start_date,
                    end_date: request.end_date,
                    meal_type: *meal_type,
                    active: true,
                    created_by: Some(actor.id.clone()),
                    reason: Some(reason.clone()),
                })?;
                self.record_history(HistoryRecord {
                    user_id: user_id.clone(),
                    date: opt_out.start_date,
                    subject: HistorySubject::BulkOptOut {
                        meal_type: opt_out.meal_type,
                    },
                    action: HistoryAction::BulkOptOutCreated,
                    previous_value: None,
                    new_value: format!("{}..{}", opt_out.start_date, opt_out.end_date),
                    changed_by: actor.id.clone(),
                    reason: opt_out.reason.clone(),
                    recorded_at: now,
                });
                result.created.push(opt_out);
            }
        }

        tracing::info!(
            actor = %actor.id,
            users = result.accepted.len(),
            opt_outs = result.created.len(),
            "Admin bulk opt-out created"
        );
        Ok(result)
    }

    /// Lists every bulk opt-out of a user, active or not, oldest first.
    ///
    /// Users may list their own; anyone else needs override authority.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::NotFound` for an unknown user, `CoreError::Forbidden`,
    /// or `CoreError::Upstream`.
    pub fn list_bulk_opt_outs(
        &self,
        actor: &Actor,
        user_id: &UserId,
    ) -> Result<Vec<BulkOptOut>, CoreError> {
        self.require_user(user_id)?;
        if actor.id != *user_id {
            self.require_authority(actor, user_id, "list bulk opt-outs")?;
        }
        Ok(self.repository.find_bulk_opt_outs_for_user(user_id)?)
    }

    /// Splits the requested users into those `actor` may opt out and those it
    /// may not, dropping repeats.
    fn screen_targets(
        &self,
        actor: &Actor,
        user_ids: Vec<UserId>,
    ) -> Result<AdminBulkOptOutResult, CoreError> {
        let teams: Vec<Team> = self.repository.find_teams_with_members()?;
        let mut result: AdminBulkOptOutResult = AdminBulkOptOutResult {
            accepted: Vec::new(),
            failed: Vec::new(),
            created: Vec::new(),
        };
        let mut seen_users: HashSet<UserId> = HashSet::new();
        for user_id in user_ids {
            if !seen_users.insert(user_id.clone()) {
                continue;
            }
            if self.repository.find_user(&user_id)?.is_none() {
                result.failed.push(AdminBulkOptOutFailure {
                    user_id,
                    reason: String::from("user not found"),
                });
            } else if override_authority(actor, &user_id, &teams).is_none() {
                result.failed.push(AdminBulkOptOutFailure {
                    user_id,
                    reason: String::from("user is not a member of your team"),
                });
            } else {
                result.accepted.push(user_id);
            }
        }
        Ok(result)
    }

    fn require_user(&self, user_id: &UserId) -> Result<User, CoreError> {
        self.repository
            .find_user(user_id)?
            .ok_or_else(|| CoreError::NotFound {
                entity: "user",
                id: user_id.to_string(),
            })
    }

    fn require_authority(
        &self,
        actor: &Actor,
        target: &UserId,
        action: &str,
    ) -> Result<OverrideAuthority, CoreError> {
        let teams: Vec<Team> = self.repository.find_teams_with_members()?;
        override_authority(actor, target, &teams).ok_or_else(|| {
            tracing::warn!(
                actor = %actor.id,
                role = %actor.role,
                target = %target,
                action,
                "Override denied"
            );
            CoreError::Forbidden {
                actor: actor.id.clone(),
                action: format!("{action} for '{target}'"),
            }
        })
    }

    /// Upserts a participation record, returning the previous explicit value.
    fn store_participation(&self, record: ParticipationRecord) -> Result<Option<bool>, CoreError> {
        let previous: Option<bool> = self
            .repository
            .find_participation(&record.user_id, record.date, record.meal_type)?
            .map(|existing| existing.is_participating);
        self.repository.upsert_participation(record)?;
        Ok(previous)
    }

    fn store_location(
        &self,
        status: WorkLocationStatus,
        changed_by: &UserId,
        action: HistoryAction,
        now: DateTime<Utc>,
    ) -> Result<WorkLocationStatus, CoreError> {
        let previous: Option<WorkLocation> = self
            .repository
            .find_work_location_status(&status.user_id, status.date)?
            .map(|existing| existing.location);
        self.repository.upsert_work_location_status(status.clone())?;

        tracing::info!(
            user_id = %status.user_id,
            date = %status.date,
            location = %status.location,
            action = %action,
            "Work location updated"
        );
        self.record_history(HistoryRecord {
            user_id: status.user_id.clone(),
            date: status.date,
            subject: HistorySubject::WorkLocation,
            action,
            previous_value: previous.map(|location| location.to_string()),
            new_value: status.location.to_string(),
            changed_by: changed_by.clone(),
            reason: status.reason.clone(),
            recorded_at: now,
        });
        Ok(status)
    }

    fn record_history(&self, record: HistoryRecord) {
        let action: HistoryAction = record.action;
        let user_id: UserId = record.user_id.clone();
        if let Err(e) = self.repository.append_history(record) {
            tracing::warn!(%action, %user_id, error = %e, "Failed to append history record");
        }
    }
}

/// Allows only admin and logistics actors.
///
/// # Errors
///
/// Returns `CoreError::Forbidden` for any other role.
pub fn require_organization_role(actor: &Actor, action: &str) -> Result<(), CoreError> {
    if actor.role.is_organization_wide() {
        return Ok(());
    }
    Err(CoreError::Forbidden {
        actor: actor.id.clone(),
        action: String::from(action),
    })
}
