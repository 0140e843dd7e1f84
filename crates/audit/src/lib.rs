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
    clippy::all
)]

use chrono::{DateTime, NaiveDate, Utc};
use craftsbite_domain::{MealPreference, MealType, UserId};
use serde::{Deserialize, Serialize};

/// What a history entry is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HistorySubject {
    /// A participation choice for one meal.
    Meal {
        /// The meal whose participation changed.
        meal_type: MealType,
    },
    /// A per-day work location.
    WorkLocation,
    /// A company-wide work location policy.
    GlobalPolicy,
    /// A date-range meal opt-out.
    BulkOptOut {
        /// The meal opted out of.
        meal_type: MealType,
    },
    /// The user's standing default across all meals.
    MealPreference,
}

/// The kind of change a history entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    /// The user opted in to a meal.
    OptedIn,
    /// The user opted out of a meal.
    OptedOut,
    /// Someone else opted the user in.
    OverrideIn,
    /// Someone else opted the user out.
    OverrideOut,
    /// The user set their own work location.
    SelfSet,
    /// A team lead set the user's work location.
    LeadOverride,
    /// An admin or logistics user set the user's work location.
    AdminOverride,
    /// A global work location policy was declared.
    GlobalPolicyCreated,
    /// A global work location policy was deactivated.
    GlobalPolicyRemoved,
    /// A bulk opt-out was created.
    BulkOptOutCreated,
    /// A bulk opt-out was deactivated.
    BulkOptOutRemoved,
    /// The default meal preference became opt-in.
    PreferenceChangedToOptIn,
    /// The default meal preference became opt-out.
    PreferenceChangedToOptOut,
}

impl HistoryAction {
    /// Converts this action to its wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OptedIn => "opted_in",
            Self::OptedOut => "opted_out",
            Self::OverrideIn => "override_in",
            Self::OverrideOut => "override_out",
            Self::SelfSet => "self_set",
            Self::LeadOverride => "lead_override",
            Self::AdminOverride => "admin_override",
            Self::GlobalPolicyCreated => "global_policy_created",
            Self::GlobalPolicyRemoved => "global_policy_removed",
            Self::BulkOptOutCreated => "bulk_opt_out_created",
            Self::BulkOptOutRemoved => "bulk_opt_out_removed",
            Self::PreferenceChangedToOptIn => "preference_changed_to_opt_in",
            Self::PreferenceChangedToOptOut => "preference_changed_to_opt_out",
        }
    }

    /// The participation action for a meal choice.
    ///
    /// # Arguments
    ///
    /// * `is_participating` - The new participation value
    /// * `is_override` - Whether someone other than the user made the change
    #[must_use]
    pub const fn for_participation(is_participating: bool, is_override: bool) -> Self {
        match (is_participating, is_override) {
            (true, false) => Self::OptedIn,
            (false, false) => Self::OptedOut,
            (true, true) => Self::OverrideIn,
            (false, true) => Self::OverrideOut,
        }
    }
}

impl From<MealPreference> for HistoryAction {
    fn from(preference: MealPreference) -> Self {
        match preference {
            MealPreference::OptIn => Self::PreferenceChangedToOptIn,
            MealPreference::OptOut => Self::PreferenceChangedToOptOut,
        }
    }
}

impl std::fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An immutable entry in the change history.
///
/// Every accepted mutation produces one entry capturing:
/// - Whose choice changed and for which date
/// - What changed (subject and action)
/// - The value before and after the change
/// - Who made the change and why
///
/// The `previous_value` is `None` when the user had no explicit record before.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// The user whose choice changed.
    pub user_id: UserId,
    /// The affected date. Range changes record their start date.
    pub date: NaiveDate,
    /// What the entry is about.
    pub subject: HistorySubject,
    /// The kind of change.
    pub action: HistoryAction,
    /// The explicit value before the change, if there was one.
    pub previous_value: Option<String>,
    /// The value after the change.
    pub new_value: String,
    /// The actor who made the change.
    pub changed_by: UserId,
    /// Reason given for the change.
    pub reason: Option<String>,
    /// When the change was accepted.
    pub recorded_at: DateTime<Utc>,
}

impl HistoryRecord {
    /// Whether someone other than the affected user made the change.
    #[must_use]
    pub fn is_on_behalf(&self) -> bool {
        self.changed_by != self.user_id
    }
}
