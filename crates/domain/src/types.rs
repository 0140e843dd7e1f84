// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The meals the office kitchen serves.
///
/// Variant order is the fixed display order used by announcements.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum MealType {
    /// Weekday lunch.
    Lunch,
    /// Afternoon snacks.
    Snacks,
    /// Iftar during Ramadan.
    Iftar,
    /// Dinner served on event days.
    EventDinner,
    /// Dinner for employees staying late.
    OptionalDinner,
}

impl MealType {
    /// Every meal type, in display order.
    pub const ALL: [Self; 5] = [
        Self::Lunch,
        Self::Snacks,
        Self::Iftar,
        Self::EventDinner,
        Self::OptionalDinner,
    ];

    /// Meals served on an ordinary working day with no schedule entry.
    pub const WEEKDAY_DEFAULT: [Self; 2] = [Self::Lunch, Self::Snacks];

    /// Converts this meal type to its wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Lunch => "lunch",
            Self::Snacks => "snacks",
            Self::Iftar => "iftar",
            Self::EventDinner => "event_dinner",
            Self::OptionalDinner => "optional_dinner",
        }
    }

    /// Human-readable title, e.g. `Event Dinner`.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Lunch => "Lunch",
            Self::Snacks => "Snacks",
            Self::Iftar => "Iftar",
            Self::EventDinner => "Event Dinner",
            Self::OptionalDinner => "Optional Dinner",
        }
    }

    /// Emoji used as the bullet for this meal in announcements.
    #[must_use]
    pub const fn emoji(&self) -> &'static str {
        match self {
            Self::Lunch => "🍛",
            Self::Snacks => "🍪",
            Self::Iftar => "🌙",
            Self::EventDinner => "🎉",
            Self::OptionalDinner => "🍽️",
        }
    }
}

impl FromStr for MealType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lunch" => Ok(Self::Lunch),
            "snacks" => Ok(Self::Snacks),
            "iftar" => Ok(Self::Iftar),
            "event_dinner" => Ok(Self::EventDinner),
            "optional_dinner" => Ok(Self::OptionalDinner),
            _ => Err(DomainError::InvalidMealType(s.to_string())),
        }
    }
}

impl std::fmt::Display for MealType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The kind of day a date is, as declared by a day schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    /// Regular working day.
    #[default]
    Normal,
    /// Weekend day.
    Weekend,
    /// The office is closed.
    OfficeClosed,
    /// Government holiday.
    GovtHoliday,
    /// Company celebration; meals are served.
    Celebration,
    /// Company event day.
    EventDay,
}

impl DayStatus {
    /// Converts this day status to its wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Weekend => "weekend",
            Self::OfficeClosed => "office_closed",
            Self::GovtHoliday => "govt_holiday",
            Self::Celebration => "celebration",
            Self::EventDay => "event_day",
        }
    }

    /// Whether a schedule with this status re-opens a configured weekend day.
    #[must_use]
    pub const fn lifts_weekend(&self) -> bool {
        matches!(self, Self::Normal | Self::Celebration)
    }

    /// Whether this status serves no meals unless a meal list is configured.
    #[must_use]
    pub const fn is_closed_by_default(&self) -> bool {
        matches!(self, Self::Weekend | Self::OfficeClosed | Self::GovtHoliday)
    }
}

impl FromStr for DayStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(Self::Normal),
            "weekend" => Ok(Self::Weekend),
            "office_closed" => Ok(Self::OfficeClosed),
            "govt_holiday" => Ok(Self::GovtHoliday),
            "celebration" => Ok(Self::Celebration),
            "event_day" => Ok(Self::EventDay),
            _ => Err(DomainError::InvalidDayStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for DayStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where an employee works on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WorkLocation {
    /// At the office. This is the organizational default.
    #[default]
    Office,
    /// Working from home.
    Wfh,
}

impl WorkLocation {
    /// Converts this location to its wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Office => "office",
            Self::Wfh => "wfh",
        }
    }
}

impl FromStr for WorkLocation {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "office" => Ok(Self::Office),
            "wfh" => Ok(Self::Wfh),
            _ => Err(DomainError::InvalidLocation(s.to_string())),
        }
    }
}

impl std::fmt::Display for WorkLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Organizational role of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular employee. Manages only their own choices.
    #[default]
    Employee,
    /// Leads one or more teams and may act for their members.
    TeamLead,
    /// Full administrative authority.
    Admin,
    /// Kitchen and facilities staff; same override reach as admins.
    Logistics,
}

impl Role {
    /// Converts this role to its wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::TeamLead => "team_lead",
            Self::Admin => "admin",
            Self::Logistics => "logistics",
        }
    }

    /// Whether this role acts on behalf of the whole organization.
    #[must_use]
    pub const fn is_organization_wide(&self) -> bool {
        matches!(self, Self::Admin | Self::Logistics)
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "employee" => Ok(Self::Employee),
            "team_lead" => Ok(Self::TeamLead),
            "admin" => Ok(Self::Admin),
            "logistics" => Ok(Self::Logistics),
            _ => Err(DomainError::InvalidRole(s.to_string())),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A user's standing meal stance when they have made no explicit choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MealPreference {
    /// Counted in unless they opt out.
    #[default]
    OptIn,
    /// Counted out unless they opt in.
    OptOut,
}

impl MealPreference {
    /// Converts this preference to its wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OptIn => "opt_in",
            Self::OptOut => "opt_out",
        }
    }
}

impl std::fmt::Display for MealPreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MealPreference {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "opt_in" => Ok(Self::OptIn),
            "opt_out" => Ok(Self::OptOut),
            _ => Err(DomainError::InvalidMealPreference(s.to_string())),
        }
    }
}

/// Identifier of a user.
///
/// Identifiers are opaque; the caller is responsible for having validated them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Creates a new `UserId`.
    #[must_use]
    pub fn new(value: &str) -> Self {
        Self(value.to_string())
    }

    /// Returns the identifier value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a team.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(String);

impl TeamId {
    /// Creates a new `TeamId`.
    #[must_use]
    pub fn new(value: &str) -> Self {
        Self(value.to_string())
    }

    /// Returns the identifier value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TeamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An employee record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// The user's identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Organizational role.
    #[serde(default)]
    pub role: Role,
    /// Inactive users are excluded from headcounts.
    #[serde(default = "default_true")]
    pub active: bool,
    /// Lowest-priority participation fallback.
    #[serde(default)]
    pub default_meal_preference: MealPreference,
}

impl User {
    /// Creates an active, opted-in user.
    ///
    /// # Arguments
    ///
    /// * `id` - The user's identifier
    /// * `name` - Display name
    /// * `email` - Contact email
    /// * `role` - Organizational role
    #[must_use]
    pub const fn new(id: UserId, name: String, email: String, role: Role) -> Self {
        Self {
            id,
            name,
            email,
            role,
            active: true,
            default_meal_preference: MealPreference::OptIn,
        }
    }
}

const fn default_true() -> bool {
    true
}

/// A team and its member set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// The team's identifier.
    pub id: TeamId,
    /// Display name.
    pub name: String,
    /// The user who leads this team.
    pub lead_id: UserId,
    /// Members, not including the lead unless explicitly added.
    #[serde(default)]
    pub members: Vec<UserId>,
}

impl Team {
    /// Whether `user_id` is in this team's member set.
    #[must_use]
    pub fn is_member(&self, user_id: &UserId) -> bool {
        self.members.contains(user_id)
    }

    /// Whether `user_id` leads this team.
    #[must_use]
    pub fn is_led_by(&self, user_id: &UserId) -> bool {
        &self.lead_id == user_id
    }
}

/// The declared shape of a single date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySchedule {
    /// The scheduled date.
    pub date: NaiveDate,
    /// The kind of day.
    pub status: DayStatus,
    /// Free-text explanation shown in announcements.
    #[serde(default)]
    pub reason: Option<String>,
    /// Meals served that day, if configured.
    #[serde(default)]
    pub meals: Option<Vec<MealType>>,
}

impl DaySchedule {
    /// Creates a schedule with no reason and no meal list.
    #[must_use]
    pub const fn new(date: NaiveDate, status: DayStatus) -> Self {
        Self {
            date,
            status,
            reason: None,
            meals: None,
        }
    }

    /// Returns the configured meal list, treating an empty list as unset.
    #[must_use]
    pub fn explicit_meals(&self) -> Option<&[MealType]> {
        self.meals.as_deref().filter(|meals| !meals.is_empty())
    }

    /// Whether this schedule blacks out every meal regardless of user choices.
    ///
    /// An office closure always does; a government holiday does unless a meal
    /// list was configured for it.
    #[must_use]
    pub fn is_blackout(&self) -> bool {
        match self.status {
            DayStatus::OfficeClosed => true,
            DayStatus::GovtHoliday => self.explicit_meals().is_none(),
            DayStatus::Normal
            | DayStatus::Weekend
            | DayStatus::Celebration
            | DayStatus::EventDay => false,
        }
    }
}

/// An explicit per-day meal choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipationRecord {
    /// The user the choice applies to.
    pub user_id: UserId,
    /// The date the choice applies to.
    pub date: NaiveDate,
    /// The meal the choice applies to.
    pub meal_type: MealType,
    /// Whether the user will eat this meal.
    pub is_participating: bool,
    /// When the user opted out, if they did.
    #[serde(default)]
    pub opted_out_at: Option<DateTime<Utc>>,
    /// The actor who overrode this choice on the user's behalf.
    #[serde(default)]
    pub override_by: Option<UserId>,
    /// Reason given for the override.
    #[serde(default)]
    pub override_reason: Option<String>,
}

/// A date-range opt-out from one meal type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkOptOut {
    /// Identifier assigned by the repository. `None` until persisted.
    #[serde(default)]
    pub bulk_opt_out_id: Option<i64>,
    /// The user opting out.
    pub user_id: UserId,
    /// First date covered (inclusive).
    pub start_date: NaiveDate,
    /// Last date covered (inclusive).
    pub end_date: NaiveDate,
    /// The meal opted out of.
    pub meal_type: MealType,
    /// Inactive opt-outs are ignored.
    pub active: bool,
    /// The actor who created the opt-out.
    #[serde(default)]
    pub created_by: Option<UserId>,
    /// Reason recorded with the opt-out.
    #[serde(default)]
    pub reason: Option<String>,
}

impl BulkOptOut {
    /// Whether this opt-out applies to `meal_type` on `date`.
    #[must_use]
    pub fn covers(&self, date: NaiveDate, meal_type: MealType) -> bool {
        self.active && self.meal_type == meal_type && self.start_date <= date && date <= self.end_date
    }
}

/// An explicit per-day work location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkLocationStatus {
    /// The user the status applies to.
    pub user_id: UserId,
    /// The date the status applies to.
    pub date: NaiveDate,
    /// The chosen location.
    pub location: WorkLocation,
    /// The actor who set the status on the user's behalf.
    #[serde(default)]
    pub updated_by: Option<UserId>,
    /// Reason recorded with the status.
    #[serde(default)]
    pub reason: Option<String>,
}

/// A company-wide work location directive for a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalWorkLocationPolicy {
    /// Identifier assigned by the repository. `None` until persisted.
    #[serde(default)]
    pub policy_id: Option<i64>,
    /// First date covered (inclusive).
    pub start_date: NaiveDate,
    /// Last date covered (inclusive).
    pub end_date: NaiveDate,
    /// The location everyone works from.
    pub location: WorkLocation,
    /// Inactive policies are ignored.
    pub active: bool,
    /// The actor who declared the policy.
    pub declared_by: UserId,
    /// Reason recorded with the policy.
    #[serde(default)]
    pub reason: Option<String>,
}

impl GlobalWorkLocationPolicy {
    /// Whether this policy is in force on `date`.
    #[must_use]
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.active && self.start_date <= date && date <= self.end_date
    }
}
