// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Who may act on whose behalf.

use crate::types::{Role, Team, UserId};
use serde::{Deserialize, Serialize};

/// The user performing a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// The acting user's identifier.
    pub id: UserId,
    /// The acting user's role.
    pub role: Role,
}

impl Actor {
    /// Creates a new `Actor`.
    #[must_use]
    pub const fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }
}

/// The reach under which an override was permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideAuthority {
    /// Admin or logistics acting for anyone.
    Organization,
    /// A team lead acting for a member of a team they lead.
    TeamLead,
}

/// Determines whether `actor` may change choices on behalf of `target`.
///
/// Admins and logistics may act for anyone. A team lead may act for users who
/// are members of at least one team they lead. Employees may never override.
///
/// # Arguments
///
/// * `actor` - The user attempting the override
/// * `target` - The user whose choices would change
/// * `teams` - The teams to search for a lead/member relationship
///
/// # Returns
///
/// The authority the override is granted under, or `None` if it is forbidden.
#[must_use]
pub fn override_authority(
    actor: &Actor,
    target: &UserId,
    teams: &[Team],
) -> Option<OverrideAuthority> {
    match actor.role {
        Role::Admin | Role::Logistics => Some(OverrideAuthority::Organization),
        Role::TeamLead => teams
            .iter()
            .any(|team| team.is_led_by(&actor.id) && team.is_member(target))
            .then_some(OverrideAuthority::TeamLead),
        Role::Employee => None,
    }
}

/// Returns `true` if `actor` may override choices for `target`.
#[must_use]
pub fn can_override(actor: &Actor, target: &UserId, teams: &[Team]) -> bool {
    override_authority(actor, target, teams).is_some()
}
