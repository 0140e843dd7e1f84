// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use craftsbite_domain::{
    BulkOptOut, DaySchedule, GlobalWorkLocationPolicy, ParticipationRecord, Team, User,
    WorkLocationStatus,
};
use serde::{Deserialize, Serialize};

/// A JSON fixture describing the initial contents of a store.
///
/// Every section is optional. Identifiers on bulk opt-outs and policies are
/// reassigned on load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Seed {
    pub users: Vec<User>,
    pub teams: Vec<Team>,
    pub schedules: Vec<DaySchedule>,
    pub participations: Vec<ParticipationRecord>,
    pub bulk_opt_outs: Vec<BulkOptOut>,
    pub work_locations: Vec<WorkLocationStatus>,
    pub global_policies: Vec<GlobalWorkLocationPolicy>,
}
