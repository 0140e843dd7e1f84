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
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod announcement;
mod error;
mod headcount;
mod mutation;
mod participation;
mod repository;
mod wfh_report;
mod work_location;

#[cfg(test)]
mod tests;

// Re-export public types and functions
pub use announcement::{
    Announcement, AnnouncementMealTotal, render_announcement, special_day_note,
};
pub use error::CoreError;
pub use headcount::{
    DailySummary, HeadcountAggregator, MealDetail, MealHeadcount, MemberParticipation,
    OfficeWfhSplit, ParticipantInfo, TeamHeadcount, TeamParticipation,
};
pub use mutation::{
    AdminBulkOptOutFailure, AdminBulkOptOutRequest, AdminBulkOptOutResult, BulkOptOutRequest,
    GlobalPolicyRequest, LocationChange, MutationService, ParticipationChange,
};
pub use participation::{
    DayParticipation, ParticipationDecision, ParticipationResolver, ParticipationSource,
};
pub use repository::{
    BulkOptOutRepository, HistoryRepository, ParticipationRepository, Repository,
    RepositoryError, ScheduleRepository, TeamRepository, UserRepository, WorkLocationRepository,
};
pub use wfh_report::{
    DEFAULT_MONTHLY_WFH_ALLOWANCE, MemberWfhSummary, MonthlyWfhSummary, TeamMonthlyReport,
    WfhReporter,
};
pub use work_location::{LocationDecision, LocationSource, WorkLocationResolver};
