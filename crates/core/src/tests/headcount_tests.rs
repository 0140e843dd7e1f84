// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{FakeRepository, saturday, weekday};
use crate::{
    CoreError, DailySummary, HeadcountAggregator, MealDetail, MealHeadcount, OfficeWfhSplit,
    ParticipationSource, TeamParticipation,
};
use craftsbite_domain::{Actor, DayStatus, MealType, Role, UserId, WeekendDays, WorkLocation};

/// Five active users; u4 and u5 have opted out of lunch.
fn create_test_repository() -> FakeRepository {
    FakeRepository::new()
        .with_user("u1", Role::Employee)
        .with_user("u2", Role::Employee)
        .with_user("u3", Role::Employee)
        .with_user("u4", Role::Employee)
        .with_user("u5", Role::Employee)
        .with_user("lead", Role::TeamLead)
        .with_inactive_user("gone")
        .with_choice("u4", weekday(), MealType::Lunch, false)
        .with_choice("u5", weekday(), MealType::Lunch, false)
}

fn summarize(repo: &FakeRepository, on: chrono::NaiveDate) -> DailySummary {
    HeadcountAggregator::new(repo, WeekendDays::default())
        .summarize(on)
        .unwrap()
}

#[test]
fn test_org_meal_totals() {
    let repo: FakeRepository = create_test_repository();
    let summary: DailySummary = summarize(&repo, weekday());

    assert_eq!(summary.day_status, DayStatus::Normal);
    assert_eq!(summary.total_active_users, 6);
    assert_eq!(summary.special_day_note, None);
    assert_eq!(
        summary.meals[&MealType::Lunch],
        MealHeadcount {
            participating: 4,
            opted_out: 2
        }
    );
    assert_eq!(
        summary.meals[&MealType::Snacks],
        MealHeadcount {
            participating: 6,
            opted_out: 0
        }
    );
}

#[test]
fn test_three_of_five_opted_in() {
    let repo: FakeRepository = FakeRepository::new()
        .with_user("u1", Role::Employee)
        .with_user("u2", Role::Employee)
        .with_user("u3", Role::Employee)
        .with_user("u4", Role::Employee)
        .with_user("u5", Role::Employee)
        .with_choice("u4", weekday(), MealType::Lunch, false)
        .with_choice("u5", weekday(), MealType::Lunch, false)
        .with_team("t1", "Alpha", "u1", &["u1", "u2"])
        .with_team("t2", "Beta", "u3", &["u3", "u4", "u5"]);
    let summary: DailySummary = summarize(&repo, weekday());

    let org: MealHeadcount = summary.meals[&MealType::Lunch];
    assert_eq!(org.participating, 3);
    assert_eq!(org.opted_out, 2);

    let team_participating: usize = summary
        .teams
        .iter()
        .map(|team| team.meals[&MealType::Lunch].participating)
        .sum();
    let team_opted_out: usize = summary
        .teams
        .iter()
        .map(|team| team.meals[&MealType::Lunch].opted_out)
        .sum();
    assert_eq!(team_participating, 3);
    assert_eq!(team_opted_out, 2);
    assert_eq!(summary.unassigned_users, 0);
}

#[test]
fn test_teams_sorted_case_insensitively_and_skip_inactive_members() {
    let repo: FakeRepository = create_test_repository()
        .with_team("t-b", "beta", "lead", &["u3", "u4"])
        .with_team("t-a", "Alpha", "lead", &["u1", "u2", "gone"])
        .with_team("t-c", "Charlie", "lead", &[]);
    let summary: DailySummary = summarize(&repo, weekday());

    let names: Vec<&str> = summary
        .teams
        .iter()
        .map(|team| team.team_name.as_str())
        .collect();
    assert_eq!(names, vec!["Alpha", "beta", "Charlie"]);

    assert_eq!(summary.teams[0].total_members, 2);
    assert_eq!(
        summary.teams[1].meals[&MealType::Lunch],
        MealHeadcount {
            participating: 1,
            opted_out: 1
        }
    );
    assert_eq!(summary.teams[2].total_members, 0);
    assert_eq!(
        summary.teams[2].meals[&MealType::Lunch],
        MealHeadcount::default()
    );
    // u5 and the lead belong to no team.
    assert_eq!(summary.unassigned_users, 2);
}

#[test]
fn test_user_in_two_teams_is_counted_in_each() {
    let repo: FakeRepository = create_test_repository()
        .with_team("t-a", "Alpha", "lead", &["u1"])
        .with_team("t-b", "Beta", "lead", &["u1", "u1"]);
    let summary: DailySummary = summarize(&repo, weekday());
    assert_eq!(summary.teams[0].total_members, 1);
    assert_eq!(summary.teams[1].total_members, 1);
    assert_eq!(summary.unassigned_users, 5);
}

#[test]
fn test_office_wfh_split() {
    let repo: FakeRepository = create_test_repository()
        .with_location("u1", weekday(), WorkLocation::Wfh)
        .with_team("t-a", "Alpha", "lead", &["u1", "u2"]);
    let summary: DailySummary = summarize(&repo, weekday());
    assert_eq!(summary.office_wfh_split, OfficeWfhSplit { office: 5, wfh: 1 });
    assert_eq!(
        summary.teams[0].office_wfh_split,
        OfficeWfhSplit { office: 1, wfh: 1 }
    );
}

#[test]
fn test_global_policy_resolved_once_per_summary() {
    let repo: FakeRepository = create_test_repository()
        .with_policy(weekday(), weekday(), WorkLocation::Wfh, true)
        .with_location("u1", weekday(), WorkLocation::Office);
    let summary: DailySummary = summarize(&repo, weekday());
    assert_eq!(summary.office_wfh_split, OfficeWfhSplit { office: 0, wfh: 6 });
    assert_eq!(repo.policy_lookups.get(), 1);
}

#[test]
fn test_weekend_without_schedule_is_empty() {
    let repo: FakeRepository = create_test_repository().with_team("t-a", "Alpha", "lead", &["u1"]);
    let summary: DailySummary = summarize(&repo, saturday());
    assert_eq!(summary.day_status, DayStatus::Weekend);
    assert!(summary.meals.is_empty());
    assert!(summary.teams.is_empty());
    assert_eq!(summary.total_active_users, 6);
    assert_eq!(
        summary.special_day_note.as_deref(),
        Some("Weekend schedule applies.")
    );
}

#[test]
fn test_office_closed_day_has_no_meals_and_a_note() {
    let repo: FakeRepository =
        create_test_repository().with_schedule(weekday(), DayStatus::OfficeClosed, None, Some(" Flood "));
    let summary: DailySummary = summarize(&repo, weekday());
    assert_eq!(summary.day_status, DayStatus::OfficeClosed);
    assert!(summary.meals.is_empty());
    assert_eq!(
        summary.special_day_note.as_deref(),
        Some("Office is closed for this date. Reason: Flood")
    );
}

#[test]
fn test_event_day_counts_configured_meals() {
    let repo: FakeRepository = create_test_repository().with_schedule(
        weekday(),
        DayStatus::EventDay,
        Some(vec![MealType::Lunch, MealType::EventDinner]),
        None,
    );
    let summary: DailySummary = summarize(&repo, weekday());
    assert_eq!(
        summary.meals.keys().copied().collect::<Vec<MealType>>(),
        vec![MealType::Lunch, MealType::EventDinner]
    );
    assert_eq!(summary.meals[&MealType::EventDinner].participating, 6);
}

#[test]
fn test_celebration_weekend_counts_meals() {
    let repo: FakeRepository =
        create_test_repository().with_schedule(saturday(), DayStatus::Celebration, None, None);
    let summary: DailySummary = summarize(&repo, saturday());
    assert_eq!(summary.day_status, DayStatus::Celebration);
    assert_eq!(summary.meals[&MealType::Lunch].participating, 6);
    assert_eq!(summary.special_day_note.as_deref(), Some("Celebration day."));
}

#[test]
fn test_summary_failure_is_upstream() {
    let repo: FakeRepository = create_test_repository();
    repo.fail_reads.set(true);
    let result: Result<DailySummary, CoreError> =
        HeadcountAggregator::new(&repo, WeekendDays::default()).summarize(weekday());
    assert!(matches!(result, Err(CoreError::Upstream(_))));
}

#[test]
fn test_detailed_headcount_lists_provenance() {
    let repo: FakeRepository = create_test_repository();
    let detail: MealDetail = HeadcountAggregator::new(&repo, WeekendDays::default())
        .detailed_headcount(weekday(), MealType::Lunch)
        .unwrap();
    assert_eq!(detail.total_count, 6);
    assert_eq!(detail.participants.len(), 4);
    assert_eq!(detail.non_participants.len(), 2);
    assert!(
        detail
            .non_participants
            .iter()
            .all(|info| info.source == ParticipationSource::Explicit)
    );
    assert_eq!(detail.non_participants[0].email, "u4@example.com");
}

#[test]
fn test_team_participation_for_lead() {
    let repo: FakeRepository = create_test_repository()
        .with_team("t-a", "Alpha", "lead", &["u1", "u4", "gone"])
        .with_team("t-b", "Beta", "u2", &["u3"]);
    let teams: Vec<TeamParticipation> = HeadcountAggregator::new(&repo, WeekendDays::default())
        .team_participation(&UserId::new("lead"), weekday())
        .unwrap();

    assert_eq!(teams.len(), 1);
    assert_eq!(teams[0].team_name, "Alpha");
    assert_eq!(teams[0].team_lead_user_id, UserId::new("lead"));
    assert_eq!(teams[0].members.len(), 2);
    let u4 = &teams[0].members[1];
    assert_eq!(u4.user_id, UserId::new("u4"));
    assert!(!u4.meals[&MealType::Lunch].is_participating);
    assert!(u4.meals[&MealType::Snacks].is_participating);
}

#[test]
fn test_team_participation_for_non_lead_is_empty() {
    let repo: FakeRepository = create_test_repository().with_team("t-a", "Alpha", "lead", &["u1"]);
    let teams: Vec<TeamParticipation> = HeadcountAggregator::new(&repo, WeekendDays::default())
        .team_participation(&UserId::new("u1"), weekday())
        .unwrap();
    assert!(teams.is_empty());
}

#[test]
fn test_all_teams_participation_for_logistics() {
    let repo: FakeRepository = create_test_repository()
        .with_user("kitchen", Role::Logistics)
        .with_team("t-b", "beta", "u2", &["u3", "u5"])
        .with_team("t-a", "Alpha", "lead", &["u1", "gone"]);
    let teams: Vec<TeamParticipation> = HeadcountAggregator::new(&repo, WeekendDays::default())
        .all_teams_participation(
            &Actor::new(UserId::new("kitchen"), Role::Logistics),
            weekday(),
        )
        .unwrap();

    let names: Vec<&str> = teams.iter().map(|team| team.team_name.as_str()).collect();
    assert_eq!(names, vec!["Alpha", "beta"]);
    assert_eq!(teams[0].members.len(), 1);
    assert_eq!(teams[1].team_lead_user_id, UserId::new("u2"));
    assert!(teams[1].members.iter().all(|member| member.user_id != UserId::new("u2")));
    assert!(!teams[1].members[1].meals[&MealType::Lunch].is_participating);
}

#[test]
fn test_all_teams_participation_requires_organization_role() {
    let repo: FakeRepository = create_test_repository().with_team("t-a", "Alpha", "lead", &["u1"]);
    let aggregator: HeadcountAggregator<'_, FakeRepository> =
        HeadcountAggregator::new(&repo, WeekendDays::default());
    for role in [Role::TeamLead, Role::Employee] {
        assert!(matches!(
            aggregator.all_teams_participation(&Actor::new(UserId::new("lead"), role), weekday()),
            Err(CoreError::Forbidden { .. })
        ));
    }
}

#[test]
fn test_summary_serializes_meal_keys_as_strings() {
    let repo: FakeRepository = create_test_repository();
    let summary: DailySummary = summarize(&repo, weekday());
    let json: serde_json::Value = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["date"], "2026-01-05");
    assert_eq!(json["day_status"], "normal");
    assert_eq!(json["meals"]["lunch"]["opted_out"], 2);
    assert!(json.get("special_day_note").is_none());
}
