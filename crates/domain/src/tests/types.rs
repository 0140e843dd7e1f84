// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    BulkOptOut, DaySchedule, DayStatus, DomainError, GlobalWorkLocationPolicy, MealPreference,
    MealType, Role, User, UserId, WorkLocation,
};
use chrono::NaiveDate;

fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}

#[test]
fn test_meal_type_parses_every_wire_name() {
    for meal in MealType::ALL {
        let parsed: MealType = meal.as_str().parse().unwrap();
        assert_eq!(parsed, meal);
    }
}

#[test]
fn test_meal_type_rejects_unknown_name() {
    let result: Result<MealType, DomainError> = "brunch".parse();
    assert_eq!(
        result,
        Err(DomainError::InvalidMealType(String::from("brunch")))
    );
}

#[test]
fn test_meal_type_ordering_matches_display_order() {
    let mut meals: Vec<MealType> = vec![
        MealType::OptionalDinner,
        MealType::Snacks,
        MealType::EventDinner,
        MealType::Lunch,
        MealType::Iftar,
    ];
    meals.sort();
    assert_eq!(meals, MealType::ALL.to_vec());
}

#[test]
fn test_meal_type_serializes_as_snake_case() {
    let json: String = serde_json::to_string(&MealType::EventDinner).unwrap();
    assert_eq!(json, "\"event_dinner\"");
    assert_eq!(MealType::EventDinner.display_name(), "Event Dinner");
}

#[test]
fn test_day_status_round_trips_govt_holiday() {
    let status: DayStatus = "govt_holiday".parse().unwrap();
    assert_eq!(status, DayStatus::GovtHoliday);
    assert_eq!(status.to_string(), "govt_holiday");
    assert!("holiday".parse::<DayStatus>().is_err());
}

#[test]
fn test_day_status_weekend_lifting() {
    assert!(DayStatus::Normal.lifts_weekend());
    assert!(DayStatus::Celebration.lifts_weekend());
    assert!(!DayStatus::EventDay.lifts_weekend());
    assert!(!DayStatus::OfficeClosed.lifts_weekend());
}

#[test]
fn test_work_location_parsing() {
    assert_eq!("wfh".parse::<WorkLocation>().unwrap(), WorkLocation::Wfh);
    assert_eq!(
        "home".parse::<WorkLocation>(),
        Err(DomainError::InvalidLocation(String::from("home")))
    );
    assert_eq!(WorkLocation::default(), WorkLocation::Office);
}

#[test]
fn test_role_and_preference_parsing() {
    assert_eq!("team_lead".parse::<Role>().unwrap(), Role::TeamLead);
    assert!(Role::Logistics.is_organization_wide());
    assert!(!Role::TeamLead.is_organization_wide());
    assert_eq!(
        "opt_out".parse::<MealPreference>().unwrap(),
        MealPreference::OptOut
    );
    assert!("maybe".parse::<MealPreference>().is_err());
}

#[test]
fn test_user_new_defaults_to_active_opt_in() {
    let user: User = User::new(
        UserId::new("u1"),
        String::from("Rahim"),
        String::from("rahim@example.com"),
        Role::Employee,
    );
    assert!(user.active);
    assert_eq!(user.default_meal_preference, MealPreference::OptIn);
}

#[test]
fn test_user_deserializes_with_defaults() {
    let user: User =
        serde_json::from_str(r#"{"id":"u7","name":"Karim","email":"k@example.com"}"#).unwrap();
    assert_eq!(user.id, UserId::new("u7"));
    assert_eq!(user.role, Role::Employee);
    assert!(user.active);
}

#[test]
fn test_schedule_empty_meal_list_is_unset() {
    let mut schedule: DaySchedule = DaySchedule::new(date("2026-02-21"), DayStatus::GovtHoliday);
    schedule.meals = Some(Vec::new());
    assert_eq!(schedule.explicit_meals(), None);
    assert!(schedule.is_blackout());
}

#[test]
fn test_govt_holiday_with_meals_is_not_blackout() {
    let mut schedule: DaySchedule = DaySchedule::new(date("2026-02-21"), DayStatus::GovtHoliday);
    schedule.meals = Some(vec![MealType::Lunch]);
    assert!(!schedule.is_blackout());
}

#[test]
fn test_office_closed_is_always_blackout() {
    let mut schedule: DaySchedule = DaySchedule::new(date("2026-02-21"), DayStatus::OfficeClosed);
    schedule.meals = Some(vec![MealType::Lunch]);
    assert!(schedule.is_blackout());
}

#[test]
fn test_bulk_opt_out_covers_inclusive_range() {
    let opt_out: BulkOptOut = BulkOptOut {
        bulk_opt_out_id: Some(1),
        user_id: UserId::new("u1"),
        start_date: date("2026-03-01"),
        end_date: date("2026-03-05"),
        meal_type: MealType::Lunch,
        active: true,
        created_by: None,
        reason: None,
    };
    assert!(opt_out.covers(date("2026-03-01"), MealType::Lunch));
    assert!(opt_out.covers(date("2026-03-05"), MealType::Lunch));
    assert!(!opt_out.covers(date("2026-03-06"), MealType::Lunch));
    assert!(!opt_out.covers(date("2026-03-03"), MealType::Snacks));
}

#[test]
fn test_inactive_bulk_opt_out_covers_nothing() {
    let opt_out: BulkOptOut = BulkOptOut {
        bulk_opt_out_id: Some(1),
        user_id: UserId::new("u1"),
        start_date: date("2026-03-01"),
        end_date: date("2026-03-05"),
        meal_type: MealType::Lunch,
        active: false,
        created_by: None,
        reason: None,
    };
    assert!(!opt_out.covers(date("2026-03-02"), MealType::Lunch));
}

#[test]
fn test_global_policy_covers_active_range_only() {
    let mut policy: GlobalWorkLocationPolicy = GlobalWorkLocationPolicy {
        policy_id: None,
        start_date: date("2026-04-01"),
        end_date: date("2026-04-03"),
        location: WorkLocation::Wfh,
        active: true,
        declared_by: UserId::new("admin"),
        reason: Some(String::from("Flooding")),
    };
    assert!(policy.covers(date("2026-04-02")));
    assert!(!policy.covers(date("2026-04-04")));
    policy.active = false;
    assert!(!policy.covers(date("2026-04-02")));
}
