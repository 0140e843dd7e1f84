// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::date;
use crate::{
    Announcement, DailySummary, MealHeadcount, OfficeWfhSplit, render_announcement,
    special_day_note,
};
use craftsbite_domain::{DaySchedule, DayStatus, MealType};
use std::collections::BTreeMap;

fn create_test_summary(meals: BTreeMap<MealType, MealHeadcount>) -> DailySummary {
    DailySummary {
        date: date("2026-01-05"),
        day_status: DayStatus::Normal,
        special_day_note: None,
        total_active_users: 5,
        meals,
        teams: Vec::new(),
        office_wfh_split: OfficeWfhSplit::default(),
        unassigned_users: 0,
    }
}

#[test]
fn test_meals_rendered_in_display_order() {
    let mut meals: BTreeMap<MealType, MealHeadcount> = BTreeMap::new();
    meals.insert(
        MealType::OptionalDinner,
        MealHeadcount {
            participating: 1,
            opted_out: 4,
        },
    );
    meals.insert(
        MealType::Lunch,
        MealHeadcount {
            participating: 3,
            opted_out: 2,
        },
    );
    meals.insert(
        MealType::Iftar,
        MealHeadcount {
            participating: 5,
            opted_out: 0,
        },
    );
    let announcement: Announcement = render_announcement(&create_test_summary(meals));

    let order: Vec<MealType> = announcement
        .meal_totals
        .iter()
        .map(|total| total.meal_type)
        .collect();
    assert_eq!(
        order,
        vec![MealType::Lunch, MealType::Iftar, MealType::OptionalDinner]
    );
    assert!(
        announcement
            .message
            .contains("- 🍛 Lunch: 3 confirmed, 2 opted out")
    );
    assert!(
        announcement
            .message
            .contains("Optional Dinner: 1 confirmed, 4 opted out")
    );
}

#[test]
fn test_message_header_lines() {
    let announcement: Announcement = render_announcement(&create_test_summary(BTreeMap::new()));
    let lines: Vec<&str> = announcement.message.lines().collect();
    assert_eq!(lines[0], "📢 Daily Meal Participation Update - 2026-01-05");
    assert_eq!(lines[1], "👥 Total Active Employees: 5");
    assert_eq!(lines[2], "");
    assert_eq!(lines[3], "🍽️ Meal-wise totals:");
    assert_eq!(lines[4], "- No meals are scheduled for this date.");
}

#[test]
fn test_special_day_note_line_included() {
    let mut summary: DailySummary = create_test_summary(BTreeMap::new());
    summary.special_day_note = Some(String::from("Government holiday."));
    let announcement: Announcement = render_announcement(&summary);
    assert!(
        announcement
            .message
            .lines()
            .any(|line| line == "📌 Special Day Note: Government holiday.")
    );
    assert_eq!(
        announcement.special_day_note.as_deref(),
        Some("Government holiday.")
    );
}

#[test]
fn test_special_day_notes_by_status() {
    assert_eq!(
        special_day_note(DayStatus::GovtHoliday, None).as_deref(),
        Some("Government holiday.")
    );
    assert_eq!(special_day_note(DayStatus::Normal, None), None);
    assert_eq!(special_day_note(DayStatus::EventDay, None), None);

    let mut schedule: DaySchedule = DaySchedule::new(date("2026-01-05"), DayStatus::Weekend);
    schedule.reason = Some(String::from("   "));
    assert_eq!(
        special_day_note(DayStatus::Weekend, Some(&schedule)).as_deref(),
        Some("Weekend schedule applies.")
    );
    schedule.reason = Some(String::from("Victory Day"));
    assert_eq!(
        special_day_note(DayStatus::Weekend, Some(&schedule)).as_deref(),
        Some("Weekend schedule applies. Reason: Victory Day")
    );
}
