// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Copy-paste friendly daily announcement text.

use crate::headcount::{DailySummary, MealHeadcount};
use chrono::NaiveDate;
use craftsbite_domain::{DaySchedule, DayStatus, MealType};
use serde::Serialize;

/// One meal line of an announcement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnouncementMealTotal {
    /// The meal.
    pub meal_type: MealType,
    /// Users eating it.
    pub participating: usize,
    /// Users not eating it.
    pub opted_out: usize,
}

/// A rendered daily announcement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Announcement {
    /// The announced date.
    pub date: NaiveDate,
    /// The effective day status.
    pub day_status: DayStatus,
    /// The special-day note, if the day is not an ordinary one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_day_note: Option<String>,
    /// Active users counted.
    pub total_active_users: usize,
    /// Per-meal totals in display order.
    pub meal_totals: Vec<AnnouncementMealTotal>,
    /// The full message text.
    pub message: String,
}

/// Builds the special-day note for a day status.
///
/// Only closed, holiday, celebration and weekend days carry a note. A
/// non-blank schedule reason is appended.
#[must_use]
pub fn special_day_note(status: DayStatus, schedule: Option<&DaySchedule>) -> Option<String> {
    let base: &str = match status {
        DayStatus::OfficeClosed => "Office is closed for this date.",
        DayStatus::GovtHoliday => "Government holiday.",
        DayStatus::Celebration => "Celebration day.",
        DayStatus::Weekend => "Weekend schedule applies.",
        DayStatus::Normal | DayStatus::EventDay => return None,
    };

    let reason: Option<&str> = schedule
        .and_then(|s| s.reason.as_deref())
        .map(str::trim)
        .filter(|r| !r.is_empty());

    Some(reason.map_or_else(
        || String::from(base),
        |reason| format!("{base} Reason: {reason}"),
    ))
}

/// Renders the announcement for a summary.
///
/// Pure formatting: the summary already carries the special-day note.
#[must_use]
pub fn render_announcement(summary: &DailySummary) -> Announcement {
    // BTreeMap iteration follows MealType's declared order.
    let meal_totals: Vec<AnnouncementMealTotal> = summary
        .meals
        .iter()
        .map(|(meal_type, headcount): (&MealType, &MealHeadcount)| AnnouncementMealTotal {
            meal_type: *meal_type,
            participating: headcount.participating,
            opted_out: headcount.opted_out,
        })
        .collect();

    let mut lines: Vec<String> = vec![
        format!("📢 Daily Meal Participation Update - {}", summary.date),
        format!("👥 Total Active Employees: {}", summary.total_active_users),
    ];
    if let Some(note) = &summary.special_day_note {
        lines.push(format!("📌 Special Day Note: {note}"));
    }
    lines.push(String::new());
    lines.push(String::from("🍽️ Meal-wise totals:"));

    if meal_totals.is_empty() {
        lines.push(String::from("- No meals are scheduled for this date."));
    } else {
        for total in &meal_totals {
            lines.push(format!(
                "- {} {}: {} confirmed, {} opted out",
                total.meal_type.emoji(),
                total.meal_type.display_name(),
                total.participating,
                total.opted_out
            ));
        }
    }

    Announcement {
        date: summary.date,
        day_status: summary.day_status,
        special_day_note: summary.special_day_note.clone(),
        total_active_users: summary.total_active_users,
        meal_totals,
        message: lines.join("\n"),
    }
}
