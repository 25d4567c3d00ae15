//! Weekly class schedule and the off-peak gate.
//!
//! Classes repeat weekly on `day_of_week` (1 = Monday .. 7 = Sunday) at a
//! wall-clock `start_time` stored as `HH:MM`. Off-peak members may not book
//! classes starting inside the peak window.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::services::membership;

pub const PEAK_START: &str = "16:00";
pub const PEAK_END: &str = "20:00";

const DAY_NAMES: [&str; 7] = ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday"];

/// `HH:MM` prefix of a stored start time.
fn hhmm(start_time: &str) -> &str {
    let t = start_time.trim();
    t.get(..5).unwrap_or(t)
}

/// True when the start time falls in `[16:00, 20:00)`. Compared as text, so
/// times must be zero-padded.
#[must_use]
pub fn is_peak_time(start_time: &str) -> bool {
    let t = hhmm(start_time);
    t >= PEAK_START && t < PEAK_END
}

/// ISO weekday, Monday = 1 .. Sunday = 7.
#[must_use]
pub fn iso_weekday(date: NaiveDate) -> i16 {
    // number_from_monday is 1..=7
    i16::try_from(date.weekday().number_from_monday()).unwrap_or(1)
}

#[must_use]
pub fn day_name(day_of_week: i16) -> &'static str {
    usize::try_from(day_of_week - 1)
        .ok()
        .and_then(|i| DAY_NAMES.get(i))
        .copied()
        .unwrap_or("Unknown")
}

/// 12-hour label such as `6:30 PM`. Unparseable input is returned as is.
#[must_use]
pub fn time_label(start_time: &str) -> String {
    let t = hhmm(start_time);
    let parsed = t
        .split_once(':')
        .filter(|(h, m)| h.len() == 2 && m.len() == 2)
        .and_then(|(h, m)| Some((h.parse::<u32>().ok()?, m.parse::<u32>().ok()?)));
    let Some((h, m)) = parsed else {
        return if t.is_empty() { start_time.to_owned() } else { t.to_owned() };
    };
    let period = if h >= 12 { "PM" } else { "AM" };
    let h12 = match h {
        0 => 12,
        13.. => h - 12,
        _ => h,
    };
    format!("{h12}:{m:02} {period}")
}

// =============================================================================
// SCHEDULE
// =============================================================================

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ClassRow {
    pub id: Uuid,
    pub name: String,
    pub day_of_week: i16,
    pub start_time: String,
    pub location_id: Option<Uuid>,
    pub location_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleClass {
    pub id: Uuid,
    pub name: String,
    pub day_of_week: i16,
    pub start_time: String,
    pub time_label: String,
    pub location_id: Option<Uuid>,
    pub location_name: Option<String>,
    pub is_peak: bool,
    pub bookable: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleDay {
    pub day_of_week: i16,
    pub day_name: &'static str,
    pub classes: Vec<ScheduleClass>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Schedule {
    pub is_signed_in: bool,
    pub is_off_peak: bool,
    pub days: Vec<ScheduleDay>,
}

/// Group classes Monday-first, keeping input order inside a day. Days with
/// no classes are omitted.
#[must_use]
pub fn group_by_day(rows: Vec<ClassRow>, is_off_peak: bool) -> Vec<ScheduleDay> {
    let mut days: Vec<ScheduleDay> = (1..=7)
        .map(|d| ScheduleDay { day_of_week: d, day_name: day_name(d), classes: Vec::new() })
        .collect();
    for row in rows {
        let Some(day) = days.iter_mut().find(|d| d.day_of_week == row.day_of_week) else {
            continue;
        };
        let is_peak = is_peak_time(&row.start_time);
        day.classes.push(ScheduleClass {
            time_label: time_label(&row.start_time),
            bookable: !(is_off_peak && is_peak),
            is_peak,
            id: row.id,
            name: row.name,
            day_of_week: row.day_of_week,
            start_time: row.start_time,
            location_id: row.location_id,
            location_name: row.location_name,
        });
    }
    days.retain(|d| !d.classes.is_empty());
    days
}

pub async fn list_classes(pool: &PgPool) -> Result<Vec<ClassRow>, sqlx::Error> {
    sqlx::query_as::<_, ClassRow>(
        r"SELECT c.id, c.name, c.day_of_week, c.start_time, c.location_id, l.name AS location_name
          FROM classes c
          LEFT JOIN locations l ON l.id = c.location_id
          ORDER BY c.day_of_week, c.start_time, c.name",
    )
    .fetch_all(pool)
    .await
}

/// Week schedule flagged for the caller. Anonymous callers see every class
/// as bookable; the booking endpoint still requires sign-in.
pub async fn load_schedule(pool: &PgPool, user_id: Option<Uuid>) -> Result<Schedule, sqlx::Error> {
    let rows = list_classes(pool).await?;
    let is_off_peak = match user_id {
        Some(id) => membership::status_for(pool, id).await?.is_off_peak,
        None => false,
    };
    Ok(Schedule { is_signed_in: user_id.is_some(), is_off_peak, days: group_by_day(rows, is_off_peak) })
}

#[cfg(test)]
#[path = "schedule_test.rs"]
mod tests;
