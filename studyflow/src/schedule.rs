//! Exam countdown and study calendar
//!
//! "Today" is the calendar date in Korea (UTC+9) regardless of the machine's
//! time zone.

use chrono::{DateTime, Datelike, NaiveDate, TimeDelta, Utc, Weekday};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

use crate::api::StudyPlan;

const KST_OFFSET_HOURS: i64 = 9;
const WEEKDAY_LABELS: [&str; 7] = ["일", "월", "화", "수", "목", "금", "토"];

/// Calendar date in Korea at the given instant
pub fn korea_date_of(instant: DateTime<Utc>) -> NaiveDate {
    (instant + TimeDelta::hours(KST_OFFSET_HOURS)).date_naive()
}

/// Today's date in Korea
pub fn korea_today() -> NaiveDate {
    korea_date_of(Utc::now())
}

/// Date part of an exam date, which may carry a time (`2025-06-10T00:00:00`)
pub fn parse_exam_date(raw: &str) -> Option<NaiveDate> {
    let date = raw.split('T').next()?.trim();
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Signed number of days until the exam
pub fn days_until(exam: NaiveDate, today: NaiveDate) -> i64 {
    (exam - today).num_days()
}

/// Days left until the exam, never negative
pub fn days_left(exam: NaiveDate, today: NaiveDate) -> i64 {
    days_until(exam, today).max(0)
}

/// `D-n` badge text; no badge once the exam has passed
pub fn d_day_label(exam: NaiveDate, today: NaiveDate) -> Option<String> {
    let days = days_until(exam, today);
    (days >= 0).then(|| format!("D-{}", days))
}

/// Every date from today through the exam day, inclusive
pub fn date_range(today: NaiveDate, exam: NaiveDate) -> Vec<NaiveDate> {
    today.iter_days().take_while(|d| *d <= exam).collect()
}

/// Korean weekday label of a date
pub fn weekday_label(date: NaiveDate) -> &'static str {
    WEEKDAY_LABELS[date.weekday().num_days_from_sunday() as usize]
}

/// A run of dates shown as one calendar row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudyWeek {
    /// 1-based
    pub week: u32,
    pub dates: Vec<NaiveDate>,
}

/// Group dates into weeks; a Sunday after the first date starts a new week
pub fn group_by_week(dates: &[NaiveDate]) -> Vec<StudyWeek> {
    let mut weeks: Vec<StudyWeek> = Vec::new();
    let mut current: Vec<NaiveDate> = Vec::new();

    for (index, date) in dates.iter().enumerate() {
        if index > 0 && date.weekday() == Weekday::Sun && !current.is_empty() {
            weeks.push(StudyWeek {
                week: weeks.len() as u32 + 1,
                dates: std::mem::take(&mut current),
            });
        }
        current.push(*date);
    }

    if !current.is_empty() {
        weeks.push(StudyWeek {
            week: weeks.len() as u32 + 1,
            dates: current,
        });
    }

    weeks
}

/// Task planned for a date, if any
pub fn task_for(plan: &StudyPlan, date: NaiveDate) -> Option<&str> {
    plan.plan
        .get(&date.format("%Y-%m-%d").to_string())
        .map(String::as_str)
        .filter(|t| !t.trim().is_empty())
}

/// One day of the study calendar
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanRow {
    pub week: u32,
    pub date: String,
    pub weekday: &'static str,
    pub task: String,
    pub is_today: bool,
    pub is_exam_day: bool,
}

/// Flatten the calendar between `today` and `exam` into rows
pub fn plan_rows(plan: &StudyPlan, today: NaiveDate, exam: NaiveDate) -> Vec<PlanRow> {
    let dates = date_range(today, exam);

    group_by_week(&dates)
        .into_iter()
        .flat_map(|week| {
            week.dates.into_iter().map(move |date| PlanRow {
                week: week.week,
                date: date.format("%Y-%m-%d").to_string(),
                weekday: weekday_label(date),
                task: task_for(plan, date).unwrap_or_default().to_string(),
                is_today: date == today,
                is_exam_day: date == exam,
            })
        })
        .collect()
}

/// Write calendar rows as CSV with a header line
pub fn write_plan_csv<W: Write>(rows: &[PlanRow], writer: W) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Export calendar rows to a CSV file
///
/// # Parameters
/// * `rows` - Calendar rows from [`plan_rows`]
/// * `path` - Destination file
///
/// # Returns
/// * `Ok(())` - File written
/// * `Err(csv::Error)` - The file could not be created or written
pub fn export_plan_csv<P: AsRef<Path>>(rows: &[PlanRow], path: P) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_path(&path)?;
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    log::info!("Wrote study calendar to {}", path.as_ref().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_korea_date_rolls_over_at_15_utc() {
        let before = Utc.with_ymd_and_hms(2025, 3, 1, 14, 59, 0).unwrap();
        let after = Utc.with_ymd_and_hms(2025, 3, 1, 15, 0, 0).unwrap();

        assert_eq!(korea_date_of(before), date(2025, 3, 1));
        assert_eq!(korea_date_of(after), date(2025, 3, 2));
    }

    #[test]
    fn test_parse_exam_date() {
        assert_eq!(parse_exam_date("2025-06-10"), Some(date(2025, 6, 10)));
        assert_eq!(
            parse_exam_date("2025-06-10T00:00:00"),
            Some(date(2025, 6, 10))
        );
        assert_eq!(parse_exam_date("next week"), None);
    }

    #[test]
    fn test_days_left_is_clamped() {
        let today = date(2025, 6, 1);
        assert_eq!(days_left(date(2025, 6, 10), today), 9);
        assert_eq!(days_left(date(2025, 5, 20), today), 0);
        assert_eq!(d_day_label(date(2025, 6, 1), today).as_deref(), Some("D-0"));
        assert_eq!(d_day_label(date(2025, 5, 31), today), None);
    }

    #[test]
    fn test_date_range_inclusive() {
        let range = date_range(date(2025, 6, 1), date(2025, 6, 3));
        assert_eq!(range, vec![date(2025, 6, 1), date(2025, 6, 2), date(2025, 6, 3)]);
        assert!(date_range(date(2025, 6, 3), date(2025, 6, 1)).is_empty());
    }

    #[test]
    fn test_group_by_week_starts_on_sunday() {
        // 2025-06-01 is a Sunday, 2025-06-08 the next one
        let dates = date_range(date(2025, 6, 1), date(2025, 6, 9));

        let weeks = group_by_week(&dates);

        assert_eq!(weeks.len(), 2);
        assert_eq!(weeks[0].week, 1);
        assert_eq!(weeks[0].dates.len(), 7);
        assert_eq!(weeks[1].dates, vec![date(2025, 6, 8), date(2025, 6, 9)]);
    }

    #[test]
    fn test_group_mid_week_start() {
        // Wednesday through the next Monday
        let dates = date_range(date(2025, 6, 4), date(2025, 6, 9));

        let weeks = group_by_week(&dates);

        assert_eq!(weeks[0].dates.len(), 4);
        assert_eq!(weeks[1].dates.len(), 2);
    }

    #[test]
    fn test_weekday_label() {
        assert_eq!(weekday_label(date(2025, 6, 1)), "일");
        assert_eq!(weekday_label(date(2025, 6, 7)), "토");
    }

    #[test]
    fn test_plan_csv() {
        // Arrange
        let mut plan = StudyPlan::default();
        plan.plan
            .insert("2025-06-02".to_string(), "1주차 복습".to_string());
        let rows = plan_rows(&plan, date(2025, 6, 1), date(2025, 6, 2));

        // Act
        let mut buffer = Vec::new();
        write_plan_csv(&rows, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        // Assert
        assert_eq!(
            text,
            "week,date,weekday,task,is_today,is_exam_day\n\
             1,2025-06-01,일,,true,false\n\
             1,2025-06-02,월,1주차 복습,false,true\n"
        );
    }

    #[test]
    fn test_export_plan_csv_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.csv");
        let rows = plan_rows(&StudyPlan::default(), date(2025, 6, 1), date(2025, 6, 1));

        export_plan_csv(&rows, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("2025-06-01"));
    }
}
