use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, NaiveTime};
use tracing::debug;

use crate::attendance::{resolve_day, AttendanceByDay};
use crate::dtr_data::{DayEntry, DayRow, MonthReport, WeekendDay};
use crate::error::{DtrError, DtrResult};
use crate::schedule::{parse_clock, OfficeSchedule};
use crate::undertime::{evaluate, DayPunches, Undertime, UndertimeOutcome};

/// Unparsed punch strings per day, as typed on the form or sent in a request
pub type RawAttendance = BTreeMap<u32, Vec<String>>;

/// Number of days in the month, None for an invalid month/year
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }?;
    u32::try_from(next_month.signed_duration_since(first).num_days()).ok()
}

/// Punches available for one workday
enum DayInput {
    Missing,
    Punches(Vec<NaiveTime>),
    /// Some punch values could not be read; holds the ones that could
    Unreadable(Vec<NaiveTime>),
}

/// Build the month table from parsed punches
pub fn build(
    month: u32,
    year: i32,
    attendance_by_day: &AttendanceByDay,
    schedule: &OfficeSchedule,
) -> DtrResult<MonthReport> {
    build_with(month, year, schedule, |day| match attendance_by_day.get(&day) {
        Some(punches) if !punches.is_empty() => DayInput::Punches(punches.clone()),
        _ => DayInput::Missing,
    })
}

/// Build the month table from punch strings. A day with an unreadable value
/// keeps its readable punches but reports zero undertime.
pub fn build_raw(
    month: u32,
    year: i32,
    raw_by_day: &RawAttendance,
    schedule: &OfficeSchedule,
) -> DtrResult<MonthReport> {
    build_with(month, year, schedule, |day| {
        let values: Vec<&str> = raw_by_day
            .get(&day)
            .map(|values| {
                values
                    .iter()
                    .map(|v| v.trim())
                    .filter(|v| !v.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        if values.is_empty() {
            return DayInput::Missing;
        }

        let mut parsed: Vec<NaiveTime> = values.iter().filter_map(|v| parse_clock(v)).collect();
        parsed.sort();
        if parsed.len() == values.len() {
            DayInput::Punches(parsed)
        } else {
            debug!(day, ?values, "unreadable punch value");
            DayInput::Unreadable(parsed)
        }
    })
}

fn build_with(
    month: u32,
    year: i32,
    schedule: &OfficeSchedule,
    mut input_for: impl FnMut(u32) -> DayInput,
) -> DtrResult<MonthReport> {
    let invalid = || DtrError::InvalidMonth { month, year };
    let last_day = days_in_month(year, month).ok_or_else(invalid)?;

    let mut days = Vec::with_capacity(last_day as usize);
    let mut total = Undertime::ZERO;

    for day in 1..=last_day {
        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)?;
        let weekday = date.weekday();

        // Saturday/Sunday wins over any attendance recorded for the date
        let entry = match WeekendDay::from_weekday(weekday) {
            Some(day_name) => DayEntry::Weekend { day_name },
            None => match input_for(day) {
                DayInput::Missing => DayEntry::NoData,
                DayInput::Punches(punches) => {
                    let punches = resolve_day(&punches);
                    worked_entry(day, punches, evaluate(&punches, schedule), &mut total)
                }
                DayInput::Unreadable(punches) => worked_entry(
                    day,
                    resolve_day(&punches),
                    UndertimeOutcome::Unparseable,
                    &mut total,
                ),
            },
        };

        days.push(DayRow {
            day,
            weekday,
            entry,
        });
    }

    Ok(MonthReport {
        year,
        month,
        days,
        total,
    })
}

/// Worked row; incomplete and unreadable days add nothing to the total
fn worked_entry(
    day: u32,
    punches: DayPunches,
    outcome: UndertimeOutcome,
    total: &mut Undertime,
) -> DayEntry {
    if !matches!(outcome, UndertimeOutcome::Computed(_)) {
        debug!(day, ?outcome, "no undertime computed");
    }
    let undertime = outcome.undertime();
    *total += undertime;
    DayEntry::Worked { punches, undertime }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attendance::{group_by_day, PunchRecord};
    use crate::undertime::{compute_strs, evaluate_strs};

    fn t(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    fn raw(entries: &[(u32, &[&str])]) -> RawAttendance {
        entries
            .iter()
            .map(|(day, values)| (*day, values.iter().map(|v| v.to_string()).collect()))
            .collect()
    }

    /// December 2025 sample: days 1-5 and 17 have punches
    fn december_sample() -> RawAttendance {
        raw(&[
            (1, &["07:00", "11:46", "16:36"]),
            (2, &["07:25", "11:48", "16:40"]),
            (3, &["07:29", "11:46", "16:41"]),
            (4, &["07:28", "11:49", "16:46"]),
            (5, &["07:29", "11:41", "16:37"]),
            (6, &["08:00", "11:00", "13:00", "17:00"]),
            (17, &["07:33", "11:41", "16:54"]),
        ])
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2024, 1), Some(31));
        assert_eq!(days_in_month(2024, 2), Some(29)); // leap year
        assert_eq!(days_in_month(2025, 2), Some(28));
        assert_eq!(days_in_month(1900, 2), Some(28));
        assert_eq!(days_in_month(2000, 2), Some(29));
        assert_eq!(days_in_month(2024, 4), Some(30));
        assert_eq!(days_in_month(2024, 12), Some(31));
        assert_eq!(days_in_month(2024, 0), None);
        assert_eq!(days_in_month(2024, 13), None);
    }

    #[test]
    fn test_december_sample_report() {
        let report = build_raw(12, 2025, &december_sample(), &OfficeSchedule::default()).unwrap();
        assert_eq!(report.days.len(), 31);
        assert_eq!(report.month_year_str(), "DECEMBER 2025");

        assert_eq!(report.days[0].undertime(), Undertime { hours: 3, minutes: 14 });
        assert_eq!(report.days[16].undertime(), Undertime { hours: 3, minutes: 52 });

        // 2025-12-06 is a Saturday and 2025-12-07 a Sunday
        assert_eq!(report.days[5].weekend_label(), Some("SATURDAY"));
        assert_eq!(report.days[6].weekend_label(), Some("SUNDAY"));
        assert_eq!(report.days[7].entry, DayEntry::NoData);

        // 194 + 217 + 223 + 219 + 228 + 232 minutes
        assert_eq!(report.total, Undertime { hours: 21, minutes: 53 });
        assert_eq!(report.worked_days(), 6);
    }

    #[test]
    fn test_leap_february_with_no_attendance() {
        let report = build(2, 2024, &AttendanceByDay::new(), &OfficeSchedule::default()).unwrap();
        assert_eq!(report.days.len(), 29);
        assert!(report.days.iter().map(|row| row.day).eq(1..=29));
        assert_eq!(report.total, Undertime::ZERO);
        assert!(report
            .days
            .iter()
            .all(|row| row.is_weekend() || row.entry == DayEntry::NoData));
    }

    #[test]
    fn test_invalid_month_is_rejected() {
        let schedule = OfficeSchedule::default();
        assert!(matches!(
            build(13, 2025, &AttendanceByDay::new(), &schedule),
            Err(DtrError::InvalidMonth { month: 13, year: 2025 })
        ));
        assert!(matches!(
            build_raw(0, 2025, &RawAttendance::new(), &schedule),
            Err(DtrError::InvalidMonth { .. })
        ));
    }

    #[test]
    fn test_weekends_ignore_attendance() {
        // 2024-06-01 is a Saturday
        let attendance = group_by_day([
            PunchRecord { day: 1, time: t(7, 30) },
            PunchRecord { day: 1, time: t(9, 0) },
        ]);
        let report = build(6, 2024, &attendance, &OfficeSchedule::default()).unwrap();
        assert_eq!(
            report.days[0].entry,
            DayEntry::Weekend { day_name: WeekendDay::Saturday }
        );
        assert_eq!(report.total, Undertime::ZERO);
    }

    #[test]
    fn test_partial_and_unreadable_days_count_zero() {
        // 2025-12-08 and 2025-12-09 are Monday and Tuesday
        let attendance = raw(&[(8, &["07:30"]), (9, &["07:30", "11:50", "??", "16:30"])]);
        let report = build_raw(12, 2025, &attendance, &OfficeSchedule::default()).unwrap();

        let partial = report.days[7];
        assert!(matches!(partial.entry, DayEntry::Worked { .. }));
        assert_eq!(partial.undertime(), Undertime::ZERO);

        let unreadable = report.days[8];
        assert_eq!(unreadable.undertime(), Undertime::ZERO);
        assert_eq!(unreadable.cells()[0], "07:30");
        assert_eq!(report.total, Undertime::ZERO);
    }

    #[test]
    fn test_rows_agree_with_cell_calculator() {
        let schedule = OfficeSchedule::default();
        let attendance = raw(&[
            (1, &["07:00", "11:46", "16:36", "16:36"]),
            (2, &["07:30", "11:50", "bad", "16:30"]),
            (3, &["07:30"]),
        ]);
        let report = build_raw(12, 2025, &attendance, &schedule).unwrap();

        let rows = [
            ["07:00", "11:46", "16:36", "16:36"],
            ["07:30", "11:50", "bad", "16:30"],
            ["07:30", "07:30", "", ""],
        ];
        for (row, [a, b, c, d]) in report.days.iter().zip(rows) {
            assert_eq!(row.undertime(), compute_strs(a, b, c, d, &schedule), "day {}", row.day);
        }
        assert_eq!(
            evaluate_strs("07:30", "11:50", "bad", "16:30", &schedule),
            UndertimeOutcome::Unparseable
        );
        assert_eq!(report.total, Undertime { hours: 3, minutes: 14 });
    }

    #[test]
    fn test_total_is_sum_of_workdays() {
        let report = build_raw(12, 2025, &december_sample(), &OfficeSchedule::default()).unwrap();
        let sum: u32 = report.days.iter().map(|row| row.undertime().total_minutes()).sum();
        assert_eq!(report.total.total_minutes(), sum);
        assert!(report.total.minutes < 60);
    }
}
