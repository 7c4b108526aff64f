//! Undertime calculation for a single day.
//!
//! Missing or unreadable punches never fail: they produce zero undertime.
//! [`UndertimeOutcome`] keeps the reason visible for callers that care.

use std::ops::{Add, AddAssign};

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::schedule::{parse_clock, OfficeSchedule};

/// Hours and minutes short of the schedule (minutes < 60)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Undertime {
    pub hours: u32,
    pub minutes: u32,
}

impl Undertime {
    pub const ZERO: Undertime = Undertime { hours: 0, minutes: 0 };

    /// Negative totals are floored at zero
    pub fn from_minutes(total: i64) -> Self {
        let total = u32::try_from(total.max(0)).unwrap_or(u32::MAX);
        Self {
            hours: total / 60,
            minutes: total % 60,
        }
    }

    pub fn total_minutes(&self) -> u32 {
        self.hours * 60 + self.minutes
    }

    pub fn is_zero(&self) -> bool {
        self.total_minutes() == 0
    }

    /// "H:MM", empty when zero
    pub fn total_str(&self) -> String {
        if self.is_zero() {
            String::new()
        } else {
            format!("{}:{:02}", self.hours, self.minutes)
        }
    }
}

impl Add for Undertime {
    type Output = Undertime;

    fn add(self, rhs: Undertime) -> Undertime {
        let minutes = self.minutes + rhs.minutes;
        Undertime {
            hours: self.hours + rhs.hours + minutes / 60,
            minutes: minutes % 60,
        }
    }
}

impl AddAssign for Undertime {
    fn add_assign(&mut self, rhs: Undertime) {
        *self = *self + rhs;
    }
}

/// The four observed times of one day
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayPunches {
    pub am_arrival: Option<NaiveTime>,
    pub am_departure: Option<NaiveTime>,
    pub pm_arrival: Option<NaiveTime>,
    pub pm_departure: Option<NaiveTime>,
}

impl DayPunches {
    pub fn new(
        am_arrival: NaiveTime,
        am_departure: NaiveTime,
        pm_arrival: NaiveTime,
        pm_departure: NaiveTime,
    ) -> Self {
        Self {
            am_arrival: Some(am_arrival),
            am_departure: Some(am_departure),
            pm_arrival: Some(pm_arrival),
            pm_departure: Some(pm_departure),
        }
    }
}

/// Result of evaluating one day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndertimeOutcome {
    Computed(Undertime),
    /// At least one of the four punches is missing
    Incomplete,
    /// A punch value could not be read as a clock time
    Unparseable,
}

impl UndertimeOutcome {
    /// Collapse to the value printed on the form
    pub fn undertime(&self) -> Undertime {
        match self {
            UndertimeOutcome::Computed(undertime) => *undertime,
            UndertimeOutcome::Incomplete | UndertimeOutcome::Unparseable => Undertime::ZERO,
        }
    }
}

/// Minutes between arrival and departure, zero when inverted
fn session_minutes(arrival: NaiveTime, departure: NaiveTime) -> i64 {
    departure.signed_duration_since(arrival).num_minutes().max(0)
}

pub fn evaluate(punches: &DayPunches, schedule: &OfficeSchedule) -> UndertimeOutcome {
    let (Some(am_in), Some(am_out), Some(pm_in), Some(pm_out)) = (
        punches.am_arrival,
        punches.am_departure,
        punches.pm_arrival,
        punches.pm_departure,
    ) else {
        return UndertimeOutcome::Incomplete;
    };

    let actual = session_minutes(am_in, am_out) + session_minutes(pm_in, pm_out);
    let deficit = schedule.expected_minutes() - actual;
    UndertimeOutcome::Computed(Undertime::from_minutes(deficit))
}

pub fn compute(punches: &DayPunches, schedule: &OfficeSchedule) -> Undertime {
    evaluate(punches, schedule).undertime()
}

/// Evaluate from form text. Blank cells count as missing.
pub fn evaluate_strs(
    am_arrival: &str,
    am_departure: &str,
    pm_arrival: &str,
    pm_departure: &str,
    schedule: &OfficeSchedule,
) -> UndertimeOutcome {
    let raw = [am_arrival, am_departure, pm_arrival, pm_departure];
    if raw.iter().any(|s| s.trim().is_empty()) {
        return UndertimeOutcome::Incomplete;
    }

    let mut parsed = [None; 4];
    for (slot, text) in parsed.iter_mut().zip(raw) {
        match parse_clock(text) {
            Some(time) => *slot = Some(time),
            None => return UndertimeOutcome::Unparseable,
        }
    }

    let punches = DayPunches {
        am_arrival: parsed[0],
        am_departure: parsed[1],
        pm_arrival: parsed[2],
        pm_departure: parsed[3],
    };
    evaluate(&punches, schedule)
}

pub fn compute_strs(
    am_arrival: &str,
    am_departure: &str,
    pm_arrival: &str,
    pm_departure: &str,
    schedule: &OfficeSchedule,
) -> Undertime {
    evaluate_strs(am_arrival, am_departure, pm_arrival, pm_departure, schedule).undertime()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    fn ut(hours: u32, minutes: u32) -> Undertime {
        Undertime { hours, minutes }
    }

    #[test]
    fn test_sample_days_from_december_form() {
        let schedule = OfficeSchedule::default();
        let cases = [
            (("07:00", "11:46", "16:36", "16:36"), ut(3, 14)),
            (("07:25", "11:48", "16:40", "16:40"), ut(3, 37)),
            (("07:29", "11:46", "16:41", "16:41"), ut(3, 43)),
            (("07:33", "11:41", "16:54", "16:54"), ut(3, 52)),
        ];
        for ((a, b, c, d), expected) in cases {
            assert_eq!(compute_strs(a, b, c, d, &schedule), expected, "{} {} {} {}", a, b, c, d);
        }
    }

    #[test]
    fn test_full_day_has_no_undertime() {
        let schedule = OfficeSchedule::default();
        let punches = DayPunches::new(t(7, 20), t(11, 55), t(12, 45), t(16, 40));
        assert_eq!(evaluate(&punches, &schedule), UndertimeOutcome::Computed(Undertime::ZERO));
    }

    #[test]
    fn test_late_arrival_and_early_departure() {
        let schedule = OfficeSchedule::default();
        // 15 minutes late, 20 minutes early
        let punches = DayPunches::new(t(7, 45), t(11, 50), t(12, 50), t(16, 10));
        assert_eq!(compute(&punches, &schedule), ut(0, 35));
    }

    #[test]
    fn test_inverted_session_counts_as_zero() {
        let schedule = OfficeSchedule::default();
        let punches = DayPunches::new(t(11, 50), t(7, 30), t(12, 50), t(16, 30));
        // morning contributes nothing: 260 minutes short
        assert_eq!(compute(&punches, &schedule), ut(4, 20));
    }

    #[test]
    fn test_missing_punch_is_zero() {
        let schedule = OfficeSchedule::default();
        let punches = DayPunches {
            am_arrival: Some(t(7, 30)),
            ..DayPunches::default()
        };
        assert_eq!(evaluate(&punches, &schedule), UndertimeOutcome::Incomplete);
        assert_eq!(compute(&punches, &schedule), Undertime::ZERO);
        assert_eq!(compute_strs("07:30", "", "", "", &schedule), Undertime::ZERO);
    }

    #[test]
    fn test_unparseable_punch_is_zero() {
        let schedule = OfficeSchedule::default();
        assert_eq!(
            evaluate_strs("07:30", "noon", "12:50", "16:30", &schedule),
            UndertimeOutcome::Unparseable
        );
        assert_eq!(compute_strs("SATURDAY", "x", "y", "z", &schedule), Undertime::ZERO);
    }

    #[test]
    fn test_compute_is_pure() {
        let schedule = OfficeSchedule::default();
        let punches = DayPunches::new(t(8, 0), t(11, 0), t(13, 0), t(15, 0));
        let first = compute(&punches, &schedule);
        assert_eq!(first, compute(&punches, &schedule));
        assert!(first.minutes < 60);
        assert_eq!(first.total_minutes() as i64, 480 - (180 + 120));
    }

    #[test]
    fn test_undertime_addition_carries_minutes() {
        let mut total = Undertime::ZERO;
        total += ut(3, 14);
        total += ut(3, 52);
        assert_eq!(total, ut(7, 6));
        assert_eq!(total.total_str(), "7:06");
        assert_eq!(Undertime::ZERO.total_str(), "");
        assert_eq!(Undertime::from_minutes(-15), Undertime::ZERO);
        assert_eq!(Undertime::from_minutes(125), ut(2, 5));
    }
}
