use chrono::{Month, Weekday};
use serde::{Deserialize, Serialize};

use crate::schedule::{clock_str, OfficeSchedule};
use crate::undertime::{DayPunches, Undertime};

/// Saturday or Sunday
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WeekendDay {
    Saturday,
    Sunday,
}

impl WeekendDay {
    pub fn from_weekday(weekday: Weekday) -> Option<Self> {
        match weekday {
            Weekday::Sat => Some(WeekendDay::Saturday),
            Weekday::Sun => Some(WeekendDay::Sunday),
            _ => None,
        }
    }

    /// Text printed across the time columns
    pub fn label(&self) -> &'static str {
        match self {
            WeekendDay::Saturday => "SATURDAY",
            WeekendDay::Sunday => "SUNDAY",
        }
    }
}

/// Classification of one calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DayEntry {
    Weekend { day_name: WeekendDay },
    NoData,
    Worked {
        punches: DayPunches,
        undertime: Undertime,
    },
}

/// One row of the 31-row table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRow {
    pub day: u32, // day of month (1-31)
    pub weekday: Weekday,
    pub entry: DayEntry,
}

impl DayRow {
    pub fn is_weekend(&self) -> bool {
        matches!(self.entry, DayEntry::Weekend { .. })
    }

    /// Undertime counted towards the month total
    pub fn undertime(&self) -> Undertime {
        match self.entry {
            DayEntry::Worked { undertime, .. } => undertime,
            _ => Undertime::ZERO,
        }
    }

    /// Weekend label when the row is merged, otherwise None
    pub fn weekend_label(&self) -> Option<&'static str> {
        match self.entry {
            DayEntry::Weekend { day_name } => Some(day_name.label()),
            _ => None,
        }
    }

    /// Six display cells: AM arrival/departure, PM arrival/departure,
    /// undertime hours/minutes. Blank for weekends and empty days; a partial
    /// day shows its punches with an explicit zero undertime.
    pub fn cells(&self) -> [String; 6] {
        match self.entry {
            DayEntry::Worked { punches, undertime } => {
                let time = |t: Option<chrono::NaiveTime>| t.map(clock_str).unwrap_or_default();
                [
                    time(punches.am_arrival),
                    time(punches.am_departure),
                    time(punches.pm_arrival),
                    time(punches.pm_departure),
                    undertime.hours.to_string(),
                    undertime.minutes.to_string(),
                ]
            }
            _ => Default::default(),
        }
    }
}

/// Month of rows plus the undertime total
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthReport {
    pub year: i32,
    pub month: u32,
    pub days: Vec<DayRow>,
    pub total: Undertime,
}

impl MonthReport {
    /// "DECEMBER 2025"
    pub fn month_year_str(&self) -> String {
        let name = u8::try_from(self.month)
            .ok()
            .and_then(|m| Month::try_from(m).ok())
            .map(|m| m.name().to_uppercase())
            .unwrap_or_else(|| self.month.to_string());
        format!("{} {}", name, self.year)
    }

    /// Number of rows with a computed entry
    pub fn worked_days(&self) -> usize {
        self.days
            .iter()
            .filter(|row| matches!(row.entry, DayEntry::Worked { .. }))
            .count()
    }
}

/// Government header lines and the verifying officer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormHeader {
    pub country: String,
    pub agency: String,
    pub division: String,
    pub school: String,
    pub verifier_title: String,
}

impl Default for FormHeader {
    fn default() -> Self {
        Self {
            country: "REPUBLIC OF THE PHILIPPINES".to_string(),
            agency: "Department of Education".to_string(),
            division: "Division of Davao del Sur".to_string(),
            school: "MANUAL NATIONAL HIGH SCHOOL".to_string(),
            verifier_title: "Principal III".to_string(),
        }
    }
}

impl FormHeader {
    /// Header lines in print order
    pub fn lines(&self) -> [&str; 4] {
        [&self.country, &self.agency, &self.division, &self.school]
    }
}

/// Everything a renderer needs for one Civil Service Form No. 48
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DtrForm {
    pub employee_name: String,
    pub header: FormHeader,
    pub schedule: OfficeSchedule,
    pub report: MonthReport,
}

pub const FORM_NUMBER: &str = "Civil Service Form No. 48";
pub const FORM_TITLE: &str = "DAILY TIME RECORD";
pub const CERTIFICATION: &str = "I certify on my honor that the above is a true and correct report of the hours of work performed, record of which was made daily at the time of arrival and departure from office.";
pub const VERIFIED_TEXT: &str = "VERIFIED as to the prescribed office hours:";

impl DtrForm {
    /// Download file stem, e.g. "DTR_SAMORANOS_RICHARD_P_2025-12"
    pub fn file_stem(&self) -> String {
        let name: String = self
            .employee_name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        let name = name
            .split('_')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("_");
        format!("DTR_{}_{}-{:02}", name, self.report.year, self.report.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn t(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    fn row(entry: DayEntry) -> DayRow {
        DayRow {
            day: 1,
            weekday: Weekday::Mon,
            entry,
        }
    }

    #[test]
    fn test_worked_cells() {
        let entry = DayEntry::Worked {
            punches: DayPunches::new(t(7, 0), t(11, 46), t(16, 36), t(16, 36)),
            undertime: Undertime { hours: 3, minutes: 14 },
        };
        assert_eq!(row(entry).cells(), ["07:00", "11:46", "16:36", "16:36", "3", "14"]);
    }

    #[test]
    fn test_complete_day_without_undertime_shows_zero() {
        let entry = DayEntry::Worked {
            punches: DayPunches::new(t(7, 30), t(11, 50), t(12, 50), t(16, 30)),
            undertime: Undertime::ZERO,
        };
        let cells = row(entry).cells();
        assert_eq!(cells[4], "0");
        assert_eq!(cells[5], "0");
    }

    #[test]
    fn test_partial_day_shows_zero_undertime() {
        let entry = DayEntry::Worked {
            punches: DayPunches {
                am_arrival: Some(t(7, 30)),
                am_departure: Some(t(7, 30)),
                ..DayPunches::default()
            },
            undertime: Undertime::ZERO,
        };
        assert_eq!(row(entry).cells(), ["07:30", "07:30", "", "", "0", "0"]);
    }

    #[test]
    fn test_weekend_and_empty_rows() {
        let saturday = row(DayEntry::Weekend { day_name: WeekendDay::Saturday });
        assert_eq!(saturday.weekend_label(), Some("SATURDAY"));
        assert_eq!(saturday.cells(), <[String; 6]>::default());
        assert!(row(DayEntry::NoData).weekend_label().is_none());
        assert_eq!(row(DayEntry::NoData).undertime(), Undertime::ZERO);
    }

    #[test]
    fn test_month_year_str_and_file_stem() {
        let report = MonthReport {
            year: 2025,
            month: 12,
            days: Vec::new(),
            total: Undertime::ZERO,
        };
        assert_eq!(report.month_year_str(), "DECEMBER 2025");

        let form = DtrForm {
            employee_name: "SAMORANOS, RICHARD P.".to_string(),
            header: FormHeader::default(),
            schedule: OfficeSchedule::default(),
            report,
        };
        assert_eq!(form.file_stem(), "DTR_SAMORANOS_RICHARD_P_2025-12");
    }
}
