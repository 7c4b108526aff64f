use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::schedule::truncate_to_minute;
use crate::undertime::DayPunches;

/// Punch times per day of month, each list sorted ascending
pub type AttendanceByDay = BTreeMap<u32, Vec<NaiveTime>>;

/// One observed arrival or departure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PunchRecord {
    pub day: u32,        // day of month (1-31)
    pub time: NaiveTime, // minute resolution
}

pub fn group_by_day(records: impl IntoIterator<Item = PunchRecord>) -> AttendanceByDay {
    let mut by_day = AttendanceByDay::new();
    for record in records {
        by_day
            .entry(record.day)
            .or_default()
            .push(truncate_to_minute(record.time));
    }
    for punches in by_day.values_mut() {
        punches.sort();
    }
    by_day
}

/// Split a day's punches at noon: earliest/latest before noon are the
/// morning arrival/departure, earliest/latest from noon on the afternoon pair.
/// A lone punch in a session fills both of its slots.
pub fn resolve_day(punches: &[NaiveTime]) -> DayPunches {
    let (morning, afternoon): (Vec<NaiveTime>, Vec<NaiveTime>) =
        punches.iter().copied().partition(|time| time.hour() < 12);

    DayPunches {
        am_arrival: morning.iter().min().copied(),
        am_departure: morning.iter().max().copied(),
        pm_arrival: afternoon.iter().min().copied(),
        pm_departure: afternoon.iter().max().copied(),
    }
}

/// Timestamp layouts seen in biometric exports
const TIMESTAMP_FORMATS: [&str; 10] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
];

pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
}

/// One line of a punch-log export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub employee_id: String,
    pub timestamp: NaiveDateTime,
}

/// Parsed punch-log export
#[derive(Debug, Clone, Default)]
pub struct PunchLog {
    pub entries: Vec<LogEntry>,
    pub skipped_lines: usize, // blank, header or unreadable lines
}

impl PunchLog {
    /// Sorted, without duplicates
    pub fn employee_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.entries.iter().map(|e| e.employee_id.clone()).collect();
        ids.sort();
        ids.dedup();
        ids
    }

    /// One employee's punches inside the given month
    pub fn attendance_for(&self, employee_id: &str, year: i32, month: u32) -> AttendanceByDay {
        group_by_day(
            self.entries
                .iter()
                .filter(|e| e.employee_id == employee_id)
                .filter(|e| e.timestamp.year() == year && e.timestamp.month() == month)
                .map(|e| PunchRecord {
                    day: e.timestamp.day(),
                    time: e.timestamp.time(),
                }),
        )
    }
}

/// Parse `<id><sep><timestamp>[<sep>...]` lines. The separator is a tab when
/// the line has one, otherwise a comma, otherwise whitespace.
pub fn parse_punch_log(text: &str) -> PunchLog {
    let mut log = PunchLog::default();

    for (index, line) in text.lines().enumerate() {
        match parse_line(line) {
            Some(entry) => log.entries.push(entry),
            None => {
                if !line.trim().is_empty() {
                    debug!(line = index + 1, content = line, "skipping unreadable punch-log line");
                }
                log.skipped_lines += 1;
            }
        }
    }

    debug!(
        entries = log.entries.len(),
        skipped = log.skipped_lines,
        "parsed punch log"
    );
    log
}

fn parse_line(line: &str) -> Option<LogEntry> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let (employee_id, timestamp) = if line.contains('\t') {
        let mut fields = line.split('\t').map(str::trim);
        (fields.next()?.to_string(), parse_timestamp(fields.next()?)?)
    } else if line.contains(',') {
        let mut fields = line.split(',').map(|f| f.trim().trim_matches('"'));
        (fields.next()?.to_string(), parse_timestamp(fields.next()?)?)
    } else {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let id = tokens.first()?.to_string();
        // date + time, optionally followed by AM/PM
        let timestamp = [4, 3]
            .iter()
            .filter(|&&end| end <= tokens.len())
            .find_map(|&end| parse_timestamp(&tokens[1..end].join(" ")))?;
        (id, timestamp)
    };

    if employee_id.is_empty() {
        return None;
    }
    Some(LogEntry {
        employee_id,
        timestamp,
    })
}
