use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{DtrError, DtrResult};

/// Accepted clock formats, tried in order
const CLOCK_FORMATS: [&str; 5] = ["%H:%M", "%H:%M:%S", "%I:%M %p", "%I:%M%p", "%I:%M:%S %p"];

/// Parse a wall-clock time ("07:30", "7:30 AM", "16:36:12") at minute resolution
pub fn parse_clock(text: &str) -> Option<NaiveTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    CLOCK_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(text, fmt).ok())
        .map(truncate_to_minute)
}

/// Drop seconds and sub-seconds
pub fn truncate_to_minute(time: NaiveTime) -> NaiveTime {
    NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time)
}

/// "HH:MM"
pub fn clock_str(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

fn clock(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default()
}

/// Official office hours for a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficeSchedule {
    pub am_in: NaiveTime,
    pub am_out: NaiveTime,
    pub pm_in: NaiveTime,
    pub pm_out: NaiveTime,
    pub saturday_policy: String, // e.g. "AS REQUIRED"
}

impl Default for OfficeSchedule {
    fn default() -> Self {
        Self {
            am_in: clock(7, 30),
            am_out: clock(11, 50),
            pm_in: clock(12, 50),
            pm_out: clock(16, 30),
            saturday_policy: "AS REQUIRED".to_string(),
        }
    }
}

impl OfficeSchedule {
    /// Requires am_in < am_out <= pm_in < pm_out
    pub fn new(
        am_in: NaiveTime,
        am_out: NaiveTime,
        pm_in: NaiveTime,
        pm_out: NaiveTime,
        saturday_policy: impl Into<String>,
    ) -> DtrResult<Self> {
        if am_in >= am_out {
            return Err(DtrError::InvalidSchedule(format!(
                "morning departure {} is not after arrival {}",
                clock_str(am_out),
                clock_str(am_in)
            )));
        }
        if pm_in >= pm_out {
            return Err(DtrError::InvalidSchedule(format!(
                "afternoon departure {} is not after arrival {}",
                clock_str(pm_out),
                clock_str(pm_in)
            )));
        }
        if am_out > pm_in {
            return Err(DtrError::InvalidSchedule(format!(
                "afternoon session {} starts before the morning session ends {}",
                clock_str(pm_in),
                clock_str(am_out)
            )));
        }

        Ok(Self {
            am_in,
            am_out,
            pm_in,
            pm_out,
            saturday_policy: saturday_policy.into(),
        })
    }

    /// Parse the "regular days" label, e.g. "07:30 – 11:50 / 12:50 – 16:30".
    /// Hyphens, en dashes, em dashes and "to" all separate arrival from departure.
    pub fn parse(regular_hours: &str, saturday_policy: &str) -> DtrResult<Self> {
        let sessions: Vec<&str> = regular_hours.split('/').collect();
        if sessions.len() != 2 {
            return Err(DtrError::InvalidSchedule(format!(
                "expected two sessions separated by '/': {:?}",
                regular_hours
            )));
        }

        let (am_in, am_out) = parse_session(sessions[0])?;
        let (pm_in, pm_out) = parse_session(sessions[1])?;

        let saturday_policy = match saturday_policy.trim() {
            "" => Self::default().saturday_policy,
            policy => policy.to_string(),
        };
        Self::new(am_in, am_out, pm_in, pm_out, saturday_policy)
    }

    /// Scheduled working minutes per day
    pub fn expected_minutes(&self) -> i64 {
        let morning = self.am_out.signed_duration_since(self.am_in).num_minutes();
        let afternoon = self.pm_out.signed_duration_since(self.pm_in).num_minutes();
        morning + afternoon
    }

    /// "07:30 – 11:50 / 12:50 – 16:30"
    pub fn regular_hours_str(&self) -> String {
        format!(
            "{} – {} / {} – {}",
            clock_str(self.am_in),
            clock_str(self.am_out),
            clock_str(self.pm_in),
            clock_str(self.pm_out)
        )
    }
}

fn parse_session(text: &str) -> DtrResult<(NaiveTime, NaiveTime)> {
    let normalized = text.replace(['–', '—'], "-").replace(" to ", "-");
    let mut parts = normalized.split('-').map(str::trim);

    let (Some(start), Some(end), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(DtrError::InvalidSchedule(format!(
            "expected 'HH:MM - HH:MM': {:?}",
            text.trim()
        )));
    };

    let parse = |part: &str| {
        parse_clock(part)
            .ok_or_else(|| DtrError::InvalidSchedule(format!("unreadable clock time {:?}", part)))
    };
    Ok((parse(start)?, parse(end)?))
}
