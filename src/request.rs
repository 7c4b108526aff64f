use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::attendance::parse_punch_log;
use crate::config::AppConfig;
use crate::dtr_data::DtrForm;
use crate::error::{DtrError, DtrResult};
use crate::month_table::{build, build_raw, days_in_month, RawAttendance};
use crate::schedule::OfficeSchedule;

/// DTR generation request (HTTP body or CLI input file)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DtrRequest {
    pub employee_name: String,
    pub year: i32,
    pub month: u32,
    /// "07:30 – 11:50 / 12:50 – 16:30"; configured default when absent
    #[serde(default)]
    pub regular_hours: Option<String>,
    #[serde(default)]
    pub saturday_hours: Option<String>,
    /// Punch strings per day of month
    #[serde(default)]
    pub attendance: Option<RawAttendance>,
    /// Raw biometric export text
    #[serde(default)]
    pub punch_log: Option<String>,
    #[serde(default)]
    pub employee_id: Option<String>,
}

impl DtrRequest {
    pub fn schedule(&self, config: &AppConfig) -> DtrResult<OfficeSchedule> {
        let default = &config.default_schedule;
        match (&self.regular_hours, &self.saturday_hours) {
            (Some(hours), saturday) if !hours.trim().is_empty() => OfficeSchedule::parse(
                hours,
                saturday.as_deref().unwrap_or(&default.saturday_policy),
            ),
            (_, Some(saturday)) if !saturday.trim().is_empty() => Ok(OfficeSchedule {
                saturday_policy: saturday.trim().to_string(),
                ..default.clone()
            }),
            _ => Ok(default.clone()),
        }
    }

    pub fn into_form(self, config: &AppConfig) -> DtrResult<DtrForm> {
        if days_in_month(self.year, self.month).is_none() {
            return Err(DtrError::InvalidMonth {
                month: self.month,
                year: self.year,
            });
        }
        let employee_name = self.employee_name.trim().to_string();
        if employee_name.is_empty() {
            return Err(DtrError::InvalidRequest("employee_name is required".to_string()));
        }

        let schedule = self.schedule(config)?;

        let report = match (&self.attendance, &self.punch_log) {
            (Some(_), Some(_)) => {
                return Err(DtrError::InvalidRequest(
                    "send either attendance or punch_log, not both".to_string(),
                ))
            }
            (Some(attendance), None) => build_raw(self.month, self.year, attendance, &schedule)?,
            (None, Some(text)) => {
                let log = parse_punch_log(text);
                let ids = log.employee_ids();
                let employee_id = match &self.employee_id {
                    Some(id) => {
                        let id = id.trim().to_string();
                        if !ids.contains(&id) {
                            return Err(DtrError::InvalidRequest(format!(
                                "employee_id {:?} not found in punch_log",
                                id
                            )));
                        }
                        id
                    }
                    None => match ids.as_slice() {
                        [only] => only.clone(),
                        [] => {
                            return Err(DtrError::InvalidRequest(
                                "punch_log contains no readable punches".to_string(),
                            ))
                        }
                        _ => {
                            return Err(DtrError::InvalidRequest(format!(
                                "punch_log has {} employees, employee_id is required",
                                ids.len()
                            )))
                        }
                    },
                };
                debug!(employee_id = %employee_id, skipped = log.skipped_lines, "using punch log");
                let attendance = log.attendance_for(&employee_id, self.year, self.month);
                build(self.month, self.year, &attendance, &schedule)?
            }
            (None, None) => build_raw(self.month, self.year, &RawAttendance::new(), &schedule)?,
        };

        Ok(DtrForm {
            employee_name,
            header: config.header.clone(),
            schedule,
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::undertime::Undertime;

    fn request_json(extra: &str) -> DtrRequest {
        let json = format!(
            r#"{{"employee_name": "SAMORANOS, RICHARD P.", "year": 2025, "month": 12{}}}"#,
            extra
        );
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn test_attendance_request() {
        let request = request_json(
            r#", "regular_hours": "07:30 – 11:50 / 12:50 – 16:30",
                 "attendance": {"1": ["07:00", "11:46", "16:36"], "6": ["08:00"]}"#,
        );
        let form = request.into_form(&AppConfig::default()).unwrap();
        assert_eq!(form.report.days.len(), 31);
        assert_eq!(form.report.total, Undertime { hours: 3, minutes: 14 });
        assert_eq!(form.header.verifier_title, "Principal III");
    }

    #[test]
    fn test_punch_log_request_single_employee() {
        let request = request_json(
            r#", "punch_log": "17\t2025-12-01 07:00:00\n17\t2025-12-01 11:46:00\n17\t2025-12-01 16:36:00\n""#,
        );
        let form = request.into_form(&AppConfig::default()).unwrap();
        assert_eq!(form.report.days[0].undertime(), Undertime { hours: 3, minutes: 14 });
    }

    #[test]
    fn test_punch_log_requires_employee_id_when_ambiguous() {
        let request = request_json(
            r#", "punch_log": "17,2025-12-01 07:00\n42,2025-12-01 07:10\n""#,
        );
        assert!(matches!(
            request.clone().into_form(&AppConfig::default()),
            Err(DtrError::InvalidRequest(_))
        ));

        let request = DtrRequest {
            employee_id: Some("42".to_string()),
            ..request
        };
        assert!(request.into_form(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_punch_log_rejects_unknown_employee_id() {
        let request = request_json(
            r#", "employee_id": "99",
                 "punch_log": "17\t2025-12-01 07:00:00\n17\t2025-12-01 11:46:00\n17\t2025-12-01 16:36:00\n""#,
        );
        match request.into_form(&AppConfig::default()) {
            Err(DtrError::InvalidRequest(message)) => assert!(message.contains("\"99\" not found")),
            other => panic!("expected InvalidRequest, got {:?}", other),
        }
    }

    #[test]
    fn test_punch_log_employee_id_is_trimmed() {
        let request = request_json(
            r#", "employee_id": " 17 ", "punch_log": "17\t2025-12-01 07:00:00\n""#,
        );
        let form = request.into_form(&AppConfig::default()).unwrap();
        assert_eq!(form.report.worked_days(), 1);
    }

    #[test]
    fn test_invalid_requests() {
        let config = AppConfig::default();
        let bad_month = DtrRequest {
            month: 13,
            ..request_json("")
        };
        assert!(matches!(bad_month.into_form(&config), Err(DtrError::InvalidMonth { .. })));

        let both = request_json(r#", "attendance": {}, "punch_log": """#);
        assert!(matches!(both.into_form(&config), Err(DtrError::InvalidRequest(_))));

        let no_name = DtrRequest {
            employee_name: "  ".to_string(),
            ..request_json("")
        };
        assert!(matches!(no_name.into_form(&config), Err(DtrError::InvalidRequest(_))));

        let bad_schedule = request_json(r#", "regular_hours": "whenever""#);
        assert!(matches!(bad_schedule.into_form(&config), Err(DtrError::InvalidSchedule(_))));
    }

    #[test]
    fn test_saturday_override_keeps_default_hours() {
        let request = request_json(r#", "saturday_hours": "NO WORK""#);
        let schedule = request.schedule(&AppConfig::default()).unwrap();
        assert_eq!(schedule.saturday_policy, "NO WORK");
        assert_eq!(schedule.expected_minutes(), 480);
    }
}
