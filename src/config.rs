use std::env;
use std::path::PathBuf;

use crate::dtr_data::FormHeader;
use crate::error::{DtrError, DtrResult};
use crate::render::RenderOptions;
use crate::schedule::OfficeSchedule;

pub const DEFAULT_PORT: u16 = 3000;

/// Application settings
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub header: FormHeader,
    pub default_schedule: OfficeSchedule,
    pub render: RenderOptions,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            header: FormHeader::default(),
            default_schedule: OfficeSchedule::default(),
            render: RenderOptions::default(),
        }
    }
}

impl AppConfig {
    /// Load `.env` if present, then read the environment
    /// Variables: DTR_PORT, DTR_COUNTRY, DTR_AGENCY, DTR_DIVISION, DTR_SCHOOL,
    /// DTR_VERIFIER_TITLE, DTR_REGULAR_HOURS, DTR_SATURDAY_HOURS, DTR_COPIES, DTR_PDF_FONT
    pub fn from_env() -> DtrResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset or blank keys keep their defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> DtrResult<Self> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = AppConfig::default();

        let port = match get("DTR_PORT") {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| DtrError::Config(format!("invalid DTR_PORT: {:?}", value)))?,
            None => defaults.port,
        };

        let header = FormHeader {
            country: get("DTR_COUNTRY").unwrap_or(defaults.header.country),
            agency: get("DTR_AGENCY").unwrap_or(defaults.header.agency),
            division: get("DTR_DIVISION").unwrap_or(defaults.header.division),
            school: get("DTR_SCHOOL").unwrap_or(defaults.header.school),
            verifier_title: get("DTR_VERIFIER_TITLE").unwrap_or(defaults.header.verifier_title),
        };

        let saturday = get("DTR_SATURDAY_HOURS").unwrap_or_default();
        let default_schedule = match get("DTR_REGULAR_HOURS") {
            Some(hours) => OfficeSchedule::parse(&hours, &saturday)
                .map_err(|e| DtrError::Config(format!("DTR_REGULAR_HOURS: {}", e)))?,
            None if !saturday.is_empty() => OfficeSchedule {
                saturday_policy: saturday,
                ..defaults.default_schedule
            },
            None => defaults.default_schedule,
        };

        let copies = match get("DTR_COPIES") {
            Some(value) => match value.trim().parse::<u32>() {
                Ok(copies @ 1..=2) => copies,
                _ => {
                    return Err(DtrError::Config(format!(
                        "DTR_COPIES must be 1 or 2, got {:?}",
                        value
                    )))
                }
            },
            None => defaults.render.copies,
        };

        Ok(Self {
            port,
            header,
            default_schedule,
            render: RenderOptions {
                copies,
                pdf_font: get("DTR_PDF_FONT").map(PathBuf::from),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.header, FormHeader::default());
        assert_eq!(config.default_schedule, OfficeSchedule::default());
        assert_eq!(config.render.copies, 2);
        assert!(config.render.pdf_font.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("DTR_PORT", "8080"),
            ("DTR_SCHOOL", "DIGOS CITY NATIONAL HIGH SCHOOL"),
            ("DTR_REGULAR_HOURS", "08:00 - 12:00 / 13:00 - 17:00"),
            ("DTR_SATURDAY_HOURS", "NONE"),
            ("DTR_COPIES", "1"),
            ("DTR_DIVISION", "  "),
        ]))
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.header.school, "DIGOS CITY NATIONAL HIGH SCHOOL");
        assert_eq!(config.header.division, FormHeader::default().division);
        assert_eq!(config.default_schedule.regular_hours_str(), "08:00 – 12:00 / 13:00 – 17:00");
        assert_eq!(config.default_schedule.saturday_policy, "NONE");
        assert_eq!(config.render.copies, 1);
    }

    #[test]
    fn test_saturday_policy_without_hours() {
        let config = AppConfig::from_lookup(lookup(&[("DTR_SATURDAY_HOURS", "NO WORK")])).unwrap();
        assert_eq!(config.default_schedule.saturday_policy, "NO WORK");
        assert_eq!(config.default_schedule.expected_minutes(), 480);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[("DTR_PORT", "http")])),
            Err(DtrError::Config(_))
        ));
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[("DTR_REGULAR_HOURS", "all day")])),
            Err(DtrError::Config(_))
        ));
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[("DTR_COPIES", "3")])),
            Err(DtrError::Config(_))
        ));
    }
}
