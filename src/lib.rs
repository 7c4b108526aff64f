//! Civil Service Form No. 48 (Daily Time Record) generation: undertime
//! calculation, the monthly day table, punch-log ingestion and HTML /
//! spreadsheet / PDF rendering.

pub mod attendance;
pub mod config;
pub mod dtr_data;
pub mod error;
pub mod month_table;
pub mod render;
pub mod request;
pub mod schedule;
pub mod server;
pub mod undertime;

pub use attendance::{AttendanceByDay, PunchRecord};
pub use dtr_data::{DayEntry, DayRow, DtrForm, FormHeader, MonthReport};
pub use error::{DtrError, DtrResult};
pub use month_table::build;
pub use schedule::OfficeSchedule;
pub use undertime::{compute, DayPunches, Undertime};
