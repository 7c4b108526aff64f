use std::fs;
use std::path::Path;

use dtr_pdf_rs::config::AppConfig;
use dtr_pdf_rs::render::render_to_file;
use dtr_pdf_rs::request::DtrRequest;
use dtr_pdf_rs::undertime::{evaluate_strs, UndertimeOutcome};
use dtr_pdf_rs::{server, DtrError, DtrResult};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: dtr-pdf-rs [serve] \
    | dtr-pdf-rs render <request.json> <output.pdf|.xlsx|.html> \
    | dtr-pdf-rs undertime <am-arrival> <am-departure> <pm-arrival> <pm-departure>";

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .init();
}

/// Render one JSON request to a file
fn render_file(config: &AppConfig, request_path: &str, output_path: &str) -> DtrResult<()> {
    let json_str = fs::read_to_string(request_path)?;
    let request: DtrRequest = serde_json::from_str(&json_str)?;
    let form = request.into_form(config)?;

    info!(
        employee = %form.employee_name,
        month = %form.report.month_year_str(),
        worked_days = form.report.worked_days(),
        total = %form.report.total.total_str(),
        "building DTR"
    );
    render_to_file(&form, Path::new(output_path), &config.render)?;
    info!(path = output_path, "DTR saved");
    Ok(())
}

/// Undertime for one row of form cells against the configured hours
fn undertime_row(config: &AppConfig, cells: [&str; 4]) {
    let [am_arrival, am_departure, pm_arrival, pm_departure] = cells;
    let outcome = evaluate_strs(
        am_arrival,
        am_departure,
        pm_arrival,
        pm_departure,
        &config.default_schedule,
    );
    if !matches!(outcome, UndertimeOutcome::Computed(_)) {
        warn!(?outcome, "undertime not computed, reporting zero");
    }
    let undertime = outcome.undertime();
    println!("{} {}", undertime.hours, undertime.minutes);
}

#[tokio::main]
async fn main() -> DtrResult<()> {
    init_logging();
    let config = AppConfig::from_env()?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        [] | ["serve"] => server::run(config).await,
        ["render", request_path, output_path] => render_file(&config, request_path, output_path),
        ["undertime", am_in, am_out, pm_in, pm_out] => {
            undertime_row(&config, [*am_in, *am_out, *pm_in, *pm_out]);
            Ok(())
        }
        _ => Err(DtrError::InvalidRequest(USAGE.to_string())),
    }
}
