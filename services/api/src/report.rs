use crate::infra::{generate_report, resolve_range, TableSource};
use chrono::{Datelike, Local};
use clap::Args;
use std::path::PathBuf;
use weekly_report::config::AppConfig;
use weekly_report::error::AppError;
use weekly_report::telemetry;
use weekly_report::workflows::report::WeekRange;

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// CSV export of the task table (defaults to REPORT_TABLE_PATH)
    #[arg(long)]
    pub(crate) table: Option<PathBuf>,
    /// First finish week to include (defaults to REPORT_START_WEEK)
    #[arg(long, conflicts_with = "current_week")]
    pub(crate) start_week: Option<i64>,
    /// Last finish week to include (defaults to REPORT_END_WEEK)
    #[arg(long, conflicts_with = "current_week")]
    pub(crate) end_week: Option<i64>,
    /// Report on the current ISO week only
    #[arg(long)]
    pub(crate) current_week: bool,
    /// Print the grouped report as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) async fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let ReportArgs {
        table,
        start_week,
        end_week,
        current_week,
        json,
    } = args;

    let config = AppConfig::load()?;
    telemetry::init_with_writer(&config.telemetry, std::io::stderr)?;

    let range = if current_week {
        let week = i64::from(Local::now().iso_week().week());
        WeekRange::new(week, week)
    } else {
        resolve_range(config.report.default_range, start_week, end_week)
    };

    let source = TableSource::select(None, table, &config.report)?;
    let response = generate_report(&source, &config.report.settings, range).await?;

    if json {
        let body = serde_json::to_string_pretty(&response).map_err(std::io::Error::from)?;
        println!("{body}");
        return Ok(());
    }

    println!("{}", response.table_name);
    println!(
        "Finish weeks {}-{}\n",
        response.start_week, response.end_week
    );
    println!("{}", response.report_text);
    Ok(())
}
