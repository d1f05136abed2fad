use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use weekly_report::config::ReportConfig;
use weekly_report::error::AppError;
use weekly_report::workflows::report::{
    render, ReportExporter, ReportGroup, ReportSettings, WeekRange,
};
use weekly_report::workflows::table::InMemoryTable;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) report: Arc<ReportConfig>,
}

/// Where the task table comes from for one report request.
#[derive(Debug)]
pub(crate) enum TableSource {
    Path(PathBuf),
    Inline { name: String, csv: String },
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ReportResponse {
    pub(crate) table_name: String,
    pub(crate) start_week: i64,
    pub(crate) end_week: i64,
    pub(crate) report_text: String,
    pub(crate) groups: Vec<ReportGroup>,
}

impl TableSource {
    /// Inline data wins over the configured export path.
    pub(crate) fn select(
        inline: Option<(String, String)>,
        path: Option<PathBuf>,
        config: &ReportConfig,
    ) -> Result<Self, AppError> {
        if let Some((name, csv)) = inline {
            return Ok(Self::Inline { name, csv });
        }

        path.or_else(|| config.table_path.clone())
            .map(Self::Path)
            .ok_or(AppError::MissingTable)
    }

    fn load(&self, settings: &ReportSettings) -> Result<InMemoryTable, AppError> {
        let loader = settings.fields.csv_loader();
        let table = match self {
            Self::Path(path) => loader.from_path(path)?,
            Self::Inline { name, csv } => loader.from_reader(name.as_str(), csv.as_bytes())?,
        };
        Ok(table)
    }
}

/// Fills missing bounds from the configured default range.
pub(crate) fn resolve_range(
    default: WeekRange,
    start_week: Option<i64>,
    end_week: Option<i64>,
) -> WeekRange {
    WeekRange::new(
        start_week.unwrap_or(default.start),
        end_week.unwrap_or(default.end),
    )
}

pub(crate) async fn generate_report(
    source: &TableSource,
    settings: &ReportSettings,
    range: WeekRange,
) -> Result<ReportResponse, AppError> {
    let table = source.load(settings)?;
    let mut exporter = ReportExporter::with_settings(Arc::new(table), settings.clone());
    exporter.init().await?;
    exporter.set_filter_range(range.start, range.end);

    let table_name = exporter.table_name().await?;
    let report = exporter.build_report().await?;

    Ok(ReportResponse {
        table_name,
        start_week: range.start,
        end_week: range.end,
        report_text: render(&report),
        groups: report.groups().to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ReportConfig {
        ReportConfig {
            table_path: Some(PathBuf::from("/srv/tasks.csv")),
            default_range: WeekRange::new(1, 52),
            settings: ReportSettings::default(),
        }
    }

    #[test]
    fn resolve_range_fills_missing_bounds() {
        let default = WeekRange::new(1, 52);
        assert_eq!(resolve_range(default, None, None), default);
        assert_eq!(resolve_range(default, Some(10), None), WeekRange::new(10, 52));
        assert_eq!(resolve_range(default, None, Some(3)), WeekRange::new(1, 3));
    }

    #[test]
    fn table_source_prefers_inline_then_argument_then_config() {
        let config = config();
        let inline = TableSource::select(
            Some(("inline".to_string(), "a,b\n".to_string())),
            Some(PathBuf::from("ignored.csv")),
            &config,
        )
        .expect("inline source");
        assert!(matches!(inline, TableSource::Inline { .. }));

        let explicit = TableSource::select(None, Some(PathBuf::from("cli.csv")), &config)
            .expect("explicit path");
        assert!(matches!(explicit, TableSource::Path(path) if path == PathBuf::from("cli.csv")));

        let configured = TableSource::select(None, None, &config).expect("configured path");
        assert!(
            matches!(configured, TableSource::Path(path) if path == PathBuf::from("/srv/tasks.csv"))
        );

        let missing = ReportConfig {
            table_path: None,
            ..config
        };
        assert!(matches!(
            TableSource::select(None, None, &missing),
            Err(AppError::MissingTable)
        ));
    }

    #[tokio::test]
    async fn generate_report_renders_inline_table() {
        let source = TableSource::Inline {
            name: "Sprint 12".to_string(),
            csv: "task_description,task_group,state,finish_week\n\
Ship search,Backend,processing,12\n"
                .to_string(),
        };

        let response = generate_report(&source, &ReportSettings::default(), WeekRange::new(12, 12))
            .await
            .expect("report builds");

        assert_eq!(response.table_name, "Sprint 12");
        assert_eq!(
            response.report_text,
            "1. Other\n2. Backend\n  * Ship search (unfinished)"
        );
        assert_eq!(response.groups.len(), 2);
    }
}
